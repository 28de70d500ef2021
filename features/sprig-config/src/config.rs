use std::{ops::Deref, sync::Arc};

/// Shared handle to a config value taken out of the [`ConfigRegistry`](crate::provider::ConfigRegistry)
///
/// # Example
/// ```rust
/// use sprig_config::provider::ConfigRegistry;
///
/// struct NameFormat {
///     separator: char,
/// }
///
/// let mut configs = ConfigRegistry::new();
/// configs.insert(NameFormat { separator: '_' }).unwrap();
///
/// let format = configs.get::<NameFormat>().unwrap();
/// assert_eq!(format.separator, '_');
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T: std::fmt::Debug> std::fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Config").field(&self.inner).finish()
    }
}
impl<T> Config<T> {
    pub(crate) fn new(inner: Arc<T>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}
