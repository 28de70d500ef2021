/// Errors when trying to register a config value
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value of this type is already registered
    #[error("A config value of type '{0}' is already registered")]
    AlreadyRegistered(&'static str),
}
