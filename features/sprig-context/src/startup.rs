//! Records the steps the container takes while it bootstraps.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::span::EnteredSpan;

/// Opens startup steps
pub trait ApplicationStartup: Send + Sync {
    fn start(&self, name: &'static str) -> Box<dyn StartupStep>;
}

/// A single recorded step, open until [`StartupStep::end`] is called
pub trait StartupStep {
    /// Attaches a tag, the value is only produced if the step is recorded
    fn tag(&mut self, key: &'static str, value: &dyn Fn() -> String);

    fn end(self: Box<Self>);
}

/// Emits every step as a `tracing` debug span
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStartup;
impl ApplicationStartup for TracingStartup {
    fn start(&self, name: &'static str) -> Box<dyn StartupStep> {
        let span = tracing::debug_span!(
            "startup_step",
            step = name,
            post_processor = tracing::field::Empty
        );
        Box::new(TracingStep {
            span: span.entered(),
        })
    }
}

struct TracingStep {
    span: EnteredSpan,
}
impl StartupStep for TracingStep {
    fn tag(&mut self, key: &'static str, value: &dyn Fn() -> String) {
        if !self.span.is_disabled() {
            self.span.record(key, value().as_str());
        }
    }

    fn end(self: Box<Self>) {
        drop(self.span.exit());
    }
}

/// A finished step kept by [`BufferingStartup`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupRecord {
    pub name: &'static str,
    pub tags: Vec<(&'static str, String)>,
}
impl StartupRecord {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Keeps all finished steps in memory, in the order they ended
#[derive(Debug, Default, Clone)]
pub struct BufferingStartup {
    records: Arc<Mutex<Vec<StartupRecord>>>,
}
impl BufferingStartup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<StartupRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Values of one tag over all steps with the given name
    pub fn tag_values(&self, step: &str, key: &str) -> Vec<String> {
        self.records()
            .iter()
            .filter(|record| record.name == step)
            .filter_map(|record| record.tag(key).map(str::to_string))
            .collect()
    }
}
impl ApplicationStartup for BufferingStartup {
    fn start(&self, name: &'static str) -> Box<dyn StartupStep> {
        Box::new(BufferedStep {
            records: self.records.clone(),
            record: StartupRecord {
                name,
                tags: Vec::new(),
            },
        })
    }
}

struct BufferedStep {
    records: Arc<Mutex<Vec<StartupRecord>>>,
    record: StartupRecord,
}
impl StartupStep for BufferedStep {
    fn tag(&mut self, key: &'static str, value: &dyn Fn() -> String) {
        self.record.tags.push((key, value()));
    }

    fn end(self: Box<Self>) {
        let BufferedStep { records, record } = *self;
        records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffering_keeps_steps_in_end_order() {
        let startup = BufferingStartup::new();

        let mut outer = startup.start("outer");
        outer.tag("post_processor", &|| "first".to_string());
        let mut inner = startup.start("inner");
        inner.tag("post_processor", &|| "second".to_string());
        inner.end();
        outer.end();

        let records = startup.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "inner");
        assert_eq!(records[1].tag("post_processor"), Some("first"));
        assert_eq!(startup.tag_values("outer", "post_processor"), vec!["first"]);
    }

    #[test]
    fn tracing_steps_can_be_tagged_and_ended() {
        let mut step = TracingStartup.start("step");
        step.tag("post_processor", &|| "anything".to_string());
        step.end();
    }
}
