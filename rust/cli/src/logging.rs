//! Tracing setup for the `handfact` binary plus a capturing layer for tests.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Collects every event it sees; attach with [`CaptureLogs::into_layer`].
#[derive(Debug, Clone, Default)]
pub struct CaptureLogs {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn at_level(&self, level: Level) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut e) = self.entries.lock() {
            e.clear();
        }
    }

    pub fn into_layer<S>(self) -> CaptureLayer<S>
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        CaptureLayer {
            sink: self,
            _phantom: PhantomData,
        }
    }
}

pub struct CaptureLayer<S> {
    sink: CaptureLogs,
    _phantom: PhantomData<S>,
}

impl<S> Layer<S> for CaptureLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let entry = LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        };

        if let Ok(mut entries) = self.sink.entries.lock() {
            entries.push(entry);
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let value_str = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(value_str);
        } else {
            self.fields.push((field.name().to_string(), value_str));
        }
    }
}

/// Installs the global fmt subscriber. Logs go to stderr so stdout stays
/// machine-readable. `RUST_LOG` overrides the default `info` filter.
/// A second call is a no-op.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::{Checkpoint, EtlJob, BatchLimits, Unbounded};
    use crate::store::MemoryStore;
    use handfact_engine::fact::build_hand_fact;
    use handfact_engine::record::RawLogRecord;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn capture<F: FnOnce()>(f: F) -> CaptureLogs {
        let logs = CaptureLogs::new();
        let registry = Registry::default().with(logs.clone().into_layer::<Registry>());
        tracing::subscriber::with_default(registry, f);
        logs
    }

    #[test]
    fn missing_stack_warns_during_build() {
        let records = vec![
            RawLogRecord::at(r#"Player stacks: #1 "ann@a" (1000)"#, "01"),
            RawLogRecord::at(r#""ann@a" raises to 60"#, "02"),
            RawLogRecord::at(r#""bob@b" calls 60"#, "03"),
            RawLogRecord::at("Flop: [Ah 7c 2d]", "04"),
        ];
        let logs = capture(|| {
            let fact = build_hand_fact("g", 1, &records).unwrap();
            assert_eq!(fact.street_spr.flop.table, None);
        });
        assert!(!logs.at_level(Level::WARN).is_empty());
    }

    #[test]
    fn skipped_hand_is_logged_with_reason() {
        let store = MemoryStore::new();
        store.insert_hand("g", 4, vec![RawLogRecord::new("dealer chat")]);
        let logs = capture(|| {
            let job = EtlJob::new(
                &store,
                BatchLimits {
                    max_runtime_ms: 2200,
                    max_hands_per_run: 12,
                    page_size: 50,
                },
            );
            job.run(&Checkpoint::new("g", 0), &Unbounded).unwrap();
        });
        let warns = logs.at_level(Level::WARN);
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].message, "hand skipped");
        assert_eq!(warns[0].field("reason"), Some("no player actions parsed"));
        let infos = logs.at_level(Level::INFO);
        assert!(infos.iter().any(|e| e.message == "etl batch finished"));
    }

    #[test]
    fn clear_drops_entries() {
        let logs = capture(|| tracing::info!("one"));
        assert_eq!(logs.entries().len(), 1);
        logs.clear();
        assert!(logs.entries().is_empty());
    }
}
