use std::fmt::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::Context, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "warn,backend=info,shared=info,tower_http=info";

/// Collects the event message plus any structured fields, e.g. the `status`
/// and `latency` that the HTTP trace layer attaches.
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: String,
}

impl EventVisitor {
    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        // `log` records bridged from `shared` carry their metadata as fields.
        if name.starts_with("log.") {
            return;
        }
        let _ = write!(self.fields, " {}={}", name, value);
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }
}

fn render_line(timestamp: &str, level: &Level, target: &str, message: &str, fields: &str) -> String {
    let marker = match level.as_str() {
        "ERROR" => "❌ Error:",
        "WARN" => "⚠️ Warning:",
        "INFO" => "ℹ️",
        "DEBUG" => "🔄",
        _ => "🔍",
    };
    format!("[{}] {} {} - {}{}", timestamp, marker, target, message, fields)
}

struct PromoLayer;

impl<S: Subscriber> Layer<S> for PromoLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        if visitor.message.is_empty() && visitor.fields.is_empty() {
            return;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        let line = render_line(
            &timestamp,
            metadata.level(),
            metadata.target(),
            &visitor.message,
            &visitor.fields,
        );
        if *metadata.level() <= Level::WARN {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Installs the global subscriber. Verbosity is left to `RUST_LOG`, and `log`
/// records from the `shared` crate are bridged in as well.
pub fn setup() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    Registry::default()
        .with(env_filter)
        .with(PromoLayer)
        .try_init()
}
