use tracing::{Event, Subscriber};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::Context, EnvFilter, Layer, Registry};

const DEFAULT_FILTER: &str = "warn,roulette=info,roulette_shared=info";

#[derive(Default)]
struct MessageVisitor {
    message: String,
    // Set for records bridged from the `log` facade.
    log_target: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message.push_str(&format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.message.push_str(value),
            "log.target" => self.log_target = Some(value.to_string()),
            _ => {}
        }
    }
}

/// One line per event on stderr, so stdout stays clean for command output.
struct CustomLayer;

impl<S: Subscriber> Layer<S> for CustomLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if visitor.message.is_empty() {
            return;
        }
        let target = visitor.log_target.as_deref().unwrap_or(metadata.target());

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        match metadata.level().as_str() {
            "ERROR" => eprintln!("[{}] ❌ Error: {} - {}", timestamp, target, visitor.message),
            "WARN" => eprintln!("[{}] ⚠️ Warning: {} - {}", timestamp, target, visitor.message),
            "INFO" => eprintln!("[{}] ℹ️ {} - {}", timestamp, target, visitor.message),
            "DEBUG" => eprintln!("[{}] 🔄 {} - {}", timestamp, target, visitor.message),
            _ => {}
        }
    }
}

/// Installs the global subscriber. `log` records from the shared crate are
/// bridged into it as well.
pub fn setup() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    Registry::default()
        .with(env_filter)
        .with(CustomLayer)
        .try_init()
}
