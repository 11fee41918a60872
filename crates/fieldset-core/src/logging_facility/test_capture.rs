//! In-memory event capture for asserting on operation lifecycles in tests.
//!
//! [`init_test_capture`] installs a process-wide subscriber once; every test
//! shares the same [`TestCapture`], so assertions should filter by a unique
//! operation name or by distinctive field values.

use fieldset_core_types::schema::is_lifecycle_event;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event: its level, target and every field rendered as text.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field("op")
    }

    pub fn event(&self) -> Option<&str> {
        self.field("event")
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

/// Strings are kept bare; everything else goes through `Debug`.
struct Fields<'a>(&'a mut BTreeMap<String, String>);

impl Visit for Fields<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

type Sink = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer(Sink);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut Fields(&mut fields));
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields,
        };
        if let Ok(mut events) = self.0.lock() {
            events.push(captured);
        }
    }
}

/// Shared handle onto everything captured so far.
#[derive(Clone)]
pub struct TestCapture(Sink);

impl TestCapture {
    /// Snapshot of all captured events, oldest first.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events of one operation and lifecycle stage, oldest first.
    pub fn find(&self, op: &str, event: &str) -> Vec<CapturedEvent> {
        self.events().into_iter().filter(|e| e.is(op, event)).collect()
    }

    /// Lifecycle stages emitted for `op`, in emission order. Other events
    /// carrying the same `op` are skipped.
    pub fn lifecycle(&self, op: &str) -> Vec<String> {
        self.events()
            .iter()
            .filter(|e| e.op() == Some(op))
            .filter_map(CapturedEvent::event)
            .filter(|stage| is_lifecycle_event(stage))
            .map(str::to_string)
            .collect()
    }

    /// # Panics
    ///
    /// Panics if no event with this operation and stage was captured.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "no {event} event for op {op} among {} captured events",
            events.len()
        );
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture subscriber on first call and return the shared handle.
///
/// If another global subscriber is already installed, nothing is captured.
///
/// ```
/// use fieldset_core::logging_facility::init_test_capture;
/// use fieldset_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// capture.assert_event_exists("doc_capture_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let sink = Sink::default();
            let installed = tracing_subscriber::registry()
                .with(CaptureLayer(Arc::clone(&sink)))
                .try_init();
            if installed.is_err() {
                tracing::debug!("global subscriber already installed, capture stays empty");
            }
            TestCapture(sink)
        })
        .clone()
}
