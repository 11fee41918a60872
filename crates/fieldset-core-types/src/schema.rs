//! Field keys and event names shared by every `fieldset::op` log event.
//!
//! Consumers of the JSON log stream and the test capture layer match on these
//! strings; the logging macros emit them.

/// Lifecycle stages, in the order an operation emits them.
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Every lifecycle stage.
pub const LIFECYCLE_EVENTS: [&str; 3] = [EVENT_START, EVENT_END, EVENT_END_ERROR];

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

/// Operand sizes on `start`, result size on `end`.
pub const FIELD_LEFT_LEN: &str = "left_len";
pub const FIELD_RIGHT_LEN: &str = "right_len";
pub const FIELD_RESULT_LEN: &str = "result_len";

/// Set on `end_error` only.
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

/// Whether `event` names a lifecycle stage.
pub fn is_lifecycle_event(event: &str) -> bool {
    LIFECYCLE_EVENTS.contains(&event)
}
