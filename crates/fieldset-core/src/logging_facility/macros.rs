//! Operation lifecycle macros.
//!
//! A public operation emits exactly one `start` event and then either one
//! `end` or one `end_error` event, all under the `fieldset::op` target.
//! Durations are measured from an [`Instant`](std::time::Instant) taken
//! right after `start`.

/// Milliseconds elapsed since `start`, saturating.
#[doc(hidden)]
pub fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Emit the `start` event of an operation, with optional extra fields.
///
/// ```
/// # use fieldset_core::log_op_start;
/// log_op_start!("intersect");
/// log_op_start!("intersect", left_len = 3_u64, right_len = 2_u64);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {
        $crate::tracing::info!(
            target: "fieldset::op",
            component = module_path!(),
            op = $op,
            event = $crate::fieldset_core_types::schema::EVENT_START,
            $($($field)+)?
        )
    };
}

/// Emit the `end` event of an operation started at `since`.
///
/// ```
/// # use fieldset_core::log_op_end;
/// let start = std::time::Instant::now();
/// log_op_end!("difference", since = start, result_len = 4_u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, since = $start:expr $(, $($field:tt)+)?) => {
        $crate::tracing::info!(
            target: "fieldset::op",
            component = module_path!(),
            op = $op,
            event = $crate::fieldset_core_types::schema::EVENT_END,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($start),
            $($($field)+)?
        )
    };
}

/// Emit the `end_error` event of an operation started at `since`.
///
/// `err` is anything convertible into [`ExError`](crate::errors::ExError);
/// its kind and stable code are recorded.
///
/// ```
/// # use fieldset_core::{log_op_error, errors::FieldSetError};
/// let start = std::time::Instant::now();
/// let err = FieldSetError::EmptySelector { context: "top-level".to_string() };
/// log_op_error!("construct", err, since = start);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, since = $start:expr $(, $($field:tt)+)?) => {{
        let ex_err: $crate::errors::ExError = ::core::convert::Into::into($err);
        $crate::tracing::error!(
            target: "fieldset::op",
            component = module_path!(),
            op = $op,
            event = $crate::fieldset_core_types::schema::EVENT_END_ERROR,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($start),
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            $($($field)+)?
        );
    }};
}
