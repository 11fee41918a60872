//! Structured operation logging.
//!
//! Public operations on [`crate::BucketedMultiset`] emit `start` and then
//! `end` or `end_error` through [`log_op_start!`](crate::log_op_start),
//! [`log_op_end!`](crate::log_op_end) and [`log_op_error!`](crate::log_op_error).
//! Bucketing, nested comparison and diff reporting log at `debug` only.
//!
//! Binaries call [`init`] once; tests use [`init_test_capture`].

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
