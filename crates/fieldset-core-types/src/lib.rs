//! Core types shared across fieldset facilities
//!
//! This crate provides foundational types used by both the error and
//! logging facilities:
//!
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
