//! Data models for the table API.
//!
//! This module contains the incident create payload, the batch outcome
//! report, the encoded query builder, and the common response envelope.

mod common;
mod incident;
mod outcome;
mod query;

pub use common::*;
pub use incident::*;
pub use outcome::*;
pub use query::*;
