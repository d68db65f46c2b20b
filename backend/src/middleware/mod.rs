//! Request middleware.
//!
//! Purpose: request lifecycle concerns. Currently only trace-id propagation;
//! authentication is handled by the session extractor.

pub mod trace;

pub use trace::Trace;
