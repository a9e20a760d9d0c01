//! Integration tests for the scoring engine and tenant service covering the
//! reference scenarios, ordering and monotonicity properties, and storage.

mod helpers;
mod properties;
mod scenarios;
mod service;
