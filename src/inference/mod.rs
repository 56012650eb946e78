//! Serving loaded artifacts.

pub mod service;

pub use service::CreditScorer;
