//! Input/output helpers.
//!
//! - dataset CSV read/write + header validation (`dataset`)
//! - checksummed model artifact container (`artifact`)

pub mod artifact;
pub mod dataset;

pub use artifact::*;
pub use dataset::*;
