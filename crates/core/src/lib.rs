//! Domain types and pure numeric logic for charge-profile inference.
//!
//! Nothing in this crate performs I/O beyond reading artifact files; the
//! model runtime lives in `chargeplan-pipeline` and HTTP in `chargeplan-api`.

pub mod error;
pub mod pricing;
pub mod profile;
pub mod scaler;
pub mod types;
