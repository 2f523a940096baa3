//! Frozen-model inference for charging profiles.
//!
//! - [`model`] -- the [`model::ProfileModel`] adapter trait and the in-process dense backend.
//! - [`inference`] -- [`inference::InferencePipeline`], the normalize / infer / conserve chain.
//! - [`config`] -- model directory and backend selection.

pub mod config;
pub mod inference;
pub mod model;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use inference::InferencePipeline;
