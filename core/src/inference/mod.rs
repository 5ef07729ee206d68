//! Models and the order-fixing wrappers around them.
//!
//! This module defines the [`Model`] capability, the [`OrderFixingModel`]
//! wrapper that reorders a model's inputs and outputs, and [`fix_io_order`],
//! which produces an exportable [`FixedModel`] with a declared signature.

mod demo;
mod fixed;
mod fixer;
mod model;
#[cfg(test)]
mod testing;

pub use demo::ConcatConvModel;
pub use fixed::{fix_io_order, ExportManifest, FixedModel};
pub use fixer::{ModelRef, OrderFixingConfig, OrderFixingModel};
pub use model::{Model, TensorData, TensorSpec};
