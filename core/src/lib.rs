//! iofix-rs: reorder the inputs and outputs of multi-input/multi-output models.
//!
//! Exporting a model to an embedded inference format can shuffle the order of
//! its inputs and outputs. This crate wraps a model so that callers see the
//! order they want, without touching the computation itself.
//!
//! All permutations use one convention: applying `perm` to a sequence `xs`
//! yields `ys[i] = xs[perm[i]]`. An absent permutation is the identity.
//!
//! # Example
//!
//! ```ignore
//! use iofix_rs::{fix_io_order, ConcatConvModel, Model, Permutation};
//!
//! let model = ConcatConvModel::new("concat_conv", 3, 3, &[4, 8, 16, 32], &[4, 8, 16])?;
//! let specs = model.input_specs().to_vec();
//!
//! // Native input i is presented at external position inputs_perm[i].
//! let fixed = fix_io_order(
//!     model,
//!     &specs,
//!     Some(Permutation::new(vec![1, 3, 2, 0])?),
//!     Some(Permutation::new(vec![2, 0, 1])?),
//! )?;
//!
//! for spec in fixed.input_specs() {
//!     println!("{}", spec);
//! }
//! fixed.manifest().save("fixed_model.json")?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod input;
pub mod permutation;

// Re-export commonly used types
pub use error::{FixerError, Result};
pub use inference::{
    fix_io_order, ConcatConvModel, ExportManifest, FixedModel, Model, OrderFixingModel,
    TensorData, TensorSpec,
};
pub use input::InputFile;
pub use permutation::{invert, permute, Permutation};
