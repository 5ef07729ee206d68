//! Order-fixing wrapper.
//!
//! [`OrderFixingModel`] presents a nested model with its inputs and outputs
//! reordered. On every call it
//!
//! 1. reorders the caller's inputs with the input permutation,
//! 2. calls the nested model,
//! 3. reorders the nested outputs with the output permutation.
//!
//! Both permutations follow `result[i] = sequence[perm[i]]`. Values pass
//! through untouched and errors from the nested model are returned as is.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::{Model, TensorData, TensorSpec};
use crate::error::{FixerError, Result};
use crate::permutation::{invert, permute, Permutation};

/// Reference to a nested model inside persisted configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    /// Model name, as returned by [`Model::name`].
    pub name: String,

    /// Declared inputs of the model.
    pub inputs: Vec<TensorSpec>,

    /// Declared outputs of the model.
    pub outputs: Vec<TensorSpec>,
}

impl ModelRef {
    /// Describe an existing model.
    pub fn of<M: Model + ?Sized>(model: &M) -> Self {
        Self {
            name: model.name().to_string(),
            inputs: model.input_specs().to_vec(),
            outputs: model.output_specs().to_vec(),
        }
    }

    /// Check that `model` is the model this reference describes.
    pub fn check<M: Model + ?Sized>(&self, model: &M) -> Result<()> {
        if model.name() != self.name {
            return Err(FixerError::config(format!(
                "Resolved model '{}' does not match reference '{}'",
                model.name(),
                self.name
            )));
        }
        if model.input_specs() != self.inputs.as_slice()
            || model.output_specs() != self.outputs.as_slice()
        {
            return Err(FixerError::config(format!(
                "Signature of model '{}' changed since it was saved",
                self.name
            )));
        }
        Ok(())
    }
}

/// Persisted state of an [`OrderFixingModel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFixingConfig {
    /// The wrapped model.
    pub nested: ModelRef,

    /// Permutation applied to inputs before the nested call.
    #[serde(default)]
    pub input_perm: Option<Permutation>,

    /// Permutation applied to outputs after the nested call.
    #[serde(default)]
    pub output_perm: Option<Permutation>,
}

/// A model that reorders the inputs and outputs of a nested model.
///
/// # Example
///
/// ```ignore
/// use iofix_rs::{OrderFixingModel, Permutation};
///
/// // Callers pass [D, B, C, A]; the nested model sees [A, B, C, D].
/// let fixer = OrderFixingModel::new(model, Some(Permutation::new(vec![3, 1, 2, 0])?), None)?;
/// let outputs = fixer.call(inputs)?;
/// ```
#[derive(Debug)]
pub struct OrderFixingModel<M> {
    nested: M,
    input_perm: Option<Permutation>,
    output_perm: Option<Permutation>,
    name: String,
    input_specs: Vec<TensorSpec>,
    output_specs: Vec<TensorSpec>,
}

impl<M: Model> OrderFixingModel<M> {
    /// Wrap `nested`.
    ///
    /// The permutations are stored as given. The wrapper's own declared
    /// inputs are the nested inputs reordered by the inverse input
    /// permutation, so that reordering them again yields the nested order.
    /// Its declared outputs are the nested outputs reordered by the output
    /// permutation.
    ///
    /// # Errors
    ///
    /// Returns [`FixerError::LengthMismatch`] if a permutation does not cover
    /// exactly the nested model's inputs or outputs.
    pub fn new(
        nested: M,
        input_perm: Option<Permutation>,
        output_perm: Option<Permutation>,
    ) -> Result<Self> {
        let input_specs = permute(
            nested.input_specs().to_vec(),
            invert(input_perm.as_ref()).as_ref(),
        )?;
        let output_specs = permute(nested.output_specs().to_vec(), output_perm.as_ref())?;
        let name = format!("order_fixing_{}", nested.name());

        Ok(Self {
            nested,
            input_perm,
            output_perm,
            name,
            input_specs,
            output_specs,
        })
    }

    /// Rebuild a wrapper from persisted configuration.
    ///
    /// `resolve` looks up the nested model; the result must match the
    /// reference stored in `config`.
    pub fn from_config<F>(config: OrderFixingConfig, resolve: F) -> Result<Self>
    where
        F: FnOnce(&ModelRef) -> Result<M>,
    {
        let nested = resolve(&config.nested)?;
        config.nested.check(&nested)?;
        Self::new(nested, config.input_perm, config.output_perm)
    }

    /// Snapshot of the state needed to rebuild this wrapper.
    pub fn config(&self) -> OrderFixingConfig {
        OrderFixingConfig {
            nested: ModelRef::of(&self.nested),
            input_perm: self.input_perm.clone(),
            output_perm: self.output_perm.clone(),
        }
    }

    /// The wrapped model.
    pub fn nested(&self) -> &M {
        &self.nested
    }

    /// Permutation applied to inputs.
    pub fn input_perm(&self) -> Option<&Permutation> {
        self.input_perm.as_ref()
    }

    /// Permutation applied to outputs.
    pub fn output_perm(&self) -> Option<&Permutation> {
        self.output_perm.as_ref()
    }
}

impl<M: Model> Model for OrderFixingModel<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_specs(&self) -> &[TensorSpec] {
        &self.input_specs
    }

    fn output_specs(&self) -> &[TensorSpec] {
        &self.output_specs
    }

    fn call(&self, inputs: Vec<TensorData>) -> Result<Vec<TensorData>> {
        debug!(
            model = self.nested.name(),
            inputs = inputs.len(),
            "reordering call"
        );
        let inputs = permute(inputs, self.input_perm.as_ref())?;
        let outputs = self.nested.call(inputs)?;
        permute(outputs, self.output_perm.as_ref())
    }

    fn trace(&self, inputs: &[TensorSpec]) -> Result<Vec<TensorSpec>> {
        let inputs = permute(inputs.to_vec(), self.input_perm.as_ref())?;
        let outputs = self.nested.trace(&inputs)?;
        permute(outputs, self.output_perm.as_ref())
    }
}
