//! Fixed-order models ready for export.
//!
//! [`fix_io_order`] builds a [`FixedModel`]: a model whose declared inputs
//! are in the order external callers will pass them, and whose outputs are in
//! the order external callers expect to read them. Its persisted form is the
//! [`ExportManifest`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::fixer::{ModelRef, OrderFixingConfig, OrderFixingModel};
use super::model::{check_specs, Model, TensorData, TensorSpec};
use crate::error::{FixerError, Result};
use crate::permutation::{invert, permute, Permutation};

/// Reorder the inputs and outputs of `model`.
///
/// `inputs` are the model's declared inputs (normally
/// `model.input_specs()`). `inputs_perm[i]` is the external position of the
/// model's input `i`, and `outputs_perm[j]` the external position of its
/// output `j`. `None` keeps the native order.
///
/// The declared inputs of the result are `inputs` reordered by the inverse of
/// `inputs_perm`; the internal wrapper reorders them back with
/// `inputs_perm`. Outputs are reordered by the inverse of `outputs_perm` and
/// the declared outputs are traced through the wrapper.
///
/// # Errors
///
/// - [`FixerError::Signature`] if `inputs` does not match the model's inputs
/// - [`FixerError::LengthMismatch`] if a permutation has the wrong length
///
/// # Example
///
/// ```ignore
/// use iofix_rs::{fix_io_order, Permutation};
///
/// let specs = model.input_specs().to_vec();
/// let fixed = fix_io_order(
///     model,
///     &specs,
///     Some(Permutation::new(vec![1, 3, 2, 0])?),
///     Some(Permutation::new(vec![2, 0, 1])?),
/// )?;
/// for spec in fixed.input_specs() {
///     println!("{}", spec);
/// }
/// ```
pub fn fix_io_order<M: Model>(
    model: M,
    inputs: &[TensorSpec],
    inputs_perm: Option<Permutation>,
    outputs_perm: Option<Permutation>,
) -> Result<FixedModel<M>> {
    check_specs(model.name(), model.input_specs(), inputs)?;

    let inputs_perm_inv = invert(inputs_perm.as_ref());
    let outputs_perm_inv = invert(outputs_perm.as_ref());

    let name = model.name().to_string();
    let fixer = OrderFixingModel::new(model, inputs_perm, outputs_perm_inv)?;

    let placeholders: Vec<TensorSpec> = permute(inputs.to_vec(), inputs_perm_inv.as_ref())?;
    let outputs = fixer.trace(&placeholders)?;

    info!(
        model = %name,
        inputs = placeholders.len(),
        outputs = outputs.len(),
        "built fixed-order model"
    );

    Ok(FixedModel {
        name,
        inputs: placeholders,
        outputs,
        fixer,
    })
}

/// A model with a declared, externally ordered signature.
///
/// Produced by [`fix_io_order`] or rebuilt from an [`ExportManifest`].
#[derive(Debug)]
pub struct FixedModel<M> {
    name: String,
    inputs: Vec<TensorSpec>,
    outputs: Vec<TensorSpec>,
    fixer: OrderFixingModel<M>,
}

impl<M: Model> FixedModel<M> {
    /// The order-fixing wrapper inside.
    pub fn fixer(&self) -> &OrderFixingModel<M> {
        &self.fixer
    }

    /// Persisted form of this model.
    pub fn manifest(&self) -> ExportManifest {
        ExportManifest {
            name: self.name.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            fixer: self.fixer.config(),
        }
    }

    /// Rebuild a fixed model from its manifest.
    ///
    /// The declared signature stored in the manifest must agree with the
    /// one traced from the rebuilt wrapper.
    pub fn from_manifest<F>(manifest: ExportManifest, resolve: F) -> Result<Self>
    where
        F: FnOnce(&ModelRef) -> Result<M>,
    {
        let fixer = OrderFixingModel::from_config(manifest.fixer, resolve)?;
        check_specs(&manifest.name, fixer.input_specs(), &manifest.inputs)?;
        let outputs = fixer.trace(&manifest.inputs)?;
        if outputs != manifest.outputs {
            return Err(FixerError::signature(format!(
                "{}: manifest outputs do not match the traced outputs",
                manifest.name
            )));
        }
        Ok(Self {
            name: manifest.name,
            inputs: manifest.inputs,
            outputs,
            fixer,
        })
    }
}

impl<M: Model> Model for FixedModel<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_specs(&self) -> &[TensorSpec] {
        &self.inputs
    }

    fn output_specs(&self) -> &[TensorSpec] {
        &self.outputs
    }

    fn call(&self, inputs: Vec<TensorData>) -> Result<Vec<TensorData>> {
        if inputs.len() != self.inputs.len() {
            return Err(FixerError::signature(format!(
                "{} expects {} inputs, got {}",
                self.name,
                self.inputs.len(),
                inputs.len()
            )));
        }
        for (i, (spec, tensor)) in self.inputs.iter().zip(&inputs).enumerate() {
            if !spec.accepts(tensor) {
                return Err(FixerError::signature(format!(
                    "{} input {}: expected {}, got shape {:?}",
                    self.name,
                    i,
                    spec,
                    tensor.shape()
                )));
            }
        }
        self.fixer.call(inputs)
    }

    fn trace(&self, inputs: &[TensorSpec]) -> Result<Vec<TensorSpec>> {
        check_specs(&self.name, &self.inputs, inputs)?;
        self.fixer.trace(inputs)
    }
}

/// Persisted state of a [`FixedModel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportManifest {
    /// Name of the exported model.
    pub name: String,

    /// Declared inputs, in external order.
    pub inputs: Vec<TensorSpec>,

    /// Declared outputs, in external order.
    pub outputs: Vec<TensorSpec>,

    /// Configuration of the order-fixing wrapper.
    pub fixer: OrderFixingConfig,
}

/// Serialization format of a manifest file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManifestFormat {
    Json,
    Yaml,
}

impl ManifestFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(FixerError::config(format!(
                "Unknown manifest format: {}",
                path.display()
            ))),
        }
    }
}

impl ExportManifest {
    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Write to a `.json`, `.yaml` or `.yml` file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = match ManifestFormat::from_path(path)? {
            ManifestFormat::Json => self.to_json_string()?,
            ManifestFormat::Yaml => self.to_yaml_string()?,
        };
        std::fs::write(path, content)?;
        info!(path = %path.display(), "saved manifest");
        Ok(())
    }

    /// Read from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FixerError::FileNotFound(path.to_path_buf()));
        }
        let format = ManifestFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        match format {
            ManifestFormat::Json => Self::from_json_str(&content),
            ManifestFormat::Yaml => Self::from_yaml_str(&content),
        }
    }
}
