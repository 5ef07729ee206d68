//! Configuration types for iofix-rs.

use serde::Deserialize;

use crate::inference::ConcatConvModel;
use crate::permutation::Permutation;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Demo model configuration.
    #[serde(default)]
    pub model: ModelConfig,

    /// Input/output order configuration.
    #[serde(default)]
    pub fixer: FixerConfig,
}

/// Demo model configuration.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// Model name, recorded in exported manifests.
    #[serde(default = "default_name")]
    pub name: String,

    /// Feature map height.
    #[serde(default = "default_spatial")]
    pub height: usize,

    /// Feature map width.
    #[serde(default = "default_spatial")]
    pub width: usize,

    /// Channels of each input, in native order.
    #[serde(default = "default_input_channels")]
    pub input_channels: Vec<usize>,

    /// Channels of each output head, in native order.
    #[serde(default = "default_head_channels")]
    pub head_channels: Vec<usize>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            height: default_spatial(),
            width: default_spatial(),
            input_channels: default_input_channels(),
            head_channels: default_head_channels(),
        }
    }
}

impl ModelConfig {
    /// Build the configured model.
    pub fn build(&self) -> crate::error::Result<ConcatConvModel> {
        ConcatConvModel::new(
            self.name.clone(),
            self.height,
            self.width,
            &self.input_channels,
            &self.head_channels,
        )
    }
}

/// Input/output order configuration.
///
/// `inputs_perm[i]` is the external position of native input `i`, and
/// likewise for outputs. A missing entry keeps the native order.
#[derive(Debug, Default, Deserialize)]
pub struct FixerConfig {
    /// Input permutation.
    #[serde(default)]
    pub inputs_perm: Option<Permutation>,

    /// Output permutation.
    #[serde(default)]
    pub outputs_perm: Option<Permutation>,
}

fn default_name() -> String {
    "concat_conv".to_string()
}

fn default_spatial() -> usize {
    3
}

fn default_input_channels() -> Vec<usize> {
    vec![4, 8, 16, 32]
}

fn default_head_channels() -> Vec<usize> {
    vec![4, 8, 16]
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> crate::error::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FixerError;
    use crate::inference::Model;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.model.name, "concat_conv");
        assert_eq!(config.model.input_channels, vec![4, 8, 16, 32]);
        assert!(config.fixer.inputs_perm.is_none());
        assert!(config.fixer.outputs_perm.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
model:
  name: tiny
  height: 2
  width: 5
  input_channels: [1, 2]
  head_channels: [3]
fixer:
  inputs_perm: [1, 0]
  outputs_perm: [0]
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.model.height, 2);
        assert_eq!(config.model.width, 5);
        assert_eq!(
            config.fixer.inputs_perm.as_ref().map(|p| p.as_slice()),
            Some(&[1, 0][..])
        );

        let model = config.model.build().unwrap();
        assert_eq!(model.input_specs().len(), 2);
    }

    #[test]
    fn test_invalid_permutation_rejected() {
        let yaml = "fixer:\n  inputs_perm: [0, 2]\n";
        let err = Config::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, FixerError::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_yaml_file("/nonexistent/iofix.yaml").unwrap_err();
        assert!(matches!(err, FixerError::Io(_)));
    }
}
