//! CLI entry point for iofix-rs.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use iofix_rs::cli::{Cli, Commands};
use iofix_rs::config::Config;
use iofix_rs::inference::{
    fix_io_order, ConcatConvModel, ExportManifest, FixedModel, Model, TensorSpec,
};
use iofix_rs::input::InputFile;
use iofix_rs::permutation::Permutation;

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_yaml_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn build_fixed(
    config: &Config,
    inputs_perm: Option<Permutation>,
    outputs_perm: Option<Permutation>,
) -> Result<FixedModel<ConcatConvModel>> {
    let model = config.model.build().context("Failed to build model")?;
    info!("Model: {}", model.name());

    let specs = model.input_specs().to_vec();
    let fixed = fix_io_order(model, &specs, inputs_perm, outputs_perm)
        .context("Failed to fix input/output order")?;
    Ok(fixed)
}

fn print_shapes(inputs: &[TensorSpec], outputs: &[TensorSpec]) {
    let fmt = |specs: &[TensorSpec]| {
        specs
            .iter()
            .map(|s| format!("{:?}", s.shape_i64()))
            .collect::<Vec<_>>()
            .join(" ")
    };
    println!("Input shapes: {}", fmt(inputs));
    println!("Output shapes: {}", fmt(outputs));
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    match cli.command {
        Commands::Fix {
            config,
            inputs_perm,
            outputs_perm,
            export,
        } => {
            let config = load_config(config.as_deref())?;
            let inputs_perm = inputs_perm.or(config.fixer.inputs_perm.clone());
            let outputs_perm = outputs_perm.or(config.fixer.outputs_perm.clone());

            let fixed = build_fixed(&config, inputs_perm, outputs_perm)?;
            if let Some(perm) = fixed.fixer().input_perm() {
                println!("Input permutation: {}", perm);
            }
            if let Some(perm) = fixed.fixer().output_perm() {
                println!("Output permutation: {}", perm);
            }
            print_shapes(fixed.input_specs(), fixed.output_specs());

            if let Some(path) = export {
                fixed
                    .manifest()
                    .save(&path)
                    .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
                println!("Manifest: {}", path.display());
            }
        }

        Commands::Infer {
            config,
            input,
            format,
        } => {
            let config = load_config(config.as_deref())?;
            let fixed = build_fixed(
                &config,
                config.fixer.inputs_perm.clone(),
                config.fixer.outputs_perm.clone(),
            )?;

            info!("Loading input: {}", input.display());
            let tensors = InputFile::from_json_file(&input)
                .and_then(InputFile::into_tensors)
                .with_context(|| format!("Failed to load input: {}", input.display()))?;

            info!("Running inference...");
            let outputs = fixed.call(tensors)?;
            info!("Inference complete: {} outputs", outputs.len());

            let output = serde_json::json!({
                "num_outputs": outputs.len(),
                "outputs": outputs.iter().zip(fixed.output_specs()).enumerate().map(|(i, (t, spec))| {
                    serde_json::json!({
                        "index": i,
                        "name": spec.name,
                        "shape": t.shape(),
                        "numel": t.len(),
                    })
                }).collect::<Vec<_>>()
            });

            if format == "pretty" {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", serde_json::to_string(&output)?);
            }
        }

        Commands::Inspect { manifest } => {
            let manifest = ExportManifest::load(&manifest)
                .with_context(|| format!("Failed to load manifest: {}", manifest.display()))?;

            println!("iofix-rs v{}", env!("CARGO_PKG_VERSION"));
            println!("Model: {}", manifest.name);
            println!("Nested: {}", manifest.fixer.nested.name);
            if let Some(perm) = &manifest.fixer.input_perm {
                println!("Input permutation: {}", perm);
            }
            if let Some(perm) = &manifest.fixer.output_perm {
                println!("Output permutation: {}", perm);
            }
            print_shapes(&manifest.inputs, &manifest.outputs);
        }
    }

    Ok(())
}
