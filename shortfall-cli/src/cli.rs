use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use shortfall_core::{
    Config, EstimatorKind, load_model, make_prediction, predict_batch, preprocess_batch,
    estimator::read_model_document,
    schema::{FEATURE_COLUMNS, FEATURE_COUNT, RAW_COLUMNS},
};
use tracing::{info, warn};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "shortfall", version, about = "Spanish energy load shortfall predictor")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of the per-user one.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the default model file.
    Configure {
        /// Model file; prompts when omitted.
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Predict the load shortfall for a JSON payload (object or array of objects).
    Predict {
        /// Model file; defaults to the configured one.
        #[arg(long)]
        model: Option<PathBuf>,

        /// Payload file; reads stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Fail unless the model is of this kind (linear, forest).
        #[arg(long, value_parser = parse_kind)]
        kind: Option<EstimatorKind>,
    },

    /// Print the feature table the model would receive.
    Features {
        /// Payload file; reads stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Describe a model file.
    Inspect {
        /// Model file; defaults to the configured one.
        #[arg(long)]
        model: Option<PathBuf>,

        /// Fail unless the model is of this kind (linear, forest).
        #[arg(long, value_parser = parse_kind)]
        kind: Option<EstimatorKind>,
    },

    /// List the payload columns and the model input columns.
    Columns,
}

impl Cli {
    /// Run the command against `config`, which was loaded from `config_path`.
    pub fn run(self, config: &mut Config, config_path: &Path, out: &mut impl Write) -> Result<()> {
        match self.command {
            Command::Configure { model } => {
                let path = match model {
                    Some(path) => path,
                    None => inquire::Text::new("Path to the trained model file:")
                        .prompt()
                        .context("Failed to read model path")?
                        .into(),
                };

                // Refuse to store a path that would fail on the next prediction.
                load_model(&path)
                    .with_context(|| format!("Cannot use {} as a model", path.display()))?;

                config.set_model_path(fs::canonicalize(&path).unwrap_or(path));
                config.save_to(config_path)?;

                writeln!(out, "Saved model path to {}", config_path.display())?;
            }
            Command::Predict { model, input, kind } => {
                let path = config.resolve_model_path(model.as_deref())?;
                let model = load_model(&path)?;
                ensure_kind(kind, model.kind())?;
                let payload = read_input(input.as_deref())?;

                let prediction = if payload.trim_start().starts_with('[') {
                    predict_batch(&payload, model.as_ref())?
                } else {
                    make_prediction(&payload, model.as_ref())?
                };
                info!(count = prediction.len(), "prediction finished");

                writeln!(out, "{}", serde_json::to_string(&prediction)?)?;
            }
            Command::Features { input } => {
                let payload = read_input(input.as_deref())?;
                let table = preprocess_batch(&payload)?;

                writeln!(out, "{}", serde_json::to_string_pretty(&table)?)?;
            }
            Command::Inspect { model, kind } => {
                let path = config.resolve_model_path(model.as_deref())?;
                let document = read_model_document(&path)?;
                ensure_kind(kind, document.kind())?;
                let regressor = document.into_regressor();

                writeln!(out, "model:    {}", path.display())?;
                writeln!(out, "kind:     {}", regressor.kind())?;
                writeln!(out, "features: {}", regressor.n_features())?;
                if let Some(names) = regressor.feature_names() {
                    writeln!(out, "names:    {}", names.join(", "))?;
                }

                if regressor.n_features() != FEATURE_COUNT {
                    warn!(
                        expected = FEATURE_COUNT,
                        found = regressor.n_features(),
                        "model width differs from the preprocessor output"
                    );
                    writeln!(
                        out,
                        "warning:  preprocessing produces {FEATURE_COUNT} features; this model expects {}",
                        regressor.n_features()
                    )?;
                }
            }
            Command::Columns => {
                writeln!(out, "payload columns ({}):", RAW_COLUMNS.len())?;
                for name in RAW_COLUMNS {
                    writeln!(out, "  {name}")?;
                }
                writeln!(out, "model input columns ({FEATURE_COUNT}):")?;
                for name in FEATURE_COLUMNS {
                    writeln!(out, "  {name}")?;
                }
            }
        }

        Ok(())
    }
}

fn parse_kind(value: &str) -> Result<EstimatorKind> {
    EstimatorKind::try_from(value)
}

fn ensure_kind(expected: Option<EstimatorKind>, found: EstimatorKind) -> Result<()> {
    match expected {
        Some(expected) if expected != found => {
            bail!("Model is a {found} estimator, but --kind asked for {expected}")
        }
        _ => Ok(()),
    }
}

/// Payload from a file, or stdin when no file is given.
fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file: {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read payload from stdin")?;
            Ok(buf)
        }
    }
}
