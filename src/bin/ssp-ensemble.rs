use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ssp_ensemble::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ssp-ensemble")]
#[command(about = "Generate GCAM scenario configurations across SSP/RCP ensembles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one configuration file per scenario
    Generate {
        #[command(flatten)]
        input: InputArgs,

        /// `sample` for an evenly spread subset, `full` for every scenario
        #[arg(long, default_value = "sample")]
        mode: RunMode,

        /// Output directory, overriding the configured one for the mode
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also export the run summary as CSV
        #[arg(long)]
        summary_csv: Option<PathBuf>,

        /// Stop at the first failing scenario
        #[arg(long)]
        abort_on_error: bool,
    },
    /// Print the number of scenarios in the parameter space
    Count {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print every output filename in generation order
    List {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// JSON generator configuration; GCAM defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Restrict the run to these SSPs (e.g. `--ssp SSP1 --ssp 3`)
    #[arg(long = "ssp")]
    ssps: Vec<Ssp>,
}

impl InputArgs {
    fn load(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => GeneratorConfig::default(),
        };
        if !self.ssps.is_empty() {
            config.space = config.space.with_ssps(&self.ssps);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Output filenames in generation order
fn file_names(config: &GeneratorConfig) -> impl Iterator<Item = String> + '_ {
    config.space.iter().map(|params| params.file_name())
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ssp_ensemble=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Count { input } => {
            let config = input.load()?;
            println!("{}", config.space.total());
        }
        Command::List { input } => {
            let config = input.load()?;
            for name in file_names(&config) {
                println!("{}", name);
            }
        }
        Command::Generate {
            input,
            mode,
            output,
            summary_csv,
            abort_on_error,
        } => {
            let mut config = input.load()?;
            if abort_on_error {
                config.on_error = ErrorPolicy::Abort;
            }
            let dir = output.unwrap_or_else(|| config.output_dir(mode).to_path_buf());

            let ensemble = Ensemble::load(config).context("loading template and SSP files")?;
            let tuples = ensemble.tuples(mode);
            let summary = ensemble
                .generate(&tuples, &dir)
                .with_context(|| format!("generating into {}", dir.display()))?;

            print!("{}", summary.report());
            if let Some(path) = summary_csv {
                summary
                    .write_csv(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
            }

            if !summary.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_count_with_ssp_filter() {
        let cli =
            Cli::try_parse_from(["ssp-ensemble", "count", "--ssp", "SSP1", "--ssp", "3"]).unwrap();
        let Command::Count { input } = cli.command else {
            panic!("expected count, got {:?}", cli.command);
        };
        assert_eq!(input.ssps, vec![Ssp::SSP1, Ssp::SSP3]);
        assert_eq!(input.load().unwrap().space.total(), 320);
    }

    #[test]
    fn test_list_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ensemble.json");
        std::fs::write(
            &path,
            r#"{ "space": { "ssps": ["SSP2"], "rcps": ["4p5"], "rates": [0] } }"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "ssp-ensemble",
            "list",
            "--config",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let Command::List { input } = cli.command else {
            panic!("expected list, got {:?}", cli.command);
        };
        let config = input.load().unwrap();
        let names: Vec<String> = file_names(&config).collect();
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], "SSP2_4p5_Basic_L_Mkt_PR0.xml");
        assert_eq!(names[7], "SSP2_4p5_Tech_H_Reg_PR0.xml");
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "ssp-ensemble",
            "generate",
            "--mode",
            "full",
            "--output",
            "out",
            "--abort-on-error",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                mode,
                output,
                summary_csv,
                abort_on_error,
                ..
            } => {
                assert_eq!(mode, RunMode::Full);
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(summary_csv.is_none());
                assert!(abort_on_error);
            }
            other => panic!("expected generate, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["ssp-ensemble", "count", "--ssp", "SSP0"]).is_err());
        assert!(Cli::try_parse_from(["ssp-ensemble", "generate", "--mode", "partial"]).is_err());
    }
}
