//! AgriSmart command line.
//!
//! ```text
//! agrismart advise --soil-type clay --ph 6.5 --nitrogen 45 --phosphorus 20 \
//!     --potassium 30 --location Eldoret --image leaf.png
//! agrismart submit farm.yaml --format json
//! agrismart forecast Eldoret
//! agrismart crops
//! ```

mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use agrismart_core::{
    ForecastProvider, MockForecastProvider, RawSoilInput, Submission, UploadedImage,
};
use agrismart_runtime::{AdviceError, AdviceOrchestrator, AdviceRequest, RuntimeConfig};

/// Exit status for a rejected submission.
const EXIT_REJECTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "agrismart",
    version,
    about = "Crop, disease and weather advice for small farms"
)]
struct Cli {
    /// Runtime configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for the mock forecast generator
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Advise on soil measurements given as flags
    Advise(AdviseArgs),

    /// Advise on a YAML or JSON submission document
    Submit {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the 7-day forecast for a location
    Forecast {
        location: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the crop decision table
    Crops {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Form fields are taken as text so the validator reports every problem.
#[derive(clap::Args, Debug)]
struct AdviseArgs {
    /// loamy, sandy or clay
    #[arg(long)]
    soil_type: Option<String>,

    #[arg(long)]
    ph: Option<String>,

    /// Nitrogen level (N)
    #[arg(long)]
    nitrogen: Option<String>,

    /// Phosphorus level (P)
    #[arg(long)]
    phosphorus: Option<String>,

    /// Potassium level (K)
    #[arg(long)]
    potassium: Option<String>,

    #[arg(long)]
    location: Option<String>,

    /// Crop image (jpeg, jpg or png)
    #[arg(long)]
    image: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl AdviseArgs {
    fn raw_input(&self) -> RawSoilInput {
        RawSoilInput {
            soil_type: self.soil_type.clone().map(Into::into),
            ph: self.ph.clone().map(Into::into),
            nitrogen: self.nitrogen.clone().map(Into::into),
            phosphorus: self.phosphorus.clone().map(Into::into),
            potassium: self.potassium.clone().map(Into::into),
            location: self.location.clone().map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = RuntimeConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(seed) = cli.seed {
        config.forecast.seed = Some(seed);
    }
    tracing::debug!(config = ?config, "Loaded configuration");

    match cli.command {
        Command::Advise(args) => {
            let image = args.image.as_deref().map(read_image).transpose()?;
            let request = AdviceRequest {
                input: args.raw_input(),
                image,
            };
            advise(config, &request, args.format)
        }
        Command::Submit { file, format } => {
            let submission = Submission::from_file(&file)
                .with_context(|| format!("Failed to load submission {}", file.display()))?;
            let base_dir = file.parent().unwrap_or_else(|| Path::new("."));
            let image = submission.load_image(base_dir)?;
            let request = AdviceRequest {
                input: submission.soil,
                image,
            };
            advise(config, &request, format)
        }
        Command::Forecast { location, format } => {
            let location = location.trim();
            if location.is_empty() {
                bail!("location must not be empty");
            }

            let provider = match config.forecast.seed {
                Some(seed) => MockForecastProvider::seeded(seed),
                None => MockForecastProvider::from_entropy(),
            };
            let forecast = provider.forecast(location);

            match format {
                OutputFormat::Text => print!("{}", render::forecast_text(&forecast)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&forecast)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Crops { format } => {
            match format {
                OutputFormat::Text => print!("{}", render::crop_table_text()),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&agrismart_core::CROP_RULES)?)
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "agrismart=debug" } else { "agrismart=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_image(path: &Path) -> Result<UploadedImage> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(UploadedImage::new(filename, bytes))
}

fn advise(config: RuntimeConfig, request: &AdviceRequest, format: OutputFormat) -> Result<ExitCode> {
    fs::create_dir_all(&config.upload.dir).with_context(|| {
        format!("Failed to create upload directory {}", config.upload.dir.display())
    })?;

    let orchestrator = AdviceOrchestrator::builder(config).build();

    match orchestrator.advise(request) {
        Ok(report) => {
            match format {
                OutputFormat::Text => print!("{}", render::report_text(&report)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(AdviceError::Rejected(errors)) => {
            match format {
                OutputFormat::Text => eprint!("{}", render::rejection_text(&errors)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&errors)?),
            }
            Ok(ExitCode::from(EXIT_REJECTED))
        }
    }
}
