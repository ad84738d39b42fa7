//! CLI for Image Studio - AI image editing and product shots.

use clap::{Args, Parser, Subcommand, ValueEnum};
use image_studio::{image, GeminiModel, Mode, Studio, StudioConfig, SubmitOutcome};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "image-studio")]
#[command(about = "AI-powered image editing and product photography via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Also print the result as a data URL
    #[arg(long, global = true)]
    data_url: bool,

    /// Gemini model to use
    #[arg(long, value_enum, global = true)]
    model: Option<ModelArg>,

    /// Gemini API key (falls back to GEMINI_API_KEY / GOOGLE_API_KEY)
    #[arg(long, global = true, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit an image with a text instruction
    Edit(EditArgs),

    /// Turn a clothing photo into an e-commerce product shot
    ProductShot(ProductShotArgs),

    /// Print the fixed product-shot instruction
    Prompt,
}

#[derive(Args)]
struct EditArgs {
    /// Input image (PNG, JPG or WEBP, up to 10MB)
    input: PathBuf,

    /// Editing instruction, e.g. "Add a retro filter"
    #[arg(short, long)]
    prompt: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct ProductShotArgs {
    /// Input clothing photo (PNG, JPG or WEBP, up to 10MB)
    input: PathBuf,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    /// Gemini 2.5 Flash Image
    Flash,
    /// Gemini 3 Pro Image
    Pro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => GeminiModel::FlashImage,
            ModelArg::Pro => GeminiModel::ProImage,
        }
    }
}

struct Job {
    mode: Mode,
    input: PathBuf,
    instruction: Option<String>,
    output: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = ?e, "execution failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "image_studio=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let job = match cli.command {
        Commands::Prompt => {
            let config = StudioConfig::default();
            if cli.json {
                let result = serde_json::json!({ "product_shot_prompt": config.product_shot_prompt });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", config.product_shot_prompt);
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Edit(args) => Job {
            mode: Mode::Edit,
            input: args.input,
            instruction: Some(args.prompt),
            output: args.output,
        },
        Commands::ProductShot(args) => Job {
            mode: Mode::ProductShot,
            input: args.input,
            instruction: None,
            output: args.output,
        },
    };

    let mut config = StudioConfig::from_env()?;
    if let Some(key) = cli.api_key {
        config = config.with_api_key(key);
    }
    if let Some(model) = cli.model {
        config = config.with_model(model.into());
    }

    transform(config, job, cli.json, cli.data_url).await
}

async fn transform(
    config: StudioConfig,
    job: Job,
    json_output: bool,
    data_url: bool,
) -> anyhow::Result<ExitCode> {
    let model = config.model;
    let studio = Studio::from_config(config);

    match image::read_file(&job.input) {
        Ok(encoded) => {
            // A refused upload is recorded in the state and reported below.
            let _ = studio.upload(encoded);
        }
        Err(e) => studio.upload_failed(&e),
    }

    studio.set_mode(job.mode);
    if let Some(instruction) = job.instruction {
        studio.set_instruction(instruction);
    }

    let started = std::time::Instant::now();
    let upload_accepted = studio.snapshot().error_message().is_none();
    let outcome = if upload_accepted {
        studio.submit().await
    } else {
        SubmitOutcome::Rejected
    };
    let duration_ms = started.elapsed().as_millis() as u64;

    let state = studio.snapshot();
    let saved = match (outcome, state.result_image()) {
        (SubmitOutcome::Succeeded, Some(result)) => Some((result, result.save(&job.output)?)),
        _ => None,
    };

    if json_output {
        let result = serde_json::json!({
            "success": saved.is_some(),
            "mode": job.mode,
            "phase": state.phase(),
            "input": job.input.display().to_string(),
            "output": saved.as_ref().map(|_| job.output.display().to_string()),
            "size_bytes": saved.as_ref().map(|(_, size)| *size),
            "detected_format": saved.as_ref().and_then(|(image, _)| image.detected_format()),
            "model": model.as_str(),
            "duration_ms": duration_ms,
            "data_url": saved.as_ref().filter(|_| data_url).map(|(image, _)| image.to_data_url()),
            "error": state.error_message(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some((image, size)) = &saved {
        println!(
            "{}: {} ({} bytes) via {}",
            job.mode.label(),
            job.output.display(),
            size,
            model
        );
        if let Some(format) = image.detected_format() {
            println!("Format: {format}");
        }
        println!("Duration: {}ms", duration_ms);
        if data_url {
            println!("{}", image.to_data_url());
        }
    } else if let Some(message) = state.error_message() {
        eprintln!("{message}");
    }

    Ok(if saved.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
