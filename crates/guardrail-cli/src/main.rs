//! guardrail - CLI entry point.

mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use guardrail_core::{
    enhance_prompt, user_config_path, Config, ResponseValidator, ToolUsageReconciler,
    ValidationContext,
};

/// Cross-check AI assistant responses against what they claim.
#[derive(Parser, Debug)]
#[command(name = "guardrail")]
#[command(about = "Cross-check AI assistant responses against what they claim")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a response through every enabled validation layer
    Validate(ValidateArgs),

    /// Check claimed tool usage against actual invocations
    Tools(ToolsArgs),

    /// Print a prompt, optionally hardened with guardrail requirements
    Prompt(PromptArgs),

    /// Write the default configuration to ~/.claude-guardrail/config.yaml
    Setup,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// File containing the assistant response
    response: PathBuf,

    /// JSON file with user_request, project_root and other context keys
    #[arg(short, long)]
    context: Option<PathBuf>,

    /// YAML or JSON configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project directory to check file references against
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Development server URL, carried through in the context
    #[arg(long)]
    dev_server: Option<String>,

    /// Write the full JSON report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ToolsArgs {
    /// File containing the assistant response
    response: PathBuf,

    /// The user request the response answers
    user_request: String,

    /// YAML or JSON configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PromptArgs {
    prompt: String,

    /// Append guardrail requirements
    #[arg(short, long)]
    enhance: bool,

    /// Template file to reference in the enhanced prompt
    #[arg(short, long)]
    template: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Dispatch a subcommand; `Ok(false)` means the checked response failed.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Validate(args) => run_validate(args, cli.json),
        Commands::Tools(args) => run_tools(args, cli.json),
        Commands::Prompt(args) => run_prompt(args, cli.json),
        Commands::Setup => run_setup(cli.json),
    }
}

fn read_response(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read response file {}", path.display()))
}

fn load_context(path: Option<&Path>) -> Result<ValidationContext> {
    let Some(path) = path else {
        return Ok(ValidationContext::new());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Context file {} is not a valid JSON object", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_validate(args: ValidateArgs, json: bool) -> Result<bool> {
    let response = read_response(&args.response)?;

    let mut context = load_context(args.context.as_deref())?;
    if let Some(root) = args.project_root {
        context.project_root = Some(root);
    }
    if let Some(url) = args.dev_server {
        context.dev_server_url = Some(url);
    }
    debug!(?context, "validation context");

    let validator = ResponseValidator::new(Config::load(args.config.as_deref()));
    let report = validator.validate(&response, &context);

    if let Some(output) = &args.output {
        fs::write(output, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write report to {}", output.display()))?;
    }

    if json {
        print_json(&report)?;
    } else {
        print!("{}", render::run_report(&report));
        if let Some(output) = &args.output {
            println!("\nReport saved to {}", output.display());
        }
    }

    Ok(report.overall_valid)
}

fn run_tools(args: ToolsArgs, json: bool) -> Result<bool> {
    let response = read_response(&args.response)?;

    let config = Config::load(args.config.as_deref());
    let reconciler = ToolUsageReconciler::from_config(&config);
    let report = reconciler.validate_tool_usage(&response, &args.user_request);

    if json {
        print_json(&report)?;
    } else {
        print!("{}", render::tool_report(&report));
    }

    Ok(report.valid)
}

fn run_prompt(args: PromptArgs, json: bool) -> Result<bool> {
    let prompt = if args.enhance {
        enhance_prompt(&args.prompt, args.template.as_deref())
    } else {
        args.prompt
    };

    if json {
        print_json(&serde_json::json!({ "prompt": prompt }))?;
    } else {
        println!("{}", prompt);
    }

    Ok(true)
}

fn run_setup(json: bool) -> Result<bool> {
    let path = user_config_path().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    let created = Config::write_defaults(&path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({ "config_path": path.display().to_string(), "created": created }))?;
    } else {
        if created {
            println!("Config created at {}", path.display());
        } else {
            println!("Config already exists at {}", path.display());
        }
        println!("Setup complete!");
    }

    Ok(true)
}
