use clap::{Parser, ValueEnum};
use mdhttp::{InterpolationMode, JsonPolicy, RunnerConfiguration};
use std::{path::PathBuf, process};
use tracing::error;

/// Runs the `http request` blocks of a markdown document as integration tests
#[derive(Parser)]
#[command(name = "mdhttp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Markdown document containing `http request` blocks
    #[arg(env = "MDHTTP_FILE")]
    file: PathBuf,

    /// Fail a request when a placeholder has no stored value
    #[arg(long)]
    strict: bool,

    /// When to decode response bodies as JSON
    #[arg(long, value_enum, default_value = "content-type")]
    json_policy: JsonPolicyArg,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Seed the store, e.g. --var host=http://localhost:1337
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_variable)]
    variables: Vec<(String, String)>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JsonPolicyArg {
    /// Decode only when content-type mentions json
    ContentType,
    /// Decode every non-empty body
    Always,
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the report on stdout.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut configuration = RunnerConfiguration::new(cli.file);
    if cli.strict {
        configuration.set_interpolation_mode(InterpolationMode::Strict);
    }
    configuration.set_json_policy(match cli.json_policy {
        JsonPolicyArg::ContentType => JsonPolicy::ContentType,
        JsonPolicyArg::Always => JsonPolicy::Always,
    });
    configuration.set_color(!cli.no_color);
    for (key, value) in cli.variables {
        configuration.set_variable(key, value);
    }

    match mdhttp::run_document(configuration).await {
        Ok(summary) if summary.is_success() => {}
        Ok(_) => process::exit(1),
        Err(e) => {
            error!(error = %e, "could not run document");
            eprintln!("mdhttp: {}", e);
            process::exit(2);
        }
    }
}
