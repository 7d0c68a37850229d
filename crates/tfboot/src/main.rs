mod provision;

use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "tfboot", version)]
#[command(
    about = "Bootstrap a Terraform remote-state backend on Yandex Cloud",
    long_about = None
)]
struct Cli {
    /// IAM token for the Yandex Cloud API
    #[arg(
        long,
        env = "YC_TOKEN",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    token: String,

    /// Terraform directory: holds config.yaml and receives the artifacts
    #[arg(long, env = "TF_DIR")]
    tf_dir: PathBuf,

    /// Config file (default: <TF_DIR>/config.yaml)
    #[arg(short, long, env = "TFBOOT_CONFIG")]
    config: Option<PathBuf>,

    /// Deadline for each provisioning step, in seconds
    #[arg(
        long,
        env = "TFBOOT_STEP_TIMEOUT",
        default_value_t = tfboot_cloud::DEFAULT_STEP_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    step_timeout: u64,

    /// Send every API call to this base URL instead of the public endpoints
    #[arg(long, env = "YC_API_ENDPOINT")]
    api_endpoint: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries the credential echo; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = provision::Options {
        token: cli.token,
        tf_dir: cli.tf_dir,
        config: cli.config,
        step_timeout: Duration::from_secs(cli.step_timeout),
        api_endpoint: cli.api_endpoint,
    };

    if let Err(e) = provision::handle(options).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
