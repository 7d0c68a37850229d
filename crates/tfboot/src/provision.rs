use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tfboot_cloud::{
    OutputError, OutputWriter, ProvisionError, Provisioner, ProvisioningOutcome, StateDescriptor,
};
use tfboot_cloud_yandex::{Endpoints, YandexCloud};
use tfboot_config::{ConfigError, DEFAULT_CONFIG_FILE, ProvisioningConfig};
use thiserror::Error;

/// Inputs gathered at the process boundary
pub struct Options {
    pub token: String,
    pub tf_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub step_timeout: Duration,
    pub api_endpoint: Option<String>,
}

/// Fatal errors, one per phase of the run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("environment: {0}")]
    Environment(String),

    #[error("configuration: {0}")]
    Config(ConfigError),

    #[error("provisioning {}{}", .0, left_in_place(.0))]
    Step(ProvisionError),

    #[error(
        "output: {error}; resources were provisioned but are not recorded locally: {}",
        describe(.outcome)
    )]
    Output {
        error: OutputError,
        outcome: ProvisioningOutcome,
    },
}

fn left_in_place(err: &ProvisionError) -> String {
    let resources = err.progress.created_resources();
    if resources.is_empty() {
        String::new()
    } else {
        format!("; left in place: {}", resources.join(", "))
    }
}

fn describe(outcome: &ProvisioningOutcome) -> String {
    let state = StateDescriptor::from(outcome);
    format!(
        "stateBucket={} saId={} lockboxSecretId={}",
        state.state_bucket, state.sa_id, state.lockbox_secret_id
    )
}

pub async fn handle(options: Options) -> Result<(), RunError> {
    if !options.tf_dir.is_dir() {
        return Err(RunError::Environment(format!(
            "TF_DIR {} is not a directory",
            options.tf_dir.display()
        )));
    }

    let config_path = options
        .config
        .unwrap_or_else(|| options.tf_dir.join(DEFAULT_CONFIG_FILE));
    let config = ProvisioningConfig::load(&config_path).map_err(RunError::Config)?;
    tracing::debug!(path = %config_path.display(), "Loaded config");

    let mut cloud = YandexCloud::new(options.token);
    if let Some(endpoint) = options.api_endpoint {
        tracing::debug!(endpoint = %endpoint, "Using API endpoint override");
        cloud = cloud.with_endpoints(Endpoints::single(endpoint));
    }

    let resources = Provisioner::new(&cloud, &config)
        .with_step_timeout(options.step_timeout)
        .run()
        .await
        .map_err(RunError::Step)?;

    let written = OutputWriter::new(&options.tf_dir)
        .write(
            &resources.outcome,
            &resources.credentials,
            &mut std::io::stdout().lock(),
        )
        .map_err(|error| RunError::Output {
            error,
            outcome: resources.outcome.clone(),
        })?;

    println!();
    println!("{}", "✓ Terraform state backend provisioned".green());
    println!(
        "  state bucket: {}",
        resources.outcome.bucket.bucket_name.cyan()
    );
    println!("  • {}", written.state_path.display().to_string().cyan());
    println!(
        "  • {} {}",
        written.access_key_path.display().to_string().cyan(),
        "(secret, do not commit)".yellow()
    );

    Ok(())
}
