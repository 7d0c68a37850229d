//! Provisioning workflow
//!
//! Five remote calls run in a fixed order, each one feeding the next:
//!
//! ```text
//! create-bucket ─▶ create-service-account ─▶ grant-roles ─▶ mint-access-key ─▶ store-secret
//! ```
//!
//! The first failing step ends the run. Resources created by earlier steps
//! stay in the cloud; the error carries a [`Progress`] record listing them.

use crate::error::CloudError;
use crate::naming;
use crate::provider::{
    AccessBindingDelta, CloudApi, CreateAccessKeyRequest, CreateBucketRequest,
    CreateSecretRequest, CreateServiceAccountRequest, CredentialPair,
    UpdateAccessBindingsRequest, created_by_labels,
};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tfboot_config::ProvisioningConfig;
use thiserror::Error;

/// Deadline applied to every step unless overridden
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(10);

/// Roles granted to the state manager on the folder
pub const STORAGE_ROLES: [&str; 2] = ["storage.viewer", "storage.uploader"];

/// Secret entry holding the access key id
pub const SECRET_KEY_ACCESS_KEY_ID: &str = "access_key_id";

/// Secret entry holding the secret access key
pub const SECRET_KEY_SECRET_ACCESS_KEY: &str = "secret_access_key";

/// A provisioning step, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    CreateBucket,
    CreateServiceAccount,
    GrantRoles,
    MintAccessKey,
    StoreSecret,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::CreateBucket,
        Step::CreateServiceAccount,
        Step::GrantRoles,
        Step::MintAccessKey,
        Step::StoreSecret,
    ];

    /// 1-based position in the workflow
    pub fn number(self) -> usize {
        match self {
            Step::CreateBucket => 1,
            Step::CreateServiceAccount => 2,
            Step::GrantRoles => 3,
            Step::MintAccessKey => 4,
            Step::StoreSecret => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::CreateBucket => "create-bucket",
            Step::CreateServiceAccount => "create-service-account",
            Step::GrantRoles => "grant-roles",
            Step::MintAccessKey => "mint-access-key",
            Step::StoreSecret => "store-secret",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket created by step 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketResult {
    pub bucket_name: String,
}

/// Service account created by step 2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub service_account_id: String,
}

/// Secret created by step 5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub lockbox_secret_id: String,
}

/// Non-secret result of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningOutcome {
    pub bucket: BucketResult,
    pub service_account: ServiceIdentity,
    pub secret: SecretRecord,
}

/// Everything a completed run hands to the output writer
#[derive(Debug, Clone)]
pub struct ProvisionedResources {
    pub outcome: ProvisioningOutcome,
    pub credentials: CredentialPair,
}

/// Remote resources created so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub bucket_name: Option<String>,
    pub service_account_id: Option<String>,
    pub roles_granted: bool,
    pub access_key_id: Option<String>,
}

impl Progress {
    /// Human-readable list of what exists remotely
    pub fn created_resources(&self) -> Vec<String> {
        let mut resources = Vec::new();
        if let Some(name) = &self.bucket_name {
            resources.push(format!("bucket {}", name));
        }
        if let Some(id) = &self.service_account_id {
            resources.push(format!("service account {}", id));
        }
        if self.roles_granted {
            resources.push(format!("role bindings {}", STORAGE_ROLES.join(", ")));
        }
        if let Some(id) = &self.access_key_id {
            resources.push(format!("access key {}", id));
        }
        resources
    }

    pub fn is_empty(&self) -> bool {
        self.created_resources().is_empty()
    }
}

/// A step failed; the run stopped there
#[derive(Error, Debug)]
#[error("step {} ({step}) failed: {context}: {source}", .step.number())]
pub struct ProvisionError {
    pub step: Step,
    pub context: String,
    /// Resources left behind by earlier steps
    pub progress: Progress,
    #[source]
    pub source: CloudError,
}

/// Runs the provisioning steps against a [`CloudApi`]
pub struct Provisioner<'a> {
    api: &'a dyn CloudApi,
    config: &'a ProvisioningConfig,
    step_timeout: Duration,
}

impl<'a> Provisioner<'a> {
    pub fn new(api: &'a dyn CloudApi, config: &'a ProvisioningConfig) -> Self {
        Self {
            api,
            config,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    pub fn with_step_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Run all steps in order, stopping at the first failure
    pub async fn run(&self) -> Result<ProvisionedResources, ProvisionError> {
        let mut progress = Progress::default();
        let name = &self.config.name;
        let folder_id = &self.config.folder_id;
        let sa_name = naming::service_account_name(name);

        tracing::info!(
            provider = self.api.name(),
            name = %name,
            folder_id = %folder_id,
            "Provisioning Terraform state backend"
        );

        // 1. bucket
        let bucket_name = naming::bucket_name(name, &naming::random_suffix());
        let request = CreateBucketRequest {
            name: bucket_name.clone(),
            folder_id: folder_id.clone(),
            labels: created_by_labels(),
        };
        let bucket = self
            .guarded(
                Step::CreateBucket,
                &progress,
                format!("failed to create bucket \"{}\"", bucket_name),
                self.api.create_bucket(&request),
            )
            .await?;
        let bucket = BucketResult {
            bucket_name: bucket.name,
        };
        tracing::info!(name = %bucket.bucket_name, "Created bucket");
        progress.bucket_name = Some(bucket.bucket_name.clone());

        // 2. service account
        let request = CreateServiceAccountRequest {
            folder_id: folder_id.clone(),
            name: sa_name.clone(),
            description: format!(
                "\"{}\" SA created for uploading terraform state to bucket",
                name
            ),
            labels: created_by_labels(),
        };
        let service_account_id = self
            .guarded(
                Step::CreateServiceAccount,
                &progress,
                format!("failed to create service account \"{}\"", sa_name),
                self.api.create_service_account(&request),
            )
            .await?;
        let service_account = ServiceIdentity { service_account_id };
        tracing::info!(
            id = %service_account.service_account_id,
            name = %sa_name,
            "Created service account for Terraform state bucket management"
        );
        progress.service_account_id = Some(service_account.service_account_id.clone());

        // 3. roles
        let request = UpdateAccessBindingsRequest {
            resource_id: folder_id.clone(),
            deltas: STORAGE_ROLES
                .iter()
                .map(|role| {
                    AccessBindingDelta::add_service_account_role(
                        *role,
                        &service_account.service_account_id,
                    )
                })
                .collect(),
        };
        self.guarded(
            Step::GrantRoles,
            &progress,
            format!(
                "failed to assign {} roles to service account \"{}\" ({}) on folder \"{}\"",
                STORAGE_ROLES.join(", "),
                sa_name,
                service_account.service_account_id,
                folder_id
            ),
            self.api.update_access_bindings(&request),
        )
        .await?;
        tracing::info!(
            service_account = %sa_name,
            folder_id = %folder_id,
            roles = %STORAGE_ROLES.join(","),
            "Assigned storage roles"
        );
        progress.roles_granted = true;

        // 4. access key
        let request = CreateAccessKeyRequest {
            service_account_id: service_account.service_account_id.clone(),
            description: format!(
                "access key for sa \"{}\" to manage Terraform state bucket",
                sa_name
            ),
        };
        let credentials = self
            .guarded(
                Step::MintAccessKey,
                &progress,
                format!("failed to create access key for \"{}\"", sa_name),
                self.api.create_access_key(&request),
            )
            .await?;
        tracing::info!(
            access_key_id = %credentials.access_key_id,
            "Created access key for service account"
        );
        progress.access_key_id = Some(credentials.access_key_id.clone());

        // 5. secret
        let secret_name = naming::secret_name(name);
        let request = CreateSecretRequest {
            folder_id: folder_id.clone(),
            name: secret_name.clone(),
            description: format!("{} service account AWS access key", sa_name),
            labels: created_by_labels(),
            entries: vec![
                (
                    SECRET_KEY_ACCESS_KEY_ID.to_string(),
                    credentials.access_key_id.clone(),
                ),
                (
                    SECRET_KEY_SECRET_ACCESS_KEY.to_string(),
                    credentials.secret_access_key.clone(),
                ),
            ],
        };
        let lockbox_secret_id = self
            .guarded(
                Step::StoreSecret,
                &progress,
                format!("failed to create lockbox secret \"{}\"", secret_name),
                self.api.create_secret(&request),
            )
            .await?;
        let secret = SecretRecord { lockbox_secret_id };
        tracing::info!(
            id = %secret.lockbox_secret_id,
            name = %secret_name,
            "Created lockbox secret for access key"
        );

        Ok(ProvisionedResources {
            outcome: ProvisioningOutcome {
                bucket,
                service_account,
                secret,
            },
            credentials,
        })
    }

    /// Await a remote call under the step deadline
    async fn guarded<T, F>(
        &self,
        step: Step,
        progress: &Progress,
        context: String,
        call: F,
    ) -> Result<T, ProvisionError>
    where
        F: Future<Output = crate::Result<T>>,
    {
        tracing::debug!(step = %step, number = step.number(), "Running step");

        let result = match tokio::time::timeout(self.step_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CloudError::Timeout(self.step_timeout)),
        };

        result.map_err(|source| ProvisionError {
            step,
            context,
            progress: progress.clone(),
            source,
        })
    }
}
