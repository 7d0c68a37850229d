//! Cloud provider trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label key stamped on every resource this tool creates
pub const CREATED_BY_LABEL_KEY: &str = "created_by";

/// Label value identifying this tool
pub const CREATED_BY_LABEL_VALUE: &str = "tfboot";

/// Resource labels, ordered for stable request bodies
pub type Labels = BTreeMap<String, String>;

/// The `created_by` label set
pub fn created_by_labels() -> Labels {
    Labels::from([(
        CREATED_BY_LABEL_KEY.to_string(),
        CREATED_BY_LABEL_VALUE.to_string(),
    )])
}

/// Remote resource-management API
///
/// Each method is a single create call; implementations wait for the
/// provider to finish the call but never retry it.
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Returns the provider name (e.g., "yandex-cloud")
    fn name(&self) -> &str;

    /// Create an object storage bucket
    async fn create_bucket(&self, request: &CreateBucketRequest) -> Result<Bucket>;

    /// Create a service account and return its id
    async fn create_service_account(&self, request: &CreateServiceAccountRequest)
    -> Result<String>;

    /// Apply role binding deltas on a folder
    async fn update_access_bindings(&self, request: &UpdateAccessBindingsRequest) -> Result<()>;

    /// Mint a static access key for a service account
    async fn create_access_key(&self, request: &CreateAccessKeyRequest) -> Result<CredentialPair>;

    /// Create a secret with text payload entries and return its id
    async fn create_secret(&self, request: &CreateSecretRequest) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBucketRequest {
    pub name: String,
    pub folder_id: String,
    pub labels: Labels,
}

/// Created bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateServiceAccountRequest {
    pub folder_id: String,
    pub name: String,
    pub description: String,
    pub labels: Labels,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAccessBindingsRequest {
    /// Folder the bindings are applied on
    pub resource_id: String,
    pub deltas: Vec<AccessBindingDelta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessBindingDelta {
    pub action: AccessBindingAction,
    pub role_id: String,
    pub subject: Subject,
}

impl AccessBindingDelta {
    /// Grant `role_id` to a service account
    pub fn add_service_account_role(role_id: impl Into<String>, service_account_id: &str) -> Self {
        Self {
            action: AccessBindingAction::Add,
            role_id: role_id.into(),
            subject: Subject::service_account(service_account_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessBindingAction {
    Add,
}

impl fmt::Display for AccessBindingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessBindingAction::Add => write!(f, "ADD"),
        }
    }
}

/// Principal a role is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    pub subject_type: String,
}

impl Subject {
    pub fn service_account(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject_type: "serviceAccount".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccessKeyRequest {
    pub service_account_id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSecretRequest {
    pub folder_id: String,
    pub name: String,
    pub description: String,
    pub labels: Labels,
    /// Text payload entries, stored in order
    pub entries: Vec<(String, String)>,
}

/// Static access key pair
///
/// The secret half is returned by the provider exactly once; `Debug` never
/// prints it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl CredentialPair {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}
