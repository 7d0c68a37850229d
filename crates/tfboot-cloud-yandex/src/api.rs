//! Yandex Cloud REST wire types

use crate::error::{Result, YandexError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tfboot_cloud::Labels;

// ============ Operations ============

/// Long-running operation returned by most create calls
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Operation {
    pub id: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<Status>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl Operation {
    /// Fail if the operation finished with an error
    pub fn check(self) -> Result<Self> {
        match self.error {
            Some(status) => Err(YandexError::OperationFailed {
                id: self.id,
                code: status.code,
                message: status.message,
            }),
            None => Ok(self),
        }
    }

    pub fn metadata<T: DeserializeOwned>(&self) -> Result<T> {
        let metadata = self.metadata.clone().ok_or_else(|| {
            YandexError::InvalidResponse(format!("operation {} has no metadata", self.id))
        })?;
        Ok(serde_json::from_value(metadata)?)
    }

    pub fn response<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.response {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }
}

/// Error body of a non-2xx response
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[allow(dead_code)]
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

// ============ Object Storage ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBucketBody<'a> {
    pub name: &'a str,
    pub folder_id: &'a str,
    pub tags: Vec<Tag<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Tag<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

impl<'a> Tag<'a> {
    pub fn from_labels(labels: &'a Labels) -> Vec<Self> {
        labels
            .iter()
            .map(|(key, value)| Tag {
                key: key.as_str(),
                value: value.as_str(),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BucketResponse {
    pub name: String,
}

// ============ IAM ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateServiceAccountBody<'a> {
    pub folder_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub labels: &'a Labels,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateServiceAccountMetadata {
    pub service_account_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAccessKeyBody<'a> {
    pub service_account_id: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAccessKeyResponse {
    pub access_key: AccessKey,
    pub secret: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessKey {
    pub key_id: String,
}

// ============ Resource Manager ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateAccessBindingsBody<'a> {
    pub access_binding_deltas: Vec<AccessBindingDeltaBody<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessBindingDeltaBody<'a> {
    pub action: String,
    pub access_binding: AccessBindingBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessBindingBody<'a> {
    pub role_id: &'a str,
    pub subject: SubjectBody<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectBody<'a> {
    pub id: &'a str,
    #[serde(rename = "type")]
    pub r#type: &'a str,
}

// ============ Lockbox ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSecretBody<'a> {
    pub folder_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub labels: &'a Labels,
    pub version_payload_entries: Vec<PayloadEntryChange<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PayloadEntryChange<'a> {
    pub key: &'a str,
    pub text_value: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateSecretMetadata {
    pub secret_id: String,
}
