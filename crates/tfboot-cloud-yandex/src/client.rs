//! Yandex Cloud REST API client
//!
//! Talks to the public HTTPS/JSON endpoints with IAM token (Bearer)
//! authentication. Create calls that return a long-running operation are
//! followed until the operation is done; the caller bounds that wait.

use crate::api::{
    AccessBindingBody, AccessBindingDeltaBody, ApiErrorBody, BucketResponse, CreateAccessKeyBody,
    CreateAccessKeyResponse, CreateBucketBody, CreateSecretBody, CreateSecretMetadata,
    CreateServiceAccountBody, CreateServiceAccountMetadata, Operation, PayloadEntryChange,
    SubjectBody, Tag, UpdateAccessBindingsBody,
};
use crate::error::{Result, YandexError};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tfboot_cloud::{
    Bucket, CloudApi, CreateAccessKeyRequest, CreateBucketRequest, CreateSecretRequest,
    CreateServiceAccountRequest, CredentialPair, UpdateAccessBindingsRequest,
};

pub const STORAGE_API: &str = "https://storage.api.cloud.yandex.net";
pub const IAM_API: &str = "https://iam.api.cloud.yandex.net";
pub const RESOURCE_MANAGER_API: &str = "https://resource-manager.api.cloud.yandex.net";
pub const LOCKBOX_API: &str = "https://lockbox.api.cloud.yandex.net";
pub const OPERATION_API: &str = "https://operation.api.cloud.yandex.net";

const OPERATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Base URLs of the services used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub storage: String,
    pub iam: String,
    pub resource_manager: String,
    pub lockbox: String,
    pub operation: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            storage: STORAGE_API.to_string(),
            iam: IAM_API.to_string(),
            resource_manager: RESOURCE_MANAGER_API.to_string(),
            lockbox: LOCKBOX_API.to_string(),
            operation: OPERATION_API.to_string(),
        }
    }
}

impl Endpoints {
    /// Route every service through one base URL (proxy, local mock)
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            storage: base.clone(),
            iam: base.clone(),
            resource_manager: base.clone(),
            lockbox: base.clone(),
            operation: base,
        }
    }
}

/// Yandex Cloud provider
pub struct YandexCloud {
    client: reqwest::Client,
    iam_token: String,
    endpoints: Endpoints,
    poll_interval: Duration,
}

impl YandexCloud {
    pub fn new(iam_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            iam_token: iam_token.into(),
            endpoints: Endpoints::default(),
            poll_interval: OPERATION_POLL_INTERVAL,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.iam_token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    async fn get<R: DeserializeOwned>(&self, url: &str) -> Result<R> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.iam_token)
            .send()
            .await?;
        decode(response).await
    }

    /// Follow an operation until it is done
    async fn wait(&self, mut operation: Operation) -> Result<Operation> {
        loop {
            operation = operation.check()?;
            if operation.done {
                return Ok(operation);
            }
            tracing::debug!(operation = %operation.id, "Waiting for operation");
            tokio::time::sleep(self.poll_interval).await;
            let url = format!("{}/operations/{}", self.endpoints.operation, operation.id);
            operation = self.get(&url).await?;
        }
    }

    async fn post_operation<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Operation> {
        let operation: Operation = self.post(url, body).await?;
        self.wait(operation).await
    }

    async fn create_bucket_inner(&self, request: &CreateBucketRequest) -> Result<Bucket> {
        let url = format!("{}/storage/v1/buckets", self.endpoints.storage);
        let body = CreateBucketBody {
            name: &request.name,
            folder_id: &request.folder_id,
            tags: Tag::from_labels(&request.labels),
        };
        let operation = self.post_operation(&url, &body).await?;

        let name = match operation.response::<BucketResponse>()? {
            Some(bucket) => bucket.name,
            None => {
                tracing::debug!(operation = %operation.id, "Bucket operation has no response body");
                request.name.clone()
            }
        };
        Ok(Bucket { name })
    }

    async fn create_service_account_inner(
        &self,
        request: &CreateServiceAccountRequest,
    ) -> Result<String> {
        let url = format!("{}/iam/v1/serviceAccounts", self.endpoints.iam);
        let body = CreateServiceAccountBody {
            folder_id: &request.folder_id,
            name: &request.name,
            description: &request.description,
            labels: &request.labels,
        };
        let operation = self.post_operation(&url, &body).await?;
        let metadata: CreateServiceAccountMetadata = operation.metadata()?;
        Ok(metadata.service_account_id)
    }

    async fn update_access_bindings_inner(
        &self,
        request: &UpdateAccessBindingsRequest,
    ) -> Result<()> {
        let url = format!(
            "{}/resource-manager/v1/folders/{}:updateAccessBindings",
            self.endpoints.resource_manager, request.resource_id
        );
        let body = UpdateAccessBindingsBody {
            access_binding_deltas: request
                .deltas
                .iter()
                .map(|delta| AccessBindingDeltaBody {
                    action: delta.action.to_string(),
                    access_binding: AccessBindingBody {
                        role_id: &delta.role_id,
                        subject: SubjectBody {
                            id: &delta.subject.id,
                            r#type: &delta.subject.subject_type,
                        },
                    },
                })
                .collect(),
        };
        self.post_operation(&url, &body).await?;
        Ok(())
    }

    async fn create_access_key_inner(
        &self,
        request: &CreateAccessKeyRequest,
    ) -> Result<CredentialPair> {
        let url = format!("{}/iam/aws-compatibility/v1/accessKeys", self.endpoints.iam);
        let body = CreateAccessKeyBody {
            service_account_id: &request.service_account_id,
            description: &request.description,
        };
        let response: CreateAccessKeyResponse = self.post(&url, &body).await?;
        if response.secret.is_empty() {
            return Err(YandexError::InvalidResponse(
                "access key response has an empty secret".to_string(),
            ));
        }
        Ok(CredentialPair::new(response.access_key.key_id, response.secret))
    }

    async fn create_secret_inner(&self, request: &CreateSecretRequest) -> Result<String> {
        let url = format!("{}/lockbox/v1/secrets", self.endpoints.lockbox);
        let body = CreateSecretBody {
            folder_id: &request.folder_id,
            name: &request.name,
            description: &request.description,
            labels: &request.labels,
            version_payload_entries: request
                .entries
                .iter()
                .map(|(key, value)| PayloadEntryChange {
                    key: key.as_str(),
                    text_value: value.as_str(),
                })
                .collect(),
        };
        let operation = self.post_operation(&url, &body).await?;
        let metadata: CreateSecretMetadata = operation.metadata()?;
        Ok(metadata.secret_id)
    }
}

async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await?;
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .map(|body| body.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });
        return Err(YandexError::ApiError {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl CloudApi for YandexCloud {
    fn name(&self) -> &str {
        "yandex-cloud"
    }

    async fn create_bucket(&self, request: &CreateBucketRequest) -> tfboot_cloud::Result<Bucket> {
        Ok(self.create_bucket_inner(request).await?)
    }

    async fn create_service_account(
        &self,
        request: &CreateServiceAccountRequest,
    ) -> tfboot_cloud::Result<String> {
        Ok(self.create_service_account_inner(request).await?)
    }

    async fn update_access_bindings(
        &self,
        request: &UpdateAccessBindingsRequest,
    ) -> tfboot_cloud::Result<()> {
        Ok(self.update_access_bindings_inner(request).await?)
    }

    async fn create_access_key(
        &self,
        request: &CreateAccessKeyRequest,
    ) -> tfboot_cloud::Result<CredentialPair> {
        Ok(self.create_access_key_inner(request).await?)
    }

    async fn create_secret(&self, request: &CreateSecretRequest) -> tfboot_cloud::Result<String> {
        Ok(self.create_secret_inner(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_endpoint() {
        let endpoints = Endpoints::single("http://127.0.0.1:8080/");
        assert_eq!(endpoints.storage, "http://127.0.0.1:8080");
        assert_eq!(endpoints.operation, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_default_endpoints() {
        let cloud = YandexCloud::new("token");
        assert_eq!(cloud.endpoints().iam, IAM_API);
        assert_eq!(cloud.endpoints().lockbox, LOCKBOX_API);
        assert_eq!(cloud.name(), "yandex-cloud");
    }
}
