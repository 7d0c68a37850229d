//! tfboot cloud provisioning
//!
//! This crate holds the provider abstraction and the workflow that
//! bootstraps a Terraform remote-state backend on top of it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    tfboot CLI                    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 tfboot-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Provisioner (5 ordered steps)            │   │
//! │  └──────────────────┬───────────────────────┘   │
//! │  ┌──────────────────▼───────────────────────┐   │
//! │  │  trait CloudApi { ... }                   │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │    Naming    │  │ OutputWriter │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │ yandex-cloud  │
//! │   provider    │
//! └───────────────┘
//! ```

pub mod error;
pub mod naming;
pub mod output;
pub mod provider;
pub mod provision;

// Re-exports
pub use error::{CloudError, Result};
pub use output::{OutputError, OutputWriter, StateDescriptor, WrittenOutputs, read_access_key};
pub use provider::{
    AccessBindingAction, AccessBindingDelta, Bucket, CloudApi, CreateAccessKeyRequest,
    CreateBucketRequest, CreateSecretRequest, CreateServiceAccountRequest, CredentialPair, Labels,
    Subject, UpdateAccessBindingsRequest,
};
pub use provision::{
    DEFAULT_STEP_TIMEOUT, Progress, ProvisionError, ProvisionedResources, Provisioner,
    ProvisioningOutcome, Step,
};
