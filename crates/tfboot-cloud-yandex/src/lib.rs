//! Yandex Cloud provider for tfboot
//!
//! This crate implements the `CloudApi` trait on top of the Yandex Cloud
//! REST API.
//!
//! # Services
//!
//! - Object Storage: bucket creation
//! - IAM: service accounts, static (AWS-compatible) access keys
//! - Resource Manager: folder access bindings
//! - Lockbox: secrets
//! - Operation: polling long-running operations
//!
//! # Requirements
//!
//! - An IAM token (`yc iam create-token`)
//!
//! # Example
//!
//! ```ignore
//! use tfboot_cloud::{CloudApi, CreateBucketRequest};
//! use tfboot_cloud_yandex::YandexCloud;
//!
//! let cloud = YandexCloud::new(std::env::var("YC_TOKEN")?);
//! let bucket = cloud
//!     .create_bucket(&CreateBucketRequest {
//!         name: "demo-tf-state-abcdefgh".to_string(),
//!         folder_id: "b1g0000000000000000".to_string(),
//!         labels: tfboot_cloud::provider::created_by_labels(),
//!     })
//!     .await?;
//! ```

mod api;
pub mod client;
pub mod error;

pub use client::{Endpoints, YandexCloud};
pub use error::{Result, YandexError};
