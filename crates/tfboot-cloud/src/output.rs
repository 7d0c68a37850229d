//! Provisioning artifacts
//!
//! Two files land in the Terraform working directory:
//!
//! - `state.yaml`: what was created, plus the *names* of the secret entries.
//!   Safe to commit.
//! - `access-key.yaml`: the literal access key pair. Secret; written with
//!   mode 0600.
//!
//! Each file is written to a temporary sibling and renamed into place, so a
//! reader sees either the old file or the complete new one.

use crate::provider::CredentialPair;
use crate::provision::{ProvisioningOutcome, SECRET_KEY_ACCESS_KEY_ID, SECRET_KEY_SECRET_ACCESS_KEY};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const STATE_FILE: &str = "state.yaml";
pub const ACCESS_KEY_FILE: &str = "access-key.yaml";

const STATE_FILE_MODE: u32 = 0o644;
const ACCESS_KEY_FILE_MODE: u32 = 0o600;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to serialize {file}: {source}")]
    Serialize {
        file: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to print credentials: {0}")]
    Console(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, OutputError>;

/// Contents of `state.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDescriptor {
    /// State bucket name
    pub state_bucket: String,
    /// Bucket viewer/uploader service account id
    pub sa_id: String,
    /// Secret holding the bucket credentials
    pub lockbox_secret_id: String,
    /// Entry names inside the secret
    pub secret_keys: SecretKeyNames,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyNames {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Default for SecretKeyNames {
    fn default() -> Self {
        Self {
            access_key_id: SECRET_KEY_ACCESS_KEY_ID.to_string(),
            secret_access_key: SECRET_KEY_SECRET_ACCESS_KEY.to_string(),
        }
    }
}

impl From<&ProvisioningOutcome> for StateDescriptor {
    fn from(outcome: &ProvisioningOutcome) -> Self {
        Self {
            state_bucket: outcome.bucket.bucket_name.clone(),
            sa_id: outcome.service_account.service_account_id.clone(),
            lockbox_secret_id: outcome.secret.lockbox_secret_id.clone(),
            secret_keys: SecretKeyNames::default(),
        }
    }
}

impl StateDescriptor {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        read_yaml(path.as_ref())
    }
}

/// Parse an `access-key.yaml` file
pub fn read_access_key(path: impl AsRef<Path>) -> Result<CredentialPair> {
    read_yaml(path.as_ref())
}

/// Paths of the written artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    pub state_path: PathBuf,
    pub access_key_path: PathBuf,
}

/// Writes the provisioning artifacts into a directory
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn access_key_path(&self) -> PathBuf {
        self.dir.join(ACCESS_KEY_FILE)
    }

    /// Write both artifacts and echo the credentials to `console`
    ///
    /// Both documents are serialized before anything touches the disk. The
    /// credentials are echoed before the files are written so the operator
    /// still sees them if a write fails.
    pub fn write(
        &self,
        outcome: &ProvisioningOutcome,
        credentials: &CredentialPair,
        console: &mut impl Write,
    ) -> Result<WrittenOutputs> {
        let state = serde_yaml::to_string(&StateDescriptor::from(outcome)).map_err(|source| {
            OutputError::Serialize {
                file: STATE_FILE,
                source,
            }
        })?;
        let access_key =
            serde_yaml::to_string(credentials).map_err(|source| OutputError::Serialize {
                file: ACCESS_KEY_FILE,
                source,
            })?;

        writeln!(console, "AccessKeyId: {}", credentials.access_key_id)
            .and_then(|_| writeln!(console, "SecretAccessKey: {}", credentials.secret_access_key))
            .and_then(|_| console.flush())
            .map_err(OutputError::Console)?;

        let state_path = self.state_path();
        write_atomic(&state_path, state.as_bytes(), STATE_FILE_MODE)?;
        tracing::info!(path = %state_path.display(), "Wrote Terraform state descriptor");

        let access_key_path = self.access_key_path();
        write_atomic(&access_key_path, access_key.as_bytes(), ACCESS_KEY_FILE_MODE)?;
        tracing::info!(path = %access_key_path.display(), "Wrote access key file");

        Ok(WrittenOutputs {
            state_path,
            access_key_path,
        })
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| OutputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| OutputError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, data: &[u8], mode: u32) -> Result<()> {
    let wrap = |source: io::Error| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(parent).map_err(wrap)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(temp.path(), std::fs::Permissions::from_mode(mode))
            .map_err(wrap)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    temp.write_all(data).map_err(wrap)?;
    temp.as_file().sync_all().map_err(wrap)?;
    temp.persist(path).map_err(|e| wrap(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::{BucketResult, SecretRecord, ServiceIdentity};
    use tempfile::tempdir;

    fn outcome() -> ProvisioningOutcome {
        ProvisioningOutcome {
            bucket: BucketResult {
                bucket_name: "demo-tf-state-abcdefgh".to_string(),
            },
            service_account: ServiceIdentity {
                service_account_id: "aje-sa-1".to_string(),
            },
            secret: SecretRecord {
                lockbox_secret_id: "e6q-secret-1".to_string(),
            },
        }
    }

    fn credentials() -> CredentialPair {
        CredentialPair::new("YCAJE-key-id", "YCP-secret-value")
    }

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = tempdir().unwrap();
        let writer = OutputWriter::new(temp_dir.path());
        let mut console = Vec::new();

        let written = writer
            .write(&outcome(), &credentials(), &mut console)
            .unwrap();

        let state = StateDescriptor::read(&written.state_path).unwrap();
        assert_eq!(state, StateDescriptor::from(&outcome()));
        assert_eq!(state.secret_keys.access_key_id, "access_key_id");
        assert_eq!(state.secret_keys.secret_access_key, "secret_access_key");

        let key = read_access_key(&written.access_key_path).unwrap();
        assert_eq!(key, credentials());
    }

    #[test]
    fn test_state_file_never_holds_the_secret() {
        let temp_dir = tempdir().unwrap();
        let writer = OutputWriter::new(temp_dir.path());
        writer
            .write(&outcome(), &credentials(), &mut Vec::new())
            .unwrap();

        let state = std::fs::read_to_string(writer.state_path()).unwrap();
        assert!(!state.contains("YCP-secret-value"));
        assert!(state.contains("stateBucket: demo-tf-state-abcdefgh"));
        assert!(state.contains("saId: aje-sa-1"));
        assert!(state.contains("lockboxSecretId: e6q-secret-1"));

        let access_key = std::fs::read_to_string(writer.access_key_path()).unwrap();
        assert!(access_key.contains("accessKeyId: YCAJE-key-id"));
        assert!(access_key.contains("secretAccessKey: YCP-secret-value"));
    }

    #[test]
    fn test_credentials_echoed_to_console() {
        let temp_dir = tempdir().unwrap();
        let mut console = Vec::new();
        OutputWriter::new(temp_dir.path())
            .write(&outcome(), &credentials(), &mut console)
            .unwrap();

        let printed = String::from_utf8(console).unwrap();
        assert_eq!(
            printed,
            "AccessKeyId: YCAJE-key-id\nSecretAccessKey: YCP-secret-value\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_modes() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let writer = OutputWriter::new(temp_dir.path());
        writer
            .write(&outcome(), &credentials(), &mut Vec::new())
            .unwrap();

        let mode = |p: PathBuf| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(writer.access_key_path()), 0o600);
        assert_eq!(mode(writer.state_path()), 0o644);
    }

    #[test]
    fn test_existing_files_are_replaced_whole() {
        let temp_dir = tempdir().unwrap();
        let writer = OutputWriter::new(temp_dir.path());
        std::fs::write(
            writer.state_path(),
            "stateBucket: a-much-longer-bucket-name-from-an-earlier-run\nextra: line\n",
        )
        .unwrap();

        writer
            .write(&outcome(), &credentials(), &mut Vec::new())
            .unwrap();

        let state = std::fs::read_to_string(writer.state_path()).unwrap();
        assert!(!state.contains("extra"));
        assert_eq!(
            StateDescriptor::read(writer.state_path()).unwrap().state_bucket,
            "demo-tf-state-abcdefgh"
        );
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let temp_dir = tempdir().unwrap();
        let writer = OutputWriter::new(temp_dir.path().join("missing"));

        let err = writer
            .write(&outcome(), &credentials(), &mut Vec::new())
            .unwrap_err();

        assert!(matches!(err, OutputError::Write { .. }));
        assert!(!writer.access_key_path().exists());
    }
}
