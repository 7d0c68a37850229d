use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.root.path().join("config.yaml"), content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    pub fn has_outputs(&self) -> bool {
        self.file("state.yaml").exists() || self.file("access-key.yaml").exists()
    }
}

/// Minimal stand-in for the Yandex Cloud REST endpoints
#[derive(Clone, Default)]
pub struct MockCloud {
    posts: Arc<Mutex<Vec<String>>>,
    reject_path: Option<String>,
}

#[allow(dead_code)]
impl MockCloud {
    pub fn rejecting(path: &str) -> Self {
        Self {
            reject_path: Some(path.to_string()),
            ..Default::default()
        }
    }

    pub fn posted_paths(&self) -> Vec<String> {
        self.posts.lock().unwrap().clone()
    }

    /// Serve on an ephemeral port from a background thread, returning the
    /// base URL
    pub fn spawn(&self) -> String {
        let app = Router::new().fallback(handle).with_state(self.clone());
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        format!("http://{}", rx.recv().unwrap())
    }
}

async fn handle(State(mock): State<MockCloud>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    if method == Method::POST {
        mock.posts.lock().unwrap().push(path.clone());
    }

    if mock.reject_path.as_deref() == Some(path.as_str()) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"code": 7, "message": "Permission denied"})),
        )
            .into_response();
    }

    let reply = match path.as_str() {
        "/storage/v1/buckets" => {
            json!({"id": "op-bucket", "done": true, "response": {"name": body["name"]}})
        }
        "/iam/v1/serviceAccounts" => {
            json!({"id": "op-sa", "done": true, "metadata": {"serviceAccountId": "aje-sa-1"}})
        }
        p if p.ends_with(":updateAccessBindings") => {
            json!({"id": "op-bindings", "done": true})
        }
        "/iam/aws-compatibility/v1/accessKeys" => json!({
            "accessKey": {"id": "aje-key-1", "keyId": "YCAJE-key-id"},
            "secret": "YCP-secret-value"
        }),
        "/lockbox/v1/secrets" => {
            json!({"id": "op-secret", "done": true, "metadata": {"secretId": "e6q-secret-1"}})
        }
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"code": 5, "message": "Not found"})),
            )
                .into_response();
        }
    };
    Json(reply).into_response()
}

/// A local address nothing listens on
#[allow(dead_code)]
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[allow(dead_code)]
pub fn read_yaml(path: &Path) -> serde_yaml::Value {
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}
