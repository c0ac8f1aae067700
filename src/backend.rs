use crate::models::{PartValue, RegistrationPayload, Reply, UploadForm};
use reqwest::{multipart, Client, RequestBuilder};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

pub const REGISTER_PATH: &str = "/register";
pub const UPLOAD_PATH: &str = "/upload";
pub const WEEKLY_DATA_PATH: &str = "/weekly_data";

/// The food-logging API the page talks to. `Err` means the request never
/// completed; any HTTP status comes back as a `Reply`.
pub trait Backend: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn register(
        &self,
        payload: &RegistrationPayload,
    ) -> impl Future<Output = Result<Reply, Self::Error>> + Send;

    fn upload(&self, form: UploadForm) -> impl Future<Output = Result<Reply, Self::Error>> + Send;

    fn weekly_data(&self) -> impl Future<Output = Result<Reply, Self::Error>> + Send;
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, endpoint: String, request: RequestBuilder) -> Result<Reply, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        let status = response.status().as_u16();
        // an unreadable body is handled like an unparseable one
        let bytes = response.bytes().await.unwrap_or_else(|err| {
            warn!("failed to read body from {endpoint}: {err}");
            Default::default()
        });
        debug!(%endpoint, status, bytes = bytes.len(), "backend replied");
        Ok(Reply::from_bytes(status, &bytes))
    }
}

impl Backend for HttpBackend {
    type Error = BackendError;

    async fn register(&self, payload: &RegistrationPayload) -> Result<Reply, BackendError> {
        let endpoint = self.endpoint(REGISTER_PATH);
        let request = self.client.post(&endpoint).json(payload);
        self.send(endpoint, request).await
    }

    async fn upload(&self, form: UploadForm) -> Result<Reply, BackendError> {
        let endpoint = self.endpoint(UPLOAD_PATH);
        let multipart = to_multipart(form).map_err(|source| BackendError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;
        let request = self.client.post(&endpoint).multipart(multipart);
        self.send(endpoint, request).await
    }

    async fn weekly_data(&self) -> Result<Reply, BackendError> {
        let endpoint = self.endpoint(WEEKLY_DATA_PATH);
        let request = self.client.get(&endpoint);
        self.send(endpoint, request).await
    }
}

fn to_multipart(form: UploadForm) -> Result<multipart::Form, reqwest::Error> {
    let mut multipart = multipart::Form::new();
    for part in form.parts {
        multipart = match part.value {
            PartValue::Text(text) => multipart.text(part.name, text),
            PartValue::File {
                file_name,
                content_type,
                data,
            } => {
                let mut file = multipart::Part::bytes(data);
                if let Some(file_name) = file_name {
                    file = file.file_name(file_name);
                }
                if let Some(content_type) = content_type {
                    file = file.mime_str(&content_type)?;
                }
                multipart.part(part.name, file)
            }
        };
    }
    Ok(multipart)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .unwrap()
            .port();
        let base_url = format!("http://127.0.0.1:{port}");
        let backend = HttpBackend::new(base_url.clone()).unwrap();

        let err = backend.weekly_data().await.unwrap_err();
        let BackendError::Transport { endpoint, .. } = &err;
        assert_eq!(endpoint, &format!("{base_url}/weekly_data"));
        assert!(err.to_string().starts_with(&format!("request to {base_url}/weekly_data failed")));
    }

    #[test]
    fn multipart_rejects_malformed_content_type() {
        let form = UploadForm::default()
            .text("user_id", "7")
            .file("image", Some("lunch.jpg".to_string()), Some("not a mime".to_string()), vec![1, 2, 3]);
        assert!(to_multipart(form).is_err());

        let form = UploadForm::default()
            .file("image", Some("lunch.jpg".to_string()), Some("image/jpeg".to_string()), vec![1, 2, 3]);
        assert!(to_multipart(form).is_ok());
    }
}
