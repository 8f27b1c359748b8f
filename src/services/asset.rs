use crate::{
    config::Config,
    error::{AppError, Result},
};
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Client for the external image host. Posts arrive with images as base64
/// data URLs; the bytes live on the asset host and only the returned URL is
/// stored in a document.
#[derive(Clone)]
pub struct AssetService {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl AssetService {
    pub async fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::internal(&format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.asset_service_url.trim_end_matches('/').to_string(),
            api_key: config.asset_service_key.clone(),
            client,
        })
    }

    /// Uploads a `data:image/...;base64,` payload and returns the hosted URL.
    /// Nothing is written to the database until this has succeeded.
    pub async fn upload(&self, data_url: &str) -> Result<String> {
        decode_data_url(data_url)?;

        let response = self
            .client
            .post(format!("{}/image/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({ "file": data_url }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Image host returned status {}",
                response.status()
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid image host response: {}", e)))?;

        debug!("Uploaded image asset: {}", upload.secure_url);
        Ok(upload.secure_url)
    }

    /// Deletes a previously-uploaded asset, addressed by the public id encoded
    /// in its URL.
    pub async fn destroy(&self, asset_url: &str) -> Result<()> {
        let public_id = public_id(asset_url).ok_or_else(|| {
            AppError::ExternalService(format!("Cannot derive asset id from {}", asset_url))
        })?;

        let response = self
            .client
            .post(format!("{}/image/destroy", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({ "public_id": public_id }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Image host returned status {}",
                response.status()
            )));
        }

        debug!("Destroyed image asset: {}", public_id);
        Ok(())
    }
}

/// Public id of a hosted asset: the last path segment with its extension
/// stripped.
fn public_id(asset_url: &str) -> Option<String> {
    let segment = asset_url.rsplit('/').next()?;
    let id = segment.split('.').next()?;
    (!id.is_empty()).then(|| id.to_string())
}

fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let encoded = data_url
        .strip_prefix("data:image/")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, encoded)| encoded)
        .ok_or_else(|| AppError::validation("Image must be a base64 data URL"))?;

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| AppError::validation("Image data is not valid base64"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // A 1x1 transparent PNG.
    const DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    fn service(base_url: String) -> AssetService {
        AssetService {
            base_url,
            api_key: "test-key".to_string(),
            client: Client::new(),
        }
    }

    #[tokio::test]
    async fn upload_returns_the_hosted_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/image/upload"))
            .and(body_json(json!({ "file": DATA_URL })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://assets.example/img/abc123.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = service(server.uri()).upload(DATA_URL).await.unwrap();
        assert_eq!(url, "https://assets.example/img/abc123.png");
    }

    #[tokio::test]
    async fn upload_surfaces_host_errors_as_external_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/image/upload"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = service(server.uri()).upload(DATA_URL).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }

    #[tokio::test]
    async fn malformed_data_urls_are_rejected_without_a_request() {
        let server = MockServer::start().await;
        // No mock mounted: a request would 404 and the mock server would flag it.

        let svc = service(server.uri());
        assert!(matches!(
            svc.upload("https://example.com/img.png").await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            svc.upload("data:image/png;base64,!!!").await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn destroy_addresses_the_asset_by_public_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/image/destroy"))
            .and(body_json(json!({ "public_id": "abc123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        service(server.uri())
            .destroy("https://assets.example/img/abc123.png")
            .await
            .unwrap();
    }

    #[test]
    fn public_id_strips_path_and_extension() {
        assert_eq!(
            public_id("https://assets.example/a/b/xyz.png").as_deref(),
            Some("xyz")
        );
        assert_eq!(public_id("https://assets.example/plain").as_deref(), Some("plain"));
        assert_eq!(public_id("https://assets.example/a/"), None);
    }
}
