use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use super::{ImageStore, ImageStoreError, ResourceType, UploadOptions, UploadedImage};

/// Signed REST client for Cloudinary's upload API.
///
/// Signatures are SHA-256; the account must have SHA-256 signing enabled.
#[derive(Clone)]
pub struct CloudinaryImageStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Sign request parameters: sort by key, join as `k=v` with `&`, append the secret, hex SHA-256.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

impl CloudinaryImageStore {
    pub fn new(cfg: &configs::ImageStoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: cfg.cloud_name.clone(),
            api_key: cfg.api_key.clone(),
            api_secret: cfg.api_secret.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self, resource_type: ResourceType, action: &str) -> String {
        format!("{}/v1_1/{}/{}/{}", self.api_base, self.cloud_name, resource_type.as_str(), action)
    }

    async fn read_error(resp: reqwest::Response) -> ImageStoreError {
        let status = resp.status().as_u16();
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => "unreadable error body".to_string(),
        };
        ImageStoreError::Rejected { status, message }
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    #[instrument(skip(self, path, opts), fields(path = %path.display(), folder = %opts.folder))]
    async fn upload(&self, path: &Path, opts: &UploadOptions) -> Result<UploadedImage, ImageStoreError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ImageStoreError::Io(e.to_string()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let overwrite = opts.overwrite.to_string();
        let signature = sign(
            &[("folder", opts.folder.as_str()), ("overwrite", overwrite.as_str()), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type_for(path))
            .map_err(|e| ImageStoreError::Http(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", opts.folder.clone())
            .text("overwrite", overwrite)
            .text("signature", signature);

        let resp = self
            .client
            .post(self.endpoint(opts.resource_type, "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageStoreError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::read_error(resp).await);
        }
        let body = resp
            .json::<UploadResponse>()
            .await
            .map_err(|e| ImageStoreError::Decode(e.to_string()))?;
        debug!(public_id = %body.public_id, "image uploaded");
        Ok(UploadedImage { url: body.secure_url, public_id: body.public_id })
    }

    #[instrument(skip(self))]
    async fn destroy(&self, public_id: &str) -> Result<(), ImageStoreError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(&[("public_id", public_id), ("timestamp", timestamp.as_str())], &self.api_secret);
        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.api_key.as_str()),
            ("signature", signature.as_str()),
        ];

        let resp = self
            .client
            .post(self.endpoint(ResourceType::Image, "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| ImageStoreError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(Self::read_error(resp).await);
        }
        let body = resp
            .json::<DestroyResponse>()
            .await
            .map_err(|e| ImageStoreError::Decode(e.to_string()))?;
        if body.result != "ok" {
            return Err(ImageStoreError::NotDeleted(body.result));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::SocketAddr;

    use axum::{extract::Multipart, http::StatusCode, routing::post, Form as AxumForm, Json, Router};
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let sig = sign(
            &[("timestamp", "1315060510"), ("overwrite", "true"), ("folder", "food-items")],
            "abcd",
        );
        assert_eq!(sig, "3e4156200aee16c5d6c8a77ef5acda2b7b0fcefdf45cf54486c1b8ae536e8566");

        let sig = sign(&[("public_id", "food-items/sample"), ("timestamp", "1315060510")], "abcd");
        assert_eq!(sig, "5227443b3c03ac06d6024f81ce240e707b73c18a0642c38fab3c2b37be66fb19");
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for(Path::new("a/b.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("b.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("b")), "application/octet-stream");
    }

    async fn fake_upload(mut multipart: Multipart) -> (StatusCode, Json<serde_json::Value>) {
        let mut fields = HashMap::new();
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let value = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            fields.insert(name, value);
        }
        let required = ["file", "api_key", "timestamp", "folder", "overwrite", "signature"];
        if required.iter().all(|k| fields.contains_key(*k)) && fields["file"] > 0 {
            (StatusCode::OK, Json(json!({"secure_url": "https://res.example.com/food-items/abc.png", "public_id": "food-items/abc"})))
        } else {
            (StatusCode::BAD_REQUEST, Json(json!({"error": {"message": "Missing required parameter"}})))
        }
    }

    async fn fake_destroy(AxumForm(params): AxumForm<HashMap<String, String>>) -> Json<serde_json::Value> {
        let result = if params.get("public_id").map(String::as_str) == Some("food-items/abc") { "ok" } else { "not found" };
        Json(json!({ "result": result }))
    }

    async fn spawn_fake(cloud: &str) -> anyhow::Result<SocketAddr> {
        let app = Router::new()
            .route(&format!("/v1_1/{cloud}/image/upload"), post(fake_upload))
            .route(&format!("/v1_1/{cloud}/image/destroy"), post(fake_destroy));
        let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(addr)
    }

    fn store(addr: SocketAddr) -> CloudinaryImageStore {
        CloudinaryImageStore::new(&configs::ImageStoreConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            folder: "food-items".into(),
            api_base: format!("http://{addr}/"),
        })
    }

    #[tokio::test]
    async fn upload_and_destroy_against_fake_server() -> anyhow::Result<()> {
        let addr = spawn_fake("demo").await?;
        let store = store(addr);

        let path = std::env::temp_dir().join(format!("cld_{}.png", Uuid::new_v4()));
        tokio::fs::write(&path, b"\x89PNG fake").await?;
        let uploaded = store.upload(&path, &UploadOptions::image("food-items")).await?;
        tokio::fs::remove_file(&path).await?;
        assert_eq!(uploaded.public_id, "food-items/abc");
        assert_eq!(uploaded.url, "https://res.example.com/food-items/abc.png");

        store.destroy("food-items/abc").await?;
        let err = store.destroy("food-items/gone").await.unwrap_err();
        assert!(matches!(err, ImageStoreError::NotDeleted(ref r) if r == "not found"));
        Ok(())
    }

    #[tokio::test]
    async fn upload_of_missing_file_is_io_error() -> anyhow::Result<()> {
        let addr = spawn_fake("demo").await?;
        let missing = std::env::temp_dir().join(format!("cld_missing_{}.png", Uuid::new_v4()));
        let err = store(addr).upload(&missing, &UploadOptions::image("food-items")).await.unwrap_err();
        assert!(matches!(err, ImageStoreError::Io(_)));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_cloud_is_rejected() -> anyhow::Result<()> {
        let addr = spawn_fake("other").await?;
        let path = std::env::temp_dir().join(format!("cld_{}.png", Uuid::new_v4()));
        tokio::fs::write(&path, b"png").await?;
        let err = store(addr).upload(&path, &UploadOptions::image("food-items")).await.unwrap_err();
        tokio::fs::remove_file(&path).await?;
        assert!(matches!(err, ImageStoreError::Rejected { status: 404, .. }));
        Ok(())
    }
}
