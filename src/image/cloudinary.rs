//! Cloudinary implementation of the image facade.
//!
//! Talks to the Cloudinary REST upload API with signed requests and builds
//! signed delivery URLs locally.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use serde::Deserialize;
use sha2::Digest;
use tracing::{debug, error};

use super::adapter::{CloudinaryDataAdapter, CloudinaryRemoveData, PrepareImageData};
use super::api::{
    EditRequest, FetchRequest, ImageApi, ImageApiError, RemoveMultipleRequest, RemoveRequest,
    RenameResult, UploadRequest, UploadResult,
};
use super::visibility::DeliveryMode;
use crate::config::ImageConfig;
use crate::{FileshareError, Result};

/// Transformation applied to every delivery URL.
const DELIVERY_TRANSFORMATION: &str = "f_auto,q_auto";

/// Digest used for request and URL signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    fn digest(&self, payload: &[u8]) -> Vec<u8> {
        match self {
            SignatureAlgorithm::Sha1 => sha1::Sha1::digest(payload).to_vec(),
            SignatureAlgorithm::Sha256 => sha2::Sha256::digest(payload).to_vec(),
        }
    }

    /// Length of the signature component in delivery URLs.
    fn url_signature_len(&self) -> usize {
        match self {
            SignatureAlgorithm::Sha1 => 8,
            SignatureAlgorithm::Sha256 => 32,
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            _ => Err(format!("unknown signature algorithm: {s}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RenameResponse {
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Image facade backed by Cloudinary.
pub struct CloudinaryApi {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base_url: String,
    delivery_base_url: String,
    algorithm: SignatureAlgorithm,
    adapter: CloudinaryDataAdapter,
}

impl CloudinaryApi {
    /// Create a client from configuration.
    pub fn new(config: &ImageConfig) -> Result<Self> {
        let algorithm = config
            .signature_algorithm
            .parse()
            .map_err(FileshareError::Config)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FileshareError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            delivery_base_url: config.delivery_base_url.trim_end_matches('/').to_string(),
            algorithm,
            adapter: CloudinaryDataAdapter,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_base_url, self.cloud_name, action)
    }

    /// Sign API parameters.
    ///
    /// Parameters are sorted by name, joined as `k=v&k=v`, suffixed with the
    /// API secret and digested to lowercase hex. Empty values are skipped.
    pub fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> =
            params.iter().filter(|(_, value)| !value.is_empty()).collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let digest = self
            .algorithm
            .digest(format!("{to_sign}{}", self.api_secret).as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Append timestamp, API key and signature to request parameters.
    fn signed_params(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", chrono::Utc::now().timestamp().to_string()));
        let signature = self.sign(&params);
        params.push(("api_key", self.api_key.clone()));
        params.push(("signature", signature));
        params
    }

    /// Build a signed delivery URL for an image.
    pub fn delivery_url(&self, public_id: &str, mode: DeliveryMode) -> Result<String> {
        let to_sign = format!("{DELIVERY_TRANSFORMATION}/{public_id}");
        let digest = self
            .algorithm
            .digest(format!("{to_sign}{}", self.api_secret).as_bytes());
        let encoded = URL_SAFE.encode(digest);
        let signature = &encoded[..self.algorithm.url_signature_len()];

        let raw = format!(
            "{}/{}/image/{}/s--{}--/{}",
            self.delivery_base_url,
            self.cloud_name,
            mode,
            signature,
            to_sign
        );

        let url = url::Url::parse(&raw)
            .map_err(|e| FileshareError::Config(format!("invalid delivery URL {raw}: {e}")))?;
        Ok(url.to_string())
    }

    /// Send a request and decode a JSON body, describing any failure.
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<T, String> {
        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(format!("{status}: {message}"));
        }

        serde_json::from_str(&body).map_err(|e| format!("unexpected response: {e}"))
    }

    async fn destroy(&self, data: &CloudinaryRemoveData) -> std::result::Result<(), ImageApiError> {
        let public_id = data.public_id();
        let params = self.signed_params(vec![
            ("public_id", public_id.clone()),
            ("type", data.upload_type.to_string()),
        ]);

        let response: DestroyResponse = self
            .send(self.client.post(self.endpoint("destroy")).form(&params))
            .await
            .map_err(|detail| {
                error!(public_id = %public_id, error = %detail, "Cloudinary destroy failed");
                ImageApiError::Remove
            })?;

        match response.result.as_str() {
            "ok" => {
                debug!(public_id = %public_id, "Image removed");
                Ok(())
            }
            "not found" => Err(ImageApiError::NotFound),
            other => {
                error!(public_id = %public_id, result = %other, "Cloudinary destroy failed");
                Err(ImageApiError::Remove)
            }
        }
    }
}

#[async_trait]
impl ImageApi for CloudinaryApi {
    async fn fetch(&self, request: &FetchRequest) -> std::result::Result<String, ImageApiError> {
        let data = self.adapter.prepare_fetch_data(request);
        self.delivery_url(&data.public_id(), data.upload_type)
            .map_err(|e| {
                error!(error = %e, "Failed to build delivery URL");
                ImageApiError::Fetch
            })
    }

    async fn upload(
        &self,
        request: &UploadRequest,
    ) -> std::result::Result<UploadResult, ImageApiError> {
        let data = self.adapter.prepare_upload_data(request);
        let public_id = data.public_id();
        let mode = data.delivery_mode();

        let content = tokio::fs::read(&data.file_path).await.map_err(|e| {
            error!(path = %data.file_path.display(), error = %e, "Failed to read upload buffer");
            ImageApiError::Upload
        })?;
        let file_name = data
            .file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| public_id.clone());

        let params = self.signed_params(vec![
            ("public_id", public_id.clone()),
            ("type", mode.to_string()),
        ]);
        let mime = mime_guess::from_path(&file_name).first_or_octet_stream();
        let part = reqwest::multipart::Part::bytes(content)
            .file_name(file_name)
            .mime_str(mime.as_ref())
            .map_err(|e| {
                error!(public_id = %public_id, error = %e, "Invalid upload content type");
                ImageApiError::Upload
            })?;
        let mut form = reqwest::multipart::Form::new().part("file", part);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response: UploadResponse = self
            .send(self.client.post(self.endpoint("upload")).multipart(form))
            .await
            .map_err(|detail| {
                error!(public_id = %public_id, error = %detail, "Cloudinary upload failed");
                ImageApiError::Upload
            })?;

        debug!(public_id = %response.public_id, mode = %mode, "Image uploaded");

        Ok(UploadResult {
            public_id: response.public_id,
            delivery_mode: mode,
            secure_url: response.secure_url,
            bytes: response.bytes,
        })
    }

    async fn edit(&self, request: &EditRequest) -> std::result::Result<RenameResult, ImageApiError> {
        let data = self.adapter.prepare_edit_data(request);
        let from_public_id = data.from_public_id();
        let to_public_id = data.to_public_id();

        let params = self.signed_params(vec![
            ("from_public_id", from_public_id.clone()),
            ("to_public_id", to_public_id.clone()),
            ("type", data.current_type.to_string()),
            ("to_type", data.updated_type.to_string()),
            ("invalidate", "true".to_string()),
        ]);

        let response: RenameResponse = self
            .send(self.client.post(self.endpoint("rename")).form(&params))
            .await
            .map_err(|detail| {
                error!(
                    from = %from_public_id,
                    to = %to_public_id,
                    error = %detail,
                    "Cloudinary rename failed"
                );
                ImageApiError::Edit
            })?;

        Ok(RenameResult {
            public_id: response.public_id,
            delivery_mode: data.updated_type,
        })
    }

    async fn remove(&self, request: &RemoveRequest) -> std::result::Result<(), ImageApiError> {
        let data = self.adapter.prepare_remove_data(request);
        self.destroy(&data).await
    }

    async fn remove_multiple(
        &self,
        request: &RemoveMultipleRequest,
    ) -> std::result::Result<bool, ImageApiError> {
        let data = self.adapter.prepare_remove_multiple_data(request);
        for removal in data.removals() {
            self.destroy(&removal).await?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(algorithm: &str) -> CloudinaryApi {
        let config = ImageConfig {
            cloud_name: "demo".to_string(),
            api_key: "1234".to_string(),
            api_secret: "abcd".to_string(),
            signature_algorithm: algorithm.to_string(),
            ..ImageConfig::default()
        };
        CloudinaryApi::new(&config).unwrap()
    }

    fn sha1_hex(payload: &str) -> String {
        sha1::Sha1::digest(payload.as_bytes())
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    #[test]
    fn test_signature_algorithm_parse() {
        assert_eq!("sha1".parse::<SignatureAlgorithm>().unwrap(), SignatureAlgorithm::Sha1);
        assert_eq!("SHA256".parse::<SignatureAlgorithm>().unwrap(), SignatureAlgorithm::Sha256);
        assert!("md5".parse::<SignatureAlgorithm>().is_err());
    }

    #[test]
    fn test_sign_sorts_params_and_appends_secret() {
        let api = api("sha1");
        let signature = api.sign(&[
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample_image".to_string()),
            ("type", "upload".to_string()),
        ]);

        let expected = sha1_hex("public_id=sample_image&timestamp=1315060510&type=uploadabcd");
        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 40);
    }

    #[test]
    fn test_sign_skips_empty_values() {
        let api = api("sha1");
        let with_empty = api.sign(&[
            ("public_id", "a".to_string()),
            ("type", String::new()),
        ]);
        assert_eq!(with_empty, api.sign(&[("public_id", "a".to_string())]));
    }

    #[test]
    fn test_sign_sha256_length() {
        let api = api("sha256");
        assert_eq!(api.sign(&[("public_id", "a".to_string())]).len(), 64);
    }

    #[test]
    fn test_delivery_url_shape() {
        let api = api("sha1");
        let url = api
            .delivery_url("alice-7-cat", DeliveryMode::Authenticated)
            .unwrap();

        assert!(url.starts_with("https://res.cloudinary.com/demo/image/authenticated/s--"));
        assert!(url.ends_with("--/f_auto,q_auto/alice-7-cat"));

        let signature = url
            .split("/s--")
            .nth(1)
            .and_then(|rest| rest.split("--/").next())
            .unwrap();
        assert_eq!(signature.len(), 8);

        let digest = sha1::Sha1::digest(b"f_auto,q_auto/alice-7-catabcd");
        assert_eq!(signature, &URL_SAFE.encode(digest)[..8]);
    }

    #[test]
    fn test_delivery_url_sha256_signature_length() {
        let api = api("sha256");
        let url = api.delivery_url("bob-1-dog", DeliveryMode::Upload).unwrap();
        let signature = url
            .split("/s--")
            .nth(1)
            .and_then(|rest| rest.split("--/").next())
            .unwrap();
        assert_eq!(signature.len(), 32);
        assert!(url.contains("/image/upload/"));
    }

    #[tokio::test]
    async fn test_fetch_uses_visibility_mode() {
        let api = api("sha1");
        let request = FetchRequest {
            username: "alice".to_string(),
            folder_id: 7,
            file_name: "cat".to_string(),
            file_visibility: "public".to_string(),
        };
        let url = api.fetch(&request).await.unwrap();
        assert!(url.contains("/image/upload/s--"));
        assert!(url.ends_with("/alice-7-cat"));
    }
}
