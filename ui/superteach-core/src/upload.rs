//! Fetch a remote file and pin it to IPFS through a storage upload service.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{Result, WalletError};

/// Name given to every fetched file.
pub const UPLOAD_FILE_NAME: &str = "image.png";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadOptions {
    /// Return gateway `https://` URLs instead of `ipfs://` URIs.
    pub upload_with_gateway_url: bool,
    /// Pin files directly rather than inside a wrapping directory.
    pub upload_without_directory: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadResult {
    pub content_url: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<UploadFile>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageUploader: Send + Sync {
    /// Upload `files`, returning one URL per file.
    async fn upload(&self, files: Vec<UploadFile>, options: UploadOptions) -> Result<Vec<String>>;
}

pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<UploadFile> {
        let response = self.http.get(url.clone()).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        debug!(%url, len = bytes.len(), %content_type, "fetched upload source");

        Ok(UploadFile {
            name: UPLOAD_FILE_NAME.to_string(),
            content_type,
            bytes,
        })
    }
}

/// thirdweb storage: pins through `storage.thirdweb.com` and returns
/// `ipfs://` URIs or gateway URLs.
pub struct ThirdwebStorage {
    http: reqwest::Client,
    endpoint: String,
    client_id: Option<String>,
    gateway: String,
}

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

impl ThirdwebStorage {
    pub fn new(endpoint: impl Into<String>, client_id: Option<String>, gateway: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            client_id,
            gateway: gateway.into(),
        }
    }
}

#[async_trait]
impl StorageUploader for ThirdwebStorage {
    async fn upload(&self, files: Vec<UploadFile>, options: UploadOptions) -> Result<Vec<String>> {
        if files.is_empty() {
            return Err(WalletError::Upload("nothing to upload".into()));
        }
        if options.upload_without_directory && files.len() > 1 {
            return Err(WalletError::Upload(
                "only one file can be uploaded without a directory".into(),
            ));
        }

        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(format!("files/{}", file.name))
                .mime_str(&file.content_type)?;
            form = form.part("file", part);
        }
        form = form
            .text(
                "pinataMetadata",
                json!({ "name": "Storage SDK", "keyvalues": {} }).to_string(),
            )
            .text(
                "pinataOptions",
                json!({ "wrapWithDirectory": !options.upload_without_directory }).to_string(),
            );

        let mut request = self.http.post(&self.endpoint).multipart(form);
        if let Some(client_id) = &self.client_id {
            request = request.header("x-client-id", client_id);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(WalletError::Upload(format!("{status}: {body}")));
        }
        let pinned: PinResponse = serde_json::from_str(&body)?;
        info!(cid = %pinned.ipfs_hash, "pinned to IPFS");

        let uris = content_uris(&pinned.ipfs_hash, &names, options.upload_without_directory);
        Ok(if options.upload_with_gateway_url {
            uris.iter().map(|u| to_gateway_url(u, &self.gateway)).collect()
        } else {
            uris
        })
    }
}

fn content_uris(cid: &str, names: &[String], without_directory: bool) -> Vec<String> {
    if without_directory {
        vec![format!("ipfs://{cid}")]
    } else {
        names.iter().map(|name| format!("ipfs://{cid}/{name}")).collect()
    }
}

fn to_gateway_url(uri: &str, gateway: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(path) => format!("{}/{path}", gateway.trim_end_matches('/')),
        None => uri.to_string(),
    }
}

pub struct UploadExecutor {
    fetcher: Arc<dyn ResourceFetcher>,
    uploader: Arc<dyn StorageUploader>,
}

impl UploadExecutor {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, uploader: Arc<dyn StorageUploader>) -> Self {
        Self { fetcher, uploader }
    }

    pub async fn execute(&self, source_url: &str) -> Result<UploadResult> {
        let url = Url::parse(source_url.trim())
            .map_err(|e| WalletError::InvalidUrl(format!("{source_url}: {e}")))?;
        let file = self.fetcher.fetch(&url).await?;

        let options = UploadOptions {
            upload_with_gateway_url: true,
            upload_without_directory: true,
        };
        let content_url = self
            .uploader
            .upload(vec![file], options)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WalletError::Upload("upload returned no URL".into()))?;

        info!(%url, %content_url, "upload finished");
        Ok(UploadResult { content_url })
    }
}
