//! Filesystem blob store
//!
//! Reports and redlined artifacts are stored as files under `<root>/blobs`,
//! addressed by relative slash-separated paths. Blobs are served back over
//! HTTP through time-limited signed URLs:
//! `signature = hex(hmac_sha256(secret, "<path>|<expires>"))`.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Route prefix serving raw blobs
pub const FILES_ROUTE: &str = "files";
/// Route prefix serving rendered redlined-clause artifacts
pub const VIEWER_ROUTE: &str = "viewer";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid signing key: {0}")]
    SigningKey(String),

    #[error("Signed URL expired")]
    Expired,

    #[error("Blob IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct BlobStore {
    root: PathBuf,
    public_base_url: String,
    /// Keyed MAC, cloned for every signature
    signer: HmacSha256,
}

impl BlobStore {
    pub fn new(root: PathBuf, public_base_url: &str, signing_secret: &str) -> Result<Self, BlobError> {
        let signer = HmacSha256::new_from_slice(signing_secret.as_bytes())
            .map_err(|e| BlobError::SigningKey(e.to_string()))?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            signer,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a blob path onto the filesystem, rejecting anything that could escape the root
    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        if path.is_empty() || path.contains('\\') {
            return Err(BlobError::InvalidPath(path.to_string()));
        }

        let relative = Path::new(path);
        let all_normal = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !all_normal {
            return Err(BlobError::InvalidPath(path.to_string()));
        }

        Ok(self.root.join(relative))
    }

    /// Write `bytes` at `path`, replacing any existing blob
    pub async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write-then-rename so readers never see a partial blob
        let mut staging = target.clone().into_os_string();
        staging.push(".partial");
        let staging = PathBuf::from(staging);
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &target).await?;

        debug!(path = %path, bytes = bytes.len(), "Stored blob");
        Ok(())
    }

    pub async fn get(&self, path: &str) -> Result<Vec<u8>, BlobError> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete one blob; `Ok(false)` if it did not exist
    pub async fn delete(&self, path: &str) -> Result<bool, BlobError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every blob below a directory prefix (e.g. `artifacts/<contract_id>`)
    pub async fn delete_prefix(&self, prefix: &str) -> Result<bool, BlobError> {
        let target = self.resolve(prefix)?;
        match tokio::fs::remove_dir_all(&target).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Unsigned URL of a blob under `route`
    pub fn public_url(&self, route: &str, path: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, route, path)
    }

    /// URL valid for `ttl` from now
    pub fn signed_url(&self, route: &str, path: &str, ttl: Duration) -> String {
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        format!(
            "{}?expires={}&signature={}",
            self.public_url(route, path),
            expires,
            self.sign(path, expires)
        )
    }

    pub fn sign(&self, path: &str, expires: i64) -> String {
        hex::encode(self.mac(path, expires).finalize().into_bytes())
    }

    /// Check a signature against `now` (unix seconds)
    pub fn verify(&self, path: &str, expires: i64, signature: &str, now: i64) -> Result<(), BlobError> {
        let expected = hex::decode(signature).map_err(|_| BlobError::InvalidSignature)?;
        self.mac(path, expires)
            .verify_slice(&expected)
            .map_err(|_| BlobError::InvalidSignature)?;
        if now > expires {
            return Err(BlobError::Expired);
        }
        Ok(())
    }

    fn mac(&self, path: &str, expires: i64) -> HmacSha256 {
        let mut mac = self.signer.clone();
        mac.update(path.as_bytes());
        mac.update(b"|");
        mac.update(expires.to_string().as_bytes());
        mac
    }
}
