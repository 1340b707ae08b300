// Object storage for item photos and box QR images

pub mod gcs;
pub mod memory;
pub mod r2;

pub use gcs::GcsBackend;
pub use memory::MemoryBackend;
pub use r2::R2Backend;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::AppResult;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Storage backend abstraction (GCS / R2 / memory)
#[tonic::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Uploads an object and returns its storage URI.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<String>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Link a browser can fetch the object from.
    fn public_url(&self, key: &str) -> String;

    fn bucket(&self) -> &str;
}

/// The two logical buckets the service writes to.
#[derive(Clone)]
pub struct Buckets {
    pub item_images: Arc<dyn StorageBackend>,
    pub box_qrcodes: Arc<dyn StorageBackend>,
}

impl Buckets {
    pub fn new(item_images: Arc<dyn StorageBackend>, box_qrcodes: Arc<dyn StorageBackend>) -> Self {
        Self {
            item_images,
            box_qrcodes,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryBackend::new("item-images")),
            Arc::new(MemoryBackend::new("box-qrcodes")),
        )
    }
}

/// Makes an uploaded file name safe to embed in an object key.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned = RE_WHITESPACE.replace_all(base, "_").into_owned();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// `<owner>/<item_id>_<millis>_<sanitized-name>`
pub fn item_image_key(owner: &str, item_id: &str, file_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}_{}",
        owner,
        item_id,
        at.timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

/// `<owner>/<box_id>_<qr_code_id>.png`
pub fn box_qr_code_key(owner: &str, box_id: &str, qr_code_id: &str) -> String {
    format!("{}/{}_{}.png", owner, box_id, qr_code_id)
}

/// Joins a public base URL and an object key.
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
