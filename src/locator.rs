//! QR code identifiers and the URLs box labels encode.

use std::sync::LazyLock;

use chrono::Utc;
use rand::Rng;
use regex::Regex;

const QR_PREFIX: &str = "box_";
const QR_SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static RE_BOX_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://[^/?#]+)?/boxes/([^/?#]+)/?(?:[?#].*)?$").unwrap()
});

static RE_QR_CODE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^box_[0-9]+_[0-9a-z]+$").unwrap());

/// `box_<unix-millis>_<7 base-36 chars>`. Collisions are unlikely but not
/// ruled out; the `qr_code_id` column is unique, so a clash fails the insert.
pub fn generate_qr_code_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..QR_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}_{}", QR_PREFIX, Utc::now().timestamp_millis(), suffix)
}

pub fn is_qr_code_id(text: &str) -> bool {
    RE_QR_CODE_ID.is_match(text)
}

/// Box detail URL on the front-end; this is what the printed QR code holds.
pub fn box_url(origin: &str, box_id: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), box_path(box_id))
}

pub fn box_path(box_id: &str) -> String {
    format!("/boxes/{}", box_id)
}

pub fn item_path(item_id: &str) -> String {
    format!("/items/{}", item_id)
}

/// What a scanned code points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    /// A box detail URL.
    Box(String),
    /// A bare QR code identifier.
    QrCode(String),
    /// Anything else is treated as a product barcode.
    Barcode(String),
}

pub fn resolve_scan(text: &str) -> ScanTarget {
    let text = text.trim();
    if let Some(id) = RE_BOX_URL.captures(text).and_then(|c| c.get(1)) {
        return ScanTarget::Box(id.as_str().to_string());
    }
    if is_qr_code_id(text) {
        return ScanTarget::QrCode(text.to_string());
    }
    ScanTarget::Barcode(text.to_string())
}
