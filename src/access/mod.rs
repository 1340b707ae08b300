//! Per-user persistence operations over the configured store and buckets.
//!
//! Every operation takes the caller's [`Session`] explicitly. Without one,
//! list and search operations return nothing while single-row reads and
//! writes fail with [`AppError::Unauthenticated`] before the store is touched.
//! Read failures are logged and collapse to empty results; write failures
//! propagate.

mod boxes;
mod images;
mod items;
mod search;

pub use search::ScanOutcome;

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::locator;
use crate::storage::Buckets;
use crate::store::InventoryStore;

/// The signed-in user a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn InventoryStore>,
    buckets: Buckets,
    public_origin: String,
}

impl Catalog {
    pub fn new(store: Arc<dyn InventoryStore>, buckets: Buckets, public_origin: impl Into<String>) -> Self {
        Self {
            store,
            buckets,
            public_origin: public_origin.into(),
        }
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    /// Absolute URL of the box detail page, the payload of its QR label.
    pub fn box_url(&self, box_id: &str) -> String {
        locator::box_url(&self.public_origin, box_id)
    }
}

fn require_session(session: Option<&Session>) -> AppResult<&Session> {
    session.ok_or(AppError::Unauthenticated)
}

/// Logs a failed read and substitutes the empty value.
fn or_empty<T: Default>(op: &str, result: AppResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!("{} failed: {}", op, e);
        T::default()
    })
}

/// Like [`or_empty`] for single-row reads, keeping the session check intact.
fn or_none<T>(op: &str, result: AppResult<Option<T>>) -> AppResult<Option<T>> {
    Ok(result.unwrap_or_else(|e| {
        tracing::error!("{} failed: {}", op, e);
        None
    }))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryBackend;
    use crate::store::MemoryStore;

    pub const ALICE: &str = "11111111-1111-1111-1111-111111111111";
    pub const BOB: &str = "22222222-2222-2222-2222-222222222222";

    pub struct Fixture {
        pub catalog: Catalog,
        pub store: Arc<MemoryStore>,
        pub item_images: Arc<MemoryBackend>,
        pub box_qrcodes: Arc<MemoryBackend>,
    }

    pub fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let item_images = Arc::new(MemoryBackend::new("item-images"));
        let box_qrcodes = Arc::new(MemoryBackend::new("box-qrcodes"));
        let catalog = Catalog::new(
            store.clone(),
            Buckets::new(item_images.clone(), box_qrcodes.clone()),
            "http://localhost:3000",
        );
        Fixture {
            catalog,
            store,
            item_images,
            box_qrcodes,
        }
    }

    pub fn alice() -> Session {
        Session::new(ALICE, "alice@example.com")
    }

    pub fn bob() -> Session {
        Session::new(BOB, "bob@example.com")
    }
}
