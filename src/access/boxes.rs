use crate::error::{AppError, AppResult};
use crate::locator::generate_qr_code_id;
use crate::models::{BoxChanges, BoxModel, BoxWithItems, Location, NewBox};
use crate::storage::box_qr_code_key;
use crate::store::{BoxFilter, BoxKey};
use crate::validation::{validate_box_changes, validate_new_box};

use super::{or_empty, or_none, require_session, Catalog, Session};

impl Catalog {
    /// All of the caller's boxes, newest first.
    pub async fn list_boxes(&self, session: Option<&Session>) -> Vec<BoxModel> {
        self.query_boxes(session, &BoxFilter::default()).await
    }

    pub async fn search_boxes(&self, session: Option<&Session>, text: &str) -> Vec<BoxModel> {
        self.query_boxes(session, &BoxFilter::text(text)).await
    }

    pub async fn filter_boxes_by_location(
        &self,
        session: Option<&Session>,
        location: Location,
    ) -> Vec<BoxModel> {
        self.query_boxes(session, &BoxFilter::location(location)).await
    }

    pub async fn filter_boxes_by_category(
        &self,
        session: Option<&Session>,
        category: &str,
    ) -> Vec<BoxModel> {
        self.query_boxes(session, &BoxFilter::category(category)).await
    }

    pub async fn query_boxes(&self, session: Option<&Session>, filter: &BoxFilter) -> Vec<BoxModel> {
        let Some(session) = session else {
            return Vec::new();
        };
        or_empty(
            "query_boxes",
            self.store.select_boxes(&session.user_id, filter).await,
        )
    }

    /// The box with its items; `None` when missing or owned by someone else.
    pub async fn get_box(&self, session: Option<&Session>, id: &str) -> AppResult<Option<BoxWithItems>> {
        let session = require_session(session)?;
        or_none(
            "get_box",
            self.store.select_box(&session.user_id, BoxKey::Id(id)).await,
        )
    }

    pub async fn get_box_by_qr_code(
        &self,
        session: Option<&Session>,
        qr_code_id: &str,
    ) -> AppResult<Option<BoxWithItems>> {
        let session = require_session(session)?;
        or_none(
            "get_box_by_qr_code",
            self.store
                .select_box(&session.user_id, BoxKey::QrCode(qr_code_id))
                .await,
        )
    }

    /// Inserts the box with a freshly generated QR code id.
    pub async fn create_box(&self, session: Option<&Session>, new_box: NewBox) -> AppResult<BoxModel> {
        let session = require_session(session)?;
        validate_new_box(&new_box)?;

        let qr_code_id = generate_qr_code_id();
        let created = self
            .store
            .insert_box(&session.user_id, &new_box, &qr_code_id)
            .await?;

        tracing::info!("Box created: id={}, qr_code_id={}", created.id, created.qr_code_id);
        Ok(created)
    }

    pub async fn update_box(
        &self,
        session: Option<&Session>,
        id: &str,
        changes: BoxChanges,
    ) -> AppResult<BoxModel> {
        let session = require_session(session)?;
        validate_box_changes(&changes)?;

        self.store
            .update_box(&session.user_id, id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Box not found".to_string()))
    }

    /// Deletes the box together with its items and their images. Returns the
    /// number of boxes removed; a missing or foreign id removes nothing.
    pub async fn delete_box(&self, session: Option<&Session>, id: &str) -> AppResult<u64> {
        let session = require_session(session)?;
        let owner = session.user_id.as_str();

        let Some(found) = self.store.select_box(owner, BoxKey::Id(id)).await? else {
            return Ok(0);
        };
        let mut image_keys = Vec::new();
        for item in &found.items {
            let images = self.store.select_images(owner, &item.id).await?;
            image_keys.extend(images.into_iter().map(|image| image.storage_path));
        }

        let deleted = self.store.delete_box(owner, id).await?;
        if deleted == 0 {
            return Ok(0);
        }

        // Rows are gone at this point; leftover objects are only logged.
        for key in image_keys {
            if let Err(e) = self.buckets.item_images.delete(&key).await {
                tracing::warn!("Failed to delete item image {}: {}", key, e);
            }
        }
        let qr_key = box_qr_code_key(owner, &found.record.id, &found.record.qr_code_id);
        if let Err(e) = self.buckets.box_qrcodes.delete(&qr_key).await {
            tracing::debug!("No QR image removed for box {}: {}", found.record.id, e);
        }

        tracing::info!("Box deleted: id={}, items={}", id, found.items.len());
        Ok(deleted)
    }
}
