use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::models::{ImageModel, NewImage};
use crate::storage::{box_qr_code_key, item_image_key};
use crate::store::BoxKey;

use super::{or_empty, require_session, Catalog, Session};

const QR_CONTENT_TYPE: &str = "image/png";

impl Catalog {
    pub async fn list_images(&self, session: Option<&Session>, item_id: &str) -> Vec<ImageModel> {
        let Some(session) = session else {
            return Vec::new();
        };
        or_empty(
            "list_images",
            self.store.select_images(&session.user_id, item_id).await,
        )
    }

    /// Stores the photo under `<owner>/<item>_<millis>_<name>` and records it.
    pub async fn upload_item_image(
        &self,
        session: Option<&Session>,
        item_id: &str,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> AppResult<ImageModel> {
        let session = require_session(session)?;
        let owner = session.user_id.as_str();
        if data.is_empty() {
            return Err(AppError::InvalidInput("Image data is empty".to_string()));
        }
        if self.store.select_item(owner, item_id).await?.is_none() {
            return Err(AppError::NotFound("Item not found".to_string()));
        }

        let key = item_image_key(owner, item_id, file_name, Utc::now());
        let content_type = if content_type.is_empty() {
            "application/octet-stream"
        } else {
            content_type
        };
        self.buckets.item_images.upload(&key, &data, content_type).await?;

        let new_image = NewImage {
            item_id: item_id.to_string(),
            storage_path: key.clone(),
        };
        match self.store.insert_image(owner, &new_image).await {
            Ok(image) => Ok(image),
            Err(e) => {
                if let Err(cleanup) = self.buckets.item_images.delete(&key).await {
                    tracing::warn!("Failed to remove orphaned upload {}: {}", key, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Removes the stored object, then the row. Returns rows removed.
    pub async fn delete_image(&self, session: Option<&Session>, id: &str) -> AppResult<u64> {
        let session = require_session(session)?;
        let owner = session.user_id.as_str();

        let Some(image) = self.store.select_image(owner, id).await? else {
            return Ok(0);
        };
        self.buckets.item_images.delete(&image.storage_path).await?;
        self.store.delete_image(owner, id).await
    }

    pub fn image_url(&self, image: &ImageModel) -> String {
        self.buckets.item_images.public_url(&image.storage_path)
    }

    /// Stores the rendered QR label of an owned box and returns its public URL.
    pub async fn upload_box_qr_code(
        &self,
        session: Option<&Session>,
        box_id: &str,
        png: Vec<u8>,
    ) -> AppResult<String> {
        let session = require_session(session)?;
        let owner = session.user_id.as_str();
        if png.is_empty() {
            return Err(AppError::InvalidInput("QR code image is empty".to_string()));
        }
        let Some(found) = self.store.select_box(owner, BoxKey::Id(box_id)).await? else {
            return Err(AppError::NotFound("Box not found".to_string()));
        };

        let key = box_qr_code_key(owner, &found.record.id, &found.record.qr_code_id);
        self.buckets.box_qrcodes.upload(&key, &png, QR_CONTENT_TYPE).await?;
        Ok(self.buckets.box_qrcodes.public_url(&key))
    }

    /// Where the box's QR label is published; `None` for unknown boxes.
    pub async fn box_qr_code_url(&self, session: Option<&Session>, box_id: &str) -> AppResult<Option<String>> {
        let session = require_session(session)?;
        let owner = session.user_id.as_str();
        let found = match self.store.select_box(owner, BoxKey::Id(box_id)).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("box_qr_code_url failed: {}", e);
                None
            }
        };
        Ok(found.map(|b| {
            let key = box_qr_code_key(owner, &b.record.id, &b.record.qr_code_id);
            self.buckets.box_qrcodes.public_url(&key)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::{alice, bob, fixture};
    use crate::models::{Location, NewBox, NewItem};

    #[tokio::test]
    async fn test_upload_and_delete_image() {
        let fx = fixture();
        let a = alice();
        let shed = fx
            .catalog
            .create_box(Some(&a), NewBox::new("Shed", Location::Garage))
            .await
            .unwrap();
        let item = fx
            .catalog
            .create_item(Some(&a), NewItem::new("Saw", &shed.id))
            .await
            .unwrap();

        let image = fx
            .catalog
            .upload_item_image(Some(&a), &item.id, "my saw.jpg", "image/jpeg", vec![0xff, 0xd8])
            .await
            .unwrap();
        assert!(image.storage_path.starts_with(&format!("{}/{}_", a.user_id, item.id)));
        assert!(image.storage_path.ends_with("_my_saw.jpg"));
        assert!(fx.item_images.contains(&image.storage_path));
        assert_eq!(
            fx.catalog.image_url(&image),
            format!("memory://item-images/{}", image.storage_path)
        );

        let listed = fx.catalog.list_images(Some(&a), &item.id).await;
        assert_eq!(listed, vec![image.clone()]);
        assert!(fx.catalog.list_images(Some(&bob()), &item.id).await.is_empty());

        assert_eq!(fx.catalog.delete_image(Some(&bob()), &image.id).await.unwrap(), 0);
        assert!(fx.item_images.contains(&image.storage_path));

        assert_eq!(fx.catalog.delete_image(Some(&a), &image.id).await.unwrap(), 1);
        assert!(fx.item_images.is_empty());
        assert!(fx.catalog.list_images(Some(&a), &item.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_owned_item() {
        let fx = fixture();
        let b = bob();
        let shed = fx
            .catalog
            .create_box(Some(&b), NewBox::new("Shed", Location::Garage))
            .await
            .unwrap();
        let item = fx
            .catalog
            .create_item(Some(&b), NewItem::new("Saw", &shed.id))
            .await
            .unwrap();

        let err = fx
            .catalog
            .upload_item_image(Some(&alice()), &item.id, "x.jpg", "image/jpeg", vec![1])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(fx.item_images.is_empty());

        let err = fx
            .catalog
            .upload_item_image(None, &item.id, "x.jpg", "image/jpeg", vec![1])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_box_qr_code() {
        let fx = fixture();
        let a = alice();
        let shed = fx
            .catalog
            .create_box(Some(&a), NewBox::new("Shed", Location::Garage))
            .await
            .unwrap();

        let url = fx
            .catalog
            .upload_box_qr_code(Some(&a), &shed.id, vec![0x89, b'P', b'N', b'G'])
            .await
            .unwrap();
        let key = box_qr_code_key(&a.user_id, &shed.id, &shed.qr_code_id);
        assert!(fx.box_qrcodes.contains(&key));
        assert_eq!(
            fx.catalog.box_qr_code_url(Some(&a), &shed.id).await.unwrap(),
            Some(url)
        );
        assert_eq!(fx.catalog.box_qr_code_url(Some(&bob()), &shed.id).await.unwrap(), None);

        let err = fx
            .catalog
            .upload_box_qr_code(Some(&bob()), &shed.id, vec![1])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
