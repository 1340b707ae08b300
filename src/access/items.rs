use crate::error::{AppError, AppResult};
use crate::models::{ItemChanges, ItemModel, ItemWithImages, NewItem};
use crate::store::ItemFilter;
use crate::validation::{validate_item_changes, validate_new_item};

use super::{or_empty, or_none, require_session, Catalog, Session};

impl Catalog {
    pub async fn list_items(&self, session: Option<&Session>) -> Vec<ItemModel> {
        self.query_items(session, &ItemFilter::default()).await
    }

    pub async fn list_items_in_box(&self, session: Option<&Session>, box_id: &str) -> Vec<ItemModel> {
        self.query_items(session, &ItemFilter::in_box(box_id)).await
    }

    pub async fn search_items(&self, session: Option<&Session>, text: &str) -> Vec<ItemModel> {
        self.query_items(session, &ItemFilter::text(text)).await
    }

    pub async fn filter_items_by_category(
        &self,
        session: Option<&Session>,
        category: &str,
    ) -> Vec<ItemModel> {
        self.query_items(session, &ItemFilter::category(category)).await
    }

    /// Exact barcode lookup, used after scanning a product.
    pub async fn find_items_by_barcode(&self, session: Option<&Session>, barcode: &str) -> Vec<ItemModel> {
        self.query_items(session, &ItemFilter::barcode(barcode)).await
    }

    pub async fn query_items(&self, session: Option<&Session>, filter: &ItemFilter) -> Vec<ItemModel> {
        let Some(session) = session else {
            return Vec::new();
        };
        or_empty(
            "query_items",
            self.store.select_items(&session.user_id, filter).await,
        )
    }

    pub async fn get_item(&self, session: Option<&Session>, id: &str) -> AppResult<Option<ItemWithImages>> {
        let session = require_session(session)?;
        or_none("get_item", self.store.select_item(&session.user_id, id).await)
    }

    /// The target box must belong to the caller.
    pub async fn create_item(&self, session: Option<&Session>, new_item: NewItem) -> AppResult<ItemModel> {
        let session = require_session(session)?;
        validate_new_item(&new_item)?;

        let created = self.store.insert_item(&session.user_id, &new_item).await?;
        tracing::info!("Item created: id={}, box_id={}", created.id, created.box_id);
        Ok(created)
    }

    pub async fn update_item(
        &self,
        session: Option<&Session>,
        id: &str,
        changes: ItemChanges,
    ) -> AppResult<ItemModel> {
        let session = require_session(session)?;
        validate_item_changes(&changes)?;

        self.store
            .update_item(&session.user_id, id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    /// Deletes the item and its images.
    pub async fn delete_item(&self, session: Option<&Session>, id: &str) -> AppResult<u64> {
        let session = require_session(session)?;
        let owner = session.user_id.as_str();

        let image_keys: Vec<String> = self
            .store
            .select_images(owner, id)
            .await?
            .into_iter()
            .map(|image| image.storage_path)
            .collect();

        let deleted = self.store.delete_item(owner, id).await?;
        if deleted > 0 {
            for key in image_keys {
                if let Err(e) = self.buckets.item_images.delete(&key).await {
                    tracing::warn!("Failed to delete item image {}: {}", key, e);
                }
            }
            tracing::info!("Item deleted: id={}", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::{alice, bob, fixture};
    use crate::models::{Location, NewBox};

    #[tokio::test]
    async fn test_winter_gear_scenario() {
        let fx = fixture();
        let a = alice();
        let winter = fx
            .catalog
            .create_box(Some(&a), NewBox::new("Winter Gear", Location::Attic))
            .await
            .unwrap();
        let coat = fx
            .catalog
            .create_item(Some(&a), NewItem::new("Wool Coat", &winter.id))
            .await
            .unwrap();

        let hits = fx.catalog.search_items(Some(&a), "coat").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, coat.id);
        assert!(fx.catalog.search_items(Some(&a), "boots").await.is_empty());

        let detail = fx.catalog.get_box(Some(&a), &winter.id).await.unwrap().unwrap();
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].name, "Wool Coat");
    }

    #[tokio::test]
    async fn test_item_needs_owned_box() {
        let fx = fixture();
        let (a, b) = (alice(), bob());
        let theirs = fx
            .catalog
            .create_box(Some(&b), NewBox::new("Bob's", Location::Garage))
            .await
            .unwrap();

        let err = fx
            .catalog
            .create_item(Some(&a), NewItem::new("Sneaky", &theirs.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = fx
            .catalog
            .create_item(Some(&a), NewItem::new("Orphan", ""))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.for_field("box_id"), Some("Box is required"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_item_filters() {
        let fx = fixture();
        let a = alice();
        let shed = fx
            .catalog
            .create_box(Some(&a), NewBox::new("Shed", Location::Garage))
            .await
            .unwrap();
        let kitchen = fx
            .catalog
            .create_box(Some(&a), NewBox::new("Spare Kitchen", Location::Attic))
            .await
            .unwrap();
        fx.catalog
            .create_item(
                Some(&a),
                NewItem::new("Drill", &shed.id)
                    .with_category("Tools")
                    .with_barcode("4006381333931"),
            )
            .await
            .unwrap();
        fx.catalog
            .create_item(Some(&a), NewItem::new("Wok", &kitchen.id).with_category("Kitchen"))
            .await
            .unwrap();

        assert_eq!(fx.catalog.list_items(Some(&a)).await.len(), 2);
        assert_eq!(fx.catalog.list_items_in_box(Some(&a), &kitchen.id).await[0].name, "Wok");
        assert_eq!(
            fx.catalog.filter_items_by_category(Some(&a), "Tools").await[0].name,
            "Drill"
        );
        assert_eq!(
            fx.catalog
                .find_items_by_barcode(Some(&a), "4006381333931")
                .await
                .len(),
            1
        );
        assert!(fx.catalog.find_items_by_barcode(Some(&a), "400638").await.is_empty());
        assert_eq!(fx.catalog.search_items(Some(&a), "400638").await.len(), 1);
        assert!(fx.catalog.list_items(None).await.is_empty());
        assert!(fx.catalog.list_items(Some(&bob())).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_move_item() {
        let fx = fixture();
        let a = alice();
        let first = fx
            .catalog
            .create_box(Some(&a), NewBox::new("First", Location::Garage))
            .await
            .unwrap();
        let second = fx
            .catalog
            .create_box(Some(&a), NewBox::new("Second", Location::Attic))
            .await
            .unwrap();
        let item = fx
            .catalog
            .create_item(
                Some(&a),
                NewItem::new("Lantern", &first.id).with_description("battery"),
            )
            .await
            .unwrap();

        let moved = fx
            .catalog
            .update_item(Some(&a), &item.id, ItemChanges {
                box_id: Some(second.id.clone()),
                description: Some(None),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(moved.box_id, second.id);
        assert_eq!(moved.description, None);
        assert!(fx.catalog.list_items_in_box(Some(&a), &first.id).await.is_empty());

        let err = fx
            .catalog
            .update_item(Some(&a), &item.id, ItemChanges {
                name: Some(" ".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = fx
            .catalog
            .update_item(Some(&bob()), &item.id, ItemChanges {
                name: Some("Mine".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_item() {
        let fx = fixture();
        let a = alice();
        let shed = fx
            .catalog
            .create_box(Some(&a), NewBox::new("Shed", Location::Garage))
            .await
            .unwrap();
        let item = fx
            .catalog
            .create_item(Some(&a), NewItem::new("Rake", &shed.id))
            .await
            .unwrap();
        let image = fx
            .catalog
            .upload_item_image(Some(&a), &item.id, "rake.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(fx.catalog.delete_item(Some(&bob()), &item.id).await.unwrap(), 0);
        assert!(fx.item_images.contains(&image.storage_path));

        assert_eq!(fx.catalog.delete_item(Some(&a), &item.id).await.unwrap(), 1);
        assert!(!fx.item_images.contains(&image.storage_path));
        assert!(fx.catalog.get_item(Some(&a), &item.id).await.unwrap().is_none());
        assert_eq!(fx.catalog.delete_item(Some(&a), &item.id).await.unwrap(), 0);
    }
}
