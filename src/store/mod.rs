// Row backend abstraction for boxes, items, images and users

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::models::{
    BoxChanges, BoxModel, BoxWithItems, ImageModel, ItemChanges, ItemModel, ItemWithImages,
    Location, NewBox, NewImage, NewItem, PasswordResetModel, UserModel,
};

/// Predicates for box queries. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxFilter {
    /// Case-insensitive "contains" over name, category and description.
    pub text: Option<String>,
    pub location: Option<Location>,
    pub category: Option<String>,
}

impl BoxFilter {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn location(location: Location) -> Self {
        Self {
            location: Some(location),
            ..Default::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }
}

/// Predicates for item queries. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    /// Case-insensitive "contains" over name, description, category and barcode.
    pub text: Option<String>,
    pub category: Option<String>,
    pub box_id: Option<String>,
    /// Exact barcode match.
    pub barcode: Option<String>,
}

impl ItemFilter {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn in_box(box_id: impl Into<String>) -> Self {
        Self {
            box_id: Some(box_id.into()),
            ..Default::default()
        }
    }

    pub fn barcode(barcode: impl Into<String>) -> Self {
        Self {
            barcode: Some(barcode.into()),
            ..Default::default()
        }
    }
}

/// How a single box is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKey<'a> {
    Id(&'a str),
    QrCode(&'a str),
}

/// Row storage for the inventory.
///
/// Every method takes the owning user id and applies it as a predicate, so a
/// row owned by someone else behaves exactly like a missing row. Lists come
/// back newest first.
#[tonic::async_trait]
pub trait InventoryStore: Send + Sync {
    async fn select_boxes(&self, owner: &str, filter: &BoxFilter) -> AppResult<Vec<BoxModel>>;

    /// The box with its items attached, fetched in one round trip.
    async fn select_box(&self, owner: &str, key: BoxKey<'_>) -> AppResult<Option<BoxWithItems>>;

    async fn insert_box(&self, owner: &str, new_box: &NewBox, qr_code_id: &str)
        -> AppResult<BoxModel>;

    async fn update_box(
        &self,
        owner: &str,
        id: &str,
        changes: &BoxChanges,
    ) -> AppResult<Option<BoxModel>>;

    /// Removes the box; its items and their images go with it.
    async fn delete_box(&self, owner: &str, id: &str) -> AppResult<u64>;

    async fn select_items(&self, owner: &str, filter: &ItemFilter) -> AppResult<Vec<ItemModel>>;

    async fn select_item(&self, owner: &str, id: &str) -> AppResult<Option<ItemWithImages>>;

    async fn insert_item(&self, owner: &str, new_item: &NewItem) -> AppResult<ItemModel>;

    async fn update_item(
        &self,
        owner: &str,
        id: &str,
        changes: &ItemChanges,
    ) -> AppResult<Option<ItemModel>>;

    async fn delete_item(&self, owner: &str, id: &str) -> AppResult<u64>;

    async fn select_images(&self, owner: &str, item_id: &str) -> AppResult<Vec<ImageModel>>;

    async fn select_image(&self, owner: &str, id: &str) -> AppResult<Option<ImageModel>>;

    async fn insert_image(&self, owner: &str, new_image: &NewImage) -> AppResult<ImageModel>;

    async fn delete_image(&self, owner: &str, id: &str) -> AppResult<u64>;
}

/// Account storage used by the auth service.
#[tonic::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserModel>>;

    async fn find_user(&self, id: &str) -> AppResult<Option<UserModel>>;

    /// Fails with [`crate::AppError::Conflict`] when the email is taken.
    async fn insert_user(&self, email: &str, password_hash: &str) -> AppResult<UserModel>;

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> AppResult<()>;

    async fn insert_password_reset(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Removes and returns the reset row, so a token works once.
    async fn take_password_reset(&self, token_hash: &str) -> AppResult<Option<PasswordResetModel>>;
}

/// Escapes LIKE metacharacters so user text matches literally.
pub fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Case-insensitive "contains" with the same semantics as `ILIKE '%text%'`.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("coat"), "%coat%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_contains_ci() {
        assert!(contains_ci("Winter Gear", "gear"));
        assert!(contains_ci("winter gear", "GEAR"));
        assert!(!contains_ci("Winter Gear", "boots"));
    }
}
