use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    BoxChanges, BoxModel, BoxWithItems, ImageModel, ItemChanges, ItemModel, ItemWithImages,
    NewBox, NewImage, NewItem, PasswordResetModel, UserModel,
};

use super::{contains_ci, BoxFilter, BoxKey, InventoryStore, ItemFilter, UserStore};

#[derive(Default)]
struct Tables {
    boxes: Vec<BoxModel>,
    items: Vec<ItemModel>,
    images: Vec<ImageModel>,
    users: Vec<UserModel>,
    resets: Vec<PasswordResetModel>,
}

/// In-process store with the same visibility and cascade rules as the
/// Postgres schema. Used by tests and when no `DATABASE_URL` is configured.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

/// Newest first; rows created in the same instant keep reverse insertion order.
fn newest_first<T: Clone>(rows: impl DoubleEndedIterator<Item = T>, created: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.rev().collect();
    out.sort_by_key(|row| std::cmp::Reverse(created(row)));
    out
}

fn box_matches(row: &BoxModel, filter: &BoxFilter) -> bool {
    if let Some(text) = filter.text.as_deref() {
        let hit = contains_ci(&row.name, text)
            || row.category.as_deref().is_some_and(|c| contains_ci(c, text))
            || row.description.as_deref().is_some_and(|d| contains_ci(d, text));
        if !hit {
            return false;
        }
    }
    if filter.location.is_some_and(|l| l != row.location) {
        return false;
    }
    if let Some(category) = filter.category.as_deref() {
        if row.category.as_deref() != Some(category) {
            return false;
        }
    }
    true
}

fn item_matches(row: &ItemModel, filter: &ItemFilter) -> bool {
    if let Some(text) = filter.text.as_deref() {
        let hit = contains_ci(&row.name, text)
            || row.description.as_deref().is_some_and(|d| contains_ci(d, text))
            || row.category.as_deref().is_some_and(|c| contains_ci(c, text))
            || row.barcode.as_deref().is_some_and(|b| contains_ci(b, text));
        if !hit {
            return false;
        }
    }
    if let Some(category) = filter.category.as_deref() {
        if row.category.as_deref() != Some(category) {
            return false;
        }
    }
    if let Some(box_id) = filter.box_id.as_deref() {
        if row.box_id != box_id {
            return false;
        }
    }
    if let Some(barcode) = filter.barcode.as_deref() {
        if row.barcode.as_deref() != Some(barcode) {
            return false;
        }
    }
    true
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with a storage error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Internal("store offline".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.check_online()?;
        self.tables
            .read()
            .map_err(|_| AppError::Internal("store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Tables>> {
        self.check_online()?;
        self.tables
            .write()
            .map_err(|_| AppError::Internal("store lock poisoned".to_string()))
    }
}

impl Tables {
    fn owns_box(&self, owner: &str, box_id: &str) -> bool {
        self.boxes.iter().any(|b| b.id == box_id && b.user_id == owner)
    }

    fn owns_item(&self, owner: &str, item_id: &str) -> bool {
        self.items.iter().any(|i| i.id == item_id && i.user_id == owner)
    }

    fn items_of(&self, owner: &str, box_id: &str) -> Vec<ItemModel> {
        newest_first(
            self.items
                .iter()
                .filter(|i| i.user_id == owner && i.box_id == box_id)
                .cloned(),
            |i| i.created_at,
        )
    }

    fn images_of(&self, owner: &str, item_id: &str) -> Vec<ImageModel> {
        newest_first(
            self.images
                .iter()
                .filter(|i| i.user_id == owner && i.item_id == item_id)
                .cloned(),
            |i| i.created_at,
        )
    }
}

#[tonic::async_trait]
impl InventoryStore for MemoryStore {
    async fn select_boxes(&self, owner: &str, filter: &BoxFilter) -> AppResult<Vec<BoxModel>> {
        let tables = self.read()?;
        Ok(newest_first(
            tables
                .boxes
                .iter()
                .filter(|b| b.user_id == owner && box_matches(b, filter))
                .cloned(),
            |b| b.created_at,
        ))
    }

    async fn select_box(&self, owner: &str, key: BoxKey<'_>) -> AppResult<Option<BoxWithItems>> {
        let tables = self.read()?;
        let found = tables.boxes.iter().find(|b| {
            b.user_id == owner
                && match key {
                    BoxKey::Id(id) => b.id == id,
                    BoxKey::QrCode(qr) => b.qr_code_id == qr,
                }
        });
        Ok(found.map(|record| BoxWithItems {
            items: tables.items_of(owner, &record.id),
            record: record.clone(),
        }))
    }

    async fn insert_box(
        &self,
        owner: &str,
        new_box: &NewBox,
        qr_code_id: &str,
    ) -> AppResult<BoxModel> {
        let mut tables = self.write()?;
        if tables.boxes.iter().any(|b| b.qr_code_id == qr_code_id) {
            return Err(AppError::Conflict(format!("qr_code_id {}", qr_code_id)));
        }
        let row = BoxModel {
            id: Uuid::new_v4().to_string(),
            name: new_box.name.clone(),
            location: new_box.location,
            category: new_box.category.clone(),
            description: new_box.description.clone(),
            created_at: Utc::now(),
            qr_code_id: qr_code_id.to_string(),
            user_id: owner.to_string(),
        };
        tables.boxes.push(row.clone());
        Ok(row)
    }

    async fn update_box(
        &self,
        owner: &str,
        id: &str,
        changes: &BoxChanges,
    ) -> AppResult<Option<BoxModel>> {
        let mut tables = self.write()?;
        Ok(tables
            .boxes
            .iter_mut()
            .find(|b| b.id == id && b.user_id == owner)
            .map(|row| {
                changes.apply(row);
                row.clone()
            }))
    }

    async fn delete_box(&self, owner: &str, id: &str) -> AppResult<u64> {
        let mut tables = self.write()?;
        let before = tables.boxes.len();
        tables.boxes.retain(|b| !(b.id == id && b.user_id == owner));
        let deleted = (before - tables.boxes.len()) as u64;

        if deleted > 0 {
            let doomed: Vec<String> = tables
                .items
                .iter()
                .filter(|i| i.box_id == id)
                .map(|i| i.id.clone())
                .collect();
            tables.items.retain(|i| i.box_id != id);
            tables.images.retain(|img| !doomed.contains(&img.item_id));
        }
        Ok(deleted)
    }

    async fn select_items(&self, owner: &str, filter: &ItemFilter) -> AppResult<Vec<ItemModel>> {
        let tables = self.read()?;
        Ok(newest_first(
            tables
                .items
                .iter()
                .filter(|i| i.user_id == owner && item_matches(i, filter))
                .cloned(),
            |i| i.created_at,
        ))
    }

    async fn select_item(&self, owner: &str, id: &str) -> AppResult<Option<ItemWithImages>> {
        let tables = self.read()?;
        let found = tables
            .items
            .iter()
            .find(|i| i.id == id && i.user_id == owner);
        Ok(found.map(|record| ItemWithImages {
            images: tables.images_of(owner, &record.id),
            record: record.clone(),
        }))
    }

    async fn insert_item(&self, owner: &str, new_item: &NewItem) -> AppResult<ItemModel> {
        let mut tables = self.write()?;
        if !tables.owns_box(owner, &new_item.box_id) {
            return Err(AppError::NotFound("Box not found".to_string()));
        }
        let now = Utc::now();
        let row = ItemModel {
            id: Uuid::new_v4().to_string(),
            name: new_item.name.clone(),
            description: new_item.description.clone(),
            box_id: new_item.box_id.clone(),
            category: new_item.category.clone(),
            date_stored: new_item.date_stored.unwrap_or(now),
            barcode: new_item.barcode.clone(),
            created_at: now,
            user_id: owner.to_string(),
        };
        tables.items.push(row.clone());
        Ok(row)
    }

    async fn update_item(
        &self,
        owner: &str,
        id: &str,
        changes: &ItemChanges,
    ) -> AppResult<Option<ItemModel>> {
        let mut tables = self.write()?;
        if let Some(box_id) = changes.box_id.as_deref() {
            if !tables.owns_box(owner, box_id) {
                return Err(AppError::NotFound("Box not found".to_string()));
            }
        }
        Ok(tables
            .items
            .iter_mut()
            .find(|i| i.id == id && i.user_id == owner)
            .map(|row| {
                changes.apply(row);
                row.clone()
            }))
    }

    async fn delete_item(&self, owner: &str, id: &str) -> AppResult<u64> {
        let mut tables = self.write()?;
        let before = tables.items.len();
        tables.items.retain(|i| !(i.id == id && i.user_id == owner));
        let deleted = (before - tables.items.len()) as u64;
        if deleted > 0 {
            tables.images.retain(|img| img.item_id != id);
        }
        Ok(deleted)
    }

    async fn select_images(&self, owner: &str, item_id: &str) -> AppResult<Vec<ImageModel>> {
        Ok(self.read()?.images_of(owner, item_id))
    }

    async fn select_image(&self, owner: &str, id: &str) -> AppResult<Option<ImageModel>> {
        let tables = self.read()?;
        Ok(tables
            .images
            .iter()
            .find(|i| i.id == id && i.user_id == owner)
            .cloned())
    }

    async fn insert_image(&self, owner: &str, new_image: &NewImage) -> AppResult<ImageModel> {
        let mut tables = self.write()?;
        if !tables.owns_item(owner, &new_image.item_id) {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        let row = ImageModel {
            id: Uuid::new_v4().to_string(),
            item_id: new_image.item_id.clone(),
            storage_path: new_image.storage_path.clone(),
            created_at: Utc::now(),
            user_id: owner.to_string(),
        };
        tables.images.push(row.clone());
        Ok(row)
    }

    async fn delete_image(&self, owner: &str, id: &str) -> AppResult<u64> {
        let mut tables = self.write()?;
        let before = tables.images.len();
        tables.images.retain(|i| !(i.id == id && i.user_id == owner));
        Ok((before - tables.images.len()) as u64)
    }
}

#[tonic::async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserModel>> {
        let tables = self.read()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn find_user(&self, id: &str) -> AppResult<Option<UserModel>> {
        let tables = self.read()?;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, email: &str, password_hash: &str) -> AppResult<UserModel> {
        let mut tables = self.write()?;
        let email = email.trim().to_lowercase();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        let user = UserModel {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> AppResult<()> {
        let mut tables = self.write()?;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn insert_password_reset(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut tables = self.write()?;
        tables.resets.push(PasswordResetModel {
            user_id: user_id.to_string(),
            token_hash: token_hash.to_string(),
            expires_at,
        });
        Ok(())
    }

    async fn take_password_reset(&self, token_hash: &str) -> AppResult<Option<PasswordResetModel>> {
        let mut tables = self.write()?;
        let position = tables.resets.iter().position(|r| r.token_hash == token_hash);
        Ok(position.map(|i| tables.resets.remove(i)))
    }
}
