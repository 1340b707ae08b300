use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::db::set_current_user;
use crate::error::{AppError, AppResult};
use crate::models::{
    BoxChanges, BoxModel, BoxWithItems, ImageModel, ItemChanges, ItemModel, ItemWithImages,
    NewBox, NewImage, NewItem, PasswordResetModel, UserModel,
};

use super::{like_pattern, BoxFilter, BoxKey, InventoryStore, ItemFilter, UserStore};

const BOX_COLUMNS: &str = "id::text AS id, name, location, category, description, \
     created_at, qr_code_id, user_id::text AS user_id";

const ITEM_COLUMNS: &str = "id::text AS id, name, description, box_id::text AS box_id, \
     category, date_stored, barcode, created_at, user_id::text AS user_id";

const IMAGE_COLUMNS: &str = "id::text AS id, item_id::text AS item_id, storage_path, \
     created_at, user_id::text AS user_id";

const USER_COLUMNS: &str = "id::text AS id, email, password_hash, created_at";

#[derive(FromRow)]
struct BoxWithItemsRow {
    #[sqlx(flatten)]
    record: BoxModel,
    items: Json<Vec<ItemModel>>,
}

#[derive(FromRow)]
struct ItemWithImagesRow {
    #[sqlx(flatten)]
    record: ItemModel,
    images: Json<Vec<ImageModel>>,
}

/// Values of a dynamically built statement, bound in order.
enum Arg {
    Text(Option<String>),
    Time(DateTime<Utc>),
}

/// Ids that are not UUIDs cannot match any row.
fn is_row_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

fn map_unique(e: sqlx::Error, message: &str) -> AppError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => AppError::Conflict(message.to_string()),
        _ => AppError::Database(e),
    }
}

/// Postgres-backed store. Each call runs on a connection whose
/// `app.current_user_id` is set to the owner, and every statement also
/// carries an explicit `user_id` predicate.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn owner_conn(&self, owner: &str) -> AppResult<PoolConnection<Postgres>> {
        let mut conn = self.pool.acquire().await?;
        set_current_user(&mut conn, owner).await?;
        Ok(conn)
    }

    async fn select_one_box(
        conn: &mut PoolConnection<Postgres>,
        owner: &str,
        id: &str,
    ) -> AppResult<Option<BoxModel>> {
        let sql = format!(
            "SELECT {} FROM boxes WHERE id = $1::uuid AND user_id = $2::uuid",
            BOX_COLUMNS
        );
        Ok(sqlx::query_as::<_, BoxModel>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut **conn)
            .await?)
    }

    async fn select_one_item(
        conn: &mut PoolConnection<Postgres>,
        owner: &str,
        id: &str,
    ) -> AppResult<Option<ItemModel>> {
        let sql = format!(
            "SELECT {} FROM items WHERE id = $1::uuid AND user_id = $2::uuid",
            ITEM_COLUMNS
        );
        Ok(sqlx::query_as::<_, ItemModel>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut **conn)
            .await?)
    }

    async fn owns_box(
        conn: &mut PoolConnection<Postgres>,
        owner: &str,
        box_id: &str,
    ) -> AppResult<bool> {
        if !is_row_id(box_id) {
            return Ok(false);
        }
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM boxes WHERE id = $1::uuid AND user_id = $2::uuid)",
        )
        .bind(box_id)
        .bind(owner)
        .fetch_one(&mut **conn)
        .await?;
        Ok(exists)
    }
}

#[tonic::async_trait]
impl InventoryStore for PgStore {
    async fn select_boxes(&self, owner: &str, filter: &BoxFilter) -> AppResult<Vec<BoxModel>> {
        let mut conn = self.owner_conn(owner).await?;

        // Build dynamic WHERE clause
        let mut conditions = vec!["user_id = $1::uuid".to_string()];
        let mut args: Vec<String> = Vec::new();
        let mut param_idx = 2u32;

        if let Some(text) = filter.text.as_deref() {
            conditions.push(format!(
                "(name ILIKE ${0} OR category ILIKE ${0} OR description ILIKE ${0})",
                param_idx
            ));
            param_idx += 1;
            args.push(like_pattern(text));
        }
        if let Some(location) = filter.location {
            conditions.push(format!("location = ${}", param_idx));
            param_idx += 1;
            args.push(location.as_str().to_string());
        }
        if let Some(category) = filter.category.as_deref() {
            conditions.push(format!("category = ${}", param_idx));
            args.push(category.to_string());
        }

        let sql = format!(
            "SELECT {} FROM boxes WHERE {} ORDER BY created_at DESC",
            BOX_COLUMNS,
            conditions.join(" AND ")
        );

        let mut query = sqlx::query_as::<_, BoxModel>(&sql).bind(owner);
        for arg in args {
            query = query.bind(arg);
        }
        Ok(query.fetch_all(&mut *conn).await?)
    }

    async fn select_box(&self, owner: &str, key: BoxKey<'_>) -> AppResult<Option<BoxWithItems>> {
        let (predicate, value) = match key {
            BoxKey::Id(id) if is_row_id(id) => ("b.id = $2::uuid", id),
            BoxKey::Id(_) => return Ok(None),
            BoxKey::QrCode(qr) => ("b.qr_code_id = $2", qr),
        };

        let mut conn = self.owner_conn(owner).await?;

        let sql = format!(
            "SELECT b.id::text AS id, b.name, b.location, b.category, b.description, \
             b.created_at, b.qr_code_id, b.user_id::text AS user_id, \
             COALESCE((SELECT json_agg(i ORDER BY i.created_at DESC) FROM items i \
                       WHERE i.box_id = b.id AND i.user_id = b.user_id), '[]'::json) AS items \
             FROM boxes b WHERE b.user_id = $1::uuid AND {}",
            predicate
        );

        let row: Option<BoxWithItemsRow> = sqlx::query_as(&sql)
            .bind(owner)
            .bind(value)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(|r| BoxWithItems {
            record: r.record,
            items: r.items.0,
        }))
    }

    async fn insert_box(
        &self,
        owner: &str,
        new_box: &NewBox,
        qr_code_id: &str,
    ) -> AppResult<BoxModel> {
        let mut conn = self.owner_conn(owner).await?;

        let sql = format!(
            "INSERT INTO boxes (name, location, category, description, qr_code_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6::uuid) RETURNING {}",
            BOX_COLUMNS
        );

        sqlx::query_as::<_, BoxModel>(&sql)
            .bind(&new_box.name)
            .bind(new_box.location.as_str())
            .bind(new_box.category.as_deref())
            .bind(new_box.description.as_deref())
            .bind(qr_code_id)
            .bind(owner)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| map_unique(e, "QR code id already in use"))
    }

    async fn update_box(
        &self,
        owner: &str,
        id: &str,
        changes: &BoxChanges,
    ) -> AppResult<Option<BoxModel>> {
        if !is_row_id(id) {
            return Ok(None);
        }
        let mut conn = self.owner_conn(owner).await?;
        if changes.is_empty() {
            return Self::select_one_box(&mut conn, owner, id).await;
        }

        let mut sets = Vec::new();
        let mut args = Vec::new();
        if let Some(name) = &changes.name {
            args.push(Arg::Text(Some(name.clone())));
            sets.push(format!("name = ${}", args.len()));
        }
        if let Some(location) = changes.location {
            args.push(Arg::Text(Some(location.as_str().to_string())));
            sets.push(format!("location = ${}", args.len()));
        }
        if let Some(category) = &changes.category {
            args.push(Arg::Text(category.clone()));
            sets.push(format!("category = ${}", args.len()));
        }
        if let Some(description) = &changes.description {
            args.push(Arg::Text(description.clone()));
            sets.push(format!("description = ${}", args.len()));
        }

        let sql = format!(
            "UPDATE boxes SET {} WHERE id = ${}::uuid AND user_id = ${}::uuid RETURNING {}",
            sets.join(", "),
            args.len() + 1,
            args.len() + 2,
            BOX_COLUMNS
        );

        let mut query = sqlx::query_as::<_, BoxModel>(&sql);
        for arg in args {
            query = match arg {
                Arg::Text(v) => query.bind(v),
                Arg::Time(t) => query.bind(t),
            };
        }
        Ok(query
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *conn)
            .await?)
    }

    async fn delete_box(&self, owner: &str, id: &str) -> AppResult<u64> {
        if !is_row_id(id) {
            return Ok(0);
        }
        let mut conn = self.owner_conn(owner).await?;

        // items and images follow through ON DELETE CASCADE
        let rows_affected = sqlx::query("DELETE FROM boxes WHERE id = $1::uuid AND user_id = $2::uuid")
            .bind(id)
            .bind(owner)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn select_items(&self, owner: &str, filter: &ItemFilter) -> AppResult<Vec<ItemModel>> {
        if filter.box_id.as_deref().is_some_and(|id| !is_row_id(id)) {
            return Ok(Vec::new());
        }
        let mut conn = self.owner_conn(owner).await?;

        let mut conditions = vec!["user_id = $1::uuid".to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(text) = filter.text.as_deref() {
            args.push(like_pattern(text));
            conditions.push(format!(
                "(name ILIKE ${0} OR description ILIKE ${0} OR category ILIKE ${0} OR barcode ILIKE ${0})",
                args.len() + 1
            ));
        }
        if let Some(category) = filter.category.as_deref() {
            args.push(category.to_string());
            conditions.push(format!("category = ${}", args.len() + 1));
        }
        if let Some(box_id) = filter.box_id.as_deref() {
            args.push(box_id.to_string());
            conditions.push(format!("box_id = ${}::uuid", args.len() + 1));
        }
        if let Some(barcode) = filter.barcode.as_deref() {
            args.push(barcode.to_string());
            conditions.push(format!("barcode = ${}", args.len() + 1));
        }

        let sql = format!(
            "SELECT {} FROM items WHERE {} ORDER BY created_at DESC",
            ITEM_COLUMNS,
            conditions.join(" AND ")
        );

        let mut query = sqlx::query_as::<_, ItemModel>(&sql).bind(owner);
        for arg in args {
            query = query.bind(arg);
        }
        Ok(query.fetch_all(&mut *conn).await?)
    }

    async fn select_item(&self, owner: &str, id: &str) -> AppResult<Option<ItemWithImages>> {
        if !is_row_id(id) {
            return Ok(None);
        }
        let mut conn = self.owner_conn(owner).await?;

        let row: Option<ItemWithImagesRow> = sqlx::query_as(
            "SELECT i.id::text AS id, i.name, i.description, i.box_id::text AS box_id, \
             i.category, i.date_stored, i.barcode, i.created_at, i.user_id::text AS user_id, \
             COALESCE((SELECT json_agg(img ORDER BY img.created_at DESC) FROM images img \
                       WHERE img.item_id = i.id AND img.user_id = i.user_id), '[]'::json) AS images \
             FROM items i WHERE i.id = $1::uuid AND i.user_id = $2::uuid",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(|r| ItemWithImages {
            record: r.record,
            images: r.images.0,
        }))
    }

    async fn insert_item(&self, owner: &str, new_item: &NewItem) -> AppResult<ItemModel> {
        if !is_row_id(&new_item.box_id) {
            return Err(AppError::NotFound("Box not found".to_string()));
        }
        let mut conn = self.owner_conn(owner).await?;

        // The SELECT yields no row unless the target box belongs to the owner.
        let sql = format!(
            "INSERT INTO items (name, description, box_id, category, date_stored, barcode, user_id) \
             SELECT $1, $2, b.id, $3, COALESCE($4, NOW()), $5, b.user_id \
             FROM boxes b WHERE b.id = $6::uuid AND b.user_id = $7::uuid \
             RETURNING {}",
            ITEM_COLUMNS
        );

        let row: Option<ItemModel> = sqlx::query_as(&sql)
            .bind(&new_item.name)
            .bind(new_item.description.as_deref())
            .bind(new_item.category.as_deref())
            .bind(new_item.date_stored)
            .bind(new_item.barcode.as_deref())
            .bind(&new_item.box_id)
            .bind(owner)
            .fetch_optional(&mut *conn)
            .await?;

        row.ok_or_else(|| AppError::NotFound("Box not found".to_string()))
    }

    async fn update_item(
        &self,
        owner: &str,
        id: &str,
        changes: &ItemChanges,
    ) -> AppResult<Option<ItemModel>> {
        if !is_row_id(id) {
            return Ok(None);
        }
        let mut conn = self.owner_conn(owner).await?;
        if let Some(box_id) = changes.box_id.as_deref() {
            if !Self::owns_box(&mut conn, owner, box_id).await? {
                return Err(AppError::NotFound("Box not found".to_string()));
            }
        }
        if changes.is_empty() {
            return Self::select_one_item(&mut conn, owner, id).await;
        }

        let mut sets = Vec::new();
        let mut args = Vec::new();
        if let Some(name) = &changes.name {
            args.push(Arg::Text(Some(name.clone())));
            sets.push(format!("name = ${}", args.len()));
        }
        if let Some(box_id) = &changes.box_id {
            args.push(Arg::Text(Some(box_id.clone())));
            sets.push(format!("box_id = ${}::uuid", args.len()));
        }
        if let Some(description) = &changes.description {
            args.push(Arg::Text(description.clone()));
            sets.push(format!("description = ${}", args.len()));
        }
        if let Some(category) = &changes.category {
            args.push(Arg::Text(category.clone()));
            sets.push(format!("category = ${}", args.len()));
        }
        if let Some(date_stored) = changes.date_stored {
            args.push(Arg::Time(date_stored));
            sets.push(format!("date_stored = ${}", args.len()));
        }
        if let Some(barcode) = &changes.barcode {
            args.push(Arg::Text(barcode.clone()));
            sets.push(format!("barcode = ${}", args.len()));
        }

        let sql = format!(
            "UPDATE items SET {} WHERE id = ${}::uuid AND user_id = ${}::uuid RETURNING {}",
            sets.join(", "),
            args.len() + 1,
            args.len() + 2,
            ITEM_COLUMNS
        );

        let mut query = sqlx::query_as::<_, ItemModel>(&sql);
        for arg in args {
            query = match arg {
                Arg::Text(v) => query.bind(v),
                Arg::Time(t) => query.bind(t),
            };
        }
        Ok(query
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *conn)
            .await?)
    }

    async fn delete_item(&self, owner: &str, id: &str) -> AppResult<u64> {
        if !is_row_id(id) {
            return Ok(0);
        }
        let mut conn = self.owner_conn(owner).await?;

        let rows_affected = sqlx::query("DELETE FROM items WHERE id = $1::uuid AND user_id = $2::uuid")
            .bind(id)
            .bind(owner)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn select_images(&self, owner: &str, item_id: &str) -> AppResult<Vec<ImageModel>> {
        if !is_row_id(item_id) {
            return Ok(Vec::new());
        }
        let mut conn = self.owner_conn(owner).await?;

        let sql = format!(
            "SELECT {} FROM images WHERE item_id = $1::uuid AND user_id = $2::uuid \
             ORDER BY created_at DESC",
            IMAGE_COLUMNS
        );
        Ok(sqlx::query_as::<_, ImageModel>(&sql)
            .bind(item_id)
            .bind(owner)
            .fetch_all(&mut *conn)
            .await?)
    }

    async fn select_image(&self, owner: &str, id: &str) -> AppResult<Option<ImageModel>> {
        if !is_row_id(id) {
            return Ok(None);
        }
        let mut conn = self.owner_conn(owner).await?;

        let sql = format!(
            "SELECT {} FROM images WHERE id = $1::uuid AND user_id = $2::uuid",
            IMAGE_COLUMNS
        );
        Ok(sqlx::query_as::<_, ImageModel>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *conn)
            .await?)
    }

    async fn insert_image(&self, owner: &str, new_image: &NewImage) -> AppResult<ImageModel> {
        if !is_row_id(&new_image.item_id) {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        let mut conn = self.owner_conn(owner).await?;
        if Self::select_one_item(&mut conn, owner, &new_image.item_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Item not found".to_string()));
        }

        let sql = format!(
            "INSERT INTO images (item_id, storage_path, user_id) \
             VALUES ($1::uuid, $2, $3::uuid) RETURNING {}",
            IMAGE_COLUMNS
        );
        Ok(sqlx::query_as::<_, ImageModel>(&sql)
            .bind(&new_image.item_id)
            .bind(&new_image.storage_path)
            .bind(owner)
            .fetch_one(&mut *conn)
            .await?)
    }

    async fn delete_image(&self, owner: &str, id: &str) -> AppResult<u64> {
        if !is_row_id(id) {
            return Ok(0);
        }
        let mut conn = self.owner_conn(owner).await?;

        let rows_affected = sqlx::query("DELETE FROM images WHERE id = $1::uuid AND user_id = $2::uuid")
            .bind(id)
            .bind(owner)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

#[tonic::async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserModel>> {
        let sql = format!("SELECT {} FROM users WHERE email = lower(trim($1))", USER_COLUMNS);
        Ok(sqlx::query_as::<_, UserModel>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user(&self, id: &str) -> AppResult<Option<UserModel>> {
        if !is_row_id(id) {
            return Ok(None);
        }
        let sql = format!("SELECT {} FROM users WHERE id = $1::uuid", USER_COLUMNS);
        Ok(sqlx::query_as::<_, UserModel>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_user(&self, email: &str, password_hash: &str) -> AppResult<UserModel> {
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES (lower(trim($1)), $2) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserModel>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique(e, "Email already registered"))
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> AppResult<()> {
        let rows_affected = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2::uuid")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn insert_password_reset(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO password_resets (token_hash, user_id, expires_at) VALUES ($1, $2::uuid, $3)",
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn take_password_reset(&self, token_hash: &str) -> AppResult<Option<PasswordResetModel>> {
        Ok(sqlx::query_as::<_, PasswordResetModel>(
            "DELETE FROM password_resets WHERE token_hash = $1 \
             RETURNING user_id::text AS user_id, token_hash, expires_at",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?)
    }
}
