//! PostgreSQL room repository.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use websharex_core::error::{AppError, ErrorKind};
use websharex_core::result::AppResult;
use websharex_entity::room::{Room, RoomPatch};

use super::RoomStore;

/// Repository for room rows.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    /// Create a new room repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomStore for RoomRepository {
    async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list rooms", e))
    }

    async fn get_room(&self, name: &str) -> AppResult<Option<Room>> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find room", e))
    }

    async fn create_room(&self, name: &str, password_hash: &str) -> AppResult<Room> {
        sqlx::query_as::<_, Room>(
            "INSERT INTO rooms (name, password_hash) VALUES ($1, $2) \
             ON CONFLICT (name) DO NOTHING RETURNING *",
        )
        .bind(name)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create room", e))?
        .ok_or_else(|| AppError::conflict(format!("Room '{name}' already exists")))
    }

    async fn update_room(&self, name: &str, patch: RoomPatch) -> AppResult<Room> {
        let set_cursor = patch.current_folder_id.is_some();
        let cursor = patch.current_folder_id.flatten();
        let entries = patch.entries.as_ref().map(Json);

        sqlx::query_as::<_, Room>(
            "UPDATE rooms SET \
               entries = COALESCE($2, entries), \
               current_folder_id = CASE WHEN $3 THEN $4 ELSE current_folder_id END, \
               updated_at = NOW() \
             WHERE name = $1 RETURNING *",
        )
        .bind(name)
        .bind(entries)
        .bind(set_cursor)
        .bind(cursor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update room", e))?
        .ok_or_else(|| AppError::not_found(format!("Room '{name}' not found")))
    }

    async fn delete_room(&self, name: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete room", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
