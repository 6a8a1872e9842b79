//! MBTiles archive writer backed by SQLite through sqlx.
//!
//! The MBTiles container stores rows in the TMS convention (row 0 at the
//! south edge) while the tile service addresses rows in XYZ (row 0 at the
//! north edge). Every write flips the row with `TileCoord::flip_y` and
//! every read flips it back; getting this wrong produces a vertically
//! mirrored map.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use tiler_common::{BoundingBox, TileCoord, TilerError, TilerResult, ZoomRange};

/// Descriptive metadata written once per archive.
#[derive(Debug, Clone)]
pub struct ArchiveMetadata {
    pub name: String,
    pub description: String,
    pub bounds: BoundingBox,
    pub zoom_range: ZoomRange,
    /// Tile image format identifier ("png").
    pub format: String,
}

/// An open MBTiles archive.
pub struct Archive {
    pool: SqlitePool,
}

fn archive_err(err: sqlx::Error) -> TilerError {
    TilerError::Archive(err.to_string())
}

impl Archive {
    /// Open (creating if absent) an MBTiles archive and ensure its schema.
    pub async fn open(path: &Path) -> TilerResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        // All writes funnel through the single dedicated writer task, so
        // one connection is enough
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(archive_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metadata (
                name TEXT,
                value TEXT
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(archive_err)?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS metadata_index \
             ON metadata (name)",
        )
        .execute(&pool)
        .await
        .map_err(archive_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tiles (
                zoom_level INTEGER,
                tile_column INTEGER,
                tile_row INTEGER,
                tile_data BLOB
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(archive_err)?;

        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS tile_index \
             ON tiles (zoom_level, tile_column, tile_row)",
        )
        .execute(&pool)
        .await
        .map_err(archive_err)?;

        info!(path = %path.display(), "Opened MBTiles archive");

        Ok(Self { pool })
    }

    /// Write the descriptive metadata record. Re-runs replace existing
    /// values rather than duplicating them.
    pub async fn write_metadata(&self, meta: &ArchiveMetadata) -> TilerResult<()> {
        let entries = [
            ("name", meta.name.clone()),
            ("type", "baselayer".to_string()),
            ("version", "1.0".to_string()),
            ("description", meta.description.clone()),
            ("format", meta.format.clone()),
            ("bounds", meta.bounds.metadata_string()),
            ("minzoom", meta.zoom_range.min.to_string()),
            ("maxzoom", meta.zoom_range.max.to_string()),
            ("scheme", "tms".to_string()),
        ];

        let mut tx = self.pool.begin().await.map_err(archive_err)?;
        for (name, value) in entries {
            sqlx::query(
                "INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)",
            )
            .bind(name)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(archive_err)?;
        }
        tx.commit().await.map_err(archive_err)?;

        debug!(name = %meta.name, "Wrote archive metadata");
        Ok(())
    }

    /// Commit a batch of tiles in one transaction. Rows are flipped from
    /// XYZ to TMS on the way in; existing entries at the same key are
    /// replaced.
    pub async fn put_tiles(&self, batch: &[(TileCoord, Vec<u8>)]) -> TilerResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(archive_err)?;
        for (coord, data) in batch {
            sqlx::query(
                "INSERT OR REPLACE INTO tiles \
                 (zoom_level, tile_column, tile_row, tile_data) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(coord.z as i64)
            .bind(coord.x as i64)
            .bind(coord.flip_y() as i64)
            .bind(data.as_slice())
            .execute(&mut *tx)
            .await
            .map_err(archive_err)?;
        }
        tx.commit().await.map_err(archive_err)?;

        debug!(tiles = batch.len(), "Committed tile batch");
        Ok(())
    }

    /// Fetch a tile by its service (XYZ) coordinate, applying the
    /// inverse row flip.
    pub async fn get_tile(&self, coord: &TileCoord) -> TilerResult<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as(
            "SELECT tile_data FROM tiles \
             WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
        )
        .bind(coord.z as i64)
        .bind(coord.x as i64)
        .bind(coord.flip_y() as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(archive_err)?;

        Ok(row.map(|(data,)| data))
    }

    /// Number of tiles stored in the archive.
    pub async fn tile_count(&self) -> TilerResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tiles")
            .fetch_one(&self.pool)
            .await
            .map_err(archive_err)?;
        Ok(count as u64)
    }

    /// Read a metadata value by name.
    pub async fn metadata_value(&self, name: &str) -> TilerResult<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM metadata WHERE name = ?1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(archive_err)?;
        Ok(row.map(|(value,)| value))
    }

    /// Raw stored (TMS) row of a tile entry, for verifying the inversion.
    pub async fn stored_row(&self, zoom: u32, column: u32) -> TilerResult<Option<u32>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT tile_row FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2",
        )
        .bind(zoom as i64)
        .bind(column as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(archive_err)?;
        Ok(row.map(|(r,)| r as u32))
    }

    /// Flush and close the archive.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
