//! In-process stub tile service for fetcher and pipeline tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use image::{Rgba, RgbaImage};

/// Tile key in service terms: (z, x, y).
pub type TileKey = (u32, u32, u32);

#[derive(Default)]
pub struct StubTiles {
    /// Body returned for every successful tile request.
    pub body: Vec<u8>,
    /// Tiles that always answer 500.
    pub failing: Vec<TileKey>,
    /// Tiles that answer 404.
    pub missing: Vec<TileKey>,
    /// Request count per tile.
    pub hits: Mutex<HashMap<TileKey, u32>>,
}

impl StubTiles {
    pub fn new() -> Self {
        Self {
            body: blank_png(),
            ..Default::default()
        }
    }

    pub fn hit_count(&self, key: TileKey) -> u32 {
        *self.hits.lock().unwrap().get(&key).unwrap_or(&0)
    }
}

/// A blank 256x256 PNG, the fixed response body for successful fetches.
pub fn blank_png() -> Vec<u8> {
    let image = RgbaImage::from_pixel(256, 256, Rgba([230, 230, 230, 255]));
    let mut buffer = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    buffer
}

async fn tile_handler(
    Path((z, y, x)): Path<(u32, u32, u32)>,
    State(state): State<Arc<StubTiles>>,
) -> Response {
    let key = (z, x, y);
    *state.hits.lock().unwrap().entry(key).or_insert(0) += 1;

    if state.missing.contains(&key) {
        return StatusCode::NOT_FOUND.into_response();
    }
    if state.failing.contains(&key) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (
        [(header::CONTENT_TYPE, "image/png")],
        state.body.clone(),
    )
        .into_response()
}

/// Bind the stub service on an ephemeral port and return its base URL.
pub async fn spawn_stub(state: Arc<StubTiles>) -> String {
    let app = Router::new()
        .route("/tile/:z/:y/:x", get(tile_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
