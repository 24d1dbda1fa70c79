use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::oneshot;

use crate::foundation::error::{TacticalError, TacticalResult};
use crate::render::canvas::Texture;
use crate::render::composite::premultiply_rgba8_in_place;

/// Decode encoded image bytes and convert to a premultiplied texture.
pub fn decode_texture(bytes: &[u8]) -> TacticalResult<Texture> {
    let dyn_img = image::load_from_memory(bytes).context("decode texture from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Texture::new(width, height, rgba8_premul)
}

fn read_texture(path: &Path) -> TacticalResult<Texture> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read texture '{}'", path.display()))
        .map_err(|e| TacticalError::asset(format!("{e:#}")))?;
    decode_texture(&bytes).map_err(|e| TacticalError::asset(e.to_string()))
}

/// Load state of the pitch background texture.
///
/// Loading happens off the render path; renders consult [`TextureSlot::poll`] and draw
/// without the texture until it is ready. A failed load is terminal.
#[derive(Debug, Default)]
pub enum TextureSlot {
    #[default]
    Absent,
    Loading {
        path: PathBuf,
        rx: oneshot::Receiver<TacticalResult<Texture>>,
    },
    Ready(Arc<Texture>),
    Failed,
}

impl TextureSlot {
    pub fn ready(texture: Texture) -> Self {
        Self::Ready(Arc::new(texture))
    }

    /// Start reading and decoding `path` on a background thread.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = oneshot::channel();
        let worker_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("texture-load".into())
            .spawn(move || {
                let _ = tx.send(read_texture(&worker_path));
            });
        match spawned {
            Ok(_) => Self::Loading { path, rx },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "texture loader did not start");
                Self::Failed
            }
        }
    }

    /// Non-blocking check; returns the texture once it is available.
    pub fn poll(&mut self) -> Option<Arc<Texture>> {
        if let Self::Loading { path, rx } = self {
            let next = match rx.try_recv() {
                Ok(Ok(texture)) => {
                    tracing::debug!(path = %path.display(), "pitch texture loaded");
                    Self::ready(texture)
                }
                Ok(Err(e)) => {
                    tracing::warn!(path = %path.display(), error = %e, "pitch texture unavailable");
                    Self::Failed
                }
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => {
                    tracing::warn!(path = %path.display(), "pitch texture loader vanished");
                    Self::Failed
                }
            };
            *self = next;
        }
        match self {
            Self::Ready(t) => Some(Arc::clone(t)),
            _ => None,
        }
    }

    /// Wait for an in-flight load to settle. Returns immediately in every other state.
    pub async fn settle(&mut self) -> Option<Arc<Texture>> {
        if let Self::Loading { path, rx } = self {
            let next = match rx.await {
                Ok(Ok(texture)) => Self::ready(texture),
                Ok(Err(e)) => {
                    tracing::warn!(path = %path.display(), error = %e, "pitch texture unavailable");
                    Self::Failed
                }
                Err(_) => Self::Failed,
            };
            *self = next;
        }
        self.poll()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pitch/texture.rs"]
mod tests;
