//! Asset fetching and decoding
//!
//! The [`ResourceLoader`] fetches the viewer's fixed asset list (one glTF
//! binary, two floor textures) concurrently, bounded by a per-asset timeout.
//! Completion accounting lives in [`LoadProgress`] and fires exactly once,
//! if and only if every asset succeeded. Decoded results are handed to scene
//! construction by value; nothing is reloaded afterwards.

pub mod gltf;
pub mod io;
pub mod progress;

pub use progress::LoadProgress;

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use tokio::runtime::Runtime;

use crate::errors::{Result, ViewerError};
use crate::scene::TextureData;
use io::AssetReader;

fn asset_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new().expect("Failed to create asset loader runtime"))
}

/// Everything the scene builder consumes: raw glTF bytes for the model and
/// decoded RGBA data for the two floor textures.
pub struct LoadedResources {
    pub fox_bytes: Vec<u8>,
    pub floor_color: Arc<TextureData>,
    pub floor_normal: Arc<TextureData>,
}

/// Concurrent, timeout-bounded loader for the viewer's asset list.
pub struct ResourceLoader {
    reader: AssetReader,
    timeout: Duration,
}

impl ResourceLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            reader: AssetReader::new()?,
            timeout: Duration::from_secs(30),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Blocking wrapper around [`ResourceLoader::load`], for the startup path
    /// that runs before the event loop.
    pub fn load_blocking(
        &self,
        model_source: &str,
        floor_color_source: &str,
        floor_normal_source: &str,
    ) -> Result<LoadedResources> {
        asset_runtime().block_on(self.load(model_source, floor_color_source, floor_normal_source))
    }

    /// Fetches and decodes all three assets concurrently. Any individual
    /// failure or timeout fails the whole load; there is no silent stall.
    pub async fn load(
        &self,
        model_source: &str,
        floor_color_source: &str,
        floor_normal_source: &str,
    ) -> Result<LoadedResources> {
        let progress = Mutex::new(LoadProgress::new(&["fox", "floor_color", "floor_normal"]));

        let fox = async {
            let bytes = self.fetch("fox", model_source).await?;
            Self::mark(&progress, "fox");
            Ok::<_, ViewerError>(bytes)
        };
        let floor_color = async {
            let bytes = self.fetch("floor_color", floor_color_source).await?;
            let texture = decode_texture(bytes, true).await?;
            Self::mark(&progress, "floor_color");
            Ok::<_, ViewerError>(texture)
        };
        let floor_normal = async {
            let bytes = self.fetch("floor_normal", floor_normal_source).await?;
            // Normal maps hold direction vectors, not colors: linear space.
            let texture = decode_texture(bytes, false).await?;
            Self::mark(&progress, "floor_normal");
            Ok::<_, ViewerError>(texture)
        };

        let (fox_bytes, floor_color, floor_normal) =
            futures::try_join!(fox, floor_color, floor_normal)?;

        Ok(LoadedResources {
            fox_bytes,
            floor_color,
            floor_normal,
        })
    }

    /// One timeout-bounded fetch.
    async fn fetch(&self, name: &str, source: &str) -> Result<Vec<u8>> {
        let fut = self.reader.read_bytes(source);
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => {
                let bytes = result?;
                log::debug!("Fetched asset '{name}' ({} bytes)", bytes.len());
                Ok(bytes)
            }
            Err(_) => Err(ViewerError::AssetTimeout {
                name: name.to_string(),
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    fn mark(progress: &Mutex<LoadProgress>, name: &str) {
        let mut progress = progress
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if progress.mark_loaded(name) {
            log::info!("All assets loaded");
        } else {
            log::debug!(
                "Asset '{name}' ready ({}/{})",
                progress.loaded_count(),
                progress.total()
            );
        }
    }
}

/// Decodes an image off the async worker threads.
async fn decode_texture(bytes: Vec<u8>, srgb: bool) -> Result<Arc<TextureData>> {
    tokio::task::spawn_blocking(move || decode_texture_cpu(&bytes, srgb)).await?
}

pub(crate) fn decode_texture_cpu(bytes: &[u8], srgb: bool) -> Result<Arc<TextureData>> {
    let img = image::load_from_memory(bytes)?;
    let width = img.width();
    let height = img.height();
    let rgba = img.to_rgba8();
    Ok(Arc::new(TextureData {
        pixels: rgba.into_raw(),
        width,
        height,
        srgb,
    }))
}
