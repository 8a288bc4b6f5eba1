//! Error Types
//!
//! This module defines the error types used throughout the viewer.
//!
//! # Overview
//!
//! The main error type [`ViewerError`] covers all failure modes including:
//! - GPU initialization failures
//! - Asset fetching, decoding and validation errors
//! - Animation asset contract violations
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ViewerError>`.

use thiserror::Error;

/// The main error type for the viewer.
///
/// Each variant provides specific context about what went wrong. Asset
/// fetches never stall silently: a fetch that does not resolve within its
/// deadline becomes [`ViewerError::AssetTimeout`].
#[derive(Error, Debug)]
pub enum ViewerError {
    // ========================================================================
    // GPU & Window Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the rendering surface for the window.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface failed in a way reconfiguration cannot recover from.
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// Window creation failed at the OS level.
    #[error("Window system error: {0}")]
    WindowError(#[from] winit::error::OsError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found in the loaded resource set.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// An asset fetch did not resolve within its deadline.
    #[error("Asset fetch timed out after {seconds}s: {name}")]
    AssetTimeout {
        /// Name of the asset that timed out
        name: String,
        /// The deadline that was exceeded
        seconds: u64,
    },

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status}")]
    HttpResponseError {
        /// HTTP status code
        status: u16,
    },

    // ========================================================================
    // Decode & Validation Errors
    // ========================================================================
    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    GltfError(String),

    /// The model asset does not carry the number of animation clips the
    /// idle/walk/run mapping requires.
    #[error("Animation clip count mismatch: expected at least {expected}, found {found}")]
    ClipCountMismatch {
        /// Number of clips the viewer requires
        expected: usize,
        /// Number of clips the asset actually provides
        found: usize,
    },

    // ========================================================================
    // Async Errors
    // ========================================================================
    /// Task join error (when async tasks fail to complete).
    #[error("Task join error: {0}")]
    TaskJoinError(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for ViewerError {
    fn from(err: image::ImageError) -> Self {
        ViewerError::ImageDecodeError(err.to_string())
    }
}

impl From<gltf::Error> for ViewerError {
    fn from(err: gltf::Error) -> Self {
        ViewerError::GltfError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ViewerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ViewerError::TaskJoinError(err.to_string())
    }
}

/// Alias for `Result<T, ViewerError>`.
pub type Result<T> = std::result::Result<T, ViewerError>;
