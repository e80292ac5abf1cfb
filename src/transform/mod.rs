//! Image transformation core — in-memory, codec-agnostic.
//!
//! | Operation | Module |
//! |---|---|
//! | **Dimension resolution** | [`dimensions`] (pure functions) |
//! | **Format conversion** | [`transcode`] |
//! | **Target-size compression** | [`search`] (bounded binary search) |
//! | **Smart compression** | [`classify`] (pixel sampling + decision table) |
//! | **Rotate / flip / crop** | [`edit`] |
//! | **Frame normalization** | [`frames`] |
//!
//! The module is split into:
//! - **Params**: Request/result types shared by every operation
//! - **Dimensions**: Pure functions for dimension math (unit testable)
//! - **Codec**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: transcode, search, classify, edit, frames — all generic
//!   over the codec

pub mod classify;
pub mod codec;
pub mod dimensions;
pub mod edit;
pub mod frames;
pub mod params;
pub mod rust_codec;
pub mod search;
pub mod transcode;

pub use classify::{ClassifierThresholds, ContentProfile, analyze, recommend, smart_compress};
pub use codec::{CodecError, FrameEncoder, ImageCodec};
pub use dimensions::{fit_within, resolve};
pub use edit::{apply, apply_encoded};
pub use frames::{FrameOptions, FrameSet, prepare};
pub use params::{
    ConversionRequest, ConversionResult, CropRect, EditRequest, OutputFormat, Quality, SourceImage,
};
pub use rust_codec::RustCodec;
pub use search::compress_to_target_size;
pub use transcode::convert;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    /// Decode, encode, or format-availability failure from the codec.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// A requested dimension was degenerate (zero-sized request, zero-area
    /// source, zero-sized crop).
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),
    /// A crop rectangle extends past the raster it applies to.
    #[error("crop rectangle {rect:?} exceeds raster bounds {width}x{height}")]
    CropOutOfBounds {
        rect: CropRect,
        width: u32,
        height: u32,
    },
}
