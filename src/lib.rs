//! # rastermill
//!
//! An in-memory image transformation toolkit: format transcoding with
//! aspect-aware resizing, quality-driven compression (including an automatic
//! target-size search and a content-aware "smart" selector), composable
//! geometric edits, sequential batch conversion, and frame normalization for
//! animated-image assembly.
//!
//! # Architecture: Operations Over a Codec Seam
//!
//! Every operation is a free function generic over the [`ImageCodec`]
//! trait — decode bytes to an RGBA raster, encode a raster to bytes. The
//! operations own all the logic (dimension policy, search loops, stage
//! ordering); the codec owns all the bitstream work:
//!
//! ```text
//! SourceImage ──decode──▶ raster ──resample/edit──▶ raster ──encode──▶ bytes
//!                 │                                              │
//!                 └──────────────── ImageCodec ──────────────────┘
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Testability**: every operation runs against a recording mock codec,
//!   so pipeline logic is exercised without encoding a single real image.
//! - **Swappability**: the stock [`RustCodec`](transform::RustCodec) is pure
//!   Rust (`image` crate + libwebp); a platform codec can replace it without
//!   touching any operation.
//! - **No hidden I/O**: the library never reads or writes files. Byte
//!   buffers go in, byte buffers come out; the CLI owns the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`transform`] | The core: dimension math, transcoding, target-size search, smart compression, rotate/flip/crop, frame normalization |
//! | [`batch`] | Sequential batch conversion with channel-based progress events and cancellation |
//! | [`config`] | `rastermill.toml` loading and validation — classifier thresholds and frame defaults |
//! | [`output`] | Display formatting (file sizes, compression ratios) and the JSON batch report |
//!
//! # Design Decisions
//!
//! ## Strictly Sequential Batches
//!
//! [`batch::run`] converts one input at a time, in order, with at most one
//! decoded raster in memory. Throughput is deliberately traded for bounded
//! memory and deterministic ordering — batch inputs are user uploads of
//! arbitrary size, and predictability beats parallel speedups that can
//! multiply peak memory by the worker count. The first failure aborts the
//! run; completed work is discarded rather than half-returned.
//!
//! ## Progress as a Channel, Not a Callback
//!
//! Batch progress arrives as [`batch::BatchEvent`]s over `std::sync::mpsc`,
//! so observers decide their own pacing and the coordinator never re-enters
//! caller code mid-loop. A dropped receiver is ignored.
//!
//! ## Best-Effort Target-Size Search
//!
//! [`transform::compress_to_target_size`] binary-searches quality with a
//! hard cap of ten transcoder evaluations and always returns its closest
//! result — a missed target is data, not an error. Callers that need the
//! target honored check `result.size()`.
//!
//! ## Lossy WebP via libwebp
//!
//! The `image` crate decodes all three supported formats and encodes JPEG
//! and PNG, but its WebP encoder is lossless-only. Quality-driven WebP
//! output goes through the `webp` crate (libwebp bindings) instead; the
//! seam is invisible outside [`transform::RustCodec`].
//!
//! [`ImageCodec`]: transform::ImageCodec

pub mod batch;
pub mod config;
pub mod output;
pub mod transform;
