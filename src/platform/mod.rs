//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Image assets (async fetch + decode on web)

pub mod images;

pub use images::{AlphaMask, ImageCache, ImageError, ImageSlot};
