//! Rendering of server-computed inference results.
//!
//! Three result streams (video, audio, fusion) arrive asynchronously over
//! the socket with no ordering or correlation guarantees; each channel's
//! latest result wins independently. Video results drive a head-tracking
//! overlay expressed as an explicit draw list, so the crate owns all the
//! geometry and a surface only rasterizes.

/// Result consumption, last-write-wins state, scene composition
pub mod core;
/// Overlay scene model and surface seam
pub mod overlay;


pub use core::{PatternAlert, ResultRenderer};
pub use overlay::{DrawOp, NullOverlay, OverlayScene, OverlaySink, Point};
