/// Point in overlay surface coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal position in pixels.
    pub x: f64,

    /// Vertical position in pixels.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One drawing instruction of an overlay scene.
///
/// Scenes are explicit draw lists so any surface (canvas, terminal,
/// recorder in tests) can rasterize them without knowing the geometry
/// rules that produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOp {
    /// Erase the previous scene.
    Clear,

    /// No face was found in the analyzed frame.
    NoFaceNotice,

    /// Bounding indicator around the tracked head position.
    HeadMarker {
        /// Marker center.
        center: Point,
        /// Marker radius in pixels.
        radius: f64,
    },

    /// Short line pointing along the head yaw/pitch vector.
    DirectionIndicator {
        /// Line start, the marker center.
        from: Point,
        /// Line end.
        to: Point,
    },

    /// Line connecting the previous and current marker positions.
    Trail {
        /// Previous marker center.
        from: Point,
        /// Current marker center.
        to: Point,
    },

    /// Numeric yaw/pitch readout next to the marker.
    PoseReadout {
        /// Head yaw in degrees.
        yaw: f64,
        /// Head pitch in degrees.
        pitch: f64,
    },
}

/// Ordered draw list for one overlay redraw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayScene {
    /// Draw operations in paint order.
    pub ops: Vec<DrawOp>,
}

/// Overlay surface collaborator driven by the renderer.
///
/// `dimensions` is queried before every draw so the scene geometry always
/// matches the currently rendered surface size.
pub trait OverlaySink: Send + Sync {
    /// Current rendered size of the overlay surface in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Rasterize a scene, replacing the previous one.
    fn render(&self, scene: OverlayScene);
}

/// Overlay that reports a fixed size and discards scenes.
///
/// For headless runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOverlay;

impl OverlaySink for NullOverlay {
    fn dimensions(&self) -> (u32, u32) {
        (640, 480)
    }

    fn render(&self, _scene: OverlayScene) {}
}
