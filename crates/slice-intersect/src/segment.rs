//! Display segments: one peer plane's trace on the current view.
//!
//! Every peer contributes a triple. The center segment is the exact
//! intersection of the two planes; the left and right offsets are the same
//! line pushed sideways by the peer's slab thickness, marking the edges of
//! the band a thick-slab projection covers. Offsets never compute geometry
//! of their own: they always derive from their parent center.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};
use slice_intersect_math::{Point3, Tolerance, Transform, Vec3, Vec4};
use slotmap::new_key_type;

use crate::plane::{intersect_finite_plane, FiniteQuad};
use crate::view::ViewId;

new_key_type! {
    /// Handle of a segment in the pipeline arena.
    pub struct SegmentKey;
}

/// Role of a segment inside its triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMode {
    /// Exact plane/plane intersection.
    Center,
    /// Band edge on the `(-sin, +cos)` side of the center direction.
    LeftOffset,
    /// Band edge on the `(+sin, -cos)` side of the center direction.
    RightOffset,
}

impl SegmentMode {
    /// Whether this is one of the two band edges.
    pub fn is_offset(self) -> bool {
        !matches!(self, SegmentMode::Center)
    }
}

/// Links between the members of a triple. None of them own each other; the
/// pipeline set inserts and removes the three together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentLinks {
    /// A center knows both of its offsets.
    Center {
        /// The left band edge.
        left: SegmentKey,
        /// The right band edge.
        right: SegmentKey,
    },
    /// An offset knows the center it derives from.
    Offset {
        /// The center segment.
        parent: SegmentKey,
    },
}

/// Why a segment is not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HideReason {
    /// Not computed yet.
    Pending,
    /// The overlay itself is hidden.
    OverlayHidden,
    /// There is no current view to draw on.
    NoCurrentView,
    /// The peer is no longer in the registry.
    MissingPeer,
    /// The peer belongs to another view group.
    OtherViewGroup,
    /// The peer view is not displayed.
    PeerNotMapped,
    /// The peer's styling turns intersections off.
    StylingDisabled,
    /// The planes do not meet inside the peer's rectangle.
    NoIntersection,
    /// A view matrix could not be inverted.
    SingularTransform,
    /// The center segment this offset derives from is hidden.
    ParentHidden,
}

/// One drawable line on the current view.
#[derive(Debug, Clone)]
pub struct DisplaySegment {
    source: ViewId,
    mode: SegmentMode,
    links: SegmentLinks,
    point_a: Point3,
    point_b: Point3,
    hidden: Option<HideReason>,
}

impl DisplaySegment {
    pub(crate) fn new(source: ViewId, mode: SegmentMode, links: SegmentLinks) -> Self {
        Self {
            source,
            mode,
            links,
            point_a: Point3::origin(),
            point_b: Point3::origin(),
            hidden: Some(HideReason::Pending),
        }
    }

    /// Peer view whose plane this segment traces.
    pub fn source(&self) -> ViewId {
        self.source
    }

    /// Role inside the triple.
    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    /// Links to the other members of the triple.
    pub fn links(&self) -> SegmentLinks {
        self.links
    }

    /// Whether the segment is drawn.
    pub fn is_visible(&self) -> bool {
        self.hidden.is_none()
    }

    /// Why the segment is hidden, or `None` when visible.
    pub fn hide_reason(&self) -> Option<HideReason> {
        self.hidden
    }

    /// Endpoints in the current view's pixel frame. `None` while hidden,
    /// since the stored values are stale then.
    pub fn endpoints(&self) -> Option<(Point3, Point3)> {
        match self.hidden {
            None => Some((self.point_a, self.point_b)),
            Some(_) => None,
        }
    }

    /// Endpoints as homogeneous coordinates (`w = 1`).
    pub fn endpoints_homogeneous(&self) -> Option<(Vec4, Vec4)> {
        self.endpoints()
            .map(|(a, b)| (a.to_homogeneous(), b.to_homogeneous()))
    }

    pub(crate) fn set_links(&mut self, links: SegmentLinks) {
        self.links = links;
    }

    pub(crate) fn show(&mut self, (a, b): (Point3, Point3)) {
        self.point_a = a;
        self.point_b = b;
        self.hidden = None;
    }

    pub(crate) fn hide(&mut self, reason: HideReason) {
        self.hidden = Some(reason);
    }
}

/// Trace of the peer's pixel rectangle on the current view's plane.
///
/// The current plane is `z = 0` in its own pixel frame. The peer rectangle
/// `(0,0)..(w,h)` is carried into that frame through
/// `inverse(current) * peer` and clipped against it.
pub fn center_endpoints(
    current_pixel_to_reference: &Transform,
    peer_pixel_to_reference: &Transform,
    peer_dimensions: [u32; 2],
    tolerance: &Tolerance,
) -> Result<(Point3, Point3), HideReason> {
    let reference_to_current = current_pixel_to_reference
        .inverse()
        .ok_or(HideReason::SingularTransform)?;
    let peer_to_current = reference_to_current.then(peer_pixel_to_reference);

    let (w, h) = (peer_dimensions[0] as f64, peer_dimensions[1] as f64);
    let quad = FiniteQuad::from_corners(
        peer_to_current.apply_point(&Point3::origin()),
        peer_to_current.apply_point(&Point3::new(w, 0.0, 0.0)),
        peer_to_current.apply_point(&Point3::new(0.0, h, 0.0)),
    );

    intersect_finite_plane(&Vec3::z(), &Point3::origin(), &quad, tolerance)
        .ok_or(HideReason::NoIntersection)
}

/// Shift a center segment sideways by the peer's slab thickness.
///
/// The thickness is converted to pixels with the peer's pixels-per-unit
/// scale (norm of the first row of its reference-to-pixel matrix). When the
/// center is within `angle_epsilon` of vertical its direction is taken as
/// exactly vertical.
pub fn offset_endpoints(
    parent: (Point3, Point3),
    mode: SegmentMode,
    peer_pixel_to_reference: &Transform,
    slab_thickness: f64,
    angle_epsilon: f64,
) -> Result<(Point3, Point3), HideReason> {
    let sign = match mode {
        SegmentMode::Center => return Ok(parent),
        SegmentMode::LeftOffset => -1.0,
        SegmentMode::RightOffset => 1.0,
    };

    let reference_to_pixel = peer_pixel_to_reference
        .inverse()
        .ok_or(HideReason::SingularTransform)?;
    let thickness = slab_thickness * reference_to_pixel.row_norm(0);

    let (a, b) = parent;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let angle = if dx.abs() < angle_epsilon {
        FRAC_PI_2
    } else {
        dy.atan2(dx)
    };

    let (sin, cos) = angle.sin_cos();
    let shift = Vec3::new(sin, -cos, 0.0) * (sign * thickness);
    Ok((a + shift, b + shift))
}
