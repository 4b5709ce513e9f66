#![warn(missing_docs)]

//! Slice-plane intersection overlays for multi-view 2D inspection.
//!
//! Each 2D view shows a planar cut through a shared 3D reference frame. For
//! one *current* view, this crate computes where every other view's plane
//! crosses it, as a center segment in current-view pixels, plus two offset
//! segments bounding the peer's thick slab. On top of that it offers a
//! convergence point (mean pairwise crossing), hit-testing against the
//! drawn lines, and a batched "rotate all intersecting views" operation.
//!
//! Views are reached through the [`ViewRegistry`] and [`ViewPlane`] traits;
//! the crate never owns them. [`MemoryRegistry`] and [`SliceView`] are
//! simple in-memory implementations.
//!
//! # Example
//!
//! ```
//! use slice_intersect::{
//!     IntersectionSettings, MemoryRegistry, SliceView, Transform, UpdateDriver, ViewEvent,
//!     ViewId,
//! };
//!
//! let mut registry = MemoryRegistry::new();
//! registry.insert(SliceView::new(ViewId(1), "axial", [512, 512]));
//! registry.insert(
//!     SliceView::new(ViewId(2), "sagittal", [512, 512])
//!         .with_pose(Transform::rotation_y(std::f64::consts::FRAC_PI_2)),
//! );
//!
//! let mut driver = UpdateDriver::new(IntersectionSettings::default());
//! driver.set_current_view(&registry, Some(ViewId(1)));
//! driver.handle(&registry, ViewEvent::ViewChanged(ViewId(2)));
//!
//! let snapshot = driver.pipelines().snapshot();
//! assert_eq!(snapshot.len(), 3);
//! for segment in snapshot {
//!     println!("{} {:?}: {:?} -> {:?}", segment.peer, segment.mode, segment.a, segment.b);
//! }
//! println!("convergence: {}", driver.convergence_point(&registry));
//! ```

pub mod driver;
pub mod error;
pub mod lines;
pub mod pipeline;
pub mod plane;
pub mod segment;
pub mod settings;
pub mod view;

pub use driver::{UpdateDriver, ViewEvent};
pub use error::{IntersectError, Result};
pub use pipeline::{LineHit, PipelineSet, SegmentSnapshot, Triple, UpdateSummary};
pub use plane::{intersect_finite_plane, intersect_segment_with_plane, FiniteQuad};
pub use segment::{
    center_endpoints, offset_endpoints, DisplaySegment, HideReason, SegmentKey, SegmentLinks,
    SegmentMode,
};
pub use settings::{IntersectionSettings, QueryScope};
pub use slice_intersect_math::{Point2, Point3, Tolerance, Transform, Vec3, Vec4};
pub use view::{MemoryRegistry, SliceView, Styling, ViewId, ViewPlane, ViewRegistry};
