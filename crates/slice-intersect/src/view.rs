//! What the overlay needs to know about views and the registry that owns them.
//!
//! The core never holds on to a view. It stores [`ViewId`]s and reads the
//! views back through a [`ViewRegistry`] on every operation, so the host is
//! free to own and mutate its views however it likes.
//!
//! [`SliceView`] and [`MemoryRegistry`] are small reference implementations
//! used by the tests and the demo.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use slice_intersect_math::Transform;

/// Stable identity of a view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Display styling the registry associates with a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Styling {
    /// Line width in pixels.
    pub line_width: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// RGB color in `[0, 1]`.
    pub color: [f64; 3],
    /// Whether this view's plane should be drawn on other views.
    pub intersection_visible: bool,
}

impl Default for Styling {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            opacity: 1.0,
            color: [1.0, 1.0, 1.0],
            intersection_visible: true,
        }
    }
}

/// A 2D view showing a planar cross-section of the reference space.
pub trait ViewPlane {
    /// Identity of this view.
    fn id(&self) -> ViewId;

    /// Matrix mapping pixel coordinates `(x, y, 0)` into the reference frame.
    fn pixel_to_reference(&self) -> &Transform;

    /// Width and height of the pixel plane.
    fn pixel_dimensions(&self) -> [u32; 2];

    /// Out-of-plane depth covered by a slab projection, in reference units.
    fn slab_thickness(&self) -> f64;

    /// Views only intersect views with the same group tag.
    fn view_group(&self) -> u32;

    /// Whether the view is currently displayed.
    fn is_mapped(&self) -> bool;

    /// Pose of the slice plane in the reference frame.
    fn pose(&self) -> &Transform;

    /// Start a batch of changes. Returns the previous batching state, which
    /// must be handed back to [`ViewPlane::end_batch_update`].
    fn begin_batch_update(&mut self) -> bool;

    /// Replace the pose. Derived matrices are not refreshed.
    fn set_pose(&mut self, pose: Transform);

    /// Recompute matrices derived from the pose.
    fn refresh_derived_matrices(&mut self);

    /// Close a batch opened by [`ViewPlane::begin_batch_update`].
    fn end_batch_update(&mut self, previous: bool);
}

/// Application-wide collection of views.
pub trait ViewRegistry {
    /// Concrete view type.
    type View: ViewPlane;

    /// All registered views, in registry order.
    fn view_ids(&self) -> Vec<ViewId>;

    /// Look up a view.
    fn view(&self, id: ViewId) -> Option<&Self::View>;

    /// Look up a view for mutation.
    fn view_mut(&mut self, id: ViewId) -> Option<&mut Self::View>;

    /// Styling for a view, when the registry has any.
    fn styling(&self, id: ViewId) -> Option<Styling>;
}

/// Reference view with a slicer-style matrix chain.
///
/// `pixel_to_reference = pose * pixel_to_slice`, where `pixel_to_slice`
/// scales pixels by `field_of_view / dimensions` and shifts the in-plane
/// pixel origin to `-field_of_view / 2 + xyz_origin`.
#[derive(Debug, Clone)]
pub struct SliceView {
    id: ViewId,
    name: String,
    pose: Transform,
    field_of_view: [f64; 3],
    dimensions: [u32; 2],
    xyz_origin: [f64; 3],
    slab_thickness: f64,
    view_group: u32,
    mapped: bool,
    pixel_to_reference: Transform,
    batching: bool,
    pending_modified: bool,
    modified_count: u64,
}

impl SliceView {
    /// Create a mapped view with an identity pose and one reference unit per
    /// pixel, centered on the pose origin.
    pub fn new(id: ViewId, name: impl Into<String>, dimensions: [u32; 2]) -> Self {
        let mut view = Self {
            id,
            name: name.into(),
            pose: Transform::identity(),
            field_of_view: [dimensions[0] as f64, dimensions[1] as f64, 1.0],
            dimensions,
            xyz_origin: [0.0; 3],
            slab_thickness: 0.0,
            view_group: 0,
            mapped: true,
            pixel_to_reference: Transform::identity(),
            batching: false,
            pending_modified: false,
            modified_count: 0,
        };
        view.update_pixel_to_reference();
        view
    }

    /// Create a view whose pixel-to-reference matrix is exactly `transform`.
    pub fn from_pixel_to_reference(
        id: ViewId,
        name: impl Into<String>,
        dimensions: [u32; 2],
        transform: Transform,
    ) -> Self {
        let mut view = Self::new(id, name, dimensions);
        // Unit spacing with the origin shifted back makes pixel_to_slice the identity
        view.xyz_origin = [view.field_of_view[0] / 2.0, view.field_of_view[1] / 2.0, 0.0];
        view.pose = transform;
        view.update_pixel_to_reference();
        view
    }

    /// Set the pose (builder style).
    pub fn with_pose(mut self, pose: Transform) -> Self {
        self.pose = pose;
        self.update_pixel_to_reference();
        self
    }

    /// Set the field of view in reference units (builder style).
    pub fn with_field_of_view(mut self, field_of_view: [f64; 3]) -> Self {
        self.field_of_view = field_of_view;
        self.update_pixel_to_reference();
        self
    }

    /// Set the slab thickness (builder style).
    pub fn with_slab_thickness(mut self, thickness: f64) -> Self {
        self.slab_thickness = thickness;
        self
    }

    /// Set the view group (builder style).
    pub fn with_view_group(mut self, group: u32) -> Self {
        self.view_group = group;
        self
    }

    /// Set whether the view is displayed (builder style).
    pub fn with_mapped(mut self, mapped: bool) -> Self {
        self.mapped = mapped;
        self
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field of view in reference units.
    pub fn field_of_view(&self) -> [f64; 3] {
        self.field_of_view
    }

    /// Number of completed modifications. Changes made inside a batch count
    /// once, when the outermost batch ends.
    pub fn modified_count(&self) -> u64 {
        self.modified_count
    }

    /// Change the slab thickness.
    pub fn set_slab_thickness(&mut self, thickness: f64) {
        if self.slab_thickness != thickness {
            self.slab_thickness = thickness;
            self.modified();
        }
    }

    /// Show or hide the view.
    pub fn set_mapped(&mut self, mapped: bool) {
        if self.mapped != mapped {
            self.mapped = mapped;
            self.modified();
        }
    }

    /// Move the view to another group.
    pub fn set_view_group(&mut self, group: u32) {
        if self.view_group != group {
            self.view_group = group;
            self.modified();
        }
    }

    /// Resize the pixel plane, keeping the field of view.
    pub fn set_dimensions(&mut self, dimensions: [u32; 2]) {
        if self.dimensions != dimensions {
            self.dimensions = dimensions;
            self.update_pixel_to_reference();
            self.modified();
        }
    }

    fn pixel_to_slice(&self) -> Transform {
        let spacing = [
            self.field_of_view[0] / self.dimensions[0].max(1) as f64,
            self.field_of_view[1] / self.dimensions[1].max(1) as f64,
            self.field_of_view[2],
        ];
        let shift = Transform::translation(
            -self.field_of_view[0] / 2.0 + self.xyz_origin[0],
            -self.field_of_view[1] / 2.0 + self.xyz_origin[1],
            self.xyz_origin[2],
        );
        shift.then(&Transform::scale(spacing[0], spacing[1], spacing[2]))
    }

    fn update_pixel_to_reference(&mut self) {
        self.pixel_to_reference = self.pose.then(&self.pixel_to_slice());
    }

    fn modified(&mut self) {
        if self.batching {
            self.pending_modified = true;
        } else {
            self.modified_count += 1;
        }
    }
}

impl ViewPlane for SliceView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn pixel_to_reference(&self) -> &Transform {
        &self.pixel_to_reference
    }

    fn pixel_dimensions(&self) -> [u32; 2] {
        self.dimensions
    }

    fn slab_thickness(&self) -> f64 {
        self.slab_thickness
    }

    fn view_group(&self) -> u32 {
        self.view_group
    }

    fn is_mapped(&self) -> bool {
        self.mapped
    }

    fn pose(&self) -> &Transform {
        &self.pose
    }

    fn begin_batch_update(&mut self) -> bool {
        std::mem::replace(&mut self.batching, true)
    }

    fn set_pose(&mut self, pose: Transform) {
        self.pose = pose;
        self.modified();
    }

    fn refresh_derived_matrices(&mut self) {
        self.update_pixel_to_reference();
        self.modified();
    }

    fn end_batch_update(&mut self, previous: bool) {
        self.batching = previous;
        if !previous && self.pending_modified {
            self.pending_modified = false;
            self.modified_count += 1;
        }
    }
}

/// Ordered in-memory registry.
#[derive(Debug, Clone)]
pub struct MemoryRegistry<V = SliceView> {
    views: Vec<V>,
    styling: HashMap<ViewId, Styling>,
}

impl<V> Default for MemoryRegistry<V> {
    fn default() -> Self {
        Self {
            views: Vec::new(),
            styling: HashMap::new(),
        }
    }
}

impl<V: ViewPlane> MemoryRegistry<V> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view, replacing any view with the same id in place.
    pub fn insert(&mut self, view: V) {
        match self.views.iter_mut().find(|v| v.id() == view.id()) {
            Some(slot) => *slot = view,
            None => self.views.push(view),
        }
    }

    /// Deregister a view and drop its styling.
    pub fn remove(&mut self, id: ViewId) -> Option<V> {
        self.styling.remove(&id);
        let index = self.views.iter().position(|v| v.id() == id)?;
        Some(self.views.remove(index))
    }

    /// Attach styling to a view.
    pub fn set_styling(&mut self, id: ViewId, styling: Styling) {
        self.styling.insert(id, styling);
    }

    /// Number of registered views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether no views are registered.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl<V: ViewPlane> ViewRegistry for MemoryRegistry<V> {
    type View = V;

    fn view_ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|v| v.id()).collect()
    }

    fn view(&self, id: ViewId) -> Option<&V> {
        self.views.iter().find(|v| v.id() == id)
    }

    fn view_mut(&mut self, id: ViewId) -> Option<&mut V> {
        self.views.iter_mut().find(|v| v.id() == id)
    }

    fn styling(&self, id: ViewId) -> Option<Styling> {
        self.styling.get(&id).cloned()
    }
}
