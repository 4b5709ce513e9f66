//! The per-view set of intersection triples.
//!
//! A [`PipelineSet`] belongs to one current view. It keeps one triple
//! (center plus two offsets) per peer view, in the order peers were added,
//! and is the only place segment geometry is written.

use std::collections::HashMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use slice_intersect_math::{Point2, Point3, Tolerance, Transform, Vec3};
use slotmap::SlotMap;

use crate::lines::{distance_to_line, point_at, segment_intersection, tangent_angle};
use crate::segment::{
    center_endpoints, offset_endpoints, DisplaySegment, HideReason, SegmentKey, SegmentLinks,
    SegmentMode,
};
use crate::settings::{IntersectionSettings, QueryScope};
use crate::view::{ViewId, ViewPlane, ViewRegistry};

/// Arena handles of one peer's segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triple {
    /// Exact intersection.
    pub center: SegmentKey,
    /// Left band edge.
    pub left: SegmentKey,
    /// Right band edge.
    pub right: SegmentKey,
}

/// A segment found near a picked point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHit {
    /// Peer view the segment belongs to.
    pub peer: ViewId,
    /// Which member of the triple matched.
    pub mode: SegmentMode,
    /// Direction of the segment, `atan2(dy, dx)`, in radians.
    pub angle: f64,
}

/// Serializable copy of a visible segment, for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSnapshot {
    /// Peer view the segment belongs to.
    pub peer: ViewId,
    /// Role inside the triple.
    pub mode: SegmentMode,
    /// First endpoint in current-view pixels.
    pub a: [f64; 3],
    /// Second endpoint in current-view pixels.
    pub b: [f64; 3],
}

/// Membership and recomputation work done while handling a change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Peers whose triple was created.
    pub added: Vec<ViewId>,
    /// Peers whose triple was destroyed.
    pub removed: Vec<ViewId>,
    /// Peers whose existing triple was recomputed.
    pub recomputed: Vec<ViewId>,
}

impl UpdateSummary {
    /// Whether nothing happened.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.recomputed.is_empty()
    }

    /// Append another summary's work to this one.
    pub fn merge(&mut self, other: UpdateSummary) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
        self.recomputed.extend(other.recomputed);
    }
}

/// Intersection triples of every peer against one current view.
#[derive(Debug, Clone)]
pub struct PipelineSet {
    settings: IntersectionSettings,
    owner: Option<ViewId>,
    visible: bool,
    segments: SlotMap<SegmentKey, DisplaySegment>,
    peers: HashMap<ViewId, SegmentKey>,
    order: Vec<ViewId>,
}

impl Default for PipelineSet {
    fn default() -> Self {
        Self::new(IntersectionSettings::default())
    }
}

impl PipelineSet {
    /// Create an empty, visible set with no current view.
    pub fn new(settings: IntersectionSettings) -> Self {
        Self {
            settings,
            owner: None,
            visible: true,
            segments: SlotMap::with_key(),
            peers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &IntersectionSettings {
        &self.settings
    }

    /// The view segments are drawn on.
    pub fn current_view(&self) -> Option<ViewId> {
        self.owner
    }

    /// Whether the overlay as a whole is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of peers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether there are no peers.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `peer` has a triple.
    pub fn contains(&self, peer: ViewId) -> bool {
        self.peers.contains_key(&peer)
    }

    /// Peers in insertion order.
    pub fn peers(&self) -> &[ViewId] {
        &self.order
    }

    /// Look up a segment by handle.
    pub fn segment(&self, key: SegmentKey) -> Option<&DisplaySegment> {
        self.segments.get(key)
    }

    /// Handles of a peer's triple.
    pub fn triple(&self, peer: ViewId) -> Option<Triple> {
        let center = *self.peers.get(&peer)?;
        match self.segments.get(center)?.links() {
            SegmentLinks::Center { left, right } => Some(Triple {
                center,
                left,
                right,
            }),
            SegmentLinks::Offset { .. } => None,
        }
    }

    /// Why a peer's center segment is hidden, or `None` when it is drawn
    /// (or the peer is unknown).
    pub fn hide_reason(&self, peer: ViewId) -> Option<HideReason> {
        let center = *self.peers.get(&peer)?;
        self.segments.get(center)?.hide_reason()
    }

    /// Switch to another current view, rebuilding the set from the registry.
    pub fn set_current_view<R: ViewRegistry>(&mut self, registry: &R, view: Option<ViewId>) {
        if view == self.owner {
            return;
        }
        self.clear();
        self.owner = view;
        debug!("current view set to {:?}", view);
        if view.is_some() {
            self.reconcile(registry);
        }
    }

    /// Show or hide the whole overlay.
    pub fn set_visible<R: ViewRegistry>(&mut self, registry: &R, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        self.recompute_all(registry);
    }

    /// Start tracking `peer`. Returns `false` (and does nothing) for the
    /// current view itself, for peers already tracked, and for ids the
    /// registry does not know.
    pub fn add_peer<R: ViewRegistry>(&mut self, registry: &R, peer: ViewId) -> bool {
        if Some(peer) == self.owner || self.peers.contains_key(&peer) {
            return false;
        }
        if registry.view(peer).is_none() {
            return false;
        }

        let placeholder = SegmentLinks::Offset {
            parent: SegmentKey::default(),
        };
        let center = self
            .segments
            .insert(DisplaySegment::new(peer, SegmentMode::Center, placeholder));
        let left = self.segments.insert(DisplaySegment::new(
            peer,
            SegmentMode::LeftOffset,
            SegmentLinks::Offset { parent: center },
        ));
        let right = self.segments.insert(DisplaySegment::new(
            peer,
            SegmentMode::RightOffset,
            SegmentLinks::Offset { parent: center },
        ));
        self.segments[center].set_links(SegmentLinks::Center { left, right });

        self.peers.insert(peer, center);
        self.order.push(peer);
        self.recompute_triple(registry, peer);
        debug!("added intersection triple for {peer}");
        true
    }

    /// Stop tracking `peer`, destroying its triple. Returns `false` when the
    /// peer was not tracked.
    pub fn remove_peer(&mut self, peer: ViewId) -> bool {
        let Some(triple) = self.triple(peer) else {
            return false;
        };
        self.segments.remove(triple.center);
        self.segments.remove(triple.left);
        self.segments.remove(triple.right);
        self.peers.remove(&peer);
        self.order.retain(|id| *id != peer);
        debug!("removed intersection triple for {peer}");
        true
    }

    /// Destroy every triple.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.peers.clear();
        self.order.clear();
    }

    /// Bring membership in line with the registry: drop peers it no longer
    /// lists, add the ones it lists that are missing.
    ///
    /// Without a current view there is nothing to intersect against, so the
    /// set is emptied instead.
    pub fn reconcile<R: ViewRegistry>(&mut self, registry: &R) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        if self.owner.is_none() {
            summary.removed = std::mem::take(&mut self.order);
            self.clear();
            return summary;
        }

        let listed = registry.view_ids();

        let stale: Vec<ViewId> = self
            .order
            .iter()
            .copied()
            .filter(|id| !listed.contains(id))
            .collect();
        for peer in stale {
            if self.remove_peer(peer) {
                summary.removed.push(peer);
            }
        }

        for peer in listed {
            if self.add_peer(registry, peer) {
                summary.added.push(peer);
            }
        }

        debug!(
            "reconciled intersections: {} added, {} removed, {} tracked",
            summary.added.len(),
            summary.removed.len(),
            self.order.len()
        );
        summary
    }

    /// Recompute every triple, centers before their offsets.
    pub fn recompute_all<R: ViewRegistry>(&mut self, registry: &R) {
        for peer in self.order.clone() {
            self.recompute_triple(registry, peer);
        }
    }

    /// Recompute one peer's triple. Returns `false` for untracked peers.
    pub fn recompute_for_peer<R: ViewRegistry>(&mut self, registry: &R, peer: ViewId) -> bool {
        if !self.peers.contains_key(&peer) {
            return false;
        }
        self.recompute_triple(registry, peer);
        true
    }

    fn recompute_triple<R: ViewRegistry>(&mut self, registry: &R, peer: ViewId) {
        let Some(triple) = self.triple(peer) else {
            return;
        };
        for key in [triple.center, triple.left, triple.right] {
            self.recompute_segment(registry, key);
        }
    }

    fn recompute_segment<R: ViewRegistry>(&mut self, registry: &R, key: SegmentKey) {
        let Some(segment) = self.segments.get(key) else {
            return;
        };
        let (peer, mode, links) = (segment.source(), segment.mode(), segment.links());

        let result = self.gate(registry, peer).and_then(|(current, peer_view)| {
            let tolerance = Tolerance {
                linear: self.settings.segment_tolerance,
            };
            match links {
                SegmentLinks::Center { .. } => center_endpoints(
                    current.pixel_to_reference(),
                    peer_view.pixel_to_reference(),
                    peer_view.pixel_dimensions(),
                    &tolerance,
                ),
                SegmentLinks::Offset { parent } => {
                    let parent = self
                        .segments
                        .get(parent)
                        .and_then(DisplaySegment::endpoints)
                        .ok_or(HideReason::ParentHidden)?;
                    offset_endpoints(
                        parent,
                        mode,
                        peer_view.pixel_to_reference(),
                        peer_view.slab_thickness(),
                        self.settings.angle_epsilon,
                    )
                }
            }
        });

        let segment = &mut self.segments[key];
        match result {
            Ok(endpoints) => {
                trace!("{peer} {mode:?}: {:?} -> {:?}", endpoints.0, endpoints.1);
                segment.show(endpoints);
            }
            Err(reason) => {
                trace!("{peer} {mode:?}: hidden ({reason:?})");
                segment.hide(reason);
            }
        }
    }

    /// Visibility rules checked before any geometry runs.
    fn gate<'r, R: ViewRegistry>(
        &self,
        registry: &'r R,
        peer: ViewId,
    ) -> Result<(&'r R::View, &'r R::View), HideReason> {
        if !self.visible {
            return Err(HideReason::OverlayHidden);
        }
        let current = self
            .owner
            .and_then(|id| registry.view(id))
            .ok_or(HideReason::NoCurrentView)?;
        let peer_view = registry.view(peer).ok_or(HideReason::MissingPeer)?;

        if current.view_group() != peer_view.view_group() {
            return Err(HideReason::OtherViewGroup);
        }
        if !peer_view.is_mapped() {
            return Err(HideReason::PeerNotMapped);
        }
        if let Some(styling) = registry.styling(peer) {
            if !styling.intersection_visible {
                return Err(HideReason::StylingDisabled);
            }
        }
        Ok((current, peer_view))
    }

    /// Every segment in display order: per peer, center then left then right.
    pub fn segments(&self) -> impl Iterator<Item = &DisplaySegment> + '_ {
        self.order
            .iter()
            .filter_map(move |peer| self.triple(*peer))
            .flat_map(move |t| {
                [t.center, t.left, t.right]
                    .into_iter()
                    .filter_map(move |key| self.segments.get(key))
            })
    }

    /// Visible segments in display order.
    pub fn visible_segments(&self) -> impl Iterator<Item = &DisplaySegment> + '_ {
        self.segments().filter(|s| s.is_visible())
    }

    /// Copy out the visible segments for rendering.
    pub fn snapshot(&self) -> Vec<SegmentSnapshot> {
        self.visible_segments()
            .filter_map(|s| {
                let (a, b) = s.endpoints()?;
                Some(SegmentSnapshot {
                    peer: s.source(),
                    mode: s.mode(),
                    a: [a.x, a.y, a.z],
                    b: [b.x, b.y, b.z],
                })
            })
            .collect()
    }

    /// Segments taking part in convergence and pick scans, visible or not.
    fn query_segments(&self) -> Vec<&DisplaySegment> {
        match self.settings.query_scope {
            QueryScope::CenterOnly => self
                .order
                .iter()
                .filter_map(|peer| self.peers.get(peer))
                .filter_map(|key| self.segments.get(*key))
                .collect(),
            QueryScope::All => self.segments().collect(),
        }
    }

    /// Mean of the pairwise crossings of visible segments, in current-view
    /// pixels.
    ///
    /// Falls back to the center of the current view when no pair crosses,
    /// and to the origin when there is no current view.
    pub fn convergence_point<R: ViewRegistry>(&self, registry: &R) -> Point3 {
        let Some(current) = self.owner.and_then(|id| registry.view(id)) else {
            return Point3::origin();
        };

        let lines: Vec<(Point3, Point3)> = self
            .query_segments()
            .into_iter()
            .filter_map(DisplaySegment::endpoints)
            .collect();

        let mut sum = Vec3::zeros();
        let mut count = 0usize;
        if lines.len() >= 2 {
            for i in 0..lines.len() - 1 {
                let (a0, a1) = &lines[i];
                for (b0, b1) in &lines[i + 1..] {
                    if let Some((u, _)) = segment_intersection(
                        a0,
                        a1,
                        b0,
                        b1,
                        self.settings.parallel_tolerance,
                        self.settings.segment_tolerance,
                    ) {
                        sum += point_at(a0, a1, u).coords;
                        count += 1;
                    }
                }
            }
        }

        if count > 0 {
            return Point3::from(sum / count as f64);
        }
        let [w, h] = current.pixel_dimensions();
        Point3::new(w as f64 / 2.0, h as f64 / 2.0, 0.0)
    }

    /// First visible segment whose line passes within `threshold` pixels of
    /// `point`.
    ///
    /// Needs at least two segments in the scan and a current view; otherwise
    /// nothing matches.
    pub fn hit_test(&self, point: Point2, threshold: f64) -> Option<LineHit> {
        self.owner?;
        let candidates = self.query_segments();
        if candidates.len() < 2 {
            return None;
        }

        let p = Point3::new(point.x, point.y, 0.0);
        candidates.into_iter().find_map(|segment| {
            let (a, b) = segment.endpoints()?;
            (distance_to_line(&p, &a, &b) < threshold).then(|| LineHit {
                peer: segment.source(),
                mode: segment.mode(),
                angle: tangent_angle(&a, &b),
            })
        })
    }

    /// [`PipelineSet::hit_test`] with the configured default threshold.
    pub fn hit_test_default(&self, point: Point2) -> Option<LineHit> {
        self.hit_test(point, self.settings.default_hit_threshold)
    }

    /// Left-multiply the pose of every peer whose center is visible by
    /// `transform`, pushing the change out to the views.
    ///
    /// All poses are written inside open batches first; derived matrices are
    /// refreshed and the batches closed afterwards. Segments are not
    /// recomputed here. Returns the mutated peers in set order.
    pub fn rotate_all<R: ViewRegistry>(
        &self,
        registry: &mut R,
        transform: &Transform,
    ) -> Vec<ViewId> {
        let targets: Vec<ViewId> = self
            .order
            .iter()
            .copied()
            .filter(|peer| {
                self.peers
                    .get(peer)
                    .and_then(|key| self.segments.get(*key))
                    .is_some_and(DisplaySegment::is_visible)
            })
            .collect();

        let mut open: Vec<(ViewId, bool)> = Vec::with_capacity(targets.len());
        for peer in targets {
            let Some(view) = registry.view_mut(peer) else {
                continue;
            };
            let previous = view.begin_batch_update();
            let pose = transform.then(view.pose());
            view.set_pose(pose);
            open.push((peer, previous));
        }

        for (peer, previous) in &open {
            if let Some(view) = registry.view_mut(*peer) {
                view.refresh_derived_matrices();
                view.end_batch_update(*previous);
            }
        }

        debug!("rotated {} intersecting views", open.len());
        open.into_iter().map(|(peer, _)| peer).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{MemoryRegistry, SliceView, Styling};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const AXIAL: ViewId = ViewId(1);
    const SAGITTAL: ViewId = ViewId(2);
    const CORONAL: ViewId = ViewId(3);

    /// Axial 512x512 view with two orthogonal peers crossing at (256, 256).
    fn three_views() -> MemoryRegistry {
        let mut registry = MemoryRegistry::new();
        registry.insert(SliceView::from_pixel_to_reference(
            AXIAL,
            "axial",
            [512, 512],
            Transform::identity(),
        ));
        registry.insert(
            SliceView::from_pixel_to_reference(
                SAGITTAL,
                "sagittal",
                [512, 512],
                Transform::translation(256.0, 0.0, 256.0).then(&Transform::rotation_y(FRAC_PI_2)),
            )
            .with_slab_thickness(5.0),
        );
        registry.insert(
            SliceView::from_pixel_to_reference(
                CORONAL,
                "coronal",
                [512, 512],
                Transform::translation(0.0, 256.0, -256.0).then(&Transform::rotation_x(FRAC_PI_2)),
            )
            .with_slab_thickness(2.0),
        );
        registry
    }

    fn axial_set(registry: &MemoryRegistry) -> PipelineSet {
        let mut set = PipelineSet::default();
        set.set_current_view(registry, Some(AXIAL));
        set
    }

    #[test]
    fn test_current_view_builds_peers_without_itself() {
        let registry = three_views();
        let set = axial_set(&registry);
        assert_eq!(set.peers(), &[SAGITTAL, CORONAL]);
        assert!(!set.contains(AXIAL));
    }

    #[test]
    fn test_add_self_is_noop() {
        let registry = three_views();
        let mut set = axial_set(&registry);
        assert!(!set.add_peer(&registry, AXIAL));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_add_then_remove_restores_state() {
        let mut registry = three_views();
        registry.insert(SliceView::new(ViewId(9), "extra", [64, 64]));
        let mut set = axial_set(&registry);
        set.remove_peer(ViewId(9));
        let before = (set.len(), set.peers().to_vec(), set.segments().count());

        assert!(set.add_peer(&registry, ViewId(9)));
        assert_eq!(set.segments().count(), 9);
        assert!(set.remove_peer(ViewId(9)));

        assert_eq!((set.len(), set.peers().to_vec(), set.segments().count()), before);
    }

    #[test]
    fn test_unknown_peer_is_ignored() {
        let registry = three_views();
        let mut set = axial_set(&registry);
        assert!(!set.add_peer(&registry, ViewId(42)));
        assert!(!set.remove_peer(ViewId(42)));
        assert!(!set.recompute_for_peer(&registry, ViewId(42)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_triple_links_point_at_each_other() {
        let registry = three_views();
        let set = axial_set(&registry);
        let triple = set.triple(SAGITTAL).unwrap();
        for offset in [triple.left, triple.right] {
            assert_eq!(
                set.segment(offset).unwrap().links(),
                SegmentLinks::Offset {
                    parent: triple.center
                }
            );
        }
    }

    #[test]
    fn test_orthogonal_peers_cross_at_center() {
        let registry = three_views();
        let set = axial_set(&registry);
        let p = set.convergence_point(&registry);
        assert_abs_diff_eq!(p.x, 256.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 256.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_convergence_with_offsets_stays_centered() {
        let registry = three_views();
        let mut set = PipelineSet::new(IntersectionSettings {
            query_scope: QueryScope::All,
            ..Default::default()
        });
        set.set_current_view(&registry, Some(AXIAL));
        let p = set.convergence_point(&registry);
        assert_abs_diff_eq!(p.x, 256.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 256.0, epsilon = 1e-9);
    }

    #[test]
    fn test_convergence_falls_back_to_view_center() {
        let mut registry = MemoryRegistry::new();
        registry.insert(SliceView::new(AXIAL, "axial", [300, 200]));
        let set = axial_set(&registry);
        assert_eq!(set.convergence_point(&registry), Point3::new(150.0, 100.0, 0.0));
    }

    #[test]
    fn test_convergence_without_current_view() {
        let registry = three_views();
        let set = PipelineSet::default();
        assert_eq!(set.convergence_point(&registry), Point3::origin());
    }

    #[test]
    fn test_other_group_never_visible() {
        let mut registry = three_views();
        let sagittal = registry.view_mut(SAGITTAL).unwrap();
        sagittal.set_view_group(1);
        let set = axial_set(&registry);
        assert_eq!(set.hide_reason(SAGITTAL), Some(HideReason::OtherViewGroup));
        let triple = set.triple(SAGITTAL).unwrap();
        assert!(!set.segment(triple.left).unwrap().is_visible());
        assert!(!set.segment(triple.right).unwrap().is_visible());
    }

    #[test]
    fn test_styling_can_disable_intersection() {
        let mut registry = three_views();
        registry.set_styling(
            CORONAL,
            Styling {
                intersection_visible: false,
                ..Default::default()
            },
        );
        let set = axial_set(&registry);
        assert_eq!(set.hide_reason(CORONAL), Some(HideReason::StylingDisabled));
        assert_eq!(set.hide_reason(SAGITTAL), None);
    }

    #[test]
    fn test_unmapped_peer_hidden() {
        let mut registry = three_views();
        registry.view_mut(CORONAL).unwrap().set_mapped(false);
        let set = axial_set(&registry);
        assert_eq!(set.hide_reason(CORONAL), Some(HideReason::PeerNotMapped));
    }

    #[test]
    fn test_hidden_overlay_hides_everything() {
        let registry = three_views();
        let mut set = axial_set(&registry);
        set.set_visible(&registry, false);
        assert_eq!(set.visible_segments().count(), 0);
        assert_eq!(set.hide_reason(SAGITTAL), Some(HideReason::OverlayHidden));
        set.set_visible(&registry, true);
        assert_eq!(set.visible_segments().count(), 6);
    }

    /// Vertical peer plane whose trace on the axial view runs from `start`
    /// for `length` pixels at `angle`.
    fn line_view(id: ViewId, start: (f64, f64), angle: f64, length: u32) -> SliceView {
        SliceView::from_pixel_to_reference(
            id,
            "line",
            [length, 100],
            Transform::translation(start.0, start.1, -50.0)
                .then(&Transform::rotation_z(angle))
                .then(&Transform::rotation_x(FRAC_PI_2)),
        )
    }

    #[test]
    fn test_convergence_averages_distinct_crossings() {
        let mut registry = MemoryRegistry::new();
        registry.insert(SliceView::from_pixel_to_reference(
            AXIAL,
            "axial",
            [512, 512],
            Transform::identity(),
        ));
        // Triangle: y = 100, x = 100 and x + y = 400
        registry.insert(line_view(ViewId(2), (50.0, 100.0), 0.0, 400));
        registry.insert(line_view(ViewId(3), (100.0, 50.0), FRAC_PI_2, 400));
        registry.insert(line_view(ViewId(4), (50.0, 350.0), -FRAC_PI_4, 424));
        let set = axial_set(&registry);

        let p = set.convergence_point(&registry);
        assert_abs_diff_eq!(p.x, 500.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 500.0 / 3.0, epsilon = 1e-9);

        // Short piece of y = x: its line meets all three, its segment none
        registry.insert(line_view(ViewId(5), (420.0, 420.0), FRAC_PI_4, 30));
        let set = axial_set(&registry);
        assert!(set.segment(set.triple(ViewId(5)).unwrap().center).unwrap().is_visible());

        let p = set.convergence_point(&registry);
        assert_abs_diff_eq!(p.x, 500.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 500.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reconcile_without_current_view_stays_empty() {
        let registry = three_views();
        let mut set = axial_set(&registry);
        set.set_current_view(&registry, None);
        assert!(set.is_empty());

        let summary = set.reconcile(&registry);
        assert!(summary.is_empty());
        assert!(set.is_empty());
        assert_eq!(set.segments().count(), 0);
    }

    #[test]
    fn test_reconcile_follows_registry() {
        let mut registry = three_views();
        let mut set = axial_set(&registry);

        registry.remove(CORONAL);
        registry.insert(SliceView::new(ViewId(7), "extra", [64, 64]));
        let summary = set.reconcile(&registry);

        assert_eq!(summary.removed, vec![CORONAL]);
        assert_eq!(summary.added, vec![ViewId(7)]);
        assert_eq!(set.peers(), &[SAGITTAL, ViewId(7)]);
    }

    #[test]
    fn test_hit_test_on_and_off_line() {
        let registry = three_views();
        let set = axial_set(&registry);

        let hit = set.hit_test(Point2::new(257.0, 100.0), 3.0).unwrap();
        assert_eq!(hit.peer, SAGITTAL);
        assert_eq!(hit.mode, SegmentMode::Center);
        assert_abs_diff_eq!(hit.angle, FRAC_PI_2, epsilon = 1e-9);

        assert!(set.hit_test(Point2::new(100.0, 100.0), 3.0).is_none());
    }

    #[test]
    fn test_hit_test_needs_two_segments() {
        let mut registry = three_views();
        registry.remove(CORONAL);
        let set = axial_set(&registry);
        assert!(set.hit_test(Point2::new(256.0, 10.0), 3.0).is_none());
    }

    #[test]
    fn test_snapshot_lists_visible_segments_in_order() {
        let registry = three_views();
        let set = axial_set(&registry);
        let modes: Vec<(ViewId, SegmentMode)> =
            set.snapshot().iter().map(|s| (s.peer, s.mode)).collect();
        assert_eq!(
            modes,
            vec![
                (SAGITTAL, SegmentMode::Center),
                (SAGITTAL, SegmentMode::LeftOffset),
                (SAGITTAL, SegmentMode::RightOffset),
                (CORONAL, SegmentMode::Center),
                (CORONAL, SegmentMode::LeftOffset),
                (CORONAL, SegmentMode::RightOffset),
            ]
        );
    }

    #[test]
    fn test_rotate_all_moves_visible_peers_only() {
        let mut registry = three_views();
        registry.view_mut(CORONAL).unwrap().set_mapped(false);
        let set = axial_set(&registry);

        let before = registry.view(SAGITTAL).unwrap().modified_count();
        let rotation = Transform::rotation_z(0.25);
        let moved = set.rotate_all(&mut registry, &rotation);

        assert_eq!(moved, vec![SAGITTAL]);
        let sagittal = registry.view(SAGITTAL).unwrap();
        assert_eq!(sagittal.modified_count(), before + 1);
        let expected = rotation
            .then(&Transform::translation(256.0, 0.0, 256.0))
            .then(&Transform::rotation_y(FRAC_PI_2));
        assert!((sagittal.pixel_to_reference().matrix - expected.matrix).norm() < 1e-9);
        assert_eq!(
            registry.view(CORONAL).unwrap().pose(),
            &Transform::translation(0.0, 256.0, -256.0).then(&Transform::rotation_x(FRAC_PI_2))
        );
    }
}
