//! Turns view and registry notifications into pipeline updates.
//!
//! The host reports changes as [`ViewEvent`]s, either one at a time through
//! [`UpdateDriver::handle`] or queued on a channel and flushed with
//! [`UpdateDriver::drain`]. Everything runs synchronously on the caller's
//! thread; the driver is the single owner of its [`PipelineSet`].

use std::sync::mpsc::Receiver;

use log::debug;
use serde::{Deserialize, Serialize};
use slice_intersect_math::{Point2, Point3, Transform};

use crate::pipeline::{LineHit, PipelineSet, UpdateSummary};
use crate::settings::IntersectionSettings;
use crate::view::{ViewId, ViewRegistry};

/// Something changed outside the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewEvent {
    /// A view's plane, size, thickness, group, mapping or styling changed.
    ViewChanged(ViewId),
    /// Views were registered or deregistered.
    RegistryChanged,
}

/// Keeps a [`PipelineSet`] in step with the views it draws.
#[derive(Debug, Clone, Default)]
pub struct UpdateDriver {
    pipelines: PipelineSet,
}

impl UpdateDriver {
    /// Create a driver with no current view.
    pub fn new(settings: IntersectionSettings) -> Self {
        Self {
            pipelines: PipelineSet::new(settings),
        }
    }

    /// Read access to the managed set.
    pub fn pipelines(&self) -> &PipelineSet {
        &self.pipelines
    }

    /// Switch the view the overlay is drawn on.
    pub fn set_current_view<R: ViewRegistry>(
        &mut self,
        registry: &R,
        view: Option<ViewId>,
    ) -> UpdateSummary {
        if view == self.pipelines.current_view() {
            return UpdateSummary::default();
        }
        let summary = UpdateSummary {
            removed: self.pipelines.peers().to_vec(),
            ..Default::default()
        };
        self.pipelines.set_current_view(registry, view);
        UpdateSummary {
            added: self.pipelines.peers().to_vec(),
            ..summary
        }
    }

    /// Show or hide the overlay.
    pub fn set_visible<R: ViewRegistry>(&mut self, registry: &R, visible: bool) {
        self.pipelines.set_visible(registry, visible);
    }

    /// Apply one notification.
    pub fn handle<R: ViewRegistry>(&mut self, registry: &R, event: ViewEvent) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        match event {
            ViewEvent::ViewChanged(id) if Some(id) == self.pipelines.current_view() => {
                self.pipelines.recompute_all(registry);
                summary.recomputed = self.pipelines.peers().to_vec();
            }
            ViewEvent::ViewChanged(id) => {
                if self.pipelines.recompute_for_peer(registry, id) {
                    summary.recomputed.push(id);
                }
            }
            ViewEvent::RegistryChanged => {
                let owner_gone = self
                    .pipelines
                    .current_view()
                    .is_some_and(|id| registry.view(id).is_none());
                if owner_gone {
                    debug!("current view left the registry; clearing intersections");
                    summary.removed = self.pipelines.peers().to_vec();
                    self.pipelines.set_current_view(registry, None);
                } else {
                    summary = self.pipelines.reconcile(registry);
                }
            }
        }
        summary
    }

    /// Apply every event already queued on `events`, in order.
    pub fn drain<R: ViewRegistry>(
        &mut self,
        registry: &R,
        events: &Receiver<ViewEvent>,
    ) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        for event in events.try_iter() {
            summary.merge(self.handle(registry, event));
        }
        summary
    }

    /// Rotate every visibly intersecting peer by `transform` and refresh the
    /// overlay for the moved views.
    pub fn rotate_all<R: ViewRegistry>(
        &mut self,
        registry: &mut R,
        transform: &Transform,
    ) -> UpdateSummary {
        let moved = self.pipelines.rotate_all(registry, transform);
        let mut summary = UpdateSummary::default();
        for id in moved {
            summary.merge(self.handle(registry, ViewEvent::ViewChanged(id)));
        }
        summary
    }

    /// See [`PipelineSet::convergence_point`].
    pub fn convergence_point<R: ViewRegistry>(&self, registry: &R) -> Point3 {
        self.pipelines.convergence_point(registry)
    }

    /// See [`PipelineSet::hit_test`].
    pub fn hit_test(&self, point: Point2, threshold: f64) -> Option<LineHit> {
        self.pipelines.hit_test(point, threshold)
    }
}
