//! Test doubles for the host and render-surface seams.

use rustc_hash::FxHashSet;

use super::{
    FrameHandle, Host, LoadTicket, Subscription, SubscriptionKind, Viewport,
};
use crate::camera::Camera;
use crate::loader::AssetRequest;
use crate::renderer::{RenderError, RenderSurface};
use crate::scene::{LightRig, SceneGraph};

/// One call made on a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HostCall {
    RequestFrame(FrameHandle),
    CancelFrame(FrameHandle),
    Subscribe(Subscription),
    Unsubscribe(Subscription),
    StartLoad(AssetRequest),
    CancelLoad(LoadTicket),
}

/// Host that records every call and hands out sequential ids.
#[derive(Debug)]
pub(crate) struct RecordingHost {
    pub(crate) viewport: Viewport,
    pub(crate) calls: Vec<HostCall>,
    active: FxHashSet<Subscription>,
    next_id: u64,
}

impl RecordingHost {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            calls: Vec::new(),
            active: FxHashSet::default(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn active(&self, kind: SubscriptionKind) -> usize {
        self.active.iter().filter(|s| s.kind() == kind).count()
    }

    pub(crate) fn loads(&self) -> Vec<&AssetRequest> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::StartLoad(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_frame(&self) -> Option<FrameHandle> {
        self.calls.iter().rev().find_map(|c| match c {
            HostCall::RequestFrame(handle) => Some(*handle),
            _ => None,
        })
    }

    pub(crate) fn frame_requests(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::RequestFrame(_)))
            .count()
    }
}

impl Host for RecordingHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle::new(self.next_id());
        self.calls.push(HostCall::RequestFrame(handle));
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.calls.push(HostCall::CancelFrame(handle));
    }

    fn subscribe(&mut self, kind: SubscriptionKind) -> Subscription {
        let subscription = Subscription::new(self.next_id(), kind);
        let _ = self.active.insert(subscription);
        self.calls.push(HostCall::Subscribe(subscription));
        subscription
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        let _ = self.active.remove(&subscription);
        self.calls.push(HostCall::Unsubscribe(subscription));
    }

    fn start_load(&mut self, request: AssetRequest) {
        self.calls.push(HostCall::StartLoad(request));
    }

    fn cancel_load(&mut self, ticket: LoadTicket) {
        self.calls.push(HostCall::CancelLoad(ticket));
    }
}

/// Surface that counts calls instead of drawing.
#[derive(Debug, Default)]
pub(crate) struct CountingSurface {
    pub(crate) resizes: Vec<Viewport>,
    pub(crate) renders: u32,
    pub(crate) releases: u32,
    pub(crate) fail_renders: bool,
    pub(crate) last_generation: Option<u64>,
}

impl RenderSurface for CountingSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.resizes.push(viewport);
    }

    fn render(
        &mut self,
        scene: &mut SceneGraph,
        _lights: &LightRig,
        _camera: &Camera,
    ) -> Result<(), RenderError> {
        if self.releases > 0 {
            return Err(RenderError::Released);
        }
        self.renders += 1;
        if self.fail_renders {
            return Err(RenderError::Timeout);
        }
        if scene.is_dirty() {
            self.last_generation = Some(scene.generation());
            scene.mark_rendered();
        }
        Ok(())
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}
