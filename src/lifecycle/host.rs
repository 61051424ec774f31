use std::fmt;

use crate::loader::AssetRequest;

/// Size of the render surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub scale_factor: f64,
}

impl Viewport {
    /// A viewport at scale factor 1.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    /// Whether either dimension is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Handle of one scheduled animation-frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Wrap a host-specific frame id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The host-specific frame id.
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Event stream a controller can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    /// Viewport size changes.
    Resize,
    /// Surface entering or leaving the visible area.
    Visibility,
    /// Pointer buttons, motion and wheel.
    Pointer,
}

/// Registration token returned by [`Host::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    kind: SubscriptionKind,
}

impl Subscription {
    /// Wrap a host-specific registration id.
    #[must_use]
    pub fn new(id: u64, kind: SubscriptionKind) -> Self {
        Self { id, kind }
    }

    /// The host-specific registration id.
    #[must_use]
    pub fn id(self) -> u64 {
        self.id
    }

    /// The event stream this registration belongs to.
    #[must_use]
    pub fn kind(self) -> SubscriptionKind {
        self.kind
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.id)
    }
}

/// The environment a scene controller runs in: a browser canvas, a native
/// window, or a test double.
///
/// Every callback the host delivers (frames, resizes, visibility, pointer
/// input, load completions) goes back through the controller's `on_*` and
/// `complete_load` methods. A host must not call into the controller from
/// inside one of these methods.
pub trait Host {
    /// Current size of the render surface.
    fn viewport(&self) -> Viewport;

    /// Schedule one frame callback.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a scheduled frame callback. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Start delivering events of `kind`.
    fn subscribe(&mut self, kind: SubscriptionKind) -> Subscription;

    /// Stop delivering events for a registration.
    fn unsubscribe(&mut self, subscription: Subscription);

    /// Start an asynchronous load; the result is delivered later through
    /// `complete_load` with the request's ticket.
    fn start_load(&mut self, request: AssetRequest);

    /// Abort an in-flight load. Unknown tickets are ignored.
    fn cancel_load(&mut self, ticket: super::LoadTicket);
}
