//! Standalone scene window backed by winit.
//!
//! ```no_run
//! # use isle::{Options, Viewer};
//! Viewer::builder()
//!     .with_options(Options::pan_locked())
//!     .with_asset("assets/models/island.glb")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```
//!
//! The window is the [`Host`]: redraw requests stand in for animation
//! frames, `Occluded` events for visibility, and loads run on a worker
//! thread that posts its result back through the event loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    window::{Window, WindowId},
};

use crate::error::SceneError;
use crate::gpu::render_context::GpuContext;
use crate::input::{InputEvent, MouseButton};
use crate::lifecycle::{
    FrameHandle, Host, LoadTicket, SceneController, Subscription,
    SubscriptionKind, Viewport,
};
use crate::loader::{
    AssetLoader, AssetRequest, GltfLoader, LoadResult, NativeFetcher,
};
use crate::options::Options;
use crate::renderer::GpuSurface;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Options,
    asset: Option<String>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: Options::default(),
            asset: None,
            title: "Isle".into(),
        }
    }

    /// Replace the default ([`Options::island`]) options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Override the asset URL or path from the options.
    #[must_use]
    pub fn with_asset(mut self, url: impl Into<String>) -> Self {
        self.asset = Some(url.into());
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(mut self) -> Viewer {
        if let Some(url) = self.asset {
            self.options.asset.url = url;
        }
        Viewer {
            options: self.options,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window showing one island scene.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// [`SceneError::Viewer`] if the event loop cannot be created or
    /// exits abnormally.
    pub fn run(self) -> Result<(), SceneError> {
        let event_loop = EventLoop::<ViewerEvent>::with_user_event()
            .build()
            .map_err(|e| SceneError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = ViewerApp {
            proxy: event_loop.create_proxy(),
            options: Some(self.options),
            title: self.title,
            window: None,
            controller: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| SceneError::Viewer(e.to_string()))
    }
}

// ── Host ─────────────────────────────────────────────────────────────────

/// Events posted to the event loop from worker threads.
#[derive(Debug)]
pub enum ViewerEvent {
    /// A load started by [`NativeHost::start_load`] finished.
    LoadCompleted {
        /// The request's ticket.
        ticket: LoadTicket,
        /// Decoded asset or the failure.
        result: LoadResult,
    },
}

/// [`Host`] backed by a winit window.
pub struct NativeHost {
    window: Arc<Window>,
    proxy: EventLoopProxy<ViewerEvent>,
    next_frame: u64,
    scheduled: Option<FrameHandle>,
    next_subscription: u64,
    subscriptions: FxHashMap<u64, SubscriptionKind>,
    loads: FxHashMap<LoadTicket, Arc<AtomicBool>>,
}

impl NativeHost {
    /// Host for `window`, posting load completions through `proxy`.
    #[must_use]
    pub fn new(window: Arc<Window>, proxy: EventLoopProxy<ViewerEvent>) -> Self {
        Self {
            window,
            proxy,
            next_frame: 0,
            scheduled: None,
            next_subscription: 0,
            subscriptions: FxHashMap::default(),
            loads: FxHashMap::default(),
        }
    }

    /// The frame the next redraw should run, if any.
    #[must_use]
    pub fn scheduled_frame(&self) -> Option<FrameHandle> {
        self.scheduled
    }

    /// Whether events of `kind` are currently wanted.
    #[must_use]
    pub fn is_subscribed(&self, kind: SubscriptionKind) -> bool {
        self.subscriptions.values().any(|&k| k == kind)
    }
}

fn window_viewport(window: &Window) -> Viewport {
    let size = window.inner_size();
    Viewport {
        width: size.width,
        height: size.height,
        scale_factor: window.scale_factor(),
    }
}

impl Host for NativeHost {
    fn viewport(&self) -> Viewport {
        window_viewport(&self.window)
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle::new(self.next_frame);
        self.scheduled = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.scheduled == Some(handle) {
            self.scheduled = None;
        }
    }

    fn subscribe(&mut self, kind: SubscriptionKind) -> Subscription {
        self.next_subscription += 1;
        let subscription = Subscription::new(self.next_subscription, kind);
        let _ = self.subscriptions.insert(subscription.id(), kind);
        subscription
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        let _ = self.subscriptions.remove(&subscription.id());
    }

    fn start_load(&mut self, request: AssetRequest) {
        let cancelled = Arc::new(AtomicBool::new(false));
        let _ = self.loads.insert(request.ticket, Arc::clone(&cancelled));
        let proxy = self.proxy.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("isle-load-{}", request.ticket.id()))
            .spawn(move || {
                let loader = GltfLoader::new(NativeFetcher);
                let result = pollster::block_on(loader.load(&request));
                if cancelled.load(Ordering::Acquire) {
                    log::debug!("load {} cancelled", request.ticket);
                    return;
                }
                let _ = proxy.send_event(ViewerEvent::LoadCompleted {
                    ticket: request.ticket,
                    result,
                });
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn load thread: {e}");
        }
    }

    fn cancel_load(&mut self, ticket: LoadTicket) {
        if let Some(flag) = self.loads.remove(&ticket) {
            flag.store(true, Ordering::Release);
        }
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

type NativeController = SceneController<GpuSurface, NativeHost>;

struct ViewerApp {
    proxy: EventLoopProxy<ViewerEvent>,
    /// Taken when the window is created.
    options: Option<Options>,
    title: String,
    window: Option<Arc<Window>>,
    controller: Option<NativeController>,
}

impl ViewerApp {
    fn mount(
        &self,
        window: &Arc<Window>,
        options: Options,
    ) -> Result<NativeController, SceneError> {
        let viewport = window_viewport(window);
        let context = pollster::block_on(GpuContext::new(
            Arc::clone(window),
            (viewport.width, viewport.height),
            &options.render,
        ))?;
        let surface = GpuSurface::new(context, &options);
        let host = NativeHost::new(Arc::clone(window), self.proxy.clone());
        let mut controller = SceneController::mount(host, surface, options)?;
        let _ = controller.start();
        Ok(controller)
    }

    fn forward_pointer(&mut self, event: InputEvent) {
        if let Some(controller) = &mut self.controller {
            if controller.host().is_subscribed(SubscriptionKind::Pointer) {
                let _ = controller.on_pointer(&event);
            }
        }
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(options) = self.options.take() else {
            return;
        };

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (mon_size.width as f64 / scale * 0.75) as u32;
            let logical_h = (mon_size.height as f64 / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut controller = match self.mount(&window, options) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to mount scene: {e}");
                event_loop.exit();
                return;
            }
        };
        if controller.host().is_subscribed(SubscriptionKind::Visibility) {
            controller.on_visibility(window.is_visible().unwrap_or(true));
        }

        self.window = Some(window);
        self.controller = Some(controller);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        let ViewerEvent::LoadCompleted { ticket, result } = event;
        let Some(controller) = &mut self.controller else {
            log::warn!("load {ticket} completed after the window closed");
            return;
        };
        if let Err(e) = controller.complete_load(ticket, result) {
            log::debug!("load {ticket} not applied: {e}");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            if let Some(mut controller) = self.controller.take() {
                let _ = controller.teardown();
            }
            event_loop.exit();
            return;
        }

        let Some(controller) = &mut self.controller else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => {
                if controller.host().is_subscribed(SubscriptionKind::Resize) {
                    let scale_factor = self
                        .window
                        .as_ref()
                        .map_or(1.0, |w| w.scale_factor());
                    let _ = controller.on_resize(Viewport {
                        width: size.width,
                        height: size.height,
                        scale_factor,
                    });
                }
            }

            WindowEvent::Occluded(occluded) => {
                if controller
                    .host()
                    .is_subscribed(SubscriptionKind::Visibility)
                {
                    controller.on_visibility(!occluded);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(handle) = controller.host().scheduled_frame() {
                    let _ = controller.on_frame(handle);
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button) = MouseButton::from_winit(button) {
                    self.forward_pointer(InputEvent::MouseButton {
                        button,
                        pressed: state == ElementState::Pressed,
                    });
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.forward_pointer(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                self.forward_pointer(InputEvent::Scroll {
                    delta: scroll_delta,
                });
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                self.forward_pointer(InputEvent::ModifiersChanged {
                    shift: state.shift_key()
                        || state.control_key()
                        || state.super_key(),
                });
            }

            _ => (),
        }
    }
}
