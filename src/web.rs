//! Browser host: mounts a scene on an HTML canvas.
//!
//! JS callbacks (animation frames, window resize, canvas pointer events,
//! intersection observation, load completions) reach the controller
//! through a [`Weak`] reference to its slot, so anything that fires after
//! unmount is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::{AbortHandle, Abortable};
use rustc_hash::FxHashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlCanvasElement,
    IntersectionObserver, IntersectionObserverEntry, MouseEvent, WheelEvent,
    Window,
};

use crate::error::SceneError;
use crate::gpu::render_context::GpuContext;
use crate::input::{InputEvent, MouseButton};
use crate::lifecycle::{
    FrameHandle, Host, LoadTicket, SceneController, Subscription,
    SubscriptionKind, Viewport,
};
use crate::loader::{AssetLoader, AssetRequest, GltfLoader, WebFetcher};
use crate::options::Options;
use crate::renderer::GpuSurface;

type WebController = SceneController<GpuSurface, WebHost>;
type Slot = RefCell<Option<WebController>>;

/// Route a callback to the mounted controller. Dropped when the scene was
/// unmounted or the controller is busy.
fn with_controller(slot: &Weak<Slot>, f: impl FnOnce(&mut WebController)) {
    let Some(slot) = slot.upgrade() else {
        log::debug!("callback after unmount dropped");
        return;
    };
    let Ok(mut guard) = slot.try_borrow_mut() else {
        log::warn!("re-entrant callback dropped");
        return;
    };
    if let Some(controller) = guard.as_mut() {
        f(controller);
    }
}

/// Physical drawing-buffer size for a CSS size at `dpr`.
fn physical_viewport(css_width: f64, css_height: f64, dpr: f64) -> Viewport {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    Viewport {
        width: (css_width.max(0.0) * dpr).round() as u32,
        height: (css_height.max(0.0) * dpr).round() as u32,
        scale_factor: dpr,
    }
}

/// Window inner size in CSS pixels.
fn window_css_size(window: &Window) -> (f64, f64) {
    let dimension =
        |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64());
    (
        dimension(window.inner_width()).unwrap_or(0.0),
        dimension(window.inner_height()).unwrap_or(0.0),
    )
}

/// The scene fills the window: physical size of the window's inner area.
fn canvas_viewport(window: &Window) -> Viewport {
    let (width, height) = window_css_size(window);
    physical_viewport(width, height, window.device_pixel_ratio())
}

/// Size the canvas to the window. The CSS size is pinned alongside the
/// drawing buffer so the displayed size never follows the buffer.
fn sync_canvas_size(window: &Window, canvas: &HtmlCanvasElement) -> Viewport {
    let (css_width, css_height) = window_css_size(window);
    let viewport =
        physical_viewport(css_width, css_height, window.device_pixel_ratio());
    if viewport.is_empty() {
        return viewport;
    }
    canvas.set_width(viewport.width);
    canvas.set_height(viewport.height);
    let style = canvas.style();
    for (property, value) in [("width", css_width), ("height", css_height)] {
        if let Err(e) = style.set_property(property, &format!("{value}px")) {
            log::warn!("could not set canvas {property}: {e:?}");
        }
    }
    viewport
}

/// Whether the controller behind `slot` is gone. A controller that is
/// merely busy still counts as mounted.
fn is_unmounted(slot: &Weak<Slot>) -> bool {
    !slot
        .upgrade()
        .is_some_and(|slot| !matches!(slot.try_borrow().as_deref(), Ok(None)))
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

enum Registration {
    Listeners(Vec<Listener>),
    Observer {
        observer: IntersectionObserver,
        _callback: Closure<dyn FnMut(js_sys::Array)>,
    },
}

impl Registration {
    fn detach(&self) {
        match self {
            Self::Listeners(listeners) => {
                for l in listeners {
                    let _ = l.target.remove_event_listener_with_callback(
                        l.event,
                        l.callback.as_ref().unchecked_ref(),
                    );
                }
            }
            Self::Observer { observer, .. } => observer.disconnect(),
        }
    }
}

/// [`Host`] backed by a browser window and canvas.
pub struct WebHost {
    window: Window,
    canvas: HtmlCanvasElement,
    slot: Weak<Slot>,
    loader: GltfLoader<WebFetcher>,
    next_frame: u64,
    /// Latest scheduled frame and its `requestAnimationFrame` id.
    scheduled: Option<(FrameHandle, i32)>,
    next_subscription: u64,
    registrations: FxHashMap<u64, Registration>,
    /// Detached closures. Kept alive because `unsubscribe` may run inside
    /// the very callback being removed.
    retired: Vec<Registration>,
    loads: Rc<RefCell<FxHashMap<LoadTicket, AbortHandle>>>,
}

impl WebHost {
    fn new(window: Window, canvas: HtmlCanvasElement, slot: Weak<Slot>) -> Self {
        Self {
            window,
            canvas,
            slot,
            loader: GltfLoader::new(WebFetcher),
            next_frame: 0,
            scheduled: None,
            next_subscription: 0,
            registrations: FxHashMap::default(),
            retired: Vec::new(),
            loads: Rc::new(RefCell::new(FxHashMap::default())),
        }
    }

    fn listen(
        &self,
        target: &EventTarget,
        event: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Option<Listener> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        match target
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.as_ref().unchecked_ref(),
                &options,
            ) {
            Ok(()) => Some(Listener {
                target: target.clone(),
                event,
                callback,
            }),
            Err(e) => {
                log::error!("failed to add {event} listener: {e:?}");
                None
            }
        }
    }

    fn resize_registration(&self) -> Registration {
        let slot = self.slot.clone();
        let window = self.window.clone();
        let canvas = self.canvas.clone();
        let listener = self.listen(&self.window, "resize", true, move |_| {
            let viewport = sync_canvas_size(&window, &canvas);
            with_controller(&slot, |c| {
                let _ = c.on_resize(viewport);
            });
        });
        Registration::Listeners(listener.into_iter().collect())
    }

    fn pointer_registration(&self) -> Registration {
        let target: &EventTarget = &self.canvas;
        let dpr = self.window.device_pixel_ratio() as f32;

        let forward = |events: fn(&Event, f32) -> Vec<InputEvent>| {
            let slot = self.slot.clone();
            move |event: Event| {
                let translated = events(&event, dpr);
                if translated.is_empty() {
                    return;
                }
                with_controller(&slot, |c| {
                    for e in &translated {
                        if c.on_pointer(e) {
                            event.prevent_default();
                        }
                    }
                });
            }
        };

        let listeners = [
            self.listen(target, "pointerdown", false, forward(pointer_button)),
            self.listen(target, "pointerup", false, forward(pointer_button)),
            self.listen(target, "pointermove", true, forward(pointer_move)),
            self.listen(target, "wheel", false, forward(wheel)),
            self.listen(target, "contextmenu", false, |e: Event| {
                e.prevent_default();
            }),
        ];
        Registration::Listeners(listeners.into_iter().flatten().collect())
    }

    fn visibility_registration(&self) -> Option<Registration> {
        let slot = self.slot.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(
            move |entries: js_sys::Array| {
                let visible = entries.iter().any(|entry| {
                    entry
                        .dyn_into::<IntersectionObserverEntry>()
                        .is_ok_and(|e| e.is_intersecting())
                });
                with_controller(&slot, |c| c.on_visibility(visible));
            },
        );
        match IntersectionObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => {
                observer.observe(&self.canvas);
                Some(Registration::Observer {
                    observer,
                    _callback: callback,
                })
            }
            Err(e) => {
                log::error!("IntersectionObserver unavailable: {e:?}");
                None
            }
        }
    }
}

fn pointer_position(event: &MouseEvent, dpr: f32) -> InputEvent {
    InputEvent::CursorMoved {
        x: event.offset_x() as f32 * dpr,
        y: event.offset_y() as f32 * dpr,
    }
}

fn pointer_button(event: &Event, dpr: f32) -> Vec<InputEvent> {
    let Some(e) = event.dyn_ref::<MouseEvent>() else {
        return Vec::new();
    };
    let Some(button) = MouseButton::from_dom(e.button()) else {
        return Vec::new();
    };
    vec![
        InputEvent::ModifiersChanged {
            shift: e.shift_key() || e.ctrl_key() || e.meta_key(),
        },
        pointer_position(e, dpr),
        InputEvent::MouseButton {
            button,
            pressed: event.type_() == "pointerdown",
        },
    ]
}

fn pointer_move(event: &Event, dpr: f32) -> Vec<InputEvent> {
    event
        .dyn_ref::<MouseEvent>()
        .map(|e| vec![pointer_position(e, dpr)])
        .unwrap_or_default()
}

fn wheel(event: &Event, _dpr: f32) -> Vec<InputEvent> {
    let Some(e) = event.dyn_ref::<WheelEvent>() else {
        return Vec::new();
    };
    let delta = e.delta_y();
    if delta == 0.0 {
        return Vec::new();
    }
    // Scrolling up (negative deltaY) zooms in.
    vec![InputEvent::Scroll {
        delta: -delta.signum() as f32,
    }]
}

impl Host for WebHost {
    fn viewport(&self) -> Viewport {
        canvas_viewport(&self.window)
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle::new(self.next_frame);
        let slot = self.slot.clone();
        let callback = Closure::once_into_js(move |_timestamp: f64| {
            with_controller(&slot, |c| {
                let _ = c.on_frame(handle);
            });
        });
        match self
            .window
            .request_animation_frame(callback.unchecked_ref())
        {
            Ok(id) => self.scheduled = Some((handle, id)),
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some((scheduled, id)) = self.scheduled {
            if scheduled == handle {
                let _ = self.window.cancel_animation_frame(id);
                self.scheduled = None;
            }
        }
    }

    fn subscribe(&mut self, kind: SubscriptionKind) -> Subscription {
        self.next_subscription += 1;
        let subscription = Subscription::new(self.next_subscription, kind);
        let registration = match kind {
            SubscriptionKind::Resize => Some(self.resize_registration()),
            SubscriptionKind::Pointer => Some(self.pointer_registration()),
            SubscriptionKind::Visibility => self.visibility_registration(),
        };
        if let Some(registration) = registration {
            let _ = self
                .registrations
                .insert(subscription.id(), registration);
        }
        log::debug!("subscribed {subscription}");
        subscription
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        if let Some(registration) =
            self.registrations.remove(&subscription.id())
        {
            registration.detach();
            self.retired.push(registration);
            log::debug!("unsubscribed {subscription}");
        }
    }

    fn start_load(&mut self, request: AssetRequest) {
        let ticket = request.ticket;
        let (abort, registration) = AbortHandle::new_pair();
        let task = Abortable::new(self.loader.load(&request), registration);
        let _ = self.loads.borrow_mut().insert(ticket, abort);

        let slot = self.slot.clone();
        let loads = Rc::downgrade(&self.loads);
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = task.await;
            if let Some(loads) = loads.upgrade() {
                let _ = loads.borrow_mut().remove(&ticket);
            }
            let Ok(result) = outcome else {
                log::debug!("load {ticket} aborted");
                return;
            };
            if is_unmounted(&slot) {
                log::warn!("{}", SceneError::TeardownRace(ticket));
                return;
            }
            with_controller(&slot, |c| {
                if let Err(e) = c.complete_load(ticket, result) {
                    log::debug!("load {ticket} not applied: {e}");
                }
            });
        });
    }

    fn cancel_load(&mut self, ticket: LoadTicket) {
        if let Some(abort) = self.loads.borrow_mut().remove(&ticket) {
            abort.abort();
            log::debug!("cancelled load {ticket}");
        }
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        for (_, registration) in self.registrations.drain() {
            registration.detach();
        }
    }
}

/// A mounted scene. Dropping the handle (or calling
/// [`unmount`](Self::unmount)) tears the scene down.
#[wasm_bindgen]
pub struct SceneHandle {
    slot: Rc<Slot>,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Tear the scene down and release the canvas. Later calls are no-ops.
    pub fn unmount(&self) {
        let Ok(mut guard) = self.slot.try_borrow_mut() else {
            log::warn!("unmount during a scene callback ignored");
            return;
        };
        if let Some(mut controller) = guard.take() {
            let _ = controller.teardown();
        }
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.slot
            .try_borrow()
            .ok()
            .and_then(|c| c.as_ref().map(SceneController::fps))
            .unwrap_or(0.0)
    }

    /// Whether the scene is still mounted.
    #[wasm_bindgen(js_name = isMounted)]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.slot
            .try_borrow()
            .is_ok_and(|c| c.as_ref().is_some_and(|c| !c.is_torn_down()))
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn parse_options(options_toml: Option<&str>) -> Result<Options, SceneError> {
    match options_toml {
        Some(toml) if !toml.trim().is_empty() => Options::from_toml_str(toml),
        _ => Ok(Options::default()),
    }
}

/// Mount a scene on `canvas` and start its frame loop.
///
/// # Errors
///
/// [`SceneError::InvalidViewport`] for a zero-size canvas,
/// [`SceneError::Gpu`] when no adapter or device is available.
pub async fn mount_canvas(
    canvas: HtmlCanvasElement,
    options: Options,
) -> Result<SceneHandle, SceneError> {
    let window = web_sys::window()
        .ok_or_else(|| SceneError::MissingSurface("no global window".into()))?;
    let viewport = sync_canvas_size(&window, &canvas);
    if viewport.is_empty() {
        return Err(SceneError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }

    let context = GpuContext::new(
        wgpu::SurfaceTarget::Canvas(canvas.clone()),
        (viewport.width, viewport.height),
        &options.render,
    )
    .await?;
    let surface = GpuSurface::new(context, &options);

    let slot: Rc<Slot> = Rc::new(RefCell::new(None));
    let host = WebHost::new(window, canvas, Rc::downgrade(&slot));
    let mut controller = SceneController::mount(host, surface, options)?;
    let _ = controller.start();
    *slot.borrow_mut() = Some(controller);
    Ok(SceneHandle { slot })
}

fn to_js(e: &SceneError) -> JsValue {
    log::error!("{e}");
    JsValue::from_str(&e.to_string())
}

/// Mount a scene on an explicit canvas element.
///
/// # Errors
///
/// Rejects with a message for malformed options, a zero-size canvas or a
/// GPU initialization failure.
#[wasm_bindgen]
#[allow(clippy::needless_pass_by_value)] // async exports own their arguments
pub async fn mount(
    canvas: HtmlCanvasElement,
    options_toml: Option<String>,
) -> Result<SceneHandle, JsValue> {
    let options =
        parse_options(options_toml.as_deref()).map_err(|e| to_js(&e))?;
    mount_canvas(canvas, options).await.map_err(|e| to_js(&e))
}

/// Mount a scene on the first canvas matching a CSS selector.
///
/// # Errors
///
/// Rejects when nothing matches or the match is not a `<canvas>`, plus
/// every error of [`mount`].
#[wasm_bindgen(js_name = mountSelector)]
#[allow(clippy::needless_pass_by_value)]
pub async fn mount_selector(
    selector: String,
    options_toml: Option<String>,
) -> Result<SceneHandle, JsValue> {
    let canvas = find_canvas(&selector).map_err(|e| to_js(&e))?;
    mount(canvas, options_toml).await
}

fn find_canvas(selector: &str) -> Result<HtmlCanvasElement, SceneError> {
    let missing =
        |why: &str| SceneError::MissingSurface(format!("{selector}: {why}"));
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| missing("no document"))?;
    let element = document
        .query_selector(selector)
        .map_err(|_| missing("invalid selector"))?
        .ok_or_else(|| missing("no matching element"))?;
    element
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| missing("element is not a canvas"))
}

/// Route `log` output to the browser console and panics to
/// `console.error`. Safe to call more than once.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_web_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_scales_css_size_once() {
        let viewport = physical_viewport(300.0, 150.0, 2.0);
        assert_eq!((viewport.width, viewport.height), (600, 300));
        assert_eq!(viewport.scale_factor, 2.0);
        // Same inputs on a later resize give the same buffer size.
        assert_eq!(physical_viewport(300.0, 150.0, 2.0), viewport);
    }

    #[test]
    fn odd_ratios_round_and_bad_ratios_fall_back() {
        let viewport = physical_viewport(333.0, 101.0, 1.5);
        assert_eq!((viewport.width, viewport.height), (500, 152));
        let fallback = physical_viewport(640.0, 480.0, 0.0);
        assert_eq!((fallback.width, fallback.height), (640, 480));
        assert!(physical_viewport(0.0, 480.0, 2.0).is_empty());
    }

    #[test]
    fn dropped_or_emptied_slots_are_unmounted() {
        let slot: Rc<Slot> = Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(&slot);
        assert!(is_unmounted(&weak));
        drop(slot);
        assert!(is_unmounted(&weak));
    }
}
