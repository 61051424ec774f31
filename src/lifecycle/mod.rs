//! Scene lifecycle: mount, frame loop, resize, deferred asset load and
//! teardown of one scene instance.
//!
//! A [`SceneController`] owns everything one mounted scene needs (camera,
//! lights, controls, scene graph, render surface) and talks to its
//! environment only through the [`Host`] trait. Hosts forward their
//! callbacks to the `on_*` methods and to
//! [`complete_load`](SceneController::complete_load); the controller
//! checks liveness and ticket identity before touching any state.
//!
//! # Lifecycle
//!
//! ```text
//! mount ──► start ──► on_frame ──► on_frame ──► … ──► teardown
//!   │                    ▲  (reschedules itself)        │
//!   ├─ resize/pointer subscriptions                     ├─ unsubscribe resize
//!   └─ load gate (visibility or immediate)              ├─ release surface
//!        └─ start_load ──► complete_load                ├─ release visibility
//!                                                       ├─ unsubscribe pointer
//!                                                       ├─ cancel frame
//!                                                       └─ cancel load
//! ```

mod gate;
mod host;
#[cfg(test)]
pub(crate) mod testing;

pub use gate::{LoadGate, LoadTicket};
pub use host::{FrameHandle, Host, Subscription, SubscriptionKind, Viewport};

use glam::Vec3;

use crate::camera::{Camera, InputHandler, OrbitControls};
use crate::error::SceneError;
use crate::input::InputEvent;
use crate::loader::{AssetLoadError, AssetRequest, LoadResult};
use crate::options::Options;
use crate::renderer::RenderSurface;
use crate::scene::{LightRig, NodeId, SceneGraph, Transform};
use crate::util::frame_timing::FrameTiming;

/// Counters maintained by the frame driver and resize reactor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame ticks processed.
    pub frames: u64,
    /// Resizes applied.
    pub resizes: u64,
    /// Frames whose render call failed.
    pub render_errors: u64,
}

/// Everything one mounted scene renders with.
pub struct RenderContext<S> {
    /// The viewing camera.
    pub camera: Camera,
    /// Fixed light setup.
    pub lights: LightRig,
    /// Damped orbit controls bound to the camera.
    pub controls: OrbitControls,
    /// Pointer gesture tracking feeding the controls.
    pub input: InputHandler,
    /// The scene graph.
    pub scene: SceneGraph,
    /// Where frames go.
    pub surface: S,
    /// Last applied viewport.
    pub viewport: Viewport,
}

/// Lifecycle manager of one scene instance.
pub struct SceneController<S: RenderSurface, H: Host> {
    host: H,
    context: RenderContext<S>,
    options: Options,
    gate: LoadGate,
    resize_subscription: Option<Subscription>,
    pointer_subscription: Option<Subscription>,
    frame: Option<FrameHandle>,
    pending_load: Option<LoadTicket>,
    asset_root: Option<NodeId>,
    stats: FrameStats,
    timing: FrameTiming,
    torn_down: bool,
}

impl<S: RenderSurface, H: Host> SceneController<S, H> {
    /// Initialize the render context and register with the host.
    ///
    /// Subscribes to resize and pointer events and arms the load gate:
    /// with `asset.lazy_load` the gate waits for the first visibility
    /// signal, otherwise the load starts before this returns.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidViewport`] if the host reports a zero-area
    /// surface. Nothing is registered with the host in that case.
    pub fn mount(
        mut host: H,
        mut surface: S,
        options: Options,
    ) -> Result<Self, SceneError> {
        let viewport = host.viewport();
        if viewport.is_empty() {
            return Err(SceneError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let camera = Camera::from_options(&options.camera, viewport.aspect());
        surface.resize(viewport);
        let lights = LightRig::from_options(&options.lighting);
        let mut scene = SceneGraph::new();
        scene.add_debug_helpers(&options.debug, &lights);
        let controls =
            OrbitControls::for_policy(&options.controls, viewport.height);

        let resize_subscription = host.subscribe(SubscriptionKind::Resize);
        let pointer_subscription = host.subscribe(SubscriptionKind::Pointer);
        let gate = if options.asset.lazy_load {
            LoadGate::Waiting(Some(
                host.subscribe(SubscriptionKind::Visibility),
            ))
        } else {
            LoadGate::Waiting(None)
        };

        log::debug!(
            "mounted scene {}x{} ({:?} controls)",
            viewport.width,
            viewport.height,
            options.controls.policy
        );

        let mut controller = Self {
            host,
            context: RenderContext {
                camera,
                lights,
                controls,
                input: InputHandler::new(),
                scene,
                surface,
                viewport,
            },
            options,
            gate,
            resize_subscription: Some(resize_subscription),
            pointer_subscription: Some(pointer_subscription),
            frame: None,
            pending_load: None,
            asset_root: None,
            stats: FrameStats::default(),
            timing: FrameTiming::new(),
            torn_down: false,
        };
        if !controller.options.asset.lazy_load {
            controller.trigger_load();
        }
        Ok(controller)
    }

    // -- Frame driver --

    /// Schedule the first frame. Returns `false` if already running or torn
    /// down.
    pub fn start(&mut self) -> bool {
        if self.torn_down || self.frame.is_some() {
            return false;
        }
        self.frame = Some(self.host.request_frame());
        true
    }

    /// Whether a frame is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    /// Run one frame tick: advance the controls, render, reschedule.
    ///
    /// Returns `false` without doing anything if `handle` is not the
    /// scheduled frame or the controller was torn down.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        if self.torn_down || self.frame != Some(handle) {
            log::debug!("ignoring stale frame {}", handle.id());
            return false;
        }
        self.frame = None;

        let ctx = &mut self.context;
        let _ = ctx.controls.update(&mut ctx.camera);
        if let Err(e) =
            ctx.surface.render(&mut ctx.scene, &ctx.lights, &ctx.camera)
        {
            log::error!("render failed: {e}");
            self.stats.render_errors += 1;
        }
        self.stats.frames += 1;
        self.timing.end_frame();

        self.frame = Some(self.host.request_frame());
        true
    }

    // -- Resize reactor --

    /// Apply a new viewport size. Zero-area sizes are ignored.
    pub fn on_resize(&mut self, viewport: Viewport) -> bool {
        if self.torn_down {
            return false;
        }
        if viewport.is_empty() {
            log::warn!(
                "ignoring zero-area resize {}x{}",
                viewport.width,
                viewport.height
            );
            return false;
        }
        let ctx = &mut self.context;
        ctx.camera.set_aspect(viewport.aspect());
        ctx.surface.resize(viewport);
        ctx.controls.set_viewport_height(viewport.height);
        ctx.viewport = viewport;
        self.stats.resizes += 1;
        true
    }

    // -- Interaction --

    /// Feed one pointer event to the controls. Returns `true` if consumed.
    pub fn on_pointer(&mut self, event: &InputEvent) -> bool {
        if self.torn_down {
            return false;
        }
        let ctx = &mut self.context;
        ctx.input.handle_event(&mut ctx.controls, &ctx.camera, event)
    }

    // -- Load gate --

    /// Visibility signal from the host. The first positive signal fires
    /// the load gate; everything after that is ignored.
    pub fn on_visibility(&mut self, visible: bool) {
        if self.torn_down || !visible {
            return;
        }
        self.trigger_load();
    }

    fn trigger_load(&mut self) {
        let Some(subscription) = self.gate.trigger() else {
            return;
        };
        if let Some(subscription) = subscription {
            self.host.unsubscribe(subscription);
        }
        let request = AssetRequest {
            ticket: LoadTicket::next(),
            url: self.options.asset.url.clone(),
            decoder_path: self.options.asset.decoder_path.clone(),
        };
        log::debug!("starting load {} of {}", request.ticket, request.url);
        self.pending_load = Some(request.ticket);
        self.host.start_load(request);
    }

    /// Deliver the result of a load started by this controller.
    ///
    /// On success the asset is placed under the root, every mesh is made to
    /// cast and receive shadows, and the configured material override is
    /// applied. Returns the id of the attached subtree.
    ///
    /// # Errors
    ///
    /// - [`SceneError::TeardownRace`] after teardown; nothing is mutated.
    /// - [`SceneError::StaleLoad`] if `ticket` is not the pending load.
    /// - [`SceneError::AssetLoad`] if the load failed; the scene graph is
    ///   left unchanged.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: LoadResult,
    ) -> Result<NodeId, SceneError> {
        if self.torn_down {
            log::warn!("load {ticket} completed after teardown; dropping it");
            return Err(SceneError::TeardownRace(ticket));
        }
        if self.pending_load != Some(ticket) {
            log::debug!("ignoring completion of unknown load {ticket}");
            return Err(SceneError::StaleLoad(ticket));
        }
        self.pending_load = None;

        let asset = result.map_err(|e| {
            log::error!("failed to load {}: {e}", self.options.asset.url);
            SceneError::AssetLoad(e)
        })?;

        let placement = &self.options.asset;
        let transform = Transform::placed(
            Vec3::from_array(placement.position),
            placement.scale,
        );
        let scene = &mut self.context.scene;
        let root = scene
            .attach_asset(NodeId::ROOT, asset, transform)
            .ok_or_else(|| {
                SceneError::AssetLoad(AssetLoadError::Decode(
                    "scene graph is full".into(),
                ))
            })?;
        let meshes = scene.set_shadows(root, true, true);
        let _ = scene.apply_material_override(root, placement.material_override);
        self.asset_root = Some(root);
        log::info!("attached {} ({meshes} meshes)", placement.url);
        Ok(root)
    }

    // -- Teardown --

    /// Release everything registered with the host and the GPU. Runs once;
    /// later calls return `false`.
    pub fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;

        if let Some(subscription) = self.resize_subscription.take() {
            self.host.unsubscribe(subscription);
        }
        self.context.surface.release();
        if let Some(subscription) = self.gate.close() {
            self.host.unsubscribe(subscription);
        }
        if let Some(subscription) = self.pointer_subscription.take() {
            self.host.unsubscribe(subscription);
        }
        if let Some(frame) = self.frame.take() {
            self.host.cancel_frame(frame);
        }
        if let Some(ticket) = self.pending_load.take() {
            self.host.cancel_load(ticket);
        }
        log::debug!("scene torn down after {} frames", self.stats.frames);
        true
    }

    /// Whether [`teardown`](Self::teardown) has run.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // -- Accessors --

    /// The viewing camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.context.camera
    }

    /// The light rig.
    #[must_use]
    pub fn lights(&self) -> &LightRig {
        &self.context.lights
    }

    /// The orbit controls.
    #[must_use]
    pub fn controls(&self) -> &OrbitControls {
        &self.context.controls
    }

    /// The scene graph.
    #[must_use]
    pub fn scene(&self) -> &SceneGraph {
        &self.context.scene
    }

    /// The render surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.context.surface
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Last applied viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.context.viewport
    }

    /// The options this scene was mounted with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Frame and resize counters.
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }

    /// Ticket of the in-flight load, if any.
    #[must_use]
    pub fn pending_load(&self) -> Option<LoadTicket> {
        self.pending_load
    }

    /// Root of the attached asset, once loaded.
    #[must_use]
    pub fn asset_root(&self) -> Option<NodeId> {
        self.asset_root
    }
}

impl<S: RenderSurface, H: Host> Drop for SceneController<S, H> {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::testing::{CountingSurface, HostCall, RecordingHost};
    use super::*;
    use crate::input::MouseButton;
    use crate::options::{InteractionPolicy, MaterialOverride};
    use crate::scene::{AssetNode, LoadedAsset, Material, Mesh, MeshData, Node};

    type Controller = SceneController<CountingSurface, RecordingHost>;

    fn mount(options: Options) -> Controller {
        SceneController::mount(
            RecordingHost::new(1200, 600),
            CountingSurface::default(),
            options,
        )
        .unwrap()
    }

    fn asset_with(meshes: usize) -> LoadedAsset {
        let material = Material {
            roughness: 0.7,
            metalness: 0.6,
            ..Material::default()
        };
        let nodes = (0..meshes)
            .map(|i| {
                AssetNode::mesh(
                    Some(format!("chunk{i}")),
                    Mesh::new(MeshData::default(), material),
                )
            })
            .collect();
        LoadedAsset::from_nodes(Some("island".into()), nodes)
    }

    fn pending(controller: &Controller) -> LoadTicket {
        controller.pending_load().unwrap()
    }

    // -- Mount --

    #[test]
    fn mount_rejects_zero_area_viewport() {
        let result = SceneController::mount(
            RecordingHost::new(800, 0),
            CountingSurface::default(),
            Options::island(),
        );
        assert!(matches!(
            result.err(),
            Some(SceneError::InvalidViewport {
                width: 800,
                height: 0
            })
        ));
    }

    #[test]
    fn mount_sizes_camera_surface_and_helpers() {
        let c = mount(Options::island());
        assert_eq!(c.camera().aspect, 2.0);
        assert_eq!(c.camera().fovy, 75.0);
        assert_eq!(c.camera().eye, Vec3::new(0.0, 35.0, 0.0));
        assert_eq!(c.surface().resizes, vec![Viewport::new(1200, 600)]);
        assert_eq!(c.lights().directional.shadow.map_size, 4096);
        // root + axes + light helper
        assert_eq!(c.scene().len(), 3);
        assert_eq!(c.host().active(SubscriptionKind::Resize), 1);
        assert_eq!(c.host().active(SubscriptionKind::Pointer), 1);
        assert!(!c.is_running());
    }

    #[test]
    fn eager_options_start_the_load_during_mount() {
        let c = mount(Options::island());
        let loads = c.host().loads();
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].url, "assets/models/RoosIsland.gltf");
        assert_eq!(c.pending_load(), Some(loads[0].ticket));
        assert_eq!(c.host().active(SubscriptionKind::Visibility), 0);
    }

    #[test]
    fn lazy_load_waits_for_visibility_and_fires_once() {
        let mut options = Options::pan_locked();
        options.asset.decoder_path = Some("/decoders/draco/".into());
        let mut c = mount(options);
        assert!(c.host().loads().is_empty());
        assert_eq!(c.host().active(SubscriptionKind::Visibility), 1);

        c.on_visibility(false);
        assert!(c.host().loads().is_empty());

        for _ in 0..3 {
            c.on_visibility(true);
        }
        let loads = c.host().loads();
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].decoder_path.as_deref(), Some("/decoders/draco/"));
        assert_eq!(c.host().active(SubscriptionKind::Visibility), 0);
    }

    #[test]
    fn visibility_after_teardown_never_loads() {
        let mut c = mount(Options::pan_locked());
        assert!(c.teardown());
        c.on_visibility(true);
        assert!(c.host().loads().is_empty());
    }

    // -- Frame driver --

    #[test]
    fn frames_render_and_reschedule() {
        let mut c = mount(Options::island());
        assert!(c.start());
        assert!(!c.start());
        let first = c.host().last_frame().unwrap();

        assert!(c.on_frame(first));
        assert_eq!(c.stats().frames, 1);
        assert_eq!(c.surface().renders, 1);
        let second = c.host().last_frame().unwrap();
        assert_ne!(first, second);

        // Only the scheduled handle drives a frame.
        assert!(!c.on_frame(first));
        assert!(c.on_frame(second));
        assert_eq!(c.stats().frames, 2);
        assert_eq!(c.host().frame_requests(), 3);
    }

    #[test]
    fn render_errors_are_counted_and_the_loop_continues() {
        let mut c = SceneController::mount(
            RecordingHost::new(640, 480),
            CountingSurface {
                fail_renders: true,
                ..CountingSurface::default()
            },
            Options::island(),
        )
        .unwrap();
        assert!(c.start());
        for _ in 0..3 {
            let handle = c.host().last_frame().unwrap();
            assert!(c.on_frame(handle));
        }
        assert_eq!(c.stats().render_errors, 3);
        assert_eq!(c.stats().frames, 3);
        assert!(c.is_running());
    }

    // -- Resize --

    #[test]
    fn resize_updates_camera_and_surface() {
        let mut c = mount(Options::island());
        let projection = c.camera().projection();
        assert!(c.on_resize(Viewport::new(1920, 1080)));
        assert_eq!(c.camera().aspect, 1920.0 / 1080.0);
        assert_ne!(c.camera().projection(), projection);
        assert_eq!(c.surface().resizes.last(), Some(&Viewport::new(1920, 1080)));
        assert_eq!(c.viewport(), Viewport::new(1920, 1080));
        assert_eq!(c.stats().resizes, 1);
    }

    #[test]
    fn zero_area_resize_is_ignored() {
        let mut c = mount(Options::island());
        let before = c.camera().clone();
        assert!(!c.on_resize(Viewport::new(0, 300)));
        assert!(!c.on_resize(Viewport::new(300, 0)));
        assert_eq!(*c.camera(), before);
        assert_eq!(c.stats().resizes, 0);
    }

    #[test]
    fn identical_resizes_give_identical_state() {
        let mut c = mount(Options::island());
        let _ = c.on_resize(Viewport::new(1024, 768));
        let once = c.camera().clone();
        let _ = c.on_resize(Viewport::new(1024, 768));
        assert_eq!(*c.camera(), once);
    }

    proptest! {
        #[test]
        fn aspect_tracks_every_resize(width in 1u32..8192, height in 1u32..8192) {
            let mut c = mount(Options::island());
            prop_assert!(c.on_resize(Viewport::new(width, height)));
            prop_assert_eq!(c.camera().aspect, width as f32 / height as f32);
        }
    }

    // -- Teardown --

    #[test]
    fn counters_stay_flat_after_teardown() {
        let mut c = mount(Options::island());
        let _ = c.start();
        let handle = c.host().last_frame().unwrap();
        let _ = c.on_frame(handle);
        let _ = c.on_resize(Viewport::new(800, 800));
        let stats = c.stats();
        let frame = c.host().last_frame().unwrap();

        assert!(c.teardown());
        assert!(!c.on_frame(frame));
        assert!(!c.on_resize(Viewport::new(400, 400)));
        assert!(!c.start());
        assert_eq!(c.stats(), stats);
        assert_eq!(c.surface().renders, 1);
    }

    #[test]
    fn teardown_releases_everything_in_order() {
        let mut c = mount(Options::pan_locked());
        let _ = c.start();
        let mounted = c.host().calls.len();

        assert!(c.teardown());
        assert!(!c.teardown());
        assert_eq!(c.surface().releases, 1);

        let calls = &c.host().calls[mounted..];
        let kinds: Vec<_> = calls
            .iter()
            .map(|call| match call {
                HostCall::Unsubscribe(s) => format!("unsubscribe {:?}", s.kind()),
                HostCall::CancelFrame(_) => "cancel frame".to_owned(),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            [
                "unsubscribe Resize",
                "unsubscribe Visibility",
                "unsubscribe Pointer",
                "cancel frame",
            ]
        );
        for kind in [
            SubscriptionKind::Resize,
            SubscriptionKind::Visibility,
            SubscriptionKind::Pointer,
        ] {
            assert_eq!(c.host().active(kind), 0);
        }
    }

    #[test]
    fn teardown_cancels_the_in_flight_load() {
        let mut c = mount(Options::island());
        let ticket = pending(&c);
        assert!(c.teardown());
        assert_eq!(c.host().calls.last(), Some(&HostCall::CancelLoad(ticket)));
        assert_eq!(c.pending_load(), None);
    }

    // -- Load completion --

    #[test]
    fn loaded_meshes_cast_and_receive_shadows() {
        for count in [0, 1, 12] {
            let mut c = mount(Options::pan_locked());
            c.on_visibility(true);
            let ticket = pending(&c);
            let root = c.complete_load(ticket, Ok(asset_with(count))).unwrap();

            let meshes = c.scene().meshes_in(root);
            assert_eq!(meshes.len(), count);
            for id in meshes {
                let mesh = c.scene().node(id).and_then(Node::mesh).unwrap();
                assert!(mesh.cast_shadow && mesh.receive_shadow);
                assert_eq!(mesh.material.metalness, 0.25);
                assert_eq!(mesh.material.roughness, 0.7);
            }
        }
    }

    #[test]
    fn loaded_asset_is_placed_and_overridden() {
        let mut options = Options::island();
        options.asset.material_override = MaterialOverride::Roughness(-0.5);
        let mut c = mount(options);
        let ticket = pending(&c);
        let root = c.complete_load(ticket, Ok(asset_with(2))).unwrap();

        assert_eq!(c.asset_root(), Some(root));
        let world = c.scene().world_matrix(root).unwrap();
        assert!((world.w_axis.truncate() - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-5);
        assert!((world.x_axis.truncate().length() - 0.9).abs() < 1e-5);
        for id in c.scene().meshes_in(root) {
            let mesh = c.scene().node(id).and_then(Node::mesh).unwrap();
            assert_eq!(mesh.material.roughness, 0.0);
        }
    }

    #[test]
    fn failed_load_leaves_the_graph_unchanged() {
        let mut c = mount(Options::island());
        let ticket = pending(&c);
        let (len, generation) = (c.scene().len(), c.scene().generation());
        let err = c
            .complete_load(ticket, Err(AssetLoadError::Decode("bad mesh".into())))
            .unwrap_err();
        assert!(matches!(err, SceneError::AssetLoad(_)));
        assert_eq!(c.scene().len(), len);
        assert_eq!(c.scene().generation(), generation);
        assert_eq!(c.asset_root(), None);
    }

    #[test]
    fn completion_after_teardown_does_not_mutate() {
        let mut c = mount(Options::island());
        let ticket = pending(&c);
        let len = c.scene().len();
        assert!(c.teardown());
        let err = c.complete_load(ticket, Ok(asset_with(3))).unwrap_err();
        assert!(matches!(err, SceneError::TeardownRace(t) if t == ticket));
        assert_eq!(c.scene().len(), len);
    }

    #[test]
    fn stale_tickets_are_ignored() {
        let mut c = mount(Options::island());
        let ticket = pending(&c);
        let err = c
            .complete_load(LoadTicket::new(u64::MAX), Ok(asset_with(1)))
            .unwrap_err();
        assert!(matches!(err, SceneError::StaleLoad(_)));

        let _ = c.complete_load(ticket, Ok(asset_with(1))).unwrap();
        let len = c.scene().len();
        let again = c.complete_load(ticket, Ok(asset_with(1)));
        assert!(matches!(again, Err(SceneError::StaleLoad(_))));
        assert_eq!(c.scene().len(), len);
    }

    #[test]
    fn renders_pick_up_the_attached_asset() {
        let mut c = mount(Options::island());
        let _ = c.start();
        let ticket = pending(&c);
        let _ = c.on_frame(c.host().last_frame().unwrap());
        let before = c.surface().last_generation;
        let _ = c.complete_load(ticket, Ok(asset_with(1))).unwrap();
        let _ = c.on_frame(c.host().last_frame().unwrap());
        assert_ne!(c.surface().last_generation, before);
        assert!(!c.scene().is_dirty());
    }

    // -- Interaction --

    #[test]
    fn pan_locked_pointer_drags_pan_instead_of_orbit() {
        let mut c = mount(Options::pan_locked());
        let target = c.camera().target;
        let press = InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        };
        assert!(c.on_pointer(&press));
        let _ = c.on_pointer(&InputEvent::CursorMoved { x: 100.0, y: 100.0 });
        assert!(c.on_pointer(&InputEvent::CursorMoved { x: 160.0, y: 100.0 }));
        assert!(!c.controls().bindings().enable_rotate);

        let _ = c.start();
        let _ = c.on_frame(c.host().last_frame().unwrap());
        assert_ne!(c.camera().target, target);
    }

    #[test]
    fn free_policy_orbits_around_the_target() {
        let mut c = mount(Options::island());
        assert_eq!(c.options().controls.policy, InteractionPolicy::Free);
        let radius = c.camera().distance();
        let _ = c.on_pointer(&InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        // Dragging up tilts the camera off the pole.
        let _ = c.on_pointer(&InputEvent::CursorMoved { x: 10.0, y: 90.0 });
        let _ = c.on_pointer(&InputEvent::CursorMoved { x: 10.0, y: 10.0 });

        let _ = c.start();
        let eye = c.camera().eye;
        let _ = c.on_frame(c.host().last_frame().unwrap());
        assert_ne!(c.camera().eye, eye);
        assert_eq!(c.camera().target, Vec3::ZERO);
        assert!((c.camera().distance() - radius).abs() < 1e-3);
    }
}
