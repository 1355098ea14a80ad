use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use headspace_input::{InputEvent, PointerTracker};
use headspace_render_wgpu::{OrbitCamera, SceneRenderer};
use headspace_scene::{
    LoadState, LoadedScene, Preset, SceneConfig, SceneEvent, SceneStatus, load_scene,
    push_pointer,
};
use headspace_surface::ShadingParams;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "headspace-desktop", about = "Reactive head scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON scene config; the flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// glTF asset with `Eyes` and `Head` nodes
    #[arg(long)]
    head: Option<PathBuf>,

    /// glTF asset for the reactive surface
    #[arg(long)]
    surface: Option<PathBuf>,

    /// Falloff preset: subtle or dramatic
    #[arg(long)]
    preset: Option<Preset>,

    /// Seed for the per-face decoration
    #[arg(long)]
    seed: Option<u64>,

    /// Delay before the loaded scene is shown
    #[arg(long)]
    reveal_delay_ms: Option<u64>,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(head) = &self.head {
            config.head_path = head.clone();
        }
        if let Some(surface) = &self.surface {
            config.surface_path = surface.clone();
        }
        if let Some(preset) = self.preset {
            config.preset = preset;
            config.falloff = None;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(delay) = self.reveal_delay_ms {
            config.reveal_delay_ms = delay;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Application state.
struct AppState {
    config: SceneConfig,
    shading: ShadingParams,
    shading_dirty: bool,
    falloff_dirty: bool,
    tracker: PointerTracker,
    camera: OrbitCamera,
    load: LoadState,
    /// Assets that arrived before the GPU was ready.
    pending: Option<Box<LoadedScene>>,
    show_overlay: bool,
    // Camera drag state
    orbiting: bool,
    panning: bool,
    last_cursor: Option<Vec2>,
    last_frame: Instant,
    frame_time: f32,
}

impl AppState {
    fn new(config: SceneConfig) -> Self {
        let now = Instant::now();
        Self {
            shading: config.shading,
            shading_dirty: false,
            falloff_dirty: false,
            tracker: PointerTracker::new(1, 1),
            camera: OrbitCamera::default(),
            load: LoadState::new(config.reveal_delay(), now),
            pending: None,
            show_overlay: true,
            orbiting: false,
            panning: false,
            last_cursor: None,
            last_frame: now,
            frame_time: 0.0,
            config,
        }
    }

    fn handle_cursor(&mut self, x: f64, y: f64) {
        self.tracker.handle(&InputEvent::PointerMoved { x, y });

        let cursor = Vec2::new(x as f32, y as f32);
        if let Some(last) = self.last_cursor {
            let delta = cursor - last;
            if self.orbiting {
                self.camera.rotate(delta);
            } else if self.panning {
                self.camera.pan(delta);
            }
        }
        self.last_cursor = Some(cursor);
    }

    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.orbiting = pressed,
            MouseButton::Right => self.panning = pressed,
            _ => {}
        }
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        self.tracker.handle(&InputEvent::Resized { width, height });
        self.camera.aspect = width as f32 / height.max(1) as f32;
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => {
                self.show_overlay = !self.show_overlay;
            }
            KeyCode::KeyR => {
                self.camera = OrbitCamera {
                    aspect: self.camera.aspect,
                    ..OrbitCamera::default()
                };
                tracing::info!("camera reset");
            }
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        let status = self.load.status().clone();
        match status {
            SceneStatus::Loading | SceneStatus::Revealing { .. } => {
                egui::Area::new(egui::Id::new("placeholder"))
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        ui.heading("Loading…");
                    });
            }
            SceneStatus::Failed(message) => {
                egui::Area::new(egui::Id::new("placeholder"))
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        ui.heading("Scene failed to load");
                        ui.label(message);
                    });
            }
            SceneStatus::Ready => {}
        }

        if !self.show_overlay {
            return;
        }

        egui::Window::new("Headspace")
            .default_width(260.0)
            .show(ctx, |ui| {
                let pointer = self.tracker.position();
                ui.label(format!("Pointer: ({:.3}, {:.3})", pointer.x, pointer.y));
                ui.label(format!("Frame: {:.1} ms", self.frame_time * 1000.0));
                ui.separator();

                ui.heading("Falloff");
                let mut preset = self.config.preset;
                ui.horizontal(|ui| {
                    ui.radio_value(&mut preset, Preset::Subtle, "Subtle");
                    ui.radio_value(&mut preset, Preset::Dramatic, "Dramatic");
                });
                if preset != self.config.preset {
                    self.config.preset = preset;
                    self.config.falloff = None;
                    self.falloff_dirty = true;
                    tracing::info!(%preset, "falloff preset changed");
                }
                let falloff = self.config.falloff();
                ui.label(format!(
                    "Radius {:.2}  Push {:.2}",
                    falloff.threshold, falloff.push
                ));
                ui.separator();

                ui.heading("Shading");
                let mut shading = self.shading;
                ui.add(egui::Slider::new(&mut shading.metalness, 0.0..=1.0).text("Metalness"));
                ui.add(egui::Slider::new(&mut shading.roughness, 0.0..=1.0).text("Roughness"));
                ui.checkbox(&mut shading.tint_faces, "Tint faces");
                if shading != self.shading {
                    self.shading = shading;
                    self.shading_dirty = true;
                }

                ui.separator();
                ui.small("F1: Overlay | LMB: Orbit | RMB: Pan | Wheel: Zoom | R: Reset");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<SceneRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(config: SceneConfig) -> Self {
        Self {
            state: AppState::new(config),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Headspace")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("headspace_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.handle_resize(config.width, config.height);
        // Scene mount: the pointer is tracked from here until the window closes.
        self.state.tracker = PointerTracker::new(config.width, config.height);
        self.state.tracker.attach();

        let mut renderer = SceneRenderer::new(&device, surface_format, config.width, config.height);
        if let Some(scene) = self.state.pending.take() {
            renderer.upload(&device, &scene, &self.state.shading, self.state.config.falloff());
        }

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn scene_arrived(&mut self, scene: Box<LoadedScene>) {
        self.state.load.loaded(Instant::now());
        match (&mut self.renderer, &self.device) {
            (Some(renderer), Some(device)) => {
                renderer.upload(device, &scene, &self.state.shading, self.state.config.falloff());
            }
            _ => self.state.pending = Some(scene),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        self.state.frame_time = (now - self.state.last_frame).as_secs_f32();
        self.state.last_frame = now;
        self.state.load.tick(now);

        let Self {
            state,
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_ctx,
            egui_winit,
            egui_renderer,
        } = self;
        let (
            Some(window),
            Some(surface),
            Some(device),
            Some(queue),
            Some(config),
            Some(renderer),
            Some(egui_winit),
            Some(egui_renderer),
        ) = (
            window.as_ref(),
            surface.as_ref(),
            device.as_ref(),
            queue.as_ref(),
            config.as_ref(),
            renderer.as_mut(),
            egui_winit.as_mut(),
            egui_renderer.as_mut(),
        )
        else {
            return;
        };

        if let Some(program) = renderer.surface_program_mut() {
            if std::mem::take(&mut state.shading_dirty) {
                program.set_shading(&state.shading);
            }
            if std::mem::take(&mut state.falloff_dirty) {
                program.set_falloff(state.config.falloff());
            }
        }
        push_pointer(&state.tracker, renderer.surface_program_mut());

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        renderer.render(device, queue, &view, &state.camera, state.load.is_visible());

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler<SceneEvent> for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize GPU: {e:#}");
            event_loop.exit();
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: SceneEvent) {
        match event {
            SceneEvent::AssetsLoaded(scene) => self.scene_arrived(scene),
            SceneEvent::LoadFailed(message) => self.state.load.failed(message),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // The pointer is tracked window-wide, even over the overlay.
        // Releases always end a drag, wherever the button comes up.
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.state.handle_cursor(position.x, position.y);
            }
            WindowEvent::MouseInput {
                button,
                state: ElementState::Released,
                ..
            } => self.state.handle_mouse_button(button, false),
            _ => {}
        }

        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                // Scene unmount.
                self.state.tracker.detach();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.handle_resize(config.width, config.height);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::MouseInput {
                button,
                state: ElementState::Pressed,
                ..
            } => self.state.handle_mouse_button(button, true),
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.state.camera.zoom(amount);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.state.tracker.detach();
        tracing::info!("headspace-desktop shutting down");
    }
}

/// Load assets off the event-loop thread and report back as a user event.
fn spawn_loader(config: SceneConfig, proxy: EventLoopProxy<SceneEvent>) -> Result<()> {
    std::thread::Builder::new()
        .name("scene-loader".into())
        .spawn(move || {
            let event = SceneEvent::from_result(load_scene(&config));
            if proxy.send_event(event).is_err() {
                tracing::debug!("event loop closed before assets arrived");
            }
        })?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.scene_config()?;
    tracing::info!(
        preset = %config.preset,
        head = %config.head_path.display(),
        surface = %config.surface_path.display(),
        "headspace-desktop starting"
    );

    let event_loop = EventLoop::<SceneEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    spawn_loader(config.clone(), event_loop.create_proxy())?;

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("headspace-desktop").chain(args.iter().copied()))
    }

    #[test]
    fn flags_override_defaults() {
        let config = cli(&["--preset", "dramatic", "--seed", "4", "--reveal-delay-ms", "0"])
            .scene_config()
            .unwrap();
        assert_eq!(config.preset, Preset::Dramatic);
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.reveal_delay_ms, 0);
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(Cli::try_parse_from(["headspace-desktop", "--preset", "loud"]).is_err());
    }

    #[test]
    fn cursor_updates_tracker_once_attached() {
        let mut state = AppState::new(SceneConfig::default());
        state.tracker = PointerTracker::new(100, 100);
        state.handle_cursor(0.0, 0.0);
        assert_eq!(state.tracker.position(), Vec2::ZERO);

        state.tracker.attach();
        state.handle_cursor(100.0, 0.0);
        assert_eq!(state.tracker.position(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn orbit_drag_moves_camera() {
        let mut state = AppState::new(SceneConfig::default());
        let eye = state.camera.position();
        state.orbiting = true;
        state.handle_cursor(10.0, 10.0);
        state.handle_cursor(60.0, 10.0);
        assert_ne!(state.camera.position(), eye);
    }

    #[test]
    fn release_ends_drag() {
        let mut state = AppState::new(SceneConfig::default());
        state.handle_mouse_button(MouseButton::Left, true);
        state.handle_mouse_button(MouseButton::Right, true);
        assert!(state.orbiting && state.panning);

        state.handle_mouse_button(MouseButton::Left, false);
        state.handle_mouse_button(MouseButton::Right, false);
        assert!(!state.orbiting && !state.panning);

        let eye = state.camera.position();
        state.handle_cursor(10.0, 10.0);
        state.handle_cursor(60.0, 40.0);
        assert_eq!(state.camera.position(), eye);
    }
}
