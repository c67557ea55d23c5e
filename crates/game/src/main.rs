//! Mjolnir - a decorative scene: the hammer on a sandy plain, orbiting dust and sparks,
//! and lightning-blue lights flickering around it.

mod assets;
mod config;
mod events;
mod render;
mod state;
mod update;

use anyhow::Result;
use assets::AssetLoader;
use config::SceneConfig;
use effects::srgb_hex_to_linear;
use engine_core::Time;
use input::InputState;
use render::SceneMeshes;
use renderer::{OrbitCamera, Renderer};
use state::SceneState;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Everything that lives for the duration of the window.
pub struct GameState {
    config: SceneConfig,
    time: Time,
    input: InputState,

    renderer: Renderer,
    camera: OrbitCamera,

    scene: SceneState,
    meshes: SceneMeshes,
    /// Present until the centerpiece load has finished (either way).
    loader: Option<AssetLoader>,

    running: bool,
}

impl GameState {
    async fn new(window: Arc<Window>, config: SceneConfig) -> Result<Self> {
        let mut renderer = Renderer::new(window, config.vsync).await?;
        renderer.set_clear_color(srgb_hex_to_linear(config.lighting.background));

        let (width, height) = renderer.dimensions();
        let mut camera = config.camera.build(config.pivot());
        camera.set_aspect(width, height);

        let seed = config.seed.unwrap_or_else(rand::random);
        let scene = SceneState::new(&config, seed);
        let meshes = SceneMeshes::new(&renderer, &scene);
        let loader = Some(AssetLoader::spawn(&config.asset_path));

        Ok(Self {
            config,
            time: Time::new(),
            input: InputState::new(),
            renderer,
            camera,
            scene,
            meshes,
            loader,
            running: true,
        })
    }

    fn update(&mut self) {
        update::frame(self)
    }

    fn render(&mut self) -> Result<()> {
        render::run(self)
    }
}

/// Application handler for winit.
struct App {
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = SceneConfig::load();
            let window_attrs = Window::default_attributes()
                .with_title("Mjolnir")
                .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let state = pollster::block_on(GameState::new(window.clone(), config));
            match state {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize scene: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Mjolnir");
    println!("  Left drag - orbit camera   Scroll - zoom");
    println!("  Space     - pause effects  R      - reseed particles and lights");
    println!("  Escape    - quit");

    let event_loop = EventLoop::new()?;
    // Continuous redraw: the effects animate every frame.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
