use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::DVec2;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use touch_bridge::build_info;
use touch_bridge::camera::{Camera2D, CameraAdapter};
use touch_bridge::config::{BridgeConfig, LoggingConfig};
use touch_bridge::health;
use touch_bridge::input::{EventMap, InputCollector, TouchRegistry, TracingSink};
use touch_bridge::replay::{self, Trace};

#[derive(Parser)]
#[command(name = "touch-bridge", version, about = "Touch to pointer translation and camera gestures")]
struct Cli {
    /// Configuration profile; defaults to TOUCH_BRIDGE_PROFILE or "release"
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run health checks and exit with the report's code
    Check,
    /// Replay a recorded touch trace and print what the host would receive
    Replay {
        trace: PathBuf,
    },
    /// Open a window and translate its touch input live
    Window,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.profile {
        Some(profile) => BridgeConfig::load(profile),
        None => BridgeConfig::load_from_env(),
    }
    .context("Failed to load configuration")?;
    init_tracing(&config.logging);
    info!(profile = %config.profile, version = %build_info::version_string(), "Starting");

    match cli.command {
        Command::Check => {
            let report = health::run_all_checks();
            health::print_report(&report);
            std::process::exit(report.exit_code());
        }
        Command::Replay { trace } => run_replay(&trace, &config),
        Command::Window => run_window(config),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(logging.effective_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_replay(path: &Path, config: &BridgeConfig) -> Result<()> {
    let trace = Trace::load(path).with_context(|| format!("Failed to load trace {}", path.display()))?;
    let outcome = replay::replay(&trace, config)?;

    for event in &outcome.events {
        println!(
            "{:<14} id={:<4} button={:<2} buttons={:<2} at ({:.1}, {:.1})",
            event.kind.name(),
            event.pointer_id,
            event.button_id(),
            event.buttons.bits(),
            event.position.x,
            event.position.y
        );
    }
    for hold in &outcome.holds {
        println!(
            "hold           id={:<4} held {:?} at ({:.1}, {:.1})",
            hold.id, hold.held_for, hold.position.x, hold.position.y
        );
    }
    println!(
        "camera: center ({:.2}, {:.2}) zoom {:.2}; {} of {} samples consumed, {} touches still down",
        outcome.camera.center.x,
        outcome.camera.center.y,
        outcome.camera.current_zoom(),
        outcome.consumed,
        trace.events.len(),
        outcome.active_touches
    );
    Ok(())
}

fn run_window(config: BridgeConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = LiveBridge::new(config);
    event_loop.run_app(&mut app).context("Event loop failed")?;
    Ok(())
}

/// Window whose touches drive a registry over the reference camera
struct LiveBridge {
    window: Option<Window>,
    size: LogicalSize<f64>,
    collector: InputCollector,
    registry: TouchRegistry<Camera2D, BridgeConfig, TracingSink>,
}

impl LiveBridge {
    fn new(config: BridgeConfig) -> Self {
        let size = LogicalSize::new(config.camera.width, config.camera.height);
        let camera = config.camera.build();
        let map = EventMap::preset(config.dispatch.event_map);
        let mut registry = TouchRegistry::canvas(camera, config, TracingSink::new()).with_event_map(map);
        registry.on_hold(|hold| info!(id = %hold.id, held_for = ?hold.held_for, "Touch held"));

        Self {
            window: None,
            size,
            collector: InputCollector::new(),
            registry,
        }
    }
}

impl ApplicationHandler for LiveBridge {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title("touch-bridge")
            .with_inner_size(self.size);
        match event_loop.create_window(attributes) {
            Ok(window) => {
                self.collector.set_scale_factor(window.scale_factor());
                self.window = Some(window);
            }
            Err(e) => {
                error!(error = %e, "Failed to create window");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(dispatched = self.registry.sink().dispatched(), "Close requested, exiting");
                event_loop.exit();
                return;
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.collector.set_scale_factor(*scale_factor);
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = &self.window {
                    let logical = size.to_logical::<f64>(window.scale_factor());
                    self.registry.camera_mut().viewport = DVec2::new(logical.width, logical.height);
                }
            }
            WindowEvent::Focused(false) => {
                if self.registry.active_count() > 0 {
                    warn!("Focus lost with touches down");
                    self.registry.cancel_all();
                }
            }
            _ => {}
        }

        if let Some(envelope) = self.collector.handle_window_event(&event, Instant::now()) {
            self.registry.handle(&envelope);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.registry.poll_timers(Instant::now());
        let flow = match self.registry.next_deadline() {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        };
        event_loop.set_control_flow(flow);
    }
}
