use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use rand::Rng;
use readingroom_common::{RoomSettings, SessionIdentity, UserId};
use readingroom_input::{
    Action, CaptureError, IntentSink, KeyBindings, MoveDirection, Platform, PointerCapture,
};
use readingroom_presence::MemoryHub;
use readingroom_render::{DebugTextRenderer, Renderer};
use readingroom_room::RoomSession;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

const FRAME: Duration = Duration::from_millis(16);
const TITLE_REFRESH: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "readingroom-desktop", about = "Reading room desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Account shown to other readers (the part before `@`)
    #[arg(long, default_value = "lector@readingroom.local")]
    account: String,

    /// Room settings JSON file
    #[arg(long)]
    settings: Option<std::path::PathBuf>,

    /// Simulated readers walking on a background thread
    #[arg(long, default_value = "2")]
    peers: usize,
}

/// Cursor grab on the window, standing in for browser pointer lock.
#[derive(Default)]
struct WindowCapture {
    window: Option<Arc<Window>>,
}

impl PointerCapture for WindowCapture {
    fn lock(&mut self) -> Result<(), CaptureError> {
        let Some(window) = &self.window else {
            return Err(CaptureError::Unsupported);
        };
        window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
            .map_err(|e| CaptureError::Rejected(e.to_string()))?;
        window.set_cursor_visible(false);
        Ok(())
    }

    fn unlock(&mut self) {
        if let Some(window) = &self.window {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                tracing::debug!("cursor release failed: {e}");
            }
            window.set_cursor_visible(true);
        }
    }
}

struct DesktopApp {
    session: RoomSession,
    keys: KeyBindings,
    capture: WindowCapture,
    last_frame: Instant,
    next_frame: Instant,
    last_title: Instant,
}

impl DesktopApp {
    fn new(session: RoomSession) -> Self {
        let now = Instant::now();
        Self {
            session,
            keys: KeyBindings::default(),
            capture: WindowCapture::default(),
            last_frame: now,
            next_frame: now,
            last_title: now,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let now = Instant::now();
        let action = self.keys.action_for(&format!("{key:?}"), pressed);
        if action != Action::Noop {
            self.session.handle_action(&action, now);
            return;
        }
        if !pressed {
            return;
        }
        match key {
            KeyCode::Escape => self.release_pointer(),
            KeyCode::Enter => self.session.handle_action(&Action::EnterNavigation, now),
            KeyCode::F1 => {
                let frame = DebugTextRenderer::new()
                    .render(self.session.avatars(), &self.session.render_view());
                println!("{}\n{frame}", self.session.summary());
            }
            _ => {}
        }
    }

    /// Escape or focus loss: drop the grab, or abandon one still pending.
    fn release_pointer(&mut self) {
        self.session.release_pointer(&mut self.capture, Instant::now());
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.session.frame(now, dt, &mut self.capture);

        if now.duration_since(self.last_title) >= TITLE_REFRESH {
            self.last_title = now;
            if let Some(window) = &self.capture.window {
                let s = self.session.summary();
                let hint = if self.session.is_navigating() {
                    "Esc to stop"
                } else {
                    "click or Enter to walk"
                };
                window.set_title(&format!(
                    "Reading Room | {} online | ({:.1}, {:.1}) | {hint}",
                    s.users_in_room, s.position.x, s.position.z
                ));
            }
        }
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.capture.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("Reading Room")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        match event_loop.create_window(attrs) {
            Ok(window) => {
                self.capture.window = Some(Arc::new(window));
                tracing::info!("window created");
            }
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(false) => {
                self.release_pointer();
                self.session.intent_handle().clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.handle_key(key, state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                if !self.session.is_navigating() {
                    self.session
                        .handle_action(&Action::EnterNavigation, Instant::now());
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            let look = Action::Look {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            };
            self.session.handle_action(&look, Instant::now());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame {
            self.tick();
            self.next_frame = now + FRAME;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.session.teardown(&mut self.capture);
    }
}

/// Readers that circle the room on their own thread so the local session
/// has someone to see.
fn spawn_peers(
    hub: MemoryHub,
    settings: RoomSettings,
    count: usize,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut capture = Headless;
        let mut rng = rand::thread_rng();
        let mut peers = Vec::new();
        for i in 0..count {
            let identity = SessionIdentity::new(
                UserId::generate(),
                format!("lector{}@readingroom.local", i + 1),
            );
            let mut session = match RoomSession::new(identity, &settings, Platform::desktop()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!("peer setup failed: {e}");
                    return;
                }
            };
            session.connect(Box::new(hub.subscribe(&settings.channel)));
            session.set_navigating(true, Instant::now());
            session.intent_handle().move_start(MoveDirection::Forward);
            let turn: f32 = rng.gen_range(2.0..6.0) * if i % 2 == 0 { 1.0 } else { -1.0 };
            peers.push((session, turn));
        }

        let mut last = Instant::now();
        while !stop.load(Ordering::Relaxed) {
            std::thread::sleep(FRAME);
            let now = Instant::now();
            let dt = (now - last).as_secs_f32();
            last = now;
            for (session, turn) in &mut peers {
                session.handle_action(&Action::Look { dx: *turn, dy: 0.0 }, now);
                session.frame(now, dt, &mut capture);
            }
        }
        for (session, _) in &mut peers {
            session.teardown(&mut capture);
        }
    })
}

struct Headless;

impl PointerCapture for Headless {
    fn lock(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn unlock(&mut self) {}
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("readingroom-desktop starting");

    let settings = match &cli.settings {
        Some(path) => RoomSettings::load(path)?,
        None => RoomSettings::default(),
    };

    let hub = MemoryHub::new();
    let identity = SessionIdentity::new(UserId::generate(), cli.account);
    let mut session = RoomSession::new(identity, &settings, Platform::desktop())?;
    session.connect(Box::new(hub.subscribe(&settings.channel)));

    let stop = Arc::new(AtomicBool::new(false));
    let peers = spawn_peers(hub, settings, cli.peers, stop.clone());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(session);
    let result = event_loop.run_app(&mut app);

    stop.store(true, Ordering::Relaxed);
    if peers.join().is_err() {
        tracing::warn!("peer thread panicked");
    }
    result?;
    Ok(())
}
