/// Terminal mesh viewer: frame loop, ASCII rasterizer and control panel
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self},
};
use meshctl_core::{Camera, Renderable, SceneData, ViewOrbit};
use std::io::{self, stdout, Write};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

pub mod app;
pub mod config;
pub mod error;
pub mod renderer;
pub mod ui;

pub use app::MeshControlApp;
pub use error::AppError;
pub use renderer::AsciiRenderer;
pub use ui::{MenuPanel, PanelLine, Ui};

/// Nominal terminal cell size used to turn a pixel window size into cells.
const CELL_WIDTH_PX: u32 = 8;
const CELL_HEIGHT_PX: u32 = 16;

/// Rows above the control panel (title bar and a gap).
const PANEL_TOP: u16 = 2;

/// Radians per orbit key press.
const ORBIT_STEP: f64 = 0.1;

/// Viewer window settings
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Requested size in pixels, width then height
    pub window_size: (u32, u32),
    pub background: Color,
    /// Redraw continuously instead of only after input
    pub is_animating: bool,
    pub max_fps: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_size: (1600, 1400),
            background: Color::White,
            is_animating: true,
            max_fps: 30.0,
        }
    }
}

impl ViewerConfig {
    /// Window size in terminal cells.
    pub fn cells(&self) -> (u16, u16) {
        let (width, height) = self.window_size;
        let to_cells = |px: u32, cell: u32| u16::try_from((px / cell).max(1)).unwrap_or(u16::MAX);
        (to_cells(width, CELL_WIDTH_PX), to_cells(height, CELL_HEIGHT_PX))
    }

    fn frame_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.max_fps.max(1.0))
    }
}

/// Drives a [`Renderable`] + [`MenuPanel`] application in the terminal.
pub struct Viewer {
    config: ViewerConfig,
    camera: Camera,
    orbit: ViewOrbit,
    renderer: AsciiRenderer,
    scene: SceneData,
    ui: Ui,
    camera_aligned: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f64,
}

impl Viewer {
    /// Does not touch the terminal until [`Viewer::launch`].
    pub fn new(config: ViewerConfig) -> Self {
        let (width, height) = config.cells();
        let mut viewer = Self {
            config,
            camera: Camera::default(),
            orbit: ViewOrbit::default(),
            renderer: AsciiRenderer::new(0, 0),
            scene: SceneData::new(),
            ui: Ui::new(),
            camera_aligned: false,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        viewer.resize(width, height);
        viewer
    }

    /// Run the frame loop until the user quits. The terminal is restored
    /// even when entering the alternate screen or the loop fails.
    pub fn launch<A>(&mut self, app: &mut A) -> io::Result<()>
    where
        A: Renderable + MenuPanel,
    {
        let (cols, rows) = self.config.cells();
        if let Err(err) = execute!(stdout(), terminal::SetSize(cols, rows)) {
            tracing::debug!(%err, "terminal refused resize");
        }
        let (width, height) = terminal::size()?;
        self.resize(width, height);

        terminal::enable_raw_mode()?;
        let result = run_then(
            || {
                execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
                tracing::info!(width, height, "viewer started");
                self.running = true;
                self.main_loop(app)
            },
            restore_terminal,
        );
        tracing::info!("viewer closed");

        result
    }

    fn main_loop<A>(&mut self, app: &mut A) -> io::Result<()>
    where
        A: Renderable + MenuPanel,
    {
        let target_frame_time = self.config.frame_time();
        let mut events = TerminalEvents;

        while self.running {
            let frame_start = Instant::now();

            self.pump_events(&mut events)?;
            if !self.running {
                break;
            }

            self.frame(app)?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if self.config.is_animating && elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = f64::from(self.frame_count) / (now - self.last_frame).as_secs_f64();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    /// Handle pending input. Without animation this first waits for an
    /// event, so the view only refreshes after the user does something.
    fn pump_events<S: EventSource>(&mut self, events: &mut S) -> io::Result<()> {
        if !self.config.is_animating {
            let event = events.read()?;
            self.handle_event(event);
        }
        while self.running && events.poll()? {
            let event = events.read()?;
            self.handle_event(event);
        }
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.renderer.resize(usize::from(width), usize::from(height));
        // Terminal cells are roughly twice as tall as they are wide
        self.camera.aspect = f64::from(width) / (f64::from(height.max(1)) * 2.0);
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Focus moves, activations and typed numbers belong to the panel
        if self.ui.queue_key(key) {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => {
                self.orbit.rotate(ORBIT_STEP, 0.0, 0.0);
            }
            KeyCode::Char('s') | KeyCode::Down => {
                self.orbit.rotate(-ORBIT_STEP, 0.0, 0.0);
            }
            KeyCode::Char('a') | KeyCode::Left => {
                self.orbit.rotate(0.0, -ORBIT_STEP, 0.0);
            }
            KeyCode::Char('d') | KeyCode::Right => {
                self.orbit.rotate(0.0, ORBIT_STEP, 0.0);
            }
            KeyCode::Char('e') => {
                self.orbit.rotate(0.0, 0.0, ORBIT_STEP);
            }
            KeyCode::Char('r') => {
                self.orbit.rotate(0.0, 0.0, -ORBIT_STEP);
            }
            _ => {}
        }
    }

    /// One refresh: scene callback, rasterization, panel callback, output.
    fn frame<A>(&mut self, app: &mut A) -> io::Result<()>
    where
        A: Renderable + MenuPanel,
    {
        let draw = app.pre_draw(&mut self.scene);

        if !self.camera_aligned {
            if let Some((min, max)) = self.scene.mesh_bounds() {
                self.camera.frame_bounds(&min, &max);
                self.camera_aligned = true;
            }
        }

        self.renderer.clear();
        if let ControlFlow::Continue(()) = draw {
            let model = self.orbit.model_matrix(&self.camera.target);
            self.renderer.render_scene(&self.scene, &model, &self.camera);
        }

        self.ui.begin_frame();
        app.draw_menu(&mut self.ui);
        let panel = self.ui.end_frame();

        // Output to terminal
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout, self.config.background)?;
        self.draw_title(&mut stdout)?;
        self.draw_panel(&mut stdout, &panel)?;
        stdout.flush()
    }

    fn draw_title<W: Write>(&self, out: &mut W) -> io::Result<()> {
        queue!(
            out,
            cursor::MoveTo(0, 0),
            SetBackgroundColor(self.config.background),
            SetForegroundColor(Color::DarkBlue),
            Print(format!(
                "meshctl | FPS: {:.1} | Tab=Focus Enter=Apply WASD/Arrows=Orbit E/R=Roll Q=Quit",
                self.fps
            )),
            ResetColor
        )
    }

    fn draw_panel<W: Write>(&self, out: &mut W, panel: &[PanelLine]) -> io::Result<()> {
        let width = panel.iter().map(PanelLine::width).max().unwrap_or(0) + 2;

        for (row, line) in panel.iter().enumerate() {
            let y = PANEL_TOP + u16::try_from(row).unwrap_or(u16::MAX - PANEL_TOP);
            queue!(
                out,
                cursor::MoveTo(0, y),
                SetBackgroundColor(Color::Grey),
                SetForegroundColor(Color::Black),
                Print(' ')
            )?;
            for span in &line.spans {
                if span.focused {
                    queue!(out, SetAttribute(Attribute::Reverse), Print(&span.text), SetAttribute(Attribute::NoReverse))?;
                } else {
                    queue!(out, Print(&span.text))?;
                }
            }
            let pad = width.saturating_sub(line.width() + 1);
            queue!(out, Print(" ".repeat(pad)))?;
        }

        queue!(out, ResetColor)
    }
}

/// Source of terminal events for the frame loop.
trait EventSource {
    /// Whether an event is ready, without waiting.
    fn poll(&mut self) -> io::Result<bool>;
    /// Next event, waiting for one if needed.
    fn read(&mut self) -> io::Result<Event>;
}

struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll(&mut self) -> io::Result<bool> {
        event::poll(Duration::ZERO)
    }

    fn read(&mut self) -> io::Result<Event> {
        event::read()
    }
}

/// Run `body`, then `cleanup` whatever the outcome. The body's error wins.
fn run_then<T>(
    body: impl FnOnce() -> io::Result<T>,
    cleanup: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    let result = body();
    let cleaned = cleanup();
    let value = result?;
    cleaned?;
    Ok(value)
}

/// Leave raw mode and the alternate screen. Both are attempted.
fn restore_terminal() -> io::Result<()> {
    let raw = terminal::disable_raw_mode();
    execute!(stdout(), ResetColor, terminal::LeaveAlternateScreen, cursor::Show)?;
    raw
}
