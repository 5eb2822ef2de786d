//! Terminal host: event loop, stepping through a scenario, mouse forwarding

use crate::config::{SceneConfig, TerminalConfig};
use crate::render::terminal::TerminalSurface;
use crate::render::{Point, Size};
use crate::scene::{MachineScene, MouseEventKind, RedrawOutcome};
use crate::ui::demo::Step;
use crate::ui::status::{render_status_bar, StatusLine};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind as TerminalMouseKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Edge-triggered "the process changed" flag
///
/// Clones share the flag, so a clone may be handed to whatever observes the
/// debuggee; the event loop repaints once per raise, however many raises
/// arrived in between.
#[derive(Debug, Clone, Default)]
pub struct RedrawSignal(Arc<AtomicBool>);

impl RedrawSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether the flag was raised, lowering it
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Turns presses into double clicks
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: Duration,
    last: Option<(Instant, u16, u16)>,
}

impl ClickTracker {
    pub fn new(window: Duration) -> Self {
        ClickTracker { window, last: None }
    }

    /// Record a press; returns `true` when it completes a double click
    pub fn press(&mut self, column: u16, row: u16, now: Instant) -> bool {
        let is_double = self.last.is_some_and(|(at, c, r)| {
            c == column && r == row && now.saturating_duration_since(at) <= self.window
        });
        self.last = if is_double { None } else { Some((now, column, row)) };
        is_double
    }
}

/// The main application state
pub struct App {
    scene: MachineScene,
    steps: Vec<Step>,
    position: usize,
    config: TerminalConfig,
    signal: RedrawSignal,
    clicks: ClickTracker,
    /// Cells occupied by the diagram in the last frame
    diagram_area: Rect,
    last_outcome: Option<RedrawOutcome>,
    status_message: String,
    should_quit: bool,
    is_playing: bool,
    last_play_time: Instant,
}

impl App {
    /// Create an app stepping through `steps`, which must not be empty
    pub fn new(steps: Vec<Step>, scene_config: SceneConfig, config: TerminalConfig) -> Self {
        assert!(!steps.is_empty(), "A scenario needs at least one step");
        let status_message = steps[0].description.clone();
        App {
            scene: MachineScene::new(scene_config),
            steps,
            position: 0,
            config,
            signal: RedrawSignal::new(),
            clicks: ClickTracker::new(config.double_click),
            diagram_area: Rect::default(),
            last_outcome: None,
            status_message,
            should_quit: false,
            is_playing: false,
            last_play_time: Instant::now(),
        }
    }

    /// Handle for notifying the app that the process changed
    pub fn signal(&self) -> RedrawSignal {
        self.signal.clone()
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        self.signal.raise();
        loop {
            // Consume both flags; either one asks for a repaint
            let process_changed = self.signal.take();
            let scene_changed = self.scene.take_redraw_request();
            if process_changed || scene_changed {
                terminal.draw(|f| self.render(f))?;
            }

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_secs(1) {
                if !self.step_to(self.position + 1) {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key_event(key),
                    Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                    Event::Resize(..) => self.signal.raise(),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());
        self.diagram_area = chunks[0];

        let cell_width = self.config.cell_width;
        let cell_height = self.config.cell_height;
        self.scene.set_viewport(Size::new(
            self.diagram_area.width as i32 * cell_width,
            self.diagram_area.height as i32 * cell_height,
        ));
        let process = &self.steps[self.position].process;
        let mut surface = TerminalSurface::new(frame.buffer_mut(), self.diagram_area, cell_width, cell_height);
        let outcome = self.scene.redraw(process, &mut surface);
        self.last_outcome = Some(outcome);

        let status = StatusLine {
            message: &self.status_message,
            current_step: self.position,
            total_steps: self.steps.len(),
            outcome: self.last_outcome.as_ref(),
            cursor: self.scene.cursor(),
            is_playing: self.is_playing,
        };
        render_status_bar(frame, chunks[1], &status);
    }

    /// Returns `false` when `position` is past the last step
    fn step_to(&mut self, position: usize) -> bool {
        let Some(step) = self.steps.get(position) else {
            return false;
        };
        self.position = position;
        self.status_message = step.description.clone();
        debug!(position, description = %step.description, "stepped");
        self.signal.raise();
        true
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Right => {
                self.is_playing = false;
                if !self.step_to(self.position + 1) {
                    self.status_message = "Already at the last step".to_string();
                    self.signal.raise();
                }
            }
            KeyCode::Left => {
                self.is_playing = false;
                if self.position == 0 || !self.step_to(self.position - 1) {
                    self.status_message = "Already at the first step".to_string();
                    self.signal.raise();
                }
            }
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing;
                self.last_play_time = Instant::now();
                self.status_message = if self.is_playing { "Playing..." } else { "Paused" }.to_string();
                self.signal.raise();
            }
            KeyCode::Backspace | KeyCode::Home => {
                self.is_playing = false;
                self.step_to(0);
            }
            KeyCode::Char('r') => {
                info!("manual refresh");
                self.signal.raise();
            }
            _ => {}
        }
    }

    /// Centre of the cell under the pointer, in diagram pixels
    fn pixel_of(&self, column: u16, row: u16) -> Point {
        let col = column.saturating_sub(self.diagram_area.x) as i32;
        let row = row.saturating_sub(self.diagram_area.y) as i32;
        Point::new(
            col * self.config.cell_width + self.config.cell_width / 2,
            row * self.config.cell_height + self.config.cell_height / 2,
        )
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        let kind = match mouse.kind {
            TerminalMouseKind::Moved | TerminalMouseKind::Drag(_) => MouseEventKind::Moved,
            TerminalMouseKind::Down(MouseButton::Left) => {
                if self.clicks.press(mouse.column, mouse.row, Instant::now()) {
                    MouseEventKind::DoubleClicked
                } else {
                    return;
                }
            }
            TerminalMouseKind::Up(MouseButton::Left) => MouseEventKind::Released,
            _ => return,
        };
        let previous_cursor = self.scene.cursor();
        self.scene.handle_mouse(kind, self.pixel_of(mouse.column, mouse.row));
        if self.scene.cursor() != previous_cursor {
            // Only the status bar changes
            self.signal.raise();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_is_edge_triggered() {
        let signal = RedrawSignal::new();
        let remote = signal.clone();
        assert!(!signal.take());
        remote.raise();
        remote.raise();
        assert!(signal.take());
        assert!(!signal.take());
    }

    #[test]
    fn test_double_click_needs_same_cell_within_window() {
        let mut clicks = ClickTracker::new(Duration::from_millis(400));
        let t0 = Instant::now();
        assert!(!clicks.press(3, 4, t0));
        assert!(clicks.press(3, 4, t0 + Duration::from_millis(150)));
        // A third press starts over
        assert!(!clicks.press(3, 4, t0 + Duration::from_millis(200)));

        assert!(!clicks.press(5, 4, t0 + Duration::from_millis(250)));
        assert!(!clicks.press(6, 4, t0 + Duration::from_millis(300)));
        assert!(!clicks.press(6, 4, t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_pixel_of_cell_centre() {
        let steps = crate::ui::demo::scenario("idle").unwrap();
        let mut app = App::new(steps, SceneConfig::default(), TerminalConfig::default());
        app.diagram_area = Rect::new(0, 0, 80, 20);
        assert_eq!(app.pixel_of(0, 0), Point::new(4, 8));
        assert_eq!(app.pixel_of(10, 2), Point::new(84, 40));
    }

    #[test]
    fn test_stepping_raises_signal() {
        let steps = crate::ui::demo::scenario("linked-list").unwrap();
        let mut app = App::new(steps, SceneConfig::default(), TerminalConfig::default());
        let signal = app.signal();
        assert!(app.step_to(1));
        assert!(signal.take());
        assert_eq!(app.status_message, "list = new LinkedList()");
        assert!(!app.step_to(1000));
        assert!(!signal.take());
    }
}
