//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize, frame tick, pet timers)
//! - The pet controller, driven cooperatively on this task
//! - DisplayState, fed by an observer, for rendering
//!
//! # Event Loop
//!
//! One `select!` waits on whichever comes first: a terminal event, the
//! pet's next timer deadline, or the 100ms frame tick. After any of them the
//! display is updated and redrawn. Nothing blocks and nothing sleeps on a
//! fixed delay.

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::Terminal;
use tokio::time::{Instant, MissedTickBehavior};

use sekitoritchi_core::{MoodCode, PetController, PetSnapshot, Rejection};

use crate::avatar::Avatar;
use crate::compositor::{Compositor, LayerId};
use crate::display::{self, DisplayState, ToastKind};
use crate::renderer::FRAME_DURATION;
use crate::theme::{mood_color, ACCENT, DIM_GRAY, ERROR_RED, HEALTH_FILL, SUCCESS_GREEN};

/// Longest name the prompt accepts
const MAX_NAME_LEN: usize = 24;

/// Width of the health bar in cells
const HEALTH_BAR_WIDTH: usize = 10;

const HELP: &str =
    " f feed  d dance  s sleep  r random  c clean  n name  w save  l load  X reset  q quit";

/// Main application state
pub struct App {
    /// Is the app still running?
    running: bool,
    /// The pet
    pet: PetController,
    /// Display state fed by the pet's observer
    display: Rc<RefCell<DisplayState>>,

    /// The layered compositor
    compositor: Compositor,
    /// The wrestler and his scene
    avatar: Avatar,
    /// Layer assignments
    layers: AppLayers,

    /// Last frame time (for animations)
    last_frame: Instant,
    /// Terminal size
    size: (u16, u16),
}

/// Layer IDs for UI regions
struct AppLayers {
    status: LayerId,
    scene: LayerId,
    message: LayerId,
    help: LayerId,
}

/// Screen regions for a terminal size: status, scene, message, help
fn layout(width: u16, height: u16) -> [Rect; 4] {
    let scene_height = height.saturating_sub(2);
    [
        Rect::new(0, 0, width, 1.min(height)),
        Rect::new(0, 1.min(height), width, scene_height),
        Rect::new(0, height.saturating_sub(2), width, 1.min(height)),
        Rect::new(0, height.saturating_sub(1), width, 1.min(height)),
    ]
}

impl App {
    /// Create an App for a terminal of `size` (columns, rows)
    pub fn new(pet: PetController, size: (u16, u16)) -> Self {
        let (width, height) = size;
        let area = Rect::new(0, 0, width, height);
        let [status, scene, message, help] = layout(width, height);

        let mut compositor = Compositor::new(area);
        let layers = AppLayers {
            scene: compositor.create_layer(scene, 0),
            status: compositor.create_layer(status, 10),
            help: compositor.create_layer(help, 10),
            message: compositor.create_layer(message, 20),
        };

        let display = Rc::new(RefCell::new(DisplayState::new(pet.snapshot())));
        pet.subscribe(display::observer(&display));

        Self {
            running: true,
            pet,
            display,
            compositor,
            avatar: Avatar::new(scene.width, scene.height),
            layers,
            last_frame: Instant::now(),
            size,
        }
    }

    /// Main event loop; returns after a quit key (the pet is stopped and saved)
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut frame_tick = tokio::time::interval(FRAME_DURATION);
        frame_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.pet.start();
        self.update();
        self.render(terminal)?;

        while self.running {
            let deadline = self.pet.next_deadline();

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    // Only handle Press events (not Release or Repeat)
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Some(Ok(Event::Resize(w, h))) => self.handle_resize(w, h),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                    None => self.running = false,
                },

                // Pet timers
                () = sleep_until(deadline) => {
                    let fired = self.pet.poll_timers();
                    tracing::trace!(fired, "Pet timers polled");
                }

                // Frame tick
                _ = frame_tick.tick() => {}
            }

            self.update();
            self.render(terminal)?;
        }

        self.pet.stop();
        Ok(())
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }

        if self.display.borrow().is_naming() {
            self.handle_prompt_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('f') => {
                let result = self.pet.feed();
                self.report(result, "Itadakimasu!");
            }
            KeyCode::Char('d') => {
                let result = self.pet.dance();
                self.report(result, "Shiko stomp!");
            }
            KeyCode::Char('s') => {
                let result = self.pet.sleep();
                self.report(result, "Zzz...");
            }
            KeyCode::Char('r') => match self.pet.random_event() {
                Ok(outcome) => {
                    let text = format!("{} ({:+})", outcome.action, outcome.health_delta);
                    self.toast(text, ToastKind::Info);
                }
                Err(rejection) => self.reject(rejection),
            },
            KeyCode::Char('c') => {
                if self.pet.clean_poop() {
                    self.toast("All clean", ToastKind::Info);
                } else {
                    self.toast("Nothing to clean", ToastKind::Rejected);
                }
            }
            KeyCode::Char('n') => {
                self.display.borrow_mut().prompt = Some(String::new());
            }
            KeyCode::Char('w') => {
                if self.pet.save_game() {
                    self.toast("Saved", ToastKind::Info);
                } else {
                    self.toast("Save failed", ToastKind::Rejected);
                }
            }
            KeyCode::Char('l') => {
                self.pet.load_game();
                self.toast("Loaded", ToastKind::Info);
            }
            KeyCode::Char('X') => {
                self.pet.reset_game();
                self.toast("A new wrestler joins the stable", ToastKind::Info);
            }
            _ => {}
        }
    }

    /// Keys while the rename prompt is open
    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.display.borrow_mut().prompt = None;
            }
            KeyCode::Enter => {
                // Release the display before the pet publishes into it
                let name = self.display.borrow_mut().prompt.take().unwrap_or_default();
                match self.pet.set_name(&name) {
                    Ok(()) => self.toast(format!("Hello, {}", name.trim()), ToastKind::Info),
                    Err(rejection) => self.reject(rejection),
                }
            }
            KeyCode::Backspace => {
                if let Some(prompt) = self.display.borrow_mut().prompt.as_mut() {
                    prompt.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(prompt) = self.display.borrow_mut().prompt.as_mut() {
                    if prompt.chars().count() < MAX_NAME_LEN {
                        prompt.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn report(&self, result: Result<(), Rejection>, success: &str) {
        match result {
            Ok(()) => self.toast(success, ToastKind::Info),
            Err(rejection) => self.reject(rejection),
        }
    }

    fn reject(&self, rejection: Rejection) {
        tracing::debug!(%rejection, "Action rejected");
        self.toast(rejection.to_string(), ToastKind::Rejected);
    }

    fn toast(&self, text: impl Into<String>, kind: ToastKind) {
        self.display.borrow_mut().show_toast(text, kind);
    }

    /// Handle terminal resize
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.compositor.resize(Rect::new(0, 0, width, height));

        let [status, scene, message, help] = layout(width, height);
        self.compositor.place_layer(self.layers.status, status);
        self.compositor.place_layer(self.layers.scene, scene);
        self.compositor.place_layer(self.layers.message, message);
        self.compositor.place_layer(self.layers.help, help);
        self.avatar.resize(scene.width, scene.height);
    }

    /// Update animations and display state
    fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;

        let snapshot = {
            let mut display = self.display.borrow_mut();
            display.update(delta);
            display.dirty = false;
            display.snapshot.clone()
        };

        self.avatar.show(&snapshot);
        self.avatar.update(delta);
    }

    /// Whether the loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The pet this app drives
    pub fn pet(&self) -> &PetController {
        &self.pet
    }

    /// Message printed after the terminal is restored
    pub fn goodbye(&self) -> String {
        let snap = self.pet.snapshot();
        if snap.is_alive {
            format!("{} will be waiting for you. Game saved.", snap.name)
        } else {
            format!("Rest well, {}.", snap.name)
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the UI
    pub fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        self.update_layers();

        terminal.draw(|frame| {
            let output = self.compositor.composite();
            let area = frame.area();
            let buf = frame.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    buf[(x, y)] = output[(x, y)].clone();
                }
            }
        })?;

        Ok(())
    }

    /// Redraw every layer from the display state
    fn update_layers(&mut self) {
        let display = self.display.borrow();

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.status) {
            buf.reset();
            render_status(buf, &display.snapshot);
        }

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.scene) {
            buf.reset();
            self.avatar.render(buf);
        }

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.message) {
            buf.reset();
            let area = buf.area;
            let bg = Style::default().bg(Color::Black);
            if let Some(prompt) = &display.prompt {
                let text = format!(" Name: {prompt}_ ");
                buf.set_stringn(area.x + 1, area.y, text, area.width as usize, bg.fg(ACCENT));
            } else if let Some(toast) = &display.toast {
                let color = match toast.kind {
                    ToastKind::Info => SUCCESS_GREEN,
                    ToastKind::Rejected => ERROR_RED,
                };
                let text = format!(" {} ", toast.text);
                buf.set_stringn(area.x + 1, area.y, text, area.width as usize, bg.fg(color));
            }
        }

        if let Some(buf) = self.compositor.layer_buffer_mut(self.layers.help) {
            buf.reset();
            let area = buf.area;
            buf.set_stringn(
                area.x,
                area.y,
                HELP,
                area.width as usize,
                Style::default().fg(DIM_GRAY),
            );
        }
    }
}

/// Status bar: name, age, weight, health bar, mood, poop
fn render_status(buf: &mut Buffer, snap: &PetSnapshot) {
    let area = buf.area;
    let limit = area.x + area.width;
    let mut x = area.x;

    let mut put = |text: &str, style: Style| {
        if x < limit {
            let (end, _) = buf.set_stringn(x, area.y, text, usize::from(limit - x), style);
            x = end;
        }
    };

    let plain = Style::default();
    put(&format!(" {} ", snap.name), plain.fg(ACCENT));
    put(&format!(" age {} ", snap.age), plain);
    put(&format!(" wt {} ", snap.weight), plain);

    let filled = usize::try_from(snap.health.clamp(0, 100)).unwrap_or(0) * HEALTH_BAR_WIDTH / 100;
    put(" ", plain);
    put(&"█".repeat(filled), plain.fg(HEALTH_FILL));
    put(&"░".repeat(HEALTH_BAR_WIDTH - filled), plain.fg(DIM_GRAY));
    put(&format!(" {:>3} ", snap.health), plain);

    let mood = if snap.mood == MoodCode::Dead {
        "resting".to_string()
    } else {
        snap.mood.label().to_string()
    };
    put(&format!(" {mood} "), plain.fg(mood_color(snap.mood)));
    put(&format!(" poop {:>3} ", snap.poop_level), plain);
    if snap.poop_visible {
        put(" (needs cleaning) ", plain.fg(ERROR_RED));
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use sekitoritchi_core::{Action, MemoryStore, PetConfig};

    fn app() -> App {
        let pet = PetController::new(PetConfig::default().with_seed(3), MemoryStore::new());
        App::new(pet, (90, 20))
    }

    fn press(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buf = terminal.backend().buffer();
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_feed_key_animates_and_rejects_second() {
        let mut app = app();
        press(&mut app, 'f');
        assert_eq!(app.pet().snapshot().action, Action::Eat);

        press(&mut app, 'f');
        let display = app.display.borrow();
        let toast = display.toast.as_ref().unwrap();
        assert_eq!(toast.kind, ToastKind::Rejected);
        assert_eq!(toast.text, Rejection::Animating.to_string());
    }

    #[test]
    fn test_observer_keeps_display_in_sync() {
        let mut app = app();
        press(&mut app, 'd');
        let display = app.display.borrow();
        assert!(display.dirty);
        assert_eq!(display.snapshot, app.pet().snapshot());
    }

    #[test]
    fn test_rename_prompt() {
        let mut app = app();
        press(&mut app, 'n');
        for c in "Taro".chars() {
            press(&mut app, c);
        }
        // Keys go to the prompt, not the pet
        assert!(!app.pet().is_animating());
        app.handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        press(&mut app, 'u');
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        assert_eq!(app.pet().snapshot().name, "Taru");
        assert!(!app.display.borrow().is_naming());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut app = app();
        press(&mut app, 'n');
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(app.pet().snapshot().name, "Sekitoritchi");
        let display = app.display.borrow();
        assert_eq!(
            display.toast.as_ref().map(|t| t.text.clone()),
            Some(Rejection::EmptyName.to_string())
        );
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        press(&mut app, 'q');
        assert!(!app.is_running());

        let mut app = self::app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.is_running());
    }

    #[test]
    fn test_render_shows_status_and_help() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
        app.update();
        app.render(&mut terminal).unwrap();

        assert!(row(&terminal, 0).contains("Sekitoritchi"));
        assert!(row(&terminal, 0).contains("happy"));
        assert!(row(&terminal, 19).contains("f feed"));
    }

    #[test]
    fn test_render_after_resize() {
        let mut app = app();
        app.handle_resize(40, 12);
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        app.update();
        app.render(&mut terminal).unwrap();
        assert!(row(&terminal, 11).starts_with(" f feed"));
    }
}
