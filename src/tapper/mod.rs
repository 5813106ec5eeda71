//! Pelmeni Tapper: tap the pelmeni, buy upgrades, earn while idle.

pub mod actions;
pub mod catalog;
pub mod logic;
pub mod render;
pub mod save;
pub mod scheduler;
pub mod session;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::Color;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

use logic::format_number;
use save::{LocalStorage, SnapshotStore};
use scheduler::{BrowserInterval, IntervalHost};
use session::{Session, TapperEvent};

/// Cap on live floaters.
const MAX_FLOATERS: usize = 20;

/// Largest mini-pelmeni burst from a single tap.
const MAX_BURST: u64 = 14;

/// Cap on live burst particles.
const MAX_PARTICLES: usize = 60;

/// A floating "+N" rising from the pelmeni.
#[derive(Clone, Debug)]
pub struct Floater {
    pub text: String,
    /// Column offset from the centre of the pelmeni display.
    pub col_offset: i16,
    pub life: u32,
    pub max_life: u32,
}

/// A mini pelmeni flying outward from the centre after a tap.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Final offset from the centre, in cells, reached at the end of life.
    pub dx: f32,
    pub dy: f32,
    pub life: u32,
    pub max_life: u32,
}

/// Bigger taps throw more pelmeni: 6 plus one per two gained, at most 14.
pub fn burst_size(gained: u64) -> usize {
    (6 + gained / 2).min(MAX_BURST) as usize
}

/// Cosmetic state. Counts down in animation frames and never touches the
/// economy.
pub struct Effects {
    pub anim_frame: u32,
    /// Pressed-pelmeni art while > 0.
    pub squish: u32,
    pub purchase_flash: u32,
    pub denied_flash: u32,
    /// Passive income arrived.
    pub pulse: u32,
    pub floaters: Vec<Floater>,
    pub particles: Vec<Particle>,
    rng_state: u32,
}

impl Effects {
    fn new() -> Self {
        Self {
            anim_frame: 0,
            squish: 0,
            purchase_flash: 0,
            denied_flash: 0,
            pulse: 0,
            floaters: Vec::new(),
            particles: Vec::new(),
            rng_state: 0x2545_f491,
        }
    }

    fn next_random(&mut self) -> u32 {
        // xorshift32
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f32 {
        (self.next_random() % 1000) as f32 / 1000.0
    }

    fn spawn_burst(&mut self, count: usize) {
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32 + self.next_unit() * 0.4;
            let reach = 6.0 + self.next_unit() * 4.0;
            // Cells are about twice as tall as wide.
            let squash = 0.5 * (0.6 + self.next_unit() * 0.7);
            let life = 6 + self.next_random() % 3;
            self.particles.push(Particle {
                dx: angle.cos() * reach,
                dy: angle.sin() * reach * squash,
                life,
                max_life: life,
            });
        }
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(..excess);
        }
    }

    fn react(&mut self, event: &TapperEvent) {
        match event {
            TapperEvent::Tapped { gained } => {
                self.squish = 3;
                let col_offset = (self.next_random() % 13) as i16 - 6;
                let life = 8 + self.next_random() % 5;
                self.floaters.push(Floater {
                    text: format!("+{}", format_number(*gained)),
                    col_offset,
                    life,
                    max_life: life,
                });
                if self.floaters.len() > MAX_FLOATERS {
                    self.floaters.remove(0);
                }
                self.spawn_burst(burst_size(*gained));
            }
            TapperEvent::Ticked { gained } if *gained > 0 => self.pulse = 4,
            TapperEvent::Ticked { .. } => {}
            TapperEvent::Purchased { .. } => self.purchase_flash = 6,
            TapperEvent::PurchaseRejected { .. } => self.denied_flash = 6,
            TapperEvent::Reset => {
                self.floaters.clear();
                self.particles.clear();
                self.squish = 0;
                self.pulse = 0;
                self.purchase_flash = 0;
                self.denied_flash = 0;
            }
        }
    }

    fn advance(&mut self, frames: u32) {
        self.anim_frame = self.anim_frame.wrapping_add(frames);
        self.squish = self.squish.saturating_sub(frames);
        self.purchase_flash = self.purchase_flash.saturating_sub(frames);
        self.denied_flash = self.denied_flash.saturating_sub(frames);
        self.pulse = self.pulse.saturating_sub(frames);
        for f in &mut self.floaters {
            f.life = f.life.saturating_sub(frames);
        }
        self.floaters.retain(|f| f.life > 0);
        for p in &mut self.particles {
            p.life = p.life.saturating_sub(frames);
        }
        self.particles.retain(|p| p.life > 0);
    }
}

/// What one input asks for, after keys and clicks are unified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Tap,
    Buy(usize),
    Reset,
    ConfirmReset,
    ToggleExport,
    Cancel,
}

impl Command {
    fn from_input(event: &InputEvent) -> Option<Self> {
        match event {
            InputEvent::Key('c') | InputEvent::Key(' ') => Some(Command::Tap),
            InputEvent::Key('r') => Some(Command::Reset),
            InputEvent::Key('e') => Some(Command::ToggleExport),
            InputEvent::Key(c) => match c.to_digit(10) {
                Some(d) if d >= 1 => Some(Command::Buy(d as usize - 1)),
                _ => None,
            },
            InputEvent::Cancel => Some(Command::Cancel),
            InputEvent::Click(id) => match *id {
                actions::TAP => Some(Command::Tap),
                actions::RESET => Some(Command::Reset),
                actions::RESET_CONFIRM => Some(Command::ConfirmReset),
                actions::RESET_CANCEL => Some(Command::Cancel),
                actions::TOGGLE_EXPORT => Some(Command::ToggleExport),
                id if id >= actions::BUY_UPGRADE_BASE && id < actions::RESET => {
                    Some(Command::Buy((id - actions::BUY_UPGRADE_BASE) as usize))
                }
                _ => None,
            },
        }
    }
}

pub struct TapperGame<S: SnapshotStore + 'static = LocalStorage, H: IntervalHost = BrowserInterval> {
    session: Session<S, H>,
    pub effects: Effects,
    pub show_export: bool,
    /// First reset press arms, second one wipes.
    pub reset_armed: bool,
    pub background: Option<Color>,
}

impl<S: SnapshotStore + 'static, H: IntervalHost> TapperGame<S, H> {
    pub fn new(session: Session<S, H>, background: Option<Color>) -> Self {
        Self {
            session,
            effects: Effects::new(),
            show_export: false,
            reset_armed: false,
            background,
        }
    }

    pub fn session(&self) -> &Session<S, H> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<S, H> {
        &mut self.session
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let Some(command) = Command::from_input(event) else {
            return std::mem::take(&mut self.reset_armed);
        };

        if self.reset_armed && !matches!(command, Command::Reset | Command::ConfirmReset) {
            self.reset_armed = false;
            if command == Command::Cancel {
                return true;
            }
        }

        match command {
            Command::Tap => {
                self.session.on_tap();
                true
            }
            Command::Buy(idx) => match self.session.catalog().get(idx) {
                Some(upgrade) => {
                    self.session.on_purchase(upgrade.id);
                    true
                }
                None => false,
            },
            Command::Reset if !self.reset_armed => {
                self.reset_armed = true;
                true
            }
            Command::Reset | Command::ConfirmReset => {
                let confirmed = std::mem::take(&mut self.reset_armed);
                self.session.on_reset(confirmed)
            }
            Command::ToggleExport => {
                self.show_export = !self.show_export;
                true
            }
            Command::Cancel => std::mem::take(&mut self.show_export),
        }
    }

    /// Advance cosmetic effects by `frames` animation frames, first picking
    /// up whatever the session reported since the last call.
    pub fn animate(&mut self, frames: u32) {
        for event in self.session.drain_events() {
            self.effects.react(&event);
        }
        self.effects.advance(frames);
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}
