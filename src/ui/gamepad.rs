/// Gamepad input via gilrs.
///
/// Slides come from the D-pad and the left stick, one move per push.
/// The three menu actions are bound to buttons from `[gamepad]` in
/// config.toml; defaults are Start/A confirm, Select cancel, Y restart.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::direction::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Face and shoulder buttons that can carry an action.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

/// Config spellings, matched case-insensitively.
const BUTTON_NAMES: &[(&str, Btn)] = &[
    ("a", Btn::A), ("south", Btn::A),
    ("b", Btn::B), ("east", Btn::B),
    ("x", Btn::X), ("west", Btn::X),
    ("y", Btn::Y), ("north", Btn::Y),
    ("l1", Btn::L1), ("lb", Btn::L1),
    ("r1", Btn::R1), ("rb", Btn::R1),
    ("start", Btn::Start),
    ("select", Btn::Select), ("back", Btn::Select),
];

impl Btn {
    fn parse(name: &str) -> Option<Btn> {
        BUTTON_NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|&(_, b)| b)
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// What a bound button asks the shell to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PadAction {
    Confirm,
    Cancel,
    Restart,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// One bit per `Btn` pressed since the last `update()`.
    pressed: u8,
    /// Slides pushed since the last `update()`, oldest first.
    pushes: Vec<Direction>,

    /// Current stick position and the lean it last reported.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick: (f32, f32),
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    lean: Option<Direction>,

    /// Buttons per action, indexed by `PadAction as usize`.
    bindings: [Vec<Btn>; 3],

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs = Gilrs::new()
            .map_err(|e| tracing::debug!(error = %e, "gamepad support unavailable"))
            .ok();
        #[cfg(feature = "gamepad")]
        let connected = gilrs.as_ref().is_some_and(|g| g.gamepads().next().is_some());
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            pressed: 0,
            pushes: Vec::with_capacity(4),
            stick: (0.0, 0.0),
            lean: None,
            bindings: [vec![Btn::Start, Btn::A], vec![Btn::Select], vec![Btn::Y]],
            connected,
        }
    }

    /// Replace the bindings from config. A list with no recognised button
    /// leaves that action's binding as it was.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        let lists = [
            (PadAction::Confirm, &cfg.confirm),
            (PadAction::Cancel, &cfg.cancel),
            (PadAction::Restart, &cfg.restart),
        ];
        for (action, names) in lists {
            let btns: Vec<Btn> = names.iter().filter_map(|n| Btn::parse(n)).collect();
            if btns.is_empty() {
                tracing::debug!(?action, ?names, "no usable buttons, keeping default");
            } else {
                self.bindings[action as usize] = btns;
            }
        }
    }

    pub fn update(&mut self) {
        self.pressed = 0;
        self.pushes.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else { return };
        let events: Vec<EventType> = std::iter::from_fn(|| gilrs.next_event()).map(|e| e.event).collect();

        for event in events {
            match event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(Axis::LeftStickX, v, _) => {
                    self.connected = true;
                    self.stick.0 = v;
                    self.follow_stick();
                }
                EventType::AxisChanged(Axis::LeftStickY, v, _) => {
                    self.connected = true;
                    self.stick.1 = v;
                    self.follow_stick();
                }
                EventType::Connected => {
                    tracing::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    tracing::info!("gamepad disconnected");
                    self.connected = false;
                    self.stick = (0.0, 0.0);
                    self.lean = None;
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, button: Button) {
        let btn = match button {
            Button::DPadUp => return self.pushes.push(Direction::Up),
            Button::DPadDown => return self.pushes.push(Direction::Down),
            Button::DPadLeft => return self.pushes.push(Direction::Left),
            Button::DPadRight => return self.pushes.push(Direction::Right),
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::L1,
            Button::RightTrigger => Btn::R1,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            _ => return,
        };
        self.pressed |= btn.bit();
    }

    /// The stick has to come back to centre (or swing to another
    /// direction) before it pushes again.
    #[cfg(feature = "gamepad")]
    fn follow_stick(&mut self) {
        let lean = stick_direction(self.stick.0, self.stick.1);
        if lean.is_some() && lean != self.lean {
            self.pushes.extend(lean);
        }
        self.lean = lean;
    }

    fn triggered(&self, action: PadAction) -> bool {
        self.bindings[action as usize].iter().any(|b| self.pressed & b.bit() != 0)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.triggered(PadAction::Confirm)
    }

    pub fn cancel_pressed(&self) -> bool {
        self.triggered(PadAction::Cancel)
    }

    pub fn restart_pressed(&self) -> bool {
        self.triggered(PadAction::Restart)
    }

    pub fn pushes(&self) -> &[Direction] {
        &self.pushes
    }
}

/// Dominant stick axis outside the dead zone. Stick Y is positive up.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<Direction> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    if x.abs() >= y.abs() {
        Some(if x < 0.0 { Direction::Left } else { Direction::Right })
    } else {
        Some(if y > 0.0 { Direction::Up } else { Direction::Down })
    }
}
