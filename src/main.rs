/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::KeyCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::direction::Direction;
use domain::grid::face_value;
use sim::event::GameEvent;
use sim::selftest;
use sim::session::{GameSession, Phase};
use ui::gamepad::GamepadState;
use ui::input::{self, InputState};
use ui::renderer::Renderer;
use ui::signals::SignalFlag;
use ui::sound::SoundEngine;
use ui::theme::Scheme;

/// How long a status message stays up.
const MESSAGE_DURATION: Duration = Duration::from_secs(3);

// ── Command line ──

/// Positional mode word: `2048 test`, `2048 blackwhite`, `2048 bluered`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, clap::ValueEnum)]
enum Mode {
    Test,
    Blackwhite,
    Bluered,
}

#[derive(Parser, Debug)]
#[command(name = "2048", version, about = "Console version of the game 2048")]
struct Args {
    /// Run the self-test or pick a colour scheme.
    #[arg(value_enum)]
    mode: Option<Mode>,
    /// Colour scheme (overrides the mode word and config.toml).
    #[arg(long, value_enum)]
    scheme: Option<Scheme>,
    /// Seed for the tile spawner; the same seed replays the same game.
    #[arg(long)]
    seed: Option<u64>,
    /// Path to config.toml (default: search next to the binary, CWD, ~/.config/2048).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Run the built-in row-reduction check and exit.
    #[arg(long)]
    self_test: bool,
    /// Tracing filter, e.g. "info" or "twenty48=debug" (default: RUST_LOG or "warn").
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn wants_self_test(&self) -> bool {
        self.self_test || self.mode == Some(Mode::Test)
    }

    fn resolve_scheme(&self, config: &GameConfig) -> Scheme {
        match (self.scheme, self.mode) {
            (Some(s), _) => s,
            (None, Some(Mode::Blackwhite)) => Scheme::Blackwhite,
            (None, Some(Mode::Bluered)) => Scheme::Bluered,
            _ => config.scheme,
        }
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Why the game loop ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Exit {
    Quit,
    Interrupted,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log.as_deref());

    if args.wants_self_test() {
        return match selftest::run(&mut io::stdout().lock()) {
            Ok(0) => ExitCode::SUCCESS,
            Ok(_) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("Self-test output failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let config = GameConfig::load(args.config.as_deref());
    let scheme = args.resolve_scheme(&config);
    let seed = args.seed.or(config.seed);
    info!(?scheme, ?seed, "starting");

    let mut session = GameSession::new(seed);
    let mut renderer = Renderer::new(scheme);

    let signals = match SignalFlag::install() {
        Ok(flag) => Some(flag),
        Err(e) => {
            warn!(error = %e, "signal handlers not installed");
            None
        }
    };

    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), signals.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(Exit::Interrupted) => {
            println!("         TERMINATED         ");
            ExitCode::from(130)
        }
        Ok(Exit::Quit) => {
            println!(
                "Final Score: {}  (best {}, highest tile {}, {} moves)",
                session.score(),
                session.best(),
                face_value(session.max_rank()),
                session.moves()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Game error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    signals: Option<&SignalFlag>,
    config: &GameConfig,
) -> Result<Exit, Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }

    let frame = Duration::from_millis(config.frame_ms);
    let spawn_delay = Duration::from_millis(config.spawn_delay_ms);
    let message_ticks = (MESSAGE_DURATION.as_millis() / frame.as_millis().max(1)) as u32;
    let mut spawn_due: Option<Instant> = None;

    loop {
        kb.drain_events()?;
        gp.update();

        if interrupted(&kb, signals) {
            info!("interrupted");
            return Ok(Exit::Interrupted);
        }

        for action in collect_actions(&kb, &gp) {
            let (flow, events) = handle_action(session, action);
            if !events.is_empty() {
                announce(session, sound, &events, message_ticks);
            }
            if flow == Flow::Quit {
                return Ok(Exit::Quit);
            }
        }

        // Show the slid board first; the new tile lands after the delay.
        if session.has_pending_spawn() {
            let due = *spawn_due.get_or_insert_with(|| Instant::now() + spawn_delay);
            if Instant::now() >= due {
                let events = session.settle();
                announce(session, sound, &events, message_ticks);
                spawn_due = None;
            }
        } else {
            spawn_due = None;
        }

        session.tick_message();
        renderer.render(session)?;
        std::thread::sleep(frame);
    }
}

/// Ctrl+C typed in raw mode, or a termination signal from outside.
fn interrupted(kb: &InputState, signals: Option<&SignalFlag>) -> bool {
    kb.ctrl_c_pressed() || signals.is_some_and(SignalFlag::raised)
}

// ── Actions ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Action {
    Move(Direction),
    Quit,
    Restart,
    Yes,
    /// Enter or Space on the keyboard.
    Enter,
    /// Gamepad confirm button.
    Confirm,
    Cancel,
    Other,
}

fn action_for_key(code: KeyCode) -> Action {
    if let Some(dir) = input::direction_for(code) {
        return Action::Move(dir);
    }
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Char('y') | KeyCode::Char('Y') => Action::Yes,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Enter,
        KeyCode::Esc => Action::Cancel,
        _ => Action::Other,
    }
}

/// Keyboard first (in arrival order), then gamepad.
fn collect_actions(kb: &InputState, gp: &GamepadState) -> Vec<Action> {
    let mut actions: Vec<Action> = kb.keys().map(action_for_key).collect();
    actions.extend(gp.pushes().iter().map(|&d| Action::Move(d)));
    if gp.confirm_pressed() { actions.push(Action::Confirm); }
    if gp.restart_pressed() { actions.push(Action::Restart); }
    if gp.cancel_pressed() { actions.push(Action::Quit); }
    actions
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Flow {
    Continue,
    Quit,
}

fn handle_action(session: &mut GameSession, action: Action) -> (Flow, Vec<GameEvent>) {
    let mut events = Vec::new();

    match session.phase() {
        Phase::Playing => match action {
            Action::Move(dir) => events = session.play(dir),
            Action::Cancel => return (Flow::Quit, events),
            Action::Quit | Action::Restart => {
                // finish the turn so a prompt never hides a pending spawn
                events = session.settle();
                if session.phase() == Phase::Playing {
                    session.phase = if action == Action::Quit {
                        Phase::ConfirmQuit
                    } else {
                        Phase::ConfirmRestart
                    };
                }
            }
            _ => {}
        },

        Phase::ConfirmQuit => match action {
            Action::Yes | Action::Confirm => return (Flow::Quit, events),
            _ => session.phase = Phase::Playing,
        },

        Phase::ConfirmRestart => match action {
            Action::Yes | Action::Confirm => {
                debug!(score = session.score(), "restart");
                session.new_game();
            }
            _ => session.phase = Phase::Playing,
        },

        Phase::GameOver => match action {
            Action::Enter | Action::Confirm | Action::Restart | Action::Yes => session.new_game(),
            Action::Quit | Action::Cancel => return (Flow::Quit, events),
            _ => {}
        },
    }

    (Flow::Continue, events)
}

/// Sound and status messages for a batch of events.
fn announce(session: &mut GameSession, sound: Option<&SoundEngine>, events: &[GameEvent], ticks: u32) {
    let top_merge = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::TilesMerged { rank } => Some(*rank),
            _ => None,
        })
        .max();

    for event in events {
        match event {
            GameEvent::Reached2048 => {
                session.set_message("2048! Keep going for a higher score", ticks);
                if let Some(sfx) = sound { sfx.play_win(); }
            }
            GameEvent::GameOver => {
                if let Some(sfx) = sound { sfx.play_game_over(); }
            }
            GameEvent::TileSpawned { row, col, rank } => {
                debug!(row, col, rank, "tile spawned");
            }
            _ => {}
        }
    }

    if let Some(sfx) = sound {
        match top_merge {
            Some(rank) => sfx.play_merge(rank),
            None if events.contains(&GameEvent::TilesMoved) => sfx.play_slide(),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Grid;

    fn session_with(rows: [[u8; 4]; 4]) -> GameSession {
        let mut s = GameSession::new(Some(1));
        s.load_grid(Grid::from_rows(rows));
        s
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(action_for_key(KeyCode::Up), Action::Move(Direction::Up));
        assert_eq!(action_for_key(KeyCode::Char('j')), Action::Move(Direction::Down));
        assert_eq!(action_for_key(KeyCode::Char('q')), Action::Quit);
        assert_eq!(action_for_key(KeyCode::Char('r')), Action::Restart);
        assert_eq!(action_for_key(KeyCode::Esc), Action::Cancel);
        assert_eq!(action_for_key(KeyCode::Char('z')), Action::Other);
    }

    #[test]
    fn quit_asks_first() {
        let mut s = GameSession::new(Some(1));
        assert_eq!(handle_action(&mut s, Action::Quit).0, Flow::Continue);
        assert_eq!(s.phase(), Phase::ConfirmQuit);
        assert_eq!(handle_action(&mut s, Action::Other).0, Flow::Continue);
        assert_eq!(s.phase(), Phase::Playing);
        handle_action(&mut s, Action::Quit);
        assert_eq!(handle_action(&mut s, Action::Yes).0, Flow::Quit);
    }

    #[test]
    fn only_y_or_pad_confirm_accepts_a_prompt() {
        let mut s = GameSession::new(Some(1));
        handle_action(&mut s, Action::Quit);
        assert_eq!(handle_action(&mut s, action_for_key(KeyCode::Enter)).0, Flow::Continue);
        assert_eq!(s.phase(), Phase::Playing);

        handle_action(&mut s, Action::Restart);
        handle_action(&mut s, action_for_key(KeyCode::Char(' ')));
        assert_eq!(s.phase(), Phase::Playing);

        handle_action(&mut s, Action::Quit);
        assert_eq!(handle_action(&mut s, Action::Confirm).0, Flow::Quit);
    }

    #[test]
    fn enter_starts_a_new_game_after_game_over() {
        let mut s = GameSession::new(Some(1));
        s.phase = Phase::GameOver;
        handle_action(&mut s, action_for_key(KeyCode::Enter));
        assert_eq!(s.phase(), Phase::Playing);
    }

    #[test]
    fn ctrl_c_key_interrupts() {
        use crossterm::event::{KeyEvent, KeyModifiers};
        let mut kb = InputState::new();
        assert!(!interrupted(&kb, None));
        kb.push(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(interrupted(&kb, None));
    }

    #[test]
    fn escape_quits_immediately() {
        let mut s = GameSession::new(Some(1));
        assert_eq!(handle_action(&mut s, Action::Cancel).0, Flow::Quit);
    }

    #[test]
    fn restart_prompt_resets_score() {
        let mut s = session_with([[1, 1, 0, 0], [0; 4], [0; 4], [0; 4]]);
        handle_action(&mut s, Action::Move(Direction::Left));
        assert_eq!(s.score(), 4);
        handle_action(&mut s, Action::Restart);
        // the pending spawn was settled before the prompt opened
        assert!(!s.has_pending_spawn());
        assert_eq!(s.phase(), Phase::ConfirmRestart);
        handle_action(&mut s, Action::Yes);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best(), 4);
    }

    #[test]
    fn moves_ignored_while_prompting() {
        let mut s = session_with([[0, 0, 0, 1], [0; 4], [0; 4], [0; 4]]);
        s.phase = Phase::ConfirmRestart;
        let before = *s.grid();
        let (_, events) = handle_action(&mut s, Action::Move(Direction::Left));
        assert!(events.is_empty());
        assert_eq!(*s.grid(), before);
        // any non-yes key dismissed the prompt
        assert_eq!(s.phase(), Phase::Playing);
    }

    #[test]
    fn game_over_accepts_new_game_or_quit() {
        let mut s = GameSession::new(Some(1));
        s.phase = Phase::GameOver;
        assert_eq!(handle_action(&mut s, Action::Other).0, Flow::Continue);
        assert_eq!(s.phase(), Phase::GameOver);
        handle_action(&mut s, Action::Confirm);
        assert_eq!(s.phase(), Phase::Playing);
        s.phase = Phase::GameOver;
        assert_eq!(handle_action(&mut s, Action::Quit).0, Flow::Quit);
    }

    #[test]
    fn mode_word_selects_scheme_and_self_test() {
        let cfg = GameConfig::parse("").unwrap();
        let args = Args::try_parse_from(["2048", "bluered"]).unwrap();
        assert_eq!(args.resolve_scheme(&cfg), Scheme::Bluered);
        assert!(!args.wants_self_test());

        let args = Args::try_parse_from(["2048", "test"]).unwrap();
        assert!(args.wants_self_test());

        let args = Args::try_parse_from(["2048", "blackwhite", "--scheme", "original", "--seed", "9"]).unwrap();
        assert_eq!(args.resolve_scheme(&cfg), Scheme::Original);
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn config_scheme_is_the_fallback() {
        let cfg = GameConfig::parse("[general]\nscheme = \"blackwhite\"\n").unwrap();
        let args = Args::try_parse_from(["2048"]).unwrap();
        assert_eq!(args.resolve_scheme(&cfg), Scheme::Blackwhite);
    }

    #[test]
    fn reaching_2048_posts_a_message() {
        let mut s = session_with([[10, 10, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let (_, events) = handle_action(&mut s, Action::Move(Direction::Left));
        announce(&mut s, None, &events, 5);
        assert!(s.message.starts_with("2048!"));
    }
}
