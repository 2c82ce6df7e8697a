use clap::Parser;
use crossterm::{
    event::{
        KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use morse_attack::{
    audio::{AudioPlayer, TerminalBellSink, ToneCue},
    button::ButtonState,
    config::{Config, ConfigStore, FileConfigStore},
    dictionary::Difficulty,
    morse::MorseSymbol,
    runtime::{CrosstermEventSource, GameEvent, Runner},
    score::{FileHighScoreStore, HighScoreStore},
    session::{SessionConfig, SessionEvent, SessionLoop},
    ui::{self, MenuAction, MenuState, RendererState},
    TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

/// single-button morse reflex game
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Race a 30 second clock reproducing each word's morse code with one key: tap for a dot, hold for a dash, pause for a letter space."
)]
pub struct Cli {
    /// start straight into a session at this difficulty, skipping the menu
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// session length in seconds
    #[clap(short = 's', long)]
    secs: Option<u64>,

    /// disable all sound
    #[clap(long)]
    no_sound: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Menu,
    Playing,
}

pub struct App {
    pub state: AppState,
    pub config: Config,
    menu: MenuState,
    session: Option<SessionLoop>,
    renderer: RendererState,
    button: ButtonState,
    audio: AudioPlayer,
    high_score: u32,
    rng: rand::rngs::ThreadRng,
}

impl App {
    pub fn new(config: Config, release_events: bool) -> Self {
        let audio = if config.sound {
            AudioPlayer::spawn(TerminalBellSink)
        } else {
            AudioPlayer::disabled()
        };
        let mut menu = MenuState::new();
        menu.select(config.difficulty);
        let high_score = FileHighScoreStore::new().load();

        Self {
            state: AppState::Menu,
            config,
            menu,
            session: None,
            renderer: RendererState::new(),
            button: ButtonState::new(release_events),
            audio,
            high_score,
            rng: rand::thread_rng(),
        }
    }

    fn start_session(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
        let mut session_config = SessionConfig::new(difficulty);
        session_config.session_secs = self.config.session_secs;
        self.session = Some(SessionLoop::new(
            session_config,
            Box::new(FileHighScoreStore::new()),
        ));
        self.renderer.clear_outcome_word();
        self.state = AppState::Playing;
    }

    fn on_key(&mut self, key: KeyEvent, now_ms: u64) {
        // Any key works as the button; quitting is handled by the caller.
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.button.on_key_down(now_ms),
            KeyEventKind::Release => self.button.on_key_up(),
        }
    }

    fn on_tick(&mut self, now_ms: u64) -> Result<(), Box<dyn Error>> {
        let pressed = self.button.sample(now_ms);
        self.renderer.on_tick();

        match self.state {
            AppState::Menu => {
                match self.menu.tick(now_ms, pressed) {
                    Some(MenuAction::Moved) => self.audio.play(ToneCue::MenuMove),
                    Some(MenuAction::Selected(difficulty)) => {
                        self.audio.play(ToneCue::MenuSelect);
                        self.start_session(difficulty);
                    }
                    None => {}
                }
                Ok(())
            }
            AppState::Playing => {
                let Some(session) = self.session.as_mut() else {
                    self.state = AppState::Menu;
                    return Ok(());
                };

                if let Some(event) = session.tick(now_ms, pressed)? {
                    match event {
                        SessionEvent::RoundStarted => self.renderer.clear_outcome_word(),
                        SessionEvent::SymbolCaptured(MorseSymbol::Dot) => {
                            self.audio.play(ToneCue::Dot)
                        }
                        SessionEvent::SymbolCaptured(MorseSymbol::Dash) => {
                            self.audio.play(ToneCue::Dash)
                        }
                        SessionEvent::SymbolCaptured(MorseSymbol::LetterSpace) => {}
                        SessionEvent::RoundWon => {
                            self.audio.play(ToneCue::RoundWon);
                            self.renderer
                                .set_outcome_word(ui::pick_outcome_word(true, &mut self.rng));
                        }
                        SessionEvent::RoundLost => {
                            self.audio.play(ToneCue::RoundLost);
                            self.renderer
                                .set_outcome_word(ui::pick_outcome_word(false, &mut self.rng));
                        }
                        SessionEvent::SessionOver => self.audio.play(ToneCue::SessionOver),
                    }
                }

                if session.is_finished() {
                    // Back to the menu with a fresh view of the high score.
                    self.session = None;
                    self.high_score = FileHighScoreStore::new().load();
                    self.state = AppState::Menu;
                }
                Ok(())
            }
        }
    }

    fn draw(&self, f: &mut Frame, now_ms: u64) {
        match (&self.state, &self.session) {
            (AppState::Playing, Some(session)) => {
                ui::render_game(f, session, now_ms, &self.renderer)
            }
            _ => ui::render_menu(
                f,
                &self.menu,
                self.high_score,
                self.audio.is_enabled(),
                &self.renderer,
            ),
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c')
            && key
                .modifiers
                .contains(crossterm::event::KeyModifiers::CONTROL))
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let clock = Instant::now();

    terminal.draw(|f| app.draw(f, 0))?;

    loop {
        let now_ms = clock.elapsed().as_millis() as u64;
        match runner.step() {
            GameEvent::Tick => {
                app.on_tick(now_ms)?;
                terminal.draw(|f| app.draw(f, now_ms))?;
            }
            GameEvent::Key(key) => {
                if is_quit(&key) {
                    break;
                }
                app.on_key(key, now_ms);
            }
            GameEvent::Resize => {
                terminal.draw(|f| app.draw(f, now_ms))?;
            }
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(secs) = cli.secs {
        config.session_secs = secs;
    }
    if cli.no_sound {
        config.sound = false;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let release_events = supports_keyboard_enhancement().unwrap_or(false);
    if release_events {
        execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, release_events);
    if let Some(difficulty) = cli.difficulty {
        app.start_session(difficulty);
    }
    let result = run_app(&mut terminal, &mut app);

    if release_events {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Remember the last difficulty and sound setting.
    let _ = config_store.save(&app.config);

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_default_values() {
        let cli = Cli::parse_from(["morse-attack"]);
        assert_eq!(cli.difficulty, None);
        assert_eq!(cli.secs, None);
        assert!(!cli.no_sound);
    }

    #[test]
    fn cli_difficulty_flag() {
        let cli = Cli::parse_from(["morse-attack", "-d", "easy"]);
        assert_eq!(cli.difficulty, Some(Difficulty::Easy));

        let cli = Cli::parse_from(["morse-attack", "--difficulty", "hard"]);
        assert_eq!(cli.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn cli_secs_and_sound_flags() {
        let cli = Cli::parse_from(["morse-attack", "-s", "60", "--no-sound"]);
        assert_eq!(cli.secs, Some(60));
        assert!(cli.no_sound);
    }

    #[test]
    fn quit_keys() {
        use crossterm::event::KeyModifiers;
        assert!(is_quit(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_quit(&KeyEvent::new(
            KeyCode::Char(' '),
            KeyModifiers::NONE
        )));
    }

    #[test]
    fn app_starts_at_the_menu() {
        let config = Config {
            sound: false,
            ..Config::default()
        };
        let app = App::new(config, true);
        assert_eq!(app.state, AppState::Menu);
        assert!(app.session.is_none());
    }

    #[test]
    fn starting_a_session_switches_state_and_remembers_difficulty() {
        let config = Config {
            sound: false,
            ..Config::default()
        };
        let mut app = App::new(config, true);
        app.start_session(Difficulty::Hard);

        assert_eq!(app.state, AppState::Playing);
        assert!(app.session.is_some());
        assert_eq!(app.config.difficulty, Difficulty::Hard);
    }
}
