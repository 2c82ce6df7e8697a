use crate::classifier::{ClassifierThresholds, InputClassifier, InputEvent};
use crate::dictionary::Difficulty;
use crate::engine::RoundEngine;
use crate::morse::MorseSymbol;
use crate::score::HighScoreStore;
use chrono::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;

/// Session length in seconds; the session ends once elapsed time exceeds it.
pub const SESSION_SECS: u64 = 30;

/// Width of the virtual display the code row is centered on.
pub const DISPLAY_WIDTH_PX: u16 = 128;

/// How long the fresh word is held on screen before input starts.
pub const ROUND_INTRO_MS: u64 = 450;

/// How long a won/lost splash stays up.
pub const OUTCOME_HOLD_MS: u64 = 1000;

/// How long the end-of-session summary stays up.
pub const SUMMARY_HOLD_MS: u64 = 3500;

/// Centering margin the code row must keep on each side.
const MIN_CODE_MARGIN_PX: i32 = 3;

/// Regeneration ceiling for words too wide to display. The dictionaries
/// are curated to fit, so reaching it means the word data is broken.
const MAX_ROUND_REGENS: u32 = 32;

/// Where the session currently is. Holds are phases with a deadline; no
/// input is processed outside Playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// New word on screen, input not yet open.
    AwaitingRound,
    Playing,
    RoundOutcome { won: bool },
    /// End-of-session summary splash.
    Summary,
    Finished,
}

/// Outward-facing transitions, consumed for audio cues and splash text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    RoundStarted,
    SymbolCaptured(MorseSymbol),
    RoundWon,
    RoundLost,
    SessionOver,
}

/// Raised only when round regeneration hits its ceiling, i.e. a dictionary
/// entry can never fit the display.
#[derive(Debug)]
pub enum SessionError {
    RoundTooWide { word: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::RoundTooWide { word } => {
                write!(f, "code for {:?} cannot fit the display", word)
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub session_secs: u64,
    pub display_width: u16,
    /// Append a result line to the log at session end.
    pub log_results: bool,
}

impl SessionConfig {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            session_secs: SESSION_SECS,
            display_width: DISPLAY_WIDTH_PX,
            log_results: true,
        }
    }
}

/// Drives one timed session: ticks the classifier, feeds the engine,
/// sequences the phased holds and persists the high score at the end.
/// Owns no clock; the caller supplies monotonic milliseconds and the raw
/// button sample every tick.
pub struct SessionLoop {
    config: SessionConfig,
    engine: RoundEngine,
    classifier: InputClassifier,
    phase: SessionPhase,
    phase_until_ms: u64,
    started_at_ms: Option<u64>,
    high_score: u32,
    store: Box<dyn HighScoreStore>,
    rng: StdRng,
}

impl SessionLoop {
    pub fn new(config: SessionConfig, store: Box<dyn HighScoreStore>) -> Self {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    pub fn with_rng(config: SessionConfig, store: Box<dyn HighScoreStore>, rng: StdRng) -> Self {
        let high_score = store.load();
        let difficulty = config.difficulty;
        Self {
            config,
            engine: RoundEngine::new(difficulty),
            classifier: InputClassifier::new(ClassifierThresholds::for_difficulty(difficulty)),
            phase: SessionPhase::AwaitingRound,
            phase_until_ms: 0,
            started_at_ms: None,
            high_score,
            store,
            rng,
        }
    }

    /// Advance one tick. Returns at most one session event.
    pub fn tick(
        &mut self,
        now_ms: u64,
        pressed: bool,
    ) -> Result<Option<SessionEvent>, SessionError> {
        if self.started_at_ms.is_none() {
            self.started_at_ms = Some(now_ms);
            self.next_round(now_ms)?;
            return Ok(Some(SessionEvent::RoundStarted));
        }

        match self.phase {
            SessionPhase::AwaitingRound => {
                if now_ms >= self.phase_until_ms {
                    self.phase = SessionPhase::Playing;
                }
                Ok(None)
            }
            SessionPhase::Playing => Ok(self.tick_playing(now_ms, pressed)),
            SessionPhase::RoundOutcome { .. } => {
                if now_ms >= self.phase_until_ms {
                    self.next_round(now_ms)?;
                    return Ok(Some(SessionEvent::RoundStarted));
                }
                Ok(None)
            }
            SessionPhase::Summary => {
                if now_ms >= self.phase_until_ms {
                    self.phase = SessionPhase::Finished;
                }
                Ok(None)
            }
            SessionPhase::Finished => Ok(None),
        }
    }

    fn tick_playing(&mut self, now_ms: u64, pressed: bool) -> Option<SessionEvent> {
        // Session timer first; a mid-round expiry still counts the points.
        if self.elapsed_secs(now_ms) > self.config.session_secs {
            self.engine.register_expired_timer();
            if self.engine.points() > self.high_score {
                let _ = self.store.save(self.engine.points());
            }
            if self.config.log_results {
                let _ = self.append_result_log();
            }
            self.phase = SessionPhase::Summary;
            self.phase_until_ms = now_ms + SUMMARY_HOLD_MS;
            return Some(SessionEvent::SessionOver);
        }

        let mut captured = None;
        match self.classifier.poll(now_ms, pressed) {
            Some(InputEvent::Symbol(symbol)) => {
                self.engine.register_code_input(symbol);
                captured = Some(SessionEvent::SymbolCaptured(symbol));
            }
            Some(InputEvent::Timeout) => {
                self.engine.register_input_timeout();
            }
            None => {}
        }

        if self.engine.is_complete() {
            self.engine.award_completion_bonus();
            self.phase = SessionPhase::RoundOutcome { won: true };
            self.phase_until_ms = now_ms + OUTCOME_HOLD_MS;
            return Some(SessionEvent::RoundWon);
        }
        if self.engine.is_wrong() {
            self.engine.apply_wrong_code_penalty();
            self.phase = SessionPhase::RoundOutcome { won: false };
            self.phase_until_ms = now_ms + OUTCOME_HOLD_MS;
            return Some(SessionEvent::RoundLost);
        }

        captured
    }

    /// Generate the next round, regenerating while the code cannot center
    /// on the display with margin.
    fn next_round(&mut self, now_ms: u64) -> Result<(), SessionError> {
        for _ in 0..MAX_ROUND_REGENS {
            self.engine.start_round(&mut self.rng);
            if self.code_fits() {
                self.classifier.reset();
                self.phase = SessionPhase::AwaitingRound;
                self.phase_until_ms = now_ms + ROUND_INTRO_MS;
                return Ok(());
            }
        }
        Err(SessionError::RoundTooWide {
            word: self.engine.word().to_string(),
        })
    }

    fn code_fits(&self) -> bool {
        self.code_origin_px() >= MIN_CODE_MARGIN_PX
    }

    /// Centered x of the code row on the virtual display; negative when the
    /// code is wider than the display.
    pub fn code_origin_px(&self) -> i32 {
        (i32::from(self.config.display_width) - i32::from(self.engine.code_pixel_width())) / 2
    }

    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        let started = self.started_at_ms.unwrap_or(now_ms);
        (now_ms.saturating_sub(started)) / 1000
    }

    pub fn remaining_secs(&self, now_ms: u64) -> u64 {
        self.config
            .session_secs
            .saturating_sub(self.elapsed_secs(now_ms))
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    /// True when this session's points beat the score loaded at start.
    pub fn beat_high_score(&self) -> bool {
        self.engine.points() > self.high_score
    }

    fn append_result_log(&self) -> std::io::Result<()> {
        let Some(log_path) = crate::app_dirs::AppDirs::log_path() else {
            return Ok(());
        };
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !log_path.exists();
        let mut log_file = OpenOptions::new().append(true).create(true).open(log_path)?;
        if needs_header {
            writeln!(log_file, "date,difficulty,points,high_score")?;
        }
        writeln!(
            log_file,
            "{},{},{},{}",
            Local::now().format("%c"),
            self.config.difficulty,
            self.engine.points(),
            self.high_score,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morse::MorseSymbol::*;
    use crate::score::MemoryHighScoreStore;
    use assert_matches::assert_matches;

    const TICK: u64 = 33;

    fn test_session(difficulty: Difficulty, store: MemoryHighScoreStore) -> SessionLoop {
        let mut config = SessionConfig::new(difficulty);
        config.log_results = false;
        SessionLoop::with_rng(config, Box::new(store), StdRng::seed_from_u64(42))
    }

    /// Tick with the button up until `until_ms`, collecting events.
    fn idle_until(session: &mut SessionLoop, now: &mut u64, until_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while *now < until_ms {
            if let Some(ev) = session.tick(*now, false).unwrap() {
                events.push(ev);
            }
            *now += TICK;
        }
        events
    }

    /// Key one symbol through real press/release/idle timing.
    fn key_symbol(session: &mut SessionLoop, now: &mut u64, symbol: MorseSymbol) {
        match symbol {
            Dot | Dash => {
                let hold = if symbol == Dot { 100 } else { 400 };
                let release_at = *now + hold;
                while *now < release_at {
                    session.tick(*now, true).unwrap();
                    *now += TICK;
                }
                session.tick(*now, false).unwrap();
                *now += TICK;
            }
            LetterSpace => {
                // Sit idle just past the space threshold.
                let deadline = *now + 1100;
                while *now < deadline {
                    session.tick(*now, false).unwrap();
                    *now += TICK;
                }
            }
        }
    }

    fn start_playing(session: &mut SessionLoop, now: &mut u64) {
        assert_eq!(
            session.tick(*now, false).unwrap(),
            Some(SessionEvent::RoundStarted)
        );
        *now += TICK;
        let intro_over = *now + ROUND_INTRO_MS + 2 * TICK;
        idle_until(session, now, intro_over);
        assert_eq!(session.phase(), SessionPhase::Playing);
    }

    #[test]
    fn first_tick_generates_a_round_and_holds_the_intro() {
        let mut session = test_session(Difficulty::Easy, MemoryHighScoreStore::with_score(64));
        let mut now = 0;

        assert_eq!(
            session.tick(now, false).unwrap(),
            Some(SessionEvent::RoundStarted)
        );
        assert!(!session.engine().word().is_empty());
        assert_eq!(session.phase(), SessionPhase::AwaitingRound);

        now += TICK;
        // Input during the intro hold is not processed.
        session.tick(now, true).unwrap();
        assert!(session.engine().captured().is_empty());

        idle_until(&mut session, &mut now, ROUND_INTRO_MS + 2 * TICK);
        assert_eq!(session.phase(), SessionPhase::Playing);
    }

    #[test]
    fn keying_the_exact_code_wins_the_round() {
        let mut session = test_session(Difficulty::Easy, MemoryHighScoreStore::with_score(64));
        let mut now = 0;
        start_playing(&mut session, &mut now);

        let code: Vec<MorseSymbol> = session.engine().code().symbols().to_vec();
        let mut won = false;
        for symbol in &code[..code.len() - 1] {
            key_symbol(&mut session, &mut now, *symbol);
            if session.phase() == (SessionPhase::RoundOutcome { won: true }) {
                won = true;
                break;
            }
        }

        assert!(won, "exact code should complete the round");
        // Per-position points plus the completion bonus.
        let matched = (code.len() - 1) as u32;
        assert_eq!(session.engine().points(), matched + 3);
    }

    #[test]
    fn won_round_rolls_into_a_new_round_after_the_hold() {
        let mut session = test_session(Difficulty::Easy, MemoryHighScoreStore::with_score(64));
        let mut now = 0;
        start_playing(&mut session, &mut now);

        let code: Vec<MorseSymbol> = session.engine().code().symbols().to_vec();
        for symbol in &code[..code.len() - 1] {
            key_symbol(&mut session, &mut now, *symbol);
            if matches!(session.phase(), SessionPhase::RoundOutcome { .. }) {
                break;
            }
        }

        let until = now + OUTCOME_HOLD_MS + 2 * TICK;
        let events = idle_until(&mut session, &mut now, until);
        assert!(events.contains(&SessionEvent::RoundStarted));
        assert_eq!(session.phase(), SessionPhase::AwaitingRound);
        assert!(session.engine().captured().is_empty());
        // Points carried over into the new round.
        assert!(session.engine().points() > 0);
    }

    #[test]
    fn wrong_symbol_loses_the_round_with_penalty() {
        let mut session = test_session(Difficulty::Easy, MemoryHighScoreStore::with_score(64));
        let mut now = 0;
        start_playing(&mut session, &mut now);

        // Key the opposite of the expected first symbol.
        let expected = session.engine().code().get(0).unwrap();
        let wrong = if expected == Dot { Dash } else { Dot };
        key_symbol(&mut session, &mut now, wrong);

        assert_matches!(session.phase(), SessionPhase::RoundOutcome { won: false });
        // 0 matched points, penalty clamped at zero.
        assert_eq!(session.engine().points(), 0);
    }

    #[test]
    fn idle_timeout_after_input_loses_the_round() {
        let mut session = test_session(Difficulty::Easy, MemoryHighScoreStore::with_score(64));
        let mut now = 0;
        start_playing(&mut session, &mut now);

        // Key the first letter cleanly (its space arrives via idle), then
        // stall until the sequence timeout.
        let code: Vec<MorseSymbol> = session.engine().code().symbols().to_vec();
        let first_space = code.iter().position(|s| *s == LetterSpace).unwrap();
        for symbol in &code[..=first_space] {
            key_symbol(&mut session, &mut now, *symbol);
        }
        assert_eq!(session.phase(), SessionPhase::Playing);

        // The first-letter space already burned ~1.1s of idle; this takes
        // the round past the 2.5s sequence timeout without outliving the
        // outcome hold.
        let until = now + 1600;
        let events = idle_until(&mut session, &mut now, until);
        assert_matches!(session.phase(), SessionPhase::RoundOutcome { won: false });
        assert!(events.contains(&SessionEvent::RoundLost));
    }

    #[test]
    fn session_expires_into_summary_then_finished() {
        let store = MemoryHighScoreStore::with_score(64);
        let mut session = test_session(Difficulty::Easy, store.clone());
        let mut now = 0;
        start_playing(&mut session, &mut now);

        // Burn the whole session clock; rounds keep timing out and cycling.
        let events = idle_until(&mut session, &mut now, 32_000);
        assert!(events.contains(&SessionEvent::SessionOver));
        assert_eq!(session.phase(), SessionPhase::Summary);
        assert!(session.engine().is_timer_expired());

        let until = now + SUMMARY_HOLD_MS + 2 * TICK;
        idle_until(&mut session, &mut now, until);
        assert!(session.is_finished());

        // Nothing beat the stored score.
        assert_eq!(store.current(), 64);
    }

    #[test]
    fn beaten_high_score_is_persisted_at_session_end() {
        let store = MemoryHighScoreStore::with_score(2);
        let mut session = test_session(Difficulty::Easy, store.clone());
        let mut now = 0;
        start_playing(&mut session, &mut now);

        let code: Vec<MorseSymbol> = session.engine().code().symbols().to_vec();
        for symbol in &code[..code.len() - 1] {
            key_symbol(&mut session, &mut now, *symbol);
            if matches!(session.phase(), SessionPhase::RoundOutcome { .. }) {
                break;
            }
        }
        let points = session.engine().points();
        assert!(points > 2);
        assert!(session.beat_high_score());

        idle_until(&mut session, &mut now, 40_000);
        assert!(session.is_finished());
        assert_eq!(store.current(), points);
    }

    #[test]
    fn ticks_are_quiet_after_finish() {
        let mut session = test_session(Difficulty::Easy, MemoryHighScoreStore::with_score(64));
        let mut now = 0;
        start_playing(&mut session, &mut now);
        idle_until(&mut session, &mut now, 40_000);
        assert!(session.is_finished());

        for _ in 0..10 {
            assert_eq!(session.tick(now, true).unwrap(), None);
            now += TICK;
        }
    }

    #[test]
    fn generated_rounds_always_fit_the_display() {
        for difficulty in [Difficulty::Easy, Difficulty::Hard] {
            let mut session = test_session(difficulty, MemoryHighScoreStore::with_score(64));
            let mut now = 0;
            start_playing(&mut session, &mut now);
            for _ in 0..10 {
                assert!(session.code_origin_px() >= 3);
                // Let the round time out into the next one.
                let until = now + 5000;
                idle_until(&mut session, &mut now, until);
                if session.is_finished() {
                    break;
                }
            }
        }
    }

    #[test]
    fn remaining_secs_counts_down_and_clamps() {
        let mut session = test_session(Difficulty::Easy, MemoryHighScoreStore::with_score(64));
        session.tick(0, false).unwrap();
        assert_eq!(session.remaining_secs(0), SESSION_SECS);
        assert_eq!(session.remaining_secs(10_000), SESSION_SECS - 10);
        assert_eq!(session.remaining_secs(90_000), 0);
    }
}
