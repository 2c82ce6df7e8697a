use crate::dictionary::Difficulty;
use crate::morse::MorseSymbol;

/// Press duration at or below this reads as a dot, above as a dash.
/// Independent of difficulty.
pub const SHORT_CLICK_THR_MS: u64 = 260;

/// Timing thresholds the classifier runs against. `space_ms` and
/// `sequence_timeout_ms` tighten on Hard; `sequence_timeout_ms` is always
/// the larger of the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassifierThresholds {
    pub short_click_ms: u64,
    pub space_ms: u64,
    pub sequence_timeout_ms: u64,
}

impl ClassifierThresholds {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                short_click_ms: SHORT_CLICK_THR_MS,
                space_ms: 1050,
                sequence_timeout_ms: 2500,
            },
            Difficulty::Hard => Self {
                short_click_ms: SHORT_CLICK_THR_MS,
                space_ms: 850,
                sequence_timeout_ms: 2000,
            },
        }
    }
}

/// One classified event out of the per-tick poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Symbol(MorseSymbol),
    /// The player went quiet for longer than `sequence_timeout_ms` after
    /// starting input. Terminal for the round; appends no symbol.
    Timeout,
}

/// Turns a monotonic millisecond clock and a binary button sample into at
/// most one classified event per tick. Edge detection takes priority over
/// the idle checks; no call ever blocks. Pure state machine: a fixed
/// (time, sample) script always classifies identically.
#[derive(Debug)]
pub struct InputClassifier {
    thresholds: ClassifierThresholds,
    press_open: bool,
    press_start_ms: u64,
    last_release_ms: u64,
    input_started: bool,
    last_was_space: bool,
    timed_out: bool,
}

impl InputClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self {
            thresholds,
            press_open: false,
            press_start_ms: 0,
            last_release_ms: 0,
            input_started: false,
            last_was_space: false,
            timed_out: false,
        }
    }

    pub fn thresholds(&self) -> ClassifierThresholds {
        self.thresholds
    }

    /// Clear all per-round bookkeeping. Call at every round start.
    pub fn reset(&mut self) {
        self.press_open = false;
        self.press_start_ms = 0;
        self.last_release_ms = 0;
        self.input_started = false;
        self.last_was_space = false;
        self.timed_out = false;
    }

    /// Feed one tick's sample. `now_ms` must be monotonic; `pressed` is the
    /// raw button state for this tick.
    pub fn poll(&mut self, now_ms: u64, pressed: bool) -> Option<InputEvent> {
        if self.timed_out {
            return None;
        }

        if pressed {
            if !self.press_open {
                self.press_open = true;
                self.press_start_ms = now_ms;
            }
            return None;
        }

        if self.press_open {
            // Release edge: classify by held duration.
            self.press_open = false;
            self.last_release_ms = now_ms;
            let held = now_ms - self.press_start_ms;
            let symbol = if held <= self.thresholds.short_click_ms {
                MorseSymbol::Dot
            } else {
                MorseSymbol::Dash
            };
            self.input_started = true;
            self.last_was_space = false;
            return Some(InputEvent::Symbol(symbol));
        }

        if !self.input_started {
            return None;
        }

        let idle = now_ms - self.last_release_ms;
        if idle > self.thresholds.sequence_timeout_ms {
            self.timed_out = true;
            return Some(InputEvent::Timeout);
        }
        if idle > self.thresholds.space_ms && !self.last_was_space {
            self.last_was_space = true;
            return Some(InputEvent::Symbol(MorseSymbol::LetterSpace));
        }

        None
    }
}
