use crate::dictionary::{self, Difficulty};
use crate::morse::{self, MorseCode, MorseSymbol};
use rand::Rng;

/// Owns the state of the round being played: the target word and code, the
/// captured input so far, the match position, the session's running points
/// and the outcome flags. Mutated only through the register/award calls;
/// the session loop reads it through the accessors.
#[derive(Debug)]
pub struct RoundEngine {
    difficulty: Difficulty,
    word: &'static str,
    code: MorseCode,
    captured: Vec<MorseSymbol>,
    match_index: usize,
    points: u32,
    wrong_code: bool,
    code_complete: bool,
    timer_expired: bool,
}

impl RoundEngine {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            word: "",
            code: MorseCode::default(),
            captured: Vec::new(),
            match_index: 0,
            points: 0,
            wrong_code: false,
            code_complete: false,
            timer_expired: false,
        }
    }

    /// Pick and encode a fresh word, clearing all per-round state. Points
    /// carry over; they belong to the session.
    pub fn start_round<R: Rng>(&mut self, rng: &mut R) {
        self.word = dictionary::random_word(self.difficulty, rng);
        self.code = morse::encode(self.word).expect("dictionary entries are plain A-Z words");
        self.captured.clear();
        self.match_index = 0;
        self.wrong_code = false;
        self.code_complete = false;
    }

    /// Append one classified symbol and advance the match. A correct symbol
    /// earns the difficulty's per-position points; completion is declared
    /// one position before the trailing letter space, which the player
    /// never has to key. A mismatch latches `wrong_code` for the rest of
    /// the round.
    pub fn register_code_input(&mut self, symbol: MorseSymbol) {
        if self.wrong_code || self.code_complete {
            return;
        }

        self.captured.push(symbol);

        if self.code.get(self.match_index) == Some(symbol) {
            self.match_index += 1;
            self.points += self.difficulty.symbol_points();
            if self.match_index == self.code.len() - 1 {
                self.code_complete = true;
            }
        } else {
            self.wrong_code = true;
        }
    }

    /// Going quiet after starting input fails the round; an untouched round
    /// just keeps waiting.
    pub fn register_input_timeout(&mut self) {
        if self.is_input_started() {
            self.wrong_code = true;
        }
    }

    /// One-shot bonus applied when the caller observes completion.
    pub fn award_completion_bonus(&mut self) {
        self.points += self.difficulty.outcome_swing();
    }

    /// One-shot penalty applied when the caller observes a wrong code.
    /// Points never go below zero.
    pub fn apply_wrong_code_penalty(&mut self) {
        self.points = self.points.saturating_sub(self.difficulty.outcome_swing());
    }

    pub fn register_expired_timer(&mut self) {
        self.timer_expired = true;
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn word(&self) -> &str {
        self.word
    }

    pub fn code(&self) -> &MorseCode {
        &self.code
    }

    pub fn captured(&self) -> &[MorseSymbol] {
        &self.captured
    }

    pub fn match_index(&self) -> usize {
        self.match_index
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn is_complete(&self) -> bool {
        self.code_complete
    }

    pub fn is_wrong(&self) -> bool {
        self.wrong_code
    }

    pub fn is_timer_expired(&self) -> bool {
        self.timer_expired
    }

    pub fn is_input_started(&self) -> bool {
        !self.captured.is_empty()
    }

    pub fn is_last_symbol_space(&self) -> bool {
        self.captured.last() == Some(&MorseSymbol::LetterSpace)
    }

    pub fn code_pixel_width(&self) -> u16 {
        self.code.pixel_width()
    }

    pub fn captured_pixel_width(&self) -> u16 {
        morse::pixel_width(&self.captured)
    }
}
