use itertools::Itertools;
use std::fmt;

/// Pixel width of one code block on the 128x64 layout grid. A dot is one
/// block, a dash two, a letter space one blank block.
pub const CODE_PIXEL_BLOCK_SIZE: u16 = 4;

/// Dot/dash patterns for A-Z, indexed by letter offset.
const LETTERS: [&str; 26] = [
    ".-",   // A
    "-...", // B
    "-.-.", // C
    "-..",  // D
    ".",    // E
    "..-.", // F
    "--.",  // G
    "....", // H
    "..",   // I
    ".---", // J
    "-.-",  // K
    ".-..", // L
    "--",   // M
    "-.",   // N
    "---",  // O
    ".--.", // P
    "--.-", // Q
    ".-.",  // R
    "...",  // S
    "-",    // T
    "..-",  // U
    "...-", // V
    ".--",  // W
    "-..-", // X
    "-.--", // Y
    "--..", // Z
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorseSymbol {
    Dot,
    Dash,
    LetterSpace,
}

impl fmt::Display for MorseSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            MorseSymbol::Dot => '.',
            MorseSymbol::Dash => '-',
            MorseSymbol::LetterSpace => ' ',
        };
        write!(f, "{}", c)
    }
}

/// Encoded form of one word: every letter's symbols followed by a
/// LetterSpace, including the final letter. The trailing space counts
/// toward the match length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MorseCode {
    symbols: Vec<MorseSymbol>,
}

impl MorseCode {
    pub fn symbols(&self) -> &[MorseSymbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<MorseSymbol> {
        self.symbols.get(idx).copied()
    }

    pub fn pixel_width(&self) -> u16 {
        pixel_width(&self.symbols)
    }
}

impl fmt::Display for MorseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbols.iter().join(""))
    }
}

/// A word contained a character outside A-Z. Word lists are curated, so
/// hitting this is a data-integrity bug, not a user error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnsupportedCharacter(pub char);

impl fmt::Display for UnsupportedCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character {:?} has no morse encoding", self.0)
    }
}

impl std::error::Error for UnsupportedCharacter {}

/// Encode a word, case-insensitively, into its symbol sequence.
pub fn encode(word: &str) -> Result<MorseCode, UnsupportedCharacter> {
    let mut symbols = Vec::new();

    for c in word.chars() {
        let upper = c.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return Err(UnsupportedCharacter(c));
        }

        let pattern = LETTERS[(upper as u8 - b'A') as usize];
        for p in pattern.chars() {
            symbols.push(match p {
                '.' => MorseSymbol::Dot,
                _ => MorseSymbol::Dash,
            });
        }
        symbols.push(MorseSymbol::LetterSpace);
    }

    Ok(MorseCode { symbols })
}

/// Reverse of `encode`: split on LetterSpace and look each pattern back up.
/// Returns None if any chunk is not a known letter pattern.
pub fn decode(code: &MorseCode) -> Option<String> {
    let mut word = String::new();

    for chunk in code
        .symbols
        .split(|s| *s == MorseSymbol::LetterSpace)
        .filter(|c| !c.is_empty())
    {
        let pattern: String = chunk.iter().map(MorseSymbol::to_string).collect();
        let idx = LETTERS.iter().position(|p| *p == pattern.as_str())?;
        word.push((b'A' + idx as u8) as char);
    }

    Some(word)
}

/// Width in layout pixels of a symbol run: one block per dot, two per dash,
/// one blank block per letter space, plus a one-pixel gap after every
/// non-space symbol.
pub fn pixel_width(symbols: &[MorseSymbol]) -> u16 {
    symbols
        .iter()
        .map(|s| match s {
            MorseSymbol::Dot => CODE_PIXEL_BLOCK_SIZE + 1,
            MorseSymbol::Dash => 2 * CODE_PIXEL_BLOCK_SIZE + 1,
            MorseSymbol::LetterSpace => CODE_PIXEL_BLOCK_SIZE,
        })
        .sum()
}
