use crate::classifier::SHORT_CLICK_THR_MS;
use crate::dictionary::Difficulty;
use crate::morse::MorseSymbol;
use crate::session::{SessionLoop, SessionPhase};
use crate::TICK_RATE_MS;
use rand::seq::SliceRandom;
use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const POSITIVE_WORDS: &[&str] = &["awesome", "great", "nice", "correct", "good", "amazing"];
pub const NEGATIVE_WORDS: &[&str] = &["wrong", "nope", "incorrect"];
const TIMES_UP_TEXT: &str = "Time Is Up!";

/// Holding the button this long past the short-click threshold commits the
/// selected menu item.
const MENU_CLICK_LONG_THR_MS: u64 = 500;

/// Menu item width in layout pixels: 8 px per character, as the fill bar
/// growth is calibrated against.
const MENU_CHAR_PX: u64 = 8;

const MENU_ITEMS: [Difficulty; 2] = [Difficulty::Easy, Difficulty::Hard];

/// Timer flips to the urgent style with this many seconds left.
const TIMER_URGENT_SECS: u64 = 5;

/// Per-frame animation counters. Owned by the renderer, never by the game
/// core; an explicit struct rather than process-wide state.
#[derive(Debug, Default)]
pub struct RendererState {
    title_underline: u16,
    signal_frame: u16,
    outcome_word: Option<&'static str>,
}

impl RendererState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_tick(&mut self) {
        if self.title_underline < 35 {
            self.title_underline += 1;
        }
        self.signal_frame = (self.signal_frame + 1) % 16;
    }

    pub fn set_outcome_word(&mut self, word: &'static str) {
        self.outcome_word = Some(word);
    }

    pub fn clear_outcome_word(&mut self) {
        self.outcome_word = None;
    }
}

/// Splash word for a round outcome, picked once per outcome by the caller.
pub fn pick_outcome_word<R: Rng>(won: bool, rng: &mut R) -> &'static str {
    let words = if won { POSITIVE_WORDS } else { NEGATIVE_WORDS };
    words.choose(rng).copied().unwrap_or("done")
}

/// What a menu tick amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Moved,
    Selected(Difficulty),
}

/// Single-button menu: a short click cycles the selector, a long hold
/// grows the fill bar over the selected item and commits when full.
#[derive(Debug, Default)]
pub struct MenuState {
    selector: usize,
    fill_px: f32,
    pressed_since: Option<u64>,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Difficulty {
        MENU_ITEMS[self.selector]
    }

    pub fn select(&mut self, difficulty: Difficulty) {
        self.selector = MENU_ITEMS.iter().position(|d| *d == difficulty).unwrap_or(0);
    }

    fn selected_width_px(&self) -> f32 {
        (self.selected().to_string().len() as u64 * MENU_CHAR_PX) as f32
    }

    /// Fill fraction of the selected item, 0..=1, for rendering.
    pub fn fill_ratio(&self) -> f32 {
        (self.fill_px / self.selected_width_px()).clamp(0.0, 1.0)
    }

    pub fn tick(&mut self, now_ms: u64, pressed: bool) -> Option<MenuAction> {
        let item_width = self.selected_width_px();
        if self.fill_px > item_width {
            self.fill_px = 0.0;
            self.pressed_since = None;
            return Some(MenuAction::Selected(self.selected()));
        }

        if pressed {
            let start = *self.pressed_since.get_or_insert(now_ms);
            if now_ms - start > SHORT_CLICK_THR_MS {
                let fill_ticks = (MENU_CLICK_LONG_THR_MS / TICK_RATE_MS) as f32;
                self.fill_px += (item_width / fill_ticks) * 2.0;
            }
        } else if let Some(start) = self.pressed_since.take() {
            let held = now_ms - start;
            self.fill_px = 0.0;
            if held <= SHORT_CLICK_THR_MS {
                self.selector = (self.selector + 1) % MENU_ITEMS.len();
                return Some(MenuAction::Moved);
            }
        }

        None
    }
}

fn split_frame(f: &mut Frame) -> (ratatui::layout::Rect, Vec<ratatui::layout::Rect>) {
    let area = f.area();
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status corners
            Constraint::Min(0),    // center content
            Constraint::Length(1), // footer corners
        ])
        .split(inner);
    (inner, rows.to_vec())
}

fn render_corners(f: &mut Frame, row: ratatui::layout::Rect, left: Line, right: Line) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(row);
    f.render_widget(Paragraph::new(left).alignment(Alignment::Left), cols[0]);
    f.render_widget(Paragraph::new(right).alignment(Alignment::Right), cols[1]);
}

/// Signal tower with its pulse, a frame of a tiny looping animation.
fn signal_tower(frame: u16) -> [&'static str; 3] {
    match frame / 4 {
        0 => ["   !   ", "  /|\\  ", " /_|_\\ "],
        1 => ["  (!)  ", "  /|\\  ", " /_|_\\ "],
        2 => [" ((!)) ", "  /|\\  ", " /_|_\\ "],
        _ => ["(((!)))", "  /|\\  ", " /_|_\\ "],
    }
}

pub fn render_menu(
    f: &mut Frame,
    menu: &MenuState,
    high_score: u32,
    sound: bool,
    rs: &RendererState,
) {
    let (_inner, rows) = split_frame(f);

    let underline: String = "─".repeat(usize::from(rs.title_underline.min(12)));
    let tower = signal_tower(rs.signal_frame);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "MORSE ATTACK",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(underline),
        Line::from(""),
    ];

    for (idx, item) in MENU_ITEMS.iter().enumerate() {
        let selected = idx == menu.selector;
        let marker = if selected { "▶ " } else { "  " };
        let style = if selected {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", marker, item),
            style,
        )));
        // Fill bar under the selected item while the hold is in progress.
        if selected && menu.fill_ratio() > 0.0 {
            let label_cells = item.to_string().len() as f32;
            let filled = (menu.fill_ratio() * label_cells).round() as usize;
            lines.push(Line::from(format!("  {}", "━".repeat(filled.max(1)))));
        }
    }

    lines.push(Line::from(""));
    for row in tower {
        lines.push(Line::from(row));
    }

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        rows[1],
    );

    let sound_text = if sound { "sound on" } else { "sound off" };
    render_corners(
        f,
        rows[2],
        Line::from(format!("HI {}", high_score)),
        Line::from(sound_text),
    );
}

/// Terminal-cell rendering of a symbol run; one block per dot, two per
/// dash, matching the shape of the pixel model.
fn code_spans(symbols: &[MorseSymbol]) -> Line<'static> {
    let mut spans: Vec<Span> = Vec::new();
    for symbol in symbols {
        match symbol {
            MorseSymbol::Dot => spans.push(Span::raw("■ ")),
            MorseSymbol::Dash => spans.push(Span::raw("■■ ")),
            MorseSymbol::LetterSpace => spans.push(Span::raw("  ")),
        }
    }
    Line::from(spans)
}

fn code_cell_width(symbols: &[MorseSymbol]) -> usize {
    symbols
        .iter()
        .map(|s| match s {
            MorseSymbol::Dot => 2,
            MorseSymbol::Dash => 3,
            MorseSymbol::LetterSpace => 2,
        })
        .sum()
}

pub fn render_game(f: &mut Frame, session: &SessionLoop, now_ms: u64, rs: &RendererState) {
    let (_inner, rows) = split_frame(f);

    if matches!(
        session.phase(),
        SessionPhase::Summary | SessionPhase::Finished
    ) {
        render_summary(f, session, rows[1]);
        return;
    }

    let engine = session.engine();

    // Status corners: points and the countdown.
    let remaining = session.remaining_secs(now_ms);
    let timer_style = if remaining <= TIMER_URGENT_SECS {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    render_corners(
        f,
        rows[0],
        Line::from(format!("P:{}", engine.points())),
        Line::from(Span::styled(format!("T:{}", remaining), timer_style)),
    );

    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            engine.word().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        code_spans(engine.code().symbols()),
    ];

    // Progress bar: captured width scaled onto the rendered code row.
    let code_px = engine.code_pixel_width();
    if code_px > 0 && engine.is_input_started() {
        let cells = code_cell_width(engine.code().symbols());
        let filled = (usize::from(engine.captured_pixel_width()) * cells
            / usize::from(code_px))
        .min(cells);
        lines.push(Line::from("▔".repeat(filled.max(1))));
    } else {
        lines.push(Line::from(""));
    }

    if let (SessionPhase::RoundOutcome { .. }, Some(word)) = (session.phase(), rs.outcome_word) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("-{}-", word),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        rows[1],
    );

    render_corners(
        f,
        rows[2],
        Line::from(format!("HI {}", session.high_score())),
        Line::from(session.difficulty().to_string()),
    );
}

fn render_summary(f: &mut Frame, session: &SessionLoop, area: ratatui::layout::Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            TIMES_UP_TEXT,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("score {}", session.engine().points())),
    ];
    if session.beat_high_score() {
        lines.push(Line::from(Span::styled(
            "new high score!",
            Style::default().fg(Color::Yellow),
        )));
    }
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}
