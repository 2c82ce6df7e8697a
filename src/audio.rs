use std::io::Write;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Sound intents raised by game transitions. Enqueued fire-and-forget;
/// nothing in the game loop ever waits on playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToneCue {
    Dot,
    Dash,
    MenuMove,
    MenuSelect,
    RoundWon,
    RoundLost,
    SessionOver,
}

/// Playback backend owned by the audio worker thread.
pub trait ToneSink: Send + 'static {
    fn play(&mut self, cue: ToneCue);
}

/// Rings the terminal bell; the pulse count stands in for pitch.
pub struct TerminalBellSink;

impl TerminalBellSink {
    fn pulses(cue: ToneCue) -> u32 {
        match cue {
            ToneCue::Dot | ToneCue::MenuMove | ToneCue::RoundLost => 1,
            ToneCue::Dash | ToneCue::MenuSelect | ToneCue::RoundWon => 2,
            ToneCue::SessionOver => 3,
        }
    }
}

impl ToneSink for TerminalBellSink {
    fn play(&mut self, cue: ToneCue) {
        let mut stdout = std::io::stdout();
        for i in 0..Self::pulses(cue) {
            if i > 0 {
                thread::sleep(Duration::from_millis(120));
            }
            let _ = stdout.write_all(b"\x07");
            let _ = stdout.flush();
        }
    }
}

/// Captures cues for assertions in headless tests.
#[derive(Clone, Default)]
pub struct RecordingSink {
    cues: Arc<Mutex<Vec<ToneCue>>>,
}

impl RecordingSink {
    pub fn cues(&self) -> Vec<ToneCue> {
        self.cues.lock().unwrap().clone()
    }
}

impl ToneSink for RecordingSink {
    fn play(&mut self, cue: ToneCue) {
        self.cues.lock().unwrap().push(cue);
    }
}

/// One-way channel into the audio worker. Dropping the player closes the
/// channel and lets the worker exit.
pub struct AudioPlayer {
    tx: Option<Sender<ToneCue>>,
}

impl AudioPlayer {
    pub fn spawn<S: ToneSink>(mut sink: S) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            while let Ok(cue) = rx.recv() {
                sink.play(cue);
            }
        });
        Self { tx: Some(tx) }
    }

    /// Sound off: every cue is dropped on the floor.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    pub fn play(&self, cue: ToneCue) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(cue);
        }
    }
}
