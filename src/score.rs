use crate::app_dirs::AppDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Substituted and written back when no readable score exists yet.
pub const DEFAULT_HIGH_SCORE: u32 = 64;

pub trait HighScoreStore {
    fn load(&self) -> u32;
    fn save(&self, score: u32) -> io::Result<()>;
}

/// High score persisted as decimal ASCII in a single text file.
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::high_score_path().unwrap_or_else(|| PathBuf::from("morse_hs.txt"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileHighScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HighScoreStore for FileHighScoreStore {
    /// Missing or corrupt files yield the default, which is persisted
    /// immediately so the next load sees a real file.
    fn load(&self) -> u32 {
        match fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
        {
            Some(score) => score,
            None => {
                let _ = self.save(DEFAULT_HIGH_SCORE);
                DEFAULT_HIGH_SCORE
            }
        }
    }

    fn save(&self, score: u32) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, score.to_string())
    }
}

/// In-memory store for headless tests; clones share the same score.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    inner: Arc<Mutex<u32>>,
}

impl MemoryHighScoreStore {
    pub fn with_score(score: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(score)),
        }
    }

    pub fn current(&self) -> u32 {
        *self.inner.lock().unwrap()
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> u32 {
        self.current()
    }

    fn save(&self, score: u32) -> io::Result<()> {
        *self.inner.lock().unwrap() = score;
        Ok(())
    }
}
