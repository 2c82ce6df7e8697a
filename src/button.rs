/// How long a held key keeps reading as pressed after its last repeat
/// event, on terminals that never report key release.
pub const HOLD_DECAY_MS: u64 = 550;

/// Held-state of the keyboard key standing in for the game button. The
/// game samples it once per tick; key events update it in between.
///
/// With the keyboard-enhancement protocol the terminal reports real
/// release events and the state is exact. Without it, only press/repeat
/// events arrive, so a press is considered released once repeats stop
/// for `HOLD_DECAY_MS`.
#[derive(Debug)]
pub struct ButtonState {
    pressed: bool,
    release_events: bool,
    last_seen_ms: u64,
}

impl ButtonState {
    pub fn new(release_events: bool) -> Self {
        Self {
            pressed: false,
            release_events,
            last_seen_ms: 0,
        }
    }

    /// Key press or repeat arrived.
    pub fn on_key_down(&mut self, now_ms: u64) {
        self.pressed = true;
        self.last_seen_ms = now_ms;
    }

    /// Key release arrived (enhancement protocol only).
    pub fn on_key_up(&mut self) {
        self.pressed = false;
    }

    /// The per-tick sample fed to the classifier.
    pub fn sample(&mut self, now_ms: u64) -> bool {
        if self.pressed
            && !self.release_events
            && now_ms.saturating_sub(self.last_seen_ms) > HOLD_DECAY_MS
        {
            self.pressed = false;
        }
        self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_with_release_events() {
        let mut button = ButtonState::new(true);
        assert!(!button.sample(0));

        button.on_key_down(10);
        assert!(button.sample(20));
        // No decay in release-event mode, however long the hold.
        assert!(button.sample(5000));

        button.on_key_up();
        assert!(!button.sample(5010));
    }

    #[test]
    fn hold_decays_without_release_events() {
        let mut button = ButtonState::new(false);
        button.on_key_down(0);
        assert!(button.sample(100));
        assert!(button.sample(HOLD_DECAY_MS));
        assert!(!button.sample(HOLD_DECAY_MS + 1));
    }

    #[test]
    fn repeats_keep_the_hold_alive() {
        let mut button = ButtonState::new(false);
        button.on_key_down(0);
        button.on_key_down(400);
        button.on_key_down(800);
        assert!(button.sample(1200));
        assert!(!button.sample(800 + HOLD_DECAY_MS + 1));
    }
}
