//! Keyboard-driven paddle control and the repeated-press quit gesture

use std::any::Any;
use std::collections::HashMap;

use crate::{Action, PongPlayer, Seat};

/// Key name to paddle direction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBindings(HashMap<String, Action>);

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Up/down arrows
    pub fn arrows() -> Self {
        Self::new()
            .bind("ArrowUp", Action::MoveUp)
            .bind("ArrowDown", Action::MoveDown)
    }

    /// Q/A, for the second player sharing a keyboard
    pub fn qa() -> Self {
        Self::new()
            .bind("q", Action::MoveUp)
            .bind("Q", Action::MoveUp)
            .bind("a", Action::MoveDown)
            .bind("A", Action::MoveDown)
    }

    pub fn bind(mut self, key: impl Into<String>, action: Action) -> Self {
        self.0.insert(key.into(), action);
        self
    }

    pub fn get(&self, key: &str) -> Option<Action> {
        self.0.get(key).copied()
    }
}

/// Local player steering with held keys
#[derive(Debug, Clone)]
pub struct KeyboardPlayer {
    seat: Seat,
    bindings: KeyBindings,
}

impl KeyboardPlayer {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            seat: Seat::new(),
            bindings,
        }
    }

    pub fn named(name: impl Into<String>, bindings: KeyBindings) -> Self {
        Self {
            seat: Seat::named(name),
            bindings,
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Update from the keys currently held, oldest first.
    ///
    /// The most recently pressed bound key decides; no bound key means stop.
    /// Returns true if the paddle action changed.
    pub fn set_keys_down<S: AsRef<str>>(&mut self, keys_down: &[S]) -> bool {
        let action = keys_down
            .iter()
            .rev()
            .find_map(|key| self.bindings.get(key.as_ref()))
            .unwrap_or(Action::Stop);
        self.seat.emitter.emit(action)
    }
}

impl PongPlayer for KeyboardPlayer {
    fn seat(&self) -> &Seat {
        &self.seat
    }

    fn seat_mut(&mut self) -> &mut Seat {
        &mut self.seat
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Fixed-capacity ring of timestamps; pushing into a full ring evicts the oldest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampRing<const N: usize> {
    slots: [u64; N],
    start: usize,
    len: usize,
}

impl<const N: usize> Default for TimestampRing<N> {
    fn default() -> Self {
        Self {
            slots: [0; N],
            start: 0,
            len: 0,
        }
    }
}

impl<const N: usize> TimestampRing<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the evicted timestamp, if the ring was full
    pub fn push(&mut self, ts: u64) -> Option<u64> {
        if N == 0 {
            return Some(ts);
        }
        if self.len < N {
            self.slots[(self.start + self.len) % N] = ts;
            self.len += 1;
            None
        } else {
            let evicted = self.slots[self.start];
            self.slots[self.start] = ts;
            self.start = (self.start + 1) % N;
            Some(evicted)
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn oldest(&self) -> Option<u64> {
        (self.len > 0).then(|| self.slots[self.start])
    }

    pub fn newest(&self) -> Option<u64> {
        (self.len > 0).then(|| self.slots[(self.start + self.len - 1) % N])
    }

    /// Newest minus oldest
    pub fn span(&self) -> Option<u64> {
        Some(self.newest()?.saturating_sub(self.oldest()?))
    }

    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }
}

/// Outcome of one press of the end-game key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitProgress {
    /// First press in a while; the player should be told to keep pressing
    Hint,
    Pending,
    Quit,
}

pub const QUIT_PRESSES: usize = 3;
pub const QUIT_WINDOW_MS: u64 = 3000;

/// Ends the game when the end key is pressed [`QUIT_PRESSES`] times within
/// [`QUIT_WINDOW_MS`]
#[derive(Debug, Clone, Default)]
pub struct QuitGesture {
    presses: TimestampRing<QUIT_PRESSES>,
}

impl QuitGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, now_ms: u64) -> QuitProgress {
        // Presses that fell out of the window no longer count
        if let Some(newest) = self.presses.newest() {
            if now_ms.saturating_sub(newest) > QUIT_WINDOW_MS {
                self.presses.clear();
            }
        }
        self.presses.push(now_ms);

        match self.presses.span() {
            Some(span) if self.presses.is_full() && span <= QUIT_WINDOW_MS => {
                self.presses.clear();
                QuitProgress::Quit
            }
            _ if self.presses.len() == 1 => QuitProgress::Hint,
            _ => QuitProgress::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionSink;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_last_bound_key_wins() {
        let mut player = KeyboardPlayer::new(KeyBindings::arrows());
        assert!(player.set_keys_down(&["ArrowUp", "x", "ArrowDown"]));
        assert_eq!(player.seat().emitter.last(), Some(Action::MoveDown));

        assert!(player.set_keys_down(&["ArrowDown", "ArrowUp"]));
        assert_eq!(player.seat().emitter.last(), Some(Action::MoveUp));
    }

    #[test]
    fn test_unbound_keys_stop_the_paddle() {
        let mut player = KeyboardPlayer::new(KeyBindings::qa());
        player.set_keys_down(&["q"]);
        player.set_keys_down(&["ArrowUp"]);
        assert_eq!(player.seat().emitter.last(), Some(Action::Stop));
    }

    #[test]
    fn test_held_key_is_sent_once() {
        let (tx, rx) = unbounded();
        let mut player = KeyboardPlayer::new(KeyBindings::arrows());
        player.set_on_action_changed(ActionSink::new(crate::Side::Left, tx));

        player.set_keys_down(&["ArrowUp"]);
        player.set_keys_down(&["ArrowUp"]);
        player.set_keys_down(&["ArrowUp", "z"]);

        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let mut ring = TimestampRing::<3>::new();
        assert_eq!(ring.push(10), None);
        assert_eq!(ring.push(20), None);
        assert_eq!(ring.push(30), None);
        assert!(ring.is_full());
        assert_eq!(ring.push(40), Some(10));
        assert_eq!(ring.oldest(), Some(20));
        assert_eq!(ring.newest(), Some(40));
        assert_eq!(ring.span(), Some(20));
    }

    #[test]
    fn test_empty_ring_has_no_span() {
        let ring = TimestampRing::<2>::new();
        assert!(ring.is_empty());
        assert_eq!(ring.span(), None);
    }

    #[test]
    fn test_three_quick_presses_quit() {
        let mut gesture = QuitGesture::new();
        assert_eq!(gesture.press(1_000), QuitProgress::Hint);
        assert_eq!(gesture.press(2_000), QuitProgress::Pending);
        assert_eq!(gesture.press(3_500), QuitProgress::Quit);
        // Gesture starts over afterwards
        assert_eq!(gesture.press(3_600), QuitProgress::Hint);
    }

    #[test]
    fn test_slow_presses_do_not_quit() {
        let mut gesture = QuitGesture::new();
        gesture.press(0);
        gesture.press(2_000);
        assert_eq!(gesture.press(3_500), QuitProgress::Pending);
        assert_eq!(gesture.press(4_000), QuitProgress::Quit);
    }

    #[test]
    fn test_long_pause_restarts_the_gesture() {
        let mut gesture = QuitGesture::new();
        gesture.press(0);
        gesture.press(500);
        assert_eq!(gesture.press(10_000), QuitProgress::Hint);
    }
}
