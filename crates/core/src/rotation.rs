//! Index rotation over a list of display items.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::util::timer_period;

/// Ordered items plus the index of the one on screen.
///
/// Pure state machine; [`RotationSequencer`] drives it from a timer.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationState<I> {
    items: Vec<I>,
    current_index: usize,
}

impl<I> Default for RotationState<I> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_index: 0,
        }
    }
}

impl<I: PartialEq> RotationState<I> {
    /// Creates a state positioned on the first item.
    pub fn new(items: Vec<I>) -> Self {
        Self {
            items,
            current_index: 0,
        }
    }

    /// Replaces the list. Returns `true` when the content changed, in which
    /// case the index is back at 0.
    pub fn set_items(&mut self, items: Vec<I>) -> bool {
        if self.items == items {
            return false;
        }
        self.items = items;
        self.current_index = 0;
        true
    }

    /// Advances one step, wrapping. Lists of zero or one item never move.
    pub fn tick(&mut self) {
        let len = self.items.len();
        if len <= 1 {
            return;
        }
        self.current_index = (self.current_index + 1) % len;
    }

    /// Jumps to `index`. Out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize) {
        if index < self.items.len() {
            self.current_index = index;
        }
    }

    /// Item on screen, `None` when empty.
    pub fn current(&self) -> Option<&I> {
        self.items.get(self.current_index)
    }

    /// `(index, len)` of the item on screen.
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            None
        } else {
            Some((self.current_index, self.items.len()))
        }
    }

    /// Current index; 0 for an empty list.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// All items in order.
    pub fn items(&self) -> &[I] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A [`RotationState`] advanced automatically every `interval_ms`.
///
/// The timer starts on construction when `interval_ms > 0` and stops on
/// [`RotationSequencer::dispose`] or drop. Must be created inside a tokio
/// runtime when a timer is wanted.
pub struct RotationSequencer<I> {
    state: Arc<Mutex<RotationState<I>>>,
    interval_ms: i64,
    timer: Option<JoinHandle<()>>,
}

fn lock<I>(state: &Mutex<RotationState<I>>) -> MutexGuard<'_, RotationState<I>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<I: PartialEq + Send + 'static> RotationSequencer<I> {
    /// Creates a sequencer over `items` and starts its timer.
    pub fn new(interval_ms: i64, items: Vec<I>) -> Self {
        let state = Arc::new(Mutex::new(RotationState::new(items)));
        let timer = timer_period(interval_ms).map(|period| {
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    lock(&state).tick();
                }
            })
        });

        Self {
            state,
            interval_ms,
            timer,
        }
    }

    /// Creates a sequencer with no items.
    pub fn empty(interval_ms: i64) -> Self {
        Self::new(interval_ms, Vec::new())
    }

    /// Configured advance period.
    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    /// See [`RotationState::set_items`].
    pub fn set_items(&self, items: Vec<I>) -> bool {
        lock(&self.state).set_items(items)
    }

    /// See [`RotationState::tick`].
    pub fn tick(&self) {
        lock(&self.state).tick();
    }

    /// See [`RotationState::go_to`].
    pub fn go_to(&self, index: usize) {
        lock(&self.state).go_to(index);
    }

    /// See [`RotationState::position`].
    pub fn position(&self) -> Option<(usize, usize)> {
        lock(&self.state).position()
    }

    /// Stops automatic advancing. Manual calls keep working.
    pub fn dispose(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Whether the timer is still running.
    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl<I: PartialEq + Clone + Send + 'static> RotationSequencer<I> {
    /// Clone of the item on screen.
    pub fn current(&self) -> Option<I> {
        lock(&self.state).current().cloned()
    }

    /// Clone of the whole state.
    pub fn snapshot(&self) -> RotationState<I> {
        lock(&self.state).clone()
    }
}

impl<I> Drop for RotationSequencer<I> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
