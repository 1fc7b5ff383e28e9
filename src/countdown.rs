use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    file::{self, SharedStore},
    mirror::DisplayMirror,
    time_format::{format_duration, DigitBuffer},
};

pub const STORE_KEY: &str = "timer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing changed.
    Ignored,
    Counting,
    /// Reached zero; the periodic trigger has to stop.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub running: bool,
    pub input_digits: DigitBuffer,
}

impl TimerState {
    pub fn new(digits: DigitBuffer) -> Self {
        Self {
            remaining_seconds: digits.seconds(),
            running: false,
            input_digits: digits,
        }
    }

    /// Reads persisted state field by field, keeping `defaults` for anything
    /// missing or malformed.
    pub fn from_value(value: &Value, defaults: TimerState) -> Self {
        let remaining_seconds = match value.get("remainingSeconds").and_then(Value::as_u64) {
            Some(seconds) => seconds,
            None => {
                debug!("persisted remainingSeconds unusable, using default");
                defaults.remaining_seconds
            }
        };
        let running = match value.get("running").and_then(Value::as_bool) {
            Some(running) => running,
            None => {
                debug!("persisted running flag unusable, using default");
                defaults.running
            }
        };
        let input_digits = match value
            .get("inputDigits")
            .and_then(Value::as_str)
            .and_then(DigitBuffer::parse)
        {
            Some(digits) => digits,
            None => {
                debug!("persisted inputDigits unusable, using default");
                defaults.input_digits
            }
        };

        Self {
            remaining_seconds,
            // a finished countdown cannot stay running
            running: running && remaining_seconds > 0,
            input_digits,
        }
    }
}

pub struct Countdown {
    state: TimerState,
    store: SharedStore,
    mirror: Box<dyn DisplayMirror>,
}

impl Countdown {
    pub fn new(store: SharedStore, mirror: Box<dyn DisplayMirror>, digits: DigitBuffer) -> Self {
        let defaults = TimerState::new(digits);
        let state = match file::load(&store, STORE_KEY) {
            Some(value) => TimerState::from_value(&value, defaults),
            None => defaults,
        };
        info!(
            remaining = state.remaining_seconds,
            running = state.running,
            "countdown restored"
        );

        let mut countdown = Self {
            state,
            store,
            mirror,
        };
        countdown.commit();
        countdown
    }

    pub fn phase(&self) -> Phase {
        if self.state.running {
            Phase::Running
        } else if self.state.remaining_seconds == 0 {
            Phase::Expired
        } else {
            Phase::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn remaining(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn formatted(&self) -> String {
        format_duration(self.remaining())
    }

    pub fn digits(&self) -> &DigitBuffer {
        &self.state.input_digits
    }

    pub fn start(&mut self) -> bool {
        if self.state.running || self.state.remaining_seconds == 0 {
            return false;
        }
        self.state.running = true;
        self.commit();
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.state.running {
            return false;
        }
        self.state.running = false;
        self.commit();
        true
    }

    pub fn toggle(&mut self) -> bool {
        if self.state.running {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.running || self.state.remaining_seconds == 0 {
            return TickOutcome::Ignored;
        }
        self.state.remaining_seconds -= 1;
        let outcome = if self.state.remaining_seconds == 0 {
            self.state.running = false;
            info!("countdown expired");
            TickOutcome::Expired
        } else {
            TickOutcome::Counting
        };
        self.commit();
        outcome
    }

    /// Stops the countdown and reloads it from the digit buffer.
    pub fn reset(&mut self) {
        self.state.remaining_seconds = self.state.input_digits.seconds();
        self.state.running = false;
        self.commit();
    }

    pub fn push_digit(&mut self, c: char) -> bool {
        if !self.state.input_digits.push(c) {
            return false;
        }
        self.commit();
        true
    }

    pub fn pop_digit(&mut self) {
        self.state.input_digits.pop();
        self.commit();
    }

    pub fn clear_digits(&mut self) {
        self.state.input_digits.clear();
        self.commit();
    }

    fn commit(&mut self) {
        file::persist(&self.store, STORE_KEY, &self.state);
        let time = self.formatted();
        self.mirror.show(&time);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.mirror.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{load, shared, KeyValueStore, MemoryStore};
    use serde_json::json;
    use std::{cell::RefCell, rc::Rc};

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl DisplayMirror for Recorder {
        fn show(&mut self, text: &str) {
            self.0.borrow_mut().push(text.to_string());
        }

        fn restore(&mut self) {
            self.0.borrow_mut().push("<restored>".to_string());
        }
    }

    fn countdown_with(store: SharedStore) -> (Countdown, Recorder) {
        let recorder = Recorder::default();
        let countdown = Countdown::new(store, Box::new(recorder.clone()), DigitBuffer::default());
        (countdown, recorder)
    }

    fn fresh() -> (Countdown, Recorder) {
        countdown_with(shared(MemoryStore::default()))
    }

    #[test]
    fn defaults_to_one_minute_idle() {
        let (countdown, _) = fresh();
        assert_eq!(countdown.remaining(), 60);
        assert_eq!(countdown.phase(), Phase::Idle);
        assert_eq!(countdown.digits().as_str(), "000100");
    }

    #[test]
    fn runs_down_to_expired() {
        let (mut countdown, _) = fresh();
        assert!(countdown.start());
        assert_eq!(countdown.phase(), Phase::Running);

        for _ in 0..59 {
            assert_eq!(countdown.tick(), TickOutcome::Counting);
        }
        assert_eq!(countdown.tick(), TickOutcome::Expired);
        assert_eq!(countdown.remaining(), 0);
        assert_eq!(countdown.phase(), Phase::Expired);

        assert_eq!(countdown.tick(), TickOutcome::Ignored);
        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.start());
    }

    #[test]
    fn pause_keeps_time_and_ignores_ticks() {
        let (mut countdown, _) = fresh();
        countdown.start();
        countdown.tick();
        assert!(countdown.pause());
        assert_eq!(countdown.phase(), Phase::Idle);
        assert_eq!(countdown.tick(), TickOutcome::Ignored);
        assert_eq!(countdown.remaining(), 59);
        assert!(!countdown.pause());
    }

    #[test]
    fn toggle_flips_between_running_and_idle() {
        let (mut countdown, _) = fresh();
        assert!(countdown.toggle());
        assert!(countdown.is_running());
        assert!(countdown.toggle());
        assert!(!countdown.is_running());
    }

    #[test]
    fn reset_reads_the_digit_buffer() {
        let (mut countdown, _) = fresh();
        countdown.start();
        for c in "13000".chars() {
            countdown.push_digit(c);
        }
        assert_eq!(countdown.remaining(), 60);

        countdown.reset();
        assert_eq!(countdown.remaining(), 5400);
        assert_eq!(countdown.phase(), Phase::Idle);
    }

    #[test]
    fn digit_editing_ignores_non_digits() {
        let (mut countdown, _) = fresh();
        assert!(!countdown.push_digit('a'));
        countdown.pop_digit();
        assert_eq!(countdown.digits().as_str(), "000010");
        countdown.clear_digits();
        countdown.reset();
        assert_eq!(countdown.phase(), Phase::Expired);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let store = shared(MemoryStore::default());
        let (mut countdown, _) = countdown_with(store.clone());
        countdown.start();
        countdown.tick();

        assert_eq!(
            load(&store, STORE_KEY),
            Some(json!({ "remainingSeconds": 59, "running": true, "inputDigits": "000100" }))
        );

        drop(countdown);
        let (restored, _) = countdown_with(store);
        assert_eq!(restored.remaining(), 59);
        assert_eq!(restored.phase(), Phase::Running);
    }

    #[test]
    fn malformed_field_falls_back_alone() {
        let store = shared(MemoryStore::default());
        store
            .lock()
            .unwrap()
            .set(
                STORE_KEY,
                json!({ "remainingSeconds": "12", "running": false, "inputDigits": "013000" }),
            )
            .unwrap();

        let (countdown, _) = countdown_with(store);
        assert_eq!(countdown.remaining(), 60);
        assert_eq!(countdown.digits().as_str(), "013000");
        assert!(!countdown.is_running());
    }

    #[test]
    fn unknown_shape_uses_defaults() {
        let store = shared(MemoryStore::default());
        store.lock().unwrap().set(STORE_KEY, json!([1, 2])).unwrap();

        let (countdown, _) = countdown_with(store);
        assert_eq!(countdown.remaining(), 60);
        assert_eq!(countdown.digits(), &DigitBuffer::default());
        assert_eq!(countdown.phase(), Phase::Idle);
    }

    #[test]
    fn expired_state_never_restores_as_running() {
        let store = shared(MemoryStore::default());
        store
            .lock()
            .unwrap()
            .set(STORE_KEY, json!({ "remainingSeconds": 0, "running": true }))
            .unwrap();

        let (countdown, _) = countdown_with(store);
        assert_eq!(countdown.phase(), Phase::Expired);
    }

    #[test]
    fn mirror_follows_and_restores() {
        let (mut countdown, recorder) = fresh();
        countdown.start();
        countdown.tick();
        drop(countdown);

        let shown = recorder.0.borrow();
        assert_eq!(shown.first().map(String::as_str), Some("0:01:00"));
        assert!(shown.iter().any(|t| t == "0:00:59"));
        assert_eq!(shown.last().map(String::as_str), Some("<restored>"));
    }
}
