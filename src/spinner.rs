//! Weighted spinner: a list of labelled weights and the last winner.
//!
//! Outside edit mode the wheel shows an even split and spins against it, so
//! stored weights only take effect while editing.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    anim::{lerp, Timeline},
    file::{self, SharedStore},
    selection::{total_weight, weighted_pick},
};

pub const STORE_KEY: &str = "spinner";

const DISPLAY_TOTAL: f64 = 100.0;
const FULL_TURN: f64 = 360.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpinnerState {
    pub choices: Vec<Choice>,
    pub result: Option<String>,
}

impl SpinnerState {
    pub fn from_value(value: &Value) -> Self {
        let choices = match value.get("choices").and_then(Value::as_array) {
            Some(entries) => entries.iter().filter_map(choice_from_value).collect(),
            None => {
                debug!("persisted choices unusable, starting empty");
                Vec::new()
            }
        };
        let result = value
            .get("result")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self { choices, result }
    }
}

fn choice_from_value(value: &Value) -> Option<Choice> {
    let label = value.get("label")?.as_str()?.trim();
    let weight = value.get("weight")?.as_f64()?;
    if label.is_empty() || !weight.is_finite() || weight < 0.0 {
        debug!(?value, "dropping invalid persisted choice");
        return None;
    }
    Some(Choice {
        label: label.to_string(),
        weight,
    })
}

/// Weights as shown: the stored ones in edit mode, an even split otherwise.
pub fn displayed_weights(choices: &[Choice], edit_mode: bool) -> Vec<f64> {
    if edit_mode {
        return choices.iter().map(|c| c.weight).collect();
    }
    if choices.is_empty() {
        return Vec::new();
    }
    let even = (DISPLAY_TOTAL / choices.len() as f64).round();
    vec![even; choices.len()]
}

pub fn parse_weight(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w >= 0.0)
}

/// Angular span `[start, end)` in degrees of every segment, clockwise from
/// the pointer at 0.
pub fn segment_spans(weights: &[f64]) -> Vec<(f64, f64)> {
    let total = total_weight(weights);
    let mut start = 0.0;
    weights
        .iter()
        .map(|w| {
            let span = if total > 0.0 && *w > 0.0 {
                w / total * FULL_TURN
            } else {
                0.0
            };
            let segment = (start, start + span);
            start += span;
            segment
        })
        .collect()
}

/// Rotation that moves forward from `current` by `full_rotations` turns and
/// then on until the middle of `winner` sits under the pointer.
pub fn rotation_target(current: f64, weights: &[f64], winner: usize, full_rotations: u32) -> f64 {
    let spans = segment_spans(weights);
    let center = spans
        .get(winner)
        .map(|(start, end)| (start + end) / 2.0)
        .unwrap_or(0.0);
    let aligned = (FULL_TURN - center).rem_euclid(FULL_TURN);
    let delta = (aligned - current.rem_euclid(FULL_TURN)).rem_euclid(FULL_TURN);

    current + f64::from(full_rotations.max(1)) * FULL_TURN + delta
}

/// Index of the segment under the pointer after rotating by `rotation`.
pub fn segment_at(weights: &[f64], rotation: f64) -> Option<usize> {
    let angle = (-rotation).rem_euclid(FULL_TURN);
    let spans = segment_spans(weights);
    spans
        .iter()
        .position(|(start, end)| end > start && angle >= *start && angle < *end)
        .or_else(|| spans.iter().rposition(|(start, end)| end > start))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    pub index: usize,
    pub label: String,
    pub target: f64,
}

#[derive(Debug, Clone)]
struct SpinAnimation {
    from: f64,
    to: f64,
    timeline: Timeline,
}

#[derive(Debug, Clone, Copy)]
pub struct SpinSettings {
    pub full_rotations: u32,
    pub duration_secs: f64,
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self {
            full_rotations: 5,
            duration_secs: 3.0,
        }
    }
}

pub struct Spinner {
    state: SpinnerState,
    edit_mode: bool,
    settings: SpinSettings,
    angle: f64,
    animation: Option<SpinAnimation>,
    store: SharedStore,
}

impl Spinner {
    pub fn new(store: SharedStore, settings: SpinSettings) -> Self {
        let state = file::load(&store, STORE_KEY)
            .map(|value| SpinnerState::from_value(&value))
            .unwrap_or_default();
        info!(choices = state.choices.len(), "spinner restored");

        Self {
            state,
            edit_mode: false,
            settings,
            angle: 0.0,
            animation: None,
            store,
        }
    }

    pub fn choices(&self) -> &[Choice] {
        &self.state.choices
    }

    pub fn result(&self) -> Option<&str> {
        self.state.result.as_deref()
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn toggle_edit_mode(&mut self) {
        self.edit_mode = !self.edit_mode;
    }

    pub fn displayed_weights(&self) -> Vec<f64> {
        displayed_weights(&self.state.choices, self.edit_mode)
    }

    /// Appends a choice. Ignored unless the label is non-empty and the
    /// weight is a positive number.
    pub fn add_choice(&mut self, label: &str, weight_text: &str) -> bool {
        let label = label.trim();
        let weight = match parse_weight(weight_text) {
            Some(weight) if weight > 0.0 => weight,
            _ => return false,
        };
        if label.is_empty() {
            return false;
        }
        self.state.choices.push(Choice {
            label: label.to_string(),
            weight,
        });
        self.commit();
        true
    }

    /// Changes a stored weight. Only allowed in edit mode.
    pub fn set_weight(&mut self, index: usize, weight_text: &str) -> bool {
        if !self.edit_mode {
            return false;
        }
        let weight = match parse_weight(weight_text) {
            Some(weight) => weight,
            None => return false,
        };
        match self.state.choices.get_mut(index) {
            Some(choice) => choice.weight = weight,
            None => return false,
        }
        self.commit();
        true
    }

    pub fn remove_choice(&mut self, index: usize) -> bool {
        if index >= self.state.choices.len() {
            return false;
        }
        self.state.choices.remove(index);
        let stale = match &self.state.result {
            Some(result) => !self.state.choices.iter().any(|c| &c.label == result),
            None => false,
        };
        if stale {
            self.state.result = None;
        }
        self.commit();
        true
    }

    /// Picks a winner against the displayed weights. With nothing to pick
    /// from, any previous result is cleared and `None` is returned.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64) -> Option<SpinOutcome> {
        let weights = self.displayed_weights();
        let index = match weighted_pick(&weights, rng) {
            Some(index) => index,
            None => {
                if self.state.result.take().is_some() {
                    self.commit();
                }
                return None;
            }
        };

        let label = self.state.choices[index].label.clone();
        let current = self.angle(now);
        let target = rotation_target(current, &weights, index, self.settings.full_rotations);

        let mut timeline = Timeline::new(self.settings.duration_secs);
        timeline.start(now);
        self.animation = Some(SpinAnimation {
            from: current,
            to: target,
            timeline,
        });
        self.angle = target;

        info!(%label, index, "spin result");
        self.state.result = Some(label.clone());
        self.commit();

        Some(SpinOutcome {
            index,
            label,
            target,
        })
    }

    /// Wheel rotation in degrees at `now`.
    pub fn angle(&self, now: f64) -> f64 {
        match &self.animation {
            Some(animation) => {
                let mut timeline = animation.timeline.clone();
                timeline.update(now);
                lerp(animation.from, animation.to, timeline.eased_progress())
            }
            None => self.angle,
        }
    }

    /// Advances the animation; returns true while it is still running.
    pub fn animate(&mut self, now: f64) -> bool {
        let done = match &mut self.animation {
            Some(animation) => {
                animation.timeline.update(now);
                animation.timeline.is_complete()
            }
            None => return false,
        };
        if done {
            self.animation = None;
        }
        !done
    }

    pub fn is_spinning(&self) -> bool {
        self.animation.is_some()
    }

    /// The choice currently under the pointer.
    pub fn pointer_index(&self, now: f64) -> Option<usize> {
        segment_at(&self.displayed_weights(), self.angle(now))
    }

    fn commit(&self) {
        file::persist(&self.store, STORE_KEY, &self.state);
    }
}
