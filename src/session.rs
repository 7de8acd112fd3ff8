use std::time::Instant;

use crate::metrics::{Metrics, Scoreboard};
use crate::runtime::MetricsTimer;
use crate::wrap::wrap;

/// How a single sample character looks against what was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Untyped,
}

/// Compares `typed` against `sample` position by position.
///
/// Always yields one state per sample character; extra typed characters have no
/// sample position and are not reported.
pub fn classify(sample: &str, typed: &str) -> Vec<CharState> {
    let mut typed = typed.chars();
    sample
        .chars()
        .map(|expected| match typed.next() {
            None => CharState::Untyped,
            Some(c) if c == expected => CharState::Correct,
            Some(_) => CharState::Incorrect,
        })
        .collect()
}

fn count_correct(sample: &str, typed: &str) -> usize {
    sample
        .chars()
        .zip(typed.chars())
        .filter(|(expected, c)| expected == c)
        .count()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    pub typed: String,
    pub locked: bool,
    pub completed: bool,
}

impl InputLine {
    fn open() -> Self {
        Self::default()
    }

    fn closed() -> Self {
        Self {
            locked: true,
            ..Self::default()
        }
    }
}

/// Result of feeding one input event to the active line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystrokeOutcome {
    pub states: Vec<CharState>,
    /// The line now matches its sample and is locked.
    pub completed: bool,
    /// Set when this keystroke completed the last line.
    pub final_metrics: Option<Metrics>,
}

/// All mutable state of one typing run over a fixed set of sample lines.
#[derive(Debug, Clone)]
pub struct TypingSession {
    lines: Vec<String>,
    inputs: Vec<InputLine>,
    active: usize,
    started_at: Option<Instant>,
    timer: MetricsTimer,
    scoreboard: Scoreboard,
}

impl TypingSession {
    pub fn new(lines: Vec<String>) -> Self {
        let inputs = initial_inputs(lines.len());
        Self {
            lines,
            inputs,
            active: 0,
            started_at: None,
            timer: MetricsTimer::default(),
            scoreboard: Scoreboard::default(),
        }
    }

    pub fn from_text(text: &str, max_chars: usize) -> Self {
        Self::new(wrap(text, max_chars))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the unlocked line, or None once every line is completed.
    pub fn active_line(&self) -> Option<usize> {
        (self.active < self.lines.len()).then_some(self.active)
    }

    pub fn input(&self, index: usize) -> Option<&InputLine> {
        self.inputs.get(index)
    }

    /// Classification of a sample line against whatever is typed for it.
    pub fn line_states(&self, index: usize) -> Vec<CharState> {
        match (self.lines.get(index), self.inputs.get(index)) {
            (Some(sample), Some(input)) => classify(sample, &input.typed),
            _ => Vec::new(),
        }
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.active >= self.lines.len()
    }

    pub fn timer(&self) -> &MetricsTimer {
        &self.timer
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    pub fn on_keystroke(&mut self, line_index: usize, typed: &str) -> Option<KeystrokeOutcome> {
        self.on_keystroke_at(line_index, typed, Instant::now())
    }

    /// Feeds the full current value of input line `line_index`.
    ///
    /// Only the active line accepts input; anything else returns None and leaves
    /// the session untouched.
    pub fn on_keystroke_at(
        &mut self,
        line_index: usize,
        typed: &str,
        now: Instant,
    ) -> Option<KeystrokeOutcome> {
        if self.active_line() != Some(line_index) {
            log::debug!("ignoring input for inactive line {line_index}");
            return None;
        }

        if self.started_at.is_none() {
            log::info!("session started with {} lines", self.lines.len());
            self.started_at = Some(now);
            self.timer.arm(now);
        }

        let sample = &self.lines[line_index];
        let states = classify(sample, typed);
        let completed = typed == sample.as_str();

        let input = &mut self.inputs[line_index];
        input.typed.clear();
        input.typed.push_str(typed);

        let mut final_metrics = None;
        if completed {
            input.completed = true;
            input.locked = true;
            self.active += 1;
            log::debug!("line {line_index} completed");

            if let Some(next) = self.inputs.get_mut(self.active) {
                next.locked = false;
            } else {
                self.timer.cancel();
                let metrics = self.tick_at(now);
                log::info!(
                    "session finished: {} wpm, {}% accuracy in {}s",
                    metrics.wpm.unwrap_or(0),
                    metrics.accuracy,
                    metrics.elapsed_secs
                );
                final_metrics = Some(metrics);
            }
        }

        Some(KeystrokeOutcome {
            states,
            completed,
            final_metrics,
        })
    }

    pub fn tick(&mut self) -> Metrics {
        self.tick_at(Instant::now())
    }

    /// Recomputes metrics over completed lines and the active line and publishes
    /// them to the scoreboard.
    pub fn tick_at(&mut self, now: Instant) -> Metrics {
        let elapsed_secs = self
            .started_at
            .map(|start| now.saturating_duration_since(start).as_secs())
            .unwrap_or(0);

        let reached = (self.active + 1).min(self.lines.len());
        let (typed_chars, correct_chars) = self.lines[..reached]
            .iter()
            .zip(&self.inputs)
            .fold((0, 0), |(typed, correct), (sample, input)| {
                (
                    typed + input.typed.chars().count(),
                    correct + count_correct(sample, &input.typed),
                )
            });

        let metrics = Metrics::compute(elapsed_secs, typed_chars, correct_chars);
        self.scoreboard.apply(&metrics);
        metrics
    }

    /// Runs the periodic metrics computation when the armed timer is due.
    pub fn poll_timer(&mut self, now: Instant) -> Option<Metrics> {
        if self.timer.fire(now) {
            Some(self.tick_at(now))
        } else {
            None
        }
    }

    /// Back to a fresh run over the same sample lines.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.started_at = None;
        self.active = 0;
        self.inputs = initial_inputs(self.lines.len());
        self.scoreboard = Scoreboard::default();
    }
}

fn initial_inputs(count: usize) -> Vec<InputLine> {
    (0..count)
        .map(|i| {
            if i == 0 {
                InputLine::open()
            } else {
                InputLine::closed()
            }
        })
        .collect()
}
