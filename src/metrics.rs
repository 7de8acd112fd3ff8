/// Characters that count as one word for words-per-minute.
pub const CHARS_PER_WORD: f64 = 5.0;

/// One metrics computation over the lines the user has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Whole seconds since the first keystroke, floored.
    pub elapsed_secs: u64,
    pub typed_chars: usize,
    pub correct_chars: usize,
    /// Percentage of typed characters that are positionally correct.
    pub accuracy: u32,
    /// Absent until at least one whole second has elapsed.
    pub wpm: Option<u32>,
}

impl Metrics {
    pub fn compute(elapsed_secs: u64, typed_chars: usize, correct_chars: usize) -> Self {
        Self {
            elapsed_secs,
            typed_chars,
            correct_chars,
            accuracy: accuracy(typed_chars, correct_chars),
            wpm: wpm(typed_chars, elapsed_secs),
        }
    }
}

pub fn accuracy(typed_chars: usize, correct_chars: usize) -> u32 {
    if typed_chars == 0 {
        return 100;
    }
    (correct_chars as f64 / typed_chars as f64 * 100.0).round() as u32
}

pub fn wpm(typed_chars: usize, elapsed_secs: u64) -> Option<u32> {
    if elapsed_secs == 0 {
        return None;
    }
    let words = typed_chars as f64 / CHARS_PER_WORD;
    let minutes = elapsed_secs as f64 / 60.0;
    Some((words / minutes).round() as u32)
}

/// The figures the host shows: timer, wpm and accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoreboard {
    pub elapsed_secs: u64,
    pub wpm: u32,
    pub accuracy: u32,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            elapsed_secs: 0,
            wpm: 0,
            accuracy: 100,
        }
    }
}

impl Scoreboard {
    /// Takes the latest figures; a computation without wpm keeps the shown one.
    pub fn apply(&mut self, metrics: &Metrics) {
        self.elapsed_secs = metrics.elapsed_secs;
        self.accuracy = metrics.accuracy;
        if let Some(wpm) = metrics.wpm {
            self.wpm = wpm;
        }
    }
}
