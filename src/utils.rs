use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Run statistics with all-time totals and a 1 s sliding-window sample rate.
#[derive(Debug)]
pub struct Counter {
    /// All-time rows (samples per channel) written.
    pub n_rows: usize,
    /// All-time blocks written.
    pub n_blocks: usize,
    /// Time of creation or last reset.
    pub t_begin: Instant,

    window: Duration,
    entries: VecDeque<(Instant, usize)>,
    rows_in_window: usize,
}

impl Default for Counter {
    fn default() -> Self {
        Counter {
            n_rows: 0,
            n_blocks: 0,
            t_begin: Instant::now(),
            window: Duration::from_secs(1),
            entries: VecDeque::new(),
            rows_in_window: 0,
        }
    }
}

impl Counter {
    pub fn new() -> Self {
        Default::default()
    }

    /// Samples per second over the sliding window, in kS/s.
    pub fn rate(&self) -> f64 {
        let secs = self.window.as_secs_f64().max(1e-6);
        (self.rows_in_window as f64 / secs) / 1000.0
    }

    /// Record one written block of `rows` samples.
    pub fn increment(&mut self, rows: usize) {
        let now = Instant::now();

        self.n_rows += rows;
        self.n_blocks += 1;

        self.entries.push_back((now, rows));
        self.rows_in_window += rows;

        while let Some(&(ts, n)) = self.entries.front() {
            if now.duration_since(ts) > self.window {
                self.entries.pop_front();
                self.rows_in_window -= n;
            } else {
                break;
            }
        }
    }

    pub fn reset(&mut self) {
        self.n_rows = 0;
        self.n_blocks = 0;
        self.t_begin = Instant::now();
        self.entries.clear();
        self.rows_in_window = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate() {
        let mut counter = Counter::new();
        counter.increment(100);
        counter.increment(100);
        assert_eq!(counter.n_rows, 200);
        assert_eq!(counter.n_blocks, 2);
        assert!(counter.rate() > 0.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut counter = Counter::new();
        counter.increment(50);
        counter.reset();
        assert_eq!(counter.n_rows, 0);
        assert_eq!(counter.n_blocks, 0);
        assert_eq!(counter.rate(), 0.0);
    }
}
