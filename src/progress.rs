//! Progress reporting for the streaming passes.
//!
//! [`Progress`] counts input lines and reports through the `log` facade:
//!
//! * a `debug!` tick every [`DEBUG_EVERY`] lines,
//! * an `info!` line every [`INFO_EVERY`] lines with the elapsed time and throughput.
//!
//! [`BlockTimer`] keeps an exponential moving average of the duration of the resampling
//! passes, so that long runs can report a stable per-block cost.
//!
//! With the `progress` feature an `indicatif` spinner is drawn on stderr as well.
use std::time::{Duration, Instant};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

/// Lines between two debug ticks
pub const DEBUG_EVERY: u64 = 50_000;

/// Lines between two info reports
pub const INFO_EVERY: u64 = 1_000_000;

/// Line counter with periodic log reports.
pub struct Progress {
    label: &'static str,
    lines: u64,
    start: Instant,
    #[cfg(feature = "progress")]
    spinner: ProgressBar,
}

impl Progress {
    pub fn new(label: &'static str) -> Self {
        #[cfg(feature = "progress")]
        let spinner = {
            let pb = ProgressBar::new_spinner();
            let template = "{spinner} {prefix}: {human_pos} lines | {per_sec} | {elapsed}";
            pb.set_style(
                ProgressStyle::with_template(template)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_prefix(label);
            pb.enable_steady_tick(Duration::from_millis(200));
            pb
        };

        Progress {
            label,
            lines: 0,
            start: Instant::now(),
            #[cfg(feature = "progress")]
            spinner,
        }
    }

    /// Lines counted so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Count one input line.
    #[inline]
    pub fn line(&mut self) {
        self.lines += 1;

        if self.lines % DEBUG_EVERY == 0 {
            debug!("{}: {} lines", self.label, self.lines);
            #[cfg(feature = "progress")]
            self.spinner.set_position(self.lines);
        }
        if self.lines % INFO_EVERY == 0 {
            let elapsed = self.start.elapsed();
            info!(
                "{}: {} lines read in {} ({:.0} lines/s)",
                self.label,
                self.lines,
                fmt_dur(elapsed),
                rate(self.lines, elapsed)
            );
        }
    }

    /// Close the reporter and return the total elapsed time.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        #[cfg(feature = "progress")]
        self.spinner.finish_and_clear();
        info!(
            "{}: done, {} lines in {}",
            self.label,
            self.lines,
            fmt_dur(elapsed)
        );
        elapsed
    }
}

/// Smoothed duration of repeated passes.
///
/// `ema ← α·dt + (1 − α)·ema`, the first sample initializes the average.
#[derive(Debug, Clone)]
pub struct BlockTimer {
    alpha: f64,
    ema_ns: f64,
    samples: u64,
}

impl BlockTimer {
    /// `alpha` in `(0, 1]`; 1 disables smoothing.
    pub fn new(alpha: f64) -> Self {
        BlockTimer {
            alpha: alpha.clamp(f64::EPSILON, 1.0),
            ema_ns: 0.0,
            samples: 0,
        }
    }

    /// Time `f`, fold its duration into the average and return its result.
    pub fn time<T>(&mut self, f: impl FnOnce() -> T) -> (T, Duration) {
        let start = Instant::now();
        let out = f();
        let dt = start.elapsed();
        self.record(dt);
        (out, dt)
    }

    pub fn record(&mut self, dt: Duration) {
        let dt_ns = dt.as_nanos() as f64;
        self.samples += 1;
        self.ema_ns = if self.samples == 1 {
            dt_ns
        } else {
            self.alpha * dt_ns + (1.0 - self.alpha) * self.ema_ns
        };
    }

    pub fn average(&self) -> Duration {
        Duration::from_nanos(self.ema_ns as u64)
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}

fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

/// Compact human-readable duration: `253µs`, `42ms`, `3.14s`.
pub fn fmt_dur(d: Duration) -> String {
    match d.as_micros() {
        us if us < 1_000 => format!("{us}µs"),
        _ if d.as_millis() < 1_000 => format!("{}ms", d.as_millis()),
        _ => format!("{:.2}s", d.as_secs_f64()),
    }
}

#[cfg(test)]
mod progress_test {
    use super::*;

    #[test]
    fn test_fmt_dur() {
        assert_eq!(fmt_dur(Duration::from_micros(253)), "253µs");
        assert_eq!(fmt_dur(Duration::from_millis(42)), "42ms");
        assert_eq!(fmt_dur(Duration::from_millis(3140)), "3.14s");
    }

    #[test]
    fn test_line_counter() {
        let mut p = Progress::new("test");
        for _ in 0..(DEBUG_EVERY + 3) {
            p.line();
        }
        assert_eq!(p.lines(), DEBUG_EVERY + 3);
        p.finish();
    }

    #[test]
    fn test_block_timer_average() {
        let mut t = BlockTimer::new(0.5);
        assert_eq!(t.average(), Duration::ZERO);

        t.record(Duration::from_millis(10));
        assert_eq!(t.average(), Duration::from_millis(10));
        t.record(Duration::from_millis(20));
        assert_eq!(t.average(), Duration::from_millis(15));
        assert_eq!(t.samples(), 2);

        let (v, _) = t.time(|| 1 + 1);
        assert_eq!(v, 2);
        assert_eq!(t.samples(), 3);
    }
}
