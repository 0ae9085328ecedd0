//! Progress reporting for long sampling and estimation loops.
//!
//! Components
//! -----------------
//! * [`Progress`] – counts finished units of work. With the `progress` feature it drives an
//!   `indicatif` bar showing the last and smoothed iteration times; without it, it only
//!   keeps the count.
//! * [`IterTimer`] – per-iteration durations with an **exponential moving average** (EMA):
//!   `ema ← α·dt + (1–α)·ema`, `α ∈ (0,1]`. The first tick initializes the average.
//! * [`fmt_dur`] – human-readable durations (`"253µs"`, `"42ms"`, `"3.14s"`).
use std::time::{Duration, Instant};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

pub struct IterTimer {
    last: Instant,
    ema_ns: f64,
    alpha: f64,
    count: u64,
}

impl IterTimer {
    pub fn new(alpha: f64) -> Self {
        Self {
            last: Instant::now(),
            ema_ns: 0.0,
            alpha,
            count: 0,
        }
    }

    #[inline]
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        self.count += 1;

        let dt_ns = dt.as_nanos() as f64;
        self.ema_ns = if self.count == 1 {
            dt_ns
        } else {
            self.alpha * dt_ns + (1.0 - self.alpha) * self.ema_ns
        };

        dt
    }

    #[inline]
    pub fn avg(&self) -> Duration {
        if self.count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.ema_ns as u64)
        }
    }
}

#[inline]
pub fn fmt_dur(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{us}µs")
    } else {
        let ms = d.as_millis();
        if ms < 1_000 {
            format!("{ms}ms")
        } else {
            let s = d.as_secs_f32();
            format!("{s:.2}s")
        }
    }
}

/// Counter of finished work units, optionally rendered as a terminal progress bar.
pub struct Progress {
    done: u64,
    timer: IterTimer,
    #[cfg(feature = "progress")]
    bar: ProgressBar,
}

impl Progress {
    pub fn new(total: u64) -> Self {
        #[cfg(feature = "progress")]
        let bar = {
            let bar = ProgressBar::new(total.max(1));
            if let Ok(style) = ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise} | {msg}",
            ) {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(200));
            bar
        };
        #[cfg(not(feature = "progress"))]
        let _ = total;

        Progress {
            done: 0,
            timer: IterTimer::new(0.2),
            #[cfg(feature = "progress")]
            bar,
        }
    }

    /// Mark one unit of work as finished.
    pub fn inc(&mut self) {
        self.done += 1;
        let last = self.timer.tick();

        #[cfg(feature = "progress")]
        {
            self.bar.set_message(format!(
                "last: {}, avg: {}",
                fmt_dur(last),
                fmt_dur(self.timer.avg())
            ));
            self.bar.inc(1);
        }
        #[cfg(not(feature = "progress"))]
        let _ = last;
    }

    pub fn done(&self) -> u64 {
        self.done
    }

    /// Smoothed duration of one unit of work.
    pub fn avg(&self) -> Duration {
        self.timer.avg()
    }

    pub fn finish(self) {
        #[cfg(feature = "progress")]
        {
            self.bar.disable_steady_tick();
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod progress_test {
    use super::*;

    #[test]
    fn test_fmt_dur_scales() {
        assert_eq!(fmt_dur(Duration::from_micros(253)), "253µs");
        assert_eq!(fmt_dur(Duration::from_millis(42)), "42ms");
        assert_eq!(fmt_dur(Duration::from_millis(3140)), "3.14s");
    }

    #[test]
    fn test_timer_first_tick_initializes_average() {
        let mut timer = IterTimer::new(0.2);
        assert_eq!(timer.avg(), Duration::from_nanos(0));
        let dt = timer.tick();
        assert_eq!(timer.avg().as_nanos(), dt.as_nanos());
    }

    #[test]
    fn test_progress_counts() {
        let mut progress = Progress::new(3);
        progress.inc();
        progress.inc();
        assert_eq!(progress.done(), 2);
        progress.finish();
    }
}
