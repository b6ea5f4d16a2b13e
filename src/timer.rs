//! Performance measurement tools.

use std::{
    fmt, mem,
    sync::Mutex,
    time::{Duration, Instant},
};

/// Smoothing factor for the exponentially weighted average of recorded times.
const EMA_ALPHA: f32 = 0.3;

/// A timer that can measure and average the time an operation takes.
///
/// Collected timings are averaged and reset when the timer is displayed using
/// `{}` ([`std::fmt::Display`]).
pub struct Timer {
    name: &'static str,
    state: Mutex<State>,
}

struct State {
    /// The current average time, or `None` before the first measurement.
    avg: Option<f32>,
    /// The number of time measurements that contributed to the current `avg`.
    count: usize,
}

impl Timer {
    /// Creates a new timer.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Mutex::new(State {
                avg: None,
                count: 0,
            }),
        }
    }

    /// Invokes a closure, measuring and recording the time it takes.
    pub fn time<T>(&self, timee: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        timee()
    }

    /// Starts timing an operation using a drop guard.
    ///
    /// When the returned [`TimerGuard`] is dropped, the time between the call
    /// to `start` and the drop is measured and recorded.
    pub fn start(&self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            timer: self,
        }
    }

    fn stop(&self, start: Instant) {
        let secs = start.elapsed().as_secs_f32();
        let mut state = self.state.lock().unwrap();
        state.avg = Some(match state.avg {
            Some(avg) => avg * (1.0 - EMA_ALPHA) + secs * EMA_ALPHA,
            None => secs,
        });
        state.count += 1;
    }
}

/// Displays the average recorded time and resets it.
impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut state = self.state.lock().unwrap();
        let avg = mem::take(&mut state.avg).unwrap_or(0.0);
        let len = mem::replace(&mut state.count, 0);
        let avg_ms = avg * 1000.0;

        write!(f, "{}: {len}x{avg_ms:.01}ms", self.name)
    }
}

/// Cloning a timer resets its collected timings.
impl Clone for Timer {
    fn clone(&self) -> Self {
        Self::new(self.name)
    }
}

/// Guard returned by [`Timer::start`]. Stops timing the operation when dropped.
pub struct TimerGuard<'a> {
    start: Instant,
    timer: &'a Timer,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.stop(self.start);
    }
}

/// Logs frames per second with optional extra data.
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Advances the frame counter by 1 and logs FPS if one second has passed.
    pub fn tick(&mut self) {
        self.tick_impl(String::new());
    }

    /// Advances the frame counter by 1 and logs FPS and `extra` data if one
    /// second has passed.
    pub fn tick_with<D: fmt::Display, I: IntoIterator<Item = D>>(&mut self, extra: I) {
        // Only format the extras when a log line is actually due.
        if self.start.elapsed() <= Duration::from_secs(1) {
            self.frames += 1;
            return;
        }

        let mut string = String::new();
        for item in extra {
            if string.is_empty() {
                string.push_str(" (");
            } else {
                string.push_str(", ");
            }
            string.push_str(&item.to_string());
        }
        if !string.is_empty() {
            string.push(')');
        }
        self.tick_impl(string);
    }

    fn tick_impl(&mut self, extra: String) {
        self.frames += 1;
        if self.start.elapsed() > Duration::from_secs(1) {
            log::debug!("{}: {} FPS{}", self.name, self.frames, extra);

            self.frames = 0;
            self.start = Instant::now();
        }
    }
}
