//! Horizontal section navigator
//!
//! [`ScrollController`] owns the horizontal offset of the section strip and
//! the authoritative current-section index. It reconciles three inputs:
//!
//! - horizontal-dominant wheel events, which pan the strip directly;
//! - vertical wheel events, accumulated and committed as a one-section step
//!   after a quiet period;
//! - explicit [`ScrollController::navigate_to`] commands from the navigation
//!   bar, which animate the strip and suppress the passive position signal
//!   until the animation has settled.
//!
//! Time is passed in explicitly (`now: Instant`) so the controller can be
//! driven from the UI tick and tested without sleeping.

use std::time::{Duration, Instant};

use tracing::debug;

/// A wheel gesture. Positive `delta_y` scrolls towards later sections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
}

impl WheelEvent {
    pub fn new(delta_x: f64, delta_y: f64) -> Self {
        Self { delta_x, delta_y }
    }

    pub fn vertical(delta_y: f64) -> Self {
        Self::new(0.0, delta_y)
    }

    pub fn horizontal(delta_x: f64) -> Self {
        Self::new(delta_x, 0.0)
    }
}

/// How a wheel event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// Applied as a direct horizontal pan
    Panned,
    /// Added to the vertical accumulator; a commit is pending
    Accumulated,
    /// Below the noise threshold; default handling applies
    Ignored,
}

impl WheelOutcome {
    /// Whether the default page scroll should be suppressed
    pub fn consumed(&self) -> bool {
        !matches!(self, WheelOutcome::Ignored)
    }
}

/// Tuning parameters for the navigator
#[derive(Debug, Clone)]
pub struct ScrollConfig {
    /// Vertical deltas at or below this magnitude are ignored
    pub noise_threshold: f64,
    /// Accumulated vertical delta needed to step one section
    pub commit_threshold: f64,
    /// Multiplier applied to horizontal deltas when panning
    pub horizontal_gain: f64,
    /// Quiet period before accumulated vertical delta is evaluated
    pub debounce: Duration,
    /// How long passive position signals are ignored after a navigation command
    pub suppression: Duration,
    /// Length of the smooth scroll animation
    pub animation: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            noise_threshold: 5.0,
            commit_threshold: 50.0,
            horizontal_gain: 2.0,
            debounce: Duration::from_millis(150),
            suppression: Duration::from_millis(1000),
            animation: Duration::from_millis(400),
        }
    }
}

/// In-flight smooth scroll
#[derive(Debug, Clone, Copy)]
struct Animation {
    from: f64,
    to: f64,
    started: Instant,
}

/// Owns the strip offset and the current section index
#[derive(Debug, Clone)]
pub struct ScrollController {
    config: ScrollConfig,
    section_count: usize,
    section_width: f64,
    current: usize,
    offset: f64,
    accumulator: f64,
    /// Single-flight debounce: restarting replaces the deadline
    commit_deadline: Option<Instant>,
    /// Passive scroll signals before this instant are discarded
    suppress_until: Option<Instant>,
    animation: Option<Animation>,
}

impl ScrollController {
    pub fn new(section_count: usize, section_width: f64) -> Self {
        Self::with_config(section_count, section_width, ScrollConfig::default())
    }

    pub fn with_config(section_count: usize, section_width: f64, config: ScrollConfig) -> Self {
        Self {
            config,
            section_count,
            section_width: section_width.max(1.0),
            current: 0,
            offset: 0.0,
            accumulator: 0.0,
            commit_deadline: None,
            suppress_until: None,
            animation: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn section_count(&self) -> usize {
        self.section_count
    }

    pub fn section_width(&self) -> f64 {
        self.section_width
    }

    /// Current horizontal offset of the strip
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Unconsumed vertical wheel delta
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn has_pending_commit(&self) -> bool {
        self.commit_deadline.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Whether passive scroll signals are currently discarded
    pub fn is_suppressed(&self, now: Instant) -> bool {
        self.suppress_until.is_some_and(|until| now < until)
    }

    fn last_index(&self) -> usize {
        self.section_count.saturating_sub(1)
    }

    fn max_offset(&self) -> f64 {
        self.last_index() as f64 * self.section_width
    }

    /// Section whose left edge is nearest to the current offset
    pub fn nearest_section(&self) -> usize {
        let index = (self.offset / self.section_width).round().max(0.0) as usize;
        index.min(self.last_index())
    }

    /// Handles a wheel gesture over the strip
    ///
    /// Horizontal-dominant events pan immediately and drop any pending
    /// vertical intent. Vertical events above the noise threshold are
    /// accumulated and (re)start the commit debounce.
    pub fn on_wheel(&mut self, event: WheelEvent, now: Instant) -> WheelOutcome {
        if event.delta_x.abs() > event.delta_y.abs() {
            // A user pan takes over from any smooth scroll in progress.
            self.animation = None;
            self.offset =
                (self.offset + event.delta_x * self.config.horizontal_gain).clamp(0.0, self.max_offset());
            self.accumulator = 0.0;
            self.commit_deadline = None;
            self.on_container_scroll(now);
            return WheelOutcome::Panned;
        }

        if event.delta_y.abs() > self.config.noise_threshold {
            self.accumulator += event.delta_y;
            self.commit_deadline = Some(now + self.config.debounce);
            return WheelOutcome::Accumulated;
        }

        WheelOutcome::Ignored
    }

    /// Passive position signal from the container
    ///
    /// Derives the nearest section from the offset and adopts it as the
    /// current index, unless a navigation command is still settling.
    /// Returns the new index if it changed.
    pub fn on_container_scroll(&mut self, now: Instant) -> Option<usize> {
        if self.is_suppressed(now) || self.section_count == 0 {
            return None;
        }

        let nearest = self.nearest_section();
        if nearest != self.current {
            debug!(from = self.current, to = nearest, "section changed by scroll position");
            self.current = nearest;
            return Some(nearest);
        }
        None
    }

    /// Moves to `index`, clamped to the available sections
    ///
    /// The index is updated immediately; the strip animates towards it and
    /// passive scroll signals are ignored for the suppression window. A new
    /// command replaces the window of the previous one. Calling with the
    /// current index while the strip is already aligned is a no-op.
    /// Returns the index actually selected.
    pub fn navigate_to(&mut self, index: usize, now: Instant) -> usize {
        if self.section_count == 0 {
            return 0;
        }

        let target = index.min(self.last_index());
        let target_offset = target as f64 * self.section_width;

        if target == self.current && self.animation.is_none() && self.offset == target_offset {
            return target;
        }

        debug!(from = self.current, to = target, "navigating to section");
        self.current = target;
        self.animation = Some(Animation {
            from: self.offset,
            to: target_offset,
            started: now,
        });
        self.suppress_until = Some(now + self.config.suppression);
        target
    }

    /// Steps one section forward or back, clamped at both ends
    pub fn step(&mut self, forward: bool, now: Instant) -> usize {
        let target = if forward {
            self.current + 1
        } else {
            self.current.saturating_sub(1)
        };
        self.navigate_to(target, now)
    }

    /// Advances time: runs the animation, expires the suppression window and
    /// fires the commit debounce when due
    ///
    /// Returns the new index if it changed during this tick.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        let before = self.current;

        if let Some(animation) = self.animation {
            let elapsed = now.saturating_duration_since(animation.started);
            let progress = if self.config.animation.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f64() / self.config.animation.as_secs_f64()).min(1.0)
            };
            self.offset = animation.from + (animation.to - animation.from) * ease_in_out(progress);
            if progress >= 1.0 {
                self.offset = animation.to;
                self.animation = None;
            }
            self.on_container_scroll(now);
        }

        if self.suppress_until.is_some_and(|until| now >= until) {
            self.suppress_until = None;
            // A pan during the window left the strip wherever it stopped.
            if self.animation.is_none() {
                self.on_container_scroll(now);
            }
        }

        if self.commit_deadline.is_some_and(|deadline| now >= deadline) {
            self.commit_deadline = None;
            let accumulated = std::mem::take(&mut self.accumulator);

            if accumulated.abs() >= self.config.commit_threshold {
                let forward = accumulated > 0.0;
                let at_edge = if forward {
                    self.current >= self.last_index()
                } else {
                    self.current == 0
                };
                if !at_edge {
                    self.step(forward, now);
                }
            }
        }

        (self.current != before).then_some(self.current)
    }

    /// Changes the section width, keeping the current section in view
    pub fn resize(&mut self, section_width: f64) {
        self.section_width = section_width.max(1.0);
        self.animation = None;
        self.offset = self.current as f64 * self.section_width;
    }

    /// Changes the number of sections, clamping the current index
    pub fn set_section_count(&mut self, section_count: usize) {
        self.section_count = section_count;
        if self.current > self.last_index() {
            self.current = self.last_index();
            self.animation = None;
            self.offset = self.current as f64 * self.section_width;
        }
    }

    /// Drops pending vertical intent without committing it
    pub fn cancel_pending(&mut self) {
        self.commit_deadline = None;
        self.accumulator = 0.0;
    }
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}
