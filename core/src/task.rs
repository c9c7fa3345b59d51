//! The timed-task shape shared by missions, projects and research.
//!
//! RULE: A task tracks its own progress and reports what its completion
//! should do, but it never applies those effects itself. The owning
//! registry does that, exactly once, then drops the task.

use crate::{
    catalog::EventCategory,
    effect::Effect,
    rng::SubsystemRng,
    types::{CountryName, ProvinceId, TaskId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Active,
    Completed,
}

/// What one tick of `advance` produced beyond progress.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Random events drawn this tick, as (category, template name).
    pub drawn_events: Vec<(EventCategory, String)>,
}

pub trait TimedTask {
    fn id(&self) -> &TaskId;

    fn target_province(&self) -> &ProvinceId;

    /// The country the completion needs to exist, if any.
    fn owner_country(&self) -> Option<&CountryName>;

    fn state(&self) -> TaskState;

    fn is_completed(&self) -> bool {
        self.state() == TaskState::Completed
    }

    /// Fraction in [0, 1] for progress bars.
    fn progress_fraction(&self) -> f64;

    /// Advance one tick. Must be a no-op once completed.
    fn advance(&mut self, rng: &mut SubsystemRng) -> TickReport;

    /// Effects the registry applies, in order, when this task completes.
    fn completion_effects(&self) -> Vec<Effect>;

    /// Effects the registry applies when this task is cancelled instead:
    /// returning whatever the task withheld from the province.
    fn cancellation_effects(&self) -> Vec<Effect>;

    /// Short label for logs and events.
    fn describe(&self) -> String;
}

/// Work-based progress: `workers × rate` per tick until the total is
/// reached. Overshoot is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkProgress {
    pub workers:         u64,
    pub rate_per_worker: u64,
    pub progress:        u64,
    pub total_required:  u64,
    pub completed:       bool,
    pub ticks_elapsed:   Tick,
}

impl WorkProgress {
    pub fn new(workers: u64, rate_per_worker: u64, total_required: u64) -> Self {
        Self {
            workers,
            rate_per_worker,
            progress: 0,
            total_required,
            completed: false,
            ticks_elapsed: 0,
        }
    }

    pub fn advance(&mut self) {
        if self.completed {
            return;
        }
        self.ticks_elapsed += 1;
        self.progress = self
            .progress
            .saturating_add(self.workers.saturating_mul(self.rate_per_worker));
        if self.progress >= self.total_required {
            self.completed = true;
        }
    }

    pub fn state(&self) -> TaskState {
        if self.completed {
            TaskState::Completed
        } else if self.progress == 0 {
            TaskState::Pending
        } else {
            TaskState::Active
        }
    }

    pub fn fraction(&self) -> f64 {
        if self.total_required == 0 {
            return 1.0;
        }
        (self.progress as f64 / self.total_required as f64).min(1.0)
    }
}

/// Duration-based progress: one day per tick until the limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationProgress {
    pub elapsed_days: u32,
    pub max_days:     u32,
    pub completed:    bool,
}

impl DurationProgress {
    pub fn new(max_days: u32) -> Self {
        Self { elapsed_days: 0, max_days, completed: false }
    }

    pub fn advance(&mut self) {
        if self.completed {
            return;
        }
        self.elapsed_days += 1;
        if self.elapsed_days >= self.max_days {
            self.completed = true;
        }
    }

    pub fn state(&self) -> TaskState {
        if self.completed {
            TaskState::Completed
        } else if self.elapsed_days == 0 {
            TaskState::Pending
        } else {
            TaskState::Active
        }
    }

    pub fn fraction(&self) -> f64 {
        if self.max_days == 0 {
            return 1.0;
        }
        (self.elapsed_days as f64 / self.max_days as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_completes_on_first_tick_reaching_total() {
        let mut w = WorkProgress::new(1, 10, 600);
        assert_eq!(w.state(), TaskState::Pending);
        for _ in 0..59 {
            w.advance();
        }
        assert_eq!(w.state(), TaskState::Active);
        w.advance();
        assert_eq!(w.state(), TaskState::Completed);
        assert_eq!(w.ticks_elapsed, 60);
        assert_eq!(w.progress, 600);
    }

    #[test]
    fn overshoot_is_kept_and_progress_frozen_after_completion() {
        let mut w = WorkProgress::new(7, 15, 100);
        while !w.completed {
            w.advance();
        }
        let frozen = w.progress;
        assert!(frozen >= 100);
        assert_eq!(frozen, 105);
        w.advance();
        w.advance();
        assert_eq!(w.progress, frozen);
        assert!(w.completed);
    }

    #[test]
    fn duration_completes_at_max() {
        let mut d = DurationProgress::new(31);
        for _ in 0..30 {
            d.advance();
        }
        assert!(!d.completed);
        d.advance();
        assert!(d.completed);
        d.advance();
        assert_eq!(d.elapsed_days, 31);
    }
}
