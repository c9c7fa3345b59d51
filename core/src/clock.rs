//! Simulation clock: owns tick state, speed control, pause, and the
//! in-game calendar.

use crate::types::{RunId, Tick};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// The campaign opens on 1 January 117 AD.
pub const START_YEAR: i32 = 117;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    pub speed:        SimSpeed,
    pub paused:       bool,
    pub start_date:   NaiveDate,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            speed: SimSpeed::Normal,
            paused: true,
            start_date: NaiveDate::from_ymd_opt(START_YEAR, 1, 1)
                .unwrap_or(NaiveDate::MIN),
        }
    }

    /// Advance one tick. Returns the new tick number.
    /// Panics if called while paused; callers must check.
    pub fn advance(&mut self) -> Tick {
        assert!(!self.paused, "advance() called on paused clock");
        self.current_tick += 1;
        self.current_tick
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.speed = speed;
    }

    /// In-game calendar date of the current tick.
    pub fn date(&self) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(self.current_tick))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Milliseconds between ticks when a host drives the clock in real time.
    pub fn tick_interval_ms(&self) -> u64 {
        match self.speed {
            SimSpeed::Slow     => 1000,
            SimSpeed::Normal   => 500,
            SimSpeed::Fast     => 200,
            SimSpeed::VeryFast => 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Slow,
    Normal,
    Fast,
    VeryFast,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_follows_ticks() {
        let mut clock = SimClock::new("clock-test".into());
        assert_eq!(clock.date(), NaiveDate::from_ymd_opt(117, 1, 1).unwrap());

        clock.resume();
        for _ in 0..31 {
            clock.advance();
        }
        assert_eq!(clock.date(), NaiveDate::from_ymd_opt(117, 2, 1).unwrap());
    }
}
