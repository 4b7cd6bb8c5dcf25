use chrono::{NaiveDateTime, TimeDelta};
use uom::si::f64::Time;
use uom::si::time::second;

/// the simulation clock. time advances by exactly one tick per step; the
/// step counter rides along for truncation bookkeeping.
#[derive(Clone, Debug)]
pub struct SimClock {
    t: NaiveDateTime,
    end: NaiveDateTime,
    delta_t_s: u64,
    step_count: u64,
}

impl SimClock {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, delta_t_s: u64) -> SimClock {
        SimClock {
            t: start,
            end,
            delta_t_s,
            step_count: 0,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.t
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// tick length as a unit quantity.
    pub fn dt(&self) -> Time {
        Time::new::<second>(self.delta_t_s as f64)
    }

    pub fn advance(&mut self) {
        self.t = self.t + TimeDelta::seconds(self.delta_t_s as i64);
        self.step_count += 1;
    }

    /// whether simulated time has reached the end of the window.
    pub fn finished(&self) -> bool {
        self.t >= self.end
    }
}
