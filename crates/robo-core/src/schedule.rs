//! Daily schedule evaluation.
//!
//! The maker runs on an hour-of-day schedule in a configured timezone:
//! create at the open hour, cancel at the close hour. Evaluation is pure over
//! a supplied instant so tests can drive arbitrary hours without touching
//! system time.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{CoreError, Result};

/// What the schedule asks for at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePhase {
    /// The hour during which an order should be open.
    OpenHour,
    /// The hour during which any open order should be cancelled.
    CloseHour,
    /// Any other hour.
    Idle,
}

/// Daily open/close window in a fixed timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleWindow {
    open_hour: u32,
    close_hour: u32,
    tz: Tz,
}

impl ScheduleWindow {
    /// Create a window. Hours are hour-of-day values and must differ,
    /// otherwise one wake-up could both create and cancel.
    pub fn new(open_hour: u32, close_hour: u32, tz: Tz) -> Result<Self> {
        if open_hour > 23 || close_hour > 23 {
            return Err(CoreError::InvalidSchedule(format!(
                "hours must be 0..=23, got open={open_hour} close={close_hour}"
            )));
        }
        if open_hour == close_hour {
            return Err(CoreError::InvalidSchedule(format!(
                "open and close hour must differ, both are {open_hour}"
            )));
        }
        Ok(Self {
            open_hour,
            close_hour,
            tz,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Hour-of-day of an instant in the window's timezone.
    pub fn local_hour(&self, now: DateTime<Utc>) -> u32 {
        now.with_timezone(&self.tz).hour()
    }

    /// Evaluate the schedule at an instant.
    pub fn phase_at(&self, now: DateTime<Utc>) -> SchedulePhase {
        let hour = self.local_hour(now);
        if hour == self.open_hour {
            SchedulePhase::OpenHour
        } else if hour == self.close_hour {
            SchedulePhase::CloseHour
        } else {
            SchedulePhase::Idle
        }
    }
}
