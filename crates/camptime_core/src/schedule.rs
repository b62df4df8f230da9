//! crates/camptime_core/src/schedule.rs
//!
//! Expands a group's recurrence into the dates of its upcoming meetings.

use chrono::{Datelike, Days, NaiveDate};

use crate::domain::Recurrence;

/// How many upcoming meetings are computed per group and returned overall.
pub const HORIZON: usize = 8;

/// Lazily yields meeting dates for one recurrence.
///
/// Created by [`occurrences`]. The sequence is finite: it ends after `horizon`
/// dates or at the first date past the recurrence's end date.
#[derive(Debug, Clone)]
pub struct Occurrences {
    next: Option<NaiveDate>,
    step: Days,
    end_date: Option<NaiveDate>,
    remaining: usize,
}

/// Computes the meeting dates of `recurrence` starting at `reference`.
///
/// The first date is the first matching weekday on or after `reference`, or on or
/// after the recurrence's start date if that lies later. Each following date is
/// `7 * frequency` days after the previous one. A recurrence without a valid
/// weekday yields nothing.
pub fn occurrences(recurrence: &Recurrence, reference: NaiveDate, horizon: usize) -> Occurrences {
    let step = Days::new(7 * u64::from(recurrence.effective_frequency()));

    let first = recurrence
        .weekday
        .filter(|weekday| *weekday <= 6)
        .and_then(|weekday| {
            let anchor = match recurrence.start_date {
                Some(start) if start > reference => start,
                _ => reference,
            };
            let current = anchor.weekday().num_days_from_sunday();
            let offset = (7 + u32::from(weekday) - current) % 7;
            anchor.checked_add_days(Days::new(u64::from(offset)))
        });

    Occurrences {
        next: first,
        step,
        end_date: recurrence.end_date,
        remaining: horizon,
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.remaining == 0 {
            return None;
        }
        let date = self.next?;
        if self.end_date.is_some_and(|end| date > end) {
            self.next = None;
            return None;
        }
        self.remaining -= 1;
        self.next = date.checked_add_days(self.step);
        Some(date)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(_) => (0, Some(self.remaining)),
            None => (0, Some(0)),
        }
    }
}
