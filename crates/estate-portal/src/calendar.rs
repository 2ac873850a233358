//! Month navigation and slot helpers behind the session booking calendar.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::Serialize;

use crate::domain::Session;

/// A calendar month, the unit the booking view pages through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day();
        self.first_day()
            .iter_days()
            .take_while(move |day| *day <= last)
    }

    /// Half-open UTC range `[first day 00:00, first day of next month 00:00)`.
    pub fn range(self) -> SessionRange {
        SessionRange {
            from: midnight(self.first_day()),
            to: midnight(self.next().first_day()),
        }
    }

    /// Monday-first weeks covering the month; days of neighbouring months are `None`.
    pub fn weeks(self) -> Vec<[Option<NaiveDate>; 7]> {
        let mut weeks = Vec::new();
        let mut week = [None; 7];
        for day in self.days() {
            let column = day.weekday().num_days_from_monday() as usize;
            week[column] = Some(day);
            if day.weekday() == Weekday::Sun {
                weeks.push(week);
                week = [None; 7];
            }
        }
        if week.iter().any(Option::is_some) {
            weeks.push(week);
        }
        weeks
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Query parameters selecting sessions that start inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl SessionRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }
}

/// Sessions bucketed by the UTC day they start on, each bucket ordered by start time.
pub fn group_by_day(sessions: &[Session]) -> BTreeMap<NaiveDate, Vec<&Session>> {
    let mut days: BTreeMap<NaiveDate, Vec<&Session>> = BTreeMap::new();
    for session in sessions {
        days.entry(session.starts_at.date_naive())
            .or_default()
            .push(session);
    }
    for bucket in days.values_mut() {
        bucket.sort_by_key(|session| session.starts_at);
    }
    days
}

/// A bookable interval on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub taken: bool,
}

/// Working-hours grid used to pick a free slot for a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub opens: NaiveTime,
    pub closes: NaiveTime,
    pub slot: Duration,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            opens: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            closes: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            slot: Duration::minutes(60),
        }
    }
}

impl SlotGrid {
    /// Slots of `day`, marked taken when any session overlaps them.
    pub fn slots(&self, day: NaiveDate, sessions: &[Session]) -> Vec<Slot> {
        if self.slot <= Duration::zero() {
            return Vec::new();
        }

        let close = Utc.from_utc_datetime(&day.and_time(self.closes));
        let mut start = Utc.from_utc_datetime(&day.and_time(self.opens));
        let mut slots = Vec::new();
        while start + self.slot <= close {
            let end = start + self.slot;
            let taken = sessions
                .iter()
                .any(|session| session.starts_at < end && start < session.ends_at);
            slots.push(Slot {
                starts_at: start,
                ends_at: end,
                taken,
            });
            start = end;
        }
        slots
    }
}
