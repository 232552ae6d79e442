// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The calendar engine.
//!
//! [`Calendar<Tz>`] bundles a `chrono` timezone with an injectable clock and
//! provides boundary computation (start/end of day, month, year), precision
//! rounding, week numbering, weekday navigation, UTC/DST offset queries and
//! precision-bucketed comparison.  The timezone parameter plays the role the
//! per-call `utc` flag played in older calendar APIs: build a
//! [`Calendar::utc`] for UTC arithmetic, a [`Calendar::local`] for the host
//! zone, or [`Calendar::new`] with any `TimeZone` (a `FixedOffset`, a
//! `chrono-tz` zone, ...) for deterministic results.
//!
//! # Failure semantics
//!
//! Malformed inputs degrade to documented defaults instead of raising:
//! unparseable strings fall back to the clock's current time, invalid
//! weekday numbers coerce to Thursday, instants beyond chrono's
//! representable span saturate at the nearer bound, and precisions that
//! cannot be rounded (week, or an unrecognized token at the string layer)
//! yield `None`.
//! Callers that need strict validation pre-check with [`is_valid_weekday`]
//! and [`Unit::parse`].

use crate::instant::Instant;
use crate::unit::{Rounding, Unit, MS_PER_DAY, MS_PER_SECOND};
use chrono::{
    DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone,
    Timelike, Utc,
};
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Day / month numbering
// ═══════════════════════════════════════════════════════════════════════════

pub const SUNDAY: i64 = 0;
pub const MONDAY: i64 = 1;
pub const TUESDAY: i64 = 2;
pub const WEDNESDAY: i64 = 3;
pub const THURSDAY: i64 = 4;
pub const FRIDAY: i64 = 5;
pub const SATURDAY: i64 = 6;

pub const JANUARY: i32 = 0;
pub const FEBRUARY: i32 = 1;
pub const MARCH: i32 = 2;
pub const APRIL: i32 = 3;
pub const MAY: i32 = 4;
pub const JUNE: i32 = 5;
pub const JULY: i32 = 6;
pub const AUGUST: i32 = 7;
pub const SEPTEMBER: i32 = 8;
pub const OCTOBER: i32 = 9;
pub const NOVEMBER: i32 = 10;
pub const DECEMBER: i32 = 11;

/// True iff `n` is a valid weekday number (0 = Sunday .. 6 = Saturday).
#[inline]
pub const fn is_valid_weekday(n: i64) -> bool {
    n >= SUNDAY && n <= SATURDAY
}

/// Standard Gregorian leap-year rule.
#[inline]
pub const fn leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Day-of-year accumulated at the start of each month (non-leap).
const CUMULATIVE_DAYS: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

// ═══════════════════════════════════════════════════════════════════════════
// Input normalization
// ═══════════════════════════════════════════════════════════════════════════

/// An accepted date input, normalized by [`Calendar::instant`].
#[derive(Debug, Clone, Copy)]
pub enum DateInput<'a> {
    /// Already an instant.
    Instant(Instant),
    /// Epoch milliseconds.
    Millis(i64),
    /// A `chrono` UTC datetime.
    Utc(DateTime<Utc>),
    /// A date string; unparseable text falls back to the calendar's clock.
    Text(&'a str),
}

impl From<Instant> for DateInput<'_> {
    fn from(t: Instant) -> Self {
        Self::Instant(t)
    }
}

impl From<i64> for DateInput<'_> {
    fn from(ms: i64) -> Self {
        Self::Millis(ms)
    }
}

impl From<DateTime<Utc>> for DateInput<'_> {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Utc(dt)
    }
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// YearWeek
// ═══════════════════════════════════════════════════════════════════════════

/// A week-of-year anchor: year, week number and the week's day bounds.
///
/// Derived on demand by [`Calendar::year_week`], never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct YearWeek {
    pub year: i32,
    pub week: u32,
    /// Start of day of the anchored beginning-of-week weekday.
    pub start: Instant,
    /// End of day (23:59:59.999) of the anchored weekday + 6 days.
    pub end: Instant,
}

// ═══════════════════════════════════════════════════════════════════════════
// Calendar
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default)]
enum Clock {
    #[default]
    System,
    Fixed(Instant),
}

/// Calendar arithmetic over a fixed timezone and an injectable clock.
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone> {
    tz: Tz,
    clock: Clock,
}

impl Calendar<Utc> {
    /// A UTC calendar.
    pub fn utc() -> Self {
        Self::new(Utc)
    }
}

impl Calendar<Local> {
    /// A calendar in the host's local timezone.
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    /// A calendar in an explicit timezone, reading the system clock.
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            clock: Clock::System,
        }
    }

    /// Pin the calendar's notion of "now" to a fixed instant.
    ///
    /// Every fallback that would otherwise ask the host clock (string
    /// parse failures, [`Calendar::now`]) uses this value instead, which
    /// makes tests deterministic.
    pub fn with_clock(mut self, now: Instant) -> Self {
        self.clock = Clock::Fixed(now);
        self
    }

    /// The current time according to the calendar's clock.
    pub fn now(&self) -> Instant {
        match self.clock {
            Clock::System => Instant::from_utc(Utc::now()),
            Clock::Fixed(t) => t,
        }
    }

    // ── normalization ─────────────────────────────────────────────────

    /// Normalize any accepted input form to an [`Instant`].
    ///
    /// Strings are tried as RFC 3339, RFC 2822, a naive datetime
    /// (interpreted in this calendar's zone) and a bare date (interpreted
    /// as UTC midnight).  Text that matches none of these falls back to
    /// the clock's current time — the documented silent-fallback policy.
    pub fn instant<'a>(&self, input: impl Into<DateInput<'a>>) -> Instant {
        match input.into() {
            DateInput::Instant(t) => t,
            DateInput::Millis(ms) => Instant::from_millis(ms),
            DateInput::Utc(dt) => Instant::from_utc(dt),
            DateInput::Text(s) => self.parse_text(s).unwrap_or_else(|| self.now()),
        }
    }

    fn parse_text(&self, s: &str) -> Option<Instant> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Instant::from_millis(dt.timestamp_millis()));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(Instant::from_millis(dt.timestamp_millis()));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Instant::from_millis(
                    self.resolve_local(naive).timestamp_millis(),
                ));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            // Date-only forms read as UTC midnight.
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(Instant::from_utc(Utc.from_utc_datetime(&naive)));
        }
        None
    }

    // ── zone plumbing ─────────────────────────────────────────────────

    fn datetime(&self, t: Instant) -> DateTime<Tz> {
        // Instants beyond chrono's representable span saturate at the
        // nearer bound, so no operation can abort on a far-out value.
        clamp_to_chrono(t)
            .to_utc()
            .unwrap_or(DateTime::UNIX_EPOCH)
            .with_timezone(&self.tz)
    }

    /// Map a wall-clock datetime into this zone.  Ambiguous times take the
    /// earlier mapping; times inside a DST gap walk forward in half-hour
    /// steps until they land on a representable wall clock.
    fn resolve_local(&self, naive: NaiveDateTime) -> DateTime<Tz> {
        let mut candidate = naive;
        for _ in 0..8 {
            if let Some(dt) = self.tz.from_local_datetime(&candidate).earliest() {
                return dt;
            }
            candidate += TimeDelta::minutes(30);
        }
        self.tz.from_utc_datetime(&naive)
    }

    fn wall_clock(
        &self,
        year: i32,
        month1: u32,
        day: u32,
        hms_milli: (u32, u32, u32, u32),
    ) -> Instant {
        let (h, m, s, ms) = hms_milli;
        // One year of margin keeps the gap-walking in `resolve_local`
        // inside chrono's naive-datetime span.
        let year = year.clamp(NaiveDate::MIN.year() + 1, NaiveDate::MAX.year() - 1);
        let naive = NaiveDate::from_ymd_opt(year, month1, day)
            .and_then(|d| d.and_hms_milli_opt(h, m, s, ms))
            .unwrap_or(NaiveDateTime::UNIX_EPOCH);
        Instant::from_millis(self.resolve_local(naive).timestamp_millis())
    }

    /// Shift a local datetime by whole calendar days, preserving the wall
    /// clock.  A shift that would leave chrono's representable span stays
    /// put instead.
    fn shift_days(&self, local: DateTime<Tz>, delta: i64) -> Instant {
        let naive = local.naive_local();
        let shifted = if delta >= 0 {
            naive.checked_add_days(Days::new(delta as u64))
        } else {
            naive.checked_sub_days(Days::new(delta.unsigned_abs()))
        }
        .unwrap_or(naive);
        Instant::from_millis(self.resolve_local(shifted).timestamp_millis())
    }

    // ── weekday navigation ────────────────────────────────────────────

    /// The date in the same week whose weekday equals `day`, keeping the
    /// reference's wall-clock time.  Invalid `day` coerces to Thursday.
    pub fn nearest_weekday(&self, day: i64, reference: Instant) -> Instant {
        let day = if is_valid_weekday(day) { day } else { THURSDAY };
        let local = self.datetime(reference);
        let current = local.weekday().num_days_from_sunday() as i64;
        self.shift_days(local, day - current)
    }

    /// Like [`Calendar::nearest_weekday`] but guaranteed `>= reference`.
    pub fn future_weekday(&self, day: i64, reference: Instant) -> Instant {
        let nearest = self.nearest_weekday(day, reference);
        if nearest < reference {
            self.shift_days(self.datetime(nearest), 7)
        } else {
            nearest
        }
    }

    /// Like [`Calendar::nearest_weekday`] but guaranteed `<= reference`.
    pub fn past_weekday(&self, day: i64, reference: Instant) -> Instant {
        let nearest = self.nearest_weekday(day, reference);
        if nearest > reference {
            self.shift_days(self.datetime(nearest), -7)
        } else {
            nearest
        }
    }

    /// Day number within the week anchored at `beginning_of_week`, in 1..=7.
    pub fn day_of_week(&self, reference: Instant, beginning_of_week: i64) -> u32 {
        let day_start = self.round_fixed(reference, MS_PER_DAY, Rounding::Floor);
        let week = self.year_week(day_start, beginning_of_week);
        // Whole-day offset from the week start; rounding absorbs the DST
        // hour a transition inside the week can introduce.
        let days = ((day_start - week.start) as f64 / MS_PER_DAY as f64).round() as i64;
        (days.rem_euclid(7)) as u32 + 1
    }

    /// 1-based ordinal day within the calendar year.
    pub fn day_of_year(&self, reference: Instant) -> u32 {
        let local = self.datetime(reference);
        let month = local.month0() as usize;
        let mut ordinal = CUMULATIVE_DAYS[month] + local.day();
        if month > 1 && leap_year(local.year()) {
            ordinal += 1;
        }
        ordinal
    }

    // ── year boundaries ───────────────────────────────────────────────

    /// January 1, 00:00:00.000 of `year` in this calendar's zone.
    pub fn first_of_year(&self, year: i32) -> Instant {
        self.wall_clock(year, 1, 1, (0, 0, 0, 0))
    }

    /// December 31, 23:59:59.999 of `year` in this calendar's zone.
    pub fn last_of_year(&self, year: i32) -> Instant {
        self.wall_clock(year, 12, 31, (23, 59, 59, 999))
    }

    /// Number of days in `year` (365 or 366).
    pub fn days_in_year(&self, year: i32) -> u32 {
        self.day_of_year(self.last_of_year(year))
    }

    // ── month boundaries ──────────────────────────────────────────────

    /// First instant of a month.  `month` is a 0-based index and may fall
    /// outside 0..=11: month 12 of year Y is January of Y+1, month −1 is
    /// December of Y−1.
    pub fn first_of_month(&self, month: i32, year: i32) -> Instant {
        let year = year.saturating_add(month.div_euclid(12));
        let month0 = month.rem_euclid(12) as u32;
        self.wall_clock(year, month0 + 1, 1, (0, 0, 0, 0))
    }

    /// Last instant (23:59:59.999 of the last day) of a month.
    pub fn last_of_month(&self, month: i32, year: i32) -> Instant {
        self.first_of_month(month.saturating_add(1), year) - 1
    }

    /// Number of days in a month, honoring the same overflow rolling as
    /// [`Calendar::first_of_month`].
    pub fn days_in_month(&self, month: i32, year: i32) -> u32 {
        self.datetime(self.last_of_month(month, year)).day()
    }

    // ── offsets / DST ─────────────────────────────────────────────────

    /// Local-to-UTC offset at `reference`, in milliseconds.
    ///
    /// Sign convention: the value to ADD to local time to obtain UTC, so
    /// zones east of Greenwich report a negative offset.
    pub fn utc_offset(&self, reference: Instant) -> i64 {
        let local = self.datetime(reference);
        -(local.offset().fix().local_minus_utc() as i64) * MS_PER_SECOND
    }

    /// The zone's non-DST reference offset for `reference`'s year: the
    /// larger of the offsets observed on January 1 and July 1.
    pub fn std_timezone_offset(&self, reference: Instant) -> i64 {
        let year = self.datetime(reference).year();
        let jan = self.first_of_month(JANUARY, year);
        let jul = self.first_of_month(JULY, year);
        self.utc_offset(jan).max(self.utc_offset(jul))
    }

    /// Milliseconds of daylight-saving shift in effect at `reference`,
    /// zero outside DST.
    pub fn dst_offset(&self, reference: Instant) -> i64 {
        let std = self.std_timezone_offset(reference);
        let current = self.utc_offset(reference);
        if current < std {
            std - current
        } else {
            0
        }
    }

    /// True while daylight-saving time is in effect at `reference`.
    pub fn is_dst(&self, reference: Instant) -> bool {
        self.utc_offset(reference) < self.std_timezone_offset(reference)
    }

    /// True iff `reference` falls in a leap year of this calendar's zone.
    pub fn is_leap_year(&self, reference: Instant) -> bool {
        leap_year(self.datetime(reference).year())
    }

    // ── week numbering ────────────────────────────────────────────────

    /// Year, week number and week bounds for the week containing
    /// `reference`, with weeks starting on the `beginning_of_week`
    /// weekday (invalid values coerce to Thursday, which anchors the
    /// numbering to the Thursday of the ISO-like week convention).
    ///
    /// The reference resolves to the most recent `beginning_of_week`
    /// weekday at or before it; the week number counts seven-day blocks
    /// from January 1 of the anchored year.
    pub fn year_week(&self, reference: Instant, beginning_of_week: i64) -> YearWeek {
        let anchor = self.past_weekday(beginning_of_week, reference);
        let start = self.round_fixed(anchor, MS_PER_DAY, Rounding::Floor);
        let year = self.datetime(anchor).year();
        let year_start = self.first_of_year(year);
        // Whole days between the two local midnights; rounding absorbs
        // the DST hour either midnight may carry.
        let days = ((start - year_start) as f64 / MS_PER_DAY as f64).round();
        let week = ((days + 1.0) / 7.0).ceil() as u32;
        // End of day of the anchored weekday + 6 days; shifting by
        // calendar days keeps the bound on local midnight across DST.
        let end = self.shift_days(self.datetime(start), 7) - 1;
        YearWeek {
            year,
            week,
            start,
            end,
        }
    }

    // ── rounding ──────────────────────────────────────────────────────

    fn round_fixed(&self, t: Instant, unit_ms: i64, mode: Rounding) -> Instant {
        // Round the wall-clock value: subtract the UTC offset, apply the
        // modular rounding, re-add.  When the boundary lands on the other
        // side of a DST transition the offset there differs from the one
        // at `t`; re-resolving once with the boundary's own offset puts
        // day boundaries back on local midnight.
        let t = clamp_to_chrono(t);
        let mut offset = self.utc_offset(t);
        let mut candidate = t;
        for _ in 0..4 {
            let local_ms = t.millis() - offset;
            candidate = Instant::from_millis(round_mod(local_ms, unit_ms, mode) + offset);
            let candidate_offset = self.utc_offset(candidate);
            if candidate_offset == offset {
                break;
            }
            offset = candidate_offset;
        }
        candidate
    }

    /// Round `t` to a precision.
    ///
    /// Sub-day precisions round the local wall-clock value; month and year
    /// round the day offset within the month/year, anchored at the first
    /// of that month/year.  Week precision is not a rounding boundary and
    /// yields `None` — the non-date sentinel callers must check for.
    pub fn round(&self, t: Instant, precision: Unit, mode: Rounding) -> Option<Instant> {
        match precision {
            Unit::Week => None,
            Unit::Month => {
                let local = self.datetime(t);
                let (year, month0) = (local.year(), local.month0() as i32);
                let first = self.first_of_month(month0, year);
                let len = self.days_in_month(month0, year) as i64;
                // Zero-based day offset, so a value already on the
                // boundary stays put under every rounding mode.  Shifting
                // by calendar days keeps the result on local midnight
                // when a DST transition falls inside the month.
                let days = round_mod(local.day() as i64 - 1, len, mode);
                Some(self.shift_days(self.datetime(first), days))
            }
            Unit::Year => {
                let year = self.datetime(t).year();
                let first = self.first_of_year(year);
                let len = self.days_in_year(year) as i64;
                let days = round_mod(self.day_of_year(t) as i64 - 1, len, mode);
                Some(self.shift_days(self.datetime(first), days))
            }
            sub_day => {
                let unit_ms = sub_day.fixed_ms()?;
                Some(self.round_fixed(t, unit_ms, mode))
            }
        }
    }

    /// [`Calendar::round`] with a string precision token; unrecognized
    /// tokens are a soft failure, an empty token means milliseconds.
    pub fn round_str(&self, t: Instant, precision: &str, mode: Rounding) -> Option<Instant> {
        self.round(t, Unit::parse(precision)?, mode)
    }

    /// Round up to a precision boundary.
    pub fn ceil(&self, t: Instant, precision: Unit) -> Option<Instant> {
        self.round(t, precision, Rounding::Ceil)
    }

    /// Round down to a precision boundary.
    pub fn floor(&self, t: Instant, precision: Unit) -> Option<Instant> {
        self.round(t, precision, Rounding::Floor)
    }

    /// First instant of the precision bucket containing `t`.
    pub fn start_of(&self, t: Instant, precision: Unit) -> Option<Instant> {
        self.floor(t, precision)
    }

    /// Last instant (1 ms before the next boundary) of the bucket
    /// containing `t`.
    pub fn end_of(&self, t: Instant, precision: Unit) -> Option<Instant> {
        self.ceil(t, precision).map(|v| v - 1)
    }

    // ── comparison ────────────────────────────────────────────────────

    /// Compare two raw instants.
    pub fn compare(&self, a: Instant, b: Instant) -> Ordering {
        a.cmp(&b)
    }

    /// Compare after rounding both sides to `precision` with `mode`.
    ///
    /// A precision that cannot be rounded (week) degrades to the raw
    /// comparison; there are no fatal errors on this path.
    pub fn compare_by(&self, a: Instant, b: Instant, precision: Unit, mode: Rounding) -> Ordering {
        let ra = self.round(a, precision, mode).unwrap_or(a);
        let rb = self.round(b, precision, mode).unwrap_or(b);
        ra.cmp(&rb)
    }

    /// Inclusive range test.
    pub fn between(&self, v: Instant, min: Instant, max: Instant) -> bool {
        self.compare(v, min).is_ge() && self.compare(v, max).is_le()
    }

    /// Precision-bucketed equality.
    ///
    /// Week precision compares the `(year, week)` pair only.  Every other
    /// precision cascades: it compares its own calendar field AND every
    /// coarser one, so `Unit::Day` means same day, same month and same
    /// year.  The cascade is the contract, not an accident — a "same
    /// minute" query that ignored the date would be useless.
    pub fn equal(&self, a: Instant, b: Instant, precision: Unit, beginning_of_week: i64) -> bool {
        if precision == Unit::Week {
            let wa = self.year_week(a, beginning_of_week);
            let wb = self.year_week(b, beginning_of_week);
            return (wa.year, wa.week) == (wb.year, wb.week);
        }

        // Index of the finest field compared; everything coarser follows.
        let cutoff = match precision {
            Unit::Millisecond => 0,
            Unit::Second => 1,
            Unit::Minute => 2,
            Unit::Hour => 3,
            Unit::Day => 4,
            Unit::Month => 5,
            Unit::Year => 6,
            Unit::Week => return false, // handled above
        };

        let fields = |t: Instant| -> [i64; 7] {
            let d = self.datetime(t);
            [
                d.timestamp_subsec_millis() as i64,
                d.second() as i64,
                d.minute() as i64,
                d.hour() as i64,
                d.day() as i64,
                d.month0() as i64,
                d.year() as i64,
            ]
        };

        fields(a)[cutoff..] == fields(b)[cutoff..]
    }
}

/// Saturate an instant to the span `chrono::DateTime` can represent.
fn clamp_to_chrono(t: Instant) -> Instant {
    let min = Instant::from_utc(DateTime::<Utc>::MIN_UTC);
    let max = Instant::from_utc(DateTime::<Utc>::MAX_UTC);
    t.max(min).min(max)
}

/// Modular rounding: `n` snaps to a multiple of `unit`, the fractional
/// offset decided by `mode`.  The remainder keeps the sign of `n`, so
/// pre-epoch values round among the same boundaries a wall clock shows.
fn round_mod(n: i64, unit: i64, mode: Rounding) -> i64 {
    let offset = n % unit;
    let rounded = mode.apply(offset as f64 / unit as f64) as i64 * unit;
    n - offset + rounded
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
