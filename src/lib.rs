// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Calendar Arithmetic Module
//!
//! This crate provides date/time arithmetic and formatting primitives:
//! calendar boundaries (start/end of day, week, month, year), precision
//! rounding, week numbering, DST-aware offset queries, precision-bucketed
//! comparison, and human-readable elapsed-time labels.
//!
//! # Core types
//!
//! - [`Instant`] — a point in time as integer milliseconds since the Unix
//!   epoch, the canonical representation throughout the crate.
//! - [`Calendar<Tz>`] — the calendar engine, parameterised by a
//!   `chrono::TimeZone` and carrying an injectable clock.
//! - [`Unit`] — precision granularity (millisecond … year, plus week) with
//!   case-insensitive alias parsing.
//! - [`Rounding`] — rounding mode for boundary computation.
//! - [`YearWeek`] — derived (year, week number, week start, week end) tuple.
//! - [`DurationFormat`] / [`Breakdown`] — duration label configuration and
//!   the decomposed unit counts behind it.
//!
//! # Calendar engine
//!
//! Every operation is a pure function over its arguments plus the calendar's
//! timezone; nothing is mutated in place and there is no global state.  The
//! timezone parameter replaces a per-call UTC flag:
//!
//! ```
//! use almanac::{Calendar, Unit, Instant};
//!
//! let cal = Calendar::utc();
//! let t = cal.instant("2024-05-04T15:45:12Z");
//! let start = cal.start_of(t, Unit::Day).unwrap();
//! let end = cal.end_of(t, Unit::Day).unwrap();
//! assert_eq!(end - start, 86_399_999);
//! ```
//!
//! # Duration formatting
//!
//! ```
//! use almanac::{format_duration, DurationFormat};
//!
//! assert_eq!(format_duration(-90_000.0, &DurationFormat::default()),
//!            "(1 minute 30 seconds)");
//! assert_eq!(format_duration(f64::NAN, &DurationFormat::default()), "---");
//! ```
//!
//! # Failure semantics
//!
//! Malformed inputs never raise: unparseable date strings fall back to the
//! calendar clock, invalid weekday numbers coerce to Thursday, and an
//! unroundable precision yields `None` rather than a panic.  Callers that
//! need strict validation pre-check with [`is_valid_weekday`] and
//! [`Unit::parse`].

mod calendar;
mod duration;
pub(crate) mod instant;
pub(crate) mod unit;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use calendar::{
    is_valid_weekday, leap_year, Calendar, DateInput, YearWeek, APRIL, AUGUST, DECEMBER, FEBRUARY,
    FRIDAY, JANUARY, JULY, JUNE, MARCH, MAY, MONDAY, NOVEMBER, OCTOBER, SATURDAY, SEPTEMBER,
    SUNDAY, THURSDAY, TUESDAY, WEDNESDAY,
};
pub use duration::{
    breakdown, format_duration, format_since, Breakdown, DurationFormat, InputUnit, Show,
};
pub use instant::Instant;
pub use unit::{
    Rounding, Unit, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, MS_PER_WEEK,
};
