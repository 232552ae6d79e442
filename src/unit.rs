// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Precision units and rounding modes.
//!
//! A [`Unit`] names a calendar granularity used for rounding, bucketed
//! comparison and duration decomposition.  Units are parsed from the
//! case-insensitive alias tokens below; anything else is a soft failure
//! (`None`), never an error the caller has to catch.
//!
//! | Unit | Aliases | Fixed size |
//! |------|---------|------------|
//! | [`Unit::Millisecond`] | `ms`, `milli`, `millisecond`, `milliseconds` | 1 ms |
//! | [`Unit::Second`] | `s`, `sec`, `second`, `seconds` | 1 000 ms |
//! | [`Unit::Minute`] | `min`, `minute`, `minutes` | 60 000 ms |
//! | [`Unit::Hour`] | `h`, `hr`, `hrs`, `hour`, `hours` | 3 600 000 ms |
//! | [`Unit::Day`] | `d`, `day`, `days` | 86 400 000 ms |
//! | [`Unit::Week`] | `wk`, `week`, `weeks` | 604 800 000 ms |
//! | [`Unit::Month`] | `mon`, `month`, `months` | calendar-dependent |
//! | [`Unit::Year`] | `y`, `year`, `years` | calendar-dependent |

/// Milliseconds in one second.
pub const MS_PER_SECOND: i64 = 1_000;
/// Milliseconds in one minute.
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
/// Milliseconds in one hour.
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
/// Milliseconds in one nominal (24 h) day.
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
/// Milliseconds in one nominal week.
pub const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;

/// A calendar granularity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// One millisecond — the identity precision.
    #[default]
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    /// Resolve a case-insensitive alias token to a unit.
    ///
    /// Returns `None` for unrecognized tokens; an empty token means the
    /// default millisecond precision.
    ///
    /// ```
    /// use almanac::Unit;
    ///
    /// assert_eq!(Unit::parse("SEC"), Some(Unit::Second));
    /// assert_eq!(Unit::parse(""), Some(Unit::Millisecond));
    /// assert_eq!(Unit::parse("fortnight"), None);
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "" | "ms" | "milli" | "millisecond" | "milliseconds" => Some(Self::Millisecond),
            "s" | "sec" | "second" | "seconds" => Some(Self::Second),
            "min" | "minute" | "minutes" => Some(Self::Minute),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(Self::Hour),
            "d" | "day" | "days" => Some(Self::Day),
            "wk" | "week" | "weeks" => Some(Self::Week),
            "mon" | "month" | "months" => Some(Self::Month),
            "y" | "year" | "years" => Some(Self::Year),
            _ => None,
        }
    }

    /// Millisecond size of a fixed-width unit.
    ///
    /// `None` for [`Unit::Month`] and [`Unit::Year`], whose lengths depend
    /// on the calendar position.
    #[inline]
    pub const fn fixed_ms(self) -> Option<i64> {
        match self {
            Self::Millisecond => Some(1),
            Self::Second => Some(MS_PER_SECOND),
            Self::Minute => Some(MS_PER_MINUTE),
            Self::Hour => Some(MS_PER_HOUR),
            Self::Day => Some(MS_PER_DAY),
            Self::Week => Some(MS_PER_WEEK),
            Self::Month | Self::Year => None,
        }
    }
}

/// Rounding mode applied to the fractional part of a unit offset.
///
/// [`Rounding::Nearest`] reproduces the half-toward-positive-infinity rule
/// of IEEE "round half up" (`0.5 → 1`, `−0.5 → 0`), which is the behavior
/// the rest of the crate's boundary arithmetic assumes.
#[derive(Debug, Copy, Clone, Default)]
pub enum Rounding {
    #[default]
    Nearest,
    Floor,
    Ceil,
    /// Caller-supplied rounding of the fractional unit offset.
    Custom(fn(f64) -> f64),
}

impl Rounding {
    /// Round a fractional offset in `[0, 1)` (or `(−1, 0]` for instants
    /// before the epoch) to a whole number of units.
    #[inline]
    pub fn apply(self, frac: f64) -> f64 {
        match self {
            Self::Nearest => (frac + 0.5).floor(),
            Self::Floor => frac.floor(),
            Self::Ceil => frac.ceil(),
            Self::Custom(f) => f(frac),
        }
    }
}
