// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The millisecond timestamp type.
//!
//! [`Instant`] is the canonical representation used throughout the crate: an
//! integer count of milliseconds since the Unix epoch (1970-01-01T00:00:00Z).
//! Every input form accepted at the API boundary — epoch milliseconds, a
//! `chrono` datetime, a parseable date string — is normalized to an `Instant`
//! on entry, and every boundary/rounding operation returns a fresh `Instant`
//! rather than mutating its argument.

use chrono::{DateTime, Utc};
use std::ops::{Add, AddAssign, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ═══════════════════════════════════════════════════════════════════════════
// Instant
// ═══════════════════════════════════════════════════════════════════════════

/// A point in time as whole milliseconds since the Unix epoch.
///
/// `Instant` is `Copy` and layout-identical to an `i64`.  Arithmetic with
/// raw `i64` millisecond deltas is supported directly; the difference of two
/// instants is an `i64` delta (positive when `self` is later).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Instant(i64);

impl Instant {
    /// The Unix epoch itself.
    pub const UNIX_EPOCH: Self = Self(0);

    /// Create from epoch milliseconds.
    #[inline]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    /// The underlying epoch-millisecond value.
    #[inline]
    pub const fn millis(self) -> i64 {
        self.0
    }

    /// Convert to a `chrono::DateTime<Utc>`.
    ///
    /// Returns `None` if the value falls outside chrono's representable range.
    #[inline]
    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    /// Build an instant from a `chrono::DateTime<Utc>`.
    ///
    /// Sub-millisecond precision is truncated.
    #[inline]
    pub fn from_utc(datetime: DateTime<Utc>) -> Self {
        Self(datetime.timestamp_millis())
    }

    /// Element-wise minimum.
    #[inline]
    pub const fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }

    /// Element-wise maximum.
    #[inline]
    pub const fn max(self, other: Self) -> Self {
        if self.0 >= other.0 {
            self
        } else {
            other
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Trait implementations
// ═══════════════════════════════════════════════════════════════════════════

// ── Display ───────────────────────────────────────────────────────────────

impl std::fmt::Display for Instant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_utc() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{} ms", self.0),
        }
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl Serialize for Instant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Instant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = i64::deserialize(deserializer)?;
        Ok(Self(ms))
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────

impl Add<i64> for Instant {
    type Output = Self;
    #[inline]
    fn add(self, rhs: i64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign<i64> for Instant {
    #[inline]
    fn add_assign(&mut self, rhs: i64) {
        self.0 += rhs;
    }
}

impl Sub<i64> for Instant {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: i64) -> Self::Output {
        Self(self.0 - rhs)
    }
}

impl SubAssign<i64> for Instant {
    #[inline]
    fn sub_assign(&mut self, rhs: i64) {
        self.0 -= rhs;
    }
}

impl Sub for Instant {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<i64> for Instant {
    #[inline]
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl From<Instant> for i64 {
    #[inline]
    fn from(t: Instant) -> Self {
        t.0
    }
}

impl From<DateTime<Utc>> for Instant {
    #[inline]
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
