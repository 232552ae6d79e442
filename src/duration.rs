// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Human-readable duration formatting.
//!
//! [`format_duration`] turns a millisecond delta into a label like
//! `1 week 3 days` or `(1 minute 30 seconds)`, driven by a
//! [`DurationFormat`] configuration: per-unit singular/plural words,
//! past/future/now prefixes and suffixes, per-unit visibility policy and
//! optional HTML wrapping.  The configuration is an immutable per-call
//! snapshot — overlay overrides on [`DurationFormat::default`] with struct
//! update syntax:
//!
//! ```
//! use almanac::{format_duration, DurationFormat};
//!
//! let fmt = DurationFormat {
//!     second: "s".into(),
//!     seconds: "s".into(),
//!     ..DurationFormat::default()
//! };
//! assert_eq!(format_duration(90_000.0, &fmt), "1 minute 30 s");
//! ```
//!
//! Invalid numeric input and "nothing to display" both degrade to the
//! configured null label; this module never panics and never errors.

use crate::instant::Instant;
use crate::unit::{MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, MS_PER_WEEK};
use std::borrow::Cow;

// ═══════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════

/// Per-unit visibility policy.
///
/// `Auto` shows a unit when its count is positive and the total magnitude
/// falls inside the unit's plausible window (hours are noise on a
/// month-long duration, milliseconds on anything beyond seconds);
/// `Always`/`Never` override the heuristic unconditionally.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Show {
    #[default]
    Auto,
    Always,
    Never,
}

/// Unit the caller's numeric input is expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum InputUnit {
    #[default]
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl InputUnit {
    #[inline]
    fn scale_ms(self) -> f64 {
        match self {
            Self::Milliseconds => 1.0,
            Self::Seconds => MS_PER_SECOND as f64,
            Self::Minutes => MS_PER_MINUTE as f64,
            Self::Hours => MS_PER_HOUR as f64,
            Self::Days => MS_PER_DAY as f64,
        }
    }
}

/// Duration label configuration.
///
/// Every option is independently overridable; unspecified options take the
/// defaults below.  Words are English singular/plural pairs, the null label
/// is a dash placeholder, and a past duration is parenthesized.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationFormat {
    // ── unit words (singular / plural) ────────────────────────────────
    pub week: Cow<'static, str>,
    pub weeks: Cow<'static, str>,
    pub day: Cow<'static, str>,
    pub days: Cow<'static, str>,
    pub hour: Cow<'static, str>,
    pub hours: Cow<'static, str>,
    pub minute: Cow<'static, str>,
    pub minutes: Cow<'static, str>,
    pub second: Cow<'static, str>,
    pub seconds: Cow<'static, str>,
    pub millisecond: Cow<'static, str>,
    pub milliseconds: Cow<'static, str>,

    // ── framing ───────────────────────────────────────────────────────
    /// Returned for non-finite input and for an empty rendering.
    pub null_label: Cow<'static, str>,
    pub past_prefix: Cow<'static, str>,
    pub past_suffix: Cow<'static, str>,
    pub future_prefix: Cow<'static, str>,
    pub future_suffix: Cow<'static, str>,
    /// Prefix/suffix of the distinct zero-delta "now" case.
    pub now_prefix: Cow<'static, str>,
    pub now_suffix: Cow<'static, str>,
    /// Between unit labels.
    pub delimiter: Cow<'static, str>,
    /// Between a count and its caption.
    pub delimiter_caption: Cow<'static, str>,

    // ── visibility ────────────────────────────────────────────────────
    pub show_week: Show,
    pub show_day: Show,
    pub show_hour: Show,
    pub show_minute: Show,
    pub show_second: Show,
    pub show_millisecond: Show,
    /// Ignore the auto-visibility windows: show every nonzero unit.
    pub precise: bool,
    /// Force zero buckets coarser than the first nonzero unit
    /// (`0 hours 5 minutes`).
    pub show_zero_lead: bool,
    /// Force zero buckets finer than the last nonzero unit
    /// (`2 hours 0 minutes`).
    pub show_zero_trail: bool,
    /// Render `0 ms` for a zero-length duration instead of the null label.
    pub show_zero_ms: bool,

    // ── HTML wrapping ─────────────────────────────────────────────────
    pub html: bool,
    /// Tag around the whole rendered string.
    pub tag_wrapper: Option<Cow<'static, str>>,
    /// Tag around each per-unit label.
    pub tag_label_wrapper: Option<Cow<'static, str>>,
    pub tag_count: Option<Cow<'static, str>>,
    pub tag_caption: Option<Cow<'static, str>>,
    /// Class applied to the wrapper of a past duration.
    pub class_past: Option<Cow<'static, str>>,
    pub class_count: Option<Cow<'static, str>>,
    pub class_caption: Option<Cow<'static, str>>,
    pub class_label_wrapper: Option<Cow<'static, str>>,

    // ── input scaling ─────────────────────────────────────────────────
    pub input_unit: InputUnit,
}

impl Default for DurationFormat {
    fn default() -> Self {
        Self {
            week: Cow::Borrowed("week"),
            weeks: Cow::Borrowed("weeks"),
            day: Cow::Borrowed("day"),
            days: Cow::Borrowed("days"),
            hour: Cow::Borrowed("hour"),
            hours: Cow::Borrowed("hours"),
            minute: Cow::Borrowed("minute"),
            minutes: Cow::Borrowed("minutes"),
            second: Cow::Borrowed("second"),
            seconds: Cow::Borrowed("seconds"),
            millisecond: Cow::Borrowed("ms"),
            milliseconds: Cow::Borrowed("ms"),
            null_label: Cow::Borrowed("---"),
            past_prefix: Cow::Borrowed("("),
            past_suffix: Cow::Borrowed(")"),
            future_prefix: Cow::Borrowed(""),
            future_suffix: Cow::Borrowed(""),
            now_prefix: Cow::Borrowed(""),
            now_suffix: Cow::Borrowed(""),
            delimiter: Cow::Borrowed(" "),
            delimiter_caption: Cow::Borrowed(" "),
            show_week: Show::Auto,
            show_day: Show::Auto,
            show_hour: Show::Auto,
            show_minute: Show::Auto,
            show_second: Show::Auto,
            show_millisecond: Show::Auto,
            precise: false,
            show_zero_lead: false,
            show_zero_trail: false,
            show_zero_ms: true,
            html: false,
            tag_wrapper: None,
            tag_label_wrapper: None,
            tag_count: Some(Cow::Borrowed("em")),
            tag_caption: Some(Cow::Borrowed("small")),
            class_past: Some(Cow::Borrowed("past-date")),
            class_count: None,
            class_caption: None,
            class_label_wrapper: None,
            input_unit: InputUnit::Milliseconds,
        }
    }
}

impl DurationFormat {
    /// Preset for "time since/until" phrasing: `1 minute ago` for the
    /// past, `in 1 minute` for the future.
    pub fn since() -> Self {
        Self {
            past_prefix: Cow::Borrowed(""),
            past_suffix: Cow::Borrowed(" ago"),
            future_prefix: Cow::Borrowed("in "),
            future_suffix: Cow::Borrowed(""),
            ..Self::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Breakdown
// ═══════════════════════════════════════════════════════════════════════════

/// Greedy decomposition of a millisecond magnitude into unit buckets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Breakdown {
    pub weeks: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub millis: u64,
    /// Sign of the original delta.
    pub past: bool,
}

/// Decompose a delta into week/day/hour/minute/second/millisecond counts.
///
/// The sign is recorded as `past` and the magnitude split greedily, each
/// bucket taking `floor(remaining / unit)`.  Non-finite input yields
/// `None`.
pub fn breakdown(ms: f64, input_unit: InputUnit) -> Option<Breakdown> {
    if !ms.is_finite() {
        return None;
    }
    let scaled = ms * input_unit.scale_ms();
    let mut remaining = scaled.abs();
    let mut take = |unit_ms: f64| -> u64 {
        if unit_ms > remaining {
            return 0;
        }
        let n = (remaining / unit_ms).floor();
        remaining -= n * unit_ms;
        n as u64
    };
    Some(Breakdown {
        weeks: take(MS_PER_WEEK as f64),
        days: take(MS_PER_DAY as f64),
        hours: take(MS_PER_HOUR as f64),
        minutes: take(MS_PER_MINUTE as f64),
        seconds: take(MS_PER_SECOND as f64),
        millis: take(1.0),
        past: scaled < 0.0,
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════

fn html_tag(tag: Option<&str>, inner: &str, class: Option<&str>) -> String {
    match (tag, class) {
        (None, None) => inner.to_string(),
        (None, Some(class)) => format!("<span class=\"{class}\">{inner}</span>"),
        (Some(tag), None) => format!("<{tag}>{inner}</{tag}>"),
        (Some(tag), Some(class)) => format!("<{tag} class=\"{class}\">{inner}</{tag}>"),
    }
}

fn unit_label(value: u64, caption: &str, fmt: &DurationFormat) -> String {
    if fmt.html {
        let count = html_tag(
            fmt.tag_count.as_deref(),
            &value.to_string(),
            fmt.class_count.as_deref(),
        );
        let caption = html_tag(fmt.tag_caption.as_deref(), caption, fmt.class_caption.as_deref());
        html_tag(
            fmt.tag_label_wrapper.as_deref(),
            &format!("{count}{}{caption}", fmt.delimiter_caption),
            fmt.class_label_wrapper.as_deref(),
        )
    } else {
        format!("{value}{}{caption}", fmt.delimiter_caption)
    }
}

#[inline]
fn pluralize<'a>(n: u64, singular: &'a str, plural: &'a str) -> &'a str {
    if n == 1 {
        singular
    } else {
        plural
    }
}

/// Format a millisecond delta as a human-readable label.
///
/// See the [module docs](self) for the configuration surface.  A negative
/// delta renders with the past prefix/suffix, zero with the "now" pair,
/// and anything non-finite as the null label.
pub fn format_duration(ms: f64, fmt: &DurationFormat) -> String {
    let Some(parts) = breakdown(ms, fmt.input_unit) else {
        return fmt.null_label.clone().into_owned();
    };

    let total = (ms * fmt.input_unit.scale_ms()).abs();
    let day = MS_PER_DAY as f64;
    let hour = MS_PER_HOUR as f64;
    let minute = MS_PER_MINUTE as f64;
    let second = MS_PER_SECOND as f64;

    // (count, singular, plural, policy, unit size, auto upper window)
    let units: [(u64, &str, &str, Show, f64, f64); 6] = [
        (parts.weeks, &fmt.week, &fmt.weeks, fmt.show_week, day * 7.0, f64::INFINITY),
        (parts.days, &fmt.day, &fmt.days, fmt.show_day, day, day * 30.0),
        (parts.hours, &fmt.hour, &fmt.hours, fmt.show_hour, hour, day * 7.0),
        (parts.minutes, &fmt.minute, &fmt.minutes, fmt.show_minute, minute, hour * 2.0),
        (parts.seconds, &fmt.second, &fmt.seconds, fmt.show_second, second, minute * 2.0),
        (parts.millis, &fmt.millisecond, &fmt.milliseconds, fmt.show_millisecond, 1.0, second * 2.0),
    ];

    let mut label = String::new();
    for (index, &(value, singular, plural, policy, unit_ms, upper)) in units.iter().enumerate() {
        let mut visible = match policy {
            Show::Always => true,
            Show::Never => false,
            Show::Auto => {
                let mut show = if fmt.precise {
                    value > 0
                } else {
                    value > 0 && total <= upper
                };
                if value == 0 {
                    if fmt.show_zero_lead && total <= unit_ms {
                        show = true;
                    } else if fmt.show_zero_trail && total >= unit_ms {
                        show = true;
                    }
                }
                show
            }
        };

        // The millisecond slot alone may represent a zero-length duration.
        let is_millis = index == units.len() - 1;
        if is_millis && label.is_empty() && total == 0.0 && fmt.show_zero_ms {
            visible = true;
        }

        if !visible {
            continue;
        }
        if !label.is_empty() {
            label.push_str(&fmt.delimiter);
        }
        label.push_str(&unit_label(value, pluralize(value, singular, plural), fmt));
    }

    if label.is_empty() {
        return fmt.null_label.clone().into_owned();
    }

    let (prefix, suffix) = if ms == 0.0 {
        (&fmt.now_prefix, &fmt.now_suffix)
    } else if parts.past {
        (&fmt.past_prefix, &fmt.past_suffix)
    } else {
        (&fmt.future_prefix, &fmt.future_suffix)
    };
    let label = format!("{prefix}{label}{suffix}");

    if !fmt.html {
        return label;
    }
    html_tag(
        fmt.tag_wrapper.as_deref(),
        &label,
        if parts.past {
            fmt.class_past.as_deref()
        } else {
            None
        },
    )
}

/// Format the elapsed time between two instants (`target − now`).
///
/// Pair with [`DurationFormat::since`] for `… ago` / `in …` phrasing.
pub fn format_since(target: Instant, now: Instant, fmt: &DurationFormat) -> String {
    format_duration((target - now) as f64, fmt)
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt() -> DurationFormat {
        DurationFormat::default()
    }

    #[test]
    fn breakdown_is_greedy_coarse_to_fine() {
        let b = breakdown(90_000.0, InputUnit::Milliseconds).unwrap();
        assert_eq!(
            b,
            Breakdown {
                minutes: 1,
                seconds: 30,
                ..Breakdown::default()
            }
        );

        let b = breakdown(-(MS_PER_WEEK + 2 * MS_PER_DAY + 5) as f64, InputUnit::Milliseconds)
            .unwrap();
        assert_eq!(b.weeks, 1);
        assert_eq!(b.days, 2);
        assert_eq!(b.millis, 5);
        assert!(b.past);
    }

    #[test]
    fn breakdown_rejects_non_finite_input() {
        assert_eq!(breakdown(f64::NAN, InputUnit::Milliseconds), None);
        assert_eq!(breakdown(f64::INFINITY, InputUnit::Milliseconds), None);
        assert_eq!(breakdown(f64::NEG_INFINITY, InputUnit::Seconds), None);
    }

    #[test]
    fn breakdown_scales_the_input_unit() {
        let b = breakdown(90.0, InputUnit::Seconds).unwrap();
        assert_eq!((b.minutes, b.seconds), (1, 30));
        let b = breakdown(36.0, InputUnit::Hours).unwrap();
        assert_eq!((b.days, b.hours), (1, 12));
    }

    #[test]
    fn nan_renders_the_null_label() {
        assert_eq!(format_duration(f64::NAN, &fmt()), "---");
        assert_eq!(format_duration(f64::INFINITY, &fmt()), "---");
    }

    #[test]
    fn zero_is_the_now_case() {
        assert_eq!(format_duration(0.0, &fmt()), "0 ms");
        let decorated = DurationFormat {
            now_prefix: "just ".into(),
            now_suffix: " now".into(),
            ..fmt()
        };
        assert_eq!(format_duration(0.0, &decorated), "just 0 ms now");
        // Opting out of the zero-ms rendering leaves nothing to show.
        let bare = DurationFormat {
            show_zero_ms: false,
            ..fmt()
        };
        assert_eq!(format_duration(0.0, &bare), "---");
    }

    #[test]
    fn negative_deltas_render_as_past() {
        assert_eq!(format_duration(-90_000.0, &fmt()), "(1 minute 30 seconds)");
        assert_eq!(format_duration(90_000.0, &fmt()), "1 minute 30 seconds");
    }

    #[test]
    fn since_preset_phrasing() {
        let since = DurationFormat::since();
        assert_eq!(format_duration(-90_000.0, &since), "1 minute 30 seconds ago");
        assert_eq!(format_duration(90_000.0, &since), "in 1 minute 30 seconds");
        assert_eq!(
            format_since(Instant::from_millis(0), Instant::from_millis(90_000), &since),
            "1 minute 30 seconds ago"
        );
    }

    #[test]
    fn pluralization_per_unit() {
        assert_eq!(format_duration(MS_PER_WEEK as f64, &fmt()), "1 week");
        assert_eq!(format_duration(2.0 * MS_PER_WEEK as f64, &fmt()), "2 weeks");
        assert_eq!(format_duration(1.0, &fmt()), "1 ms");
    }

    #[test]
    fn auto_windows_suppress_noisy_units() {
        // Past two hours, minutes stop being useful.
        assert_eq!(
            format_duration((2 * MS_PER_HOUR + 30 * MS_PER_MINUTE) as f64, &fmt()),
            "2 hours"
        );
        // Past 30 days, days stop being useful.
        assert_eq!(format_duration(31.0 * MS_PER_DAY as f64, &fmt()), "4 weeks");
        // Short durations keep their fine units.
        assert_eq!(
            format_duration((MS_PER_MINUTE + 5 * MS_PER_SECOND) as f64, &fmt()),
            "1 minute 5 seconds"
        );
        // Milliseconds only show under two seconds.
        assert_eq!(format_duration(1_500.0, &fmt()), "1 second 500 ms");
        assert_eq!(format_duration(5_250.0, &fmt()), "5 seconds");
    }

    #[test]
    fn precise_mode_ignores_the_windows() {
        let precise = DurationFormat {
            precise: true,
            ..fmt()
        };
        assert_eq!(
            format_duration((2 * MS_PER_HOUR + 30 * MS_PER_MINUTE) as f64, &precise),
            "2 hours 30 minutes"
        );
    }

    #[test]
    fn explicit_show_overrides_win() {
        let no_seconds = DurationFormat {
            show_second: Show::Never,
            ..fmt()
        };
        assert_eq!(format_duration(90_000.0, &no_seconds), "1 minute");

        let forced_ms = DurationFormat {
            show_millisecond: Show::Always,
            ..fmt()
        };
        assert_eq!(format_duration(90_000.0, &forced_ms), "1 minute 30 seconds 0 ms");
    }

    #[test]
    fn zero_lead_and_trail_flags() {
        let lead = DurationFormat {
            show_zero_lead: true,
            ..fmt()
        };
        assert_eq!(
            format_duration(5.0 * MS_PER_MINUTE as f64, &lead),
            "0 weeks 0 days 0 hours 5 minutes"
        );

        let trail = DurationFormat {
            show_zero_trail: true,
            ..fmt()
        };
        assert_eq!(
            format_duration(2.0 * MS_PER_HOUR as f64, &trail),
            "2 hours 0 minutes 0 seconds 0 ms"
        );
    }

    #[test]
    fn custom_words_and_delimiters() {
        let compact = DurationFormat {
            minute: "m".into(),
            minutes: "m".into(),
            second: "s".into(),
            seconds: "s".into(),
            delimiter: ", ".into(),
            delimiter_caption: "".into(),
            ..fmt()
        };
        assert_eq!(format_duration(90_000.0, &compact), "1m, 30s");
    }

    #[test]
    fn input_unit_scaling() {
        let as_seconds = DurationFormat {
            input_unit: InputUnit::Seconds,
            ..fmt()
        };
        assert_eq!(format_duration(90.0, &as_seconds), "1 minute 30 seconds");
        let as_days = DurationFormat {
            input_unit: InputUnit::Days,
            ..fmt()
        };
        assert_eq!(format_duration(9.0, &as_days), "1 week 2 days");
    }

    #[test]
    fn html_wrapping() {
        let html = DurationFormat {
            html: true,
            ..fmt()
        };
        assert_eq!(
            format_duration(60_000.0, &html),
            "<em>1</em> <small>minute</small>"
        );
        // A past duration gains the past class on an implicit span.
        assert_eq!(
            format_duration(-60_000.0, &html),
            "<span class=\"past-date\">(<em>1</em> <small>minute</small>)</span>"
        );

        let full = DurationFormat {
            html: true,
            tag_wrapper: Some("div".into()),
            tag_label_wrapper: Some("span".into()),
            class_label_wrapper: Some("unit".into()),
            class_count: Some("n".into()),
            ..fmt()
        };
        assert_eq!(
            format_duration(60_000.0, &full),
            "<div><span class=\"unit\"><em class=\"n\">1</em> <small>minute</small></span></div>"
        );
    }

    #[test]
    fn empty_rendering_falls_back_to_the_null_label() {
        let nothing = DurationFormat {
            show_week: Show::Never,
            show_day: Show::Never,
            show_hour: Show::Never,
            show_minute: Show::Never,
            show_second: Show::Never,
            show_millisecond: Show::Never,
            ..fmt()
        };
        assert_eq!(format_duration(90_000.0, &nothing), "---");
    }
}
