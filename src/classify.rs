//! Score classification
//!
//! Maps a 0-100 compliance score onto one of six color buckets. Thresholds are
//! inclusive lower bounds checked from the top down, with the two extremes
//! given their own stronger colors:
//!
//! | Score  | Bucket   | Color      |
//! |--------|----------|------------|
//! | 0      | none     | red-500    |
//! | 1-24   | low      | red-400    |
//! | 25-49  | mid-low  | orange-400 |
//! | 50-74  | mid-high | yellow-400 |
//! | 75-99  | high     | green-400  |
//! | 100    | full     | green-500  |
//!
//! Missing compliance data is colored like a score of 0. Telling the two
//! apart is the job of the cell detail, not the color.

use crate::dataset::{clamp_score, ComplianceInfo};
use serde::Serialize;
use std::fmt;

/// Visual bucket for a score. Variants are declared weakest to strongest, so
/// the derived `Ord` is the color-intensity ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    None,
    Low,
    MidLow,
    MidHigh,
    High,
    Full,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::None,
        Bucket::Low,
        Bucket::MidLow,
        Bucket::MidHigh,
        Bucket::High,
        Bucket::Full,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Bucket::None => "none",
            Bucket::Low => "low",
            Bucket::MidLow => "mid-low",
            Bucket::MidHigh => "mid-high",
            Bucket::High => "high",
            Bucket::Full => "full",
        }
    }

    /// Color token, in Tailwind palette naming.
    pub fn color_token(self) -> &'static str {
        match self {
            Bucket::None => "red-500",
            Bucket::Low => "red-400",
            Bucket::MidLow => "orange-400",
            Bucket::MidHigh => "yellow-400",
            Bucket::High => "green-400",
            Bucket::Full => "green-500",
        }
    }

    /// CSS hex value of [`Bucket::color_token`].
    pub fn hex(self) -> &'static str {
        match self {
            Bucket::None => "#ef4444",
            Bucket::Low => "#f87171",
            Bucket::MidLow => "#fb923c",
            Bucket::MidHigh => "#facc15",
            Bucket::High => "#4ade80",
            Bucket::Full => "#22c55e",
        }
    }

    /// 24-bit ANSI background escape for terminal output.
    pub fn ansi_bg(self) -> &'static str {
        match self {
            Bucket::None => "\x1b[48;2;239;68;68m",
            Bucket::Low => "\x1b[48;2;248;113;113m",
            Bucket::MidLow => "\x1b[48;2;251;146;60m",
            Bucket::MidHigh => "\x1b[48;2;250;204;21m",
            Bucket::High => "\x1b[48;2;74;222;128m",
            Bucket::Full => "\x1b[48;2;34;197;94m",
        }
    }

    pub fn contrast(self) -> Contrast {
        // Same text color on every bucket.
        Contrast::Light
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text color drawn on top of a bucket color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Contrast {
    /// Light text on the colored cell.
    Light,
    /// Dark text on the colored cell.
    Dark,
}

impl Contrast {
    pub fn css_class(self) -> &'static str {
        match self {
            Contrast::Light => "text-light",
            Contrast::Dark => "text-dark",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Contrast::Light => "#ffffff",
            Contrast::Dark => "#111827",
        }
    }

    pub fn ansi_fg(self) -> &'static str {
        match self {
            Contrast::Light => "\x1b[97m",
            Contrast::Dark => "\x1b[30m",
        }
    }
}

/// Bucket for a raw score. Out-of-range values are clamped first, so this
/// never fails.
pub fn classify(score: i64) -> Bucket {
    match clamp_score(score) {
        0 => Bucket::None,
        100 => Bucket::Full,
        s if s >= 75 => Bucket::High,
        s if s >= 50 => Bucket::MidHigh,
        s if s >= 25 => Bucket::MidLow,
        _ => Bucket::Low,
    }
}

/// Bucket for a possibly missing entry; missing counts as 0.
pub fn classify_entry(entry: Option<&ComplianceInfo>) -> Bucket {
    classify(entry.map(|info| i64::from(info.score())).unwrap_or(0))
}
