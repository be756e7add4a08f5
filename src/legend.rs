//! Color legend shown under the heatmap.

use crate::classify::Bucket;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub bucket: Bucket,
    pub label: &'static str,
}

/// The published legend. The `low` band (1-24) has no entry of its own.
pub const LEGEND: &[LegendEntry] = &[
    LegendEntry { bucket: Bucket::None, label: "0% Compliant" },
    LegendEntry { bucket: Bucket::MidLow, label: "25% Compliant" },
    LegendEntry { bucket: Bucket::MidHigh, label: "50% Compliant" },
    LegendEntry { bucket: Bucket::High, label: "75% Compliant" },
    LegendEntry { bucket: Bucket::Full, label: "100% Compliant" },
];
