//! Compliance dataset model
//!
//! The dataset is a strict tree, loaded once from JSON and never mutated:
//!
//! ```text
//! SecurityLevel ─┬─ Category ─┬─ Subcategory ─┬─ Control ── { org → ComplianceInfo }
//!                │            │               └─ Control ── ...
//!                │            └─ Subcategory ── ...
//!                └─ Category ── ...
//! ```
//!
//! Every sequence keeps source order. A control's `compliance` mapping is
//! sparse: an organization without an entry has "no information available",
//! which is a valid state and not the same thing as a score of 0.
//!
//! # Input format
//!
//! ```json
//! [
//!   {
//!     "level": 5,
//!     "description": "Defends against top-priority operations ...",
//!     "categories": [
//!       {
//!         "name": "Access Control",
//!         "subcategories": [
//!           {
//!             "name": "",
//!             "controls": [
//!               {
//!                 "name": "MFA enforced",
//!                 "compliance": {
//!                   "OpenAI": { "score": 100, "sources": ["https://..."], "justification": "..." }
//!                 }
//!               }
//!             ]
//!           }
//!         ]
//!       }
//!     ]
//!   }
//! ]
//! ```
//!
//! `sources` and `justification` may be omitted and default to empty.

use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Lowest score a control can receive.
pub const MIN_SCORE: u8 = 0;
/// Highest score a control can receive.
pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityLevel {
    pub level: u32,
    pub description: String,
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub subcategories: Vec<Subcategory>,
}

/// A group of controls. An empty `name` means the group has no subheading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub name: String,
    pub controls: Vec<Control>,
}

impl Subcategory {
    pub fn has_heading(&self) -> bool {
        !self.name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub name: String,
    pub compliance: BTreeMap<String, ComplianceInfo>,
}

impl Control {
    /// Entry for `org`, or `None` when the dataset has no information.
    pub fn compliance_for(&self, org: &str) -> Option<&ComplianceInfo> {
        self.compliance.get(org)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceInfo {
    /// Raw score as stored. Use [`ComplianceInfo::score`] for display.
    #[serde(rename = "score")]
    pub raw_score: i64,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub justification: String,
}

impl ComplianceInfo {
    pub fn new(score: u8, justification: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            raw_score: i64::from(score),
            sources,
            justification: justification.into(),
        }
    }

    /// Score clamped to `0..=100`.
    pub fn score(&self) -> u8 {
        clamp_score(self.raw_score)
    }

    pub fn is_in_range(&self) -> bool {
        (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&self.raw_score)
    }
}

/// Clamp any integer into the `0..=100` score domain.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as u8
}

/// Position of a control in the tree: level, category, subcategory and
/// control indices. Stable for the lifetime of a [`Dataset`].
///
/// Rendered as `"0.1.0.3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId {
    pub level: usize,
    pub category: usize,
    pub subcategory: usize,
    pub control: usize,
}

impl ControlId {
    pub fn new(level: usize, category: usize, subcategory: usize, control: usize) -> Self {
        Self { level, category, subcategory, control }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.level, self.category, self.subcategory, self.control)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseControlIdError(String);

impl fmt::Display for ParseControlIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid control id '{}': expected four dot-separated indices", self.0)
    }
}

impl std::error::Error for ParseControlIdError {}

impl FromStr for ControlId {
    type Err = ParseControlIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<usize> = s
            .split('.')
            .map(|p| p.parse::<usize>())
            .collect::<Result<_, _>>()
            .map_err(|_| ParseControlIdError(s.to_string()))?;

        match parts.as_slice() {
            [level, category, subcategory, control] => {
                Ok(ControlId::new(*level, *category, *subcategory, *control))
            }
            _ => Err(ParseControlIdError(s.to_string())),
        }
    }
}

impl Serialize for ControlId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ControlId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Validated, immutable compliance dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    levels: Vec<SecurityLevel>,
}

impl Dataset {
    /// Build a dataset from already-constructed levels, applying the same
    /// validation as the JSON loaders.
    pub fn new(levels: Vec<SecurityLevel>) -> Result<Self, DatasetError> {
        let dataset = Dataset { levels };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let levels: Vec<SecurityLevel> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let levels: Vec<SecurityLevel> = serde_json::from_reader(reader)?;
        Self::new(levels)
    }

    /// Read and validate a dataset file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(std::io::BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            levels = dataset.levels.len(),
            controls = dataset.control_count(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn levels(&self) -> &[SecurityLevel] {
        &self.levels
    }

    /// Entry for `org` on `control`, `None` when absent.
    pub fn compliance_for<'a>(&self, control: &'a Control, org: &str) -> Option<&'a ComplianceInfo> {
        control.compliance_for(org)
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.levels
            .get(id.level)?
            .categories
            .get(id.category)?
            .subcategories
            .get(id.subcategory)?
            .controls
            .get(id.control)
    }

    /// Every control in document order, with its id.
    pub fn controls(&self) -> impl Iterator<Item = (ControlId, &Control)> + '_ {
        self.levels.iter().enumerate().flat_map(|(li, level)| {
            level.categories.iter().enumerate().flat_map(move |(ci, category)| {
                category.subcategories.iter().enumerate().flat_map(move |(si, sub)| {
                    sub.controls
                        .iter()
                        .enumerate()
                        .map(move |(ki, control)| (ControlId::new(li, ci, si, ki), control))
                })
            })
        })
    }

    pub fn control_count(&self) -> usize {
        self.controls().count()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    fn validate(&self) -> Result<(), DatasetError> {
        let mut seen_levels = HashSet::new();

        for (li, level) in self.levels.iter().enumerate() {
            if level.level == 0 {
                return Err(DatasetError::invalid(format!(
                    "security level at index {} has level 0; levels must be positive",
                    li
                )));
            }
            if !seen_levels.insert(level.level) {
                tracing::warn!(level = level.level, "duplicate security level in dataset");
            }
        }

        for (id, control) in self.controls() {
            for (org, info) in &control.compliance {
                if !info.is_in_range() {
                    tracing::warn!(
                        control = %id,
                        name = %control.name,
                        org = %org,
                        score = info.raw_score,
                        clamped = info.score(),
                        "score outside 0..=100, clamping"
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    // ==========================================================================
    // FIXTURES
    // ==========================================================================

    pub(crate) const MFA_DATASET: &str = r#"[
        {
            "level": 5,
            "description": "Top-priority operations",
            "categories": [
                {
                    "name": "Access Control",
                    "subcategories": [
                        {
                            "name": "",
                            "controls": [
                                {
                                    "name": "MFA enforced",
                                    "compliance": {
                                        "OpenAI": { "score": 100, "sources": ["https://openai.com/security"], "justification": "Hardware keys required." },
                                        "Anthropic": { "score": 0, "sources": [], "justification": "No public statement." }
                                    }
                                }
                            ]
                        }
                    ]
                }
            ]
        }
    ]"#;

    pub(crate) fn control(name: &str, entries: &[(&str, i64)]) -> Control {
        Control {
            name: name.to_string(),
            compliance: entries
                .iter()
                .map(|(org, score)| {
                    (
                        org.to_string(),
                        ComplianceInfo {
                            raw_score: *score,
                            sources: vec![],
                            justification: format!("{} scored {}", org, score),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Two levels, mixed subcategory headings.
    pub(crate) fn sample_dataset() -> Dataset {
        Dataset::new(vec![
            SecurityLevel {
                level: 3,
                description: "Cybercrime syndicates".to_string(),
                categories: vec![Category {
                    name: "Physical Security".to_string(),
                    subcategories: vec![Subcategory {
                        name: "Datacenter".to_string(),
                        controls: vec![
                            control("Badge access", &[("OpenAI", 75), ("Google", 100)]),
                            control("CCTV", &[("OpenAI", 25)]),
                        ],
                    }],
                }],
            },
            SecurityLevel {
                level: 4,
                description: "Standard nation-state operations".to_string(),
                categories: vec![
                    Category {
                        name: "Access Control".to_string(),
                        subcategories: vec![
                            Subcategory {
                                name: String::new(),
                                controls: vec![control("MFA enforced", &[("Anthropic", 50)])],
                            },
                            Subcategory {
                                name: "Weights".to_string(),
                                controls: vec![control("Two-person rule", &[])],
                            },
                        ],
                    },
                    Category {
                        name: "Monitoring".to_string(),
                        subcategories: vec![Subcategory {
                            name: String::new(),
                            controls: vec![control("Insider threat program", &[("Meta", 10)])],
                        }],
                    },
                ],
            },
        ])
        .expect("sample dataset is valid")
    }

    // ==========================================================================
    // LOADING
    // ==========================================================================

    #[test]
    fn test_load_mfa_dataset() {
        let dataset = Dataset::from_json_str(MFA_DATASET).unwrap();
        assert_eq!(dataset.levels().len(), 1);

        let level = &dataset.levels()[0];
        assert_eq!(level.level, 5);
        assert_eq!(level.categories[0].name, "Access Control");
        assert!(!level.categories[0].subcategories[0].has_heading());

        let control = &level.categories[0].subcategories[0].controls[0];
        assert_eq!(control.name, "MFA enforced");
        assert_eq!(dataset.compliance_for(control, "OpenAI").unwrap().score(), 100);
        assert_eq!(dataset.compliance_for(control, "Anthropic").unwrap().score(), 0);
        assert!(dataset.compliance_for(control, "Google").is_none());
    }

    #[test]
    fn test_empty_array_is_valid() {
        let dataset = Dataset::from_json_str("[]").unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.control_count(), 0);
    }

    #[test]
    fn test_optional_sources_and_justification() {
        let json = r#"[{"level": 1, "description": "", "categories": [{"name": "C", "subcategories": [
            {"name": "", "controls": [{"name": "X", "compliance": {"Meta": {"score": 25}}}]}
        ]}]}]"#;
        let dataset = Dataset::from_json_str(json).unwrap();
        let (_, control) = dataset.controls().next().unwrap();
        let info = control.compliance_for("Meta").unwrap();
        assert!(info.sources.is_empty());
        assert!(info.justification.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, MFA_DATASET.as_bytes()).unwrap();
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.control_count(), 1);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Dataset::load("/nonexistent/compliance-data.json").unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }

    // ==========================================================================
    // MALFORMED INPUT
    // ==========================================================================
    //
    // Any structural or type violation aborts loading. There is no partial
    // dataset to render.
    // ==========================================================================

    fn assert_malformed(json: &str) {
        match Dataset::from_json_str(json) {
            Err(DatasetError::Malformed { .. }) => {}
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_control_missing_name() {
        assert_malformed(
            r#"[{"level": 5, "description": "d", "categories": [{"name": "C", "subcategories": [
                {"name": "", "controls": [{"compliance": {}}]}
            ]}]}]"#,
        );
    }

    #[test]
    fn test_score_wrong_type() {
        assert_malformed(
            r#"[{"level": 5, "description": "d", "categories": [{"name": "C", "subcategories": [
                {"name": "", "controls": [{"name": "X", "compliance": {"OpenAI": {"score": "high"}}}]}
            ]}]}]"#,
        );
    }

    #[test]
    fn test_fractional_score() {
        assert_malformed(
            r#"[{"level": 5, "description": "d", "categories": [{"name": "C", "subcategories": [
                {"name": "", "controls": [{"name": "X", "compliance": {"OpenAI": {"score": 50.5}}}]}
            ]}]}]"#,
        );
    }

    #[test]
    fn test_level_zero() {
        assert_malformed(r#"[{"level": 0, "description": "d", "categories": []}]"#);
    }

    #[test]
    fn test_negative_level() {
        assert_malformed(r#"[{"level": -2, "description": "d", "categories": []}]"#);
    }

    #[test]
    fn test_top_level_not_array() {
        assert_malformed(r#"{"level": 5}"#);
    }

    #[test]
    fn test_missing_categories() {
        assert_malformed(r#"[{"level": 5, "description": "d"}]"#);
    }

    #[test]
    fn test_truncated_json() {
        assert_malformed(&MFA_DATASET[..MFA_DATASET.len() / 2]);
    }

    // ==========================================================================
    // SCORE DOMAIN
    // ==========================================================================

    #[test]
    fn test_out_of_range_scores_are_clamped_not_rejected() {
        let json = r#"[{"level": 2, "description": "", "categories": [{"name": "C", "subcategories": [
            {"name": "", "controls": [{"name": "X", "compliance": {
                "A": {"score": 140},
                "B": {"score": -5}
            }}]}
        ]}]}]"#;
        let dataset = Dataset::from_json_str(json).unwrap();
        let (_, control) = dataset.controls().next().unwrap();

        let a = control.compliance_for("A").unwrap();
        assert_eq!(a.raw_score, 140);
        assert_eq!(a.score(), 100);
        assert!(!a.is_in_range());

        let b = control.compliance_for("B").unwrap();
        assert_eq!(b.score(), 0);
        assert!(!b.is_in_range());
    }

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(i64::MIN), 0);
        assert_eq!(clamp_score(0), 0);
        assert_eq!(clamp_score(42), 42);
        assert_eq!(clamp_score(100), 100);
        assert_eq!(clamp_score(i64::MAX), 100);
    }

    #[test]
    fn test_duplicate_levels_are_allowed() {
        let json = r#"[
            {"level": 4, "description": "a", "categories": []},
            {"level": 4, "description": "b", "categories": []}
        ]"#;
        assert_eq!(Dataset::from_json_str(json).unwrap().levels().len(), 2);
    }

    // ==========================================================================
    // CONTROL IDS
    // ==========================================================================

    #[test]
    fn test_controls_in_document_order() {
        let dataset = sample_dataset();
        let names: Vec<&str> = dataset.controls().map(|(_, c)| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Badge access", "CCTV", "MFA enforced", "Two-person rule", "Insider threat program"]
        );
    }

    #[test]
    fn test_control_lookup_by_id() {
        let dataset = sample_dataset();
        for (id, control) in dataset.controls() {
            assert_eq!(dataset.control(id), Some(control));
        }
        assert_eq!(dataset.control(ControlId::new(1, 0, 1, 0)).unwrap().name, "Two-person rule");
        assert!(dataset.control(ControlId::new(9, 0, 0, 0)).is_none());
        assert!(dataset.control(ControlId::new(0, 0, 0, 2)).is_none());
    }

    #[test]
    fn test_control_id_text_form() {
        let id = ControlId::new(1, 0, 12, 3);
        assert_eq!(id.to_string(), "1.0.12.3");
        assert_eq!("1.0.12.3".parse::<ControlId>().unwrap(), id);

        assert!("1.0.12".parse::<ControlId>().is_err());
        assert!("1.0.12.3.4".parse::<ControlId>().is_err());
        assert!("a.b.c.d".parse::<ControlId>().is_err());
        assert!("".parse::<ControlId>().is_err());
    }

    #[test]
    fn test_control_id_serializes_as_string() {
        let id = ControlId::new(0, 1, 0, 2);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"0.1.0.2\"");
        let back: ControlId = serde_json::from_str("\"0.1.0.2\"").unwrap();
        assert_eq!(back, id);
    }
}
