//! Per-cell interaction state
//!
//! Each grid cell is identified by a (control, organization) pair and has
//! one boolean: whether its detail popover is open. All of that state lives
//! in one [`CellStates`] map owned by the host, keyed by [`CellId`], instead
//! of inside whatever rendered the cell.
//!
//! How many popovers may be open at once is a [`PopoverPolicy`]:
//!
//! - [`PopoverPolicy::Multiple`]: every cell toggles independently. State is
//!   O(open cells) and any number of popovers can be open together.
//! - [`PopoverPolicy::Single`]: opening a cell closes whichever cell was open
//!   before, so at most one popover is ever open. Cells are no longer
//!   isolated from each other.

use crate::dataset::{Control, ControlId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Justification shown when there is no usable text.
pub const NO_INFORMATION: &str = "No information available";

/// One grid cell: a control crossed with an organization column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId {
    pub control: ControlId,
    pub org: String,
}

impl CellId {
    pub fn new(control: ControlId, org: impl Into<String>) -> Self {
        Self { control, org: org.into() }
    }

    /// HTML-safe anchor, e.g. `cell-0-1-0-3-OpenAI`. Bytes outside
    /// `[A-Za-z0-9]` are written as `_XX`, so distinct organizations never
    /// share an anchor.
    pub fn anchor(&self) -> String {
        let mut out = format!("cell-{}-", self.control.to_string().replace('.', "-"));
        for byte in self.org.bytes() {
            if byte.is_ascii_alphanumeric() {
                out.push(char::from(byte));
            } else {
                let _ = write!(out, "_{:02X}", byte);
            }
        }
        out
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.control, self.org)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopoverPolicy {
    /// Cells toggle independently.
    #[default]
    Multiple,
    /// At most one popover open at a time.
    Single,
}

impl fmt::Display for PopoverPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopoverPolicy::Multiple => f.write_str("multiple"),
            PopoverPolicy::Single => f.write_str("single"),
        }
    }
}

impl FromStr for PopoverPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "multiple" | "multi" => Ok(PopoverPolicy::Multiple),
            "single" => Ok(PopoverPolicy::Single),
            other => Err(format!("unknown popover policy '{}' (expected multiple or single)", other)),
        }
    }
}

/// Open/closed state of every cell. Cells not present are closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStates {
    policy: PopoverPolicy,
    open: BTreeSet<CellId>,
}

impl CellStates {
    pub fn new(policy: PopoverPolicy) -> Self {
        Self { policy, open: BTreeSet::new() }
    }

    pub fn policy(&self) -> PopoverPolicy {
        self.policy
    }

    pub fn is_open(&self, id: &CellId) -> bool {
        self.open.contains(id)
    }

    /// Flip a cell and return its new state. Always succeeds; the id is not
    /// checked against any dataset.
    pub fn toggle(&mut self, id: &CellId) -> bool {
        if self.open.remove(id) {
            return false;
        }
        if self.policy == PopoverPolicy::Single {
            self.open.clear();
        }
        self.open.insert(id.clone());
        true
    }

    pub fn close_all(&mut self) {
        self.open.clear();
    }

    /// Open cells in id order.
    pub fn open_cells(&self) -> impl Iterator<Item = &CellId> {
        self.open.iter()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

/// Whether a cell is backed by a dataset entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataState {
    Present,
    Missing,
}

/// What a cell's popover shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellDetail {
    pub org: String,
    pub control: String,
    pub score: u8,
    pub justification: String,
    pub sources: Vec<String>,
    pub data: DataState,
}

impl CellDetail {
    /// Detail for `org` on `control`, filling defaults for missing data.
    ///
    /// A present entry with an empty justification also shows
    /// [`NO_INFORMATION`], but stays [`DataState::Present`].
    pub fn resolve(control: &Control, org: &str) -> Self {
        match control.compliance_for(org) {
            Some(info) => CellDetail {
                org: org.to_string(),
                control: control.name.clone(),
                score: info.score(),
                justification: if info.justification.is_empty() {
                    NO_INFORMATION.to_string()
                } else {
                    info.justification.clone()
                },
                sources: info.sources.clone(),
                data: DataState::Present,
            },
            None => CellDetail {
                org: org.to_string(),
                control: control.name.clone(),
                score: 0,
                justification: NO_INFORMATION.to_string(),
                sources: Vec::new(),
                data: DataState::Missing,
            },
        }
    }

    pub fn is_missing(&self) -> bool {
        self.data == DataState::Missing
    }

    /// Popover heading, e.g. `"OpenAI - MFA enforced"`.
    pub fn title(&self) -> String {
        format!("{} - {}", self.org, self.control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::control;
    use crate::dataset::ComplianceInfo;

    fn cell(control: usize, org: &str) -> CellId {
        CellId::new(ControlId::new(0, 0, 0, control), org)
    }

    // ==========================================================================
    // TOGGLING
    // ==========================================================================

    #[test]
    fn test_cells_start_closed() {
        let states = CellStates::default();
        assert_eq!(states.policy(), PopoverPolicy::Multiple);
        assert!(!states.is_open(&cell(0, "OpenAI")));
        assert_eq!(states.open_count(), 0);
    }

    #[test]
    fn test_toggle_twice_round_trips() {
        for policy in [PopoverPolicy::Multiple, PopoverPolicy::Single] {
            let mut states = CellStates::new(policy);
            let id = cell(0, "OpenAI");
            assert!(states.toggle(&id));
            assert!(states.is_open(&id));
            assert!(!states.toggle(&id));
            assert!(!states.is_open(&id));
            assert_eq!(states, CellStates::new(policy));
        }
    }

    #[test]
    fn test_multiple_policy_isolates_cells() {
        let mut states = CellStates::new(PopoverPolicy::Multiple);
        let a = cell(0, "OpenAI");
        let b = cell(1, "Anthropic");

        states.toggle(&a);
        states.toggle(&b);
        assert!(states.is_open(&a));
        assert!(states.is_open(&b));

        states.toggle(&b);
        assert!(states.is_open(&a), "closing b must not touch a");
        assert!(!states.is_open(&b));
    }

    #[test]
    fn test_single_policy_keeps_at_most_one_open() {
        let mut states = CellStates::new(PopoverPolicy::Single);
        let a = cell(0, "OpenAI");
        let b = cell(0, "Google");

        states.toggle(&a);
        states.toggle(&b);
        assert!(!states.is_open(&a));
        assert!(states.is_open(&b));
        assert_eq!(states.open_count(), 1);
        assert_eq!(states.open_cells().collect::<Vec<_>>(), vec![&b]);
    }

    #[test]
    fn test_close_all() {
        let mut states = CellStates::new(PopoverPolicy::Multiple);
        states.toggle(&cell(0, "OpenAI"));
        states.toggle(&cell(2, "Meta"));
        states.close_all();
        assert_eq!(states.open_count(), 0);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("single".parse::<PopoverPolicy>().unwrap(), PopoverPolicy::Single);
        assert_eq!("Multiple".parse::<PopoverPolicy>().unwrap(), PopoverPolicy::Multiple);
        assert!("several".parse::<PopoverPolicy>().is_err());
        assert_eq!(PopoverPolicy::Single.to_string(), "single");
    }

    // ==========================================================================
    // CELL IDS
    // ==========================================================================

    #[test]
    fn test_cell_id_forms() {
        let id = CellId::new(ControlId::new(1, 2, 0, 7), "x AI");
        assert_eq!(id.to_string(), "1.2.0.7@x AI");
        assert_eq!(id.anchor(), "cell-1-2-0-7-x_20AI");
    }

    #[test]
    fn test_anchors_distinguish_similar_orgs() {
        let control = ControlId::new(0, 0, 0, 0);
        let spaced = CellId::new(control, "x AI").anchor();
        let underscored = CellId::new(control, "x_AI").anchor();
        assert_ne!(spaced, underscored);
        assert_eq!(underscored, "cell-0-0-0-0-x_5FAI");
        assert_eq!(CellId::new(control, "Méta").anchor(), "cell-0-0-0-0-M_C3_A9ta");
    }

    // ==========================================================================
    // DETAIL PAYLOAD
    // ==========================================================================
    //
    // Missing data and an explicit 0 look the same on the grid (score 0,
    // "none" color) but must stay distinguishable in the detail.
    // ==========================================================================

    #[test]
    fn test_missing_entry_detail() {
        let ctrl = control("MFA enforced", &[("OpenAI", 100)]);
        let detail = CellDetail::resolve(&ctrl, "Google");
        assert_eq!(detail.score, 0);
        assert_eq!(detail.justification, NO_INFORMATION);
        assert!(detail.sources.is_empty());
        assert!(detail.is_missing());
    }

    #[test]
    fn test_explicit_zero_is_not_missing() {
        let mut ctrl = control("MFA enforced", &[]);
        ctrl.compliance.insert(
            "Anthropic".to_string(),
            ComplianceInfo::new(0, "No public statement.", vec!["https://example.org".to_string()]),
        );
        let detail = CellDetail::resolve(&ctrl, "Anthropic");
        assert_eq!(detail.score, 0);
        assert_eq!(detail.justification, "No public statement.");
        assert_eq!(detail.sources, vec!["https://example.org".to_string()]);
        assert!(!detail.is_missing());
        assert_ne!(detail, CellDetail::resolve(&ctrl, "Google"));
    }

    #[test]
    fn test_empty_justification_falls_back_but_stays_present() {
        let mut ctrl = control("CCTV", &[]);
        ctrl.compliance.insert("Meta".to_string(), ComplianceInfo::new(25, "", vec![]));
        let detail = CellDetail::resolve(&ctrl, "Meta");
        assert_eq!(detail.justification, NO_INFORMATION);
        assert_eq!(detail.data, DataState::Present);
        assert_eq!(detail.score, 25);
    }

    #[test]
    fn test_detail_title() {
        let ctrl = control("MFA enforced", &[]);
        assert_eq!(CellDetail::resolve(&ctrl, "xAI").title(), "xAI - MFA enforced");
    }
}
