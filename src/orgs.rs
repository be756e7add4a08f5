//! Organization columns
//!
//! The grid's columns come from the host, not from the dataset. An
//! organization listed here but never scored renders as "no information";
//! an organization scored in the dataset but not listed here is not shown.

use crate::error::OrgSetError;
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;

/// Labs compared by the published heatmap, in column order.
pub const DEFAULT_ORGANIZATIONS: &[&str] = &["OpenAI", "Anthropic", "Google", "xAI", "Meta"];

/// Ordered, duplicate-free list of organization identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrganizationSet {
    ids: Vec<String>,
}

impl OrganizationSet {
    pub fn new<I, S>(ids: I) -> Result<Self, OrgSetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Err(OrgSetError::Empty);
        }

        let mut seen = HashSet::new();
        for (i, id) in ids.iter().enumerate() {
            if id.trim().is_empty() {
                return Err(OrgSetError::Blank(i));
            }
            if !seen.insert(id.as_str()) {
                return Err(OrgSetError::Duplicate(id.clone()));
            }
        }

        Ok(Self { ids })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, org: &str) -> bool {
        self.ids.iter().any(|id| id == org)
    }

    pub fn position(&self, org: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == org)
    }
}

impl Default for OrganizationSet {
    fn default() -> Self {
        Self {
            ids: DEFAULT_ORGANIZATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Parses a comma-separated list, e.g. `"OpenAI, Anthropic,Google"`.
impl FromStr for OrganizationSet {
    type Err = OrgSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(OrgSetError::Empty);
        }
        Self::new(s.split(',').map(str::trim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_column_order() {
        let orgs = OrganizationSet::default();
        assert_eq!(
            orgs.iter().collect::<Vec<_>>(),
            vec!["OpenAI", "Anthropic", "Google", "xAI", "Meta"]
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let orgs = OrganizationSet::new(["Meta", "OpenAI", "Google"]).unwrap();
        assert_eq!(orgs.iter().collect::<Vec<_>>(), vec!["Meta", "OpenAI", "Google"]);
        assert_eq!(orgs.position("Google"), Some(2));
        assert_eq!(orgs.position("xAI"), None);
    }

    #[test]
    fn test_parse_comma_list() {
        let orgs: OrganizationSet = "OpenAI, Anthropic ,Google".parse().unwrap();
        assert_eq!(orgs.len(), 3);
        assert!(orgs.contains("Anthropic"));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!("".parse::<OrganizationSet>(), Err(OrgSetError::Empty));
        assert_eq!(OrganizationSet::new(Vec::<String>::new()), Err(OrgSetError::Empty));
    }

    #[test]
    fn test_rejects_duplicates() {
        assert_eq!(
            "OpenAI,Meta,OpenAI".parse::<OrganizationSet>(),
            Err(OrgSetError::Duplicate("OpenAI".to_string()))
        );
    }

    #[test]
    fn test_rejects_blank_entry() {
        assert_eq!("OpenAI,,Meta".parse::<OrganizationSet>(), Err(OrgSetError::Blank(1)));
    }
}
