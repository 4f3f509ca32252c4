//! The five output classes.
//!
//! Order matters: [`Label::index`] is the position of the class in every
//! probability vector, and must match the output order of the trained
//! classification head.
//!
//! ```text
//! index  label            paper type            nature
//! 0      Conference       "Conference"          "Research"
//! 1      Journal          "Journal"             "Research"
//! 2      Implementation   "Research Paper"      "Implementation"
//! 3      Theory           "Research Paper"      "Theory"
//! 4      NotResearch      "Not Research Paper"  -
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of classes the classifier distinguishes.
pub const NUM_LABELS: usize = 5;

/// A document class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    /// Conference paper.
    Conference,
    /// Journal article.
    Journal,
    /// Implementation-focused research.
    Implementation,
    /// Theory-focused research.
    Theory,
    /// Not a research paper at all.
    NotResearch,
}

impl Label {
    /// All labels in index order.
    pub const ALL: [Self; NUM_LABELS] = [
        Self::Conference,
        Self::Journal,
        Self::Implementation,
        Self::Theory,
        Self::NotResearch,
    ];

    /// Position of this label in a probability vector.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The label at `index`, if in range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Canonical name, as used by the training data.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conference => "Conference",
            Self::Journal => "Journal",
            Self::Implementation => "Implementation",
            Self::Theory => "Theory",
            Self::NotResearch => "NotResearch",
        }
    }

    /// Whether this label denotes any kind of research paper.
    #[must_use]
    pub const fn is_research(self) -> bool {
        !matches!(self, Self::NotResearch)
    }

    /// The publication type reported for this label.
    ///
    /// Venue labels report themselves; content labels only say the document
    /// is a research paper.
    #[must_use]
    pub const fn paper_type(self) -> &'static str {
        match self {
            Self::Conference => "Conference",
            Self::Journal => "Journal",
            Self::Implementation | Self::Theory => "Research Paper",
            Self::NotResearch => "Not Research Paper",
        }
    }

    /// The research nature reported for this label, `None` for non-research.
    #[must_use]
    pub const fn nature(self) -> Option<&'static str> {
        match self {
            Self::Conference | Self::Journal => Some("Research"),
            Self::Implementation => Some("Implementation"),
            Self::Theory => Some("Theory"),
            Self::NotResearch => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown label name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label: {0:?}")]
pub struct ParseLabelError(pub String);

impl FromStr for Label {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "conference" => Ok(Self::Conference),
            "journal" => Ok(Self::Journal),
            "implementation" => Ok(Self::Implementation),
            "theory" => Ok(Self::Theory),
            "notresearch" => Ok(Self::NotResearch),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_order() {
        for (i, label) in Label::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(Label::from_index(i), Some(*label));
        }
        assert_eq!(Label::from_index(NUM_LABELS), None);
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!("Theory".parse::<Label>(), Ok(Label::Theory));
        assert_eq!("not_research".parse::<Label>(), Ok(Label::NotResearch));
        assert_eq!("Not Research".parse::<Label>(), Ok(Label::NotResearch));
        assert!("Survey".parse::<Label>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for label in Label::ALL {
            assert_eq!(label.to_string().parse::<Label>(), Ok(label));
        }
    }

    #[test]
    fn test_paper_type_and_nature() {
        assert_eq!(Label::Journal.paper_type(), "Journal");
        assert_eq!(Label::Journal.nature(), Some("Research"));
        assert_eq!(Label::Theory.paper_type(), "Research Paper");
        assert_eq!(Label::Theory.nature(), Some("Theory"));
        assert_eq!(Label::NotResearch.nature(), None);
        assert!(!Label::NotResearch.is_research());
    }
}
