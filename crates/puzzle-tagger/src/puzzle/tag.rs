//! Hierarchical tags and the per-move tag sequence built from them.
//!
//! A tag is a chain of labels of increasing specificity (`pin:preventsEscape:q`).
//! Tags render as colon-joined labels and parse back from that rendering, so the
//! string form is used everywhere a tag is stored or compared.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TaggerError;

pub const LEVEL_SEPARATOR: char = ':';
pub const GROUP_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Leaf(String),
    Node(String, Box<Tag>),
}

impl Tag {
    pub fn leaf(label: impl Into<String>) -> Self {
        Tag::Leaf(label.into())
    }

    /// `label:<child>`
    pub fn node(label: impl Into<String>, child: Tag) -> Self {
        Tag::Node(label.into(), Box::new(child))
    }

    /// `label:sub` with a leaf child.
    pub fn with(label: impl Into<String>, sub: impl Into<String>) -> Self {
        Tag::node(label, Tag::leaf(sub))
    }

    /// Top-level label.
    pub fn label(&self) -> &str {
        match self {
            Tag::Leaf(label) | Tag::Node(label, _) => label,
        }
    }

    pub fn child(&self) -> Option<&Tag> {
        match self {
            Tag::Leaf(_) => None,
            Tag::Node(_, child) => Some(child),
        }
    }

    pub fn depth(&self) -> usize {
        1 + self.child().map_or(0, Tag::depth)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.to_string().starts_with(prefix)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Leaf(label) => f.write_str(label),
            Tag::Node(label, child) => write!(f, "{label}{LEVEL_SEPARATOR}{child}"),
        }
    }
}

impl FromStr for Tag {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut labels = s.split(LEVEL_SEPARATOR).rev();
        let bad = || TaggerError::MalformedTag(s.to_string());

        let last = labels.next().filter(|l| valid_label(l)).ok_or_else(bad)?;
        let mut tag = Tag::leaf(last);
        for label in labels {
            if !valid_label(label) {
                return Err(bad());
            }
            tag = Tag::node(label, tag);
        }
        Ok(tag)
    }
}

fn valid_label(label: &str) -> bool {
    !label.is_empty() && !label.contains(char::is_whitespace) && !label.contains(GROUP_SEPARATOR)
}

// Sorting follows the rendered form so tag lists sort like their strings.
impl Ord for Tag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for Tag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Tags for every solver move, followed by the puzzle-level tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSequence {
    pub moves: Vec<Vec<Tag>>,
    pub puzzle: Vec<Tag>,
}

impl TagSequence {
    pub fn new(moves: Vec<Vec<Tag>>, puzzle: Vec<Tag>) -> Self {
        Self { moves, puzzle }
    }

    /// Solver move groups plus the puzzle group.
    pub fn len(&self) -> usize {
        self.moves.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// All groups in order, the puzzle group last.
    pub fn groups(&self) -> impl Iterator<Item = &Vec<Tag>> {
        self.moves.iter().chain(std::iter::once(&self.puzzle))
    }

    /// Every tag of every group, in order.
    pub fn flatten(&self) -> Vec<Tag> {
        self.groups().flatten().cloned().collect()
    }

    pub fn contains(&self, rendered: &str) -> bool {
        self.groups().flatten().any(|t| t.to_string() == rendered)
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.groups().flatten().any(|t| t.starts_with(prefix))
    }
}

impl fmt::Display for TagSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups().enumerate() {
            if i > 0 {
                write!(f, "{GROUP_SEPARATOR}")?;
            }
            for (j, tag) in group.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{tag}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for TagSequence {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut groups = s
            .split(GROUP_SEPARATOR)
            .map(|group| group.split_whitespace().map(str::parse).collect::<Result<Vec<Tag>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        // split always yields at least one group
        let puzzle = groups.pop().unwrap_or_default();
        Ok(Self { moves: groups, puzzle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested() {
        let tag = Tag::node("pin", Tag::with("preventsEscape", "q"));
        assert_eq!(tag.to_string(), "pin:preventsEscape:q");
        assert_eq!(tag.label(), "pin");
        assert_eq!(tag.depth(), 3);
    }

    #[test]
    fn test_parse_matches_render() {
        let tag: Tag = "doubleCheck:B,N".parse().unwrap();
        assert_eq!(tag, Tag::with("doubleCheck", "B,N"));
        assert_eq!("oneMove".parse::<Tag>().unwrap(), Tag::leaf("oneMove"));
    }

    #[test]
    fn test_parse_rejects_empty_levels() {
        assert!("".parse::<Tag>().is_err());
        assert!("fork:".parse::<Tag>().is_err());
        assert!(":n".parse::<Tag>().is_err());
        assert!("a b".parse::<Tag>().is_err());
    }

    #[test]
    fn test_order_follows_rendering() {
        let mut tags = vec![Tag::leaf("fork"), Tag::with("fork", "n"), Tag::leaf("attraction"), Tag::leaf("Zeta")];
        tags.sort();
        let rendered: Vec<String> = tags.iter().map(Tag::to_string).collect();
        assert_eq!(rendered, ["Zeta", "attraction", "fork", "fork:n"]);
    }

    #[test]
    fn test_sequence_round_trip() {
        let text = "fork:n sacrifice:q/quietMove:R/crushing long";
        let seq: TagSequence = text.parse().unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.moves[0].len(), 2);
        assert_eq!(seq.puzzle, vec![Tag::leaf("crushing"), Tag::leaf("long")]);
        assert_eq!(seq.to_string(), text);
    }

    #[test]
    fn test_sequence_empty_groups() {
        let seq: TagSequence = "/fork:n/mate mateIn2 short".parse().unwrap();
        assert_eq!(seq.moves.len(), 2);
        assert!(seq.moves[0].is_empty());
        assert_eq!(seq.to_string(), "/fork:n/mate mateIn2 short");
    }

    #[test]
    fn test_serde_as_string() {
        let tag = Tag::with("skewer", "b");
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"skewer:b\"");
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}
