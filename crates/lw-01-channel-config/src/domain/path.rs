//! Stable path identifiers into the config tree.
//!
//! Paths are structural, not strings: merges and diffs compare segments,
//! never concatenated text. The string form (`Organizations[2].AnchorPeers`)
//! exists only for display and for the JSON wire encoding, which requires
//! string map keys.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One step into the tree: a named group or an indexed entry within one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Name(String),
    Index(u64),
}

impl Segment {
    pub fn name(n: impl Into<String>) -> Self {
        Self::Name(n.into())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(n) => f.write_str(n),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl FromStr for Segment {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathParseError(s.to_string()));
        }
        match s.parse::<u64>() {
            Ok(i) => Ok(Self::Index(i)),
            Err(_) => Ok(Self::Name(s.to_string())),
        }
    }
}

/// Malformed path string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed config path: {0:?}")]
pub struct PathParseError(pub String);

/// An ordered sequence of segments addressing one node.
///
/// The empty path addresses the channel root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConfigPath(Vec<Segment>);

impl ConfigPath {
    /// The channel root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Extend with a named segment.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segs = self.0.clone();
        segs.push(Segment::Name(name.into()));
        Self(segs)
    }

    /// Extend with an indexed segment.
    pub fn entry(&self, index: u64) -> Self {
        let mut segs = self.0.clone();
        segs.push(Segment::Index(index));
        Self(segs)
    }

    /// Immediate parent, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Every strict ancestor, nearest first, ending at the root.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::with_capacity(self.0.len());
        let mut cur = self.clone();
        while let Some(parent) = cur.parent() {
            out.push(parent.clone());
            cur = parent;
        }
        out
    }

    /// Whether `self` is `other` or lies below it.
    pub fn starts_with(&self, other: &Self) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }

    // Well-known locations, mirroring the channel config layout.

    /// `Organizations`: the channel-level organization group.
    pub fn organizations() -> Self {
        Self::root().child("Organizations")
    }

    /// `Organizations[i]`: one organization entry.
    pub fn organization(index: u64) -> Self {
        Self::organizations().entry(index)
    }

    /// `Organizations[i].AnchorPeers`: an entry's anchor aggregation node.
    pub fn anchor_peers(index: u64) -> Self {
        Self::organization(index).child("AnchorPeers")
    }

    /// `Application` group.
    pub fn application() -> Self {
        Self::root().child("Application")
    }

    /// `Application.Organizations`: the application organization group.
    pub fn application_organizations() -> Self {
        Self::application().child("Organizations")
    }

    /// `Application.Organizations[i]`.
    pub fn application_organization(index: u64) -> Self {
        Self::application_organizations().entry(index)
    }

    /// `Orderer` group.
    pub fn orderer() -> Self {
        Self::root().child("Orderer")
    }

    /// `Orderer.Consenters`.
    pub fn consenters() -> Self {
        Self::orderer().child("Consenters")
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("Channel");
        }
        let mut first = true;
        for seg in &self.0 {
            match seg {
                Segment::Name(n) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(n)?;
                }
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
            first = false;
        }
        Ok(())
    }
}

impl FromStr for ConfigPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Channel" {
            return Ok(Self::root());
        }
        let mut segs = Vec::new();
        for token in s.split('.') {
            let mut rest = token;
            // Leading name, then any number of [i] suffixes.
            if let Some(bracket) = rest.find('[') {
                if bracket > 0 {
                    segs.push(Segment::Name(rest[..bracket].to_string()));
                }
                rest = &rest[bracket..];
                while !rest.is_empty() {
                    if !rest.starts_with('[') {
                        return Err(PathParseError(s.to_string()));
                    }
                    let close = rest.find(']').ok_or_else(|| PathParseError(s.to_string()))?;
                    let i = rest[1..close]
                        .parse::<u64>()
                        .map_err(|_| PathParseError(s.to_string()))?;
                    segs.push(Segment::Index(i));
                    rest = &rest[close + 1..];
                }
            } else {
                if rest.is_empty() {
                    return Err(PathParseError(s.to_string()));
                }
                segs.push(Segment::Name(rest.to_string()));
            }
        }
        Ok(Self(segs))
    }
}

impl Serialize for ConfigPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConfigPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
