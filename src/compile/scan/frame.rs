use crate::region::Region;
use std::fmt::Display;

/// A block directive which is open while scanning.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A loop, over a list or the keys of a map.
    Loop(LoopFrame),
    /// A switch, waiting for its close.
    Switch { region: Region },
    /// A conditional, `has_else` is set once the unconditional alternative
    /// has been seen.
    Branch { region: Region, has_else: bool },
}

impl Frame {
    /// Return the region of the directive that opened the frame.
    pub fn region(&self) -> Region {
        match self {
            Frame::Loop(frame) => frame.region,
            Frame::Switch { region } | Frame::Branch { region, .. } => *region,
        }
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frame::Loop(LoopFrame { map: true, .. }) => write!(f, "map loop"),
            Frame::Loop(_) => write!(f, "list loop"),
            Frame::Switch { .. } => write!(f, "switch"),
            Frame::Branch { .. } => write!(f, "conditional"),
        }
    }
}

/// State of an open loop directive.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopFrame {
    /// Expression naming the collection.
    pub name: String,
    /// Escaped markup written before the first iteration.
    pub tag: String,
    /// Escaped markup written after the last iteration, derived from the
    /// tag when the close directive does not provide one.
    pub end: Option<String>,
    /// True when iterating the keys of a map.
    pub map: bool,
    pub region: Region,
}
