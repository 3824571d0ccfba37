//! Chess puzzle tagging: tactic detectors, mate patterns, the tag aggregator
//! and the tag-similarity search used to find related puzzles.

pub use shakmaty;

pub mod board_utils;
pub mod error;
pub mod puzzle;
pub mod record;
pub mod similarity;
pub mod tactics;

pub use error::TaggerError;
pub use puzzle::tag::{Tag, TagSequence};
pub use puzzle::{CpTag, PuzzleLine};
