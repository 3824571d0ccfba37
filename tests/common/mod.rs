#![allow(dead_code)]

use puzzle_tagger::{CpTag, PuzzleLine, Tag, TagSequence};

/// A puzzle from the Lichess database with the tags it should carry.
pub struct LichessPuzzle {
    pub id: &'static str,
    pub fen: &'static str,
    pub moves: &'static str,
    pub themes: &'static str,
}

impl LichessPuzzle {
    /// Build the line; the evaluation tier comes from the Lichess themes.
    pub fn line(&self) -> PuzzleLine {
        build_line(self.id, self.fen, self.moves, CpTag::from_themes(self.themes))
    }
}

/// Build a puzzle line from Lichess CSV fields, panicking on bad data.
pub fn build_line(id: &str, fen: &str, moves: &str, cp_tag: CpTag) -> PuzzleLine {
    PuzzleLine::from_uci(id, fen, moves, cp_tag).unwrap_or_else(|e| panic!("{id}: {e}"))
}

/// Rendered tags of one group.
pub fn rendered(tags: &[Tag]) -> Vec<String> {
    tags.iter().map(Tag::to_string).collect()
}

pub fn is_sorted(tags: &[Tag]) -> bool {
    tags.windows(2).all(|pair| pair[0] <= pair[1])
}

/// Check every puzzle with `check`, collecting all misses before failing.
pub fn assert_all(puzzles: &[LichessPuzzle], what: &str, check: impl Fn(&LichessPuzzle) -> Result<(), String>) {
    let failures: Vec<String> = puzzles
        .iter()
        .filter_map(|p| check(p).err().map(|e| format!("  MISS {}: {}", p.id, e)))
        .collect();
    if !failures.is_empty() {
        panic!("{}: {}/{} failed\n{}", what, failures.len(), puzzles.len(), failures.join("\n"));
    }
}

/// The puzzle group holds exactly `expected` (in any order).
pub fn expect_puzzle_tags(tags: &TagSequence, expected: &[&str]) -> Result<(), String> {
    let mut want: Vec<&str> = expected.to_vec();
    want.sort_unstable();
    let got = rendered(&tags.puzzle);
    if got == want {
        Ok(())
    } else {
        Err(format!("expected {want:?}, got {got:?}"))
    }
}

/// Some group carries a tag named `label`.
pub fn expect_label(tags: &TagSequence, label: &str) -> Result<(), String> {
    if tags.groups().flatten().any(|t| t.label() == label) {
        Ok(())
    } else {
        Err(format!("no {label} in {tags}"))
    }
}

/// Some solver move carries a tag named `label`.
pub fn expect_move_label(tags: &TagSequence, label: &str) -> Result<(), String> {
    if tags.moves.iter().flatten().any(|t| t.label() == label) {
        Ok(())
    } else {
        Err(format!("no {label} on any move: {tags}"))
    }
}

/// A mate puzzle carrying `pattern` and the mateInN that Lichess gives it.
pub fn expect_mate(tags: &TagSequence, puzzle: &LichessPuzzle, pattern: &str) -> Result<(), String> {
    let mate_in = puzzle
        .themes
        .split(' ')
        .find(|t| t.starts_with("mateIn"))
        .ok_or_else(|| format!("no mateIn theme in {:?}", puzzle.themes))?;
    for want in ["mate", mate_in, pattern] {
        if !tags.puzzle.iter().any(|t| t.label() == want) {
            return Err(format!("no {want} in {tags}"));
        }
    }
    Ok(())
}
