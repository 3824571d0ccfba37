/// Cook orchestrator: runs the per-move detectors and builds the tag sequence
/// One sorted group per solver move, then one sorted group of puzzle-level tags.

use tracing::debug;

use super::tag::{Tag, TagSequence};
use super::{CpTag, PuzzleLine};
use crate::tactics;

/// Analyze a puzzle and return its hierarchical tag sequence
pub fn cook(line: &PuzzleLine) -> TagSequence {
    let moves: Vec<Vec<Tag>> = line
        .solver_move_nodes()
        .map(|node| tactics::detect_move_tags(&line.context(node)))
        .collect();

    let mut puzzle = Vec::new();

    // Mate detection
    if line.is_checkmate() {
        puzzle.push(Tag::leaf("mate"));
        puzzle.push(Tag::leaf(format!("mateIn{}", line.len() / 2)));
        puzzle.extend(tactics::mate_patterns::mate_pattern(line));
    } else {
        puzzle.push(evaluation_tag(line.cp_tag()));
    }

    puzzle.extend(tactics::material::endgame(line));

    // Side attacks (only if no backRankMate and no fork)
    let back_rank = puzzle.iter().any(|tag| tag.label() == "backRankMate");
    let fork = moves.iter().flatten().any(|tag| tag.starts_with("fork"));
    if !back_rank && !fork {
        puzzle.extend(tactics::side_attacks::side_attack_tag(line));
    }

    puzzle.push(length_tag(line.len()));
    puzzle.sort();

    let tags = TagSequence::new(moves, puzzle);
    debug!(id = line.id(), plies = line.len(), %tags, "cooked puzzle");
    tags
}

/// Tier tag of a line that does not end in mate
pub fn evaluation_tag(cp_tag: CpTag) -> Tag {
    match cp_tag {
        CpTag::Crushing => Tag::leaf("crushing"),
        CpTag::Advantage => Tag::leaf("advantage"),
        CpTag::Mate | CpTag::Equality => Tag::leaf("equality"),
    }
}

/// Length tag from the number of plies, setup move included
pub fn length_tag(plies: usize) -> Tag {
    match plies {
        2 => Tag::leaf("oneMove"),
        4 => Tag::leaf("short"),
        n if n >= 8 => Tag::leaf("veryLong"),
        _ => Tag::leaf("long"),
    }
}
