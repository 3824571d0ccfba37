/// Legacy flat rule set
/// One tag list per puzzle in emission order, each motif at most once.
/// Motifs are matched over the whole line rather than attributed to a solver move.

use shakmaty::attacks::between;
use shakmaty::{Position, Role, Square};
use tracing::debug;

use super::cook::{evaluation_tag, length_tag};
use super::tag::Tag;
use super::{MoveContext, PuzzleLine, PuzzleNode};
use crate::board_utils::attacked_opponent_pieces;
use crate::tactics::{
    attacks, line_geometry, material, mate_patterns, pins, positional, side_attacks, simple, with_role, MoveDetector,
};

/// Analyze a puzzle and return its flat tag list
pub fn cook_flat(line: &PuzzleLine) -> Vec<Tag> {
    let solver: Vec<&PuzzleNode> = line.solver_move_nodes().collect();
    let contexts: Vec<MoveContext> = solver.iter().map(|node| line.context(node)).collect();
    let mut tags = Vec::new();

    // Mate detection
    if line.is_checkmate() {
        let moves_to_mate = match line.len() / 2 {
            n @ 1..=4 => n,
            _ => 5,
        };
        tags.push(Tag::leaf(format!("mateIn{moves_to_mate}")));
        tags.push(with_role("mate", line.end().moved));
        tags.extend(mate_patterns::mate_pattern(line));
    } else {
        tags.push(evaluation_tag(line.cp_tag()));
    }

    let all = &contexts[..];
    let after_first = contexts.get(1..).unwrap_or_default();
    let before_last = &contexts[..contexts.len().saturating_sub(1)];

    tags.extend(first_match(all, positional::attraction));
    tags.extend(first_match(after_first, positional::deflection));
    tags.extend(first_match(all, simple::advanced_pawn));
    tags.extend(double_check(all));
    tags.extend(quiet_move(all));
    tags.extend(sacrifice(line, &solver));
    tags.extend(first_match(after_first, line_geometry::x_ray));
    tags.extend(first_match(before_last, attacks::fork));
    tags.extend(first_match(all, attacks::hanging_piece));
    tags.extend(first_match(after_first, attacks::trapped_piece));
    tags.extend(discovered_attack(all));
    tags.extend(first_match(all, material::exposed_king));
    tags.extend(first_match(after_first, line_geometry::skewer));
    tags.extend(attacking_f2_f7(all));
    tags.extend(first_match(after_first, line_geometry::clearance));
    tags.extend(first_match(all, simple::en_passant));
    tags.extend(first_match(all, simple::castling));
    tags.extend(first_match(all, simple::promotion));
    tags.extend(under_promotion(all));
    tags.extend(first_match(after_first, attacks::capturing_defender));

    if defensive_move(line) || check_escape(all) {
        tags.push(Tag::leaf("defensiveMove"));
    }
    if first_match(after_first, line_geometry::interference).is_some() {
        tags.push(Tag::leaf("interference"));
    }
    if all
        .iter()
        .any(|ctx| pins::pin_prevents_attack(ctx).is_some() || pins::pin_prevents_escape(ctx).is_some())
    {
        tags.push(Tag::leaf("pin"));
    }

    tags.extend(material::endgame(line));

    // Side attacks (only if no backRankMate and no fork)
    if !tags
        .iter()
        .any(|tag| tag.label() == "backRankMate" || tag.starts_with("fork"))
    {
        tags.extend(side_attacks::side_attack_tag(line));
    }

    tags.push(length_tag(line.len()));
    debug!(id = line.id(), tags = tags.len(), "cooked puzzle (legacy)");
    tags
}

/// Space-separated rendering of a flat tag list
pub fn render_flat(tags: &[Tag]) -> String {
    tags.iter().map(Tag::to_string).collect::<Vec<_>>().join(" ")
}

fn first_match(contexts: &[MoveContext], detect: MoveDetector) -> Option<Tag> {
    contexts.iter().find_map(detect)
}

/// Double check with lowercase checker symbols
fn double_check(contexts: &[MoveContext]) -> Option<Tag> {
    contexts.iter().find_map(|ctx| {
        let checkers = ctx.position().checkers();
        (checkers.count() >= 2)
            .then(|| Tag::with("doubleCheck", simple::checker_symbols(ctx.board(), checkers, true)))
    })
}

/// Any quiet solver move other than the final one
fn quiet_move(contexts: &[MoveContext]) -> Option<Tag> {
    contexts
        .iter()
        .any(|ctx| !ctx.is_end() && positional::is_quiet(ctx))
        .then(|| Tag::leaf("quietMove"))
}

/// Down two points against the post-setup balance after a later solver move
fn sacrifice(line: &PuzzleLine, solver: &[&PuzzleNode]) -> Option<Tag> {
    let diffs = material::material_diffs(line, line.pov());
    let initial = *diffs.first()?;
    let opponent_promotes = line
        .nodes()
        .iter()
        .any(|node| !line.is_solver_move(node) && node.ply >= 2 && node.mv.promotion.is_some());
    if opponent_promotes {
        return None;
    }

    solver
        .iter()
        .skip(1)
        .find(|node| diffs.get(node.ply).is_some_and(|d| d - initial <= -2))
        .map(|node| with_role("sacrifice", node.moved))
}

/// Any discovered check; otherwise captures along a line the previous solver move opened
fn discovered_attack(contexts: &[MoveContext]) -> Option<Tag> {
    if contexts
        .iter()
        .any(|ctx| line_geometry::discovered_check(ctx).is_some())
    {
        return Some(Tag::leaf("discoveredAttack"));
    }

    for ctx in contexts.iter().skip(1) {
        if !ctx.is_capture() {
            continue;
        }
        let mv = ctx.mv();
        // a recapture ends the scan
        if ctx.parent()?.mv.to == mv.to {
            return None;
        }
        let prev = ctx.grandparent()?;
        if between(mv.from, mv.to).contains(prev.mv.from)
            && mv.to != prev.mv.to
            && mv.from != prev.mv.to
            && !prev.is_castling()
        {
            return Some(Tag::leaf("discoveredAttack"));
        }
    }
    None
}

/// Only the first capture on f2 or f7 is considered
fn attacking_f2_f7(contexts: &[MoveContext]) -> Option<Tag> {
    let first = contexts.iter().find(|ctx| {
        let to = ctx.mv().to;
        matches!(to, Square::F2 | Square::F7) && ctx.board_before().piece_at(to).is_some()
    })?;
    simple::attacking_f2_f7(first)
}

/// The first promotion that mates decides; otherwise any non-queen promotion
fn under_promotion(contexts: &[MoveContext]) -> Option<Tag> {
    for ctx in contexts {
        let promoted = ctx.mv().promotion;
        if ctx.is_checkmate() {
            return (promoted == Some(Role::Knight)).then(|| Tag::leaf("underPromotion"));
        }
        if promoted.is_some_and(|role| role != Role::Queen) {
            return Some(Tag::leaf("underPromotion"));
        }
    }
    None
}

/// The last move is quiet although the solver had alternatives
fn defensive_move(line: &PuzzleLine) -> bool {
    let Some(before_end) = line.len().checked_sub(2).and_then(|i| line.node(i)) else {
        return false;
    };
    if before_end.board_after.legal_moves().len() < 3 {
        return false;
    }
    let end = line.end();
    !end.gives_check()
        && !end.capture
        && attacked_opponent_pieces(end.board_after.board(), end.mv.to, line.pov()).is_empty()
        && !end.is_advanced_pawn_move()
}

/// A solver move that escapes check without checking or capturing
fn check_escape(contexts: &[MoveContext]) -> bool {
    for ctx in contexts {
        if ctx.gives_check() || ctx.is_capture() {
            return false;
        }
        let before = ctx.position_before();
        if before.legal_moves().len() < 3 {
            return false;
        }
        if before.is_check() {
            return true;
        }
    }
    false
}
