/// Line-geometry detectors: x_ray, discovered_attack, discovered_check, skewer,
/// interference, clearance
/// Each one looks at squares strictly between a slider and its target.

use shakmaty::attacks::between;
use shakmaty::{Position, Square};

use crate::board_utils::{attackers, is_hanging, is_in_bad_spot, is_ray_piece, king_value};
use crate::puzzle::tag::Tag;
use crate::puzzle::MoveContext;

use super::with_role;

/// X-ray: recapture through the square the opponent's recapturing piece left
pub fn x_ray(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_first_solver_move() || !ctx.is_capture() {
        return None;
    }
    let mv = ctx.mv();
    let prev_op = ctx.parent()?;
    if prev_op.mv.to != mv.to || prev_op.is_king_move() {
        return None;
    }
    let prev_pl = ctx.grandparent()?;
    if prev_pl.mv.to != prev_op.mv.to {
        return None;
    }
    between(mv.from, mv.to)
        .contains(prev_op.mv.from)
        .then(|| with_role("xRay", ctx.moved()))
}

/// Discovered check: the moved piece is not among the checkers
pub fn discovered_check(ctx: &MoveContext) -> Option<Tag> {
    let checkers = ctx.position().checkers();
    if checkers.is_empty() || checkers.contains(ctx.mv().to) {
        return None;
    }
    let role = ctx.board().role_at(checkers.first()?)?;
    Some(with_role("discoveredCheck", role))
}

/// Discovered attack: a discovered check, or a capture along the line the
/// previous solver move opened
pub fn discovered_attack(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_first_solver_move() {
        return None;
    }
    if discovered_check(ctx).is_some() {
        return Some(Tag::leaf("discoveredAttack"));
    }
    if !ctx.is_capture() {
        return None;
    }

    let mv = ctx.mv();
    if ctx.parent()?.mv.to == mv.to {
        return None;
    }
    let prev = ctx.grandparent()?;
    let opened = between(mv.from, mv.to).contains(prev.mv.from)
        && mv.to != prev.mv.to
        && mv.from != prev.mv.to
        && !prev.is_castling();
    opened.then(|| Tag::leaf("discoveredAttack"))
}

/// Skewer: a slider captures behind the more valuable piece that stepped out of its line
pub fn skewer(ctx: &MoveContext) -> Option<Tag> {
    let mv = ctx.mv();
    let prev = ctx.parent()?;
    let capture = ctx.board_before().piece_at(mv.to)?;
    if !is_ray_piece(ctx.moved()) || ctx.is_checkmate() {
        return None;
    }
    if prev.mv.to == mv.to || !between(mv.from, mv.to).contains(prev.mv.from) {
        return None;
    }
    let skewered = king_value(prev.moved) > king_value(capture.role)
        && is_in_bad_spot(prev.board_after.board(), mv.to);
    skewered.then(|| with_role("skewer", ctx.moved()))
}

/// Interference: a capture of a piece whose slider defender was cut off,
/// by the opponent's own last move or by the previous solver move
pub fn interference(ctx: &MoveContext) -> Option<Tag> {
    let to = ctx.mv().to;
    let before = ctx.board_before();
    let capture = before.piece_at(to)?;
    if ctx.is_first_solver_move() || !is_hanging(before, capture, to) {
        return None;
    }
    let parent = ctx.parent()?;

    // the lowest slider defender of `to` in `back` plies, cut off by a piece landing on `blocker`
    let cut_off = |back: usize, blocker: Square| -> bool {
        let Some(init) = ctx.position_back(back) else {
            return false;
        };
        let Some(defender) = attackers(init.board(), capture.color, to).first() else {
            return false;
        };
        init.board().role_at(defender).is_some_and(is_ray_piece) && between(to, defender).contains(blocker)
    };

    // self interference
    if cut_off(2, parent.mv.to) {
        return Some(Tag::leaf("interference"));
    }

    if to != parent.mv.to {
        if let Some(interfering) = ctx.grandparent() {
            if cut_off(3, interfering.mv.to) {
                return Some(Tag::leaf("interference"));
            }
        }
    }
    None
}

/// Clearance: the previous solver move vacated the line this slider now uses
pub fn clearance(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_first_solver_move() {
        return None;
    }
    let mv = ctx.mv();
    if ctx.board_before().piece_at(mv.to).is_some() {
        return None;
    }
    let piece = ctx.board().piece_at(mv.to)?;
    if !is_ray_piece(piece.role) {
        return None;
    }

    let reply = ctx.parent()?;
    let prev = ctx.grandparent()?;
    let prev_move = prev.mv;
    let cleared = prev_move.promotion.is_none()
        && prev_move.to != mv.from
        && prev_move.to != mv.to
        && !ctx.position_before().is_check()
        && (!ctx.gives_check() || !reply.is_king_move())
        && (prev_move.from == mv.to || between(mv.from, mv.to).contains(prev_move.from));
    if !cleared {
        return None;
    }

    // The previous solver piece went to an empty square, or to a bad one
    let vacated = prev.board_before.board().piece_at(prev_move.to).is_none();
    (vacated || is_in_bad_spot(prev.board_after.board(), prev_move.to)).then(|| Tag::leaf("clearance"))
}
