/// Attack-based detectors: fork, hanging_piece, trapped_piece, capturing_defender

use shakmaty::{Position, Role};

use crate::board_utils::{
    attacked_opponent_squares, attackers, is_hanging, is_in_bad_spot, is_trapped, king_value, material_diff,
    piece_value,
};
use crate::puzzle::tag::Tag;
use crate::puzzle::MoveContext;

use super::with_role;

/// Fork: a piece attacks two or more higher-value or hanging pieces
pub fn fork(ctx: &MoveContext) -> Option<Tag> {
    let moved = ctx.moved();
    if moved == Role::King {
        return None;
    }

    let board = ctx.board();
    let to = ctx.mv().to;

    // Don't count forks from a bad square
    if is_in_bad_spot(board, to) {
        return None;
    }

    let recapturers = attackers(board, ctx.position().turn(), to);
    let forked = attacked_opponent_squares(board, to, ctx.pov())
        .into_iter()
        .filter(|(piece, _)| piece.role != Role::Pawn)
        // worth more, or hanging and unable to take back
        .filter(|(piece, square)| {
            king_value(piece.role) > king_value(moved)
                || (is_hanging(board, *piece, *square) && !recapturers.contains(*square))
        })
        .count();

    (forked > 1).then(|| with_role("fork", moved))
}

/// Hanging piece: the first solver move captures a piece the setup move left undefended
pub fn hanging_piece(ctx: &MoveContext) -> Option<Tag> {
    if !ctx.is_first_solver_move() {
        return None;
    }
    let line = ctx.line();
    let setup = line.node(0)?;
    let first = line.node(1)?;
    let to = first.mv.to;
    let after_setup = setup.board_after.board();

    let captured = after_setup.piece_at(to);
    // Escaping check by taking a pawn (or nothing) is not the point of the puzzle
    if setup.gives_check() && captured.map_or(true, |piece| piece.role == Role::Pawn) {
        return None;
    }
    let captured = captured.filter(|piece| piece.role != Role::Pawn)?;
    if !is_hanging(after_setup, captured, to) {
        return None;
    }

    // The opponent just made an equal or better trade on this square
    if setup.mv.to == to {
        if let Some(op_capture) = line.root().board().piece_at(to) {
            if piece_value(op_capture.role) >= piece_value(captured.role) {
                return None;
            }
        }
    }

    if line.len() < 4 {
        return Some(Tag::leaf("hangingPiece"));
    }

    // Longer lines must keep the material
    let pov = ctx.pov();
    let later = line.node(3)?;
    (material_diff(later.board_after.board(), pov) >= material_diff(first.board_after.board(), pov))
        .then(|| Tag::leaf("hangingPiece"))
}

/// Trapped piece: a piece that could not escape is eventually captured
pub fn trapped_piece(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_first_solver_move() {
        return None;
    }
    let to = ctx.mv().to;
    let captured = ctx.board_before().piece_at(to)?;
    if captured.role == Role::Pawn {
        return None;
    }

    // If the opponent just moved to this square, look where it came from
    let parent = ctx.parent()?;
    let square = if parent.mv.to == to { parent.mv.from } else { to };

    // Position before the opponent's last move, with the opponent to move
    let before_reply = ctx.position_back(2)?;
    is_trapped(before_reply, square).then(|| Tag::leaf("trappedPiece"))
}

/// Capturing defender: the previous solver move removed a defender of this move's target
pub fn capturing_defender(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_first_solver_move() {
        return None;
    }
    let mv = ctx.mv();
    let moved = ctx.moved();
    let before = ctx.board_before();
    let parent = ctx.parent()?;

    let wins_defended_piece = before.piece_at(mv.to).is_some_and(|capture| {
        moved != Role::King
            && piece_value(capture.role) <= piece_value(moved)
            && is_hanging(before, capture, mv.to)
            && parent.mv.to != mv.to
    });
    if !ctx.is_checkmate() && !wins_defended_piece {
        return None;
    }

    let prev = ctx.grandparent()?;
    if prev.gives_check() || prev.mv.to == mv.from {
        return None;
    }

    let init = &prev.board_before;
    let defender_square = prev.mv.to;
    let defender = init.board().piece_at(defender_square)?;
    let defended = attackers(init.board(), defender.color, mv.to).contains(defender_square);
    (defended && !init.is_check()).then(|| Tag::leaf("capturingDefender"))
}
