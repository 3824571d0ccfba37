/// Positional detectors: quiet_move, defensive_move, attraction, deflection, intermezzo

use shakmaty::{Position, Role};

use crate::board_utils::{attacked_opponent_pieces, attackers, attacks, king_value, piece_value};
use crate::puzzle::tag::Tag;
use crate::puzzle::{MoveContext, PlyMove};

use super::with_role;

/// Quiet move: non-capturing, non-checking move that doesn't attack pieces
pub fn quiet_move(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_last_solver_move() || !is_quiet(ctx) {
        return None;
    }
    let piece = ctx.board().piece_at(ctx.mv().to)?;
    Some(Tag::with("quietMove", piece.char().to_string()))
}

/// No check given or escaped, nothing captured or attacked, no advanced pawn and no king move
pub fn is_quiet(ctx: &MoveContext) -> bool {
    let node = ctx.node();
    !ctx.gives_check()
        && !ctx.position_before().is_check()
        && !ctx.is_capture()
        && attacked_opponent_pieces(ctx.board(), ctx.mv().to, ctx.pov()).is_empty()
        && !node.is_advanced_pawn_move()
        && !node.is_king_move()
}

/// Defensive move: a quiet final move with alternatives, or a check escape that
/// neither checks nor captures
pub fn defensive_move(ctx: &MoveContext) -> Option<Tag> {
    let node = ctx.node();
    let before = ctx.position_before();
    let has_choice = before.legal_moves().len() >= 3;

    let quiet_finish = ctx.is_end()
        && has_choice
        && !ctx.gives_check()
        && !ctx.is_capture()
        && !node.is_advanced_pawn_move()
        && attacked_opponent_pieces(ctx.board(), ctx.mv().to, ctx.pov()).is_empty();
    if quiet_finish {
        return Some(with_role("defensiveMove", ctx.moved()));
    }

    if ctx.gives_check() || ctx.is_capture() || !has_choice {
        return None;
    }
    before.is_check().then(|| with_role("defensiveMove", ctx.moved()))
}

/// Attraction: lure a king, queen or rook to a square where it can be exploited
pub fn attraction(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_last_solver_move() {
        return None;
    }
    let line = ctx.line();
    let square = ctx.mv().to;

    // the opponent takes on that square
    let reply = ctx.next()?;
    if reply.mv.to != square {
        return None;
    }
    let attracted = reply.moved;
    if !matches!(attracted, Role::King | Role::Queen | Role::Rook) {
        return None;
    }

    // the next solver move attacks it
    let follow = line.next(reply)?;
    if !attackers(follow.board_after.board(), ctx.pov(), square).contains(follow.mv.to) {
        return None;
    }
    if attracted == Role::King {
        return Some(Tag::leaf("attraction"));
    }

    // or the solver later captures there
    let capture = line.next(follow).and_then(|n| line.next(n))?;
    (capture.mv.to == square).then(|| Tag::leaf("attraction"))
}

/// Deflection: force a defender away from a key square
pub fn deflection(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_first_solver_move() {
        return None;
    }
    let mv = ctx.mv();
    let captured = ctx.board_before().piece_at(mv.to);
    if captured.is_none() && mv.promotion.is_none() {
        return None;
    }
    if captured.is_some_and(|piece| king_value(piece.role) > king_value(ctx.moved())) {
        return None;
    }

    let square = mv.to;
    let prev_op = ctx.parent()?;
    let grandpa = ctx.grandparent()?;
    let grandpa_board = grandpa.board_after.board();

    let prev_player_capture = grandpa.board_before.board().piece_at(grandpa.mv.to);
    let cheap_capture = prev_player_capture.map_or(true, |piece| piece_value(piece.role) < king_value(grandpa.moved));

    // Opponent responded to the previous player move (recapture or escape check)
    let forced = prev_op.mv.to == grandpa.mv.to || grandpa.gives_check();

    let defender_attacks = attacks(grandpa_board, prev_op.mv.from);
    let was_defending = defender_attacks.contains(square)
        || (mv.promotion.is_some()
            && square.file() == prev_op.mv.from.file()
            && defender_attacks.contains(mv.from));

    let deflected = cheap_capture
        && square != prev_op.mv.to
        && square != grandpa.mv.to
        && forced
        && was_defending
        && !attacks(ctx.board_before(), prev_op.mv.to).contains(square);
    deflected.then(|| Tag::leaf("deflection"))
}

/// Intermezzo: an in-between move before a recapture that was already available
pub fn intermezzo(ctx: &MoveContext) -> Option<Tag> {
    if !ctx.is_capture() || ctx.is_first_solver_move() {
        return None;
    }
    let mv = ctx.mv();
    let op = ctx.parent()?;
    let prev_pov = ctx.grandparent()?;
    let prev_op = ctx.ancestor(3)?;

    let delayed = !attackers(prev_pov.board_after.board(), !ctx.pov(), mv.to).contains(op.mv.from)
        && prev_pov.mv.to != mv.to
        && prev_op.mv.to == mv.to
        && prev_op.capture
        && prev_op
            .board_after
            .legal_moves()
            .iter()
            .any(|legal| PlyMove::from_move(legal) == mv);
    delayed.then(|| Tag::leaf("intermezzo"))
}
