/// Simple tactical detectors: advanced_pawn, double_check, en_passant, castling,
/// promotion, under_promotion, attacking_f2_f7

use shakmaty::{Bitboard, Board, Position, Role, Square};

use crate::puzzle::MoveContext;
use crate::puzzle::tag::Tag;

/// Pawn pushed to the seventh or eighth rank from the mover's side, or any promotion
pub fn advanced_pawn(ctx: &MoveContext) -> Option<Tag> {
    ctx.node()
        .is_very_advanced_pawn_move()
        .then(|| Tag::leaf("advancedPawn"))
}

/// Sorted, comma-joined symbols of the checkers.
pub fn checker_symbols(board: &Board, checkers: Bitboard, lowercase: bool) -> String {
    let mut symbols: Vec<char> = checkers
        .into_iter()
        .filter_map(|sq| board.piece_at(sq))
        .map(|piece| if lowercase { piece.role.char() } else { piece.char() })
        .collect();
    symbols.sort_unstable();
    symbols.iter().map(char::to_string).collect::<Vec<_>>().join(",")
}

/// Double check, tagged with the checkers' symbols (uppercase for White)
pub fn double_check(ctx: &MoveContext) -> Option<Tag> {
    let checkers = ctx.position().checkers();
    if checkers.count() < 2 {
        return None;
    }
    Some(Tag::with("doubleCheck", checker_symbols(ctx.board(), checkers, false)))
}

pub fn en_passant(ctx: &MoveContext) -> Option<Tag> {
    let mv = ctx.mv();
    let is_ep = ctx.moved() == Role::Pawn
        && mv.from.file() != mv.to.file()
        && ctx.board_before().piece_at(mv.to).is_none();
    is_ep.then(|| Tag::leaf("enPassant"))
}

pub fn castling(ctx: &MoveContext) -> Option<Tag> {
    ctx.node().is_castling().then(|| Tag::leaf("castling"))
}

pub fn promotion(ctx: &MoveContext) -> Option<Tag> {
    ctx.mv().promotion.map(|_| Tag::leaf("promotion"))
}

/// Knight promotion that mates, or a non-queen promotion that does not
pub fn under_promotion(ctx: &MoveContext) -> Option<Tag> {
    let promoted = ctx.mv().promotion?;
    let under = if ctx.is_checkmate() {
        promoted == Role::Knight
    } else {
        promoted != Role::Queen
    };
    under.then(|| Tag::leaf("underPromotion"))
}

/// Capture on f2/f7 next to the uncastled opponent king
pub fn attacking_f2_f7(ctx: &MoveContext) -> Option<Tag> {
    let to = ctx.mv().to;
    if !matches!(to, Square::F2 | Square::F7) || ctx.board_before().piece_at(to).is_none() {
        return None;
    }
    let king_square = if to == Square::F7 { Square::E8 } else { Square::E1 };
    let king = ctx.board().piece_at(king_square)?;
    (king.role == Role::King && king.color != ctx.pov()).then(|| Tag::leaf("attackingF2F7"))
}
