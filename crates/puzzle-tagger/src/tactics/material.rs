/// Material-based detectors: sacrifice, exposed_king, endgame types

use shakmaty::{Board, Color, Position, Role};

use crate::board_utils::{material_diff, possible_exposed_king};
use crate::puzzle::tag::Tag;
use crate::puzzle::{MoveContext, PuzzleLine};

const ENDGAMES: [(Role, &str); 5] = [
    (Role::Pawn, "pawnEndgame"),
    (Role::Queen, "queenEndgame"),
    (Role::Rook, "rookEndgame"),
    (Role::Bishop, "bishopEndgame"),
    (Role::Knight, "knightEndgame"),
];

/// Sacrifice: the solver is down material against both the post-setup position and
/// the position before the opponent's last move.
pub fn sacrifice(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_first_solver_move() {
        return None;
    }
    let line = ctx.line();
    let pov = ctx.pov();

    let initial = material_diff(line.node(0)?.board_after.board(), pov);
    let two_back = ctx.position_back(2)?;
    let last_d = material_diff(two_back.board(), pov);
    let d = material_diff(ctx.board(), pov);
    if d - last_d > -2 || d - initial > -2 {
        return None;
    }
    if has_earlier_solver_promotion(line, ctx.node().ply) {
        return None;
    }

    // The solver piece the opponent just took
    let parent = ctx.parent()?;
    let piece = two_back.board().piece_at(parent.mv.to)?;
    Some(Tag::with("sacrifice", piece.role.char().to_string()))
}

/// Material given up after a solver promotion is not a sacrifice
fn has_earlier_solver_promotion(line: &PuzzleLine, ply: usize) -> bool {
    line.solver_move_nodes()
        .any(|node| node.ply < ply && node.mv.promotion.is_some())
}

/// Exposed king: an intermediate solver check against a king without pawn cover
pub fn exposed_king(ctx: &MoveContext) -> Option<Tag> {
    if ctx.is_first_solver_move() || ctx.is_last_solver_move() {
        return None;
    }
    let after_setup = ctx.line().node(0)?.board_after.board();
    if !possible_exposed_king(after_setup, ctx.pov()) {
        return None;
    }
    ctx.gives_check().then(|| Tag::leaf("exposedKing"))
}

/// Only kings, pawns and `role` on the board, with `role` present
fn is_piece_endgame(board: &Board, role: Role) -> bool {
    let allowed = board.by_role(Role::King) | board.by_role(Role::Pawn) | board.by_role(role);
    board.by_role(role).any() && (board.occupied() & !allowed).is_empty()
}

fn is_queen_rook_endgame(board: &Board) -> bool {
    let queens = board.by_role(Role::Queen);
    let rooks = board.by_role(Role::Rook);
    let allowed = queens | rooks | board.by_role(Role::Pawn) | board.by_role(Role::King);
    queens.count() == 1 && rooks.any() && (board.occupied() & !allowed).is_empty()
}

/// The positions after the setup move and after the first solver move
fn early_boards(line: &PuzzleLine) -> impl Iterator<Item = &Board> {
    line.nodes().iter().take(2).map(|node| node.board_after.board())
}

pub fn piece_endgame(line: &PuzzleLine, role: Role) -> bool {
    early_boards(line).all(|board| is_piece_endgame(board, role))
}

pub fn queen_rook_endgame(line: &PuzzleLine) -> bool {
    early_boards(line).all(is_queen_rook_endgame)
}

/// The first matching endgame signature, falling back to queen and rook
pub fn endgame(line: &PuzzleLine) -> Option<Tag> {
    ENDGAMES
        .iter()
        .find(|(role, _)| piece_endgame(line, *role))
        .map(|(_, name)| Tag::leaf(*name))
        .or_else(|| queen_rook_endgame(line).then(|| Tag::leaf("queenRookEndgame")))
}

/// Material balance for `pov` after each ply
pub fn material_diffs(line: &PuzzleLine, pov: Color) -> Vec<i32> {
    line.nodes()
        .iter()
        .map(|node| material_diff(node.board_after.board(), pov))
        .collect()
}
