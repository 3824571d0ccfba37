/// Checkmate pattern detectors (Lichess standard)
/// smothered_mate, back_rank_mate, anastasia_mate, hook_mate, arabian_mate,
/// boden_or_double_bishop_mate, dovetail_mate
/// All of them look at the final position and stay silent unless it is checkmate.

use shakmaty::{Bitboard, Board, Color, Position, Role, Square};

use crate::board_utils::{attacker_pieces, attackers, file_index, king_adjacent_squares, rank_index, square_at};
use crate::puzzle::tag::Tag;
use crate::puzzle::{PuzzleLine, PuzzleNode};

/// The final node, its board and the mated king, when the line ends in mate
fn mated(line: &PuzzleLine) -> Option<(&PuzzleNode, &Board, Square)> {
    let end = line.end();
    if !end.board_after.is_checkmate() {
        return None;
    }
    let board = end.board_after.board();
    let king = board.king_of(!line.pov())?;
    Some((end, board, king))
}

/// Smothered mate: knight checkmate with king surrounded by own pieces
pub fn smothered_mate(line: &PuzzleLine) -> bool {
    let Some((end, board, king)) = mated(line) else {
        return false;
    };
    let pov = line.pov();

    for checker in end.board_after.checkers() {
        if board.role_at(checker) == Some(Role::Knight) {
            // All adjacent squares must be blocked by the mated side's pieces
            return king_adjacent_squares(king)
                .into_iter()
                .all(|sq| board.piece_at(sq).is_some_and(|piece| piece.color != pov));
        }
    }
    false
}

/// Back rank mate: checkmate on the back rank with the king trapped by own pieces
pub fn back_rank_mate(line: &PuzzleLine) -> bool {
    let Some((end, board, king)) = mated(line) else {
        return false;
    };
    let pov = line.pov();
    let (back_rank, forward) = if pov == Color::White { (7, -1) } else { (0, 1) };
    if rank_index(king) != back_rank {
        return false;
    }

    // The squares in front of the king hold unattacked pieces of the mated side
    let king_file = file_index(king);
    let blocked = (-1..=1)
        .filter_map(|df| square_at(king_file + df, back_rank + forward))
        .all(|sq| {
            board.piece_at(sq).is_some_and(|piece| piece.color != pov) && attackers(board, pov, sq).is_empty()
        });
    if !blocked {
        return false;
    }

    // Checker must be on the back rank
    end.board_after
        .checkers()
        .into_iter()
        .any(|checker| rank_index(checker) == back_rank)
}

/// Anastasia mate: rook/queen on the edge file, knight two squares away, piece in between
pub fn anastasia_mate(line: &PuzzleLine) -> bool {
    let Some((end, board, king)) = mated(line) else {
        return false;
    };
    let pov = line.pov();
    let (king_file, king_rank) = (file_index(king), rank_index(king));

    // King on a or h file, not in corner
    if !matches!(king_file, 0 | 7) || matches!(king_rank, 0 | 7) {
        return false;
    }
    if file_index(end.mv.to) != king_file || !matches!(end.moved, Role::Queen | Role::Rook) {
        return false;
    }

    // Look from the a-file side
    let mirror = |sq: Square| if king_file == 0 { sq } else { sq.flip_horizontal() };
    let (Some(inner), Some(outer)) = (square_at(1, king_rank), square_at(3, king_rank)) else {
        return false;
    };

    let blocker = board.piece_at(mirror(inner));
    let knight = board.piece_at(mirror(outer));
    blocker.is_some_and(|piece| piece.color != pov)
        && knight.is_some_and(|piece| piece.color == pov && piece.role == Role::Knight)
}

/// Hook mate: rook next to the king, guarded by a pawn-protected knight also next to it
pub fn hook_mate(line: &PuzzleLine) -> bool {
    let Some((end, board, king)) = mated(line) else {
        return false;
    };
    let pov = line.pov();
    let rook = end.mv.to;
    if end.moved != Role::Rook || rook.distance(king) != 1 {
        return false;
    }

    attackers(board, pov, rook).into_iter().any(|defender| {
        board.role_at(defender) == Some(Role::Knight)
            && defender.distance(king) == 1
            && attackers(board, pov, defender)
                .into_iter()
                .any(|sq| board.role_at(sq) == Some(Role::Pawn))
    })
}

/// Arabian mate: cornered king, adjacent rook, knight guarding the rook
pub fn arabian_mate(line: &PuzzleLine) -> bool {
    let Some((end, board, king)) = mated(line) else {
        return false;
    };
    let pov = line.pov();
    let rook = end.mv.to;
    let cornered = matches!(file_index(king), 0 | 7) && matches!(rank_index(king), 0 | 7);
    if !cornered || end.moved != Role::Rook || rook.distance(king) != 1 {
        return false;
    }

    attackers(board, pov, rook).into_iter().any(|sq| {
        board.role_at(sq) == Some(Role::Knight)
            && (rank_index(sq) - rank_index(king)).abs() == 2
            && (file_index(sq) - file_index(king)).abs() == 2
    })
}

/// Boden or double bishop mate: only bishops cover the king and its flight squares
pub fn boden_or_double_bishop_mate(line: &PuzzleLine) -> Option<Tag> {
    let (_, board, king) = mated(line)?;
    let pov = line.pov();

    let bishops = board.by_role(Role::Bishop) & board.by_color(pov);
    if bishops.count() < 2 {
        return None;
    }

    let zone = king_adjacent_squares(king) | Bitboard::from(king);
    for sq in zone {
        if !attacker_pieces(board, pov, sq)
            .iter()
            .all(|piece| piece.role == Role::Bishop)
        {
            return None;
        }
    }

    let mut squares = bishops.into_iter();
    let (first, second) = (squares.next()?, squares.next()?);
    let king_file = file_index(king);
    if (file_index(first) < king_file) == (file_index(second) > king_file) {
        Some(Tag::leaf("bodenMate"))
    } else {
        Some(Tag::leaf("doubleBishopMate"))
    }
}

/// Dovetail mate: queen diagonally adjacent, the other flight squares covered only by her
pub fn dovetail_mate(line: &PuzzleLine) -> bool {
    let Some((end, board, king)) = mated(line) else {
        return false;
    };
    let pov = line.pov();
    if matches!(file_index(king), 0 | 7) || matches!(rank_index(king), 0 | 7) {
        return false;
    }

    let queen = end.mv.to;
    if end.moved != Role::Queen || queen.file() == king.file() || queen.rank() == king.rank() || queen.distance(king) > 1 {
        return false;
    }

    for sq in king_adjacent_squares(king) {
        if sq == queen {
            continue;
        }
        let covering = attackers(board, pov, sq);
        if covering == Bitboard::from(queen) {
            if board.piece_at(sq).is_some() {
                return false;
            }
        } else if covering.any() {
            return false;
        }
    }
    true
}

/// The first mate pattern that matches, in priority order
pub fn mate_pattern(line: &PuzzleLine) -> Option<Tag> {
    let named: [(fn(&PuzzleLine) -> bool, &str); 5] = [
        (smothered_mate, "smotheredMate"),
        (back_rank_mate, "backRankMate"),
        (anastasia_mate, "anastasiaMate"),
        (hook_mate, "hookMate"),
        (arabian_mate, "arabianMate"),
    ];
    named
        .iter()
        .find(|(detect, _)| detect(line))
        .map(|(_, name)| Tag::leaf(*name))
        .or_else(|| boden_or_double_bishop_mate(line))
        .or_else(|| dovetail_mate(line).then(|| Tag::leaf("dovetailMate")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::CpTag;

    fn line(fen: &str, moves: &str) -> PuzzleLine {
        PuzzleLine::from_uci("m", fen, moves, CpTag::Mate).unwrap()
    }

    const BACK_RANK_FEN: &str = "6k1/p4ppp/8/8/8/8/5PPP/3R2K1 b - - 0 1";

    #[test]
    fn test_luft_prevents_mate() {
        let l = line(BACK_RANK_FEN, "h7h6 d1d8");
        assert!(!l.is_checkmate());
        assert!(!back_rank_mate(&l));
        assert_eq!(mate_pattern(&l), None);
    }

    #[test]
    fn test_back_rank() {
        let l = line(BACK_RANK_FEN, "a7a6 d1d8");
        assert!(l.is_checkmate());
        assert!(!smothered_mate(&l));
        assert!(back_rank_mate(&l));
        assert_eq!(mate_pattern(&l), Some(Tag::leaf("backRankMate")));
    }

    #[test]
    fn test_smothered() {
        let l = line("6rk/p5pp/8/6N1/8/8/8/5K2 b - - 0 1", "a7a6 g5f7");
        assert!(l.is_checkmate());
        assert!(smothered_mate(&l));
        assert_eq!(mate_pattern(&l), Some(Tag::leaf("smotheredMate")));
    }

    #[test]
    fn test_not_mate_means_no_pattern() {
        let l = line("4k3/8/8/8/8/8/8/R3K3 b - - 0 1", "e8d7 a1a7");
        assert!(!l.is_checkmate());
        assert_eq!(mate_pattern(&l), None);
        assert!(!dovetail_mate(&l));
    }

    #[test]
    fn test_boden() {
        // bishops from both sides of the king
        let l = line("2kr4/3p3p/8/8/5B2/8/4B3/6K1 b - - 0 1", "h7h6 e2a6");
        assert!(l.is_checkmate());
        assert!(!back_rank_mate(&l));
        assert_eq!(mate_pattern(&l), Some(Tag::leaf("bodenMate")));
    }

    #[test]
    fn test_double_bishop() {
        // both bishops on the queenside of a cornered king
        let l = line("6bk/p6p/8/8/8/3B4/8/2B3K1 b - - 0 1", "a7a6 c1b2");
        assert!(l.is_checkmate());
        assert_eq!(mate_pattern(&l), Some(Tag::leaf("doubleBishopMate")));
    }

    #[test]
    fn test_dovetail() {
        let l = line("8/p4pp1/5bk1/8/8/8/4Q3/1K5R b - - 0 1", "a7a6 e2h5");
        assert!(l.is_checkmate());
        assert!(dovetail_mate(&l));
        assert_eq!(mate_pattern(&l), Some(Tag::leaf("dovetailMate")));
    }
}
