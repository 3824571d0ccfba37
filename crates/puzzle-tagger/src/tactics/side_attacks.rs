/// Side attack detectors: kingside_attack, queenside_attack

use shakmaty::{Color, Position};

use crate::board_utils::{file_index, rank_index, square_at};
use crate::puzzle::tag::Tag;
use crate::puzzle::PuzzleLine;

/// Kingside attack
pub fn kingside_attack(line: &PuzzleLine) -> bool {
    side_attack(line, 7, &[6, 7], 20)
}

/// Queenside attack
pub fn queenside_attack(line: &PuzzleLine) -> bool {
    side_attack(line, 0, &[0, 1, 2], 18)
}

/// Kingside first, then queenside
pub fn side_attack_tag(line: &PuzzleLine) -> Option<Tag> {
    if kingside_attack(line) {
        Some(Tag::leaf("kingsideAttack"))
    } else if queenside_attack(line) {
        Some(Tag::leaf("queensideAttack"))
    } else {
        None
    }
}

fn side_attack(line: &PuzzleLine, corner_file: i32, king_files: &[i32], nb_pieces: usize) -> bool {
    let pov = line.pov();
    let back_rank = if pov == Color::White { 7 } else { 0 };
    let Some(setup) = line.node(0) else {
        return false;
    };
    let init_board = setup.board_after.board();
    let Some(king) = init_board.king_of(!pov) else {
        return false;
    };

    if rank_index(king) != back_rank || !king_files.contains(&file_index(king)) {
        return false;
    }
    // no endgames
    if init_board.occupied().count() < nb_pieces {
        return false;
    }
    // Must have at least one check among solver moves
    if !line.solver_move_nodes().any(|node| node.gives_check()) {
        return false;
    }

    let Some(corner) = square_at(corner_file, back_rank) else {
        return false;
    };
    let score: i32 = line
        .solver_move_nodes()
        .map(|node| {
            let corner_dist = corner.distance(node.mv.to);
            let mut score = 0;
            if node.gives_check() {
                score += 1;
            }
            if node.capture && corner_dist <= 3 {
                score += 1;
            } else if corner_dist >= 5 {
                score -= 1;
            }
            score
        })
        .sum();

    score >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::CpTag;

    #[test]
    fn test_queenside_attack() {
        // Qxb7+ next to the a8 corner
        let line = PuzzleLine::from_uci(
            "q",
            "2kr2n1/ppp2ppp/8/8/8/1Q3N2/PPP2PPP/3R2K1 b - - 0 1",
            "h7h6 b3b7",
            CpTag::Crushing,
        )
        .unwrap();
        assert!(!kingside_attack(&line));
        assert!(queenside_attack(&line));
        assert_eq!(side_attack_tag(&line), Some(Tag::leaf("queensideAttack")));
    }

    #[test]
    fn test_endgame_is_no_side_attack() {
        let line =
            PuzzleLine::from_uci("e", "6k1/5ppp/8/8/8/8/r4PPP/3R2K1 b - - 0 1", "a2a1 d1a1", CpTag::Crushing).unwrap();
        assert_eq!(side_attack_tag(&line), None);
    }
}
