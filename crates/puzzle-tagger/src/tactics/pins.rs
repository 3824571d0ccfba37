/// Pin detectors: pin_prevents_attack, pin_prevents_escape

use shakmaty::Role;

use crate::board_utils::{
    attackers, attacks, is_hanging, is_ray_piece, king_value, piece_map, piece_value, pin_ray, pseudo_legal_dests,
};
use crate::puzzle::tag::Tag;
use crate::puzzle::MoveContext;

fn pin_tag(kind: &str, role: Role) -> Tag {
    Tag::node("pin", Tag::with(kind, role.char().to_string()))
}

/// The pinned piece can't attack a player piece
pub fn pin_prevents_attack(ctx: &MoveContext) -> Option<Tag> {
    let board = ctx.board();
    let pov = ctx.pov();

    for (square, piece) in piece_map(board) {
        if piece.color == pov {
            continue;
        }
        let Some(pin_dir) = pin_ray(board, piece.color, square) else {
            continue;
        };

        for attack in attacks(board, square) {
            let Some(attacked) = board.piece_at(attack) else {
                continue;
            };
            if attacked.color != pov || pin_dir.contains(attack) {
                continue;
            }
            if piece_value(attacked.role) <= piece_value(piece.role) && !is_hanging(board, attacked, attack) {
                continue;
            }

            // The slider holding the pin; the highest square wins
            let pinning = attackers(board, pov, square)
                .into_iter()
                .filter(|sq| pin_dir.contains(*sq) && *sq != square)
                .filter_map(|sq| board.role_at(sq))
                .filter(|role| is_ray_piece(*role))
                .last();
            if let Some(role) = pinning {
                return Some(pin_tag("preventsAttack", role));
            }
        }
    }
    None
}

/// The pinned piece can't escape the attack
pub fn pin_prevents_escape(ctx: &MoveContext) -> Option<Tag> {
    let position = ctx.position();
    let board = ctx.board();
    let pov = ctx.pov();

    for (pinned_square, pinned) in piece_map(board) {
        if pinned.color == pov {
            continue;
        }
        let Some(pin_dir) = pin_ray(board, pinned.color, pinned_square) else {
            continue;
        };

        for attacker_square in attackers(board, pov, pinned_square) {
            if !pin_dir.contains(attacker_square) {
                continue;
            }
            let Some(attacker) = board.piece_at(attacker_square) else {
                continue;
            };

            let stuck = king_value(pinned.role) > king_value(attacker.role)
                || (is_hanging(board, pinned, pinned_square)
                    && !attackers(board, !pov, attacker_square).contains(pinned_square)
                    && (pseudo_legal_dests(position, pinned_square) & !pin_dir).any());
            if stuck {
                return Some(pin_tag("preventsEscape", attacker.role));
            }
        }
    }
    None
}
