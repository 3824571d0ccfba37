/// Board utility functions for tactical analysis
/// Attack queries, material counting and the hanging / bad-spot / trapped predicates
/// shared by every detector.

use shakmaty::{attacks, Bitboard, Board, Chess, Color, EnPassantMode, File, Piece, Position, Rank, Role, Square};

// Piece values for material calculation
pub const PAWN_VALUE: i32 = 1;
pub const KNIGHT_VALUE: i32 = 3;
pub const BISHOP_VALUE: i32 = 3;
pub const ROOK_VALUE: i32 = 5;
pub const QUEEN_VALUE: i32 = 9;
pub const KING_VALUE: i32 = 99;

/// Piece value (no king)
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => 0,
    }
}

/// Piece value including king (for fork detection etc)
pub fn king_value(role: Role) -> i32 {
    match role {
        Role::King => KING_VALUE,
        other => piece_value(other),
    }
}

/// Is this a ray (sliding) piece type?
pub fn is_ray_piece(role: Role) -> bool {
    matches!(role, Role::Queen | Role::Rook | Role::Bishop)
}

pub fn file_index(square: Square) -> i32 {
    square.file() as i32
}

pub fn rank_index(square: Square) -> i32 {
    square.rank() as i32
}

/// Square from file/rank indices, `None` when off the board.
pub fn square_at(file: i32, rank: i32) -> Option<Square> {
    if !(0..8).contains(&file) || !(0..8).contains(&rank) {
        return None;
    }
    Some(Square::from_coords(File::new(file as u32), Rank::new(rank as u32)))
}

/// Squares attacked by the piece on `square` (empty if there is none).
pub fn attacks(board: &Board, square: Square) -> Bitboard {
    board.attacks_from(square)
}

/// All pieces of `color` attacking `square`, sliders blocked by the current occupancy.
pub fn attackers(board: &Board, color: Color, square: Square) -> Bitboard {
    board.attacks_to(square, color, board.occupied())
}

/// The line through the king of `color` and the slider pinning the piece on `square`.
/// `None` when nothing is pinned there.
pub fn pin_ray(board: &Board, color: Color, square: Square) -> Option<Bitboard> {
    let king = board.king_of(color)?;
    let mask = Bitboard::from(square);
    let enemy = board.by_color(!color);
    let queens = board.by_role(Role::Queen);

    let lines = [
        (attacks::rook_attacks(king, Bitboard::EMPTY), board.by_role(Role::Rook) | queens),
        (attacks::bishop_attacks(king, Bitboard::EMPTY), board.by_role(Role::Bishop) | queens),
    ];

    for (rays, sliders) in lines {
        if !rays.contains(square) {
            continue;
        }
        for sniper in rays & sliders & enemy {
            if attacks::between(sniper, king) & (board.occupied() | mask) == mask {
                return Some(attacks::ray(king, sniper));
            }
        }
        break;
    }
    None
}

pub fn is_pinned(board: &Board, color: Color, square: Square) -> bool {
    pin_ray(board, color, square).is_some()
}

/// Is a piece defended?
/// Checks direct defenders AND ray defense (x-ray through an attacker)
pub fn is_defended(board: &Board, piece: Piece, square: Square) -> bool {
    if attackers(board, piece.color, square).any() {
        return true;
    }

    // Ray defense: lift each enemy slider off the board and look again
    for attacker in attackers(board, !piece.color, square) {
        let Some(role) = board.role_at(attacker) else {
            continue;
        };
        if is_ray_piece(role) {
            let mut without = board.clone();
            without.discard_piece_at(attacker);
            if attackers(&without, piece.color, square).any() {
                return true;
            }
        }
    }

    false
}

/// Is a piece hanging (not defended)?
pub fn is_hanging(board: &Board, piece: Piece, square: Square) -> bool {
    !is_defended(board, piece, square)
}

/// Can a piece be taken by a lower-value piece?
pub fn can_be_taken_by_lower_piece(board: &Board, piece: Piece, square: Square) -> bool {
    attackers(board, !piece.color, square).into_iter().any(|sq| {
        board
            .role_at(sq)
            .is_some_and(|role| role != Role::King && piece_value(role) < piece_value(piece.role))
    })
}

/// Is a piece in a bad spot (hanging or takeable by lower piece)?
pub fn is_in_bad_spot(board: &Board, square: Square) -> bool {
    let Some(piece) = board.piece_at(square) else {
        return false;
    };

    attackers(board, !piece.color, square).any()
        && (is_hanging(board, piece, square) || can_be_taken_by_lower_piece(board, piece, square))
}

/// Is a piece trapped? (in a bad spot and all escape squares are also bad)
pub fn is_trapped(pos: &Chess, square: Square) -> bool {
    let board = pos.board();
    if pos.is_check() || is_pinned(board, pos.turn(), square) {
        return false;
    }

    let Some(piece) = board.piece_at(square) else {
        return false;
    };

    // Pawns and kings can't be "trapped" in the tactical sense
    if matches!(piece.role, Role::Pawn | Role::King) {
        return false;
    }

    if !is_in_bad_spot(board, square) {
        return false;
    }

    for escape in pos.legal_moves() {
        if escape.from() != Some(square) {
            continue;
        }
        let to = escape.to();
        if let Some(captured) = board.role_at(to) {
            if piece_value(captured) >= piece_value(piece.role) {
                return false;
            }
        }
        let mut scratch = pos.clone();
        scratch.play_unchecked(escape);
        if !is_in_bad_spot(scratch.board(), to) {
            return false;
        }
    }

    true
}

/// Count material for one side
pub fn material_count(board: &Board, color: Color) -> i32 {
    let own = board.by_color(color);
    [Role::Pawn, Role::Knight, Role::Bishop, Role::Rook, Role::Queen]
        .into_iter()
        .map(|role| (board.by_role(role) & own).count() as i32 * piece_value(role))
        .sum()
}

/// Material difference (positive = side has more)
pub fn material_diff(board: &Board, side: Color) -> i32 {
    material_count(board, side) - material_count(board, !side)
}

/// Get opponent pieces attacked from a square
pub fn attacked_opponent_squares(board: &Board, from_square: Square, pov: Color) -> Vec<(Piece, Square)> {
    attacks(board, from_square)
        .into_iter()
        .filter_map(|sq| board.piece_at(sq).map(|piece| (piece, sq)))
        .filter(|(piece, _)| piece.color != pov)
        .collect()
}

/// Get opponent pieces attacked from a square (just the pieces, no squares)
pub fn attacked_opponent_pieces(board: &Board, from_square: Square, pov: Color) -> Vec<Piece> {
    attacked_opponent_squares(board, from_square, pov)
        .into_iter()
        .map(|(piece, _)| piece)
        .collect()
}

/// Get all pieces of a color that attack a square (as Piece list)
pub fn attacker_pieces(board: &Board, color: Color, square: Square) -> Vec<Piece> {
    attackers(board, color, square)
        .into_iter()
        .filter_map(|sq| board.piece_at(sq))
        .collect()
}

/// Piece map: every occupied square with its piece, highest square first
pub fn piece_map(board: &Board) -> Vec<(Square, Piece)> {
    let mut pieces: Vec<(Square, Piece)> = board
        .occupied()
        .into_iter()
        .filter_map(|sq| board.piece_at(sq).map(|piece| (sq, piece)))
        .collect();
    pieces.reverse();
    pieces
}

/// Squares adjacent to a king (distance == 1)
pub fn king_adjacent_squares(king: Square) -> Bitboard {
    attacks::king_attacks(king)
}

/// Pseudo-legal destinations of the piece on `square` for the side to move.
/// Pins and checks are ignored; castling is not included.
pub fn pseudo_legal_dests(pos: &Chess, square: Square) -> Bitboard {
    let board = pos.board();
    let Some(piece) = board.piece_at(square) else {
        return Bitboard::EMPTY;
    };
    let own = board.by_color(piece.color);

    if piece.role != Role::Pawn {
        return attacks(board, square) & !own;
    }

    let mut result = Bitboard::EMPTY;
    let enemy = board.by_color(!piece.color);
    let ep = pos.ep_square(EnPassantMode::Always);
    for target in attacks::pawn_attacks(piece.color, square) {
        if enemy.contains(target) || ep == Some(target) {
            result |= Bitboard::from(target);
        }
    }

    let (step, start_rank) = match piece.color {
        Color::White => (1, 1),
        Color::Black => (-1, 6),
    };
    let file = file_index(square);
    let rank = rank_index(square);
    if let Some(one) = square_at(file, rank + step) {
        if !board.occupied().contains(one) {
            result |= Bitboard::from(one);
            if rank == start_rank {
                if let Some(two) = square_at(file, rank + 2 * step) {
                    if !board.occupied().contains(two) {
                        result |= Bitboard::from(two);
                    }
                }
            }
        }
    }
    result
}

/// Could the king of the side opposing `pov` be exposed?
/// Measured from `pov`'s side of the board: the king stands on the sixth rank or
/// beyond with no own pawn in front of it or beside it.
pub fn possible_exposed_king(board: &Board, pov: Color) -> bool {
    let Some(king) = board.king_of(!pov) else {
        return false;
    };
    let relative = |sq: Square| match pov {
        Color::White => sq,
        Color::Black => sq.flip_vertical(),
    };

    let king = relative(king);
    let (file, rank) = (file_index(king), rank_index(king));
    if rank < 5 {
        return false;
    }

    let shield = [(0, -1), (-1, 0), (-1, -1), (1, 0), (1, -1)];
    let pawn = Piece { color: !pov, role: Role::Pawn };
    !shield
        .iter()
        .filter_map(|(df, dr)| square_at(file + df, rank + dr))
        .any(|sq| board.piece_at(relative(sq)) == Some(pawn))
}
