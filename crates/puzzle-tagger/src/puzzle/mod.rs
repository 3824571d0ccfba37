//! Puzzle data model: the mainline arena, solver parity and evaluation tiers
//! A line is node 0 (the opponent's setup move) followed by alternating solver and opponent moves.

pub mod context;
pub mod cook;
pub mod legacy;
pub mod tag;

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, File, Move, Position, Role, Square};
use tracing::trace;

use crate::error::TaggerError;

pub use context::MoveContext;

/// Coarse evaluation tier of a puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CpTag {
    Mate,
    Crushing,
    Advantage,
    Equality,
}

impl CpTag {
    /// Tier from a Lichess themes string, by substring in priority order.
    pub fn from_themes(themes: &str) -> Self {
        if themes.contains("mate") {
            CpTag::Mate
        } else if themes.contains("crushing") {
            CpTag::Crushing
        } else if themes.contains("advantage") {
            CpTag::Advantage
        } else {
            CpTag::Equality
        }
    }

    /// Tier from a raw engine evaluation in centipawns.
    pub fn from_centipawns(cp: i32) -> Self {
        if cp > 600 {
            CpTag::Crushing
        } else if cp > 200 {
            CpTag::Advantage
        } else {
            CpTag::Equality
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CpTag::Mate => "mate",
            CpTag::Crushing => "crushing",
            CpTag::Advantage => "advantage",
            CpTag::Equality => "equality",
        }
    }
}

impl fmt::Display for CpTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A move in UCI coordinates. Castling is the king's two-square move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlyMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl PlyMove {
    pub fn from_move(mv: &Move) -> Self {
        match *mv {
            Move::Normal { from, to, promotion, .. } => PlyMove { from, to, promotion },
            Move::EnPassant { from, to } => PlyMove { from, to, promotion: None },
            Move::Castle { king, rook } => {
                let file = if rook.file() > king.file() { File::G } else { File::C };
                PlyMove {
                    from: king,
                    to: Square::from_coords(file, king.rank()),
                    promotion: None,
                }
            }
            // No drops in standard chess
            Move::Put { to, .. } => PlyMove { from: to, to, promotion: None },
        }
    }
}

impl fmt::Display for PlyMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

/// A single node in the puzzle mainline
#[derive(Debug, Clone)]
pub struct PuzzleNode {
    /// Ply index in the puzzle (0 = opponent's setup move, 1 = first solver move, etc.)
    pub ply: usize,
    pub mv: PlyMove,
    /// Position BEFORE this move
    pub board_before: Chess,
    /// Position AFTER this move
    pub board_after: Chess,
    /// Role standing on the destination after the move (the promoted role for promotions)
    pub moved: Role,
    /// Whether the move captured, en passant included
    pub capture: bool,
    pub parent: Option<usize>,
    pub next: Option<usize>,
}

impl PuzzleNode {
    /// Color of the side that played this move
    pub fn mover(&self) -> Color {
        !self.board_after.turn()
    }

    pub fn is_king_move(&self) -> bool {
        self.moved == Role::King
    }

    pub fn is_castling(&self) -> bool {
        self.is_king_move() && self.mv.from.distance(self.mv.to) > 1
    }

    pub fn gives_check(&self) -> bool {
        self.board_after.is_check()
    }

    pub fn is_advanced_pawn_move(&self) -> bool {
        if self.mv.promotion.is_some() {
            return true;
        }
        if self.moved != Role::Pawn {
            return false;
        }
        let rank = self.mv.to.rank() as i32;
        match self.mover() {
            Color::White => rank > 4,
            Color::Black => rank < 3,
        }
    }

    pub fn is_very_advanced_pawn_move(&self) -> bool {
        if !self.is_advanced_pawn_move() {
            return false;
        }
        let rank = self.mv.to.rank() as i32;
        match self.mover() {
            Color::White => rank > 5,
            Color::Black => rank < 2,
        }
    }
}

/// A solved puzzle: the initial position plus the forced mainline
#[derive(Debug, Clone)]
pub struct PuzzleLine {
    id: String,
    root: Chess,
    /// Never empty
    nodes: Vec<PuzzleNode>,
    pov: Color,
    cp_tag: CpTag,
}

impl PuzzleLine {
    /// Parse a FEN and a whitespace-separated list of UCI moves.
    pub fn from_uci(id: impl Into<String>, fen: &str, moves: &str, cp_tag: CpTag) -> Result<Self, TaggerError> {
        let setup: Fen = fen
            .parse()
            .map_err(|e| TaggerError::InvalidFen(format!("{fen}: {e}")))?;
        let root: Chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|e| TaggerError::InvalidFen(format!("{fen}: {e}")))?;

        let moves = moves
            .split_whitespace()
            .enumerate()
            .map(|(ply, token)| {
                token.parse::<UciMove>().map_err(|_| TaggerError::InvalidMove {
                    ply,
                    uci: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(id, root, &moves, cp_tag)
    }

    /// Build from an already parsed position, validating every move in turn.
    pub fn new(id: impl Into<String>, root: Chess, moves: &[UciMove], cp_tag: CpTag) -> Result<Self, TaggerError> {
        if moves.is_empty() {
            return Err(TaggerError::EmptyMainline);
        }

        let mut nodes: Vec<PuzzleNode> = Vec::with_capacity(moves.len());
        let mut pos = root.clone();
        for (ply, uci) in moves.iter().enumerate() {
            let mv = uci.to_move(&pos).map_err(|_| TaggerError::InvalidMove {
                ply,
                uci: uci.to_string(),
            })?;

            let ply_move = PlyMove::from_move(&mv);
            let moved = mv.promotion().unwrap_or(mv.role());
            let capture = mv.is_capture();
            let board_before = pos.clone();
            pos.play_unchecked(mv);

            let parent = ply.checked_sub(1);
            if let Some(prev) = parent {
                nodes[prev].next = Some(ply);
            }
            nodes.push(PuzzleNode {
                ply,
                mv: ply_move,
                board_before,
                board_after: pos.clone(),
                moved,
                capture,
                parent,
                next: None,
            });
        }

        let pov = nodes[0].board_after.turn();
        let line = Self {
            id: id.into(),
            root,
            nodes,
            pov,
            cp_tag,
        };
        trace!(id = %line.id, plies = line.len(), pov = ?line.pov, "built puzzle line");
        Ok(line)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Position before any puzzle move
    pub fn root(&self) -> &Chess {
        &self.root
    }

    pub fn pov(&self) -> Color {
        self.pov
    }

    pub fn cp_tag(&self) -> CpTag {
        self.cp_tag
    }

    pub fn nodes(&self) -> &[PuzzleNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&PuzzleNode> {
        self.nodes.get(index)
    }

    /// Number of plies
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Last node of the mainline
    pub fn end(&self) -> &PuzzleNode {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn parent(&self, node: &PuzzleNode) -> Option<&PuzzleNode> {
        node.parent.and_then(|i| self.nodes.get(i))
    }

    pub fn grandparent(&self, node: &PuzzleNode) -> Option<&PuzzleNode> {
        self.nth_ancestor(node, 2)
    }

    /// Node `n` plies before `node`; `n == 0` is the node itself.
    pub fn nth_ancestor(&self, node: &PuzzleNode, n: usize) -> Option<&PuzzleNode> {
        node.ply.checked_sub(n).and_then(|i| self.nodes.get(i))
    }

    pub fn next(&self, node: &PuzzleNode) -> Option<&PuzzleNode> {
        node.next.and_then(|i| self.nodes.get(i))
    }

    /// Position `k` plies before the position after `node`.
    /// `k == 0` is the position after the node, `k == ply + 1` the root.
    pub fn position_back(&self, node: &PuzzleNode, k: usize) -> Option<&Chess> {
        match (node.ply + 1).checked_sub(k)? {
            0 => Some(&self.root),
            after => self.nodes.get(after - 1).map(|n| &n.board_after),
        }
    }

    pub fn is_solver_move(&self, node: &PuzzleNode) -> bool {
        node.board_after.turn() != self.pov
    }

    /// A solver move whose parent or grandparent is the root.
    pub fn is_first_solver_move(&self, node: &PuzzleNode) -> bool {
        self.is_solver_move(node) && node.ply <= 1
    }

    /// A solver move that ends the line, or is answered by the final move.
    pub fn is_last_solver_move(&self, node: &PuzzleNode) -> bool {
        self.is_solver_move(node)
            && match self.next(node) {
                None => true,
                Some(reply) => reply.next.is_none(),
            }
    }

    /// Solver nodes in ply order
    pub fn solver_move_nodes(&self) -> impl Iterator<Item = &PuzzleNode> + Clone + '_ {
        self.nodes.iter().filter(move |node| self.is_solver_move(node))
    }

    pub fn is_checkmate(&self) -> bool {
        self.end().board_after.is_checkmate()
    }

    pub fn context<'a>(&'a self, node: &'a PuzzleNode) -> MoveContext<'a> {
        MoveContext::new(self, node)
    }
}
