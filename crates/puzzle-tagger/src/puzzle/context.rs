use shakmaty::{Board, Chess, Color, Position, Role};

use super::{PlyMove, PuzzleLine, PuzzleNode};

/// What a per-move detector sees: one node and the line it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct MoveContext<'a> {
    line: &'a PuzzleLine,
    node: &'a PuzzleNode,
}

impl<'a> MoveContext<'a> {
    pub fn new(line: &'a PuzzleLine, node: &'a PuzzleNode) -> Self {
        Self { line, node }
    }

    pub fn line(&self) -> &'a PuzzleLine {
        self.line
    }

    pub fn node(&self) -> &'a PuzzleNode {
        self.node
    }

    pub fn pov(&self) -> Color {
        self.line.pov()
    }

    pub fn mv(&self) -> PlyMove {
        self.node.mv
    }

    pub fn moved(&self) -> Role {
        self.node.moved
    }

    pub fn is_capture(&self) -> bool {
        self.node.capture
    }

    /// Position after the move
    pub fn position(&self) -> &'a Chess {
        &self.node.board_after
    }

    pub fn board(&self) -> &'a Board {
        self.node.board_after.board()
    }

    /// Position before the move
    pub fn position_before(&self) -> &'a Chess {
        &self.node.board_before
    }

    pub fn board_before(&self) -> &'a Board {
        self.node.board_before.board()
    }

    /// `position_back(0)` is after the move, `position_back(1)` before it, and so on up to the root.
    pub fn position_back(&self, k: usize) -> Option<&'a Chess> {
        self.line.position_back(self.node, k)
    }

    pub fn root(&self) -> &'a Chess {
        self.line.root()
    }

    pub fn parent(&self) -> Option<&'a PuzzleNode> {
        self.line.parent(self.node)
    }

    pub fn grandparent(&self) -> Option<&'a PuzzleNode> {
        self.line.grandparent(self.node)
    }

    pub fn ancestor(&self, n: usize) -> Option<&'a PuzzleNode> {
        self.line.nth_ancestor(self.node, n)
    }

    pub fn next(&self) -> Option<&'a PuzzleNode> {
        self.line.next(self.node)
    }

    pub fn next_next(&self) -> Option<&'a PuzzleNode> {
        self.next().and_then(|reply| self.line.next(reply))
    }

    pub fn is_end(&self) -> bool {
        self.node.next.is_none()
    }

    pub fn gives_check(&self) -> bool {
        self.node.board_after.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.node.board_after.is_checkmate()
    }

    pub fn is_first_solver_move(&self) -> bool {
        self.line.is_first_solver_move(self.node)
    }

    pub fn is_last_solver_move(&self) -> bool {
        self.line.is_last_solver_move(self.node)
    }
}
