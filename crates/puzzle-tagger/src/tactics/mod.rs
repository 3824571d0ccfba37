/// Tactical detectors
/// Per-move detectors share one signature and run from a fixed registry;
/// puzzle-level classifiers (mate patterns, endgames, side attacks) take the whole line.

pub mod attacks;
pub mod line_geometry;
pub mod material;
pub mod mate_patterns;
pub mod pins;
pub mod positional;
pub mod side_attacks;
pub mod simple;

use shakmaty::Role;
use tracing::trace;

use crate::puzzle::tag::Tag;
use crate::puzzle::MoveContext;

/// A per-move detector: `Some(tag)` when its motif occurs on this move
pub type MoveDetector = fn(&MoveContext) -> Option<Tag>;

/// Every per-move detector, in the order they run
pub const MOVE_DETECTORS: &[(&str, MoveDetector)] = &[
    ("advancedPawn", simple::advanced_pawn),
    ("doubleCheck", simple::double_check),
    ("sacrifice", material::sacrifice),
    ("xRay", line_geometry::x_ray),
    ("fork", attacks::fork),
    ("hangingPiece", attacks::hanging_piece),
    ("trappedPiece", attacks::trapped_piece),
    ("discoveredAttack", line_geometry::discovered_attack),
    ("discoveredCheck", line_geometry::discovered_check),
    ("quietMove", positional::quiet_move),
    ("defensiveMove", positional::defensive_move),
    ("attraction", positional::attraction),
    ("deflection", positional::deflection),
    ("skewer", line_geometry::skewer),
    ("interference", line_geometry::interference),
    ("intermezzo", positional::intermezzo),
    ("pinPreventsAttack", pins::pin_prevents_attack),
    ("pinPreventsEscape", pins::pin_prevents_escape),
    ("clearance", line_geometry::clearance),
    ("enPassant", simple::en_passant),
    ("castling", simple::castling),
    ("promotion", simple::promotion),
    ("underPromotion", simple::under_promotion),
    ("capturingDefender", attacks::capturing_defender),
    ("attackingF2F7", simple::attacking_f2_f7),
    ("exposedKing", material::exposed_king),
];

/// Run every registered detector on one move; the result is sorted.
pub fn detect_move_tags(ctx: &MoveContext) -> Vec<Tag> {
    let mut tags: Vec<Tag> = MOVE_DETECTORS
        .iter()
        .filter_map(|(name, detect)| {
            let tag = detect(ctx);
            if let Some(tag) = &tag {
                trace!(ply = ctx.node().ply, detector = *name, %tag, "detector fired");
            }
            tag
        })
        .collect();
    tags.sort();
    tags
}

/// `label:<role>` with the lowercase role symbol
pub(crate) fn with_role(label: &str, role: Role) -> Tag {
    Tag::with(label, role.char().to_string())
}
