//! Anchor-relative placement of injected nodes.
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// 2D board position in the host's layout space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// How an injected node is positioned relative to its anchor.
///
/// Both variants are pure functions of the anchor's current position, so a
/// batch places every node the same way no matter what order its tiers run in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetRule {
    /// Place at a fixed board position; the stored offset is `target - anchor`.
    Absolute(Vec2),
    /// Place at a plain delta from the anchor.
    Relative(Vec2),
}

impl OffsetRule {
    /// Offset to add to the anchor position for this rule.
    #[must_use]
    pub fn offset_from(&self, anchor: Vec2) -> Vec2 {
        match self {
            Self::Absolute(target) => *target - anchor,
            Self::Relative(delta) => *delta,
        }
    }
}

/// Compute the absolute position for an injected node.
///
/// Pure and uncached: anchor positions are host-owned and may differ between
/// runs, so every injection run evaluates placement fresh.
#[must_use]
pub fn place(anchor_pos: Vec2, rule: &OffsetRule) -> Vec2 {
    anchor_pos + rule.offset_from(anchor_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_rule_lands_on_target_regardless_of_anchor() {
        let rule = OffsetRule::Absolute(Vec2::new(-60.0, 200.0));
        assert_eq!(place(Vec2::new(0.0, 0.0), &rule), Vec2::new(-60.0, 200.0));
        assert_eq!(
            place(Vec2::new(35.0, -12.5), &rule),
            Vec2::new(-60.0, 200.0)
        );
    }

    #[test]
    fn relative_rule_follows_anchor() {
        let rule = OffsetRule::Relative(Vec2::new(30.0, 80.0));
        assert_eq!(
            place(Vec2::new(10.0, 10.0), &rule),
            Vec2::new(40.0, 90.0)
        );
        assert_eq!(
            place(Vec2::new(-5.0, 0.0), &rule),
            Vec2::new(25.0, 80.0)
        );
    }

    #[test]
    fn place_is_deterministic_for_fixed_inputs() {
        let rule = OffsetRule::Absolute(Vec2::new(120.0, 900.0));
        let anchor = Vec2::new(60.0, 450.0);
        let first = place(anchor, &rule);
        let second = place(anchor, &rule);
        assert_eq!(first, second);
    }
}
