//! Multi-strategy anchor resolution.
use serde::{Deserialize, Serialize};

use crate::host::{NodeId, PerkGraph};
use crate::layout::OffsetRule;

/// Where a tier attaches to the existing graph and how it is placed there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorRule {
    /// Raw name of the preferred anchor node.
    pub anchor_id: String,
    pub offset: OffsetRule,
}

/// Tunables for the structural and label fallback strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Inclusive capacity-marker range identifying base-tier nodes.
    pub marker_min: i32,
    pub marker_max: i32,
    /// Substrings matched against display names, checked last.
    #[serde(default)]
    pub label_needles: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            marker_min: 10,
            marker_max: 50,
            label_needles: vec!["Storage".to_string()],
        }
    }
}

/// Which lookup strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStrategy {
    /// Exact raw-name lookup.
    Exact,
    /// Capacity-marker value inside the configured base-tier range.
    Marker,
    /// Display-name substring against the configured labels.
    Label,
}

/// A resolved anchor and the strategy that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    pub node: NodeId,
    pub strategy: AnchorStrategy,
}

/// Locate the anchor node for a rule.
///
/// Strategies run in a fixed order and the first success wins: exact raw-name
/// lookup, then the structural capacity-marker scan, then display-name
/// substrings. Ties within a strategy go to the first candidate in host
/// iteration order. Returns `None` when every strategy fails; the caller
/// skips the tier.
#[must_use]
pub fn resolve<G: PerkGraph>(
    rule: &AnchorRule,
    graph: &G,
    cfg: &ResolverConfig,
) -> Option<AnchorMatch> {
    let nodes = graph.node_ids();

    for &node in &nodes {
        if graph.raw_name(node).as_deref() == Some(rule.anchor_id.as_str()) {
            return Some(AnchorMatch {
                node,
                strategy: AnchorStrategy::Exact,
            });
        }
    }

    for &node in &nodes {
        if let Some(marker) = graph.capacity_marker(node)
            && marker >= cfg.marker_min
            && marker <= cfg.marker_max
        {
            return Some(AnchorMatch {
                node,
                strategy: AnchorStrategy::Marker,
            });
        }
    }

    for &node in &nodes {
        if let Some(name) = graph.display_name(node)
            && cfg.label_needles.iter().any(|needle| name.contains(needle))
        {
            return Some(AnchorMatch {
                node,
                strategy: AnchorStrategy::Label,
            });
        }
    }

    None
}
