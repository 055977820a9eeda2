//! Tier catalog: the static descriptors for every injectable progression step.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::anchor::AnchorRule;
use crate::layout::{OffsetRule, Vec2};

/// Stable identity of a tier.
///
/// Doubles as the persistence key in the backup store, so it must survive
/// process restarts unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierId(pub String);

impl TierId {
    /// Construct an id from a string slice, trimming whitespace.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One material line of an unlock cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCost {
    pub item_id: i32,
    pub amount: i32,
}

/// Full price of unlocking a tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockCost {
    /// Currency amount; zero means no currency requirement.
    pub currency: i64,
    #[serde(default)]
    pub items: Vec<ItemCost>,
}

/// Immutable description of one injectable tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDescriptor {
    pub id: TierId,
    /// Localization key shown by the host.
    pub display_key: String,
    /// Capacity (or equivalent aggregate) granted when unlocked.
    pub effect_value: i32,
    pub level_requirement: i32,
    #[serde(default)]
    pub secret: bool,
    pub cost: UnlockCost,
    pub anchor: AnchorRule,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate tier id {0}")]
    DuplicateId(TierId),
    #[error("tier id must not be empty")]
    EmptyId,
    #[error("catalog JSON malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered, validated list of tier descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierCatalog {
    tiers: Vec<TierDescriptor>,
}

impl TierCatalog {
    /// Build a catalog, rejecting empty or duplicate tier ids.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` when any id is blank or appears twice.
    pub fn new(tiers: Vec<TierDescriptor>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for tier in &tiers {
            if tier.id.as_str().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(tier.id.clone()) {
                return Err(CatalogError::DuplicateId(tier.id.clone()));
            }
        }
        Ok(Self { tiers })
    }

    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on malformed JSON or invalid ids.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let tiers: Vec<TierDescriptor> = serde_json::from_str(json)?;
        Self::new(tiers)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TierDescriptor> {
        self.tiers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// The built-in storage expansion catalog: nine tiers extending the base
    /// storage branch, each 60 capacity and 10000 gold above the last.
    #[must_use]
    pub fn storage() -> Self {
        let rows: [(&str, &str, i32, i32, i64, i32, &str, f32, f32); 9] = [
            ("Perk_SuperStorage_2", "SuperStorage_Lv2", 60, 2, 10_000, 50, "Perk_Storage_1", -60.0, 200.0),
            ("Perk_SuperStorage_3", "SuperStorage_Lv3", 120, 3, 20_000, 50, "Perk_Storage_2", -60.0, 300.0),
            ("Perk_SuperStorage_4", "SuperStorage_Lv4", 180, 4, 30_000, 50, "Perk_Storage_3", -60.0, 400.0),
            ("Perk_SuperStorage_5", "SuperStorage_Lv5", 240, 5, 40_000, 50, "Perk_Storage_4", -60.0, 500.0),
            ("Perk_SuperStorage_6", "SuperStorage_Lv6", 300, 6, 50_000, 49, "Perk_Storage_y_5", 120.0, 900.0),
            ("Perk_SuperStorage_7", "SuperStorage_Lv7", 360, 7, 60_000, 49, "Perk_Storage_y_5", 120.0, 820.0),
            ("Perk_SuperStorage_8", "SuperStorage_Lv8", 420, 8, 70_000, 48, "Perk_Storage_y_5", 30.0, 820.0),
            ("Perk_SuperStorage_9", "SuperStorage_Lv9", 480, 9, 80_000, 48, "Perk_Storage_y_5", -60.0, 1040.0),
            ("Perk_SuperStorage_10", "SuperStorage_Lv10", 540, 10, 90_000, 48, "Perk_Storage_y_5", 300.0, 1040.0),
        ];

        let tiers = rows
            .into_iter()
            .map(
                |(id, key, capacity, level, gold, material, anchor, x, y)| TierDescriptor {
                    id: TierId::new(id),
                    display_key: key.to_string(),
                    effect_value: capacity,
                    level_requirement: level,
                    secret: false,
                    cost: UnlockCost {
                        currency: gold,
                        items: vec![ItemCost {
                            item_id: material,
                            amount: 1,
                        }],
                    },
                    anchor: AnchorRule {
                        anchor_id: anchor.to_string(),
                        offset: OffsetRule::Absolute(Vec2::new(x, y)),
                    },
                },
            )
            .collect();

        Self { tiers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(id: &str) -> TierDescriptor {
        TierDescriptor {
            id: TierId::new(id),
            display_key: format!("{id}_key"),
            effect_value: 60,
            level_requirement: 2,
            secret: false,
            cost: UnlockCost::default(),
            anchor: AnchorRule {
                anchor_id: "base".to_string(),
                offset: OffsetRule::Relative(Vec2::new(0.0, 100.0)),
            },
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = TierCatalog::new(vec![tier("t1"), tier("t1")]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id.as_str() == "t1"));
    }

    #[test]
    fn blank_ids_are_rejected() {
        let result = TierCatalog::new(vec![tier("   ")]);
        assert!(matches!(result, Err(CatalogError::EmptyId)));
    }

    #[test]
    fn storage_catalog_is_valid_and_ordered() {
        let catalog = TierCatalog::storage();
        assert_eq!(catalog.len(), 9);
        assert!(TierCatalog::new(catalog.iter().cloned().collect()).is_ok());

        let mut previous = 0;
        for descriptor in catalog.iter() {
            assert!(descriptor.effect_value > previous, "capacities must ascend");
            previous = descriptor.effect_value;
        }
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = TierCatalog::new(vec![tier("t1"), tier("t2")]).unwrap();
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed = TierCatalog::from_json(&json).unwrap();
        assert_eq!(parsed, catalog);
    }
}
