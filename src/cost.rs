//! Material cost aggregation
//!
//! Rolls a variant's cutting-part list up into per-material consumption
//! and cost totals. Costing is `consumption × unit_price`: consumption
//! is already the per-pair total for a part, so quantity is not a
//! factor. No rounding happens here; display formatting rounds to two
//! decimals.

use std::collections::BTreeMap;

/// A cutting part with its material choice resolved against the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct PricedPart {
    pub name: String,
    pub material_id: i64,
    /// Material consumption per pair, dm²
    pub consumption: f64,
    /// Catalog unit price; None when the material carries no price
    pub unit_price: Option<f64>,
}

/// Accumulated consumption and cost for one material
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialTotal {
    pub consumption: f64,
    pub cost: f64,
}

/// The result of one aggregation pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CostBreakdown {
    /// Totals keyed by material id, in stable id order
    pub per_material: BTreeMap<i64, MaterialTotal>,
    pub grand_total: f64,
}

/// Aggregate a full part list into per-material totals and a grand
/// total. A missing or zero price contributes zero cost but the
/// consumption still accumulates, so the totals stay informative for
/// unpriced materials. Pure function of its input: callers pass the
/// complete current part list every time, never a delta.
pub fn aggregate(parts: &[PricedPart]) -> CostBreakdown {
    let mut breakdown = CostBreakdown::default();

    for part in parts {
        let unit_price = part.unit_price.unwrap_or(0.0);
        let cost = part.consumption * unit_price;

        let total = breakdown.per_material.entry(part.material_id).or_default();
        total.consumption += part.consumption;
        total.cost += cost;
        breakdown.grand_total += cost;
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn union_fixture() -> Vec<PricedPart> {
        vec![
            PricedPart {
                name: "Union".to_string(),
                material_id: 10,
                consumption: 3.5,
                unit_price: Some(120.0),
            },
            PricedPart {
                name: "Tongue".to_string(),
                material_id: 11,
                consumption: 1.0,
                unit_price: None,
            },
        ]
    }

    #[test]
    fn test_grand_total_matches_hand_computation() {
        let breakdown = aggregate(&union_fixture());
        // 3.5 dm² at 120.00 per dm²
        assert_eq!(breakdown.per_material[&10].cost, 420.0);
        assert_eq!(breakdown.grand_total, 420.0);
    }

    #[test]
    fn test_unpriced_material_counts_consumption_only() {
        let breakdown = aggregate(&union_fixture());
        let lining = breakdown.per_material[&11];
        assert_eq!(lining.cost, 0.0);
        assert_eq!(lining.consumption, 1.0);
    }

    #[test]
    fn test_same_material_accumulates() {
        let parts = vec![
            PricedPart {
                name: "Vamp".to_string(),
                material_id: 10,
                consumption: 4.0,
                unit_price: Some(100.0),
            },
            PricedPart {
                name: "Quarter".to_string(),
                material_id: 10,
                consumption: 2.5,
                unit_price: Some(100.0),
            },
        ];
        let breakdown = aggregate(&parts);
        assert_eq!(breakdown.per_material.len(), 1);
        assert_eq!(breakdown.per_material[&10].consumption, 6.5);
        assert_eq!(breakdown.grand_total, 650.0);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let parts = union_fixture();
        let first = aggregate(&parts);
        let second = aggregate(&parts);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_yields_zero_totals() {
        let breakdown = aggregate(&[]);
        assert!(breakdown.per_material.is_empty());
        assert_eq!(breakdown.grand_total, 0.0);
    }
}
