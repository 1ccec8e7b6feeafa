/// Height policy: neighbour discovery mode plus elevation aggregation
use crate::error::{HeightError, Result};
use serde::{Deserialize, Serialize};

/// How neighbours are gathered around a query location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discovery {
    /// Everything within `radius`, keeping at most `max_neighbours` closest.
    Radius { radius: f64, max_neighbours: usize },
    /// The `k` closest points regardless of distance.
    KNearest { k: usize },
}

/// How gathered neighbour elevations are collapsed into one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    /// Rank-based statistic with linear interpolation, `p` in [0, 100].
    /// Low percentiles bias toward ground, high ones toward canopy.
    Percentile(f64),
    Mean,
}

/// Validated estimation policy. Construction rejects bad parameters so
/// query-time code never re-checks them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightPolicy {
    pub discovery: Discovery,
    pub aggregate: Aggregate,
    /// Fixed additive offset applied after aggregation.
    pub offset: f64,
}

impl HeightPolicy {
    pub fn new(discovery: Discovery, aggregate: Aggregate, offset: f64) -> Result<Self> {
        match discovery {
            Discovery::Radius { radius, .. } if !(radius > 0.0) || !radius.is_finite() => {
                return Err(HeightError::InvalidPolicy(format!(
                    "radius must be > 0, got {radius}"
                )));
            }
            Discovery::Radius { max_neighbours, .. } if max_neighbours == 0 => {
                return Err(HeightError::InvalidPolicy(
                    "neighbour cap must be at least 1".into(),
                ));
            }
            Discovery::KNearest { k } if k == 0 => {
                return Err(HeightError::InvalidPolicy("k must be at least 1".into()));
            }
            _ => {}
        }

        if let Aggregate::Percentile(p) = aggregate {
            if !p.is_finite() || !(0.0..=100.0).contains(&p) {
                return Err(HeightError::InvalidPolicy(format!(
                    "percentile must be within [0, 100], got {p}"
                )));
            }
        }

        if !offset.is_finite() {
            return Err(HeightError::InvalidPolicy(format!(
                "offset must be finite, got {offset}"
            )));
        }

        Ok(Self {
            discovery,
            aggregate,
            offset,
        })
    }

    /// Map a configuration-surface mode name to a concrete policy.
    /// `relief` follows the local median, `surface_p10` hugs the ground,
    /// `p95` rides near the canopy/roof level.
    pub fn from_mode(mode: &str, radius: f64, max_neighbours: usize, offset: f64) -> Result<Self> {
        let percentile = match mode {
            "relief" => 50.0,
            "surface_p10" => 10.0,
            "p95" => 95.0,
            other => {
                return Err(HeightError::InvalidPolicy(format!(
                    "unknown elevation mode '{other}' (expected relief, surface_p10 or p95)"
                )));
            }
        };

        Self::new(
            Discovery::Radius {
                radius,
                max_neighbours,
            },
            Aggregate::Percentile(percentile),
            offset,
        )
    }
}
