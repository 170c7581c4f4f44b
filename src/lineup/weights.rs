// Category weight derivation from a head-to-head totals comparison.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::roster::Player;

/// Stat categories where a higher raw value is worse. Their contribution to
/// a player's value is negated before weighting, and their gap sign is
/// flipped during weight derivation.
pub const INVERSE_CATEGORIES: &[&str] = &["ga"];

/// Whether a stat category is inverse-scored (lower is better).
pub fn is_inverse_category(code: &str) -> bool {
    INVERSE_CATEGORIES.contains(&code)
}

/// A per-category weight vector expressing how much each scoring category
/// should influence lineup choice.
///
/// Backed by an ordered map so that weighted sums over the categories are
/// reproducible bit-for-bit across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    weights: BTreeMap<String, f64>,
}

impl CategoryWeights {
    /// An empty weight vector. Valuation falls back to raw projected points.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn set(&mut self, category: impl Into<String>, weight: f64) {
        self.weights.insert(category.into(), weight);
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.weights.get(category).copied()
    }

    /// Iterate categories and weights in stable (lexical) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for CategoryWeights {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        CategoryWeights {
            weights: iter.into_iter().collect(),
        }
    }
}

/// Derive a weight per scoring category from two teams' totals.
///
/// The signed gap (mine minus opponent, flipped for inverse categories) is
/// bucketed into four tiers: a large deficit gets the highest weight, a
/// comfortable lead the lowest. Categories absent from either totals map
/// read as 0.
pub fn derive_weights(
    my_totals: &BTreeMap<String, f64>,
    opponent_totals: &BTreeMap<String, f64>,
    categories: &[String],
) -> CategoryWeights {
    let mut weights = CategoryWeights::empty();
    for cat in categories {
        let mine = my_totals.get(cat).copied().unwrap_or(0.0);
        let theirs = opponent_totals.get(cat).copied().unwrap_or(0.0);
        let mut gap = mine - theirs;
        if is_inverse_category(cat) {
            gap = -gap;
        }
        let weight = if gap < -2.0 {
            3.0
        } else if gap < 0.0 {
            2.0
        } else if gap < 2.0 {
            1.0
        } else {
            0.5
        };
        weights.set(cat.clone(), weight);
    }
    weights
}

/// A player's per-game value under a non-empty weight vector: the weighted
/// sum of projected stats, with inverse categories negated. Categories the
/// player has no projection for contribute nothing.
pub fn weighted_value(player: &Player, weights: &CategoryWeights) -> f64 {
    let mut value = 0.0;
    for (cat, weight) in weights.iter() {
        let stat = player.stat(cat);
        if is_inverse_category(cat) {
            value -= stat * weight;
        } else {
            value += stat * weight;
        }
    }
    value
}

/// A player's marginal value for lineup ranking: the weighted value, or the
/// raw projected point total when no weights are supplied.
pub fn marginal_value(player: &Player, weights: &CategoryWeights) -> f64 {
    if weights.is_empty() {
        player.stat("pts")
    } else {
        weighted_value(player, weights)
    }
}
