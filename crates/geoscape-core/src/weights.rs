//! Weighted choice tables used by mission scripts and the alien strategy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dice::Dice;

/// Id → weight. Iteration order is the id order, so choices are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightedOptions {
    weights: BTreeMap<String, u32>,
}

impl WeightedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a weight; zero removes the option.
    pub fn set(&mut self, id: impl Into<String>, weight: u32) {
        let id = id.into();
        if weight == 0 {
            self.weights.remove(&id);
        } else {
            self.weights.insert(id, weight);
        }
    }

    pub fn with(mut self, id: impl Into<String>, weight: u32) -> Self {
        self.set(id, weight);
        self
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.weights.remove(id).is_some()
    }

    pub fn weight(&self, id: &str) -> u32 {
        self.weights.get(id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.weights.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    /// Pick an id proportionally to its weight.
    pub fn choose(&self, dice: &mut impl Dice) -> Option<&str> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut roll = dice.roll(total);
        for (id, &weight) in &self.weights {
            if roll < weight {
                return Some(id);
            }
            roll -= weight;
        }
        None
    }
}

/// Weight tables keyed by the first month they apply to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlyWeights {
    by_month: BTreeMap<u32, WeightedOptions>,
}

impl MonthlyWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_month(mut self, month: u32, options: WeightedOptions) -> Self {
        self.by_month.insert(month, options);
        self
    }

    /// Constant table for every month.
    pub fn always(options: WeightedOptions) -> Self {
        Self::new().with_month(0, options)
    }

    pub fn is_empty(&self) -> bool {
        self.by_month.values().all(WeightedOptions::is_empty)
    }

    /// Table with the greatest month key not above `month`.
    pub fn for_month(&self, month: u32) -> Option<&WeightedOptions> {
        self.by_month.range(..=month).next_back().map(|(_, w)| w)
    }

    pub fn choose(&self, month: u32, dice: &mut impl Dice) -> Option<String> {
        self.for_month(month)?.choose(dice).map(str::to_owned)
    }

    /// Every id mentioned in any month.
    pub fn all_ids(&self) -> impl Iterator<Item = &str> {
        self.by_month.values().flat_map(WeightedOptions::ids)
    }
}
