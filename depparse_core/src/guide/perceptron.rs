//! Averaged multiclass perceptron
//!
//! Weights are indexed by `(feature position, feature code)` and by class.
//! Training visits instances in insertion order, so the same corpus always
//! yields the same model.

use super::classifier::Classifier;
use super::error::{GuideError, GuideResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

type WeightTable = BTreeMap<u64, BTreeMap<i32, f64>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Perceptron {
    epochs: usize,
    classes: BTreeSet<i32>,
    weights: WeightTable,
    #[serde(skip)]
    instances: Vec<(Vec<i32>, i32)>,
}

fn feature_key(position: usize, code: i32) -> u64 {
    ((position as u64) << 32) | u64::from(code as u32)
}

/// Add `delta` to a weight, first folding its value since the last change into the totals
fn averaged_update(
    current: &mut WeightTable,
    totals: &mut WeightTable,
    stamps: &mut BTreeMap<(u64, i32), u64>,
    (key, class): (u64, i32),
    delta: f64,
    step: u64,
) {
    let weight = current.entry(key).or_default().entry(class).or_insert(0.0);
    let last = stamps.insert((key, class), step).unwrap_or(0);
    *totals.entry(key).or_default().entry(class).or_insert(0.0) += (step - last) as f64 * *weight;
    *weight += delta;
}

impl Perceptron {
    pub fn new(epochs: usize) -> Self {
        Self {
            epochs,
            ..Default::default()
        }
    }

    pub fn classes(&self) -> &BTreeSet<i32> {
        &self.classes
    }

    fn scores(weights: &WeightTable, classes: &BTreeSet<i32>, features: &[i32]) -> BTreeMap<i32, f64> {
        let mut scores: BTreeMap<i32, f64> = classes.iter().map(|&c| (c, 0.0)).collect();
        for (position, &code) in features.iter().enumerate() {
            if let Some(row) = weights.get(&feature_key(position, code)) {
                for (class, weight) in row {
                    if let Some(score) = scores.get_mut(class) {
                        *score += weight;
                    }
                }
            }
        }
        scores
    }

    /// Classes by descending score, ties broken by the smaller code
    fn rank(scores: BTreeMap<i32, f64>) -> Vec<i32> {
        let mut ranked: Vec<(i32, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().map(|(class, _)| class).collect()
    }
}

impl Classifier for Perceptron {
    fn add_instance(&mut self, features: &[i32], decision: i32) -> GuideResult<()> {
        self.classes.insert(decision);
        self.instances.push((features.to_vec(), decision));
        Ok(())
    }

    fn train(&mut self) -> GuideResult<()> {
        if self.instances.is_empty() {
            return Err(GuideError::training_failure("perceptron", "no training instances"));
        }

        let mut current = WeightTable::new();
        let mut totals = WeightTable::new();
        let mut stamps: BTreeMap<(u64, i32), u64> = BTreeMap::new();
        let mut step: u64 = 0;

        for _ in 0..self.epochs.max(1) {
            for (features, gold) in &self.instances {
                step += 1;
                let predicted = Self::rank(Self::scores(&current, &self.classes, features))
                    .first()
                    .copied()
                    .unwrap_or(*gold);
                if predicted == *gold {
                    continue;
                }
                for (position, &code) in features.iter().enumerate() {
                    let key = feature_key(position, code);
                    averaged_update(&mut current, &mut totals, &mut stamps, (key, *gold), 1.0, step);
                    averaged_update(&mut current, &mut totals, &mut stamps, (key, predicted), -1.0, step);
                }
            }
        }

        let mut averaged = WeightTable::new();
        for (key, row) in &current {
            for (class, weight) in row {
                let last = stamps.get(&(*key, *class)).copied().unwrap_or(0);
                let total = totals.get(key).and_then(|r| r.get(class)).copied().unwrap_or(0.0)
                    + (step - last) as f64 * weight;
                let mean = total / step as f64;
                if mean != 0.0 {
                    averaged.entry(*key).or_default().insert(*class, mean);
                }
            }
        }

        self.weights = averaged;
        self.instances.clear();
        Ok(())
    }

    fn predict(&self, features: &[i32]) -> GuideResult<Vec<i32>> {
        Ok(Self::rank(Self::scores(&self.weights, &self.classes, features)))
    }

    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn save_state(&self) -> GuideResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
