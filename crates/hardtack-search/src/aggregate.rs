//! Merging per-dimension hits into one ranked list.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use hardtack_core::types::{Dimension, RecipeId, SearchHit};

/// Distance substituted for an active dimension a recipe was not found in.
pub const PENALTY_DISTANCE: f32 = 1.0;

/// `id -> (dimension -> distance)` for one retrieval call, in first-seen id order.
#[derive(Debug, Clone, Default)]
pub struct DistanceMap {
    entries: IndexMap<RecipeId, BTreeMap<Dimension, f32>>,
}

impl DistanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `hit` under `dimension` unless that cell is already set.
    /// Returns whether the cell was written.
    pub fn record(&mut self, dimension: Dimension, hit: SearchHit) -> bool {
        let cells = self.entries.entry(hit.id).or_default();
        if cells.contains_key(&dimension) {
            return false;
        }
        cells.insert(dimension, hit.distance);
        true
    }

    pub fn extend(&mut self, dimension: Dimension, hits: impl IntoIterator<Item = SearchHit>) {
        for hit in hits {
            self.record(dimension, hit);
        }
    }

    pub fn distance(&self, id: &RecipeId, dimension: Dimension) -> Option<f32> {
        self.entries.get(id).and_then(|cells| cells.get(&dimension)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean distance over `active`, with [`PENALTY_DISTANCE`] standing in for
    /// every active dimension an id was not found in.
    pub fn scores(&self, active: &[Dimension]) -> ScoreMap {
        if active.is_empty() {
            return ScoreMap::default();
        }
        let scores = self
            .entries
            .iter()
            .map(|(id, cells)| {
                let total: f32 = active.iter().map(|d| cells.get(d).copied().unwrap_or(PENALTY_DISTANCE)).sum();
                (*id, total / active.len() as f32)
            })
            .collect();
        ScoreMap { scores }
    }
}

/// `id -> combined score`, lower is better.
#[derive(Debug, Clone, Default)]
pub struct ScoreMap {
    scores: IndexMap<RecipeId, f32>,
}

impl ScoreMap {
    pub fn get(&self, id: &RecipeId) -> Option<f32> {
        self.scores.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The `top_n` lowest scores, ascending. Equal scores keep first-seen order.
    pub fn ranked(&self, top_n: usize) -> Vec<RankedRecipe> {
        let mut ordered: Vec<(RecipeId, f32)> = self.scores.iter().map(|(id, s)| (*id, *s)).collect();
        ordered.sort_by(|a, b| a.1.total_cmp(&b.1));
        ordered
            .into_iter()
            .take(top_n)
            .enumerate()
            .map(|(i, (id, score))| RankedRecipe { rank: i + 1, id, score })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedRecipe {
    pub rank: usize,
    pub id: RecipeId,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn first_write_wins_per_cell() {
        let id = Uuid::new_v4();
        let mut map = DistanceMap::new();
        assert!(map.record(Dimension::Tags, SearchHit::new(id, 0.2)));
        assert!(!map.record(Dimension::Tags, SearchHit::new(id, 0.05)));
        assert!(map.record(Dimension::DishName, SearchHit::new(id, 0.4)));
        assert_eq!(map.distance(&id, Dimension::Tags), Some(0.2));
        assert_eq!(map.distance(&id, Dimension::DishName), Some(0.4));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn missing_dimensions_are_penalized() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut map = DistanceMap::new();
        map.extend(Dimension::Tags, [SearchHit::new(a, 0.1), SearchHit::new(b, 0.3)]);
        map.extend(Dimension::ShoppingList, [SearchHit::new(a, 0.2)]);
        let active = [Dimension::Tags, Dimension::ShoppingList, Dimension::SourceAuthor];
        let scores = map.scores(&active);
        assert!(close(scores.get(&a).unwrap(), (0.1 + 0.2 + PENALTY_DISTANCE) / 3.0));
        assert!(close(scores.get(&b).unwrap(), (0.3 + 2.0 * PENALTY_DISTANCE) / 3.0));
        assert!(close(PENALTY_DISTANCE, 1.0));
    }

    #[test]
    fn hits_outside_active_dimensions_do_not_count() {
        let a = Uuid::new_v4();
        let mut map = DistanceMap::new();
        map.extend(Dimension::Tags, [SearchHit::new(a, 0.1)]);
        map.extend(Dimension::DishName, [SearchHit::new(a, 0.0)]);
        let scores = map.scores(&[Dimension::Tags]);
        assert!(close(scores.get(&a).unwrap(), 0.1));
    }

    #[test]
    fn no_active_dimensions_scores_nothing() {
        let mut map = DistanceMap::new();
        map.extend(Dimension::Tags, [SearchHit::new(Uuid::new_v4(), 0.1)]);
        assert!(map.scores(&[]).is_empty());
    }

    #[test]
    fn ranking_is_ascending_stable_and_truncated() {
        let ids: Vec<_> = (0..5).map(|_| Uuid::new_v4()).collect();
        let mut map = DistanceMap::new();
        let distances = [0.5, 0.2, 0.5, 0.9, 0.2];
        map.extend(Dimension::Tags, ids.iter().zip(distances).map(|(id, d)| SearchHit::new(*id, d)));
        let ranked = map.scores(&[Dimension::Tags]).ranked(4);
        let order: Vec<_> = ranked.iter().map(|r| r.id).collect();
        assert_eq!(order, [ids[1], ids[4], ids[0], ids[2]]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), [1, 2, 3, 4]);
        assert!(ranked.windows(2).all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn top_n_larger_than_candidates_returns_all() {
        let mut map = DistanceMap::new();
        map.extend(Dimension::Tags, [SearchHit::new(Uuid::new_v4(), 0.3)]);
        assert_eq!(map.scores(&[Dimension::Tags]).ranked(3).len(), 1);
        assert!(map.scores(&[Dimension::Tags]).ranked(0).is_empty());
    }
}
