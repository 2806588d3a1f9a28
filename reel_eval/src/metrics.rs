use polars::datatypes::{PlHashMap, PlHashSet};
use reel::Metrics;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MetricError {
    #[error("Expected {expected} predicted ratings, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("Cannot compute RMSE without any ratings")]
    EmptyRatings,
    #[error("User {0} has no relevant items, so recall is undefined")]
    NoRelevantItems(u64),
}

/// Scores a recommender's output against the held out ratings
#[derive(Clone, Debug, Default)]
pub struct MetricCalculator;

impl MetricCalculator {
    pub fn new() -> MetricCalculator {
        MetricCalculator
    }

    /// Computes RMSE over the paired ratings, and precision@k and recall@k averaged over every user
    /// in `true_user2items`.
    ///
    /// Users missing from `pred_user2items` are scored as if nothing was recommended to them.
    /// Every user in `true_user2items` must have at least one relevant item.
    pub fn calc(
        &self,
        true_rating: &[f64],
        pred_rating: &[f64],
        true_user2items: &PlHashMap<u64, Vec<u64>>,
        pred_user2items: &PlHashMap<u64, Vec<u64>>,
        k: usize,
    ) -> Result<Metrics, MetricError> {
        let rmse = self.rmse(true_rating, pred_rating)?;

        // Summing in user order keeps the result independent of map iteration order
        let mut user_ids: Vec<u64> = true_user2items.keys().copied().collect();
        user_ids.sort_unstable();

        let mut precision_sum = 0.0;
        let mut recall_sum = 0.0;
        for user_id in &user_ids {
            let true_items = &true_user2items[user_id];
            let pred_items = pred_user2items
                .get(user_id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            if true_items.is_empty() {
                return Err(MetricError::NoRelevantItems(*user_id));
            }

            precision_sum += self.precision_at_k(true_items, pred_items, k);
            recall_sum += self.recall_at_k(true_items, pred_items, k);
        }

        let (precision_at_k, recall_at_k) = if user_ids.is_empty() {
            (0.0, 0.0)
        } else {
            let num_users = user_ids.len() as f64;
            (precision_sum / num_users, recall_sum / num_users)
        };

        Ok(Metrics {
            rmse,
            precision_at_k,
            recall_at_k,
        })
    }

    /// Root mean squared error of positionally paired ratings
    pub fn rmse(&self, true_rating: &[f64], pred_rating: &[f64]) -> Result<f64, MetricError> {
        if true_rating.len() != pred_rating.len() {
            return Err(MetricError::LengthMismatch {
                expected: true_rating.len(),
                found: pred_rating.len(),
            });
        }
        if true_rating.is_empty() {
            return Err(MetricError::EmptyRatings);
        }

        let squared_error: f64 = true_rating
            .iter()
            .zip(pred_rating)
            .map(|(truth, pred)| (truth - pred).powi(2))
            .sum();

        Ok((squared_error / true_rating.len() as f64).sqrt())
    }

    /// Fraction of the first `k` predictions that are relevant. Zero when `k` is zero
    pub fn precision_at_k(&self, true_items: &[u64], pred_items: &[u64], k: usize) -> f64 {
        if k == 0 {
            return 0.0;
        }

        hits(true_items, pred_items, k) as f64 / k as f64
    }

    /// Fraction of the relevant items found in the first `k` predictions.
    /// `true_items` must not be empty.
    pub fn recall_at_k(&self, true_items: &[u64], pred_items: &[u64], k: usize) -> f64 {
        debug_assert!(!true_items.is_empty(), "Recall needs at least one relevant item");
        if k == 0 || true_items.is_empty() {
            return 0.0;
        }

        let relevant = true_items.iter().collect::<PlHashSet<_>>().len();
        hits(true_items, pred_items, k) as f64 / relevant as f64
    }
}

/// Size of the intersection between the relevant items and the top `k` predictions
fn hits(true_items: &[u64], pred_items: &[u64], k: usize) -> usize {
    let relevant: PlHashSet<u64> = true_items.iter().copied().collect();
    let top: PlHashSet<u64> = pred_items.iter().take(k).copied().collect();

    relevant.intersection(&top).count()
}
