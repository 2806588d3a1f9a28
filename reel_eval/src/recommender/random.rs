use super::{RandomOptions, Recommender, RecommenderError, RECOMMENDER_HEADING};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use reel::{Dataset, RecommendResult};
use tracing::debug;

/// Lowest and highest ratings a user can give
const RATING_RANGE: std::ops::Range<f64> = 0.5..5.0;

/// Predicts uniform noise and recommends unseen movies at random
pub struct RandomRecommender {
    options: RandomOptions,
}

impl RandomRecommender {
    /// Creates a recommender with the default settings
    #[inline]
    pub fn new() -> RandomRecommender {
        Self::new_with_options(&RandomOptions::new())
    }

    pub fn new_with_options(options: &RandomOptions) -> RandomRecommender {
        RandomRecommender {
            options: options.clone(),
        }
    }
}

impl Default for RandomRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender for RandomRecommender {
    fn name(&self) -> &'static str {
        "random"
    }

    fn recommend(&self, dataset: &Dataset) -> Result<RecommendResult, RecommenderError> {
        // A fresh generator per run keeps repeated runs identical
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        debug!("{}Seeded with {}", RECOMMENDER_HEADING, self.options.seed);

        let pred_ratings = dataset
            .test
            .iter()
            .map(|_| rng.gen_range(RATING_RANGE))
            .collect();

        let movie_ids = dataset.train_movie_ids();
        let rated_user2items = dataset.rated_user2items();
        let user2items = dataset
            .train_user_ids()
            .into_iter()
            .map(|user_id| {
                let rated_items = rated_user2items.get(&user_id);
                let unseen: Vec<u64> = movie_ids
                    .iter()
                    .copied()
                    .filter(|movie_id| !rated_items.is_some_and(|rated| rated.contains(movie_id)))
                    .collect();
                let items = unseen
                    .choose_multiple(&mut rng, self.options.recommend_items)
                    .copied()
                    .collect();
                (user_id, items)
            })
            .collect();

        Ok(RecommendResult::new(
            &dataset.test,
            pred_ratings,
            user2items,
        )?)
    }
}
