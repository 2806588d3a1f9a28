use super::{PopularityOptions, Recommender, RecommenderError, RECOMMENDER_HEADING};
use polars::{datatypes::PlHashMap, prelude::*};
use reel::{Dataset, RecommendResult};
use tracing::info;

/// Recommends the best rated movies among those rated often enough, and predicts each movie's
/// mean train rating
pub struct PopularityRecommender {
    options: PopularityOptions,
}

impl PopularityRecommender {
    /// Creates a recommender with the default settings
    #[inline]
    pub fn new() -> PopularityRecommender {
        Self::new_with_options(&PopularityOptions::new())
    }

    pub fn new_with_options(options: &PopularityOptions) -> PopularityRecommender {
        PopularityRecommender {
            options: options.clone(),
        }
    }

    /// Mean rating and number of ratings for every movie in train
    fn movie_stats(&self, dataset: &Dataset) -> Result<DataFrame, RecommenderError> {
        Ok(dataset
            .train_frame()?
            .lazy()
            .group_by([col("movie_id")])
            .agg([
                col("rating").mean().alias("mean_rating"),
                col("rating")
                    .count()
                    .cast(DataType::UInt64)
                    .alias("rating_count"),
            ])
            .collect()?)
    }

    /// Movies rated at least `minimum_num_rating` times, best mean rating first.
    /// Equal means are ordered by movie id.
    fn ranked_movies(&self, movie_stats: DataFrame) -> Result<Vec<u64>, RecommenderError> {
        let ranked = movie_stats
            .lazy()
            .filter(col("rating_count").gt_eq(lit(self.options.minimum_num_rating)))
            .sort(
                ["mean_rating", "movie_id"],
                SortMultipleOptions::new().with_order_descending_multi([true, false]),
            )
            .collect()?;

        Ok(ranked
            .column("movie_id")?
            .u64()?
            .into_no_null_iter()
            .collect())
    }
}

impl Default for PopularityRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender for PopularityRecommender {
    fn name(&self) -> &'static str {
        "popularity"
    }

    fn recommend(&self, dataset: &Dataset) -> Result<RecommendResult, RecommenderError> {
        let movie_stats = self.movie_stats(dataset)?;

        let mean_ratings: PlHashMap<u64, f64> = movie_stats
            .column("movie_id")?
            .u64()?
            .into_no_null_iter()
            .zip(movie_stats.column("mean_rating")?.f64()?.into_no_null_iter())
            .collect();

        // Movies nobody rated in train are predicted as 0
        let pred_ratings = dataset
            .test
            .iter()
            .map(|rating| *mean_ratings.get(&rating.movie_id).unwrap_or(&0.0))
            .collect();

        let ranked = self.ranked_movies(movie_stats)?;
        info!(
            "{}{} movies have at least {} ratings",
            RECOMMENDER_HEADING,
            ranked.len(),
            self.options.minimum_num_rating
        );

        let rated_user2items = dataset.rated_user2items();
        let user2items = dataset
            .train_user_ids()
            .into_iter()
            .map(|user_id| {
                let rated_items = rated_user2items.get(&user_id);
                let items = ranked
                    .iter()
                    .copied()
                    .filter(|movie_id| !rated_items.is_some_and(|rated| rated.contains(movie_id)))
                    .take(self.options.recommend_items)
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
