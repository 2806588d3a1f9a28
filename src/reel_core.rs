use polars::{
    datatypes::{PlHashMap, PlHashSet},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// The types used to represent the ratings dataset and what is computed from it

/// A single rating given by a user to a movie
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: u64,
    pub movie_id: u64,
    /// Star rating, 0.5 to 5.0 in half steps for MovieLens
    pub rating: f64,
    /// Seconds since the unix epoch
    pub timestamp: i64,
}

/// Reference information about a movie
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub movie_id: u64,
    /// The title, user-facing
    pub title: String,
    /// Genre tags in the order the dataset lists them
    pub genres: Vec<String>,
    /// Lower-cased free text tags contributed by users
    pub tags: Vec<String>,
}

/// An immutable snapshot of the ratings, already split into train and test
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    /// Ratings the recommenders are allowed to learn from
    pub train: Vec<Rating>,
    /// Each user's most recent ratings, held out for scoring
    pub test: Vec<Rating>,
    /// Movies in the test partition each user liked, keyed by user id
    pub test_user2items: PlHashMap<u64, Vec<u64>>,
    /// Movie metadata, joined to ratings by movie id
    pub item_content: Vec<Movie>,
}

impl Dataset {
    pub fn new(
        train: Vec<Rating>,
        test: Vec<Rating>,
        test_user2items: PlHashMap<u64, Vec<u64>>,
        item_content: Vec<Movie>,
    ) -> Dataset {
        Dataset {
            train,
            test,
            test_user2items,
            item_content,
        }
    }

    /// Every user with at least one train rating, ascending
    pub fn train_user_ids(&self) -> Vec<u64> {
        sorted_unique(self.train.iter().map(|rating| rating.user_id))
    }

    /// Every movie with at least one train rating, ascending
    pub fn train_movie_ids(&self) -> Vec<u64> {
        sorted_unique(self.train.iter().map(|rating| rating.movie_id))
    }

    /// Maps each train user to the set of movies they rated, whatever the rating
    pub fn rated_user2items(&self) -> PlHashMap<u64, PlHashSet<u64>> {
        let mut rated: PlHashMap<u64, PlHashSet<u64>> = PlHashMap::new();
        for rating in &self.train {
            rated
                .entry(rating.user_id)
                .or_default()
                .insert(rating.movie_id);
        }
        rated
    }

    /// The true rating of every test row, in row order
    pub fn test_ratings(&self) -> Vec<f64> {
        self.test.iter().map(|rating| rating.rating).collect()
    }

    /// The train partition as a frame with `user_id`, `movie_id`, `rating` and `timestamp`
    pub fn train_frame(&self) -> PolarsResult<DataFrame> {
        ratings_frame(&self.train)
    }
}

/// What a recommender hands back for one dataset
#[derive(Clone, Debug)]
pub struct RecommendResult {
    /// Predicted ratings with `user_id`, `movie_id` and `pred_rating`, row-aligned with the test
    /// partition it was made for
    pub rating: DataFrame,
    /// Ordered recommendations, keyed by user id
    pub user2items: PlHashMap<u64, Vec<u64>>,
}

impl RecommendResult {
    /// Builds the result from one prediction per test row
    pub fn new(
        test: &[Rating],
        pred_ratings: Vec<f64>,
        user2items: PlHashMap<u64, Vec<u64>>,
    ) -> PolarsResult<RecommendResult> {
        // Frame creation fails on mismatched lengths
        let user_ids: Vec<u64> = test.iter().map(|rating| rating.user_id).collect();
        let movie_ids: Vec<u64> = test.iter().map(|rating| rating.movie_id).collect();

        let rating = DataFrame::new(vec![
            Series::new("user_id", user_ids),
            Series::new("movie_id", movie_ids),
            Series::new("pred_rating", pred_ratings),
        ])?;

        Ok(RecommendResult { rating, user2items })
    }

    /// The predicted rating column, in test row order
    pub fn pred_ratings(&self) -> PolarsResult<Vec<f64>> {
        Ok(self
            .rating
            .column("pred_rating")?
            .f64()?
            .into_no_null_iter()
            .collect())
    }

    /// Recommendations for a user. Users without any are given an empty list
    pub fn items_for(&self, user_id: u64) -> &[u64] {
        match self.user2items.get(&user_id) {
            Some(items) => items.as_slice(),
            None => &[],
        }
    }
}

/// Scores for a single evaluation run
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub rmse: f64,
    pub precision_at_k: f64,
    pub recall_at_k: f64,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RMSE: {:.4}, Precision@K: {:.4}, Recall@K: {:.4}",
            self.rmse, self.precision_at_k, self.recall_at_k
        )
    }
}

fn ratings_frame(ratings: &[Rating]) -> PolarsResult<DataFrame> {
    let mut user_ids = Vec::with_capacity(ratings.len());
    let mut movie_ids = Vec::with_capacity(ratings.len());
    let mut values = Vec::with_capacity(ratings.len());
    let mut timestamps = Vec::with_capacity(ratings.len());

    for rating in ratings {
        user_ids.push(rating.user_id);
        movie_ids.push(rating.movie_id);
        values.push(rating.rating);
        timestamps.push(rating.timestamp);
    }

    DataFrame::new(vec![
        Series::new("user_id", user_ids),
        Series::new("movie_id", movie_ids),
        Series::new("rating", values),
        Series::new("timestamp", timestamps),
    ])
}

fn sorted_unique(ids: impl Iterator<Item = u64>) -> Vec<u64> {
    let mut ids: Vec<u64> = ids.collect::<PlHashSet<u64>>().into_iter().collect();
    ids.sort_unstable();
    ids
}
