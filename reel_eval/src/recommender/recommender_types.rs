use polars::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error("Polars: {0}")]
    Polars(#[from] PolarsError),
}

// CONS split mining options from inference options
#[derive(Clone, Debug, PartialEq)]
pub struct AssociationOptions {
    /// Ratings at or above this put a movie in the user's basket
    pub min_rating: f64,
    /// Fraction of baskets an itemset must appear in to be mined.
    /// Lowering this finds more rules but mining time grows quickly
    pub min_support: f64,
    /// Rules with a lift below this are discarded
    pub min_threshold: f64,
    /// Ratings at or above this make a movie one of the user's recent favourites
    pub recent_rating: f64,
    /// Number of recent favourites whose rules are followed
    pub recent_items: usize,
    /// Length of each recommendation list
    pub recommend_items: usize,
}

impl AssociationOptions {
    /// Create an options instance with the default options
    pub const fn new() -> AssociationOptions {
        AssociationOptions {
            min_rating: 4.0,
            min_support: 0.1,
            min_threshold: 0.1,
            recent_rating: 4.0,
            recent_items: 5,
            recommend_items: 10,
        }
    }

    pub fn with_min_rating(mut self, new_min_rating: f64) -> AssociationOptions {
        self.min_rating = new_min_rating;
        self
    }

    pub fn with_min_support(mut self, new_min_support: f64) -> AssociationOptions {
        self.min_support = new_min_support;
        self
    }

    pub fn with_min_threshold(mut self, new_min_threshold: f64) -> AssociationOptions {
        self.min_threshold = new_min_threshold;
        self
    }

    pub fn with_recent_rating(mut self, new_recent_rating: f64) -> AssociationOptions {
        self.recent_rating = new_recent_rating;
        self
    }

    pub fn with_recent_items(mut self, new_recent_items: usize) -> AssociationOptions {
        self.recent_items = new_recent_items;
        self
    }

    pub fn with_recommend_items(mut self, new_recommend_items: usize) -> AssociationOptions {
        self.recommend_items = new_recommend_items;
        self
    }
}

impl Default for AssociationOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopularityOptions {
    /// Minimum number of train ratings for a movie to be recommended.
    /// Setting this low lets obscure movies with a few perfect ratings dominate the lists
    pub minimum_num_rating: u64,
    /// Length of each recommendation list
    pub recommend_items: usize,
}

impl PopularityOptions {
    /// Create an options instance with the default options
    pub const fn new() -> PopularityOptions {
        PopularityOptions {
            minimum_num_rating: 200,
            recommend_items: 10,
        }
    }

    pub fn with_minimum_num_rating(mut self, new_minimum_num_rating: u64) -> PopularityOptions {
        self.minimum_num_rating = new_minimum_num_rating;
        self
    }

    pub fn with_recommend_items(mut self, new_recommend_items: usize) -> PopularityOptions {
        self.recommend_items = new_recommend_items;
        self
    }
}

impl Default for PopularityOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RandomOptions {
    /// Seed for the generator created at the start of every run
    pub seed: u64,
    /// Length of each recommendation list
    pub recommend_items: usize,
}

impl RandomOptions {
    /// Create an options instance with the default options
    pub const fn new() -> RandomOptions {
        RandomOptions {
            seed: 0,
            recommend_items: 10,
        }
    }

    pub fn with_seed(mut self, new_seed: u64) -> RandomOptions {
        self.seed = new_seed;
        self
    }

    pub fn with_recommend_items(mut self, new_recommend_items: usize) -> RandomOptions {
        self.recommend_items = new_recommend_items;
        self
    }
}

impl Default for RandomOptions {
    fn default() -> Self {
        Self::new()
    }
}
