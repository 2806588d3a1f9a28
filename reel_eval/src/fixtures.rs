use polars::datatypes::{InitHashMaps, PlHashMap};
use reel::{Dataset, Rating};
use reel_load::{loader::splitter, RELEVANT_RATING};

pub fn rating(user_id: u64, movie_id: u64, rating: f64, timestamp: i64) -> Rating {
    Rating {
        user_id,
        movie_id,
        rating,
        timestamp,
    }
}

/// A dataset with the given partitions and ground truth derived from the test partition
pub fn dataset(train: Vec<Rating>, test: Vec<Rating>) -> Dataset {
    let truth = splitter::ground_truth(&test, RELEVANT_RATING);
    Dataset::new(train, test, truth, Vec::new())
}

/// Builds a train partition where each user rated their basket 5 stars, one movie per timestamp
pub fn baskets_dataset(baskets: &[(u64, &[u64])]) -> Dataset {
    let mut train = Vec::new();
    let mut timestamp = 0;
    for (user_id, basket) in baskets {
        for movie_id in basket.iter() {
            timestamp += 1;
            train.push(rating(*user_id, *movie_id, 5.0, timestamp));
        }
    }
    Dataset::new(train, Vec::new(), PlHashMap::new(), Vec::new())
}

/// Several users with overlapping tastes and a temporal split applied
pub fn movie_night() -> Dataset {
    let mut ratings = Vec::new();
    let tastes: [(u64, &[u64]); 6] = [
        (1, &[1, 2, 3, 4, 5, 6]),
        (2, &[1, 2, 3, 7, 8]),
        (3, &[1, 2, 4, 5, 9]),
        (4, &[2, 3, 4, 6, 10]),
        (5, &[1, 3, 5, 7, 9, 11]),
        (6, &[1, 2, 3, 4, 8, 12]),
    ];
    let mut timestamp = 1_000;
    for (user_id, movies) in tastes.iter() {
        for (i, movie_id) in movies.iter().enumerate() {
            timestamp += 1;
            let value = if i % 3 == 2 { 3.0 } else { 4.5 };
            ratings.push(rating(*user_id, *movie_id, value, timestamp));
        }
    }

    let (train, test) = splitter::split_by_recency(&ratings, 2);
    dataset(train, test)
}
