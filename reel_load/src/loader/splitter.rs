use polars::datatypes::{InitHashMaps, PlHashMap};
use reel::Rating;

/// Splits ratings into train and test by recency.
///
/// Each user's `n_test_items` most recent ratings go to test and everything else goes to train.
/// Ratings with equal timestamps are ranked in the order they appear in `ratings`, so the split is
/// reproducible. A user with fewer than `n_test_items` ratings ends up entirely in test.
/// Both partitions keep the input row order.
pub fn split_by_recency(ratings: &[Rating], n_test_items: usize) -> (Vec<Rating>, Vec<Rating>) {
    let mut user_rows: PlHashMap<u64, Vec<usize>> = PlHashMap::new();
    for (row, rating) in ratings.iter().enumerate() {
        user_rows.entry(rating.user_id).or_default().push(row);
    }

    let mut in_test = vec![false; ratings.len()];
    for rows in user_rows.values_mut() {
        // Stable sort, ties keep first-seen order
        rows.sort_by(|a, b| ratings[*b].timestamp.cmp(&ratings[*a].timestamp));
        for &row in rows.iter().take(n_test_items) {
            in_test[row] = true;
        }
    }

    let mut train = Vec::with_capacity(ratings.len());
    let mut test = Vec::with_capacity(user_rows.len() * n_test_items);
    for (rating, is_test) in ratings.iter().zip(in_test) {
        if is_test {
            test.push(*rating);
        } else {
            train.push(*rating);
        }
    }

    (train, test)
}

/// Groups the movies each user rated at least `min_rating` in the test partition.
/// Users with no such movie are left out entirely.
pub fn ground_truth(test: &[Rating], min_rating: f64) -> PlHashMap<u64, Vec<u64>> {
    let mut user2items: PlHashMap<u64, Vec<u64>> = PlHashMap::new();
    for rating in test.iter().filter(|rating| rating.rating >= min_rating) {
        user2items
            .entry(rating.user_id)
            .or_default()
            .push(rating.movie_id);
    }
    user2items
}
