use polars::datatypes::{InitHashMaps, PlHashMap};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use reel::{Dataset, Rating};
use reel_eval::recommender::{AssociationOptions, AssociationRecommender, Recommender};

// Size of the generated dataset
const USERS: u64 = 500;
const MOVIES: u64 = 200;
const RATINGS_PER_USER: usize = 30;

/// Users rating random movies, with lower movie ids picked more often so that itemsets form
fn synthetic_dataset() -> Dataset {
    let mut rng = StdRng::seed_from_u64(42);
    let weighted: Vec<u64> = (1..=MOVIES)
        .flat_map(|movie_id| std::iter::repeat(movie_id).take((MOVIES / movie_id) as usize))
        .collect();

    let mut train = Vec::new();
    let mut timestamp = 0;
    for user_id in 1..=USERS {
        let mut movies: Vec<u64> = weighted
            .choose_multiple(&mut rng, RATINGS_PER_USER)
            .copied()
            .collect();
        movies.sort_unstable();
        movies.dedup();

        for movie_id in movies {
            timestamp += 1;
            train.push(Rating {
                user_id,
                movie_id,
                rating: rng.gen_range(1..=10) as f64 / 2.0,
                timestamp,
            });
        }
    }

    Dataset::new(train, Vec::new(), PlHashMap::new(), Vec::new())
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
pub fn criterion_benchmark(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let recommender =
        AssociationRecommender::new_with_options(&AssociationOptions::new().with_min_support(0.06));

    let mut group = c.benchmark_group("association");
    // Mining dominates each iteration, so fewer samples are needed
    group.significance_level(0.1).sample_size(20);
    group.bench_function("mine association rules", |b| {
        b.iter(|| recommender.association_rules(black_box(&dataset)))
    });
    group.bench_function("recommend to every user", |b| {
        b.iter(|| recommender.recommend(black_box(&dataset)))
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
