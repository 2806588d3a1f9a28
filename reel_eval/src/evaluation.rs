use crate::{
    metrics::{MetricCalculator, MetricError},
    recommender::{
        AssociationOptions, AssociationRecommender, PopularityOptions, PopularityRecommender,
        Recommender, RecommenderError,
    },
    EVAL_HEADING,
};
use polars::prelude::*;
use reel::{Dataset, Metrics, RecommendResult};
use reel_load::loader::{DataLoader, LoadError, LoaderOptions};
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Support thresholds tried when sweeping the association recommender
pub const MIN_SUPPORT_SWEEP: [f64; 5] = [0.06, 0.08, 0.10, 0.12, 0.14];

/// Rating count thresholds tried when sweeping the popularity recommender
pub const MINIMUM_NUM_RATING_SWEEP: [u64; 4] = [1, 10, 100, 200];

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Could not load the dataset: {0}")]
    Load(#[from] LoadError),
    #[error("Recommender failed: {0}")]
    Recommender(#[from] RecommenderError),
    #[error("Could not score recommendations: {0}")]
    Metric(#[from] MetricError),
    #[error("Polars: {0}")]
    Polars(#[from] PolarsError),
}

/// One recommender run over one dataset, with its scores
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub recommender: &'static str,
    pub metrics: Metrics,
    pub result: RecommendResult,
}

/// Runs the recommender once and scores its predictions against the test partition, looking at
/// the first `k` recommendations of each user
pub fn evaluate(
    recommender: &dyn Recommender,
    dataset: &Dataset,
    k: usize,
) -> Result<Evaluation, EvalError> {
    let start = Instant::now();
    let result = recommender.recommend(dataset)?;
    info!(
        "{}{} recommender finished in {:.2?}",
        EVAL_HEADING,
        recommender.name(),
        start.elapsed()
    );

    let metrics = MetricCalculator::new().calc(
        &dataset.test_ratings(),
        &result.pred_ratings()?,
        &dataset.test_user2items,
        &result.user2items,
        k,
    )?;
    info!("{}{}: {}", EVAL_HEADING, recommender.name(), metrics);

    Ok(Evaluation {
        recommender: recommender.name(),
        metrics,
        result,
    })
}

/// Loads a dataset and evaluates a single recommender on it
pub fn run_sample(
    recommender: &dyn Recommender,
    loader_options: &LoaderOptions,
    k: usize,
) -> Result<Evaluation, EvalError> {
    let dataset = DataLoader::new_with_options(loader_options).load()?;
    evaluate(recommender, &dataset, k)
}

/// Evaluates the association recommender once for every support threshold in
/// [`MIN_SUPPORT_SWEEP`], keeping every other option
pub fn sweep_min_support(
    dataset: &Dataset,
    options: &AssociationOptions,
    k: usize,
) -> Result<Vec<(f64, Evaluation)>, EvalError> {
    MIN_SUPPORT_SWEEP
        .iter()
        .map(|&min_support| {
            info!("{}Trying min_support {}", EVAL_HEADING, min_support);
            let options = options.clone().with_min_support(min_support);
            let recommender = AssociationRecommender::new_with_options(&options);
            Ok((min_support, evaluate(&recommender, dataset, k)?))
        })
        .collect()
}

/// Evaluates the popularity recommender once for every threshold in
/// [`MINIMUM_NUM_RATING_SWEEP`], keeping every other option
pub fn sweep_minimum_num_rating(
    dataset: &Dataset,
    options: &PopularityOptions,
    k: usize,
) -> Result<Vec<(u64, Evaluation)>, EvalError> {
    MINIMUM_NUM_RATING_SWEEP
        .iter()
        .map(|&minimum_num_rating| {
            info!(
                "{}Trying minimum_num_rating {}",
                EVAL_HEADING, minimum_num_rating
            );
            let options = options.clone().with_minimum_num_rating(minimum_num_rating);
            let recommender = PopularityRecommender::new_with_options(&options);
            Ok((minimum_num_rating, evaluate(&recommender, dataset, k)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{dataset, movie_night, rating},
        recommender::{RandomOptions, RandomRecommender},
    };
    use std::{fs, path::Path};
    use tempfile::TempDir;

    const EPSILON: f64 = 1e-9;

    /// Users 1 and 2 share favourites. User 3 dislikes everything they rated in train
    fn shared_taste() -> Dataset {
        let train = vec![
            rating(1, 10, 5.0, 1),
            rating(1, 20, 5.0, 2),
            rating(2, 10, 5.0, 3),
            rating(2, 20, 5.0, 4),
            rating(2, 30, 5.0, 5),
            rating(3, 10, 2.0, 6),
            rating(3, 20, 2.0, 7),
        ];
        let test = vec![rating(1, 30, 4.5, 8), rating(3, 30, 5.0, 9)];
        dataset(train, test)
    }

    #[test]
    fn user_without_favourites_scores_zero() {
        let options = AssociationOptions::new().with_min_support(0.5);
        let recommender = AssociationRecommender::new_with_options(&options);

        let evaluation = evaluate(&recommender, &shared_taste(), 10).expect("Evaluation failed");

        assert_eq!(evaluation.recommender, "association");
        assert_eq!(evaluation.result.items_for(1), &[30]);
        assert!(!evaluation.result.user2items.contains_key(&3));
        // User 1 finds their only relevant movie in a list of 10, user 3 finds nothing
        assert_eq!(evaluation.metrics.rmse, 0.0);
        assert!((evaluation.metrics.precision_at_k - 0.05).abs() < EPSILON);
        assert!((evaluation.metrics.recall_at_k - 0.5).abs() < EPSILON);
    }

    #[test]
    fn unreachable_support_still_reports() {
        let options = AssociationOptions::new().with_min_support(1.1);
        let recommender = AssociationRecommender::new_with_options(&options);

        let evaluation = evaluate(&recommender, &movie_night(), 5).expect("Evaluation failed");

        assert_eq!(evaluation.metrics.precision_at_k, 0.0);
        assert_eq!(evaluation.metrics.recall_at_k, 0.0);
    }

    #[test]
    fn every_recommender_respects_the_contract() {
        let dataset = movie_night();
        let rated_user2items = dataset.rated_user2items();
        let recommenders: Vec<Box<dyn Recommender>> = vec![
            Box::new(AssociationRecommender::new_with_options(
                &AssociationOptions::new().with_min_support(0.3),
            )),
            Box::new(PopularityRecommender::new_with_options(
                &PopularityOptions::new().with_minimum_num_rating(1),
            )),
            Box::new(RandomRecommender::new_with_options(
                &RandomOptions::new().with_recommend_items(4),
            )),
        ];

        for recommender in &recommenders {
            let evaluation =
                evaluate(recommender.as_ref(), &dataset, 10).expect("Evaluation failed");

            assert!(evaluation.metrics.rmse >= 0.0);
            assert!((0.0..=1.0).contains(&evaluation.metrics.precision_at_k));
            assert!((0.0..=1.0).contains(&evaluation.metrics.recall_at_k));
            for (user_id, items) in &evaluation.result.user2items {
                assert!(items.len() <= 10);
                let rated = &rated_user2items[user_id];
                assert!(items.iter().all(|movie| !rated.contains(movie)));
            }
        }
    }

    #[test]
    fn support_sweep_never_gains_rules() {
        let dataset = movie_night();

        let sweep = sweep_min_support(&dataset, &AssociationOptions::new(), 10)
            .expect("Sweep failed");

        assert_eq!(sweep.len(), MIN_SUPPORT_SWEEP.len());
        let rule_counts: Vec<usize> = sweep
            .iter()
            .map(|(min_support, _)| {
                AssociationRecommender::new_with_options(
                    &AssociationOptions::new().with_min_support(*min_support),
                )
                .association_rules(&dataset)
                .len()
            })
            .collect();
        assert!(rule_counts.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn rating_count_sweep_keeps_predictions() {
        let dataset = movie_night();

        let sweep = sweep_minimum_num_rating(&dataset, &PopularityOptions::new(), 10)
            .expect("Sweep failed");

        let thresholds: Vec<u64> = sweep.iter().map(|(threshold, _)| *threshold).collect();
        assert_eq!(thresholds, MINIMUM_NUM_RATING_SWEEP.to_vec());
        // The threshold only changes the lists, never the predicted ratings
        let first_rmse = sweep[0].1.metrics.rmse;
        assert!(sweep
            .iter()
            .all(|(_, evaluation)| (evaluation.metrics.rmse - first_rmse).abs() < EPSILON));
    }

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).expect("Fixture not written");
    }

    #[test]
    fn runs_from_data_files() {
        let dir = TempDir::new().expect("Temporary directory not created");
        write(
            dir.path(),
            "movies.dat",
            "10::Alien (1979)::Horror|Sci-Fi\n20::Aliens (1986)::Action|Sci-Fi\n30::Heat (1995)::Crime\n",
        );
        write(dir.path(), "tags.dat", "1::10::Classic::5\n");
        write(
            dir.path(),
            "ratings.dat",
            "1::10::5::1\n1::20::5::2\n1::30::4::3\n2::10::5::4\n2::20::4.5::5\n2::30::3::6\n",
        );
        let options = LoaderOptions::new()
            .with_data_dir(&dir.path().to_string_lossy())
            .with_n_test_items(1);

        let evaluation = run_sample(&PopularityRecommender::new(), &options, 10)
            .expect("Evaluation failed");

        assert_eq!(evaluation.recommender, "popularity");
        // Only movie 30 was held out, and it has no train ratings left
        assert_eq!(
            evaluation.result.pred_ratings().expect("No predictions"),
            vec![0.0, 0.0]
        );
        assert_eq!(evaluation.metrics.precision_at_k, 0.0);
    }

    #[test]
    fn missing_data_is_a_load_error() {
        let dir = TempDir::new().expect("Temporary directory not created");
        let options = LoaderOptions::new().with_data_dir(&dir.path().to_string_lossy());

        let error = run_sample(&PopularityRecommender::new(), &options, 10)
            .expect_err("Should not load from an empty directory");

        assert!(matches!(error, EvalError::Load(_)));
    }
}
