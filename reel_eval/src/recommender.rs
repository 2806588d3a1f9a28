mod apriori;
mod association;
mod popularity;
mod random;
mod recommender_types;

use reel::{Dataset, RecommendResult};

pub use apriori::{Apriori, FrequentItemset, RuleCounts};
pub use association::{AssociationRecommender, AssociationRule};
pub use popularity::PopularityRecommender;
pub use random::RandomRecommender;
pub use recommender_types::{AssociationOptions, PopularityOptions, RandomOptions, RecommenderError};

/// Heading to put before log messages from the recommenders
static RECOMMENDER_HEADING: &str = "[RECOMMENDER] ";

/// A strategy that turns a dataset into rating predictions and ranked recommendations.
///
/// Implementations must be pure functions of the dataset and their options: running the same
/// recommender twice on the same dataset gives the same result.
pub trait Recommender: Sync {
    /// Short name used in reports
    fn name(&self) -> &'static str;

    /// Predicts a rating for every test row and a recommendation list per user.
    /// Users may be missing from the lists, which counts as recommending nothing.
    fn recommend(&self, dataset: &Dataset) -> Result<RecommendResult, RecommenderError>;
}
