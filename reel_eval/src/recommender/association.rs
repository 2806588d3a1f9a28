use super::{
    apriori::{Apriori, RuleCounts},
    AssociationOptions, Recommender, RecommenderError, RECOMMENDER_HEADING,
};
use polars::datatypes::{InitHashMaps, PlHashMap, PlHashSet};
use rayon::prelude::*;
use reel::{Dataset, Rating, RecommendResult};
use tracing::{debug, info};

/// A scored association rule: users who liked every movie in `lhs` tend to like `rhs` too
#[derive(Clone, Debug, PartialEq)]
pub struct AssociationRule {
    pub lhs: Vec<u64>,
    pub rhs: Vec<u64>,
    /// Fraction of train users whose basket holds `lhs`
    pub lhs_support: f64,
    /// Fraction of train users whose basket holds `rhs`
    pub rhs_support: f64,
    /// Fraction of `lhs` baskets which also hold `rhs`
    pub confidence: f64,
    /// `confidence / rhs_support`, above 1 when the sides appear together more than by chance
    pub lift: f64,
}

impl AssociationRule {
    fn from_counts(counts: RuleCounts, num_users: usize) -> AssociationRule {
        let num_users = num_users as f64;
        let rhs_support = counts.rhs_count as f64 / num_users;
        let confidence = counts.count as f64 / counts.lhs_count as f64;

        AssociationRule {
            lhs_support: counts.lhs_count as f64 / num_users,
            rhs_support,
            confidence,
            lift: confidence / rhs_support,
            lhs: counts.lhs,
            rhs: counts.rhs,
        }
    }
}

/// Recommends movies which association rules link to each user's recent favourites.
///
/// Baskets are the movies each user rated highly in train. Rules mined from them are kept when
/// their lift is high enough, and a user is recommended the right hand sides of rules whose left
/// hand side touches their recent favourites, most frequently suggested first. The recommender
/// does not estimate ratings, so it predicts every test rating exactly.
pub struct AssociationRecommender {
    options: AssociationOptions,
}

impl AssociationRecommender {
    /// Creates a recommender with the default settings
    #[inline]
    pub fn new() -> AssociationRecommender {
        Self::new_with_options(&AssociationOptions::new())
    }

    pub fn new_with_options(options: &AssociationOptions) -> AssociationRecommender {
        AssociationRecommender {
            options: options.clone(),
        }
    }

    /// Mines the rules used for recommending, ordered by lift descending.
    /// Rules with equal lift stay in the order they were mined.
    pub fn association_rules(&self, dataset: &Dataset) -> Vec<AssociationRule> {
        let baskets = self.baskets(&dataset.train);
        let num_users = dataset.train_user_ids().len();

        let itemsets = Apriori::new()
            .with_min_support(self.options.min_support)
            .frequent_itemsets(&baskets);
        debug!(
            "{}{} baskets gave {} frequent itemsets",
            RECOMMENDER_HEADING,
            baskets.len(),
            itemsets.len()
        );

        let mut rules: Vec<AssociationRule> = Apriori::rules(&itemsets)
            .into_iter()
            .map(|counts| AssociationRule::from_counts(counts, num_users))
            .filter(|rule| rule.lift >= self.options.min_threshold)
            .collect();

        // Stable, so ties keep mining order
        rules.sort_by(|a, b| b.lift.total_cmp(&a.lift));

        rules
    }

    /// One basket per user holding every movie they rated at least `min_rating`, ordered by user id
    fn baskets(&self, train: &[Rating]) -> Vec<Vec<u64>> {
        let mut user_baskets: PlHashMap<u64, Vec<u64>> = PlHashMap::new();
        for rating in train.iter().filter(|r| r.rating >= self.options.min_rating) {
            user_baskets
                .entry(rating.user_id)
                .or_default()
                .push(rating.movie_id);
        }

        let mut user_baskets: Vec<(u64, Vec<u64>)> = user_baskets.into_iter().collect();
        user_baskets.sort_unstable_by_key(|(user_id, _)| *user_id);

        user_baskets.into_iter().map(|(_, basket)| basket).collect()
    }

    /// Each user's most recent highly rated movies, newest first.
    /// Ratings with equal timestamps keep their train order.
    fn recent_user2items(&self, train: &[Rating]) -> PlHashMap<u64, Vec<u64>> {
        let mut user_ratings: PlHashMap<u64, Vec<&Rating>> = PlHashMap::new();
        for rating in train.iter().filter(|r| r.rating >= self.options.recent_rating) {
            user_ratings.entry(rating.user_id).or_default().push(rating);
        }

        user_ratings
            .into_iter()
            .map(|(user_id, mut ratings)| {
                ratings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                let recent = ratings
                    .into_iter()
                    .take(self.options.recent_items)
                    .map(|rating| rating.movie_id)
                    .collect();
                (user_id, recent)
            })
            .collect()
    }

    /// Ranks the right hand sides of every rule triggered by `recent_items`
    fn recommend_for_user(
        &self,
        rules: &[AssociationRule],
        recent_items: &[u64],
        rated_items: &PlHashSet<u64>,
    ) -> Vec<u64> {
        // (movie, number of triggered rules suggesting it), in order of first suggestion
        let mut suggestions: Vec<(u64, usize)> = Vec::new();
        let mut positions: PlHashMap<u64, usize> = PlHashMap::new();

        let triggered = rules
            .iter()
            .filter(|rule| rule.lhs.iter().any(|item| recent_items.contains(item)));

        for rule in triggered {
            for &item in &rule.rhs {
                match positions.get(&item) {
                    Some(&position) => suggestions[position].1 += 1,
                    None => {
                        positions.insert(item, suggestions.len());
                        suggestions.push((item, 1));
                    }
                }
            }
        }

        // Stable, so ties are broken by rule order
        suggestions.sort_by(|a, b| b.1.cmp(&a.1));

        suggestions
            .into_iter()
            .map(|(item, _)| item)
            .filter(|item| !rated_items.contains(item))
            .take(self.options.recommend_items)
            .collect()
    }
}

impl Default for AssociationRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender for AssociationRecommender {
    fn name(&self) -> &'static str {
        "association"
    }

    fn recommend(&self, dataset: &Dataset) -> Result<RecommendResult, RecommenderError> {
        let rules = self.association_rules(dataset);
        info!(
            "{}Kept {} association rules with min_support {} and min_threshold {}",
            RECOMMENDER_HEADING,
            rules.len(),
            self.options.min_support,
            self.options.min_threshold
        );

        let recent_user2items = self.recent_user2items(&dataset.train);
        let rated_user2items = dataset.rated_user2items();

        // Users without a recent favourite get no entry
        let user2items: PlHashMap<u64, Vec<u64>> = dataset
            .train_user_ids()
            .par_iter()
            .filter_map(|user_id| {
                let recent_items = recent_user2items.get(user_id)?;
                let rated_items = rated_user2items.get(user_id)?;
                Some((
                    *user_id,
                    self.recommend_for_user(&rules, recent_items, rated_items),
                ))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect();
        info!(
            "{}Recommended to {} users",
            RECOMMENDER_HEADING,
            user2items.len()
        );

        // Ranking only, so every test rating is "predicted" as itself
        Ok(RecommendResult::new(
            &dataset.test,
            dataset.test_ratings(),
            user2items,
        )?)
    }
}
