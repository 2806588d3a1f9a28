//! Levelwise frequent itemset mining over baskets of movie ids.
//!
//! Itemsets are kept as sorted vectors so that candidates can be built by joining two itemsets
//! sharing every item but their last, and so that results come out in the same order on every run.

use polars::datatypes::{InitHashMaps, PlHashMap, PlHashSet};
use rayon::prelude::*;

/// An itemset found in enough baskets, with the number of baskets containing it
#[derive(Clone, Debug, PartialEq)]
pub struct FrequentItemset {
    /// Sorted ascending
    pub items: Vec<u64>,
    pub count: usize,
}

/// A split of a frequent itemset into left and right hand sides, with the basket counts needed to
/// score it
#[derive(Clone, Debug, PartialEq)]
pub struct RuleCounts {
    pub lhs: Vec<u64>,
    pub rhs: Vec<u64>,
    /// Baskets containing the left hand side
    pub lhs_count: usize,
    /// Baskets containing the right hand side
    pub rhs_count: usize,
    /// Baskets containing both sides
    pub count: usize,
}

/// Apriori frequent itemset miner.
///
/// 1. Count single items and keep the frequent ones
/// 2. Join frequent k-itemsets sharing their first k-1 items into (k+1)-candidates
/// 3. Drop candidates with an infrequent k-subset, then count the rest against every basket
/// 4. Repeat until no candidate survives
#[derive(Clone, Debug)]
pub struct Apriori {
    /// Minimum fraction of baskets an itemset must appear in
    min_support: f64,
}

impl Apriori {
    #[inline]
    pub fn new() -> Apriori {
        Apriori { min_support: 0.1 }
    }

    pub fn with_min_support(mut self, new_min_support: f64) -> Apriori {
        self.min_support = new_min_support;
        self
    }

    /// Finds every itemset contained in at least `min_support` of the baskets.
    ///
    /// Itemsets are returned level by level (all singletons first), lexicographically within a
    /// level. Duplicate items inside a basket are counted once. Itemsets never found in any basket
    /// are never returned, even with a support threshold of zero.
    pub fn frequent_itemsets(&self, baskets: &[Vec<u64>]) -> Vec<FrequentItemset> {
        if baskets.is_empty() {
            return Vec::new();
        }

        let baskets: Vec<Vec<u64>> = baskets
            .iter()
            .map(|basket| {
                let mut basket = basket.clone();
                basket.sort_unstable();
                basket.dedup();
                basket
            })
            .collect();

        let num_baskets = baskets.len() as f64;
        let is_frequent =
            |count: usize| count > 0 && count as f64 / num_baskets >= self.min_support;

        let mut item_counts: PlHashMap<u64, usize> = PlHashMap::new();
        for basket in &baskets {
            for &item in basket {
                *item_counts.entry(item).or_insert(0) += 1;
            }
        }

        let mut level: Vec<FrequentItemset> = item_counts
            .into_iter()
            .filter(|(_, count)| is_frequent(*count))
            .map(|(item, count)| FrequentItemset {
                items: vec![item],
                count,
            })
            .collect();
        level.sort_by(|a, b| a.items.cmp(&b.items));

        let mut frequent = Vec::new();
        while !level.is_empty() {
            let candidates = generate_candidates(&level);
            frequent.append(&mut level);

            // Counting dominates mining time, and candidates are independent of each other
            let counts: Vec<usize> = candidates
                .par_iter()
                .map(|candidate| {
                    baskets
                        .iter()
                        .filter(|basket| contains_all(basket, candidate))
                        .count()
                })
                .collect();

            level = candidates
                .into_iter()
                .zip(counts)
                .filter(|(_, count)| is_frequent(*count))
                .map(|(items, count)| FrequentItemset { items, count })
                .collect();
        }

        frequent
    }

    /// Every way to split each frequent itemset of two or more items into non-empty left and
    /// right hand sides. Rules follow the order of `itemsets`.
    ///
    /// `itemsets` must be closed under taking subsets, which is always true of the output of
    /// [`Apriori::frequent_itemsets`].
    pub fn rules(itemsets: &[FrequentItemset]) -> Vec<RuleCounts> {
        let counts: PlHashMap<&[u64], usize> = itemsets
            .iter()
            .map(|itemset| (itemset.items.as_slice(), itemset.count))
            .collect();
        let count_of = |items: &[u64]| -> usize {
            *counts
                .get(items)
                .expect("Subsets of a frequent itemset are frequent")
        };

        let mut rules = Vec::new();
        for itemset in itemsets.iter().filter(|itemset| itemset.items.len() >= 2) {
            let size = itemset.items.len();

            // Skip the empty and full masks
            for mask in 1..(1usize << size) - 1 {
                let mut lhs = Vec::with_capacity(size);
                let mut rhs = Vec::with_capacity(size);
                for (i, &item) in itemset.items.iter().enumerate() {
                    if mask & (1 << i) != 0 {
                        lhs.push(item);
                    } else {
                        rhs.push(item);
                    }
                }

                rules.push(RuleCounts {
                    lhs_count: count_of(&lhs),
                    rhs_count: count_of(&rhs),
                    count: itemset.count,
                    lhs,
                    rhs,
                });
            }
        }

        rules
    }
}

impl Default for Apriori {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins itemsets of one level into candidates for the next.
/// `level` must be sorted and hold itemsets of a single size.
fn generate_candidates(level: &[FrequentItemset]) -> Vec<Vec<u64>> {
    let known: PlHashSet<&[u64]> = level.iter().map(|itemset| itemset.items.as_slice()).collect();
    let mut candidates = Vec::new();

    for (i, first) in level.iter().enumerate() {
        let prefix = &first.items[..first.items.len() - 1];

        for second in &level[i + 1..] {
            // Itemsets sharing a prefix are contiguous in a sorted level
            if &second.items[..prefix.len()] != prefix {
                break;
            }

            let mut candidate = first.items.clone();
            candidate.push(second.items[prefix.len()]);

            if !has_infrequent_subset(&candidate, &known) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

fn has_infrequent_subset(candidate: &[u64], known: &PlHashSet<&[u64]>) -> bool {
    let mut subset = Vec::with_capacity(candidate.len() - 1);

    (0..candidate.len()).any(|skip| {
        subset.clear();
        subset.extend(
            candidate
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, item)| *item),
        );
        !known.contains(subset.as_slice())
    })
}

/// Both slices must be sorted
fn contains_all(basket: &[u64], itemset: &[u64]) -> bool {
    itemset
        .iter()
        .all(|item| basket.binary_search(item).is_ok())
}
