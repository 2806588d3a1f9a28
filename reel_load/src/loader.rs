mod loader_types;
pub mod splitter;

use crate::{LOADER_HEADING, RELEVANT_RATING};
use lazy_static::lazy_static;
use polars::datatypes::{InitHashMaps, PlHashMap, PlHashSet};
use regex::Regex;
use reel::{Dataset, Movie, Rating};
use std::fs;
use tracing::info;

pub use loader_types::{LoadError, LoaderOptions};

lazy_static! {
    // user_id::movie_id::rating::timestamp
    static ref RATING_PATTERN: Regex = Regex::new(r"^(\d+)::(\d+)::(\d+(?:\.\d+)?)::(-?\d+)$")
        .expect("Hardcoded regex should be valid.");
    // movie_id::title::genres, where titles may contain single colons
    static ref MOVIE_PATTERN: Regex =
        Regex::new(r"^(\d+)::(.*)::([^:]*)$").expect("Hardcoded regex should be valid.");
    // user_id::movie_id::tag::timestamp
    static ref TAG_PATTERN: Regex =
        Regex::new(r"^(\d+)::(\d+)::(.*)::(-?\d+)$").expect("Hardcoded regex should be valid.");
}

/// Reads the MovieLens files and assembles the train/test dataset the recommenders run on
pub struct DataLoader {
    options: LoaderOptions,
}

impl DataLoader {
    /// Creates a loader with the default settings
    #[inline]
    pub fn new() -> DataLoader {
        Self::new_with_options(&LoaderOptions::new())
    }

    pub fn new_with_options(options: &LoaderOptions) -> DataLoader {
        DataLoader {
            options: options.clone(),
        }
    }

    /// Loads the raw files, splits every user's ratings by recency and builds the ground truth
    pub fn load(&self) -> Result<Dataset, LoadError> {
        let (ratings, movies) = self.load_raw()?;

        let (train, test) = splitter::split_by_recency(&ratings, self.options.n_test_items);
        let test_user2items = splitter::ground_truth(&test, RELEVANT_RATING);
        info!(
            "{}Split into {} train and {} test ratings, {} users with relevant test items",
            LOADER_HEADING,
            train.len(),
            test.len(),
            test_user2items.len()
        );

        Ok(Dataset::new(train, test, test_user2items, movies))
    }

    fn load_raw(&self) -> Result<(Vec<Rating>, Vec<Movie>), LoadError> {
        let files = &self.options.files;

        // The movie file is not valid UTF-8
        let movie_text = decode_latin1(&read_file(&files.movies_file)?);
        let mut movies = parse_movies(&movie_text, &files.movies_file)?;
        info!("{}Read {} movies", LOADER_HEADING, movies.len());

        let tag_text = String::from_utf8_lossy(&read_file(&files.tags_file)?).into_owned();
        let mut movie_tags = parse_tags(&tag_text, &files.tags_file)?;
        for movie in movies.iter_mut() {
            if let Some(tags) = movie_tags.remove(&movie.movie_id) {
                movie.tags = tags;
            }
        }

        let rating_text = String::from_utf8_lossy(&read_file(&files.ratings_file)?).into_owned();
        let ratings = parse_ratings(&rating_text, &files.ratings_file)?;
        info!("{}Read {} ratings", LOADER_HEADING, ratings.len());

        let ratings = restrict_users(ratings, self.options.n_user);

        // Ratings of unknown movies are dropped
        let known: PlHashSet<u64> = movies.iter().map(|movie| movie.movie_id).collect();
        let ratings: Vec<Rating> = ratings
            .into_iter()
            .filter(|rating| known.contains(&rating.movie_id))
            .collect();
        info!(
            "{}Kept {} ratings from the first {} users",
            LOADER_HEADING,
            ratings.len(),
            self.options.n_user
        );

        Ok((ratings, movies))
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &str) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| LoadError::File {
        path: String::from(path),
        source,
    })
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

/// Yields the 1-based line number and content of every non-blank line
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

fn parse_error(file: &str, line: usize, content: &str) -> LoadError {
    LoadError::Parse {
        file: String::from(file),
        line,
        content: String::from(content),
    }
}

fn parse_movies(text: &str, file: &str) -> Result<Vec<Movie>, LoadError> {
    let mut movies = Vec::new();

    for (line_number, line) in data_lines(text) {
        let movie = MOVIE_PATTERN.captures(line).and_then(|captures| {
            Some(Movie {
                movie_id: captures[1].parse().ok()?,
                title: String::from(&captures[2]),
                genres: captures[3]
                    .split('|')
                    .filter(|genre| !genre.is_empty())
                    .map(String::from)
                    .collect(),
                tags: Vec::new(),
            })
        });

        movies.push(movie.ok_or_else(|| parse_error(file, line_number, line))?);
    }

    Ok(movies)
}

/// Maps movie ids to their lower-cased tags, in file order
fn parse_tags(text: &str, file: &str) -> Result<PlHashMap<u64, Vec<String>>, LoadError> {
    let mut movie_tags: PlHashMap<u64, Vec<String>> = PlHashMap::new();

    for (line_number, line) in data_lines(text) {
        let (movie_id, tag) = TAG_PATTERN
            .captures(line)
            .and_then(|captures| {
                Some((
                    captures[2].parse::<u64>().ok()?,
                    captures[3].to_lowercase(),
                ))
            })
            .ok_or_else(|| parse_error(file, line_number, line))?;

        movie_tags.entry(movie_id).or_default().push(tag);
    }

    Ok(movie_tags)
}

fn parse_ratings(text: &str, file: &str) -> Result<Vec<Rating>, LoadError> {
    let mut ratings = Vec::new();

    for (line_number, line) in data_lines(text) {
        let rating = RATING_PATTERN.captures(line).and_then(|captures| {
            Some(Rating {
                user_id: captures[1].parse().ok()?,
                movie_id: captures[2].parse().ok()?,
                rating: captures[3].parse().ok()?,
                timestamp: captures[4].parse().ok()?,
            })
        });

        ratings.push(rating.ok_or_else(|| parse_error(file, line_number, line))?);
    }

    Ok(ratings)
}

/// Keeps the ratings of the first `n_user` distinct users, in order of first appearance
fn restrict_users(ratings: Vec<Rating>, n_user: usize) -> Vec<Rating> {
    let mut kept: PlHashSet<u64> = PlHashSet::with_capacity(n_user);
    for rating in &ratings {
        if kept.len() == n_user {
            break;
        }
        kept.insert(rating.user_id);
    }

    ratings
        .into_iter()
        .filter(|rating| kept.contains(&rating.user_id))
        .collect()
}
