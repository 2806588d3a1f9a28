use const_format::formatcp;

pub mod reel_core;

pub use reel_core::{Dataset, Metrics, Movie, RecommendResult, Rating};

// Directory where the MovieLens files can be found
pub const DATA_DIR: &str = "./data/ml-10M100K";

// Raw files making up the dataset
const MOVIES_FILE: &str = formatcp!("{}/movies.dat", DATA_DIR);
const TAGS_FILE: &str = formatcp!("{}/tags.dat", DATA_DIR);
const RATINGS_FILE: &str = formatcp!("{}/ratings.dat", DATA_DIR);

/// Locations of the raw dataset files
#[derive(Clone, Debug, PartialEq)]
pub struct DataFiles {
    pub movies_file: String,
    pub tags_file: String,
    pub ratings_file: String,
}

impl DataFiles {
    pub fn new() -> Self {
        DataFiles {
            movies_file: String::from(MOVIES_FILE),
            tags_file: String::from(TAGS_FILE),
            ratings_file: String::from(RATINGS_FILE),
        }
    }

    /// Points every file at the same directory, keeping the standard file names
    pub fn with_data_dir(data_dir: &str) -> Self {
        let data_dir = data_dir.trim_end_matches('/');
        DataFiles {
            movies_file: format!("{}/movies.dat", data_dir),
            tags_file: format!("{}/tags.dat", data_dir),
            ratings_file: format!("{}/ratings.dat", data_dir),
        }
    }
}

impl Default for DataFiles {
    fn default() -> Self {
        Self::new()
    }
}
