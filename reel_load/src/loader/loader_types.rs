use reel::DataFiles;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File: could not read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Parse: {file} line {line} is malformed: {content:?}")]
    Parse {
        file: String,
        line: usize,
        content: String,
    },
}

#[derive(Clone, Debug)]
pub struct LoaderOptions {
    /// Number of users to keep, taken in order of their first rating in the ratings file.
    /// The full dataset has ~70k users, which makes mining slow
    pub n_user: usize,
    /// Number of each user's most recent ratings to hold out for testing
    pub n_test_items: usize,
    /// Locations of the raw files
    pub files: DataFiles,
}

impl LoaderOptions {
    /// Create an options instance with the default options
    pub fn new() -> LoaderOptions {
        LoaderOptions {
            n_user: 1000,
            n_test_items: 5,
            files: DataFiles::new(),
        }
    }

    pub fn with_n_user(mut self, new_n_user: usize) -> LoaderOptions {
        self.n_user = new_n_user;
        self
    }

    pub fn with_n_test_items(mut self, new_n_test_items: usize) -> LoaderOptions {
        self.n_test_items = new_n_test_items;
        self
    }

    pub fn with_data_dir(mut self, data_dir: &str) -> LoaderOptions {
        self.files = DataFiles::with_data_dir(data_dir);
        self
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self::new()
    }
}
