use std::path::PathBuf;

pub const DEFAULT_USERS_FILE: &str = "pengguna.txt";
pub const DEFAULT_RECEIPT_FILE: &str = "struk.txt";

/// Where the teller keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub users_file: PathBuf,
    pub receipt_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            users_file: PathBuf::from(DEFAULT_USERS_FILE),
            receipt_file: PathBuf::from(DEFAULT_RECEIPT_FILE),
        }
    }
}
