use std::path::PathBuf;

#[derive(Debug)]
pub struct Config {
    pub readarr_api_url: String,
    pub readarr_api_key: String,
    /// Local mount of the library Readarr reports file paths inside.
    pub books_path: PathBuf,
    pub bind_addr: String,
}

const DEFAULT_BOOKS_PATH: &str = "/books";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Config {
    pub fn load() -> Self {
        let readarr_api_url = std::env::var("READARR_API_URL").unwrap_or_default();
        let readarr_api_key = std::env::var("READARR_API_KEY").unwrap_or_default();
        let books_path = std::env::var("BOOKS_PATH").unwrap_or(DEFAULT_BOOKS_PATH.into());
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(DEFAULT_BIND_ADDR.into());
        Config {
            readarr_api_url,
            readarr_api_key,
            books_path: PathBuf::from(books_path),
            bind_addr,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.readarr_api_url.is_empty() {
            return Err("READARR_API_URL is missing".into());
        }
        if self.readarr_api_key.is_empty() {
            return Err("READARR_API_KEY is missing".into());
        }
        Ok(())
    }
}
