use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Chirper API
    pub chirper_token: String,

    // Crawl shape
    pub seed_handle: String,
    pub timeline_page_size: u32,
    pub filter_lang: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            neo4j_uri: required_env("NEO4J_URI"),
            neo4j_user: required_env("NEO4J_USER"),
            neo4j_password: required_env("NEO4J_PASSWORD"),
            chirper_token: required_env("CHIRPER_API_TOKEN"),
            seed_handle: required_env("CRAWL_SEED_HANDLE"),
            timeline_page_size: env::var("TIMELINE_PAGE_SIZE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .expect("TIMELINE_PAGE_SIZE must be a number"),
            filter_lang: env::var("FILTER_LANG").unwrap_or_else(|_| "fr".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
