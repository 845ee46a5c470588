pub mod crawler;
pub mod extract;
pub mod traits;

pub use crawler::{CrawlOptions, CrawlStats, Crawler};
pub use traits::{GraphSink, Neo4jSink, SocialApi};
