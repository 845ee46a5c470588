use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use aviary_common::Config;
use aviary_crawler::{CrawlOptions, Crawler, Neo4jSink};
use aviary_graph::{migrate::migrate, GraphClient};
use chirper_client::ChirperClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("aviary_crawler=info".parse()?)
                .add_directive("aviary_graph=info".parse()?)
                .add_directive("chirper_client=info".parse()?),
        )
        .init();

    info!("Aviary crawler starting...");

    // Load config
    let config = Config::from_env();

    // Connect to Neo4j
    let client =
        GraphClient::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password)
            .await?;

    // Run migrations
    migrate(&client).await?;

    let api = ChirperClient::new(config.chirper_token.clone());
    let sink = Neo4jSink::new(client);

    let mut crawler = Crawler::new(
        Box::new(api),
        Box::new(sink),
        CrawlOptions {
            seed_handle: config.seed_handle.clone(),
            timeline_page_size: config.timeline_page_size,
            filter_lang: config.filter_lang.clone(),
        },
    );

    let stats = crawler.run().await?;
    info!("Crawl run complete. {stats}");

    Ok(())
}
