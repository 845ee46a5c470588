use neo4rs::query;
use tracing::{info, warn};

use crate::GraphClient;

/// Run idempotent schema migrations: one index per label's natural key
/// property, so the MERGE-by-key lookups and the sweep's group-by stay cheap.
pub async fn migrate(client: &GraphClient) -> Result<(), neo4rs::Error> {
    let g = &client.graph;

    info!("Running schema migrations...");

    let indexes = [
        "CREATE INDEX account_key IF NOT EXISTS FOR (n:Account) ON (n.account_id)",
        "CREATE INDEX location_key IF NOT EXISTS FOR (n:Location) ON (n.location)",
        "CREATE INDEX post_key IF NOT EXISTS FOR (n:Post) ON (n.post_id)",
        "CREATE INDEX source_key IF NOT EXISTS FOR (n:Source) ON (n.source)",
        "CREATE INDEX hashtag_key IF NOT EXISTS FOR (n:Hashtag) ON (n.hashtag)",
        "CREATE INDEX date_key IF NOT EXISTS FOR (n:Date) ON (n.day)",
    ];

    for idx in &indexes {
        run_ignoring_exists(g, idx).await?;
    }
    info!("Natural key indexes created");

    Ok(())
}

async fn run_ignoring_exists(g: &neo4rs::Graph, cypher: &str) -> Result<(), neo4rs::Error> {
    match g.run(query(cypher)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("already exists") || msg.contains("equivalent") {
                warn!("Already exists (skipped): {}", cypher.chars().take(80).collect::<String>());
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}
