use neo4rs::query;
use tracing::info;

use crate::GraphClient;

/// Post-hoc consistency repair: collapse duplicate nodes per label.
///
/// Node creation is unconditional, so every re-observation of a natural key
/// leaves an extra node behind. A sweep groups each label's nodes by key and
/// detach-deletes all but one per group. Survivor policy: the node with the
/// smallest internal id, i.e. the oldest created. Relationships attached only
/// to deleted duplicates are dropped with them.
pub struct DedupSweeper {
    client: GraphClient,
}

/// Nodes deleted per label by one sweep pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepStats {
    pub accounts: u64,
    pub locations: u64,
    pub posts: u64,
    pub sources: u64,
    pub hashtags: u64,
    pub dates: u64,
}

impl SweepStats {
    pub fn total(&self) -> u64 {
        self.accounts + self.locations + self.posts + self.sources + self.hashtags + self.dates
    }
}

impl DedupSweeper {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Sweep all six labels. Idempotent when no new duplicates accrued since
    /// the previous pass.
    pub async fn sweep_all(&self) -> Result<SweepStats, neo4rs::Error> {
        let stats = SweepStats {
            accounts: self.sweep("Account", &["account_id"]).await?,
            locations: self.sweep("Location", &["location"]).await?,
            posts: self.sweep("Post", &["post_id"]).await?,
            sources: self.sweep("Source", &["source"]).await?,
            hashtags: self.sweep("Hashtag", &["hashtag"]).await?,
            dates: self.sweep("Date", &["day", "month", "year"]).await?,
        };

        if stats.total() > 0 {
            info!(
                accounts = stats.accounts,
                locations = stats.locations,
                posts = stats.posts,
                sources = stats.sources,
                hashtags = stats.hashtags,
                dates = stats.dates,
                "Collapsed duplicate nodes"
            );
        }

        Ok(stats)
    }

    /// Sweep one label: group by natural key (ordered by internal id so the
    /// oldest node heads each group), detach-delete the tail of every group
    /// with more than one member. Returns the number of deleted nodes.
    async fn sweep(&self, label: &str, key_props: &[&str]) -> Result<u64, neo4rs::Error> {
        let keys = key_props
            .iter()
            .enumerate()
            .map(|(i, p)| format!("n.{p} AS k{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let q = query(&format!(
            "MATCH (n:{label})
             WITH n ORDER BY id(n)
             WITH {keys}, collect(n) AS nodes
             WHERE size(nodes) > 1
             UNWIND tail(nodes) AS dup
             DETACH DELETE dup
             RETURN count(dup) AS deleted"
        ));

        let mut stream = self.client.graph.execute(q).await?;
        let deleted: i64 = match stream.next().await? {
            Some(row) => row.get("deleted").unwrap_or(0),
            None => 0,
        };
        Ok(deleted as u64)
    }
}
