use neo4rs::query;
use thiserror::Error;
use tracing::info;

use aviary_common::{AccountRecord, DateParts, GeoPoint, PostRecord};

use crate::GraphClient;

/// What a single write operation actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nodes were created and/or relationships merged.
    Applied,
    /// A merge matched no endpoints; nothing was written.
    NoOp,
}

#[derive(Debug, Error)]
pub enum GraphWriteError {
    #[error("Graph write failed: {0}")]
    Store(#[from] neo4rs::Error),
}

/// Write-side wrapper for the graph. Append-only: every operation is one
/// transaction, node creation is unconditional (`CREATE`, never `MERGE`),
/// and only relationships are merged, matched by natural key. Duplicate
/// nodes are expected; the [`crate::DedupSweeper`] collapses them later.
pub struct GraphWriter {
    client: GraphClient,
}

impl GraphWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Create an Account node and a Location node (unconditionally, even if
    /// either already exists), then merge the FROM edge between the pair
    /// matched by key.
    pub async fn create_account(
        &self,
        account: &AccountRecord,
        location: &str,
    ) -> Result<WriteOutcome, GraphWriteError> {
        let q = query(
            "CREATE (a:Account)
             SET a.account_id = $account_id,
                 a.handle = $handle,
                 a.description = $description,
                 a.friend_count = $friend_count,
                 a.follower_count = $follower_count,
                 a.favorite_count = $favorite_count,
                 a.verified = $verified
             CREATE (l:Location)
             SET l.location = $location
             WITH count(*) AS dummy
             MATCH (a:Account {account_id: $account_id}), (l:Location {location: $location})
             MERGE (a)-[:FROM]->(l)
             RETURN count(*) AS merged",
        )
        .param("account_id", account.account_id.as_str())
        .param("handle", account.handle.as_str())
        .param("description", account.description.as_str())
        .param("friend_count", account.friend_count)
        .param("follower_count", account.follower_count)
        .param("favorite_count", account.favorite_count)
        .param("verified", account.verified)
        .param("location", location);

        self.run_counting_merges(q).await
    }

    /// Create a non-geolocated Post (TWEETED edge).
    pub async fn create_post(
        &self,
        account_id: &str,
        post: &PostRecord,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome, GraphWriteError> {
        self.write_post(account_id, post, None, date, "TWEETED").await
    }

    /// Create a geolocated Post (TWEETED edge, latitude/longitude properties).
    pub async fn create_post_geolocated(
        &self,
        account_id: &str,
        post: &PostRecord,
        geo: GeoPoint,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome, GraphWriteError> {
        self.write_post(account_id, post, Some(geo), date, "TWEETED").await
    }

    /// Create a non-geolocated retweet (RETWEETED edge).
    pub async fn create_retweet(
        &self,
        account_id: &str,
        post: &PostRecord,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome, GraphWriteError> {
        self.write_post(account_id, post, None, date, "RETWEETED").await
    }

    /// Create a geolocated retweet (RETWEETED edge).
    pub async fn create_retweet_geolocated(
        &self,
        account_id: &str,
        post: &PostRecord,
        geo: GeoPoint,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome, GraphWriteError> {
        self.write_post(account_id, post, Some(geo), date, "RETWEETED").await
    }

    /// Shared body of the four post variants. Creates Post + Source (+ Date
    /// when the timestamp split succeeded), then merges HAS_SOURCE, the
    /// caller-selected TWEETED/RETWEETED edge, and DATED_OF.
    ///
    /// The TWEETED/RETWEETED choice belongs to the caller; nothing here
    /// inspects the post to infer it.
    async fn write_post(
        &self,
        account_id: &str,
        post: &PostRecord,
        geo: Option<GeoPoint>,
        date: Option<&DateParts>,
        edge: &str,
    ) -> Result<WriteOutcome, GraphWriteError> {
        let mut stmt = String::from(
            "CREATE (p:Post)
             SET p.post_id = $post_id,
                 p.text = $text,
                 p.created_at = $created_at,
                 p.retweet_count = $retweet_count,
                 p.favorite_count = $favorite_count",
        );
        if geo.is_some() {
            stmt.push_str(
                ",
                 p.latitude = $latitude,
                 p.longitude = $longitude",
            );
        }
        stmt.push_str(
            "
             CREATE (s:Source)
             SET s.source = $source",
        );
        if date.is_some() {
            stmt.push_str(
                "
             CREATE (d:Date)
             SET d.day = $day, d.month = $month, d.year = $year",
            );
        }
        stmt.push_str(&format!(
            "
             WITH count(*) AS dummy
             MATCH (p:Post {{post_id: $post_id}}), (s:Source {{source: $source}})
             MERGE (p)-[:HAS_SOURCE]->(s)
             WITH count(*) AS dummy2
             MATCH (p:Post {{post_id: $post_id}}), (a:Account {{account_id: $account_id}})
             MERGE (a)-[:{edge}]->(p)"
        ));
        if date.is_some() {
            stmt.push_str(
                "
             WITH count(*) AS dummy3
             MATCH (p:Post {post_id: $post_id}), (d:Date {day: $day, month: $month, year: $year})
             MERGE (p)-[:DATED_OF]->(d)",
            );
        }
        stmt.push_str(
            "
             RETURN count(*) AS merged",
        );

        let mut q = query(&stmt)
            .param("post_id", post.post_id.as_str())
            .param("text", post.text.as_str())
            .param("created_at", post.created_at.as_str())
            .param("retweet_count", post.retweet_count)
            .param("favorite_count", post.favorite_count)
            .param("source", post.source.as_str())
            .param("account_id", account_id);
        if let Some(g) = geo {
            q = q.param("latitude", g.latitude).param("longitude", g.longitude);
        }
        if let Some(d) = date {
            q = q
                .param("day", d.day.as_str())
                .param("month", d.month.as_str())
                .param("year", d.year.as_str());
        }

        self.run_counting_merges(q).await
    }

    /// Merge a FRIEND edge between two existing Accounts. Merge-only: when
    /// either account is missing nothing is written and no error is raised.
    pub async fn add_friendship(
        &self,
        main_id: &str,
        other_id: &str,
    ) -> Result<WriteOutcome, GraphWriteError> {
        self.merge_account_edge(main_id, other_id, "FRIEND").await
    }

    /// Merge a FOLLOWS edge between two existing Accounts. Same merge-only
    /// contract as [`Self::add_friendship`].
    pub async fn add_following(
        &self,
        main_id: &str,
        other_id: &str,
    ) -> Result<WriteOutcome, GraphWriteError> {
        self.merge_account_edge(main_id, other_id, "FOLLOWS").await
    }

    async fn merge_account_edge(
        &self,
        main_id: &str,
        other_id: &str,
        edge: &str,
    ) -> Result<WriteOutcome, GraphWriteError> {
        let q = query(&format!(
            "MATCH (main:Account {{account_id: $main_id}}), (other:Account {{account_id: $other_id}})
             MERGE (main)<-[:{edge}]-(other)
             RETURN count(*) AS merged"
        ))
        .param("main_id", main_id)
        .param("other_id", other_id);

        let outcome = self.run_counting_merges(q).await?;
        if outcome == WriteOutcome::NoOp {
            info!(main_id, other_id, edge, "Edge merge matched no accounts, skipped");
        }
        Ok(outcome)
    }

    /// Create a Hashtag node unconditionally and merge the HAS_HASHTAG edge
    /// from the matching Post. The Hashtag node is created even when no Post
    /// matches (the merge is then a no-op).
    pub async fn add_hashtag(
        &self,
        post_id: &str,
        hashtag: &str,
    ) -> Result<WriteOutcome, GraphWriteError> {
        let q = query(
            "CREATE (h:Hashtag)
             SET h.hashtag = $hashtag
             WITH count(*) AS dummy
             MATCH (p:Post {post_id: $post_id}), (h:Hashtag {hashtag: $hashtag})
             MERGE (p)-[:HAS_HASHTAG]->(h)
             RETURN count(*) AS merged",
        )
        .param("post_id", post_id)
        .param("hashtag", hashtag);

        self.run_counting_merges(q).await
    }

    /// Run a write and read back the scalar merge count.
    async fn run_counting_merges(
        &self,
        q: neo4rs::Query,
    ) -> Result<WriteOutcome, GraphWriteError> {
        let mut stream = self.client.graph.execute(q).await?;
        let merged: i64 = match stream.next().await? {
            Some(row) => row.get("merged").unwrap_or(0),
            None => 0,
        };
        if merged > 0 {
            Ok(WriteOutcome::Applied)
        } else {
            Ok(WriteOutcome::NoOp)
        }
    }
}
