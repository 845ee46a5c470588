// Trait seams for the crawler's collaborators.
//
// SocialApi fronts the Chirper HTTP client; GraphSink fronts the Neo4j
// writer and sweeper. Both enable deterministic routing tests with
// in-memory fakes: no network, no database, no Docker.

use anyhow::Result;
use async_trait::async_trait;

use aviary_common::{AccountRecord, DateParts, GeoPoint, PostRecord};
use aviary_graph::{DedupSweeper, GraphClient, GraphWriter, SweepStats, WriteOutcome};
use chirper_client::{ChirperClient, IdPage, Post, Profile};

#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Fetch an account profile by handle.
    async fn get_profile(&self, handle: &str) -> Result<Profile>;

    /// Fetch an account profile by numeric id.
    async fn get_profile_by_id(&self, id: u64) -> Result<Profile>;

    /// Fetch up to `page_size` most recent posts. Single page only.
    async fn get_timeline(&self, handle: &str, page_size: u32) -> Result<Vec<Post>>;

    /// Fetch one page of friend ids. Cursor 0 in the response ends pagination.
    async fn get_friend_ids(&self, handle: &str, cursor: i64) -> Result<IdPage>;

    /// Fetch one page of follower ids. Cursor 0 in the response ends pagination.
    async fn get_follower_ids(&self, id: u64, cursor: i64) -> Result<IdPage>;
}

#[async_trait]
impl SocialApi for ChirperClient {
    async fn get_profile(&self, handle: &str) -> Result<Profile> {
        Ok(ChirperClient::get_profile(self, handle).await?)
    }

    async fn get_profile_by_id(&self, id: u64) -> Result<Profile> {
        Ok(ChirperClient::get_profile_by_id(self, id).await?)
    }

    async fn get_timeline(&self, handle: &str, page_size: u32) -> Result<Vec<Post>> {
        Ok(ChirperClient::get_timeline(self, handle, page_size).await?)
    }

    async fn get_friend_ids(&self, handle: &str, cursor: i64) -> Result<IdPage> {
        Ok(ChirperClient::get_friend_ids(self, handle, cursor).await?)
    }

    async fn get_follower_ids(&self, id: u64, cursor: i64) -> Result<IdPage> {
        Ok(ChirperClient::get_follower_ids(self, id, cursor).await?)
    }
}

#[async_trait]
pub trait GraphSink: Send + Sync {
    async fn create_account(&self, account: &AccountRecord, location: &str)
        -> Result<WriteOutcome>;

    async fn create_post(
        &self,
        account_id: &str,
        post: &PostRecord,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome>;

    async fn create_post_geolocated(
        &self,
        account_id: &str,
        post: &PostRecord,
        geo: GeoPoint,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome>;

    async fn create_retweet(
        &self,
        account_id: &str,
        post: &PostRecord,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome>;

    async fn create_retweet_geolocated(
        &self,
        account_id: &str,
        post: &PostRecord,
        geo: GeoPoint,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome>;

    async fn add_friendship(&self, main_id: &str, other_id: &str) -> Result<WriteOutcome>;

    async fn add_following(&self, main_id: &str, other_id: &str) -> Result<WriteOutcome>;

    async fn add_hashtag(&self, post_id: &str, tag: &str) -> Result<WriteOutcome>;

    async fn sweep_all(&self) -> Result<SweepStats>;
}

/// Production sink: the append-only writer plus the dedup sweeper, both over
/// one shared connection.
pub struct Neo4jSink {
    writer: GraphWriter,
    sweeper: DedupSweeper,
}

impl Neo4jSink {
    pub fn new(client: GraphClient) -> Self {
        Self {
            writer: GraphWriter::new(client.clone()),
            sweeper: DedupSweeper::new(client),
        }
    }
}

#[async_trait]
impl GraphSink for Neo4jSink {
    async fn create_account(
        &self,
        account: &AccountRecord,
        location: &str,
    ) -> Result<WriteOutcome> {
        Ok(self.writer.create_account(account, location).await?)
    }

    async fn create_post(
        &self,
        account_id: &str,
        post: &PostRecord,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome> {
        Ok(self.writer.create_post(account_id, post, date).await?)
    }

    async fn create_post_geolocated(
        &self,
        account_id: &str,
        post: &PostRecord,
        geo: GeoPoint,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome> {
        Ok(self
            .writer
            .create_post_geolocated(account_id, post, geo, date)
            .await?)
    }

    async fn create_retweet(
        &self,
        account_id: &str,
        post: &PostRecord,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome> {
        Ok(self.writer.create_retweet(account_id, post, date).await?)
    }

    async fn create_retweet_geolocated(
        &self,
        account_id: &str,
        post: &PostRecord,
        geo: GeoPoint,
        date: Option<&DateParts>,
    ) -> Result<WriteOutcome> {
        Ok(self
            .writer
            .create_retweet_geolocated(account_id, post, geo, date)
            .await?)
    }

    async fn add_friendship(&self, main_id: &str, other_id: &str) -> Result<WriteOutcome> {
        Ok(self.writer.add_friendship(main_id, other_id).await?)
    }

    async fn add_following(&self, main_id: &str, other_id: &str) -> Result<WriteOutcome> {
        Ok(self.writer.add_following(main_id, other_id).await?)
    }

    async fn add_hashtag(&self, post_id: &str, tag: &str) -> Result<WriteOutcome> {
        Ok(self.writer.add_hashtag(post_id, tag).await?)
    }

    async fn sweep_all(&self) -> Result<SweepStats> {
        Ok(self.sweeper.sweep_all().await?)
    }
}
