use anyhow::{Context, Result};
use tracing::{info, warn};

use aviary_common::{AccountRecord, GeoPoint, PostRecord};
use chirper_client::{Post, Profile};

use crate::extract::{normalize_source, split_date};
use crate::traits::{GraphSink, SocialApi};

/// Pagination safety bound. The API contract says cursor 0 ends a chain, but
/// that is an external invariant; a chain longer than this is assumed broken.
const MAX_CURSOR_PAGES: u32 = 200;

/// Crawl shape knobs, taken from [`aviary_common::Config`].
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub seed_handle: String,
    pub timeline_page_size: u32,
    /// Posts are only materialized in this language. Hashtags are written
    /// for every post regardless.
    pub filter_lang: String,
}

/// Stats from a crawl run.
#[derive(Debug, Default)]
pub struct CrawlStats {
    pub accounts_written: u32,
    pub posts_written: u32,
    pub retweets_written: u32,
    pub hashtags_written: u32,
    pub posts_skipped_lang: u32,
    pub dates_skipped: u32,
    pub writes_failed: u32,
    pub duplicates_swept: u64,
}

impl std::fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Crawl Complete ===")?;
        writeln!(f, "Accounts written:     {}", self.accounts_written)?;
        writeln!(f, "Posts written:        {}", self.posts_written)?;
        writeln!(f, "Retweets written:     {}", self.retweets_written)?;
        writeln!(f, "Hashtags written:     {}", self.hashtags_written)?;
        writeln!(f, "Posts skipped (lang): {}", self.posts_skipped_lang)?;
        writeln!(f, "Date links skipped:   {}", self.dates_skipped)?;
        writeln!(f, "Writes failed:        {}", self.writes_failed)?;
        writeln!(f, "Duplicates swept:     {}", self.duplicates_swept)?;
        Ok(())
    }
}

enum AccountEdge {
    Friend,
    Follower,
}

/// Drives the walk: enumerate the seed's friends and followers through
/// cursor pagination, normalize each discovered record, hand it to the sink,
/// and sweep duplicates after every fully processed account.
///
/// One account at a time, sequentially. Store-write failures are logged and
/// skipped; API failures abort the run.
pub struct Crawler {
    api: Box<dyn SocialApi>,
    sink: Box<dyn GraphSink>,
    opts: CrawlOptions,
    stats: CrawlStats,
}

impl Crawler {
    pub fn new(api: Box<dyn SocialApi>, sink: Box<dyn GraphSink>, opts: CrawlOptions) -> Self {
        Self {
            api,
            sink,
            opts,
            stats: CrawlStats::default(),
        }
    }

    /// Run a full crawl: seed account, friend pass, follower pass.
    pub async fn run(&mut self) -> Result<CrawlStats> {
        let seed = self
            .api
            .get_profile(&self.opts.seed_handle)
            .await
            .context("fetching seed profile")?;
        info!(handle = seed.screen_name.as_str(), id = seed.id, "Crawling seed account");

        self.write_account(&seed).await;
        self.write_timeline(&seed).await?;

        self.friend_pass(&seed).await?;
        self.follower_pass(&seed).await?;

        Ok(std::mem::take(&mut self.stats))
    }

    async fn friend_pass(&mut self, seed: &Profile) -> Result<()> {
        let seed_id = seed.id.to_string();
        let mut cursor = -1i64;
        let mut pages = 0u32;

        loop {
            let page = self
                .api
                .get_friend_ids(&seed.screen_name, cursor)
                .await
                .context("fetching friend ids")?;

            for id in &page.ids {
                let profile = self
                    .api
                    .get_profile_by_id(*id)
                    .await
                    .context("fetching friend profile")?;
                self.process_account(&seed_id, &profile, AccountEdge::Friend)
                    .await?;
            }

            cursor = page.next_cursor;
            if cursor == 0 {
                break;
            }
            pages += 1;
            if pages >= MAX_CURSOR_PAGES {
                warn!(pages, "Friend cursor chain never terminated, stopping pass");
                break;
            }
        }
        Ok(())
    }

    async fn follower_pass(&mut self, seed: &Profile) -> Result<()> {
        let seed_id = seed.id.to_string();
        let mut cursor = -1i64;
        let mut pages = 0u32;

        loop {
            let page = self
                .api
                .get_follower_ids(seed.id, cursor)
                .await
                .context("fetching follower ids")?;

            for id in &page.ids {
                let profile = self
                    .api
                    .get_profile_by_id(*id)
                    .await
                    .context("fetching follower profile")?;
                self.process_account(&seed_id, &profile, AccountEdge::Follower)
                    .await?;
            }

            cursor = page.next_cursor;
            if cursor == 0 {
                break;
            }
            pages += 1;
            if pages >= MAX_CURSOR_PAGES {
                warn!(pages, "Follower cursor chain never terminated, stopping pass");
                break;
            }
        }
        Ok(())
    }

    /// Full handling of one discovered account: profile, edge to the seed,
    /// timeline, then a sweep across all labels before the next account.
    async fn process_account(
        &mut self,
        seed_id: &str,
        profile: &Profile,
        edge: AccountEdge,
    ) -> Result<()> {
        // Accounts that never posted are not materialized.
        if profile.status.is_none() {
            return Ok(());
        }

        self.write_account(profile).await;

        let other_id = profile.id.to_string();
        let edge_result = match edge {
            AccountEdge::Friend => self.sink.add_friendship(seed_id, &other_id).await,
            AccountEdge::Follower => self.sink.add_following(seed_id, &other_id).await,
        };
        if let Err(e) = edge_result {
            warn!(seed_id, other_id = other_id.as_str(), "Edge write failed, skipping: {e:#}");
            self.stats.writes_failed += 1;
        }

        self.write_timeline(profile).await?;

        match self.sink.sweep_all().await {
            Ok(swept) => self.stats.duplicates_swept += swept.total(),
            Err(e) => {
                warn!("Dedup sweep failed, continuing: {e:#}");
                self.stats.writes_failed += 1;
            }
        }
        Ok(())
    }

    async fn write_account(&mut self, profile: &Profile) {
        let record = AccountRecord {
            account_id: profile.id.to_string(),
            handle: profile.screen_name.clone(),
            description: profile.description.clone().unwrap_or_default(),
            friend_count: profile.friends_count,
            follower_count: profile.followers_count,
            favorite_count: profile.favourites_count,
            verified: profile.verified,
        };
        let location = profile.location.clone().unwrap_or_default();

        match self.sink.create_account(&record, &location).await {
            Ok(_) => self.stats.accounts_written += 1,
            Err(e) => {
                warn!(account_id = record.account_id.as_str(), "Account write failed, skipping: {e:#}");
                self.stats.writes_failed += 1;
            }
        }
    }

    async fn write_timeline(&mut self, profile: &Profile) -> Result<()> {
        let posts = self
            .api
            .get_timeline(&profile.screen_name, self.opts.timeline_page_size)
            .await
            .context("fetching timeline")?;

        let account_id = profile.id.to_string();
        for post in &posts {
            self.write_post(&account_id, post).await;
        }
        Ok(())
    }

    /// Normalize one post and route it to one of the four write paths on
    /// (has geolocation x is retweet). Hashtags are written for every post,
    /// including those filtered out by language.
    async fn write_post(&mut self, account_id: &str, post: &Post) {
        let record = PostRecord {
            post_id: post.id.to_string(),
            text: post.text.clone(),
            created_at: post.created_at.clone(),
            retweet_count: post.retweet_count,
            favorite_count: post.favorite_count,
            source: normalize_source(&post.source),
        };

        let date = match split_date(&post.created_at) {
            Ok(parts) => Some(parts),
            Err(e) => {
                warn!(post_id = record.post_id.as_str(), "Skipping date link: {e}");
                self.stats.dates_skipped += 1;
                None
            }
        };

        if post.lang.as_deref() == Some(self.opts.filter_lang.as_str()) {
            let geo = post.geo.map(|g| GeoPoint {
                latitude: g.latitude,
                longitude: g.longitude,
            });
            let is_retweet = post.is_retweet();
            let result = match (geo, is_retweet) {
                (Some(g), true) => {
                    self.sink
                        .create_retweet_geolocated(account_id, &record, g, date.as_ref())
                        .await
                }
                (Some(g), false) => {
                    self.sink
                        .create_post_geolocated(account_id, &record, g, date.as_ref())
                        .await
                }
                (None, true) => self.sink.create_retweet(account_id, &record, date.as_ref()).await,
                (None, false) => self.sink.create_post(account_id, &record, date.as_ref()).await,
            };
            match result {
                Ok(_) if is_retweet => self.stats.retweets_written += 1,
                Ok(_) => self.stats.posts_written += 1,
                Err(e) => {
                    warn!(post_id = record.post_id.as_str(), "Post write failed, skipping: {e:#}");
                    self.stats.writes_failed += 1;
                }
            }
        } else {
            self.stats.posts_skipped_lang += 1;
        }

        for tag in &post.entities.hashtags {
            match self.sink.add_hashtag(&record.post_id, &tag.text).await {
                Ok(_) => self.stats.hashtags_written += 1,
                Err(e) => {
                    warn!(post_id = record.post_id.as_str(), tag = tag.text.as_str(), "Hashtag write failed, skipping: {e:#}");
                    self.stats.writes_failed += 1;
                }
            }
        }
    }
}
