use serde::Deserialize;

/// Account profile as returned by `users/show`.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub screen_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub friends_count: i64,
    pub followers_count: i64,
    pub favourites_count: i64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub location: Option<String>,
    /// Most recent post. Absent for accounts that have never posted.
    #[serde(default)]
    pub status: Option<Post>,
}

/// One post as returned by `statuses/user_timeline`.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: u64,
    pub text: String,
    /// Fixed-width creation timestamp, e.g. "Mon Apr 01 12:30:45 CET 2019".
    pub created_at: String,
    #[serde(default)]
    pub retweet_count: i64,
    #[serde(default)]
    pub favorite_count: i64,
    #[serde(default)]
    pub lang: Option<String>,
    /// Client application, delivered as an HTML anchor.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub geo: Option<GeoPoint>,
    #[serde(default)]
    pub entities: Entities,
    /// Present when this post is a retweet of another post.
    #[serde(default)]
    pub retweeted_status: Option<Box<Post>>,
}

impl Post {
    pub fn is_retweet(&self) -> bool {
        self.retweeted_status.is_some()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<HashtagEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashtagEntity {
    pub text: String,
}

/// One page of friend/follower ids plus the cursor for the next page.
/// `next_cursor == 0` marks the end of pagination.
#[derive(Debug, Clone, Deserialize)]
pub struct IdPage {
    pub ids: Vec<u64>,
    pub next_cursor: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_without_status_deserializes() {
        let json = r#"{
            "id": 42,
            "screen_name": "quiet_account",
            "friends_count": 3,
            "followers_count": 7,
            "favourites_count": 0
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.screen_name, "quiet_account");
        assert!(profile.status.is_none());
        assert!(!profile.verified);
    }

    #[test]
    fn retweet_is_detected_from_embedded_status() {
        let json = r#"{
            "id": 2,
            "text": "RT @x: hello",
            "created_at": "Mon Apr 01 12:30:45 CET 2019",
            "entities": { "hashtags": [{ "text": "hello" }] },
            "retweeted_status": {
                "id": 1,
                "text": "hello",
                "created_at": "Mon Apr 01 11:00:00 CET 2019"
            }
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(post.is_retweet());
        assert_eq!(post.entities.hashtags[0].text, "hello");
    }

    #[test]
    fn id_page_carries_cursor() {
        let json = r#"{ "ids": [1, 2, 3], "next_cursor": 1374004777531007833 }"#;
        let page: IdPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.ids.len(), 3);
        assert_ne!(page.next_cursor, 0);
    }
}
