use serde::{Deserialize, Serialize};

/// One account as written to the graph. Natural key: `account_id`.
///
/// A fresh snapshot of these attributes is taken every time the account is
/// observed; nodes are never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    pub handle: String,
    pub description: String,
    pub friend_count: i64,
    pub follower_count: i64,
    pub favorite_count: i64,
    pub verified: bool,
}

/// One post as written to the graph. Natural key: `post_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub post_id: String,
    pub text: String,
    /// Raw fixed-width creation timestamp, stored verbatim on the node.
    pub created_at: String,
    pub retweet_count: i64,
    pub favorite_count: i64,
    /// Client application name, markup already stripped.
    pub source: String,
}

/// Latitude/longitude attached to geolocated posts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Calendar parts split out of a post timestamp.
/// The (day, month, year) triple is the natural key of a Date node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    pub day: String,
    pub month: String,
    pub year: String,
}
