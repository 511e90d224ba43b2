//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::types::PostStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub slug: String,
    #[serde(with = "time::serde::rfc3339")]
    pub post_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_date: OffsetDateTime,
    pub status: PostStatus,
    pub text: String,
}

impl PostRecord {
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            post_date: self.post_date,
            status: self.status,
        }
    }
}

/// Lightweight projection of a post used by archive aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(with = "time::serde::rfc3339")]
    pub post_date: OffsetDateTime,
    pub status: PostStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A tag promoted into site navigation under a longer display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub long_name: String,
    pub tag: TagRecord,
}

/// Outbound link, grouped by tag (the blogroll is one such group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub tag_id: i64,
    pub rank: i32,
}

/// Anything addressable by a post identifier.
pub trait PostIdentity {
    fn post_id(&self) -> i64;
}

impl PostIdentity for PostRecord {
    fn post_id(&self) -> i64 {
        self.id
    }
}

impl PostIdentity for PostSummary {
    fn post_id(&self) -> i64 {
        self.id
    }
}
