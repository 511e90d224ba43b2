//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::{Month, OffsetDateTime};

use crate::domain::entities::{CategoryRecord, LinkRecord, PostRecord, PostSummary, TagRecord};
use crate::domain::types::PostStatus;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Selection of posts shared by listing, counting and archive queries.
///
/// Results are always ordered by post date descending, then id descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    /// Allowed statuses; an empty list matches nothing.
    pub statuses: Vec<PostStatus>,
    /// Tag ids; a post matches when it carries at least one of them.
    pub tag_ids: Vec<i64>,
    pub year: Option<i32>,
    /// Only honoured together with `year`.
    pub month: Option<Month>,
}

impl PostQuery {
    pub fn with_statuses(statuses: Vec<PostStatus>) -> Self {
        Self {
            statuses,
            ..Default::default()
        }
    }

    pub fn tagged(mut self, tag_ids: Vec<i64>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    pub fn in_period(mut self, year: i32, month: Option<Month>) -> Self {
        self.year = Some(year);
        self.month = month;
        self
    }

    /// In-memory evaluation of the filter; adapters without a query language use this.
    pub fn matches(&self, status: PostStatus, post_date: OffsetDateTime, tag_ids: &[i64]) -> bool {
        if !self.statuses.contains(&status) {
            return false;
        }
        if !self.tag_ids.is_empty() && !tag_ids.iter().any(|id| self.tag_ids.contains(id)) {
            return false;
        }
        if let Some(year) = self.year {
            if post_date.year() != year {
                return false;
            }
            if self.month.is_some_and(|month| post_date.month() != month) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub author: String,
    pub title: String,
    pub slug: String,
    pub status: PostStatus,
    pub post_date: OffsetDateTime,
    pub text: String,
    pub tag_ids: Vec<i64>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Lightweight projections for archive aggregation.
    async fn list_summaries(&self, query: &PostQuery) -> Result<Vec<PostSummary>, RepoError>;

    async fn count_posts(&self, query: &PostQuery) -> Result<u64, RepoError>;

    async fn list_posts(
        &self,
        query: &PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;
}

#[async_trait]
pub trait TagsRepo: Send + Sync {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError>;

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<TagRecord>, RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;
}

#[async_trait]
pub trait LinksRepo: Send + Sync {
    /// Links carrying the tag, ordered by rank ascending.
    async fn list_for_tag(&self, tag_id: i64) -> Result<Vec<LinkRecord>, RepoError>;
}
