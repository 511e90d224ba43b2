//! Post creation with permalink derivation.

use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::application::repos::{CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, TagsRepo};
use crate::domain::entities::PostRecord;
use crate::domain::error::DomainError;
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug_async};
use crate::domain::types::PostStatus;

const MAX_TITLE_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum AuthoringError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<SlugAsyncError<RepoError>> for AuthoringError {
    fn from(err: SlugAsyncError<RepoError>) -> Self {
        match err {
            SlugAsyncError::Slug(err) => AuthoringError::Slug(err),
            SlugAsyncError::Predicate(err) => AuthoringError::Repo(err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author: String,
    pub title: String,
    pub text: String,
    pub status: PostStatus,
    /// Defaults to the current time.
    pub post_date: Option<OffsetDateTime>,
    pub tag_slugs: Vec<String>,
}

#[derive(Clone)]
pub struct AuthoringService {
    posts: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    tags: Arc<dyn TagsRepo>,
}

impl AuthoringService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        tags: Arc<dyn TagsRepo>,
    ) -> Self {
        Self {
            posts,
            writer,
            tags,
        }
    }

    pub async fn create_post(&self, new: NewPost) -> Result<PostRecord, AuthoringError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title must not be empty").into());
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            ))
            .into());
        }

        let tag_ids = self.resolve_tags(&new.tag_slugs).await?;

        let posts = self.posts.clone();
        let slug = generate_unique_slug_async(title, |candidate| {
            let posts = posts.clone();
            let candidate = candidate.to_string();
            async move { posts.slug_exists(&candidate).await.map(|exists| !exists) }
        })
        .await?;

        let record = self
            .writer
            .create_post(CreatePostParams {
                author: new.author,
                title: title.to_string(),
                slug,
                status: new.status,
                post_date: new.post_date.unwrap_or_else(OffsetDateTime::now_utc),
                text: new.text,
                tag_ids,
            })
            .await?;

        info!(
            target = "metablog::application::authoring",
            post_id = record.id,
            slug = %record.slug,
            status = record.status.as_str(),
            "post created"
        );

        Ok(record)
    }

    async fn resolve_tags(&self, slugs: &[String]) -> Result<Vec<i64>, AuthoringError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }

        let known = self.tags.list_tags().await?;
        let mut tag_ids = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let Some(tag) = known.iter().find(|tag| &tag.slug == slug) else {
                let available: Vec<&str> = known.iter().map(|tag| tag.slug.as_str()).collect();
                return Err(DomainError::validation(format!(
                    "unknown tag `{slug}` (available: {})",
                    available.join(", ")
                ))
                .into());
            };
            if !tag_ids.contains(&tag.id) {
                tag_ids.push(tag.id);
            }
        }
        Ok(tag_ids)
    }
}
