//! Syndication channel assembly for the latest posts.
//!
//! This service decides what a feed contains (channel metadata and items);
//! encoding it for the wire is left to the HTTP layer.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

use crate::application::repos::{CategoriesRepo, PostQuery, PostsRepo, RepoError};
use crate::application::site::SiteOptions;
use crate::domain::links::LinkBuilder;
use crate::domain::types::Audience;

#[derive(Debug, Error)]
pub enum SyndicationError {
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    pub link: String,
    pub categories: Vec<String>,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub id: i64,
    pub title: String,
    pub link: String,
    #[serde(with = "time::serde::rfc3339")]
    pub published: OffsetDateTime,
}

#[derive(Clone)]
pub struct SyndicationService {
    posts: Arc<dyn PostsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    links: Arc<dyn LinkBuilder>,
    options: Arc<SiteOptions>,
}

impl SyndicationService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        categories: Arc<dyn CategoriesRepo>,
        links: Arc<dyn LinkBuilder>,
        options: Arc<SiteOptions>,
    ) -> Self {
        Self {
            posts,
            categories,
            links,
            options,
        }
    }

    /// Latest public posts, optionally restricted to one category.
    pub async fn latest(&self, category_slug: Option<&str>) -> Result<FeedChannel, SyndicationError> {
        counter!("metablog_feed_requests_total").increment(1);
        let categories = self.categories.list_categories().await?;
        let mut query = PostQuery::with_statuses(Audience::Public.visible_statuses());

        let (title, description, link, category_names) = match category_slug {
            None => (
                self.options.site_title.clone(),
                self.options.feed_description.clone(),
                self.links.root(),
                categories
                    .iter()
                    .map(|category| category.long_name.clone())
                    .collect(),
            ),
            Some(slug) => {
                let category = categories
                    .iter()
                    .find(|category| category.tag.slug == slug)
                    .ok_or_else(|| SyndicationError::UnknownCategory(slug.to_string()))?;
                query = query.tagged(vec![category.tag.id]);
                (
                    format!("{} - {}", self.options.site_title, category.long_name),
                    format!("Articles related to {}.", category.long_name),
                    self.links.category(&category.tag.slug),
                    vec![category.long_name.clone()],
                )
            }
        };

        let limit = self.options.feed_item_limit.get() as u64;
        let items = self
            .posts
            .list_posts(&query, 0, limit)
            .await?
            .into_iter()
            .map(|post| FeedItem {
                id: post.id,
                link: self.links.article(&post.slug),
                title: post.title,
                published: post.post_date,
            })
            .collect();

        Ok(FeedChannel {
            title,
            description,
            link,
            categories: category_names,
            items,
        })
    }
}
