//! Shared page furniture: categories, archive tree, and blogroll.

use std::{sync::Arc, time::Instant};

use metrics::histogram;
use serde::Serialize;
use tracing::debug;

use crate::application::repos::{
    CategoriesRepo, LinksRepo, PostQuery, PostsRepo, RepoError, TagsRepo,
};
use crate::application::site::SiteOptions;
use crate::domain::archive::{self, Archive};
use crate::domain::entities::{CategoryRecord, LinkRecord};
use crate::domain::links::LinkBuilder;
use crate::domain::types::{Audience, PostStatus};

#[derive(Debug, Clone, Serialize)]
pub struct SiteChrome {
    pub site_title: String,
    pub root_uri: String,
    pub categories: Vec<CategoryRecord>,
    #[serde(skip)]
    pub visible_statuses: Vec<PostStatus>,
    /// `None` when there is nothing to archive yet.
    pub archive: Option<Archive>,
    pub blogroll: Vec<LinkRecord>,
}

#[derive(Clone)]
pub struct ChromeService {
    posts: Arc<dyn PostsRepo>,
    tags: Arc<dyn TagsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    links_repo: Arc<dyn LinksRepo>,
    links: Arc<dyn LinkBuilder>,
    options: Arc<SiteOptions>,
}

impl ChromeService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        tags: Arc<dyn TagsRepo>,
        categories: Arc<dyn CategoriesRepo>,
        links_repo: Arc<dyn LinksRepo>,
        links: Arc<dyn LinkBuilder>,
        options: Arc<SiteOptions>,
    ) -> Self {
        Self {
            posts,
            tags,
            categories,
            links_repo,
            links,
            options,
        }
    }

    pub async fn load(&self, audience: Audience) -> Result<SiteChrome, RepoError> {
        let categories = self.categories.list_categories().await?;
        let visible_statuses = audience.visible_statuses();

        let archive = self.build_archive(&visible_statuses).await?;
        let blogroll = match self.tags.find_by_slug(&self.options.blogroll_tag).await? {
            Some(tag) => self.links_repo.list_for_tag(tag.id).await?,
            None => Vec::new(),
        };

        Ok(SiteChrome {
            site_title: self.options.site_title.clone(),
            root_uri: self.links.root(),
            categories,
            visible_statuses,
            archive,
            blogroll,
        })
    }

    async fn build_archive(&self, statuses: &[PostStatus]) -> Result<Option<Archive>, RepoError> {
        let summaries = self
            .posts
            .list_summaries(&PostQuery::with_statuses(statuses.to_vec()))
            .await?;

        let started = Instant::now();
        let archive = archive::aggregate(&summaries, self.links.as_ref());
        histogram!("metablog_archive_build_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        debug!(
            target = "metablog::application::chrome",
            posts = summaries.len(),
            years = archive.as_ref().map_or(0, |archive| archive.years.len()),
            "archive aggregated"
        );

        Ok(archive)
    }
}
