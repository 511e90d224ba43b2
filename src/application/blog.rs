//! Reader-facing listings: home, category, date archive, and single article.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use time::{Date, Month, format_description::FormatItem, macros::format_description};
use tracing::{debug, warn};

use crate::application::chrome::{ChromeService, SiteChrome};
use crate::application::pagination::{PageWindow, WindowPlan};
use crate::application::repos::{PostQuery, PostsRepo, RepoError, TagsRepo};
use crate::application::site::SiteOptions;
use crate::domain::entities::{CategoryRecord, PostRecord, TagRecord};
use crate::domain::types::Audience;

const MONTH_LABEL_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [year]");

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("post not found")]
    NotFound,
    #[error("invalid archive period `{0}`")]
    InvalidPeriod(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Year or year/month an archive listing is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchivePeriod {
    pub year: i32,
    pub month: Option<u8>,
    pub label: String,
}

impl ArchivePeriod {
    pub fn new(year: i32, month: Option<u8>) -> Result<Self, BlogError> {
        let invalid = || BlogError::InvalidPeriod(format_period(year, month));
        let label = match month {
            None => {
                Date::from_calendar_date(year, Month::January, 1).map_err(|_| invalid())?;
                year.to_string()
            }
            Some(number) => {
                let month = Month::try_from(number).map_err(|_| invalid())?;
                Date::from_calendar_date(year, month, 1)
                    .map_err(|_| invalid())?
                    .format(MONTH_LABEL_FORMAT)
                    .map_err(|_| invalid())?
            }
        };
        Ok(Self { year, month, label })
    }

    fn month(&self) -> Option<Month> {
        self.month.and_then(|number| Month::try_from(number).ok())
    }
}

fn format_period(year: i32, month: Option<u8>) -> String {
    match month {
        Some(month) => format!("{year}/{month}"),
        None => year.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingContext {
    pub chrome: SiteChrome,
    pub selected_category: Option<CategoryRecord>,
    pub archive_period: Option<ArchivePeriod>,
    pub posts: PageWindow<PostRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleContext {
    pub chrome: SiteChrome,
    pub post: PostRecord,
    pub tags: Vec<TagRecord>,
    pub first_post_id: i64,
}

#[derive(Clone)]
pub struct BlogService {
    posts: Arc<dyn PostsRepo>,
    tags: Arc<dyn TagsRepo>,
    chrome: ChromeService,
    options: Arc<SiteOptions>,
}

impl BlogService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        tags: Arc<dyn TagsRepo>,
        chrome: ChromeService,
        options: Arc<SiteOptions>,
    ) -> Self {
        Self {
            posts,
            tags,
            chrome,
            options,
        }
    }

    /// Front page, optionally narrowed to a category or tag slug.
    ///
    /// A slug matching neither a category nor a tag falls back to the
    /// unfiltered listing.
    pub async fn home(
        &self,
        audience: Audience,
        category_slug: Option<&str>,
        start: i64,
    ) -> Result<ListingContext, BlogError> {
        counter!("metablog_listing_requests_total", "listing" => "home").increment(1);
        let chrome = self.chrome.load(audience).await?;

        let mut query = PostQuery::with_statuses(chrome.visible_statuses.clone());
        let mut selected_category = None;

        if let Some(slug) = category_slug {
            if let Some(category) = chrome
                .categories
                .iter()
                .find(|category| category.tag.slug == slug)
            {
                query = query.tagged(vec![category.tag.id]);
                selected_category = Some(category.clone());
            } else if let Some(tag) = self.tags.find_by_slug(slug).await? {
                query = query.tagged(vec![tag.id]);
            } else {
                warn!(
                    target = "metablog::application::blog",
                    slug, "no category or tag matches slug; listing all posts"
                );
            }
        }

        let posts = self.page(&query, start).await?;
        Ok(ListingContext {
            chrome,
            selected_category,
            archive_period: None,
            posts,
        })
    }

    /// Posts from one year, or one month of a year.
    pub async fn archive(
        &self,
        audience: Audience,
        year: i32,
        month: Option<u8>,
        start: i64,
    ) -> Result<ListingContext, BlogError> {
        counter!("metablog_listing_requests_total", "listing" => "archive").increment(1);
        let period = ArchivePeriod::new(year, month)?;
        let chrome = self.chrome.load(audience).await?;

        let query = PostQuery::with_statuses(chrome.visible_statuses.clone())
            .in_period(period.year, period.month());
        let posts = self.page(&query, start).await?;

        Ok(ListingContext {
            chrome,
            selected_category: None,
            archive_period: Some(period),
            posts,
        })
    }

    /// A single post by slug; posts hidden from the audience are not found.
    pub async fn article(&self, audience: Audience, slug: &str) -> Result<ArticleContext, BlogError> {
        counter!("metablog_listing_requests_total", "listing" => "article").increment(1);
        if slug.trim().is_empty() {
            return Err(BlogError::NotFound);
        }

        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or(BlogError::NotFound)?;
        if !audience.can_see(post.status) {
            debug!(
                target = "metablog::application::blog",
                slug,
                status = post.status.as_str(),
                "post not visible to audience"
            );
            return Err(BlogError::NotFound);
        }

        let chrome = self.chrome.load(audience).await?;
        let tags = self.tags.list_for_post(post.id).await?;

        Ok(ArticleContext {
            chrome,
            first_post_id: post.id,
            post,
            tags,
        })
    }

    async fn page(&self, query: &PostQuery, start: i64) -> Result<PageWindow<PostRecord>, RepoError> {
        let total = self.posts.count_posts(query).await?;
        let total = usize::try_from(total).unwrap_or(usize::MAX);

        let Some(plan) = WindowPlan::compute(total, start, self.options.per_page_count.get()) else {
            return Ok(PageWindow::empty());
        };

        let items = self
            .posts
            .list_posts(query, plan.start as u64, plan.len() as u64)
            .await?;

        debug!(
            target = "metablog::application::blog",
            total,
            start = plan.start,
            returned = items.len(),
            "page windowed"
        );

        Ok(PageWindow::from_plan(plan, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_period_has_human_label() {
        let period = ArchivePeriod::new(2012, Some(3)).expect("period");
        assert_eq!(period.label, "March 2012");
        assert_eq!(period.month(), Some(Month::March));
    }

    #[test]
    fn year_period_uses_bare_year() {
        let period = ArchivePeriod::new(2011, None).expect("period");
        assert_eq!(period.label, "2011");
        assert_eq!(period.month(), None);
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        let err = ArchivePeriod::new(2012, Some(13)).expect_err("invalid month");
        assert!(matches!(err, BlogError::InvalidPeriod(ref value) if value == "2012/13"));
        assert!(ArchivePeriod::new(2012, Some(0)).is_err());
    }
}
