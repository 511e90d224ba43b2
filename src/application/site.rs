//! Site-wide presentation options resolved from configuration.

use std::num::NonZeroUsize;

use crate::config::BlogSettings;

pub const DEFAULT_SITE_TITLE: &str = "metablog";
pub const DEFAULT_FEED_DESCRIPTION: &str = "Latest articles.";
pub const DEFAULT_BLOGROLL_TAG: &str = "favorite-blog";
pub const DEFAULT_PER_PAGE_COUNT: NonZeroUsize = non_zero(5);
pub const DEFAULT_FEED_ITEM_LIMIT: NonZeroUsize = non_zero(10);

const fn non_zero(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(value) => value,
        None => NonZeroUsize::MIN,
    }
}

#[derive(Debug, Clone)]
pub struct SiteOptions {
    pub site_title: String,
    pub feed_description: String,
    pub per_page_count: NonZeroUsize,
    pub feed_item_limit: NonZeroUsize,
    /// Slug of the tag whose links form the blogroll.
    pub blogroll_tag: String,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            site_title: DEFAULT_SITE_TITLE.to_string(),
            feed_description: DEFAULT_FEED_DESCRIPTION.to_string(),
            per_page_count: DEFAULT_PER_PAGE_COUNT,
            feed_item_limit: DEFAULT_FEED_ITEM_LIMIT,
            blogroll_tag: DEFAULT_BLOGROLL_TAG.to_string(),
        }
    }
}

impl From<&BlogSettings> for SiteOptions {
    fn from(settings: &BlogSettings) -> Self {
        Self {
            site_title: settings.site_title.clone(),
            feed_description: settings.feed_description.clone(),
            per_page_count: settings.per_page_count,
            feed_item_limit: settings.feed_item_limit,
            blogroll_tag: settings.blogroll_tag.clone(),
        }
    }
}
