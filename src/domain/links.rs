//! URI construction for archive buckets, articles, and categories.

use time::Month;

/// Resolves site URIs. Implementations must be pure: the same arguments always
/// produce the same URI.
pub trait LinkBuilder: Send + Sync {
    fn root(&self) -> String;

    fn year(&self, year: i32) -> String;

    fn month(&self, year: i32, month: Month) -> String;

    fn article(&self, slug: &str) -> String;

    fn category(&self, slug: &str) -> String;
}

/// Path-only URIs matching the public router, optionally mounted under a prefix.
#[derive(Debug, Clone, Default)]
pub struct SitePaths {
    base: String,
}

impl SitePaths {
    pub fn new(base_path: &str) -> Self {
        let base = base_path.trim().trim_end_matches('/');
        let base = if base.is_empty() || base.starts_with('/') {
            base.to_string()
        } else {
            format!("/{base}")
        };
        Self { base }
    }
}

impl LinkBuilder for SitePaths {
    fn root(&self) -> String {
        format!("{}/", self.base)
    }

    fn year(&self, year: i32) -> String {
        format!("{}/archive/{year}/", self.base)
    }

    fn month(&self, year: i32, month: Month) -> String {
        format!("{}/archive/{year}/{}/", self.base, u8::from(month))
    }

    fn article(&self, slug: &str) -> String {
        format!("{}/article/{slug}/", self.base)
    }

    fn category(&self, slug: &str) -> String {
        format!("{}/category/{slug}/", self.base)
    }
}
