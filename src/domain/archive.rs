//! Year → month → article archive tree.
//!
//! [`aggregate`] folds a date-descending run of [`PostSummary`] values into an
//! [`Archive`] in a single pass. Buckets are opened lazily when the first post
//! of a new year or month is seen and closed when the next bucket opens, so
//! every year holds at least one month and every month at least one article.
//! Bucket order is encounter order; the aggregator never sorts.

use serde::Serialize;
use time::{Month, OffsetDateTime};

use crate::domain::entities::PostSummary;
use crate::domain::links::LinkBuilder;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archive {
    #[serde(rename = "archives")]
    pub years: Vec<YearArchive>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearArchive {
    pub key: String,
    pub uri: String,
    pub count: usize,
    #[serde(rename = "archives")]
    pub months: Vec<MonthArchive>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthArchive {
    pub key: String,
    pub uri: String,
    pub count: usize,
    pub articles: Vec<ArticleRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRef {
    pub title: String,
    pub uri: String,
    #[serde(with = "time::serde::timestamp")]
    pub date: OffsetDateTime,
    pub id: i64,
}

impl Archive {
    /// Total number of articles across every bucket.
    pub fn article_count(&self) -> usize {
        self.years.iter().map(|year| year.count).sum()
    }
}

/// Build the archive tree for `posts`, which must already be ordered by date
/// descending with a deterministic tiebreak.
///
/// Returns `None` when `posts` is empty.
pub fn aggregate<L>(posts: &[PostSummary], links: &L) -> Option<Archive>
where
    L: LinkBuilder + ?Sized,
{
    let mut years = Vec::new();
    let mut open_year: Option<OpenYear> = None;

    for post in posts {
        let year = post.post_date.year();
        let current = match open_year.take() {
            Some(open) if open.year == year => open_year.insert(open),
            previous => {
                if let Some(done) = previous {
                    years.push(done.close());
                }
                open_year.insert(OpenYear::open(year, links))
            }
        };
        current.push(post, links);
    }

    if let Some(done) = open_year {
        years.push(done.close());
    }

    if years.is_empty() {
        None
    } else {
        Some(Archive { years })
    }
}

struct OpenYear {
    year: i32,
    key: String,
    uri: String,
    months: Vec<MonthArchive>,
    open_month: Option<OpenMonth>,
}

impl OpenYear {
    fn open<L: LinkBuilder + ?Sized>(year: i32, links: &L) -> Self {
        Self {
            year,
            key: year.to_string(),
            uri: links.year(year),
            months: Vec::new(),
            open_month: None,
        }
    }

    fn push<L: LinkBuilder + ?Sized>(&mut self, post: &PostSummary, links: &L) {
        let month = post.post_date.month();
        let current = match self.open_month.take() {
            Some(open) if open.month == month => self.open_month.insert(open),
            previous => {
                if let Some(done) = previous {
                    self.months.push(done.close());
                }
                self.open_month
                    .insert(OpenMonth::open(self.year, month, links))
            }
        };

        current.articles.push(ArticleRef {
            title: post.title.clone(),
            uri: links.article(&post.slug),
            date: post.post_date,
            id: post.id,
        });
    }

    fn close(mut self) -> YearArchive {
        if let Some(done) = self.open_month.take() {
            self.months.push(done.close());
        }
        let count = self.months.iter().map(|month| month.count).sum();
        YearArchive {
            key: self.key,
            uri: self.uri,
            count,
            months: self.months,
        }
    }
}

struct OpenMonth {
    month: Month,
    key: String,
    uri: String,
    articles: Vec<ArticleRef>,
}

impl OpenMonth {
    fn open<L: LinkBuilder + ?Sized>(year: i32, month: Month, links: &L) -> Self {
        Self {
            month,
            key: month.to_string(),
            uri: links.month(year, month),
            articles: Vec::new(),
        }
    }

    fn close(self) -> MonthArchive {
        MonthArchive {
            key: self.key,
            uri: self.uri,
            count: self.articles.len(),
            articles: self.articles,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use time::macros::datetime;

    use super::*;
    use crate::domain::links::SitePaths;
    use crate::domain::types::PostStatus;

    fn post(id: i64, date: OffsetDateTime) -> PostSummary {
        PostSummary {
            id,
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            post_date: date,
            status: PostStatus::Published,
        }
    }

    fn sample_posts() -> Vec<PostSummary> {
        vec![
            post(7, datetime!(2013-02-10 09:00 UTC)),
            post(6, datetime!(2013-01-22 18:30 UTC)),
            post(5, datetime!(2013-01-03 07:15 UTC)),
            post(4, datetime!(2012-12-31 23:59 UTC)),
            post(3, datetime!(2012-06-01 12:00 UTC)),
            post(2, datetime!(2012-06-01 12:00 UTC)),
            post(1, datetime!(2011-03-14 08:00 UTC)),
        ]
    }

    #[derive(Default)]
    struct RecordingLinks {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingLinks {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl LinkBuilder for RecordingLinks {
        fn root(&self) -> String {
            "/".to_string()
        }

        fn year(&self, year: i32) -> String {
            let uri = format!("y{year}");
            self.calls.lock().expect("calls lock").push(uri.clone());
            uri
        }

        fn month(&self, year: i32, month: Month) -> String {
            let uri = format!("m{year}-{}", u8::from(month));
            self.calls.lock().expect("calls lock").push(uri.clone());
            uri
        }

        fn article(&self, slug: &str) -> String {
            format!("a-{slug}")
        }

        fn category(&self, slug: &str) -> String {
            format!("c-{slug}")
        }
    }

    #[test]
    fn empty_input_has_no_archive() {
        assert_eq!(aggregate(&[], &SitePaths::default()), None);
    }

    #[test]
    fn buckets_follow_encounter_order() {
        let archive = aggregate(&sample_posts(), &SitePaths::default()).expect("archive");

        let years: Vec<&str> = archive.years.iter().map(|y| y.key.as_str()).collect();
        assert_eq!(years, ["2013", "2012", "2011"]);

        let months_2013: Vec<&str> = archive.years[0]
            .months
            .iter()
            .map(|m| m.key.as_str())
            .collect();
        assert_eq!(months_2013, ["February", "January"]);

        let months_2012: Vec<&str> = archive.years[1]
            .months
            .iter()
            .map(|m| m.key.as_str())
            .collect();
        assert_eq!(months_2012, ["December", "June"]);

        let june_ids: Vec<i64> = archive.years[1].months[1]
            .articles
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(june_ids, [3, 2]);
    }

    #[test]
    fn counts_sum_to_input_length() {
        let posts = sample_posts();
        let archive = aggregate(&posts, &SitePaths::default()).expect("archive");

        assert_eq!(archive.article_count(), posts.len());
        for year in &archive.years {
            let month_total: usize = year.months.iter().map(|m| m.count).sum();
            assert_eq!(year.count, month_total);
            for month in &year.months {
                assert_eq!(month.count, month.articles.len());
            }
        }

        let counts: Vec<usize> = archive.years.iter().map(|y| y.count).collect();
        assert_eq!(counts, [3, 3, 1]);
    }

    #[test]
    fn no_bucket_is_empty() {
        let archive = aggregate(&sample_posts(), &SitePaths::default()).expect("archive");
        for year in &archive.years {
            assert!(!year.months.is_empty(), "year {} has no months", year.key);
            for month in &year.months {
                assert!(!month.articles.is_empty(), "month {} is empty", month.key);
            }
        }
    }

    #[test]
    fn single_post_yields_single_path() {
        let archive = aggregate(
            &[post(1, datetime!(2010-09-05 10:00 UTC))],
            &SitePaths::default(),
        )
        .expect("archive");

        assert_eq!(archive.years.len(), 1);
        let year = &archive.years[0];
        assert_eq!(year.key, "2010");
        assert_eq!(year.uri, "/archive/2010/");
        assert_eq!(year.count, 1);
        assert_eq!(year.months.len(), 1);
        let month = &year.months[0];
        assert_eq!(month.key, "September");
        assert_eq!(month.uri, "/archive/2010/9/");
        assert_eq!(month.articles[0].uri, "/article/post-1/");
        assert_eq!(month.articles[0].title, "Post 1");
    }

    #[test]
    fn same_month_in_different_years_opens_new_buckets() {
        let posts = vec![
            post(2, datetime!(2012-05-01 00:00 UTC)),
            post(1, datetime!(2011-05-01 00:00 UTC)),
        ];
        let archive = aggregate(&posts, &SitePaths::default()).expect("archive");

        assert_eq!(archive.years.len(), 2);
        assert_eq!(archive.years[0].months[0].uri, "/archive/2012/5/");
        assert_eq!(archive.years[1].months[0].uri, "/archive/2011/5/");
    }

    #[test]
    fn link_builder_called_once_per_boundary() {
        let links = RecordingLinks::default();
        aggregate(&sample_posts(), &links).expect("archive");

        assert_eq!(
            links.calls(),
            [
                "y2013", "m2013-2", "m2013-1", "y2012", "m2012-12", "m2012-6", "y2011", "m2011-3",
            ]
        );
    }

    #[test]
    fn aggregation_is_deterministic() {
        let posts = sample_posts();
        let links = SitePaths::default();
        assert_eq!(aggregate(&posts, &links), aggregate(&posts, &links));
    }

    #[test]
    fn serializes_nested_archives() {
        let archive = aggregate(
            &[post(9, datetime!(2012-03-04 05:06:07 UTC))],
            &SitePaths::default(),
        )
        .expect("archive");
        let value = serde_json::to_value(&archive).expect("serialize archive");

        let month = &value["archives"][0]["archives"][0];
        assert_eq!(value["archives"][0]["key"], "2012");
        assert_eq!(value["archives"][0]["count"], 1);
        assert_eq!(month["key"], "March");
        assert_eq!(month["articles"][0]["id"], 9);
        assert_eq!(
            month["articles"][0]["date"],
            datetime!(2012-03-04 05:06:07 UTC).unix_timestamp()
        );
    }
}
