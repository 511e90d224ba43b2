mod support;

use metablog::application::authoring::{AuthoringError, NewPost};
use metablog::application::blog::BlogError;
use metablog::application::syndication::SyndicationError;
use metablog::domain::slug::MAX_SLUG_LEN;
use metablog::domain::types::{Audience, PostStatus};
use time::macros::datetime;

use support::{publish, seeded_site};

fn titles<T>(items: &[T], title: impl Fn(&T) -> &str) -> Vec<String> {
    items.iter().map(|item| title(item).to_string()).collect()
}

#[tokio::test]
async fn home_pages_through_public_posts_newest_first() {
    let site = seeded_site().await;

    let first = site
        .blog
        .home(Audience::Public, None, 0)
        .await
        .expect("home page");
    assert_eq!(
        titles(&first.posts.items, |post| post.title.as_str()),
        ["Members only", "Closed post", "May post", "March two", "March one"]
    );
    assert_eq!(first.posts.next_offset, None);
    assert_eq!(first.posts.prev_offset, Some(5));
    assert_eq!(
        first.posts.first_item_id,
        first.posts.items.first().map(|post| post.id)
    );

    let older = site
        .blog
        .home(Audience::Public, None, 5)
        .await
        .expect("older page");
    assert_eq!(
        titles(&older.posts.items, |post| post.title.as_str()),
        ["Hello 2011"]
    );
    assert_eq!(older.posts.next_offset, Some(0));
    assert_eq!(older.posts.prev_offset, None);
}

#[tokio::test]
async fn out_of_range_start_is_clamped() {
    let site = seeded_site().await;

    let page = site
        .blog
        .home(Audience::Public, None, 1000)
        .await
        .expect("clamped page");
    assert_eq!(
        titles(&page.posts.items, |post| post.title.as_str()),
        ["Hello 2011"]
    );

    let negative = site
        .blog
        .home(Audience::Public, None, -5)
        .await
        .expect("negative start");
    assert_eq!(negative.posts.items.len(), 5);
    assert_eq!(negative.posts.next_offset, None);
}

#[tokio::test]
async fn staff_see_drafts() {
    let site = seeded_site().await;

    let page = site
        .blog
        .home(Audience::Staff, None, 0)
        .await
        .expect("staff home");
    assert!(page.posts.items.iter().any(|post| post.status == PostStatus::Draft));
    assert_eq!(page.posts.prev_offset, Some(5));
}

#[tokio::test]
async fn category_slug_selects_category_tag() {
    let site = seeded_site().await;

    let page = site
        .blog
        .home(Audience::Public, Some("rust"), 0)
        .await
        .expect("category listing");
    let category = page.selected_category.expect("selected category");
    assert_eq!(category.long_name, "Rust programming");
    assert_eq!(
        titles(&page.posts.items, |post| post.title.as_str()),
        ["March two", "March one"]
    );
}

#[tokio::test]
async fn plain_tag_slug_filters_without_category() {
    let site = seeded_site().await;

    let page = site
        .blog
        .home(Audience::Public, Some("life"), 0)
        .await
        .expect("tag listing");
    assert!(page.selected_category.is_none());
    assert_eq!(
        titles(&page.posts.items, |post| post.title.as_str()),
        ["March two", "Hello 2011"]
    );
}

#[tokio::test]
async fn unknown_slug_lists_everything() {
    let site = seeded_site().await;

    let page = site
        .blog
        .home(Audience::Public, Some("no-such-thing"), 0)
        .await
        .expect("fallback listing");
    assert!(page.selected_category.is_none());
    assert_eq!(page.posts.items.len(), 5);
    assert_eq!(page.posts.prev_offset, Some(5));
}

#[tokio::test]
async fn month_archive_lists_only_that_month() {
    let site = seeded_site().await;

    let page = site
        .blog
        .archive(Audience::Public, 2012, Some(3), 0)
        .await
        .expect("month archive");
    let period = page.archive_period.expect("period");
    assert_eq!(period.label, "March 2012");
    assert_eq!(
        titles(&page.posts.items, |post| post.title.as_str()),
        ["March two", "March one"]
    );
    assert_eq!(page.posts.prev_offset, None);
    assert_eq!(page.posts.next_offset, None);
}

#[tokio::test]
async fn empty_archive_period_yields_empty_window() {
    let site = seeded_site().await;

    let page = site
        .blog
        .archive(Audience::Public, 2010, None, 0)
        .await
        .expect("empty archive");
    assert!(page.posts.is_empty());
    assert_eq!(page.posts.first_item_id, None);
}

#[tokio::test]
async fn invalid_month_is_rejected() {
    let site = seeded_site().await;

    let err = site
        .blog
        .archive(Audience::Public, 2012, Some(13), 0)
        .await
        .expect_err("invalid month");
    assert!(matches!(err, BlogError::InvalidPeriod(_)));
}

#[tokio::test]
async fn chrome_aggregates_visible_posts() {
    let site = seeded_site().await;

    let chrome = site.chrome.load(Audience::Public).await.expect("chrome");
    let archive = chrome.archive.expect("archive");

    let years: Vec<(&str, usize)> = archive
        .years
        .iter()
        .map(|year| (year.key.as_str(), year.count))
        .collect();
    assert_eq!(years, [("2012", 5), ("2011", 1)]);

    let months: Vec<(&str, usize, &str)> = archive.years[0]
        .months
        .iter()
        .map(|month| (month.key.as_str(), month.count, month.uri.as_str()))
        .collect();
    assert_eq!(
        months,
        [
            ("August", 1, "/archive/2012/8/"),
            ("July", 1, "/archive/2012/7/"),
            ("May", 1, "/archive/2012/5/"),
            ("March", 2, "/archive/2012/3/"),
        ]
    );
    assert_eq!(archive.years[1].uri, "/archive/2011/");
    assert_eq!(
        archive.years[0].months[3].articles[1].uri,
        "/article/march-one/"
    );
}

#[tokio::test]
async fn chrome_blogroll_is_rank_ordered() {
    let site = seeded_site().await;

    let chrome = site.chrome.load(Audience::Public).await.expect("chrome");
    assert_eq!(
        titles(&chrome.blogroll, |link| link.title.as_str()),
        ["First friend", "Second friend"]
    );
    assert_eq!(chrome.categories.len(), 1);
    assert_eq!(chrome.root_uri, "/");
}

#[tokio::test]
async fn empty_blog_has_no_archive() {
    let site = support::build_site(Default::default());

    let chrome = site.chrome.load(Audience::Public).await.expect("chrome");
    assert!(chrome.archive.is_none());
    assert!(chrome.blogroll.is_empty());

    let page = site
        .blog
        .home(Audience::Public, None, 0)
        .await
        .expect("empty home");
    assert!(page.posts.is_empty());
}

#[tokio::test]
async fn article_respects_audience() {
    let site = seeded_site().await;

    let article = site
        .blog
        .article(Audience::Public, "march-two")
        .await
        .expect("article");
    assert_eq!(article.post.title, "March two");
    assert_eq!(article.first_post_id, article.post.id);
    assert_eq!(
        titles(&article.tags, |tag| tag.name.as_str()),
        ["Life", "Rust"]
    );

    let hidden = site
        .blog
        .article(Audience::Public, "secret-draft")
        .await
        .expect_err("draft hidden from public");
    assert!(matches!(hidden, BlogError::NotFound));

    site.blog
        .article(Audience::Staff, "secret-draft")
        .await
        .expect("staff can read drafts");

    let missing = site
        .blog
        .article(Audience::Public, "")
        .await
        .expect_err("empty slug");
    assert!(matches!(missing, BlogError::NotFound));
}

#[tokio::test]
async fn feed_lists_latest_public_posts() {
    let site = seeded_site().await;

    let channel = site.syndication.latest(None).await.expect("feed");
    assert_eq!(channel.title, "metablog");
    assert_eq!(channel.link, "/");
    assert_eq!(channel.categories, ["Rust programming"]);
    assert_eq!(channel.items.len(), 6);
    assert_eq!(channel.items[0].title, "Members only");
    assert_eq!(channel.items[0].link, "/article/members-only/");
}

#[tokio::test]
async fn category_feed_is_scoped() {
    let site = seeded_site().await;

    let channel = site
        .syndication
        .latest(Some("rust"))
        .await
        .expect("category feed");
    assert_eq!(channel.title, "metablog - Rust programming");
    assert_eq!(channel.description, "Articles related to Rust programming.");
    assert_eq!(channel.link, "/category/rust/");
    assert_eq!(
        titles(&channel.items, |item| item.title.as_str()),
        ["March two", "March one"]
    );

    let err = site
        .syndication
        .latest(Some("life"))
        .await
        .expect_err("life is not a category");
    assert!(matches!(err, SyndicationError::UnknownCategory(slug) if slug == "life"));
}

#[tokio::test]
async fn feed_is_capped() {
    let site = support::build_site(Default::default());
    for day in 1..=12u8 {
        let date = datetime!(2013-01-01 0:00 UTC)
            .replace_day(day)
            .expect("valid day");
        publish(
            &site,
            &format!("Entry {day}"),
            date,
            PostStatus::Published,
            &[],
        )
        .await;
    }

    let channel = site.syndication.latest(None).await.expect("feed");
    assert_eq!(channel.items.len(), 10);
    assert_eq!(channel.items[0].title, "Entry 12");
}

#[tokio::test]
async fn authoring_derives_unique_slugs() {
    let site = seeded_site().await;

    let again = publish(
        &site,
        "March one",
        datetime!(2012-09-01 9:00 UTC),
        PostStatus::Published,
        &[],
    )
    .await;
    assert_eq!(again.slug, "march-one-1");
}

#[tokio::test]
async fn authoring_validates_input() {
    let site = seeded_site().await;

    let blank = site
        .authoring
        .create_post(NewPost {
            author: "editor".to_string(),
            title: "   ".to_string(),
            text: String::new(),
            status: PostStatus::Draft,
            post_date: None,
            tag_slugs: Vec::new(),
        })
        .await
        .expect_err("blank title");
    assert!(matches!(blank, AuthoringError::Domain(_)));

    let unknown_tag = site
        .authoring
        .create_post(NewPost {
            author: "editor".to_string(),
            title: "Tagged".to_string(),
            text: String::new(),
            status: PostStatus::Draft,
            post_date: None,
            tag_slugs: vec!["missing".to_string()],
        })
        .await
        .expect_err("unknown tag");
    assert!(matches!(unknown_tag, AuthoringError::Domain(_)));
    let message = unknown_tag.to_string();
    assert!(message.contains("unknown tag `missing`"), "{message}");
    assert!(message.contains("rust"), "{message}");
    assert!(message.contains("favorite-blog"), "{message}");
}

#[tokio::test]
async fn authoring_attaches_known_tags() {
    let site = seeded_site().await;

    let post = publish(
        &site,
        "Tagged twice",
        datetime!(2012-09-01 9:00 UTC),
        PostStatus::Published,
        &["rust", "rust", "life"],
    )
    .await;

    let article = site
        .blog
        .article(Audience::Public, &post.slug)
        .await
        .expect("article");
    let mut tags: Vec<&str> = article.tags.iter().map(|tag| tag.slug.as_str()).collect();
    tags.sort_unstable();
    assert_eq!(tags, ["life", "rust"]);
}

#[tokio::test]
async fn long_colliding_titles_keep_slugs_within_the_column() {
    let site = seeded_site().await;
    let title = "a".repeat(MAX_SLUG_LEN);

    let first = publish(
        &site,
        &title,
        datetime!(2012-09-01 9:00 UTC),
        PostStatus::Published,
        &[],
    )
    .await;
    let second = publish(
        &site,
        &title,
        datetime!(2012-09-02 9:00 UTC),
        PostStatus::Published,
        &[],
    )
    .await;

    assert_ne!(first.slug, second.slug);
    assert!(second.slug.ends_with("-1"));
    assert!(second.slug.len() <= MAX_SLUG_LEN);
}

#[tokio::test]
async fn long_chinese_titles_keep_slugs_within_the_column() {
    let site = seeded_site().await;

    let post = publish(
        &site,
        &"基".repeat(MAX_SLUG_LEN),
        datetime!(2012-09-01 9:00 UTC),
        PostStatus::Published,
        &[],
    )
    .await;

    assert!(post.slug.starts_with("ji-ji"));
    assert!(post.slug.len() <= MAX_SLUG_LEN);
}
