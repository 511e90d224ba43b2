#![allow(dead_code)]

use std::sync::Arc;

use metablog::application::{
    authoring::{AuthoringService, NewPost},
    blog::BlogService,
    chrome::ChromeService,
    site::SiteOptions,
    syndication::SyndicationService,
};
use metablog::domain::links::{LinkBuilder, SitePaths};
use metablog::domain::types::PostStatus;
use metablog::infra::memory::InMemoryRepositories;
use time::OffsetDateTime;
use time::macros::datetime;

pub struct Site {
    pub repos: InMemoryRepositories,
    pub authoring: AuthoringService,
    pub chrome: ChromeService,
    pub blog: BlogService,
    pub syndication: SyndicationService,
}

pub fn build_site(repos: InMemoryRepositories) -> Site {
    let shared = Arc::new(repos.clone());
    let options = Arc::new(SiteOptions::default());
    let links: Arc<dyn LinkBuilder> = Arc::new(SitePaths::default());

    let chrome = ChromeService::new(
        shared.clone(),
        shared.clone(),
        shared.clone(),
        shared.clone(),
        links.clone(),
        options.clone(),
    );
    let blog = BlogService::new(shared.clone(), shared.clone(), chrome.clone(), options.clone());
    let syndication = SyndicationService::new(shared.clone(), shared.clone(), links, options);
    let authoring = AuthoringService::new(shared.clone(), shared.clone(), shared);

    Site {
        repos,
        authoring,
        chrome,
        blog,
        syndication,
    }
}

pub async fn publish(
    site: &Site,
    title: &str,
    date: OffsetDateTime,
    status: PostStatus,
    tags: &[&str],
) -> metablog::domain::entities::PostRecord {
    site.authoring
        .create_post(NewPost {
            author: "editor".to_string(),
            title: title.to_string(),
            text: format!("Body of {title}"),
            status,
            post_date: Some(date),
            tag_slugs: tags.iter().map(|tag| tag.to_string()).collect(),
        })
        .await
        .expect("post should be created")
}

/// A small blog: six public posts across 2011 and 2012, one draft,
/// a "rust" category, a plain "life" tag and a two-entry blogroll.
pub async fn seeded_site() -> Site {
    let site = build_site(InMemoryRepositories::new());

    let rust = site
        .repos
        .insert_tag("Rust", "rust")
        .await
        .expect("rust tag");
    site.repos
        .insert_tag("Life", "life")
        .await
        .expect("life tag");
    let blogroll = site
        .repos
        .insert_tag("Favorite blog", "favorite-blog")
        .await
        .expect("blogroll tag");
    site.repos
        .insert_category(rust.id, "Rust programming")
        .await
        .expect("rust category");
    site.repos
        .insert_link("Second friend", "https://second.example", blogroll.id, 2)
        .await
        .expect("link");
    site.repos
        .insert_link("First friend", "https://first.example", blogroll.id, 1)
        .await
        .expect("link");

    publish(
        &site,
        "Hello 2011",
        datetime!(2011-12-01 9:00 UTC),
        PostStatus::Published,
        &["life"],
    )
    .await;
    publish(
        &site,
        "March one",
        datetime!(2012-03-05 9:00 UTC),
        PostStatus::Published,
        &["rust"],
    )
    .await;
    publish(
        &site,
        "March two",
        datetime!(2012-03-20 9:00 UTC),
        PostStatus::Published,
        &["rust", "life"],
    )
    .await;
    publish(
        &site,
        "May post",
        datetime!(2012-05-01 9:00 UTC),
        PostStatus::Published,
        &[],
    )
    .await;
    publish(
        &site,
        "Secret draft",
        datetime!(2012-06-01 9:00 UTC),
        PostStatus::Draft,
        &[],
    )
    .await;
    publish(
        &site,
        "Closed post",
        datetime!(2012-07-01 9:00 UTC),
        PostStatus::Closed,
        &[],
    )
    .await;
    publish(
        &site,
        "Members only",
        datetime!(2012-08-01 9:00 UTC),
        PostStatus::Exclusive,
        &[],
    )
    .await;

    site
}
