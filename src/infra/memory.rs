//! Process-local repository used when no database is configured, and by tests.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::application::repos::{
    CategoriesRepo, CreatePostParams, LinksRepo, PostQuery, PostsRepo, PostsWriteRepo, RepoError,
    TagsRepo,
};
use crate::domain::entities::{CategoryRecord, LinkRecord, PostRecord, PostSummary, TagRecord};
use crate::domain::slug::MAX_SLUG_LEN;

#[derive(Default)]
struct Store {
    posts: Vec<StoredPost>,
    tags: Vec<TagRecord>,
    categories: Vec<StoredCategory>,
    links: Vec<LinkRecord>,
    last_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn matching(&self, query: &PostQuery) -> Vec<&StoredPost> {
        let mut posts: Vec<&StoredPost> = self
            .posts
            .iter()
            .filter(|post| query.matches(post.record.status, post.record.post_date, &post.tag_ids))
            .collect();
        posts.sort_by(|a, b| {
            b.record
                .post_date
                .cmp(&a.record.post_date)
                .then_with(|| b.record.id.cmp(&a.record.id))
        });
        posts
    }

    fn tag(&self, id: i64) -> Option<&TagRecord> {
        self.tags.iter().find(|tag| tag.id == id)
    }
}

struct StoredPost {
    record: PostRecord,
    tag_ids: Vec<i64>,
}

struct StoredCategory {
    id: i64,
    long_name: String,
    tag_id: i64,
}

#[derive(Clone, Default)]
pub struct InMemoryRepositories {
    store: Arc<RwLock<Store>>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_tag(&self, name: &str, slug: &str) -> Result<TagRecord, RepoError> {
        let mut store = self.store.write().await;
        if store.tags.iter().any(|tag| tag.slug == slug) {
            return Err(RepoError::Duplicate {
                constraint: "tags_slug_key".to_string(),
            });
        }
        let tag = TagRecord {
            id: store.next_id(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        store.tags.push(tag.clone());
        Ok(tag)
    }

    pub async fn insert_category(
        &self,
        tag_id: i64,
        long_name: &str,
    ) -> Result<CategoryRecord, RepoError> {
        let mut store = self.store.write().await;
        let tag = store.tag(tag_id).cloned().ok_or(RepoError::InvalidInput {
            message: format!("tag {tag_id} does not exist"),
        })?;
        if store.categories.iter().any(|c| c.tag_id == tag_id) {
            return Err(RepoError::Duplicate {
                constraint: "categories_tag_id_key".to_string(),
            });
        }
        let id = store.next_id();
        store.categories.push(StoredCategory {
            id,
            long_name: long_name.to_string(),
            tag_id,
        });
        Ok(CategoryRecord {
            id,
            long_name: long_name.to_string(),
            tag,
        })
    }

    pub async fn insert_link(
        &self,
        title: &str,
        url: &str,
        tag_id: i64,
        rank: i32,
    ) -> Result<LinkRecord, RepoError> {
        let mut store = self.store.write().await;
        if store.tag(tag_id).is_none() {
            return Err(RepoError::InvalidInput {
                message: format!("tag {tag_id} does not exist"),
            });
        }
        let link = LinkRecord {
            id: store.next_id(),
            title: title.to_string(),
            url: url.to_string(),
            tag_id,
            rank,
        };
        store.links.push(link.clone());
        Ok(link)
    }
}

#[async_trait]
impl PostsRepo for InMemoryRepositories {
    async fn list_summaries(&self, query: &PostQuery) -> Result<Vec<PostSummary>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .matching(query)
            .into_iter()
            .map(|post| post.record.summary())
            .collect())
    }

    async fn count_posts(&self, query: &PostQuery) -> Result<u64, RepoError> {
        let store = self.store.read().await;
        Ok(store.matching(query).len() as u64)
    }

    async fn list_posts(
        &self,
        query: &PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let offset = usize::try_from(offset).map_err(RepoError::from_persistence)?;
        let limit = usize::try_from(limit).map_err(RepoError::from_persistence)?;
        let store = self.store.read().await;
        Ok(store
            .matching(query)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|post| post.record.clone())
            .collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .iter()
            .find(|post| post.record.slug == slug)
            .map(|post| post.record.clone()))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let store = self.store.read().await;
        Ok(store.posts.iter().any(|post| post.record.slug == slug))
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        if params.slug.len() > MAX_SLUG_LEN {
            return Err(RepoError::InvalidInput {
                message: format!("slug exceeds {MAX_SLUG_LEN} bytes"),
            });
        }
        let mut store = self.store.write().await;
        if store.posts.iter().any(|post| post.record.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "posts_slug_key".to_string(),
            });
        }
        if let Some(missing) = params
            .tag_ids
            .iter()
            .find(|id| store.tag(**id).is_none())
        {
            return Err(RepoError::InvalidInput {
                message: format!("tag {missing} does not exist"),
            });
        }

        let record = PostRecord {
            id: store.next_id(),
            author: params.author,
            title: params.title,
            slug: params.slug,
            post_date: params.post_date,
            modified_date: OffsetDateTime::now_utc(),
            status: params.status,
            text: params.text,
        };
        store.posts.push(StoredPost {
            record: record.clone(),
            tag_ids: params.tag_ids,
        });
        Ok(record)
    }
}

#[async_trait]
impl TagsRepo for InMemoryRepositories {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        let store = self.store.read().await;
        let mut tags = store.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        let store = self.store.read().await;
        Ok(store.tags.iter().find(|tag| tag.slug == slug).cloned())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<TagRecord>, RepoError> {
        let store = self.store.read().await;
        let Some(post) = store.posts.iter().find(|post| post.record.id == post_id) else {
            return Ok(Vec::new());
        };
        let mut tags: Vec<TagRecord> = post
            .tag_ids
            .iter()
            .filter_map(|id| store.tag(*id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[async_trait]
impl CategoriesRepo for InMemoryRepositories {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let store = self.store.read().await;
        store
            .categories
            .iter()
            .map(|category| {
                let tag = store
                    .tag(category.tag_id)
                    .cloned()
                    .ok_or(RepoError::NotFound)?;
                Ok(CategoryRecord {
                    id: category.id,
                    long_name: category.long_name.clone(),
                    tag,
                })
            })
            .collect()
    }
}

#[async_trait]
impl LinksRepo for InMemoryRepositories {
    async fn list_for_tag(&self, tag_id: i64) -> Result<Vec<LinkRecord>, RepoError> {
        let store = self.store.read().await;
        let mut links: Vec<LinkRecord> = store
            .links
            .iter()
            .filter(|link| link.tag_id == tag_id)
            .cloned()
            .collect();
        links.sort_by_key(|link| (link.rank, link.id));
        Ok(links)
    }
}
