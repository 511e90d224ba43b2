//! Tags, categories and outbound links.

use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::application::repos::{CategoriesRepo, LinksRepo, RepoError, TagsRepo};
use crate::domain::entities::{CategoryRecord, LinkRecord, TagRecord};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct TagRow {
    id: i64,
    name: String,
    slug: String,
}

impl From<TagRow> for TagRecord {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    long_name: String,
    tag_id: i64,
    tag_name: String,
    tag_slug: String,
}

impl From<CategoryRow> for CategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            long_name: row.long_name,
            tag: TagRecord {
                id: row.tag_id,
                name: row.tag_name,
                slug: row.tag_slug,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    title: String,
    url: String,
    tag_id: i64,
    rank: i32,
}

impl From<LinkRow> for LinkRecord {
    fn from(row: LinkRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            url: row.url,
            tag_id: row.tag_id,
            rank: row.rank,
        }
    }
}

#[async_trait]
impl TagsRepo for PostgresRepositories {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TagRow>("SELECT id, name, slug FROM tags ORDER BY name, id")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TagRecord::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<TagRecord>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT id, name, slug FROM tags WHERE slug = ");
        qb.push_bind(slug);

        let row = qb
            .build_query_as::<TagRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(TagRecord::from))
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<TagRecord>, RepoError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT t.id, t.name, t.slug
            FROM tags t
            INNER JOIN post_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = $1
            ORDER BY t.name, t.id
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TagRecord::from).collect())
    }
}

#[async_trait]
impl CategoriesRepo for PostgresRepositories {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT c.id, c.long_name, t.id AS tag_id, t.name AS tag_name, t.slug AS tag_slug
            FROM categories c
            INNER JOIN tags t ON t.id = c.tag_id
            ORDER BY c.id
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CategoryRecord::from).collect())
    }
}

#[async_trait]
impl LinksRepo for PostgresRepositories {
    async fn list_for_tag(&self, tag_id: i64) -> Result<Vec<LinkRecord>, RepoError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            "SELECT id, title, url, tag_id, rank FROM links WHERE tag_id = $1 ORDER BY rank, id",
        )
        .bind(tag_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(LinkRecord::from).collect())
    }
}
