use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;

use crate::application::repos::{
    CreatePostParams, PostQuery, PostsRepo, PostsWriteRepo, RepoError,
};
use crate::domain::entities::{PostRecord, PostSummary};
use crate::domain::types::PostStatus;

use super::{POST_ORDER, PostgresRepositories, map_sqlx_error};

const POST_COLUMNS: &str =
    "p.id, p.author, p.title, p.slug, p.post_date, p.modified_date, p.status, p.text";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    author: String,
    title: String,
    slug: String,
    post_date: OffsetDateTime,
    modified_date: OffsetDateTime,
    status: PostStatus,
    text: String,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            author: row.author,
            title: row.title,
            slug: row.slug,
            post_date: row.post_date,
            modified_date: row.modified_date,
            status: row.status,
            text: row.text,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostSummaryRow {
    id: i64,
    title: String,
    slug: String,
    post_date: OffsetDateTime,
    status: PostStatus,
}

impl From<PostSummaryRow> for PostSummary {
    fn from(row: PostSummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            post_date: row.post_date,
            status: row.status,
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_summaries(&self, query: &PostQuery) -> Result<Vec<PostSummary>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT p.id, p.title, p.slug, p.post_date, p.status FROM posts p");
        Self::apply_post_query(&mut qb, query);
        qb.push(POST_ORDER);

        let rows = qb
            .build_query_as::<PostSummaryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostSummary::from).collect())
    }

    async fn count_posts(&self, query: &PostQuery) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
        Self::apply_post_query(&mut qb, query);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn list_posts(
        &self,
        query: &PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let offset = Self::convert_bound(offset)?;
        let limit = Self::convert_bound(limit)?;

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p");
        Self::apply_post_query(&mut qb, query);
        qb.push(POST_ORDER);
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(POST_COLUMNS);
        qb.push(" FROM posts p WHERE p.slug = ");
        qb.push_bind(slug);

        let row = qb
            .build_query_as::<PostRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM posts WHERE slug = $1)")
            .bind(slug)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts AS p (author, title, slug, post_date, modified_date, status, text)
            VALUES ($1, $2, $3, $4, now(), $5, $6)
            RETURNING p.id, p.author, p.title, p.slug, p.post_date, p.modified_date, p.status, p.text
            "#,
        )
        .bind(&params.author)
        .bind(&params.title)
        .bind(&params.slug)
        .bind(params.post_date)
        .bind(params.status)
        .bind(&params.text)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if !params.tag_ids.is_empty() {
            sqlx::query(
                "INSERT INTO post_tags (post_id, tag_id) SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
            )
            .bind(row.id)
            .bind(&params.tag_ids)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(PostRecord::from(row))
    }
}
