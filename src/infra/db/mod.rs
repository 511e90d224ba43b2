//! Postgres-backed repository implementations.

mod posts;
mod taxonomy;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder, Transaction,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{PostQuery, RepoError};

const POST_ORDER: &str = " ORDER BY p.post_date DESC, p.id DESC";

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Appends the `WHERE` clause for `query` against posts aliased as `p`.
    fn apply_post_query<'q>(qb: &mut QueryBuilder<'q, Postgres>, query: &PostQuery) {
        let statuses: Vec<String> = query
            .statuses
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();
        qb.push(" WHERE p.status::text = ANY(");
        qb.push_bind(statuses);
        qb.push(")");

        if !query.tag_ids.is_empty() {
            qb.push(" AND EXISTS (SELECT 1 FROM post_tags pt WHERE pt.post_id = p.id AND pt.tag_id = ANY(");
            qb.push_bind(query.tag_ids.clone());
            qb.push("))");
        }

        if let Some(year) = query.year {
            qb.push(" AND EXTRACT(YEAR FROM p.post_date AT TIME ZONE 'UTC')::int = ");
            qb.push_bind(year);
            if let Some(month) = query.month {
                qb.push(" AND EXTRACT(MONTH FROM p.post_date AT TIME ZONE 'UTC')::int = ");
                qb.push_bind(i32::from(month as u8));
            }
        }
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }

    fn convert_bound(value: u64) -> Result<i64, RepoError> {
        i64::try_from(value).map_err(|_| RepoError::InvalidInput {
            message: format!("pagination bound {value} exceeds supported range"),
        })
    }
}
