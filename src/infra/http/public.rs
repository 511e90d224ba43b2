use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;

use crate::{
    application::{
        blog::BlogService,
        error::HttpError,
        syndication::SyndicationService,
    },
    domain::types::Audience,
    infra::db::PostgresRepositories,
};

use super::{
    db_health_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub blog: Arc<BlogService>,
    pub syndication: Arc<SyndicationService>,
    /// Absent when posts are served from process memory.
    pub db: Option<Arc<PostgresRepositories>>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/category/{slug}/", get(category_index))
        .route("/archive/{year}/", get(year_archive))
        .route("/archive/{year}/{month}/", get(month_archive))
        .route("/article/{slug}/", get(article))
        .route("/feed/", get(feed))
        .route("/category/{slug}/feed/", get(category_feed))
        .route("/_health", get(health))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// `start` is the index of the first post on the requested page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StartQuery {
    start: Option<i64>,
}

impl StartQuery {
    fn start(&self) -> i64 {
        self.start.unwrap_or(0)
    }
}

async fn index(State(state): State<HttpState>, Query(query): Query<StartQuery>) -> Response {
    match state.blog.home(Audience::Public, None, query.start()).await {
        Ok(context) => Json(context).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn category_index(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<StartQuery>,
) -> Response {
    match state
        .blog
        .home(Audience::Public, Some(&slug), query.start())
        .await
    {
        Ok(context) => Json(context).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn year_archive(
    State(state): State<HttpState>,
    Path(year): Path<i32>,
    Query(query): Query<StartQuery>,
) -> Response {
    match state
        .blog
        .archive(Audience::Public, year, None, query.start())
        .await
    {
        Ok(context) => Json(context).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn month_archive(
    State(state): State<HttpState>,
    Path((year, month)): Path<(i32, u8)>,
    Query(query): Query<StartQuery>,
) -> Response {
    match state
        .blog
        .archive(Audience::Public, year, Some(month), query.start())
        .await
    {
        Ok(context) => Json(context).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn article(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    match state.blog.article(Audience::Public, &slug).await {
        Ok(context) => Json(context).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn feed(State(state): State<HttpState>) -> Response {
    match state.syndication.latest(None).await {
        Ok(channel) => Json(channel).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn category_feed(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    match state.syndication.latest(Some(&slug)).await {
        Ok(channel) => Json(channel).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn health(State(state): State<HttpState>) -> Response {
    match state.db.as_ref() {
        Some(db) => db_health_response(db.health_check().await),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn fallback() -> Response {
    HttpError::new(
        "infra::http::fallback",
        StatusCode::NOT_FOUND,
        "Page not found",
        "no route matches the request path",
    )
    .into_response()
}
