//! Slug derivation for post permalinks.
//!
//! Titles are slugified with the `slug` crate after transliterating Chinese
//! characters through `pinyin`, so “基线对齐” becomes `ji-xian-dui-qi`.
//! Uniqueness is decided by a caller-supplied predicate which keeps the
//! derivation itself free of persistence concerns.

use std::future::Future;

use pinyin::{Pinyin, ToPinyin};
use slug::slugify;
use thiserror::Error;

/// Column width of `posts.slug`; every candidate fits within it.
pub const MAX_SLUG_LEN: usize = 128;

const MAX_SUFFIX_ATTEMPTS: usize = 64;
/// Room reserved for the longest suffix, `-64`.
const SUFFIX_WIDTH: usize = 3;
const MAX_BASE_LEN: usize = MAX_SLUG_LEN - SUFFIX_WIDTH;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive a base slug from the provided human-readable text.
///
/// Long slugs are cut back to a word boundary so that any suffixed
/// candidate still fits in [`MAX_SLUG_LEN`] bytes.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = truncate_slug(slugify(transliterate_to_ascii(input)), MAX_BASE_LEN);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

fn truncate_slug(mut slug: String, max_len: usize) -> String {
    if slug.len() <= max_len {
        return slug;
    }

    // slugify only emits ASCII, so any byte index is a char boundary.
    let cut = match slug[..=max_len].rfind('-') {
        Some(0) | None => max_len,
        Some(hyphen) => hyphen,
    };
    slug.truncate(cut);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Candidate slugs in the order they are tried: `base`, `base-1`, `base-2`, …
fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string())
        .chain((1..=MAX_SUFFIX_ATTEMPTS).map(move |suffix| format!("{base}-{suffix}")))
}

/// Produce a slug for which the store-backed `is_unique` predicate holds.
pub async fn generate_unique_slug_async<F, Fut, E>(
    input: &str,
    mut is_unique: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input)?;

    for candidate in candidates(&base) {
        if is_unique(&candidate)
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Exhausted { base }))
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => append_pinyin(&mut output, py),
            None if ch.is_whitespace() => output.push(' '),
            None => output.push(ch),
        }
    }

    output
}

fn append_pinyin(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
}
