//! Offset pagination over date-descending post collections.
//!
//! Offsets are named from the reader's point of view on a newest-first list:
//! `next_offset` points at more recent posts (a smaller index) and
//! `prev_offset` at older posts (a larger index).

use serde::Serialize;

use crate::domain::entities::PostIdentity;

/// Bounds of one page within a collection of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowPlan {
    pub start: usize,
    pub end: usize,
    pub prev_offset: Option<usize>,
    pub next_offset: Option<usize>,
}

impl WindowPlan {
    /// Plan the page starting at `requested_index`. Out-of-range indexes are
    /// clamped into the collection and a zero page size is treated as one.
    ///
    /// Returns `None` when the collection is empty.
    pub fn compute(total: usize, requested_index: i64, page_size: usize) -> Option<Self> {
        if total == 0 {
            return None;
        }

        let page_size = page_size.max(1);
        let last = total - 1;
        let start = usize::try_from(requested_index.max(0))
            .unwrap_or(usize::MAX)
            .min(last);
        let end = start.saturating_add(page_size).min(total);

        let next_offset = (start > 0).then(|| start.saturating_sub(page_size));
        let prev_offset = start
            .checked_add(page_size)
            .filter(|following| *following < total)
            .map(|following| following.min(last));

        Some(Self {
            start,
            end,
            prev_offset,
            next_offset,
        })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One page of posts plus offsets of the neighbouring pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageWindow<T> {
    pub items: Vec<T>,
    pub first_item_id: Option<i64>,
    pub prev_offset: Option<usize>,
    pub next_offset: Option<usize>,
}

impl<T> PageWindow<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            first_item_id: None,
            prev_offset: None,
            next_offset: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: PostIdentity> PageWindow<T> {
    /// Assemble a window from items already fetched according to `plan`.
    pub fn from_plan(plan: WindowPlan, items: Vec<T>) -> Self {
        let first_item_id = items.first().map(PostIdentity::post_id);
        Self {
            items,
            first_item_id,
            prev_offset: plan.prev_offset,
            next_offset: plan.next_offset,
        }
    }
}

/// Cut the page starting at `requested_index` out of an in-memory collection.
pub fn window<T>(ordered: &[T], requested_index: i64, page_size: usize) -> PageWindow<T>
where
    T: PostIdentity + Clone,
{
    match WindowPlan::compute(ordered.len(), requested_index, page_size) {
        Some(plan) => PageWindow::from_plan(plan, ordered[plan.start..plan.end].to_vec()),
        None => PageWindow::empty(),
    }
}
