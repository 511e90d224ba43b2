//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

/// Publication state of a post (mirrors Postgres enum `post_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "post_status", rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Hidden,
    Published,
    Closed,
    Exclusive,
}

impl PostStatus {
    pub const ALL: [PostStatus; 5] = [
        PostStatus::Draft,
        PostStatus::Hidden,
        PostStatus::Published,
        PostStatus::Closed,
        PostStatus::Exclusive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Hidden => "hidden",
            PostStatus::Published => "published",
            PostStatus::Closed => "closed",
            PostStatus::Exclusive => "exclusive",
        }
    }
}

impl TryFrom<&str> for PostStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(PostStatus::Draft),
            "hidden" => Ok(PostStatus::Hidden),
            "published" => Ok(PostStatus::Published),
            "closed" => Ok(PostStatus::Closed),
            "exclusive" => Ok(PostStatus::Exclusive),
            _ => Err(()),
        }
    }
}

/// Who is looking at the site. Staff additionally see drafts and hidden posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    Public,
    Staff,
}

impl Audience {
    /// Statuses a reader in this audience is allowed to see.
    pub fn visible_statuses(self) -> Vec<PostStatus> {
        let mut statuses = vec![
            PostStatus::Published,
            PostStatus::Exclusive,
            PostStatus::Closed,
        ];
        if self == Audience::Staff {
            statuses.push(PostStatus::Draft);
            statuses.push(PostStatus::Hidden);
        }
        statuses
    }

    pub fn can_see(self, status: PostStatus) -> bool {
        self.visible_statuses().contains(&status)
    }
}
