use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Ids are opaque strings with a type prefix (`thread-…`, `comment-…`).
pub type Id = String;

/// Content shown in place of a soft-deleted comment.
pub const DELETED_COMMENT_CONTENT: &str = "**komentar telah dihapus**";
/// Content shown in place of a soft-deleted reply.
pub const DELETED_REPLY_CONTENT: &str = "**balasan telah dihapus**";

/// Which kind of row an error or lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Thread,
    Comment,
    Reply,
    User,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Thread => "thread",
            Entity::Comment => "comment",
            Entity::Reply => "reply",
            Entity::User => "user",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------- stored rows ----------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub fullname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub fullname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thread {
    pub id: Id,
    pub title: String,
    pub body: String,
    pub owner: Id,
    pub username: String, // joined from users
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Id,
    pub thread_id: Id,
    pub content: String,
    pub owner: Id,
    pub username: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "is_delete")]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reply {
    pub id: Id,
    pub comment_id: Id,
    pub content: String,
    pub owner: Id,
    pub username: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "is_delete")]
    pub is_deleted: bool,
}

// ---------------- insert forms / commands ----------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewThread {
    pub title: String,
    pub body: String,
    pub owner: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub thread_id: Id,
    pub content: String,
    pub owner: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    pub thread_id: Id,
    pub comment_id: Id,
    pub content: String,
    pub owner: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteComment {
    pub thread_id: Id,
    pub comment_id: Id,
    pub owner: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReply {
    pub thread_id: Id,
    pub comment_id: Id,
    pub reply_id: Id,
    pub owner: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeComment {
    pub thread_id: Id,
    pub comment_id: Id,
    pub user_id: Id,
}

// ---------------- request bodies (documentation only; handlers read raw JSON) ----------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThreadPayload {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentPayload {
    pub content: String,
}

// ---------------- added views ----------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct AddedThread {
    pub id: Id,
    pub title: String,
    pub owner: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct AddedComment {
    pub id: Id,
    pub content: String,
    pub owner: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct AddedReply {
    pub id: Id,
    pub content: String,
    pub owner: Id,
}

// ---------------- read projections (never persisted) ----------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetailReply {
    pub id: Id,
    pub username: String,
    pub date: DateTime<Utc>,
    pub content: String,
}

impl From<Reply> for DetailReply {
    fn from(r: Reply) -> Self {
        Self {
            id: r.id,
            username: r.username,
            date: r.created_at,
            content: if r.is_deleted { DELETED_REPLY_CONTENT.to_string() } else { r.content },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailComment {
    pub id: Id,
    pub username: String,
    pub date: DateTime<Utc>,
    pub content: String,
    pub like_count: u64,
    pub replies: Vec<DetailReply>,
}

impl DetailComment {
    pub fn new(c: Comment, like_count: u64, replies: Vec<DetailReply>) -> Self {
        Self {
            id: c.id,
            username: c.username,
            date: c.created_at,
            content: if c.is_deleted { DELETED_COMMENT_CONTENT.to_string() } else { c.content },
            like_count,
            replies,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetailThread {
    pub id: Id,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub username: String,
    pub comments: Vec<DetailComment>,
}

impl DetailThread {
    pub fn new(t: Thread, comments: Vec<DetailComment>) -> Self {
        Self {
            id: t.id,
            title: t.title,
            body: t.body,
            date: t.created_at,
            username: t.username,
            comments,
        }
    }
}
