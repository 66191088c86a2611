//! Read path for `GET /threads/{id}`: one thread with its comments, each comment's
//! like count and replies, and soft-deleted content masked.

use std::collections::HashMap;

use futures_util::future::try_join;
use tracing::debug;

use crate::models::{Comment, DetailComment, DetailReply, DetailThread, Id, Reply};
use crate::repo::{CommentRepo, LikeRepo, ReplyRepo, Repo, RepoResult, ThreadRepo};

/// Assembles the detail view of `thread_id`.
///
/// The thread lookup runs first and is the only step that can fail with
/// `NotFound`; nothing else is queried for an unknown thread. Like counts and
/// replies depend only on the comment ids and are fetched concurrently.
pub async fn get_thread_detail(repo: &dyn Repo, thread_id: &str) -> RepoResult<DetailThread> {
    let thread = repo.get_thread(thread_id).await?;
    let comments = repo.list_comments_by_thread(thread_id).await?;
    let comment_ids: Vec<Id> = comments.iter().map(|c| c.id.clone()).collect();

    let (like_counts, replies) = try_join(
        repo.like_counts_for(&comment_ids),
        repo.list_replies_by_comments(&comment_ids),
    )
    .await?;
    debug!(thread_id, comments = comments.len(), replies = replies.len(), "assembling thread detail");

    Ok(DetailThread::new(thread, assemble_comments(comments, &like_counts, replies)))
}

/// Joins comments with their like counts and replies.
///
/// Replies are grouped by parent once, so the join is linear in the number of
/// rows. Every comment and reply is kept; deletion only masks `content`. Both
/// levels come out ascending by `(created_at, id)`.
pub fn assemble_comments(
    mut comments: Vec<Comment>,
    like_counts: &HashMap<Id, u64>,
    mut replies: Vec<Reply>,
) -> Vec<DetailComment> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut by_comment: HashMap<Id, Vec<DetailReply>> = HashMap::with_capacity(comments.len());
    for reply in replies {
        by_comment.entry(reply.comment_id.clone()).or_default().push(reply.into());
    }

    comments
        .into_iter()
        .map(|comment| {
            let like_count = like_counts.get(&comment.id).copied().unwrap_or(0);
            let replies = by_comment.remove(&comment.id).unwrap_or_default();
            DetailComment::new(comment, like_count, replies)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DELETED_COMMENT_CONTENT, DELETED_REPLY_CONTENT};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn comment(id: &str, secs: i64, is_deleted: bool) -> Comment {
        Comment {
            id: id.into(),
            thread_id: "thread-1".into(),
            content: format!("{id} content"),
            owner: "user-1".into(),
            username: "dicoding".into(),
            created_at: at(secs),
            is_deleted,
        }
    }

    fn reply(id: &str, comment_id: &str, secs: i64, is_deleted: bool) -> Reply {
        Reply {
            id: id.into(),
            comment_id: comment_id.into(),
            content: format!("{id} content"),
            owner: "user-2".into(),
            username: "johndoe".into(),
            created_at: at(secs),
            is_deleted,
        }
    }

    #[test]
    fn groups_replies_under_their_comment_in_order() {
        let comments = vec![comment("comment-a", 1, false), comment("comment-b", 2, false)];
        let replies = vec![
            reply("reply-1", "comment-a", 3, false),
            reply("reply-2", "comment-b", 4, false),
            reply("reply-3", "comment-a", 5, false),
        ];
        let out = assemble_comments(comments, &HashMap::new(), replies);
        let ids: Vec<Vec<&str>> = out.iter().map(|c| c.replies.iter().map(|r| r.id.as_str()).collect()).collect();
        assert_eq!(ids, vec![vec!["reply-1", "reply-3"], vec!["reply-2"]]);
    }

    #[test]
    fn missing_like_entries_default_to_zero() {
        let mut likes = HashMap::new();
        likes.insert("comment-a".to_string(), 2);
        let out = assemble_comments(vec![comment("comment-a", 1, false), comment("comment-b", 2, false)], &likes, vec![]);
        assert_eq!(out[0].like_count, 2);
        assert_eq!(out[1].like_count, 0);
        assert!(out[1].replies.is_empty());
    }

    #[test]
    fn deleted_rows_are_masked_not_dropped() {
        let out = assemble_comments(
            vec![comment("comment-a", 1, true)],
            &HashMap::new(),
            vec![reply("reply-1", "comment-a", 2, true), reply("reply-2", "comment-a", 3, false)],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, DELETED_COMMENT_CONTENT);
        assert_eq!(out[0].replies.len(), 2);
        assert_eq!(out[0].replies[0].content, DELETED_REPLY_CONTENT);
        assert_eq!(out[0].replies[1].content, "reply-2 content");
    }

    #[test]
    fn equal_timestamps_fall_back_to_id_order() {
        let out = assemble_comments(
            vec![comment("comment-b", 1, false), comment("comment-a", 1, false)],
            &HashMap::new(),
            vec![],
        );
        assert_eq!(out[0].id, "comment-a");
        assert_eq!(out[1].id, "comment-b");
    }
}
