//! Write-path orchestration. Each operation validates its input, runs the
//! existence checks (always before ownership) and then makes one mutating call.

use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::models::*;
use crate::repo::{CommentRepo, LikeRepo, ReplyRepo, Repo, ThreadRepo};

pub async fn add_thread(repo: &dyn Repo, payload: &Value, owner: &str) -> Result<AddedThread, ApiError> {
    let new = NewThread::from_payload(payload, owner)?;
    let added = repo.add_thread(new).await?;
    info!(thread_id = %added.id, owner, "thread added");
    Ok(added)
}

pub async fn add_comment(
    repo: &dyn Repo,
    payload: &Value,
    thread_id: &str,
    owner: &str,
) -> Result<AddedComment, ApiError> {
    let new = NewComment::from_payload(payload, thread_id, owner)?;
    repo.verify_thread_exists(&new.thread_id).await?;
    let added = repo.add_comment(new).await?;
    info!(thread_id, comment_id = %added.id, owner, "comment added");
    Ok(added)
}

/// Soft delete; replies under the comment are left as they are.
pub async fn delete_comment(repo: &dyn Repo, cmd: DeleteComment) -> Result<(), ApiError> {
    repo.verify_thread_exists(&cmd.thread_id).await?;
    repo.verify_comment_owner(&cmd.comment_id, &cmd.owner).await?;
    repo.soft_delete_comment(&cmd.comment_id).await?;
    info!(comment_id = %cmd.comment_id, "comment soft-deleted");
    Ok(())
}

pub async fn add_reply(
    repo: &dyn Repo,
    payload: &Value,
    thread_id: &str,
    comment_id: &str,
    owner: &str,
) -> Result<AddedReply, ApiError> {
    let new = NewReply::from_payload(payload, thread_id, comment_id, owner)?;
    repo.verify_comment_exists(&new.comment_id).await?;
    let added = repo.add_reply(new).await?;
    info!(comment_id, reply_id = %added.id, owner, "reply added");
    Ok(added)
}

pub async fn delete_reply(repo: &dyn Repo, cmd: DeleteReply) -> Result<(), ApiError> {
    repo.verify_thread_exists(&cmd.thread_id).await?;
    repo.verify_comment_exists(&cmd.comment_id).await?;
    repo.verify_reply_owner(&cmd.reply_id, &cmd.owner).await?;
    repo.soft_delete_reply(&cmd.reply_id).await?;
    info!(reply_id = %cmd.reply_id, "reply soft-deleted");
    Ok(())
}

/// Likes the comment if the caller has not liked it yet, unlikes it otherwise.
/// Returns whether the comment is liked afterwards.
///
/// Two concurrent toggles by the same user can both observe "not liked"; the
/// storage uniqueness constraint rejects the second insert with `Conflict`.
pub async fn toggle_comment_like(repo: &dyn Repo, cmd: LikeComment) -> Result<bool, ApiError> {
    repo.verify_thread_exists(&cmd.thread_id).await?;
    repo.verify_comment_exists(&cmd.comment_id).await?;
    let liked = repo.is_comment_liked(&cmd.comment_id, &cmd.user_id).await?;
    if liked {
        repo.delete_comment_like(&cmd.comment_id, &cmd.user_id).await?;
    } else {
        repo.add_comment_like(&cmd.comment_id, &cmd.user_id).await?;
    }
    info!(comment_id = %cmd.comment_id, user_id = %cmd.user_id, liked = !liked, "comment like toggled");
    Ok(!liked)
}
