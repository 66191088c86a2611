use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use forum_api::get_thread_detail;
use forum_api::models::*;
use forum_api::repo::{CommentRepo, LikeRepo, ReplyRepo, RepoError, RepoResult, ThreadRepo, UserRepo};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
}

/// Canned read-side repository that records which gateway calls were made.
#[derive(Default)]
struct FakeRepo {
    thread: Option<Thread>,
    comments: Vec<Comment>,
    replies: Vec<Reply>,
    likes: HashMap<Id, u64>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeRepo {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepo for FakeRepo {
    async fn add_user(&self, _new: NewUser) -> RepoResult<User> { unimplemented!() }
}

#[async_trait]
impl ThreadRepo for FakeRepo {
    async fn add_thread(&self, _new: NewThread) -> RepoResult<AddedThread> { unimplemented!() }
    async fn verify_thread_exists(&self, _id: &str) -> RepoResult<()> { unimplemented!() }
    async fn get_thread(&self, id: &str) -> RepoResult<Thread> {
        self.record("get_thread");
        self.thread.clone().filter(|t| t.id == id).ok_or(RepoError::NotFound(Entity::Thread))
    }
}

#[async_trait]
impl CommentRepo for FakeRepo {
    async fn add_comment(&self, _new: NewComment) -> RepoResult<AddedComment> { unimplemented!() }
    async fn verify_comment_exists(&self, _id: &str) -> RepoResult<()> { unimplemented!() }
    async fn verify_comment_owner(&self, _id: &str, _owner: &str) -> RepoResult<()> { unimplemented!() }
    async fn soft_delete_comment(&self, _id: &str) -> RepoResult<()> { unimplemented!() }
    async fn list_comments_by_thread(&self, thread_id: &str) -> RepoResult<Vec<Comment>> {
        self.record("list_comments_by_thread");
        Ok(self.comments.iter().filter(|c| c.thread_id == thread_id).cloned().collect())
    }
}

#[async_trait]
impl LikeRepo for FakeRepo {
    async fn is_comment_liked(&self, _c: &str, _u: &str) -> RepoResult<bool> { unimplemented!() }
    async fn add_comment_like(&self, _c: &str, _u: &str) -> RepoResult<()> { unimplemented!() }
    async fn delete_comment_like(&self, _c: &str, _u: &str) -> RepoResult<()> { unimplemented!() }
    async fn like_counts_for(&self, comment_ids: &[Id]) -> RepoResult<HashMap<Id, u64>> {
        self.record("like_counts_for");
        Ok(self.likes.iter().filter(|(id, _)| comment_ids.contains(*id)).map(|(k, v)| (k.clone(), *v)).collect())
    }
}

#[async_trait]
impl ReplyRepo for FakeRepo {
    async fn add_reply(&self, _new: NewReply) -> RepoResult<AddedReply> { unimplemented!() }
    async fn verify_reply_owner(&self, _id: &str, _owner: &str) -> RepoResult<()> { unimplemented!() }
    async fn soft_delete_reply(&self, _id: &str) -> RepoResult<()> { unimplemented!() }
    async fn list_replies_by_comments(&self, comment_ids: &[Id]) -> RepoResult<Vec<Reply>> {
        self.record("list_replies_by_comments");
        Ok(self.replies.iter().filter(|r| comment_ids.contains(&r.comment_id)).cloned().collect())
    }
}

fn comment(id: &str, username: &str, secs: i64, is_deleted: bool) -> Comment {
    Comment {
        id: id.into(),
        thread_id: "thread-1".into(),
        content: format!("isi {id}"),
        owner: format!("owner-of-{id}"),
        username: username.into(),
        created_at: at(secs),
        is_deleted,
    }
}

fn reply(id: &str, comment_id: &str, secs: i64, is_deleted: bool) -> Reply {
    Reply {
        id: id.into(),
        comment_id: comment_id.into(),
        content: format!("isi {id}"),
        owner: "user-3".into(),
        username: "budi".into(),
        created_at: at(secs),
        is_deleted,
    }
}

/// t1 with c1 (alice, 2 likes, replies r1 and a deleted r2) and a deleted c2 (bob).
fn scenario() -> FakeRepo {
    let mut likes = HashMap::new();
    likes.insert("comment-1".to_string(), 2);
    FakeRepo {
        thread: Some(Thread {
            id: "thread-1".into(),
            title: "judul".into(),
            body: "isi thread".into(),
            owner: "user-1".into(),
            username: "dicoding".into(),
            created_at: at(0),
        }),
        // storage order deliberately scrambled
        comments: vec![comment("comment-2", "bob", 20, true), comment("comment-1", "alice", 10, false)],
        replies: vec![reply("reply-2", "comment-1", 40, true), reply("reply-1", "comment-1", 30, false)],
        likes,
        calls: Mutex::new(Vec::new()),
    }
}

#[tokio::test]
async fn unknown_thread_fails_before_any_other_query() {
    let repo = FakeRepo::default();
    let err = get_thread_detail(&repo, "thread-x").await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(Entity::Thread)));
    assert_eq!(repo.calls(), vec!["get_thread"]);
}

#[tokio::test]
async fn assembles_full_thread_view() {
    let repo = scenario();
    let t = get_thread_detail(&repo, "thread-1").await.unwrap();

    assert_eq!(t.id, "thread-1");
    assert_eq!(t.username, "dicoding");
    assert_eq!(t.date, at(0));
    assert_eq!(t.comments.len(), 2);

    let c1 = &t.comments[0];
    assert_eq!(c1.id, "comment-1");
    assert_eq!(c1.username, "alice");
    assert_eq!(c1.content, "isi comment-1");
    assert_eq!(c1.like_count, 2);
    let reply_contents: Vec<_> = c1.replies.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(reply_contents, vec!["isi reply-1", DELETED_REPLY_CONTENT]);

    let c2 = &t.comments[1];
    assert_eq!(c2.content, DELETED_COMMENT_CONTENT);
    assert_eq!(c2.like_count, 0);
    assert!(c2.replies.is_empty());

    let calls = repo.calls();
    assert_eq!(calls[..2], ["get_thread", "list_comments_by_thread"]);
    assert_eq!(calls.len(), 4);
}

#[tokio::test]
async fn thread_without_comments_has_empty_list() {
    let mut repo = scenario();
    repo.comments.clear();
    repo.replies.clear();
    let t = get_thread_detail(&repo, "thread-1").await.unwrap();
    assert!(t.comments.is_empty());
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let repo = scenario();
    let first = get_thread_detail(&repo, "thread-1").await.unwrap();
    let second = get_thread_detail(&repo, "thread-1").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn wire_shape_uses_camel_case_and_hides_internal_fields() {
    let repo = scenario();
    let t = get_thread_detail(&repo, "thread-1").await.unwrap();
    let v = serde_json::to_value(&t).unwrap();
    assert_eq!(v["comments"][0]["likeCount"], 2);
    assert!(v["comments"][0].get("is_deleted").is_none());
    assert!(v["comments"][0]["replies"][0].get("likeCount").is_none());
    assert_eq!(v["comments"][0]["replies"][1]["content"], DELETED_REPLY_CONTENT);
}
