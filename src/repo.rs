use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("{0} not found")] NotFound(Entity),
    #[error("caller does not own this {0}")] Forbidden(Entity),
    #[error("conflict")] Conflict,
    #[error("database error: {0}")] Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn add_user(&self, new: NewUser) -> RepoResult<User>;
}

#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn add_thread(&self, new: NewThread) -> RepoResult<AddedThread>;
    /// `NotFound(Thread)` when no such thread.
    async fn verify_thread_exists(&self, id: &str) -> RepoResult<()>;
    async fn get_thread(&self, id: &str) -> RepoResult<Thread>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn add_comment(&self, new: NewComment) -> RepoResult<AddedComment>;
    async fn verify_comment_exists(&self, id: &str) -> RepoResult<()>;
    /// `NotFound(Comment)` if absent, `Forbidden(Comment)` if `owner` differs.
    async fn verify_comment_owner(&self, id: &str, owner: &str) -> RepoResult<()>;
    /// Flags the row deleted; content stays in storage and replies are untouched.
    async fn soft_delete_comment(&self, id: &str) -> RepoResult<()>;
    /// Ascending by creation time, ties broken by id.
    async fn list_comments_by_thread(&self, thread_id: &str) -> RepoResult<Vec<Comment>>;
}

#[async_trait]
pub trait LikeRepo: Send + Sync {
    async fn is_comment_liked(&self, comment_id: &str, user_id: &str) -> RepoResult<bool>;
    /// `Conflict` when the (comment, user) pair already has a like.
    async fn add_comment_like(&self, comment_id: &str, user_id: &str) -> RepoResult<()>;
    async fn delete_comment_like(&self, comment_id: &str, user_id: &str) -> RepoResult<()>;
    /// Comments without likes are absent from the map.
    async fn like_counts_for(&self, comment_ids: &[Id]) -> RepoResult<HashMap<Id, u64>>;
}

#[async_trait]
pub trait ReplyRepo: Send + Sync {
    async fn add_reply(&self, new: NewReply) -> RepoResult<AddedReply>;
    async fn verify_reply_owner(&self, id: &str, owner: &str) -> RepoResult<()>;
    async fn soft_delete_reply(&self, id: &str) -> RepoResult<()>;
    /// Ascending by creation time, ties broken by id.
    async fn list_replies_by_comments(&self, comment_ids: &[Id]) -> RepoResult<Vec<Reply>>;
}

pub trait Repo: UserRepo + ThreadRepo + CommentRepo + LikeRepo + ReplyRepo {}

impl<T> Repo for T where T: UserRepo + ThreadRepo + CommentRepo + LikeRepo + ReplyRepo {}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::HashSet;
    use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

    #[derive(Default)]
    struct State {
        users: HashMap<Id, User>,
        threads: HashMap<Id, Thread>,
        comments: HashMap<Id, Comment>,
        replies: HashMap<Id, Reply>,
        likes: HashSet<(Id, Id)>, // (comment_id, user_id)
        next_id: u64,
        last_created: Option<DateTime<Utc>>,
    }

    impl State {
        fn next_id(&mut self, entity: Entity) -> Id {
            self.next_id += 1;
            format!("{}-{}", entity, self.next_id)
        }

        // Strictly increasing so rows created back-to-back still order by insertion.
        fn stamp(&mut self) -> DateTime<Utc> {
            let now = Utc::now();
            let at = match self.last_created {
                Some(last) if now <= last => last + Duration::microseconds(1),
                _ => now,
            };
            self.last_created = Some(at);
            at
        }

        // Mirrors the LEFT JOIN in the Postgres backend: unknown owners fall back to their id.
        fn username_of(&self, owner: &str) -> String {
            self.users.get(owner).map(|u| u.username.clone()).unwrap_or_else(|| owner.to_string())
        }
    }

    /// Process-local backend; state is lost on restart.
    #[derive(Clone, Default)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
    }

    impl InMemRepo {
        pub fn new() -> Self {
            Self::default()
        }

        fn read(&self) -> RwLockReadGuard<'_, State> {
            self.state.read().unwrap_or_else(PoisonError::into_inner)
        }

        fn write(&self) -> RwLockWriteGuard<'_, State> {
            self.state.write().unwrap_or_else(PoisonError::into_inner)
        }
    }

    #[async_trait]
    impl UserRepo for InMemRepo {
        async fn add_user(&self, new: NewUser) -> RepoResult<User> {
            let mut s = self.write();
            if s.users.values().any(|u| u.username == new.username) {
                return Err(RepoError::Conflict);
            }
            let id = s.next_id(Entity::User);
            let user = User { id: id.clone(), username: new.username, fullname: new.fullname };
            s.users.insert(id, user.clone());
            Ok(user)
        }
    }

    #[async_trait]
    impl ThreadRepo for InMemRepo {
        async fn add_thread(&self, new: NewThread) -> RepoResult<AddedThread> {
            let mut s = self.write();
            let id = s.next_id(Entity::Thread);
            let created_at = s.stamp();
            let thread = Thread {
                id: id.clone(),
                title: new.title,
                body: new.body,
                owner: new.owner,
                username: String::new(),
                created_at,
            };
            let added = AddedThread { id: id.clone(), title: thread.title.clone(), owner: thread.owner.clone() };
            s.threads.insert(id, thread);
            Ok(added)
        }
        async fn verify_thread_exists(&self, id: &str) -> RepoResult<()> {
            if self.read().threads.contains_key(id) { Ok(()) } else { Err(RepoError::NotFound(Entity::Thread)) }
        }
        async fn get_thread(&self, id: &str) -> RepoResult<Thread> {
            let s = self.read();
            let mut t = s.threads.get(id).cloned().ok_or(RepoError::NotFound(Entity::Thread))?;
            t.username = s.username_of(&t.owner);
            Ok(t)
        }
    }

    #[async_trait]
    impl CommentRepo for InMemRepo {
        async fn add_comment(&self, new: NewComment) -> RepoResult<AddedComment> {
            let mut s = self.write();
            // foreign key on comments.thread_id
            if !s.threads.contains_key(&new.thread_id) { return Err(RepoError::NotFound(Entity::Thread)); }
            let id = s.next_id(Entity::Comment);
            let created_at = s.stamp();
            let added = AddedComment { id: id.clone(), content: new.content.clone(), owner: new.owner.clone() };
            s.comments.insert(id.clone(), Comment {
                id,
                thread_id: new.thread_id,
                content: new.content,
                owner: new.owner,
                username: String::new(),
                created_at,
                is_deleted: false,
            });
            Ok(added)
        }
        async fn verify_comment_exists(&self, id: &str) -> RepoResult<()> {
            if self.read().comments.contains_key(id) { Ok(()) } else { Err(RepoError::NotFound(Entity::Comment)) }
        }
        async fn verify_comment_owner(&self, id: &str, owner: &str) -> RepoResult<()> {
            let s = self.read();
            let c = s.comments.get(id).ok_or(RepoError::NotFound(Entity::Comment))?;
            if c.owner != owner { return Err(RepoError::Forbidden(Entity::Comment)); }
            Ok(())
        }
        async fn soft_delete_comment(&self, id: &str) -> RepoResult<()> {
            let mut s = self.write();
            let c = s.comments.get_mut(id).ok_or(RepoError::NotFound(Entity::Comment))?;
            c.is_deleted = true;
            Ok(())
        }
        async fn list_comments_by_thread(&self, thread_id: &str) -> RepoResult<Vec<Comment>> {
            let s = self.read();
            let mut v: Vec<_> = s.comments.values()
                .filter(|c| c.thread_id == thread_id)
                .cloned()
                .map(|mut c| { c.username = s.username_of(&c.owner); c })
                .collect();
            v.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            Ok(v)
        }
    }

    #[async_trait]
    impl LikeRepo for InMemRepo {
        async fn is_comment_liked(&self, comment_id: &str, user_id: &str) -> RepoResult<bool> {
            Ok(self.read().likes.contains(&(comment_id.to_string(), user_id.to_string())))
        }
        async fn add_comment_like(&self, comment_id: &str, user_id: &str) -> RepoResult<()> {
            let mut s = self.write();
            if !s.comments.contains_key(comment_id) { return Err(RepoError::NotFound(Entity::Comment)); }
            if !s.likes.insert((comment_id.to_string(), user_id.to_string())) {
                return Err(RepoError::Conflict);
            }
            Ok(())
        }
        async fn delete_comment_like(&self, comment_id: &str, user_id: &str) -> RepoResult<()> {
            self.write().likes.remove(&(comment_id.to_string(), user_id.to_string()));
            Ok(())
        }
        async fn like_counts_for(&self, comment_ids: &[Id]) -> RepoResult<HashMap<Id, u64>> {
            let wanted: HashSet<&str> = comment_ids.iter().map(String::as_str).collect();
            let mut counts = HashMap::new();
            for (comment_id, _) in self.read().likes.iter() {
                if wanted.contains(comment_id.as_str()) {
                    *counts.entry(comment_id.clone()).or_insert(0) += 1;
                }
            }
            Ok(counts)
        }
    }

    #[async_trait]
    impl ReplyRepo for InMemRepo {
        async fn add_reply(&self, new: NewReply) -> RepoResult<AddedReply> {
            let mut s = self.write();
            if !s.comments.contains_key(&new.comment_id) { return Err(RepoError::NotFound(Entity::Comment)); }
            let id = s.next_id(Entity::Reply);
            let created_at = s.stamp();
            let added = AddedReply { id: id.clone(), content: new.content.clone(), owner: new.owner.clone() };
            s.replies.insert(id.clone(), Reply {
                id,
                comment_id: new.comment_id,
                content: new.content,
                owner: new.owner,
                username: String::new(),
                created_at,
                is_deleted: false,
            });
            Ok(added)
        }
        async fn verify_reply_owner(&self, id: &str, owner: &str) -> RepoResult<()> {
            let s = self.read();
            let r = s.replies.get(id).ok_or(RepoError::NotFound(Entity::Reply))?;
            if r.owner != owner { return Err(RepoError::Forbidden(Entity::Reply)); }
            Ok(())
        }
        async fn soft_delete_reply(&self, id: &str) -> RepoResult<()> {
            let mut s = self.write();
            let r = s.replies.get_mut(id).ok_or(RepoError::NotFound(Entity::Reply))?;
            r.is_deleted = true;
            Ok(())
        }
        async fn list_replies_by_comments(&self, comment_ids: &[Id]) -> RepoResult<Vec<Reply>> {
            let wanted: HashSet<&str> = comment_ids.iter().map(String::as_str).collect();
            let s = self.read();
            let mut v: Vec<_> = s.replies.values()
                .filter(|r| wanted.contains(r.comment_id.as_str()))
                .cloned()
                .map(|mut r| { r.username = s.username_of(&r.owner); r })
                .collect();
            v.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            Ok(v)
        }
    }
}

// Postgres implementation (feature = "postgres-store")
#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use chrono::Utc;
    use sqlx::{Pool, Postgres};
    use uuid::Uuid;

    fn new_id(entity: Entity) -> Id {
        format!("{}-{}", entity, Uuid::new_v4().simple())
    }

    // Unique violations are the storage-level race guard (e.g. double like).
    fn map_write_err(e: sqlx::Error) -> RepoError {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => RepoError::Conflict,
            other => RepoError::Database(other),
        }
    }

    #[derive(Clone)]
    pub struct PgRepo { pool: Pool<Postgres> }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }

        /// Applies the embedded schema migrations.
        pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
            sqlx::migrate!("./migrations").run(&self.pool).await
        }
    }

    #[async_trait]
    impl UserRepo for PgRepo {
        async fn add_user(&self, new: NewUser) -> RepoResult<User> {
            let rec = sqlx::query_as::<_, User>(
                "INSERT INTO users (id, username, fullname) VALUES ($1,$2,$3) RETURNING id, username, fullname"
            )
            .bind(new_id(Entity::User)).bind(&new.username).bind(&new.fullname)
            .fetch_one(&self.pool).await.map_err(map_write_err)?;
            Ok(rec)
        }
    }

    #[async_trait]
    impl ThreadRepo for PgRepo {
        async fn add_thread(&self, new: NewThread) -> RepoResult<AddedThread> {
            let rec = sqlx::query_as::<_, AddedThread>(
                "INSERT INTO threads (id, title, body, owner, created_at) VALUES ($1,$2,$3,$4,$5) RETURNING id, title, owner"
            )
            .bind(new_id(Entity::Thread)).bind(&new.title).bind(&new.body).bind(&new.owner).bind(Utc::now())
            .fetch_one(&self.pool).await.map_err(map_write_err)?;
            Ok(rec)
        }
        async fn verify_thread_exists(&self, id: &str) -> RepoResult<()> {
            sqlx::query_scalar::<_, i32>("SELECT 1 FROM threads WHERE id=$1")
                .bind(id)
                .fetch_optional(&self.pool).await?
                .map(|_| ())
                .ok_or(RepoError::NotFound(Entity::Thread))
        }
        async fn get_thread(&self, id: &str) -> RepoResult<Thread> {
            sqlx::query_as::<_, Thread>(r#"
                SELECT t.id, t.title, t.body, t.owner, COALESCE(u.username, t.owner) AS username, t.created_at
                FROM threads t
                LEFT JOIN users u ON u.id = t.owner
                WHERE t.id = $1
            "#)
                .bind(id)
                .fetch_optional(&self.pool).await?
                .ok_or(RepoError::NotFound(Entity::Thread))
        }
    }

    #[async_trait]
    impl CommentRepo for PgRepo {
        async fn add_comment(&self, new: NewComment) -> RepoResult<AddedComment> {
            let rec = sqlx::query_as::<_, AddedComment>(
                "INSERT INTO comments (id, thread_id, content, owner, created_at) VALUES ($1,$2,$3,$4,$5) RETURNING id, content, owner"
            )
            .bind(new_id(Entity::Comment)).bind(&new.thread_id).bind(&new.content).bind(&new.owner).bind(Utc::now())
            .fetch_one(&self.pool).await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => RepoError::NotFound(Entity::Thread),
                other => map_write_err(other),
            })?;
            Ok(rec)
        }
        async fn verify_comment_exists(&self, id: &str) -> RepoResult<()> {
            sqlx::query_scalar::<_, i32>("SELECT 1 FROM comments WHERE id=$1")
                .bind(id)
                .fetch_optional(&self.pool).await?
                .map(|_| ())
                .ok_or(RepoError::NotFound(Entity::Comment))
        }
        async fn verify_comment_owner(&self, id: &str, owner: &str) -> RepoResult<()> {
            let found = sqlx::query_scalar::<_, String>("SELECT owner FROM comments WHERE id=$1")
                .bind(id)
                .fetch_optional(&self.pool).await?
                .ok_or(RepoError::NotFound(Entity::Comment))?;
            if found != owner { return Err(RepoError::Forbidden(Entity::Comment)); }
            Ok(())
        }
        async fn soft_delete_comment(&self, id: &str) -> RepoResult<()> {
            let res = sqlx::query("UPDATE comments SET is_delete = TRUE WHERE id=$1")
                .bind(id)
                .execute(&self.pool).await?;
            if res.rows_affected() == 0 { return Err(RepoError::NotFound(Entity::Comment)); }
            Ok(())
        }
        async fn list_comments_by_thread(&self, thread_id: &str) -> RepoResult<Vec<Comment>> {
            let recs = sqlx::query_as::<_, Comment>(r#"
                SELECT c.id, c.thread_id, c.content, c.owner, COALESCE(u.username, c.owner) AS username,
                       c.created_at, c.is_delete
                FROM comments c
                LEFT JOIN users u ON u.id = c.owner
                WHERE c.thread_id = $1
                ORDER BY c.created_at ASC, c.id ASC
            "#)
                .bind(thread_id)
                .fetch_all(&self.pool).await?;
            Ok(recs)
        }
    }

    #[async_trait]
    impl LikeRepo for PgRepo {
        async fn is_comment_liked(&self, comment_id: &str, user_id: &str) -> RepoResult<bool> {
            let liked = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM comment_likes WHERE comment_id=$1 AND user_id=$2)"
            )
            .bind(comment_id).bind(user_id)
            .fetch_one(&self.pool).await?;
            Ok(liked)
        }
        async fn add_comment_like(&self, comment_id: &str, user_id: &str) -> RepoResult<()> {
            sqlx::query("INSERT INTO comment_likes (id, comment_id, user_id) VALUES ($1,$2,$3)")
                .bind(format!("like-{}", Uuid::new_v4().simple())).bind(comment_id).bind(user_id)
                .execute(&self.pool).await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => RepoError::NotFound(Entity::Comment),
                    other => map_write_err(other),
                })?;
            Ok(())
        }
        async fn delete_comment_like(&self, comment_id: &str, user_id: &str) -> RepoResult<()> {
            sqlx::query("DELETE FROM comment_likes WHERE comment_id=$1 AND user_id=$2")
                .bind(comment_id).bind(user_id)
                .execute(&self.pool).await?;
            Ok(())
        }
        async fn like_counts_for(&self, comment_ids: &[Id]) -> RepoResult<HashMap<Id, u64>> {
            if comment_ids.is_empty() { return Ok(HashMap::new()); }
            let rows = sqlx::query_as::<_, (String, i64)>(
                "SELECT comment_id, COUNT(*) AS like_count FROM comment_likes WHERE comment_id = ANY($1) GROUP BY comment_id"
            )
            .bind(comment_ids)
            .fetch_all(&self.pool).await?;
            Ok(rows.into_iter().map(|(id, n)| (id, u64::try_from(n).unwrap_or(0))).collect())
        }
    }

    #[async_trait]
    impl ReplyRepo for PgRepo {
        async fn add_reply(&self, new: NewReply) -> RepoResult<AddedReply> {
            let rec = sqlx::query_as::<_, AddedReply>(
                "INSERT INTO replies (id, comment_id, content, owner, created_at) VALUES ($1,$2,$3,$4,$5) RETURNING id, content, owner"
            )
            .bind(new_id(Entity::Reply)).bind(&new.comment_id).bind(&new.content).bind(&new.owner).bind(Utc::now())
            .fetch_one(&self.pool).await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => RepoError::NotFound(Entity::Comment),
                other => map_write_err(other),
            })?;
            Ok(rec)
        }
        async fn verify_reply_owner(&self, id: &str, owner: &str) -> RepoResult<()> {
            let found = sqlx::query_scalar::<_, String>("SELECT owner FROM replies WHERE id=$1")
                .bind(id)
                .fetch_optional(&self.pool).await?
                .ok_or(RepoError::NotFound(Entity::Reply))?;
            if found != owner { return Err(RepoError::Forbidden(Entity::Reply)); }
            Ok(())
        }
        async fn soft_delete_reply(&self, id: &str) -> RepoResult<()> {
            let res = sqlx::query("UPDATE replies SET is_delete = TRUE WHERE id=$1")
                .bind(id)
                .execute(&self.pool).await?;
            if res.rows_affected() == 0 { return Err(RepoError::NotFound(Entity::Reply)); }
            Ok(())
        }
        async fn list_replies_by_comments(&self, comment_ids: &[Id]) -> RepoResult<Vec<Reply>> {
            if comment_ids.is_empty() { return Ok(Vec::new()); }
            let recs = sqlx::query_as::<_, Reply>(r#"
                SELECT r.id, r.comment_id, r.content, r.owner, COALESCE(u.username, r.owner) AS username,
                       r.created_at, r.is_delete
                FROM replies r
                LEFT JOIN users u ON u.id = r.owner
                WHERE r.comment_id = ANY($1)
                ORDER BY r.created_at ASC, r.id ASC
            "#)
                .bind(comment_ids)
                .fetch_all(&self.pool).await?;
            Ok(recs)
        }
    }
}
