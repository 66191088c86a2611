//! Builds well-formed commands from untrusted request input.
//!
//! Request bodies arrive as raw JSON so that a missing property and a property of
//! the wrong type can be told apart. Empty values (`null`, `""`, `0`, `false`)
//! count as missing.

use serde_json::Value;

use crate::models::{DeleteComment, DeleteReply, Id, LikeComment, NewComment, NewReply, NewThread};

/// The command a validation failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Thread,
    Comment,
    Reply,
    DeleteComment,
    DeleteReply,
    LikeComment,
}

impl Target {
    fn action(self) -> &'static str {
        match self {
            Target::Thread => "membuat thread baru",
            Target::Comment => "membuat comment baru",
            Target::Reply => "membuat reply baru",
            Target::DeleteComment => "menghapus comment",
            Target::DeleteReply => "menghapus reply",
            Target::LikeComment => "menyukai comment",
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("tidak dapat {} karena properti yang dibutuhkan tidak ada", .0.action())]
    MissingProperty(Target),
    #[error("tidak dapat {} karena tipe data tidak sesuai", .0.action())]
    InvalidType(Target),
}

enum Field<'a> {
    Missing,
    WrongType,
    Str(&'a str),
}

fn field<'a>(payload: &'a Value, name: &str) -> Field<'a> {
    match payload.get(name) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Field::Missing,
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Field::Missing,
        Some(Value::String(s)) if s.is_empty() => Field::Missing,
        Some(Value::String(s)) => Field::Str(s),
        Some(_) => Field::WrongType,
    }
}

/// Reads all `names` from `payload`. Any missing field wins over any mistyped one,
/// so `{}` and `{"title": 1}` report different problems.
fn string_fields<'a, const N: usize>(
    payload: &'a Value,
    names: [&str; N],
    target: Target,
) -> Result<[&'a str; N], ValidationError> {
    if !payload.is_object() {
        return Err(ValidationError::MissingProperty(target));
    }
    let fields = names.map(|n| field(payload, n));
    if fields.iter().any(|f| matches!(f, Field::Missing)) {
        return Err(ValidationError::MissingProperty(target));
    }
    let mut out = [""; N];
    for (slot, f) in out.iter_mut().zip(fields) {
        match f {
            Field::Str(s) => *slot = s,
            _ => return Err(ValidationError::InvalidType(target)),
        }
    }
    Ok(out)
}

fn require_ids(ids: &[&str], target: Target) -> Result<(), ValidationError> {
    if ids.iter().any(|s| s.is_empty()) {
        return Err(ValidationError::MissingProperty(target));
    }
    Ok(())
}

impl NewThread {
    pub fn from_payload(payload: &Value, owner: &str) -> Result<Self, ValidationError> {
        let [title, body] = string_fields(payload, ["title", "body"], Target::Thread)?;
        require_ids(&[owner], Target::Thread)?;
        Ok(Self { title: title.to_string(), body: body.to_string(), owner: owner.to_string() })
    }
}

impl NewComment {
    pub fn from_payload(payload: &Value, thread_id: &str, owner: &str) -> Result<Self, ValidationError> {
        let [content] = string_fields(payload, ["content"], Target::Comment)?;
        require_ids(&[thread_id, owner], Target::Comment)?;
        Ok(Self { thread_id: thread_id.to_string(), content: content.to_string(), owner: owner.to_string() })
    }
}

impl NewReply {
    pub fn from_payload(
        payload: &Value,
        thread_id: &str,
        comment_id: &str,
        owner: &str,
    ) -> Result<Self, ValidationError> {
        let [content] = string_fields(payload, ["content"], Target::Reply)?;
        require_ids(&[thread_id, comment_id, owner], Target::Reply)?;
        Ok(Self {
            thread_id: thread_id.to_string(),
            comment_id: comment_id.to_string(),
            content: content.to_string(),
            owner: owner.to_string(),
        })
    }
}

impl DeleteComment {
    pub fn new(thread_id: Id, comment_id: Id, owner: Id) -> Result<Self, ValidationError> {
        require_ids(&[thread_id.as_str(), comment_id.as_str(), owner.as_str()], Target::DeleteComment)?;
        Ok(Self { thread_id, comment_id, owner })
    }
}

impl DeleteReply {
    pub fn new(thread_id: Id, comment_id: Id, reply_id: Id, owner: Id) -> Result<Self, ValidationError> {
        require_ids(&[thread_id.as_str(), comment_id.as_str(), reply_id.as_str(), owner.as_str()], Target::DeleteReply)?;
        Ok(Self { thread_id, comment_id, reply_id, owner })
    }
}

impl LikeComment {
    pub fn new(thread_id: Id, comment_id: Id, user_id: Id) -> Result<Self, ValidationError> {
        require_ids(&[thread_id.as_str(), comment_id.as_str(), user_id.as_str()], Target::LikeComment)?;
        Ok(Self { thread_id, comment_id, user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_thread_reports_missing_before_type() {
        let err = NewThread::from_payload(&json!({"title": "t"}), "user-1").unwrap_err();
        assert_eq!(err, ValidationError::MissingProperty(Target::Thread));

        let err = NewThread::from_payload(&json!({"title": 1, "body": true}), "user-1").unwrap_err();
        assert_eq!(err, ValidationError::InvalidType(Target::Thread));
    }

    #[test]
    fn new_thread_accepts_well_formed_payload() {
        let t = NewThread::from_payload(&json!({"title": "t", "body": "b", "extra": 3}), "user-1").unwrap();
        assert_eq!(t, NewThread { title: "t".into(), body: "b".into(), owner: "user-1".into() });
    }

    #[test]
    fn empty_strings_and_non_objects_count_as_missing() {
        let err = NewComment::from_payload(&json!({"content": ""}), "thread-1", "user-1").unwrap_err();
        assert_eq!(err, ValidationError::MissingProperty(Target::Comment));
        let err = NewComment::from_payload(&json!("content"), "thread-1", "user-1").unwrap_err();
        assert_eq!(err, ValidationError::MissingProperty(Target::Comment));
    }

    #[test]
    fn empty_non_string_values_count_as_missing() {
        for content in [json!(0), json!(false), json!(0.0)] {
            let err = NewComment::from_payload(&json!({ "content": content }), "thread-1", "user-1").unwrap_err();
            assert_eq!(err, ValidationError::MissingProperty(Target::Comment));
        }
        // non-empty values of the wrong type stay type errors
        for content in [json!(1), json!(true), json!([]), json!({})] {
            let err = NewComment::from_payload(&json!({ "content": content }), "thread-1", "user-1").unwrap_err();
            assert_eq!(err, ValidationError::InvalidType(Target::Comment));
        }
    }

    #[test]
    fn new_comment_rejects_mistyped_content() {
        let err = NewComment::from_payload(&json!({"content": 123}), "thread-1", "user-1").unwrap_err();
        assert_eq!(err.to_string(), "tidak dapat membuat comment baru karena tipe data tidak sesuai");
    }

    #[test]
    fn new_reply_carries_path_context() {
        let r = NewReply::from_payload(&json!({"content": "hi"}), "thread-1", "comment-1", "user-1").unwrap();
        assert_eq!(r.comment_id, "comment-1");
        assert_eq!(r.thread_id, "thread-1");
        let err = NewReply::from_payload(&json!({"content": []}), "thread-1", "comment-1", "user-1").unwrap_err();
        assert_eq!(err, ValidationError::InvalidType(Target::Reply));
    }

    #[test]
    fn commands_require_every_id() {
        assert!(DeleteComment::new("thread-1".into(), "".into(), "user-1".into()).is_err());
        assert!(DeleteReply::new("thread-1".into(), "comment-1".into(), "reply-1".into(), "user-1".into()).is_ok());
        let err = LikeComment::new("thread-1".into(), "comment-1".into(), "".into()).unwrap_err();
        assert_eq!(err, ValidationError::MissingProperty(Target::LikeComment));
    }
}
