use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde_json::{json, Value};

use crate::auth::Auth;
use crate::detail::get_thread_detail;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::{
    AddedComment, AddedReply, AddedThread, ContentPayload, DeleteComment, DeleteReply, DetailThread,
    LikeComment, ThreadPayload,
};
use crate::repo::Repo;
use crate::service;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/threads").route(web::post().to(post_thread)))
        .service(web::resource("/threads/{thread_id}").route(web::get().to(get_thread)))
        .service(
            web::resource("/threads/{thread_id}/comments")
                .route(web::post().to(post_comment)),
        )
        .service(
            web::resource("/threads/{thread_id}/comments/{comment_id}")
                .route(web::delete().to(delete_comment)),
        )
        .service(
            web::resource("/threads/{thread_id}/comments/{comment_id}/likes")
                .route(web::put().to(put_comment_like)),
        )
        .service(
            web::resource("/threads/{thread_id}/comments/{comment_id}/replies")
                .route(web::post().to(post_reply)),
        )
        .service(
            web::resource("/threads/{thread_id}/comments/{comment_id}/replies/{reply_id}")
                .route(web::delete().to(delete_reply)),
        );
}

#[derive(Clone)]
pub struct AppState { pub repo: Arc<dyn Repo> }

// A missing or unparsable body is validated like an empty payload.
fn payload(body: Option<web::Json<Value>>) -> Value {
    body.map(web::Json::into_inner).unwrap_or(Value::Null)
}

fn success() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "success" }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[utoipa::path(
    post,
    path = "/threads",
    request_body = ThreadPayload,
    responses(
        (status = 201, description = "Thread created", body = AddedThread),
        (status = 400, description = "Missing or mistyped property", body = ApiErrorBody),
        (status = 401, description = "Missing authentication", body = ApiErrorBody)
    ),
    tag = "threads"
)]
pub async fn post_thread(
    auth: Auth,
    data: web::Data<AppState>,
    body: Option<web::Json<Value>>,
) -> Result<HttpResponse, ApiError> {
    let added = service::add_thread(&*data.repo, &payload(body), auth.user_id()).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "success", "data": { "addedThread": added } })))
}

#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(("thread_id" = String, Path, description = "Thread id")),
    responses(
        (status = 200, description = "Thread with comments, like counts and replies", body = DetailThread),
        (status = 404, description = "Thread not found", body = ApiErrorBody)
    ),
    tag = "threads"
)]
pub async fn get_thread(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let thread = get_thread_detail(&*data.repo, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success", "data": { "thread": thread } })))
}

#[utoipa::path(
    post,
    path = "/threads/{thread_id}/comments",
    params(("thread_id" = String, Path, description = "Thread id")),
    request_body = ContentPayload,
    responses(
        (status = 201, description = "Comment created", body = AddedComment),
        (status = 400, description = "Missing or mistyped property", body = ApiErrorBody),
        (status = 401, description = "Missing authentication", body = ApiErrorBody),
        (status = 404, description = "Thread not found", body = ApiErrorBody)
    ),
    tag = "comments"
)]
pub async fn post_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<Value>>,
) -> Result<HttpResponse, ApiError> {
    let thread_id = path.into_inner();
    let added = service::add_comment(&*data.repo, &payload(body), &thread_id, auth.user_id()).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "success", "data": { "addedComment": added } })))
}

#[utoipa::path(
    delete,
    path = "/threads/{thread_id}/comments/{comment_id}",
    params(
        ("thread_id" = String, Path, description = "Thread id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment soft-deleted"),
        (status = 403, description = "Caller does not own the comment", body = ApiErrorBody),
        (status = 404, description = "Thread or comment not found", body = ApiErrorBody)
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (thread_id, comment_id) = path.into_inner();
    let cmd = DeleteComment::new(thread_id, comment_id, auth.user_id().to_owned())?;
    service::delete_comment(&*data.repo, cmd).await?;
    Ok(success())
}

#[utoipa::path(
    put,
    path = "/threads/{thread_id}/comments/{comment_id}/likes",
    params(
        ("thread_id" = String, Path, description = "Thread id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Like toggled"),
        (status = 404, description = "Thread or comment not found", body = ApiErrorBody),
        (status = 409, description = "Concurrent toggle lost the race", body = ApiErrorBody)
    ),
    tag = "comments"
)]
pub async fn put_comment_like(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (thread_id, comment_id) = path.into_inner();
    let cmd = LikeComment::new(thread_id, comment_id, auth.user_id().to_owned())?;
    service::toggle_comment_like(&*data.repo, cmd).await?;
    Ok(success())
}

#[utoipa::path(
    post,
    path = "/threads/{thread_id}/comments/{comment_id}/replies",
    params(
        ("thread_id" = String, Path, description = "Thread id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    request_body = ContentPayload,
    responses(
        (status = 201, description = "Reply created", body = AddedReply),
        (status = 400, description = "Missing or mistyped property", body = ApiErrorBody),
        (status = 404, description = "Comment not found", body = ApiErrorBody)
    ),
    tag = "replies"
)]
pub async fn post_reply(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: Option<web::Json<Value>>,
) -> Result<HttpResponse, ApiError> {
    let (thread_id, comment_id) = path.into_inner();
    let added = service::add_reply(&*data.repo, &payload(body), &thread_id, &comment_id, auth.user_id()).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "success", "data": { "addedReply": added } })))
}

#[utoipa::path(
    delete,
    path = "/threads/{thread_id}/comments/{comment_id}/replies/{reply_id}",
    params(
        ("thread_id" = String, Path, description = "Thread id"),
        ("comment_id" = String, Path, description = "Comment id"),
        ("reply_id" = String, Path, description = "Reply id")
    ),
    responses(
        (status = 200, description = "Reply soft-deleted"),
        (status = 403, description = "Caller does not own the reply", body = ApiErrorBody),
        (status = 404, description = "Thread, comment or reply not found", body = ApiErrorBody)
    ),
    tag = "replies"
)]
pub async fn delete_reply(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (thread_id, comment_id, reply_id) = path.into_inner();
    let cmd = DeleteReply::new(thread_id, comment_id, reply_id, auth.user_id().to_owned())?;
    service::delete_reply(&*data.repo, cmd).await?;
    Ok(success())
}
