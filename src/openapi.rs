use crate::error::ApiErrorBody;
use crate::models::{
    AddedComment, AddedReply, AddedThread, ContentPayload, DetailComment, DetailReply, DetailThread,
    ThreadPayload,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::post_thread,
        crate::routes::get_thread,
        crate::routes::post_comment,
        crate::routes::delete_comment,
        crate::routes::put_comment_like,
        crate::routes::post_reply,
        crate::routes::delete_reply,
    ),
    components(schemas(
        ThreadPayload, ContentPayload, AddedThread, AddedComment, AddedReply,
        DetailThread, DetailComment, DetailReply, ApiErrorBody
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "threads", description = "Thread operations"),
        (name = "comments", description = "Comment and like operations"),
        (name = "replies", description = "Reply operations"),
    )
)]
pub struct ApiDoc;
