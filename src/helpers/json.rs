use actix_web::error::InternalError;
use actix_web::http::header::RETRY_AFTER;
use actix_web::http::StatusCode;
use actix_web::{web, Error, HttpResponse};
use serde_derive::Serialize;
use uuid::Uuid;

/// Response envelope shared by every endpoint:
/// `{ "_status": "OK", "msg": "...", "id": ..., "item": ..., "list": [...], "meta": ... }`
#[derive(Serialize)]
pub struct JsonResponse<T> {
    #[serde(rename = "_status")]
    pub status: String,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

pub struct JsonResponseBuilder<T> {
    id: Option<Uuid>,
    item: Option<T>,
    list: Option<Vec<T>>,
    meta: Option<serde_json::Value>,
}

impl<T> JsonResponse<T>
where
    T: serde::Serialize,
{
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder {
            id: None,
            item: None,
            list: None,
            meta: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: serde::Serialize,
{
    pub fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    pub fn set_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn set_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    fn into_response(self, status: &str, msg: impl Into<String>) -> JsonResponse<T> {
        let msg = msg.into();
        JsonResponse {
            status: status.to_string(),
            message: msg,
            id: self.id,
            item: self.item,
            list: self.list,
            meta: self.meta,
        }
    }

    pub fn ok(self, msg: impl Into<String>) -> web::Json<JsonResponse<T>> {
        web::Json(self.into_response("OK", msg))
    }

    pub fn created(self, msg: impl Into<String>) -> HttpResponse {
        HttpResponse::Created().json(self.into_response("OK", msg))
    }

    /// Serialized error envelope, used where only a string can travel (middleware).
    pub fn to_string(self, msg: impl Into<String>) -> String {
        serde_json::to_string(&self.into_response("Error", msg)).unwrap_or_default()
    }

    fn error(self, status: StatusCode, msg: impl Into<String>, fallback: &str) -> Error {
        let msg = msg.into();
        let msg = if msg.trim().is_empty() {
            fallback.to_string()
        } else {
            msg
        };
        let body = HttpResponse::build(status).json(self.into_response("Error", msg.clone()));
        InternalError::from_response(msg, body).into()
    }

    pub fn bad_request(self, msg: impl Into<String>) -> Error {
        self.error(StatusCode::BAD_REQUEST, msg, "Validation error")
    }

    /// 400 carrying serde_valid messages.
    pub fn form_error(self, msg: impl Into<String>) -> Error {
        self.error(StatusCode::BAD_REQUEST, msg, "Form validation failed")
    }

    pub fn unauthorized(self, msg: impl Into<String>) -> Error {
        self.error(StatusCode::UNAUTHORIZED, msg, "Authentication required")
    }

    pub fn forbidden(self, msg: impl Into<String>) -> Error {
        self.error(StatusCode::FORBIDDEN, msg, "Forbidden")
    }

    pub fn not_found(self, msg: impl Into<String>) -> Error {
        self.error(StatusCode::NOT_FOUND, msg, "Object not found")
    }

    pub fn conflict(self, msg: impl Into<String>) -> Error {
        self.error(StatusCode::CONFLICT, msg, "Conflict")
    }

    pub fn too_many_requests(self, msg: impl Into<String>) -> Error {
        self.error(StatusCode::TOO_MANY_REQUESTS, msg, "Too many requests")
    }

    /// 429 with a `Retry-After` header.
    pub fn too_many_requests_after(self, msg: impl Into<String>, retry_after_secs: u64) -> Error {
        let msg = msg.into();
        let body = HttpResponse::TooManyRequests()
            .insert_header((RETRY_AFTER, retry_after_secs.to_string()))
            .json(self.into_response("Error", msg.clone()));
        InternalError::from_response(msg, body).into()
    }

    pub fn internal_server_error(self, msg: impl Into<String>) -> Error {
        self.error(StatusCode::INTERNAL_SERVER_ERROR, msg, "Internal Server Error")
    }
}
