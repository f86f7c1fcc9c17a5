use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Uniform JSON envelope returned by every endpoint.
///
/// Serializes as `{ "success": bool, "message"?: string, "count"?: int, "data"?: T }`.
/// The HTTP status travels alongside the body but is not part of it.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    status: StatusCode,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with a body
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: None,
            count: None,
            data: Some(data),
        }
    }

    /// 201 with the created record
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn with_message<M: Into<String>>(mut self, message: M) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// 200 with a list body; `count` always mirrors the list length.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self::ok(items).with_count(count)
    }
}

impl ApiResponse<()> {
    /// Success without a body, e.g. confirmation of a deletion.
    pub fn message<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: Some(message.into()),
            count: None,
            data: None,
        }
    }

    pub fn failure<M: Into<String>>(status: StatusCode, message: M) -> Self {
        Self {
            status,
            success: false,
            message: Some(message.into()),
            count: None,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_omits_empty_fields() {
        let envelope = ApiResponse::ok(json!({"id": 1}));
        assert_eq!(envelope.status(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": true, "data": {"id": 1}})
        );
    }

    #[test]
    fn test_list_envelope_carries_count() {
        let envelope = ApiResponse::list(vec![1, 2, 3]).with_message("listed");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": true, "message": "listed", "count": 3, "data": [1, 2, 3]})
        );
    }

    #[test]
    fn test_created_and_message_statuses() {
        assert_eq!(ApiResponse::created(1).status(), StatusCode::CREATED);

        let deleted = ApiResponse::<()>::message("Evidence deleted successfully");
        assert_eq!(deleted.status(), StatusCode::OK);
        assert_eq!(
            serde_json::to_value(&deleted).unwrap(),
            json!({"success": true, "message": "Evidence deleted successfully"})
        );
    }

    #[test]
    fn test_failure_envelope() {
        let failure = ApiResponse::<()>::failure(StatusCode::NOT_FOUND, "Case not found");
        assert_eq!(failure.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            json!({"success": false, "message": "Case not found"})
        );
    }
}
