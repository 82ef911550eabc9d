use serde::Serialize;

pub const SUCCESS_RESPONSE_CODE: i32 = 1;
pub const FAIL_RESPONSE_CODE: i32 = 0;

/// Envelope shared by every endpoint. Clients check `status` even on HTTP 200.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T = ()> {
    pub status: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> JsonResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: SUCCESS_RESPONSE_CODE,
            message: message.into(),
            data: Some(data),
        }
    }

    /// FAIL envelope without data, for endpoints that answer soft failures with HTTP 200.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: FAIL_RESPONSE_CODE,
            message: message.into(),
            data: None,
        }
    }

    pub fn fail_with(message: impl Into<String>, data: T) -> Self {
        Self {
            status: FAIL_RESPONSE_CODE,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl JsonResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: SUCCESS_RESPONSE_CODE,
            message: message.into(),
            data: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: FAIL_RESPONSE_CODE,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_only_envelope_omits_data() {
        let body = serde_json::to_value(JsonResponse::message("Remove asset successfully.")).unwrap();
        assert_eq!(
            body,
            json!({ "status": SUCCESS_RESPONSE_CODE, "message": "Remove asset successfully." })
        );
    }

    #[test]
    fn test_fail_envelope_carries_fail_code() {
        let body = serde_json::to_value(JsonResponse::fail("Organization is not exist")).unwrap();
        assert_eq!(body["status"], json!(FAIL_RESPONSE_CODE));
        assert!(body.get("data").is_none());
    }
}
