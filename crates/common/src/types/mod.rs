use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Response envelope shared by every catalog endpoint: `{success, message?, data?}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: Some(message.into()), data: Some(data) }
    }

    pub fn data(data: T) -> Self {
        Self { success: true, message: None, data: Some(data) }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()), data: None }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_omits_data() {
        let v = serde_json::to_value(ApiResponse::failure("You are not admin")).unwrap();
        assert_eq!(v, serde_json::json!({"success": false, "message": "You are not admin"}));
    }

    #[test]
    fn list_envelope_omits_message() {
        let v = serde_json::to_value(ApiResponse::data(vec![1, 2])).unwrap();
        assert_eq!(v, serde_json::json!({"success": true, "data": [1, 2]}));
    }
}
