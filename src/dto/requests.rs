use serde::Deserialize;
use validator::Validate;

/// Body of `POST /popularity/{kind}/{id}/init` and `PUT /popularity/{kind}/{id}`
#[derive(Debug, Validate, Deserialize)]
pub struct InitializeRequest {
    #[serde(default)]
    pub likers: Vec<String>,
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
}

#[derive(Debug, Validate, Deserialize)]
pub struct BatchItem {
    #[validate(length(min = 1, message = "item id is required"))]
    pub id: String,
    #[serde(default)]
    pub likers: Vec<String>,
}

/// Body of `POST /popularity/{kind}/init`
#[derive(Debug, Validate, Deserialize)]
pub struct BatchInitializeRequest {
    #[validate(nested)]
    pub items: Vec<BatchItem>,
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
}

/// Body of `POST /popularity/{kind}/{id}/toggle`
#[derive(Debug, Validate, Deserialize)]
pub struct ToggleRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
}
