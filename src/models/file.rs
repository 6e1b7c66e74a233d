use async_graphql::{InputObject, SimpleObject};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Metadata for a binary held by the external upload service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, FromRow, SimpleObject)]
pub struct File {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    #[graphql(name = "type")]
    pub file_type: String,
    pub version: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, InputObject, Validate)]
pub struct CreateFileInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    #[validate(length(min = 1, max = 255))]
    pub file_type: String,
    #[validate(range(min = 1))]
    pub version: i32,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, InputObject, Validate)]
pub struct UpdateFileInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[graphql(name = "type")]
    #[validate(length(min = 1, max = 255))]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub version: Option<i32>,
}

/// Input of the server-side find-or-update by exact name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, InputObject, Validate)]
pub struct UpsertFileInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    #[validate(length(min = 1, max = 255))]
    pub file_type: String,
}
