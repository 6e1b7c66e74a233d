use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{ClientError, FileApi};
use crate::models::{CreateFileInput, File, UpdateFileInput, UpsertFileInput};

pub const FILES_QUERY: &str = r#"
query FindFiles {
  files { id name url type version }
}"#;

pub const FIND_FILE_QUERY: &str = r#"
query FindFileById($id: String!) {
  file(id: $id) { id name url type version }
}"#;

pub const CREATE_FILE_MUTATION: &str = r#"
mutation CreateFileMutation($input: CreateFileInput!) {
  createFile(input: $input) { id name url type version }
}"#;

pub const UPDATE_FILE_MUTATION: &str = r#"
mutation UpdateFileMutation($id: String!, $input: UpdateFileInput!) {
  updateFile(id: $id, input: $input) { id name url type version }
}"#;

pub const DELETE_FILE_MUTATION: &str = r#"
mutation DeleteFileMutation($id: String!) {
  deleteFile(id: $id) { id name url type version }
}"#;

pub const SEARCH_FILES_MUTATION: &str = r#"
mutation SearchFilesMutation($searchTerm: String!) {
  searchFiles(query: $searchTerm) { id name url type version }
}"#;

pub const UPSERT_FILE_MUTATION: &str = r#"
mutation UpsertFileMutation($input: UpsertFileInput!) {
  upsertFile(input: $input) { id name url type version }
}"#;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorBody {
    message: String,
    #[serde(default)]
    extensions: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// HTTP client for the `/api/graphql` endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GraphqlClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("filebox-rs/0.1")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url: base_url.trim_end_matches('/').to_string(), token }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    /// Exchanges credentials for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http { status: status.as_u16(), body });
        }

        let login: LoginResponse = response.json().await?;
        Ok(login.token)
    }

    /// Runs one operation and decodes `data.<field>`.
    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value, field: &str) -> Result<T, ClientError> {
        let mut request = self
            .client
            .post(format!("{}/api/graphql", self.base_url))
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http { status: status.as_u16(), body });
        }

        let body: GraphqlResponse = response.json().await?;
        if let Some(error) = body.errors.into_iter().next() {
            let code = error
                .extensions
                .as_ref()
                .and_then(|extensions| extensions.get("code"))
                .and_then(Value::as_str)
                .map(str::to_string);
            debug!("GraphQL operation {} failed: {} ({:?})", field, error.message, code);
            return Err(ClientError::Graphql { message: error.message, code });
        }

        let value = body
            .data
            .and_then(|mut data| data.get_mut(field).map(Value::take))
            .ok_or_else(|| ClientError::Decode(format!("missing data.{}", field)))?;

        serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FileApi for GraphqlClient {
    async fn files(&self) -> Result<Vec<File>, ClientError> {
        self.execute(FILES_QUERY, json!({}), "files").await
    }

    async fn file(&self, id: &str) -> Result<Option<File>, ClientError> {
        self.execute(FIND_FILE_QUERY, json!({ "id": id }), "file").await
    }

    async fn create_file(&self, input: &CreateFileInput) -> Result<File, ClientError> {
        self.execute(CREATE_FILE_MUTATION, json!({ "input": input }), "createFile").await
    }

    async fn update_file(&self, id: &str, input: &UpdateFileInput) -> Result<File, ClientError> {
        self.execute(UPDATE_FILE_MUTATION, json!({ "id": id, "input": input }), "updateFile").await
    }

    async fn delete_file(&self, id: &str) -> Result<File, ClientError> {
        self.execute(DELETE_FILE_MUTATION, json!({ "id": id }), "deleteFile").await
    }

    async fn search_files(&self, query: &str) -> Result<Vec<File>, ClientError> {
        self.execute(SEARCH_FILES_MUTATION, json!({ "searchTerm": query }), "searchFiles").await
    }

    async fn upsert_file(&self, input: &UpsertFileInput) -> Result<File, ClientError> {
        self.execute(UPSERT_FILE_MUTATION, json!({ "input": input }), "upsertFile").await
    }
}
