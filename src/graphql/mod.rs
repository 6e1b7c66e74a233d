pub mod errors;
pub mod files;
pub mod guard;

pub use errors::*;
pub use files::*;
pub use guard::*;

use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, Pos, Schema};
use axum::{
    extract::State,
    response::{Html, Json},
};
use tracing::{debug, warn};

use crate::auth::extractors::{AppState, MaybeUser};
use crate::services::FileService;

pub type FileSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(file_service: FileService) -> FileSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(file_service)
        .finish()
}

/// Executes a GraphQL request for an authenticated caller. Requests without a
/// valid session are answered with an authorization error and never reach the
/// resolvers.
pub async fn graphql_handler(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let Some(user) = user else {
        warn!("Rejected unauthenticated GraphQL request {:?}", request.operation_name);
        return Json(async_graphql::Response::from_errors(vec![
            unauthenticated_error().into_server_error(Pos::default()),
        ]));
    };

    debug!("GraphQL request {:?} from {}", request.operation_name, user.user.username);
    let request = request.data(Session::from(&user));
    Json(app_state.schema.execute(request).await)
}

pub async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/api/graphql").finish())
}
