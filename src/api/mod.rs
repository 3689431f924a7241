#![forbid(unsafe_code)]

use poem::Route;
use poem_openapi::{Object, OpenApiService};

use crate::api::greeting::GreetingApi;
use crate::api::users_add::AddUserApi;
use crate::api::users_delete::DeleteUserApi;
use crate::api::users_get::GetUserApi;
use crate::api::version::VersionApi;
use crate::utils::registry::UserRegistry;

pub mod greeting;
pub mod users_add;
pub mod users_delete;
pub mod users_get;
pub mod version;

// ***************************************************************************
//                                Constants
// ***************************************************************************
pub const API_PREFIX    : &str = "/api";
const API_TITLE         : &str = "Web API Server";
const API_VERSION       : Option<&str> = option_env!("CARGO_PKG_VERSION");

// Response texts shared by the user endpoints.
pub const USER_ADDED    : &str = "User added successfully";
pub const USER_DELETED  : &str = "User deleted successfully";
pub const USER_NOT_FOUND: &str = "User not found";

// ***************************************************************************
//                          Shared Response Objects
// ***************************************************************************
/// Body of a successful registry mutation.
#[derive(Object, Debug)]
pub struct RespMessage
{
    message: String,
}

impl RespMessage {
    pub fn new(message: &str) -> Self {
        Self {message: message.to_string()}
    }
}

// ***************************************************************************
//                               Route Tree
// ***************************************************************************
// ---------------------------------------------------------------------------
// build_app:
// ---------------------------------------------------------------------------
/** Assemble every endpoint into one route tree.  The API lives under /api,
 * its OpenAPI document under /spec and /spec_yaml, and Swagger UI at the root.
 * All user endpoints share the one registry passed in.
 */
pub fn build_app(registry: UserRegistry, server_url: &str) -> Route {
    let endpoints = (GreetingApi,
                     AddUserApi::new(registry.clone()),
                     GetUserApi::new(registry.clone()),
                     DeleteUserApi::new(registry),
                     VersionApi);
    let api_service =
        OpenApiService::new(endpoints, API_TITLE, API_VERSION.unwrap_or("unknown"))
            .server(server_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .nest(API_PREFIX, api_service)
        .nest("/", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
}

// ---------------------------------------------------------------------------
// test_client:
// ---------------------------------------------------------------------------
#[cfg(test)]
pub(crate) fn test_client(registry: &UserRegistry) -> poem::test::TestClient<Route> {
    poem::test::TestClient::new(build_app(registry.clone(), "http://localhost:8080/api"))
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use poem::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn add_get_delete_get() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        let resp = cli.post("/api/users/add?id=1&name=Alice").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "User added successfully"})).await;

        let resp = cli.get("/api/users/1").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"id": "1", "name": "Alice"})).await;

        let resp = cli.delete("/api/users/1").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "User deleted successfully"})).await;

        let resp = cli.get("/api/users/1").send().await;
        resp.assert_status(StatusCode::NOT_FOUND);
        resp.assert_json(json!({"error": "User not found"})).await;

        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn overwrite_is_silent() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        cli.post("/api/users/add?id=9&name=first").send().await.assert_status_is_ok();
        let resp = cli.post("/api/users/add?id=9&name=second").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "User added successfully"})).await;

        let resp = cli.get("/api/users/9").send().await;
        resp.assert_json(json!({"id": "9", "name": "second"})).await;
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn spec_documents_are_served() {
        let cli = test_client(&UserRegistry::new());

        let resp = cli.get("/spec").send().await;
        resp.assert_status_is_ok();
        let body = resp.0.into_body().into_string().await.expect("spec body");
        assert!(body.contains("/users/add"));
        assert!(body.contains("/hello"));

        cli.get("/spec_yaml").send().await.assert_status_is_ok();
    }
}
