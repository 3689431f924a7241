#![forbid(unsafe_code)]

use poem::{Request, web::Form};
use poem_openapi::{OpenApi, payload::Json, param::Query, ApiResponse, Object};
use serde::Deserialize;
use log::{error, info};

use crate::api::{RespMessage, USER_ADDED};
use crate::utils::errors::HttpError;
use crate::utils::registry::UserRegistry;
use crate::utils::webapi_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct AddUserApi
{
    registry: UserRegistry,
}

impl AddUserApi {
    pub fn new(registry: UserRegistry) -> Self {
        Self {registry}
    }
}

/// Fields of an application/x-www-form-urlencoded add request.
#[derive(Object, Deserialize, Debug)]
pub struct AddUserForm
{
    id: Option<i32>,
    name: Option<String>,
}

struct ReqAddUser
{
    id: i32,
    name: String,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqAddUser {
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(128);
        s.push_str("  Request parameters:");
        s.push_str("\n    id: ");
        s.push_str(&self.id.to_string());
        s.push_str("\n    name: ");
        s.push_str(&self.name);
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum WebApiResponse {
    #[oai(status = 200)]
    Http200(Json<RespMessage>),
    #[oai(status = 400)]
    Http400(Json<HttpError>),
}

fn make_http_200() -> WebApiResponse {
    WebApiResponse::Http200(Json(RespMessage::new(USER_ADDED)))
}
fn make_http_400(msg: String) -> WebApiResponse {
    WebApiResponse::Http400(Json(HttpError::new(&msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl AddUserApi {
    /// Insert or overwrite the name stored for a user id.  The id and name
    /// come from the query string, a form body, or one from each.
    #[oai(path = "/users/add", method = "post")]
    async fn add_user_api(&self, http_req: &Request, id: Query<Option<i32>>, name: Query<Option<String>>,
                          form: Option<Form<AddUserForm>>) -> WebApiResponse {
        // Query parameters win over form fields of the same name.
        let req = match ReqAddUser::merge(id.0, name.0, form.map(|f| f.0)) {
            Ok(r) => r,
            Err(msg) => {
                error!("{}", msg);
                return make_http_400(msg);
            }
        };
        webapi_utils::debug_request(http_req, &req);

        // Overwrites get the same response as inserts.
        match self.registry.add(req.id, req.name.clone()) {
            Some(prev) => info!("User {} renamed from '{}' to '{}'.", req.id, prev, req.name),
            None => info!("User {} added with name '{}' ({} registered).",
                          req.id, req.name, self.registry.len()),
        }
        make_http_200()
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl ReqAddUser {
    /// Combine query and form values; both id and name are required.
    fn merge(id: Option<i32>, name: Option<String>, form: Option<AddUserForm>) -> Result<Self, String> {
        let (form_id, form_name) = match form {
            Some(f) => (f.id, f.name),
            None => (None, None),
        };
        let id = id.or(form_id)
            .ok_or_else(|| "ERROR: Required parameter 'id' is missing.".to_string())?;
        let name = name.or(form_name)
            .ok_or_else(|| "ERROR: Required parameter 'name' is missing.".to_string())?;
        Ok(Self {id, name})
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_client;
    use crate::utils::registry::UserRegistry;
    use serde_json::json;

    #[tokio::test]
    async fn add_stores_user() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        let resp = cli.post("/api/users/add?id=42&name=Zed").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "User added successfully"})).await;
        assert_eq!(registry.get(42).as_deref(), Some("Zed"));
    }

    #[tokio::test]
    async fn negative_id_accepted() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        let resp = cli.post("/api/users/add?id=-3&name=Neg").send().await;
        resp.assert_status_is_ok();
        assert_eq!(registry.get(-3).as_deref(), Some("Neg"));
    }

    #[tokio::test]
    async fn missing_id_is_rejected() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        let resp = cli.post("/api/users/add?name=NoId").send().await;
        resp.assert_status(poem::http::StatusCode::BAD_REQUEST);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn non_integer_id_is_rejected() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        let resp = cli.post("/api/users/add?id=abc&name=Bad").send().await;
        resp.assert_status(poem::http::StatusCode::BAD_REQUEST);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn missing_name_is_rejected() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        let resp = cli.post("/api/users/add?id=5").send().await;
        resp.assert_status(poem::http::StatusCode::BAD_REQUEST);
        resp.assert_json(json!({"error": "ERROR: Required parameter 'name' is missing."})).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn form_body_adds_user() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        let resp = cli.post("/api/users/add")
            .content_type("application/x-www-form-urlencoded")
            .body("id=1&name=Alice")
            .send()
            .await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"message": "User added successfully"})).await;

        let resp = cli.get("/api/users/1").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"id": "1", "name": "Alice"})).await;
    }

    #[tokio::test]
    async fn query_id_with_form_name() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        let resp = cli.post("/api/users/add?id=6")
            .content_type("application/x-www-form-urlencoded")
            .body("name=Frank")
            .send()
            .await;
        resp.assert_status_is_ok();
        assert_eq!(registry.get(6).as_deref(), Some("Frank"));
    }

    #[tokio::test]
    async fn form_non_integer_id_is_rejected() {
        let registry = UserRegistry::new();
        let cli = test_client(&registry);

        let resp = cli.post("/api/users/add")
            .content_type("application/x-www-form-urlencoded")
            .body("id=abc&name=Bad")
            .send()
            .await;
        resp.assert_status(poem::http::StatusCode::BAD_REQUEST);
        assert!(registry.is_empty());
    }

    #[test]
    fn merge_prefers_query_values() {
        let form = AddUserForm {id: Some(2), name: Some("Form".to_string())};
        let req = ReqAddUser::merge(Some(1), None, Some(form)).expect("id and name present");
        assert_eq!(req.id, 1);
        assert_eq!(req.name, "Form");
    }

    #[test]
    fn merge_without_id_fails() {
        let err = ReqAddUser::merge(None, Some("x".to_string()), None).err();
        assert_eq!(err.as_deref(), Some("ERROR: Required parameter 'id' is missing."));
    }
}
