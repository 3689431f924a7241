#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{OpenApi, payload::Json, param::Path, ApiResponse};
use log::info;

use crate::api::{RespMessage, USER_DELETED, USER_NOT_FOUND};
use crate::utils::errors::{Errors, HttpError};
use crate::utils::registry::UserRegistry;
use crate::utils::webapi_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct DeleteUserApi
{
    registry: UserRegistry,
}

impl DeleteUserApi {
    pub fn new(registry: UserRegistry) -> Self {
        Self {registry}
    }
}

struct ReqDeleteUser
{
    id: i32,
}

impl RequestDebug for ReqDeleteUser {
    fn get_request_info(&self) -> String {
        format!("  Request parameters:\n    id: {}", self.id)
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum WebApiResponse {
    #[oai(status = 200)]
    Http200(Json<RespMessage>),
    #[oai(status = 404)]
    Http404(Json<HttpError>),
}

fn make_http_200() -> WebApiResponse {
    WebApiResponse::Http200(Json(RespMessage::new(USER_DELETED)))
}
fn make_http_404() -> WebApiResponse {
    WebApiResponse::Http404(Json(HttpError::new(USER_NOT_FOUND)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl DeleteUserApi {
    #[oai(path = "/users/:id", method = "delete")]
    async fn delete_user_api(&self, http_req: &Request, id: Path<i32>) -> WebApiResponse {
        let req = ReqDeleteUser {id: *id};
        webapi_utils::debug_request(http_req, &req);

        // An absent id leaves the registry untouched.
        match self.registry.delete(req.id) {
            Some(name) => {
                info!("User {} ('{}') deleted.", req.id, name);
                if self.registry.is_empty() {
                    info!("No users remain in the registry.");
                }
                make_http_200()
            },
            None => {
                info!("{} - Nothing deleted", Errors::UserNotFound(req.id));
                make_http_404()
            }
        }
    }
}
