#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{OpenApi, payload::Json, Object, param::Path, ApiResponse};
use log::info;

use crate::api::USER_NOT_FOUND;
use crate::utils::errors::{Errors, HttpError};
use crate::utils::registry::UserRegistry;
use crate::utils::webapi_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct GetUserApi
{
    registry: UserRegistry,
}

impl GetUserApi {
    pub fn new(registry: UserRegistry) -> Self {
        Self {registry}
    }
}

struct ReqGetUser
{
    id: i32,
}

/// A registry entry.  The id is rendered as a string.
#[derive(Object, Debug)]
pub struct RespGetUser
{
    id: String,
    name: String,
}

impl RequestDebug for ReqGetUser {
    fn get_request_info(&self) -> String {
        format!("  Request parameters:\n    id: {}", self.id)
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum WebApiResponse {
    #[oai(status = 200)]
    Http200(Json<RespGetUser>),
    #[oai(status = 404)]
    Http404(Json<HttpError>),
}

fn make_http_200(resp: RespGetUser) -> WebApiResponse {
    WebApiResponse::Http200(Json(resp))
}
fn make_http_404() -> WebApiResponse {
    WebApiResponse::Http404(Json(HttpError::new(USER_NOT_FOUND)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl GetUserApi {
    #[oai(path = "/users/:id", method = "get")]
    async fn get_user_api(&self, http_req: &Request, id: Path<i32>) -> WebApiResponse {
        let req = ReqGetUser {id: *id};
        webapi_utils::debug_request(http_req, &req);

        match self.registry.get(req.id) {
            Some(name) => make_http_200(RespGetUser::new(req.id, name)),
            None => {
                info!("{}", Errors::UserNotFound(req.id));
                make_http_404()
            }
        }
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespGetUser {
    fn new(id: i32, name: String) -> Self {
        Self {id: id.to_string(), name}
    }
}
