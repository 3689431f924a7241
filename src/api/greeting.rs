#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{OpenApi, param::Query, payload::PlainText};

use crate::utils::webapi_utils::{self, RequestDebug};

// ***************************************************************************
//                                Constants
// ***************************************************************************
const WELCOME_TEXT : &str = "Welcome to Java Web API!";
const DEFAULT_NAME : &str = "World";

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct GreetingApi;

struct ReqHello
{
    name: Option<String>,
}

impl RequestDebug for ReqHello {
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(64);
        s.push_str("  Request parameters:");
        s.push_str("\n    name: ");
        s.push_str(self.name.as_deref().unwrap_or("<none>"));
        s
    }
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl GreetingApi {
    #[oai(path = "/", method = "get")]
    async fn home(&self) -> PlainText<String> {
        PlainText(WELCOME_TEXT.to_string())
    }

    #[oai(path = "/hello", method = "get")]
    async fn hello(&self, http_req: &Request, name: Query<Option<String>>) -> PlainText<String> {
        let req = ReqHello {name: name.0};
        webapi_utils::debug_request(http_req, &req);
        PlainText(greeting(req.name.as_deref()))
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// The name is echoed verbatim, empty or not.
fn greeting(name: Option<&str>) -> String {
    format!("Hello, {}!", name.unwrap_or(DEFAULT_NAME))
}
