#![forbid(unsafe_code)]

use path_absolutize::Absolutize;
use std::ops::Deref;
use std::path::Path;

use poem::Request;
use log::{debug, LevelFilter};

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_absolute_path:
// ---------------------------------------------------------------------------
/** Replace tilde (~) and environment variable values in a path name and
 * then construct the absolute path name.  Unlike canonicalize, absolutize
 * does not require the file to exist.
 *
 * Any failure along the way returns the original path unchanged.
 */
pub fn get_absolute_path(path: &str) -> String {
    let s = match shellexpand::full(path) {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };

    let p = Path::new(s.deref());
    let p1 = match p.absolutize() {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };
    let p2 = match p1.to_str() {
        Some(x) => x,
        None => return path.to_owned(),
    };

    p2.to_owned()
}

// ***************************************************************************
//                                  Traits
// ***************************************************************************
/// Summarizes a handler's extracted parameters for debug logging.
pub trait RequestDebug {
    fn get_request_info(&self) -> String;
}

// ---------------------------------------------------------------------------
// debug_request:
// ---------------------------------------------------------------------------
// Dump http request information to the log.
pub fn debug_request(http_req: &Request, req: &impl RequestDebug) {
    if log::max_level() < LevelFilter::Debug {
        return;
    }
    debug!("{}", format_request(http_req, req));
}

// ***************************************************************************
// PRIVATE FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// format_request:
// ---------------------------------------------------------------------------
fn format_request(http_req: &Request, req: &impl RequestDebug) -> String {
    let mut s = "\n".to_string();

    // Restate the method and URI.
    let uri = http_req.uri();
    s += format!("  {} {:?}\n", http_req.method(), uri).as_str();

    for (name, value) in http_req.headers().iter() {
        s += format!("  Header: {} = {:?} \n", name, value).as_str();
    }

    if let Some(q) = uri.query() {
        s += format!("  Query Parameters: {:?}\n", q).as_str();
    } else {
        s += "  * No Query Parameters\n";
    }

    s += req.get_request_info().as_str();
    s
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    struct ReqFake {
        id: i32,
    }

    impl RequestDebug for ReqFake {
        fn get_request_info(&self) -> String {
            format!("  Request parameters:\n    id: {}", self.id)
        }
    }

    #[test]
    fn absolute_path_is_unchanged() {
        assert_eq!(get_absolute_path("/tmp/webapi"), "/tmp/webapi");
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let p = get_absolute_path("some/dir");
        assert!(Path::new(&p).is_absolute());
        assert!(p.ends_with("some/dir"));
    }

    #[test]
    fn request_summary_includes_query_and_info() {
        let req = Request::builder()
            .uri(poem::http::Uri::from_static("/api/users/add?id=4&name=Dan"))
            .header("x-test", "yes")
            .finish();
        let s = format_request(&req, &ReqFake { id: 4 });
        assert!(s.contains("/api/users/add"));
        assert!(s.contains("x-test"));
        assert!(s.contains("id=4&name=Dan"));
        assert!(s.contains("id: 4"));
    }

    #[test]
    fn request_summary_without_query() {
        let req = Request::builder()
            .uri(poem::http::Uri::from_static("/api/users/4"))
            .finish();
        let s = format_request(&req, &ReqFake { id: 4 });
        assert!(s.contains("* No Query Parameters"));
    }
}
