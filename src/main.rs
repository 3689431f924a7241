#![forbid(unsafe_code)]

use lazy_static::lazy_static;
use log::{error, info};
use poem::listener::{Listener, RustlsCertificate, RustlsConfig, TcpListener};

// Web API Utilities
use crate::api::{build_app, API_PREFIX};
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx, CERT_FILE, KEY_FILE, WEBAPI_ARGS, WEBAPI_DIRS};
use crate::utils::errors::Errors;
use crate::utils::registry::UserRegistry;

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "WebApiServer"; // for poem logging

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that is has a 'static lifetime.
// We exit if we can't read our parameters.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize Server --------------
    println!("Starting webapi_server!");

    // Directory creation only.
    if WEBAPI_ARGS.create_dirs_only {
        println!("Data directories initialized under {}.", WEBAPI_DIRS.root_dir);
        return Ok(());
    }

    webapi_init();

    // --------------- Main Loop Set Up ---------------
    let config = &RUNTIME_CTX.parms.config;
    let api_url = format!("{}:{}{}", config.http_addr, config.http_port, API_PREFIX);

    // The registry lives exactly as long as the server.
    let registry = UserRegistry::new();
    let app = build_app(registry, &api_url);

    // ------------------ Main Loop -------------------
    let addr = format!("{}{}", "0.0.0.0:", config.http_port);
    info!("{} listening on {} (tls={}).", config.title, addr, config.tls_enabled);
    if config.tls_enabled {
        let key = read_pem_file(&(WEBAPI_DIRS.certs_dir.clone() + KEY_FILE))?;
        let cert = read_pem_file(&(WEBAPI_DIRS.certs_dir.clone() + CERT_FILE))?;
        poem::Server::new(
            TcpListener::bind(addr).rustls(
                RustlsConfig::new().fallback(RustlsCertificate::new().key(key).cert(cert)),
            ),
        )
        .name(SERVER_NAME)
        .run(app)
        .await
    } else {
        poem::Server::new(TcpListener::bind(addr))
            .name(SERVER_NAME)
            .run(app)
            .await
    }
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// webapi_init:
// ---------------------------------------------------------------------------
/** Initialize logging and the runtime context before the routes are built. */
fn webapi_init() {
    init_log();

    // Force the reading of input parameters and initialization of runtime context.
    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));

    print_version_info();
}

// ---------------------------------------------------------------------------
// read_pem_file:
// ---------------------------------------------------------------------------
/** Read a TLS key or certificate file.  Failures are logged with the path. */
fn read_pem_file(path: &str) -> Result<Vec<u8>, std::io::Error> {
    std::fs::read(path).map_err(|e| {
        let kind = e.kind();
        let err = Errors::IOError(path.to_string(), e);
        error!("{}", err);
        std::io::Error::new(kind, err)
    })
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running WEBAPI={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}.",
          option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
          env!("GIT_BRANCH"),
          env!("GIT_COMMIT_SHORT"),
          env!("GIT_DIRTY"),
          env!("SOURCE_TIMESTAMP"),
          env!("RUSTC_VERSION"));
}
