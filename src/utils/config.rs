#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, error, LevelFilter};
use serde::Deserialize;
use std::{env, fs, path::Path};
use fs_mistrust::Mistrust;
use std::os::unix::fs::PermissionsExt;
use lazy_static::lazy_static;
use structopt::StructOpt;

use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::utils::errors::Errors;
use crate::utils::webapi_utils::get_absolute_path;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations. Unless otherwise noted, all files and directories
// are relative to the root directory.
const ENV_WEBAPI_ROOT_DIR  : &str = "WEBAPI_ROOT_DIR";
const DEFAULT_ROOT_DIR     : &str = "~/.webapi";
const CONFIG_DIR           : &str = "/config";
const LOGS_DIR             : &str = "/logs";
const CERTS_DIR            : &str = "/certs";
const LOG4RS_CONFIG_FILE   : &str = "/log4rs.yml";  // relative to config dir
const WEBAPI_CONFIG_FILE   : &str = "/webapi.toml"; // relative to config dir
pub const KEY_FILE         : &str = "/key.pem";     // relative to certs dir
pub const CERT_FILE        : &str = "/cert.pem";    // relative to certs dir

// Networking.
const DEFAULT_TITLE        : &str = "Web API Server";
const DEFAULT_HTTP_ADDR    : &str = "http://localhost";
const DEFAULT_HTTP_PORT    : u16  = 8080;

// Logging used when no log4rs.yml is installed.
const DEFAULT_LOG_PATTERN  : &str = "{d(%Y-%m-%dT%H:%M:%S%.3f)} {l} {t} - {m}{n}";
const DEFAULT_LOG_FILE     : &str = "/webapi.log";  // relative to logs dir

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref WEBAPI_ARGS: WebApiArgs = init_webapi_args();
}

// Calculate the data directories BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref WEBAPI_DIRS: WebApiDirs = init_webapi_dirs();
}

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
#[derive(Debug)]
pub struct WebApiDirs {
    pub root_dir: String,
    pub config_dir: String,
    pub logs_dir: String,
    pub certs_dir: String,
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// WebApiArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "webapi_args", about = "Command line arguments for the Web API Server.")]
pub struct WebApiArgs {
    /// Specify the server's root data directory.
    ///
    /// This directory contains the config, logs and certs subdirectories.
    #[structopt(short, long)]
    pub root_dir: Option<String>,

    /// Create the data directories and then exit.
    ///
    /// The data directories will be rooted at a root directory calculated
    /// using the following priority order:
    ///
    ///   1. If set, the value of the WEBAPI_ROOT_DIR environment,
    ///
    ///   2. Otherwise, if set, the value of the --root-dir command line argument,
    ///
    ///   3. Otherwise, ~/.webapi
    ///
    #[structopt(short, long)]
    pub create_dirs_only: bool,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub webapi_args: &'static WebApiArgs,
    pub webapi_dirs: &'static WebApiDirs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
/// Contents of webapi.toml.  Keys missing from the file take their defaults.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
    pub tls_enabled: bool,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            tls_enabled: false,
        }
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_webapi_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_webapi_args() -> WebApiArgs {
    let args = WebApiArgs::from_args();
    println!("{:?}", args);
    args
}

// ---------------------------------------------------------------------------
// init_webapi_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories, creating any that are missing. */
fn init_webapi_dirs() -> WebApiDirs {
    let mistrust = get_mistrust();

    let root_dir = get_root_dir();
    check_webapi_dir(&root_dir, "root directory", &mistrust);

    let config_dir = root_dir.clone() + CONFIG_DIR;
    check_webapi_dir(&config_dir, "config directory", &mistrust);

    let logs_dir = root_dir.clone() + LOGS_DIR;
    check_webapi_dir(&logs_dir, "logs directory", &mistrust);

    let certs_dir = root_dir.clone() + CERTS_DIR;
    check_webapi_dir(&certs_dir, "certs directory", &mistrust);

    WebApiDirs { root_dir, config_dir, logs_dir, certs_dir }
}

// ---------------------------------------------------------------------------
// check_webapi_dir:
// ---------------------------------------------------------------------------
/** Check that the path is absolute and, if it exists, that is has the proper
 * permissions assigned.  If it doesn't exist, create it.  The mistrust package
 * creates directories with 0o700 permissions.
 *
 * Any failure results in a panic.
 */
fn check_webapi_dir(dir: &str, msgname: &str, mistrust: &Mistrust) {
    let path = Path::new(dir);
    if !path.is_absolute() {
        panic!("The Web API {} path must be absolute: {}", msgname, dir);
    }
    if path.exists() {
        if !path.is_dir() {
            panic!("The Web API {} path must be a directory: {}", msgname, dir);
        }

        // Owner rwx only.
        let meta = path.metadata().unwrap_or_else(|_| panic!("Unable to read metadata for {}: {}", msgname, dir));
        let perm = meta.permissions().mode();
        if perm & 0o777 != 0o700 {
            panic!("The Web API {} path must be have 0o700 permissions: {}", msgname, dir);
        }
    } else if let Err(e) = mistrust.make_directory(path) {
        panic!("Make directory error for {:?}: {}", path, e);
    }
}

// ---------------------------------------------------------------------------
// get_mistrust:
// ---------------------------------------------------------------------------
/** Configure a new mistrust object for initial directory processing. */
fn get_mistrust() -> Mistrust {
    match Mistrust::builder()
        .ignore_prefix(get_absolute_path("~"))
        .trust_group(0)
        .build() {
            Ok(m) => m,
            Err(e) => panic!("Mistrust configuration error: {}", e),
        }
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir() -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    let root_dir = resolve_root_dir(env::var(ENV_WEBAPI_ROOT_DIR).ok(),
                                    WEBAPI_ARGS.root_dir.clone());
    get_absolute_path(&root_dir)
}

fn resolve_root_dir(env_dir: Option<String>, arg_dir: Option<String>) -> String {
    env_dir.or(arg_dir).unwrap_or_else(|| DEFAULT_ROOT_DIR.to_string())
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the config directory's log4rs.yml when present,
 * otherwise log at info level to the console and to webapi.log in the logs
 * directory.
 */
pub fn init_log() {
    let logconfig = init_log_config();
    let result = if Path::new(&logconfig).is_file() {
        log4rs::init_file(&logconfig, Default::default())
            .map_err(|e| anyhow!("{}: {}", Errors::Log4rsInitialization(logconfig.clone()), e))
    } else {
        init_default_log(&WEBAPI_DIRS.logs_dir)
    };

    match result {
        Ok(_) => (),
        Err(e) => panic!("{}", e),
    }

    if Path::new(&logconfig).is_file() {
        info!("Log4rs initialized using: {}", logconfig);
    } else {
        info!("Log4rs configuration {} not found, logging to console and {}.",
              logconfig, WEBAPI_DIRS.logs_dir.clone() + DEFAULT_LOG_FILE);
    }
}

// ---------------------------------------------------------------------------
// init_default_log:
// ---------------------------------------------------------------------------
fn init_default_log(logs_dir: &str) -> Result<()> {
    let config = default_log_config(logs_dir)?;
    match log4rs::init_config(config) {
        Ok(_) => Ok(()),
        Err(e) => Err(anyhow!("{}: {}", Errors::Log4rsInitialization(logs_dir.to_string()), e)),
    }
}

// ---------------------------------------------------------------------------
// default_log_config:
// ---------------------------------------------------------------------------
fn default_log_config(logs_dir: &str) -> Result<LogConfig> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
        .build();

    let log_file = logs_dir.to_string() + DEFAULT_LOG_FILE;
    let logfile = match FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
        .build(&log_file) {
            Ok(f) => f,
            Err(e) => return Err(anyhow!("{}", Errors::IOError(log_file, e))),
        };

    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("stdout").appender("logfile").build(LevelFilter::Info))?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// init_log_config:
// ---------------------------------------------------------------------------
fn init_log_config() -> String {
    WEBAPI_DIRS.config_dir.clone() + LOG4RS_CONFIG_FILE
}

// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the
 * config directory.  A missing file means all defaults are used.
 */
fn get_parms() -> Result<Parms> {
    let config_file = WEBAPI_DIRS.config_dir.clone() + WEBAPI_CONFIG_FILE;

    let config_file_abs = get_absolute_path(&config_file);
    info!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));
    let contents = match fs::read_to_string(&config_file_abs) {
        Ok(c) => c,
        Err(_) => {
            info!("Unable to read configuration at {}. Using default values.", config_file_abs);
            return Ok(Parms { config_file: Default::default(), config: Config::new() });
        }
    };

    let config = parse_config(&contents, &config_file_abs)?;
    Ok(Parms { config_file: config_file_abs, config })
}

// ---------------------------------------------------------------------------
// parse_config:
// ---------------------------------------------------------------------------
pub fn parse_config(contents: &str, config_file: &str) -> Result<Config> {
    match toml::from_str(contents) {
        Ok(c)  => Ok(c),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e);
            error!("{}", msg);
            Err(anyhow!(msg))
        }
    }
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> RuntimeCtx {
    // The application aborts if the configuration can't be parsed.
    let parms = match get_parms() {
        Ok(p) => p,
        Err(e) => panic!("FAILED to read configuration file: {}", e),
    };
    RuntimeCtx { parms, webapi_args: &WEBAPI_ARGS, webapi_dirs: &WEBAPI_DIRS }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::new();
        assert_eq!(config.title, "Web API Server");
        assert_eq!(config.http_addr, "http://localhost");
        assert_eq!(config.http_port, 8080);
        assert!(!config.tls_enabled);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("", "webapi.toml").expect("empty config should parse");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let contents = "http_port = 9090\ntls_enabled = true\n";
        let config = parse_config(contents, "webapi.toml").expect("partial config should parse");
        assert_eq!(config.http_port, 9090);
        assert!(config.tls_enabled);
        assert_eq!(config.title, "Web API Server");
    }

    #[test]
    fn full_file() {
        let contents = r#"
            title = "Demo"
            http_addr = "https://api.example.org"
            http_port = 443
            tls_enabled = true
        "#;
        let config = parse_config(contents, "webapi.toml").expect("full config should parse");
        assert_eq!(config.title, "Demo");
        assert_eq!(config.http_addr, "https://api.example.org");
        assert_eq!(config.http_port, 443);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = parse_config("http_port = \"not a port\"", "/x/webapi.toml").unwrap_err();
        assert!(err.to_string().contains("/x/webapi.toml"));
    }

    #[test]
    fn root_dir_precedence() {
        let env_dir = Some("/env".to_string());
        let arg_dir = Some("/arg".to_string());
        assert_eq!(resolve_root_dir(env_dir, arg_dir.clone()), "/env");
        assert_eq!(resolve_root_dir(None, arg_dir), "/arg");
        assert_eq!(resolve_root_dir(None, None), DEFAULT_ROOT_DIR);
    }

    #[test]
    fn default_log_config_writes_to_logs_dir() {
        let logs_dir = std::env::temp_dir().join(format!("webapi_server_logs_{}", std::process::id()));
        let logs_dir = logs_dir.to_string_lossy().to_string();
        assert!(default_log_config(&logs_dir).is_ok());
        assert!(Path::new(&(logs_dir.clone() + DEFAULT_LOG_FILE)).is_file());
        fs::remove_dir_all(&logs_dir).expect("remove temp logs dir");
    }
}
