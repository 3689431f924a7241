#![forbid(unsafe_code)]

// Builds outside a git checkout still get every variable.
const UNKNOWN: &str = "unknown";

fn main() {
    let branch = build_data::get_git_branch().unwrap_or_else(|_| UNKNOWN.to_string());
    println!("cargo:rustc-env=GIT_BRANCH={}", branch);

    let commit = build_data::get_git_commit_short().unwrap_or_else(|_| UNKNOWN.to_string());
    println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", commit);

    let dirty = build_data::get_git_dirty()
        .map(|d| d.to_string())
        .unwrap_or_else(|_| UNKNOWN.to_string());
    println!("cargo:rustc-env=GIT_DIRTY={}", dirty);

    // Using BUILD_TIMESTAMP makes build unreproducible.
    let source_ts = build_data::get_source_time()
        .map(build_data::format_timestamp)
        .unwrap_or_else(|_| UNKNOWN.to_string());
    println!("cargo:rustc-env=SOURCE_TIMESTAMP={}", source_ts);

    build_data::set_RUSTC_VERSION();
}
