// build.rs
use std::process::Command;

fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn main() {
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    let hash = git_output(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let dirty = Command::new("git")
        .args(["diff", "--quiet"])
        .status()
        .map(|status| if status.success() { "" } else { "-dirty" })
        .unwrap_or("");

    println!(
        "cargo:rustc-env=FMGC_VNAV_VERSION={} {}{}-{}",
        version, hash, dirty, profile
    );
    println!("cargo:rerun-if-changed=.git/HEAD");
}
