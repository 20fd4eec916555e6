//! Build script for ouoctl
//!
//! Injects build metadata (git commit, build date) at compile time.

use std::process::Command;

fn main() {
    // Short hash of HEAD, "unknown" outside a git checkout
    let git_commit = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    // UTC build date
    let build_date = chrono::Utc::now().format("%Y-%m-%d").to_string();

    println!("cargo:rustc-env=OUO_GIT_COMMIT={}", git_commit);
    println!("cargo:rustc-env=OUO_BUILD_DATE={}", build_date);

    // Rebuild when HEAD or the branch it points at moves
    println!("cargo:rerun-if-changed=.git/HEAD");
    if let Ok(head) = std::fs::read_to_string(".git/HEAD") {
        if let Some(reference) = head.trim().strip_prefix("ref: ") {
            let reference = reference.trim();
            if !reference.is_empty() {
                println!("cargo:rerun-if-changed=.git/{}", reference);
            }
        }
    }
}
