use std::process::Command;

/// `git describe` of the checkout, if there is one.
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty=+dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    if described.is_empty() {
        return None;
    }
    Some(described.trim_start_matches('v').to_string())
}

fn main() {
    for path in [".git/HEAD", ".git/index", ".git/refs/tags"] {
        println!("cargo:rerun-if-changed={path}");
    }

    // Source tarballs have no .git and keep the manifest version.
    let version = git_describe().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=DEBSEL_VERSION={version}");
}
