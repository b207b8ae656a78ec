use std::fs;
use std::path::Path;

/// Injects the workspace `VERSION` file as `FOURCUT_VERSION`.
fn main() {
    let Some(workspace_root) = Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2) else {
        panic!("fourcut-app must live under <workspace>/crates/");
    };
    let version_file = workspace_root.join("VERSION");
    println!("cargo:rerun-if-changed={}", version_file.display());

    let contents = match fs::read_to_string(&version_file) {
        Ok(contents) => contents,
        Err(error) => panic!("cannot read {}: {error}", version_file.display()),
    };
    let version = contents.lines().next().unwrap_or_default().trim();
    if version.is_empty() {
        panic!("{} has no version on its first line", version_file.display());
    }

    println!("cargo:rustc-env=FOURCUT_VERSION={version}");
}
