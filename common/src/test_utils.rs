use std::path::PathBuf;
use std::sync::OnceLock;

/// Workspace root: the parent of the `common` manifest directory.
fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .map(|parent| parent.to_path_buf())
        .unwrap_or(manifest_dir)
}

fn test_output_dir() -> PathBuf {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = workspace_root().join("test_output");
        std::fs::create_dir_all(&dir).expect("Failed to create test_output directory");
        dir
    })
    .clone()
}

/// Returns the path to a test output file under `<workspace>/test_output`.
pub fn test_output_path(name: &str) -> PathBuf {
    test_output_dir().join(name)
}
