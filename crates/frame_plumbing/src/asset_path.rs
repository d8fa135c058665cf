use std::path::Path;
use std::path::PathBuf;

use eyre::eyre;
use eyre::Result;
use tracing::warn;

/// Finds an asset next to the executable, falling back to the crate's source tree during development.
///
/// `relative` is the asset's path below either root, e.g. `shaders/cube.hlsl`.
pub fn locate_asset(relative: impl AsRef<Path>, source_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    let exe_dir = exe_path
        .parent()
        .ok_or_else(|| eyre!("executable path {} has no parent", exe_path.display()))?;
    locate_asset_in(relative.as_ref(), exe_dir, source_dir.as_ref())
}

fn locate_asset_in(relative: &Path, exe_dir: &Path, source_dir: &Path) -> Result<PathBuf> {
    let beside_exe = exe_dir.join(relative);
    if beside_exe.exists() {
        return Ok(beside_exe);
    }

    let in_source = source_dir.join(relative);
    if in_source.exists() {
        warn!(
            "{} not found next to executable, using {}",
            relative.display(),
            in_source.display()
        );
        return Ok(in_source);
    }

    Err(eyre!(
        "{} not found next to executable ({}) or in {}",
        relative.display(),
        beside_exe.display(),
        source_dir.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("asset_path-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn prefers_the_copy_next_to_the_executable() {
        let exe_dir = scratch_dir("prefer-exe");
        let source_dir = scratch_dir("prefer-src");
        std::fs::write(exe_dir.join("shader.hlsl"), "exe").unwrap();
        std::fs::write(source_dir.join("shader.hlsl"), "src").unwrap();

        let found = locate_asset_in(Path::new("shader.hlsl"), &exe_dir, &source_dir).unwrap();
        assert_eq!(found, exe_dir.join("shader.hlsl"));
    }

    #[test]
    fn falls_back_to_the_source_tree() {
        let exe_dir = scratch_dir("fallback-exe");
        let source_dir = scratch_dir("fallback-src");
        std::fs::create_dir_all(source_dir.join("assets")).unwrap();
        std::fs::write(source_dir.join("assets/texture.png"), [0u8]).unwrap();

        let found =
            locate_asset_in(Path::new("assets/texture.png"), &exe_dir, &source_dir).unwrap();
        assert_eq!(found, source_dir.join("assets/texture.png"));
    }

    #[test]
    fn missing_asset_names_both_locations() {
        let exe_dir = scratch_dir("missing-exe");
        let source_dir = scratch_dir("missing-src");

        let error = locate_asset_in(Path::new("nope.hlsl"), &exe_dir, &source_dir).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("nope.hlsl"));
        assert!(message.contains(&source_dir.display().to_string()));
    }
}
