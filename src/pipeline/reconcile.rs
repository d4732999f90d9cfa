//! Output reconciliation.
//!
//! After all producers have run, the output directory must contain exactly
//! the known set. Anything else is left over from an earlier build (a
//! renamed page, a removed asset) and is deleted.

use super::{ArtifactSet, BuildError};
use crate::log;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Delete every file under `dest_root` that is not in `known`.
///
/// Returns the deleted paths. A missing `dest_root` is a no-op. With
/// `prune_empty_dirs`, directories left empty are removed too (never
/// `dest_root` itself).
pub fn reconcile(
    dest_root: &Path,
    known: &ArtifactSet,
    prune_empty_dirs: bool,
) -> Result<Vec<PathBuf>, BuildError> {
    if !dest_root.exists() {
        return Ok(Vec::new());
    }

    let mut stale = Vec::new();
    for entry in WalkDir::new(dest_root).sort_by_file_name() {
        let entry = entry.map_err(|err| walk_error(dest_root, err))?;
        if !entry.file_type().is_dir() && !known.contains(entry.path()) {
            stale.push(entry.into_path());
        }
    }

    for path in &stale {
        fs::remove_file(path).map_err(|err| BuildError::io(path, err))?;
        log!("delete"; "{}", path.display());
    }

    if prune_empty_dirs {
        prune_dirs(dest_root)?;
    }

    Ok(stale)
}

/// Remove empty directories beneath `root`, deepest first.
fn prune_dirs(root: &Path) -> Result<(), BuildError> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry.map_err(|err| walk_error(root, err))?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }

    for dir in dirs {
        let is_empty = fs::read_dir(&dir)
            .map_err(|err| BuildError::io(&dir, err))?
            .next()
            .is_none();
        if is_empty {
            fs::remove_dir(&dir).map_err(|err| BuildError::io(&dir, err))?;
            log!("delete"; "{}/", dir.display());
        }
    }
    Ok(())
}

fn walk_error(root: &Path, err: walkdir::Error) -> BuildError {
    let path = err.path().unwrap_or(root).to_path_buf();
    BuildError::io(path, err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn known(paths: &[&Path]) -> ArtifactSet {
        let mut set = ArtifactSet::new();
        for path in paths {
            set.insert(path.to_path_buf(), PathBuf::from("src")).unwrap();
        }
        set
    }

    #[test]
    fn test_deletes_unknown_files_only() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dist");
        let index = dest.join("index.html");
        let style = dest.join("css/style.css");
        let old = dest.join("old.html");
        let old_asset = dest.join("img/old.png");
        for path in [&index, &style, &old, &old_asset] {
            touch(path);
        }

        let deleted = reconcile(&dest, &known(&[&index, &style]), false).unwrap();

        assert_eq!(deleted, vec![old_asset.clone(), old.clone()]);
        assert!(index.exists());
        assert!(style.exists());
        assert!(!old.exists());
        assert!(!old_asset.exists());
        // empty directories are acceptable residue by default
        assert!(dest.join("img").is_dir());
    }

    #[test]
    fn test_nothing_to_delete() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dist");
        let index = dest.join("index.html");
        touch(&index);

        assert!(reconcile(&dest, &known(&[&index]), false).unwrap().is_empty());
        assert!(index.exists());
    }

    #[test]
    fn test_missing_root_is_noop() {
        let dir = TempDir::new().unwrap();
        let deleted = reconcile(&dir.path().join("dist"), &ArtifactSet::new(), true).unwrap();
        assert!(deleted.is_empty());
    }

    #[test]
    fn test_prune_empty_dirs() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dist");
        let index = dest.join("index.html");
        touch(&index);
        touch(&dest.join("a/b/c/old.txt"));
        fs::create_dir_all(dest.join("empty")).unwrap();

        reconcile(&dest, &known(&[&index]), true).unwrap();

        assert!(index.exists());
        assert!(!dest.join("a").exists());
        assert!(!dest.join("empty").exists());
        assert!(dest.is_dir());
    }

    #[test]
    fn test_prune_keeps_dirs_with_known_files() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dist");
        let style = dest.join("css/style.css");
        touch(&style);
        touch(&dest.join("css/old.css"));

        reconcile(&dest, &known(&[&style]), true).unwrap();
        assert!(style.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_prune_reports_unreadable_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dist");
        let locked = dest.join("locked");
        touch(&locked.join("inner/x.txt"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // privileged users read through the mode bits
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = prune_dirs(&dest);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(
            result,
            Err(BuildError::Io { ref path, .. }) if path.starts_with(&locked)
        ));
        assert!(locked.join("inner/x.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_deletes_stale_symlink() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dist");
        fs::create_dir_all(&dest).unwrap();
        let link = dest.join("link.html");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();

        let deleted = reconcile(&dest, &ArtifactSet::new(), false).unwrap();
        assert_eq!(deleted, vec![link.clone()]);
        assert!(fs::symlink_metadata(&link).is_err());
    }
}
