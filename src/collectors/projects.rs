use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Immediate child directories of `root` in enumeration order, minus
/// the excluded names. An unreadable root is logged and yields an
/// empty list so the rest of the page still renders.
pub fn list_project_folders(root: impl AsRef<Path>, excluded: &HashSet<String>) -> Vec<String> {
    let root = root.as_ref();
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(root = %root.display(), error = %err, "cannot read projects root");
            return Vec::new();
        }
    };

    let mut folders = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(root = %root.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let is_dir = entry
            .file_type()
            .map(|file_type| file_type.is_dir())
            .unwrap_or(false);
        if !is_dir {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if excluded.contains(&name) {
            continue;
        }
        folders.push(name);
    }
    folders
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn excluded() -> HashSet<String> {
        [".", "..", ".git", ".svn", ".htaccess"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn lists_only_non_excluded_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("app")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::create_dir(dir.path().join(".svn")).unwrap();
        File::create(dir.path().join("readme.md")).unwrap();

        let folders = list_project_folders(dir.path(), &excluded());
        assert_eq!(folders, ["app"]);
    }

    #[test]
    fn files_matching_no_exclusion_are_still_skipped() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let folders = list_project_folders(dir.path(), &excluded());
        assert!(folders.is_empty());
    }

    #[test]
    fn unreadable_root_returns_empty() {
        let folders = list_project_folders("/definitely/missing/root/8471", &excluded());
        assert!(folders.is_empty());
    }

    #[test]
    fn empty_exclusion_set_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("app")).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let mut folders = list_project_folders(dir.path(), &HashSet::new());
        folders.sort();
        assert_eq!(folders, [".git", "app"]);
    }
}
