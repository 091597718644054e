//! `//pkg:target` build labels and `//pkg/file` load labels.
//!
//! Grounded on the original tool's `internal/target/build.go` and
//! `internal/target/file.go`; kept as a thin, directly-translatable shell per
//! spec.md §1 ("out of scope... described only by the interfaces the core
//! consumes from them") while still being a real, working implementation so
//! the CLI runs end to end.

use std::path::{Path, PathBuf};

use crate::error::{StarfigError, StarfigResult};

pub const STARFIG_FILENAME: &str = "STARFIG";

/// A resolved `//package:target_name` build label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildTarget {
    pub starverse_dir: PathBuf,
    pub package: String,
    pub target_name: String,
}

impl BuildTarget {
    pub fn label(&self) -> String {
        format!("//{}:{}", self.package, self.target_name)
    }

    pub fn path(&self) -> PathBuf {
        self.starverse_dir.join(&self.package).join(STARFIG_FILENAME)
    }

    pub fn is_spread(&self) -> bool {
        self.target_name == "..."
    }
}

/// A resolved `//package/filename` load label, used by `load()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTarget {
    pub starverse_dir: PathBuf,
    pub package: String,
    pub filename: String,
}

impl FileTarget {
    pub fn path(&self) -> PathBuf {
        self.starverse_dir.join(&self.package).join(&self.filename)
    }

    pub fn label(&self) -> String {
        format!("//{}", Path::new(&self.package).join(&self.filename).display())
    }

    pub fn is_star_file(&self) -> bool {
        Path::new(&self.filename).extension().is_some_and(|ext| ext == "star")
    }

    pub fn is_starfig_file(&self) -> bool {
        self.filename == STARFIG_FILENAME
    }
}

/// Parse `rawLabel` (must be `//`-prefixed) into a `FileTarget`, as consumed by `load()`.
pub fn parse_file_target(starverse_dir: &Path, raw_label: &str) -> StarfigResult<FileTarget> {
    let Some(rest) = raw_label.strip_prefix("//") else {
        return Err(StarfigError::LoadNotAbsolute(raw_label.to_string()));
    };

    let path = Path::new(rest);
    let package = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(FileTarget {
        starverse_dir: starverse_dir.to_path_buf(),
        package,
        filename,
    })
}

/// Parse a raw CLI argument into one or more `BuildTarget`s, expanding a
/// trailing `/...` spread label into one target per `STARFIG`-bearing package
/// found beneath it.
pub fn parse_build_target(starverse_dir: &Path, raw_target_input: &str) -> StarfigResult<Vec<BuildTarget>> {
    if !raw_target_input.starts_with("//") {
        return Err(StarfigError::InvalidLabel(format!(
            "\"{raw_target_input}\" is invalid because a target must start with //."
        )));
    }

    let raw_targets: Vec<String> = if let Some(prefix) = raw_target_input.strip_suffix("...") {
        let search_dir = starverse_dir.join(prefix.trim_end_matches('/'));
        find_starfig_packages(starverse_dir, &search_dir)?
    } else {
        vec![raw_target_input.to_string()]
    };

    let mut targets = Vec::with_capacity(raw_targets.len());
    for raw_target in raw_targets {
        let rest = &raw_target[2..];
        let colon_positions: Vec<usize> = rest.match_indices(':').map(|(i, _)| i).collect();
        if colon_positions.len() != 1 {
            return Err(StarfigError::InvalidLabel(format!("Invalid target {rest}.")));
        }
        let colon_index = colon_positions[0];
        let target = BuildTarget {
            starverse_dir: starverse_dir.to_path_buf(),
            package: rest[..colon_index].to_string(),
            target_name: rest[colon_index + 1..].to_string(),
        };

        if !target.path().exists() {
            return Err(StarfigError::MissingStarfig(target.label()));
        }

        targets.push(target);
    }

    Ok(targets)
}

/// Depth-first, deterministically-ordered search for `STARFIG`-bearing
/// packages beneath `search_root`, each expanded to a `//pkg:...` spread label.
fn find_starfig_packages(starverse_dir: &Path, search_root: &Path) -> StarfigResult<Vec<String>> {
    let mut packages = Vec::new();
    walk_for_starfig(starverse_dir, search_root, &mut packages)?;
    packages.sort();
    Ok(packages)
}

fn walk_for_starfig(starverse_dir: &Path, dir: &Path, packages: &mut Vec<String>) -> StarfigResult<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    if dir.join(STARFIG_FILENAME).is_file() {
        let rel = dir.strip_prefix(starverse_dir).unwrap_or(dir);
        packages.push(format!("//{}:...", rel.display()));
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            walk_for_starfig(starverse_dir, &path, packages)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_starverse() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("fruit")).unwrap();
        fs::write(dir.path().join("fruit").join(STARFIG_FILENAME), "").unwrap();
        dir
    }

    #[test]
    fn parses_a_specific_target() {
        let dir = make_starverse();
        let targets = parse_build_target(dir.path(), "//fruit:apple").unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].package, "fruit");
        assert_eq!(targets[0].target_name, "apple");
        assert_eq!(targets[0].label(), "//fruit:apple");
    }

    #[test]
    fn rejects_non_absolute_targets() {
        let dir = make_starverse();
        assert!(parse_build_target(dir.path(), "fruit:apple").is_err());
    }

    #[test]
    fn rejects_missing_starfig() {
        let dir = make_starverse();
        let err = parse_build_target(dir.path(), "//nope:thing").unwrap_err();
        assert!(matches!(err, StarfigError::MissingStarfig(_)));
    }

    #[test]
    fn expands_spread_labels_depth_first() {
        let dir = make_starverse();
        fs::create_dir_all(dir.path().join("fruit").join("citrus")).unwrap();
        fs::write(dir.path().join("fruit").join("citrus").join(STARFIG_FILENAME), "").unwrap();

        let targets = parse_build_target(dir.path(), "//...").unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].package, "fruit");
        assert_eq!(targets[1].package, "fruit/citrus");
    }

    #[test]
    fn parses_load_labels() {
        let target = parse_file_target(Path::new("/ws"), "//fruit/fruit.star").unwrap();
        assert_eq!(target.package, "fruit");
        assert_eq!(target.filename, "fruit.star");
        assert!(target.is_star_file());
        assert!(!target.is_starfig_file());
    }

    #[test]
    fn rejects_relative_load_labels() {
        assert!(parse_file_target(Path::new("/ws"), "fruit/fruit.star").is_err());
    }
}
