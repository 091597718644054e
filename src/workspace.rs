//! `STARVERSE` root discovery.
//!
//! Grounded on `internal/starverse/starverse.go` and `internal/util/util.go`'s
//! `WalkUpFind`.

use std::path::{Path, PathBuf};

use crate::error::{StarfigError, StarfigResult};

pub const STARVERSE_FILENAME: &str = "STARVERSE";

/// Walk up from `current_dir` until a `STARVERSE` file is found, returning its
/// containing directory.
pub fn find_starverse_directory(current_dir: &Path) -> StarfigResult<PathBuf> {
    walk_up_find(current_dir).ok_or(StarfigError::NoStarverse)
}

fn walk_up_find(start: &Path) -> Option<PathBuf> {
    let mut candidate = start;
    loop {
        if candidate.join(STARVERSE_FILENAME).is_file() {
            return Some(candidate.to_path_buf());
        }
        match candidate.parent() {
            Some(parent) => candidate = parent,
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_starverse_in_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STARVERSE_FILENAME), "").unwrap();
        assert_eq!(find_starverse_directory(dir.path()).unwrap(), dir.path());
    }

    #[test]
    fn finds_starverse_walking_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STARVERSE_FILENAME), "").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_starverse_directory(&nested).unwrap(), dir.path());
    }

    #[test]
    fn errors_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_starverse_directory(dir.path()).is_err());
    }
}
