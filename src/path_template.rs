//! Placeholder-aware paths taken from `.target` manifests.
//!
//! Manifest paths are written by the Unreal build tool on the build machine, e.g.
//! `$(EngineDir)\Binaries\Win64\MyApp.exe`. The leading `$(EngineDir)` segment stands
//! for the engine directory and is substituted when the path is resolved against a
//! concrete root. Both `\` and `/` separate segments, so Windows-authored manifests
//! resolve the same way on every host.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Placeholder for the engine directory in manifest paths.
pub const ENGINE_DIR_TOKEN: &str = "$(EngineDir)";

/// Name of the engine sub-folder under an engine root.
pub const ENGINE_DIR_NAME: &str = "Engine";

/// A manifest path split into segments, with the engine placeholder recognised.
///
/// The placeholder only counts as a whole leading segment. Text such as
/// `Foo$(EngineDir)` or a token further down the path is kept literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginePath {
    in_engine_dir: bool,
    segments: Vec<String>,
}

impl EnginePath {
    pub fn parse(raw: &str) -> Self {
        let mut segments: Vec<String> = raw
            .split(['\\', '/'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .map(str::to_string)
            .collect();

        let in_engine_dir = segments.first().is_some_and(|s| s == ENGINE_DIR_TOKEN);
        if in_engine_dir {
            segments.remove(0);
        }

        Self {
            in_engine_dir,
            segments,
        }
    }

    /// Whether the path started with the engine placeholder.
    pub fn is_in_engine_dir(&self) -> bool {
        self.in_engine_dir
    }

    /// The path with the placeholder replaced by the `Engine` folder name.
    pub fn relative(&self) -> PathBuf {
        let mut path = PathBuf::new();
        if self.in_engine_dir {
            path.push(ENGINE_DIR_NAME);
        }
        path.extend(&self.segments);
        path
    }

    /// Joins [`relative`](Self::relative) onto `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(self.relative())
    }

    /// Replaces the placeholder with an already-joined engine directory
    /// (`<engine root>/Engine`). Paths without the placeholder are returned as-is.
    pub fn resolve_in(&self, engine_dir: &Path) -> PathBuf {
        let mut path = if self.in_engine_dir {
            engine_dir.to_path_buf()
        } else {
            PathBuf::new()
        };
        path.extend(&self.segments);
        path
    }

    /// Relative parent directory, `None` when the entry sits at the root.
    pub fn parent(&self) -> Option<PathBuf> {
        self.relative()
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    /// Extension of the last segment, e.g. `exe`.
    pub fn extension(&self) -> Option<&str> {
        self.segments
            .last()
            .and_then(|name| Path::new(name).extension())
            .and_then(OsStr::to_str)
    }
}
