//! The extraction pipeline.
//!
//! A run moves through the [`Stage`]s in order and stops at the first error. Nothing
//! is rolled back: files copied before a failure stay in the destination.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{ExtractError, Result};
use crate::manifest::BuildManifest;
use crate::path_template::{ENGINE_DIR_NAME, EnginePath};
use crate::platform;

/// Localization content copied wholesale next to every extracted application.
pub const LOCALIZATION_CONTENT_PATH: &str = "$(EngineDir)\\Content\\Internationalization";

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// The `.target` file of the standalone application
    pub target_file: PathBuf,
    /// Folder receiving `<TargetName>/`
    pub destination: PathBuf,
    /// Parent of the `Engine` directory
    pub engine_path: PathBuf,
    /// Folder to create the executable symlink in
    pub symlink: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    ReadingManifest,
    CreatingDirectories,
    CopyingFiles,
    CopyingLocalization,
    Linking,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Validating => "validating",
            Stage::ReadingManifest => "reading-manifest",
            Stage::CreatingDirectories => "creating-directories",
            Stage::CopyingFiles => "copying-files",
            Stage::CopyingLocalization => "copying-localization",
            Stage::Linking => "linking",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub extraction_dir: PathBuf,
    /// Relative directories materialized for the manifest entries
    pub directories: Vec<PathBuf>,
    pub files_copied: usize,
    pub localization_files: usize,
    pub symlink: Option<PathBuf>,
}

/// Runs a full extraction.
pub fn run(options: &ExtractOptions) -> Result<ExtractionReport> {
    run_with(options, platform::can_create_symlinks())
}

/// Runs a full extraction with the symlink privilege already decided by the caller.
pub fn run_with(options: &ExtractOptions, can_link: bool) -> Result<ExtractionReport> {
    println!("Starting extraction of Unreal standalone application...");

    let mut stage = Stage::Validating;
    let result = run_stages(options, can_link, &mut stage);
    if let Err(ref err) = result {
        debug!(%stage, error = %err, "Stopping after failed stage");
        enter(&mut stage, Stage::Failed);
    }
    result
}

fn run_stages(options: &ExtractOptions, can_link: bool, stage: &mut Stage) -> Result<ExtractionReport> {
    enter(stage, Stage::Validating);
    validate_with(options, can_link)?;

    enter(stage, Stage::ReadingManifest);
    let manifest = BuildManifest::read(&options.target_file)?;
    let engine_root = absolute(&options.engine_path)?;
    if !engine_root.is_dir() {
        return Err(ExtractError::EngineRootMissing(engine_root));
    }
    let extraction_dir = absolute(&options.destination)?.join(&manifest.target_name);
    let extractor = Extractor::new(engine_root, extraction_dir);

    enter(stage, Stage::CreatingDirectories);
    let directories = extractor.create_directories(&manifest)?;

    enter(stage, Stage::CopyingFiles);
    let files_copied = extractor.copy_files(&manifest)?;

    enter(stage, Stage::CopyingLocalization);
    let localization_files = extractor.copy_localization()?;

    let symlink = match &options.symlink {
        Some(link_dir) => {
            enter(stage, Stage::Linking);
            Some(extractor.publish_symlink(&manifest, link_dir)?)
        }
        None => None,
    };

    enter(stage, Stage::Done);
    Ok(ExtractionReport {
        extraction_dir: extractor.extraction_dir().to_path_buf(),
        directories,
        files_copied,
        localization_files,
        symlink,
    })
}

fn enter(current: &mut Stage, next: Stage) {
    debug!(from = %current, to = %next, "Entering stage");
    *current = next;
}

/// Up-front checks that must pass before anything is written.
pub fn validate(options: &ExtractOptions) -> Result<()> {
    validate_with(options, platform::can_create_symlinks())
}

pub fn validate_with(options: &ExtractOptions, can_link: bool) -> Result<()> {
    if options.symlink.is_some() && !can_link {
        return Err(ExtractError::InsufficientPrivilege);
    }
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| ExtractError::ResolvePath {
        path: path.to_path_buf(),
        source,
    })
}

/// Distinct relative parent directories of every manifest entry.
pub fn directories_to_create(manifest: &BuildManifest) -> BTreeSet<PathBuf> {
    manifest
        .all_entries()
        .filter_map(|entry| entry.engine_path().parent())
        .collect()
}

/// File name of the executable symlink, `<TargetName>` plus the launch extension.
///
/// Older tooling always appended `.exe`. Taking the launch extension instead keeps Mac
/// targets, whose executables have none, from getting a Windows-style name.
pub fn symlink_file_name(manifest: &BuildManifest) -> String {
    match manifest.launch_path().extension() {
        Some(ext) => format!("{}.{}", manifest.target_name, ext),
        None => manifest.target_name.clone(),
    }
}

/// Copies manifest files out of an engine tree into one extraction folder.
pub struct Extractor {
    engine_root: PathBuf,
    extraction_dir: PathBuf,
}

impl Extractor {
    pub fn new(engine_root: impl AsRef<Path>, extraction_dir: impl AsRef<Path>) -> Self {
        Self {
            engine_root: engine_root.as_ref().to_path_buf(),
            extraction_dir: extraction_dir.as_ref().to_path_buf(),
        }
    }

    pub fn extraction_dir(&self) -> &Path {
        &self.extraction_dir
    }

    /// Creates the extraction folder and every directory the manifest entries live in.
    /// Existing directories are left alone.
    pub fn create_directories(&self, manifest: &BuildManifest) -> Result<Vec<PathBuf>> {
        println!("Creating directories...");

        create_dir(&self.extraction_dir)?;

        let directories: Vec<PathBuf> = directories_to_create(manifest).into_iter().collect();
        for dir in &directories {
            create_dir(&self.extraction_dir.join(dir))?;
        }

        info!(count = directories.len(), "Created directories");
        Ok(directories)
    }

    /// Copies every build product and runtime dependency, overwriting existing files.
    /// Stops at the first file that cannot be copied.
    pub fn copy_files(&self, manifest: &BuildManifest) -> Result<usize> {
        println!("Copying files...");

        let mut copied = 0;
        for entry in manifest.all_entries() {
            let path = entry.engine_path();
            let source = path.resolve(&self.engine_root);
            let destination = path.resolve(&self.extraction_dir);

            copy_file(&source, &destination)?;
            debug!(kind = ?entry.entry_type, "Copied {}", destination.display());
            copied += 1;
        }

        info!(count = copied, "Copied manifest files");
        Ok(copied)
    }

    /// Mirrors the engine's localization content into the extraction folder.
    ///
    /// All directories are created first, then all files are copied. Any unreadable
    /// part of the tree, including a missing root, fails the run.
    pub fn copy_localization(&self) -> Result<usize> {
        println!("Copying localization content...");

        let content = EnginePath::parse(LOCALIZATION_CONTENT_PATH);
        let source_root = content.resolve_in(&self.engine_root.join(ENGINE_DIR_NAME));
        let destination_root = content.resolve(&self.extraction_dir);

        let entries = WalkDir::new(&source_root)
            .sort_by_file_name()
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|source| ExtractError::WalkLocalization {
                root: source_root.clone(),
                source,
            })?;

        let depth = source_root.components().count();
        let mirror = |path: &Path| -> PathBuf {
            destination_root.join(path.components().skip(depth).collect::<PathBuf>())
        };

        for entry in entries.iter().filter(|e| e.file_type().is_dir()) {
            create_dir(&mirror(entry.path()))?;
        }

        let mut copied = 0;
        for entry in entries.iter().filter(|e| !e.file_type().is_dir()) {
            copy_file(entry.path(), &mirror(entry.path()))?;
            copied += 1;
        }

        info!(count = copied, root = %source_root.display(), "Copied localization content");
        Ok(copied)
    }

    /// Links `<link_dir>/<TargetName>.<ext>` to the launch executable under the engine
    /// root.
    pub fn publish_symlink(&self, manifest: &BuildManifest, link_dir: &Path) -> Result<PathBuf> {
        let link = absolute(link_dir)?.join(symlink_file_name(manifest));
        let target = manifest.launch_path().resolve(&self.engine_root);

        platform::create_file_symlink(&target, &link).map_err(|source| ExtractError::CreateSymlink {
            link: link.clone(),
            target: target.clone(),
            source,
        })?;

        println!(
            "Symlink to {} successfully created at {}",
            target.display(),
            link.display()
        );
        Ok(link)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| ExtractError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map_err(|source| ExtractError::CopyFile {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    Ok(())
}
