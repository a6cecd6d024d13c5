use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::path_template::EnginePath;

/// Extension the Unreal build tool gives its target manifests.
pub const TARGET_FILE_EXTENSION: &str = "target";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPlatform {
    Win32,
    Win64,
    Mac,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Configuration {
    Debug,
    DebugGame,
    Development,
    Shipping,
    Test,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    Game,
    Client,
    Server,
    Editor,
    Program,
}

/// Classification of a manifest entry. Carried through unchanged, every entry is
/// extracted regardless of its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    RequiredResource,
    DynamicLibrary,
    SymbolFile,
    Executable,
    #[serde(rename = "NonUFS")]
    NonUfs,
    #[serde(rename = "UFS")]
    Ufs,
    #[serde(rename = "DebugNonUFS")]
    DebugNonUfs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestEntry {
    pub path: String,
    #[serde(rename = "Type")]
    pub entry_type: EntryType,
}

impl ManifestEntry {
    pub fn engine_path(&self) -> EnginePath {
        EnginePath::parse(&self.path)
    }
}

/// Contents of an Unreal `.target` file describing one build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildManifest {
    pub target_name: String,
    pub platform: TargetPlatform,
    pub configuration: Configuration,
    pub target_type: TargetType,
    pub is_test_target: bool,
    /// The executable of the application
    pub launch: String,
    /// App specific files
    pub build_products: Vec<ManifestEntry>,
    /// Engine files the app depends on at runtime
    pub runtime_dependencies: Vec<ManifestEntry>,
}

impl BuildManifest {
    /// Reads and validates a `.target` file.
    ///
    /// A missing file or a wrong extension is reported as [`ExtractError::InvalidFile`],
    /// everything after that as a general failure.
    pub fn read(target_file: &Path) -> Result<Self> {
        let has_target_extension = target_file
            .extension()
            .is_some_and(|ext| ext == TARGET_FILE_EXTENSION);
        if !target_file.exists() || !has_target_extension {
            return Err(ExtractError::InvalidFile(target_file.to_path_buf()));
        }

        let content = fs::read_to_string(target_file).map_err(|source| ExtractError::ReadManifest {
            path: target_file.to_path_buf(),
            source,
        })?;

        let manifest = Self::from_json(&content).map_err(|source| ExtractError::ParseManifest {
            path: target_file.to_path_buf(),
            source,
        })?;
        manifest.validate()?;

        debug!(
            target = %manifest.target_name,
            build_products = manifest.build_products.len(),
            runtime_dependencies = manifest.runtime_dependencies.len(),
            "Loaded target file"
        );

        Ok(manifest)
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    fn validate(&self) -> Result<()> {
        for (index, entry) in self.all_entries().enumerate() {
            if entry.path.trim().is_empty() {
                return Err(ExtractError::EmptyEntryPath { index });
            }
        }
        Ok(())
    }

    /// Build products followed by runtime dependencies.
    pub fn all_entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.build_products.iter().chain(&self.runtime_dependencies)
    }

    pub fn launch_path(&self) -> EnginePath {
        EnginePath::parse(&self.launch)
    }
}
