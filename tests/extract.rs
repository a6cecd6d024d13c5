//! End-to-end extraction tests against temporary engine trees.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use unreal_utils::error::{ExitCode, ExtractError};
use unreal_utils::extract::{self, ExtractOptions};

const MY_APP_TARGET: &str = r#"{
    "TargetName": "MyApp",
    "Platform": "Win64",
    "Configuration": "Development",
    "TargetType": "Program",
    "IsTestTarget": false,
    "Launch": "$(EngineDir)\\Binaries\\Win64\\MyApp.exe",
    "BuildProducts": [
        { "Path": "$(EngineDir)\\Binaries\\Win64\\MyApp.exe", "Type": "Executable" }
    ],
    "RuntimeDependencies": []
}"#;

const GAME_TARGET: &str = r#"{
    "TargetName": "Shooter",
    "Platform": "Win64",
    "Configuration": "Shipping",
    "TargetType": "Game",
    "IsTestTarget": false,
    "Launch": "$(EngineDir)\\Binaries\\Win64\\Shooter.exe",
    "BuildProducts": [
        { "Path": "$(EngineDir)\\Binaries\\Win64\\Shooter.exe", "Type": "Executable" },
        { "Path": "$(EngineDir)\\Binaries\\Win64\\Shooter.pdb", "Type": "SymbolFile" }
    ],
    "RuntimeDependencies": [
        { "Path": "$(EngineDir)\\Binaries\\ThirdParty\\Ogg\\Win64\\libogg.dll", "Type": "NonUFS" },
        { "Path": "$(EngineDir)\\Content\\Slate\\Fonts\\Roboto-Bold.ttf", "Type": "UFS" },
        { "Path": "$(EngineDir)\\Binaries\\Win64\\Shooter.exe", "Type": "Executable" }
    ]
}"#;

struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let workspace = Self {
            temp: TempDir::new().unwrap(),
        };
        workspace.engine_file(
            "Engine/Content/Internationalization/icudt64l/cnvalias.icu",
            b"icu aliases",
        );
        workspace.engine_file(
            "Engine/Content/Internationalization/icudt64l/zone/en.res",
            b"zone data",
        );
        workspace
    }

    fn engine(&self) -> PathBuf {
        self.temp.path().join("UE")
    }

    fn destination(&self) -> PathBuf {
        self.temp.path().join("Dist")
    }

    fn engine_file(&self, relative: &str, content: &[u8]) {
        let path = self.engine().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn target_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn options(&self, target_file: PathBuf) -> ExtractOptions {
        ExtractOptions {
            target_file,
            destination: self.destination(),
            engine_path: self.engine(),
            symlink: None,
        }
    }

    fn populate_game(&self) {
        self.engine_file("Engine/Binaries/Win64/Shooter.exe", b"shooter exe");
        self.engine_file("Engine/Binaries/Win64/Shooter.pdb", b"shooter symbols");
        self.engine_file("Engine/Binaries/ThirdParty/Ogg/Win64/libogg.dll", b"ogg");
        self.engine_file("Engine/Content/Slate/Fonts/Roboto-Bold.ttf", b"font");
    }
}

fn assert_same_file(a: &Path, b: &Path) {
    assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap(), "{} != {}", a.display(), b.display());
}

#[test]
fn extracts_single_executable() {
    let ws = Workspace::new();
    ws.engine_file("Engine/Binaries/Win64/MyApp.exe", b"MZ my app");
    let target = ws.target_file("MyApp.target", MY_APP_TARGET);

    let report = extract::run(&ws.options(target)).unwrap();

    assert_eq!(report.extraction_dir, ws.destination().join("MyApp"));
    assert_eq!(report.files_copied, 1);
    assert_same_file(
        &ws.destination().join("MyApp/Engine/Binaries/Win64/MyApp.exe"),
        &ws.engine().join("Engine/Binaries/Win64/MyApp.exe"),
    );
}

#[test]
fn copies_every_entry_regardless_of_type() {
    let ws = Workspace::new();
    ws.populate_game();
    let target = ws.target_file("Shooter.target", GAME_TARGET);

    let report = extract::run(&ws.options(target)).unwrap();

    assert_eq!(report.files_copied, 5);
    for relative in [
        "Engine/Binaries/Win64/Shooter.exe",
        "Engine/Binaries/Win64/Shooter.pdb",
        "Engine/Binaries/ThirdParty/Ogg/Win64/libogg.dll",
        "Engine/Content/Slate/Fonts/Roboto-Bold.ttf",
    ] {
        assert_same_file(
            &ws.destination().join("Shooter").join(relative),
            &ws.engine().join(relative),
        );
    }
}

#[test]
fn creates_distinct_parent_directories() {
    let ws = Workspace::new();
    ws.populate_game();
    let target = ws.target_file("Shooter.target", GAME_TARGET);

    let report = extract::run(&ws.options(target)).unwrap();

    assert_eq!(
        report.directories,
        vec![
            PathBuf::from("Engine/Binaries/ThirdParty/Ogg/Win64"),
            PathBuf::from("Engine/Binaries/Win64"),
            PathBuf::from("Engine/Content/Slate/Fonts"),
        ]
    );
    for dir in &report.directories {
        assert!(report.extraction_dir.join(dir).is_dir());
    }
}

#[test]
fn bundles_localization_content() {
    let ws = Workspace::new();
    ws.engine_file("Engine/Binaries/Win64/MyApp.exe", b"exe");
    let target = ws.target_file("MyApp.target", MY_APP_TARGET);

    let report = extract::run(&ws.options(target)).unwrap();

    assert_eq!(report.localization_files, 2);
    let localization = ws.destination().join("MyApp/Engine/Content/Internationalization");
    assert_eq!(fs::read(localization.join("icudt64l/cnvalias.icu")).unwrap(), b"icu aliases");
    assert_eq!(fs::read(localization.join("icudt64l/zone/en.res")).unwrap(), b"zone data");
}

#[test]
fn rerun_overwrites_previous_extraction() {
    let ws = Workspace::new();
    ws.engine_file("Engine/Binaries/Win64/MyApp.exe", b"first build");
    let target = ws.target_file("MyApp.target", MY_APP_TARGET);
    let options = ws.options(target);

    extract::run(&options).unwrap();
    ws.engine_file("Engine/Binaries/Win64/MyApp.exe", b"second build");
    extract::run(&options).unwrap();

    assert_eq!(
        fs::read(ws.destination().join("MyApp/Engine/Binaries/Win64/MyApp.exe")).unwrap(),
        b"second build"
    );
}

#[test]
fn invalid_target_file_creates_nothing() {
    let ws = Workspace::new();
    ws.engine_file("Engine/Binaries/Win64/MyApp.exe", b"exe");
    let target = ws.target_file("MyApp.json", MY_APP_TARGET);

    let err = extract::run(&ws.options(target)).unwrap_err();

    assert!(matches!(err, ExtractError::InvalidFile(_)));
    assert!(!ws.destination().exists());
}

#[test]
fn missing_source_keeps_earlier_copies() {
    let ws = Workspace::new();
    ws.populate_game();
    fs::remove_file(ws.engine().join("Engine/Binaries/ThirdParty/Ogg/Win64/libogg.dll")).unwrap();
    let target = ws.target_file("Shooter.target", GAME_TARGET);

    let err = extract::run(&ws.options(target)).unwrap_err();

    assert!(matches!(err, ExtractError::CopyFile { .. }));
    let extracted = ws.destination().join("Shooter");
    assert!(extracted.join("Engine/Binaries/Win64/Shooter.exe").exists());
    assert!(extracted.join("Engine/Binaries/Win64/Shooter.pdb").exists());
    assert!(!extracted.join("Engine/Content/Slate/Fonts/Roboto-Bold.ttf").exists());
    assert!(!extracted.join("Engine/Content/Internationalization").exists());
}

#[test]
fn missing_engine_root_fails_before_copying() {
    let ws = Workspace::new();
    let target = ws.target_file("MyApp.target", MY_APP_TARGET);
    let mut options = ws.options(target);
    options.engine_path = ws.temp.path().join("NoEngine");

    let err = extract::run(&options).unwrap_err();

    assert!(matches!(err, ExtractError::EngineRootMissing(_)));
    assert!(!ws.destination().exists());
}

#[test]
fn missing_link_privilege_fails_before_copying() {
    let ws = Workspace::new();
    ws.engine_file("Engine/Binaries/Win64/MyApp.exe", b"exe");
    let links = ws.temp.path().join("Links");
    fs::create_dir_all(&links).unwrap();
    let target = ws.target_file("MyApp.target", MY_APP_TARGET);
    let mut options = ws.options(target);
    options.symlink = Some(links.clone());

    let err = extract::run_with(&options, false).unwrap_err();

    assert!(matches!(err, ExtractError::InsufficientPrivilege));
    assert_eq!(err.exit_code(), ExitCode::GeneralFailure);
    assert!(!ws.destination().exists());
    assert!(!links.join("MyApp.exe").exists());
}

#[cfg(unix)]
#[test]
fn publishes_symlink_to_engine_executable() {
    let ws = Workspace::new();
    ws.engine_file("Engine/Binaries/Win64/MyApp.exe", b"exe");
    let links = ws.temp.path().join("Links");
    fs::create_dir_all(&links).unwrap();
    let target = ws.target_file("MyApp.target", MY_APP_TARGET);
    let mut options = ws.options(target);
    options.symlink = Some(links.clone());

    let report = extract::run(&options).unwrap();

    let link = links.join("MyApp.exe");
    assert_eq!(report.symlink, Some(link.clone()));
    assert_eq!(
        fs::read_link(&link).unwrap(),
        ws.engine().join("Engine/Binaries/Win64/MyApp.exe")
    );
}

#[cfg(unix)]
#[test]
fn symlink_failure_keeps_copied_files() {
    let ws = Workspace::new();
    ws.engine_file("Engine/Binaries/Win64/MyApp.exe", b"exe");
    let target = ws.target_file("MyApp.target", MY_APP_TARGET);
    let mut options = ws.options(target);
    options.symlink = Some(ws.temp.path().join("MissingLinks"));

    let err = extract::run(&options).unwrap_err();

    assert!(matches!(err, ExtractError::CreateSymlink { .. }));
    assert!(ws.destination().join("MyApp/Engine/Binaries/Win64/MyApp.exe").exists());
}
