//! Integration tests for manifest validation against a real file system

mod common;

use common::ProjectFixture;
use ueindex::{IssueKind, ProjectScanner, ScanSettings};

fn core_game_project() -> ProjectFixture {
    let fixture = ProjectFixture::with_manifest(
        "CoreGame",
        r#"{
            "EngineAssociation": "5.3",
            "Modules": [
                { "Name": "Core", "Type": "Runtime" },
                { "Name": "Game", "Type": "Runtime", "AdditionalDependencies": ["Core"] }
            ]
        }"#,
    );
    fixture.write("Source/Core/Core.h", "UCLASS()\nclass UCoreThing : public UObject\n{\n};\n");
    fixture.write("Source/Game/Game.h", "UCLASS()\nclass UGameThing : public UCoreThing\n{\n};\n");
    fixture.mkdir("Content");
    fixture
}

#[test]
fn test_complete_project_is_valid() {
    let fixture = core_game_project();
    let index = ProjectScanner::default().scan(&fixture.root).unwrap();

    let report = index.validate();
    assert!(report.valid, "unexpected issues: {:?}", report.issues);
    assert!(report.issues.is_empty());
}

#[test]
fn test_deleted_game_directory_is_reported() {
    let fixture = core_game_project();
    fixture.remove_dir("Source/Game");

    let index = ProjectScanner::default().scan(&fixture.root).unwrap();
    let report = index.validate();

    assert!(!report.valid);
    assert!(report.mentions("'Game' directory is missing"), "{:?}", report.issues);
    assert!(!report.mentions("'Core'"), "{:?}", report.issues);
}

#[test]
fn test_directory_deleted_after_scan() {
    let fixture = core_game_project();
    let index = ProjectScanner::default().scan(&fixture.root).unwrap();
    assert!(index.validate().valid);

    // Validation re-checks the file system; the index itself is untouched
    fixture.remove_dir("Source/Game");
    let report = index.validate();
    assert!(!report.valid);
    assert!(index.declaration("UGameThing").is_some());
    assert_eq!(index.issues_of_kind(IssueKind::ModuleDirectoryMissing).count(), 0);
}

#[test]
fn test_unresolved_dependency_and_missing_content() {
    let fixture = ProjectFixture::with_manifest(
        "Deps",
        r#"{
            "EngineAssociation": "5.3",
            "Modules": [ { "Name": "Game", "AdditionalDependencies": ["Physics"] } ]
        }"#,
    );
    fixture.mkdir("Source/Game");

    let index = ProjectScanner::new(ScanSettings::default()).scan(&fixture.root).unwrap();
    let report = index.validate();

    assert!(!report.valid);
    assert_eq!(report.issues.len(), 2);
    assert!(report.mentions("depends on 'Physics'"));
    assert!(report.mentions("content directory does not exist"));
}

#[test]
fn test_plugin_module_satisfies_dependency() {
    let fixture = ProjectFixture::arena();
    let manifest = common::ARENA_MANIFEST.replace(r#"["Core"]"#, r#"["Core", "WeatherRuntime"]"#);
    fixture.write("Arena.uproject", &manifest);

    let index = ProjectScanner::default().scan(&fixture.root).unwrap();
    assert!(index.validate().valid);

    fixture.remove_dir("Plugins/Weather/Source/WeatherRuntime");
    let report = index.validate();
    assert!(!report.valid);
    assert!(report.mentions("depends on 'WeatherRuntime'"));
    assert!(report.mentions("lists module 'WeatherRuntime'"));
}
