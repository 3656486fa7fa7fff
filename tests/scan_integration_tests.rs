//! Integration tests for full project scans
//!
//! These tests verify that ProjectScanner correctly:
//! - Parses the manifest and aborts only on manifest failures
//! - Discovers declarations across project and plugin modules in a stable order
//! - Catalogues project and plugin content
//! - Produces the same index from the sequential and concurrent paths

mod common;

use common::{file_name, ProjectFixture};
use ueindex::models::{ClassificationTier, ModuleOwner};
use ueindex::{DeclarationKind, IssueKind, ManifestError, ProjectScanner, ScanError, ScanSettings};

fn scanner() -> ProjectScanner {
    ProjectScanner::new(ScanSettings::default())
}

#[test]
fn test_module_count_matches_manifest() {
    let fixture = ProjectFixture::arena();
    let index = scanner().scan(&fixture.root).unwrap();

    assert_eq!(index.config.name, "Arena");
    assert_eq!(index.config.engine_version, "5.3");
    assert_eq!(index.config.modules.len(), 2);

    // Project modules first, then the resolved plugin module
    let names: Vec<&str> = index.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Core", "Game", "WeatherRuntime"]);
    assert_eq!(
        index.module("WeatherRuntime").unwrap().owner,
        ModuleOwner::Plugin("Weather".to_string())
    );
}

#[test]
fn test_declarations_in_discovery_order() {
    let fixture = ProjectFixture::arena();
    let index = scanner().scan(&fixture.root).unwrap();

    let names: Vec<&str> = index.declarations.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "EDamageType",
            "FDamageInfo",
            "UDamageable",
            "UArenaObject",
            "AHero",
            "AArenaCharacter",
            "UWeatherSystem",
        ]
    );

    assert!(index.issues.is_empty(), "unexpected issues: {:?}", index.issues);
}

#[test]
fn test_declaration_details() {
    let fixture = ProjectFixture::arena();
    let index = scanner().scan(&fixture.root).unwrap();

    let hero = index.declaration("AHero").unwrap();
    assert_eq!(hero.kind, DeclarationKind::Class);
    assert_eq!(hero.parent.as_deref(), Some("AArenaCharacter"));
    assert_eq!(hero.module, "Game");
    assert_eq!(file_name(&hero.file), "Hero.h");
    assert_eq!(hero.line, 4);
    assert_eq!(hero.specifiers.len(), 2);
    assert!(hero.has_specifier("Blueprintable"));
    assert!(hero.has_specifier("meta"));

    let damage_type = index.declaration("EDamageType").unwrap();
    assert_eq!(damage_type.kind, DeclarationKind::Enum);
    assert_eq!(damage_type.parent, None);

    assert_eq!(index.declaration("FDamageInfo").unwrap().kind, DeclarationKind::Struct);
    assert_eq!(index.declaration("UDamageable").unwrap().kind, DeclarationKind::Interface);

    let weather = index.declaration("UWeatherSystem").unwrap();
    assert_eq!(weather.module, "WeatherRuntime");
    assert_eq!(weather.parent.as_deref(), Some("UArenaObject"));
}

#[test]
fn test_content_catalogue() {
    let fixture = ProjectFixture::arena();
    let index = scanner().scan(&fixture.root).unwrap();

    let assets: Vec<(&str, &str)> = index
        .assets
        .iter()
        .map(|a| (a.package_path.as_str(), a.asset_type.as_str()))
        .collect();
    assert_eq!(
        assets,
        vec![
            ("/Game/Characters/BP_Hero", "Blueprint"),
            ("/Game/Maps/Arena", "Level"),
            ("/Game/Materials/Rock", "Material"),
            ("/Game/Materials/T_Rock", "Texture"),
            ("/Game/Misc/readme", "Unknown"),
            ("/Weather/NS_Rain", "NiagaraSystem"),
        ]
    );

    // Prefix beats directory
    let texture = index.assets.iter().find(|a| a.name == "T_Rock").unwrap();
    assert_eq!(texture.tier, ClassificationTier::Prefix);

    let unknown = index.assets.iter().find(|a| a.name == "readme").unwrap();
    assert!(!unknown.is_classified());

    let rain = index.assets.iter().find(|a| a.name == "NS_Rain").unwrap();
    assert_eq!(rain.module, "Weather");

    assert_eq!(index.asset_stats.total_count, 6);
    assert_eq!(index.asset_stats.count_of("Material"), 1);
    assert_eq!(index.summary().assets.total_bytes, index.asset_stats.total_bytes);
}

#[test]
fn test_asset_owner_follows_top_level_folder() {
    let fixture = ProjectFixture::arena();
    fixture.write("Content/Weapons/BP_Gun.uasset", "gun");
    fixture.write("Content/Loose.uasset", "loose");
    let index = scanner().scan(&fixture.root).unwrap();

    let owner = |name: &str| index.assets.iter().find(|a| a.name == name).unwrap().module.clone();
    assert_eq!(owner("BP_Hero"), "Characters");
    assert_eq!(owner("BP_Gun"), "Weapons");
    assert_eq!(owner("T_Rock"), "Materials");
    assert_eq!(owner("Loose"), "Arena");
    assert_eq!(owner("NS_Rain"), "Weather");
}

#[test]
fn test_plugin_content_can_be_excluded() {
    let fixture = ProjectFixture::arena();
    let settings = ScanSettings {
        include_plugin_content: false,
        ..ScanSettings::default()
    };
    let index = ProjectScanner::new(settings).scan(&fixture.root).unwrap();

    assert_eq!(index.assets.len(), 5);
    assert!(index.assets.iter().all(|a| a.package_path.starts_with("/Game/")));
}

#[test]
fn test_empty_module_directory() {
    let fixture = ProjectFixture::with_manifest(
        "Empty",
        r#"{ "EngineAssociation": "5.3", "Modules": [ { "Name": "Game" } ] }"#,
    );
    fixture.mkdir("Source/Game");
    fixture.mkdir("Content");

    let index = scanner().scan(&fixture.root).unwrap();
    assert!(index.declarations.is_empty());
    assert!(index.issues.is_empty(), "unexpected issues: {:?}", index.issues);
    assert_eq!(index.metrics.files_scanned, 0);
}

#[test]
fn test_missing_manifest_aborts() {
    let fixture = ProjectFixture::arena();
    std::fs::remove_file(fixture.path("Arena.uproject")).unwrap();

    let err = scanner().scan(&fixture.root).unwrap_err();
    assert!(matches!(err, ManifestError::NotFound { .. }));
}

#[test]
fn test_ambiguous_manifest_aborts() {
    let fixture = ProjectFixture::arena();
    fixture.write("Other.uproject", "{}");

    let err = scanner().scan(&fixture.root).unwrap_err();
    match err {
        ManifestError::NotFound { reason, .. } => assert!(reason.contains("2 candidates"), "{}", reason),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_malformed_manifest_aborts() {
    let fixture = ProjectFixture::with_manifest("Broken", "{ \"Modules\": [ ");

    let err = scanner().scan(&fixture.root).unwrap_err();
    assert!(matches!(err, ManifestError::Parse { .. }));
}

#[test]
fn test_missing_module_directory_is_not_fatal() {
    let fixture = ProjectFixture::arena();
    fixture.remove_dir("Source/Game");

    let index = scanner().scan(&fixture.root).unwrap();
    assert!(index.declaration("AHero").is_none());
    assert!(index.declaration("UArenaObject").is_some());

    let missing: Vec<_> = index.issues_of_kind(IssueKind::ModuleDirectoryMissing).collect();
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains("'Game'"));
}

#[test]
fn test_bad_files_are_skipped_with_warnings() {
    let fixture = ProjectFixture::arena();
    fixture.write("Source/Game/Broken.h", "UCLASS()\nvoid NotAType();\n");
    let binary = fixture.path("Source/Game/Binary.h");
    std::fs::write(&binary, [0x55u8, 0xff, 0xfe, 0x00]).unwrap();

    let index = scanner().scan(&fixture.root).unwrap();

    let unterminated: Vec<_> = index.issues_of_kind(IssueKind::UnterminatedAnnotation).collect();
    assert_eq!(unterminated.len(), 1);
    assert_eq!(unterminated[0].line, Some(1));

    let unreadable: Vec<_> = index.issues_of_kind(IssueKind::UnreadableFile).collect();
    assert_eq!(unreadable.len(), 1);
    assert_eq!(unreadable[0].path.as_deref(), Some(binary.as_path()));

    // Everything else still scanned
    assert_eq!(index.declarations.len(), 7);
    assert_eq!(index.metrics.files_skipped, 1);
}

#[test]
fn test_oversized_files_are_skipped() {
    let fixture = ProjectFixture::arena();
    let settings = ScanSettings {
        max_source_file_bytes: 200,
        ..ScanSettings::default()
    };

    let index = ProjectScanner::new(settings).scan(&fixture.root).unwrap();

    // CoreTypes.h and Hero.h are both over the limit
    assert_eq!(index.issues_of_kind(IssueKind::OversizedFile).count(), 2);
    assert!(index.declaration("UArenaObject").is_none());
    assert!(index.declaration("UWeatherSystem").is_some());
}

#[test]
fn test_plugin_problems_are_reported() {
    let fixture = ProjectFixture::arena();
    fixture.mkdir("Plugins/NoDescriptor/Source");
    fixture.write("Plugins/Corrupt/Corrupt.uplugin", "{ not json");
    fixture.write(
        "Plugins/Ghost/Ghost.uplugin",
        r#"{ "Modules": [ { "Name": "GhostRuntime" } ] }"#,
    );

    let index = scanner().scan(&fixture.root).unwrap();

    let plugin_names: Vec<&str> = index.plugins.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(plugin_names, vec!["Ghost", "Weather"]);

    assert_eq!(index.issues_of_kind(IssueKind::MissingPluginDescriptor).count(), 1);
    assert_eq!(index.issues_of_kind(IssueKind::InvalidPluginDescriptor).count(), 1);

    let unresolved: Vec<_> = index.issues_of_kind(IssueKind::UnresolvedPluginModule).collect();
    assert_eq!(unresolved.len(), 1);
    assert!(unresolved[0].message.contains("GhostRuntime"));
}

#[test]
fn test_missing_content_root_is_reported() {
    let fixture = ProjectFixture::arena();
    fixture.remove_dir("Content");

    let index = scanner().scan(&fixture.root).unwrap();
    assert_eq!(index.issues_of_kind(IssueKind::ContentRootMissing).count(), 1);
    assert_eq!(index.assets.len(), 1);
}

#[tokio::test]
async fn test_concurrent_scan_matches_sequential() {
    let fixture = ProjectFixture::arena();
    fixture.write("Source/Game/Broken.h", "UCLASS()\nvoid NotAType();\n");

    let sequential = scanner().scan(&fixture.root).unwrap();
    let concurrent = scanner().scan_concurrent(fixture.root.clone()).await.unwrap();

    assert_eq!(sequential.declarations, concurrent.declarations);
    assert_eq!(sequential.assets, concurrent.assets);
    assert_eq!(sequential.issues, concurrent.issues);
    assert_eq!(sequential.modules, concurrent.modules);
    assert_eq!(sequential.source_files(), concurrent.source_files());
    assert_eq!(sequential.usages("FDamageInfo").count, concurrent.usages("FDamageInfo").count);
}

#[tokio::test]
async fn test_concurrent_scan_reports_manifest_errors() {
    let fixture = ProjectFixture::with_manifest("Broken", "\"not an object\"");

    let err = scanner().scan_concurrent(fixture.root.clone()).await.unwrap_err();
    assert!(matches!(err, ScanError::Manifest(ManifestError::Parse { .. })));
}
