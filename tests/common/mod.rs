//! Shared project fixtures for the integration tests.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// A throwaway project tree. The directory is removed on drop.
pub struct ProjectFixture {
    _temp_dir: TempDir,
    pub root: Utf8PathBuf,
}

impl ProjectFixture {
    /// Empty project with just a manifest.
    pub fn with_manifest(name: &str, manifest: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let fixture = Self {
            _temp_dir: temp_dir,
            root,
        };
        fixture.write(&format!("{}.uproject", name), manifest);
        fixture
    }

    /// Two project modules (`Core`, `Game` depending on `Core`), a `Weather`
    /// plugin with one module, and a handful of content assets.
    pub fn arena() -> Self {
        let fixture = Self::with_manifest("Arena", ARENA_MANIFEST);

        fixture.write("Source/Core/Public/CoreTypes.h", CORE_TYPES_H);
        fixture.write("Source/Game/Game.Build.cs", "// build rules, not scanned\n");
        fixture.write("Source/Game/Actors/Hero.h", HERO_H);
        fixture.write("Source/Game/Actors/Hero.cpp", HERO_CPP);

        fixture.write("Content/Characters/BP_Hero.uasset", "bp");
        fixture.write("Content/Maps/Arena.umap", "map-data");
        fixture.write("Content/Materials/Rock.uasset", "rock");
        fixture.write("Content/Materials/T_Rock.uasset", "tex");
        fixture.write("Content/Misc/readme.uasset", "?");

        fixture.write("Plugins/Weather/Weather.uplugin", WEATHER_UPLUGIN);
        fixture.write("Plugins/Weather/Source/WeatherRuntime/WeatherSystem.h", WEATHER_SYSTEM_H);
        fixture.write("Plugins/Weather/Content/NS_Rain.uasset", "rain");

        fixture
    }

    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn mkdir(&self, relative: &str) -> Utf8PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn remove_dir(&self, relative: &str) {
        fs::remove_dir_all(self.path(relative)).unwrap();
    }
}

pub fn file_name(path: &Utf8Path) -> &str {
    path.file_name().unwrap()
}

pub const ARENA_MANIFEST: &str = r#"{
    "FileVersion": 3,
    "EngineAssociation": "5.3",
    "Description": "Arena shooter",
    "Modules": [
        { "Name": "Core", "Type": "Runtime", "LoadingPhase": "PreDefault" },
        { "Name": "Game", "Type": "Runtime", "AdditionalDependencies": ["Core"] }
    ],
    "Plugins": [
        { "Name": "Weather", "Enabled": true }
    ]
}"#;

pub const CORE_TYPES_H: &str = r#"#pragma once

#include "CoreTypes.generated.h"

UENUM(BlueprintType)
enum class EDamageType : uint8
{
    Physical,
    Fire
};

USTRUCT(BlueprintType)
struct CORE_API FDamageInfo
{
    GENERATED_BODY()

    UPROPERTY(EditAnywhere)
    float Amount = 0.f;
};

UINTERFACE(MinimalAPI, Blueprintable)
class UDamageable : public UInterface
{
    GENERATED_BODY()
};

UCLASS(Abstract)
class CORE_API UArenaObject : public UObject
{
    GENERATED_BODY()
};
"#;

pub const HERO_H: &str = r#"#pragma once

UCLASS(Blueprintable, meta = (DisplayName = "Hero, Main"))
class GAME_API AHero : public AArenaCharacter
{
    GENERATED_BODY()

public:
    FDamageInfo LastHit;
};

UCLASS()
class GAME_API AArenaCharacter : public ACharacter
{
    GENERATED_BODY()
};
"#;

pub const HERO_CPP: &str = r#"#include "Hero.h"
void AHero::TakeHit(const FDamageInfo& Info) { LastHit = Info; }
"#;

pub const WEATHER_UPLUGIN: &str = r#"{
    "FileVersion": 3,
    "Version": 2,
    "VersionName": "1.2",
    "FriendlyName": "Dynamic Weather",
    "EnabledByDefault": true,
    "Modules": [
        { "Name": "WeatherRuntime", "Type": "Runtime", "LoadingPhase": "Default" }
    ]
}"#;

pub const WEATHER_SYSTEM_H: &str = r#"UCLASS()
class WEATHERRUNTIME_API UWeatherSystem : public UArenaObject
{
    GENERATED_BODY()
};
"#;
