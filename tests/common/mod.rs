//! Common test utilities for buildor CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Path to the compiled buildor binary.
pub fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_buildor")
}

/// Command builder with an isolated home so ambient user config and
/// `BUILDOR_*` variables never leak into a test.
pub fn buildor(dir: &Path, home: &Path) -> Command {
    let mut cmd = Command::new(bin());
    cmd.current_dir(dir)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("BUILDOR_ROOT")
        .env_remove("BUILDOR_DUPLICATES");
    cmd
}

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Minimal descriptor in the single-line shape the extractor expects.
pub fn descriptor(namespace: &str, kind: &str, guid: &str, deps: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<Project DefaultTargets="Build" ToolsVersion="4.0">
  <PropertyGroup Label="Globals">
    <ProjectGuid>{{{guid}}}</ProjectGuid>
    <RootNamespace>{namespace}</RootNamespace>
  </PropertyGroup>
  <PropertyGroup>
    <ConfigurationType>{kind}</ConfigurationType>
  </PropertyGroup>
  <ItemDefinitionGroup>
    <Link>
      <AdditionalDependencies>{deps}</AdditionalDependencies>
    </Link>
  </ItemDefinitionGroup>
</Project>
"#
    )
}

/// Lay out a static library and an application depending on it.
/// Returns (library descriptor, application descriptor).
pub fn library_and_app(root: &Path) -> (PathBuf, PathBuf) {
    let lib = root.join("core/basis/basis.vcxproj");
    write_file(
        &lib,
        &descriptor("basis", "StaticLibrary", "11111111-AAAA", ""),
    );

    let app = root.join("apps/nechung/nechung.vcxproj");
    write_file(
        &app,
        &descriptor(
            "nechung",
            "Application",
            "22222222-BBBB",
            "basis.lib;kernel32.lib;%(AdditionalDependencies)",
        ),
    );

    (lib, app)
}
