//! Descriptor metadata extraction
//!
//! Single-line XML primitives plus the derived extractors that pull a
//! project's identity, produced artifact, and dependency metadata out of
//! its build descriptor.
//!
//! Every tag of interest is assumed to sit fully on one physical line -
//! start tag, content, and end tag together. Content that wraps across
//! lines is not found. This is a documented constraint of the format we
//! consume, not something the extractors try to recover from.

use std::path::Path;

use crate::error::BuildorResult;
use crate::fs;

/// Literal placeholder MSBuild expands inside a dependency list; never a
/// real library.
const DEPENDENCY_PLACEHOLDER: &str = "%(AdditionalDependencies)";

/// Extract the content of `<tag>content</tag>` from a single line.
///
/// Content runs from the first `>` after the opening tag to the closing
/// tag. Returns `None` when the tag, its `>`, or its closing tag is
/// absent. Empty content is indistinguishable from an absent tag and
/// also yields `None`.
pub fn extract_tag<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let open = line.find(&format!("<{tag}"))?;
    let rest = &line[open..];
    let gt = rest.find('>')?;
    let rest = &rest[gt + 1..];
    let end = rest.find(&format!("</{tag}"))?;
    let content = &rest[..end];
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

/// Extract the quoted value of `attr` from a line containing `<tag`.
///
/// Returns `None` when the tag or attribute is missing, or the value is
/// not closed by a second quote.
pub fn extract_attribute<'a>(line: &'a str, tag: &str, attr: &str) -> Option<&'a str> {
    if !line.contains(&format!("<{tag}")) {
        return None;
    }
    let attr_pos = line.find(attr)?;
    let rest = &line[attr_pos..];
    let open_quote = rest.find('"')?;
    let value = &rest[open_quote + 1..];
    let close_quote = value.find('"')?;
    let value = &value[..close_quote];
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Configuration kind a descriptor declares, which determines the flavor
/// of artifact the project builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationKind {
    DynamicLibrary,
    Library,
    StaticLibrary,
    Application,
    WinExe,
    Exe,
    /// Builds nothing (project groups, file-copy steps and the like).
    Utility,
}

impl ConfigurationKind {
    /// Parse the raw tag content; `None` for kinds we do not understand.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DynamicLibrary" => Some(Self::DynamicLibrary),
            "Library" => Some(Self::Library),
            "StaticLibrary" => Some(Self::StaticLibrary),
            "Application" => Some(Self::Application),
            "WinExe" => Some(Self::WinExe),
            "Exe" => Some(Self::Exe),
            "Utility" => Some(Self::Utility),
            _ => None,
        }
    }

    /// File suffix of the produced artifact; `None` for kinds that build
    /// nothing.
    pub fn asset_suffix(self) -> Option<&'static str> {
        match self {
            Self::DynamicLibrary | Self::Library => Some(".dll"),
            Self::StaticLibrary => Some(".lib"),
            Self::Application | Self::WinExe | Self::Exe => Some(".exe"),
            Self::Utility => None,
        }
    }
}

/// Outcome of determining the artifact a descriptor builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetResolution {
    /// The descriptor builds this artifact.
    Produces(String),
    /// A utility project; building nothing is not an error.
    NoArtifact,
    /// The configuration kind was present but not one we understand.
    UnknownKind(String),
    /// The name or kind tag never showed up.
    Undetermined,
}

/// GUID recorded in the descriptor, from the first `ProjectGuid` line.
pub fn guid_in_lines(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .find_map(|line| extract_tag(line, "ProjectGuid"))
        .map(str::to_owned)
}

/// Read a descriptor and extract its GUID.
pub fn project_guid(path: &Path) -> BuildorResult<Option<String>> {
    Ok(guid_in_lines(&fs::read_lines(path)?))
}

/// Every `Include` path declared on a `ProjectReference` line.
///
/// Unlike the single-match extractors, references are collected from all
/// matching lines.
pub fn reference_includes_in_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| extract_attribute(line, "ProjectReference", "Include"))
        .map(str::to_owned)
        .collect()
}

/// Read a descriptor and collect its declared project references.
pub fn project_references(path: &Path) -> BuildorResult<Vec<String>> {
    Ok(reference_includes_in_lines(&fs::read_lines(path)?))
}

/// Determine the artifact a descriptor builds.
///
/// Needs a project name (`RootNamespace`, first match) and a
/// configuration kind (`ConfigurationType`, falling back to `OutputType`,
/// whichever shows up first). Later matches are never consulted.
pub fn produced_asset_in_lines(lines: &[String]) -> AssetResolution {
    let mut project_name: Option<&str> = None;
    let mut kind_raw: Option<&str> = None;

    for line in lines {
        if project_name.is_none() {
            project_name = extract_tag(line, "RootNamespace");
        }
        if kind_raw.is_none() {
            kind_raw = extract_tag(line, "ConfigurationType")
                .or_else(|| extract_tag(line, "OutputType"));
        }
        if let (Some(name), Some(kind)) = (project_name, kind_raw) {
            return match ConfigurationKind::parse(kind) {
                Some(parsed) => match parsed.asset_suffix() {
                    Some(suffix) => AssetResolution::Produces(format!("{name}{suffix}")),
                    None => AssetResolution::NoArtifact,
                },
                None => AssetResolution::UnknownKind(kind.to_string()),
            };
        }
    }

    AssetResolution::Undetermined
}

/// Read a descriptor and determine its produced artifact.
pub fn produced_asset(path: &Path) -> BuildorResult<AssetResolution> {
    Ok(produced_asset_in_lines(&fs::read_lines(path)?))
}

/// Library dependencies from the first `AdditionalDependencies` line.
///
/// The list is `;`-separated; the `%(AdditionalDependencies)` placeholder
/// and empty entries are dropped.
pub fn dependencies_in_lines(lines: &[String]) -> Vec<String> {
    for line in lines {
        if line.contains("AdditionalDependencies") {
            let Some(list) = extract_tag(line, "AdditionalDependencies") else {
                return Vec::new();
            };
            return list
                .split(';')
                .filter(|dep| !dep.is_empty() && *dep != DEPENDENCY_PLACEHOLDER)
                .map(str::to_owned)
                .collect();
        }
    }
    Vec::new()
}

/// Read a descriptor and collect its declared library dependencies.
pub fn dependencies(path: &Path) -> BuildorResult<Vec<String>> {
    Ok(dependencies_in_lines(&fs::read_lines(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    // === Single-line primitives ===

    #[test]
    fn test_extract_tag_simple() {
        let line = "    <RootNamespace>nechung</RootNamespace>";
        assert_eq!(extract_tag(line, "RootNamespace"), Some("nechung"));
    }

    #[test]
    fn test_extract_tag_missing_tag() {
        assert_eq!(extract_tag("<OutputType>Exe</OutputType>", "RootNamespace"), None);
    }

    #[test]
    fn test_extract_tag_unclosed() {
        assert_eq!(extract_tag("<RootNamespace>nechung", "RootNamespace"), None);
    }

    #[test]
    fn test_extract_tag_empty_content_is_absent() {
        assert_eq!(extract_tag("<RootNamespace></RootNamespace>", "RootNamespace"), None);
    }

    #[test]
    fn test_extract_tag_skips_earlier_tags_on_the_line() {
        let line = "<Keyword>Win32Proj</Keyword><RootNamespace>basis</RootNamespace>";
        assert_eq!(extract_tag(line, "RootNamespace"), Some("basis"));
    }

    #[test]
    fn test_extract_attribute_simple() {
        let line = r#"    <ProjectReference Include="..\basis\basis.vcxproj">"#;
        assert_eq!(
            extract_attribute(line, "ProjectReference", "Include"),
            Some(r"..\basis\basis.vcxproj")
        );
    }

    #[test]
    fn test_extract_attribute_wrong_tag() {
        let line = r#"    <Reference Include="System.Core">"#;
        assert_eq!(extract_attribute(line, "ProjectReference", "Include"), None);
    }

    #[test]
    fn test_extract_attribute_unclosed_quote() {
        let line = r#"<ProjectReference Include="..\broken"#;
        assert_eq!(extract_attribute(line, "ProjectReference", "Include"), None);
    }

    // === Derived extractors ===

    #[test]
    fn test_guid_first_match_wins() {
        let content = lines(
            "<Project>\n\
             <ProjectGuid>{AAAA-1111}</ProjectGuid>\n\
             <ProjectGuid>{BBBB-2222}</ProjectGuid>\n\
             </Project>",
        );
        assert_eq!(guid_in_lines(&content), Some("{AAAA-1111}".to_string()));
    }

    #[test]
    fn test_references_collect_every_line() {
        let content = lines(
            r#"<ItemGroup>
  <ProjectReference Include="..\a\a.vcxproj" />
  <ProjectReference Include="..\b\b.vcxproj" />
</ItemGroup>"#,
        );
        assert_eq!(
            reference_includes_in_lines(&content),
            vec![r"..\a\a.vcxproj".to_string(), r"..\b\b.vcxproj".to_string()]
        );
    }

    #[test]
    fn test_asset_static_library() {
        let content = lines(
            "<RootNamespace>Foo</RootNamespace>\n\
             <ConfigurationType>StaticLibrary</ConfigurationType>",
        );
        assert_eq!(
            produced_asset_in_lines(&content),
            AssetResolution::Produces("Foo.lib".to_string())
        );
    }

    #[test]
    fn test_asset_output_type_exe() {
        let content = lines(
            "<RootNamespace>Bar</RootNamespace>\n\
             <OutputType>Exe</OutputType>",
        );
        assert_eq!(
            produced_asset_in_lines(&content),
            AssetResolution::Produces("Bar.exe".to_string())
        );
    }

    #[test]
    fn test_asset_dynamic_library() {
        let content = lines(
            "<ConfigurationType>DynamicLibrary</ConfigurationType>\n\
             <RootNamespace>graphiq</RootNamespace>",
        );
        assert_eq!(
            produced_asset_in_lines(&content),
            AssetResolution::Produces("graphiq.dll".to_string())
        );
    }

    #[test]
    fn test_asset_utility_builds_nothing() {
        let content = lines(
            "<RootNamespace>steps</RootNamespace>\n\
             <ConfigurationType>Utility</ConfigurationType>",
        );
        assert_eq!(produced_asset_in_lines(&content), AssetResolution::NoArtifact);
    }

    #[test]
    fn test_asset_unknown_kind() {
        let content = lines(
            "<RootNamespace>odd</RootNamespace>\n\
             <ConfigurationType>Makefile</ConfigurationType>",
        );
        assert_eq!(
            produced_asset_in_lines(&content),
            AssetResolution::UnknownKind("Makefile".to_string())
        );
    }

    #[test]
    fn test_asset_undetermined_without_kind() {
        let content = lines("<RootNamespace>half</RootNamespace>");
        assert_eq!(produced_asset_in_lines(&content), AssetResolution::Undetermined);
    }

    #[test]
    fn test_asset_first_kind_tag_wins() {
        // ConfigurationType appears before OutputType; the first hit
        // decides the kind.
        let content = lines(
            "<RootNamespace>Mix</RootNamespace>\n\
             <ConfigurationType>StaticLibrary</ConfigurationType>\n\
             <OutputType>Exe</OutputType>",
        );
        assert_eq!(
            produced_asset_in_lines(&content),
            AssetResolution::Produces("Mix.lib".to_string())
        );
    }

    #[test]
    fn test_dependencies_filter_placeholder() {
        let content = lines(
            "<AdditionalDependencies>basis.lib;graphiq.lib;%(AdditionalDependencies)</AdditionalDependencies>",
        );
        assert_eq!(
            dependencies_in_lines(&content),
            vec!["basis.lib".to_string(), "graphiq.lib".to_string()]
        );
    }

    #[test]
    fn test_dependencies_first_line_only() {
        let content = lines(
            "<AdditionalDependencies>debug.lib</AdditionalDependencies>\n\
             <AdditionalDependencies>release.lib</AdditionalDependencies>",
        );
        assert_eq!(dependencies_in_lines(&content), vec!["debug.lib".to_string()]);
    }

    #[test]
    fn test_dependencies_absent() {
        let content = lines("<RootNamespace>none</RootNamespace>");
        assert!(dependencies_in_lines(&content).is_empty());
    }

    #[test]
    fn test_file_level_extractors_share_one_read_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nechung.vcxproj");
        std::fs::write(
            &path,
            "<Project>\n\
             <ProjectGuid>{1234}</ProjectGuid>\n\
             <RootNamespace>nechung</RootNamespace>\n\
             <ConfigurationType>Application</ConfigurationType>\n\
             <ProjectReference Include=\"../basis/basis.vcxproj\" />\n\
             <AdditionalDependencies>basis.lib;%(AdditionalDependencies)</AdditionalDependencies>\n\
             </Project>\n",
        )
        .unwrap();

        assert_eq!(project_guid(&path).unwrap(), Some("{1234}".to_string()));
        assert_eq!(
            produced_asset(&path).unwrap(),
            AssetResolution::Produces("nechung.exe".to_string())
        );
        assert_eq!(
            project_references(&path).unwrap(),
            vec!["../basis/basis.vcxproj".to_string()]
        );
        assert_eq!(dependencies(&path).unwrap(), vec!["basis.lib".to_string()]);
    }

    #[test]
    fn test_configuration_kind_suffixes() {
        assert_eq!(ConfigurationKind::parse("DynamicLibrary").unwrap().asset_suffix(), Some(".dll"));
        assert_eq!(ConfigurationKind::parse("Library").unwrap().asset_suffix(), Some(".dll"));
        assert_eq!(ConfigurationKind::parse("StaticLibrary").unwrap().asset_suffix(), Some(".lib"));
        assert_eq!(ConfigurationKind::parse("Application").unwrap().asset_suffix(), Some(".exe"));
        assert_eq!(ConfigurationKind::parse("WinExe").unwrap().asset_suffix(), Some(".exe"));
        assert_eq!(ConfigurationKind::parse("Exe").unwrap().asset_suffix(), Some(".exe"));
        assert_eq!(ConfigurationKind::parse("Utility").unwrap().asset_suffix(), None);
        assert!(ConfigurationKind::parse("Makefile").is_none());
    }
}
