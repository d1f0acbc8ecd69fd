//! buildor CLI - build-order reference resolver
//!
//! Usage: buildor <COMMAND>
//!
//! Commands:
//!   replace   Replace a phrase across files, honoring comments
//!   projects  Discover descriptors and the artifacts they build
//!   deps      Show the producing projects a descriptor depends on
//!   fix       Repair inter-project references

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use buildor::config::Config;
use buildor::index::{DuplicatePolicy, IndexOutcome, IndexWarning};
use buildor::substitute::SubstitutionRequest;

/// buildor - build-order reference resolver
#[derive(Parser, Debug)]
#[command(name = "buildor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Machine-readable JSON event output
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replace a phrase in a set of files, skipping comments and
    /// partial-token matches
    #[command(after_help = "With phrase Goop, these occurrences are replaced:\n  \
        Goop[32]\n  molo-Goop\n  *Goop\nand these are left alone:\n  \
        // doop de Goop\n  rGoop\n  Goop23")]
    Replace {
        /// Phrase to search for
        phrase: String,

        /// Replacement text
        replacement: String,

        /// Files to rewrite in place
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Discover descriptors and the artifacts they build
    Projects {
        /// Top of the source tree to scan
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Duplicate-asset policy (last-wins, first-wins, error)
        #[arg(long)]
        duplicates: Option<String>,
    },

    /// Show the producing projects a descriptor depends on
    Deps {
        /// Descriptor to resolve
        project: PathBuf,

        /// Top of the source tree to scan
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Repair inter-project references (preview unless --apply)
    Fix {
        /// Limit the repair to these descriptors
        projects: Vec<PathBuf>,

        /// Top of the source tree to scan
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Write the repaired descriptors instead of previewing
        #[arg(long)]
        apply: bool,

        /// Duplicate-asset policy (last-wins, first-wins, error)
        #[arg(long)]
        duplicates: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replace { phrase, replacement, files } => {
            cmd_replace(phrase, replacement, files, cli.json, cli.verbose)
        }
        Commands::Projects { root, duplicates } => {
            cmd_projects(root, duplicates, cli.json, cli.verbose)
        }
        Commands::Deps { project, root } => cmd_deps(&project, root, cli.json),
        Commands::Fix { projects, root, apply, duplicates } => {
            cmd_fix(projects, root, apply, duplicates, cli.json, cli.verbose)
        }
    }
}

fn cmd_replace(
    phrase: String,
    replacement: String,
    files: Vec<PathBuf>,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let request = SubstitutionRequest { phrase, replacement };

    if !json {
        println!(
            "Replacing '{}' with '{}' in {} file(s)",
            request.phrase,
            request.replacement,
            files.len()
        );
    }

    let outcomes = buildor::replace_in_files(&files, &request);

    let mut replacements = 0usize;
    let mut failures = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(rewritten) => {
                replacements += rewritten.replacements;
                if rewritten.unclosed_comment {
                    eprintln!(
                        "⚠ {}: unclosed block comment at end of file",
                        outcome.file.display()
                    );
                }
                if verbose > 0 && !json {
                    println!(
                        "  {}: {} replacement(s)",
                        outcome.file.display(),
                        rewritten.replacements
                    );
                }
            }
            Err(err) => {
                failures += 1;
                eprintln!("✗ skipping {}: {err}", outcome.file.display());
            }
        }
    }

    if json {
        let output = serde_json::json!({
            "event": "replace",
            "files": outcomes.len(),
            "replacements": replacements,
            "failures": failures,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "✓ {replacements} replacement(s) across {} file(s) ({failures} skipped)",
            outcomes.len()
        );
    }

    Ok(())
}

fn cmd_projects(
    root: Option<PathBuf>,
    duplicates: Option<String>,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let config = load_config();
    let root = resolve_root(root, &config)?;
    let policy = resolve_policy(duplicates, &config);

    if !json {
        println!("🔍 Scanning: {}", root.display());
    }

    let outcome = scan_and_index(&root, policy, json)?;

    if json {
        for project in &outcome.projects {
            let output = serde_json::json!({
                "event": "project",
                "path": project.path.display().to_string(),
                "asset": project.asset,
            });
            println!("{}", serde_json::to_string(&output)?);
        }
    } else {
        println!(
            "\nFound {} project(s) producing {} asset(s):\n",
            outcome.projects.len(),
            outcome.index.len()
        );
        for project in &outcome.projects {
            println!("  {} -> {}", project.path.display(), project.asset);
            if verbose > 0 {
                if let Ok(Some(guid)) = project.guid() {
                    println!("    guid: {guid}");
                }
                if let Ok(deps) = project.dependencies() {
                    if !deps.is_empty() {
                        println!("    deps: {}", deps.join(" "));
                    }
                }
                if verbose > 1 {
                    if let Ok(refs) = buildor::descriptor::project_references(&project.path) {
                        if !refs.is_empty() {
                            println!("    refs: {}", refs.join(" "));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn cmd_deps(project: &Path, root: Option<PathBuf>, json: bool) -> Result<()> {
    let config = load_config();
    let root = resolve_root(root, &config)?;
    let outcome = scan_and_index(&root, config.index.duplicates, json)?;

    let edges = buildor::resolve_edges(project, &outcome.index)?;
    let producers = dedupe(edges.into_iter().map(|edge| edge.producer).collect());

    if json {
        for producer in &producers {
            let output = serde_json::json!({
                "event": "dependency",
                "consumer": project.display().to_string(),
                "producer": producer.display().to_string(),
            });
            println!("{}", serde_json::to_string(&output)?);
        }
    } else if producers.is_empty() {
        println!(
            "{}: no dependencies resolve to indexed projects",
            project.display()
        );
    } else {
        println!("{} depends on:", project.display());
        for producer in &producers {
            println!("  {}", producer.display());
        }
    }

    Ok(())
}

fn cmd_fix(
    projects: Vec<PathBuf>,
    root: Option<PathBuf>,
    apply: bool,
    duplicates: Option<String>,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let config = load_config();
    let root = resolve_root(root, &config)?;
    let policy = resolve_policy(duplicates, &config);

    if !json {
        println!("🔧 buildor fix");
        println!("Root: {}", root.display());
        if !apply {
            println!("Mode: preview (pass --apply to write)");
        }
    }

    let outcome = scan_and_index(&root, policy, json)?;

    let targets: Vec<PathBuf> = if projects.is_empty() {
        outcome.projects.iter().map(|p| p.path.clone()).collect()
    } else {
        projects
    };

    let mut changed = 0usize;
    let mut skipped = 0usize;
    for target in &targets {
        match repair_project(target, &outcome, apply, json, verbose) {
            Ok(true) => changed += 1,
            Ok(false) => {}
            Err(err) => {
                skipped += 1;
                eprintln!("✗ skipping {}: {err}", target.display());
            }
        }
    }

    if json {
        let output = serde_json::json!({
            "event": "fix",
            "projects": targets.len(),
            "changed": changed,
            "skipped": skipped,
            "applied": apply,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else if apply {
        println!(
            "\n✓ repaired {changed} of {} project(s) ({skipped} skipped)",
            targets.len()
        );
    } else {
        println!("\n{changed} project(s) would change; re-run with --apply to write them");
    }

    Ok(())
}

fn repair_project(
    target: &Path,
    outcome: &IndexOutcome,
    apply: bool,
    json: bool,
    verbose: u8,
) -> buildor::BuildorResult<bool> {
    let mut resolved = dedupe(buildor::resolve_dependencies(target, &outcome.index)?);
    // A project never references itself.
    resolved.retain(|producer| producer != target);

    let plan = buildor::plan_rewrite(target, &resolved)?;
    if plan.is_noop() {
        if verbose > 0 && !json {
            println!("  {} is already in order", target.display());
        }
        return Ok(false);
    }

    if apply {
        buildor::apply_plan(&plan)?;
    }

    if json {
        let output = serde_json::json!({
            "event": "rewrite",
            "project": target.display().to_string(),
            "removed": plan.removed.len(),
            "inserted": plan.inserted.len(),
            "applied": apply,
        });
        println!("{output}");
    } else if apply {
        println!(
            "✓ {}: -{} stale, +{} new reference(s)",
            target.display(),
            plan.removed.len(),
            plan.inserted.len()
        );
    } else {
        println!("{}", render_diff(target, &plan.original, &plan.updated));
    }

    Ok(true)
}

/// Generate a unified diff between the current and planned content
fn render_diff(path: &Path, old: &str, new: &str) -> String {
    use similar::TextDiff;
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(
            &format!("a/{}", path.display()),
            &format!("b/{}", path.display()),
        )
        .to_string()
}

fn load_config() -> Config {
    let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    Config::load_or_default(&working_dir)
}

fn resolve_root(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    flag.or_else(|| config.scan.root.clone()).ok_or_else(|| {
        anyhow::anyhow!(
            "no scan root configured - pass --root, set BUILDOR_ROOT, or add [scan] root to buildor.toml"
        )
    })
}

fn resolve_policy(flag: Option<String>, config: &Config) -> DuplicatePolicy {
    match flag.as_deref() {
        Some("first-wins") | Some("first") => DuplicatePolicy::FirstWins,
        Some("error") => DuplicatePolicy::Error,
        Some(_) => DuplicatePolicy::LastWins,
        None => config.index.duplicates,
    }
}

fn scan_and_index(root: &Path, policy: DuplicatePolicy, json: bool) -> Result<IndexOutcome> {
    let candidates = buildor::discover_projects(root)?;
    let outcome = buildor::build_index(&candidates, policy)?;
    report_warnings(&outcome.warnings, json);
    Ok(outcome)
}

fn report_warnings(warnings: &[IndexWarning], json: bool) {
    for warning in warnings {
        if json {
            let output = serde_json::json!({
                "event": "warning",
                "message": warning.to_string(),
            });
            println!("{output}");
        } else {
            eprintln!("⚠ {warning}");
        }
    }
}

fn dedupe(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths.into_iter().filter(|path| seen.insert(path.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_replace() {
        let cli = Cli::try_parse_from(["buildor", "replace", "Goop", "Mint", "a.cpp"]).unwrap();
        if let Commands::Replace { phrase, replacement, files } = cli.command {
            assert_eq!(phrase, "Goop");
            assert_eq!(replacement, "Mint");
            assert_eq!(files, vec![PathBuf::from("a.cpp")]);
        } else {
            panic!("Expected Replace command");
        }
    }

    #[test]
    fn test_cli_replace_requires_a_file() {
        let result = Cli::try_parse_from(["buildor", "replace", "Goop", "Mint"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_projects_with_root() {
        let cli = Cli::try_parse_from(["buildor", "projects", "--root", "/src"]).unwrap();
        if let Commands::Projects { root, .. } = cli.command {
            assert_eq!(root, Some(PathBuf::from("/src")));
        } else {
            panic!("Expected Projects command");
        }
    }

    #[test]
    fn test_cli_parse_fix_defaults_to_preview() {
        let cli = Cli::try_parse_from(["buildor", "fix", "--root", "/src"]).unwrap();
        if let Commands::Fix { apply, projects, .. } = cli.command {
            assert!(!apply);
            assert!(projects.is_empty());
        } else {
            panic!("Expected Fix command");
        }
    }

    #[test]
    fn test_cli_parse_fix_apply() {
        let cli =
            Cli::try_parse_from(["buildor", "fix", "--apply", "--root", "/src", "app.vcxproj"])
                .unwrap();
        if let Commands::Fix { apply, projects, .. } = cli.command {
            assert!(apply);
            assert_eq!(projects, vec![PathBuf::from("app.vcxproj")]);
        } else {
            panic!("Expected Fix command");
        }
    }

    #[test]
    fn test_cli_json_flag() {
        let cli = Cli::try_parse_from(["buildor", "--json", "projects"]).unwrap();
        assert!(cli.json);
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["buildor", "-vv", "projects"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_resolve_policy_flag_beats_config() {
        let mut config = Config::default();
        config.index.duplicates = DuplicatePolicy::Error;
        assert_eq!(
            resolve_policy(Some("first-wins".to_string()), &config),
            DuplicatePolicy::FirstWins
        );
        assert_eq!(resolve_policy(None, &config), DuplicatePolicy::Error);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let paths = vec![
            PathBuf::from("a"),
            PathBuf::from("b"),
            PathBuf::from("a"),
        ];
        assert_eq!(dedupe(paths), vec![PathBuf::from("a"), PathBuf::from("b")]);
    }
}
