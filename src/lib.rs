//! buildor - build-order reference resolver for XML project trees
//!
//! buildor discovers a codebase's build-descriptor files, determines the
//! artifact each one produces, resolves each project's declared library
//! dependencies back to the producing project, and repairs the
//! inter-project references that build ordering depends on. A shared
//! comment-aware substitution engine performs all text rewriting so
//! comments and partial-token matches are never corrupted.

pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod fs;
pub mod index;
pub mod models;
pub mod resolve;
pub mod rewrite;
pub mod substitute;

// Re-exports for convenience
pub use config::Config;
pub use descriptor::{AssetResolution, ConfigurationKind};
pub use discovery::discover_projects;
pub use error::{BuildorError, BuildorResult};
pub use index::{build_index, AssetIndex, DuplicatePolicy, IndexOutcome, IndexWarning};
pub use models::{DependencyEdge, ProjectFile};
pub use resolve::{relative_path, resolve_dependencies, resolve_edges};
pub use rewrite::{apply_plan, plan_rewrite, RewritePlan};
pub use substitute::{replace_in_file, replace_in_files, rewrite_text, SubstitutionRequest};
