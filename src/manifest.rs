//! # Manifest Loading
//!
//! Manifests come in two shapes, both readable as JSON or TOML:
//!
//! - A **component manifest** is a recursive [`ComponentDescriptor`] tree. The
//!   root is the workspace itself; its descendants are the repositories that
//!   `sync`, `exec` and `git` operate on.
//! - A **project manifest** is a [`Project`] (graph mode) declaring
//!   `build`, `runtime` and `install` dependencies, processed by `boot`.
//!
//! The file extension picks the decoder: `.toml` is read with `toml`,
//! everything else with `serde_json`. Unknown fields are rejected. A decoded
//! component tree is then validated structurally (name charset, source shape,
//! semantic version) before any git work starts.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_COMPONENT_NAME;
use crate::error::{Error, Result};
use crate::source::{self, ResolvedSource};

const NAME_PATTERN: &str = r"^[A-Za-z0-9_-]+$";
const SOURCE_PATTERN: &str = r"^(?:(?:git|https?|file|ssh)://\S+|[^@\s/:]+@[^:\s/]+:\S*)$";

const NAME_HINT: &str = "Names can only contain letters, numbers, underscores, and hyphens";
const SOURCE_HINT: &str =
    "Source URLs must start with git://, https://, file://, ssh://, or use SSH format (git@host:path)";
const VERSION_HINT: &str = "Versions must follow semantic versioning (e.g., v1.0.0 or 1.0.0)";

/// One node of a component manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDescriptor {
    /// Directory name. Derived from `source` when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Source descriptor, e.g. `https://host/org/repo.git?version=v1.0.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Version used when the source does not carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentDescriptor>,
}

impl ComponentDescriptor {
    /// Returns true when a non-empty source is configured.
    pub fn has_source(&self) -> bool {
        self.source.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Resolves the source descriptor, falling back to the explicit `version`
    /// field when the source carries none. Returns `None` without a source.
    pub fn resolved(&self) -> Option<ResolvedSource> {
        if !self.has_source() {
            return None;
        }
        let raw = self.source.as_deref().unwrap_or_default();
        Some(source::resolve(raw).with_fallback_version(self.version.as_deref()))
    }

    /// The version that will be checked out, if any.
    pub fn effective_version(&self) -> Option<String> {
        match self.resolved() {
            Some(resolved) if resolved.has_version() => Some(resolved.version),
            Some(_) => None,
            None => self.version.clone().filter(|v| !v.is_empty()),
        }
    }

    /// The directory name for this component. Never empty.
    pub fn effective_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        match self.source.as_deref() {
            Some(raw) if !raw.is_empty() => source::derive_name(raw),
            _ => DEFAULT_COMPONENT_NAME.to_string(),
        }
    }
}

/// Repository settings shared by graph-mode components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    /// Prefix prepended to each component's `repo`.
    #[serde(default)]
    pub base: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub vcs_type: String,
}

/// The three dependency classes of a graph-mode component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependencies {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build: Vec<ComponentRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime: Vec<ComponentRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install: Vec<ComponentRef>,
}

impl Dependencies {
    pub fn is_empty(&self) -> bool {
        self.build.is_empty() && self.runtime.is_empty() && self.install.is_empty()
    }
}

/// A reference to a graph-mode component, optionally with its own dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentRef {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repoconfig: Option<RepoConfig>,
    #[serde(default, alias = "Deps", skip_serializing_if = "Option::is_none")]
    pub deps: Option<Dependencies>,
}

/// The top-level graph-mode manifest. A project is a component reference
/// whose dependencies are the roots of the graph.
pub type Project = ComponentRef;

/// Reads a component manifest from disk and validates it.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ComponentDescriptor> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    log::debug!("parsing component manifest {}", path.display());
    let root = if is_toml(path) {
        parse_toml(&content)?
    } else {
        parse_json(&content)?
    };
    Ok(root)
}

/// Reads a graph-mode project manifest from disk.
pub fn project_from_file<P: AsRef<Path>>(path: P) -> Result<Project> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    log::debug!("parsing project manifest {}", path.display());
    let project: Project = if is_toml(path) {
        toml::from_str(&content).map_err(|e| decode_error(&e.to_string()))?
    } else {
        serde_json::from_str(&content).map_err(|e| decode_error(&e.to_string()))?
    };
    validate_project(&project)?;
    Ok(project)
}

/// Decodes and validates a JSON component manifest.
pub fn parse_json(content: &str) -> Result<ComponentDescriptor> {
    let root: ComponentDescriptor =
        serde_json::from_str(content).map_err(|e| decode_error(&e.to_string()))?;
    validate(&root)?;
    Ok(root)
}

/// Decodes and validates a TOML component manifest.
pub fn parse_toml(content: &str) -> Result<ComponentDescriptor> {
    let root: ComponentDescriptor =
        toml::from_str(content).map_err(|e| decode_error(&e.to_string()))?;
    validate(&root)?;
    Ok(root)
}

/// Validates a decoded component tree.
///
/// Field paths in errors look like `components[1].components[0].version`.
pub fn validate(root: &ComponentDescriptor) -> Result<()> {
    Patterns::compile()?.check_node(root, "")
}

struct Patterns {
    name: Regex,
    source: Regex,
}

impl Patterns {
    fn compile() -> Result<Self> {
        Ok(Self {
            name: Regex::new(NAME_PATTERN)?,
            source: Regex::new(SOURCE_PATTERN)?,
        })
    }

    fn check_node(&self, node: &ComponentDescriptor, path: &str) -> Result<()> {
        if !node.name.is_empty() && !self.name.is_match(&node.name) {
            return Err(invalid(
                field_path(path, "name"),
                format!("'{}' contains invalid characters", node.name),
                NAME_HINT,
            ));
        }

        if let Some(raw) = node.source.as_deref().filter(|s| !s.is_empty()) {
            if !self.source.is_match(raw) {
                return Err(invalid(
                    field_path(path, "source"),
                    format!("'{}' is not a recognized repository location", raw),
                    SOURCE_HINT,
                ));
            }
        }

        if let Some(version) = node.version.as_deref().filter(|v| !v.is_empty()) {
            check_semver(version, &field_path(path, "version"))?;
        }

        for (index, child) in node.components.iter().enumerate() {
            self.check_node(child, &field_path(path, &format!("components[{}]", index)))?;
        }
        Ok(())
    }

    fn check_ref(&self, component: &ComponentRef, path: &str) -> Result<()> {
        if !self.name.is_match(&component.name) {
            return Err(invalid(
                field_path(path, "name"),
                format!("'{}' is not a valid component name", component.name),
                NAME_HINT,
            ));
        }
        if let Some(deps) = &component.deps {
            let classes = [
                ("build", &deps.build),
                ("runtime", &deps.runtime),
                ("install", &deps.install),
            ];
            for (class, refs) in classes {
                for (index, dep) in refs.iter().enumerate() {
                    let dep_path = field_path(path, &format!("deps.{}[{}]", class, index));
                    self.check_ref(dep, &dep_path)?;
                }
            }
        }
        Ok(())
    }
}

fn validate_project(project: &Project) -> Result<()> {
    Patterns::compile()?.check_ref(project, "")
}

fn check_semver(version: &str, field: &str) -> Result<()> {
    let bare = version.strip_prefix('v').unwrap_or(version);
    semver::Version::parse(bare).map_err(|e| {
        invalid(
            field.to_string(),
            format!("'{}' is not a semantic version ({})", version, e),
            VERSION_HINT,
        )
    })?;
    Ok(())
}

fn field_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", parent, field)
    }
}

fn invalid(field: String, message: String, hint: &str) -> Error {
    Error::ManifestValidation {
        field,
        message,
        hint: Some(hint.to_string()),
    }
}

fn decode_error(message: &str) -> Error {
    let hint = if message.contains("unknown field") {
        Some("Check for typos in field names".to_string())
    } else {
        None
    };
    Error::ConfigParse {
        message: message.to_string(),
        hint,
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}
