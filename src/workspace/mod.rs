//! Workspace walks: extraction, cleanup, and deployment.
//!
//! - `extract` turns every config file under the root into a template
//!   artifact plus entries in the shared value store.
//! - `cleanup` removes originals that already have a template artifact.
//! - `deploy` rebuilds originals from their artifacts and the store.
//!
//! All three assume a single process owns the workspace for the duration
//! of the call. There is no locking; concurrent runs against the same
//! root are unsupported.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Settings;
use crate::errors::{Result, TemplatteError};
use crate::store::{self, namespaced_key, ValueStore};
use crate::tree::{flatten, rebuild, Scalar, Tree};

/// One file that could not be processed during a walk.
#[derive(Debug)]
pub struct Failure {
    pub path: PathBuf,
    pub error: TemplatteError,
}

/// A source file turned into a template artifact.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub source: PathBuf,
    pub template: PathBuf,
    /// Namespace used for this file's keys in the value store.
    pub key: String,
    pub values: usize,
}

#[derive(Debug)]
pub struct ExtractReport {
    pub files: Vec<ExtractedFile>,
    pub failures: Vec<Failure>,
    pub value_store: PathBuf,
    /// Total entries in the value store after the merge.
    pub stored: usize,
}

/// An original file rebuilt from its template artifact.
#[derive(Debug, Clone)]
pub struct RestoredFile {
    pub path: PathBuf,
    pub entries: usize,
    pub tree: Tree,
}

#[derive(Debug)]
pub struct DeployReport {
    pub restored: Vec<RestoredFile>,
    pub failures: Vec<Failure>,
}

/// Fold collected per-file failures into a single error, if any.
pub fn failures_to_error(failures: &[Failure]) -> Option<TemplatteError> {
    if failures.is_empty() {
        return None;
    }
    let details: Vec<String> = failures
        .iter()
        .map(|f| format!("{}: {}", f.path.display(), f.error))
        .collect();
    Some(TemplatteError::WalkFailed(format!(
        "{} file(s) failed: {}",
        failures.len(),
        details.join("; ")
    )))
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Every regular file under `root`, in a stable (file-name sorted) order.
fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| TemplatteError::WalkFailed(e.to_string()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Config files under `root` that should be extracted.
pub fn discover_sources(root: &Path, settings: &Settings) -> Result<Vec<PathBuf>> {
    let sources = walk_files(root)?
        .into_iter()
        .filter(|path| match file_name(path) {
            Some(name) => {
                let keep = settings.is_source(name);
                if !keep && settings.is_excluded(name) {
                    tracing::debug!(path = %path.display(), "skipping excluded file");
                }
                keep
            }
            None => false,
        })
        .collect();
    Ok(sources)
}

/// Files under `root` whose name ends with `suffix` (and is not only the suffix).
pub fn discover_templates(root: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let artifacts = walk_files(root)?
        .into_iter()
        .filter(|path| {
            file_name(path).is_some_and(|name| name.len() > suffix.len() && name.ends_with(suffix))
        })
        .collect();
    Ok(artifacts)
}

/// Namespace for a file's keys: its path relative to `root`, `/`-separated.
pub fn source_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract every config file under `root`.
///
/// Each file's template artifact is written as soon as it is flattened;
/// the value store is merged and written once, at the end, with the
/// values of every file that succeeded. With `keep_going` off the first
/// failure aborts the walk; values of the files templated before it are
/// still merged into the store.
pub fn extract(root: &Path, settings: &Settings) -> Result<ExtractReport> {
    let mut all_values = BTreeMap::new();
    let mut files = Vec::new();
    let mut failures = Vec::new();

    for source in discover_sources(root, settings)? {
        tracing::info!(path = %source.display(), "processing file");
        match extract_file(root, &source, settings) {
            Ok((file, values)) => {
                all_values.extend(values);
                files.push(file);
            }
            Err(error) if settings.keep_going => {
                tracing::warn!(path = %source.display(), %error, "extraction failed");
                failures.push(Failure {
                    path: source,
                    error,
                });
            }
            Err(error) => {
                // Templates already written must stay restorable.
                if !all_values.is_empty() {
                    ValueStore::merge_write(&settings.value_store_path(root), all_values)?;
                }
                return Err(error);
            }
        }
    }

    let value_store = settings.value_store_path(root);
    let store = ValueStore::merge_write(&value_store, all_values)?;

    Ok(ExtractReport {
        files,
        failures,
        value_store,
        stored: store.len(),
    })
}

fn extract_file(
    root: &Path,
    source: &Path,
    settings: &Settings,
) -> Result<(ExtractedFile, BTreeMap<String, Scalar>)> {
    let tree = store::read_tree(source)?;
    let flat = flatten(&tree, settings.placeholder_policy())?;

    let key = source_key(root, source);
    let values: BTreeMap<String, Scalar> = flat
        .values
        .into_iter()
        .map(|(path, value)| (namespaced_key(&key, &path), value))
        .collect();

    let template = store::append_suffix(source, &settings.template_suffix);
    store::write_template(&flat.template, &template)?;

    Ok((
        ExtractedFile {
            source: source.to_path_buf(),
            template,
            key,
            values: values.len(),
        },
        values,
    ))
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// Originals under `root` that have a template artifact and still exist.
pub fn cleanup_candidates(root: &Path, settings: &Settings) -> Result<Vec<PathBuf>> {
    let candidates = discover_templates(root, &settings.template_suffix)?
        .iter()
        .filter_map(|artifact| store::strip_suffix(artifact, &settings.template_suffix))
        .filter(|source| source.is_file())
        .collect();
    Ok(candidates)
}

/// Delete every original that has a template artifact. The artifacts
/// themselves stay; they are consumed by `deploy`.
pub fn cleanup(root: &Path, settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for source in cleanup_candidates(root, settings)? {
        if store::delete(&source)? {
            tracing::info!(path = %source.display(), "removed original");
            removed.push(source);
        }
    }
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Deployment
// ---------------------------------------------------------------------------

/// Rebuild every original under `root` from its template artifact and the
/// shared value store, then remove the artifact.
///
/// A file is only written once its whole tree has been rebuilt, so a
/// missing value leaves both the target and the artifact untouched.
pub fn deploy(root: &Path, settings: &Settings) -> Result<DeployReport> {
    let values = ValueStore::load(&settings.value_store_path(root))?;

    let mut restored = Vec::new();
    let mut failures = Vec::new();

    for artifact in discover_templates(root, &settings.restorable_suffix())? {
        match deploy_file(root, &values, &artifact, settings) {
            Ok(file) => restored.push(file),
            Err(error) if settings.keep_going => {
                tracing::warn!(path = %artifact.display(), %error, "deploy failed");
                failures.push(Failure {
                    path: artifact,
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    Ok(DeployReport { restored, failures })
}

fn deploy_file(
    root: &Path,
    values: &ValueStore,
    artifact: &Path,
    settings: &Settings,
) -> Result<RestoredFile> {
    let source = store::strip_suffix(artifact, &settings.template_suffix)
        .ok_or_else(|| TemplatteError::NotFound(artifact.to_path_buf()))?;
    let key = source_key(root, &source);

    let template = store::read_template(artifact)?;
    let tree = rebuild(&template, |path| values.get_namespaced(&key, path).cloned()).map_err(
        |e| match e {
            TemplatteError::MissingValue(path) => {
                TemplatteError::MissingValue(namespaced_key(&key, &path))
            }
            other => other,
        },
    )?;

    store::write_tree(&tree, &source)?;
    store::delete(artifact)?;
    tracing::info!(path = %source.display(), entries = template.len(), "restored");

    Ok(RestoredFile {
        path: source,
        entries: template.len(),
        tree,
    })
}
