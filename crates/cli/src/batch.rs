use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use engine::merger::build_script;
use engine::screenplay::render_screenplay;
use engine::script::{
    MergedTextFile, SceneContextsFile, Script, TemplateFile, DEFAULT_CHUNK_SIZE,
};

/// Root directory holding one subdirectory per template.
pub const DEFAULT_TEMPLATES_ROOT: &str = "assets/templates";

pub const SCENE_CONTEXTS_FILE: &str = "scene_contexts.json";
pub const TEMPLATE_FILE: &str = "extracted_template.json";
pub const MERGED_TEXT_FILE: &str = "merged_text_content.json";
pub const SCRIPT_FILE: &str = "script.json";
pub const SCREENPLAY_FILE: &str = "screenplay.txt";

/// End-of-run success/failure tally for one batch stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Immediate subdirectories of the templates root, in sorted name order.
pub fn template_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("template directory not found: {}", root.display());
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .with_context(|| format!("failed to list {}", root.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Every `script.json` under the root, recursively, in sorted path order.
pub fn find_script_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("template directory not found: {}", root.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == SCRIPT_FILE)
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    Ok(files)
}

/// Stage 1: merge every template folder under `root` into a `script.json`.
///
/// A template with a missing or unparseable input file is skipped and counted
/// as a failure; the rest of the batch continues. Nothing is written for a
/// skipped template.
pub fn run_merge(root: &Path) -> Result<BatchSummary> {
    let dirs = template_dirs(root)?;
    info!("found {} template folders under {}", dirs.len(), root.display());

    let mut summary = BatchSummary::default();
    for dir in dirs {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match merge_template(&dir, &name) {
            Ok(()) => summary.succeeded += 1,
            Err(err) => {
                warn!("skipping template {name}: {err:#}");
                summary.failed += 1;
            }
        }
    }

    info!(
        "merge complete: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    Ok(summary)
}

fn merge_template(dir: &Path, name: &str) -> Result<()> {
    info!("merging template {name}");

    let contexts: SceneContextsFile = load_json(&dir.join(SCENE_CONTEXTS_FILE))?;
    let template: TemplateFile = load_json(&dir.join(TEMPLATE_FILE))?;
    let merged: MergedTextFile = load_json(&dir.join(MERGED_TEXT_FILE))?;

    let mut script = build_script(&contexts, &template, &merged, DEFAULT_CHUNK_SIZE);
    if script.template_name.is_empty() {
        script.template_name = name.to_string();
    }

    info!(
        "  {} dialogue segments merged into {} scenes",
        script.metadata.original_segments,
        script.scenes.len()
    );

    let out = dir.join(SCRIPT_FILE);
    let json = serde_json::to_string_pretty(&script).context("failed to serialize script")?;
    fs::write(&out, json).with_context(|| format!("failed to write {}", out.display()))?;
    info!("  wrote {}", out.display());
    Ok(())
}

/// Stage 2: render every `script.json` under `root` into a `screenplay.txt`
/// next to it.
///
/// A file that fails to load or render is logged and counted; the batch
/// continues.
pub fn run_screenplay(root: &Path) -> Result<BatchSummary> {
    let files = find_script_files(root)?;
    info!("found {} script files under {}", files.len(), root.display());

    let mut summary = BatchSummary::default();
    for path in files {
        match render_one(&path) {
            Ok(out) => {
                info!("wrote {}", out.display());
                summary.succeeded += 1;
            }
            Err(err) => {
                error!("failed to convert {}: {err:#}", path.display());
                summary.failed += 1;
            }
        }
    }

    info!(
        "screenplay generation complete: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    Ok(summary)
}

fn render_one(path: &Path) -> Result<PathBuf> {
    let script: Script = load_json(path)?;
    info!(
        "rendering {} ({} scenes)",
        script.template_name,
        script.scenes.len()
    );

    let text = render_screenplay(&script);
    let out = path.with_file_name(SCREENPLAY_FILE);
    fs::write(&out, text).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(out)
}
