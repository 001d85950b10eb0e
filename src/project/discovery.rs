//! Project discovery: find eligible files, pair views with code-behinds,
//! and link view inheritance.
//!
//! Discovery is the only phase allowed to overlap I/O: file contents are
//! read in parallel, then everything is registered sequentially in sorted
//! path order so registry ids are deterministic.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use glob::{Pattern, glob};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::Config;
use crate::feedback::FeedbackChannel;
use crate::markup;
use crate::project::file::{CODE_EXTENSION, FileId, MARKUP_EXTENSION, SourceFile};
use crate::project::registry::FileRegistry;
use crate::settings::ProcessorSettings;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Walk the tree under `root`, register every eligible file, pair associated
/// files, and link parent views. Returns the number of files registered.
pub fn discover(
    config: &Config,
    settings: &ProcessorSettings,
    registry: &mut FileRegistry,
    feedback: &mut FeedbackChannel,
    root: &Path,
) -> Result<usize> {
    let paths = collect_paths(config, feedback, root);

    // Overlapped read of all contents; everything after this is sequential.
    let loaded: Vec<(PathBuf, std::io::Result<String>)> = paths
        .par_iter()
        .map(|p| (p.clone(), fs::read_to_string(p)))
        .collect();

    let mut ids = Vec::new();
    for (path, contents) in loaded {
        let contents = match contents {
            Ok(c) => c,
            Err(err) => {
                feedback.warning(
                    Some(&path.to_string_lossy()),
                    format!("skipping unreadable file: {}", err),
                );
                continue;
            }
        };

        let pkg_path = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        let mut file = SourceFile::new(path, pkg_path);
        file.preload_contents(contents);

        if file.extension() == MARKUP_EXTENSION
            && let Ok(text) = file.contents()
            && let Some((name, extends)) = markup::component_declaration(settings, text)
        {
            file.component_name = Some(name);
            file.parent_component_name = extends;
        }

        ids.push(registry.add_file(file));
    }

    pair_associated_files(registry, &ids);
    link_parent_views(registry, feedback, &ids);

    Ok(ids.len())
}

/// Collect candidate file paths honoring include/ignore patterns, sorted for
/// deterministic registration order.
fn collect_paths(config: &Config, feedback: &mut FeedbackChannel, root: &Path) -> Vec<PathBuf> {
    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();

    for p in &config.ignores {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(err) => {
                    feedback.warning(None, format!("invalid ignore pattern '{}': {}", p, err));
                }
            }
        } else {
            literal_ignore_paths.push(root.join(p));
        }
    }

    let dirs_to_scan: Vec<PathBuf> = if config.includes.is_empty() {
        vec![root.to_path_buf()]
    } else {
        let mut dirs = Vec::new();
        for inc in &config.includes {
            if is_glob_pattern(inc) {
                let full_pattern = root.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => {
                        for entry in entries.flatten() {
                            if entry.is_dir() {
                                dirs.push(entry);
                            }
                        }
                    }
                    Err(err) => {
                        feedback
                            .warning(None, format!("invalid include pattern '{}': {}", inc, err));
                    }
                }
            } else {
                let path = root.join(inc);
                if path.exists() {
                    dirs.push(path);
                } else {
                    feedback.warning(None, format!("include path does not exist: {}", inc));
                }
            }
        }
        dirs
    };

    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for dir in dirs_to_scan {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    feedback.warning(None, format!("cannot access path: {}", err));
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || !is_eligible_file(path) {
                continue;
            }
            if literal_ignore_paths.iter().any(|ip| path.starts_with(ip)) {
                continue;
            }
            let path_str = path.to_string_lossy();
            if glob_patterns.iter().any(|p| p.matches(&path_str)) {
                continue;
            }
            if seen.insert(path.to_path_buf()) {
                paths.push(path.to_path_buf());
            }
        }
    }

    paths.sort();
    paths
}

fn is_eligible_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            e.eq_ignore_ascii_case(CODE_EXTENSION) || e.eq_ignore_ascii_case(MARKUP_EXTENSION)
        })
}

/// Pair every view with the code unit sharing its directory and stem.
fn pair_associated_files(registry: &mut FileRegistry, ids: &[FileId]) {
    let mut by_stem: HashMap<(PathBuf, String), (Option<FileId>, Option<FileId>)> = HashMap::new();

    for &id in ids {
        let file = registry.get(id);
        let dir = file
            .full_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let key = (dir, file.stem().to_lowercase());
        let slot = by_stem.entry(key).or_default();
        match file.extension() {
            MARKUP_EXTENSION => slot.0 = Some(id),
            CODE_EXTENSION => slot.1 = Some(id),
            _ => {}
        }
    }

    for (markup_id, code_id) in by_stem.into_values() {
        if let (Some(m), Some(c)) = (markup_id, code_id) {
            registry.associate(m, c);
        }
    }
}

/// Resolve each view's `extends` attribute against the declared component
/// names and link `parent_file`. Inheritance must stay a forest: any
/// extends-chain cycle is reported and the closing link is dropped.
fn link_parent_views(registry: &mut FileRegistry, feedback: &mut FeedbackChannel, ids: &[FileId]) {
    let mut by_component_name: HashMap<String, FileId> = HashMap::new();
    for &id in ids {
        if let Some(name) = &registry.get(id).component_name {
            by_component_name.insert(name.to_lowercase(), id);
        }
    }

    for &id in ids {
        let parent = registry
            .get(id)
            .parent_component_name
            .as_ref()
            .and_then(|name| by_component_name.get(&name.to_lowercase()))
            .copied();
        if let Some(parent) = parent
            && parent != id
        {
            registry.get_mut(id).parent_file = Some(parent);
        }
    }

    for &id in ids {
        let mut visited = HashSet::from([id]);
        let mut current = id;
        while let Some(parent) = registry.get(current).parent_file {
            if !visited.insert(parent) {
                feedback.error(
                    Some(&registry.get(current).path_string()),
                    format!(
                        "view inheritance cycle detected involving component \"{}\"",
                        registry
                            .get(parent)
                            .component_name
                            .as_deref()
                            .unwrap_or("?")
                    ),
                );
                registry.get_mut(current).parent_file = None;
                break;
            }
            current = parent;
        }
    }
}
