//! Project file discovery
//!
//! Walks the project with `ignore`, so `.gitignore` rules apply, and sorts the
//! files it finds into Kotlin sources, resource XML and Gradle build files.

use crate::config::Config;
use crate::error::{LintError, Result};
use crate::parser::gradle;
use crate::tree::DependencySet;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Files found under the analysed roots, each list sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFiles {
    pub kotlin: Vec<PathBuf>,
    pub resources: Vec<PathBuf>,
    pub build_scripts: Vec<PathBuf>,
    pub version_catalogs: Vec<PathBuf>,
}

impl ProjectFiles {
    pub fn len(&self) -> usize {
        self.kotlin.len() + self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Artifacts declared by the build files plus `extra`
    pub fn dependencies(&self, extra: &[String]) -> DependencySet {
        let mut set = DependencySet::new();
        for coordinate in extra {
            set.insert(coordinate);
        }
        for script in &self.build_scripts {
            match std::fs::read_to_string(script) {
                Ok(text) => gradle::scan_build_script(&text)
                    .iter()
                    .for_each(|c| set.insert(c)),
                Err(e) => warn!("Skipping {}: {}", script.display(), e),
            }
        }
        for catalog in &self.version_catalogs {
            let scanned = std::fs::read_to_string(catalog)
                .map_err(|e| LintError::io(catalog, e))
                .and_then(|text| gradle::scan_version_catalog(&text));
            match scanned {
                Ok(coordinates) => coordinates.iter().for_each(|c| set.insert(c)),
                Err(e) => warn!("Skipping {}: {}", catalog.display(), e),
            }
        }
        debug!("Resolved {} dependencies", set.len());
        set
    }
}

/// Finds the files to analyse
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Roots to walk: configured targets under `root`, or `root` itself
    fn roots(&self, root: &Path) -> Vec<PathBuf> {
        if self.config.targets.is_empty() {
            vec![root.to_path_buf()]
        } else {
            self.config.targets.iter().map(|t| root.join(t)).collect()
        }
    }

    pub fn find_files(&self, root: &Path) -> Result<ProjectFiles> {
        let mut files = ProjectFiles::default();

        let mut overrides = OverrideBuilder::new(root);
        for pattern in &self.config.exclude {
            overrides.add(&format!("!{pattern}"))?;
        }
        let overrides = overrides.build()?;

        for walk_root in self.roots(root) {
            if !walk_root.exists() {
                warn!("Target {} does not exist", walk_root.display());
                continue;
            }
            let walker = WalkBuilder::new(&walk_root)
                .require_git(false)
                .overrides(overrides.clone())
                .filter_entry(|entry| entry.file_name() != OsStr::new("build"))
                .build();

            for entry in walker {
                let entry = entry?;
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                classify(entry.into_path(), &mut files);
            }
        }

        for list in [
            &mut files.kotlin,
            &mut files.resources,
            &mut files.build_scripts,
            &mut files.version_catalogs,
        ] {
            list.sort();
            list.dedup();
        }

        debug!(
            "Found {} Kotlin files, {} resource files, {} build scripts",
            files.kotlin.len(),
            files.resources.len(),
            files.build_scripts.len()
        );
        Ok(files)
    }
}

fn classify(path: PathBuf, files: &mut ProjectFiles) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if name == "build.gradle" || name == "build.gradle.kts" {
        files.build_scripts.push(path);
    } else if name.ends_with(".versions.toml") {
        files.version_catalogs.push(path);
    } else if name.ends_with(".kt") || name.ends_with(".kts") {
        files.kotlin.push(path);
    } else if name.ends_with(".xml") && is_resource_file(&path) {
        files.resources.push(path);
    }
}

/// `.../res/<folder>/<file>.xml`
fn is_resource_file(path: &Path) -> bool {
    path.parent()
        .and_then(|folder| folder.parent())
        .and_then(|res| res.file_name())
        .is_some_and(|n| n == "res")
}
