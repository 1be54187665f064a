//! Document path filtering
//!
//! Decides which configured rules apply to a document. Entries without a path
//! separator are filenames and match at any depth (`foo.txt` is treated as
//! `**/foo.txt`); entries with a separator are globs relative to the
//! workspace root.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

use crate::config::{Configuration, Rule};
use crate::error::TintError;

/// Compiled path globs of one configuration
#[derive(Debug, Clone)]
pub struct PathFilter {
    globs: GlobSet,
}

impl PathFilter {
    /// Compile the `paths` entries of a configuration, skipping invalid globs
    pub fn new(entries: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for entry in entries {
            let glob = glob_for_entry(entry);
            let built = GlobBuilder::new(&glob).literal_separator(true).build();
            match built {
                Ok(compiled) => {
                    builder.add(compiled);
                }
                Err(source) => {
                    let err = TintError::Glob { glob, source };
                    warn!(error = %err, "skipping path entry");
                }
            }
        }

        let globs = builder.build().unwrap_or_else(|err| {
            warn!(error = %err, "could not build path globs");
            GlobSet::empty()
        });
        Self { globs }
    }

    /// Check a workspace-relative path
    pub fn matches(&self, relative_path: &str) -> bool {
        self.globs.is_match(relative_path)
    }
}

/// Turn a configured path entry into the glob actually matched
pub fn glob_for_entry(entry: &str) -> String {
    if entry.contains('/') || entry.contains('\\') {
        entry.replace('\\', "/")
    } else {
        format!("**/{}", entry)
    }
}

/// Express `path` relative to `root` with `/` separators
///
/// Paths outside the root are returned whole.
pub fn relative_path(path: &Path, root: Option<&Path>) -> String {
    let relative = root
        .and_then(|root| path.strip_prefix(root).ok())
        .unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

/// Every rule whose configuration applies to `relative_path`
///
/// Rules come out in configuration order, then rule order.
pub fn applicable_rules<'a>(configurations: &'a [Configuration], relative_path: &str) -> Vec<&'a Rule> {
    configurations
        .iter()
        .filter(|configuration| PathFilter::new(&configuration.paths).matches(relative_path))
        .flat_map(|configuration| configuration.rules.iter())
        .collect()
}
