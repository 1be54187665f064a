//! Style reference resolution

use std::collections::HashMap;

use tracing::debug;

use super::style::StyleRecord;
use crate::config::StyleRef;

/// Resolve a rule's style references against the shared style table
///
/// Inline records pass through; names are looked up and silently dropped when
/// absent. Every returned record has an explicit, non-empty group list.
pub fn resolve(refs: &[StyleRef], shared: &HashMap<String, StyleRecord>) -> Vec<StyleRecord> {
    refs.iter()
        .filter_map(|style_ref| match style_ref {
            StyleRef::Inline(record) => Some(record.clone()),
            StyleRef::Named(name) => {
                let record = shared.get(name).cloned();
                if record.is_none() {
                    debug!(style = %name, "no shared style with this name");
                }
                record
            }
        })
        .map(|mut record| {
            record.groups = record.bound_groups();
            record
        })
        .collect()
}
