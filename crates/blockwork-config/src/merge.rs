//! Deep merge of config layers.

use std::collections::BTreeSet;

/// Dotted paths of leaf fields set by a config file.
pub type FieldSources = BTreeSet<String>;

/// Recursively deep-merge `overlay` into `base`.
///
/// - Tables merge recursively per-field.
/// - Scalars and arrays from the overlay **replace** the base value.
///
/// Every leaf written from the overlay is recorded in `sources`.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value, prefix: &str, sources: &mut FieldSources) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                match base_table.get_mut(key) {
                    Some(base_val) => deep_merge(base_val, overlay_val, &path, sources),
                    None => {
                        base_table.insert(key.clone(), overlay_val.clone());
                        record_leaves(overlay_val, &path, sources);
                    },
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            sources.insert(prefix.to_owned());
        },
    }
}

fn record_leaves(val: &toml::Value, prefix: &str, sources: &mut FieldSources) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &format!("{prefix}.{key}"), sources);
        }
    } else {
        sources.insert(prefix.to_owned());
    }
}
