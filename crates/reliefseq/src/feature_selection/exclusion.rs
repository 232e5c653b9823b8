//! Drop user-listed attributes before any scoring pass.
use std::collections::HashSet;

use anyhow::Result;

use crate::error::SelectionError;
use crate::universe::AttributeUniverse;

/// Remove every attribute named in `names` from `universe`.
///
/// Names the data set does not carry are logged and skipped; duplicates count
/// once. Returns how many attributes were removed.
///
/// # Errors
///
/// `SelectionError::Configuration` when the list would leave no attribute, and
/// `SelectionError::Mutation` when the data set refuses a removal.
pub fn exclude_attributes<D: AttributeUniverse + ?Sized>(
    universe: &mut D,
    names: &[String],
) -> Result<usize> {
    let present: HashSet<String> = universe.attribute_names().into_iter().collect();
    let mut seen = HashSet::new();
    let mut to_remove = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        if present.contains(name) {
            to_remove.push(name.as_str());
        } else {
            log::warn!("Excluded attribute {} is not in the data set; skipping", name);
        }
    }

    if !to_remove.is_empty() && to_remove.len() == present.len() {
        return Err(SelectionError::configuration(format!(
            "The exclusion list removes all {} attributes of the data set",
            present.len()
        ))
        .into());
    }

    for name in &to_remove {
        universe.remove_attribute(name).map_err(|e| {
            SelectionError::mutation(format!("Could not exclude attribute {}: {:#}", name, e))
        })?;
    }
    log::info!(
        "Excluded {} attributes; {} remain",
        to_remove.len(),
        universe.attribute_count()
    );
    Ok(to_remove.len())
}
