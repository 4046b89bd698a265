//! Deterministic artifact identifiers.
//!
//! Dataset UUIDs are derived from a stable tuple of inputs so that
//! identical inputs always produce identical identifiers, across
//! processes and runs. This is what makes batch re-runs idempotent:
//! a regenerated descriptor for the same raster carries the same id.

use uuid::Uuid;

/// Namespace under which all dataset identifiers are derived
/// (6f34c6f4-13d6-43c0-8e4e-42b6c13203af).
const DATASET_NAMESPACE: Uuid = Uuid::from_u128(0x6f34c6f4_13d6_43c0_8e4e_42b6c13203af);

/// Derive a deterministic UUID for one dataset artifact.
///
/// The canonical input string is built in a fixed order: the product
/// short name, its version token, the sorted `key=value` qualifiers
/// (e.g. `year`, `tile`), then the sorted disambiguator sources. All
/// parts are lowercased and joined by newlines before hashing (UUIDv5).
///
/// No wall-clock time, process state or randomness is involved; an
/// empty `sources` slice is valid.
pub fn dataset_uuid(
    short_name: &str,
    version: &str,
    sources: &[&str],
    qualifiers: &[(&str, &str)],
) -> Uuid {
    let mut tags: Vec<String> = qualifiers
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    tags.sort();

    let mut sources: Vec<&str> = sources.to_vec();
    sources.sort_unstable();

    let mut parts: Vec<String> = Vec::with_capacity(2 + tags.len() + sources.len());
    parts.push(short_name.to_string());
    parts.push(version.to_string());
    parts.extend(tags);
    parts.extend(sources.iter().map(|s| s.to_string()));

    let canonical = parts
        .iter()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join("\n");

    Uuid::new_v5(&DATASET_NAMESPACE, canonical.as_bytes())
}
