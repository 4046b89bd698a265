//! Metadata publication gate.
//!
//! Decides, per candidate unit, whether metadata must be regenerated,
//! skipped, or refreshed in metadata-only mode. The decision is a pure
//! function of three facts so it can be tested without any storage I/O;
//! callers gather the facts from their backends and act on the result.

use std::fmt;

/// Outcome of the publication gate for one (edition, tile) or
/// (mapset, raster) unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishDecision {
    /// Fetch the source data, admit it spatially, upload it, then write
    /// the descriptor.
    NeedsFullProcessing,
    /// Data is already in storage; regenerate only the descriptor.
    NeedsMetadataOnly,
    /// Descriptor already exists and no refresh was requested.
    Skip,
}

impl fmt::Display for PublishDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishDecision::NeedsFullProcessing => write!(f, "needs-full-processing"),
            PublishDecision::NeedsMetadataOnly => write!(f, "needs-metadata-only"),
            PublishDecision::Skip => write!(f, "skip"),
        }
    }
}

/// Gate decision from observed state.
///
/// `descriptor_exists`: a descriptor is already present at the target
/// location. `data_exists`: the underlying data artifact is already in
/// storage. `force`: the caller requested a metadata refresh.
pub fn decide(descriptor_exists: bool, data_exists: bool, force: bool) -> PublishDecision {
    if descriptor_exists && !force {
        PublishDecision::Skip
    } else if force && data_exists {
        PublishDecision::NeedsMetadataOnly
    } else {
        PublishDecision::NeedsFullProcessing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_descriptor_skips() {
        assert_eq!(decide(true, true, false), PublishDecision::Skip);
        assert_eq!(decide(true, false, false), PublishDecision::Skip);
    }

    #[test]
    fn test_forced_with_data_refreshes_metadata_only() {
        assert_eq!(decide(true, true, true), PublishDecision::NeedsMetadataOnly);
        assert_eq!(decide(false, true, true), PublishDecision::NeedsMetadataOnly);
    }

    #[test]
    fn test_missing_descriptor_needs_full_processing() {
        assert_eq!(decide(false, false, false), PublishDecision::NeedsFullProcessing);
        assert_eq!(decide(false, true, false), PublishDecision::NeedsFullProcessing);
        // Forced refresh with no data in storage still reprocesses fully.
        assert_eq!(decide(true, false, true), PublishDecision::NeedsFullProcessing);
        assert_eq!(decide(false, false, true), PublishDecision::NeedsFullProcessing);
    }
}
