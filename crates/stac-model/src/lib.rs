//! Serde document model for STAC items.
//!
//! A deliberately small slice of the STAC spec: exactly what the
//! publishing services need to describe one raster asset's
//! spatiotemporal extent, properties and downloadable bands. Schema
//! validation is out of scope.

pub mod item;

pub use item::{media_type, StacAsset, StacItem, StacLink, STAC_VERSION};
