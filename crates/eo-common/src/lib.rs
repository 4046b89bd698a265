//! Common types and utilities shared across the EO STAC services.

pub mod dekad;
pub mod error;
pub mod extent;
pub mod identity;
pub mod publish;
pub mod tile;
pub mod uri;

pub use dekad::{Dekad, DekadLabel, DekadResolution};
pub use error::{EoError, EoResult};
pub use extent::RegionOfInterest;
pub use identity::dataset_uuid;
pub use publish::{decide, PublishDecision};
pub use tile::{TileId, WsfEdition};
pub use uri::{ParsedUri, UriScheme};
