//! World Settlement Footprint tile grid and dataset editions.

use std::fmt;
use std::str::FromStr;

use crate::error::{EoError, EoResult};

/// Tile grid bounds covering continental Africa, in degrees.
pub const MIN_X: i32 = -26;
pub const MAX_X: i32 = 64;
pub const MIN_Y: i32 = -54;
pub const MAX_Y: i32 = 38;

/// Grid step in degrees; WSF tiles are 2x2 degrees.
pub const TILE_STEP: i32 = 2;

/// One cell of the WSF download grid, identified by the coordinates of
/// its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.x, self.y)
    }
}

impl FromStr for TileId {
    type Err = EoError;

    fn from_str(s: &str) -> EoResult<Self> {
        let (x, y) = s
            .split_once('_')
            .ok_or_else(|| EoError::Validation(format!("Malformed tile id: {}", s)))?;
        let x = x
            .parse()
            .map_err(|_| EoError::Validation(format!("Malformed tile id: {}", s)))?;
        let y = y
            .parse()
            .map_err(|_| EoError::Validation(format!("Malformed tile id: {}", s)))?;
        Ok(Self { x, y })
    }
}

/// Iterate the full grid in a fixed order (x outer, y inner).
pub fn tile_grid() -> impl Iterator<Item = TileId> {
    (MIN_X..MAX_X)
        .step_by(TILE_STEP as usize)
        .flat_map(|x| (MIN_Y..MAX_Y).step_by(TILE_STEP as usize).map(move |y| TileId { x, y }))
}

/// WSF dataset edition: a single-year snapshot or the multi-year
/// evolution product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WsfEdition {
    Y2015,
    Y2019,
    Evolution,
}

impl FromStr for WsfEdition {
    type Err = EoError;

    fn from_str(s: &str) -> EoResult<Self> {
        match s {
            "2015" => Ok(WsfEdition::Y2015),
            "2019" => Ok(WsfEdition::Y2019),
            "evolution" => Ok(WsfEdition::Evolution),
            other => Err(EoError::NotSupported(format!(
                "Unrecognized WSF edition: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for WsfEdition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl WsfEdition {
    /// Edition token as it appears in identifiers and folder names.
    pub fn label(&self) -> &'static str {
        match self {
            WsfEdition::Y2015 => "2015",
            WsfEdition::Y2019 => "2019",
            WsfEdition::Evolution => "evolution",
        }
    }

    /// Provider-side dataset version for this edition.
    pub fn version(&self) -> &'static str {
        match self {
            WsfEdition::Y2015 => "v2",
            WsfEdition::Y2019 | WsfEdition::Evolution => "v1",
        }
    }

    /// Top-level folder name on the provider's download service.
    pub fn source_folder(&self) -> &'static str {
        match self {
            WsfEdition::Y2015 => "WSF2015",
            WsfEdition::Y2019 => "WSF2019",
            WsfEdition::Evolution => "WSF_EVO",
        }
    }

    /// ODC product name for this edition.
    pub fn product_name(&self) -> String {
        format!("wsf_{}", self.label())
    }

    /// Per-tile folder name, e.g. `WSF2015_v2_10_-20`.
    pub fn folder_name(&self, tile: &TileId) -> String {
        format!("WSF{}_{}_{}", self.label(), self.version(), tile)
    }

    /// Temporal bounds of the edition as RFC 3339 strings. The evolution
    /// product spans 1985-2015; year editions cover the calendar year.
    pub fn time_range(&self) -> (String, String) {
        match self {
            WsfEdition::Evolution => (
                "1985-01-01T00:00:00.000Z".to_string(),
                "2015-12-31T23:59:59.999Z".to_string(),
            ),
            _ => (
                format!("{}-01-01T00:00:00Z", self.label()),
                format!("{}-12-31T23:59:59Z", self.label()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_display_parse() {
        let tile = TileId { x: -26, y: 10 };
        assert_eq!(tile.to_string(), "-26_10");
        assert_eq!("-26_10".parse::<TileId>().unwrap(), tile);
        assert!(matches!(
            "nope".parse::<TileId>(),
            Err(EoError::Validation(_))
        ));
    }

    #[test]
    fn test_grid_bounds_and_step() {
        let tiles: Vec<TileId> = tile_grid().collect();
        assert_eq!(tiles.len(), (45 * 46) as usize);
        assert_eq!(tiles[0], TileId { x: MIN_X, y: MIN_Y });
        assert!(tiles.iter().all(|t| t.x % 2 == 0 && t.y % 2 == 0));
        assert!(tiles.iter().all(|t| t.x < MAX_X && t.y < MAX_Y));
    }

    #[test]
    fn test_edition_mapping() {
        let e: WsfEdition = "2015".parse().unwrap();
        assert_eq!(e.version(), "v2");
        assert_eq!(e.source_folder(), "WSF2015");
        assert_eq!(e.product_name(), "wsf_2015");
        assert_eq!(
            e.folder_name(&TileId { x: 10, y: -20 }),
            "WSF2015_v2_10_-20"
        );

        let evo: WsfEdition = "evolution".parse().unwrap();
        assert_eq!(evo.version(), "v1");
        assert_eq!(evo.source_folder(), "WSF_EVO");
        let (start, end) = evo.time_range();
        assert_eq!(start, "1985-01-01T00:00:00.000Z");
        assert_eq!(end, "2015-12-31T23:59:59.999Z");

        assert!(matches!(
            "2020".parse::<WsfEdition>(),
            Err(EoError::NotSupported(_))
        ));
    }
}
