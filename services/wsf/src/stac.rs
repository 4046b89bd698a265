//! STAC item assembly for WSF tiles.

use geo_types::Polygon;
use serde_json::{json, Value};

use eo_common::extent::bbox_of;
use eo_common::{dataset_uuid, TileId, WsfEdition};
use stac_model::{media_type, StacAsset, StacItem};

const SHORT_NAME: &str = "World Settlement Footprint";

/// GeoJSON Polygon geometry from a footprint's exterior ring.
fn geometry_of(footprint: &Polygon<f64>) -> Value {
    let ring: Vec<Value> = footprint
        .exterior()
        .coords()
        .map(|c| json!([c.x, c.y]))
        .collect();
    json!({ "type": "Polygon", "coordinates": [ring] })
}

/// Assemble the STAC item for one tile of one edition.
///
/// `destination` is the tile-scoped `s3://bucket/prefix/tile` location
/// both the raster and the descriptor live under.
pub fn build_item(
    edition: WsfEdition,
    tile: &TileId,
    footprint: &Polygon<f64>,
    destination: &str,
) -> StacItem {
    let tile_code = tile.to_string();
    let folder_name = edition.folder_name(tile);
    let product_name = edition.product_name();
    let (start, end) = edition.time_range();

    let id = dataset_uuid(
        SHORT_NAME,
        "1",
        &[],
        &[("year", edition.label()), ("tile", &tile_code)],
    );
    let mut item = StacItem::new(id);

    item.set_property("odc:product", product_name.as_str());
    item.set_property("odc:region_code", tile_code.as_str());
    item.set_property("start_datetime", start);
    item.set_property("end_datetime", end);

    item.set_geometry(geometry_of(footprint), bbox_of(footprint));

    item.add_asset(
        &product_name,
        StacAsset::data(
            format!("{}/{}.tif", destination, folder_name),
            media_type::COG,
        ),
    );
    item.set_self_href(&format!("{}/{}.stac-item.json", destination, folder_name));
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::LineString;

    fn footprint() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (10.0, -20.0),
                (12.0, -20.0),
                (12.0, -18.0),
                (10.0, -18.0),
                (10.0, -20.0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_item_shape() {
        let tile = TileId { x: 10, y: -20 };
        let item = build_item(
            WsfEdition::Y2015,
            &tile,
            &footprint(),
            "s3://example-bucket/wsf/10_-20",
        );
        let json: Value = serde_json::from_str(&item.to_pretty_json().unwrap()).unwrap();

        assert_eq!(json["properties"]["odc:product"], "wsf_2015");
        assert_eq!(json["properties"]["odc:region_code"], "10_-20");
        assert_eq!(json["properties"]["start_datetime"], "2015-01-01T00:00:00Z");
        assert_eq!(json["properties"]["end_datetime"], "2015-12-31T23:59:59Z");
        assert_eq!(
            json["assets"]["wsf_2015"]["href"],
            "s3://example-bucket/wsf/10_-20/WSF2015_v2_10_-20.tif"
        );
        assert_eq!(
            json["links"][0]["href"],
            "s3://example-bucket/wsf/10_-20/WSF2015_v2_10_-20.stac-item.json"
        );
        assert_eq!(json["bbox"][0], 10.0);
        assert_eq!(json["bbox"][3], -18.0);
    }

    #[test]
    fn test_id_stable_across_editions_and_tiles() {
        let tile = TileId { x: 10, y: -20 };
        let a = build_item(WsfEdition::Y2015, &tile, &footprint(), "s3://b/p/10_-20");
        let b = build_item(WsfEdition::Y2015, &tile, &footprint(), "s3://b/p/10_-20");
        assert_eq!(a.id, b.id);

        let other = build_item(WsfEdition::Y2019, &tile, &footprint(), "s3://b/p/10_-20");
        assert_ne!(a.id, other.id);
    }

    #[test]
    fn test_evolution_time_range() {
        let tile = TileId { x: 0, y: 0 };
        let item = build_item(WsfEdition::Evolution, &tile, &footprint(), "s3://b/p/0_0");
        assert_eq!(
            item.properties["start_datetime"],
            "1985-01-01T00:00:00.000Z"
        );
        assert_eq!(item.properties["end_datetime"], "2015-12-31T23:59:59.999Z");
    }
}
