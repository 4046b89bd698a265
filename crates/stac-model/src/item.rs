//! STAC item, asset and link documents.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const STAC_VERSION: &str = "1.0.0";

/// Common media types for assets and links.
pub mod media_type {
    pub const COG: &str = "image/tiff; application=geotiff; profile=cloud-optimized";
    pub const GEOTIFF: &str = "image/tiff; application=geotiff";
    pub const JSON: &str = "application/json";
}

/// One STAC item: a GeoJSON feature describing a single dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StacItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub stac_version: String,
    pub id: String,
    /// GeoJSON geometry of the valid-data footprint, when known.
    pub geometry: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    pub properties: Map<String, Value>,
    pub assets: BTreeMap<String, StacAsset>,
    pub links: Vec<StacLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StacAsset {
    pub href: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub roles: Vec<String>,
}

impl StacAsset {
    /// A downloadable data band.
    pub fn data(href: impl Into<String>, media_type: &str) -> Self {
        Self {
            href: href.into(),
            media_type: Some(media_type.to_string()),
            roles: vec!["data".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StacLink {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

impl StacItem {
    pub fn new(id: Uuid) -> Self {
        Self {
            item_type: "Feature".to_string(),
            stac_version: STAC_VERSION.to_string(),
            id: id.to_string(),
            geometry: None,
            bbox: None,
            properties: Map::new(),
            assets: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    /// Set a property value, replacing any previous value for the key.
    pub fn set_property(&mut self, key: &str, value: impl Into<Value>) {
        self.properties.insert(key.to_string(), value.into());
    }

    /// Set the searchable instant (`datetime`) from a naive UTC time.
    pub fn set_datetime(&mut self, datetime: NaiveDateTime) {
        self.set_property("datetime", format_utc(datetime));
    }

    /// Set the temporal extent (`start_datetime`/`end_datetime`).
    pub fn set_datetime_range(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        self.set_property("start_datetime", format_utc(start));
        self.set_property("end_datetime", format_utc(end));
    }

    pub fn set_geometry(&mut self, geometry: Value, bbox: Vec<f64>) {
        self.geometry = Some(geometry);
        self.bbox = Some(bbox);
    }

    pub fn add_asset(&mut self, key: &str, asset: StacAsset) {
        self.assets.insert(key.to_string(), asset);
    }

    /// Set the item's canonical location, replacing any previous self link.
    pub fn set_self_href(&mut self, href: &str) {
        self.links.retain(|l| l.rel != "self");
        self.links.push(StacLink {
            rel: "self".to_string(),
            href: href.to_string(),
            link_type: Some(media_type::JSON.to_string()),
        });
    }

    /// Pretty-printed JSON, the on-disk/in-bucket descriptor form.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn format_utc(datetime: NaiveDateTime) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
