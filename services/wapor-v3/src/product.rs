//! Product definition loading.
//!
//! Product definitions are ODC-style YAML documents naming the product
//! and its measurements. The definition may live on local disk or behind
//! an HTTP URL; S3 locations are not supported.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use eo_common::uri::{ParsedUri, UriScheme};
use eo_common::{EoError, EoResult};

/// Products this service can generate STAC items for, with their WaPOR
/// mapset codes.
pub const SUPPORTED_PRODUCTS: [(&str, &str); 1] = [("wapor_soil_moisture", "L2-RSM-D")];

/// Resolve a product name to its mapset code.
pub fn mapset_code_for(product_name: &str) -> EoResult<&'static str> {
    SUPPORTED_PRODUCTS
        .iter()
        .find(|(name, _)| *name == product_name)
        .map(|(_, code)| *code)
        .ok_or_else(|| {
            EoError::NotSupported(format!(
                "STAC item generation has not been implemented for {}",
                product_name
            ))
        })
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Measurement {
    pub name: String,
    #[serde(default)]
    pub units: Option<String>,
}

/// Load a product definition from a local path or an http(s) URL.
pub async fn load_product_definition(location: &str) -> EoResult<ProductDefinition> {
    let text = match ParsedUri::parse(location).scheme {
        UriScheme::Local => tokio::fs::read_to_string(location).await.map_err(|e| {
            EoError::StorageAccess(format!("Failed to read product yaml {}: {}", location, e))
        })?,
        UriScheme::Http => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .map_err(|e| EoError::Internal(format!("Failed to create HTTP client: {}", e)))?;
            client
                .get(location)
                .send()
                .await
                .map_err(|e| EoError::Network(format!("Failed to fetch product yaml: {}", e)))?
                .error_for_status()
                .map_err(|e| EoError::Network(format!("Failed to fetch product yaml: {}", e)))?
                .text()
                .await
                .map_err(|e| EoError::Network(format!("Failed to fetch product yaml: {}", e)))?
        }
        scheme => {
            return Err(EoError::NotSupported(format!(
                "Product yaml must be a local file or url, got a {} location: {}",
                scheme, location
            )))
        }
    };

    let definition: ProductDefinition = serde_yaml::from_str(&text)
        .map_err(|e| EoError::Validation(format!("Invalid product yaml {}: {}", location, e)))?;
    debug!(product = %definition.name, measurements = definition.measurements.len(), "Loaded product definition");
    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapset_lookup() {
        assert_eq!(mapset_code_for("wapor_soil_moisture").unwrap(), "L2-RSM-D");
        assert!(matches!(
            mapset_code_for("wapor_evapotranspiration"),
            Err(EoError::NotSupported(_))
        ));
    }

    #[test]
    fn test_parse_product_yaml() {
        let yaml = r#"
name: wapor_soil_moisture
description: WaPOR v3 relative soil moisture
metadata_type: eo3
measurements:
  - name: relative_soil_moisture
    units: percent
    dtype: float32
    nodata: -9999
"#;
        let definition: ProductDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(definition.name, "wapor_soil_moisture");
        assert_eq!(definition.measurements.len(), 1);
        assert_eq!(definition.measurements[0].name, "relative_soil_moisture");
        assert_eq!(definition.measurements[0].units.as_deref(), Some("percent"));
    }

    #[tokio::test]
    async fn test_s3_location_not_supported() {
        let result = load_product_definition("s3://bucket/product.yaml").await;
        assert!(matches!(result, Err(EoError::NotSupported(_))));
    }
}
