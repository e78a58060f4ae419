use std::path::Path;

use anyhow::{Context, Result, bail};
use dbase::{FieldValue, Record};
use geo::MultiPolygon;
use shapefile::Shape;
use tracing::debug;

use crate::{
    geom::{MetricProjection, shp_to_geo},
    io::shp::{ensure_geographic_crs, read_shapefile},
};

/// Attribute columns tried, in order, for the city name.
const NAME_FIELDS: &[&str] = &["name", "NAME"];

/// One city boundary to process.
#[derive(Clone, Debug)]
pub struct City {
    pub name: String,
    /// Boundary in EPSG:4326 lon/lat.
    pub geometry: MultiPolygon<f64>,
    /// Area measured on a Web Mercator copy of the boundary.
    pub area_km2: f64,
}

impl City {
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>, area_km2: f64) -> Self {
        Self { name: name.into(), geometry, area_km2 }
    }
}

/// Load every city from a polygon shapefile, decoding its attributes with `encoding`.
pub fn load_cities(path: &Path, encoding: &str) -> Result<Vec<City>> {
    ensure_geographic_crs(path)?;
    let projection = MetricProjection::web_mercator()?;

    /// Name from the first non-empty text field among `NAME_FIELDS`.
    fn city_name(record: &Record) -> Option<String> {
        NAME_FIELDS.iter()
            .filter_map(|&field| match record.get(field) {
                Some(FieldValue::Character(Some(s))) | Some(FieldValue::Memo(s)) => Some(s.trim().to_string()),
                _ => None,
            })
            .find(|s| !s.is_empty())
    }

    let mut cities = Vec::new();
    for (i, (shape, record)) in read_shapefile(path, encoding)?.into_iter().enumerate() {
        let name = city_name(&record)
            .with_context(|| format!("[pipeline::city] record {i} in {} has no name/NAME value", path.display()))?;
        let geometry = match &shape {
            Shape::Polygon(polygon) => shp_to_geo(polygon),
            Shape::PolygonM(polygon) => shp_to_geo(polygon),
            Shape::PolygonZ(polygon) => shp_to_geo(polygon),
            other => bail!("[pipeline::city] {name} has unsupported shape type {}", other.shapetype()),
        };
        let area_km2 = projection.area_km2(&geometry)
            .with_context(|| format!("[pipeline::city] Failed to measure area of {name}"))?;
        cities.push(City::new(name, geometry, area_km2));
    }

    debug!(count = cities.len(), path = %path.display(), "loaded city boundaries");
    Ok(cities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbase::{FieldName, TableWriterBuilder, encoding::EncodingRs};
    use shapefile::{Point, Polygon, PolygonRing};

    fn square(x0: f64, y0: f64, size: f64) -> Polygon {
        Polygon::new(PolygonRing::Outer(vec![
            Point::new(x0, y0),
            Point::new(x0, y0 + size),
            Point::new(x0 + size, y0 + size),
            Point::new(x0 + size, y0),
            Point::new(x0, y0),
        ]))
    }

    /// Write one square per row, with `fields` as text columns in the given encoding.
    fn write_table(path: &Path, fields: &[&str], rows: &[&[&str]], encoding: &'static encoding_rs::Encoding) {
        let table = fields.iter().fold(
            TableWriterBuilder::with_encoding(EncodingRs::from(encoding)),
            |table, &field| table.add_character_field(FieldName::try_from(field).unwrap(), 50),
        );
        let mut writer = shapefile::Writer::from_path(path, table).unwrap();
        for (i, values) in rows.iter().enumerate() {
            let mut record = Record::default();
            for (field, value) in fields.iter().zip(values.iter()) {
                record.insert(field.to_string(), FieldValue::Character(Some(value.to_string())));
            }
            writer.write_shape_and_record(&square(116.0 + i as f64, 39.0, 0.1), &record).unwrap();
        }
    }

    fn write_cities(path: &Path, names: &[&str]) {
        let rows = names.iter().map(std::slice::from_ref).collect::<Vec<_>>();
        write_table(path, &["NAME"], &rows, encoding_rs::UTF_8);
    }

    #[test]
    fn loads_names_and_areas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.shp");
        write_cities(&path, &["Beijing", " Tianjin "]);

        let cities = load_cities(&path, "utf-8").unwrap();
        assert_eq!(cities.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["Beijing", "Tianjin"]);
        // 0.1° x 0.1° near 39°N is ~159.6 km² in Web Mercator.
        assert!(cities.iter().all(|c| c.area_km2 > 150.0 && c.area_km2 < 170.0));
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.shp");
        write_cities(&path, &["Beijing"]);
        assert!(load_cities(&path, "no-such-encoding").is_err());
    }

    #[test]
    fn lowercase_name_wins_and_empty_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.shp");
        write_table(&path, &["name", "NAME"], &[&["Shanghai", "SHANGHAI"], &["", "WUHAN"]], encoding_rs::UTF_8);

        let cities = load_cities(&path, "utf-8").unwrap();
        assert_eq!(cities.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["Shanghai", "WUHAN"]);
    }

    #[test]
    fn decodes_attribute_table_with_configured_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.shp");
        write_table(&path, &["NAME"], &[&["北京市"], &["天津市"]], encoding_rs::GBK);

        let cities = load_cities(&path, "gbk").unwrap();
        assert_eq!(cities.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["北京市", "天津市"]);
    }

    #[test]
    fn missing_names_are_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.shp");
        write_table(&path, &["NAME"], &[&["  "]], encoding_rs::UTF_8);

        let err = load_cities(&path, "utf-8").unwrap_err();
        assert!(err.to_string().contains("no name/NAME value"));
    }
}
