use anyhow::{Context, Result, anyhow};
use geo::{Area, Coord, MapCoords, MultiPolygon, Polygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// Source geographic CRS (EPSG:4326).
const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Spherical Web Mercator (EPSG:3857).
const WEB_MERCATOR_PROJ4: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs";

/// Reprojection from lon/lat degrees into a metric CRS, for area computations.
pub struct MetricProjection {
    from: Proj4,
    to: Proj4,
}

impl MetricProjection {
    /// Build a projection from PROJ.4 strings; `from` must be geographic (degrees).
    pub fn new(from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            from: Proj4::from_proj_string(from)
                .map_err(|e| anyhow!("{e:?}"))
                .with_context(|| format!("failed to build source PROJ.4: {from}"))?,
            to: Proj4::from_proj_string(to)
                .map_err(|e| anyhow!("{e:?}"))
                .with_context(|| format!("failed to build target PROJ.4: {to}"))?,
        })
    }

    /// WGS84 lon/lat to EPSG:3857 meters.
    pub fn web_mercator() -> Result<Self> {
        Self::new(WGS84_PROJ4, WEB_MERCATOR_PROJ4)
    }

    /// Project a single lon/lat coordinate (degrees in, meters out).
    pub fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.from, &self.to, &mut point)
            .map_err(|e| anyhow!("CRS transform failed for ({}, {}): {e:?}", coord.x, coord.y))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// Project a polygon.
    pub fn project_polygon(&self, shape: &Polygon<f64>) -> Result<Polygon<f64>> {
        shape.try_map_coords(|coord| self.project_coord(coord))
    }

    /// Project a multipolygon.
    pub fn project_multipolygon(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        shape.try_map_coords(|coord| self.project_coord(coord))
    }

    /// Area of a lon/lat multipolygon in km², measured in the projected CRS.
    pub fn area_km2(&self, shape: &MultiPolygon<f64>) -> Result<f64> {
        Ok(self.project_multipolygon(shape)?.unsigned_area() / 1e6)
    }

    /// Area of a lon/lat polygon in m², measured in the projected CRS.
    pub fn area_m2(&self, shape: &Polygon<f64>) -> Result<f64> {
        Ok(self.project_polygon(shape)?.unsigned_area())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn mercator_origin_and_easting() {
        let proj = MetricProjection::web_mercator().unwrap();
        let origin = proj.project_coord(Coord { x: 0.0, y: 0.0 }).unwrap();
        assert!(origin.x.abs() < 1e-6 && origin.y.abs() < 1e-6);

        // One degree of longitude on the equator of a 6378137 m sphere.
        let east = proj.project_coord(Coord { x: 1.0, y: 0.0 }).unwrap();
        assert!((east.x - 111_319.49).abs() < 1.0, "got {}", east.x);
    }

    #[test]
    fn area_of_small_equatorial_square() {
        let proj = MetricProjection::web_mercator().unwrap();
        let square = polygon![(x: 0.0, y: 0.0), (x: 0.01, y: 0.0), (x: 0.01, y: 0.01), (x: 0.0, y: 0.01)];
        let km2 = proj.area_km2(&MultiPolygon(vec![square])).unwrap();
        // ~1.113 km on a side near the equator.
        assert!((km2 - 1.239).abs() < 0.01, "got {km2}");
    }
}
