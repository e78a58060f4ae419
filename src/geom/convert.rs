use shapefile::{self as shp, record::{polygon::GenericPolygon, traits::HasXY}};

/// Convert a shapefile polygon (plain, M or Z) to geo::MultiPolygon<f64>, dropping any M/Z values.
/// Each outer ring starts a new polygon; inner rings attach to the preceding outer ring.
pub(crate) fn shp_to_geo<P: HasXY>(p: &GenericPolygon<P>) -> geo::MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<geo::Coord<f64>>) {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
    }

    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<geo::LineString<f64>> = None;
    let mut current_holes: Vec<geo::LineString<f64>> = Vec::new();

    for ring in p.rings() {
        let mut coords = ring.points().iter()
            .map(|pt| geo::Coord { x: pt.x(), y: pt.y() })
            .collect::<Vec<_>>();
        ensure_closed(&mut coords);
        let ls = geo::LineString(coords);

        match ring {
            shp::PolygonRing::Outer(_) => {
                // flush previous polygon
                if let Some(ext) = current_exterior.take() {
                    polys.push(geo::Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(ls);
            }
            shp::PolygonRing::Inner(_) => current_holes.push(ls),
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(geo::Polygon::new(ext, current_holes));
    }

    geo::MultiPolygon(polys)
}
