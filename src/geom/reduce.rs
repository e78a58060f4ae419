use anyhow::{Context, Result};
use geo::{Area, LineString, MultiPolygon, Polygon, Simplify, Validation};

/// The constituent polygon with the largest area (first one on ties).
pub fn largest_polygon(shape: &MultiPolygon<f64>) -> Option<&Polygon<f64>> {
    shape.0.iter()
        .reduce(|best, p| if p.unsigned_area() > best.unsigned_area() { p } else { best })
}

/// Douglas-Peucker simplification of every ring, preserving topology: a simplified ring is
/// only kept if the polygon stays valid with it (no self-intersection, holes still inside
/// the shell and disjoint). Otherwise that ring keeps its original coordinates, as does a
/// ring that would collapse below four coordinates.
pub fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    fn simplify_ring(ring: &LineString<f64>, tolerance: f64) -> LineString<f64> {
        let simplified = ring.simplify(&tolerance);
        if simplified.0.len() < 4 { ring.clone() } else { simplified }
    }

    if tolerance <= 0.0 { return polygon.clone() }

    let candidate = Polygon::new(
        simplify_ring(polygon.exterior(), tolerance),
        polygon.interiors().iter()
            .map(|ring| simplify_ring(ring, tolerance))
            .collect(),
    );
    if candidate.is_valid() || !polygon.is_valid() { return candidate }

    // Accept simplified rings one at a time, exterior first.
    let mut exterior = polygon.exterior().clone();
    let mut interiors = polygon.interiors().to_vec();
    if Polygon::new(candidate.exterior().clone(), interiors.clone()).is_valid() {
        exterior = candidate.exterior().clone();
    }
    for (i, ring) in candidate.interiors().iter().enumerate() {
        let original = std::mem::replace(&mut interiors[i], ring.clone());
        if !Polygon::new(exterior.clone(), interiors.clone()).is_valid() {
            interiors[i] = original;
        }
    }
    Polygon::new(exterior, interiors)
}

/// Reduce a city boundary to the single polygon used for the road network query:
/// its largest part, simplified with `tolerance` (in degrees; 0 disables simplification).
pub fn city_polygon(shape: &MultiPolygon<f64>, tolerance: f64) -> Result<Polygon<f64>> {
    let largest = largest_polygon(shape)
        .context("boundary geometry has no polygons")?;
    Ok(simplify_polygon(largest, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Rect, coord};

    fn rect(x: f64, w: f64, h: f64) -> Polygon<f64> {
        Rect::new(coord! { x: x, y: 0.0 }, coord! { x: x + w, y: h }).to_polygon()
    }

    #[test]
    fn picks_largest_part_and_simplifies_it() {
        // Parts with areas {10, 50, 2}.
        let shape = MultiPolygon(vec![rect(0.0, 2.0, 5.0), rect(10.0, 5.0, 10.0), rect(20.0, 1.0, 2.0)]);
        let result = city_polygon(&shape, 0.01).unwrap();
        assert!((result.unsigned_area() - 50.0).abs() < 1e-9);
        assert_eq!(result.exterior(), rect(10.0, 5.0, 10.0).exterior());
    }

    #[test]
    fn simplification_drops_near_collinear_vertices() {
        let wobbly = polygon![
            (x: 0.0, y: 0.0), (x: 0.5, y: 0.001), (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0), (x: 0.0, y: 1.0),
        ];
        let simplified = simplify_polygon(&wobbly, 0.01);
        assert_eq!(simplified.exterior().0.len(), 5); // 4 corners + closing coord
        assert_eq!(simplify_polygon(&wobbly, 0.0), wobbly);
    }

    #[test]
    fn tiny_rings_are_preserved() {
        let tiny = polygon![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0), (x: 0.001, y: 0.001), (x: 0.0, y: 0.001)];
        let simplified = simplify_polygon(&tiny, 0.01);
        assert_eq!(simplified, tiny);
    }

    #[test]
    fn hole_near_a_bulge_stays_inside_the_shell() {
        // The bulge at (5, -0.5) is within tolerance of the bottom edge, but the hole sits inside it.
        let exterior = LineString::from(vec![
            (0.0, 0.0), (4.0, 0.0), (5.0, -0.5), (6.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0),
        ]);
        let hole = LineString::from(vec![
            (4.9, -0.35), (5.1, -0.35), (5.1, -0.15), (4.9, -0.15), (4.9, -0.35),
        ]);
        let polygon = Polygon::new(exterior, vec![hole]);
        assert!(polygon.is_valid());

        let simplified = simplify_polygon(&polygon, 0.6);
        assert!(simplified.is_valid());
        assert_eq!(simplified.exterior(), polygon.exterior());
        assert_eq!(simplified.interiors(), polygon.interiors());
    }

    #[test]
    fn holes_away_from_the_edge_do_not_block_simplification() {
        let exterior = LineString::from(vec![
            (0.0, 0.0), (4.0, 0.0), (5.0, -0.5), (6.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0),
        ]);
        let hole = LineString::from(vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)]);
        let simplified = simplify_polygon(&Polygon::new(exterior, vec![hole]), 0.6);

        assert!(simplified.is_valid());
        assert_eq!(simplified.exterior().0.len(), 5);
        assert_eq!(simplified.interiors().len(), 1);
    }

    #[test]
    fn empty_multipolygon_is_an_error() {
        assert!(city_polygon(&MultiPolygon::<f64>(vec![]), 0.01).is_err());
    }
}
