use anyhow::{Context, Result};
use geo::{Area, BooleanOps, BoundingRect, Polygon, Rect, coord};

use crate::geom::MetricProjection;

/// Split `polygon` into pieces whose projected area stays near or below `max_area_m2`,
/// by clipping it against an n x n grid over its bounding box.
pub(crate) fn split_for_query(polygon: &Polygon<f64>, projection: &MetricProjection, max_area_m2: f64) -> Result<Vec<Polygon<f64>>> {
    let area = projection.area_m2(polygon)?;
    if max_area_m2 <= 0.0 || area <= max_area_m2 {
        return Ok(vec![polygon.clone()]);
    }

    let n = (area / max_area_m2).sqrt().ceil() as usize;
    let bounds = polygon.bounding_rect()
        .context("cannot split a polygon without extent")?;
    let (dx, dy) = (bounds.width() / n as f64, bounds.height() / n as f64);

    let mut parts = Vec::new();
    for i in 0..n {
        for j in 0..n {
            let min = coord! { x: bounds.min().x + i as f64 * dx, y: bounds.min().y + j as f64 * dy };
            let cell = Rect::new(min, coord! { x: min.x + dx, y: min.y + dy }).to_polygon();
            parts.extend(polygon.intersection(&cell).0.into_iter().filter(|p| p.unsigned_area() > 0.0));
        }
    }

    Ok(parts)
}
