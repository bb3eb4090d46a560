use geo_traits::{
    CoordTrait, GeometryTrait, LineStringTrait, MultiLineStringTrait, MultiPointTrait,
    MultiPolygonTrait, PointTrait, PolygonTrait,
};

use crate::types::Extent;

/// Bounding box of a multi-geometry; `None` when it holds no coordinates.
pub(crate) fn bounds_from_geometry<G: GeometryTrait<T = f64>>(geom: &G) -> Option<Extent> {
    use geo_traits::GeometryType as GeoType;

    let mut bounds: Option<Extent> = None;
    match geom.as_type() {
        GeoType::MultiPoint(multi) => {
            for point in multi.points() {
                if let Some(coord) = point.coord() {
                    add_coord(&mut bounds, &coord);
                }
            }
        }
        GeoType::MultiLineString(multi) => {
            for line in multi.line_strings() {
                add_line_string(&mut bounds, &line);
            }
        }
        GeoType::MultiPolygon(multi) => {
            for poly in multi.polygons() {
                add_polygon(&mut bounds, &poly);
            }
        }
        // Geometry payloads are always multi-geometries.
        _ => {}
    }

    bounds
}

fn add_polygon<P: PolygonTrait<T = f64>>(bounds: &mut Option<Extent>, poly: &P) {
    if let Some(ring) = poly.exterior() {
        add_line_string(bounds, &ring);
    }
    for ring in poly.interiors() {
        add_line_string(bounds, &ring);
    }
}

fn add_line_string<L: LineStringTrait<T = f64>>(bounds: &mut Option<Extent>, line: &L) {
    for coord in line.coords() {
        add_coord(bounds, &coord);
    }
}

fn add_coord<C: CoordTrait<T = f64>>(bounds: &mut Option<Extent>, coord: &C) {
    let (x, y) = coord.x_y();
    merge_bounds(bounds, Extent::new(x, y, x, y));
}

fn merge_bounds(bounds: &mut Option<Extent>, other: Extent) {
    match bounds {
        Some(existing) => existing.combine(&other),
        None => *bounds = Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::bounds_from_geometry;
    use crate::types::Extent;
    use geo_types::{LineString, MultiLineString, MultiPoint, MultiPolygon, Point, polygon};

    #[test]
    fn bounds_for_empty_multilinestring() {
        let lines: MultiLineString<f64> = MultiLineString(vec![LineString::new(Vec::new())]);
        assert_eq!(bounds_from_geometry(&lines), None);
    }

    #[test]
    fn bounds_for_multipoint() {
        let mp = MultiPoint::from(vec![Point::new(1.0, 5.0), Point::new(-2.0, 3.0)]);
        assert_eq!(
            bounds_from_geometry(&mp),
            Some(Extent::new(-2.0, 3.0, 1.0, 5.0))
        );
    }

    #[test]
    fn bounds_for_multilinestring() {
        let line_a = LineString::from(vec![(0.0, 0.0), (2.0, 1.0)]);
        let line_b = LineString::from(vec![(-3.0, 4.0), (-1.0, 2.0)]);
        let mls = MultiLineString(vec![line_a, line_b]);
        assert_eq!(
            bounds_from_geometry(&mls),
            Some(Extent::new(-3.0, 0.0, 2.0, 4.0))
        );
    }

    #[test]
    fn bounds_for_multipolygon_with_hole() {
        let holed = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 1.0)]]
        );
        let island = polygon![
            (x: -5.0, y: 6.0),
            (x: -4.0, y: 6.0),
            (x: -4.0, y: 7.0),
            (x: -5.0, y: 6.0),
        ];
        let polygons = MultiPolygon(vec![holed, island]);
        assert_eq!(
            bounds_from_geometry(&polygons),
            Some(Extent::new(-5.0, 0.0, 4.0, 7.0))
        );
    }
}
