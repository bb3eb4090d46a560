use geo_traits::{
    CoordTrait, GeometryTrait, LineStringTrait, MultiLineStringTrait, MultiPointTrait,
    MultiPolygonTrait, PointTrait, PolygonTrait,
};
use geo_types::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use wkb::reader::Wkb;

use crate::bounds::bounds_from_geometry;
use crate::error::{Result, VctError};
use crate::types::{Extent, GeometryKind};

/// Geometry of one feature. The variant must agree with the document's
/// geometry kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Points(MultiPoint<f64>),
    Lines(MultiLineString<f64>),
    Polygons(MultiPolygon<f64>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Points(_) => GeometryKind::Point,
            Geometry::Lines(_) => GeometryKind::Line,
            Geometry::Polygons(_) => GeometryKind::Polygon,
        }
    }

    /// True when there are no parts at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Points(g) => g.0.is_empty(),
            Geometry::Lines(g) => g.0.is_empty(),
            Geometry::Polygons(g) => g.0.is_empty(),
        }
    }

    pub fn bounds(&self) -> Option<Extent> {
        match self {
            Geometry::Points(g) => bounds_from_geometry(g),
            Geometry::Lines(g) => bounds_from_geometry(g),
            Geometry::Polygons(g) => bounds_from_geometry(g),
        }
    }

    /// Convert any geometry exposing `geo_traits` into a VCT geometry.
    ///
    /// Single geometries become one-part collections. Geometry collections
    /// and the non-OGC shapes (rect, triangle, line) have no VCT encoding.
    pub fn from_geometry<G: GeometryTrait<T = f64>>(geometry: &G) -> Result<Self> {
        use geo_traits::GeometryType as GeoType;

        match geometry.as_type() {
            GeoType::Point(point) => {
                let points = point_from_trait(point).into_iter().collect();
                Ok(Geometry::Points(MultiPoint(points)))
            }
            GeoType::MultiPoint(multi) => Ok(Geometry::Points(MultiPoint(
                multi
                    .points()
                    .filter_map(|point| point_from_trait(&point))
                    .collect(),
            ))),
            GeoType::LineString(line) => Ok(Geometry::Lines(MultiLineString(vec![
                line_string_from_trait(line),
            ]))),
            GeoType::MultiLineString(multi) => Ok(Geometry::Lines(MultiLineString(
                multi
                    .line_strings()
                    .map(|line| line_string_from_trait(&line))
                    .collect(),
            ))),
            GeoType::Polygon(poly) => Ok(Geometry::Polygons(MultiPolygon(vec![
                polygon_from_trait(poly),
            ]))),
            GeoType::MultiPolygon(multi) => Ok(Geometry::Polygons(MultiPolygon(
                multi
                    .polygons()
                    .map(|poly| polygon_from_trait(&poly))
                    .collect(),
            ))),
            GeoType::GeometryCollection(_) => Err(VctError::UnsupportedGeometryType(
                "GeometryCollection".to_string(),
            )),
            GeoType::Rect(_) => Err(VctError::UnsupportedGeometryType("Rect".to_string())),
            GeoType::Triangle(_) => {
                Err(VctError::UnsupportedGeometryType("Triangle".to_string()))
            }
            GeoType::Line(_) => Err(VctError::UnsupportedGeometryType("Line".to_string())),
        }
    }

    /// Decode a WKB buffer.
    pub fn from_wkb(buf: &[u8]) -> Result<Self> {
        let wkb = Wkb::try_new(buf)?;
        Self::from_geometry(&wkb)
    }

    /// Encode as WKB (little endian, XY).
    pub fn to_wkb(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            Geometry::Points(g) => wkb::writer::write_geometry(&mut buf, g, &Default::default())?,
            Geometry::Lines(g) => wkb::writer::write_geometry(&mut buf, g, &Default::default())?,
            Geometry::Polygons(g) => {
                wkb::writer::write_geometry(&mut buf, g, &Default::default())?
            }
        }
        Ok(buf)
    }

    /// Clone into a plain `geo_types::Geometry`.
    pub fn to_geo(&self) -> geo_types::Geometry<f64> {
        match self {
            Geometry::Points(g) => geo_types::Geometry::MultiPoint(g.clone()),
            Geometry::Lines(g) => geo_types::Geometry::MultiLineString(g.clone()),
            Geometry::Polygons(g) => geo_types::Geometry::MultiPolygon(g.clone()),
        }
    }
}

impl From<MultiPoint<f64>> for Geometry {
    fn from(value: MultiPoint<f64>) -> Self {
        Geometry::Points(value)
    }
}

impl From<MultiLineString<f64>> for Geometry {
    fn from(value: MultiLineString<f64>) -> Self {
        Geometry::Lines(value)
    }
}

impl From<MultiPolygon<f64>> for Geometry {
    fn from(value: MultiPolygon<f64>) -> Self {
        Geometry::Polygons(value)
    }
}

fn coord_from_trait<C: CoordTrait<T = f64>>(coord: &C) -> Coord<f64> {
    let (x, y) = coord.x_y();
    Coord { x, y }
}

fn point_from_trait<P: PointTrait<T = f64>>(point: &P) -> Option<Point<f64>> {
    point.coord().map(|coord| Point(coord_from_trait(&coord)))
}

fn line_string_from_trait<L: LineStringTrait<T = f64>>(line: &L) -> LineString<f64> {
    LineString::new(line.coords().map(|coord| coord_from_trait(&coord)).collect())
}

fn polygon_from_trait<P: PolygonTrait<T = f64>>(poly: &P) -> Polygon<f64> {
    let exterior = poly
        .exterior()
        .map(|ring| line_string_from_trait(&ring))
        .unwrap_or_else(|| LineString::new(Vec::new()));
    let interiors = poly
        .interiors()
        .map(|ring| line_string_from_trait(&ring))
        .collect();
    Polygon::new(exterior, interiors)
}

#[cfg(test)]
mod tests {
    use super::Geometry;
    use crate::Result;
    use crate::error::VctError;
    use crate::types::{Extent, GeometryKind};
    use geo_types::{
        GeometryCollection, LineString, MultiPoint, MultiPolygon, Point, Rect, polygon,
    };
    use std::str::FromStr;
    use wkt::Wkt;

    #[test]
    fn single_geometries_become_one_part_collections() -> Result<()> {
        let points = Geometry::from_geometry(&Point::new(1.0, 2.0))?;
        assert_eq!(
            points,
            Geometry::Points(MultiPoint::from(vec![Point::new(1.0, 2.0)]))
        );

        let line = Geometry::from_geometry(&LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]))?;
        assert_eq!(line.kind(), GeometryKind::Line);

        let poly = polygon!((x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0));
        let polys = Geometry::from_geometry(&poly)?;
        assert_eq!(polys, Geometry::Polygons(MultiPolygon(vec![poly])));
        Ok(())
    }

    #[test]
    fn collections_are_rejected() {
        let collection: GeometryCollection<f64> = GeometryCollection::default();
        let err = Geometry::from_geometry(&collection).expect_err("no VCT encoding");
        assert!(matches!(err, VctError::UnsupportedGeometryType(_)));

        let rect = Rect::new((0.0, 0.0), (1.0, 1.0));
        assert!(Geometry::from_geometry(&rect).is_err());
    }

    #[test]
    fn wkb_roundtrip() -> Result<()> {
        let wkt = Wkt::<f64>::from_str("MULTILINESTRING((0 0,1 1),(2 2,3 5))")
            .map_err(|err| VctError::Message(err.to_string()))?;
        let geometry = Geometry::from_geometry(&wkt)?;
        assert_eq!(geometry.kind(), GeometryKind::Line);

        let buf = geometry.to_wkb()?;
        assert_eq!(Geometry::from_wkb(&buf)?, geometry);
        assert_eq!(geometry.bounds(), Some(Extent::new(0.0, 0.0, 3.0, 5.0)));
        Ok(())
    }

    #[test]
    fn empty_geometry_has_no_bounds() {
        let geometry = Geometry::Points(MultiPoint(Vec::new()));
        assert!(geometry.is_empty());
        assert_eq!(geometry.bounds(), None);
    }
}
