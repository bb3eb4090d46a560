//! Point, Line and Polygon sections.
//!
//! Every record starts with the feature id and two classification lines
//! (feature code and graphic code) that are not retained.

use geo_types::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

use crate::error::{Result, VctError};
use crate::geometry::Geometry;
use crate::types::GeometryKind;

use super::lexer::{LineCursor, Section, parse_coord, parse_count};
use super::reader::ReadState;

/// Point feature type of a point cluster.
pub(crate) const POINT_CLUSTER: i64 = 4;
/// Line feature type of lines given by direct coordinates.
pub(crate) const DIRECT_COORDINATES: i64 = 1;
/// Line type of a polyline part.
pub(crate) const POLYLINE: i64 = 11;
/// Polygon feature type of polygons given by their boundary rings.
pub(crate) const POLYGON_BY_RINGS: i64 = 1;
/// Shape code of a main polygon ring.
pub(crate) const POLYGON_RING: i64 = 11;

fn read_record_head(cursor: &mut LineCursor<'_, '_>) -> Result<(i64, i64)> {
    let id = cursor.next_int()?;
    // feature code and graphic code
    cursor.next_line()?;
    cursor.next_line()?;
    let feature_type = cursor.next_int()?;
    Ok((id, feature_type))
}

fn read_coords(cursor: &mut LineCursor<'_, '_>, count: usize) -> Result<Vec<Coord<f64>>> {
    (0..count)
        .map(|_| cursor.next_coord().map(Coord::from))
        .collect()
}

pub(crate) fn read_points(section: &Section<'_>, state: &mut ReadState) -> Result<()> {
    let mut cursor = LineCursor::new(section);
    while cursor.skip_blank() {
        let (id, feature_type) = read_record_head(&mut cursor)?;
        let points: Vec<Point<f64>> = if feature_type == POINT_CLUSTER {
            let count = cursor.next_count()?;
            read_coords(&mut cursor, count)?
                .into_iter()
                .map(Point)
                .collect()
        } else {
            vec![Point::from(cursor.next_coord()?)]
        };
        cursor.end_record()?;

        state.insert_feature(
            id,
            GeometryKind::Point,
            Some(Geometry::Points(MultiPoint(points))),
        );
    }
    Ok(())
}

pub(crate) fn read_lines(section: &Section<'_>, state: &mut ReadState) -> Result<()> {
    let mut cursor = LineCursor::new(section);
    while cursor.skip_blank() {
        let (id, feature_type) = read_record_head(&mut cursor)?;
        let mut parts = Vec::new();

        if feature_type == DIRECT_COORDINATES {
            let count = cursor.next_count()?;
            let mut supported = true;
            for _ in 0..count {
                let line_type = cursor.next_int()?;
                if line_type != POLYLINE {
                    log::debug!("feature {id}: line type {line_type} is not supported");
                    supported = false;
                    break;
                }
                let point_count = cursor.next_count()?;
                parts.push(LineString::new(read_coords(&mut cursor, point_count)?));
            }
            if supported {
                cursor.end_record()?;
            } else {
                cursor.skip_record()?;
            }
        } else {
            log::debug!("feature {id}: line feature type {feature_type} is not supported");
            cursor.skip_record()?;
        }

        state.insert_feature(
            id,
            GeometryKind::Line,
            Some(Geometry::Lines(MultiLineString(parts))),
        );
    }
    Ok(())
}

fn close_polygon(polygons: &mut Vec<Polygon<f64>>, rings: Option<Vec<LineString<f64>>>) {
    if let Some(rings) = rings {
        let mut rings = rings.into_iter();
        let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
        polygons.push(Polygon::new(exterior, rings.collect()));
    }
}

/// A polygon record lists `count` rings, each announced by a shape line.
///
/// A main ring is a shape code line followed by a point count line. A
/// subordinate ring is announced by its point count directly, so its next
/// line is already a coordinate; it becomes another ring of the polygon
/// opened by the last main ring and does not count against `count`. The
/// record ends with a `0` shape line.
pub(crate) fn read_polygons(section: &Section<'_>, state: &mut ReadState) -> Result<()> {
    let mut cursor = LineCursor::new(section);
    while cursor.skip_blank() {
        let (id, feature_type) = read_record_head(&mut cursor)?;
        // label point, not retained
        cursor.next_coord()?;

        if feature_type != POLYGON_BY_RINGS {
            log::debug!("feature {id}: polygon feature type {feature_type} is not supported");
            cursor.skip_record()?;
            state.insert_feature(id, GeometryKind::Polygon, None);
            continue;
        }

        let mut ring_count = cursor.next_count()?;
        let mut polygons = Vec::new();
        let mut current: Option<Vec<LineString<f64>>> = None;
        let mut terminated = false;
        let mut supported = true;
        let mut read = 0;

        while read <= ring_count {
            let Some(next) = cursor.peek_line() else {
                break;
            };
            if next.is_empty() {
                break;
            }
            let shape = cursor.next_int()?;
            if shape == 0 {
                terminated = true;
                break;
            }

            let line = cursor.next_line()?;
            let line_number = cursor.line_number();
            if line.contains(',') {
                let Some(rings) = current.as_mut() else {
                    log::debug!("feature {id}: subordinate ring without a main ring");
                    supported = false;
                    break;
                };
                let count = usize::try_from(shape).map_err(|_| VctError::InvalidNumber {
                    line: line_number - 1,
                    value: shape.to_string(),
                })?;
                let mut coords = vec![Coord::from(parse_coord(line, line_number)?)];
                coords.extend(read_coords(&mut cursor, count.saturating_sub(1))?);
                rings.push(LineString::new(coords));
                ring_count += 1;
            } else {
                close_polygon(&mut polygons, current.take());
                if shape != POLYGON_RING {
                    log::debug!("feature {id}: polygon shape {shape} is not supported");
                    supported = false;
                    break;
                }
                let count = parse_count(line, line_number)?;
                current = Some(vec![LineString::new(read_coords(&mut cursor, count)?)]);
            }
            read += 1;
        }
        close_polygon(&mut polygons, current.take());

        if !supported {
            cursor.skip_record()?;
        } else if terminated {
            cursor.consume_separator();
        } else {
            return Err(VctError::UnterminatedRecord {
                section: cursor.section_name(),
                id,
            });
        }

        state.insert_feature(
            id,
            GeometryKind::Polygon,
            Some(Geometry::Polygons(MultiPolygon(polygons))),
        );
    }
    Ok(())
}

/// Solid, Aggregation, Annotation, Topology and Style sections are skipped.
pub(crate) fn skip_section(section: &Section<'_>, _state: &mut ReadState) -> Result<()> {
    log::debug!(
        "skipping {} section ({} lines)",
        section.kind.name(),
        section.lines.len()
    );
    Ok(())
}
