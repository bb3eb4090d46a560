//! Serializes a whole document in a fixed section order.

use std::io::{self, Write};

use geo_types::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon};

use crate::conversions::field_type_to_str;
use crate::geometry::Geometry;
use crate::options::VctOptions;
use crate::types::{FieldSpec, FieldType, GeometryKind};

use super::decode::{DIRECT_COORDINATES, POINT_CLUSTER, POLYGON_BY_RINGS, POLYGON_RING, POLYLINE};
use super::{FeatureStore, VctFeature, VctMetadata};

/// Feature type of a single point.
const SINGLE_POINT: i64 = 1;
/// Label point placeholder; the label point is not kept on read.
const MARK_POINT: &str = "0.0,0.0";

struct Writer<'o, W> {
    out: W,
    options: &'o VctOptions,
}

pub(crate) fn write_document<W: Write>(
    out: W,
    metadata: &VctMetadata,
    store: &FeatureStore,
    options: &VctOptions,
) -> io::Result<()> {
    let mut writer = Writer { out, options };
    writer.head(metadata)?;
    writer.feature_code(metadata)?;
    writer.table_structure(metadata, store.fields())?;
    writer.geometries(metadata, store)?;
    writeln!(writer.out, "AnnotationBegin")?;
    writeln!(writer.out, "AnnotationEnd")?;
    writer.attributes(metadata, store)?;
    writer.out.flush()
}

fn field_line(field: &FieldSpec) -> String {
    let mut line = format!("{},{}", field.name, field_type_to_str(&field.field_type));
    let is_double = field.field_type == FieldType::Double;
    if is_double || field.length != -1 || field.precision != -1 {
        line.push_str(&format!(",{}", field.length));
    }
    if is_double || field.precision != -1 {
        line.push_str(&format!(",{}", field.precision));
    }
    line
}

impl<W: Write> Writer<'_, W> {
    fn head(&mut self, metadata: &VctMetadata) -> io::Result<()> {
        writeln!(self.out, "HeadBegin")?;
        for line in &metadata.head_lines {
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "HeadEnd")
    }

    fn feature_code(&mut self, metadata: &VctMetadata) -> io::Result<()> {
        let class = &metadata.feature_class;
        let kind = match class.geometry_kind {
            GeometryKind::Unknown => class.geometry_token.clone(),
            kind => kind.to_string(),
        };
        writeln!(self.out, "FeatureCodeBegin")?;
        writeln!(
            self.out,
            "{},{},{kind},{}",
            class.type_code, class.type_name, class.attribute_table_name
        )?;
        for item in &metadata.custom_items {
            writeln!(self.out, "{item}")?;
        }
        writeln!(self.out, "FeatureCodeEnd")
    }

    fn table_structure(&mut self, metadata: &VctMetadata, fields: &[FieldSpec]) -> io::Result<()> {
        writeln!(self.out, "TableStructureBegin")?;
        writeln!(
            self.out,
            "{},{}",
            metadata.feature_class.attribute_table_name,
            fields.len()
        )?;
        for field in fields {
            writeln!(self.out, "{}", field_line(field))?;
        }
        writeln!(self.out, "0")?;
        writeln!(self.out, "TableStructureEnd")
    }

    fn geometries(&mut self, metadata: &VctMetadata, store: &FeatureStore) -> io::Result<()> {
        let kind = store.geometry_kind();
        let code = metadata.feature_class.type_code.as_str();

        for (section, section_kind) in [
            ("Point", GeometryKind::Point),
            ("Line", GeometryKind::Line),
            ("Polygon", GeometryKind::Polygon),
        ] {
            writeln!(self.out, "{section}Begin")?;
            if kind == section_kind {
                for feature in store.features() {
                    self.record(code, kind, feature)?;
                }
            }
            writeln!(self.out, "{section}End")?;
        }
        Ok(())
    }

    fn record(&mut self, code: &str, kind: GeometryKind, feature: &VctFeature) -> io::Result<()> {
        writeln!(self.out, "{}", feature.id)?;
        // feature code and graphic code
        writeln!(self.out, "{code}")?;
        writeln!(self.out, "{code}")?;
        match &feature.geometry {
            Some(Geometry::Points(points)) => self.points(points)?,
            Some(Geometry::Lines(lines)) => self.lines(lines)?,
            Some(Geometry::Polygons(polygons)) => self.polygons(polygons)?,
            // no geometry: an empty record of the document's kind
            None => match kind {
                GeometryKind::Point => self.points(&MultiPoint(Vec::new()))?,
                GeometryKind::Line => self.lines(&MultiLineString(Vec::new()))?,
                GeometryKind::Polygon => self.polygons(&MultiPolygon(Vec::new()))?,
                GeometryKind::Unknown => {}
            },
        }
        writeln!(self.out, "0")?;
        writeln!(self.out)
    }

    fn points(&mut self, points: &MultiPoint<f64>) -> io::Result<()> {
        if let [point] = points.0.as_slice() {
            writeln!(self.out, "{SINGLE_POINT}")?;
            return self.coord(point.0);
        }
        writeln!(self.out, "{POINT_CLUSTER}")?;
        writeln!(self.out, "{}", points.0.len())?;
        for point in &points.0 {
            self.coord(point.0)?;
        }
        Ok(())
    }

    fn lines(&mut self, lines: &MultiLineString<f64>) -> io::Result<()> {
        writeln!(self.out, "{DIRECT_COORDINATES}")?;
        if let [line] = lines.0.as_slice() {
            writeln!(self.out, "1")?;
            return self.polyline(line);
        }
        writeln!(self.out, "{}", lines.0.len())?;
        for line in &lines.0 {
            self.polyline(line)?;
        }
        Ok(())
    }

    fn polyline(&mut self, line: &LineString<f64>) -> io::Result<()> {
        writeln!(self.out, "{POLYLINE}")?;
        self.ring(line)
    }

    fn polygons(&mut self, polygons: &MultiPolygon<f64>) -> io::Result<()> {
        writeln!(self.out, "{POLYGON_BY_RINGS}")?;
        writeln!(self.out, "{MARK_POINT}")?;
        writeln!(self.out, "{}", polygons.0.len())?;
        for polygon in &polygons.0 {
            writeln!(self.out, "{POLYGON_RING}")?;
            self.ring(polygon.exterior())?;
            // An empty subordinate ring would read back as the record terminator.
            for ring in polygon.interiors().iter().filter(|ring| !ring.0.is_empty()) {
                self.ring(ring)?;
            }
        }
        Ok(())
    }

    fn ring(&mut self, ring: &LineString<f64>) -> io::Result<()> {
        writeln!(self.out, "{}", ring.0.len())?;
        for coord in &ring.0 {
            self.coord(*coord)?;
        }
        Ok(())
    }

    fn coord(&mut self, coord: Coord<f64>) -> io::Result<()> {
        match self.options.coordinate_precision {
            Some(decimals) => writeln!(
                self.out,
                "{:.*},{:.*}",
                decimals, coord.x, decimals, coord.y
            ),
            None => writeln!(self.out, "{},{}", coord.x, coord.y),
        }
    }

    fn attributes(&mut self, metadata: &VctMetadata, store: &FeatureStore) -> io::Result<()> {
        writeln!(self.out, "AttributeBegin")?;
        writeln!(self.out, "{}", metadata.feature_class.attribute_table_name)?;
        // Rows need a geometry record to attach to on read.
        if store.geometry_kind() == GeometryKind::Unknown {
            if store.feature_count() > 0 {
                log::warn!(
                    "dropping {} attribute rows of a document with no geometry kind",
                    store.feature_count()
                );
            }
        } else {
            for feature in store.features() {
                write!(self.out, "{}", feature.id)?;
                for value in &feature.attributes {
                    write!(self.out, ",{value}")?;
                }
                writeln!(self.out)?;
            }
        }
        writeln!(self.out, "TableEnd")?;
        writeln!(self.out, "AttributeEnd")
    }
}

#[cfg(test)]
mod tests {
    use super::{field_line, write_document};
    use crate::Result;
    use crate::options::VctOptions;
    use crate::types::{FeatureClass, FieldSpec, FieldType, GeometryKind, Value};
    use crate::vct::reader::read_document;
    use crate::vct::{FeatureStore, VctFeature, VctMetadata};
    use geo_types::{MultiPoint, Point, polygon};

    fn render(metadata: &VctMetadata, store: &FeatureStore, options: &VctOptions) -> Result<String> {
        let mut buf = Vec::new();
        write_document(&mut buf, metadata, store, options)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    #[test]
    fn field_lines_keep_length_and_precision() {
        assert_eq!(field_line(&FieldSpec::new("name", FieldType::Varchar)), "name,Varchar");
        assert_eq!(
            field_line(&FieldSpec::new("code", FieldType::Char).with_length(8, -1)),
            "code,Char,8"
        );
        assert_eq!(
            field_line(&FieldSpec::new("area", FieldType::Double)),
            "area,Double,-1,-1"
        );
        assert_eq!(
            field_line(&FieldSpec::new("area", FieldType::Double).with_length(12, 3)),
            "area,Double,12,3"
        );
    }

    #[test]
    fn writes_point_document() -> Result<()> {
        let metadata = VctMetadata {
            head_lines: vec!["DataMark:CNSDTF-VCT".to_string()],
            feature_class: FeatureClass::new("1001", "Wells", GeometryKind::Point, "WELLS"),
            ..Default::default()
        };
        let mut store = FeatureStore::new(
            GeometryKind::Point,
            vec![FieldSpec::new("name", FieldType::Varchar)],
        );
        store.add_features([
            VctFeature::new(Point::new(1.5, 2.0), [Value::from("north")])?,
            VctFeature::new(
                MultiPoint::from(vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)]),
                [Value::Null],
            )?,
        ]);

        let text = render(&metadata, &store, &VctOptions::default())?;
        let expected = "\
HeadBegin
DataMark:CNSDTF-VCT
HeadEnd
FeatureCodeBegin
1001,Wells,Point,WELLS
FeatureCodeEnd
TableStructureBegin
WELLS,1
name,Varchar
0
TableStructureEnd
PointBegin
1
1001
1001
1
1.5,2
0

2
1001
1001
4
2
0,0
3,4
0

PointEnd
LineBegin
LineEnd
PolygonBegin
PolygonEnd
AnnotationBegin
AnnotationEnd
AttributeBegin
WELLS
1,north
2,
TableEnd
AttributeEnd
";
        assert_eq!(text, expected);
        Ok(())
    }

    #[test]
    fn fixed_coordinate_precision() -> Result<()> {
        let metadata = VctMetadata {
            feature_class: FeatureClass::new("1", "P", GeometryKind::Point, "P"),
            ..Default::default()
        };
        let mut store = FeatureStore::new(GeometryKind::Point, Vec::new());
        store.add_features([VctFeature::new(Point::new(1.0, 2.125), Vec::new())?]);
        let text = render(
            &metadata,
            &store,
            &VctOptions::default().with_coordinate_precision(2),
        )?;
        assert!(text.contains("\n1.00,2.12\n") || text.contains("\n1.00,2.13\n"));
        Ok(())
    }

    #[test]
    fn polygon_with_hole_reads_back() -> Result<()> {
        let metadata = VctMetadata {
            feature_class: FeatureClass::new("3001", "Parcels", GeometryKind::Polygon, "PARCELS"),
            ..Default::default()
        };
        let mut store = FeatureStore::new(GeometryKind::Polygon, Vec::new());
        let poly = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 8.0, y: 0.0), (x: 8.0, y: 8.0), (x: 0.0, y: 0.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 1.0)]]
        );
        store.add_features([VctFeature::new(poly, Vec::new())?]);
        store.add_features([VctFeature::without_geometry(Vec::new())]);

        let text = render(&metadata, &store, &VctOptions::default())?;
        assert!(text.contains("\n1\n0.0,0.0\n1\n11\n4\n"));

        let (read_metadata, read_store) = read_document(&text)?;
        assert_eq!(read_metadata.feature_class, metadata.feature_class);
        assert_eq!(
            read_store.feature(1).and_then(|f| f.geometry()),
            store.feature(1).and_then(|f| f.geometry())
        );
        assert_eq!(read_store.feature(2).and_then(|f| f.geometry()), None);
        Ok(())
    }
}
