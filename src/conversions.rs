use crate::types::{Crs, FieldType, GeometryKind};

#[inline]
pub(crate) fn field_type_to_str(field_type: &FieldType) -> &str {
    match field_type {
        FieldType::Char => "Char",
        FieldType::Varchar => "Varchar",
        FieldType::Int => "Int",
        FieldType::Float => "Float",
        FieldType::Double => "Double",
        FieldType::Date => "Date",
        FieldType::Time => "Time",
        FieldType::Datetime => "Datetime",
        FieldType::Varbin => "Varbin",
        FieldType::Other(token) => token,
    }
}

/// Map a table-structure type token. Every token containing `Int`
/// (`Int1`, `Int2`, `Int4`, `Int8`, ...) is the integer type.
#[inline]
pub(crate) fn field_type_from_str(field_type_str: &str) -> FieldType {
    let s = field_type_str.trim();
    if s.contains("Int") {
        return FieldType::Int;
    }
    match s {
        "Char" => FieldType::Char,
        "Varchar" => FieldType::Varchar,
        "Float" => FieldType::Float,
        "Double" => FieldType::Double,
        "Date" => FieldType::Date,
        "Time" => FieldType::Time,
        "Datetime" => FieldType::Datetime,
        "Varbin" => FieldType::Varbin,
        _ => FieldType::Other(s.to_string()),
    }
}

/// Map the feature-code geometry token by substring, in the order the
/// format's kinds are checked.
#[inline]
pub(crate) fn geometry_kind_from_str(token: &str) -> GeometryKind {
    if token.contains("Point") {
        GeometryKind::Point
    } else if token.contains("Line") {
        GeometryKind::Line
    } else if token.contains("Polygon") {
        GeometryKind::Polygon
    } else {
        GeometryKind::Unknown
    }
}

// Spheroid names as they appear in the Head section, and the CRS they resolve to.
const SPHEROID_CRS: &[(&str, Crs)] = &[
    (
        "中国2000国家大地",
        Crs {
            authority: "EPSG",
            code: 4526,
        },
    ),
    (
        "克拉索夫斯基(1940)",
        Crs {
            authority: "EPSG",
            code: 4024,
        },
    ),
];

#[inline]
pub(crate) fn crs_from_spheroid(spheroid: &str) -> Option<Crs> {
    SPHEROID_CRS
        .iter()
        .find(|(name, _)| spheroid.contains(name))
        .map(|(_, crs)| *crs)
}

#[cfg(test)]
mod tests {
    use super::{crs_from_spheroid, field_type_from_str, field_type_to_str, geometry_kind_from_str};
    use crate::types::{FieldType, GeometryKind};

    #[test]
    fn int_tokens_normalize() {
        assert_eq!(field_type_from_str("Int4"), FieldType::Int);
        assert_eq!(field_type_from_str("Int8"), FieldType::Int);
        assert_eq!(field_type_from_str("Double"), FieldType::Double);
        assert_eq!(
            field_type_from_str("Numeric"),
            FieldType::Other("Numeric".to_string())
        );
        assert_eq!(field_type_to_str(&FieldType::Other("Numeric".into())), "Numeric");
    }

    #[test]
    fn geometry_kind_matches_by_substring() {
        assert_eq!(geometry_kind_from_str("Point"), GeometryKind::Point);
        assert_eq!(geometry_kind_from_str("MultiLine"), GeometryKind::Line);
        assert_eq!(geometry_kind_from_str(" Polygon"), GeometryKind::Polygon);
        assert_eq!(geometry_kind_from_str("Solid"), GeometryKind::Unknown);
    }

    #[test]
    fn spheroid_lookup() {
        let crs = crs_from_spheroid("中国2000国家大地坐标系").expect("cgcs2000");
        assert_eq!(crs.to_string(), "EPSG:4526");
        let crs = crs_from_spheroid("克拉索夫斯基(1940)").expect("krasovsky");
        assert_eq!(crs.code, 4024);
        assert!(crs_from_spheroid("WGS 84").is_none());
    }
}
