//! Comment, Head, FeatureCode and TableStructure sections.

use crate::conversions::{crs_from_spheroid, field_type_from_str, geometry_kind_from_str};
use crate::error::{Result, VctError};
use crate::types::{FeatureClass, FieldSpec};

use super::lexer::{LineCursor, Section, parse_coord, parse_count};
use super::reader::ReadState;

pub(crate) fn read_comment(section: &Section<'_>, state: &mut ReadState) -> Result<()> {
    let comment: String = section.lines.iter().map(|line| line.trim()).collect();
    state.metadata.comments.push(comment);
    Ok(())
}

pub(crate) fn read_head(section: &Section<'_>, state: &mut ReadState) -> Result<()> {
    let mut cursor = LineCursor::new(section);
    while cursor.skip_blank() {
        let line = cursor.next_line()?;
        let line_number = cursor.line_number();
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| VctError::MalformedLine {
                line: line_number,
                message: format!("head entry '{line}' has no ':'"),
            })?;
        state.metadata.head_lines.push(line.to_string());

        if key.contains("Spheroid") {
            let spheroid = value.split(',').next().unwrap_or_default();
            state.metadata.crs = crs_from_spheroid(spheroid);
            if state.metadata.crs.is_none() {
                log::debug!("no CRS known for spheroid '{spheroid}'");
            }
        } else if key.contains("ExtentMin") {
            let (x, y) = parse_coord(value, line_number)?;
            state.extent.min_x = x;
            state.extent.min_y = y;
        } else if key.contains("ExtentMax") {
            let (x, y) = parse_coord(value, line_number)?;
            state.extent.max_x = x;
            state.extent.max_y = y;
        }
    }
    Ok(())
}

/// The first line is `code,name,kind,table`; the remaining lines are custom
/// items kept verbatim.
pub(crate) fn read_feature_code(section: &Section<'_>, state: &mut ReadState) -> Result<()> {
    let mut cursor = LineCursor::new(section);
    let line = cursor.next_line()?;
    let values: Vec<&str> = line.split(',').collect();
    if values.len() < 4 {
        return Err(VctError::MalformedLine {
            line: cursor.line_number(),
            message: format!("feature code '{line}' needs code,name,kind,table"),
        });
    }

    let geometry_token = values[2].trim();
    state.metadata.feature_class = FeatureClass {
        type_code: values[0].to_string(),
        type_name: values[1].to_string(),
        geometry_kind: geometry_kind_from_str(geometry_token),
        geometry_token: geometry_token.to_string(),
        attribute_table_name: values[3].to_string(),
    };

    while let Ok(item) = cursor.next_line() {
        state.metadata.custom_items.push(item.to_string());
    }
    Ok(())
}

/// `tableName,fieldCount` followed by `name,type[,length[,precision]]`.
/// Lines after the declared fields are ignored.
pub(crate) fn read_table_structure(section: &Section<'_>, state: &mut ReadState) -> Result<()> {
    let mut cursor = LineCursor::new(section);
    let line = cursor.next_line()?;
    let count = line
        .split(',')
        .nth(1)
        .ok_or_else(|| VctError::MalformedLine {
            line: cursor.line_number(),
            message: format!("table structure header '{line}' needs table,count"),
        })
        .and_then(|count| parse_count(count, cursor.line_number()))?;

    let mut fields = Vec::new();
    for _ in 0..count {
        let line = cursor.next_line()?;
        fields.push(parse_field(line, cursor.line_number())?);
    }
    state.fields = fields;
    Ok(())
}

fn parse_field(line: &str, line_number: usize) -> Result<FieldSpec> {
    let values: Vec<&str> = line.split(',').map(str::trim).collect();
    if values.len() < 2 {
        return Err(VctError::MalformedLine {
            line: line_number,
            message: format!("field definition '{line}' needs name,type"),
        });
    }
    let parse_i32 = |value: &str| {
        value.parse::<i32>().map_err(|_| VctError::InvalidNumber {
            line: line_number,
            value: value.to_string(),
        })
    };

    let mut field = FieldSpec::new(values[0], field_type_from_str(values[1]));
    if let Some(length) = values.get(2).copied() {
        field.length = parse_i32(length)?;
    }
    if let Some(precision) = values.get(3).copied() {
        field.precision = parse_i32(precision)?;
    }
    Ok(field)
}
