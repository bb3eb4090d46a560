//! Attribute section: one or more tables, each a table name line followed by
//! `id,value,...` rows and a `TableEnd` line.

use crate::error::{Result, VctError};
use crate::types::Value;

use super::lexer::{LineCursor, Section, parse_int};
use super::reader::ReadState;

const TABLE_END: &str = "TableEnd";

fn value_from_text(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::Text(text.to_string())
    }
}

pub(crate) fn read_attributes(section: &Section<'_>, state: &mut ReadState) -> Result<()> {
    let mut cursor = LineCursor::new(section);
    while cursor.skip_blank() {
        let table_name = cursor.next_line()?;
        log::debug!("reading attribute table {table_name}");

        loop {
            let line = cursor.next_line()?;
            if line == TABLE_END {
                break;
            }
            if line.is_empty() {
                continue;
            }

            let line_number = cursor.line_number();
            let mut values = line.split(',');
            let id = parse_int(values.next().unwrap_or_default(), line_number)?;
            let feature = state
                .features
                .get_mut(&id)
                .ok_or(VctError::UnknownFeatureId {
                    id,
                    line: line_number,
                })?;
            feature.attributes = values.map(value_from_text).collect();
        }
    }
    Ok(())
}
