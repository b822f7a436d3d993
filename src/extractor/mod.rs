use crate::registers::{RegisterKind, RegisterTable};
use log::{debug, info};
use std::collections::BTreeMap;
use thiserror::Error;

pub mod line_parser;
pub mod structs;

pub use structs::{Reading, ReadingSet, RegisterLine};

#[derive(Error, Debug, PartialEq)]
pub enum ExtractError {
    #[error("Register {register} (marker {marker}) not found in log")]
    MissingRegister { marker: String, register: RegisterKind },
    #[error("Line for marker {marker} has fewer than 5 fields: '{line}'")]
    MalformedLine { line: String, marker: String },
    #[error("Register {register} (marker {marker}) appears more than once in log")]
    DuplicateRegister { marker: String, register: RegisterKind },
    #[error("Field {field} of marker {marker} is not an integer: '{value}'")]
    InvalidNumber { marker: String, field: usize, value: String },
}

/// Matches every line against the register table and decodes one snapshot.
///
/// Each marker of the table has to be found exactly once; the result does not depend
/// on the order of the lines.
pub fn extract_readings<'a, I>(lines: I, table: &RegisterTable) -> Result<ReadingSet, ExtractError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matched: BTreeMap<RegisterKind, RegisterLine> = BTreeMap::new();

    for line in lines {
        let def = match table.match_line(line) {
            Some(def) => def,
            None => continue,
        };

        if matched.contains_key(&def.register) {
            return Err(ExtractError::DuplicateRegister {
                marker: def.marker.clone(),
                register: def.register,
            });
        }

        let register_line = line_parser::parse_register_line(line, def)?;
        matched.insert(def.register, register_line);
    }

    for def in table.definitions() {
        if !matched.contains_key(&def.register) {
            return Err(ExtractError::MissingRegister {
                marker: def.marker.clone(),
                register: def.register,
            });
        }
    }

    let mut readings = BTreeMap::new();
    let mut timestamp = String::new();

    for (register, line) in matched.iter() {
        if *register == RegisterKind::Timestamp {
            timestamp = line.field(line_parser::MAGNITUDE_FIELD).unwrap_or_default().to_string();
            continue;
        }

        let magnitude = line_parser::parse_integer_field(line, line_parser::MAGNITUDE_FIELD)?;
        let scale = line_parser::parse_integer_field(line, line_parser::SCALE_FIELD)?;
        debug!("{}: magnitude {} scale {}", register, magnitude, scale);
        readings.insert(*register, Reading { magnitude, scale });
    }

    info!("Extracted {} registers, timestamp '{}'", readings.len(), timestamp);

    Ok(ReadingSet {
        timestamp,
        readings,
        lines: matched,
    })
}

pub fn extract_from_str(text: &str, table: &RegisterTable) -> Result<ReadingSet, ExtractError> {
    extract_readings(text.lines(), table)
}
