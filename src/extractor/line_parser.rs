use super::{structs::RegisterLine, ExtractError};
use crate::obis_utils;
use crate::registers::RegisterDefinition;
use log::debug;

pub const MAGNITUDE_FIELD: usize = 2;
pub const SCALE_FIELD: usize = 4;
pub const MIN_FIELDS: usize = 5;

pub fn parse_register_line(line: &str, def: &RegisterDefinition) -> Result<RegisterLine, ExtractError> {
    // Example format:
    // 01 01 20 07 00 FF,Voltage L1,2301,V,255

    let fields: Vec<String> = line.split(',').map(|f| f.to_string()).collect();

    if fields.len() < MIN_FIELDS {
        return Err(ExtractError::MalformedLine {
            line: line.to_string(),
            marker: def.marker.clone(),
        });
    }

    debug!(
        "Matched {} ({}) on {} with {} fields",
        def.register,
        obis_utils::get_obis_description(&def.marker).unwrap_or("custom marker"),
        obis_utils::to_reduced_obis(&def.marker).unwrap_or_else(|| def.marker.clone()),
        fields.len()
    );

    Ok(RegisterLine {
        marker: def.marker.clone(),
        register: def.register,
        fields,
    })
}

/// Reads a decimal integer field, tolerating surrounding whitespace and a sign.
pub fn parse_integer_field(line: &RegisterLine, index: usize) -> Result<i128, ExtractError> {
    let raw = line.field(index).unwrap_or_default();

    raw.trim().parse::<i128>().map_err(|_| ExtractError::InvalidNumber {
        marker: line.marker.clone(),
        field: index,
        value: raw.to_string(),
    })
}
