use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /* Six hex bytes separated by single spaces, e.g. "01 01 20 07 00 FF" */
    static ref MARKER_FORMAT: Regex = Regex::new(r"^[0-9A-F]{2}( [0-9A-F]{2}){5}$").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

pub fn get_obis_description(marker: &str) -> Option<&'static str> {
    let descriptions = get_standard_obis_descriptions();
    descriptions.get(normalize_marker(marker).as_str()).copied()
}

pub fn get_standard_obis_descriptions() -> HashMap<&'static str, &'static str> {
    let mut map = HashMap::new();

    // Energy values
    map.insert("01 01 01 08 00 FF", "Active energy + (total)");
    map.insert("01 01 02 08 00 FF", "Active energy - (total)");
    map.insert("01 01 03 08 00 FF", "Reactive energy + (total)");
    map.insert("01 01 04 08 00 FF", "Reactive energy - (total)");

    // Power factor and frequency
    map.insert("01 01 0D 07 00 FF", "Power factor");
    map.insert("01 01 0E 07 00 FF", "Supply frequency");

    // Voltage values
    map.insert("01 01 20 07 00 FF", "Voltage (L1)");
    map.insert("01 01 34 07 00 FF", "Voltage (L2)");
    map.insert("01 01 48 07 00 FF", "Voltage (L3)");

    // Current values
    map.insert("01 01 1F 07 00 FF", "Current (L1)");
    map.insert("01 01 33 07 00 FF", "Current (L2)");
    map.insert("01 01 47 07 00 FF", "Current (L3)");

    // Clock
    map.insert("00 00 01 00 00 FF", "Date and time");

    map
}

/// Brings a marker into the canonical "01 01 20 07 00 FF" spelling.
pub fn normalize_marker(marker: &str) -> String {
    WHITESPACE.replace_all(marker.trim(), " ").to_uppercase()
}

pub fn validate_marker(marker: &str) -> bool {
    MARKER_FORMAT.is_match(marker)
}

pub fn marker_bytes(marker: &str) -> Option<[u8; 6]> {
    let normalized = normalize_marker(marker);
    if !validate_marker(&normalized) {
        return None;
    }

    let decoded = hex::decode(normalized.replace(' ', "")).ok()?;
    let mut bytes = [0u8; 6];
    bytes.copy_from_slice(&decoded);
    Some(bytes)
}

/// Renders a hex marker in the reduced A-B:C.D.E*F notation used on meter displays,
/// e.g. "01 01 20 07 00 FF" becomes "1-1:32.7.0*255".
pub fn to_reduced_obis(marker: &str) -> Option<String> {
    let b = marker_bytes(marker)?;
    Some(format!("{}-{}:{}.{}.{}*{}", b[0], b[1], b[2], b[3], b[4], b[5]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_marker() {
        assert!(validate_marker("01 01 01 08 00 FF"));
        assert!(validate_marker("00 00 01 00 00 FF"));
        assert!(!validate_marker("01 01 01 08 00"));
        assert!(!validate_marker("01-01-01-08-00-FF"));
        assert!(!validate_marker("01 01 01 08 00 ff"));
        assert!(!validate_marker("invalid"));
    }

    #[test]
    fn test_normalize_marker() {
        assert_eq!(normalize_marker("  01 01 1f  07 00 ff "), "01 01 1F 07 00 FF");
        assert_eq!(normalize_marker("01\t01 20 07 00 FF"), "01 01 20 07 00 FF");
    }

    #[test]
    fn test_to_reduced_obis() {
        assert_eq!(to_reduced_obis("01 01 20 07 00 FF"), Some("1-1:32.7.0*255".to_string()));
        assert_eq!(to_reduced_obis("00 00 01 00 00 FF"), Some("0-0:1.0.0*255".to_string()));
        assert_eq!(to_reduced_obis("01 01 20"), None);
    }

    #[test]
    fn test_get_obis_description() {
        assert_eq!(get_obis_description("01 01 20 07 00 FF"), Some("Voltage (L1)"));
        assert_eq!(get_obis_description("01 01 0e 07 00 ff"), Some("Supply frequency"));
        assert_eq!(get_obis_description("01 01 99 07 00 FF"), None);
    }
}
