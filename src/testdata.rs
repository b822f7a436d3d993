//! Reading log fixtures shared by the unit tests.

/// One well formed line per standard marker, in standard table order.
pub fn sample_lines() -> Vec<String> {
    vec![
        "01 01 01 08 00 FF,Active energy import,123456,Wh,0".to_string(),
        "00 00 01 00 00 FF,Clock,17 10 05 12 30 00,-,0".to_string(),
        "01 01 03 08 00 FF,Reactive energy import,4660,varh,0".to_string(),
        "01 01 02 08 00 FF,Active energy export,0,Wh,0".to_string(),
        "01 01 04 08 00 FF,Reactive energy export,17,varh,0".to_string(),
        "01 01 0D 07 00 FF,Power factor,950,-,-3".to_string(),
        "01 01 0E 07 00 FF,Frequency,5000,Hz,-2".to_string(),
        "01 01 20 07 00 FF,Voltage L1,2301,V,-1".to_string(),
        "01 01 34 07 00 FF,Voltage L2,2298,V,-1".to_string(),
        "01 01 48 07 00 FF,Voltage L3,2310,V,-1".to_string(),
        "01 01 1F 07 00 FF,Current L1,512,A,-2".to_string(),
        "01 01 33 07 00 FF,Current L2,498,A,-2".to_string(),
        "01 01 47 07 00 FF,Current L3,4097,A,-2".to_string(),
    ]
}

pub fn sample_log() -> String {
    sample_lines().join("\n")
}

/// Payload of `sample_log` with masking on and no timestamp truncation.
pub const SAMPLE_PAYLOAD: &str = "1710051230001e240012340001103b6fd1388fe8fdff8faff906ff200fe1f2fe1001fe";
