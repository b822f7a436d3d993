use meter2sigfox::encoder::{decrypt_payload, Payload};
use meter2sigfox::extractor::ExtractError;
use meter2sigfox::{run, AppError, ConfigHolder, RegisterKind, RunOptions};
use std::fs;
use std::path::Path;

fn log_lines(active_energy: &str, timestamp: &str) -> Vec<String> {
    vec![
        format!("01 01 01 08 00 FF,Active energy import,{},Wh,1", active_energy),
        format!("00 00 01 00 00 FF,Clock,{},-,0", timestamp),
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

fn write_setup(dir: &Path, config: &str, lines: &[String]) -> ConfigHolder {
    fs::write(dir.join("log.txt"), lines.join("\n")).unwrap();
    let config_path = dir.join("m2s.yaml");
    fs::write(&config_path, config).unwrap();
    ConfigHolder::load(Some(&config_path)).unwrap()
}

#[tokio::test]
async fn dry_run_produces_ordered_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let holder = write_setup(dir.path(), "log_file: log.txt\n", &log_lines("255", "01:02:03"));

    let summary = run(&holder, &RunOptions { dry_run: true }).await.unwrap();
    let uplink = &summary.uplink;

    assert_eq!(summary.frames_sent, 0);
    assert!(uplink.payload.as_str().starts_with("010203ff1"), "{}", uplink.payload);
    assert_eq!(uplink.readings.get(RegisterKind::ActiveEnergyImported).unwrap().magnitude, 255);
    assert_eq!(uplink.chunks.concat(), uplink.payload.as_str());
    assert_eq!(uplink.chunks.len(), (uplink.payload.len() + 23) / 24);
    for chunk in uplink.chunks.iter().take(uplink.chunks.len() - 1) {
        assert_eq!(chunk.len(), 24);
    }
}

#[tokio::test]
async fn truncated_timestamp_and_custom_chunk_length() {
    let dir = tempfile::tempdir().unwrap();
    let config = "payload:\n  timestamp_truncate: 8\n  chunk_length: 10\n";
    let holder = write_setup(dir.path(), config, &log_lines("255", "17 10 05 12 30 00 00 00 00 00"));

    let summary = run(&holder, &RunOptions { dry_run: true }).await.unwrap();
    let payload = summary.uplink.payload.as_str();

    assert!(payload.starts_with("171005123000ff1"), "{}", payload);
    assert!(summary.uplink.chunks.iter().all(|c| c.len() <= 10));
}

#[cfg(feature = "encryption")]
#[tokio::test]
async fn encrypted_chunks_decrypt_to_payload() {
    let dir = tempfile::tempdir().unwrap();
    let config = r#"
payload:
  encryption:
    enabled: true
    key: 2b7e151628aed2a6abf7158809cf4f3c
    iv: 000102030405060708090a0b0c0d0e0f
"#;
    let holder = write_setup(dir.path(), config, &log_lines("4095", "01 02 03"));

    let summary = run(&holder, &RunOptions { dry_run: true }).await.unwrap();
    let uplink = &summary.uplink;
    let ciphertext = uplink.ciphertext.as_ref().unwrap();

    assert_eq!(uplink.chunks.concat(), ciphertext.as_str());
    let decrypted = decrypt_payload(&Payload::new(uplink.chunks.concat()), holder.cipher_key().unwrap()).unwrap();
    assert_eq!(decrypted, uplink.payload);
}

#[tokio::test]
async fn missing_voltage_l1_aborts_before_transport() {
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = log_lines("255", "01:02:03")
        .into_iter()
        .filter(|l| !l.contains("01 01 20 07 00 FF"))
        .collect();
    /* an unusable port proves the run stops before the transport is touched */
    let holder = write_setup(dir.path(), "serial:\n  port: /dev/does-not-exist-m2s\n", &lines);

    let result = run(&holder, &RunOptions::default()).await;
    match result {
        Err(AppError::Extract(ExtractError::MissingRegister { marker, .. })) => {
            assert_eq!(marker, "01 01 20 07 00 FF");
        }
        other => panic!("unexpected result {:?}", other),
    }
}
