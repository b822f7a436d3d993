use crate::config::{ConfigError, ConfigHolder};
use crate::encoder::{self, ChunkSequence, EncodeError, Payload};
use crate::extractor::{self, ExtractError, ReadingSet};
use crate::modem::{SigfoxModem, TransportError};
use log::{info, warn};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Unable to read log file {path}: {source}")]
    LogUnreadable { path: PathBuf, source: std::io::Error },
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
}

/// Everything derived from one log snapshot, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Uplink {
    pub readings: ReadingSet,
    pub payload: Payload,
    pub ciphertext: Option<Payload>,
    pub chunks: ChunkSequence,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub uplink: Uplink,
    pub frames_sent: usize,
}

/// Extracts, encodes, optionally encrypts and chunks one log snapshot.
pub fn prepare_uplink(holder: &ConfigHolder, log_text: &str) -> Result<Uplink, AppError> {
    let settings = &holder.config.payload;

    let readings = extractor::extract_from_str(log_text, holder.register_table())?;
    let payload = encoder::encode_payload(&readings, settings)?;
    info!("Payload {}", payload);

    let ciphertext = match holder.cipher_key() {
        Some(key) => Some(encoder::encrypt_payload(&payload, key)?),
        None => None,
    };

    let chunks = encoder::chunk_payload(ciphertext.as_ref().unwrap_or(&payload), settings.chunk_length)?;

    Ok(Uplink {
        readings,
        payload,
        ciphertext,
        chunks,
    })
}

/// Reads the log as bytes. Marker lines are ASCII, so undecodable bytes elsewhere are replaced.
pub fn read_log(holder: &ConfigHolder) -> Result<String, AppError> {
    let path = holder.log_file_path();
    let raw = std::fs::read(&path).map_err(|source| AppError::LogUnreadable { path, source })?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// One complete run. Nothing reaches the modem unless every earlier stage succeeded.
pub async fn run(holder: &ConfigHolder, options: &RunOptions) -> Result<RunSummary, AppError> {
    let log_text = read_log(holder)?;
    let uplink = prepare_uplink(holder, &log_text)?;

    if options.dry_run {
        info!("Dry run, {} chunks not sent", uplink.chunks.len());
        return Ok(RunSummary { uplink, frames_sent: 0 });
    }

    if uplink.chunks.is_empty() {
        warn!("Empty payload, nothing to send");
        return Ok(RunSummary { uplink, frames_sent: 0 });
    }

    let config = &holder.config;
    let mut modem = SigfoxModem::open(&config.serial, &config.transport)?;
    let frames_sent = modem.transmit(&uplink.chunks).await?;
    info!("{} frames sent to {}", frames_sent, config.serial.port);

    Ok(RunSummary { uplink, frames_sent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registers::RegisterKind;
    use crate::testdata;

    fn encrypted_config() -> Config {
        let mut config = Config::default();
        config.payload.encryption.enabled = true;
        config.payload.encryption.key = "000102030405060708090a0b0c0d0e0f".to_string();
        config.payload.encryption.iv = "0f0e0d0c0b0a09080706050403020100".to_string();
        config
    }

    #[test]
    fn test_prepare_plaintext_uplink() {
        let holder = ConfigHolder::from_config(Config::default()).unwrap();
        let uplink = prepare_uplink(&holder, &testdata::sample_log()).unwrap();

        assert_eq!(uplink.payload.as_str(), testdata::SAMPLE_PAYLOAD);
        assert!(uplink.ciphertext.is_none());
        assert_eq!(uplink.chunks.len(), 3);
        assert_eq!(uplink.chunks.concat(), testdata::SAMPLE_PAYLOAD);
    }

    #[cfg(feature = "encryption")]
    #[test]
    fn test_prepare_encrypted_uplink() {
        let holder = ConfigHolder::from_config(encrypted_config()).unwrap();
        let uplink = prepare_uplink(&holder, &testdata::sample_log()).unwrap();

        let ciphertext = uplink.ciphertext.clone().unwrap();
        assert_ne!(ciphertext, uplink.payload);
        assert_eq!(uplink.chunks.concat(), ciphertext.as_str());

        let joined = Payload::new(uplink.chunks.concat());
        let decrypted = encoder::decrypt_payload(&joined, holder.cipher_key().unwrap()).unwrap();
        assert_eq!(decrypted, uplink.payload);
    }

    #[test]
    fn test_odd_payload_cannot_be_encrypted() {
        let holder = ConfigHolder::from_config(encrypted_config()).unwrap();
        let mut lines = testdata::sample_lines();
        lines[12] = "01 01 47 07 00 FF,Current L3,505,A,-2".to_string();

        let result = prepare_uplink(&holder, &lines.join("\n"));
        assert!(matches!(result, Err(AppError::Encode(EncodeError::OddLengthPayload(69)))));
    }

    #[test]
    fn test_missing_register_produces_no_uplink() {
        let holder = ConfigHolder::from_config(Config::default()).unwrap();
        let log: Vec<String> = testdata::sample_lines()
            .into_iter()
            .filter(|l| !l.starts_with("01 01 20 07 00 FF"))
            .collect();

        match prepare_uplink(&holder, &log.join("\n")) {
            Err(AppError::Extract(ExtractError::MissingRegister { marker, register })) => {
                assert_eq!(marker, "01 01 20 07 00 FF");
                assert_eq!(register, RegisterKind::VoltageL1);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_with_unreadable_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.log_file = dir.path().join("missing.txt").display().to_string();
        let holder = ConfigHolder::from_config(config).unwrap();

        let result = run(&holder, &RunOptions { dry_run: true }).await;
        assert!(matches!(result, Err(AppError::LogUnreadable { .. })));
    }

    #[tokio::test]
    async fn test_run_skips_undecodable_noise_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("log.txt");
        let mut raw = b"Temperatur 21\xb0C,header,1,2,3\n".to_vec();
        raw.extend_from_slice(testdata::sample_log().as_bytes());
        std::fs::write(&log_path, raw).unwrap();

        let mut config = Config::default();
        config.log_file = log_path.display().to_string();
        let holder = ConfigHolder::from_config(config).unwrap();

        let summary = run(&holder, &RunOptions { dry_run: true }).await.unwrap();
        assert_eq!(summary.uplink.payload.as_str(), testdata::SAMPLE_PAYLOAD);
    }

    #[tokio::test]
    async fn test_run_fails_on_missing_port_after_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("log.txt");
        std::fs::write(&log_path, testdata::sample_log()).unwrap();

        let mut config = Config::default();
        config.log_file = log_path.display().to_string();
        config.serial.port = "/dev/does-not-exist-m2s".to_string();
        let holder = ConfigHolder::from_config(config).unwrap();

        let result = run(&holder, &RunOptions::default()).await;
        assert!(matches!(result, Err(AppError::Transport(TransportError::PortUnavailable { .. }))));
    }
}
