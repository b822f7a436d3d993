use crate::encoder::cipher::CipherKey;
use crate::registers::{get_standard_definitions, RegisterDefinition, RegisterTable, RegisterTableError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_yml;
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATHS: [&str; 2] = ["config/m2s.yaml", "m2s.yaml"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to find the config on config/m2s.yaml or m2s.yaml")]
    NotFound,
    #[error("Unable to read config file {path}: {source}")]
    Unreadable { path: String, source: std::io::Error },
    #[error("Unable to parse config file: {0}")]
    Parse(#[from] serde_yml::Error),
    #[error("Invalid register table: {0}")]
    Registers(#[from] RegisterTableError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub enum ParityConfig {
    None,
    Odd,
    Even,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub enum FlowControlConfig {
    None,
    Software,
    Hardware,
}

fn serial_port_default() -> String { return "/dev/ttyUSB0".to_string() }
fn serial_baud_rate_default() -> u32 { return 9600 }
fn serial_data_bits_default() -> u8 { return 8 }
fn serial_parity_default() -> ParityConfig { return ParityConfig::None }
fn serial_stop_bits_default() -> u8 { return 1 }
fn serial_flow_control_default() -> FlowControlConfig { return FlowControlConfig::None }
fn serial_timeout_ms_default() -> u64 { return 1000 }
fn serial_write_timeout_ms_default() -> u64 { return 2000 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SerialConfig {
    #[serde(default="serial_port_default")]
    pub port: String,
    #[serde(default="serial_baud_rate_default")]
    pub baud_rate: u32,
    #[serde(default="serial_data_bits_default")]
    pub data_bits: u8,
    #[serde(default="serial_parity_default")]
    pub parity: ParityConfig,
    #[serde(default="serial_stop_bits_default")]
    pub stop_bits: u8,
    #[serde(default="serial_flow_control_default")]
    pub flow_control: FlowControlConfig,
    #[serde(default="serial_timeout_ms_default")]
    pub timeout_ms: u64,            // Reply read timeout
    #[serde(default="serial_write_timeout_ms_default")]
    pub write_timeout_ms: u64,
}

fn transport_terminator_default() -> String { return "\r".to_string() }
fn transport_command_delay_ms_default() -> u64 { return 1000 }
fn transport_frame_delay_ms_default() -> u64 { return 10000 }
fn transport_pause_every_default() -> usize { return 2 }
fn transport_pause_delay_ms_default() -> u64 { return 20000 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TransportConfig {
    #[serde(default="transport_terminator_default")]
    pub terminator: String,
    #[serde(default="transport_command_delay_ms_default")]
    pub command_delay_ms: u64,      // After AT$GI? and AT$RC
    #[serde(default="transport_frame_delay_ms_default")]
    pub frame_delay_ms: u64,        // After every AT$SF
    #[serde(default="transport_pause_every_default")]
    pub pause_every: usize,         // 0 disables the duty cycle pause
    #[serde(default="transport_pause_delay_ms_default")]
    pub pause_delay_ms: u64,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub enum MaskPolicy {
    Masked,
    Unmasked,
}

fn mask_energy_default() -> u32 { return 32 }
fn mask_instantaneous_default() -> u32 { return 16 }
fn mask_scale_default() -> u32 { return 8 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct MaskWidthConfig {
    #[serde(default="mask_energy_default")]
    pub energy: u32,
    #[serde(default="mask_instantaneous_default")]
    pub instantaneous: u32,         // Voltage, current, frequency, power factor
    #[serde(default="mask_scale_default")]
    pub scale: u32,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
pub struct EncryptionConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub key: String,                // 32 hex characters
    #[serde(default)]
    pub iv: String,                 // 32 hex characters
}

fn payload_masking_default() -> MaskPolicy { return MaskPolicy::Masked }
fn payload_mask_widths_default() -> MaskWidthConfig {
    return MaskWidthConfig {
        energy: mask_energy_default(),
        instantaneous: mask_instantaneous_default(),
        scale: mask_scale_default(),
    }
}
fn payload_timestamp_separators_default() -> String { return ":".to_string() }
fn payload_chunk_length_default() -> usize { return 24 }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PayloadConfig {
    #[serde(default="payload_masking_default")]
    pub masking: MaskPolicy,
    #[serde(default="payload_mask_widths_default")]
    pub mask_widths: MaskWidthConfig,
    #[serde(default)]
    pub timestamp_truncate: usize,  // Characters dropped from the end of the timestamp
    #[serde(default="payload_timestamp_separators_default")]
    pub timestamp_separators: String,
    #[serde(default="payload_chunk_length_default")]
    pub chunk_length: usize,
    #[serde(default)]
    pub encryption: EncryptionConfig,
}

fn log_file_default() -> String { return "log.txt".to_string() }
fn serial_default() -> SerialConfig {
    return SerialConfig {
        port: serial_port_default(),
        baud_rate: serial_baud_rate_default(),
        data_bits: serial_data_bits_default(),
        parity: serial_parity_default(),
        stop_bits: serial_stop_bits_default(),
        flow_control: serial_flow_control_default(),
        timeout_ms: serial_timeout_ms_default(),
        write_timeout_ms: serial_write_timeout_ms_default(),
    }
}
fn transport_default() -> TransportConfig {
    return TransportConfig {
        terminator: transport_terminator_default(),
        command_delay_ms: transport_command_delay_ms_default(),
        frame_delay_ms: transport_frame_delay_ms_default(),
        pause_every: transport_pause_every_default(),
        pause_delay_ms: transport_pause_delay_ms_default(),
    }
}
fn payload_default() -> PayloadConfig {
    return PayloadConfig {
        masking: payload_masking_default(),
        mask_widths: payload_mask_widths_default(),
        timestamp_truncate: 0,
        timestamp_separators: payload_timestamp_separators_default(),
        chunk_length: payload_chunk_length_default(),
        encryption: EncryptionConfig::default(),
    }
}
fn registers_default() -> Vec<RegisterDefinition> { return get_standard_definitions() }

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default="log_file_default")]
    pub log_file: String,
    #[serde(default="serial_default")]
    pub serial: SerialConfig,
    #[serde(default="transport_default")]
    pub transport: TransportConfig,
    #[serde(default="payload_default")]
    pub payload: PayloadConfig,
    #[serde(default="registers_default")]
    pub registers: Vec<RegisterDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_file: log_file_default(),
            serial: serial_default(),
            transport: transport_default(),
            payload: payload_default(),
            registers: registers_default(),
        }
    }
}

/// A validated configuration together with the values derived from it.
#[derive(Debug, Clone)]
pub struct ConfigHolder {
    pub config: Config,
    pub base_path: PathBuf,
    registers: RegisterTable,
    cipher: Option<CipherKey>,
}

impl ConfigHolder {
    /// Loads the given file, or the first of `config/m2s.yaml` and `m2s.yaml` that exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => CONFIG_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file())
                .ok_or(ConfigError::NotFound)?,
        };

        let unreadable = |source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        };
        let mut file = File::open(&path).map_err(unreadable)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(unreadable)?;

        let mut holder = Self::from_yaml(&contents)?;
        holder.base_path = path.parent().map(Path::to_path_buf).unwrap_or_default();
        info!("Configuration loaded from {}", path.display());
        return Ok(holder);
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let c: Config = serde_yml::from_str(contents)?;
        return Self::from_config(c);
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        validate(&config)?;

        let registers = RegisterTable::new(config.registers.clone())?;
        let encryption = &config.payload.encryption;
        let cipher = match encryption.enabled {
            true => Some(
                CipherKey::from_hex(&encryption.key, &encryption.iv)
                    .map_err(|e| ConfigError::Invalid(e.to_string()))?,
            ),
            false => None,
        };

        debug!("Configuration validated, encryption {}", if cipher.is_some() { "on" } else { "off" });
        return Ok(ConfigHolder {
            config,
            base_path: PathBuf::new(),
            registers,
            cipher,
        });
    }

    pub fn register_table(&self) -> &RegisterTable {
        &self.registers
    }

    pub fn cipher_key(&self) -> Option<&CipherKey> {
        self.cipher.as_ref()
    }

    /// Log file path; relative paths are taken from the directory of the config file.
    pub fn log_file_path(&self) -> PathBuf {
        self.base_path.join(&self.config.log_file)
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let payload = &config.payload;
    if payload.chunk_length == 0 {
        return Err(ConfigError::Invalid("payload.chunk_length must be at least 1".to_string()));
    }

    let widths = &payload.mask_widths;
    for (name, width) in [("energy", widths.energy), ("instantaneous", widths.instantaneous), ("scale", widths.scale)] {
        if !(1..=64).contains(&width) {
            return Err(ConfigError::Invalid(format!("mask width {name} must be within 1..=64, got {width}")));
        }
    }

    let serial = &config.serial;
    if !(5..=8).contains(&serial.data_bits) {
        return Err(ConfigError::Invalid(format!("serial.data_bits must be within 5..=8, got {}", serial.data_bits)));
    }
    if serial.stop_bits != 1 && serial.stop_bits != 2 {
        return Err(ConfigError::Invalid(format!("serial.stop_bits must be 1 or 2, got {}", serial.stop_bits)));
    }

    Ok(())
}
