use crate::obis_utils;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod definitions;

pub use definitions::{get_standard_definitions, STANDARD_REGISTERS};

/// The registers a reading log carries, one variant per semantic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterKind {
    ActiveEnergyImported,
    Timestamp,
    ReactiveEnergyImported,
    ActiveEnergyExported,
    ReactiveEnergyExported,
    PowerFactor,
    Frequency,
    VoltageL1,
    VoltageL2,
    VoltageL3,
    CurrentL1,
    CurrentL2,
    CurrentL3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterClass {
    Energy,
    Instantaneous,
    Timestamp,
}

impl RegisterKind {
    pub const ALL: [RegisterKind; 13] = [
        RegisterKind::ActiveEnergyImported,
        RegisterKind::Timestamp,
        RegisterKind::ReactiveEnergyImported,
        RegisterKind::ActiveEnergyExported,
        RegisterKind::ReactiveEnergyExported,
        RegisterKind::PowerFactor,
        RegisterKind::Frequency,
        RegisterKind::VoltageL1,
        RegisterKind::VoltageL2,
        RegisterKind::VoltageL3,
        RegisterKind::CurrentL1,
        RegisterKind::CurrentL2,
        RegisterKind::CurrentL3,
    ];

    /// Numeric registers in the order they follow the timestamp in the payload.
    pub const PAYLOAD_ORDER: [RegisterKind; 12] = [
        RegisterKind::ActiveEnergyImported,
        RegisterKind::ReactiveEnergyImported,
        RegisterKind::ActiveEnergyExported,
        RegisterKind::ReactiveEnergyExported,
        RegisterKind::PowerFactor,
        RegisterKind::Frequency,
        RegisterKind::VoltageL1,
        RegisterKind::VoltageL2,
        RegisterKind::VoltageL3,
        RegisterKind::CurrentL1,
        RegisterKind::CurrentL2,
        RegisterKind::CurrentL3,
    ];

    pub fn class(&self) -> RegisterClass {
        match self {
            RegisterKind::ActiveEnergyImported
            | RegisterKind::ReactiveEnergyImported
            | RegisterKind::ActiveEnergyExported
            | RegisterKind::ReactiveEnergyExported => RegisterClass::Energy,
            RegisterKind::Timestamp => RegisterClass::Timestamp,
            _ => RegisterClass::Instantaneous,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RegisterKind::ActiveEnergyImported => "active_energy_imported",
            RegisterKind::Timestamp => "timestamp",
            RegisterKind::ReactiveEnergyImported => "reactive_energy_imported",
            RegisterKind::ActiveEnergyExported => "active_energy_exported",
            RegisterKind::ReactiveEnergyExported => "reactive_energy_exported",
            RegisterKind::PowerFactor => "power_factor",
            RegisterKind::Frequency => "frequency",
            RegisterKind::VoltageL1 => "voltage_l1",
            RegisterKind::VoltageL2 => "voltage_l2",
            RegisterKind::VoltageL3 => "voltage_l3",
            RegisterKind::CurrentL1 => "current_l1",
            RegisterKind::CurrentL2 => "current_l2",
            RegisterKind::CurrentL3 => "current_l3",
        }
    }
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterDefinition {
    pub marker: String,
    pub register: RegisterKind,
}

#[derive(Error, Debug, PartialEq)]
pub enum RegisterTableError {
    #[error("Invalid OBIS marker '{0}'")]
    InvalidMarker(String),
    #[error("OBIS marker '{0}' is mapped more than once")]
    DuplicateMarker(String),
    #[error("Register {0} is mapped more than once")]
    DuplicateRegister(RegisterKind),
    #[error("Register {0} has no OBIS marker")]
    MissingRegister(RegisterKind),
}

/// Marker to register mapping used to dispatch log lines.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterTable {
    definitions: Vec<RegisterDefinition>,
}

impl RegisterTable {
    pub fn standard() -> Self {
        STANDARD_REGISTERS.clone()
    }

    /// Builds a table from configured definitions. Markers are normalized and every
    /// register has to be mapped to exactly one distinct marker.
    pub fn new(definitions: Vec<RegisterDefinition>) -> Result<Self, RegisterTableError> {
        let mut normalized: Vec<RegisterDefinition> = Vec::with_capacity(definitions.len());

        for def in definitions {
            let marker = obis_utils::normalize_marker(&def.marker);
            if !obis_utils::validate_marker(&marker) {
                return Err(RegisterTableError::InvalidMarker(def.marker));
            }
            if normalized.iter().any(|d| d.marker == marker) {
                return Err(RegisterTableError::DuplicateMarker(marker));
            }
            if normalized.iter().any(|d| d.register == def.register) {
                return Err(RegisterTableError::DuplicateRegister(def.register));
            }
            normalized.push(RegisterDefinition { marker, register: def.register });
        }

        for kind in RegisterKind::ALL {
            if !normalized.iter().any(|d| d.register == kind) {
                return Err(RegisterTableError::MissingRegister(kind));
            }
        }

        debug!("Register table with {} markers ready", normalized.len());
        Ok(RegisterTable { definitions: normalized })
    }

    pub fn definitions(&self) -> &[RegisterDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// First definition whose marker occurs in the line.
    pub fn match_line(&self, line: &str) -> Option<&RegisterDefinition> {
        self.definitions.iter().find(|d| line.contains(d.marker.as_str()))
    }

    pub fn marker_for(&self, kind: RegisterKind) -> Option<&str> {
        self.definitions
            .iter()
            .find(|d| d.register == kind)
            .map(|d| d.marker.as_str())
    }
}
