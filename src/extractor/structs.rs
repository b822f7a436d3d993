use crate::registers::RegisterKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// A matched log line with all of its comma separated fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterLine {
    pub marker: String,
    pub register: RegisterKind,
    pub fields: Vec<String>,
}

impl RegisterLine {
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|f| f.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub magnitude: i128,
    pub scale: i128,
}

/// Decoded values of one log snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingSet {
    pub timestamp: String,
    pub readings: BTreeMap<RegisterKind, Reading>,
    #[serde(skip)]
    pub lines: BTreeMap<RegisterKind, RegisterLine>,
}

impl ReadingSet {
    pub fn get(&self, register: RegisterKind) -> Option<&Reading> {
        self.readings.get(&register)
    }

    pub fn line(&self, register: RegisterKind) -> Option<&RegisterLine> {
        self.lines.get(&register)
    }
}
