use super::{RegisterDefinition, RegisterKind, RegisterTable};
use lazy_static::lazy_static;

lazy_static! {
    pub static ref STANDARD_REGISTERS: RegisterTable = RegisterTable {
        definitions: get_standard_definitions(),
    };
}

pub fn get_standard_definitions() -> Vec<RegisterDefinition> {
    let mut definitions = Vec::new();

    // Energy registers
    definitions.push(definition("01 01 01 08 00 FF", RegisterKind::ActiveEnergyImported));
    definitions.push(definition("00 00 01 00 00 FF", RegisterKind::Timestamp));
    definitions.push(definition("01 01 03 08 00 FF", RegisterKind::ReactiveEnergyImported));
    definitions.push(definition("01 01 02 08 00 FF", RegisterKind::ActiveEnergyExported));
    definitions.push(definition("01 01 04 08 00 FF", RegisterKind::ReactiveEnergyExported));

    // Power factor and frequency
    definitions.push(definition("01 01 0D 07 00 FF", RegisterKind::PowerFactor));
    definitions.push(definition("01 01 0E 07 00 FF", RegisterKind::Frequency));

    // Voltage measurements
    definitions.push(definition("01 01 20 07 00 FF", RegisterKind::VoltageL1));
    definitions.push(definition("01 01 34 07 00 FF", RegisterKind::VoltageL2));
    definitions.push(definition("01 01 48 07 00 FF", RegisterKind::VoltageL3));

    // Current measurements
    definitions.push(definition("01 01 1F 07 00 FF", RegisterKind::CurrentL1));
    definitions.push(definition("01 01 33 07 00 FF", RegisterKind::CurrentL2));
    definitions.push(definition("01 01 47 07 00 FF", RegisterKind::CurrentL3));

    definitions
}

fn definition(marker: &str, register: RegisterKind) -> RegisterDefinition {
    RegisterDefinition {
        marker: marker.to_string(),
        register,
    }
}
