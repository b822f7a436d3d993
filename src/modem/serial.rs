use super::TransportError;
use crate::config::{FlowControlConfig, ParityConfig, SerialConfig};
use log::{info, warn};
use std::time::Duration;
use tokio_serial::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortBuilderExt, SerialStream, StopBits};

pub fn data_bits(bits: u8) -> DataBits {
    match bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        _ => DataBits::Eight,
    }
}

pub fn stop_bits(bits: u8) -> StopBits {
    match bits {
        2 => StopBits::Two,
        _ => StopBits::One,
    }
}

pub fn parity(parity: ParityConfig) -> Parity {
    match parity {
        ParityConfig::None => Parity::None,
        ParityConfig::Odd => Parity::Odd,
        ParityConfig::Even => Parity::Even,
    }
}

pub fn flow_control(flow: FlowControlConfig) -> FlowControl {
    match flow {
        FlowControlConfig::None => FlowControl::None,
        FlowControlConfig::Software => FlowControl::Software,
        FlowControlConfig::Hardware => FlowControl::Hardware,
    }
}

/// Opens the modem's serial device and discards anything left in its buffers.
pub fn open_serial(settings: &SerialConfig) -> Result<SerialStream, TransportError> {
    let port = tokio_serial::new(&settings.port, settings.baud_rate)
        .data_bits(data_bits(settings.data_bits))
        .parity(parity(settings.parity))
        .stop_bits(stop_bits(settings.stop_bits))
        .flow_control(flow_control(settings.flow_control))
        .timeout(Duration::from_millis(settings.timeout_ms))
        .open_native_async()
        .map_err(|source| TransportError::PortUnavailable {
            port: settings.port.clone(),
            source,
        })?;

    if let Err(e) = port.clear(ClearBuffer::All) {
        warn!("Unable to flush serial buffers of {}: {}", settings.port, e);
    }

    info!("Serial port {} open at {} baud", settings.port, settings.baud_rate);
    Ok(port)
}
