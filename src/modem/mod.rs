use crate::config::{SerialConfig, TransportConfig};
use crate::encoder::ChunkSequence;
use log::{debug, info, warn};
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{sleep, timeout};
use tokio_serial::SerialStream;

pub mod commands;
pub mod serial;

pub use commands::AtCommand;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Serial port {port} unavailable: {source}")]
    PortUnavailable { port: String, source: tokio_serial::Error },
    #[error("Sending {command} failed: {source}")]
    TransmissionFailure { command: String, source: io::Error },
}

/// Delays and timeouts of one uplink session.
#[derive(Debug, Clone, PartialEq)]
pub struct ModemTiming {
    pub terminator: String,
    pub command_delay: Duration,
    pub frame_delay: Duration,
    pub pause_every: usize,
    pub pause_delay: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl ModemTiming {
    pub fn from_config(serial: &SerialConfig, transport: &TransportConfig) -> Self {
        ModemTiming {
            terminator: transport.terminator.clone(),
            command_delay: Duration::from_millis(transport.command_delay_ms),
            frame_delay: Duration::from_millis(transport.frame_delay_ms),
            pause_every: transport.pause_every,
            pause_delay: Duration::from_millis(transport.pause_delay_ms),
            read_timeout: Duration::from_millis(serial.timeout_ms),
            write_timeout: Duration::from_millis(serial.write_timeout_ms),
        }
    }
}

/// AT command session with a Sigfox modem over any byte stream.
pub struct SigfoxModem<P> {
    port: P,
    timing: ModemTiming,
}

impl SigfoxModem<SerialStream> {
    pub fn open(serial: &SerialConfig, transport: &TransportConfig) -> Result<Self, TransportError> {
        let port = serial::open_serial(serial)?;
        Ok(SigfoxModem::new(port, ModemTiming::from_config(serial, transport)))
    }
}

impl<P> SigfoxModem<P>
where
    P: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(port: P, timing: ModemTiming) -> Self {
        SigfoxModem { port, timing }
    }

    pub fn into_inner(self) -> P {
        self.port
    }

    /// Sends every chunk as one frame, in order. Each frame is preceded by `AT$GI?` and
    /// `AT$RC`; after every `pause_every` frames the session waits `pause_delay`.
    pub async fn transmit(&mut self, chunks: &ChunkSequence) -> Result<usize, TransportError> {
        let total = chunks.len();
        let mut sent = 0;

        for chunk in chunks.iter() {
            if sent > 0 && self.timing.pause_every > 0 && sent % self.timing.pause_every == 0 {
                info!("{} frames sent, pausing {:?}", sent, self.timing.pause_delay);
                sleep(self.timing.pause_delay).await;
            }

            self.send_command(&AtCommand::GetInfo).await?;
            sleep(self.timing.command_delay).await;
            self.send_command(&AtCommand::ResetChannel).await?;
            sleep(self.timing.command_delay).await;

            let reply = self.send_command(&AtCommand::SendFrame(chunk)).await?;
            sent += 1;
            info!(
                "Frame {}/{} '{}' sent, modem answered {:?}",
                sent,
                total,
                chunk,
                reply.as_deref().map(str::trim).unwrap_or("nothing")
            );

            if sent < total {
                sleep(self.timing.frame_delay).await;
            }
        }

        Ok(sent)
    }

    async fn send_command(&mut self, command: &AtCommand<'_>) -> Result<Option<String>, TransportError> {
        let failure = |source| TransportError::TransmissionFailure {
            command: command.to_string(),
            source,
        };

        let bytes = command.encode(&self.timing.terminator);
        debug!("-> {}", command);

        let port = &mut self.port;
        let write = async {
            port.write_all(&bytes).await?;
            port.flush().await
        };
        match timeout(self.timing.write_timeout, write).await {
            Ok(result) => result.map_err(failure)?,
            Err(_) => return Err(failure(io::Error::new(io::ErrorKind::TimedOut, "write timed out"))),
        }

        let reply = self.read_reply().await.map_err(failure)?;
        if let Some(text) = &reply {
            if commands::is_error_reply(text) {
                warn!("Modem rejected {}: {}", command, text.trim());
            } else {
                debug!("<- {}", text.trim());
            }
        }
        Ok(reply)
    }

    /// Whatever the modem answered within the read timeout, if anything.
    async fn read_reply(&mut self) -> io::Result<Option<String>> {
        let mut buf = [0u8; 256];
        match timeout(self.timing.read_timeout, self.port.read(&mut buf)).await {
            Err(_) => Ok(None),
            Ok(Ok(0)) => Ok(None),
            Ok(Ok(n)) => Ok(Some(String::from_utf8_lossy(&buf[..n]).into_owned())),
            Ok(Err(e)) => Err(e),
        }
    }
}
