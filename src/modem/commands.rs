use std::fmt;

/// The AT commands of a Sigfox uplink session.
#[derive(Debug, Clone, PartialEq)]
pub enum AtCommand<'a> {
    /// `AT$GI?`, channel information
    GetInfo,
    /// `AT$RC`, reset macro channel
    ResetChannel,
    /// `AT$SF=<hex>`, send frame
    SendFrame(&'a str),
}

impl AtCommand<'_> {
    pub fn text(&self) -> String {
        match self {
            AtCommand::GetInfo => "AT$GI?".to_string(),
            AtCommand::ResetChannel => "AT$RC".to_string(),
            AtCommand::SendFrame(chunk) => format!("AT$SF={}", chunk),
        }
    }

    pub fn encode(&self, terminator: &str) -> Vec<u8> {
        format!("{}{}", self.text(), terminator).into_bytes()
    }
}

impl fmt::Display for AtCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

pub fn is_error_reply(reply: &str) -> bool {
    reply.to_uppercase().contains("ERROR")
}
