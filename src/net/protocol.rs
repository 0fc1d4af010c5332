use serde::{Deserialize, Serialize};

/// Priority of printed text; clients filter below their message level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintLevel {
    Low,
    Medium,
    High,
    Chat,
}

/// Control messages from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Text for the client's console
    Print { level: PrintLevel, text: String },
    /// A serverinfo key changed
    ServerInfo { key: String, value: String },
    /// Level change in progress; show the transition screen
    Changing,
    /// New level is loaded; re-establish the session
    Reconnect,
    /// Connection is being closed by the server
    Disconnect,
}

impl ServerMessage {
    pub fn print(level: PrintLevel, text: impl Into<String>) -> Self {
        ServerMessage::Print {
            level,
            text: text.into(),
        }
    }
}

/// Encode a batch of messages as one datagram payload
/// Uses legacy config for fixed-size integers
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    bincode::serde::encode_to_vec(message, bincode::config::legacy())
        .map_err(|e| EncodeError(e.to_string()))
}

/// Decode a datagram payload
pub fn decode<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, DecodeError> {
    bincode::serde::decode_from_slice(data, bincode::config::legacy())
        .map(|(msg, _)| msg)
        .map_err(|e| DecodeError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("Encode error: {0}")]
pub struct EncodeError(String);

#[derive(Debug, thiserror::Error)]
#[error("Decode error: {0}")]
pub struct DecodeError(String);
