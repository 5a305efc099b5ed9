use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::dto::validation::validate_player_name;

#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
/// Messages accepted from player WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the room under a display name.
    Join {
        /// Name shown to the room.
        player_name: String,
    },
    /// Resume a previously issued player identity.
    Reconnect {
        /// Id returned by an earlier `joined` reply.
        player_id: String,
    },
    /// Submit a guess for the current round.
    Guess {
        /// Id of the player bound to the socket.
        player_id: String,
        /// Free text matched against title and artist.
        guess: String,
    },
}

/// Why an inbound frame was rejected.
#[derive(Debug, Error)]
pub enum ClientMessageError {
    /// Not a JSON object of a known message type.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The join name failed validation.
    #[error("invalid player name: {0}")]
    InvalidName(validator::ValidationError),
}

impl ClientMessage {
    /// Parse and validate a text frame.
    pub fn from_json_str(text: &str) -> Result<Self, ClientMessageError> {
        let message: ClientMessage = serde_json::from_str(text)?;
        if let ClientMessage::Join { player_name } = &message {
            validate_player_name(player_name).map_err(ClientMessageError::InvalidName)?;
        }
        Ok(message)
    }
}
