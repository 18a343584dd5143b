//! Error types for the sync layer

/// Local failures of a sync operation; surfaced to the user as warnings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("no active match")]
    NoActiveMatch,
    #[error("a rematch request is already pending")]
    RematchPending,
    #[error("no piece of yours left to carry the signal")]
    NoFriendlyPiece,
    #[error("could not encode message: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Encode(err.to_string())
    }
}

/// Category of an error reported by the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelErrorKind {
    /// The lobby is gone; return to a neutral state
    LobbyNotFound,
    /// Anything else, shown as a notice
    Other(String),
}

/// Sort a channel error message into a [`ChannelErrorKind`]
///
/// Matching is case-insensitive and also recognises the Russian wording used
/// by older relays.
pub fn classify_channel_error(message: &str) -> ChannelErrorKind {
    let lower = message.to_lowercase();
    if lower.contains("лобби не найден") || lower.contains("not found") {
        ChannelErrorKind::LobbyNotFound
    } else {
        ChannelErrorKind::Other(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lobby_not_found_variants() {
        assert_eq!(classify_channel_error("lobby not found"), ChannelErrorKind::LobbyNotFound);
        assert_eq!(classify_channel_error("Lobby Not Found"), ChannelErrorKind::LobbyNotFound);
        assert_eq!(classify_channel_error("Лобби не найдено"), ChannelErrorKind::LobbyNotFound);
    }

    #[test]
    fn test_other_errors_keep_message() {
        assert_eq!(
            classify_channel_error("lobby is full"),
            ChannelErrorKind::Other("lobby is full".to_string())
        );
    }

    #[test]
    fn test_sync_error_display() {
        assert_eq!(SyncError::NoActiveMatch.to_string(), "no active match");
        assert_eq!(
            SyncError::RematchPending.to_string(),
            "a rematch request is already pending"
        );
    }
}
