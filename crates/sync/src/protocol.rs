//! Protocol module - JSON message types for move synchronization
//!
//! Every line on the wire is one JSON object tagged by `type`. A `move`
//! carries the complete state after a commit (board, turn, winner) and the
//! receiver adopts it wholesale. Rematch signalling travels as `control`.
//! Older clients send bare move objects with no `type`; those are still
//! understood on the way in.

use serde::{Deserialize, Serialize};

use crate::core::{Board, MatchState};
use crate::types::{Piece, Player, Pos, Rank, BOARD_SIZE};

// ============== Primitives ==============

/// A player encoded as the number `1` or `2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerNumber(pub Player);

impl Serialize for PlayerNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0.number())
    }
}

impl<'de> Deserialize<'de> for PlayerNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let n = u8::deserialize(deserializer)?;
        Player::from_number(n)
            .map(PlayerNumber)
            .ok_or_else(|| serde::de::Error::custom("player must be 1 or 2"))
    }
}

impl From<Player> for PlayerNumber {
    fn from(p: Player) -> Self {
        PlayerNumber(p)
    }
}

impl From<PlayerNumber> for Player {
    fn from(p: PlayerNumber) -> Self {
        p.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RematchAction {
    Request,
    Response,
}

/// Rematch control signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RematchMarker {
    pub id: String,
    pub action: RematchAction,
    /// Identity of the sender
    pub from: String,
    /// Responses only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<bool>,
}

impl RematchMarker {
    pub fn request(id: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: RematchAction::Request,
            from: from.into(),
            accept: None,
        }
    }

    pub fn response(id: impl Into<String>, from: impl Into<String>, accept: bool) -> Self {
        Self {
            id: id.into(),
            action: RematchAction::Response,
            from: from.into(),
            accept: Some(accept),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.accept == Some(true)
    }
}

// ============== Board Snapshot ==============

/// One occupied square
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub player: PlayerNumber,
    #[serde(rename = "isKing", default)]
    pub is_king: bool,
    /// Piggybacked rematch signal, written under the key older clients read;
    /// `rematch` is accepted too
    #[serde(
        default,
        rename = "__rematch",
        skip_serializing_if = "Option::is_none",
        alias = "rematch"
    )]
    pub rematch: Option<RematchMarker>,
}

impl CellSnapshot {
    pub fn piece(&self) -> Piece {
        let rank = if self.is_king { Rank::King } else { Rank::Man };
        Piece {
            owner: self.player.0,
            rank,
        }
    }
}

impl From<Piece> for CellSnapshot {
    fn from(piece: Piece) -> Self {
        Self {
            player: PlayerNumber(piece.owner),
            is_king: piece.is_king(),
            rematch: None,
        }
    }
}

pub type SnapshotRows = [[Option<CellSnapshot>; BOARD_SIZE as usize]; BOARD_SIZE as usize];

/// 8 rows of 8 cells, each `null` or a piece
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardSnapshot {
    pub rows: SnapshotRows,
}

impl BoardSnapshot {
    pub fn from_board(board: &Board) -> Self {
        let rows = board.to_rows();
        Self {
            rows: std::array::from_fn(|r| std::array::from_fn(|c| rows[r][c].map(CellSnapshot::from))),
        }
    }

    /// The board described, markers ignored
    pub fn to_board(&self) -> Board {
        Board::from_rows(std::array::from_fn(|r| {
            std::array::from_fn(|c| self.rows[r][c].as_ref().map(CellSnapshot::piece))
        }))
    }

    pub fn get(&self, pos: Pos) -> Option<&CellSnapshot> {
        self.rows[pos.row as usize][pos.col as usize].as_ref()
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut CellSnapshot> {
        self.rows[pos.row as usize][pos.col as usize].as_mut()
    }

    /// Occupied cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Pos, &CellSnapshot)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.as_ref().map(|cell| (Pos::new(r as u8, c as u8), cell)))
        })
    }
}

// ============== Messages ==============

/// Full state after a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveMessage {
    #[serde(rename = "lobbyId")]
    pub lobby_id: String,
    pub board: BoardSnapshot,
    pub turn: PlayerNumber,
    #[serde(default)]
    pub winner: Option<PlayerNumber>,
}

impl MoveMessage {
    pub fn turn(&self) -> Player {
        self.turn.0
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner.map(Player::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "lobbyId")]
    pub lobby_id: String,
    pub signal: RematchMarker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyMessage {
    #[serde(rename = "lobbyId")]
    pub lobby_id: String,
}

/// Relay reply to a join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedMessage {
    #[serde(rename = "lobbyId")]
    pub lobby_id: String,
    pub role: PlayerNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// Every message on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    // client -> relay
    Join(LobbyMessage),
    Leave(LobbyMessage),
    // relayed verbatim
    Move(MoveMessage),
    Control(ControlMessage),
    // relay -> client
    Joined(JoinedMessage),
    GameStarted(LobbyMessage),
    PeerLeft,
    Error(ErrorMessage),
}

const KNOWN_TYPES: [&str; 8] = [
    "join",
    "leave",
    "move",
    "control",
    "joined",
    "game_started",
    "peer_left",
    "error",
];

impl Envelope {
    /// Lobby the message refers to, if it names one
    pub fn lobby_id(&self) -> Option<&str> {
        match self {
            Envelope::Join(m) | Envelope::Leave(m) | Envelope::GameStarted(m) => Some(&m.lobby_id),
            Envelope::Move(m) => Some(&m.lobby_id),
            Envelope::Control(m) => Some(&m.lobby_id),
            Envelope::Joined(m) => Some(&m.lobby_id),
            Envelope::PeerLeft | Envelope::Error(_) => None,
        }
    }

    /// Serialize as one line, without the trailing newline
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error(ErrorMessage {
            message: message.into(),
        })
    }
}

// ============== Message Parsing ==============

/// Parsed incoming line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Envelope(Envelope),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage {
    pub msg_type: String,
}

/// Parse a line received from the channel
///
/// Tagged envelopes are decoded directly; an object with no `type` is tried as
/// a legacy bare move. Unknown types are not an error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    match serde_json::from_str::<Envelope>(json) {
        Ok(env) => Ok(ParsedMessage::Envelope(env)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct TypeOnly {
                #[serde(rename = "type")]
                msg_type: Option<String>,
            }
            match serde_json::from_str::<TypeOnly>(json)?.msg_type {
                None => {
                    let legacy = serde_json::from_str::<MoveMessage>(json)?;
                    Ok(ParsedMessage::Envelope(Envelope::Move(legacy)))
                }
                Some(t) if !KNOWN_TYPES.contains(&t.as_str()) => {
                    Ok(ParsedMessage::Unknown(UnknownMessage { msg_type: t }))
                }
                Some(_) => Err(e),
            }
        }
    }
}

// ============== Utility Functions ==============

/// Message announcing the state of `state` in `lobby_id`
pub fn build_move_message(lobby_id: &str, state: &MatchState) -> MoveMessage {
    MoveMessage {
        lobby_id: lobby_id.to_string(),
        board: BoardSnapshot::from_board(state.board()),
        turn: state.turn().into(),
        winner: state.winner().map(PlayerNumber),
    }
}

pub fn create_join(lobby_id: &str) -> Envelope {
    Envelope::Join(LobbyMessage {
        lobby_id: lobby_id.to_string(),
    })
}

pub fn create_leave(lobby_id: &str) -> Envelope {
    Envelope::Leave(LobbyMessage {
        lobby_id: lobby_id.to_string(),
    })
}

pub fn create_control(lobby_id: &str, signal: RematchMarker) -> Envelope {
    Envelope::Control(ControlMessage {
        lobby_id: lobby_id.to_string(),
        signal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_wire_shape() {
        let state = MatchState::new();
        let msg = build_move_message("L1", &state);
        let json = serde_json::to_value(Envelope::Move(msg)).unwrap();

        assert_eq!(json["type"], "move");
        assert_eq!(json["lobbyId"], "L1");
        assert_eq!(json["turn"], 1);
        assert!(json["winner"].is_null());
        assert_eq!(json["board"].as_array().unwrap().len(), 8);
        assert!(json["board"][0][0].is_null());
        assert_eq!(json["board"][0][1]["player"], 2);
        assert_eq!(json["board"][0][1]["isKing"], false);
        assert!(json["board"][0][1].get("__rematch").is_none());
        assert_eq!(json["board"][7][0]["player"], 1);
    }

    #[test]
    fn test_parse_tagged_move_restores_state() {
        let mut state = MatchState::new();
        state
            .play(Pos::new(5, 0), crate::types::Move::step(Pos::new(4, 1)))
            .unwrap();
        let line = Envelope::Move(build_move_message("L1", &state)).to_line().unwrap();

        let ParsedMessage::Envelope(Envelope::Move(msg)) = parse_message(&line).unwrap() else {
            panic!("expected move");
        };
        assert_eq!(msg.board.to_board(), *state.board());
        assert_eq!(msg.turn(), Player::Two);
        assert_eq!(msg.winner(), None);
    }

    #[test]
    fn test_parse_legacy_bare_move() {
        let mut rows = vec![vec![serde_json::Value::Null; 8]; 8];
        rows[3][4] = serde_json::json!({"player": 1, "isKing": true});
        let json = serde_json::json!({"lobbyId": "old", "board": rows, "turn": 2, "winner": null});

        let parsed = parse_message(&json.to_string()).unwrap();
        let ParsedMessage::Envelope(Envelope::Move(msg)) = parsed else {
            panic!("expected legacy move");
        };
        assert_eq!(msg.lobby_id, "old");
        assert_eq!(msg.turn(), Player::Two);
        assert_eq!(
            msg.board.to_board().get(Pos::new(3, 4)),
            Some(Piece::king(Player::One))
        );
    }

    #[test]
    fn test_parse_control_and_relay_messages() {
        let line = r#"{"type":"control","lobbyId":"L1","signal":{"id":"abc1234","action":"request","from":"alice"}}"#;
        let parsed = parse_message(line).unwrap();
        assert_eq!(
            parsed,
            ParsedMessage::Envelope(create_control("L1", RematchMarker::request("abc1234", "alice")))
        );

        assert_eq!(
            parse_message(r#"{"type":"peer_left"}"#).unwrap(),
            ParsedMessage::Envelope(Envelope::PeerLeft)
        );
        assert_eq!(
            parse_message(r#"{"type":"joined","lobbyId":"L1","role":2}"#).unwrap(),
            ParsedMessage::Envelope(Envelope::Joined(JoinedMessage {
                lobby_id: "L1".to_string(),
                role: PlayerNumber(Player::Two),
            }))
        );
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        let parsed = parse_message(r#"{"type":"chat","text":"hi"}"#).unwrap();
        assert_eq!(
            parsed,
            ParsedMessage::Unknown(UnknownMessage {
                msg_type: "chat".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_known_type_is_an_error() {
        assert!(parse_message(r#"{"type":"move","lobbyId":"L1"}"#).is_err());
        assert!(parse_message(r#"{"type":"move","lobbyId":"L1","board":[],"turn":3}"#).is_err());
        assert!(parse_message("not json").is_err());
    }

    #[test]
    fn test_legacy_marker_key_is_accepted() {
        let cell: CellSnapshot = serde_json::from_str(
            r#"{"player":1,"isKing":false,"__rematch":{"id":"x","action":"response","from":"bob","accept":true}}"#,
        )
        .unwrap();
        let marker = cell.rematch.unwrap();
        assert!(marker.is_accepted());
        assert_eq!(marker.action, RematchAction::Response);

        let plain: CellSnapshot = serde_json::from_str(
            r#"{"player":2,"isKing":true,"rematch":{"id":"y","action":"request","from":"amy"}}"#,
        )
        .unwrap();
        assert_eq!(plain.rematch, Some(RematchMarker::request("y", "amy")));
    }

    #[test]
    fn test_marker_is_written_under_legacy_key() {
        let mut cell = CellSnapshot::from(Piece::man(Player::One));
        cell.rematch = Some(RematchMarker::request("z", "amy"));
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["__rematch"]["id"], "z");
        assert_eq!(json["__rematch"]["action"], "request");
        assert!(json.get("rematch").is_none());
    }
}
