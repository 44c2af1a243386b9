//! Protocol module - JSON message types for the observation adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (per-sender,
//! strictly increasing) and `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};

use crate::core::snapshot::kind_code;
use crate::core::GameSnapshot;
use crate::types::{Cell, Intent};

pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Game Messages ==============

/// Every message a client may send, dispatched on `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
}

#[derive(Debug, Clone, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    /// Receive an observation after every broadcast tick
    #[serde(default)]
    pub stream_observations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Intents to apply, in order, on the next frame.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub intents: Vec<String>,
}

impl CommandMessage {
    /// Parse the wire names. The first unknown name is returned as the error.
    pub fn parse_intents(&self) -> Result<Vec<Intent>, String> {
        self.intents
            .iter()
            .map(|name| Intent::from_str(name).ok_or_else(|| name.clone()))
            .collect()
    }
}

pub fn parse_message(line: &str) -> serde_json::Result<ClientMessage> {
    serde_json::from_str(line)
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Serialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: usize,
    pub layout: LayoutInfo,
}

/// Board geometry, sent once in the welcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub width: i8,
    pub height: i8,
    /// Inclusive `[start, end]` columns
    pub left: [i8; 2],
    pub right: [i8; 2],
}

impl LayoutInfo {
    pub fn from_snapshot(snap: &GameSnapshot) -> Self {
        Self {
            width: snap.width,
            height: snap.layout.height,
            left: [snap.layout.left.start, snap.layout.left.end],
            right: [snap.layout.right.start, snap.layout.right.end],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub seq: u64,
    pub ts: u64,
    /// "idle", "running" or "gameOver"
    pub phase: &'static str,
    pub board: BoardSnapshot,
    pub active: Option<ActivePieceSnapshot>,
    pub balance: BalanceSnapshot,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub board_id: u32,
    /// FNV-1a over everything above except `seq`/`ts`
    pub state_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub width: i8,
    pub height: i8,
    /// `cells[row][col]`, row 0 at the bottom; 0 is empty, otherwise a kind code
    pub cells: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivePieceSnapshot {
    pub kind: &'static str,
    pub rotation: &'static str,
    pub platform: &'static str,
    pub anchor: [i8; 2],
    pub cells: Vec<[i8; 2]>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BalanceSnapshot {
    pub tilt: f32,
    pub left_count: usize,
    pub right_count: usize,
    pub balanced_ms: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub seq: u64,
    pub ts: u64,
    /// The client seq being acknowledged
    pub ack_seq: u64,
    /// How many of the command's intents changed the game
    pub applied: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ParseError,
    ProtocolMismatch,
    HandshakeRequired,
    InvalidCommand,
    Backpressure,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: &'static str,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

// ============== Builders ==============

pub fn create_welcome(seq: u64, client_id: usize, layout: LayoutInfo) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: "welcome",
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        layout,
    }
}

pub fn create_ack(seq: u64, ack_seq: u64, applied: usize) -> AckMessage {
    AckMessage {
        msg_type: "ack",
        seq,
        ts: current_timestamp_ms(),
        ack_seq,
        applied,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: "error",
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build an observation from a simulation snapshot.
pub fn build_observation(snap: &GameSnapshot, seq: u64) -> ObservationMessage {
    let width = snap.width.max(0) as usize;
    let cells: Vec<Vec<u8>> = if width == 0 {
        Vec::new()
    } else {
        snap.board.chunks(width).map(<[u8]>::to_vec).collect()
    };

    let active = snap.active.as_ref().map(|a| ActivePieceSnapshot {
        kind: a.kind.as_str(),
        rotation: a.rotation.as_str(),
        platform: a.platform.as_str(),
        anchor: [a.anchor.col, a.anchor.row],
        cells: a.cells.iter().map(|c| [c.col, c.row]).collect(),
    });

    ObservationMessage {
        msg_type: "observation",
        seq,
        ts: current_timestamp_ms(),
        phase: snap.phase.as_str(),
        board: BoardSnapshot {
            width: snap.width,
            height: snap.layout.height,
            cells,
        },
        active,
        balance: BalanceSnapshot {
            tilt: snap.tilt,
            left_count: snap.left_count,
            right_count: snap.right_count,
            balanced_ms: snap.balanced_ms,
        },
        score: snap.score,
        level: snap.level,
        lines: snap.lines,
        board_id: snap.board_id,
        state_hash: format!("{:016x}", state_hash(snap)),
    }
}

/// Stable 64-bit FNV-1a over the observable state.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions, so
/// clients could not compare hashes between builds.
pub fn state_hash(snap: &GameSnapshot) -> u64 {
    let mut h = Fnv1a::new();
    h.write(&snap.board);
    if let Some(a) = &snap.active {
        h.write(&[kind_code(a.kind), a.rotation as u8, a.platform as u8]);
        for c in &a.cells {
            h.write_cell(*c);
        }
    }
    h.write(&snap.tilt.to_bits().to_le_bytes());
    h.write(&snap.balanced_ms.to_le_bytes());
    h.write(&[snap.phase as u8]);
    h.write(&snap.score.to_le_bytes());
    h.write(&snap.lines.to_le_bytes());
    h.write(&snap.board_id.to_le_bytes());
    h.state
}

struct Fnv1a {
    state: u64,
}

impl Fnv1a {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }

    fn write_cell(&mut self, cell: Cell) {
        self.write(&[cell.col as u8, cell.row as u8]);
    }
}

/// Best-effort `seq` extraction from a line that failed to parse.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActiveSnapshot, Phase};
    use crate::types::{PieceKind, Platform, Rotation};

    #[test]
    fn parses_hello_and_command() {
        let hello = r#"{"type":"hello","seq":1,"ts":5,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","stream_observations":true}"#;
        match parse_message(hello).unwrap() {
            ClientMessage::Hello(h) => {
                assert_eq!(h.seq, 1);
                assert_eq!(h.client.name, "bot");
                assert!(h.stream_observations);
            }
            other => panic!("unexpected {other:?}"),
        }

        let cmd = r#"{"type":"command","seq":2,"intents":["moveLeft","switchPlatform","softDropOn"]}"#;
        match parse_message(cmd).unwrap() {
            ClientMessage::Command(c) => assert_eq!(
                c.parse_intents().unwrap(),
                vec![Intent::MoveLeft, Intent::SwitchPlatform, Intent::SoftDropHeld(true)]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_intent_is_reported_by_name() {
        let cmd = CommandMessage {
            seq: 3,
            ts: 0,
            intents: vec!["moveLeft".into(), "hardDrop".into()],
        };
        assert_eq!(cmd.parse_intents(), Err("hardDrop".to_string()));
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        assert!(parse_message(r#"{"type":"control","seq":1}"#).is_err());
        assert_eq!(extract_seq_best_effort(r#"{"type":"control","seq": 42}"#), Some(42));
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn observation_mirrors_snapshot() {
        let mut snap = GameSnapshot::default();
        snap.phase = Phase::Running;
        snap.board[1] = kind_code(PieceKind::O);
        snap.left_count = 1;
        snap.tilt = 1.0;
        snap.active = Some(ActiveSnapshot {
            kind: PieceKind::Domino,
            rotation: Rotation::North,
            anchor: Cell::new(2, 14),
            platform: Platform::Left,
            cells: [Cell::new(2, 14), Cell::new(3, 14)].into_iter().collect(),
        });

        let obs = build_observation(&snap, 7);
        assert_eq!(obs.phase, "running");
        assert_eq!(obs.board.cells.len(), 17);
        assert_eq!(obs.board.cells[0].len(), 26);
        assert_eq!(obs.board.cells[0][1], kind_code(PieceKind::O));
        let active = obs.active.as_ref().unwrap();
        assert_eq!(active.kind, "domino");
        assert_eq!(active.platform, "left");
        assert_eq!(active.cells, vec![[2, 14], [3, 14]]);

        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["type"], "observation");
        assert_eq!(json["balance"]["left_count"], 1);
    }

    #[test]
    fn state_hash_tracks_observable_changes() {
        let mut snap = GameSnapshot::default();
        let a = state_hash(&snap);
        assert_eq!(a, state_hash(&snap.clone()));
        snap.tilt = -0.5;
        let b = state_hash(&snap);
        assert_ne!(a, b);
        snap.board[3] = 1;
        assert_ne!(b, state_hash(&snap));
    }

    #[test]
    fn error_codes_serialize_snake_case() {
        let err = create_error(4, ErrorCode::HandshakeRequired, "hello first");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "handshake_required");
        assert_eq!(json["type"], "error");
    }
}
