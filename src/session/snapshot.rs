use crate::engine::TurnEngine;
use crate::hash::fnv1a_hash;
use crate::session::roster::{PlayerRoster, TokenColor};
use crate::{Cell, PlayerId, TurnState};

/// One player's entry in a [`GameSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PlayerSnapshot {
    /// The player's id.
    pub id: PlayerId,
    /// The player's display name.
    pub name: String,
    /// The player's token color.
    pub token: TokenColor,
    /// Where the token currently stands. During animation this is the hop reached so far.
    pub position: Cell,
}

/// A self-contained, read-only copy of everything a presentation layer needs to draw a frame.
///
/// Snapshots own their data and never borrow from the session, so they can be handed to another
/// thread or serialized for a spectator.
///
/// # Example
///
/// ```
/// use ladder_session::{Cell, SessionBuilder, TurnState};
///
/// # fn main() -> Result<(), ladder_session::GameError> {
/// let session = SessionBuilder::new()
///     .add_player("Ada")?
///     .add_player("Grace")?
///     .start_session()?;
/// let snapshot = session.snapshot();
///
/// assert_eq!(snapshot.state, TurnState::AwaitingRoll);
/// assert!(snapshot.players.iter().all(|p| p.position == Cell::FIRST));
/// assert_eq!(snapshot.checksum(), session.snapshot().checksum());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GameSnapshot {
    /// All players in turn order.
    pub players: Vec<PlayerSnapshot>,
    /// Whose turn it is.
    pub active_player: PlayerId,
    /// The engine state.
    pub state: TurnState,
    /// The winner, once the game is over.
    pub winner: Option<PlayerId>,
    /// The most recent authoritative roll.
    pub last_roll: Option<u8>,
    /// The dice face to display. Changes every tick while the dice tumble.
    pub dice_face: Option<u8>,
    /// The path being played back, empty outside of animation.
    pub animated_path: Vec<Cell>,
    /// Index into `animated_path` of the cell the moving token stands on. Zero outside of
    /// animation.
    pub animation_cursor: usize,
    /// Number of resolved turns since the game (re)started.
    pub turns_completed: u32,
}

impl GameSnapshot {
    pub(crate) fn capture(roster: &PlayerRoster, engine: &TurnEngine) -> Self {
        let players = roster
            .iter()
            .map(|player| PlayerSnapshot {
                id: player.id(),
                name: player.name().to_owned(),
                token: player.token(),
                position: player.position(),
            })
            .collect();
        let (animated_path, animation_cursor) = match (engine.state(), engine.path()) {
            (TurnState::Animating, Some(path)) => (path.cells().to_vec(), engine.cursor()),
            _ => (Vec::new(), 0),
        };
        Self {
            players,
            active_player: engine.active_player(),
            state: engine.state(),
            winner: engine.winner(),
            last_roll: engine.last_roll(),
            dice_face: engine.dice_face(),
            animated_path,
            animation_cursor,
            turns_completed: engine.turns_completed(),
        }
    }

    /// The snapshot of the given player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.get(id.as_usize())
    }

    /// A deterministic FNV-1a checksum over the whole snapshot.
    ///
    /// Two sessions fed the same dice and ticks produce equal checksums at every step.
    /// Ids, the cursor and collection lengths hash at native width and byte order, so
    /// checksums only compare between targets with the same pointer width and endianness.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        fnv1a_hash(self)
    }

    /// Serializes the snapshot to a JSON string.
    ///
    /// Returns `None` if serialization fails.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::config::{StartPosition, TimingConfig};
    use crate::rng::Pcg32;

    fn fixture() -> (PlayerRoster, TurnEngine) {
        let mut roster = PlayerRoster::new(StartPosition::OnBoard);
        roster.add("Ada").unwrap();
        roster.add("Grace").unwrap();
        let engine = TurnEngine::new(TimingConfig::instant(), Pcg32::new(1, 2));
        (roster, engine)
    }

    #[test]
    fn capture_copies_roster_and_engine() {
        let (roster, engine) = fixture();
        let snapshot = GameSnapshot::capture(&roster, &engine);

        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.player(PlayerId::new(1)).unwrap().name, "Grace");
        assert_eq!(snapshot.player(PlayerId::new(1)).unwrap().token, TokenColor::Blue);
        assert!(snapshot.player(PlayerId::new(2)).is_none());
        assert_eq!(snapshot.state, TurnState::AwaitingRoll);
        assert_eq!(snapshot.winner, None);
        assert!(snapshot.animated_path.is_empty());
    }

    #[test]
    fn checksum_tracks_positions() {
        let (mut roster, engine) = fixture();
        let before = GameSnapshot::capture(&roster, &engine);
        assert_eq!(before.checksum(), GameSnapshot::capture(&roster, &engine).checksum());

        roster.set_position(PlayerId::new(0), Cell::new(2));
        let after = GameSnapshot::capture(&roster, &engine);
        assert_ne!(before.checksum(), after.checksum());
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_round_trip() {
        let (roster, engine) = fixture();
        let snapshot = GameSnapshot::capture(&roster, &engine);
        let json = snapshot.to_json().unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
