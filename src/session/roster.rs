use crate::config::StartPosition;
use crate::error::{ConfigurationErrorKind, GameResult};
use crate::{Cell, PlayerId, MAX_NAME_LEN, MAX_PLAYERS};

/// The color of a player's token, assigned in registration order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TokenColor {
    /// First player.
    Red,
    /// Second player.
    Blue,
    /// Third player.
    Green,
    /// Fourth player.
    Yellow,
}

impl TokenColor {
    /// All colors in assignment order.
    pub const ALL: [TokenColor; MAX_PLAYERS] = [
        TokenColor::Red,
        TokenColor::Blue,
        TokenColor::Green,
        TokenColor::Yellow,
    ];

    /// The color given to the player registered at `index`, if there is one.
    #[must_use]
    pub fn for_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for TokenColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenColor::Red => "red",
            TokenColor::Blue => "blue",
            TokenColor::Green => "green",
            TokenColor::Yellow => "yellow",
        };
        f.write_str(name)
    }
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    id: PlayerId,
    name: String,
    token: TokenColor,
    position: Cell,
}

impl Player {
    /// The player's id, which is also their place in turn order.
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// The player's display name, trimmed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The player's token color.
    #[must_use]
    pub fn token(&self) -> TokenColor {
        self.token
    }

    /// The cell the player's token currently stands on.
    #[must_use]
    pub fn position(&self) -> Cell {
        self.position
    }
}

/// The players of a session, in turn order, together with their token positions.
///
/// Only the engine moves tokens; the public API is read-only apart from registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRoster {
    players: Vec<Player>,
    start: Cell,
}

impl PlayerRoster {
    /// Creates an empty roster whose tokens start at `start`.
    #[must_use]
    pub fn new(start: StartPosition) -> Self {
        Self {
            players: Vec::with_capacity(MAX_PLAYERS),
            start: start.cell(),
        }
    }

    /// Checks `name` against the naming rules and returns it trimmed.
    ///
    /// # Errors
    /// - [`ConfigurationErrorKind::EmptyPlayerName`] if nothing is left after trimming.
    /// - [`ConfigurationErrorKind::PlayerNameTooLong`] beyond [`MAX_NAME_LEN`] characters.
    /// - [`ConfigurationErrorKind::DuplicatePlayerName`] if another player has the same name,
    ///   ignoring case.
    pub fn validate_name(&self, name: &str) -> Result<String, ConfigurationErrorKind> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ConfigurationErrorKind::EmptyPlayerName);
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ConfigurationErrorKind::PlayerNameTooLong {
                len,
                max: MAX_NAME_LEN,
            });
        }
        let lowered = trimmed.to_lowercase();
        if self
            .players
            .iter()
            .any(|p| p.name.to_lowercase() == lowered)
        {
            return Err(ConfigurationErrorKind::DuplicatePlayerName {
                name: trimmed.to_owned(),
            });
        }
        Ok(trimmed.to_owned())
    }

    /// Registers a player and returns their id.
    ///
    /// # Errors
    /// [`ConfigurationErrorKind::TooManyPlayers`] once [`MAX_PLAYERS`] are registered, or any
    /// error of [`PlayerRoster::validate_name`].
    pub fn add(&mut self, name: &str) -> GameResult<PlayerId> {
        let index = self.players.len();
        let Some(token) = TokenColor::for_index(index) else {
            return Err(ConfigurationErrorKind::TooManyPlayers { max: MAX_PLAYERS }.into());
        };
        let name = self.validate_name(name)?;
        let id = PlayerId::new(index);
        self.players.push(Player {
            id,
            name,
            token,
            position: self.start,
        });
        Ok(id)
    }

    /// Number of registered players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody has registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// The player with the given id.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.as_usize())
    }

    /// All players in turn order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Iterates over all players in turn order.
    pub fn iter(&self) -> std::slice::Iter<'_, Player> {
        self.players.iter()
    }

    /// The cell tokens start on.
    #[must_use]
    pub fn start_cell(&self) -> Cell {
        self.start
    }

    /// The position of the given player's token.
    #[must_use]
    pub fn position(&self, id: PlayerId) -> Option<Cell> {
        self.get(id).map(Player::position)
    }

    /// Moves a token. Returns `false` if no such player exists.
    pub(crate) fn set_position(&mut self, id: PlayerId, cell: Cell) -> bool {
        match self.players.get_mut(id.as_usize()) {
            Some(player) => {
                player.position = cell;
                true
            },
            None => false,
        }
    }

    /// Changes the start cell and puts every token on it.
    pub(crate) fn set_start(&mut self, start: StartPosition) {
        self.start = start.cell();
        self.reset_positions();
    }

    /// Puts every token back on the start cell.
    pub(crate) fn reset_positions(&mut self) {
        let start = self.start;
        for player in &mut self.players {
            player.position = start;
        }
    }
}

impl<'a> IntoIterator for &'a PlayerRoster {
    type Item = &'a Player;
    type IntoIter = std::slice::Iter<'a, Player>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
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
    use crate::GameError;

    fn kind(result: GameResult<PlayerId>) -> ConfigurationErrorKind {
        match result {
            Err(GameError::Configuration { kind }) => kind,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn players_get_sequential_ids_and_colors() {
        let mut roster = PlayerRoster::new(StartPosition::OnBoard);
        let ada = roster.add("Ada").unwrap();
        let grace = roster.add("Grace").unwrap();

        assert_eq!(ada, PlayerId::new(0));
        assert_eq!(grace, PlayerId::new(1));
        assert_eq!(roster.get(ada).unwrap().token(), TokenColor::Red);
        assert_eq!(roster.get(grace).unwrap().token(), TokenColor::Blue);
        assert_eq!(roster.position(grace), Some(Cell::FIRST));
    }

    #[test]
    fn names_are_trimmed() {
        let mut roster = PlayerRoster::new(StartPosition::OnBoard);
        let id = roster.add("  Ada \t").unwrap();
        assert_eq!(roster.get(id).unwrap().name(), "Ada");
    }

    #[test]
    fn rejects_empty_names() {
        let mut roster = PlayerRoster::new(StartPosition::OnBoard);
        assert_eq!(kind(roster.add("")), ConfigurationErrorKind::EmptyPlayerName);
        assert_eq!(kind(roster.add("   ")), ConfigurationErrorKind::EmptyPlayerName);
        assert!(roster.is_empty());
    }

    #[test]
    fn rejects_long_names() {
        let mut roster = PlayerRoster::new(StartPosition::OnBoard);
        assert!(roster.add("fifteen chars!!").is_ok());
        assert_eq!(
            kind(roster.add("sixteen chars!!!")),
            ConfigurationErrorKind::PlayerNameTooLong { len: 16, max: 15 }
        );
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        let mut roster = PlayerRoster::new(StartPosition::OnBoard);
        // 13 characters, 16 bytes
        assert!(roster.add("Åsa Östergård").is_ok());
    }

    #[test]
    fn rejects_duplicate_names_ignoring_case() {
        let mut roster = PlayerRoster::new(StartPosition::OnBoard);
        roster.add("Ada").unwrap();
        assert_eq!(
            kind(roster.add(" ADA ")),
            ConfigurationErrorKind::DuplicatePlayerName {
                name: "ADA".to_owned()
            }
        );
    }

    #[test]
    fn rejects_fifth_player() {
        let mut roster = PlayerRoster::new(StartPosition::OnBoard);
        for name in ["A", "B", "C", "D"] {
            roster.add(name).unwrap();
        }
        assert_eq!(
            kind(roster.add("E")),
            ConfigurationErrorKind::TooManyPlayers { max: 4 }
        );
        assert_eq!(roster.len(), 4);
        assert_eq!(roster.get(PlayerId::new(3)).unwrap().token(), TokenColor::Yellow);
    }

    #[test]
    fn off_board_start_and_reset() {
        let mut roster = PlayerRoster::new(StartPosition::OffBoard);
        let id = roster.add("Ada").unwrap();
        assert_eq!(roster.position(id), Some(Cell::OFF_BOARD));

        assert!(roster.set_position(id, Cell::new(42)));
        assert!(!roster.set_position(PlayerId::new(3), Cell::new(42)));
        roster.reset_positions();
        assert_eq!(roster.position(id), Some(Cell::OFF_BOARD));
    }
}
