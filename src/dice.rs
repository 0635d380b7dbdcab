use crate::error::{ConfigurationErrorKind, GameResult};
use crate::rng::{Pcg32, Rng, SeedableRng};

/// A validated face of a six-sided die.
///
/// # Examples
///
/// ```
/// use ladder_session::DieFace;
///
/// assert_eq!(DieFace::new(4).map(DieFace::value), Some(4));
/// assert_eq!(DieFace::new(0), None);
/// assert_eq!(DieFace::clamped(9).value(), 6);
/// ```
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct DieFace(u8);

impl DieFace {
    /// Lowest face.
    pub const MIN: DieFace = DieFace(1);
    /// Highest face.
    pub const MAX: DieFace = DieFace(6);

    /// Returns the face showing `value`, or `None` if no face shows it.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN.0 && value <= Self::MAX.0 {
            Some(DieFace(value))
        } else {
            None
        }
    }

    /// Returns the nearest face to `value`.
    #[must_use]
    pub fn clamped(value: u8) -> Self {
        DieFace(value.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// The number of pips on this face.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for DieFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A source of authoritative dice rolls.
///
/// The engine asks for exactly one value per turn, when the roll settles. Values outside `1..=6`
/// are reported as [`ViolationKind::DiceRange`](crate::telemetry::ViolationKind::DiceRange) and
/// clamped to the nearest face.
///
/// # Example
///
/// ```
/// use ladder_session::DiceRoller;
///
/// /// Always rolls a six.
/// struct Loaded;
///
/// impl DiceRoller for Loaded {
///     fn roll(&mut self) -> u8 {
///         6
///     }
/// }
/// ```
#[cfg(feature = "sync-send")]
pub trait DiceRoller: Send + Sync {
    /// Rolls the die once, returning a value in `1..=6`.
    fn roll(&mut self) -> u8;
}

/// A source of authoritative dice rolls.
///
/// The engine asks for exactly one value per turn, when the roll settles. Values outside `1..=6`
/// are reported as [`ViolationKind::DiceRange`](crate::telemetry::ViolationKind::DiceRange) and
/// clamped to the nearest face.
#[cfg(not(feature = "sync-send"))]
pub trait DiceRoller {
    /// Rolls the die once, returning a value in `1..=6`.
    fn roll(&mut self) -> u8;
}

impl DiceRoller for Box<dyn DiceRoller> {
    fn roll(&mut self) -> u8 {
        (**self).roll()
    }
}

/// A fair die backed by a seedable PRNG.
///
/// ```
/// use ladder_session::{DiceRoller, RandomDice};
///
/// let mut a = RandomDice::seeded(7);
/// let mut b = RandomDice::seeded(7);
/// assert_eq!(a.roll(), b.roll());
/// ```
#[derive(Debug, Clone)]
pub struct RandomDice<R = Pcg32> {
    rng: R,
}

impl RandomDice<Pcg32> {
    /// A die whose rolls are fully determined by `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// A die seeded from timing entropy. Every game rolls differently.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg32::from_entropy(),
        }
    }
}

impl<R: Rng> RandomDice<R> {
    /// Wraps an existing generator.
    #[must_use]
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

#[cfg(feature = "sync-send")]
impl<R: Rng + Send + Sync> DiceRoller for RandomDice<R> {
    fn roll(&mut self) -> u8 {
        self.rng.gen_die_face()
    }
}

#[cfg(not(feature = "sync-send"))]
impl<R: Rng> DiceRoller for RandomDice<R> {
    fn roll(&mut self) -> u8 {
        self.rng.gen_die_face()
    }
}

/// A die that replays a fixed sequence of values, starting over when it runs out.
///
/// Used to script games in tests and demos.
///
/// ```
/// use ladder_session::{DiceRoller, ScriptedDice};
///
/// # fn main() -> Result<(), ladder_session::GameError> {
/// let mut dice = ScriptedDice::new([6, 1])?;
/// assert_eq!(dice.roll(), 6);
/// assert_eq!(dice.roll(), 1);
/// assert_eq!(dice.roll(), 6);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedDice {
    values: Vec<u8>,
    cursor: usize,
}

impl ScriptedDice {
    /// Creates a die replaying `values` in order.
    ///
    /// # Errors
    /// - [`ConfigurationErrorKind::EmptyDiceScript`] if `values` is empty.
    /// - [`ConfigurationErrorKind::InvalidDieFace`] if a value is outside `1..=6`.
    pub fn new(values: impl IntoIterator<Item = u8>) -> GameResult<Self> {
        let values: Vec<u8> = values.into_iter().collect();
        if values.is_empty() {
            return Err(ConfigurationErrorKind::EmptyDiceScript.into());
        }
        if let Some(&value) = values.iter().find(|&&v| DieFace::new(v).is_none()) {
            return Err(ConfigurationErrorKind::InvalidDieFace { value }.into());
        }
        Ok(Self { values, cursor: 0 })
    }

    /// The scripted values.
    #[must_use]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Number of rolls made so far.
    #[must_use]
    pub fn rolls_made(&self) -> usize {
        self.cursor
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&mut self) -> u8 {
        let value = self
            .values
            .get(self.cursor % self.values.len())
            .copied()
            .unwrap_or(DieFace::MIN.value());
        self.cursor += 1;
        value
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
    use proptest::prelude::*;

    #[test]
    fn die_face_bounds() {
        assert!(DieFace::new(1).is_some());
        assert!(DieFace::new(6).is_some());
        assert!(DieFace::new(0).is_none());
        assert!(DieFace::new(7).is_none());
        assert_eq!(DieFace::clamped(0), DieFace::MIN);
        assert_eq!(DieFace::clamped(200), DieFace::MAX);
    }

    #[test]
    fn scripted_dice_cycle() {
        let mut dice = ScriptedDice::new([2, 4, 6]).unwrap();
        let rolls: Vec<u8> = (0..7).map(|_| dice.roll()).collect();
        assert_eq!(rolls, vec![2, 4, 6, 2, 4, 6, 2]);
        assert_eq!(dice.rolls_made(), 7);
    }

    #[test]
    fn scripted_dice_rejects_empty_script() {
        assert_eq!(
            ScriptedDice::new(Vec::new()),
            Err(GameError::Configuration {
                kind: ConfigurationErrorKind::EmptyDiceScript
            })
        );
    }

    #[test]
    fn scripted_dice_rejects_invalid_faces() {
        assert_eq!(
            ScriptedDice::new([3, 7]),
            Err(GameError::Configuration {
                kind: ConfigurationErrorKind::InvalidDieFace { value: 7 }
            })
        );
    }

    #[test]
    fn boxed_dice_delegate() {
        let mut boxed: Box<dyn DiceRoller> = Box::new(ScriptedDice::new([5]).unwrap());
        assert_eq!(boxed.roll(), 5);
    }

    #[test]
    fn random_dice_from_rng_matches_seeded() {
        let mut a = RandomDice::seeded(99);
        let mut b = RandomDice::from_rng(Pcg32::seed_from_u64(99));
        for _ in 0..50 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    proptest! {
        #[test]
        fn prop_random_dice_always_in_range(seed in any::<u64>()) {
            let mut dice = RandomDice::seeded(seed);
            for _ in 0..200 {
                let value = dice.roll();
                prop_assert!((1..=6).contains(&value), "rolled {}", value);
            }
        }

        #[test]
        fn prop_scripted_dice_replay_script(script in proptest::collection::vec(1u8..=6, 1..20)) {
            let mut dice = ScriptedDice::new(script.clone()).unwrap();
            for round in 0..3 {
                for &expected in &script {
                    prop_assert_eq!(dice.roll(), expected, "round {}", round);
                }
            }
        }
    }
}
