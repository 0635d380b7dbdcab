use std::collections::vec_deque::Drain;
use std::iter::FusedIterator;

use crate::GameEvent;

/// A zero-allocation opaque iterator that drains events from a session.
///
/// Wraps the session's event queue drain without exposing `std::collections::vec_deque::Drain`.
/// It implements [`Iterator`], [`DoubleEndedIterator`], [`ExactSizeIterator`], and
/// [`FusedIterator`]. Obtain one from [`GameSession::events()`](crate::GameSession::events).
///
/// Events not consumed before the drain is dropped are discarded.
///
/// # Examples
///
/// ```
/// use ladder_session::{GameEvent, ScriptedDice, SessionBuilder, Tick, TimingConfig};
///
/// # fn main() -> Result<(), ladder_session::GameError> {
/// let mut session = SessionBuilder::new()
///     .with_dice(ScriptedDice::new([2])?)
///     .with_timing(TimingConfig::instant())
///     .add_player("Ada")?
///     .add_player("Grace")?
///     .start_session()?;
/// session.roll_dice()?;
/// session.tick(Tick::Advance);
///
/// for event in session.events() {
///     if let GameEvent::DiceRolled { player, value } = event {
///         println!("player {player} rolled {value}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct EventDrain<'a> {
    inner: EventDrainInner<'a>,
}

enum EventDrainInner<'a> {
    Queue(Drain<'a, GameEvent>),
    Empty,
}

impl<'a> EventDrain<'a> {
    pub(crate) fn from_drain(drain: Drain<'a, GameEvent>) -> Self {
        Self {
            inner: EventDrainInner::Queue(drain),
        }
    }

    /// A drain that yields nothing.
    pub fn empty() -> Self {
        Self {
            inner: EventDrainInner::Empty,
        }
    }
}

impl Iterator for EventDrain<'_> {
    type Item = GameEvent;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            EventDrainInner::Queue(drain) => drain.next(),
            EventDrainInner::Empty => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            EventDrainInner::Queue(drain) => drain.size_hint(),
            EventDrainInner::Empty => (0, Some(0)),
        }
    }
}

impl DoubleEndedIterator for EventDrain<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            EventDrainInner::Queue(drain) => drain.next_back(),
            EventDrainInner::Empty => None,
        }
    }
}

impl ExactSizeIterator for EventDrain<'_> {
    fn len(&self) -> usize {
        match &self.inner {
            EventDrainInner::Queue(drain) => drain.len(),
            EventDrainInner::Empty => 0,
        }
    }
}

impl FusedIterator for EventDrain<'_> {}

impl std::fmt::Debug for EventDrain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDrain")
            .field("remaining", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::iter_with_drain
)]
mod tests {
    use super::*;
    use crate::PlayerId;
    use std::collections::VecDeque;

    fn rolled(value: u8) -> GameEvent {
        GameEvent::DiceRolled {
            player: PlayerId::new(0),
            value,
        }
    }

    fn queue_of(values: &[u8]) -> VecDeque<GameEvent> {
        values.iter().map(|&v| rolled(v)).collect()
    }

    #[test]
    fn empty_drain_yields_nothing() {
        let mut drain = EventDrain::empty();
        assert_eq!(drain.len(), 0);
        assert_eq!(drain.size_hint(), (0, Some(0)));
        assert!(drain.next().is_none());
        assert!(drain.next_back().is_none());
    }

    #[test]
    fn drain_yields_events_in_order_and_empties_queue() {
        let mut queue = queue_of(&[1, 2, 3]);
        let events: Vec<_> = EventDrain::from_drain(queue.drain(..)).collect();

        assert_eq!(events, vec![rolled(1), rolled(2), rolled(3)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_is_fused() {
        let mut queue = queue_of(&[1]);
        let mut drain = EventDrain::from_drain(queue.drain(..));
        assert!(drain.next().is_some());
        assert!(drain.next().is_none());
        assert!(drain.next().is_none());
    }

    #[test]
    fn double_ended_iteration() {
        let mut queue = queue_of(&[1, 2, 3]);
        let mut drain = EventDrain::from_drain(queue.drain(..));
        assert_eq!(drain.next_back(), Some(rolled(3)));
        assert_eq!(drain.next(), Some(rolled(1)));
        assert_eq!(drain.len(), 1);
        assert_eq!(drain.next_back(), Some(rolled(2)));
        assert!(drain.next().is_none());
    }

    #[test]
    fn debug_format_shows_remaining_count() {
        let mut queue = queue_of(&[4, 5]);
        let drain = EventDrain::from_drain(queue.drain(..));
        assert_eq!(format!("{drain:?}"), "EventDrain { remaining: 2 }");
        assert_eq!(
            format!("{:?}", EventDrain::empty()),
            "EventDrain { remaining: 0 }"
        );
    }

    #[test]
    fn dropping_a_partial_drain_discards_the_rest() {
        let mut queue = queue_of(&[1, 2, 3]);
        {
            let mut drain = EventDrain::from_drain(queue.drain(..));
            assert_eq!(drain.next(), Some(rolled(1)));
        }
        assert!(queue.is_empty());
    }
}
