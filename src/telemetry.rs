//! Structured telemetry for rule violations and broken invariants.
//!
//! The engine is defensive about inputs it cannot reject up front: a dice source that returns a
//! value outside `1..=6`, a topology whose transitions chain into each other, or an event queue
//! that overflows because nobody drains it. Instead of panicking or silently logging, these are
//! reported as [`RuleViolation`] records. A session without an observer logs them through
//! [`TracingObserver`]. Tests hand the builder a [`CollectingObserver`] and inspect what it caught.
//!
//! # Example
//!
//! ```
//! use ladder_session::prelude::*;
//! use ladder_session::assert_no_violations;
//! use ladder_session::telemetry::CollectingObserver;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), GameError> {
//! let observer = Arc::new(CollectingObserver::new());
//! let _session = SessionBuilder::new()
//!     .with_violation_observer(observer.clone())
//!     .add_player("Ada")?
//!     .add_player("Grace")?
//!     .start_session()?;
//!
//! assert_no_violations!(observer);
//! # Ok(())
//! # }
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

/// Severity of a rule violation.
///
/// Severities are ordered from least to most severe, allowing filtering
/// and comparison operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    /// Unexpected but recoverable; the engine continued with a fallback.
    ///
    /// Example: the oldest queued event was dropped to make room.
    Warning,
    /// Serious issue; gameplay may deviate from the rules.
    ///
    /// Example: a dice source produced 9 and the value was clamped to 6.
    Error,
    /// Critical invariant broken; session state may be corrupted.
    ///
    /// Example: a player's position points outside the board.
    Critical,
}

impl ViolationSeverity {
    /// Returns a string representation suitable for logging/metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categories of rule violations.
///
/// Each category corresponds to a subsystem of the engine, making it easy to
/// filter and route violations.
///
/// # Forward Compatibility
///
/// This enum is marked `#[non_exhaustive]` because new violation categories
/// may be added in future versions. Always include a wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ViolationKind {
    /// Board topology met at runtime does not hold its invariants.
    ///
    /// Examples:
    /// - A transition lands on the start of another transition
    /// - A transition points outside the board
    Topology,
    /// A dice source produced a value outside `1..=6`.
    DiceRange,
    /// The event queue overflowed and events were dropped.
    EventQueue,
    /// Turn bookkeeping went wrong.
    ///
    /// Examples:
    /// - The active player index does not refer to a registered player
    TurnOrder,
    /// Internal logic error (should never happen).
    ///
    /// These violations indicate bugs in the library itself.
    InternalError,
    /// Runtime invariant check failed.
    ///
    /// Only checked in debug builds or when the `paranoid` feature is enabled.
    Invariant,
}

impl ViolationKind {
    /// Returns a string representation suitable for logging/metrics labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Topology => "topology",
            Self::DiceRange => "dice_range",
            Self::EventQueue => "event_queue",
            Self::TurnOrder => "turn_order",
            Self::InternalError => "internal_error",
            Self::Invariant => "invariant",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded rule violation.
///
/// Contains all relevant context for diagnosing and responding to
/// a violation of expected behavior or invariants.
///
/// # Example
///
/// ```
/// use ladder_session::telemetry::{RuleViolation, ViolationSeverity, ViolationKind};
///
/// let violation = RuleViolation::new(
///     ViolationSeverity::Error,
///     ViolationKind::DiceRange,
///     "die face out of range",
///     "engine.rs:42",
/// )
/// .with_turn(7);
///
/// assert_eq!(violation.turn, Some(7));
/// assert!(violation.to_string().contains("dice_range"));
/// ```
#[derive(Debug, Clone, serde::Serialize)]
pub struct RuleViolation {
    /// The severity level of this violation.
    pub severity: ViolationSeverity,
    /// The category/subsystem where the violation occurred.
    pub kind: ViolationKind,
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Source location where the violation was detected (file:line).
    pub location: &'static str,
    /// Number of completed turns when the violation occurred, if known.
    pub turn: Option<u32>,
}

impl RuleViolation {
    /// Creates a new rule violation.
    #[must_use]
    pub fn new(
        severity: ViolationSeverity,
        kind: ViolationKind,
        message: impl Into<String>,
        location: &'static str,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            location,
            turn: None,
        }
    }

    /// Sets the turn counter at which this violation occurred.
    #[must_use]
    pub fn with_turn(mut self, turn: u32) -> Self {
        self.turn = Some(turn);
        self
    }

    /// Serializes this violation to a JSON string.
    ///
    /// Returns `None` if serialization fails (which should not happen for
    /// well-formed violations).
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{}] {} (at {}",
            self.severity, self.kind, self.message, self.location
        )?;
        if let Some(turn) = self.turn {
            write!(f, ", turn={turn}")?;
        }
        write!(f, ")")
    }
}

/// Trait for observing rule violations.
///
/// Implement this trait to react to violations in your own way (logging, metrics,
/// on-screen debug overlays).
///
/// # Thread Safety
///
/// When the `sync-send` feature is enabled, observers must be `Send + Sync`
/// to allow sharing across threads.
///
/// # Example
///
/// ```
/// use ladder_session::telemetry::{ViolationObserver, RuleViolation};
///
/// struct CountingObserver {
///     count: std::sync::atomic::AtomicUsize,
/// }
///
/// impl ViolationObserver for CountingObserver {
///     fn on_violation(&self, _violation: &RuleViolation) {
///         self.count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///     }
/// }
/// ```
#[cfg(feature = "sync-send")]
pub trait ViolationObserver: Send + Sync {
    /// Called when a rule violation is detected.
    ///
    /// This runs inside [`GameSession::tick`](crate::GameSession::tick), so keep it quick.
    fn on_violation(&self, violation: &RuleViolation);
}

#[cfg(not(feature = "sync-send"))]
/// Trait for observing rule violations.
///
/// Implement this trait to react to violations in your own way (logging, metrics,
/// on-screen debug overlays).
pub trait ViolationObserver {
    /// Called when a rule violation is detected.
    fn on_violation(&self, violation: &RuleViolation);
}

/// Logs violations through `tracing`. This is where reports go when a session has no observer.
///
/// Warnings log at `warn`, errors and critical violations at `error`. Severity, kind, location
/// and turn are structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    /// Creates a new tracing observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ViolationObserver for TracingObserver {
    fn on_violation(&self, violation: &RuleViolation) {
        let severity = violation.severity.as_str();
        let kind = violation.kind.as_str();
        let location = violation.location;
        let turn = violation.turn;

        match violation.severity {
            ViolationSeverity::Warning => {
                tracing::warn!(severity, kind, location, ?turn, "{}", violation.message);
            },
            ViolationSeverity::Error | ViolationSeverity::Critical => {
                tracing::error!(severity, kind, location, ?turn, "{}", violation.message);
            },
        }
    }
}

/// Built-in observer that collects violations for testing.
///
/// # Example
///
/// ```
/// use ladder_session::telemetry::{CollectingObserver, ViolationKind, ViolationObserver, RuleViolation, ViolationSeverity};
///
/// let observer = CollectingObserver::new();
/// observer.on_violation(&RuleViolation::new(
///     ViolationSeverity::Warning,
///     ViolationKind::EventQueue,
///     "dropped oldest event",
///     "test.rs:1",
/// ));
///
/// assert_eq!(observer.violations().len(), 1);
/// assert!(observer.has_violation(ViolationKind::EventQueue));
/// ```
#[derive(Debug, Default)]
pub struct CollectingObserver {
    violations: Mutex<Vec<RuleViolation>>,
}

impl CollectingObserver {
    /// Creates a new collecting observer with an empty violation list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            violations: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of all collected violations.
    #[must_use]
    pub fn violations(&self) -> Vec<RuleViolation> {
        self.violations.lock().clone()
    }

    /// Returns the number of collected violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.lock().len()
    }

    /// Returns true if no violations have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.lock().is_empty()
    }

    /// Checks if any violation of the specified kind has been collected.
    #[must_use]
    pub fn has_violation(&self, kind: ViolationKind) -> bool {
        self.violations.lock().iter().any(|v| v.kind == kind)
    }

    /// Returns all violations matching the specified kind.
    #[must_use]
    pub fn violations_of_kind(&self, kind: ViolationKind) -> Vec<RuleViolation> {
        self.violations
            .lock()
            .iter()
            .filter(|v| v.kind == kind)
            .cloned()
            .collect()
    }
}

impl ViolationObserver for CollectingObserver {
    fn on_violation(&self, violation: &RuleViolation) {
        self.violations.lock().push(violation.clone());
    }
}

/// Forwards every violation to each of its observers, e.g. to log and collect at once.
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ViolationObserver>>,
}

impl CompositeObserver {
    /// Creates a composite observer from a list of observers.
    #[must_use]
    pub fn from_observers(observers: Vec<Arc<dyn ViolationObserver>>) -> Self {
        Self { observers }
    }
}

impl ViolationObserver for CompositeObserver {
    fn on_violation(&self, violation: &RuleViolation) {
        for observer in &self.observers {
            observer.on_violation(violation);
        }
    }
}

impl std::fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("num_observers", &self.observers.len())
            .finish()
    }
}

/// Reports a rule violation with location tracking to the [`TracingObserver`].
///
/// Used where no session observer is in reach (e.g. inside the movement resolver or the RNG).
///
/// ```
/// use ladder_session::{report_violation, telemetry::{ViolationSeverity, ViolationKind}};
///
/// report_violation!(ViolationSeverity::Warning, ViolationKind::Topology,
///     "transition from {} lands on transition start {}", 40, 60);
/// ```
#[macro_export]
macro_rules! report_violation {
    ($severity:expr, $kind:expr, $msg:literal) => {{
        use $crate::telemetry::ViolationObserver as _;
        let violation = $crate::telemetry::RuleViolation::new(
            $severity,
            $kind,
            $msg,
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::TracingObserver.on_violation(&violation);
    }};

    ($severity:expr, $kind:expr, $fmt:literal, $($arg:tt)+) => {{
        use $crate::telemetry::ViolationObserver as _;
        let violation = $crate::telemetry::RuleViolation::new(
            $severity,
            $kind,
            format!($fmt, $($arg)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::TracingObserver.on_violation(&violation);
    }};
}

/// Asserts that no violations have been collected.
///
/// # Panics
///
/// Panics if the observer contains any violations, printing them for debugging.
///
/// ```
/// use ladder_session::{assert_no_violations, telemetry::CollectingObserver};
///
/// let observer = CollectingObserver::new();
/// assert_no_violations!(observer);
/// ```
#[macro_export]
macro_rules! assert_no_violations {
    ($observer:expr) => {{
        let violations = $observer.violations();
        assert!(
            violations.is_empty(),
            "Expected no violations, but found {}:\n{:#?}",
            violations.len(),
            violations
        );
    }};

    ($observer:expr, $msg:expr) => {{
        let violations = $observer.violations();
        assert!(
            violations.is_empty(),
            "{}\nExpected no violations, but found {}:\n{:#?}",
            $msg,
            violations.len(),
            violations
        );
    }};
}

/// Asserts that a violation of the specified kind was collected.
///
/// # Panics
///
/// Panics if no violation of the specified kind was found.
#[macro_export]
macro_rules! assert_violation {
    ($observer:expr, $kind:expr) => {{
        assert!(
            $observer.has_violation($kind),
            "Expected violation of kind {:?}, but found: {:#?}",
            $kind,
            $observer.violations()
        );
    }};

    ($observer:expr, $kind:expr, $msg:expr) => {{
        assert!(
            $observer.has_violation($kind),
            "{}\nExpected violation of kind {:?}, but found: {:#?}",
            $msg,
            $kind,
            $observer.violations()
        );
    }};
}

/// Reports a violation to an optional observer, falling back to [`TracingObserver`] if `None`.
pub fn report_to_observer<O: ViolationObserver + ?Sized>(
    observer: Option<&Arc<O>>,
    violation: &RuleViolation,
) {
    match observer {
        Some(obs) => obs.on_violation(violation),
        None => TracingObserver.on_violation(violation),
    }
}

/// Reports a rule violation through a session's observer.
///
/// Like [`report_violation!`], but takes an `Option<Arc<dyn ViolationObserver>>` first and an
/// optional `turn = expr;` clause. A `None` observer falls back to [`TracingObserver`].
///
/// ```
/// use ladder_session::{report_violation_to, telemetry::{ViolationSeverity, ViolationKind, CollectingObserver, ViolationObserver}};
/// use std::sync::Arc;
///
/// let collector = Arc::new(CollectingObserver::new());
/// let observer: Option<Arc<dyn ViolationObserver>> = Some(collector.clone());
///
/// report_violation_to!(&observer, ViolationSeverity::Error, ViolationKind::DiceRange,
///     "die face {} out of range", 9);
/// report_violation_to!(&observer, turn = 3; ViolationSeverity::Warning, ViolationKind::EventQueue,
///     "dropped oldest event");
/// assert_eq!(collector.len(), 2);
/// assert_eq!(collector.violations()[1].turn, Some(3));
/// ```
#[macro_export]
macro_rules! report_violation_to {
    ($observer:expr, turn = $turn:expr; $severity:expr, $kind:expr, $msg:literal) => {{
        let violation = $crate::telemetry::RuleViolation::new(
            $severity,
            $kind,
            $msg,
            concat!(file!(), ":", line!()),
        )
        .with_turn($turn);
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};

    ($observer:expr, turn = $turn:expr; $severity:expr, $kind:expr, $fmt:literal, $($arg:tt)+) => {{
        let violation = $crate::telemetry::RuleViolation::new(
            $severity,
            $kind,
            format!($fmt, $($arg)+),
            concat!(file!(), ":", line!()),
        )
        .with_turn($turn);
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};

    ($observer:expr, $severity:expr, $kind:expr, $msg:literal) => {{
        let violation = $crate::telemetry::RuleViolation::new(
            $severity,
            $kind,
            $msg,
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};

    ($observer:expr, $severity:expr, $kind:expr, $fmt:literal, $($arg:tt)+) => {{
        let violation = $crate::telemetry::RuleViolation::new(
            $severity,
            $kind,
            format!($fmt, $($arg)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};
}

// ==========================================
// Runtime Invariant Checking
// ==========================================

/// Result of an invariant check.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvariantViolation {
    /// Name of the type whose invariant was violated.
    pub type_name: &'static str,
    /// Description of the violated invariant.
    pub invariant: String,
    /// Additional diagnostic context.
    pub details: Option<String>,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    #[must_use]
    pub fn new(type_name: &'static str, invariant: impl Into<String>) -> Self {
        Self {
            type_name,
            invariant: invariant.into(),
            details: None,
        }
    }

    /// Adds additional details to the violation.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.type_name, self.invariant)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

/// Trait for types that maintain internal invariants.
///
/// Types implementing this trait can have their invariants checked at runtime
/// during debug builds or when the `paranoid` feature is enabled.
pub trait InvariantChecker {
    /// Checks that all invariants of this type are satisfied.
    ///
    /// Returns `Ok(())` if all invariants hold, or an `InvariantViolation`
    /// describing the first broken invariant.
    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}

/// Checks invariants in debug builds and reports failures as critical violations.
///
/// The first form reports to the [`TracingObserver`]. The second reports to a session's
/// `Option<Arc<dyn ViolationObserver>>` and tags the report with where the check ran.
/// Compiles to nothing in release builds unless the `paranoid` feature is enabled.
///
/// ```text
/// debug_check_invariants!(expr);
/// debug_check_invariants!(expr, observer = session_observer, "after tick");
/// ```
#[macro_export]
#[cfg(any(debug_assertions, feature = "paranoid"))]
macro_rules! debug_check_invariants {
    ($expr:expr) => {{
        use $crate::telemetry::InvariantChecker as _;
        if let Err(violation) = $expr.check_invariants() {
            $crate::report_violation!(
                $crate::telemetry::ViolationSeverity::Critical,
                $crate::telemetry::ViolationKind::Invariant,
                "{}",
                violation
            );
        }
    }};

    ($expr:expr, observer = $observer:expr, $context:expr) => {{
        use $crate::telemetry::InvariantChecker as _;
        if let Err(violation) = $expr.check_invariants() {
            $crate::report_violation_to!(
                $observer,
                $crate::telemetry::ViolationSeverity::Critical,
                $crate::telemetry::ViolationKind::Invariant,
                "{} [context: {}]",
                violation,
                $context
            );
        }
    }};
}

/// No-op version for release builds without `paranoid` feature.
#[macro_export]
#[cfg(not(any(debug_assertions, feature = "paranoid")))]
macro_rules! debug_check_invariants {
    ($expr:expr) => {{}};
    ($expr:expr, observer = $observer:expr, $context:expr) => {{}};
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

    fn warning(kind: ViolationKind) -> RuleViolation {
        RuleViolation::new(ViolationSeverity::Warning, kind, "test", "test.rs:1")
    }

    #[test]
    fn test_violation_severity_ordering() {
        assert!(ViolationSeverity::Warning < ViolationSeverity::Error);
        assert!(ViolationSeverity::Error < ViolationSeverity::Critical);
    }

    #[test]
    fn test_violation_kind_as_str() {
        assert_eq!(ViolationKind::Topology.as_str(), "topology");
        assert_eq!(ViolationKind::DiceRange.as_str(), "dice_range");
        assert_eq!(ViolationKind::EventQueue.as_str(), "event_queue");
        assert_eq!(ViolationKind::TurnOrder.as_str(), "turn_order");
        assert_eq!(ViolationKind::Invariant.as_str(), "invariant");
    }

    #[test]
    fn test_rule_violation_builder() {
        let violation = RuleViolation::new(
            ViolationSeverity::Error,
            ViolationKind::DiceRange,
            "die face out of range",
            "test.rs:42",
        )
        .with_turn(12);

        assert_eq!(violation.severity, ViolationSeverity::Error);
        assert_eq!(violation.kind, ViolationKind::DiceRange);
        assert_eq!(violation.location, "test.rs:42");
        assert_eq!(violation.turn, Some(12));
    }

    #[test]
    fn test_rule_violation_display() {
        let violation = RuleViolation::new(
            ViolationSeverity::Warning,
            ViolationKind::EventQueue,
            "dropped oldest event",
            "test.rs:10",
        )
        .with_turn(5);

        let display = violation.to_string();
        assert!(display.contains("warning"));
        assert!(display.contains("event_queue"));
        assert!(display.contains("dropped oldest event"));
        assert!(display.contains("test.rs:10"));
        assert!(display.contains("turn=5"));
    }

    #[test]
    fn test_collecting_observer() {
        let observer = CollectingObserver::new();
        assert!(observer.is_empty());

        observer.on_violation(&warning(ViolationKind::Topology));
        observer.on_violation(&RuleViolation::new(
            ViolationSeverity::Error,
            ViolationKind::DiceRange,
            "second",
            "test.rs:2",
        ));

        assert_eq!(observer.len(), 2);
        assert!(observer.has_violation(ViolationKind::Topology));
        assert!(observer.has_violation(ViolationKind::DiceRange));
        assert!(!observer.has_violation(ViolationKind::TurnOrder));
        assert_eq!(observer.violations_of_kind(ViolationKind::Topology).len(), 1);
        assert_eq!(
            observer.violations_of_kind(ViolationKind::DiceRange)[0].severity,
            ViolationSeverity::Error
        );
    }

    #[test]
    fn test_composite_observer_fans_out() {
        let collector1 = Arc::new(CollectingObserver::new());
        let collector2 = Arc::new(CollectingObserver::new());
        let composite = CompositeObserver::from_observers(vec![
            collector1.clone() as Arc<dyn ViolationObserver>,
            collector2.clone() as Arc<dyn ViolationObserver>,
        ]);

        composite.on_violation(&warning(ViolationKind::EventQueue));

        assert_eq!(collector1.len(), 1);
        assert_eq!(collector2.len(), 1);
        assert!(format!("{composite:?}").contains("num_observers: 2"));
    }

    #[test]
    fn test_report_violation_macro_does_not_panic() {
        report_violation!(
            ViolationSeverity::Warning,
            ViolationKind::Topology,
            "chained transition"
        );
        report_violation!(
            ViolationSeverity::Error,
            ViolationKind::DiceRange,
            "face {} out of range",
            0
        );
    }

    #[test]
    fn test_report_violation_to_some_and_none() {
        let collector = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collector.clone());
        report_violation_to!(
            &observer,
            ViolationSeverity::Warning,
            ViolationKind::EventQueue,
            "dropped {} events",
            1
        );
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.violations()[0].turn, None);

        let none: Option<Arc<dyn ViolationObserver>> = None;
        report_violation_to!(
            &none,
            ViolationSeverity::Warning,
            ViolationKind::EventQueue,
            "goes to tracing"
        );
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_report_violation_to_with_turn() {
        let collector = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collector.clone());
        report_violation_to!(
            &observer,
            turn = 4;
            ViolationSeverity::Error,
            ViolationKind::DiceRange,
            "face {} out of range",
            7
        );
        let collected = collector.violations();
        assert_eq!(collected[0].turn, Some(4));
        assert_eq!(collected[0].message, "face 7 out of range");
    }

    #[test]
    fn test_assert_macros() {
        let observer = CollectingObserver::new();
        assert_no_violations!(observer);
        observer.on_violation(&warning(ViolationKind::TurnOrder));
        assert_violation!(observer, ViolationKind::TurnOrder);
    }

    #[test]
    fn test_invariant_violation_display() {
        let plain = InvariantViolation::new("BoardTopology", "snake does not descend");
        assert_eq!(plain.to_string(), "BoardTopology: snake does not descend");

        let detailed = plain.with_details("head=10, tail=20");
        assert_eq!(
            detailed.to_string(),
            "BoardTopology: snake does not descend (head=10, tail=20)"
        );
    }

    #[test]
    fn test_debug_check_invariants_reports_without_panicking() {
        struct AlwaysBroken;
        impl InvariantChecker for AlwaysBroken {
            fn check_invariants(&self) -> Result<(), InvariantViolation> {
                Err(InvariantViolation::new("AlwaysBroken", "broken"))
            }
        }
        debug_check_invariants!(AlwaysBroken);

        let collector = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collector.clone());
        debug_check_invariants!(AlwaysBroken, observer = observer, "after test");
        let violations = collector.violations_of_kind(ViolationKind::Invariant);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, ViolationSeverity::Critical);
        assert!(violations[0].message.contains("after test"));
    }

    #[test]
    fn test_violation_json_shape() {
        let violation = RuleViolation::new(
            ViolationSeverity::Critical,
            ViolationKind::Invariant,
            "broken",
            "test.rs:1",
        );
        let json = serde_json::to_string(&violation).unwrap();
        assert!(json.contains(r#""severity":"critical""#));
        assert!(json.contains(r#""kind":"invariant""#));
        assert!(json.contains(r#""turn":null"#));
    }
}
