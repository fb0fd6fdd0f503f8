//! Generic state machine with transition validation and hooks
//!
//! A concrete machine declares its full state set through [`MachineState`];
//! every transition is checked against that set before it takes effect, so a
//! machine can never wander into a state it did not declare. Hooks around
//! each transition give callers a place for diagnostics without any global
//! logging state.

use crate::error::StateMachineError;
use std::fmt;

/// Callback invoked around a state transition with the `(from, to)` pair
pub type TransitionHook<S> = Box<dyn FnMut(S, S) + Send>;

/// The finite set of states a [`StateMachine`] may move between.
///
/// Implementors enumerate every reachable state in
/// [`states`](MachineState::states); the machine validates each transition
/// target against that set. The initial state defaults to the first declared
/// state, matching the common case of enums declared in lifecycle order.
pub trait MachineState: Copy + PartialEq + fmt::Debug + 'static {
    /// Every state this machine may occupy, in declaration order
    fn states() -> &'static [Self];

    /// The state a fresh (or reset) machine starts in.
    ///
    /// Defaults to the first declared state. [`StateMachine::new`] rejects an
    /// empty declaration before this is ever consulted.
    fn initial() -> Self {
        Self::states()[0]
    }

    /// Display name used in logs and diagnostics
    fn name(&self) -> &'static str;
}

/// State machine with a validated transition target set.
///
/// Tracks the current state, validates every transition against the states
/// declared by `S`, and runs optional hooks before and after each transition
/// takes effect. The most recent `(from, to)` pair is always recorded and
/// queryable via [`last_transition`](StateMachine::last_transition).
///
/// # Examples
///
/// ```
/// use csvstream::machine::{MachineState, StateMachine};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Light {
///     Red,
///     Green,
/// }
///
/// impl MachineState for Light {
///     fn states() -> &'static [Self] {
///         &[Light::Red, Light::Green]
///     }
///
///     fn name(&self) -> &'static str {
///         match self {
///             Light::Red => "Red",
///             Light::Green => "Green",
///         }
///     }
/// }
///
/// let mut machine = StateMachine::<Light>::new().unwrap();
/// assert_eq!(machine.current_state(), Light::Red);
/// machine.transition(Light::Green).unwrap();
/// assert_eq!(machine.last_transition(), Some((Light::Red, Light::Green)));
/// ```
pub struct StateMachine<S: MachineState> {
    // State
    current: S,
    last_transition: Option<(S, S)>,

    // Hooks
    before: Option<TransitionHook<S>>,
    after: Option<TransitionHook<S>>,
}

impl<S: MachineState> StateMachine<S> {
    /// Create a machine in the initial state declared by `S`.
    ///
    /// Fails if `S` declares no states, declares a state more than once, or
    /// declares an initial state outside its own state set.
    pub fn new() -> Result<Self, StateMachineError> {
        let states = S::states();
        if states.is_empty() {
            return Err(StateMachineError::NoStatesDeclared);
        }
        for (i, state) in states.iter().enumerate() {
            if states[..i].contains(state) {
                return Err(StateMachineError::DuplicateState(state.name()));
            }
        }
        let initial = S::initial();
        if !states.contains(&initial) {
            return Err(StateMachineError::InvalidInitialState(initial.name()));
        }

        Ok(StateMachine {
            current: initial,
            last_transition: None,
            before: None,
            after: None,
        })
    }

    /// Attach a hook that runs before each transition takes effect (builder pattern)
    pub fn before_transition(mut self, hook: impl FnMut(S, S) + Send + 'static) -> Self {
        self.before = Some(Box::new(hook));
        self
    }

    /// Attach a hook that runs after each transition takes effect (builder pattern)
    pub fn after_transition(mut self, hook: impl FnMut(S, S) + Send + 'static) -> Self {
        self.after = Some(Box::new(hook));
        self
    }

    /// The state the machine is currently in
    pub fn current_state(&self) -> S {
        self.current
    }

    /// The most recent `(from, to)` pair, if any transition has happened
    pub fn last_transition(&self) -> Option<(S, S)> {
        self.last_transition
    }

    /// Move to `to`, validating it against the declared state set.
    ///
    /// On success the `(from, to)` pair is recorded and logged, the before
    /// hook runs, the new state takes effect, and the after hook runs.
    pub fn transition(&mut self, to: S) -> Result<(), StateMachineError> {
        if !S::states().contains(&to) {
            return Err(StateMachineError::InvalidState(to.name()));
        }

        let from = self.current;
        log::trace!("transitioning from {} to {}", from.name(), to.name());
        self.last_transition = Some((from, to));
        if let Some(hook) = self.before.as_mut() {
            hook(from, to);
        }
        self.current = to;
        if let Some(hook) = self.after.as_mut() {
            hook(from, to);
        }
        Ok(())
    }

    /// Return to the initial state
    pub fn reset(&mut self) -> Result<(), StateMachineError> {
        self.transition(S::initial())
    }
}

impl<S: MachineState> fmt::Debug for StateMachine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("last_transition", &self.last_transition)
            .finish()
    }
}
