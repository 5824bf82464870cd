//! Resource limits and construction settings.

use crate::{
    automaton::{Automaton, Builder, ConstructionError},
    grammar::Grammar,
};
use std::fmt;

/// Upper bounds on the storage used while loading a grammar and building its automaton.
///
/// Every bound is checked, and exceeding one is reported as a [`CapacityError`].
/// Bounds that index into `u16` identifiers are clamped to `u16::MAX`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Limits {
    max_productions: usize,
    max_body_len: usize,
    max_items_per_state: usize,
    max_states: usize,
}

impl Limits {
    pub const DEFAULT: Self = Self {
        max_productions: 256,
        max_body_len: 64,
        max_items_per_state: 512,
        max_states: 1024,
    };

    const ID_BOUND: usize = u16::MAX as usize;

    /// The maximum number of productions, including the augmented one.
    pub fn max_productions(&self) -> usize {
        self.max_productions
    }

    /// The maximum number of symbols in a production body.
    pub fn max_body_len(&self) -> usize {
        self.max_body_len
    }

    /// The maximum number of items (kernel and closure) in a single state.
    pub fn max_items_per_state(&self) -> usize {
        self.max_items_per_state
    }

    /// The maximum number of states in the automaton.
    pub fn max_states(&self) -> usize {
        self.max_states
    }

    pub fn with_max_productions(mut self, n: usize) -> Self {
        self.max_productions = n.min(Self::ID_BOUND);
        self
    }

    pub fn with_max_body_len(mut self, n: usize) -> Self {
        self.max_body_len = n.min(Self::ID_BOUND);
        self
    }

    pub fn with_max_items_per_state(mut self, n: usize) -> Self {
        self.max_items_per_state = n;
        self
    }

    pub fn with_max_states(mut self, n: usize) -> Self {
        self.max_states = n.min(Self::ID_BOUND);
        self
    }

    pub(crate) fn check(&self, resource: Resource, requested: usize) -> Result<(), CapacityError> {
        let limit = match resource {
            Resource::Productions => self.max_productions,
            Resource::BodyLength => self.max_body_len,
            Resource::ItemsPerState => self.max_items_per_state,
            Resource::States => self.max_states,
        };
        if requested > limit {
            return Err(CapacityError { resource, limit });
        }
        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The resource whose capacity has been exhausted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resource {
    Productions,
    BodyLength,
    ItemsPerState,
    States,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Productions => f.write_str("productions"),
            Self::BodyLength => f.write_str("symbols in a production body"),
            Self::ItemsPerState => f.write_str("items in a state"),
            Self::States => f.write_str("states"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("capacity exceeded: at most {limit} {resource} are allowed")]
pub struct CapacityError {
    pub resource: Resource,
    pub limit: usize,
}

/// Settings for building an LR(0) automaton.
///
/// ```
/// use lr0gen::{config::Config, grammar::Grammar};
///
/// let grammar = Grammar::define('S', |g| {
///     g.production('S', "aSb")?;
///     g.production('S', "")?;
///     Ok(())
/// })
/// .unwrap();
/// let automaton = Config::new().max_states(64).generate(&grammar).unwrap();
/// assert_eq!(automaton.len(), 5);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Config {
    limits: Limits,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn max_items_per_state(mut self, n: usize) -> Self {
        self.limits = self.limits.with_max_items_per_state(n);
        self
    }

    pub fn max_states(mut self, n: usize) -> Self {
        self.limits = self.limits.with_max_states(n);
        self
    }

    /// Build the LR(0) automaton of `grammar` under these settings.
    pub fn generate(&self, grammar: &Grammar) -> Result<Automaton, ConstructionError> {
        Builder::new(grammar, &self.limits).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_reports_the_exhausted_resource() {
        let limits = Limits::default().with_max_states(3);
        assert!(limits.check(Resource::States, 3).is_ok());
        assert_eq!(
            limits.check(Resource::States, 4),
            Err(CapacityError {
                resource: Resource::States,
                limit: 3,
            })
        );
    }

    #[test]
    fn id_bounded_limits_are_clamped() {
        let limits = Limits::default()
            .with_max_productions(usize::MAX)
            .with_max_states(usize::MAX)
            .with_max_items_per_state(usize::MAX);
        assert_eq!(limits.max_productions(), u16::MAX as usize);
        assert_eq!(limits.max_states(), u16::MAX as usize);
        assert_eq!(limits.max_items_per_state(), usize::MAX);
    }
}
