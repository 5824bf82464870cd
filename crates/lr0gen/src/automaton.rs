//! LR(0) automaton construction.

use crate::{
    config::{CapacityError, Limits, Resource},
    grammar::{Grammar, ProductionID, Symbol},
    item::{Item, ItemSet},
    kernel,
    util::display_fn,
};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID {
    raw: u16,
}

impl StateID {
    /// The start state, whose kernel is the augmented item `S' -> . S`.
    pub const START: Self = Self::new(0);

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    /// The number of states is bounded by `Limits`, which clamps it to `u16::MAX`.
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= u16::MAX as usize);
        Self::new(index as u16)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }
}

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.raw)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum StateKind {
    #[default]
    Normal,
    /// The state holds the completed augmented item `S' -> S .`.
    Accept,
    /// The state holds a reduce item.
    Final,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Accept => f.write_str("accept"),
            Self::Final => f.write_str("final"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    pub from: StateID,
    pub on: Symbol,
    pub to: StateID,
}

#[derive(Debug, Clone, Default)]
pub struct State {
    items: ItemSet,
    kernel_size: usize,
    transitions: Vec<Transition>,
    kind: StateKind,
    reduces: Vec<ProductionID>,
}

impl State {
    fn with_kernel(kernel: ItemSet, limits: &Limits) -> Result<Self, CapacityError> {
        let mut state = Self::default();
        for item in kernel {
            state.add_item_if_absent(Item::kernel(item.production, item.marker), limits)?;
        }
        Ok(state)
    }

    /// The items of this state: kernel items first, then those added by closure.
    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    pub fn kernel(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().filter(|item| item.is_kernel)
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions[..]
    }

    /// The target of the transition on `on`, if any.
    pub fn transition(&self, on: Symbol) -> Option<StateID> {
        self.transitions
            .iter()
            .find(|t| t.on == on)
            .map(|t| t.to)
    }

    /// The classification given by the last reduce item of this state.
    pub fn kind(&self) -> StateKind {
        self.kind
    }

    /// Every production reduced in this state, in item order.
    pub fn reduces(&self) -> &[ProductionID] {
        &self.reduces[..]
    }

    pub(crate) fn add_item_if_absent(
        &mut self,
        item: Item,
        limits: &Limits,
    ) -> Result<bool, CapacityError> {
        if self.items.contains(&item) {
            return Ok(false);
        }
        limits.check(Resource::ItemsPerState, self.items.len() + 1)?;
        if item.is_kernel {
            self.kernel_size += 1;
        }
        self.items.insert(item);
        Ok(true)
    }

    /// Record `transition` unless this state already has one on the same symbol.
    pub(crate) fn add_transition_if_absent(&mut self, transition: Transition) -> bool {
        if self.transition(transition.on).is_some() {
            return false;
        }
        self.transitions.push(transition);
        true
    }

    pub(crate) fn set_kind(&mut self, kind: StateKind) {
        self.kind = kind;
    }

    /// Append the closure items of this state behind its kernel.
    fn close(&mut self, g: &Grammar, limits: &Limits) -> Result<(), CapacityError> {
        let mut cursor = 0;
        while let Some(item) = self.items.get_index(cursor).copied() {
            for new_item in item.expansions(g) {
                self.add_item_if_absent(new_item, limits)?;
            }
            cursor += 1;
        }
        Ok(())
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            writeln!(f, "## items:")?;
            for item in &self.items {
                write!(f, "- {}", item.display(g))?;
                if item.is_kernel {
                    f.write_str("  (kernel)")?;
                }
                writeln!(f)?;
            }
            if !self.transitions.is_empty() {
                writeln!(f, "## transitions:")?;
                for t in &self.transitions {
                    writeln!(f, "- {} => {:?}", t.on, t.to)?;
                }
            }
            if !self.reduces.is_empty() {
                writeln!(f, "## reduces:")?;
                for reduce in &self.reduces {
                    writeln!(f, "- {}", g.production(*reduce).display())?;
                }
            }
            Ok(())
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("error during automaton construction")]
    Capacity(
        #[from]
        #[source]
        CapacityError,
    ),
}

/// The LR(0) characteristic automaton of a grammar.
#[derive(Debug)]
pub struct Automaton {
    states: Vec<State>,
}

impl Automaton {
    pub fn states(&self) -> &[State] {
        &self.states[..]
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.index()]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = StateID> {
        (0..self.states.len()).map(StateID::from_index)
    }

    /// Every transition of the automaton, ordered by source state.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.states.iter().flat_map(|state| state.transitions())
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, state) in self.states.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "#### State {:?} ({})", StateID::from_index(i), state.kind)?;
                write!(f, "{}", state.display(g))?;
            }
            Ok(())
        })
    }
}

/// The worklist construction of an [`Automaton`].
///
/// States are discovered breadth first: the cursor walks over the state list
/// while new states are appended behind it, and construction is done once the
/// cursor catches up with the list.
#[derive(Debug)]
pub(crate) struct Builder<'g> {
    grammar: &'g Grammar,
    limits: Limits,
    states: Vec<State>,
}

impl<'g> Builder<'g> {
    pub(crate) fn new(grammar: &'g Grammar, limits: &Limits) -> Self {
        Self {
            grammar,
            limits: *limits,
            states: vec![],
        }
    }

    pub(crate) fn build(mut self) -> Result<Automaton, ConstructionError> {
        let span = tracing::debug_span!("build_automaton");
        let _entered = span.enter();

        let start: ItemSet = Some(Item::kernel(ProductionID::AUGMENTED, 0))
            .into_iter()
            .collect();
        let start = State::with_kernel(start, &self.limits)?;
        self.push_state(start)?;

        let mut next_undone = 0;
        while next_undone < self.states.len() {
            self.expand(StateID::from_index(next_undone))?;
            next_undone += 1;
        }

        tracing::debug!("constructed {} states", self.states.len());
        Ok(Automaton {
            states: self.states,
        })
    }

    fn push_state(&mut self, state: State) -> Result<StateID, CapacityError> {
        self.limits
            .check(Resource::States, self.states.len() + 1)?;
        let id = StateID::from_index(self.states.len());
        self.states.push(state);
        Ok(id)
    }

    fn expand(&mut self, current: StateID) -> Result<(), ConstructionError> {
        let g = self.grammar;
        let state = &mut self.states[current.index()];
        state.close(g, &self.limits)?;

        // closure is done, so the item list no longer changes.
        let items: Vec<Item> = state.items().iter().copied().collect();
        for item in items {
            match item.next_symbol(g) {
                Some(on) => {
                    if self.states[current.index()].transition(on).is_some() {
                        continue;
                    }
                    let to = match kernel::equivalent_state_in(&self.states, current, on, g) {
                        Some(to) => to,
                        None => {
                            let kernel = kernel::successor_kernel(
                                self.states[current.index()].items(),
                                on,
                                g,
                            );
                            let state = State::with_kernel(kernel, &self.limits)?;
                            let id = self.push_state(state)?;
                            tracing::trace!("new state {:?} from {:?} on {}", id, current, on);
                            id
                        }
                    };
                    self.states[current.index()].add_transition_if_absent(Transition {
                        from: current,
                        on,
                        to,
                    });
                }
                None => {
                    let kind = if item.production == ProductionID::AUGMENTED
                        && item.prev_symbol(g) == Some(g.start_symbol())
                    {
                        StateKind::Accept
                    } else {
                        StateKind::Final
                    };
                    let state = &mut self.states[current.index()];
                    if !state.reduces.contains(&item.production) {
                        state.reduces.push(item.production);
                    }
                    state.set_kind(kind);
                }
            }
        }
        Ok(())
    }
}
