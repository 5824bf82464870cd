//! Kernel equivalence between states.
//!
//! Two states are the same state exactly when their kernels are equal as sets
//! of items. Closure items are never compared.

use crate::{
    automaton::{Automaton, State, StateID},
    grammar::{Grammar, Symbol},
    item::{Item, ItemSet},
};

/// The kernel of the state reached from `items` on `on`: every item whose
/// next symbol is `on`, with the marker moved over it.
pub fn successor_kernel(items: &ItemSet, on: Symbol, g: &Grammar) -> ItemSet {
    items
        .iter()
        .filter(|item| item.next_symbol(g) == Some(on))
        .map(Item::advance)
        .collect()
}

/// Whether `kernel` is exactly the kernel of `state`.
pub fn is_same_kernel(kernel: &ItemSet, state: &State) -> bool {
    kernel.len() == state.kernel_size()
        && kernel
            .iter()
            .all(|item| matches!(state.items().get(item), Some(found) if found.is_kernel))
}

/// Find the first of `states` whose kernel is `kernel`.
pub fn find_matching_state(states: &[State], kernel: &ItemSet) -> Option<StateID> {
    states
        .iter()
        .position(|state| is_same_kernel(kernel, state))
        .map(StateID::from_index)
}

/// Find an existing state of `automaton` that the transition from `source` on `on` leads to.
///
/// Returns `None` when `source` has no item that shifts `on`, or when no state
/// with the successor kernel exists.
pub fn find_equivalent_state(
    automaton: &Automaton,
    source: StateID,
    on: Symbol,
    g: &Grammar,
) -> Option<StateID> {
    equivalent_state_in(automaton.states(), source, on, g)
}

/// Same as [`find_equivalent_state`], over the states of an automaton under construction.
pub(crate) fn equivalent_state_in(
    states: &[State],
    source: StateID,
    on: Symbol,
    g: &Grammar,
) -> Option<StateID> {
    let kernel = successor_kernel(states[source.index()].items(), on, g);
    if kernel.is_empty() {
        return None;
    }
    find_matching_state(states, &kernel)
}
