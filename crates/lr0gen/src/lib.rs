//! Construction of the LR(0) characteristic automaton of a context-free grammar.
//!
//! ```
//! use lr0gen::grammar::Grammar;
//!
//! let grammar = Grammar::from_str("S -> A A\nA -> a A | b\n", 'S').unwrap();
//! let automaton = lr0gen::build_automaton(&grammar).unwrap();
//! println!("{}", automaton.display(&grammar));
//! assert_eq!(automaton.len(), 7);
//! ```

pub mod automaton;
pub mod config;
pub mod grammar;
pub mod item;
pub mod kernel;
pub mod syntax;
pub mod types;
pub mod util;

use crate::{
    automaton::{Automaton, ConstructionError},
    config::Config,
    grammar::Grammar,
};

/// Build the LR(0) automaton of `grammar` with the default limits.
pub fn build_automaton(grammar: &Grammar) -> Result<Automaton, ConstructionError> {
    Config::new().generate(grammar)
}
