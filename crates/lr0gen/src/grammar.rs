//! Grammar types.

use crate::{
    config::{CapacityError, Limits, Resource},
    types::Map,
    util::{display_fn, write_body},
};
use std::{fmt, fs, io, path::Path};

/// A grammar symbol, written as a single character.
///
/// The uppercase letters `A`-`Z` are nonterminals and every other character is a terminal.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Symbol {
    raw: char,
}

impl Symbol {
    /// Reserved terminal that stands for the empty string.
    pub const EPSILON: Self = Self::new('ε');

    #[inline]
    pub const fn new(raw: char) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn as_char(self) -> char {
        self.raw
    }

    #[inline]
    pub const fn is_nonterminal(self) -> bool {
        matches!(self.raw, 'A'..='Z')
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        !self.is_nonterminal()
    }

    #[inline]
    pub const fn is_epsilon(self) -> bool {
        self.raw == Self::EPSILON.raw
    }
}

impl From<char> for Symbol {
    fn from(raw: char) -> Self {
        Self::new(raw)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nonterminal() {
            write!(f, "N({})", self.raw)
        } else {
            write!(f, "T({})", self.raw)
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// Candidates for the driver of the augmented production, in order of preference.
pub const FRESH_CANDIDATES: [char; 26] = [
    'Z', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q',
    'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
];

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID {
    raw: u16,
}

impl ProductionID {
    /// The augmented start production `S' -> S`.
    pub const AUGMENTED: Self = Self::new(0);

    const OFFSET: u16 = 1;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.raw as usize
    }
}

impl fmt::Debug for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            &Self::AUGMENTED => write!(f, "P#Augmented"),
            _ => write!(f, "P#{:03}", self.raw),
        }
    }
}

/// The type that represents a production in grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    id: ProductionID,
    driver: Symbol,
    body: Vec<Symbol>,
}

impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn driver(&self) -> Symbol {
        self.driver
    }

    /// Return the right-hand side of this production. Empty for `ε`.
    pub fn body(&self) -> &[Symbol] {
        &self.body[..]
    }

    // `"A -> a B c"`
    pub fn display(&self) -> impl fmt::Display + '_ {
        display_fn(move |f| {
            write!(f, "{} -> ", self.driver)?;
            write_body(f, &self.body, None)
        })
    }
}

/// An augmented grammar.
///
/// Production 0 is always the augmented production, whose driver is a fresh
/// nonterminal and whose body is the start symbol.
#[derive(Debug)]
pub struct Grammar {
    productions: Vec<Production>,
    start_symbol: Symbol,
    by_driver: Map<Symbol, Vec<ProductionID>>,
}

impl Grammar {
    pub fn from_file(path: impl AsRef<Path>, start: char) -> Result<Grammar, GrammarError> {
        let source = fs::read_to_string(path).map_err(GrammarError::Io)?;
        Self::from_str(&source, start)
    }

    /// Load a grammar from its textual form, skipping malformed lines.
    ///
    /// See [`crate::syntax::load`] for a variant that reports the skipped lines.
    pub fn from_str(source: &str, start: char) -> Result<Grammar, GrammarError> {
        crate::syntax::load(source, start, &Limits::default()).map(|loaded| loaded.grammar)
    }

    /// Define a grammar using the specified function, with the default limits.
    pub fn define<F>(start: char, f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarError>,
    {
        Self::define_with(&Limits::default(), start, f)
    }

    pub fn define_with<F>(limits: &Limits, start: char, f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef::augment(limits, Symbol::new(start))?;
        f(&mut def)?;
        def.end()
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[id.index()]
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions[..]
    }

    /// The augmented start production.
    pub fn augmented(&self) -> &Production {
        &self.productions[ProductionID::AUGMENTED.index()]
    }

    /// The start symbol of the original (non-augmented) grammar.
    pub fn start_symbol(&self) -> Symbol {
        self.start_symbol
    }

    /// The nonterminal chosen as the driver of the augmented production.
    pub fn fresh_symbol(&self) -> Symbol {
        self.augmented().driver
    }

    /// Iterate over the productions whose driver is `driver`, in definition order.
    pub fn productions_of(&self, driver: Symbol) -> impl Iterator<Item = &Production> + '_ {
        self.by_driver
            .get(&driver)
            .into_iter()
            .flatten()
            .map(move |id| self.production(*id))
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## start: {}", self.start_symbol)?;
        writeln!(f, "## productions:")?;
        for p in &self.productions {
            writeln!(f, "{:>3}: {}", p.id.raw, p.display())?;
        }
        Ok(())
    }
}

/// The contextual values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    limits: Limits,
    start: Symbol,
    productions: Vec<Production>,
    next_production_id: u16,
}

impl GrammarDef {
    /// Start a grammar definition, reserving id 0 for the augmented production `S' -> start`.
    ///
    /// The driver `S'` is resolved in [`GrammarDef::end`], once every user production is known.
    fn augment(limits: &Limits, start: Symbol) -> Result<Self, GrammarError> {
        if !start.is_nonterminal() {
            return Err(GrammarError::NonterminalExpected {
                symbol: start.as_char(),
            });
        }
        limits.check(Resource::Productions, 1)?;
        Ok(Self {
            limits: *limits,
            start,
            productions: vec![],
            next_production_id: ProductionID::OFFSET,
        })
    }

    /// Add a production whose body is written as a string of symbol characters.
    ///
    /// Both `""` and `"ε"` denote the empty body.
    pub fn production(&mut self, driver: char, body: &str) -> Result<ProductionID, GrammarError> {
        self.production_with(Symbol::new(driver), body.chars().map(Symbol::new))
    }

    pub fn production_with<I>(&mut self, driver: Symbol, body: I) -> Result<ProductionID, GrammarError>
    where
        I: IntoIterator<Item = Symbol>,
    {
        if !driver.is_nonterminal() {
            return Err(GrammarError::NonterminalExpected {
                symbol: driver.as_char(),
            });
        }

        let mut body: Vec<Symbol> = body.into_iter().collect();
        if body.iter().all(|s| s.is_epsilon()) {
            body.clear();
        }
        self.limits.check(Resource::BodyLength, body.len())?;

        if self
            .productions
            .iter()
            .any(|p| p.driver == driver && p.body == body)
        {
            return Err(GrammarError::DuplicateProduction {
                driver: driver.as_char(),
                body: body.iter().map(|s| s.as_char()).collect(),
            });
        }

        // The augmented production is counted too.
        self.limits
            .check(Resource::Productions, self.productions.len() + 2)?;

        let id = ProductionID::new(self.next_production_id);
        self.next_production_id += 1;
        self.productions.push(Production { id, driver, body });

        Ok(id)
    }

    fn end(mut self) -> Result<Grammar, GrammarError> {
        let fresh = resolve_fresh_symbol(&self.productions, self.start)?;
        tracing::debug!(
            "augmented production: {} -> {} (fresh symbol)",
            fresh,
            self.start
        );

        self.productions.insert(
            0,
            Production {
                id: ProductionID::AUGMENTED,
                driver: fresh,
                body: vec![self.start],
            },
        );

        let mut by_driver = Map::<Symbol, Vec<ProductionID>>::default();
        for p in &self.productions {
            by_driver.entry(p.driver).or_default().push(p.id);
        }

        Ok(Grammar {
            productions: self.productions,
            start_symbol: self.start,
            by_driver,
        })
    }
}

/// Pick the first of [`FRESH_CANDIDATES`] that is not the driver of any of `productions`.
///
/// `productions` are the user productions, i.e. those with id 1 and above. A candidate
/// that is the start symbol or occurs in some body is skipped as well, since it
/// would make the augmented production reachable from the user productions.
pub fn resolve_fresh_symbol(productions: &[Production], start: Symbol) -> Result<Symbol, GrammarError> {
    let in_use = |candidate: Symbol| {
        candidate == start
            || productions
                .iter()
                .any(|p| p.driver == candidate || p.body.contains(&candidate))
    };
    FRESH_CANDIDATES
        .iter()
        .map(|&c| Symbol::new(c))
        .find(|candidate| !in_use(*candidate))
        .ok_or(GrammarError::FreshSymbolExhausted)
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("IO error: {}", _0)]
    Io(io::Error),

    #[error("`{symbol}' is not a nonterminal (expected one of `A'..`Z')")]
    NonterminalExpected { symbol: char },

    #[error("duplicate production: {driver} -> {body}")]
    DuplicateProduction { driver: char, body: String },

    #[error("no fresh nonterminal is left for the augmented start production")]
    FreshSymbolExhausted,

    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic(g: &mut GrammarDef) -> Result<(), GrammarError> {
        g.production('S', "AA")?;
        g.production('A', "aA")?;
        g.production('A', "b")?;
        Ok(())
    }

    #[test]
    fn symbol_classification_is_lexical() {
        assert!(Symbol::new('A').is_nonterminal());
        assert!(Symbol::new('Z').is_nonterminal());
        assert!(Symbol::new('a').is_terminal());
        assert!(Symbol::new('(').is_terminal());
        assert!(Symbol::EPSILON.is_terminal());
        assert!(Symbol::EPSILON.is_epsilon());
    }

    #[test]
    fn augmented_production_has_id_zero() {
        let grammar = Grammar::define('S', classic).unwrap();
        eprintln!("{}", grammar);

        let augmented = grammar.augmented();
        assert_eq!(augmented.id(), ProductionID::AUGMENTED);
        assert_eq!(augmented.body(), &[Symbol::new('S')]);
        assert_eq!(grammar.productions().len(), 4);
        for (i, p) in grammar.productions().iter().enumerate() {
            assert_eq!(p.id().index(), i);
        }
    }

    #[test]
    fn fresh_symbol_avoids_drivers() {
        let grammar = Grammar::define('S', classic).unwrap();
        let fresh = grammar.fresh_symbol();
        assert!(fresh.is_nonterminal());
        assert_ne!(fresh, Symbol::new('S'));
        assert_ne!(fresh, Symbol::new('A'));
        assert_eq!(fresh, Symbol::new('Z'));
    }

    #[test]
    fn fresh_symbol_skips_the_sentinel_when_taken() {
        let grammar = Grammar::define('Z', |g| {
            g.production('Z', "aA")?;
            g.production('A', "b")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(grammar.fresh_symbol(), Symbol::new('B'));
    }

    #[test]
    fn fresh_symbol_avoids_the_start_symbol_and_body_nonterminals() {
        // `Z` has no production of its own but is still in use.
        let grammar = Grammar::define('S', |g| {
            g.production('S', "Za")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(grammar.fresh_symbol(), Symbol::new('A'));

        let grammar = Grammar::define('Z', |g| {
            g.production('S', "a")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(grammar.fresh_symbol(), Symbol::new('A'));
    }

    #[test]
    fn fresh_symbol_exhausted() {
        let err = Grammar::define('A', |g| {
            for c in 'A'..='Z' {
                g.production(c, "x")?;
            }
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarError::FreshSymbolExhausted));
    }

    #[test]
    fn driver_must_be_nonterminal() {
        let err = Grammar::define('S', |g| {
            g.production('x', "y")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarError::NonterminalExpected { symbol: 'x' }));

        let err = Grammar::define('s', |_| Ok(())).unwrap_err();
        assert!(matches!(err, GrammarError::NonterminalExpected { symbol: 's' }));
    }

    #[test]
    fn duplicate_production_is_rejected() {
        let err = Grammar::define('S', |g| {
            g.production('S', "a")?;
            g.production('S', "a")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarError::DuplicateProduction { driver: 'S', .. }));
    }

    #[test]
    fn epsilon_body_is_empty() {
        let grammar = Grammar::define('S', |g| {
            g.production('S', "ε")?;
            g.production('S', "a")?;
            Ok(())
        })
        .unwrap();
        let p = grammar.productions_of(Symbol::new('S')).next().unwrap();
        assert!(p.body().is_empty());
        assert_eq!(p.display().to_string(), "S -> ε");
    }

    #[test]
    fn productions_of_preserves_definition_order() {
        let grammar = Grammar::define('S', classic).unwrap();
        let bodies: Vec<String> = grammar
            .productions_of(Symbol::new('A'))
            .map(|p| p.display().to_string())
            .collect();
        assert_eq!(bodies, ["A -> a A", "A -> b"]);
        assert_eq!(grammar.productions_of(Symbol::new('a')).count(), 0);
    }

    #[test]
    fn production_capacity() {
        let limits = Limits::default().with_max_productions(3);
        let err = Grammar::define_with(&limits, 'S', classic).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::Capacity(CapacityError {
                resource: Resource::Productions,
                limit: 3,
            })
        ));

        let limits = Limits::default().with_max_productions(4);
        assert!(Grammar::define_with(&limits, 'S', classic).is_ok());
    }

    #[test]
    fn body_length_capacity() {
        let limits = Limits::default().with_max_body_len(2);
        let err = Grammar::define_with(&limits, 'S', |g| {
            g.production('S', "abc")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GrammarError::Capacity(CapacityError {
                resource: Resource::BodyLength,
                ..
            })
        ));
    }
}
