//! Textual grammar loader.
//!
//! ```text
//! # comment
//! S -> A A
//! A -> a A | b
//! ```
//!
//! Each line declares one or more productions of a single-character driver.
//! Whitespace in bodies is insignificant, `|` separates alternatives, and an
//! empty alternative or `ε` is the empty body. The first blank line ends the grammar.

use crate::{
    config::Limits,
    grammar::{Grammar, GrammarError, Symbol},
};
use std::{fmt, io};

/// One production as written in the source text, with alternation already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionDesc {
    pub line: usize,
    pub driver: Symbol,
    pub body: Vec<Symbol>,
}

/// A source line that could not be turned into productions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {reason}: `{text}'")]
pub struct MalformedProduction {
    pub line: usize,
    pub text: String,
    pub reason: Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    MissingArrow,
    MissingDriver,
    /// The left-hand side has more than one symbol.
    LongDriver,
    NonterminalExpected(char),
    Duplicate,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArrow => f.write_str("expected `A -> beta'"),
            Self::MissingDriver => f.write_str("missing driver before `->'"),
            Self::LongDriver => f.write_str("the driver must be a single symbol"),
            Self::NonterminalExpected(c) => write!(f, "the driver `{}' is not a nonterminal", c),
            Self::Duplicate => f.write_str("duplicate production"),
        }
    }
}

/// Split a single line into its productions.
///
/// `line` is the 1-based line number used in diagnostics.
pub fn parse_line(line: usize, text: &str) -> Result<Vec<ProductionDesc>, MalformedProduction> {
    let malformed = |reason| MalformedProduction {
        line,
        text: text.to_owned(),
        reason,
    };

    let (left, right) = text
        .split_once("->")
        .ok_or_else(|| malformed(Malformed::MissingArrow))?;

    let mut left = left.chars().filter(|c| !c.is_whitespace());
    let driver = match (left.next(), left.next()) {
        (Some(c), None) => Symbol::new(c),
        (None, _) => return Err(malformed(Malformed::MissingDriver)),
        (Some(_), Some(_)) => return Err(malformed(Malformed::LongDriver)),
    };
    if !driver.is_nonterminal() {
        return Err(malformed(Malformed::NonterminalExpected(driver.as_char())));
    }

    Ok(right
        .split('|')
        .map(|alt| ProductionDesc {
            line,
            driver,
            body: alt
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(Symbol::new)
                .collect(),
        })
        .collect())
}

/// The result of parsing a grammar source.
#[derive(Debug, Default)]
pub struct Parsed {
    pub productions: Vec<ProductionDesc>,
    pub malformed: Vec<MalformedProduction>,
}

/// Parse every line up to the first blank one, collecting malformed lines instead of failing.
pub fn parse(source: &str) -> Parsed {
    let span = tracing::trace_span!("parse");
    let _entered = span.enter();

    let mut parsed = Parsed::default();
    for (i, text) in source.lines().enumerate() {
        let text = text.trim_end_matches('\r');
        if text.trim().is_empty() {
            tracing::trace!("blank line {}: end of grammar", i + 1);
            break;
        }
        if text.trim_start().starts_with('#') {
            continue;
        }
        match parse_line(i + 1, text) {
            Ok(descs) => parsed.productions.extend(descs),
            Err(err) => {
                tracing::warn!("skipping production: {}", err);
                parsed.malformed.push(err);
            }
        }
    }
    parsed
}

/// Read grammar lines from `reader` until the first blank line or the end of input.
///
/// Nothing past the blank line is read, so an interactive session ends there.
pub fn read_source<R: io::BufRead>(reader: R) -> io::Result<String> {
    let mut source = String::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        source.push_str(&line);
        source.push('\n');
    }
    Ok(source)
}

/// A loaded grammar together with the lines that were skipped.
#[derive(Debug)]
pub struct Loaded {
    pub grammar: Grammar,
    pub malformed: Vec<MalformedProduction>,
}

/// Load a grammar from `source` with `start` as its start symbol.
///
/// Malformed and duplicate productions are skipped and reported in
/// [`Loaded::malformed`]. Capacity errors and fresh symbol exhaustion are fatal.
pub fn load(source: &str, start: char, limits: &Limits) -> Result<Loaded, GrammarError> {
    let Parsed {
        productions,
        mut malformed,
    } = parse(source);
    let lines: Vec<&str> = source.lines().collect();

    let grammar = Grammar::define_with(limits, start, |g| {
        for desc in productions {
            match g.production_with(desc.driver, desc.body) {
                Ok(id) => tracing::trace!("line {}: {:?}", desc.line, id),
                Err(GrammarError::DuplicateProduction { .. }) => {
                    let err = MalformedProduction {
                        line: desc.line,
                        text: lines
                            .get(desc.line - 1)
                            .map_or_else(String::new, |text| text.to_string()),
                        reason: Malformed::Duplicate,
                    };
                    tracing::warn!("skipping production: {}", err);
                    malformed.push(err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    })?;

    Ok(Loaded { grammar, malformed })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(s: &str) -> Vec<Symbol> {
        s.chars().map(Symbol::new).collect()
    }

    #[test]
    fn alternation_is_expanded() {
        let descs = parse_line(3, "A -> a A | b").unwrap();
        assert_eq!(
            descs,
            [
                ProductionDesc {
                    line: 3,
                    driver: Symbol::new('A'),
                    body: symbols("aA"),
                },
                ProductionDesc {
                    line: 3,
                    driver: Symbol::new('A'),
                    body: symbols("b"),
                },
            ]
        );
    }

    #[test]
    fn lowercase_driver_is_malformed() {
        let err = parse_line(1, "x -> y").unwrap_err();
        assert_eq!(err.reason, Malformed::NonterminalExpected('x'));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn missing_arrow_or_driver() {
        assert_eq!(
            parse_line(1, "S = a").unwrap_err().reason,
            Malformed::MissingArrow
        );
        assert_eq!(
            parse_line(1, " -> a").unwrap_err().reason,
            Malformed::MissingDriver
        );
        assert_eq!(
            parse_line(1, "SA -> a").unwrap_err().reason,
            Malformed::LongDriver
        );
    }

    #[test]
    fn empty_alternative() {
        let descs = parse_line(1, "A -> a |").unwrap();
        assert_eq!(descs.len(), 2);
        assert!(descs[1].body.is_empty());
    }

    #[test]
    fn blank_line_ends_the_grammar() {
        let parsed = parse("S -> a\n# comment\nS -> b\n\nS -> c\n");
        assert_eq!(parsed.productions.len(), 2);
        assert!(parsed.malformed.is_empty());
    }

    #[test]
    fn malformed_lines_do_not_reach_the_grammar() {
        let loaded = load(
            "S -> A\nx -> y\nA -> a\nZZ -> a\nZ a\n",
            'S',
            &Limits::default(),
        )
        .unwrap();
        let lines: Vec<usize> = loaded.malformed.iter().map(|m| m.line).collect();
        assert_eq!(lines, [2, 4, 5]);
        assert_eq!(loaded.malformed[0].text, "x -> y");
        assert_eq!(loaded.malformed[1].reason, Malformed::LongDriver);
        assert_eq!(loaded.malformed[2].reason, Malformed::MissingArrow);

        let grammar = &loaded.grammar;
        assert_eq!(grammar.productions().len(), 3);
        assert!(grammar
            .productions()
            .iter()
            .all(|p| p.driver() != Symbol::new('x')));
        // `Z` only appears on rejected lines, so it is still free.
        assert_eq!(grammar.fresh_symbol(), Symbol::new('Z'));
    }

    #[test]
    fn reading_stops_at_the_first_blank_line() {
        let input = io::Cursor::new("S -> a S\r\nS -> b\n   \nS -> c\n");
        let source = read_source(input).unwrap();
        assert_eq!(source, "S -> a S\nS -> b\n");

        let input = io::Cursor::new("S -> a");
        assert_eq!(read_source(input).unwrap(), "S -> a\n");
    }

    #[test]
    fn duplicates_are_skipped() {
        let loaded = load("S -> a | a\n", 'S', &Limits::default()).unwrap();
        assert_eq!(loaded.grammar.productions().len(), 2);
        assert_eq!(loaded.malformed.len(), 1);
        assert_eq!(loaded.malformed[0].reason, Malformed::Duplicate);

        let loaded = load("S -> a\nS -> a\n", 'S', &Limits::default()).unwrap();
        assert_eq!(loaded.grammar.productions().len(), 2);
        assert_eq!(loaded.malformed[0].line, 2);
        assert_eq!(loaded.malformed[0].text, "S -> a");
    }

    #[test]
    fn epsilon_alternative() {
        let grammar = Grammar::from_str("S -> a S | ε\n", 'S').unwrap();
        let bodies: Vec<usize> = grammar
            .productions_of(Symbol::new('S'))
            .map(|p| p.body().len())
            .collect();
        assert_eq!(bodies, [2, 0]);
    }
}
