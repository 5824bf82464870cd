//! LR(0) items and their closure.

use crate::{
    grammar::{Grammar, ProductionID, Symbol},
    types::Set,
    util::{display_fn, write_body},
};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// The LR(0) item, a production with a marker in its body.
///
/// Two items are the same item when their production and marker are equal;
/// `is_kernel` only records how the item entered its state.
#[derive(Debug, Copy, Clone)]
pub struct Item {
    pub production: ProductionID,
    pub marker: u16,
    pub is_kernel: bool,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.production == other.production && self.marker == other.marker
    }
}
impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.production.hash(state);
        self.marker.hash(state);
    }
}

impl Item {
    pub const fn kernel(production: ProductionID, marker: u16) -> Self {
        Self {
            production,
            marker,
            is_kernel: true,
        }
    }

    pub const fn nonkernel(production: ProductionID) -> Self {
        Self {
            production,
            marker: 0,
            is_kernel: false,
        }
    }

    /// The symbol right after the marker, or `None` for a reduce item.
    pub fn next_symbol(&self, g: &Grammar) -> Option<Symbol> {
        g.production(self.production)
            .body()
            .get(usize::from(self.marker))
            .copied()
            .filter(|s| !s.is_epsilon())
    }

    /// The symbol right before the marker.
    pub fn prev_symbol(&self, g: &Grammar) -> Option<Symbol> {
        let marker = usize::from(self.marker).checked_sub(1)?;
        g.production(self.production).body().get(marker).copied()
    }

    pub fn is_reduce(&self, g: &Grammar) -> bool {
        self.next_symbol(g).is_none()
    }

    /// The items closure adds for this one: `N -> . γ` for every production
    /// of the nonterminal `N` right after the marker.
    pub fn expansions<'g>(&self, g: &'g Grammar) -> impl Iterator<Item = Item> + 'g {
        self.next_symbol(g)
            .filter(|s| s.is_nonterminal())
            .into_iter()
            .flat_map(move |n| g.productions_of(n))
            .map(|production| Item::nonkernel(production.id()))
    }

    /// The kernel item obtained by moving the marker over the next symbol.
    pub fn advance(&self) -> Self {
        Self::kernel(self.production, self.marker + 1)
    }

    // `"A -> a . B c"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let production = g.production(self.production);
            write!(f, "{} -> ", production.driver())?;
            write_body(f, production.body(), Some(usize::from(self.marker)))
        })
    }
}

/// An insertion-ordered set of items, deduplicated by identity.
pub type ItemSet = Set<Item>;

/// Compute the closure of `kernel`.
///
/// The kernel items come first in the result, flagged as kernel items,
/// followed by the items added by closure in discovery order.
pub fn closure<I>(kernel: I, g: &Grammar) -> ItemSet
where
    I: IntoIterator<Item = Item>,
{
    let mut items: ItemSet = kernel
        .into_iter()
        .map(|item| Item {
            is_kernel: true,
            ..item
        })
        .collect();
    let mut cursor = 0;
    while let Some(item) = items.get_index(cursor).copied() {
        for new_item in item.expansions(g) {
            items.insert(new_item);
        }
        cursor += 1;
    }
    items
}
