//! Circular reels of symbols

use crate::config::Layout;
use crate::error::{MachineError, MachineResult};
use crate::symbols::Symbol;

/// A fixed-length circular sequence of symbols with a rotation offset
///
/// `offset` counts how many steps the reel has travelled, modulo its
/// length. The symbol at the centre row is derived from it directly:
/// `(pivot - offset) mod len`, where `pivot` is the index that sits at the
/// centre row when `offset == 0`.
#[derive(Debug, Clone)]
pub struct Reel {
    symbols: Vec<Symbol>,
    offset: usize,
    pivot: usize,
    x: f64,
}

impl Reel {
    /// Build a reel from an already shuffled template
    ///
    /// Symbols get ascending indices and are stacked top to bottom starting
    /// at y = 0, so the symbol at index `layout.center_row()` starts on the
    /// centre row.
    pub fn new<S: AsRef<str>>(
        template: &[S],
        initial_offset: usize,
        x: f64,
        layout: &Layout,
    ) -> MachineResult<Self> {
        if template.is_empty() {
            return Err(MachineError::EmptyTemplate);
        }
        let len = template.len();
        let symbols = template
            .iter()
            .enumerate()
            .map(|(i, id)| Symbol::new(id.as_ref(), i, layout.symbol_y(i)))
            .collect();

        Ok(Self {
            symbols,
            offset: initial_offset % len,
            pivot: layout.center_row() % len,
            x,
        })
    }

    /// Advance the rotation by `steps`, wrapping modulo the reel length
    pub fn advance(&mut self, steps: usize) {
        let len = self.symbols.len();
        self.offset = (self.offset + steps % len) % len;
    }

    /// Index of the symbol currently on the centre row
    pub fn center_index(&self) -> usize {
        let len = self.symbols.len();
        (self.pivot + len - self.offset) % len
    }

    /// Symbol currently on the centre row
    pub fn symbol_at_center(&self) -> &Symbol {
        &self.symbols[self.center_index()]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn pivot(&self) -> usize {
        self.pivot
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; construction rejects empty templates
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub(crate) fn symbol_mut(&mut self, index: usize) -> Option<&mut Symbol> {
        self.symbols.get_mut(index)
    }

    /// Identities in reel order
    pub fn identities(&self) -> Vec<&str> {
        self.symbols.iter().map(Symbol::identity).collect()
    }

    /// Debug name, `reel-` followed by the joined identities
    pub fn name(&self) -> String {
        format!("reel-{}", self.identities().concat())
    }
}
