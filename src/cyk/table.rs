use indexmap::IndexMap;

/// Index of a non-terminal in the grammar's declared non-terminals.
pub type SymbolId = usize;

/// How a non-terminal derives one span of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Witness {
    // `head = "terminal"` matched the single token of the span
    Terminal { rule: usize, terminal: String },
    // `head = left right`, with `left` covering the first `split` tokens
    Binary { rule: usize, split: usize, left: SymbolId, right: SymbolId },
}

impl Witness {
    // Index of the grammar rule this witness applies
    pub fn rule(&self) -> usize {
        match self {
            Witness::Terminal { rule, .. } | Witness::Binary { rule, .. } => *rule,
        }
    }
}

// The retained witness and how many were found in total
#[derive(Debug, Clone, PartialEq)]
struct Entry {
    witness: Witness,
    count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    entries: IndexMap<SymbolId, Entry>,
}

impl Cell {
    pub fn contains(&self, symbol: SymbolId) -> bool {
        self.entries.contains_key(&symbol)
    }

    // Non-terminals in order of their first witness
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.entries.keys().copied()
    }

    pub fn witness(&self, symbol: SymbolId) -> Option<&Witness> {
        self.entries.get(&symbol).map(|entry| &entry.witness)
    }

    // Number of (split, rule) pairs that derive `symbol` here
    pub fn witness_count(&self, symbol: SymbolId) -> usize {
        self.entries.get(&symbol).map_or(0, |entry| entry.count)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Triangular chart over an input of `len` tokens. The cell for
/// `(start, length)` holds every non-terminal deriving exactly the tokens
/// `start..start + length`.
#[derive(Debug, Clone, PartialEq)]
pub struct CykTable {
    len: usize,
    cells: Vec<Cell>,
}

impl CykTable {
    pub fn new(len: usize) -> Self {
        CykTable {
            len,
            cells: vec![Cell::default(); len * (len + 1) / 2],
        }
    }

    // Length of the input the table covers
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // Rows are span lengths; row `length` starts after all shorter spans
    fn index(&self, start: usize, length: usize) -> Option<usize> {
        if length == 0 || start + length > self.len {
            return None;
        }
        let shorter = length - 1;
        Some(shorter * (self.len + 1) - shorter * (shorter + 1) / 2 + start)
    }

    pub fn cell(&self, start: usize, length: usize) -> Option<&Cell> {
        self.index(start, length).map(|i| &self.cells[i])
    }

    pub fn contains(&self, start: usize, length: usize, symbol: SymbolId) -> bool {
        self.cell(start, length).is_some_and(|cell| cell.contains(symbol))
    }

    pub fn witness_count(&self, start: usize, length: usize, symbol: SymbolId) -> usize {
        self.cell(start, length).map_or(0, |cell| cell.witness_count(symbol))
    }

    /// The witness kept for building trees: the first one discovered. Later
    /// ones are only counted.
    pub fn retained(&self, start: usize, length: usize, symbol: SymbolId) -> Option<&Witness> {
        self.cell(start, length)?.witness(symbol)
    }

    pub(crate) fn add(&mut self, start: usize, length: usize, symbol: SymbolId, witness: Witness) {
        if let Some(i) = self.index(start, length) {
            self.cells[i].entries
                .entry(symbol)
                .and_modify(|entry| entry.count += 1)
                .or_insert(Entry { witness, count: 1 });
        }
    }
}
