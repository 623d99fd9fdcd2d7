/*
    This module recognizes token sequences with the CYK algorithm and reads
    back one derivation for accepted ones
*/

mod table;
mod tree;

use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;
use log::{debug, trace};

use crate::error_handling::ErrorType;
use crate::grammar::*;

pub use table::{Cell, CykTable, SymbolId, Witness};
pub use tree::{ParseTree, TreeBuilder};

/// Bounds checked before any table memory is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_tokens: usize,
    pub max_rules: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_tokens: 256, max_rules: 65_536 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    // The start symbol is not a declared non-terminal
    EmptyGrammar,
    // A rule references something the grammar does not declare
    Grammar(GrammarError),
    // A rule is not of the form `A = B C`, `A = "x"` or `S = ""`
    NotNormalForm(String),
    InputTooLong { tokens: usize, limit: usize },
    GrammarTooLarge { rules: usize, limit: usize },
}

impl ErrorType for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyGrammar => write!(f, "Grammar has no start symbol"),
            ParseError::Grammar(error) => write!(f, "{}", error),
            ParseError::NotNormalForm(rule) => write!(f, "Rule `{}` is not in Chomsky normal form", rule),
            ParseError::InputTooLong { tokens, limit } => write!(f, "Input has {} tokens, the limit is {}", tokens, limit),
            ParseError::GrammarTooLarge { rules, limit } => write!(f, "Grammar has {} rules, the limit is {}", rules, limit),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<GrammarError> for ParseError {
    fn from(error: GrammarError) -> Self {
        ParseError::Grammar(error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub accepted: bool,
    pub tree: Option<ParseTree>,
}

/// A normalized grammar indexed for table filling.
pub struct CykParser<'g> {
    grammar: &'g Grammar,
    start: SymbolId,
    // terminal -> (head, rule index)
    lexical: HashMap<&'g str, Vec<(SymbolId, usize)>>,
    // (head, left, right, rule index), in grammar order
    binary: Vec<(SymbolId, SymbolId, SymbolId, usize)>,
    limits: Limits,
}

fn symbol_id(grammar: &Grammar, name: &str) -> Result<SymbolId, ParseError> {
    grammar.nonterminals
        .get_index_of(name)
        .ok_or_else(|| GrammarError::UndeclaredSymbol(name.to_string()).into())
}

impl<'g> CykParser<'g> {
    pub fn new(grammar: &'g Grammar) -> Result<Self, ParseError> {
        CykParser::with_limits(grammar, Limits::default())
    }

    pub fn with_limits(grammar: &'g Grammar, limits: Limits) -> Result<Self, ParseError> {
        let start = grammar.nonterminals
            .get_index_of(&grammar.start_symbol)
            .ok_or(ParseError::EmptyGrammar)?;

        if grammar.rules.len() > limits.max_rules {
            return Err(ParseError::GrammarTooLarge { rules: grammar.rules.len(), limit: limits.max_rules });
        }
        if let Some(rule) = grammar.first_non_cnf_rule() {
            return Err(ParseError::NotNormalForm(rule.to_string()));
        }

        let mut lexical: HashMap<&str, Vec<(SymbolId, usize)>> = HashMap::new();
        let mut binary = Vec::new();
        for (index, rule) in grammar.rules.iter().enumerate() {
            let head = symbol_id(grammar, &rule.head)?;
            match rule.body.as_slice() {
                [Symbol::Terminal(terminal)] => {
                    lexical.entry(terminal.as_str()).or_default().push((head, index));
                }
                [Symbol::Nonterminal(left), Symbol::Nonterminal(right)] => {
                    binary.push((head, symbol_id(grammar, left)?, symbol_id(grammar, right)?, index));
                }
                _ => {}
            }
        }

        Ok(CykParser { grammar, start, lexical, binary, limits })
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Fills the table bottom-up, shorter spans before longer ones. Every
    /// witness is recorded; splits are tried in ascending order and rules in
    /// grammar order, which fixes the retained witness of every cell.
    pub fn fill<S: AsRef<str>>(&self, tokens: &[S]) -> Result<CykTable, ParseError> {
        let n = tokens.len();
        if n > self.limits.max_tokens {
            return Err(ParseError::InputTooLong { tokens: n, limit: self.limits.max_tokens });
        }

        let mut table = CykTable::new(n);
        for (start, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            for &(head, rule) in self.lexical.get(token).into_iter().flatten() {
                table.add(start, 1, head, Witness::Terminal { rule, terminal: token.to_string() });
            }
        }

        for length in 2..=n {
            for start in 0..=n - length {
                for split in 1..length {
                    for &(head, left, right, rule) in &self.binary {
                        if table.contains(start, split, left)
                            && table.contains(start + split, length - split, right)
                        {
                            table.add(start, length, head, Witness::Binary { rule, split, left, right });
                        }
                    }
                }
                if log::log_enabled!(log::Level::Trace) {
                    self.trace_cell(&table, start, length);
                }
            }
        }

        debug!("filled table for {} tokens with {} binary rules", n, self.binary.len());
        Ok(table)
    }

    fn trace_cell(&self, table: &CykTable, start: usize, length: usize) {
        if let Some(cell) = table.cell(start, length).filter(|cell| !cell.is_empty()) {
            let names = cell.symbols()
                .filter_map(|id| self.grammar.nonterminals.get_index(id))
                .join(" ");
            trace!("cell ({}, {}): {}", start, length, names);
        }
    }

    pub fn accepts(&self, table: &CykTable) -> bool {
        if table.is_empty() {
            self.grammar.derives_empty()
        } else {
            table.contains(0, table.len(), self.start)
        }
    }

    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ParseResult, ParseError> {
        let table = self.fill(tokens)?;
        let accepted = self.accepts(&table);
        let tree = if accepted {
            TreeBuilder::new(self.grammar, &table).build()
        } else {
            None
        };
        Ok(ParseResult { accepted, tree })
    }
}

/// Parses with the default limits. The grammar must already be in Chomsky
/// normal form.
pub fn parse<S: AsRef<str>>(grammar: &Grammar, tokens: &[S]) -> Result<ParseResult, ParseError> {
    CykParser::new(grammar)?.parse(tokens)
}
