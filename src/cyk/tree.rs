use std::fmt::Display;

use itertools::Itertools;

use super::table::{CykTable, SymbolId, Witness};
use crate::grammar::{Grammar, Symbol};

/// One derivation, labelled with grammar symbols. Terminal labels are leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    pub label: Symbol,
    pub children: Vec<ParseTree>,
}

impl ParseTree {
    pub fn leaf(terminal: impl Into<String>) -> Self {
        ParseTree { label: Symbol::Terminal(terminal.into()), children: Vec::new() }
    }

    pub fn node(nonterminal: impl Into<String>, children: Vec<ParseTree>) -> Self {
        ParseTree { label: Symbol::Nonterminal(nonterminal.into()), children }
    }

    pub fn label(&self) -> &Symbol {
        &self.label
    }

    pub fn children(&self) -> &[ParseTree] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.label.is_terminal()
    }

    // Terminals in order, left to right
    pub fn leaves(&self) -> Vec<&str> {
        if self.is_leaf() {
            return vec![self.label.name()];
        }
        self.children.iter().flat_map(ParseTree::leaves).collect()
    }

    /// `(S (NP she) (VP (V eats) (NP it)))`
    pub fn to_bracketed(&self) -> String {
        if self.is_leaf() {
            return self.label.name().to_string();
        }
        if self.children.is_empty() {
            return format!("({})", self.label.name());
        }
        format!(
            "({} {})",
            self.label.name(),
            self.children.iter().map(ParseTree::to_bracketed).join(" ")
        )
    }

    fn fmt_indented(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = "  ".repeat(depth);
        match self.children.as_slice() {
            _ if self.is_leaf() => writeln!(f, "{}{}", indent, self.label.name()),
            [] => writeln!(f, "{}{} -> ε", indent, self.label.name()),
            [only] if only.is_leaf() => writeln!(f, "{}{} -> {}", indent, self.label.name(), only.label.name()),
            children => {
                writeln!(f, "{}{}", indent, self.label.name())?;
                for child in children {
                    child.fmt_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl Display for ParseTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Reads derivations back out of a filled table, following the retained
/// witness of every cell.
pub struct TreeBuilder<'a> {
    grammar: &'a Grammar,
    table: &'a CykTable,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a CykTable) -> Self {
        TreeBuilder { grammar, table }
    }

    fn name(&self, symbol: SymbolId) -> Option<&'a str> {
        self.grammar.nonterminals.get_index(symbol).map(String::as_str)
    }

    fn start(&self) -> Option<SymbolId> {
        self.grammar.nonterminals.get_index_of(&self.grammar.start_symbol)
    }

    /// The derivation of the whole input in terms of the grammar the user
    /// wrote: symbols introduced by normalization are spliced out and unit
    /// chains are put back. `None` when the input is not accepted.
    pub fn build(&self) -> Option<ParseTree> {
        let mut children = if self.table.is_empty() {
            if !self.grammar.derives_empty() {
                return None;
            }
            Vec::new()
        } else {
            self.expand(self.start()?, 0, self.table.len())?
        };

        if children.len() == 1 && !children[0].is_leaf() {
            return children.pop();
        }
        Some(ParseTree::node(self.grammar.original_start(), children))
    }

    /// The derivation exactly as the normalized grammar produces it.
    pub fn build_raw(&self) -> Option<ParseTree> {
        if self.table.is_empty() {
            return self.grammar.derives_empty()
                .then(|| ParseTree::node(self.grammar.start_symbol.clone(), Vec::new()));
        }
        self.raw(self.start()?, 0, self.table.len())
    }

    fn raw(&self, symbol: SymbolId, start: usize, length: usize) -> Option<ParseTree> {
        let children = match self.table.retained(start, length, symbol)? {
            Witness::Terminal { terminal, .. } => vec![ParseTree::leaf(terminal.as_str())],
            Witness::Binary { split, left, right, .. } => vec![
                self.raw(*left, start, *split)?,
                self.raw(*right, start + split, length - split)?,
            ],
        };
        Some(ParseTree::node(self.name(symbol)?, children))
    }

    // The nodes `symbol` contributes to its parent over this span: itself,
    // or its children when it was introduced by normalization
    fn expand(&self, symbol: SymbolId, start: usize, length: usize) -> Option<Vec<ParseTree>> {
        let witness = self.table.retained(start, length, symbol)?;
        let mut children = match witness {
            Witness::Terminal { terminal, .. } => vec![ParseTree::leaf(terminal.as_str())],
            Witness::Binary { split, left, right, .. } => {
                let mut children = self.expand(*left, start, *split)?;
                children.extend(self.expand(*right, start + split, length - split)?);
                children
            }
        };

        let rule = self.grammar.rules.get(witness.rule())?;
        for link in rule.via.iter().rev() {
            if self.grammar.fresh_kind(link).is_none() {
                children = vec![ParseTree::node(link.as_str(), children)];
            }
        }

        let name = self.name(symbol)?;
        if self.grammar.fresh_kind(name).is_some() {
            Some(children)
        } else {
            Some(vec![ParseTree::node(name, children)])
        }
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;

    fn sample() -> ParseTree {
        ParseTree::node("S", vec![
            ParseTree::node("NP", vec![ParseTree::leaf("she")]),
            ParseTree::node("VP", vec![
                ParseTree::node("V", vec![ParseTree::leaf("eats")]),
                ParseTree::node("NP", vec![
                    ParseTree::node("Det", vec![ParseTree::leaf("a")]),
                    ParseTree::node("N", vec![ParseTree::leaf("cake")]),
                ]),
            ]),
        ])
    }

    #[test]
    fn bracketed() {
        assert_eq!(sample().to_bracketed(), "(S (NP she) (VP (V eats) (NP (Det a) (N cake))))");
        assert_eq!(ParseTree::node("S", vec![]).to_bracketed(), "(S)");
    }

    #[test]
    fn leaves_in_order() {
        assert_eq!(sample().leaves(), vec!["she", "eats", "a", "cake"]);
    }

    #[test]
    fn indented_display() {
        expect![[r#"
            S
              NP -> she
              VP
                V -> eats
                NP
                  Det -> a
                  N -> cake
        "#]]
        .assert_eq(&sample().to_string());
        assert_eq!(ParseTree::node("S", vec![]).to_string(), "S -> ε\n");
    }
}
