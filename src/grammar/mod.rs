/*
    This module is for storing, checking and printing grammars
*/

use std::fmt::Display;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::error_handling::ErrorType;

// The base unit in a grammar rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
}

impl Symbol {
    pub fn terminal(text: impl Into<String>) -> Self {
        Symbol::Terminal(text.into())
    }

    pub fn nonterminal(name: impl Into<String>) -> Self {
        Symbol::Nonterminal(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(t) => t,
            Symbol::Nonterminal(n) => n,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "\"{}\"", t),
            Symbol::Nonterminal(n) => write!(f, "{}", n),
        }
    }
}

// The symbols in a single alternative
pub type Alternative = Vec<Symbol>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub head: String,
    pub body: Alternative,
    /// Non-terminals this rule was inherited through when unit rules were
    /// removed, outermost first. `A = x` with `via = [B, C]` stands for the
    /// derivation `A => B => C => x`.
    pub via: Vec<String>,
}

impl Rule {
    pub fn new(head: impl Into<String>, body: Alternative) -> Self {
        Rule { head: head.into(), body, via: Vec::new() }
    }

    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.body.as_slice(), [Symbol::Nonterminal(_)])
    }

    // `A = "x"`
    pub fn is_lexical(&self) -> bool {
        matches!(self.body.as_slice(), [Symbol::Terminal(_)])
    }

    // `A = B C`
    pub fn is_binary(&self) -> bool {
        matches!(self.body.as_slice(), [Symbol::Nonterminal(_), Symbol::Nonterminal(_)])
    }
}

fn fmt_alternative(alternative: &Alternative) -> String {
    if alternative.is_empty() {
        "\"\"".to_string()
    } else {
        alternative.iter().join(" ")
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.head, fmt_alternative(&self.body))
    }
}

/// What a non-terminal introduced during normalization stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshKind {
    // Isolated start symbol replacing the named one
    Start(String),
    // Stands in for the named terminal inside longer bodies
    Terminal(String),
    // Link in a binarized chain
    Chain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub start_symbol: String,
    pub nonterminals: IndexSet<String>,
    pub terminals: IndexSet<String>,
    pub rules: Vec<Rule>,
    pub fresh: IndexMap<String, FreshKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    // A symbol is used without being declared as the right kind
    UndeclaredSymbol(String),
    // The start symbol has no rules
    UnreachableStart(String),
}

impl ErrorType for GrammarError {}

impl Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarError::UndeclaredSymbol(symbol) => write!(f, "Symbol `{}` is used but never declared", symbol),
            GrammarError::UnreachableStart(start) => write!(f, "Start symbol `{}` has no rules", start),
        }
    }
}

impl std::error::Error for GrammarError {}

impl Grammar {
    pub fn new(
        start_symbol: impl Into<String>,
        nonterminals: IndexSet<String>,
        terminals: IndexSet<String>,
        rules: Vec<Rule>,
    ) -> Self {
        Grammar {
            start_symbol: start_symbol.into(),
            nonterminals,
            terminals,
            rules,
            fresh: IndexMap::new(),
        }
    }

    /// Declares every rule head as a non-terminal and every terminal found in
    /// a body as a terminal. Body non-terminals that never head a rule stay
    /// undeclared, so `validate` reports them.
    pub fn from_rules(start_symbol: impl Into<String>, rules: Vec<Rule>) -> Self {
        let nonterminals = rules.iter().map(|r| r.head.clone()).collect();
        let terminals = rules.iter()
            .flat_map(|r| r.body.iter())
            .filter_map(|s| match s {
                Symbol::Terminal(t) => Some(t.clone()),
                _ => None,
            })
            .collect();
        Grammar::new(start_symbol, nonterminals, terminals, rules)
    }

    /// Builds a grammar from `(head, body)` pairs of plain words. A body word
    /// is a non-terminal exactly when it heads some pair.
    pub fn from_productions<'a>(
        start_symbol: &str,
        productions: impl IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    ) -> Self {
        let productions = productions.into_iter().collect_vec();
        let heads: IndexSet<&str> = productions.iter().map(|(head, _)| *head).collect();

        let rules = productions.iter()
            .map(|(head, body)| {
                let body = body.iter()
                    .map(|word| if heads.contains(word) {
                        Symbol::nonterminal(*word)
                    } else {
                        Symbol::terminal(*word)
                    })
                    .collect();
                Rule::new(*head, body)
            })
            .collect();

        Grammar::from_rules(start_symbol, rules)
    }

    pub fn validate(&self) -> Result<(), GrammarError> {
        if !self.nonterminals.contains(&self.start_symbol) {
            return Err(GrammarError::UndeclaredSymbol(self.start_symbol.clone()));
        }

        for rule in &self.rules {
            if !self.nonterminals.contains(&rule.head) {
                return Err(GrammarError::UndeclaredSymbol(rule.head.clone()));
            }
            let undeclared = rule.body.iter().find(|symbol| match symbol {
                Symbol::Terminal(t) => !self.terminals.contains(t),
                Symbol::Nonterminal(n) => !self.nonterminals.contains(n),
            });
            if let Some(symbol) = undeclared {
                return Err(GrammarError::UndeclaredSymbol(symbol.name().to_string()));
            }
        }

        if self.rules_for(&self.start_symbol).next().is_none() {
            return Err(GrammarError::UnreachableStart(self.start_symbol.clone()));
        }

        Ok(())
    }

    // Rules for one head, paired with their index in `rules`
    pub fn rules_for<'a>(&'a self, head: &'a str) -> impl Iterator<Item = (usize, &'a Rule)> + 'a {
        self.rules.iter().enumerate().filter(move |(_, r)| r.head == head)
    }

    // Rules grouped by head, heads in order of their first rule
    pub fn by_head(&self) -> IndexMap<&str, Vec<&Rule>> {
        let mut grouped: IndexMap<&str, Vec<&Rule>> = IndexMap::new();
        for rule in &self.rules {
            grouped.entry(rule.head.as_str()).or_default().push(rule);
        }
        grouped
    }

    /// The first rule that is neither `A = "x"`, `A = B C`, nor an empty rule
    /// for the start symbol.
    pub fn first_non_cnf_rule(&self) -> Option<&Rule> {
        self.rules.iter().find(|rule| {
            !(rule.is_lexical()
                || rule.is_binary()
                || (rule.is_epsilon() && rule.head == self.start_symbol))
        })
    }

    pub fn is_cnf(&self) -> bool {
        self.first_non_cnf_rule().is_none()
    }

    // Whether the start symbol keeps an empty rule
    pub fn derives_empty(&self) -> bool {
        self.rules_for(&self.start_symbol).any(|(_, r)| r.is_epsilon())
    }

    pub fn fresh_kind(&self, name: &str) -> Option<&FreshKind> {
        self.fresh.get(name)
    }

    /// Follows isolated start symbols back to the start symbol the grammar
    /// was written with.
    pub fn original_start(&self) -> &str {
        let mut start = self.start_symbol.as_str();
        while let Some(FreshKind::Start(replaced)) = self.fresh.get(start) {
            start = replaced;
        }
        start
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (head, rules) in self.by_head() {
            let alternatives = rules.iter().map(|r| fmt_alternative(&r.body)).join(" | ");
            writeln!(f, "{} = {}", head, alternatives)?;
        }
        Ok(())
    }
}
