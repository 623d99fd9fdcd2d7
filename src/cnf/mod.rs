/*
    This module rewrites grammars into Chomsky normal form
*/

mod epsilon;
mod unit;

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use crate::grammar::*;

pub use epsilon::nullable;
pub use unit::unit_closure;

/// Hands out non-terminal names that collide with nothing already in the
/// grammar or handed out before. Scoped to a single conversion.
pub struct NameSupply {
    taken: HashSet<String>,
    counter: usize,
}

impl NameSupply {
    pub fn new(grammar: &Grammar) -> Self {
        let taken = grammar.nonterminals.iter()
            .chain(grammar.terminals.iter())
            .chain(grammar.fresh.keys())
            .cloned()
            .collect();
        NameSupply { taken, counter: 0 }
    }

    pub fn fresh(&mut self, prefix: &str) -> String {
        loop {
            self.counter += 1;
            let name = format!("{}{}", prefix, self.counter);
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }

    pub fn fresh_start(&mut self) -> String {
        if self.taken.insert("S0".to_string()) {
            "S0".to_string()
        } else {
            self.fresh("S0_")
        }
    }
}

/// Converts a grammar into an equivalent one in Chomsky normal form. The
/// passes run in a fixed order; each relies on what the previous ones
/// established.
pub fn to_cnf(grammar: &Grammar) -> Result<Grammar, GrammarError> {
    grammar.validate()?;

    let mut names = NameSupply::new(grammar);
    let normalized = isolate_start(grammar.clone(), &mut names);
    let normalized = epsilon::eliminate(normalized);
    let normalized = unit::eliminate(normalized);
    let normalized = isolate_terminals(normalized, &mut names);
    let normalized = binarize(normalized, &mut names);

    debug!(
        "normalized `{}`: {} rules -> {} rules, {} fresh non-terminals",
        grammar.start_symbol,
        grammar.rules.len(),
        normalized.rules.len(),
        normalized.fresh.len() - grammar.fresh.len()
    );
    Ok(normalized)
}

// S0 = S, with S0 the new start. Keeps the old start off every right-hand side.
fn isolate_start(mut grammar: Grammar, names: &mut NameSupply) -> Grammar {
    let start = names.fresh_start();
    let original = std::mem::replace(&mut grammar.start_symbol, start.clone());

    grammar.nonterminals = std::iter::once(start.clone())
        .chain(grammar.nonterminals)
        .collect();
    grammar.rules.insert(0, Rule::new(start.clone(), vec![Symbol::Nonterminal(original.clone())]));
    grammar.fresh.insert(start, FreshKind::Start(original));
    grammar
}

// Every terminal inside a body longer than one symbol is replaced by a
// non-terminal that derives just that terminal. One stand-in per terminal.
fn isolate_terminals(mut grammar: Grammar, names: &mut NameSupply) -> Grammar {
    let mut stand_ins: IndexMap<String, String> = IndexMap::new();

    for rule in grammar.rules.iter_mut().filter(|r| r.body.len() > 1) {
        for symbol in rule.body.iter_mut() {
            if let Symbol::Terminal(terminal) = symbol {
                let stand_in = stand_ins
                    .entry(terminal.clone())
                    .or_insert_with(|| names.fresh("T"))
                    .clone();
                *symbol = Symbol::Nonterminal(stand_in);
            }
        }
    }

    debug!("terminal isolation: {} stand-ins", stand_ins.len());
    for (terminal, stand_in) in stand_ins {
        grammar.nonterminals.insert(stand_in.clone());
        grammar.fresh.insert(stand_in.clone(), FreshKind::Terminal(terminal.clone()));
        grammar.rules.push(Rule::new(stand_in, vec![Symbol::Terminal(terminal)]));
    }
    grammar
}

// A = B C D E becomes A = B X1, X1 = C X2, X2 = D E. The unit chain stays on
// the first link.
fn binarize(mut grammar: Grammar, names: &mut NameSupply) -> Grammar {
    let mut rules = Vec::with_capacity(grammar.rules.len());

    for rule in std::mem::take(&mut grammar.rules) {
        if rule.body.len() <= 2 {
            rules.push(rule);
            continue;
        }

        let Rule { mut head, body, mut via } = rule;
        let tail = body.len() - 2;
        for symbol in &body[..tail] {
            let link = names.fresh("X");
            grammar.nonterminals.insert(link.clone());
            grammar.fresh.insert(link.clone(), FreshKind::Chain);
            rules.push(Rule {
                head,
                body: vec![symbol.clone(), Symbol::Nonterminal(link.clone())],
                via: std::mem::take(&mut via),
            });
            head = link;
        }
        rules.push(Rule { head, body: body[tail..].to_vec(), via });
    }

    grammar.rules = rules;
    grammar
}
