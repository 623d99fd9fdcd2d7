use std::collections::HashSet;

use indexmap::IndexSet;
use itertools::Itertools;
use log::debug;

use crate::grammar::*;

/// Non-terminals that derive the empty string: those with an empty rule, or
/// a rule made only of nullable non-terminals.
pub fn nullable(grammar: &Grammar) -> IndexSet<String> {
    let mut nullable = IndexSet::new();

    loop {
        let before = nullable.len();
        for rule in &grammar.rules {
            if nullable.contains(&rule.head) {
                continue;
            }
            let all_nullable = rule.body.iter().all(|symbol| match symbol {
                Symbol::Nonterminal(n) => nullable.contains(n),
                Symbol::Terminal(_) => false,
            });
            if all_nullable {
                nullable.insert(rule.head.clone());
            }
        }
        if nullable.len() == before {
            return nullable;
        }
    }
}

// Every non-empty way of keeping or dropping each nullable symbol of a body,
// the untouched body first
fn variants(body: &Alternative, nullable: &IndexSet<String>) -> Vec<Alternative> {
    body.iter()
        .map(|symbol| match symbol {
            Symbol::Nonterminal(n) if nullable.contains(n) => vec![Some(symbol.clone()), None],
            _ => vec![Some(symbol.clone())],
        })
        .multi_cartesian_product()
        .map(|choice| choice.into_iter().flatten().collect_vec())
        .filter(|variant| !variant.is_empty())
        .collect()
}

pub fn eliminate(mut grammar: Grammar) -> Grammar {
    let nullable = nullable(&grammar);
    let mut seen: HashSet<(String, Alternative)> = HashSet::new();
    let mut rules = Vec::with_capacity(grammar.rules.len());

    for rule in &grammar.rules {
        for body in variants(&rule.body, &nullable) {
            if seen.insert((rule.head.clone(), body.clone())) {
                rules.push(Rule { head: rule.head.clone(), body, via: rule.via.clone() });
            }
        }
    }

    if nullable.contains(&grammar.start_symbol) {
        let after_start = rules.iter()
            .rposition(|r| r.head == grammar.start_symbol)
            .map_or(0, |i| i + 1);
        rules.insert(after_start, Rule::new(grammar.start_symbol.clone(), Vec::new()));
    }

    debug!(
        "epsilon elimination: {} nullable, {} rules -> {} rules",
        nullable.len(),
        grammar.rules.len(),
        rules.len()
    );
    grammar.rules = rules;
    grammar
}
