use std::collections::{HashMap, HashSet};

use cykparse::cnf::nullable;
use cykparse::cyk::ParseTree;
use cykparse::grammar::{Grammar, Symbol};
use itertools::Itertools;

pub type Sentence = Vec<String>;

pub fn words(sentence: &str) -> Sentence {
    sentence.split_whitespace().map(str::to_string).collect()
}

/// Every sentence of at most `max_len` tokens the grammar derives, found by
/// growing each non-terminal's sentence set until nothing changes.
pub fn bounded_language(grammar: &Grammar, max_len: usize) -> HashSet<Sentence> {
    let mut language: HashMap<String, HashSet<Sentence>> = HashMap::new();

    loop {
        let mut changed = false;
        for rule in &grammar.rules {
            let mut partial: HashSet<Sentence> = HashSet::from([Vec::new()]);
            for symbol in &rule.body {
                let options: Vec<Sentence> = match symbol {
                    Symbol::Terminal(t) => vec![vec![t.clone()]],
                    Symbol::Nonterminal(n) => language.get(n).map(|s| s.iter().cloned().collect()).unwrap_or_default(),
                };
                partial = partial.iter()
                    .flat_map(|prefix| options.iter()
                        .filter(|option| prefix.len() + option.len() <= max_len)
                        .map(move |option| prefix.iter().chain(option.iter()).cloned().collect()))
                    .collect();
            }
            let known = language.entry(rule.head.clone()).or_default();
            for sentence in partial {
                changed |= known.insert(sentence);
            }
        }
        if !changed {
            break;
        }
    }

    language.remove(&grammar.start_symbol).unwrap_or_default()
}

/// All sentences over the grammar's terminals with at most `max_len` tokens.
pub fn all_sentences(grammar: &Grammar, max_len: usize) -> Vec<Sentence> {
    let mut sentences = vec![Vec::new()];
    for len in 1..=max_len {
        sentences.extend(
            itertools::repeat_n(grammar.terminals.iter().cloned().collect_vec(), len)
                .multi_cartesian_product()
        );
    }
    sentences
}

// `children` is `body` with some nullable non-terminals left out
fn fits_rule(children: &[&Symbol], body: &[Symbol], nullable: &[String]) -> bool {
    let mut remaining = children.iter().peekable();
    for symbol in body {
        if remaining.peek() == Some(&&symbol) {
            remaining.next();
        } else if !matches!(symbol, Symbol::Nonterminal(n) if nullable.contains(n)) {
            return false;
        }
    }
    remaining.next().is_none()
}

/// Whether every internal node of the tree is an instance of some rule of
/// the grammar.
pub fn is_derivation(tree: &ParseTree, grammar: &Grammar) -> bool {
    let nullable = nullable(grammar).into_iter().collect_vec();
    check_node(tree, grammar, &nullable)
}

fn check_node(tree: &ParseTree, grammar: &Grammar, nullable: &[String]) -> bool {
    if tree.is_leaf() {
        return true;
    }
    let children = tree.children().iter().map(ParseTree::label).collect_vec();
    let fits = grammar.rules_for(tree.label().name())
        .any(|(_, rule)| fits_rule(&children, &rule.body, nullable));
    fits && tree.children().iter().all(|child| check_node(child, grammar, nullable))
}
