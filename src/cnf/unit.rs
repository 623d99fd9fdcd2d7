use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, trace};

use crate::grammar::*;

fn unit_targets<'a>(grammar: &'a Grammar, head: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    grammar.rules_for(head).filter_map(|(_, rule)| match rule.body.as_slice() {
        [Symbol::Nonterminal(target)] => Some(target.as_str()),
        _ => None,
    })
}

/// For every non-terminal, the other non-terminals it reaches through unit
/// rules alone, each with the shortest chain that reaches it. A non-terminal
/// never appears in its own closure, so unit cycles are harmless.
pub fn unit_closure(grammar: &Grammar) -> IndexMap<String, IndexMap<String, Vec<String>>> {
    let mut closures = IndexMap::new();

    for head in grammar.nonterminals.iter() {
        let mut reached: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut visited: HashSet<&str> = HashSet::from([head.as_str()]);
        let mut queue: VecDeque<(&str, Vec<String>)> = VecDeque::from([(head.as_str(), Vec::new())]);

        while let Some((current, chain)) = queue.pop_front() {
            for target in unit_targets(grammar, current) {
                if visited.insert(target) {
                    let mut path = chain.clone();
                    path.push(target.to_string());
                    reached.insert(target.to_string(), path.clone());
                    queue.push_back((target, path));
                }
            }
        }

        closures.insert(head.clone(), reached);
    }
    closures
}

pub fn eliminate(mut grammar: Grammar) -> Grammar {
    let closures = unit_closure(&grammar);
    let mut seen: HashSet<(String, Alternative)> = HashSet::new();
    let mut rules = Vec::with_capacity(grammar.rules.len());

    let heads = grammar.rules.iter().map(|r| r.head.clone()).unique().collect_vec();
    for head in heads {
        let own = grammar.rules_for(&head).map(|(_, rule)| (Vec::new(), rule));
        let inherited = closures.get(&head).into_iter().flatten().flat_map(|(target, chain)| {
            grammar.rules_for(target).map(move |(_, rule)| (chain.clone(), rule))
        });

        for (chain, rule) in own.chain(inherited) {
            if rule.is_unit() || !seen.insert((head.clone(), rule.body.clone())) {
                continue;
            }
            if !chain.is_empty() {
                trace!("{} inherits `{}` through {}", head, rule, chain.join(" > "));
            }
            rules.push(Rule {
                head: head.clone(),
                body: rule.body.clone(),
                via: chain.iter().chain(rule.via.iter()).cloned().collect(),
            });
        }
    }

    debug!("unit elimination: {} rules -> {} rules", grammar.rules.len(), rules.len());
    grammar.rules = rules;
    grammar
}
