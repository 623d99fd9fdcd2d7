use std::collections::HashSet;

use crate::grammar::Symbol::Nonterminal;
use super::CompileErrorType::UndefinedNonterminal;
use super::{Alternative, CompileError, CompileErrors, FileResult, Location, Rule};

// A grammar rule together with the line it was written on
#[derive(Debug, PartialEq)]
pub struct LocatedRule {
    pub rule: Rule,
    pub location: Location
}

fn get_alternative_undefined_symbols(alternative: &Alternative, location: &Location, defined: &HashSet<&str>) -> CompileErrors {
    // Filter out everything but nonterminals and unwrap the text from the
    // nonterminals. Then filter out all the undefined nonterminals.
    alternative.iter()
        .filter_map(|symbol| match symbol {
            Nonterminal(symbol) => Some(symbol),
            _ => None
        })
        .filter(|symbol| !defined.contains(symbol.as_str()))
        .map(|symbol_text| CompileError {
            location: location.to_owned(),
            error: UndefinedNonterminal(symbol_text.to_owned())
        })
        .collect()
}

fn get_undefined_symbols(rules: &[LocatedRule]) -> CompileErrors {
    let defined: HashSet<&str> = rules.iter().map(|r| r.rule.head.as_str()).collect();

    // Get the undefined nonterminals in each rule, while flattening into all
    // the undefined nonterminals in the file
    rules.iter()
        .flat_map(|r| get_alternative_undefined_symbols(&r.rule.body, &r.location, &defined))
        .collect()
}

pub fn verify_rules(rules: &[LocatedRule]) -> FileResult<()> {
    let mut errors = Vec::new();

    errors.extend(get_undefined_symbols(rules).into_iter());

    if errors.len() > 0 {
        Err(errors)
    } else {
        Ok(())
    }
}
