/*
    This module generates random sentences of a grammar
*/

use std::fmt::Display;

use itertools::Itertools;
use rand::prelude::*;

use crate::error_handling::*;
use crate::grammar::*;

#[derive(Debug, PartialEq)]
pub enum GenerateError {
    // A nonterminal without rules was reached
    UndefinedNonterminal(String),
    // Expansion went deeper than the given limit
    DepthExceeded(usize),
}

impl ErrorType for GenerateError {}

impl Display for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::UndefinedNonterminal(nonterminal) => write!(f, "No definition for nonterminal `{}`", nonterminal),
            GenerateError::DepthExceeded(limit) => write!(f, "Gave up after expanding {} levels deep", limit),
        }
    }
}

impl std::error::Error for GenerateError {}

pub type GenResult = Result<Vec<String>, GenerateError>;

/// Generates one sentence from the start symbol. Below `depth` every
/// alternative is equally likely; past it only the alternatives with the
/// fewest nonterminals are picked, and past twice `depth` generation fails.
pub fn generate<R: Rng + ?Sized>(grammar: &Grammar, rng: &mut R, depth: usize) -> GenResult {
    generate_with_override(grammar, &grammar.start_symbol, rng, depth)
}

// Generates a sentence in the given grammar starting with the given symbol
pub fn generate_with_override<R: Rng + ?Sized>(grammar: &Grammar, start: &str, rng: &mut R, depth: usize) -> GenResult {
    let mut sentence = Vec::new();
    generate_nonterminal(grammar, start, rng, 0, depth, &mut sentence)?;
    return Ok(sentence);
}

fn nonterminal_count(alternative: &Alternative) -> usize {
    alternative.iter().filter(|s| !s.is_terminal()).count()
}

fn generate_nonterminal<R: Rng + ?Sized>(
    grammar: &Grammar,
    nonterminal: &str,
    rng: &mut R,
    level: usize,
    depth: usize,
    sentence: &mut Vec<String>,
) -> Result<(), GenerateError> {
    if level > 2 * depth {
        return Err(GenerateError::DepthExceeded(2 * depth));
    }

    let mut alternatives = grammar.rules_for(nonterminal).map(|(_, r)| &r.body).collect_vec();
    if level >= depth {
        let fewest = alternatives.iter().map(|a| nonterminal_count(a)).min().unwrap_or(0);
        alternatives.retain(|a| nonterminal_count(a) == fewest);
    }

    let alternative = match alternatives.choose(rng) {
        Some(a) => *a,
        None => return Err(GenerateError::UndefinedNonterminal(nonterminal.to_string())),
    };

    for symbol in alternative {
        match symbol {
            Symbol::Terminal(t) => sentence.push(t.clone()),
            Symbol::Nonterminal(n) => generate_nonterminal(grammar, n, rng, level + 1, depth, sentence)?,
        }
    }
    Ok(())
}
