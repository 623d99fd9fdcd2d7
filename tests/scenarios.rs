mod common;

use std::path::Path;

use common::*;
use cykparse::bnf;
use cykparse::cnf::to_cnf;
use cykparse::cyk::{parse, CykParser, TreeBuilder};
use cykparse::generator::generate;
use cykparse::grammar::Grammar;
use rand::prelude::*;

fn sentences() -> Grammar {
    Grammar::from_productions("S", vec![
        ("S", vec!["NP", "VP"]),
        ("VP", vec!["V", "NP"]),
        ("NP", vec!["Det", "N"]),
        ("NP", vec!["he"]),
        ("NP", vec!["she"]),
        ("V", vec!["eats"]),
        ("V", vec!["drinks"]),
        ("Det", vec!["a"]),
        ("Det", vec!["the"]),
        ("N", vec!["cake"]),
        ("N", vec!["beer"]),
    ])
}

fn english() -> Grammar {
    bnf::parse_file(Path::new("example_data/english.bnf")).unwrap()
}

#[test]
fn accepts_a_sentence() {
    let cnf = to_cnf(&sentences()).unwrap();
    let result = parse(&cnf, &words("she eats a cake")).unwrap();
    assert!(result.accepted);
    assert_eq!(
        result.tree.unwrap().to_bracketed(),
        "(S (NP she) (VP (V eats) (NP (Det a) (N cake))))"
    );
}

#[test]
fn rejects_a_missing_object() {
    let cnf = to_cnf(&sentences()).unwrap();
    let result = parse(&cnf, &words("she eats")).unwrap();
    assert!(!result.accepted);
    assert!(result.tree.is_none());
}

#[test]
fn rejects_an_unknown_word() {
    let cnf = to_cnf(&sentences()).unwrap();
    let result = parse(&cnf, &words("she quickly eats a cake")).unwrap();
    assert!(!result.accepted);

    let result = parse(&cnf, &["quickly"]).unwrap();
    assert!(!result.accepted);
    assert!(result.tree.is_none());
}

#[test]
fn empty_input_follows_the_grammar() {
    let empty: Vec<String> = Vec::new();
    let cnf = to_cnf(&sentences()).unwrap();
    assert!(!parse(&cnf, &empty).unwrap().accepted);

    let optional = Grammar::from_productions("S", vec![
        ("S", vec!["NP", "VP"]),
        ("S", vec![]),
        ("NP", vec!["she"]),
        ("VP", vec!["eats"]),
    ]);
    let cnf = to_cnf(&optional).unwrap();
    assert!(parse(&cnf, &empty).unwrap().accepted);
    assert!(parse(&cnf, &words("she eats")).unwrap().accepted);
}

#[test]
fn raw_tree_keeps_normalization_symbols() {
    let cnf = to_cnf(&sentences()).unwrap();
    let parser = CykParser::new(&cnf).unwrap();
    let table = parser.fill(&words("she eats a cake")).unwrap();
    let raw = TreeBuilder::new(&cnf, &table).build_raw().unwrap();
    assert_eq!(raw.to_bracketed(), "(S0 (NP she) (VP (V eats) (NP (Det a) (N cake))))");
}

#[test]
fn splices_out_fresh_symbols() {
    let grammar = Grammar::from_productions("S", vec![
        ("S", vec!["if", "C", "then", "S"]),
        ("S", vec!["x"]),
        ("C", vec!["c"]),
    ]);
    let cnf = to_cnf(&grammar).unwrap();
    let tree = parse(&cnf, &words("if c then x")).unwrap().tree.unwrap();
    assert_eq!(tree.to_bracketed(), "(S if (C c) then (S x))");
    assert!(is_derivation(&tree, &grammar));
}

#[test]
fn puts_unit_chains_back() {
    let grammar = Grammar::from_productions("S", vec![
        ("S", vec!["Clause"]),
        ("Clause", vec!["Verb"]),
        ("Verb", vec!["run"]),
        ("Verb", vec!["Verb", "Verb"]),
    ]);
    let cnf = to_cnf(&grammar).unwrap();
    let tree = parse(&cnf, &words("run run")).unwrap().tree.unwrap();
    assert_eq!(tree.to_bracketed(), "(S (Clause (Verb (Verb run) (Verb run))))");
}

#[test]
fn english_sentences() {
    let cnf = to_cnf(&english()).unwrap();
    let parser = CykParser::new(&cnf).unwrap();

    let tree = parser.parse(&words("the cat cooks the soup with a dog")).unwrap().tree.unwrap();
    assert_eq!(
        tree.to_bracketed(),
        "(S (NP (Det the) (N cat)) (VP (VP (V cooks) (NP (Det the) (N soup))) (PP (P with) (NP (Det a) (N dog)))))"
    );

    let tree = parser.parse(&words("she eats")).unwrap().tree.unwrap();
    assert_eq!(tree.to_bracketed(), "(S (NP she) (VP eats))");

    assert!(!parser.parse(&words("eats a cake")).unwrap().accepted);
    assert!(!parser.parse(&words("the cat quickly drinks beer")).unwrap().accepted);
}

#[test]
fn generated_sentences_are_accepted() {
    let grammar = english();
    let cnf = to_cnf(&grammar).unwrap();
    let parser = CykParser::new(&cnf).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..50 {
        let sentence = generate(&grammar, &mut rng, 6).unwrap();
        let result = parser.parse(&sentence).unwrap();
        assert!(result.accepted, "{:?}", sentence);

        let tree = result.tree.unwrap();
        assert_eq!(tree.leaves(), sentence);
        assert!(is_derivation(&tree, &grammar), "{}", tree.to_bracketed());
    }
}
