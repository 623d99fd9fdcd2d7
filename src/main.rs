mod cli;

use std::io::BufRead;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use itertools::Itertools;
use log::{info, warn};
use rand::prelude::*;

use cli::Cli;
use cykparse::bnf;
use cykparse::cnf::to_cnf;
use cykparse::cyk::{CykParser, Limits, TreeBuilder};
use cykparse::error_handling::report;
use cykparse::generator;
use cykparse::grammar::{Grammar, Symbol};

// Parses one sentence and prints the verdict, with a tree when accepted
fn check(parser: &CykParser, grammar: &Grammar, sentence: &str, cli: &Cli) -> bool {
    let tokens = cli::tokenize(sentence);

    let started = Instant::now();
    let table = match parser.fill(&tokens) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("{}: {}", sentence, e);
            return false;
        }
    };
    let accepted = parser.accepts(&table);
    let elapsed = started.elapsed();

    println!("{} `{}`", if accepted { "accepted" } else { "rejected" }, sentence);
    if cli.time {
        println!("  time: {:.6}s", elapsed.as_secs_f64());
    }

    if accepted {
        let builder = TreeBuilder::new(parser.grammar(), &table);
        let tree = if cli.raw { builder.build_raw() } else { builder.build() };
        if let Some(tree) = tree {
            print!("{}", tree);
        }
    } else {
        let unknown = tokens.iter().filter(|t| !grammar.terminals.contains(*t)).collect_vec();
        if !unknown.is_empty() {
            println!("  not in the vocabulary: {}", unknown.iter().join(", "));
        }
    }
    return accepted;
}

fn print_vocabulary(grammar: &Grammar) {
    for (head, rules) in grammar.by_head() {
        let words = rules.iter()
            .filter_map(|r| match r.body.as_slice() {
                [Symbol::Terminal(t)] => Some(t.as_str()),
                _ => None
            })
            .collect_vec();
        if !words.is_empty() {
            println!("{}: {}", head, words.join(", "));
        }
    }
}

fn play_examples(parser: &CykParser, grammar: &Grammar, cli: &Cli, amount: u32) {
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut accepted = 0;
    for _ in 0..amount {
        match generator::generate(grammar, &mut rng, cli.depth) {
            Ok(sentence) => {
                if check(parser, grammar, &sentence.join(" "), cli) {
                    accepted += 1;
                }
            }
            Err(e) => warn!("could not generate an example: {}", e),
        }
    }
    info!("{} of {} generated examples accepted", accepted, amount);
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut grammar = match bnf::parse_file(&cli.file) {
        Ok(grammar) => grammar,
        Err(errors) => {
            report(&errors);
            return ExitCode::FAILURE;
        }
    };
    if let Some(start) = &cli.start {
        grammar.start_symbol = start.clone();
    }

    let cnf = match to_cnf(&grammar) {
        Ok(cnf) => cnf,
        Err(e) => {
            eprintln!("{}: {}", cli.file.display(), e);
            return ExitCode::FAILURE;
        }
    };
    info!("{} rules in normal form", cnf.rules.len());

    let limits = Limits { max_tokens: cli.max_tokens, ..Limits::default() };
    let parser = match CykParser::with_limits(&cnf, limits) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("{}: {}", cli.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if cli.cnf {
        print!("{}", cnf);
    }
    if cli.vocabulary {
        print_vocabulary(&grammar);
    }
    if let Some(amount) = cli.generate {
        play_examples(&parser, &grammar, &cli, amount);
    }

    if !cli.sentences.is_empty() {
        for sentence in &cli.sentences {
            check(&parser, &grammar, sentence, &cli);
        }
    } else if !cli.has_report() {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    check(&parser, &grammar, &line, &cli);
                }
                Err(e) => {
                    eprintln!("{}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
