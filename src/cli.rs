use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Sentences to parse (default: one per line from stdin)
    pub sentences: Vec<String>,

    /// Start symbol (default: first in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Print the grammar in Chomsky normal form
    #[arg(long)]
    pub cnf: bool,

    /// List the words each nonterminal yields directly
    #[arg(long)]
    pub vocabulary: bool,

    /// Generate this many example sentences and parse them
    #[arg(short = 'g', long, value_name = "AMOUNT")]
    pub generate: Option<u32>,

    /// Seed for generated examples (default: random)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Expansion depth after which generated examples are steered to an end
    #[arg(long, value_name = "LEVELS", default_value_t = 8)]
    pub depth: usize,

    /// Print trees over the normalized grammar instead of the original one
    #[arg(long)]
    pub raw: bool,

    /// Report how long each parse took
    #[arg(short, long)]
    pub time: bool,

    /// Longest sentence to parse, in words
    #[arg(long, value_name = "WORDS", default_value_t = 256)]
    pub max_tokens: usize
}

impl Cli {
    // Whether something other than parsing sentences was asked for
    pub fn has_report(&self) -> bool {
        self.cnf || self.vocabulary || self.generate.is_some()
    }
}

pub fn tokenize(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(str::to_lowercase).collect()
}
