//! Chomsky normal form conversion and CYK parsing for context-free grammars.
//!
//! ```
//! use cykparse::{cnf::to_cnf, cyk::parse, grammar::Grammar};
//!
//! let grammar = Grammar::from_productions("S", vec![
//!     ("S", vec!["NP", "VP"]),
//!     ("VP", vec!["V", "NP"]),
//!     ("NP", vec!["she"]),
//!     ("NP", vec!["it"]),
//!     ("V", vec!["eats"]),
//! ]);
//! let cnf = to_cnf(&grammar).unwrap();
//!
//! let result = parse(&cnf, &["she", "eats", "it"]).unwrap();
//! assert!(result.accepted);
//! assert_eq!(result.tree.unwrap().to_bracketed(), "(S (NP she) (VP (V eats) (NP it)))");
//! ```

pub mod bnf;
pub mod cnf;
pub mod cyk;
pub mod error_handling;
pub mod generator;
pub mod grammar;
