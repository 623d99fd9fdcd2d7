/*
    This module reads grammars written in a small BNF dialect:

        ; comment
        S  = NP VP
        NP = Det N | "she"
           | 'he'
        A  ::= "a" A | ""

    Bare words are non-terminals, quoted words are terminals and `""` on its
    own is the empty alternative. The first rule's head is the start symbol.
*/

mod lexer;
mod verifier;

use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use itertools::Itertools;
use log::debug;

use crate::grammar::*;
use crate::error_handling::*;
use lexer::*;
use verifier::{verify_rules, LocatedRule};

// The alternatives of a rewrite rule
pub type Rewrite = Vec<Alternative>;

#[derive(Debug)]
pub enum CompileErrorType {
    // A line which should contain a rule does not
    MissingEquals,
    // A rule has multiple equals signs
    UnexpectedEquals,
    // The user starts a rule line with something other than a nonterminal
    MissingNonterminal,
    // There is an unclosed quote
    UnmatchedQuote,
    // A character that cannot start any token
    UnexpectedCharacter(char),
    // An undefined token was used
    UndefinedNonterminal(String),
    // `|` with nothing after it, or two in a row
    DanglingAlternative,
    // A `|` continuation line before any rule
    ContinuationWithoutRule,
    // The file holds no rules at all
    NoRules,
    // Somehow a full rewrite was parsed as a base alternative
    // This is a problem with cykparse, not the grammar
    UnsplitRewrite,
    // A blank line got too deep into the parser
    // This is a problem with cykparse, not the grammar
    UnexpectedBlankLine,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        use CompileErrorType::*;
        match (self, other) {
            (FileError(a), FileError(b)) => a.kind() == b.kind(),
            (UnexpectedCharacter(a), UnexpectedCharacter(b)) => a == b,
            (UndefinedNonterminal(a), UndefinedNonterminal(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingEquals => write!(f, "Expected `=` after nonterminal"),
            CompileErrorType::UnexpectedEquals => write!(f, "Unexpected `=` encountered"),
            CompileErrorType::MissingNonterminal => write!(f, "Tried to define something other than a nonterminal"),
            CompileErrorType::UnmatchedQuote => write!(f, "Unmatched quotes"),
            CompileErrorType::UnexpectedCharacter(c) => write!(f, "Unexpected character `{}`", c),
            CompileErrorType::UndefinedNonterminal(nonterminal) => write!(f, "Could not find definition for `{}`", nonterminal),
            CompileErrorType::DanglingAlternative => write!(f, "Empty alternative (write `\"\"` for the empty string)"),
            CompileErrorType::ContinuationWithoutRule => write!(f, "Alternatives given before any rule"),
            CompileErrorType::NoRules => write!(f, "No rules found"),
            CompileErrorType::UnsplitRewrite => write!(f, "Rewrite was not fully split (this is a problem with cykparse, not the grammar)"),
            CompileErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule parser (this is a problem with cykparse, not the grammar)"),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: &Path) -> CompileError {
    CompileError::new(Location::file(file), CompileErrorType::FileError(error))
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

// One parsed line of a grammar file
#[derive(PartialEq, Debug)]
enum Line {
    // `head = alternatives`
    Rule { symbol: String, rewrite: Rewrite },
    // `| alternatives`, adding to the rule above
    Continuation(Rewrite),
}

fn parse_alternative(tokens: &[Token]) -> Result<Alternative> {
    if tokens.is_empty() {
        return Err(CompileErrorType::DanglingAlternative);
    }

    tokens.iter()
        // `""` contributes nothing, so an alternative of only `""` is empty
        .filter(|t| **t != Token::Terminal(String::new()))
        .map(|t| match t {
            Token::Equals => Err(CompileErrorType::UnexpectedEquals),
            Token::Or => Err(CompileErrorType::UnsplitRewrite),
            Token::Nonterminal(s) => Ok(Symbol::Nonterminal(s.clone())),
            Token::Terminal(s) => Ok(Symbol::Terminal(s.clone()))
        })
        .collect()
}

fn parse_rewrite(tokens: &[Token]) -> Result<Rewrite> {
    tokens.split(|t| *t == Token::Or).map(parse_alternative).collect()
}

fn parse_line(tokens: &[Token]) -> Result<Line> {
    // Try to get the token the rule is for. The match returns a result which
    // is then unwrapped with the ? operator
    let symbol = match tokens.first() {
        Some(Token::Or) => return Ok(Line::Continuation(parse_rewrite(&tokens[1..])?)),
        Some(Token::Nonterminal(s)) => Ok(s.clone()),
        Some(_) => Err(CompileErrorType::MissingNonterminal),
        None => Err(CompileErrorType::UnexpectedBlankLine)
    }?;

    if tokens.get(1) != Some(&Token::Equals) {
        return Err(CompileErrorType::MissingEquals)
    }

    let rewrite = parse_rewrite(&tokens[2..])?;

    return Ok(Line::Rule { symbol, rewrite });
}

fn parse_lex_line(line: &str, location: &Location) -> LineResult<Line> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line))
        .map_err(|error| CompileError::new(location.clone(), error))
}

fn is_rule_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with(';')
}

// Folds continuation lines into the rule above them, one grammar rule per
// alternative
fn located_rules(lines: Vec<(Line, Location)>) -> LineResult<Vec<LocatedRule>> {
    let mut rules: Vec<LocatedRule> = Vec::new();

    for (line, location) in lines {
        let (symbol, rewrite) = match line {
            Line::Rule { symbol, rewrite } => (symbol, rewrite),
            Line::Continuation(rewrite) => match rules.last() {
                Some(last) => (last.rule.head.clone(), rewrite),
                None => return Err(CompileError::new(location, CompileErrorType::ContinuationWithoutRule)),
            },
        };
        rules.extend(rewrite.into_iter().map(|alternative| LocatedRule {
            rule: Rule::new(symbol.clone(), alternative),
            location: location.clone(),
        }));
    }

    Ok(rules)
}

fn grammar_from_lines(lines: Vec<(Line, Location)>, path: &Path) -> FileResult<Grammar> {
    let rules = located_rules(lines).map_err(|e| vec![e])?;

    let start_symbol = match rules.first() {
        Some(first) => first.rule.head.clone(),
        None => return Err(vec![CompileError::new(Location::file(path), CompileErrorType::NoRules)]),
    };

    verify_rules(&rules)?;

    let grammar = Grammar::from_rules(start_symbol, rules.into_iter().map(|r| r.rule).collect());
    debug!(
        "loaded {}: {} non-terminals, {} terminals, {} rules",
        path.display(),
        grammar.nonterminals.len(),
        grammar.terminals.len(),
        grammar.rules.len()
    );
    return Ok(grammar);
}

// Parses numbered lines, reporting every broken line rather than the first
fn parse_lines(lines: impl Iterator<Item = (usize, LineResult<String>)>, path: &Path) -> FileResult<Grammar> {
    let parsed_lines = lines.map(|(num, line_res)| {
        let location = Location::line(path, num);
        line_res
            .and_then(|line| parse_lex_line(&line, &location))
            .map(|line| (line, location))
    });

    let (lines, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if errors.len() > 0 {
        return Err(errors);
    }

    return grammar_from_lines(lines, path);
}

pub fn parse_file(path: &Path) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path)])?;

    let lines = std::io::BufReader::new(file)
        .lines()
        .map(|line| line.map_err(|e| io_error(e, path)))
        .enumerate()
        .filter(|(_, line)| line.as_ref().map_or(true, |l| is_rule_line(l)))
        .map(|(num, line)| (num + 1, line));

    parse_lines(lines, path)
}

// Same as `parse_file` for text already in memory; `path` only labels errors
pub fn parse_str(text: &str, path: &Path) -> FileResult<Grammar> {
    let lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| is_rule_line(line))
        .map(|(num, line)| (num + 1, Ok(line.to_string())));

    parse_lines(lines, path)
}

#[cfg(test)]
mod tests {
    use std::iter::zip;
    use std::path::PathBuf;

    use super::*;

    fn s_nonterminal(text: &str) -> Symbol {
        Symbol::Nonterminal(text.to_string())
    }

    fn s_terminal(text: &str) -> Symbol {
        Symbol::Terminal(text.to_string())
    }

    fn nowhere() -> Location {
        Location::file(Path::new(""))
    }

    #[test]
    fn parse_normal_alternative() {
        let lines = vec![
            vec![
                Token::Nonterminal("Det".to_string()),
                Token::Nonterminal("N".to_string()),
                Token::Terminal("with".to_string())
            ],
            vec![
                Token::Terminal("".to_string())
            ],
            vec![
                Token::Terminal("".to_string()),
                Token::Nonterminal("N".to_string())
            ]
        ];
        let answers = vec![
            vec![
                s_nonterminal("Det"),
                s_nonterminal("N"),
                s_terminal("with")
            ],
            vec![],
            vec![s_nonterminal("N")]
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(parse_alternative(&line[..]).unwrap(), answer);
        }
    }

    #[test]
    fn parse_malformed_alternative() {
        assert_eq!(parse_alternative(&[Token::Equals]), Err(CompileErrorType::UnexpectedEquals));
        assert_eq!(parse_alternative(&[Token::Or]), Err(CompileErrorType::UnsplitRewrite));
        assert_eq!(parse_alternative(&[]), Err(CompileErrorType::DanglingAlternative));
    }

    #[test]
    fn parse_normal_line() {
        let lexed = lexer::lex_line("NP = Det N | \"she\"").unwrap();
        let answer = Line::Rule {
            symbol: "NP".to_string(),
            rewrite: vec![
                vec![s_nonterminal("Det"), s_nonterminal("N")],
                vec![s_terminal("she")]
            ]
        };
        assert_eq!(parse_line(&lexed[..]), Ok(answer));

        let lexed = lexer::lex_line("  | \"he\" | \"\"").unwrap();
        let answer = Line::Continuation(vec![vec![s_terminal("he")], vec![]]);
        assert_eq!(parse_line(&lexed[..]), Ok(answer));
    }

    #[test]
    fn parse_malformed_line() {
        // Blank
        assert_eq!(parse_line(&[]), Err(CompileErrorType::UnexpectedBlankLine));

        let lines = vec![
            "alpha bravo charlie",
            "\"alpha\" = bravo charlie",
            "= alpha bravo charlie",
            "alpha = bravo |",
            "alpha = | bravo",
            "alpha = bravo = charlie"
        ];
        let answers = vec![
            CompileErrorType::MissingEquals,
            CompileErrorType::MissingNonterminal,
            CompileErrorType::MissingNonterminal,
            CompileErrorType::DanglingAlternative,
            CompileErrorType::DanglingAlternative,
            CompileErrorType::UnexpectedEquals
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(parse_line(&lexer::lex_line(line).unwrap()[..]), Err(answer), "{}", line);
        }
    }

    #[test]
    fn continuation_needs_a_rule() {
        let lines = vec![(Line::Continuation(vec![vec![]]), nowhere())];
        assert_eq!(
            located_rules(lines).unwrap_err().error,
            CompileErrorType::ContinuationWithoutRule
        );
    }

    #[test]
    fn parse_text_with_repeated_heads() {
        let text = "S = A | \"x\"\n\n; more S\nS = \"\"\nA = 'a' S\n";
        let grammar = parse_str(text, Path::new("inline")).unwrap();

        assert_eq!(grammar.start_symbol, "S");
        assert_eq!(grammar.rules, vec![
            Rule::new("S", vec![s_nonterminal("A")]),
            Rule::new("S", vec![s_terminal("x")]),
            Rule::new("S", vec![]),
            Rule::new("A", vec![s_terminal("a"), s_nonterminal("S")]),
        ]);
        assert_eq!(grammar.validate(), Ok(()));
    }

    #[test]
    fn parse_text_without_rules() {
        let path = PathBuf::from("empty.bnf");
        assert_eq!(parse_str("; nothing here\n\n", &path), Err(vec![
            CompileError::new(Location::file(&path), CompileErrorType::NoRules)
        ]));
    }

    #[test]
    fn parse_text_with_undefined_nonterminal() {
        let path = PathBuf::from("undefined.bnf");
        assert_eq!(parse_str("S = NP VP\nNP = \"he\"\n", &path), Err(vec![
            CompileError::new(Location::line(&path, 1), CompileErrorType::UndefinedNonterminal("VP".to_string()))
        ]));
    }

    #[test]
    fn parse_normal_file() {
        let example_path = PathBuf::from("example_data/english.bnf");
        let grammar = parse_file(&example_path).unwrap();

        assert_eq!(grammar.start_symbol, "S");
        assert_eq!(grammar.nonterminals.iter().collect_vec(), vec!["S", "VP", "PP", "NP", "V", "P", "N", "Det"]);
        assert_eq!(grammar.terminals.len(), 21);
        assert_eq!(grammar.rules.len(), 30);

        let nouns = grammar.rules_for("N").map(|(_, r)| r.body[0].name()).collect_vec();
        assert_eq!(nouns, vec![
            "cat", "dog", "beer", "cake", "juice", "meat", "soup",
            "fork", "knife", "oven", "spoon"
        ]);
        assert_eq!(grammar.rules[0], Rule::new("S", vec![s_nonterminal("NP"), s_nonterminal("VP")]));
    }

    #[test]
    fn parse_malformed_file() {
        let example_path = PathBuf::from("example_data/malformed.bnf");
        let example_parsed = parse_file(&example_path).unwrap_err();

        let errors = vec![
            (3, CompileErrorType::MissingNonterminal),
            (5, CompileErrorType::UnexpectedEquals),
            (6, CompileErrorType::UnmatchedQuote),
            (8, CompileErrorType::DanglingAlternative),
        ];
        assert_eq!(example_parsed, errors.into_iter()
            .map(|(line, error)| CompileError::new(Location::line(&example_path, line), error))
            .collect_vec());
    }

    #[test]
    fn missing_file() {
        let path = PathBuf::from("example_data/does_not_exist.bnf");
        let errors = parse_file(&path).unwrap_err();
        assert_eq!(errors, vec![CompileError::new(
            Location::file(&path),
            CompileErrorType::FileError(std::io::Error::from(std::io::ErrorKind::NotFound))
        )]);
    }
}
