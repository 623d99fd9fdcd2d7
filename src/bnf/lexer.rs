use itertools::{Itertools, PeekingNext};

use super::{CompileErrorType, Result};

#[derive(PartialEq, Debug)]
pub enum Token {
    Equals,
    Or,
    Nonterminal(String),
    Terminal(String)
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '=' | '|' | '"' | '\'' | ';' | ':')
}

// Lexes a terminal quoted with either `"` or `'`
pub fn lex_terminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    let quote = line.next().ok_or(CompileErrorType::UnmatchedQuote)?;
    let token_text = line.peeking_take_while(|&c| c != quote).collect();

    // Check if there is a close quote and consume it if there is
    if line.next() != Some(quote) {
        return Err(CompileErrorType::UnmatchedQuote);
    }

    Ok(Token::Terminal(token_text))
}

pub fn lex_nonterminal(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    Ok(Token::Nonterminal(line.peeking_take_while(|&c| !is_delimiter(c)).collect()))
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    let mut line_chars = line.chars().peekable();

    while let Some(&c) = line_chars.peek() {
        match c {
            '=' => {
                line_chars.next();
                tokens.push(Token::Equals);
            }
            ':' => {
                // Only `::=` may contain a colon
                let mut ahead = line_chars.clone();
                if ahead.next() == Some(':') && ahead.next() == Some(':') && ahead.next() == Some('=') {
                    line_chars = ahead;
                    tokens.push(Token::Equals);
                } else {
                    return Err(CompileErrorType::UnexpectedCharacter(':'));
                }
            }
            '|' => {
                line_chars.next();
                tokens.push(Token::Or);
            }
            '"' | '\'' => tokens.push(lex_terminal(&mut line_chars)?),
            // The rest of the line is a comment
            ';' => break,
            c if c.is_whitespace() => {
                line_chars.next();
            }
            _ => tokens.push(lex_nonterminal(&mut line_chars)?),
        }
    }

    return Ok(tokens);
}
