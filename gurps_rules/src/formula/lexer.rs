//! Formula tokenizer
//!
//! Identifiers may contain spaces ("Basic Speed x4") and one trailing
//! parenthesized qualifier ("Guns (Pistol)"), but stop before a keyword word.

use super::error::{FormulaError, FormulaResult};
use super::token::{Percent, Symbol, Token};
use crate::config::compile_time::formula::{MAX_FORMULA_LENGTH, MAX_IDENTIFIER_LENGTH};
use crate::utils::Location;

fn is_word_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'&'
}

fn is_qualifier_char(c: u8) -> bool {
    is_word_char(c) || c == b' '
}

pub struct FormulaLexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    position: usize,
    location: &'a Location,
}

impl<'a> FormulaLexer<'a> {
    pub fn new(text: &'a str, location: &'a Location) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            position: 0,
            location,
        }
    }

    pub fn tokenize(mut self) -> FormulaResult<Vec<Token>> {
        let length = self.text.chars().count();
        if length > MAX_FORMULA_LENGTH {
            return Err(FormulaError::formula_too_long(length, self.location));
        }

        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.position + offset).copied()
    }

    fn next_token(&mut self) -> FormulaResult<Option<Token>> {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.position += 1;
        }

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let token = match c {
            b'0'..=b'9' => self.read_number()?,
            c if is_word_start(c) => self.read_word()?,
            _ => Token::Symbol(self.read_symbol()?),
        };
        Ok(Some(token))
    }

    fn read_symbol(&mut self) -> FormulaResult<Symbol> {
        let two_char = match (self.peek(), self.peek_at(1)) {
            (Some(b'<'), Some(b'=')) => Some(Symbol::LessEqual),
            (Some(b'>'), Some(b'=')) => Some(Symbol::GreaterEqual),
            _ => None,
        };
        if let Some(symbol) = two_char {
            self.position += 2;
            return Ok(symbol);
        }

        let symbol = match self.peek() {
            Some(b'(') => Symbol::LeftParen,
            Some(b')') => Symbol::RightParen,
            Some(b'*') => Symbol::Star,
            Some(b'/') => Symbol::Slash,
            Some(b'+') => Symbol::Plus,
            Some(b'-') => Symbol::Minus,
            Some(b',') => Symbol::Comma,
            Some(b'<') => Symbol::Less,
            Some(b'>') => Symbol::Greater,
            _ => {
                let character = self.text[self.position..].chars().next().unwrap_or('?');
                return Err(FormulaError::invalid_character(character, self.location));
            }
        };
        self.position += 1;
        Ok(symbol)
    }

    fn read_number(&mut self) -> FormulaResult<Token> {
        let start = self.position;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.position += 1;
        }
        let digits = &self.text[start..self.position];
        let value: i64 = digits
            .parse()
            .map_err(|_| FormulaError::invalid_number(digits, self.location))?;

        if self.peek() == Some(b'%') {
            self.position += 1;
            return Ok(Token::Percent(Percent(value)));
        }
        Ok(Token::Integer(value))
    }

    /// End of the word starting at `from`
    fn word_end(&self, from: usize) -> usize {
        let mut end = from;
        while matches!(self.bytes.get(end), Some(c) if is_word_char(*c)) {
            end += 1;
        }
        end
    }

    fn read_word(&mut self) -> FormulaResult<Token> {
        let start = self.position;
        let first_end = self.word_end(start);
        let first = &self.text[start..first_end];

        if let Some(symbol) = Symbol::keyword(first) {
            self.position = first_end;
            return Ok(Token::Symbol(symbol));
        }
        if first == "true" || first == "false" {
            self.position = first_end;
            return Ok(Token::Boolean(first == "true"));
        }

        let mut end = first_end;
        loop {
            let mut next = end;
            while self.bytes.get(next) == Some(&b' ') {
                next += 1;
            }

            match self.bytes.get(next) {
                Some(&c) if is_word_char(c) => {
                    let word_end = self.word_end(next);
                    if Symbol::keyword(&self.text[next..word_end]).is_some() {
                        break;
                    }
                    end = word_end;
                }
                Some(b'(') => {
                    if let Some(close) = self.qualifier_end(next) {
                        end = close;
                    }
                    break;
                }
                _ => break,
            }
        }

        self.position = end;
        let name = &self.text[start..end];
        let length = name.chars().count();
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(FormulaError::identifier_too_long(length, self.location));
        }
        Ok(Token::Identifier(name.to_string()))
    }

    /// Position just past `( ... )` when the parentheses hold only name characters
    fn qualifier_end(&self, open: usize) -> Option<usize> {
        let mut index = open + 1;
        while matches!(self.bytes.get(index), Some(c) if is_qualifier_char(*c)) {
            index += 1;
        }
        (self.bytes.get(index) == Some(&b')')).then_some(index + 1)
    }
}

pub fn tokenize(text: &str, location: &Location) -> FormulaResult<Vec<Token>> {
    FormulaLexer::new(text, location).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn lex(text: &str) -> FormulaResult<Vec<Token>> {
        tokenize(text, &Location::new("lexer.txt", 1))
    }

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_string())
    }

    #[test]
    fn test_numbers_and_percents() {
        assert_eq!(
            lex("10 * level").unwrap(),
            vec![Token::Integer(10), Token::Symbol(Symbol::Star), ident("level")]
        );
        assert_eq!(lex("37%").unwrap(), vec![Token::Percent(Percent(37))]);
    }

    #[test]
    fn test_multi_word_identifiers() {
        assert_eq!(
            lex("Basic Speed x4 + 1").unwrap(),
            vec![ident("Basic Speed x4"), Token::Symbol(Symbol::Plus), Token::Integer(1)]
        );
        assert_eq!(lex("Guns (Pistol)").unwrap(), vec![ident("Guns (Pistol)")]);
        assert_eq!(lex("Sex & Violence").unwrap(), vec![ident("Sex & Violence")]);
    }

    #[test]
    fn test_identifier_stops_before_keyword() {
        assert_eq!(
            lex("ST AND DX").unwrap(),
            vec![ident("ST"), Token::Symbol(Symbol::And), ident("DX")]
        );
        assert_eq!(
            lex("IF Combat Reflexes THEN 1 ELSE 0").unwrap(),
            vec![
                Token::Symbol(Symbol::If),
                ident("Combat Reflexes"),
                Token::Symbol(Symbol::Then),
                Token::Integer(1),
                Token::Symbol(Symbol::Else),
                Token::Integer(0),
            ]
        );
    }

    #[test]
    fn test_qualifier_with_operators_is_not_absorbed() {
        assert_eq!(
            lex("ST (1)").unwrap(),
            vec![ident("ST (1)")]
        );
        assert_eq!(
            lex("ST * (DX + 1)").unwrap()[2],
            Token::Symbol(Symbol::LeftParen)
        );
        assert_eq!(lex("ST (DX + 1)").unwrap()[0], ident("ST"));
    }

    #[test]
    fn test_booleans_are_whole_words() {
        assert_eq!(lex("true").unwrap(), vec![Token::Boolean(true)]);
        assert_eq!(lex("trueSight").unwrap(), vec![ident("trueSight")]);
    }

    #[test]
    fn test_comparison_symbols() {
        assert_eq!(
            lex("1<=2>=3<4>5").unwrap()
                .into_iter()
                .filter_map(|t| match t {
                    Token::Symbol(s) => Some(s),
                    _ => None,
                })
                .collect::<Vec<_>>(),
            vec![Symbol::LessEqual, Symbol::GreaterEqual, Symbol::Less, Symbol::Greater]
        );
    }

    #[test]
    fn test_invalid_character() {
        assert_matches!(
            lex("ST $ 2"),
            Err(FormulaError::InvalidCharacter { character: '$', .. })
        );
        assert_matches!(
            lex("ST é"),
            Err(FormulaError::InvalidCharacter { character: 'é', .. })
        );
    }

    #[test]
    fn test_number_overflow() {
        assert_matches!(
            lex("99999999999999999999999"),
            Err(FormulaError::InvalidNumber { .. })
        );
    }

    #[test]
    fn test_identifier_length_limit() {
        let long = "x".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert_matches!(lex(&long), Err(FormulaError::IdentifierTooLong { .. }));
    }
}
