//! Operator-precedence formula parser
//!
//! Tokens are first scanned into a flat buffer of operands and pending
//! operators, recursing for parentheses and `IF` clauses. The buffer is then
//! folded once per precedence tier: prefix operators right to left, then
//! infix operators left to right, so `-1-2` groups as `(-1)-2`.

use super::ast::{BinaryOperator, Formula, CONDITIONAL_TIER, NEGATE_TIER, TIER_COUNT};
use super::error::{FormulaError, FormulaResult};
use super::lexer;
use super::token::{Symbol, Token};
use crate::config::compile_time::formula::MAX_NESTING_DEPTH;
use crate::utils::Location;
use std::fmt;

/// Unfolded formula pieces
#[derive(Debug)]
enum BufferItem {
    Operand(Formula),
    Negate,
    Infix(BinaryOperator),
    /// `IF condition THEN then_branch ELSE` still waiting for its else branch
    Conditional {
        condition: Formula,
        then_branch: Formula,
    },
}

impl BufferItem {
    fn is_operand(&self) -> bool {
        matches!(self, BufferItem::Operand(_))
    }

    fn prefix_tier(&self) -> Option<usize> {
        match self {
            BufferItem::Negate => Some(NEGATE_TIER),
            BufferItem::Conditional { .. } => Some(CONDITIONAL_TIER),
            _ => None,
        }
    }
}

impl fmt::Display for BufferItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferItem::Operand(formula) => write!(f, "{}", formula),
            BufferItem::Negate => f.write_str("-"),
            BufferItem::Infix(op) => write!(f, "{}", op),
            BufferItem::Conditional {
                condition,
                then_branch,
            } => write!(f, "IF {} THEN {} ELSE", condition, then_branch),
        }
    }
}

pub struct FormulaParser<'a> {
    tokens: Vec<Token>,
    index: usize,
    location: &'a Location,
}

impl<'a> FormulaParser<'a> {
    pub fn new(tokens: Vec<Token>, location: &'a Location) -> Self {
        Self {
            tokens,
            index: 0,
            location,
        }
    }

    pub fn parse(mut self) -> FormulaResult<Formula> {
        let formula = self.parse_group(0)?;
        if let Some(token) = self.tokens.get(self.index) {
            return Err(self.error(format!("expected end of expression. got '{}'", token)));
        }
        Ok(formula)
    }

    fn error(&self, message: String) -> FormulaError {
        FormulaError::syntax(message, self.location)
    }

    fn expect(&mut self, symbol: Symbol) -> FormulaResult<()> {
        let Some(token) = self.tokens.get(self.index) else {
            return Err(self.error("unexpected end of formula".to_string()));
        };
        if !token.is_symbol(symbol) {
            return Err(self.error(format!("expected '{}'. got '{}'", symbol.as_str(), token)));
        }
        self.index += 1;
        Ok(())
    }

    fn parse_group(&mut self, depth: usize) -> FormulaResult<Formula> {
        if depth > MAX_NESTING_DEPTH {
            return Err(FormulaError::too_deep(self.location));
        }

        let mut buffer: Vec<BufferItem> = Vec::new();

        while let Some(token) = self.tokens.get(self.index).cloned() {
            match token {
                Token::Symbol(Symbol::RightParen | Symbol::Then | Symbol::Else) => break,
                Token::Symbol(Symbol::LeftParen) => {
                    self.index += 1;
                    let inner = self.parse_group(depth + 1)?;
                    self.expect(Symbol::RightParen)?;
                    buffer.push(BufferItem::Operand(inner));
                }
                Token::Symbol(Symbol::If) => {
                    self.index += 1;
                    let condition = self.parse_group(depth + 1)?;
                    self.expect(Symbol::Then)?;
                    let then_branch = self.parse_group(depth + 1)?;
                    self.expect(Symbol::Else)?;
                    buffer.push(BufferItem::Conditional {
                        condition,
                        then_branch,
                    });
                }
                Token::Symbol(symbol @ (Symbol::Plus | Symbol::Minus))
                    if !buffer.last().is_some_and(BufferItem::is_operand) =>
                {
                    self.index += 1;
                    // Unary plus changes nothing
                    if symbol == Symbol::Minus {
                        buffer.push(BufferItem::Negate);
                    }
                }
                Token::Symbol(symbol) => {
                    self.index += 1;
                    let op = BinaryOperator::from_symbol(symbol).ok_or_else(|| {
                        self.error(format!("symbol out of place '{}'", symbol.as_str()))
                    })?;
                    buffer.push(BufferItem::Infix(op));
                }
                Token::Identifier(name) => {
                    self.index += 1;
                    let operand = if name == "level" {
                        Formula::Level
                    } else {
                        Formula::Identifier(name)
                    };
                    buffer.push(BufferItem::Operand(operand));
                }
                Token::Integer(value) => {
                    self.index += 1;
                    buffer.push(BufferItem::Operand(Formula::Integer(value)));
                }
                Token::Percent(value) => {
                    self.index += 1;
                    buffer.push(BufferItem::Operand(Formula::Percent(value)));
                }
                Token::Boolean(value) => {
                    self.index += 1;
                    buffer.push(BufferItem::Operand(Formula::Boolean(value)));
                }
            }
        }

        self.fold(buffer)
    }

    fn fold(&self, mut buffer: Vec<BufferItem>) -> FormulaResult<Formula> {
        for tier in 0..TIER_COUNT {
            self.fold_prefixes(&mut buffer, tier)?;
            self.fold_infixes(&mut buffer, tier)?;
        }

        if buffer.len() > 1 {
            return Err(self.error(format!(
                "expected end of expression after '{}'",
                buffer[0]
            )));
        }
        match buffer.pop() {
            Some(BufferItem::Operand(formula)) => Ok(formula),
            Some(item) => Err(self.error(format!("expected something after '{}'", item))),
            None => Err(self.error("empty expression".to_string())),
        }
    }

    fn fold_prefixes(&self, buffer: &mut Vec<BufferItem>, tier: usize) -> FormulaResult<()> {
        for i in (0..buffer.len()).rev() {
            if buffer[i].prefix_tier() != Some(tier) {
                continue;
            }
            let operand = self.take_operand_after(buffer, i)?;
            let formula = match std::mem::replace(&mut buffer[i], BufferItem::Negate) {
                BufferItem::Conditional {
                    condition,
                    then_branch,
                } => Formula::conditional(condition, then_branch, operand),
                _ => Formula::negate(operand),
            };
            buffer[i] = BufferItem::Operand(formula);
        }
        Ok(())
    }

    fn fold_infixes(&self, buffer: &mut Vec<BufferItem>, tier: usize) -> FormulaResult<()> {
        let mut i = 0;
        while i < buffer.len() {
            let op = match &buffer[i] {
                BufferItem::Infix(op) if op.tier() == tier => *op,
                _ => {
                    i += 1;
                    continue;
                }
            };

            if i == 0 {
                return Err(self.error(format!(
                    "can't start an expression with '{}'",
                    buffer[0]
                )));
            }
            if !buffer[i - 1].is_operand() {
                return Err(self.error(format!(
                    "expected something between '{}' and '{}'",
                    buffer[i - 1],
                    op
                )));
            }

            let right = self.take_operand_after(buffer, i)?;
            buffer.remove(i);
            let BufferItem::Operand(left) = buffer.remove(i - 1) else {
                return Err(self.error(format!("expected something before '{}'", op)));
            };
            buffer.insert(i - 1, BufferItem::Operand(Formula::binary(op, left, right)));
            // `i` now points at the item after the folded operand
        }
        Ok(())
    }

    /// Remove and return the operand following position `i`
    fn take_operand_after(&self, buffer: &mut Vec<BufferItem>, i: usize) -> FormulaResult<Formula> {
        let Some(next) = buffer.get(i + 1) else {
            return Err(self.error(format!("expected something after '{}'", buffer[i])));
        };
        if !next.is_operand() {
            return Err(self.error(format!(
                "expected something between '{}' and '{}'",
                buffer[i], next
            )));
        }
        match buffer.remove(i + 1) {
            BufferItem::Operand(formula) => Ok(formula),
            item => Err(self.error(format!("expected something after '{}'", item))),
        }
    }
}

/// Tokenize and parse one formula
pub fn parse_formula(text: &str, location: &Location) -> FormulaResult<Formula> {
    let tokens = lexer::tokenize(text, location)?;
    FormulaParser::new(tokens, location).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse(text: &str) -> FormulaResult<Formula> {
        parse_formula(text, &Location::new("parser.txt", 3))
    }

    fn render(text: &str) -> String {
        parse(text).unwrap().to_string()
    }

    fn syntax_message(text: &str) -> String {
        match parse(text) {
            Err(FormulaError::Syntax { message, .. }) => message,
            other => panic!("expected syntax error for {:?}, got {:?}", text, other),
        }
    }

    #[test]
    fn test_precedence_tiers() {
        assert_eq!(render("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(render("ST*ST/5"), "((ST * ST) / 5)");
        assert_eq!(render("1 + 2 < 4 AND true OR false"), "((((1 + 2) < 4) AND true) OR false)");
    }

    #[test]
    fn test_unary_minus_binds_left_operand_first() {
        assert_eq!(render("-1-2"), "((-1) - 2)");
        assert_eq!(render("- -3"), "(-(-3))");
        assert_eq!(render("+5"), "5");
        assert_eq!(render("1 + -2"), "(1 + (-2))");
    }

    #[test]
    fn test_level_keyword() {
        assert_eq!(parse("10 * level").unwrap(), Formula::binary(
            BinaryOperator::Multiply,
            Formula::Integer(10),
            Formula::Level,
        ));
    }

    #[test]
    fn test_conditional_else_extends_right() {
        assert_eq!(
            render("IF ST > 10 THEN 1 ELSE 2 + 3"),
            "(IF (ST > 10) THEN 1 ELSE (2 + 3))"
        );
        assert_eq!(
            render("IF a THEN 1 ELSE IF b THEN 2 ELSE 3"),
            "(IF a THEN 1 ELSE (IF b THEN 2 ELSE 3))"
        );
    }

    #[test]
    fn test_parenthesized_operand_is_closed() {
        assert_eq!(render("(1 + 2) - 3"), "((1 + 2) - 3)");
    }

    #[test]
    fn test_rendering_reparses_to_same_tree() {
        for text in [
            "ST*ST/5",
            "IF Combat Reflexes AND DX >= 12 THEN -level ELSE 2 * (HT - 10)",
            "level * 10 + 5%",
            "Guns (Pistol) + 1",
        ] {
            let first = parse(text).unwrap();
            let second = parse(&first.to_string()).unwrap();
            assert_eq!(first, second, "round trip of {}", text);
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(syntax_message(""), "empty expression");
        assert_eq!(syntax_message("1 +"), "expected something after '+'");
        assert_eq!(syntax_message("* 2"), "can't start an expression with '*'");
        assert_eq!(syntax_message("1 * / 2"), "expected something between '*' and '/'");
        assert_eq!(syntax_message("1 2"), "expected end of expression after '1'");
        assert_eq!(syntax_message("(1 + 2"), "unexpected end of formula");
        assert_eq!(syntax_message("1 + 2)"), "expected end of expression. got ')'");
        assert_eq!(syntax_message("IF a THEN 1"), "unexpected end of formula");
        assert_eq!(syntax_message("IF a ELSE 1"), "expected 'THEN'. got 'ELSE'");
    }

    #[test]
    fn test_error_carries_location() {
        let error = parse("1 +").unwrap_err();
        assert_eq!(error.to_string(), "expected something after '+' (parser.txt:3)");
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_NESTING_DEPTH + 1;
        let text = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_matches!(parse(&text), Err(FormulaError::TooDeep { .. }));
    }

    #[test]
    fn test_lex_errors_pass_through() {
        assert_matches!(parse("ST # 2"), Err(FormulaError::InvalidCharacter { character: '#', .. }));
    }
}
