//! Line-oriented declaration parser
//!
//! Every significant line has the shape
//! `Name[.SubProperty] OPERATOR formula ["comment"] [{]`. A trailing `{`
//! opens a block of nested declarations closed by a line holding only `}`.
//! The first entry of a block may be a bare `"comment"` line instead.

use super::error::{DeclarationError, DeclarationResult};
use super::parsed_thing::{DeclarationOperator, ParsedThing, SourceText};
use crate::config::compile_time::declaration::{MAX_BLOCK_DEPTH, MAX_LINE_LENGTH};
use crate::utils::Location;
use std::sync::Arc;

/// Names no declaration may take
pub const RESERVED_NAMES: [&str; 3] = ["level", "cost", "none"];

pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | ' ' | '&' | '(' | ')' | '!')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_digit() || is_name_start(c)
}

fn is_line_blank(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

/// Pieces of one declaration line, borrowed from the source
#[derive(Debug, PartialEq)]
struct DeclarationLine<'a> {
    name: &'a str,
    sub_property: Option<&'a str>,
    operator: DeclarationOperator,
    formula: &'a str,
    comment: Option<&'a str>,
    opens_block: bool,
}

/// Split off a leading name; the remainder starts at the first non-name character
fn scan_name(text: &str) -> Option<(&str, &str)> {
    match text.chars().next() {
        Some(c) if is_name_start(c) => {}
        _ => return None,
    }

    let end = text
        .char_indices()
        .find(|(_, c)| !is_name_char(*c))
        .map(|(index, _)| index)
        .unwrap_or(text.len());

    Some(text.split_at(end))
}

fn split_declaration(line: &str) -> Option<DeclarationLine<'_>> {
    let (name, rest) = scan_name(line)?;

    let (sub_property, rest) = match rest.strip_prefix('.') {
        Some(after_dot) => {
            let (sub_property, rest) = scan_name(after_dot)?;
            let sub_property = sub_property.trim();
            if sub_property.is_empty() {
                return None;
            }
            (Some(sub_property), rest)
        }
        None => (None, rest),
    };

    let rest = rest.trim_start();
    let (operator, rest) = DeclarationOperator::ALL
        .iter()
        .find_map(|operator| rest.strip_prefix(operator.as_str()).map(|r| (*operator, r)))?;

    let formula_end = rest.find(['"', '{']).unwrap_or(rest.len());
    let (formula, rest) = rest.split_at(formula_end);

    // The comment runs to the last quote; only an optional `{` may follow it
    let (comment, rest) = match rest.strip_prefix('"') {
        Some(quoted) => {
            let close = quoted.rfind('"')?;
            (Some(&quoted[..close]), &quoted[close + 1..])
        }
        None => (None, rest),
    };

    let opens_block = match rest.trim() {
        "" => false,
        "{" => true,
        _ => return None,
    };

    Some(DeclarationLine {
        name: name.trim(),
        sub_property,
        operator,
        formula: formula.trim(),
        comment: comment.map(str::trim),
        opens_block,
    })
}

/// A line holding only `"comment"`
fn bare_comment(line: &str) -> Option<&str> {
    line.strip_prefix('"')?.strip_suffix('"')
}

/// Lazily yields the top-level declarations of one source
///
/// Parsing stops at the first error; the iterator is fused afterwards.
pub struct DeclarationParser<'a> {
    path: Arc<str>,
    lines: Vec<&'a str>,
    index: usize,
    finished: bool,
}

impl<'a> DeclarationParser<'a> {
    pub fn new(source: &'a SourceText) -> Self {
        Self {
            path: Arc::clone(&source.path),
            lines: source.text.lines().collect(),
            index: 0,
            finished: false,
        }
    }

    fn location(&self, line_index: usize) -> Location {
        Location::new(Arc::clone(&self.path), line_index + 1)
    }

    fn next_significant_line(&mut self) -> DeclarationResult<Option<(usize, &'a str)>> {
        while self.index < self.lines.len() {
            let line_index = self.index;
            self.index += 1;

            let raw = self.lines[line_index];
            let length = raw.chars().count();
            if length > MAX_LINE_LENGTH {
                return Err(DeclarationError::line_too_long(
                    length,
                    self.location(line_index),
                ));
            }

            let line = raw.trim();
            if !is_line_blank(line) {
                return Ok(Some((line_index, line)));
            }
        }
        Ok(None)
    }

    fn parse_thing(
        &mut self,
        line_index: usize,
        line: &'a str,
        depth: usize,
    ) -> DeclarationResult<ParsedThing> {
        let location = self.location(line_index);
        let declaration = split_declaration(line)
            .ok_or_else(|| DeclarationError::malformed_declaration(location.clone()))?;

        if is_reserved_name(declaration.name) {
            return Err(DeclarationError::reserved_name(declaration.name, location));
        }

        let mut thing = ParsedThing {
            name: declaration.name.to_string(),
            sub_property: declaration.sub_property.map(str::to_string),
            operator: declaration.operator,
            formula: declaration.formula.to_string(),
            comment: declaration.comment.map(str::to_string),
            location,
            sub_things: Vec::new(),
        };

        if declaration.opens_block {
            if depth + 1 > MAX_BLOCK_DEPTH {
                return Err(DeclarationError::block_too_deep(
                    depth + 1,
                    thing.location.clone(),
                ));
            }
            self.parse_block(&mut thing, depth + 1)?;
        }

        Ok(thing)
    }

    fn parse_block(&mut self, thing: &mut ParsedThing, depth: usize) -> DeclarationResult<()> {
        let mut first_entry = true;

        loop {
            let Some((line_index, line)) = self.next_significant_line()? else {
                return Err(DeclarationError::unterminated_block(
                    &thing.name,
                    thing.location.clone(),
                ));
            };

            if line == "}" {
                return Ok(());
            }

            if first_entry {
                first_entry = false;
                if let Some(comment) = bare_comment(line) {
                    if thing.comment.is_some() {
                        return Err(DeclarationError::duplicate_comment(
                            self.location(line_index),
                        ));
                    }
                    thing.comment = Some(comment.trim().to_string());
                    continue;
                }
            }

            let child = self.parse_thing(line_index, line, depth)?;
            thing.sub_things.push(child);
        }
    }
}

impl Iterator for DeclarationParser<'_> {
    type Item = DeclarationResult<ParsedThing>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = match self.next_significant_line() {
            Ok(Some((line_index, line))) => self.parse_thing(line_index, line, 0),
            Ok(None) => {
                self.finished = true;
                return None;
            }
            Err(error) => Err(error),
        };

        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse_all(text: &str) -> DeclarationResult<Vec<ParsedThing>> {
        let source = SourceText::new("test.txt", text);
        DeclarationParser::new(&source).collect()
    }

    #[test]
    fn test_split_simple_declaration() {
        let line = split_declaration("ST : 10 * level").unwrap();
        assert_eq!(line.name, "ST");
        assert_eq!(line.sub_property, None);
        assert_eq!(line.operator, DeclarationOperator::Define);
        assert_eq!(line.formula, "10 * level");
        assert!(!line.opens_block);
    }

    #[test]
    fn test_longest_operator_wins() {
        let line = split_declaration("Guns (Pistol) := Guns").unwrap();
        assert_eq!(line.name, "Guns (Pistol)");
        assert_eq!(line.operator, DeclarationOperator::Inherit);
        assert_eq!(line.formula, "Guns");
    }

    #[test]
    fn test_sub_property_and_modifier_operator() {
        let line = split_declaration("Magery.cost -= 10%").unwrap();
        assert_eq!(line.name, "Magery");
        assert_eq!(line.sub_property, Some("cost"));
        assert_eq!(line.operator, DeclarationOperator::SubtractFrom);
        assert_eq!(line.formula, "10%");
    }

    #[test]
    fn test_comment_runs_to_last_quote() {
        let line = split_declaration(r#"Luck : 15 "a "lucky" break" {"#).unwrap();
        assert_eq!(line.formula, "15");
        assert_eq!(line.comment, Some(r#"a "lucky" break"#));
        assert!(line.opens_block);
    }

    #[test]
    fn test_trailing_text_after_comment_is_rejected() {
        assert!(split_declaration(r#"Luck : 15 "lucky" extra"#).is_none());
        assert!(split_declaration("Luck : 15 { x").is_none());
        assert!(split_declaration("9Lives : 15").is_none());
        assert!(split_declaration("Luck 15").is_none());
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let things = parse_all("# header\n\n   \nST : 10 * level\n# trailing\n").unwrap();
        assert_eq!(things.len(), 1);
        assert_eq!(things[0].location.line(), 4);
    }

    #[test]
    fn test_block_with_comment_line_and_children() {
        let text = "Human : 0 {\n  \"baseline race\"\n  ST += 10\n  IQ += 10\n}\nDX : 20 * level\n";
        let things = parse_all(text).unwrap();

        assert_eq!(things.len(), 2);
        let human = &things[0];
        assert_eq!(human.comment.as_deref(), Some("baseline race"));
        assert_eq!(human.sub_things.len(), 2);
        assert_eq!(human.sub_things[0].name, "ST");
        assert_eq!(human.sub_things[0].operator, DeclarationOperator::AddTo);
        assert_eq!(human.sub_things[1].location.line(), 4);
        assert_eq!(things[1].name, "DX");
    }

    #[test]
    fn test_second_comment_is_rejected() {
        let text = "Human : 0 \"race\" {\n\"again\"\n}\n";
        assert_matches!(
            parse_all(text),
            Err(DeclarationError::DuplicateComment { location }) if location.line() == 2
        );
    }

    #[test]
    fn test_comment_line_only_allowed_first() {
        let text = "Human : 0 {\nST += 10\n\"late\"\n}\n";
        assert_matches!(
            parse_all(text),
            Err(DeclarationError::MalformedDeclaration { location }) if location.line() == 3
        );
    }

    #[test]
    fn test_unterminated_block() {
        let text = "Human : 0 {\nST += 10\n";
        assert_matches!(
            parse_all(text),
            Err(DeclarationError::UnterminatedBlock { name, location })
                if name == "Human" && location.line() == 1
        );
    }

    #[test]
    fn test_reserved_names() {
        assert_matches!(
            parse_all("level : 5"),
            Err(DeclarationError::ReservedName { name, .. }) if name == "level"
        );
        assert_matches!(
            parse_all("Human : 0 {\n cost += 5\n}"),
            Err(DeclarationError::ReservedName { name, .. }) if name == "cost"
        );
    }

    #[test]
    fn test_malformed_line_reports_path_and_line() {
        let error = parse_all("ST : 10 * level\n???\n").unwrap_err();
        assert_eq!(error.to_string(), "syntax problem (test.txt:2)");
    }

    #[test]
    fn test_parser_stops_after_first_error() {
        let source = SourceText::new("test.txt", "???\nST : 10\n");
        let mut parser = DeclarationParser::new(&source);
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_nested_blocks() {
        let text = "A : 0 {\n  B : 0 {\n    C += 1\n  }\n}\n";
        let things = parse_all(text).unwrap();
        assert_eq!(things[0].sub_things[0].sub_things[0].name, "C");
    }

    #[test]
    fn test_block_depth_limit() {
        let depth = MAX_BLOCK_DEPTH + 1;
        let mut text = String::new();
        for _ in 0..depth {
            text.push_str("A : 0 {\n");
        }
        for _ in 0..depth {
            text.push_str("}\n");
        }
        assert_matches!(parse_all(&text), Err(DeclarationError::BlockTooDeep { .. }));
    }
}
