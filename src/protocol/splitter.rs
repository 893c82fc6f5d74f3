//! Line tokenizer with limited-split semantics.
//!
//! A [`Splitter`] cuts one protocol line into parts around a delimiter. The
//! result of a split is an immutable [`Parts`] value that borrows the line, so
//! nothing about the last split is kept inside the splitter itself.
//!
//! Parts are addressed from 1: after a limit-2 split, part 1 is the command
//! word and part 2 the rest of the line. Index 0 is accepted as an alias for
//! part 1.

use thiserror::Error;

/// Failures raised while tokenizing a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("part {index} out of range ({len} parts)")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Delimiter {
    /// A run of one or more whitespace characters.
    Whitespace,
    Literal(String),
}

impl Delimiter {
    /// Byte range of the first delimiter match in `haystack`.
    fn find(&self, haystack: &str) -> Option<(usize, usize)> {
        match self {
            Delimiter::Whitespace => {
                let start = haystack.find(char::is_whitespace)?;
                let end = haystack[start..]
                    .find(|c: char| !c.is_whitespace())
                    .map_or(haystack.len(), |offset| start + offset);
                Some((start, end))
            }
            Delimiter::Literal(literal) => haystack
                .find(literal.as_str())
                .map(|start| (start, start + literal.len())),
        }
    }
}

/// Splits lines around a fixed delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splitter {
    delimiter: Delimiter,
}

impl Splitter {
    /// Create a splitter that cuts on the literal string `pattern`.
    pub fn new(pattern: &str) -> Result<Self, SplitError> {
        if pattern.is_empty() {
            return Err(SplitError::InvalidArgument("delimiter must not be empty"));
        }
        Ok(Self {
            delimiter: Delimiter::Literal(pattern.to_string()),
        })
    }

    /// Create a splitter that cuts on runs of whitespace.
    pub fn whitespace() -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
        }
    }

    /// Split `line` into at most `limit` parts (`0` means unbounded).
    ///
    /// With a positive limit the last part holds whatever was not split and
    /// trailing empty parts are kept. An unbounded split drops trailing empty
    /// parts.
    pub fn split<'a>(&self, line: &'a str, limit: usize) -> Result<Parts<'a>, SplitError> {
        if line.is_empty() {
            return Err(SplitError::InvalidArgument("line must not be empty"));
        }
        Ok(Parts {
            parts: self.split_limited(line, limit),
        })
    }

    /// Unbounded split of `line`, returning every part in order.
    pub fn all_parts<'a>(&self, line: &'a str) -> Result<Vec<&'a str>, SplitError> {
        Ok(self.split(line, 0)?.parts)
    }

    fn split_limited<'a>(&self, line: &'a str, limit: usize) -> Vec<&'a str> {
        let mut parts = Vec::new();
        let mut rest = line;
        while limit == 0 || parts.len() + 1 < limit {
            let Some((start, end)) = self.delimiter.find(rest) else {
                break;
            };
            parts.push(&rest[..start]);
            rest = &rest[end..];
        }
        parts.push(rest);

        if limit == 0 && parts.len() > 1 {
            while parts.last() == Some(&"") {
                parts.pop();
            }
        }
        parts
    }
}

/// The outcome of one [`Splitter::split`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parts<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Parts<'a> {
    /// Part `n`, counted from 1. `0` is treated as `1`.
    pub fn part(&self, n: usize) -> Result<&'a str, SplitError> {
        let index = n.saturating_sub(1);
        self.parts
            .get(index)
            .copied()
            .ok_or(SplitError::IndexOutOfRange {
                index: n,
                len: self.parts.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.parts
    }

    /// Owned copies of every part, in order.
    pub fn to_strings(&self) -> Vec<String> {
        self.parts.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_delimiter_rejected() {
        assert_eq!(
            Splitter::new(""),
            Err(SplitError::InvalidArgument("delimiter must not be empty"))
        );
    }

    #[test]
    fn test_empty_line_rejected() {
        let splitter = Splitter::whitespace();
        assert!(matches!(splitter.split("", 2), Err(SplitError::InvalidArgument(_))));
        assert!(matches!(splitter.all_parts(""), Err(SplitError::InvalidArgument(_))));
    }

    #[test]
    fn test_part_zero_is_part_one() {
        let splitter = Splitter::whitespace();
        for line in ["loginok", "msg root Hello world", " leading", "a  b"] {
            let parts = splitter.split(line, 2).unwrap();
            assert_eq!(parts.part(0), parts.part(1), "line {:?}", line);
        }
        let comma = Splitter::new(",").unwrap();
        let parts = comma.split("x,y", 0).unwrap();
        assert_eq!(parts.part(0), Ok("x"));
        assert_eq!(parts.part(1), Ok("x"));
    }

    #[test]
    fn test_limit_two_keeps_remainder() {
        let parts = Splitter::whitespace()
            .split("msg root Hello world", 2)
            .unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts.part(1), Ok("msg"));
        assert_eq!(parts.part(2), Ok("root Hello world"));
    }

    #[test]
    fn test_part_out_of_range() {
        let parts = Splitter::whitespace().split("loginok", 2).unwrap();
        assert_eq!(
            parts.part(2),
            Err(SplitError::IndexOutOfRange { index: 2, len: 1 })
        );
    }

    #[test]
    fn test_all_parts() {
        let splitter = Splitter::whitespace();
        assert_eq!(splitter.all_parts("a b c"), Ok(vec!["a", "b", "c"]));
        assert_eq!(splitter.all_parts("abc"), Ok(vec!["abc"]));
        assert_eq!(splitter.all_parts("a  b\tc"), Ok(vec!["a", "b", "c"]));
    }

    #[test]
    fn test_unbounded_split_trims_trailing_empties() {
        let comma = Splitter::new(",").unwrap();
        assert_eq!(comma.all_parts("a,b,,"), Ok(vec!["a", "b"]));
        assert_eq!(comma.all_parts(",a"), Ok(vec!["", "a"]));
        assert_eq!(comma.all_parts(",,"), Ok(vec![]));
    }

    #[test]
    fn test_limited_split_keeps_trailing_empties() {
        let comma = Splitter::new(",").unwrap();
        let parts = comma.split("a,b,", 3).unwrap();
        assert_eq!(parts.as_slice(), &["a", "b", ""]);

        let parts = Splitter::whitespace().split("users ", 2).unwrap();
        assert_eq!(parts.part(2), Ok(""));
    }

    #[test]
    fn test_limit_one_returns_whole_line() {
        let parts = Splitter::whitespace().split("privmsg bob hi", 1).unwrap();
        assert_eq!(parts.as_slice(), &["privmsg bob hi"]);
    }

    #[test]
    fn test_multichar_literal_delimiter() {
        let splitter = Splitter::new("::").unwrap();
        assert_eq!(splitter.all_parts("a::b:c::d"), Ok(vec!["a", "b:c", "d"]));
    }
}
