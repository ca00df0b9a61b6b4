//! Whitespace and comments owned by tree nodes
//!
//! Every byte of source text that is not part of a token lives in exactly one
//! [`Space`]: a node's prefix, or the padding before a separator. Comments are
//! kept verbatim inside the space so that printing is byte exact.

use std::fmt;

/// Raw whitespace and comments preceding a token or separator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Space {
    text: String,
}

/// A comment found inside a [`Space`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment body without delimiters
    pub text: String,
    /// `/* */` style rather than `//`
    pub multiline: bool,
    /// Whitespace following the comment up to the next comment or token
    pub suffix: String,
}

impl Space {
    pub const EMPTY: Space = Space {
        text: String::new(),
    };

    pub fn format(text: impl Into<String>) -> Self {
        Space { text: text.into() }
    }

    /// A newline followed by `indent`
    pub fn newline(indent: &str) -> Self {
        Space {
            text: format!("\n{indent}"),
        }
    }

    pub fn single_space() -> Self {
        Space::format(" ")
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn has_newline(&self) -> bool {
        self.text.contains('\n')
    }

    /// Leading whitespace of the last line
    pub fn indent(&self) -> &str {
        let last_line = match self.text.rfind('\n') {
            Some(idx) => &self.text[idx + 1..],
            None => &self.text,
        };
        let end = last_line
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(last_line.len());
        &last_line[..end]
    }

    /// Comments in source order
    pub fn comments(&self) -> Vec<Comment> {
        let mut comments = Vec::new();
        let bytes = self.text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if self.text[i..].starts_with("//") {
                let end = self.text[i..].find('\n').map_or(bytes.len(), |n| i + n);
                comments.push(Comment {
                    text: self.text[i + 2..end].to_string(),
                    multiline: false,
                    suffix: String::new(),
                });
                i = end;
            } else if self.text[i..].starts_with("/*") {
                let end = self.text[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |n| i + 2 + n + 2);
                let body_end = end.saturating_sub(2).max(i + 2);
                comments.push(Comment {
                    text: self.text[i + 2..body_end].to_string(),
                    multiline: true,
                    suffix: String::new(),
                });
                i = end;
            } else {
                let start = i;
                while i < bytes.len()
                    && !self.text[i..].starts_with("//")
                    && !self.text[i..].starts_with("/*")
                {
                    i += self.text[i..].chars().next().map_or(1, char::len_utf8);
                }
                if let Some(last) = comments.last_mut() {
                    last.suffix.push_str(&self.text[start..i]);
                }
            }
        }
        comments
    }

    /// Insert `indent` after every newline
    pub fn shift_indent(&self, indent: &str) -> Space {
        if indent.is_empty() || !self.has_newline() {
            return self.clone();
        }
        Space {
            text: self.text.replace('\n', &format!("\n{indent}")),
        }
    }

    /// Drop whitespace before the first comment (or all of it when there is none)
    pub fn trim_leading_whitespace(&self) -> Space {
        Space {
            text: self.text.trim_start().to_string(),
        }
    }

    /// Prepend a comment before the token: `// text` on its own line when the
    /// token starts a line, `/* text */` inline otherwise
    pub fn with_line_comment(&self, comment: &str) -> Space {
        let comment = comment.trim();
        if self.has_newline() {
            let indent = self.indent();
            Space {
                text: format!("{}// {}\n{}", self.text, comment, indent),
            }
        } else {
            Space {
                text: format!("{}/* {} */ ", self.text, comment),
            }
        }
    }

    pub fn concat(&self, other: &Space) -> Space {
        Space {
            text: format!("{}{}", self.text, other.text),
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_of_last_line() {
        assert_eq!(Space::format("\n\n        ").indent(), "        ");
        assert_eq!(Space::format("\n    // note\n    ").indent(), "    ");
        assert_eq!(Space::format(" ").indent(), " ");
        assert_eq!(Space::EMPTY.indent(), "");
    }

    #[test]
    fn test_comments_are_extracted_in_order() {
        let space = Space::format("\n    /** doc */\n    // trailing\n    ");
        let comments = space.comments();
        assert_eq!(comments.len(), 2);
        assert!(comments[0].multiline);
        assert_eq!(comments[0].text, "* doc ");
        assert_eq!(comments[0].suffix, "\n    ");
        assert!(!comments[1].multiline);
        assert_eq!(comments[1].text, " trailing");
    }

    #[test]
    fn test_shift_indent() {
        let space = Space::format("/**\n * c\n */\n");
        assert_eq!(space.shift_indent("    ").as_str(), "/**\n     * c\n     */\n    ");
        assert_eq!(Space::format(" ").shift_indent("    ").as_str(), " ");
    }

    #[test]
    fn test_line_comment_placement() {
        let own_line = Space::format("\n        ").with_line_comment("migrate");
        assert_eq!(own_line.as_str(), "\n        // migrate\n        ");

        let inline = Space::format(" ").with_line_comment("migrate");
        assert_eq!(inline.as_str(), " /* migrate */ ");

        let padded = Space::format("").with_line_comment(" boxed ");
        assert_eq!(padded.as_str(), "/* boxed */ ");
    }
}
