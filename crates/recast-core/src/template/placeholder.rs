use crate::error::RecastError;
use crate::result::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// `#{}` or `#{name}`: the argument's text is pasted into the snippet
    Text,
    /// `#{any()}` or `#{any(Type)}`: the argument is a tree bound in place of a stand-in
    Tree { type_name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: Option<String>,
    pub kind: PlaceholderKind,
    /// Byte range of `#{...}` in the snippet
    pub start: usize,
    pub end: usize,
    /// Argument bound to this placeholder
    pub argument: usize,
}

/// Identifier substituted for tree placeholder `index` before parsing
pub fn stand_in(index: usize) -> String {
    format!("__p{index}__")
}

/// Argument index encoded in a stand-in identifier
pub fn stand_in_index(name: &str) -> Option<usize> {
    name.strip_prefix("__p")?.strip_suffix("__")?.parse().ok()
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn parse_body(code: &str, body: &str) -> Result<(Option<String>, PlaceholderKind)> {
    let body = body.trim();
    if body.is_empty() {
        return Ok((None, PlaceholderKind::Text));
    }
    if is_identifier(body) && body != "any" {
        return Ok((Some(body.to_string()), PlaceholderKind::Text));
    }

    let (name, matcher) = match body.split_once(':') {
        Some((name, matcher)) => {
            let name = name.trim();
            if !is_identifier(name) {
                return Err(RecastError::template_definition(
                    code,
                    format!("invalid placeholder name '{name}'"),
                ));
            }
            (Some(name.to_string()), matcher.trim())
        }
        None => (None, body),
    };

    let argument = matcher
        .strip_prefix("any(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| {
            RecastError::template_definition(code, format!("unsupported placeholder '#{{{body}}}'"))
        })?
        .trim();
    let type_name = if argument.is_empty() {
        None
    } else if argument
        .split(['.', '<', '>', ',', '[', ']', ' '])
        .all(|part| part.is_empty() || is_identifier(part))
    {
        Some(argument.to_string())
    } else {
        return Err(RecastError::template_definition(
            code,
            format!("invalid placeholder type '{argument}'"),
        ));
    };
    Ok((name, PlaceholderKind::Tree { type_name }))
}

/// Placeholders of a snippet, left to right.
///
/// Each placeholder binds the next argument, except a named placeholder seen
/// before, which binds the same argument as its first occurrence.
pub fn parse_placeholders(code: &str) -> Result<Vec<Placeholder>> {
    let mut placeholders: Vec<Placeholder> = Vec::new();
    let mut next_argument = 0;
    let mut search_from = 0;

    while let Some(offset) = code[search_from..].find("#{") {
        let start = search_from + offset;
        let body_start = start + 2;
        let mut depth = 0usize;
        let mut close = None;
        for (i, c) in code[body_start..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                '}' if depth == 0 => {
                    close = Some(body_start + i);
                    break;
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(|| {
            RecastError::template_definition(code, format!("unterminated placeholder at offset {start}"))
        })?;
        let (name, mut kind) = parse_body(code, &code[body_start..close])?;
        let bare_name = name.is_some() && kind == PlaceholderKind::Text;

        let previous = name
            .as_ref()
            .and_then(|n| placeholders.iter().find(|p| p.name.as_ref() == Some(n)));
        let argument = match previous {
            Some(previous) if bare_name => {
                kind = previous.kind.clone();
                previous.argument
            }
            Some(previous) => {
                if previous.kind != kind && kind != (PlaceholderKind::Tree { type_name: None }) {
                    return Err(RecastError::template_definition(
                        code,
                        format!(
                            "placeholder '{}' is reused with a different kind",
                            name.as_deref().unwrap_or_default()
                        ),
                    ));
                }
                previous.argument
            }
            None => {
                next_argument += 1;
                next_argument - 1
            }
        };

        placeholders.push(Placeholder {
            name,
            kind,
            start,
            end: close + 1,
            argument,
        });
        search_from = close + 1;
    }
    Ok(placeholders)
}

/// Number of distinct arguments the placeholders bind
pub fn argument_count(placeholders: &[Placeholder]) -> usize {
    placeholders
        .iter()
        .map(|p| p.argument + 1)
        .max()
        .unwrap_or(0)
}
