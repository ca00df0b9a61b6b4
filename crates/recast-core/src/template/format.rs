use std::sync::Arc;

use crate::tree::{CompilationUnit, J};
use crate::visitor::collect;

/// Indentation unit of a compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentStyle {
    unit: String,
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::spaces(4)
    }
}

impl IndentStyle {
    pub fn spaces(width: usize) -> Self {
        IndentStyle {
            unit: " ".repeat(width.max(1)),
        }
    }

    pub fn tabs() -> Self {
        IndentStyle {
            unit: "\t".to_string(),
        }
    }

    /// Parse `"tab"`/`"tabs"` or a space count such as `"2"`
    pub fn from_setting(setting: &str) -> Option<Self> {
        match setting.trim() {
            "tab" | "tabs" | "\t" => Some(Self::tabs()),
            other => other.parse::<usize>().ok().filter(|w| *w > 0).map(Self::spaces),
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Smallest indentation step used by the unit, defaulting to four spaces
    pub fn detect(cu: &Arc<CompilationUnit>) -> Self {
        let indents = collect(&J::from(cu.clone()), |node, _| {
            let prefix = node.prefix();
            prefix
                .has_newline()
                .then(|| prefix.indent().to_string())
                .filter(|indent| !indent.is_empty())
        })
        .unwrap_or_default();

        if indents.iter().any(|i| i.starts_with('\t')) {
            return Self::tabs();
        }
        indents
            .iter()
            .map(String::len)
            .min()
            .map(Self::spaces)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Block, Identifier, Markers, RightPadded, Space, TreeId};
    use std::path::PathBuf;

    fn unit_with_indent(indent: &str) -> Arc<CompilationUnit> {
        let statement = J::from(Identifier::build("a", None)).with_prefix(Space::newline(indent));
        Arc::new(CompilationUnit {
            id: TreeId::fresh(),
            prefix: Space::EMPTY,
            markers: Markers::EMPTY,
            source_path: PathBuf::from("A.java"),
            package: None,
            imports: Vec::new(),
            types: vec![J::from(Block {
                id: TreeId::fresh(),
                prefix: Space::EMPTY,
                markers: Markers::EMPTY,
                statements: vec![RightPadded::build(statement)],
                end: Space::newline(""),
            })],
            eof: Space::EMPTY,
        })
    }

    #[test]
    fn test_detect() {
        assert_eq!(IndentStyle::detect(&unit_with_indent("  ")), IndentStyle::spaces(2));
        assert_eq!(IndentStyle::detect(&unit_with_indent("\t")), IndentStyle::tabs());
        assert_eq!(IndentStyle::detect(&unit_with_indent("")), IndentStyle::default());
    }

    #[test]
    fn test_from_setting() {
        assert_eq!(IndentStyle::from_setting("tab"), Some(IndentStyle::tabs()));
        assert_eq!(IndentStyle::from_setting("2").map(|s| s.unit().len()), Some(2));
        assert_eq!(IndentStyle::from_setting("0"), None);
    }
}
