//! Recursive-descent parser producing the lossless tree
//!
//! Each token's leading trivia is claimed exactly once: by the outermost node
//! that starts at that token. Inner nodes that start at the same token see an
//! empty prefix, so printing concatenates every byte of the input once.
//!
//! Constructs the tree does not model are kept verbatim as [`Unknown`]
//! nodes. In [`ParseMode::Lenient`] a statement or member that fails to parse
//! is recovered the same way; [`ParseMode::Strict`] reports it instead.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use recast_core::error::RecastError;
use recast_core::result::Result;
use recast_core::tree::*;

use crate::lexer::{Token, TokenKind, lex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Fail on anything outside the modeled subset
    Strict,
    /// Keep unparseable statements and members as verbatim source
    Lenient,
}

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null",
];

const MODIFIERS: &[&str] = &[
    "public", "protected", "private", "static", "final", "abstract", "native", "synchronized",
    "transient", "volatile", "strictfp", "default",
];

/// Statements kept verbatim
const UNMODELED_STATEMENTS: &[&str] = &[
    "for", "while", "do", "try", "switch", "throw", "break", "continue", "synchronized", "assert",
];

const COMPOUND_ASSIGNMENTS: &[&str] = &["+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<="];

/// Parse `source` into a compilation unit whose print is exactly `source`
pub fn parse_compilation_unit(source: &str, path: &Path, mode: ParseMode) -> Result<CompilationUnit> {
    let tokens = lex(source).map_err(|e| RecastError::parse_error(path, e.message, e.offset))?;
    let mut parser = Parser::new(&tokens, path, mode);
    parser.compilation_unit()
}

fn is_text(token: &Token, text: &str) -> bool {
    matches!(token.kind, TokenKind::Identifier | TokenKind::Punct) && token.text == text
}

fn is_identifier(token: &Token) -> bool {
    token.kind == TokenKind::Identifier && !KEYWORDS.contains(&token.text.as_str())
}

fn is_primitive(token: &Token) -> bool {
    token.kind == TokenKind::Identifier && Primitive::from_keyword(&token.text).is_some()
}

fn with_prefix(tree: J, prefix: Space) -> J {
    if prefix.is_empty() { tree } else { tree.with_prefix(prefix) }
}

fn identifier(prefix: Space, name: &str) -> Arc<Identifier> {
    Arc::new(Identifier {
        prefix,
        ..Identifier::build(name, None)
    })
}

/// A variable without initializer; the name's prefix moves to the variable
fn bare_variable(name: Arc<Identifier>) -> Arc<NamedVariable> {
    Arc::new(NamedVariable {
        id: TreeId::fresh(),
        prefix: name.prefix.clone(),
        markers: Markers::EMPTY,
        name: Arc::new(name.with_prefix(Space::EMPTY)),
        initializer: None,
        variable_type: None,
    })
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    claimed: Option<usize>,
}

/// Annotations and modifiers in front of a declaration
struct Head {
    prefix: Space,
    annotations: Vec<Arc<Annotation>>,
    modifiers: Vec<Modifier>,
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Token whose prefix has been handed to a node
    claimed: Option<usize>,
    path: &'a Path,
    mode: ParseMode,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], path: &'a Path, mode: ParseMode) -> Self {
        Self {
            tokens,
            pos: 0,
            claimed: None,
            path,
            mode,
        }
    }

    // ---- token access -------------------------------------------------

    fn token_at(&self, index: usize) -> &'a Token {
        &self.tokens[index.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &'a Token {
        self.token_at(self.pos)
    }

    fn nth(&self, n: usize) -> &'a Token {
        self.token_at(self.pos + n)
    }

    fn at(&self, text: &str) -> bool {
        is_text(self.peek(), text)
    }

    fn at_nth(&self, n: usize, text: &str) -> bool {
        is_text(self.nth(n), text)
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// Prefix of the current token, empty if an enclosing node already owns it
    fn prefix(&mut self) -> Space {
        if self.claimed == Some(self.pos) {
            return Space::EMPTY;
        }
        self.claimed = Some(self.pos);
        Space::format(self.peek().prefix.clone())
    }

    fn bump(&mut self) -> (Space, &'a str) {
        let prefix = self.prefix();
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        (prefix, token.text.as_str())
    }

    fn expect(&mut self, text: &str) -> Result<Space> {
        if self.at(text) {
            Ok(self.bump().0)
        } else {
            Err(self.unexpected(&format!("`{text}`")))
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            claimed: self.claimed,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.claimed = checkpoint.claimed;
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> RecastError {
        RecastError::parse_error(self.path, message, offset)
    }

    fn unexpected(&self, expected: &str) -> RecastError {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("`{}`", token.text)
        };
        self.error_at(token.span.start, format!("expected {expected} but found {found}"))
    }

    fn unsupported(&self, what: &str) -> RecastError {
        self.error_at(self.peek().span.start, format!("{what} are not supported"))
    }

    /// Source of tokens `start..end` without the first token's prefix
    fn source_between(&self, start: usize, end: usize) -> String {
        let mut out = String::new();
        for (i, token) in self.tokens[start..end].iter().enumerate() {
            if i > 0 {
                out.push_str(&token.prefix);
            }
            out.push_str(&token.text);
        }
        out
    }

    fn unknown(&self, prefix: Space, start: usize) -> J {
        J::from(Unknown {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            source: self.source_between(start, self.pos),
        })
    }

    fn recover(&mut self, checkpoint: Checkpoint, err: RecastError) -> Result<J> {
        if self.mode == ParseMode::Strict {
            return Err(err);
        }
        debug!(path = %self.path.display(), error = %err, "keeping unparsed source verbatim");
        self.restore(checkpoint);
        self.raw_statement()
    }

    /// Consume one statement's worth of tokens as verbatim source
    fn raw_statement(&mut self) -> Result<J> {
        let prefix = self.prefix();
        let start = self.pos;
        let first = self.peek();
        let mut depth = 0usize;
        let mut in_expression = false;
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof {
                return Err(self.unexpected("the end of a statement"));
            }
            let punct = token.kind == TokenKind::Punct;
            if punct && depth == 0 && matches!(token.text.as_str(), "}" | ")" | "]") {
                if self.pos == start {
                    return Err(self.unexpected("a statement"));
                }
                break;
            }
            self.pos += 1;
            if depth == 0 && (is_text(token, "=") || is_text(token, "->") || is_text(token, "return")) {
                in_expression = true;
            }
            if !punct {
                continue;
            }
            match token.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    depth -= 1;
                    if depth == 0 && token.text == "}" && !in_expression && !self.continues_statement(first) {
                        break;
                    }
                }
                ";" if depth == 0 => break,
                _ => {}
            }
        }
        Ok(self.unknown(prefix, start))
    }

    fn continues_statement(&self, first: &Token) -> bool {
        self.at("else")
            || self.at("catch")
            || self.at("finally")
            || (is_text(first, "do") && self.at("while"))
    }

    /// Enum constants up to the `;` that ends them or the closing brace
    fn raw_enum_constants(&mut self) -> Result<J> {
        let prefix = self.prefix();
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof {
                return Err(self.unexpected("`}`"));
            }
            if token.kind == TokenKind::Punct {
                match token.text.as_str() {
                    "}" | ")" | "]" if depth == 0 => break,
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth -= 1,
                    ";" if depth == 0 => {
                        self.pos += 1;
                        break;
                    }
                    _ => {}
                }
            }
            self.pos += 1;
        }
        Ok(self.unknown(prefix, start))
    }

    // ---- lookahead ----------------------------------------------------

    /// Index just past a type starting at `index`, if one starts there
    fn scan_type(&self, mut index: usize) -> Option<usize> {
        let token = self.token_at(index);
        if is_primitive(token) {
            index += 1;
        } else if is_identifier(token) {
            index += 1;
            while is_text(self.token_at(index), ".") && is_identifier(self.token_at(index + 1)) {
                index += 2;
            }
            if is_text(self.token_at(index), "<") {
                index = self.scan_type_arguments(index)?;
            }
        } else {
            return None;
        }
        while is_text(self.token_at(index), "[") && is_text(self.token_at(index + 1), "]") {
            index += 2;
        }
        Some(index)
    }

    fn scan_type_arguments(&self, mut index: usize) -> Option<usize> {
        let mut depth = 0usize;
        loop {
            let token = self.token_at(index);
            match token.text.as_str() {
                "<" if token.kind == TokenKind::Punct => depth += 1,
                ">" if token.kind == TokenKind::Punct => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index + 1);
                    }
                }
                "," | "." | "?" | "[" | "]" | "&" if token.kind == TokenKind::Punct => {}
                "extends" | "super" if token.kind == TokenKind::Identifier => {}
                _ if is_identifier(token) || is_primitive(token) => {}
                _ => return None,
            }
            index += 1;
        }
    }

    fn at_local_declaration(&self) -> bool {
        let mut index = self.pos;
        while ["final", "abstract", "static"].iter().any(|m| is_text(self.token_at(index), m)) {
            index += 1;
        }
        let token = self.token_at(index);
        if is_text(token, "@") || ["class", "interface", "enum"].iter().any(|k| is_text(token, k)) {
            return true;
        }
        match self.scan_type(index) {
            Some(end) => {
                is_identifier(self.token_at(end))
                    && ["=", ";", ","].iter().any(|t| is_text(self.token_at(end + 1), t))
            }
            None => false,
        }
    }

    fn at_class_keyword(&self) -> bool {
        self.at("class") || self.at("interface") || self.at("enum") || (self.at("@") && self.at_nth(1, "interface"))
    }

    fn at_modifier(&self) -> bool {
        let token = self.peek();
        token.kind == TokenKind::Identifier
            && MODIFIERS.contains(&token.text.as_str())
            && !(token.text == "default" && self.at_nth(1, ":"))
            && !(token.text == "synchronized" && self.at_nth(1, "("))
    }

    /// At `(` that opens the parameters of a lambda
    fn at_lambda(&self) -> bool {
        let mut depth = 0usize;
        let mut index = self.pos;
        loop {
            let token = self.token_at(index);
            match token.kind {
                TokenKind::Eof => return false,
                TokenKind::Punct if token.text == "(" => depth += 1,
                TokenKind::Punct if token.text == ")" => {
                    depth -= 1;
                    if depth == 0 {
                        return is_text(self.token_at(index + 1), "->");
                    }
                }
                _ => {}
            }
            index += 1;
        }
    }

    /// At `(` that opens a cast such as `(String) value`
    fn at_cast(&self) -> bool {
        let Some(end) = self.scan_type(self.pos + 1) else {
            return false;
        };
        if !is_text(self.token_at(end), ")") {
            return false;
        }
        let next = self.token_at(end + 1);
        next.kind.is_literal()
            || is_identifier(next)
            || ["(", "!", "~", "this", "new", "super", "true", "false", "null"]
                .iter()
                .any(|t| is_text(next, t))
    }

    // ---- names and types ----------------------------------------------

    fn ident(&mut self) -> Result<Arc<Identifier>> {
        if !is_identifier(self.peek()) {
            return Err(self.unexpected("an identifier"));
        }
        let (prefix, name) = self.bump();
        Ok(identifier(prefix, name))
    }

    /// Name after a `.`: an identifier, or `class`, `this` and `super`
    fn member_name(&mut self) -> Result<Arc<Identifier>> {
        let token = self.peek();
        if is_identifier(token) || ["class", "this", "super"].iter().any(|k| is_text(token, k)) {
            let (prefix, name) = self.bump();
            return Ok(identifier(prefix, name));
        }
        if is_text(token, "new") {
            return Err(self.unsupported("qualified instance creations"));
        }
        Err(self.unexpected("a member name"))
    }

    /// Dotted name, the last segment possibly `*`
    fn qualified_name(&mut self) -> Result<J> {
        let prefix = self.prefix();
        let mut name = J::from(self.ident()?);
        while self.at(".") && (is_identifier(self.nth(1)) || is_text(self.nth(1), "*")) {
            let (dot, _) = self.bump();
            let (space, segment) = self.bump();
            name = J::from(FieldAccess {
                id: TreeId::fresh(),
                prefix: Space::EMPTY,
                markers: Markers::EMPTY,
                target: name,
                name: LeftPadded::new(dot, identifier(space, segment)),
                ty: None,
            });
        }
        Ok(with_prefix(name, prefix))
    }

    fn type_expr(&mut self) -> Result<J> {
        let prefix = self.prefix();
        let mut ty = if is_primitive(self.peek()) {
            let (space, keyword) = self.bump();
            J::from(identifier(space, keyword))
        } else {
            self.qualified_name()?
        };
        if self.at("<") {
            let type_parameters = self.container("<", ">", Self::type_argument)?;
            ty = J::from(ParameterizedType {
                id: TreeId::fresh(),
                prefix: Space::EMPTY,
                markers: Markers::EMPTY,
                clazz: ty,
                type_parameters,
                ty: None,
            });
            if self.at(".") {
                return Err(self.unsupported("member types of parameterized types"));
            }
        }
        while self.at("[") && self.at_nth(1, "]") {
            let before = self.bump().0;
            let inside = self.prefix();
            self.bump();
            ty = J::from(ArrayType {
                id: TreeId::fresh(),
                prefix: Space::EMPTY,
                markers: Markers::EMPTY,
                element_type: ty,
                dimension: LeftPadded::new(before, inside),
                ty: None,
            });
        }
        Ok(with_prefix(ty, prefix))
    }

    /// Type argument; wildcards are kept verbatim
    fn type_argument(&mut self) -> Result<J> {
        if !self.at("?") {
            return self.type_expr();
        }
        let prefix = self.prefix();
        let start = self.pos;
        self.bump();
        if self.at("extends") || self.at("super") {
            self.bump();
            self.type_expr()?;
        }
        Ok(self.unknown(prefix, start))
    }

    /// Declared type parameter; bounded ones are kept verbatim
    fn type_parameter(&mut self) -> Result<J> {
        if is_identifier(self.peek()) && (self.at_nth(1, ",") || self.at_nth(1, ">")) {
            return Ok(J::from(self.ident()?));
        }
        let prefix = self.prefix();
        let start = self.pos;
        let mut depth = 0usize;
        while !(depth == 0 && (self.at(",") || self.at(">"))) {
            if self.at_eof() {
                return Err(self.unexpected("`>`"));
            }
            if self.at("<") {
                depth += 1;
            } else if self.at(">") {
                depth -= 1;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.unexpected("a type parameter"));
        }
        Ok(self.unknown(prefix, start))
    }

    /// `open element, element close`; an empty list holds one [`Empty`]
    fn container(
        &mut self,
        open: &str,
        close: &str,
        mut element: impl FnMut(&mut Self) -> Result<J>,
    ) -> Result<Container<J>> {
        let before = self.expect(open)?;
        let mut elements = Vec::new();
        if self.at(close) {
            let empty = Empty::build(self.prefix());
            self.bump();
            elements.push(RightPadded::build(J::from(empty)));
            return Ok(Container::new(before, elements));
        }
        loop {
            let item = element(self)?;
            if self.at(",") {
                let after = self.bump().0;
                elements.push(RightPadded::new(item, after));
            } else {
                let after = self.expect(close)?;
                elements.push(RightPadded::new(item, after));
                return Ok(Container::new(before, elements));
            }
        }
    }

    /// `implements`, `throws` or interface `extends` followed by types
    fn type_list(&mut self) -> Result<Container<J>> {
        let before = self.bump().0;
        let mut elements = Vec::new();
        loop {
            let item = self.type_expr()?;
            if self.at(",") {
                let after = self.bump().0;
                elements.push(RightPadded::new(item, after));
            } else {
                elements.push(RightPadded::build(item));
                return Ok(Container::new(before, elements));
            }
        }
    }

    // ---- declarations -------------------------------------------------

    fn compilation_unit(&mut self) -> Result<CompilationUnit> {
        let prefix = self.prefix();
        let package = if self.at("package") {
            let package_prefix = self.prefix();
            self.bump();
            let name = self.qualified_name()?;
            let after = self.expect(";")?;
            Some(RightPadded::new(
                Arc::new(Package {
                    id: TreeId::fresh(),
                    prefix: package_prefix,
                    markers: Markers::EMPTY,
                    name,
                }),
                after,
            ))
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.at("import") {
            imports.push(self.import()?);
        }

        let mut types = Vec::new();
        while !self.at_eof() {
            types.push(self.type_declaration()?);
        }

        Ok(CompilationUnit {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            source_path: self.path.to_path_buf(),
            package,
            imports,
            types,
            eof: self.prefix(),
        })
    }

    fn import(&mut self) -> Result<RightPadded<Arc<Import>>> {
        let prefix = self.prefix();
        self.bump();
        let statik = if self.at("static") { Some(self.bump().0) } else { None };
        let start = self.peek().span.start;
        let name = self.qualified_name()?;
        let qualid = Arc::<FieldAccess>::try_from(name)
            .map_err(|_| self.error_at(start, "an import must name a member of a package"))?;
        let after = self.expect(";")?;
        Ok(RightPadded::new(
            Arc::new(Import {
                id: TreeId::fresh(),
                prefix,
                markers: Markers::EMPTY,
                statik,
                qualid,
            }),
            after,
        ))
    }

    fn type_declaration(&mut self) -> Result<J> {
        let checkpoint = self.checkpoint();
        let declaration = self.head().and_then(|head| {
            if self.at_class_keyword() {
                self.class_declaration(head)
            } else {
                Err(self.unexpected("a class, interface or enum declaration"))
            }
        });
        match declaration {
            Ok(class) => Ok(J::from(class)),
            Err(err) => self.recover(checkpoint, err),
        }
    }

    fn head(&mut self) -> Result<Head> {
        let prefix = self.prefix();
        let mut annotations = Vec::new();
        let mut modifiers = Vec::new();
        loop {
            if self.at("@") && !self.at_nth(1, "interface") {
                if !modifiers.is_empty() {
                    return Err(self.unsupported("annotations after modifiers"));
                }
                annotations.push(self.annotation()?);
            } else if self.at_modifier() {
                let (prefix, keyword) = self.bump();
                modifiers.push(Modifier {
                    id: TreeId::fresh(),
                    prefix,
                    keyword: keyword.to_string(),
                });
            } else {
                break;
            }
        }
        Ok(Head {
            prefix,
            annotations,
            modifiers,
        })
    }

    fn annotation(&mut self) -> Result<Arc<Annotation>> {
        let prefix = self.prefix();
        self.expect("@")?;
        let annotation_type = self.qualified_name()?;
        let arguments = if self.at("(") {
            Some(self.container("(", ")", Self::expression)?)
        } else {
            None
        };
        Ok(Arc::new(Annotation {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            annotation_type,
            arguments,
        }))
    }

    fn class_declaration(&mut self, head: Head) -> Result<Arc<ClassDeclaration>> {
        let kind = match self.peek().text.as_str() {
            "class" => ClassKind::Class,
            "interface" => ClassKind::Interface,
            "enum" => ClassKind::Enum,
            _ => return Err(self.unsupported("annotation type declarations")),
        };
        let keyword = ClassKeyword {
            prefix: self.bump().0,
            kind,
        };
        let name = self.ident()?;
        let type_parameters = if self.at("<") {
            Some(self.container("<", ">", Self::type_parameter)?)
        } else {
            None
        };
        let extends = if kind != ClassKind::Interface && self.at("extends") {
            let before = self.bump().0;
            Some(LeftPadded::new(before, self.type_expr()?))
        } else {
            None
        };
        let list_keyword = if kind == ClassKind::Interface { "extends" } else { "implements" };
        let implements = if self.at(list_keyword) { Some(self.type_list()?) } else { None };
        if self.at("permits") {
            return Err(self.unsupported("sealed hierarchies"));
        }
        let body = self.class_body(kind, &name.simple_name)?;

        Ok(Arc::new(ClassDeclaration {
            id: TreeId::fresh(),
            prefix: head.prefix,
            markers: Markers::EMPTY,
            leading_annotations: head.annotations,
            modifiers: head.modifiers,
            keyword,
            name,
            type_parameters,
            extends,
            implements,
            body,
            class_type: None,
        }))
    }

    fn class_body(&mut self, kind: ClassKind, class_name: &str) -> Result<Arc<Block>> {
        let prefix = self.prefix();
        self.expect("{")?;
        let mut statements = Vec::new();
        if kind == ClassKind::Enum && !self.at("}") {
            statements.push(RightPadded::build(self.raw_enum_constants()?));
        }
        while !self.at("}") {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            statements.push(self.member(class_name)?);
        }
        let end = self.expect("}")?;
        Ok(Arc::new(Block {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            statements,
            end,
        }))
    }

    fn member(&mut self, class_name: &str) -> Result<RightPadded<J>> {
        let checkpoint = self.checkpoint();
        match self.member_declaration(class_name) {
            Ok(member) => Ok(member),
            Err(err) => self.recover(checkpoint, err).map(RightPadded::build),
        }
    }

    fn member_declaration(&mut self, class_name: &str) -> Result<RightPadded<J>> {
        if self.at(";") {
            return self.empty_statement();
        }
        if self.at("{") {
            return Ok(RightPadded::build(J::from(self.block()?)));
        }
        if self.at("static") && self.at_nth(1, "{") {
            return Err(self.unsupported("static initializers"));
        }

        let head = self.head()?;
        if self.at_class_keyword() {
            return Ok(RightPadded::build(J::from(self.class_declaration(head)?)));
        }
        let type_parameters = if self.at("<") {
            Some(self.container("<", ">", Self::type_parameter)?)
        } else {
            None
        };
        if is_text(self.peek(), class_name) && self.at_nth(1, "(") {
            let name = self.ident()?;
            return self.method_declaration(head, type_parameters, None, name);
        }

        let type_expression = self.type_expr()?;
        let name = self.ident()?;
        if self.at("(") {
            return self.method_declaration(head, type_parameters, Some(type_expression), name);
        }
        if type_parameters.is_some() {
            return Err(self.unexpected("`(`"));
        }
        let variables = self.declarators(name)?;
        let after = self.expect(";")?;
        Ok(RightPadded::new(
            J::from(VariableDeclarations {
                id: TreeId::fresh(),
                prefix: head.prefix,
                markers: Markers::EMPTY,
                leading_annotations: head.annotations,
                modifiers: head.modifiers,
                type_expression: Some(type_expression),
                variables,
            }),
            after,
        ))
    }

    fn method_declaration(
        &mut self,
        head: Head,
        type_parameters: Option<Container<J>>,
        return_type: Option<J>,
        name: Arc<Identifier>,
    ) -> Result<RightPadded<J>> {
        let parameters = self.container("(", ")", Self::parameter)?;
        let throws = if self.at("throws") { Some(self.type_list()?) } else { None };
        if self.at("default") {
            return Err(self.unsupported("annotation member defaults"));
        }
        let (body, after) = if self.at("{") {
            (Some(self.block()?), Space::EMPTY)
        } else {
            (None, self.expect(";")?)
        };
        Ok(RightPadded::new(
            J::from(MethodDeclaration {
                id: TreeId::fresh(),
                prefix: head.prefix,
                markers: Markers::EMPTY,
                leading_annotations: head.annotations,
                modifiers: head.modifiers,
                type_parameters,
                return_type,
                name,
                parameters,
                throws,
                body,
                method_type: None,
            }),
            after,
        ))
    }

    fn parameter(&mut self) -> Result<J> {
        let head = self.head()?;
        let type_expression = self.type_expr()?;
        if self.at("...") {
            return Err(self.unsupported("variable arity parameters"));
        }
        let name = self.ident()?;
        Ok(J::from(VariableDeclarations {
            id: TreeId::fresh(),
            prefix: head.prefix,
            markers: Markers::EMPTY,
            leading_annotations: head.annotations,
            modifiers: head.modifiers,
            type_expression: Some(type_expression),
            variables: vec![RightPadded::build(bare_variable(name))],
        }))
    }

    /// Comma-separated variables after the declared type, `first` already consumed
    fn declarators(&mut self, first: Arc<Identifier>) -> Result<Vec<RightPadded<Arc<NamedVariable>>>> {
        let mut variables = Vec::new();
        let mut name = first;
        loop {
            if self.at("[") {
                return Err(self.unsupported("array dimensions after a variable name"));
            }
            let mut variable = bare_variable(name);
            if self.at("=") {
                let before = self.bump().0;
                if self.at("{") {
                    return Err(self.unsupported("array initializers"));
                }
                let value = self.expression()?;
                variable = Arc::new(variable.with_initializer(Some(LeftPadded::new(before, value))));
            }
            if self.at(",") {
                let after = self.bump().0;
                variables.push(RightPadded::new(variable, after));
                name = self.ident()?;
            } else {
                variables.push(RightPadded::build(variable));
                return Ok(variables);
            }
        }
    }

    // ---- statements ---------------------------------------------------

    fn block(&mut self) -> Result<Arc<Block>> {
        let prefix = self.prefix();
        self.expect("{")?;
        let mut statements = Vec::new();
        while !self.at("}") {
            if self.at_eof() {
                return Err(self.unexpected("`}`"));
            }
            statements.push(self.block_statement()?);
        }
        let end = self.expect("}")?;
        Ok(Arc::new(Block {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            statements,
            end,
        }))
    }

    fn block_statement(&mut self) -> Result<RightPadded<J>> {
        let checkpoint = self.checkpoint();
        match self.statement() {
            Ok(statement) => Ok(statement),
            Err(err) => self.recover(checkpoint, err).map(RightPadded::build),
        }
    }

    fn empty_statement(&mut self) -> Result<RightPadded<J>> {
        let prefix = self.prefix();
        self.expect(";")?;
        Ok(RightPadded::build(J::from(Empty::build(prefix))))
    }

    fn statement(&mut self) -> Result<RightPadded<J>> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier && UNMODELED_STATEMENTS.contains(&token.text.as_str()) {
            return self.raw_statement().map(RightPadded::build);
        }
        if self.at("{") {
            return Ok(RightPadded::build(J::from(self.block()?)));
        }
        if self.at(";") {
            return self.empty_statement();
        }
        if self.at("return") {
            let prefix = self.prefix();
            self.bump();
            let expression = if self.at(";") { None } else { Some(self.expression()?) };
            let after = self.expect(";")?;
            return Ok(RightPadded::new(
                J::from(Return {
                    id: TreeId::fresh(),
                    prefix,
                    markers: Markers::EMPTY,
                    expression,
                }),
                after,
            ));
        }
        if self.at("if") {
            return self.if_statement();
        }

        if self.at_local_declaration() {
            let head = self.head()?;
            if self.at_class_keyword() {
                return Ok(RightPadded::build(J::from(self.class_declaration(head)?)));
            }
            let type_expression = self.type_expr()?;
            let name = self.ident()?;
            let variables = self.declarators(name)?;
            let after = self.expect(";")?;
            return Ok(RightPadded::new(
                J::from(VariableDeclarations {
                    id: TreeId::fresh(),
                    prefix: head.prefix,
                    markers: Markers::EMPTY,
                    leading_annotations: head.annotations,
                    modifiers: head.modifiers,
                    type_expression: Some(type_expression),
                    variables,
                }),
                after,
            ));
        }

        let start = self.peek().span.start;
        let expression = self.expression()?;
        if !expression.is_statement() {
            return Err(self.error_at(start, format!("{} is not a statement", expression.kind())));
        }
        let after = self.expect(";")?;
        Ok(RightPadded::new(expression, after))
    }

    fn if_statement(&mut self) -> Result<RightPadded<J>> {
        let prefix = self.prefix();
        self.bump();
        let condition = self.parentheses()?;
        let then_part = self.statement()?;
        let else_part = if self.at("else") {
            let else_prefix = self.prefix();
            self.bump();
            let body = self.statement()?;
            Some(Arc::new(Else {
                id: TreeId::fresh(),
                prefix: else_prefix,
                markers: Markers::EMPTY,
                body,
            }))
        } else {
            None
        };
        Ok(RightPadded::build(J::from(If {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            condition,
            then_part,
            else_part,
        })))
    }

    // ---- expressions --------------------------------------------------

    fn expression(&mut self) -> Result<J> {
        let prefix = self.prefix();
        let target = self.binary(0)?;
        if self.at("?") {
            return Err(self.unsupported("conditional expressions"));
        }
        if COMPOUND_ASSIGNMENTS.iter().any(|op| self.at(op)) {
            return Err(self.unsupported("compound assignments"));
        }
        let expression = if self.at("=") {
            let before = self.bump().0;
            let value = self.expression()?;
            J::from(Assignment {
                id: TreeId::fresh(),
                prefix: Space::EMPTY,
                markers: Markers::EMPTY,
                variable: target,
                assignment: LeftPadded::new(before, value),
                ty: None,
            })
        } else {
            target
        };
        Ok(with_prefix(expression, prefix))
    }

    fn binary(&mut self, min_precedence: u8) -> Result<J> {
        let prefix = self.prefix();
        let mut left = self.unary()?;
        loop {
            let token = self.peek();
            if is_text(token, "instanceof") {
                return Err(self.unsupported("instanceof expressions"));
            }
            if token.kind != TokenKind::Punct {
                break;
            }
            let Some(operator) = BinaryOperator::from_symbol(&token.text) else {
                break;
            };
            if operator.precedence() < min_precedence {
                break;
            }
            let before = self.bump().0;
            let right = self.binary(operator.precedence() + 1)?;
            left = J::from(Binary {
                id: TreeId::fresh(),
                prefix: Space::EMPTY,
                markers: Markers::EMPTY,
                left,
                operator: LeftPadded::new(before, operator),
                right,
                ty: None,
            });
        }
        Ok(with_prefix(left, prefix))
    }

    fn unary(&mut self) -> Result<J> {
        let token = self.peek();
        if token.kind == TokenKind::Punct {
            match token.text.as_str() {
                "-" if is_numeric(self.nth(1)) && self.nth(1).prefix.is_empty() => return self.literal(true),
                "!" | "-" | "+" | "~" => {
                    let prefix = self.prefix();
                    let start = self.pos;
                    self.bump();
                    self.unary()?;
                    return Ok(self.unknown(prefix, start));
                }
                "++" | "--" => return Err(self.unsupported("increment and decrement operators")),
                "(" if self.at_cast() => {
                    let prefix = self.prefix();
                    let start = self.pos;
                    self.bump();
                    self.type_expr()?;
                    self.expect(")")?;
                    self.unary()?;
                    return Ok(self.unknown(prefix, start));
                }
                _ => {}
            }
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<J> {
        let prefix = self.prefix();
        let mut expression = self.primary()?;
        loop {
            if self.at(".") {
                let dot = self.bump().0;
                if self.at("<") {
                    return Err(self.unsupported("explicit type arguments"));
                }
                let name = self.member_name()?;
                expression = if self.at("(") {
                    let arguments = self.container("(", ")", Self::expression)?;
                    J::from(MethodInvocation {
                        id: TreeId::fresh(),
                        prefix: Space::EMPTY,
                        markers: Markers::EMPTY,
                        select: Some(RightPadded::new(expression, dot)),
                        name,
                        arguments,
                        method_type: None,
                    })
                } else {
                    J::from(FieldAccess {
                        id: TreeId::fresh(),
                        prefix: Space::EMPTY,
                        markers: Markers::EMPTY,
                        target: expression,
                        name: LeftPadded::new(dot, name),
                        ty: None,
                    })
                };
            } else if self.at("[") {
                return Err(self.unsupported("array access expressions"));
            } else if self.at("::") {
                return Err(self.unsupported("method references"));
            } else if self.at("++") || self.at("--") {
                return Err(self.unsupported("increment and decrement operators"));
            } else {
                break;
            }
        }
        Ok(with_prefix(expression, prefix))
    }

    fn primary(&mut self) -> Result<J> {
        let token = self.peek();
        if token.kind.is_literal() || ["true", "false", "null"].iter().any(|k| is_text(token, k)) {
            return self.literal(false);
        }
        if self.at("new") {
            return self.new_class();
        }
        if self.at("(") {
            return if self.at_lambda() {
                self.lambda()
            } else {
                Ok(J::from(self.parentheses()?))
            };
        }
        if is_identifier(token) && self.at_nth(1, "->") {
            return self.lambda();
        }
        if is_identifier(token) || self.at("this") || self.at("super") {
            let (prefix, text) = self.bump();
            let name = identifier(prefix, text);
            if !self.at("(") {
                return Ok(J::from(name));
            }
            let arguments = self.container("(", ")", Self::expression)?;
            return Ok(J::from(MethodInvocation {
                id: TreeId::fresh(),
                prefix: Space::EMPTY,
                markers: Markers::EMPTY,
                select: None,
                name,
                arguments,
                method_type: None,
            }));
        }
        if self.at("switch") {
            return Err(self.unsupported("switch expressions"));
        }
        Err(self.unexpected("an expression"))
    }

    fn parentheses(&mut self) -> Result<Arc<Parentheses>> {
        let prefix = self.prefix();
        self.expect("(")?;
        let tree = self.expression()?;
        let after = self.expect(")")?;
        Ok(Arc::new(Parentheses {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            tree: RightPadded::new(tree, after),
        }))
    }

    fn literal(&mut self, negative: bool) -> Result<J> {
        let prefix = self.prefix();
        let mut source = String::new();
        if negative {
            self.bump();
            source.push('-');
        }
        let token = self.peek();
        let offset = token.span.start;
        self.bump();
        source.push_str(&token.text);

        let malformed = || RecastError::parse_error(self.path, format!("malformed literal `{}`", token.text), offset);
        let (value, ty) = match token.kind {
            TokenKind::IntLiteral | TokenKind::LongLiteral => {
                let value = parse_integer(&token.text).ok_or_else(malformed)?;
                let ty = if token.kind == TokenKind::IntLiteral { Primitive::Int } else { Primitive::Long };
                (LiteralValue::Int(if negative { value.wrapping_neg() } else { value }), ty)
            }
            TokenKind::FloatLiteral | TokenKind::DoubleLiteral => {
                let value = parse_floating(&token.text).ok_or_else(malformed)?;
                let ty = if token.kind == TokenKind::FloatLiteral { Primitive::Float } else { Primitive::Double };
                (LiteralValue::Double(if negative { -value } else { value }), ty)
            }
            TokenKind::CharLiteral => {
                let inner = &token.text[1..token.text.len() - 1];
                let value = unescape(inner).chars().next().ok_or_else(malformed)?;
                (LiteralValue::Char(value), Primitive::Char)
            }
            TokenKind::StringLiteral => {
                let inner = &token.text[1..token.text.len() - 1];
                (LiteralValue::String(unescape(inner)), Primitive::String)
            }
            TokenKind::TextBlock => (LiteralValue::String(text_block_value(&token.text)), Primitive::String),
            _ => match token.text.as_str() {
                "true" => (LiteralValue::Bool(true), Primitive::Boolean),
                "false" => (LiteralValue::Bool(false), Primitive::Boolean),
                _ => (LiteralValue::Null, Primitive::Null),
            },
        };

        Ok(J::from(Literal {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            value,
            value_source: source,
            ty,
        }))
    }

    fn new_class(&mut self) -> Result<J> {
        let prefix = self.prefix();
        self.bump();
        let clazz = self.type_expr()?;
        if !self.at("(") {
            return Err(self.unsupported("array creation expressions"));
        }
        let arguments = self.container("(", ")", Self::expression)?;
        let body = if self.at("{") {
            Some(self.class_body(ClassKind::Class, "")?)
        } else {
            None
        };
        Ok(J::from(NewClass {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            clazz,
            arguments,
            body,
            constructor_type: None,
            ty: None,
        }))
    }

    fn lambda(&mut self) -> Result<J> {
        let prefix = self.prefix();
        let parameters = if self.at("(") {
            self.bump();
            let mut parameters = Vec::new();
            if self.at(")") {
                let empty = Empty::build(self.prefix());
                self.bump();
                parameters.push(RightPadded::build(J::from(empty)));
            } else {
                loop {
                    let parameter = self.lambda_parameter()?;
                    if self.at(",") {
                        let after = self.bump().0;
                        parameters.push(RightPadded::new(parameter, after));
                    } else {
                        let after = self.expect(")")?;
                        parameters.push(RightPadded::new(parameter, after));
                        break;
                    }
                }
            }
            LambdaParameters {
                prefix: Space::EMPTY,
                parenthesized: true,
                parameters,
            }
        } else {
            LambdaParameters {
                prefix: Space::EMPTY,
                parenthesized: false,
                parameters: vec![RightPadded::build(self.lambda_parameter()?)],
            }
        };
        let arrow = self.expect("->")?;
        let body = if self.at("{") {
            J::from(self.block()?)
        } else {
            self.expression()?
        };
        Ok(J::from(Lambda {
            id: TreeId::fresh(),
            prefix,
            markers: Markers::EMPTY,
            parameters,
            arrow,
            body,
            ty: None,
        }))
    }

    fn lambda_parameter(&mut self) -> Result<J> {
        let untyped = is_identifier(self.peek()) && [",", ")", "->"].iter().any(|t| self.at_nth(1, t));
        if !untyped {
            return self.parameter();
        }
        let name = self.ident()?;
        Ok(J::from(VariableDeclarations {
            id: TreeId::fresh(),
            prefix: name.prefix.clone(),
            markers: Markers::EMPTY,
            leading_annotations: Vec::new(),
            modifiers: Vec::new(),
            type_expression: None,
            variables: vec![RightPadded::build(bare_variable(Arc::new(name.with_prefix(Space::EMPTY))))],
        }))
    }
}

fn is_numeric(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::IntLiteral | TokenKind::LongLiteral | TokenKind::FloatLiteral | TokenKind::DoubleLiteral
    )
}

fn parse_integer(text: &str) -> Option<i64> {
    let digits: String = text
        .trim_end_matches(['l', 'L'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<u64>().ok()?
    };
    Some(value as i64)
}

fn parse_floating(text: &str) -> Option<f64> {
    let digits: String = text
        .trim_end_matches(['f', 'F', 'd', 'D'])
        .chars()
        .filter(|c| *c != '_')
        .collect();
    digits.parse().ok()
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('s') => out.push(' '),
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => out.push_str(&hex),
                }
            }
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) if value * 8 + next <= 0o377 => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Content of a `"""` block with incidental indentation removed
fn text_block_value(text: &str) -> String {
    let body = text
        .strip_prefix("\"\"\"")
        .and_then(|t| t.strip_suffix("\"\"\""))
        .unwrap_or(text);
    let body = body.split_once('\n').map_or("", |(_, rest)| rest);
    let lines: Vec<&str> = body.split('\n').collect();
    let indent = lines
        .iter()
        .enumerate()
        .filter(|(i, line)| !line.trim().is_empty() || *i == lines.len() - 1)
        .map(|(_, line)| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let stripped: Vec<&str> = lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or("").trim_end())
        .collect();
    unescape(&stripped.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> CompilationUnit {
        parse_compilation_unit(source, Path::new("A.java"), ParseMode::Strict).unwrap()
    }

    fn first_statement(cu: &CompilationUnit) -> J {
        let class = cu.classes().next().unwrap();
        let J::MethodDeclaration(method) = class.body.statements().next().unwrap() else {
            panic!("expected a method");
        };
        method.body.as_ref().unwrap().statements().next().unwrap().clone()
    }

    #[test]
    fn test_round_trip_preserves_every_byte() {
        let source = "package a.b;\n\nimport java.util.List;\nimport static java.lang.Math.max;\n\n\
                      /** doc */\n@Deprecated\npublic class A<T> extends B implements C, D<T> {\n    \
                      private final List<String> names = new java.util.ArrayList<>();\n\n    \
                      A(int x) { super(x); }\n\n    \
                      public <R> R apply(java.util.function.Function<T, R> f, T t) throws E {\n        \
                      // call\n        return f . apply ( t ) ;\n    }\n\n    \
                      void lambdas() {\n        Runnable r = () -> {};\n        \
                      names.forEach(n -> System.out.println(n + \"!\"));\n        \
                      if (names.size() > 1 && x != -1) { x = 2; } else x = 3;\n    }\n}\n";
        assert_eq!(parse(source).print(), source);
    }

    #[test]
    fn test_prefix_belongs_to_outermost_node() {
        let cu = parse("class A {\n    void m() {\n        a.b();\n    }\n}");
        let J::MethodInvocation(mi) = first_statement(&cu) else {
            panic!("expected an invocation");
        };
        assert_eq!(mi.prefix.as_str(), "\n        ");
        let select = mi.select.as_ref().unwrap();
        assert_eq!(select.element.prefix(), &Space::EMPTY);
        assert_eq!(mi.name.simple_name, "b");
    }

    #[test]
    fn test_empty_argument_list_holds_one_empty() {
        let cu = parse("class A { void m() { f( ); } }");
        let J::MethodInvocation(mi) = first_statement(&cu) else {
            panic!("expected an invocation");
        };
        assert_eq!(mi.arguments.elements.len(), 1);
        assert!(matches!(&mi.arguments.elements[0].element, J::Empty(e) if e.prefix.as_str() == " "));
        assert_eq!(mi.arguments().count(), 0);
    }

    #[test]
    fn test_binary_precedence() {
        let cu = parse("class A { void m() { x = 1 + 2 * 3 == 7; } }");
        let J::Assignment(assignment) = first_statement(&cu) else {
            panic!("expected an assignment");
        };
        let J::Binary(eq) = &assignment.assignment.element else {
            panic!("expected a comparison");
        };
        assert_eq!(eq.operator.element, BinaryOperator::Equal);
        let J::Binary(add) = &eq.left else {
            panic!("expected an addition");
        };
        assert_eq!(add.operator.element, BinaryOperator::Addition);
        assert!(matches!(&add.right, J::Binary(mul) if mul.operator.element == BinaryOperator::Multiplication));
    }

    #[test]
    fn test_negative_literal_folds_sign() {
        let cu = parse("class A { void m() { x = -1; } }");
        let J::Assignment(assignment) = first_statement(&cu) else {
            panic!("expected an assignment");
        };
        let J::Literal(literal) = &assignment.assignment.element else {
            panic!("expected a literal");
        };
        assert_eq!(literal.value, LiteralValue::Int(-1));
        assert_eq!(literal.value_source, "-1");
    }

    #[test]
    fn test_lambda_parameters() {
        let cu = parse("class A { void m() { f((a, b) -> a); g(x -> x); } }");
        let class = cu.classes().next().unwrap();
        let text = J::from(class.clone()).print();
        assert_eq!(text, "class A { void m() { f((a, b) -> a); g(x -> x); } }");
        let J::MethodInvocation(mi) = first_statement(&cu) else {
            panic!("expected an invocation");
        };
        let J::Lambda(lambda) = mi.arguments().next().unwrap() else {
            panic!("expected a lambda");
        };
        assert!(lambda.parameters.parenthesized);
        assert_eq!(lambda.parameter_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_unmodeled_statements_are_verbatim() {
        let source = "class A { void m() { for (int i = 0; i < 3; i++) { f(i); } while (x) g(); do { h(); } while (y); } }";
        let cu = parse(source);
        assert_eq!(cu.print(), source);
        let class = cu.classes().next().unwrap();
        let J::MethodDeclaration(method) = class.body.statements().next().unwrap() else {
            panic!("expected a method");
        };
        let kinds: Vec<JKind> = method.body.as_ref().unwrap().statements().map(J::kind).collect();
        assert_eq!(kinds, vec![JKind::Unknown, JKind::Unknown, JKind::Unknown]);
    }

    #[test]
    fn test_enum_constants_are_verbatim() {
        let source = "enum Color { RED, GREEN { void f() {} }, BLUE; Color() {} }";
        let cu = parse(source);
        assert_eq!(cu.print(), source);
        let class = cu.classes().next().unwrap();
        assert!(matches!(class.body.statements().next(), Some(J::Unknown(u)) if u.source.ends_with("BLUE;")));
        assert!(matches!(class.body.statements().nth(1), Some(J::MethodDeclaration(m)) if m.is_constructor()));
    }

    #[test]
    fn test_strict_rejects_unmodeled_expressions() {
        let err = parse_compilation_unit(
            "class A { void m() { x += 1; } }",
            Path::new("A.java"),
            ParseMode::Strict,
        )
        .unwrap_err();
        assert!(err.to_string().contains("compound assignments"));
    }

    #[test]
    fn test_lenient_recovers_statements() {
        let source = "class A {\n    void m() {\n        x += 1;\n        a[0] = b ? c : d;\n        f();\n    }\n}\n";
        let cu = parse_compilation_unit(source, Path::new("A.java"), ParseMode::Lenient).unwrap();
        assert_eq!(cu.print(), source);
        let class = cu.classes().next().unwrap();
        let J::MethodDeclaration(method) = class.body.statements().next().unwrap() else {
            panic!("expected a method");
        };
        let kinds: Vec<JKind> = method.body.as_ref().unwrap().statements().map(J::kind).collect();
        assert_eq!(kinds, vec![JKind::Unknown, JKind::Unknown, JKind::MethodInvocation]);
    }

    #[test]
    fn test_casts_and_negation_keep_enclosing_structure() {
        let source = "class A { void m() { if (!done) { s = (String) o; } } }";
        let cu = parse(source);
        assert_eq!(cu.print(), source);
        assert!(matches!(first_statement(&cu), J::If(_)));
    }

    #[test]
    fn test_parse_error_reports_offset() {
        let err = parse_compilation_unit("class A { void m( { } }", Path::new("A.java"), ParseMode::Strict)
            .unwrap_err();
        match err {
            RecastError::ParseError { offset, .. } => assert_eq!(offset, 18),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_literal_values() {
        assert_eq!(parse_integer("0x1F"), Some(31));
        assert_eq!(parse_integer("1_000L"), Some(1000));
        assert_eq!(parse_integer("010"), Some(8));
        assert_eq!(parse_floating("1.5f"), Some(1.5));
        assert_eq!(unescape(r"a\tbA\101"), "a\tbAA");
        assert_eq!(text_block_value("\"\"\"\n    one\n      two\n    \"\"\""), "one\n  two\n");
    }
}
