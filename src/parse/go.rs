use crate::errors::{ApiscanError, Result};
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use streaming_iterator::StreamingIterator;
use tree_sitter::Node;

const IMPORT_QUERY: &str = "(import_spec) @import";

/// An import spec as written in a Go file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoImport {
    /// Explicit package name (`alias "path"`), if any
    pub alias: Option<String>,
    /// Import path without quotes
    pub path: String,
}

impl GoImport {
    /// The identifier the importing file uses to refer to this package.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// A top-level function or method declaration.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    /// Byte range of the whole declaration
    pub range: Range<usize>,
    /// Byte range of the parameter list, parentheses included
    pub params: Range<usize>,
    /// Line of the `func` keyword (1-indexed)
    pub line: usize,
    /// Declared with a receiver (`func (r *T) Name(...)`)
    pub method: bool,
}

/// A parsed Go source file. Owns its text so declarations can be sliced
/// without keeping the syntax tree alive.
#[derive(Debug, Clone)]
pub struct GoFile {
    pub path: PathBuf,
    pub source: String,
    pub package: Option<String>,
    pub imports: Vec<GoImport>,
    pub functions: Vec<FunctionDecl>,
    /// Package-level const/var names bound to a basic literal
    pub literals: HashMap<String, String>,
}

impl GoFile {
    pub fn text(&self, range: Range<usize>) -> &str {
        self.source.get(range).unwrap_or_default()
    }

    pub fn function_source(&self, function: &FunctionDecl) -> &str {
        self.text(function.range.clone())
    }

    pub fn parameters(&self, function: &FunctionDecl) -> &str {
        self.text(function.params.clone())
    }

    #[cfg(test)]
    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Reusable tree-sitter parser for Go sources.
pub struct GoParser {
    parser: tree_sitter::Parser,
    import_query: tree_sitter::Query,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ApiscanError::Grammar(e.to_string()))?;
        let import_query = tree_sitter::Query::new(&language, IMPORT_QUERY)
            .map_err(|e| ApiscanError::Grammar(e.to_string()))?;
        Ok(Self {
            parser,
            import_query,
        })
    }

    /// Parse raw file bytes. Non-UTF-8 input is a parse error.
    pub fn parse_bytes(&mut self, path: &Path, bytes: Vec<u8>) -> Result<GoFile> {
        let source = String::from_utf8(bytes).map_err(|e| ApiscanError::ParseError {
            file: path.to_path_buf(),
            message: format!("not valid UTF-8: {e}"),
        })?;
        self.parse_source(path, source)
    }

    /// Parse Go source text. A tree containing error nodes is rejected.
    pub fn parse_source(&mut self, path: &Path, source: String) -> Result<GoFile> {
        let tree = self
            .parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| ApiscanError::ParseError {
                file: path.to_path_buf(),
                message: "parser produced no tree".to_string(),
            })?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ApiscanError::ParseError {
                file: path.to_path_buf(),
                message: format!("syntax error near line {}", first_error_row(root) + 1),
            });
        }

        let bytes = source.as_bytes();
        let imports = self.extract_imports(root, bytes);

        let mut package = None;
        let mut functions = Vec::new();
        let mut literals = HashMap::new();

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_clause" => {
                    package = node
                        .named_child(0)
                        .map(|n| node_text(n, bytes).to_string());
                }
                "function_declaration" | "method_declaration" => {
                    if let Some(function) = function_decl(node, bytes) {
                        functions.push(function);
                    }
                }
                "const_declaration" | "var_declaration" => {
                    collect_literals(node, bytes, &mut literals);
                }
                _ => {}
            }
        }

        Ok(GoFile {
            path: path.to_path_buf(),
            source,
            package,
            imports,
            functions,
            literals,
        })
    }

    /// Entries of a package-level map literal `var <name> = map[K]V{...}` as
    /// `(key, value source)` pairs in declaration order. `Ok(None)` when no
    /// such variable exists.
    pub fn map_literal_entries(
        &mut self,
        path: &Path,
        source: &str,
        var_name: &str,
    ) -> Result<Option<Vec<(String, String)>>> {
        let tree = self
            .parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| ApiscanError::ParseError {
                file: path.to_path_buf(),
                message: "parser produced no tree".to_string(),
            })?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ApiscanError::ParseError {
                file: path.to_path_buf(),
                message: format!("syntax error near line {}", first_error_row(root) + 1),
            });
        }

        let bytes = source.as_bytes();
        let Some(value) = find_var_value(root, bytes, var_name) else {
            return Ok(None);
        };
        let Some(body) = value.child_by_field_name("body") else {
            return Ok(None);
        };

        let mut entries = Vec::new();
        let mut cursor = body.walk();
        for element in body.named_children(&mut cursor) {
            if element.kind() != "keyed_element" {
                continue;
            }
            let count = element.named_child_count();
            let (Some(key), Some(value)) = (
                element.named_child(0).map(unwrap_literal_element),
                count
                    .checked_sub(1)
                    .and_then(|i| element.named_child(i))
                    .map(unwrap_literal_element),
            ) else {
                continue;
            };
            let key = node_text(key, bytes).trim_matches(|c| c == '"' || c == '`');
            entries.push((key.to_string(), node_text(value, bytes).to_string()));
        }
        Ok(Some(entries))
    }

    fn extract_imports(&self, root: Node<'_>, bytes: &[u8]) -> Vec<GoImport> {
        let mut cursor = tree_sitter::QueryCursor::new();
        let mut matches = cursor.matches(&self.import_query, root, bytes);

        let mut imports = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let Some(path_node) = node.child_by_field_name("path") else {
                    continue;
                };
                let path = node_text(path_node, bytes)
                    .trim_matches(|c| c == '"' || c == '`')
                    .to_string();
                if path.is_empty() {
                    continue;
                }
                let alias = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, bytes).to_string());
                imports.push(GoImport { alias, path });
            }
        }
        imports
    }
}

/// Append a companion file's imports and declarations to a resource source.
/// The companion's package clause is dropped; Go allows import declarations
/// after other top-level declarations as far as the grammar is concerned.
pub fn append_companion(resource: &str, companion: &str) -> String {
    let body = match companion
        .lines()
        .position(|l| l.trim_start().starts_with("package "))
    {
        Some(idx) => companion
            .lines()
            .skip(idx + 1)
            .collect::<Vec<_>>()
            .join("\n"),
        None => companion.to_string(),
    };
    format!("{resource}\n{body}\n")
}

fn node_text<'a>(node: Node<'_>, bytes: &'a [u8]) -> &'a str {
    node.utf8_text(bytes).unwrap_or_default()
}

fn first_error_row(node: Node<'_>) -> usize {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() || child.is_missing() {
            return child.start_position().row;
        }
        if child.has_error() {
            return first_error_row(child);
        }
    }
    node.start_position().row
}

fn function_decl(node: Node<'_>, bytes: &[u8]) -> Option<FunctionDecl> {
    let name = node_text(node.child_by_field_name("name")?, bytes).to_string();
    let params = node.child_by_field_name("parameters")?.byte_range();
    Some(FunctionDecl {
        name,
        range: node.byte_range(),
        params,
        line: node.start_position().row + 1,
        method: node.kind() == "method_declaration",
    })
}

fn unwrap_literal_element(node: Node<'_>) -> Node<'_> {
    if node.kind() == "literal_element" {
        node.named_child(0).unwrap_or(node)
    } else {
        node
    }
}

/// First value expression bound to a package-level `var <name>`.
fn find_var_value<'t>(node: Node<'t>, bytes: &[u8], name: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "var_declaration" | "var_spec_list" => {
                if let Some(found) = find_var_value(child, bytes, name) {
                    return Some(found);
                }
            }
            "var_spec" => {
                let mut name_cursor = child.walk();
                let position = child
                    .children_by_field_name("name", &mut name_cursor)
                    .position(|n| node_text(n, bytes) == name);
                if let Some(position) = position {
                    let values = child.child_by_field_name("value")?;
                    return values.named_child(position);
                }
            }
            _ => {}
        }
    }
    None
}

fn collect_literals(node: Node<'_>, bytes: &[u8], out: &mut HashMap<String, String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "const_spec" | "var_spec" => {
                let mut name_cursor = child.walk();
                let names: Vec<String> = child
                    .children_by_field_name("name", &mut name_cursor)
                    .map(|n| node_text(n, bytes).to_string())
                    .collect();
                let Some(values) = child.child_by_field_name("value") else {
                    continue;
                };
                let mut value_cursor = values.walk();
                for (name, value) in names.iter().zip(values.named_children(&mut value_cursor)) {
                    if let Some(literal) = basic_literal(value, bytes) {
                        out.insert(name.clone(), literal);
                    }
                }
            }
            // grouped specs: `const ( ... )` / var_spec_list
            _ => collect_literals(child, bytes, out),
        }
    }
}

fn basic_literal(node: Node<'_>, bytes: &[u8]) -> Option<String> {
    let text = node_text(node, bytes);
    match node.kind() {
        "interpreted_string_literal" => Some(text.trim_matches('"').to_string()),
        "raw_string_literal" => Some(text.trim_matches('`').to_string()),
        "int_literal" | "float_literal" => Some(text.to_string()),
        _ => None,
    }
}
