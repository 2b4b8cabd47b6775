use crate::model::{Member, Signature, SymbolTable, insert_member};
use anyhow::Result;
use std::collections::BTreeMap;
use tree_sitter::{Node, Parser};

/// Module-body statement, reduced to the shapes the symbol table records.
#[derive(Debug)]
enum Statement<'tree> {
    /// `def` / `async def`, decorated or not.
    Callable { name: String, parameters: Vec<String> },
    /// `class`, decorated or not.
    TypeDecl { name: String, body: Option<Node<'tree>> },
    /// Plain `=` assignment; holds the bare-name targets.
    Assignment(Vec<String>),
    Other,
}

pub struct PythonExtractor {
    parser: Parser,
}

impl PythonExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }

    /// Extract the top-level symbols of one module.
    ///
    /// Returns `None` when the source does not parse cleanly; a module with a
    /// syntax error anywhere contributes nothing. Python 2 only syntax counts
    /// as a syntax error even though the grammar accepts it.
    pub fn extract(&mut self, source: &str) -> Option<SymbolTable> {
        let tree = self.parser.parse(source, None)?;
        let root = tree.root_node();
        if root.has_error() || contains_legacy_syntax(root, source) {
            return None;
        }

        let mut table = SymbolTable::new();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match classify(node, source) {
                Statement::Callable { name, parameters } => {
                    table.insert_first(name, Signature::Function(parameters));
                }
                Statement::TypeDecl { name, body } => {
                    let members = body
                        .map(|body| class_members(body, source))
                        .unwrap_or_default();
                    table.insert_first(name, Signature::Class(members));
                }
                Statement::Assignment(targets) => {
                    for target in targets {
                        table.insert_first(target, Signature::Variable);
                    }
                }
                Statement::Other => {}
            }
        }
        Some(table)
    }
}

fn classify<'tree>(node: Node<'tree>, source: &str) -> Statement<'tree> {
    match node.kind() {
        "decorated_definition" => match node.child_by_field_name("definition") {
            Some(definition) => classify(definition, source),
            None => Statement::Other,
        },
        "function_definition" | "async_function_definition" => {
            let Some(name_node) = node.child_by_field_name("name") else {
                return Statement::Other;
            };
            let parameters = node
                .child_by_field_name("parameters")
                .map(|params| positional_parameters(params, source))
                .unwrap_or_default();
            Statement::Callable {
                name: node_text(name_node, source),
                parameters,
            }
        }
        "class_definition" => {
            let Some(name_node) = node.child_by_field_name("name") else {
                return Statement::Other;
            };
            Statement::TypeDecl {
                name: node_text(name_node, source),
                body: node.child_by_field_name("body"),
            }
        }
        "expression_statement" => {
            if node.named_child_count() != 1 {
                return Statement::Other;
            }
            match node.named_child(0) {
                Some(inner) if inner.kind() == "assignment" => assignment_targets(inner, source),
                _ => Statement::Other,
            }
        }
        _ => Statement::Other,
    }
}

fn class_members(body: Node<'_>, source: &str) -> BTreeMap<String, Member> {
    let mut members = BTreeMap::new();
    let mut cursor = body.walk();
    for node in body.named_children(&mut cursor) {
        match classify(node, source) {
            Statement::Callable { name, parameters } => {
                insert_member(&mut members, name, Member::Method(parameters));
            }
            Statement::Assignment(targets) => {
                for target in targets {
                    insert_member(&mut members, target, Member::Field);
                }
            }
            Statement::TypeDecl { .. } | Statement::Other => {}
        }
    }
    members
}

/// `a = b = value` binds every bare-name target; annotated assignments and
/// destructuring targets bind nothing here.
fn assignment_targets<'tree>(node: Node<'tree>, source: &str) -> Statement<'tree> {
    let mut targets = Vec::new();
    let mut current = node;
    loop {
        if current.child_by_field_name("type").is_some() {
            return Statement::Other;
        }
        if let Some(left) = current.child_by_field_name("left") {
            if left.kind() == "identifier" {
                targets.push(node_text(left, source));
            }
        }
        match current.child_by_field_name("right") {
            Some(right) if right.kind() == "assignment" => current = right,
            Some(_) => break,
            None => return Statement::Other,
        }
    }
    if targets.is_empty() {
        Statement::Other
    } else {
        Statement::Assignment(targets)
    }
}

/// Names of the parameters that can be bound by position, in declared order.
/// Positional-only, plain, typed and defaulted parameters are kept; `*args`,
/// `**kwargs` and everything keyword-only after them are not.
fn positional_parameters(params: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut keyword_only = false;
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "identifier" => {
                if !keyword_only {
                    names.push(node_text(param, source));
                }
            }
            "default_parameter" | "typed_default_parameter" => {
                if keyword_only {
                    continue;
                }
                if let Some(name) = param.child_by_field_name("name") {
                    if name.kind() == "identifier" {
                        names.push(node_text(name, source));
                    }
                }
            }
            "typed_parameter" => match param.named_child(0) {
                Some(inner) if inner.kind() == "identifier" => {
                    if !keyword_only {
                        names.push(node_text(inner, source));
                    }
                }
                Some(inner) if inner.kind() == "list_splat_pattern" => keyword_only = true,
                _ => {}
            },
            "list_splat_pattern" | "keyword_separator" => keyword_only = true,
            _ => {}
        }
    }
    names
}

/// Pre-order walk looking for constructs a Python 3 parser rejects.
fn contains_legacy_syntax(root: Node<'_>, source: &str) -> bool {
    let mut cursor = root.walk();
    loop {
        if is_legacy_node(cursor.node(), source) {
            return true;
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return false;
            }
        }
    }
}

fn is_legacy_node(node: Node<'_>, source: &str) -> bool {
    match node.kind() {
        "print_statement" | "exec_statement" | "<>" => true,
        // def f(a, (b, c)) tuple parameter unpacking
        "tuple_pattern" => node.parent().is_some_and(|parent| {
            matches!(
                parent.kind(),
                "parameters" | "lambda_parameters" | "default_parameter"
            )
        }),
        "integer" => is_legacy_integer(&node_text(node, source)),
        _ => false,
    }
}

/// `10L` longs and `0777` octals.
fn is_legacy_integer(literal: &str) -> bool {
    let digits: String = literal.chars().filter(|ch| *ch != '_').collect();
    if digits.ends_with(['l', 'L']) {
        return true;
    }
    digits.len() > 1
        && digits.starts_with('0')
        && digits.chars().all(|ch| ch.is_ascii_digit())
        && digits.chars().any(|ch| ch != '0')
}

fn node_text(node: Node<'_>, source: &str) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    source.get(start..end).unwrap_or("").trim().to_string()
}
