//! Go syntax model
//!
//! Source text is parsed with tree-sitter and lowered into a small typed tree
//! that keeps only what the rename engine cares about. Every identifier becomes
//! an [`Ident`] slot remembering its original spelling and byte span, so the
//! printer can splice new spellings back into the untouched source text.

use std::collections::{BTreeSet, HashSet};
use std::ops::Range;
use tree_sitter::{Node as TsNode, Parser, Tree};

use crate::Result;

/// A mutable identifier slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// Current spelling
    pub name: String,
    original: String,
    span: Range<usize>,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        let name = name.into();
        Self {
            original: name.clone(),
            name,
            span,
        }
    }

    /// Byte range in the original source
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn is_changed(&self) -> bool {
        self.name != self.original
    }
}

/// Syntactic role of a free identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentRole {
    /// Expression position: variables, constants, functions, package names
    Value,
    /// Type position
    Type,
    /// Field or method name
    Member,
}

/// Underlying shape of a type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Struct,
    Interface,
    /// Any other underlying type, including `type a = b`
    Alias,
}

/// Function or method declaration
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    pub receiver: Option<Receiver>,
    /// Type parameters, signature and body
    pub children: Vec<Node>,
}

/// Method receiver
#[derive(Debug, Clone)]
pub struct Receiver {
    /// Base type name, seen through `*T`, `T[P]` and parentheses
    pub type_name: Option<Ident>,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    pub kind: TypeKind,
    /// Type parameters and the underlying type
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct StructType {
    pub fields: Vec<Ident>,
    /// Field types, embedded types and tags
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub methods: Vec<Ident>,
    /// Method signatures and embedded constraints
    pub children: Vec<Node>,
}

/// One `var` or `const` spec
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<Box<Node>>,
    pub values: Vec<Node>,
    /// Declared at package level rather than inside a function
    pub package_level: bool,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Node>,
    pub args: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct SelectorExpr {
    pub operand: Box<Node>,
    pub field: Ident,
}

/// Composite literal; `ty` is `None` for elided inner literals such as the
/// elements of `[]point{{x: 1}}`
#[derive(Debug, Clone)]
pub struct CompositeLit {
    pub ty: Option<Box<Node>>,
    /// Keys written as bare names (`x:` in `point{x: 1}`)
    pub keys: Vec<Ident>,
    /// Values and non-identifier keys
    pub elements: Vec<Node>,
}

/// The closed set of node kinds the rename engine distinguishes
#[derive(Debug, Clone)]
pub enum Node {
    Func(FuncDecl),
    TypeSpec(TypeSpec),
    Struct(StructType),
    Interface(InterfaceType),
    Value(ValueSpec),
    Call(CallExpr),
    Selector(SelectorExpr),
    Composite(CompositeLit),
    Ident(Ident, IdentRole),
    /// Any other syntax; only its children matter
    Group(Vec<Node>),
}

impl Node {
    /// Visit every identifier slot in this subtree, in document order, with the
    /// role it plays.
    pub fn for_each_ident_mut(&mut self, f: &mut dyn FnMut(&mut Ident, IdentRole)) {
        match self {
            Node::Func(func) => {
                if let Some(type_name) = func.receiver.as_mut().and_then(|r| r.type_name.as_mut()) {
                    f(type_name, IdentRole::Type);
                }
                let role = if func.receiver.is_some() {
                    IdentRole::Member
                } else {
                    IdentRole::Value
                };
                f(&mut func.name, role);
                visit_all_mut(&mut func.children, f);
            }
            Node::TypeSpec(spec) => {
                f(&mut spec.name, IdentRole::Type);
                visit_all_mut(&mut spec.children, f);
            }
            Node::Struct(st) => {
                st.fields.iter_mut().for_each(|field| f(field, IdentRole::Member));
                visit_all_mut(&mut st.children, f);
            }
            Node::Interface(it) => {
                it.methods.iter_mut().for_each(|method| f(method, IdentRole::Member));
                visit_all_mut(&mut it.children, f);
            }
            Node::Value(spec) => {
                spec.names.iter_mut().for_each(|name| f(name, IdentRole::Value));
                if let Some(ty) = spec.ty.as_deref_mut() {
                    ty.for_each_ident_mut(f);
                }
                visit_all_mut(&mut spec.values, f);
            }
            Node::Call(call) => {
                call.callee.for_each_ident_mut(f);
                visit_all_mut(&mut call.args, f);
            }
            Node::Selector(sel) => {
                sel.operand.for_each_ident_mut(f);
                f(&mut sel.field, IdentRole::Member);
            }
            Node::Composite(lit) => {
                if let Some(ty) = lit.ty.as_deref_mut() {
                    ty.for_each_ident_mut(f);
                }
                lit.keys.iter_mut().for_each(|key| f(key, IdentRole::Member));
                visit_all_mut(&mut lit.elements, f);
            }
            Node::Ident(ident, role) => f(ident, *role),
            Node::Group(children) => visit_all_mut(children, f),
        }
    }

    /// Collect every identifier slot in this subtree
    pub fn collect_idents<'a>(&'a self, out: &mut Vec<&'a Ident>) {
        match self {
            Node::Func(func) => {
                if let Some(type_name) = func.receiver.as_ref().and_then(|r| r.type_name.as_ref()) {
                    out.push(type_name);
                }
                out.push(&func.name);
                func.children.iter().for_each(|child| child.collect_idents(out));
            }
            Node::TypeSpec(spec) => {
                out.push(&spec.name);
                spec.children.iter().for_each(|child| child.collect_idents(out));
            }
            Node::Struct(st) => {
                out.extend(st.fields.iter());
                st.children.iter().for_each(|child| child.collect_idents(out));
            }
            Node::Interface(it) => {
                out.extend(it.methods.iter());
                it.children.iter().for_each(|child| child.collect_idents(out));
            }
            Node::Value(spec) => {
                out.extend(spec.names.iter());
                if let Some(ty) = spec.ty.as_deref() {
                    ty.collect_idents(out);
                }
                spec.values.iter().for_each(|value| value.collect_idents(out));
            }
            Node::Call(call) => {
                call.callee.collect_idents(out);
                call.args.iter().for_each(|arg| arg.collect_idents(out));
            }
            Node::Selector(sel) => {
                sel.operand.collect_idents(out);
                out.push(&sel.field);
            }
            Node::Composite(lit) => {
                if let Some(ty) = lit.ty.as_deref() {
                    ty.collect_idents(out);
                }
                out.extend(lit.keys.iter());
                lit.elements.iter().for_each(|element| element.collect_idents(out));
            }
            Node::Ident(ident, _) => out.push(ident),
            Node::Group(children) => children.iter().for_each(|child| child.collect_idents(out)),
        }
    }
}

fn visit_all_mut(nodes: &mut [Node], f: &mut dyn FnMut(&mut Ident, IdentRole)) {
    for node in nodes {
        node.for_each_ident_mut(f);
    }
}

/// One parsed Go file
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) source: String,
    pub(crate) items: Vec<Node>,
    pub(crate) imports: BTreeSet<String>,
}

impl SyntaxTree {
    /// Original source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Top-level declarations in document order
    pub fn items(&self) -> &[Node] {
        &self.items
    }

    /// Package names introduced by import declarations
    pub fn imports(&self) -> &BTreeSet<String> {
        &self.imports
    }

    /// Every identifier slot in document order
    pub fn idents(&self) -> Vec<&Ident> {
        let mut out = Vec::new();
        for item in &self.items {
            item.collect_idents(&mut out);
        }
        out
    }
}

/// Why source text could not be turned into a tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("source is not valid UTF-8 (valid up to byte {valid_up_to})")]
    Encoding { valid_up_to: usize },

    #[error("parser produced no tree")]
    NoTree,

    #[error("syntax error at line {line}, column {column}")]
    Invalid { line: usize, column: usize },
}

/// Tree-sitter backed Go parser
pub struct GoParser {
    parser: Parser,
}

impl std::fmt::Debug for GoParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoParser").finish_non_exhaustive()
    }
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(tree_sitter_go::language())?;
        Ok(Self { parser })
    }

    /// Parse and lower a whole file
    pub fn parse(&mut self, source: &str) -> std::result::Result<SyntaxTree, SyntaxError> {
        let tree = self.parse_tree(source)?;

        let mut lowerer = Lowerer {
            source,
            skip: HashSet::new(),
            imports: BTreeSet::new(),
        };
        let items = lowerer.lower_children(tree.root_node());

        Ok(SyntaxTree {
            source: source.to_string(),
            items,
            imports: lowerer.imports,
        })
    }

    /// Check that text parses cleanly without building a tree
    pub fn check(&mut self, source: &str) -> std::result::Result<(), SyntaxError> {
        self.parse_tree(source).map(|_| ())
    }

    fn parse_tree(&mut self, source: &str) -> std::result::Result<Tree, SyntaxError> {
        let tree = self.parser.parse(source, None).ok_or(SyntaxError::NoTree)?;
        let root = tree.root_node();
        if root.has_error() {
            let at = first_error(root).unwrap_or(root).start_position();
            return Err(SyntaxError::Invalid {
                line: at.row + 1,
                column: at.column + 1,
            });
        }
        Ok(tree)
    }
}

fn first_error(node: TsNode) -> Option<TsNode> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<TsNode> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn named_children(node: TsNode) -> Vec<TsNode> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn field_children<'t>(node: TsNode<'t>, field: &str) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// `element` / `literal_element` wrap a single expression or literal value
fn unwrap_element(node: TsNode) -> TsNode {
    match node.kind() {
        "element" | "literal_element" if node.named_child_count() == 1 => {
            node.named_child(0).unwrap_or(node)
        }
        _ => node,
    }
}

/// Find the base type identifier of a receiver type expression
fn base_type_name(ty: TsNode) -> Option<TsNode> {
    match ty.kind() {
        "type_identifier" => Some(ty),
        "pointer_type" | "parenthesized_type" => ty.named_child(0).and_then(base_type_name),
        "generic_type" => ty.child_by_field_name("type").and_then(base_type_name),
        _ => None,
    }
}

fn is_package_level(spec: TsNode) -> bool {
    let mut current = spec.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "var_declaration" | "const_declaration" | "var_spec_list" | "const_spec_list" => {
                current = parent.parent();
            }
            kind => return kind == "source_file",
        }
    }
    false
}

/// Package name an import path binds when no alias is given: the last path
/// element, skipping a major-version suffix and the usual `go-` decorations.
pub fn default_package_name(import_path: &str) -> Option<String> {
    let mut segments = import_path.rsplit('/').filter(|s| !s.is_empty());
    let mut last = segments.next()?;
    let is_major_version =
        |s: &str| s.len() > 1 && s.starts_with('v') && s[1..].chars().all(|c| c.is_ascii_digit());
    if is_major_version(last) {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }
    let last = last.split('.').next().unwrap_or(last);
    let last = last.strip_prefix("go-").unwrap_or(last);
    let last = last.strip_suffix("-go").unwrap_or(last);
    if last.is_empty() {
        None
    } else {
        Some(last.replace('-', "_"))
    }
}

struct Lowerer<'s> {
    source: &'s str,
    /// Nodes already captured as a named slot by an enclosing node
    skip: HashSet<usize>,
    imports: BTreeSet<String>,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: TsNode) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    fn ident(&self, node: TsNode) -> Ident {
        Ident::new(self.text(node), node.byte_range())
    }

    /// Take a node as a named slot so generic child lowering leaves it alone
    fn claim(&mut self, node: TsNode) -> Ident {
        self.skip.insert(node.id());
        self.ident(node)
    }

    fn lower_children(&mut self, node: TsNode) -> Vec<Node> {
        named_children(node)
            .into_iter()
            .map(|child| self.lower(child))
            .filter(|lowered| !matches!(lowered, Node::Group(children) if children.is_empty()))
            .collect()
    }

    fn lower(&mut self, node: TsNode) -> Node {
        if self.skip.contains(&node.id()) {
            return Node::Group(Vec::new());
        }

        match node.kind() {
            "function_declaration" | "method_declaration" => self.lower_func(node),
            "type_spec" | "type_alias" => self.lower_type_spec(node),
            "struct_type" => self.lower_struct(node),
            "interface_type" => self.lower_interface(node),
            "var_spec" | "const_spec" => self.lower_value_spec(node),
            "call_expression" => self.lower_call(node),
            "selector_expression" => self.lower_selector(node),
            "composite_literal" => self.lower_composite(node),
            "literal_value" => {
                let (keys, elements) = self.lower_literal_value(node);
                Node::Composite(CompositeLit {
                    ty: None,
                    keys,
                    elements,
                })
            }
            "identifier" => Node::Ident(self.ident(node), IdentRole::Value),
            "type_identifier" => Node::Ident(self.ident(node), IdentRole::Type),
            "field_identifier" => Node::Ident(self.ident(node), IdentRole::Member),
            "import_spec" => {
                self.record_import(node);
                Node::Group(Vec::new())
            }
            // Names here belong to other packages or to the package clause
            "package_clause" | "qualified_type" | "package_identifier" | "label_name" | "comment" => {
                Node::Group(Vec::new())
            }
            _ => Node::Group(self.lower_children(node)),
        }
    }

    fn lower_func(&mut self, node: TsNode) -> Node {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Node::Group(self.lower_children(node));
        };
        let name = self.claim(name_node);

        let receiver = if node.kind() == "method_declaration" {
            let type_node = node.child_by_field_name("receiver").and_then(|list| {
                named_children(list)
                    .into_iter()
                    .find(|param| param.kind() == "parameter_declaration")
                    .and_then(|param| param.child_by_field_name("type"))
                    .and_then(base_type_name)
            });
            Some(Receiver {
                type_name: type_node.map(|ty| self.claim(ty)),
            })
        } else {
            None
        };

        let children = self.lower_children(node);
        Node::Func(FuncDecl {
            name,
            receiver,
            children,
        })
    }

    fn lower_type_spec(&mut self, node: TsNode) -> Node {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Node::Group(self.lower_children(node));
        };
        let name = self.claim(name_node);
        let kind = match node.child_by_field_name("type").map(|ty| ty.kind()) {
            Some("struct_type") => TypeKind::Struct,
            Some("interface_type") => TypeKind::Interface,
            _ => TypeKind::Alias,
        };
        let children = self.lower_children(node);
        Node::TypeSpec(TypeSpec {
            name,
            kind,
            children,
        })
    }

    fn lower_struct(&mut self, node: TsNode) -> Node {
        let mut fields = Vec::new();
        let declarations = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "field_declaration_list")
            .flat_map(named_children);
        for declaration in declarations {
            if declaration.kind() == "field_declaration" {
                for name in field_children(declaration, "name") {
                    fields.push(self.claim(name));
                }
            }
        }
        let children = self.lower_children(node);
        Node::Struct(StructType { fields, children })
    }

    fn lower_interface(&mut self, node: TsNode) -> Node {
        let mut methods = Vec::new();
        for element in named_children(node) {
            if matches!(element.kind(), "method_spec" | "method_elem") {
                if let Some(name) = element.child_by_field_name("name") {
                    methods.push(self.claim(name));
                }
            }
        }
        let children = self.lower_children(node);
        Node::Interface(InterfaceType { methods, children })
    }

    fn lower_value_spec(&mut self, node: TsNode) -> Node {
        let names = field_children(node, "name")
            .into_iter()
            .map(|name| self.claim(name))
            .collect();
        let ty = node
            .child_by_field_name("type")
            .map(|ty| Box::new(self.lower(ty)));
        let values = match node.child_by_field_name("value") {
            Some(list) if list.kind() == "expression_list" => named_children(list)
                .into_iter()
                .map(|value| self.lower(value))
                .collect(),
            Some(value) => vec![self.lower(value)],
            None => Vec::new(),
        };
        Node::Value(ValueSpec {
            names,
            ty,
            values,
            package_level: is_package_level(node),
        })
    }

    fn lower_call(&mut self, node: TsNode) -> Node {
        let Some(function) = node.child_by_field_name("function") else {
            return Node::Group(self.lower_children(node));
        };
        let callee = Box::new(self.lower(function));
        self.skip.insert(function.id());
        let args = self.lower_children(node);
        Node::Call(CallExpr { callee, args })
    }

    fn lower_selector(&mut self, node: TsNode) -> Node {
        let (Some(operand), Some(field)) = (
            node.child_by_field_name("operand"),
            node.child_by_field_name("field"),
        ) else {
            return Node::Group(self.lower_children(node));
        };
        Node::Selector(SelectorExpr {
            operand: Box::new(self.lower(operand)),
            field: self.ident(field),
        })
    }

    fn lower_composite(&mut self, node: TsNode) -> Node {
        let ty = node
            .child_by_field_name("type")
            .map(|ty| Box::new(self.lower(ty)));
        let (keys, elements) = match node.child_by_field_name("body") {
            Some(body) => self.lower_literal_value(body),
            None => (Vec::new(), Vec::new()),
        };
        Node::Composite(CompositeLit { ty, keys, elements })
    }

    fn lower_literal_value(&mut self, node: TsNode) -> (Vec<Ident>, Vec<Node>) {
        let mut keys = Vec::new();
        let mut elements = Vec::new();

        for child in named_children(node) {
            match child.kind() {
                "keyed_element" => {
                    let parts = named_children(child);
                    let Some((key, values)) = parts.split_first() else {
                        continue;
                    };
                    let key = unwrap_element(*key);
                    match key.kind() {
                        "field_identifier" | "identifier" => keys.push(self.ident(key)),
                        _ => elements.push(self.lower(key)),
                    }
                    for value in values {
                        elements.push(self.lower(unwrap_element(*value)));
                    }
                }
                "comment" => {}
                _ => elements.push(self.lower(unwrap_element(child))),
            }
        }

        (keys, elements)
    }

    fn record_import(&mut self, spec: TsNode) {
        match spec.child_by_field_name("name") {
            Some(alias) if alias.kind() == "package_identifier" => {
                self.imports.insert(self.text(alias).to_string());
            }
            // `.` and `_` imports bind no name
            Some(_) => {}
            None => {
                let path = spec
                    .child_by_field_name("path")
                    .map(|path| self.text(path).trim_matches(&['"', '`'][..]))
                    .unwrap_or_default();
                if let Some(name) = default_package_name(path) {
                    self.imports.insert(name);
                }
            }
        }
    }
}
