//! Rename engine
//!
//! Promotes private identifiers of one file to exported form. The work is split
//! into two walks over the tree:
//!
//! 1. **declare** applies the per-node rules in document order and records every
//!    declaration rename in a file-scoped [`RenameTable`].
//! 2. **propagate** rewrites every remaining reference whose old spelling is in
//!    the table, so uses that precede their declaration are fixed too.
//!
//! Matching is by spelling only. Two unrelated declarations sharing a name are
//! treated as one, and shadowing is not tracked.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::names::{capitalize, classify, starts_lowercase};
use crate::syntax::{
    CompositeLit, FuncDecl, Ident, IdentRole, InterfaceType, Node, StructType, SyntaxTree,
    TypeSpec, ValueSpec,
};

/// Default protected function names: the program entry point and package
/// initializers
pub const PROTECTED_FUNCTIONS: &[&str] = &["main", "init"];

/// Which namespace a recorded rename belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Functions, types, variables and constants
    Package,
    /// Struct fields and methods
    Member,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Namespace::Package => write!(f, "package"),
            Namespace::Member => write!(f, "member"),
        }
    }
}

/// A single recorded rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub namespace: Namespace,
    pub old: String,
    pub new: String,
}

/// Old name to new name, per namespace, in the order declarations were found
#[derive(Debug, Clone, Default)]
pub struct RenameTable {
    package: HashMap<String, String>,
    member: HashMap<String, String>,
    order: Vec<Rename>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, namespace: Namespace) -> &HashMap<String, String> {
        match namespace {
            Namespace::Package => &self.package,
            Namespace::Member => &self.member,
        }
    }

    /// Record a rename. The first mapping for a name wins.
    pub fn record(&mut self, namespace: Namespace, old: &str, new: &str) {
        let map = match namespace {
            Namespace::Package => &mut self.package,
            Namespace::Member => &mut self.member,
        };
        if map.contains_key(old) {
            return;
        }
        map.insert(old.to_string(), new.to_string());
        self.order.push(Rename {
            namespace,
            old: old.to_string(),
            new: new.to_string(),
        });
    }

    pub fn lookup(&self, namespace: Namespace, old: &str) -> Option<&str> {
        self.map(namespace).get(old).map(String::as_str)
    }

    /// Recorded renames in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &Rename> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// What a rename run did to one tree
#[derive(Debug, Clone, Default)]
pub struct RenameOutcome {
    /// True once any identifier slot was mutated
    pub changed: bool,
    /// Number of mutated slots
    pub occurrences: usize,
    /// Declaration renames found in the file
    pub table: RenameTable,
}

/// Applies the promotion rules to parsed files
#[derive(Debug, Clone)]
pub struct RenameEngine {
    protected: BTreeSet<String>,
}

impl Default for RenameEngine {
    fn default() -> Self {
        Self::new(PROTECTED_FUNCTIONS.iter().copied())
    }
}

impl RenameEngine {
    /// Create an engine that never renames the given receiver-less functions
    pub fn new<I, S>(protected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected: protected.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.contains(name)
    }

    /// Rename the tree in place
    pub fn rename(&self, tree: &mut SyntaxTree) -> RenameOutcome {
        let mut pass = Pass {
            engine: self,
            imports: &tree.imports,
            table: RenameTable::new(),
            occurrences: 0,
        };

        for item in tree.items.iter_mut() {
            pass.declare(item);
        }
        for item in tree.items.iter_mut() {
            pass.propagate(item);
        }

        debug!(
            renames = pass.table.len(),
            occurrences = pass.occurrences,
            "rename finished"
        );

        RenameOutcome {
            changed: pass.occurrences > 0,
            occurrences: pass.occurrences,
            table: pass.table,
        }
    }
}

/// State of one rename run
struct Pass<'a> {
    engine: &'a RenameEngine,
    imports: &'a BTreeSet<String>,
    table: RenameTable,
    occurrences: usize,
}

impl Pass<'_> {
    fn set(&mut self, ident: &mut Ident, new: String) -> String {
        debug!(from = %ident.name, to = %new, at = ident.span().start, "renaming");
        self.occurrences += 1;
        std::mem::replace(&mut ident.name, new)
    }

    /// Promote a package-scope name unless it is reserved or already exported
    fn promote(&mut self, ident: &mut Ident) -> Option<String> {
        if !classify(&ident.name).is_renameable() {
            return None;
        }
        let new = capitalize(&ident.name);
        Some(self.set(ident, new))
    }

    /// Promote a field or method name; reserved spellings are allowed here
    fn promote_member(&mut self, ident: &mut Ident) -> Option<String> {
        if !starts_lowercase(&ident.name) {
            return None;
        }
        let new = capitalize(&ident.name);
        Some(self.set(ident, new))
    }

    fn declare_and_record(&mut self, ident: &mut Ident, namespace: Namespace) {
        let old = match namespace {
            Namespace::Package => self.promote(ident),
            Namespace::Member => self.promote_member(ident),
        };
        if let Some(old) = old {
            self.table.record(namespace, &old, &ident.name);
        }
    }

    fn declare_all(&mut self, nodes: &mut [Node]) {
        for node in nodes {
            self.declare(node);
        }
    }

    fn declare(&mut self, node: &mut Node) {
        match node {
            Node::Func(func) => self.declare_func(func),
            Node::TypeSpec(spec) => self.declare_type(spec),
            Node::Struct(st) => self.declare_struct(st),
            Node::Interface(it) => self.declare_interface(it),
            Node::Value(spec) => self.declare_value(spec),
            Node::Call(call) => {
                match call.callee.as_mut() {
                    Node::Ident(target, IdentRole::Value) => {
                        if !self.engine.is_protected(&target.name) {
                            self.promote(target);
                        }
                    }
                    callee => self.declare(callee),
                }
                self.declare_all(&mut call.args);
            }
            Node::Selector(sel) => {
                self.declare(&mut sel.operand);
                self.promote_member(&mut sel.field);
            }
            Node::Composite(lit) => self.declare_composite(lit),
            Node::Ident(..) => {}
            Node::Group(children) => self.declare_all(children),
        }
    }

    fn declare_func(&mut self, func: &mut FuncDecl) {
        match func.receiver.as_mut() {
            Some(receiver) => {
                if let Some(type_name) = receiver.type_name.as_mut() {
                    self.declare_and_record(type_name, Namespace::Package);
                }
                self.declare_and_record(&mut func.name, Namespace::Member);
            }
            None => {
                if !self.engine.is_protected(&func.name.name) {
                    self.declare_and_record(&mut func.name, Namespace::Package);
                }
            }
        }
        self.declare_all(&mut func.children);
    }

    fn declare_type(&mut self, spec: &mut TypeSpec) {
        self.declare_and_record(&mut spec.name, Namespace::Package);
        self.declare_all(&mut spec.children);
    }

    fn declare_struct(&mut self, st: &mut StructType) {
        for field in st.fields.iter_mut() {
            self.declare_and_record(field, Namespace::Member);
        }
        self.declare_all(&mut st.children);
    }

    fn declare_interface(&mut self, it: &mut InterfaceType) {
        for method in it.methods.iter_mut() {
            self.declare_and_record(method, Namespace::Member);
        }
        self.declare_all(&mut it.children);
    }

    fn declare_value(&mut self, spec: &mut ValueSpec) {
        if !spec.package_level {
            if let Some(ty) = spec.ty.as_deref_mut() {
                self.declare(ty);
            }
            self.declare_all(&mut spec.values);
            return;
        }

        for name in spec.names.iter_mut() {
            self.declare_and_record(name, Namespace::Package);
        }
        if let Some(ty) = spec.ty.as_deref_mut() {
            self.declare(ty);
            self.promote_free(ty);
        }
        for value in spec.values.iter_mut() {
            self.declare(value);
            self.promote_free(value);
        }
    }

    fn declare_composite(&mut self, lit: &mut CompositeLit) {
        if let Some(ty) = lit.ty.as_deref_mut() {
            match ty {
                Node::Ident(name, IdentRole::Type | IdentRole::Value) => {
                    self.promote(name);
                }
                other => self.declare(other),
            }
        }
        for key in lit.keys.iter_mut() {
            self.promote(key);
        }
        self.declare_all(&mut lit.elements);
    }

    /// Promote every free identifier in a package-level type or initializer
    fn promote_free(&mut self, node: &mut Node) {
        let imports = self.imports;
        let engine = self.engine;
        node.for_each_ident_mut(&mut |ident: &mut Ident, role: IdentRole| {
            let skip = match role {
                IdentRole::Member => true,
                IdentRole::Value => imports.contains(&ident.name) || engine.is_protected(&ident.name),
                IdentRole::Type => imports.contains(&ident.name),
            };
            if !skip {
                self.promote(ident);
            }
        });
    }

    fn propagate_all(&mut self, nodes: &mut [Node]) {
        for node in nodes {
            self.propagate(node);
        }
    }

    fn lookup_and_set(&mut self, ident: &mut Ident, namespace: Namespace) {
        if let Some(new) = self.table.lookup(namespace, &ident.name) {
            let new = new.to_string();
            self.set(ident, new);
        }
    }

    fn propagate(&mut self, node: &mut Node) {
        match node {
            Node::Func(func) => self.propagate_all(&mut func.children),
            Node::TypeSpec(spec) => self.propagate_all(&mut spec.children),
            Node::Struct(st) => self.propagate_all(&mut st.children),
            Node::Interface(it) => self.propagate_all(&mut it.children),
            Node::Value(spec) => {
                for name in spec.names.iter_mut() {
                    self.lookup_and_set(name, Namespace::Package);
                }
                if let Some(ty) = spec.ty.as_deref_mut() {
                    self.propagate(ty);
                }
                self.propagate_all(&mut spec.values);
            }
            Node::Call(call) => {
                self.propagate(&mut call.callee);
                self.propagate_all(&mut call.args);
            }
            Node::Selector(sel) => self.propagate(&mut sel.operand),
            Node::Composite(lit) => {
                if let Some(ty) = lit.ty.as_deref_mut() {
                    self.propagate(ty);
                }
                for key in lit.keys.iter_mut() {
                    self.lookup_and_set(key, Namespace::Member);
                }
                self.propagate_all(&mut lit.elements);
            }
            Node::Ident(ident, IdentRole::Value | IdentRole::Type) => {
                self.lookup_and_set(ident, Namespace::Package);
            }
            Node::Ident(_, IdentRole::Member) => {}
            Node::Group(children) => self.propagate_all(children),
        }
    }
}
