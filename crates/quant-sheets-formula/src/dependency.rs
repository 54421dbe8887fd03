//! Dependency analysis over named-row formulas
//!
//! Builds a dependency tree from the current formula texts, tolerating
//! cycles via path-tracked traversal, and produces an evaluation order
//! that puts every non-cycle dependency before its dependents.

use ahash::{AHashMap, AHashSet};

use crate::ast::Expr;
use crate::evaluator::is_builtin_constant;
use crate::parser::parse;

/// Dependency node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepKind {
    /// Row without a formula (or an external name); already resolved
    Input,
    /// Row with a formula and tracked dependencies
    Formula,
    /// Built-in constant (`pi`, `e`)
    Constant,
    /// Back-reference to a name already on the traversal path
    Cycle,
    /// Synthetic parent combining independent roots
    Group,
}

/// A node of the dependency tree
///
/// Built fresh on each analysis pass from the current formula texts; not
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DepNode {
    pub name: String,
    pub kind: DepKind,
    pub dependencies: Vec<DepNode>,
}

impl DepNode {
    fn leaf(name: impl Into<String>, kind: DepKind) -> Self {
        Self {
            name: name.into(),
            kind,
            dependencies: Vec::new(),
        }
    }
}

/// Collect the distinct variable names referenced by an expression, in
/// first-encounter order
pub fn referenced_names(expr: &Expr) -> Vec<String> {
    let mut names = Vec::new();
    let mut seen = AHashSet::new();
    collect_names(expr, &mut names, &mut seen);
    names
}

fn collect_names(expr: &Expr, names: &mut Vec<String>, seen: &mut AHashSet<String>) {
    match expr {
        Expr::Variable(name) => {
            if seen.insert(name.clone()) {
                names.push(name.clone());
            }
        }
        Expr::Vector(elements) => {
            for element in elements {
                collect_names(element, names, seen);
            }
        }
        Expr::Unary { operand, .. } => collect_names(operand, names, seen),
        Expr::Binary { left, right, .. } => {
            collect_names(left, names, seen);
            collect_names(right, names, seen);
        }
        Expr::Ternary {
            cond,
            when_true,
            when_false,
        } => {
            collect_names(cond, names, seen);
            collect_names(when_true, names, seen);
            collect_names(when_false, names, seen);
        }
        Expr::Call { args, .. } => {
            for arg in args {
                collect_names(arg, names, seen);
            }
        }
        Expr::Index { target, index } => {
            collect_names(target, names, seen);
            collect_names(index, names, seen);
        }
        Expr::Number(_) | Expr::Boolean(_) | Expr::Text(_) => {}
    }
}

/// Build the dependency tree for a set of rows
///
/// Each entry pairs a row name with its optional formula text. Rows with
/// unparseable formulas become formula nodes without dependencies; the
/// parse error resurfaces at recalculation. Multiple independent roots
/// are combined under a synthetic group node.
pub fn build_dependency_tree(rows: &[(String, Option<String>)]) -> DepNode {
    let builder = TreeBuilder::new(rows);
    builder.build()
}

struct TreeBuilder<'a> {
    rows: &'a [(String, Option<String>)],
    /// Row name → names its formula references (self-references excluded)
    deps: AHashMap<&'a str, Vec<String>>,
}

impl<'a> TreeBuilder<'a> {
    fn new(rows: &'a [(String, Option<String>)]) -> Self {
        let mut deps = AHashMap::new();
        for (name, formula) in rows {
            if let Some(text) = formula {
                let referenced = match parse(text) {
                    Ok(ast) => referenced_names(&ast)
                        .into_iter()
                        .filter(|dep| dep != name)
                        .collect(),
                    Err(_) => Vec::new(),
                };
                deps.insert(name.as_str(), referenced);
            }
        }
        Self { rows, deps }
    }

    fn build(&self) -> DepNode {
        // Names referenced by at least one other row
        let mut referenced = AHashSet::new();
        for dep_list in self.deps.values() {
            for dep in dep_list {
                referenced.insert(dep.as_str());
            }
        }

        // Rows never referenced become roots; a pure cycle has none, in
        // which case every row is a root so traversal terminates
        let mut root_names: Vec<&str> = self
            .rows
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| !referenced.contains(name))
            .collect();
        if root_names.is_empty() {
            root_names = self.rows.iter().map(|(name, _)| name.as_str()).collect();
        }

        let mut roots = Vec::new();
        let mut covered = AHashSet::new();
        for name in root_names {
            let mut path = Vec::new();
            roots.push(self.build_node(name, &mut path, &mut covered));
        }

        // A cyclic subgraph hanging off no root (e.g. an orphan cycle next
        // to unrelated roots) would otherwise be skipped; promote its rows
        // to extra roots in enumeration order
        for (name, _) in self.rows {
            if !covered.contains(name.as_str()) {
                let mut path = Vec::new();
                roots.push(self.build_node(name, &mut path, &mut covered));
            }
        }

        match roots.len() {
            1 => roots.remove(0),
            _ => DepNode {
                name: String::new(),
                kind: DepKind::Group,
                dependencies: roots,
            },
        }
    }

    fn build_node(
        &self,
        name: &str,
        path: &mut Vec<String>,
        covered: &mut AHashSet<String>,
    ) -> DepNode {
        if path.iter().any(|on_path| on_path == name) {
            return DepNode::leaf(name, DepKind::Cycle);
        }

        covered.insert(name.to_string());

        match self.deps.get(name) {
            Some(dep_names) => {
                path.push(name.to_string());
                let dependencies = dep_names
                    .iter()
                    .map(|dep| self.build_node(dep, path, covered))
                    .collect();
                path.pop();
                DepNode {
                    name: name.to_string(),
                    kind: DepKind::Formula,
                    dependencies,
                }
            }
            None => {
                if self.is_row(name) {
                    DepNode::leaf(name, DepKind::Input)
                } else if is_builtin_constant(name) {
                    DepNode::leaf(name, DepKind::Constant)
                } else {
                    // Absent external name; evaluation reports it later
                    DepNode::leaf(name, DepKind::Input)
                }
            }
        }
    }

    fn is_row(&self, name: &str) -> bool {
        self.rows.iter().any(|(row_name, _)| row_name == name)
    }
}

/// Flatten a dependency tree into a safe evaluation order
///
/// Inputs and cycle leaves come first in tree-encounter order, then
/// formula names in post-order (dependencies before dependents).
/// Constants are not rows and are excluded. Every name appears at most
/// once; cycle members appear but carry no ordering guarantee among each
/// other.
pub fn dependency_order(tree: &DepNode) -> Vec<String> {
    let mut order = Vec::new();
    let mut seen = AHashSet::new();

    collect_leaves(tree, &mut order, &mut seen);
    collect_formulas(tree, &mut order, &mut seen);

    order
}

fn collect_leaves(node: &DepNode, order: &mut Vec<String>, seen: &mut AHashSet<String>) {
    match node.kind {
        DepKind::Input | DepKind::Cycle => {
            if seen.insert(node.name.clone()) {
                order.push(node.name.clone());
            }
        }
        _ => {}
    }
    for dep in &node.dependencies {
        collect_leaves(dep, order, seen);
    }
}

fn collect_formulas(node: &DepNode, order: &mut Vec<String>, seen: &mut AHashSet<String>) {
    for dep in &node.dependencies {
        collect_formulas(dep, order, seen);
    }
    if node.kind == DepKind::Formula && seen.insert(node.name.clone()) {
        order.push(node.name.clone());
    }
}
