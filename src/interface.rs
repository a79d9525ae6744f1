//! Module-level facts: what a module imports and what it exports.

use crate::types::{ModuleName, SymName};

/// One entry of a module's export list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportItem {
    /// A plain exported name.
    Single(SymName),
    /// A type-like export with members (fields, variants, methods).
    WithChildren {
        /// Member names, in declaration order.
        children: Vec<SymName>,
        /// The type's own name.
        head: SymName,
    },
}

/// What the front-end knows about a module's interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    /// Resolved export list.
    pub exports: Vec<ExportItem>,
    /// Imported modules as written, in declaration order.
    pub imports: Vec<ModuleName>,
    /// The summarized module.
    pub module: ModuleName,
}

/// Imported module names in declaration order. Not transitively resolved.
pub fn imports(summary: &ModuleSummary) -> Vec<ModuleName> {
    return summary.imports.clone();
}

/// Exported names. Type-like exports contribute their head name only;
/// members are not expanded.
pub fn exports(summary: &ModuleSummary) -> Vec<SymName> {
    return summary
        .exports
        .iter()
        .map(|item| {
            return match item {
                ExportItem::Single(name) | ExportItem::WithChildren { head: name, .. } => name.clone(),
            };
        })
        .collect();
}
