//! Import and export summaries of parsed Rust and Python modules.

use tree_sitter::Node;

use crate::error::Error;
use crate::interface::{ExportItem, ModuleSummary};
use crate::types::{ModuleName, SymName};

/// Build the import/export summary of a parsed module.
///
/// # Errors
///
/// Returns `Error::UnsupportedLanguage` for extensions without summary support.
pub fn summarize(module: &ModuleName, root: Node<'_>, source: &str, ext: &str) -> Result<ModuleSummary, Error> {
    let (imports, exports) = match ext {
        "rs" => (rust_imports(root, source), rust_exports(root, source)),
        "py" => (python_imports(root, source), python_exports(root, source)),
        _ => {
            return Err(Error::UnsupportedLanguage {
                ext: ext.to_string(),
            });
        },
    };

    return Ok(ModuleSummary {
        exports,
        imports,
        module: module.clone(),
    });
}

/// Text of a node, empty if it is not valid UTF-8.
fn text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    return node.utf8_text(source.as_bytes()).unwrap_or("");
}

/// Text of a named field, if present.
fn field_text<'a>(node: Node<'_>, field: &str, source: &'a str) -> Option<&'a str> {
    return node.child_by_field_name(field).map(|n| return text(n, source));
}

/// Parse a `::`- or `.`-separated path as a module name. Paths that are not
/// module names (`{a, b}`, empty) are dropped.
fn module_from_path(path: &str) -> Option<ModuleName> {
    let dotted = path.trim_start_matches("::").replace("::", ".");
    return match ModuleName::parse(&dotted) {
        Ok(name) => Some(name),
        Err(_) => {
            tracing::trace!("skipping non-module import path `{path}`");
            None
        },
    };
}

// ── Rust ───────────────────────────────────────────────────────────────

/// Module path of every top-level `use` declaration, in order.
fn rust_imports(root: Node<'_>, source: &str) -> Vec<ModuleName> {
    let mut imports = Vec::new();
    let mut cursor = root.walk();

    for node in root.children(&mut cursor) {
        if node.kind() != "use_declaration" {
            continue;
        }
        let Some(argument) = node.child_by_field_name("argument") else {
            continue;
        };
        if let Some(module) = rust_use_module(argument, source) {
            imports.push(module);
        }
    }

    return imports;
}

/// The module a `use` argument imports from.
/// `a::b::C` -> `a.b`, `a::b::{c, d}` -> `a.b`, `a::b::*` -> `a.b`, `a` -> `a`.
fn rust_use_module(argument: Node<'_>, source: &str) -> Option<ModuleName> {
    return match argument.kind() {
        "identifier" | "crate" | "self" | "super" => module_from_path(text(argument, source)),
        "scoped_identifier" | "scoped_use_list" => module_from_path(field_text(argument, "path", source)?),
        "use_as_clause" => rust_use_module(argument.child_by_field_name("path")?, source),
        "use_wildcard" => module_from_path(text(argument, source).trim_end_matches('*').trim_end_matches("::")),
        _ => None,
    };
}

/// Public top-level items of a Rust module.
fn rust_exports(root: Node<'_>, source: &str) -> Vec<ExportItem> {
    let mut exports = Vec::new();
    let mut cursor = root.walk();

    for node in root.children(&mut cursor) {
        if !is_public(node, source) {
            continue;
        }
        let Some(name) = field_text(node, "name", source) else {
            continue;
        };
        let head = SymName(name.to_string());

        let item = match node.kind() {
            "struct_item" => ExportItem::WithChildren {
                children: rust_member_names(node, source, "field_declaration", true),
                head,
            },
            "enum_item" => ExportItem::WithChildren {
                children: rust_member_names(node, source, "enum_variant", false),
                head,
            },
            "trait_item" => ExportItem::WithChildren {
                children: rust_trait_method_names(node, source),
                head,
            },
            "const_item" | "function_item" | "mod_item" | "static_item" | "type_item" | "union_item" => {
                ExportItem::Single(head)
            },
            _ => continue,
        };
        exports.push(item);
    }

    return exports;
}

/// Whether an item is visible outside its crate. Restricted forms such as
/// `pub(crate)`, `pub(super)` and `pub(in path)` are not exports.
fn is_public(node: Node<'_>, source: &str) -> bool {
    let mut cursor = node.walk();
    return node
        .children(&mut cursor)
        .any(|c| return c.kind() == "visibility_modifier" && text(c, source) == "pub");
}

/// Names of body members of `kind`; `public_only` keeps only `pub` members.
fn rust_member_names(item: Node<'_>, source: &str, kind: &str, public_only: bool) -> Vec<SymName> {
    let Some(body) = item.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut cursor = body.walk();
    return body
        .children(&mut cursor)
        .filter(|member| return member.kind() == kind && (!public_only || is_public(*member, source)))
        .filter_map(|member| return field_text(member, "name", source))
        .map(|name| return SymName(name.to_string()))
        .collect();
}

/// Method names declared or defined in a trait body.
fn rust_trait_method_names(item: Node<'_>, source: &str) -> Vec<SymName> {
    let Some(body) = item.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut cursor = body.walk();
    return body
        .children(&mut cursor)
        .filter(|member| return matches!(member.kind(), "function_item" | "function_signature_item"))
        .filter_map(|member| return field_text(member, "name", source))
        .map(|name| return SymName(name.to_string()))
        .collect();
}

// ── Python ─────────────────────────────────────────────────────────────

/// Modules named by top-level `import` and `from ... import` statements.
/// Relative imports are skipped.
fn python_imports(root: Node<'_>, source: &str) -> Vec<ModuleName> {
    let mut imports = Vec::new();
    let mut cursor = root.walk();

    for node in root.children(&mut cursor) {
        match node.kind() {
            "import_statement" => {
                let mut names = node.walk();
                for name in node.children_by_field_name("name", &mut names) {
                    let dotted = if name.kind() == "aliased_import" {
                        name.child_by_field_name("name")
                    } else {
                        Some(name)
                    };
                    if let Some(module) = dotted.and_then(|d| return module_from_path(text(d, source))) {
                        imports.push(module);
                    }
                }
            },
            "import_from_statement" => {
                let Some(module_node) = node.child_by_field_name("module_name") else {
                    continue;
                };
                if module_node.kind() == "relative_import" {
                    continue;
                }
                if let Some(module) = module_from_path(text(module_node, source)) {
                    imports.push(module);
                }
            },
            _ => {},
        }
    }

    return imports;
}

/// Top-level public functions, classes, and assignments.
fn python_exports(root: Node<'_>, source: &str) -> Vec<ExportItem> {
    let mut exports = Vec::new();
    let mut cursor = root.walk();

    for node in root.children(&mut cursor) {
        let Some(definition) = python_definition(node) else {
            continue;
        };
        let item = match definition.kind() {
            "function_definition" => {
                field_text(definition, "name", source).map(|n| return ExportItem::Single(SymName(n.to_string())))
            },
            "class_definition" => field_text(definition, "name", source).map(|n| {
                return ExportItem::WithChildren {
                    children: python_method_names(definition, source),
                    head: SymName(n.to_string()),
                };
            }),
            "expression_statement" => python_assigned_name(definition, source).map(ExportItem::Single),
            _ => None,
        };
        let Some(item) = item else {
            continue;
        };
        let (ExportItem::Single(name) | ExportItem::WithChildren { head: name, .. }) = &item;
        if !name.as_str().starts_with('_') {
            exports.push(item);
        }
    }

    return exports;
}

/// Unwrap decorators to the underlying definition.
fn python_definition(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() == "decorated_definition" {
        return node.child_by_field_name("definition");
    }
    return Some(node);
}

/// Name bound by `name = ...` at top level.
fn python_assigned_name(statement: Node<'_>, source: &str) -> Option<SymName> {
    let assignment = statement.named_child(0)?;
    if assignment.kind() != "assignment" {
        return None;
    }
    let left = assignment.child_by_field_name("left")?;
    if left.kind() != "identifier" {
        return None;
    }
    return Some(SymName(text(left, source).to_string()));
}

/// Methods defined directly in a class body.
fn python_method_names(class: Node<'_>, source: &str) -> Vec<SymName> {
    let Some(body) = class.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut cursor = body.walk();
    return body
        .children(&mut cursor)
        .filter_map(python_definition)
        .filter(|member| return member.kind() == "function_definition")
        .filter_map(|member| return field_text(member, "name", source))
        .map(|name| return SymName(name.to_string()))
        .collect();
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::grammar;

    /// Summarize `source` as module `M` with the grammar for `ext`.
    fn summary(ext: &str, source: &str) -> ModuleSummary {
        let language = grammar::language_for_extension(ext).unwrap();
        let tree = grammar::parse_source(Path::new("test"), source, &language).unwrap();
        summarize(&ModuleName::parse("M").unwrap(), tree.root_node(), source, ext).unwrap()
    }

    /// Module names as strings.
    fn names(modules: &[ModuleName]) -> Vec<&str> {
        modules.iter().map(ModuleName::as_str).collect()
    }

    #[test]
    fn rust_use_forms() {
        let s = summary(
            "rs",
            "use std::collections::HashMap;\nuse serde::{Deserialize, Serialize};\nuse regex;\nuse crate::types::*;\nuse std::io::Error as IoError;\n",
        );
        assert_eq!(
            names(&s.imports),
            vec!["std.collections", "serde", "regex", "crate.types", "std.io"]
        );
    }

    #[test]
    fn rust_public_items_only() {
        let s = summary(
            "rs",
            "pub fn run() {}\nfn hidden() {}\npub struct Config { pub host: String, port: u16 }\npub enum Mode { Fast, Slow }\npub trait Load { fn load(&self); }\n",
        );
        assert_eq!(
            s.exports,
            vec![
                ExportItem::Single(SymName("run".to_string())),
                ExportItem::WithChildren {
                    children: vec![SymName("host".to_string())],
                    head: SymName("Config".to_string()),
                },
                ExportItem::WithChildren {
                    children: vec![SymName("Fast".to_string()), SymName("Slow".to_string())],
                    head: SymName("Mode".to_string()),
                },
                ExportItem::WithChildren {
                    children: vec![SymName("load".to_string())],
                    head: SymName("Load".to_string()),
                },
            ]
        );
    }

    #[test]
    fn restricted_visibility_is_not_exported() {
        let s = summary(
            "rs",
            "pub(crate) fn internal() {}\npub(super) struct Up;\npub(in crate::a) fn scoped() {}\npub struct Shown { pub(crate) hidden: u8, pub open: u8 }\n",
        );
        assert_eq!(
            s.exports,
            vec![ExportItem::WithChildren {
                children: vec![SymName("open".to_string())],
                head: SymName("Shown".to_string()),
            }]
        );
    }

    #[test]
    fn python_imports_skip_relative() {
        let s = summary("py", "import os.path\nimport json as j\nfrom . import sibling\nfrom a.b import c\n");
        assert_eq!(names(&s.imports), vec!["os.path", "json", "a.b"]);
    }

    #[test]
    fn python_private_names_not_exported() {
        let s = summary(
            "py",
            "def run():\n    pass\n\ndef _helper():\n    pass\n\nclass Baz:\n    def mk(self):\n        pass\n\nLIMIT = 3\n_cache = {}\n",
        );
        assert_eq!(
            s.exports,
            vec![
                ExportItem::Single(SymName("run".to_string())),
                ExportItem::WithChildren {
                    children: vec![SymName("mk".to_string())],
                    head: SymName("Baz".to_string()),
                },
                ExportItem::Single(SymName("LIMIT".to_string())),
            ]
        );
    }

    #[test]
    fn unsupported_language_is_an_error() {
        let language = grammar::language_for_extension("go").unwrap();
        let tree = grammar::parse_source(Path::new("m.go"), "package m\n", &language).unwrap();
        let result = summarize(&ModuleName::parse("M").unwrap(), tree.root_node(), "package m\n", "go");
        assert!(matches!(result, Err(Error::UnsupportedLanguage { .. })));
    }
}
