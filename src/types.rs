/// Core domain types: packages, module names, spans, and located symbols.
use std::fmt;
use std::path::{Component, Path, PathBuf};

use sha2::{Digest as _, Sha256};

use crate::error::Error;

/// The source package being indexed. Supplied by the caller, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Package {
    /// Package name as known to the corpus.
    pub name: String,
    /// Package version, when the corpus tracks one.
    pub version: Option<String>,
}

impl Package {
    /// Package with a name and no version.
    pub fn named(name: impl Into<String>) -> Self {
        return Self {
            name: name.into(),
            version: None,
        };
    }
}

/// A dotted module path such as `A.B.C`. Every segment is an identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleName(String);

impl ModuleName {
    /// Parse a dotted module name.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidModuleName` if any segment is empty or not an identifier.
    pub fn parse(name: &str) -> Result<Self, Error> {
        if name.split('.').all(is_module_segment) {
            return Ok(Self(name.to_string()));
        }
        return Err(Error::InvalidModuleName {
            name: name.to_string(),
        });
    }

    /// Build a module name from a relative file path (`A/B/C.rs` -> `A.B.C`).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidModuleName` if the path is absolute, climbs with `..`,
    /// or has a component that is not an identifier.
    pub fn from_relative_path(path: &Path) -> Result<Self, Error> {
        let stem = path.with_extension("");
        let mut segments = Vec::new();
        for component in stem.components() {
            let Component::Normal(part) = component else {
                return Err(Error::InvalidModuleName {
                    name: path.display().to_string(),
                });
            };
            segments.push(part.to_string_lossy().into_owned());
        }
        return Self::parse(&segments.join("."));
    }

    /// The segments of this module, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        return self.0.split('.');
    }

    /// The dotted text of this module.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    /// Relative source path for this module (`A.B.C` -> `A/B/C.<ext>`).
    pub fn to_relative_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.segments().collect();
        path.set_extension(extension);
        return path;
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

impl From<ModuleName> for String {
    fn from(name: ModuleName) -> Self {
        return name.0;
    }
}

impl TryFrom<String> for ModuleName {
    type Error = Error;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        return Self::parse(&name);
    }
}

/// Module segments follow identifier rules; `'` is allowed after the first char.
fn is_module_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    return (first.is_alphabetic() || first == '_')
        && chars.all(|c| return c.is_alphanumeric() || c == '_' || c == '\'');
}

/// A normalized symbol name: bare literal text from the token path, or
/// `Module.occurrence` from the semantic path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SymName(
    /// The name text.
    pub String,
);

impl SymName {
    /// `<module>.<occurrence>`, the semantic path's display form.
    pub fn qualified(module: &ModuleName, occurrence: &str) -> Self {
        return Self(format!("{module}.{occurrence}"));
    }

    /// The name text.
    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Display for SymName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

/// A location within a file. Lines and columns are one-based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    /// A textual range in the source file.
    /// Field order gives source order when sorting.
    Concrete {
        /// One-based line where the range starts.
        start_line: u32,
        /// One-based column where the range starts.
        start_col: u32,
        /// One-based line where the range ends.
        end_line: u32,
        /// One-based column where the range ends.
        end_col: u32,
    },
    /// No meaningful position (compiler-generated bindings). Carries the
    /// producer's explanation.
    Unhelpful(String),
}

impl Span {
    /// A concrete span from (line, col) to (line, col).
    pub const fn concrete(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        return Self::Concrete {
            start_line,
            start_col,
            end_line,
            end_col,
        };
    }

    /// The starting (line, column), if the span is concrete.
    pub const fn start(&self) -> Option<(u32, u32)> {
        return match self {
            Self::Concrete {
                start_line,
                start_col,
                ..
            } => Some((*start_line, *start_col)),
            Self::Unhelpful(_) => None,
        };
    }
}

/// How an occurrence refers to its name. Carried through loading but not
/// distinguished in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// The occurrence introduces the name.
    Binding,
    /// Appears in an export or import list.
    ImportExport,
    /// The occurrence refers to an existing binding.
    Use,
}

/// One textual occurrence of one symbol in one file of one package.
/// Many records may share a name; this layer does not deduplicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct LocatedSym {
    /// File containing the occurrence.
    pub file: PathBuf,
    /// Symbol name (qualified on the semantic path, literal on the token path).
    pub name: SymName,
    /// Package the file belongs to.
    pub package: Package,
    /// Where in the file the occurrence sits.
    pub span: Span,
}

impl LocatedSym {
    /// Stable SHA-256 key over every field, for index storage.
    /// Equal records always produce equal keys, across runs and platforms.
    pub fn index_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.package.name.as_bytes());
        hasher.update(b"\0");
        hasher.update(self.package.version.as_deref().unwrap_or("").as_bytes());
        hasher.update(b"\0");
        hasher.update(self.file.to_string_lossy().replace('\\', "/").as_bytes());
        hasher.update(b"\0");
        match &self.span {
            Span::Concrete {
                start_line,
                start_col,
                end_line,
                end_col,
            } => {
                for n in [start_line, start_col, end_line, end_col] {
                    hasher.update(n.to_be_bytes());
                }
            },
            Span::Unhelpful(reason) => {
                hasher.update(b"unhelpful:");
                hasher.update(reason.as_bytes());
            },
        }
        hasher.update(b"\0");
        hasher.update(self.name.as_str().as_bytes());
        return format!("{:x}", hasher.finalize());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_name_round_trips_through_path() {
        let module = ModuleName::parse("A.B.C").unwrap();
        let path = module.to_relative_path("rs");
        assert_eq!(path, PathBuf::from("A/B/C.rs"));
        assert_eq!(ModuleName::from_relative_path(&path).unwrap(), module);
    }

    #[test]
    fn module_name_rejects_empty_segment() {
        assert!(ModuleName::parse("A..B").is_err());
        assert!(ModuleName::parse("").is_err());
        assert!(ModuleName::parse("A.1B").is_err());
    }

    #[test]
    fn module_path_with_parent_dir_is_rejected() {
        assert!(ModuleName::from_relative_path(Path::new("../A.rs")).is_err());
    }

    #[test]
    fn qualified_name_joins_with_dot() {
        let module = ModuleName::parse("Data.Map").unwrap();
        assert_eq!(SymName::qualified(&module, "insert").as_str(), "Data.Map.insert");
    }

    #[test]
    fn index_key_distinguishes_spans() {
        let a = LocatedSym {
            file: PathBuf::from("src/A.rs"),
            name: SymName("A.foo".to_string()),
            package: Package::named("p"),
            span: Span::concrete(1, 1, 1, 4),
        };
        let mut b = a.clone();
        b.span = Span::concrete(2, 1, 2, 4);
        assert_eq!(a.index_key(), a.clone().index_key());
        assert_ne!(a.index_key(), b.index_key());
        assert_eq!(a.index_key().len(), 64);
    }

    #[test]
    fn span_serializes_tagged() {
        let json = serde_json::to_string(&Span::Unhelpful("generated".to_string())).unwrap();
        assert_eq!(json, r#"{"unhelpful":"generated"}"#);
    }
}
