//! The compiler front-end boundary and its tree-sitter implementation.

use std::path::{Path, PathBuf};

use tree_sitter::Tree;

use crate::error::Error;
use crate::grammar;
use crate::interface::ModuleSummary;
use crate::lexer::{self, Token};
use crate::outline;
use crate::types::ModuleName;

/// A front-end session: configured with flags, pointed at one module,
/// loaded, then queried. Failures are opaque to callers beyond the error.
pub trait FrontEnd {
    /// Load the targeted module and whatever it needs.
    ///
    /// # Errors
    ///
    /// Returns an error if no target is set or the module cannot be loaded.
    fn load(&mut self) -> Result<(), Error>;

    /// Apply session flags, replacing any set earlier.
    ///
    /// # Errors
    ///
    /// Returns an error if the flags are unusable.
    fn set_flags(&mut self, flags: &[String]) -> Result<(), Error>;

    /// Target `module` under `component_root`. Discards any loaded module.
    fn set_target(&mut self, component_root: &Path, module: &ModuleName);

    /// Extension of module source files for this session.
    fn source_extension(&self) -> &str;

    /// Interface summary of the loaded module.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is loaded or the language has no summary support.
    fn summary(&self) -> Result<ModuleSummary, Error>;

    /// Token stream of the loaded module.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is loaded.
    fn tokens(&self) -> Result<Vec<Token>, Error>;
}

/// A parsed module held by the tree-sitter front-end.
#[derive(Debug)]
struct LoadedModule {
    /// Source file extension, selecting the summary rules.
    ext: String,
    /// Module name that was targeted.
    module: ModuleName,
    /// Full source text.
    source: String,
    /// Parse tree of `source`.
    tree: Tree,
}

/// Front-end backed by tree-sitter grammars.
///
/// Flags: `-i<dir>` adds a search directory tried after the component root
/// (a bare `-i` clears the list), `-x<ext>` sets the source extension.
/// Other flags are ignored.
#[derive(Debug)]
pub struct TreeSitterFrontEnd {
    /// Default extension, restored whenever flags are reset.
    default_extension: String,
    /// Current module, once `load` has succeeded.
    loaded: Option<LoadedModule>,
    /// Extra directories to look for module files in.
    search_dirs: Vec<PathBuf>,
    /// Extension in effect for this session.
    source_extension: String,
    /// Component root and module to load.
    target: Option<(PathBuf, ModuleName)>,
}

impl TreeSitterFrontEnd {
    /// A session whose modules are `<name>.<source_extension>` files.
    pub fn new(source_extension: &str) -> Self {
        return Self {
            default_extension: source_extension.to_string(),
            loaded: None,
            search_dirs: Vec::new(),
            source_extension: source_extension.to_string(),
            target: None,
        };
    }

    /// The loaded module, or an error naming the missing step.
    ///
    /// # Errors
    ///
    /// Returns `Error::FrontEnd` if `load` has not succeeded.
    fn loaded(&self) -> Result<&LoadedModule, Error> {
        return self.loaded.as_ref().ok_or_else(|| return Error::FrontEnd {
            reason: "no module loaded".to_string(),
        });
    }
}

impl FrontEnd for TreeSitterFrontEnd {
    fn load(&mut self) -> Result<(), Error> {
        let Some((component_root, module)) = &self.target else {
            return Err(Error::FrontEnd {
                reason: "no target module set".to_string(),
            });
        };

        let relative = module.to_relative_path(&self.source_extension);
        let searched: Vec<PathBuf> = std::iter::once(component_root)
            .chain(self.search_dirs.iter())
            .map(|dir| return dir.join(&relative))
            .collect();
        let Some(file) = searched.iter().find(|candidate| return candidate.is_file()).cloned() else {
            return Err(Error::ModuleNotFound {
                module: module.to_string(),
                searched,
            });
        };

        tracing::debug!("loading {module} from {}", file.display());
        let source = std::fs::read_to_string(&file)?;
        let language = grammar::language_for_path(&file)?;
        let tree = grammar::parse_source(&file, &source, &language)?;

        self.loaded = Some(LoadedModule {
            ext: self.source_extension.clone(),
            module: module.clone(),
            source,
            tree,
        });
        return Ok(());
    }

    fn set_flags(&mut self, flags: &[String]) -> Result<(), Error> {
        self.search_dirs.clear();
        self.source_extension.clone_from(&self.default_extension);

        for flag in flags {
            if let Some(dir) = flag.strip_prefix("-i") {
                if dir.is_empty() {
                    self.search_dirs.clear();
                } else {
                    self.search_dirs.extend(std::env::split_paths(dir));
                }
            } else if let Some(ext) = flag.strip_prefix("-x") {
                if ext.is_empty() {
                    return Err(Error::FrontEnd {
                        reason: "-x requires an extension".to_string(),
                    });
                }
                self.source_extension = ext.trim_start_matches('.').to_string();
            } else {
                tracing::debug!("ignoring front-end flag `{flag}`");
            }
        }
        return Ok(());
    }

    fn set_target(&mut self, component_root: &Path, module: &ModuleName) {
        self.loaded = None;
        self.target = Some((component_root.to_path_buf(), module.clone()));
    }

    fn source_extension(&self) -> &str {
        return &self.source_extension;
    }

    fn summary(&self) -> Result<ModuleSummary, Error> {
        let loaded = self.loaded()?;
        return outline::summarize(&loaded.module, loaded.tree.root_node(), &loaded.source, &loaded.ext);
    }

    fn tokens(&self) -> Result<Vec<Token>, Error> {
        let loaded = self.loaded()?;
        return Ok(lexer::lex(loaded.tree.root_node(), &loaded.source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write `source` to `root/rel`, creating directories.
    fn write(root: &Path, rel: &str, source: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, source).unwrap();
    }

    #[test]
    fn loads_from_component_root() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a/b.rs", "pub fn f() {}\n");

        let mut fe = TreeSitterFrontEnd::new("rs");
        fe.set_target(&dir.path().join("src"), &ModuleName::parse("a.b").unwrap());
        fe.load().unwrap();
        assert!(!fe.tokens().unwrap().is_empty());
    }

    #[test]
    fn search_dir_flag_is_used() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lib/m.py", "x = 1\n");

        let mut fe = TreeSitterFrontEnd::new("rs");
        let flags = vec![format!("-i{}", dir.path().join("lib").display()), "-xpy".to_string(), "-O2".to_string()];
        fe.set_flags(&flags).unwrap();
        fe.set_target(&dir.path().join("src"), &ModuleName::parse("m").unwrap());
        fe.load().unwrap();
        assert_eq!(fe.source_extension(), "py");
    }

    #[test]
    fn missing_module_lists_searched_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut fe = TreeSitterFrontEnd::new("rs");
        fe.set_target(dir.path(), &ModuleName::parse("Nope").unwrap());
        let err = fe.load().unwrap_err();
        assert!(matches!(err, Error::ModuleNotFound { searched, .. } if searched.len() == 1));
    }

    #[test]
    fn queries_before_load_fail() {
        let fe = TreeSitterFrontEnd::new("rs");
        assert!(matches!(fe.tokens(), Err(Error::FrontEnd { .. })));
    }
}
