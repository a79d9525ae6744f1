//! Front-end orchestration for one package: working directory, build flags,
//! module loading, and the extraction entry points built on them.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::build_meta::{self, BuildMetadata, DistDirMetadata};
use crate::collector;
use crate::config::Config;
use crate::error::Error;
use crate::frontend::{FrontEnd, TreeSitterFrontEnd};
use crate::interface;
use crate::legacy;
use crate::strategy::ExtractionStrategy;
use crate::types::{LocatedSym, ModuleName, Package, SymName};

/// The working directory is process-wide; one batch at a time.
static BATCH_LOCK: Mutex<()> = Mutex::new(());

/// Best-effort diagnostics sink. Never consulted for control flow.
pub trait ErrorLog {
    /// Record an error that extraction recovered from.
    fn log_error(&self, message: &str);
}

/// Sends diagnostics to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorLog;

impl ErrorLog for TracingErrorLog {
    fn log_error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// One module of one package: where the package lives, which component
/// root its modules resolve against, and the module itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTarget {
    /// Root of the component, relative to `package_root` or absolute.
    pub component_root: PathBuf,
    /// Module to extract from.
    pub module: ModuleName,
    /// Package root: build metadata location and working directory.
    pub package_root: PathBuf,
}

/// Restores the previous working directory when dropped.
struct WorkingDirGuard {
    /// Directory to return to.
    previous: PathBuf,
}

impl WorkingDirGuard {
    /// Change into `dir`, remembering where we were.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the current directory can't be read or `dir` entered.
    fn enter(dir: &Path) -> Result<Self, Error> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        return Ok(Self { previous });
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::error!("could not restore working directory {}: {e}", self.previous.display());
        }
    }
}

/// Drives a front-end session per module and exposes the extraction entry
/// points over a [`ModuleTarget`].
pub struct Environment<F: FrontEnd = TreeSitterFrontEnd> {
    /// Package configuration.
    config: Config,
    /// Session used for every module.
    front_end: F,
    /// Where recovered failures are reported.
    log: Box<dyn ErrorLog>,
    /// Source of component flags.
    metadata: Box<dyn BuildMetadata>,
}

impl Environment<TreeSitterFrontEnd> {
    /// Tree-sitter front-end, `components.toml` metadata, `tracing` errors.
    pub fn new(config: Config) -> Self {
        let front_end = TreeSitterFrontEnd::new(&config.source_extension);
        return Self::with_parts(config, front_end, Box::new(DistDirMetadata), Box::new(TracingErrorLog));
    }

    /// [`Environment::new`] with the configuration found in `package_root`.
    ///
    /// # Errors
    ///
    /// Returns errors from [`Config::load`].
    pub fn for_package(package_root: &Path) -> Result<Self, Error> {
        return Ok(Self::new(Config::load(package_root)?));
    }
}

impl<F: FrontEnd> Environment<F> {
    /// Assemble an environment from its collaborators.
    pub fn with_parts(
        config: Config,
        front_end: F,
        metadata: Box<dyn BuildMetadata>,
        log: Box<dyn ErrorLog>,
    ) -> Self {
        return Self {
            config,
            front_end,
            log,
            metadata,
        };
    }

    /// The configuration in effect.
    pub const fn config(&self) -> &Config {
        return &self.config;
    }

    /// Load `target` and run `action` against the loaded session.
    ///
    /// The working directory is the package root for the duration and is
    /// restored afterwards, whether or not `action` succeeds. Build-flag
    /// discovery failures are logged and extraction continues without flags.
    ///
    /// # Errors
    ///
    /// Returns errors from entering the package root, from the front-end, or
    /// from `action`.
    pub fn with_module<T>(
        &mut self,
        target: &ModuleTarget,
        action: impl FnOnce(&F) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let _batch = BATCH_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let package_root = std::path::absolute(&target.package_root)?;
        let _cwd = WorkingDirGuard::enter(&package_root)?;

        let flags = self.discover_flags(&package_root);
        self.front_end.set_flags(&flags)?;
        self.front_end.set_target(&target.component_root, &target.module);
        self.front_end.load()?;

        return action(&self.front_end);
    }

    /// Located identifier tokens of the target module (lexical extraction).
    ///
    /// # Errors
    ///
    /// Returns front-end errors, or `Error::InternalInvariant` if the lexer
    /// and the identifier filter disagree.
    pub fn symbols(&mut self, package: &Package, target: &ModuleTarget) -> Result<Vec<LocatedSym>, Error> {
        return self.with_module(target, |front_end| {
            let tokens = front_end.tokens()?;
            return legacy::extract_from_tokens(
                package,
                &target.component_root,
                &target.module,
                front_end.source_extension(),
                &tokens,
            );
        });
    }

    /// Modules the target imports, as declared.
    ///
    /// # Errors
    ///
    /// Returns front-end errors, including unsupported-language summaries.
    pub fn imports(&mut self, target: &ModuleTarget) -> Result<Vec<ModuleName>, Error> {
        return self.with_module(target, |front_end| return Ok(interface::imports(&front_end.summary()?)));
    }

    /// Names the target exports, heads only.
    ///
    /// # Errors
    ///
    /// Returns front-end errors, including unsupported-language summaries.
    pub fn exports(&mut self, target: &ModuleTarget) -> Result<Vec<SymName>, Error> {
        return self.with_module(target, |front_end| return Ok(interface::exports(&front_end.summary()?)));
    }

    /// Every resolved occurrence in the package's semantic artifacts.
    ///
    /// # Errors
    ///
    /// Returns the first artifact read failure.
    pub fn artifact_symbols(&self, package: &Package, artifact_root: &Path) -> Result<Vec<LocatedSym>, Error> {
        return collector::collect_package(package, artifact_root, &self.config.artifact_extension);
    }

    /// Symbols of the target module using the given strategy.
    ///
    /// A semantic strategy falls back to token extraction for a module that
    /// has no artifact of its own.
    ///
    /// # Errors
    ///
    /// Returns errors from [`Environment::symbols`] or from artifact reading.
    pub fn extract(
        &mut self,
        package: &Package,
        target: &ModuleTarget,
        strategy: &ExtractionStrategy,
    ) -> Result<Vec<LocatedSym>, Error> {
        let ExtractionStrategy::Semantic { artifact_root } = strategy else {
            return self.symbols(package, target);
        };
        let collected =
            collector::collect_module(package, artifact_root, &self.config.artifact_extension, &target.module)?;
        return match collected {
            Some(located) => Ok(located),
            None => {
                tracing::debug!("no artifact for {}, using token extraction", target.module);
                self.symbols(package, target)
            },
        };
    }

    /// Library flags for the package, or none if they can't be determined.
    fn discover_flags(&self, package_root: &Path) -> Vec<String> {
        let dist_dir = build_meta::guess_dist_dir(package_root, &self.config);
        return match self.metadata.component_flags(package_root, &dist_dir) {
            Ok(components) => build_meta::library_flags(&components, &self.config).unwrap_or_else(|| {
                tracing::debug!("no library component in {}", dist_dir.display());
                return Vec::new();
            }),
            Err(e) => {
                self.log.log_error(&format!("build flag discovery failed, continuing without flags: {e}"));
                Vec::new()
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Collects logged messages for inspection.
    #[derive(Clone, Default)]
    struct RecordingLog(Rc<RefCell<Vec<String>>>);

    impl ErrorLog for RecordingLog {
        fn log_error(&self, message: &str) {
            self.0.borrow_mut().push(message.to_string());
        }
    }

    /// Package root with `src/<rel>` holding `source`.
    fn package_with(rel: &str, source: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src").join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, source).unwrap();
        dir
    }

    /// Target module `module` under `src` of `root`.
    fn target(root: &Path, module: &str) -> ModuleTarget {
        ModuleTarget {
            component_root: PathBuf::from("src"),
            module: ModuleName::parse(module).unwrap(),
            package_root: root.to_path_buf(),
        }
    }

    /// Environment with a recording log and default config.
    fn environment(log: &RecordingLog) -> Environment {
        Environment::with_parts(
            Config::default(),
            TreeSitterFrontEnd::new("rs"),
            Box::new(DistDirMetadata),
            Box::new(log.clone()),
        )
    }

    #[test]
    fn missing_build_metadata_is_logged_not_fatal() {
        let dir = package_with("a/b.rs", "fn main() { let total = helper(); }\n");
        let log = RecordingLog::default();
        let mut env = environment(&log);

        let located = env.symbols(&Package::named("P"), &target(dir.path(), "a.b")).unwrap();
        let names: Vec<&str> = located.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["main", "total", "helper"]);
        assert!(located.iter().all(|l| l.file == Path::new("src/a/b.rs")));
        assert_eq!(log.0.borrow().len(), 1);
    }

    /// Current directory while no batch is running.
    fn settled_dir() -> PathBuf {
        let _batch = BATCH_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        std::env::current_dir().unwrap()
    }

    #[test]
    fn working_directory_restored_after_failure() {
        let dir = package_with("a.rs", "fn a() {}\n");
        let root = dir.path().canonicalize().unwrap();
        let mut env = environment(&RecordingLog::default());
        let before = settled_dir();

        let result: Result<(), Error> = env.with_module(&target(dir.path(), "a"), |_| {
            assert_eq!(std::env::current_dir().unwrap(), root);
            return Err(Error::FrontEnd {
                reason: "boom".to_string(),
            });
        });
        assert!(matches!(result, Err(Error::FrontEnd { .. })));
        assert_eq!(settled_dir(), before);
    }

    #[test]
    fn modules_without_artifacts_use_tokens() {
        let dir = package_with("a.rs", "fn run() {}\n");
        std::fs::write(dir.path().join("src/b.rs"), "fn walk(step: u8) {}\n").unwrap();
        let artifacts = dir.path().join("artifacts");
        std::fs::create_dir_all(&artifacts).unwrap();
        std::fs::write(
            artifacts.join("a.sema"),
            r#"{ "version": 1, "module": "a", "source_file": "src/a.rs",
                 "names": [ { "module": "a", "occurrence": "run" } ],
                 "occurrences": [ { "identifier": { "resolved": 0 },
                   "spans": [ { "span": { "concrete": { "start_line": 1, "start_col": 4, "end_line": 1, "end_col": 7 } }, "kind": "binding" } ] } ] }"#,
        )
        .unwrap();

        let package = Package::named("P");
        let strategy = ExtractionStrategy::choose(&artifacts, "sema");
        let mut env = environment(&RecordingLog::default());

        let a = env.extract(&package, &target(dir.path(), "a"), &strategy).unwrap();
        let a: Vec<&str> = a.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(a, vec!["a.run"]);

        let b = env.extract(&package, &target(dir.path(), "b"), &strategy).unwrap();
        let b: Vec<&str> = b.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(b, vec!["walk", "step"]);
    }

    #[test]
    fn library_flags_reach_the_front_end() {
        let dir = package_with("unused.rs", "");
        std::fs::create_dir_all(dir.path().join("vendor")).unwrap();
        std::fs::write(dir.path().join("vendor/extra.rs"), "pub fn shared() {}\n").unwrap();
        std::fs::create_dir_all(dir.path().join("dist/build/default")).unwrap();
        std::fs::write(
            dir.path().join("dist/build/default/components.toml"),
            "[[component]]\nname = \"lib\"\nkind = \"library\"\nflags = [\"-ivendor\"]\n",
        )
        .unwrap();
        let log = RecordingLog::default();
        let mut env = environment(&log);

        let exports = env.exports(&target(dir.path(), "extra")).unwrap();
        assert_eq!(exports, vec![SymName("shared".to_string())]);
        assert!(log.0.borrow().is_empty());
    }

    #[test]
    fn missing_module_propagates() {
        let dir = package_with("a.rs", "");
        let mut env = environment(&RecordingLog::default());
        let err = env.imports(&target(dir.path(), "nope")).unwrap_err();
        assert!(matches!(err, Error::ModuleNotFound { .. }));
    }
}
