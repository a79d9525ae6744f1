use std::path::{Path, PathBuf};

use symindex::{
    Environment, Error, ExtractionStrategy, LocatedSym, ModuleName, ModuleTarget, Package, Span, SymName,
    collect_package, discover_artifacts,
};

/// Absolute path of a fixture. Tests share one process whose working
/// directory the environment changes, so nothing here may be relative.
fn fixture(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(rel)
}

/// The `shapes.circle` module of the fixture package.
fn circle_target() -> ModuleTarget {
    ModuleTarget {
        component_root: PathBuf::from("src"),
        module: ModuleName::parse("shapes.circle").unwrap(),
        package_root: fixture("package"),
    }
}

#[test]
fn artifact_scenario_keeps_only_resolved_occurrence() {
    let package = Package::named("P");
    let located = collect_package(&package, &fixture("artifacts/A/B.sema"), "sema").unwrap();

    assert_eq!(
        located,
        vec![LocatedSym {
            file: PathBuf::from("src/A/B.rs"),
            name: SymName("A.B.foo".to_string()),
            package,
            span: Span::concrete(3, 5, 3, 8),
        }]
    );
}

#[test]
fn whole_package_merges_artifacts_in_discovery_order() {
    let located = collect_package(&Package::named("P"), &fixture("artifacts"), "sema").unwrap();
    let names: Vec<&str> = located.iter().map(|l| l.name.as_str()).collect();

    assert_eq!(names, vec!["A.B.foo", "Main.main", "A.B.foo", "A.B.foo"]);
    assert!(located.iter().any(|l| l.span == Span::Unhelpful("generated by derive".to_string())));
    for sym in &located {
        let (module, occurrence) = sym.name.as_str().rsplit_once('.').unwrap();
        assert!(!module.is_empty() && !occurrence.is_empty());
    }
}

#[test]
fn discovery_ignores_non_artifacts() {
    let found = discover_artifacts(&fixture("artifacts"), "sema");
    assert_eq!(found.len(), 2);
    assert_eq!(found, discover_artifacts(&fixture("artifacts"), "sema"));
}

#[test]
fn corrupt_artifact_fails_whole_package() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixture("artifacts/Main.sema"), dir.path().join("Main.sema")).unwrap();
    std::fs::write(dir.path().join("Z.sema"), r#"{ "version": 0 }"#).unwrap();

    let result = collect_package(&Package::named("P"), dir.path(), "sema");
    assert!(matches!(result, Err(Error::ArtifactVersion { found: 0, .. })));
}

#[test]
fn missing_artifact_root_is_empty_package() {
    let located = collect_package(&Package::named("P"), &fixture("no-such-dir"), "sema").unwrap();
    assert!(located.is_empty());
}

#[test]
fn lexical_symbols_for_module() {
    let mut env = Environment::for_package(&fixture("package")).unwrap();
    let located = env.symbols(&Package::named("shapes"), &circle_target()).unwrap();

    let names: Vec<&str> = located.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "crate::shapes",
            "radius",
            "center",
            "area",
            "circle",
            "r",
            "circle",
            "radius",
            "r",
            "r",
            "scale",
            "factor",
            "factor",
        ]
    );
    assert!(located.iter().all(|l| l.file == Path::new("src/shapes/circle.rs")));

    let area = located.iter().find(|l| l.name.as_str() == "area").unwrap();
    assert_eq!(area.span.start(), Some((15, 8)));
}

#[test]
fn imports_and_exports_for_module() {
    let mut env = Environment::for_package(&fixture("package")).unwrap();

    let imports: Vec<String> = env.imports(&circle_target()).unwrap().iter().map(ToString::to_string).collect();
    assert_eq!(imports, vec!["std.f64.consts", "crate.shapes"]);

    let exports = env.exports(&circle_target()).unwrap();
    let exports: Vec<&str> = exports.iter().map(SymName::as_str).collect();
    assert_eq!(exports, vec!["Circle", "Fill", "area"]);
}

#[test]
fn strategy_follows_artifact_availability() {
    let package = Package::named("P");
    let mut env = Environment::for_package(&fixture("package")).unwrap();
    let main = ModuleTarget {
        module: ModuleName::parse("Main").unwrap(),
        ..circle_target()
    };

    let semantic = ExtractionStrategy::choose(&fixture("artifacts"), "sema");
    let located = env.extract(&package, &main, &semantic).unwrap();
    assert_eq!(located.len(), 3);
    assert!(located.iter().all(|l| l.file == Path::new("src/Main.rs")));

    // No artifact was produced for `shapes.circle`, so its tokens are used.
    let fallback = env.extract(&package, &circle_target(), &semantic).unwrap();
    assert!(fallback.iter().any(|l| l.name.as_str() == "area"));
    assert!(fallback.iter().all(|l| l.file == Path::new("src/shapes/circle.rs")));

    let lexical = ExtractionStrategy::choose(&fixture("package/src"), "sema");
    assert_eq!(lexical, ExtractionStrategy::Lexical);
    assert!(!env.extract(&package, &circle_target(), &lexical).unwrap().is_empty());
}
