//! Integration tests for lgfallback
//!
//! These tests exercise discovery, grouping, loading and dispatch over real
//! resource directories.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lgfallback::{Catalog, CatalogOptions, LgError, LocalePolicy, NameParser, Render};
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create resource dir");
    }
    fs::write(path, content).expect("Failed to write resource");
}

fn greet_dir() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write(temp_dir.path(), "Greet.lg", "# Greeting\n- Hello {{name}}");
    write(temp_dir.path(), "Greet.fr.lg", "# Greeting\n- Salut {{name}}");
    write(temp_dir.path(), "Greet.fr-fr.lg", "# Greeting\n- Bonjour de France {{name}}");
    temp_dir
}

fn open(dir: &Path) -> Catalog {
    Catalog::open(dir, Arc::new(LocalePolicy::default()), CatalogOptions::default()).expect("Failed to open catalog")
}

// =============================================================================
// Discovery and grouping
// =============================================================================

#[test]
fn test_discovery_ignores_other_extensions() {
    let temp_dir = greet_dir();
    write(temp_dir.path(), "notes.txt", "ignored");
    write(temp_dir.path(), "nested/Other.LG", "# Other\n- other");

    let catalog = open(temp_dir.path());
    assert_eq!(
        catalog.resources(),
        ["Greet.fr-fr.lg", "Greet.fr.lg", "Greet.lg", "nested/Other.LG"]
    );
}

#[test]
fn test_first_sibling_region_collapses_under_language() {
    let temp_dir = greet_dir();
    let catalog = open(temp_dir.path());
    let buckets = catalog.buckets();

    assert_eq!(buckets.get("").unwrap(), ["Greet.lg"]);
    assert_eq!(buckets.get("fr").unwrap(), ["Greet.fr.lg"]);
    assert_eq!(buckets.get("fr-fr").unwrap(), ["Greet.fr-fr.lg"]);
    // fr-be was rekeyed to fr; fr-ca and fr-ch share fr as ancestor and stay
    assert!(!buckets.contains("fr-be"));
    assert_eq!(buckets.get("fr-ca").unwrap(), ["Greet.fr.lg"]);
    assert_eq!(buckets.get("fr-ch").unwrap(), ["Greet.fr.lg"]);
    assert!(!buckets.contains("en-us"));
}

#[test]
fn test_resolve_against_buckets() {
    let temp_dir = greet_dir();
    let catalog = open(temp_dir.path());

    assert_eq!(catalog.resolve("fr-FR").unwrap(), "fr-fr");
    assert_eq!(catalog.resolve("fr_CA").unwrap(), "fr-ca");
    assert_eq!(catalog.resolve("fr-BE").unwrap(), "fr");
    assert_eq!(catalog.resolve("de-de").unwrap(), "");
    assert_eq!(catalog.resolve("xx").unwrap(), "");
}

// =============================================================================
// Candidate dispatch
// =============================================================================

#[test]
fn test_candidate_dispatch_end_to_end() {
    let temp_dir = greet_dir();
    let catalog = open(temp_dir.path());
    let dispatcher = catalog.candidate_dispatcher("Greet.lg");
    let data = json!({"name": "Ada"});

    let rendered = dispatcher.render("Greeting", Some(&data), "fr-fr").unwrap();
    assert_eq!(rendered.text, "Bonjour de France Ada");
    assert_eq!(rendered.resource.as_deref(), Some("Greet.fr-fr.lg"));

    let rendered = dispatcher.render("Greeting", Some(&data), "fr-ca").unwrap();
    assert_eq!(rendered.text, "Salut Ada");

    let rendered = dispatcher.render("Greeting", Some(&data), "en-us").unwrap();
    assert_eq!(rendered.text, "Hello Ada");
    assert_eq!(rendered.locale.as_deref(), Some(""));
}

#[test]
fn test_candidate_dispatch_falls_past_missing_template() {
    let temp_dir = greet_dir();
    write(temp_dir.path(), "Greet.lg", "# Greeting\n- Hello\n\n# Farewell\n- Goodbye");
    let catalog = open(temp_dir.path());

    let rendered = catalog
        .candidate_dispatcher("Greet.lg")
        .render("Farewell", None, "fr-fr")
        .unwrap();
    assert_eq!(rendered.text, "Goodbye");
    assert_eq!(rendered.diagnostics.len(), 2);
}

#[test]
fn test_candidate_dispatch_unknown_template() {
    let temp_dir = greet_dir();
    let catalog = open(temp_dir.path());
    let dispatcher = catalog.candidate_dispatcher("Greet.lg");

    let rendered = dispatcher.render("Nope", None, "fr-fr").unwrap();
    assert!(rendered.is_fallback());
    assert_eq!(rendered.text, "");

    let err = dispatcher.strict(true).render("Nope", None, "fr-fr").unwrap_err();
    assert!(matches!(err, LgError::TemplateEvaluation { .. }));
    assert_eq!(err.diagnostics().len(), 3);
}

// =============================================================================
// Imports and entry dispatch
// =============================================================================

#[test]
fn test_imports_resolve_per_locale() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dir = temp_dir.path();
    write(dir, "Main.lg", "[Common](Common.lg)\n# Welcome\n- {{> Hello}}, {{name}}!");
    write(dir, "Main.fr.lg", "[Common](Common.lg)\n# Welcome\n- {{> Hello}}, {{name}} !");
    write(dir, "Common.lg", "# Hello\n- Hello");
    write(dir, "Common.fr.lg", "# Hello\n- Bonjour");

    let catalog = open(dir);
    let dispatcher = catalog.entry_dispatcher("main");
    let data = json!({"name": "Ada"});

    assert_eq!(
        dispatcher.render("Welcome", Some(&data), "fr-ch").unwrap().text,
        "Bonjour, Ada !"
    );
    assert_eq!(dispatcher.render("Welcome", Some(&data), "ja-jp").unwrap().text, "Hello, Ada!");
}

#[test]
fn test_entry_dispatch_requires_reachable_entry() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write(temp_dir.path(), "Main.fr.lg", "# Welcome\n- Bienvenue");

    let catalog = open(temp_dir.path());
    let dispatcher = catalog.entry_dispatcher("Main");
    assert_eq!(dispatcher.render("Welcome", None, "fr-fr").unwrap().text, "Bienvenue");

    let result = dispatcher.render("Welcome", None, "en-us");
    assert!(matches!(result, Err(LgError::NoEntryForLocale { .. })));
}

#[test]
fn test_missing_import_fails_open() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write(temp_dir.path(), "Main.lg", "[Gone](Gone.lg)\n# Welcome\n- hi");

    let result = Catalog::open(temp_dir.path(), Arc::new(LocalePolicy::default()), CatalogOptions::default());
    assert!(matches!(result, Err(LgError::ImportNotFound { .. })));
}

#[test]
fn test_custom_extension_and_policy() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    write(temp_dir.path(), "Greet.hbs", "# Greeting\n- hi");
    write(temp_dir.path(), "Greet.pt.hbs", "# Greeting\n- olá");

    let policy = LocalePolicy::new([("", vec![""]), ("pt-br", vec!["pt-br", "pt"])]).unwrap();
    let options = CatalogOptions {
        parser: NameParser::new("hbs"),
        strict_templates: false,
    };
    let catalog = Catalog::open(temp_dir.path(), Arc::new(policy), options).unwrap();

    let locales: Vec<&str> = catalog.buckets().locales().collect();
    assert_eq!(locales, ["", "pt-br"]);
    let rendered = catalog
        .candidate_dispatcher("Greet.hbs")
        .render("Greeting", None, "pt-BR")
        .unwrap();
    assert_eq!(rendered.text, "olá");
}
