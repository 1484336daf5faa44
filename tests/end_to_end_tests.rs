use std::fs;
use std::sync::Arc;
use tailwind_class_validator::{
    CatalogueOption, CatalogueSettings, Engine, ExpressionNode, ExtractMode, MessageKind,
    ValidatorConfig,
};
use tempfile::tempdir;

fn write(root: &std::path::Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_end_to_end_project_validation() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();

    write(root, "src/styles/components.scss", r#"
        // Card component
        .card {
            padding: 1rem;
            &__title { font-weight: bold; }
        }
    "#);
    write(root, "src/styles/legacy.css", ".legacy-grid { display: grid; }");
    write(root, "node_modules/lib/vendor.css", ".vendor-only {}");
    write(root, "design.yaml", r##"
safelist: ["prose"]
theme:
  extend:
    colors:
      brand: "#0066cc"
variants: ["hocus"]
layers: ["src/layers.css"]
"##);
    write(root, "src/layers.css", "@layer components { .btn-primary { color: blue; } }");

    let config = ValidatorConfig {
        stylesheets: vec!["src/**/*.scss".to_string(), "**/*.css".to_string()],
        catalogue: CatalogueOption::Settings(CatalogueSettings {
            config_path: Some("design.yaml".into()),
            include_generated_classes: true,
        }),
        allowlist: vec!["js-*".to_string()],
        blocklist: vec!["float-left".to_string()],
        ignore: vec!["ga-*".to_string()],
        cwd: root.to_path_buf(),
    };

    let engine = Engine::new();
    let registry = engine.registry(&config);
    assert!(registry.is_css_class("card__title"));
    assert!(registry.is_css_class("legacy-grid"));
    assert!(!registry.is_valid("vendor-only"));
    assert!(registry.is_tailwind_class("bg-brand"));
    assert!(registry.is_tailwind_class("btn-primary"));
    assert!(registry.is_valid("prose"));
    assert!(!registry.is_valid("float-left"));

    let diagnostics = engine.check_class_string(
        &config,
        "card hocus:bg-brand md:p-4 js-menu ga-track hover:legacy-grid float-left sm:hovr:flex w-[]",
        &(),
    );
    let summary: Vec<(MessageKind, &str, Option<&str>)> = diagnostics
        .iter()
        .map(|d| (d.kind, d.class_name.as_str(), d.variant.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (MessageKind::InvalidClassName, "legacy-grid", None),
            (MessageKind::InvalidClassName, "float-left", None),
            (MessageKind::InvalidVariant, "sm:hovr:flex", Some("hovr")),
            (MessageKind::InvalidClassName, "w-[]", None),
        ]
    );

    let again = engine.registry(&config);
    assert!(Arc::ptr_eq(&registry, &again));
}

#[test]
fn test_end_to_end_expression_modes() {
    let temp_dir = tempdir().unwrap();
    let config = ValidatorConfig {
        catalogue: CatalogueOption::Enabled(true),
        cwd: temp_dir.path().to_path_buf(),
        ..ValidatorConfig::default()
    };
    let engine = Engine::new();

    let node: ExpressionNode = serde_json::from_str(
        r#"{
            "type": "ObjectLit",
            "properties": [
                {"type": "Property",
                 "key": {"type": "Identifier", "name": "root"},
                 "value": {"type": "Literal", "value": "flex bogus-root"},
                 "computed": false, "shorthand": false},
                {"type": "Property",
                 "key": {"type": "Literal", "value": "label"},
                 "value": {"type": "TemplateLiteral",
                           "quasis": [{"cooked": "text-sm", "raw": "text-sm"}],
                           "expressions": []},
                 "computed": false, "shorthand": false},
                {"type": "Spread", "argument": {"type": "Identifier", "name": "rest"}}
            ]
        }"#,
    )
    .unwrap();

    let by_values = engine.check_expression(&config, &node, ExtractMode::Values, &());
    let names: Vec<_> = by_values.iter().map(|d| d.class_name.as_str()).collect();
    assert_eq!(names, vec!["bogus-root"]);

    let by_keys = engine.check_expression(&config, &node, ExtractMode::Keys, &());
    let names: Vec<_> = by_keys.iter().map(|d| d.class_name.as_str()).collect();
    assert_eq!(names, vec!["root", "label"]);
}

#[test]
fn test_end_to_end_without_any_source() {
    let temp_dir = tempdir().unwrap();
    let config = ValidatorConfig {
        allowlist: vec!["custom-*".to_string()],
        cwd: temp_dir.path().to_path_buf(),
        ..ValidatorConfig::default()
    };
    let engine = Engine::new();

    let diagnostics = engine.check_class_string(&config, "custom-button other", &());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].class_name, "other");
    assert!(engine.registry(&config).all_classes().is_empty());
}
