//! Integration tests for the feature graph and value coercion over the bundled
//! default geometry.

use feature_geometry::{FeatureGraph, FeatureSpec, FeatureType, Value};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn legal_values(kind: FeatureType) -> Vec<Option<Value>> {
    match kind {
        FeatureType::Privative => vec![None, Some(Value::Int(1)), Some(Value::Int(0))],
        FeatureType::Binary => vec![
            None,
            Some(Value::Int(1)),
            Some(Value::Int(0)),
            Some(Value::from("+")),
            Some(Value::from("-")),
        ],
        FeatureType::Scalar => vec![None, Some(Value::Int(3)), Some(Value::from("H")), Some(Value::Int(0))],
        FeatureType::Node => vec![None],
    }
}

fn round_trip(g: &FeatureGraph, name: &str, v: Option<&Value>) -> Option<Value> {
    let internal = g.number_form(name, v).unwrap();
    let text = g.text_form(name, internal.as_ref()).unwrap();
    g.number_form(name, Some(&Value::Text(text))).unwrap()
}

// ── Coercion ─────────────────────────────────────────────────────────────────

#[test]
fn test_round_trip_is_stable_for_every_default_feature() {
    let g = FeatureGraph::with_defaults();
    for name in g.feature_names() {
        let kind = g.feature_type(&name).unwrap();
        if kind.is_node() {
            continue;
        }
        for v in legal_values(kind) {
            let once = round_trip(&g, &name, v.as_ref());
            let twice = round_trip(&g, &name, once.as_ref());
            assert_eq!(once, twice, "{name} ({kind}) from {v:?}");
        }
    }
}

#[test]
fn test_undefined_sentinel_for_every_feature() {
    let g = FeatureGraph::with_defaults();
    for name in g.feature_names() {
        assert_eq!(g.text_form(&name, None).unwrap(), "*", "{name}");
        assert_eq!(g.number_form(&name, Some(&Value::from("*"))).unwrap(), None, "{name}");
    }
}

#[test]
fn test_coercion_on_unknown_feature_fails() {
    let g = FeatureGraph::with_defaults();
    assert_eq!(g.number_form("click", None).unwrap_err().kind(), "undefined_feature");
    assert_eq!(g.text_form("click", None).unwrap_err().kind(), "undefined_feature");
}

// ── Hierarchy ────────────────────────────────────────────────────────────────

#[test]
fn test_parent_child_consistency_over_defaults() {
    let g = FeatureGraph::with_defaults();
    let names = g.feature_names();
    for p in &names {
        for c in &names {
            let listed = g.children(p).unwrap().iter().any(|x| x == c);
            let parent = g.parents(c).unwrap().contains(p);
            assert_eq!(listed, parent, "{p} -> {c}");
        }
    }
}

#[test]
fn test_default_geometry_shape() {
    let g = FeatureGraph::with_defaults();
    assert_eq!(g.children("Coronal").unwrap(), ["anterior", "distributed"]);
    assert_eq!(g.parents("Place").unwrap(), ["ROOT"]);
    assert_eq!(g.terminals("Laryngeal").unwrap(), ["spread", "constricted", "voice"]);
    assert!(g.descendants("ROOT").unwrap().contains(&"round".to_string()));
}

#[test]
fn test_add_child_rejections_leave_structure_unchanged() {
    let mut g = FeatureGraph::with_defaults();
    let before = g.to_definition_text();

    assert_eq!(g.add_child("Coronal", "anterior").unwrap_err().kind(), "validation");
    assert_eq!(g.add_child("voice", "round").unwrap_err().kind(), "type_mismatch");
    assert_eq!(g.add_child("Coronal", "click").unwrap_err().kind(), "undefined_feature");
    assert_eq!(g.add_child("Velar", "high").unwrap_err().kind(), "undefined_feature");

    assert_eq!(g.to_definition_text(), before);
}

#[test]
fn test_multi_child_helpers_report_partial_failures() {
    let mut g = FeatureGraph::with_defaults();
    g.add_feature([("laminal", FeatureSpec::new("privative"))]);

    let report = g.add_children("Coronal", ["laminal", "anterior", "click"]);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(g.children("Coronal").unwrap(), ["anterior", "distributed", "laminal"]);

    let report = g.drop_children("Coronal", ["laminal", "distributed"]);
    assert!(report.is_clean());
    assert_eq!(g.children("Coronal").unwrap(), ["anterior"]);
}

#[test]
fn test_batch_returns_every_name_after_partial_success() {
    let mut g = FeatureGraph::with_defaults();
    let before = g.len();
    let report = g.add_feature([
        ("click", FeatureSpec::new("Privative").with_parents(["ROOT"])),
        ("bogus", FeatureSpec::new("")),
        ("ejective", FeatureSpec::new("privative").with_parents(["Nowhere"])),
    ]);
    assert_eq!(report.features.len(), before + 2);
    assert!(report.features.contains(&"click".to_string()));
    assert!(report.features.contains(&"ejective".to_string()));
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(g.parents("click").unwrap(), ["ROOT"]);
    assert!(g.parents("ejective").unwrap().is_empty());
}

#[test]
fn test_drop_then_redefine() {
    let mut g = FeatureGraph::with_defaults();
    let report = g.drop_feature(["round", "nonexistent"]);
    assert_eq!(report.skipped.len(), 1);
    assert!(g.feature("round").is_err());
    assert_eq!(g.children("Labial").unwrap(), ["round"], "dangling entry is kept");
    assert!(g.terminals("Labial").unwrap().is_empty());

    g.add_feature([("round", FeatureSpec::new("binary"))]);
    assert_eq!(g.terminals("Labial").unwrap(), ["round"]);
    assert_eq!(g.parents("round").unwrap(), ["Labial"]);
}

#[test]
fn test_type_getter_and_setter() {
    let mut g = FeatureGraph::with_defaults();
    assert_eq!(g.feature_type("tone").unwrap(), FeatureType::Scalar);
    g.set_feature_type("tone", "Binary").unwrap();
    assert_eq!(g.feature_type("tone").unwrap(), FeatureType::Binary);
    assert_eq!(g.set_feature_type("tone", "contour").unwrap_err().kind(), "validation");
    assert_eq!(g.set_feature_type("click", "binary").unwrap_err().kind(), "undefined_feature");
}
