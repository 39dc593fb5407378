//! Line-oriented definition sources and bundled defaults.
//!
//! # Grammar
//!
//! ```text
//! # comment
//! Coronal<TAB>node<TAB>anterior distributed
//! anterior<TAB>binary
//! distributed<TAB>binary
//! ```
//!
//! One feature per line: name, type (case-insensitive), then optional
//! space-separated children, with fields separated by one or more tabs.
//! Loading is two-pass, so a line may list children defined further down.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{FeatureError, FeatureResult};
use crate::graph::{BatchReport, FeatureGraph};

/// The bundled default feature geometry, in the definition grammar.
pub const DEFAULT_FEATURES: &str = include_str!("../data/features.txt");

/// Supplies bundled definition sources by logical name (e.g. `"features"`).
pub trait ResourceLoader {
    /// Source text for `suffix`, if bundled.
    fn source(&self, suffix: &str) -> Option<&str>;
}

/// Loader over the sources compiled into this crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct BundledDefaults;

impl ResourceLoader for BundledDefaults {
    fn source(&self, suffix: &str) -> Option<&str> {
        match suffix {
            "features" => Some(DEFAULT_FEATURES),
            _ => None,
        }
    }
}

struct Line<'a> {
    name: &'a str,
    kind: &'a str,
    children: Vec<&'a str>,
}

fn parse_line(line: &str) -> Option<FeatureResult<Line<'_>>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let mut fields = line.split('\t').map(str::trim).filter(|f| !f.is_empty());
    let (Some(name), Some(kind)) = (fields.next(), fields.next()) else {
        return Some(Err(FeatureError::validation(trimmed, "expected '<name>\\t<type>[\\t<children>]'")));
    };
    let children = fields.flat_map(str::split_whitespace).collect();
    Some(Ok(Line { name, kind, children }))
}

impl FeatureGraph {
    /// Graph preloaded with [`DEFAULT_FEATURES`].
    pub fn with_defaults() -> Self {
        let mut graph = Self::new();
        graph.load_str(DEFAULT_FEATURES);
        graph
    }

    /// Load definitions from source text.
    ///
    /// Pass one defines every well-formed line's feature; pass two attaches
    /// children. Malformed lines, bad types, and bad edges are skipped and
    /// reported. Edges the graph already holds are left alone, so reloading a
    /// source is idempotent.
    pub fn load_str(&mut self, source: &str) -> BatchReport {
        let mut skipped = Vec::new();
        let mut defined = Vec::new();
        for parsed in source.lines().filter_map(parse_line) {
            let line = match parsed {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping definition line");
                    skipped.push(err);
                    continue;
                }
            };
            match self.define(line.name, Some(line.kind), false) {
                Ok(()) => defined.push(line),
                Err(err) => {
                    tracing::warn!(feature = line.name, error = %err, "skipping definition line");
                    skipped.push(err);
                }
            }
        }
        for line in &defined {
            for child in &line.children {
                if self.children(line.name).is_ok_and(|listed| listed.iter().any(|c| c == *child)) {
                    continue;
                }
                if let Err(err) = self.add_child(line.name, child) {
                    skipped.push(err);
                }
            }
        }
        tracing::debug!(defined = defined.len(), skipped = skipped.len(), "loaded feature definitions");
        self.report(skipped)
    }

    /// Load the `"features"` resource from `loader`.
    pub fn load_default(&mut self, loader: &dyn ResourceLoader) -> FeatureResult<BatchReport> {
        let source = loader
            .source("features")
            .ok_or_else(|| FeatureError::Unsupported("loader has no 'features' resource".into()))?;
        Ok(self.load_str(source))
    }

    /// Load definitions from a reader.
    #[cfg(feature = "std")]
    pub fn load_reader<R: std::io::Read>(&mut self, mut reader: R) -> std::io::Result<BatchReport> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(self.load_str(&source))
    }

    /// Load definitions from a file.
    #[cfg(feature = "std")]
    pub fn load_file(&mut self, path: impl AsRef<std::path::Path>) -> std::io::Result<BatchReport> {
        let file = std::fs::File::open(path)?;
        self.load_reader(std::io::BufReader::new(file))
    }

    /// Render every definition in the load grammar, one line per feature, sorted by name.
    pub fn to_definition_text(&self) -> String {
        let mut out = String::new();
        for name in self.feature_names() {
            let Ok(def) = self.feature(&name) else { continue };
            out.push_str(&name);
            out.push('\t');
            out.push_str(def.feature_type().as_str());
            if !def.children().is_empty() {
                out.push('\t');
                out.push_str(&def.children().join(" "));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureType;

    #[test]
    fn test_children_may_precede_their_definitions() {
        let mut g = FeatureGraph::new();
        let report = g.load_str("Coronal\tnode\tanterior distributed\nanterior\tbinary\ndistributed\tbinary\n");
        assert!(report.is_clean(), "{:?}", report.skipped);
        assert_eq!(g.children("Coronal").unwrap(), ["anterior", "distributed"]);
    }

    #[test]
    fn test_comments_blank_lines_and_multiple_tabs() {
        let mut g = FeatureGraph::new();
        let report = g.load_str("  # header\n\nvoice\t\t\tPRIVATIVE\n   \nLaryngeal\t\tnode\t\tvoice\n");
        assert!(report.is_clean());
        assert_eq!(g.feature_type("voice").unwrap(), FeatureType::Privative);
        assert_eq!(g.children("Laryngeal").unwrap(), ["voice"]);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let mut g = FeatureGraph::new();
        let report = g.load_str("lonely\nhigh\tbinary\nodd\tquaternary\nX\tnode\tmissing\n");
        assert_eq!(report.features, ["X", "high"]);
        let kinds: Vec<&str> = report.skipped.iter().map(FeatureError::kind).collect();
        assert_eq!(kinds, ["validation", "validation", "undefined_feature"]);
    }

    #[test]
    fn test_defaults_load_cleanly() {
        let mut g = FeatureGraph::new();
        let report = g.load_default(&BundledDefaults).unwrap();
        assert!(report.is_clean(), "{:?}", report.skipped);
        assert!(g.contains("BOUNDARY"));
        assert_eq!(g.parents("Coronal").unwrap(), ["Place"]);
        assert_eq!(g.feature_type("tone").unwrap(), FeatureType::Scalar);
    }

    #[test]
    fn test_reloading_a_source_is_idempotent() {
        let mut g = FeatureGraph::with_defaults();
        let before = g.to_definition_text();
        let report = g.load_str(DEFAULT_FEATURES);
        assert!(report.is_clean(), "{:?}", report.skipped);
        assert_eq!(g.to_definition_text(), before);
        assert_eq!(g.children("Coronal").unwrap(), ["anterior", "distributed"]);
    }

    #[test]
    fn test_unknown_resource() {
        struct Empty;
        impl ResourceLoader for Empty {
            fn source(&self, _suffix: &str) -> Option<&str> {
                None
            }
        }
        let mut g = FeatureGraph::new();
        assert_eq!(g.load_default(&Empty).unwrap_err().kind(), "unsupported");
    }

    #[test]
    fn test_definition_text_reloads_to_same_graph() {
        let g = FeatureGraph::with_defaults();
        let text = g.to_definition_text();
        let mut h = FeatureGraph::new();
        assert!(h.load_str(&text).is_clean());
        assert_eq!(h.to_definition_text(), text);
        for name in g.feature_names() {
            assert_eq!(g.children(&name).unwrap(), h.children(&name).unwrap());
        }
    }
}
