//! Serialization formats for configuration documents.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

/// On-disk serialization of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Every format, in lookup order.
    pub const ALL: [DocumentFormat; 2] = [DocumentFormat::Json, DocumentFormat::Yaml];

    /// File extensions recognized for this format. The first one is used
    /// for new documents.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentFormat::Json => &["json"],
            DocumentFormat::Yaml => &["yml", "yaml"],
        }
    }

    /// Extension used when creating a document.
    pub fn preferred_extension(&self) -> &'static str {
        self.extensions()[0]
    }

    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }

    /// Parse document text.
    pub fn parse(&self, content: &str) -> Result<Value, String> {
        match self {
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Yaml => {
                // An empty YAML file deserializes to null; treat it as an empty document.
                let value: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
                Ok(if value.is_null() {
                    Value::Object(Default::default())
                } else {
                    value
                })
            }
        }
    }

    /// Serialize a document, with a trailing newline.
    pub fn render(&self, document: &Value) -> Result<String, String> {
        match self {
            DocumentFormat::Json => serde_json::to_string_pretty(document)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| e.to_string()),
            DocumentFormat::Yaml => serde_yaml::to_string(document).map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => write!(f, "JSON"),
            DocumentFormat::Yaml => write!(f, "YAML"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            _ => Err(format!(
                "invalid document format '{}'; expected 'json' or 'yaml'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/testing.json")),
            Some(DocumentFormat::Json)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("testing.YML")),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("testing.yaml")),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("testing.toml")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("testing")), None);
    }

    #[test]
    fn test_yaml_and_json_parse_to_same_value() {
        let yaml = "root: /src\ngen:\n  args:\n    - is_debug = false\n  out: Debug\n";
        let json_text = r#"{"root": "/src", "gen": {"args": ["is_debug = false"], "out": "Debug"}}"#;

        let a = DocumentFormat::Yaml.parse(yaml).unwrap();
        let b = DocumentFormat::Json.parse(json_text).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_yaml_is_empty_object() {
        assert_eq!(DocumentFormat::Yaml.parse("").unwrap(), json!({}));
    }

    #[test]
    fn test_render_reparses() {
        let doc = json!({ "root": "/src", "env": { "A": "1" } });
        for format in DocumentFormat::ALL {
            let text = format.render(&doc).unwrap();
            assert!(text.ends_with('\n'));
            assert_eq!(format.parse(&text).unwrap(), doc);
        }
    }

    #[test]
    fn test_parse_error() {
        assert!(DocumentFormat::Json.parse("{ nope").is_err());
        assert!("toml".parse::<DocumentFormat>().is_err());
    }
}
