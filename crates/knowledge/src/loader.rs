//! Corpus loading: turn files on disk into documents.

use crate::record::{Metadata, MetadataValue};
use crate::types::Document;
use serde::Deserialize;
use sift_core::{AppError, AppResult};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Code,
    Json,
    PlainText,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("json") => Self::Json,
            Some("rs") | Some("py") | Some("js") | Some("ts") | Some("go") | Some("c")
            | Some("cpp") | Some("java") | Some("sh") | Some("yaml") | Some("yml")
            | Some("toml") => Self::Code,
            Some("txt") => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Code => "code",
            Self::Json => "json",
            Self::PlainText => "text",
            Self::Unknown => "unknown",
        }
    }
}

/// Source of documents for a knowledge base.
pub trait CorpusLoader {
    /// Load every document reachable from `source`.
    fn load(&self, source: &Path) -> AppResult<Vec<Document>>;
}

/// Loads documents from local files and directories.
///
/// Directories are walked recursively. `include` and `exclude` are substring
/// patterns on the path; excludes win, and a non-empty include list must
/// match. Files that cannot be read as UTF-8 text are skipped with a warning.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl FileLoader {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Check if a file should be included based on patterns.
    pub fn should_include(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        if self.exclude.iter().any(|p| path_str.contains(p.as_str())) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| path_str.contains(p.as_str()))
    }

    /// Load a single file.
    pub fn load_file(&self, path: &Path) -> AppResult<Vec<Document>> {
        let content_type = ContentType::from_path(path);
        let source = path.to_string_lossy().to_string();

        let raw = fs::read_to_string(path)
            .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

        if content_type == ContentType::Json {
            return parse_json_documents(&raw, &source);
        }

        if content_type == ContentType::Unknown && !is_likely_text(&raw) {
            return Err(AppError::Knowledge(format!(
                "{:?} does not look like a text file",
                path
            )));
        }

        let mut document = Document::new(raw, source);
        document.metadata.insert(
            "content_type".to_string(),
            MetadataValue::from(content_type.as_str()),
        );
        Ok(vec![document])
    }
}

impl CorpusLoader for FileLoader {
    fn load(&self, source: &Path) -> AppResult<Vec<Document>> {
        if source.is_file() {
            return self.load_file(source);
        }

        if !source.is_dir() {
            return Err(AppError::Knowledge(format!(
                "Source path does not exist: {:?}",
                source
            )));
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(source)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !self.should_include(path) {
                continue;
            }

            match self.load_file(path) {
                Ok(mut docs) => documents.append(&mut docs),
                Err(e) => tracing::warn!("Skipping {:?}: {}", path, e),
            }
        }

        tracing::debug!("Loaded {} documents from {:?}", documents.len(), source);
        Ok(documents)
    }
}

/// Entry of a JSON document file.
#[derive(Debug, Deserialize)]
struct JsonDocument {
    #[serde(alias = "pageContent")]
    text: String,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Parse a JSON array of `{text | pageContent, metadata?}` objects.
///
/// Metadata values that are arrays or objects are dropped with a warning.
/// Entries without a `source` get the file path; every entry gets its array
/// index as `entry`.
fn parse_json_documents(raw: &str, source: &str) -> AppResult<Vec<Document>> {
    let entries: Vec<JsonDocument> = serde_json::from_str(raw).map_err(|e| {
        AppError::Knowledge(format!("Failed to parse JSON documents in {}: {}", source, e))
    })?;

    let documents = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut metadata = Metadata::new();
            for (key, value) in entry.metadata.unwrap_or_default() {
                match MetadataValue::try_from(value) {
                    Ok(v) => {
                        metadata.insert(key, v);
                    }
                    Err(e) => tracing::warn!("Dropping metadata '{}' in {}: {}", key, source, e),
                }
            }
            metadata
                .entry("source".to_string())
                .or_insert_with(|| MetadataValue::from(source));
            metadata
                .entry("content_type".to_string())
                .or_insert_with(|| MetadataValue::from(ContentType::Json.as_str()));
            metadata.insert("entry".to_string(), MetadataValue::from(index));

            Document {
                text: entry.text,
                metadata,
            }
        })
        .collect();

    Ok(documents)
}

/// Heuristic check for binary content.
fn is_likely_text(text: &str) -> bool {
    let sample: Vec<char> = text.chars().take(1000).collect();
    if sample.is_empty() {
        return true;
    }

    let control = sample
        .iter()
        .filter(|c| c.is_control() && !c.is_whitespace())
        .count();

    control * 10 < sample.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(ContentType::from_path(Path::new("a.md")), ContentType::Markdown);
        assert_eq!(ContentType::from_path(Path::new("a.json")), ContentType::Json);
        assert_eq!(ContentType::from_path(Path::new("a.rs")), ContentType::Code);
        assert_eq!(ContentType::from_path(Path::new("a")), ContentType::Unknown);
    }

    #[test]
    fn test_load_text_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.md");
        fs::write(&path, "# Title\n\nSome notes.").unwrap();

        let docs = FileLoader::default().load(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "# Title\n\nSome notes.");
        assert_eq!(docs[0].source(), path.to_string_lossy());
        assert_eq!(docs[0].metadata["content_type"], MetadataValue::from("markdown"));
    }

    #[test]
    fn test_load_json_documents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vectorstore.json");
        fs::write(
            &path,
            r#"[
                {"text": "Processo: 1", "metadata": {"distrito": "Setúbal", "ano": 2024, "tb_candidatura": [{"fl": true}]}},
                {"pageContent": "Processo: 2", "metadata": {"source": "db-export"}},
                {"text": "Processo: 3"}
            ]"#,
        )
        .unwrap();

        let docs = FileLoader::default().load(&path).unwrap();
        assert_eq!(docs.len(), 3);

        assert_eq!(docs[0].metadata["distrito"], MetadataValue::from("Setúbal"));
        assert_eq!(docs[0].metadata["ano"], MetadataValue::Integer(2024));
        assert!(!docs[0].metadata.contains_key("tb_candidatura"));
        assert_eq!(docs[0].source(), path.to_string_lossy());

        assert_eq!(docs[1].text, "Processo: 2");
        assert_eq!(docs[1].source(), "db-export");
        assert_eq!(docs[2].metadata["content_type"], MetadataValue::from("json"));
        assert_eq!(docs[2].metadata["entry"], MetadataValue::Integer(2));
    }

    #[test]
    fn test_malformed_json_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, r#"{"text": "not an array"}"#).unwrap();

        assert!(FileLoader::default().load(&path).is_err());
    }

    #[test]
    fn test_walk_directory_with_patterns() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();
        fs::create_dir_all(temp.path().join("target")).unwrap();
        fs::write(temp.path().join("docs/a.md"), "alpha").unwrap();
        fs::write(temp.path().join("docs/b.txt"), "beta").unwrap();
        fs::write(temp.path().join("target/c.md"), "gamma").unwrap();

        let loader = FileLoader::new(vec![".md".to_string()], vec!["target".to_string()]);
        let docs = loader.load(temp.path()).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "alpha");
    }

    #[test]
    fn test_missing_source_is_error() {
        let temp = TempDir::new().unwrap();
        let result = FileLoader::default().load(&temp.path().join("nope"));
        assert!(matches!(result, Err(AppError::Knowledge(_))));
    }

    #[test]
    fn test_binary_unknown_file_skipped_in_walk() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("blob"), "\u{1}\u{2}\u{3}\u{4}\u{5}").unwrap();
        fs::write(temp.path().join("ok.txt"), "fine").unwrap();

        let docs = FileLoader::default().load(temp.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "fine");
    }
}
