//! learn / search / stats / clean on a temporary workspace with the local
//! trigram embedder.

use crate::config::{get_index_path, get_stats_path, load_config, save_config};
use crate::embeddings::EmbeddingConfig;
use crate::filter::MetadataFilter;
use crate::index::VectorIndex;
use crate::types::{AskOptions, KnowledgeBaseConfig, LearnOptions, SearchOptions};
use crate::{ask, clean, learn, search, stats};
use sift_core::AppError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_corpus(dir: &Path) {
    fs::create_dir_all(dir.join("docs")).unwrap();
    fs::write(
        dir.join("docs/rust.md"),
        "Rust ownership rules: each value has a single owner. Borrowing lets code read values without taking ownership.",
    )
    .unwrap();
    fs::write(
        dir.join("docs/baking.txt"),
        "Bread baking needs flour, water, yeast and an oven preheated to a high temperature.",
    )
    .unwrap();
    fs::write(
        dir.join("docs/export.json"),
        r#"[{"text": "Candidaturas no distrito de Setúbal", "metadata": {"distrito": "Setúbal"}}]"#,
    )
    .unwrap();
}

fn learn_options(workspace: &Path) -> LearnOptions {
    LearnOptions {
        base_name: "docs".to_string(),
        paths: vec![workspace.join("docs")],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_learn_then_search() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path());

    let learned = learn(temp.path(), &learn_options(temp.path()), None)
        .await
        .unwrap();
    assert_eq!(learned.sources_count, 3);
    assert_eq!(learned.chunks_count, 3);
    assert_eq!(learned.records_count, 3);
    assert!(get_index_path(temp.path(), "docs").exists());
    assert!(get_stats_path(temp.path(), "docs").exists());

    let results = search(
        temp.path(),
        &SearchOptions {
            base_name: "docs".to_string(),
            query: "ownership and borrowing in Rust".to_string(),
            top_k: Some(2),
            filter: MetadataFilter::new(),
        },
        None,
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].id.ends_with("rust.md#0"));
    assert!(results[0].score > results[1].score);
}

#[tokio::test]
async fn test_json_entries_become_separate_records() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("export")).unwrap();
    fs::write(
        temp.path().join("export/vectorstore.json"),
        r#"[
            {"pageContent": "Processo 1: candidatura aprovada em Lisboa"},
            {"pageContent": "Processo 2: candidatura pendente no Porto"},
            {"pageContent": "Processo 3: candidatura rejeitada em Faro"}
        ]"#,
    )
    .unwrap();

    let learned = learn(
        temp.path(),
        &LearnOptions {
            base_name: "export".to_string(),
            paths: vec![temp.path().join("export")],
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();
    assert_eq!(learned.sources_count, 3);
    assert_eq!(learned.chunks_count, 3);
    assert_eq!(learned.records_count, 3);

    let index = VectorIndex::load(&get_index_path(temp.path(), "export")).unwrap();
    let mut ids: Vec<&str> = index.records().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    assert!(ids[0].ends_with("vectorstore.json#0:0"));
    assert!(ids[1].ends_with("vectorstore.json#1:0"));
    assert!(ids[2].ends_with("vectorstore.json#2:0"));
}

#[tokio::test]
async fn test_search_with_metadata_filter() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path());
    learn(temp.path(), &learn_options(temp.path()), None)
        .await
        .unwrap();

    let results = search(
        temp.path(),
        &SearchOptions {
            base_name: "docs".to_string(),
            query: "anything".to_string(),
            top_k: Some(5),
            filter: MetadataFilter::parse_conditions(&["distrito=Setúbal"]).unwrap(),
        },
        None,
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "Candidaturas no distrito de Setúbal");
}

#[tokio::test]
async fn test_relearn_overwrites_and_reset_starts_over() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path());
    let options = learn_options(temp.path());

    learn(temp.path(), &options, None).await.unwrap();
    let again = learn(temp.path(), &options, None).await.unwrap();
    assert_eq!(again.records_count, 3);

    fs::remove_file(temp.path().join("docs/baking.txt")).unwrap();
    let kept = learn(temp.path(), &options, None).await.unwrap();
    assert_eq!(kept.records_count, 3);

    let reset = learn(
        temp.path(),
        &LearnOptions {
            reset: true,
            ..options
        },
        None,
    )
    .await
    .unwrap();
    assert_eq!(reset.records_count, 2);
}

#[tokio::test]
async fn test_chunk_settings_come_from_base_config() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path());

    let mut config = KnowledgeBaseConfig::named("docs");
    config.chunk_size = 40;
    config.chunk_overlap = 10;
    config.embedding.dimensions = 64;
    save_config(temp.path(), &config).unwrap();

    let learned = learn(temp.path(), &learn_options(temp.path()), None)
        .await
        .unwrap();
    assert!(learned.chunks_count > 3);

    let index = VectorIndex::load(&get_index_path(temp.path(), "docs")).unwrap();
    assert_eq!(index.dimensions(), Some(64));
    assert_eq!(load_config(temp.path(), "docs").unwrap(), config);
}

#[tokio::test]
async fn test_embedding_option_only_applies_to_new_base() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path());

    let options = LearnOptions {
        embedding: Some(EmbeddingConfig {
            dimensions: 128,
            ..EmbeddingConfig::default()
        }),
        ..learn_options(temp.path())
    };
    learn(temp.path(), &options, None).await.unwrap();
    assert_eq!(load_config(temp.path(), "docs").unwrap().embedding.dimensions, 128);

    let options = LearnOptions {
        embedding: Some(EmbeddingConfig::default()),
        ..learn_options(temp.path())
    };
    learn(temp.path(), &options, None).await.unwrap();
    assert_eq!(load_config(temp.path(), "docs").unwrap().embedding.dimensions, 128);
}

#[tokio::test]
async fn test_dimension_change_is_rejected() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path());
    learn(temp.path(), &learn_options(temp.path()), None)
        .await
        .unwrap();

    let mut config = load_config(temp.path(), "docs").unwrap();
    config.embedding.dimensions = 32;
    save_config(temp.path(), &config).unwrap();

    let result = learn(temp.path(), &learn_options(temp.path()), None).await;
    assert!(matches!(
        result,
        Err(AppError::DimensionMismatch {
            expected: 384,
            actual: 32
        })
    ));
}

#[tokio::test]
async fn test_stats_and_clean() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path());
    learn(temp.path(), &learn_options(temp.path()), None)
        .await
        .unwrap();

    let base = stats(temp.path(), "docs").unwrap();
    assert_eq!(base.records_count, 3);
    assert_eq!(base.sources_count, 3);
    assert_eq!(base.dimensions, Some(384));
    assert_eq!(base.embedding_provider, "trigram");
    assert!(base.index_size_bytes > 0);
    assert!(base.last_learn_at.is_some());

    clean(temp.path(), "docs").unwrap();

    let base = stats(temp.path(), "docs").unwrap();
    assert_eq!(base.records_count, 0);
    assert_eq!(base.dimensions, None);
    assert!(base.last_learn_at.is_none());
}

#[tokio::test]
async fn test_missing_base_errors() {
    let temp = TempDir::new().unwrap();

    assert!(matches!(stats(temp.path(), "nope"), Err(AppError::Knowledge(_))));
    assert!(matches!(clean(temp.path(), "nope"), Err(AppError::Knowledge(_))));

    let result = ask(
        temp.path(),
        AskOptions {
            base_name: "nope".to_string(),
            query: "q".to_string(),
            ..Default::default()
        },
        "ollama",
        "llama3.2",
        None,
        None,
    )
    .await;
    assert!(matches!(result, Err(AppError::Knowledge(_))));
}

#[tokio::test]
async fn test_learn_requires_paths() {
    let temp = TempDir::new().unwrap();
    let result = learn(
        temp.path(),
        &LearnOptions {
            base_name: "docs".to_string(),
            ..Default::default()
        },
        None,
    )
    .await;
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_ask_without_relevant_records_skips_model() {
    let temp = TempDir::new().unwrap();
    write_corpus(temp.path());
    learn(temp.path(), &learn_options(temp.path()), None)
        .await
        .unwrap();

    // Nothing can reach this score, so no completion request is made and
    // the unreachable endpoint is never contacted.
    let response = ask(
        temp.path(),
        AskOptions {
            base_name: "docs".to_string(),
            query: "ownership".to_string(),
            min_score: 1.5,
            ..Default::default()
        },
        "ollama",
        "llama3.2",
        Some("http://127.0.0.1:9"),
        None,
    )
    .await
    .unwrap();

    assert!(!response.has_sources());
}
