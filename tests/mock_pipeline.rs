//! Integration tests using mock embedding, chat, and publishing collaborators.
//!
//! Validates the retrieval and review pipeline end-to-end without making
//! real model calls. The GitHub test drives the real HTTP client against a
//! local mock server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use guidecheck::config::GitHubConfig;
use guidecheck::corpus::{CorpusIndex, CorpusOptions, build_corpus_index};
use guidecheck::github::{CommentPublisher, DiffSource, GitHubClient, GitHubError, GitHubPublisher};
use guidecheck::models::{ChangedFile, CommentRequest, PublishOutcome, PullRequestRef, ReviewStage, Vector};
use guidecheck::orchestrator::{ReviewOrchestrator, ReviewSettings};
use guidecheck::providers::rig::RetryPolicy;
use guidecheck::providers::{ChatProvider, EmbeddingProvider, ProviderError};

const GUIDE: &str = r#"<!DOCTYPE html>
<html><body>
  <h1>House Style</h1>
  <h2>Errors</h2>
  <p>Wrap every error with context before returning the error to the caller.</p>
  <p>Never ignore an error value; handle the error or return it explicitly.</p>
  <li>Error strings should not be capitalized or end with punctuation.</li>
  <h2>Naming</h2>
  <p>Package names are short, lowercase, and free of underscores.</p>
  <h2>Testing</h2>
  <li>Tests should be table driven and use subtests for each case.</li>
</body></html>"#;

const ERROR_PASSAGES: [&str; 3] = [
    "Wrap every error with context before returning the error to the caller.",
    "Never ignore an error value; handle the error or return it explicitly.",
    "Error strings should not be capitalized or end with punctuation.",
];

const OTHER_PASSAGES: [&str; 2] = [
    "Package names are short, lowercase, and free of underscores.",
    "Tests should be table driven and use subtests for each case.",
];

/// Embeds text as keyword counts for errors, naming, and testing.
struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector, ProviderError> {
        let lower = text.to_lowercase();
        Ok(["error", "name", "test"]
            .iter()
            .map(|k| lower.matches(k).count() as f64 + 0.01)
            .collect())
    }
}

/// A chat provider that records every prompt and returns a canned review.
#[derive(Default)]
struct RecordingChat {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("Wrap the returned error with context.".to_string())
    }
}

/// A publisher that accepts every comment except those for `reject`.
struct MockPublisher {
    reject: Option<&'static str>,
    posted: Mutex<Vec<CommentRequest>>,
}

impl MockPublisher {
    fn accepting() -> Self {
        Self {
            reject: None,
            posted: Mutex::new(Vec::new()),
        }
    }

    fn rejecting(path: &'static str) -> Self {
        Self {
            reject: Some(path),
            posted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommentPublisher for MockPublisher {
    async fn publish(&self, comment: &CommentRequest) -> Result<(), GitHubError> {
        if self.reject == Some(comment.path.as_str()) {
            return Err(GitHubError::Status {
                status: 422,
                body: "position is invalid".to_string(),
            });
        }
        self.posted.lock().unwrap().push(comment.clone());
        Ok(())
    }
}

/// Helper: a changed Go file whose diff is about error handling.
fn changed_file(name: &str) -> ChangedFile {
    ChangedFile {
        filename: name.to_string(),
        status: "modified".to_string(),
        additions: 3,
        deletions: 0,
        patch: Some(
            "@@ -10,3 +10,6 @@\n cfg, err := load()\n+if err != nil {\n+\treturn err // propagate the error\n+}"
                .to_string(),
        ),
        contents_url: format!(
            "https://api.github.com/repos/acme/widgets/contents/{name}?ref=6dcb09b5b57875f334f61aebed695e2e4193db5e"
        ),
    }
}

async fn corpus() -> Arc<CorpusIndex> {
    let index = build_corpus_index(GUIDE, Arc::new(KeywordEmbedder), &CorpusOptions::default())
        .await
        .unwrap();
    Arc::new(index)
}

fn orchestrator(chat: Arc<RecordingChat>, publisher: Arc<MockPublisher>) -> ReviewOrchestrator {
    ReviewOrchestrator::new(
        Arc::new(KeywordEmbedder),
        chat,
        publisher,
        ReviewSettings::default(),
    )
    .with_retry_policy(RetryPolicy::none())
}

#[tokio::test]
async fn corpus_keeps_only_substantial_passages() {
    let index = corpus().await;
    let texts: Vec<&str> = index.chunks().iter().map(|c| c.text()).collect();
    assert_eq!(
        texts,
        vec![
            ERROR_PASSAGES[0],
            ERROR_PASSAGES[1],
            ERROR_PASSAGES[2],
            OTHER_PASSAGES[0],
            OTHER_PASSAGES[1],
        ]
    );
}

#[tokio::test]
async fn prompt_cites_exactly_the_relevant_passages() {
    let chat = Arc::new(RecordingChat::default());
    let publisher = Arc::new(MockPublisher::accepting());
    let orch = orchestrator(chat.clone(), publisher.clone());

    let report = orch
        .review_changed_files(vec![changed_file("config/load.go")], corpus().await, "Review this change.")
        .await;

    assert!(report.all_posted());
    let prompts = chat.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    for passage in ERROR_PASSAGES {
        assert!(prompt.contains(passage), "missing passage: {passage}");
    }
    for passage in OTHER_PASSAGES {
        assert!(!prompt.contains(passage), "unexpected passage: {passage}");
    }
    assert!(prompt.starts_with("Review this change."));
    assert!(prompt.contains("+if err != nil {"));

    let posted = publisher.posted.lock().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].path, "config/load.go");
    assert_eq!(posted[0].commit_id, "6dcb09b5b57875f334f61aebed695e2e4193db5e");
    assert_eq!(posted[0].position, 1);
    assert_eq!(posted[0].body, "Wrap the returned error with context.");
}

#[tokio::test]
async fn partial_failure_is_reported_per_file() {
    for order in [["a.go", "b.go"], ["b.go", "a.go"]] {
        let publisher = Arc::new(MockPublisher::rejecting("b.go"));
        let orch = orchestrator(Arc::new(RecordingChat::default()), publisher.clone());

        let files = order.iter().map(|name| changed_file(name)).collect();
        let report = orch.review_changed_files(files, corpus().await, "Review").await;

        assert_eq!(report.results.len(), 2);
        let names: Vec<&str> = report.results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, order.to_vec());

        for result in &report.results {
            match result.filename.as_str() {
                "a.go" => assert_eq!(result.outcome, PublishOutcome::Posted),
                "b.go" => match &result.outcome {
                    PublishOutcome::Failed { stage, reason } => {
                        assert_eq!(*stage, ReviewStage::Generated);
                        assert!(reason.contains("422"), "{reason}");
                    }
                    PublishOutcome::Posted => panic!("b.go should have failed"),
                },
                other => panic!("unexpected file {other}"),
            }
        }

        let summary = report.summary();
        assert_eq!((summary.posted, summary.failed), (1, 1));
        assert!(!report.all_posted());
        assert_eq!(publisher.posted.lock().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn github_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/pulls/12/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "filename": "main.go",
            "status": "modified",
            "additions": 3,
            "deletions": 0,
            "patch": "@@ -1 +1,3 @@\n+if err != nil {\n+\treturn err\n+}",
            "contents_url": "https://api.github.com/repos/acme/widgets/contents/main.go?ref=6dcb09b"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/pulls/12/comments"))
        .and(body_partial_json(serde_json::json!({
            "commit_id": "6dcb09b",
            "path": "main.go",
            "position": 1
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::new(&GitHubConfig {
        token: Some("ghp_test".to_string()),
        api_url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap();
    let pr = PullRequestRef {
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        number: 12,
    };

    let files = client.fetch_changed_files(&pr).await.unwrap();
    let publisher = Arc::new(GitHubPublisher::new(client, pr));
    let orch = ReviewOrchestrator::new(
        Arc::new(KeywordEmbedder),
        Arc::new(RecordingChat::default()),
        publisher,
        ReviewSettings::default(),
    );

    let report = orch.review_changed_files(files, corpus().await, "Review").await;
    assert!(report.all_posted(), "{report:?}");
}
