//! End-to-end extraction against a mock HTTP server.
//!
//! The static tier is the real reqwest client; the rendered tier is a
//! scripted renderer standing in for Chromium.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use formscope::fetch::http_client::HttpClient;
use formscope::{
    ContentFetcher, ErrorKind, ExtractError, ExtractResponse, ExtractResult, ExtractorConfig,
    FormExtractor, Platform, Renderer,
};

// ─────────────────────── helpers ───────────────────────

const GOOGLE_PATH: &str = "/docs.google.com/forms/d/e/1FAIpQLSd/viewform";
const SURVEY_PATH: &str = "/www.surveymonkey.com/r/TEAM";

/// Renderer returning fixed markup and remembering what it rendered.
struct ScriptedRenderer {
    markup: Option<String>,
    rendered: Mutex<Vec<String>>,
}

impl ScriptedRenderer {
    fn returning(markup: &str) -> Arc<Self> {
        Arc::new(Self {
            markup: Some(markup.to_string()),
            rendered: Mutex::new(Vec::new()),
        })
    }

    fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            markup: None,
            rendered: Mutex::new(Vec::new()),
        })
    }

    fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn render(&self, url: &str) -> ExtractResult<String> {
        self.rendered.lock().unwrap().push(url.to_string());
        self.markup
            .clone()
            .ok_or_else(|| ExtractError::Network("browser crashed".to_string()))
    }
}

fn extractor(renderer: Arc<ScriptedRenderer>) -> FormExtractor {
    let http = HttpClient::from_config(&ExtractorConfig::default()).unwrap();
    FormExtractor::new(Arc::new(ContentFetcher::new(http, renderer)))
}

async fn serve(server: &MockServer, at: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn google_page(payload: &str, form: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Form</title>\
         <script type=\"text/javascript\">{payload}</script></head>\
         <body>{form}</body></html>"
    )
}

// ─────────────────────── Google Forms ───────────────────────

#[tokio::test]
async fn test_google_form_from_static_markup() {
    let server = MockServer::start().await;
    let html = google_page(
        r#"var FB_PUBLIC_LOAD_DATA_ = [null,["Desc","[[1,\"Q\",\"\",0,[],null]]",null,null,null,null,null,null,"Title"]];"#,
        r#"<form action="/formResponse" method="POST"></form>"#,
    );
    serve(&server, GOOGLE_PATH, 200, &html).await;
    let renderer = ScriptedRenderer::unavailable();

    let info = extractor(renderer.clone())
        .extract(&format!("{}{GOOGLE_PATH}", server.uri()))
        .await
        .unwrap();

    assert_json_diff::assert_json_eq!(
        serde_json::to_value(&info).unwrap(),
        json!({
            "title": "Title",
            "description": "Desc",
            "question_count": 1,
            "submit_url": "/formResponse",
            "platform": "GoogleForms"
        })
    );
    assert!(renderer.rendered().is_empty());
}

#[tokio::test]
async fn test_google_form_counts_all_but_page_breaks() {
    let server = MockServer::start().await;
    let definition = json!([
        null,
        [
            "A short survey",
            [
                [11, "Name", null, 0, [[1, null, 1]]],
                [12, "Section two", null, 8, null],
                [13, "Age", null, 2, [[2, [["18-25"], ["26+"]], 1]]],
                [14, "Section three", null, 8, null],
                [15, "Comments", null, 1, [[3, null, 0]]]
            ],
            null, null, null, null, null, null,
            "Customer Feedback"
        ]
    ]);
    let html = google_page(
        &format!("var FB_PUBLIC_LOAD_DATA_ = {definition};"),
        r#"<form action="https://docs.google.com/forms/d/e/1FAIpQLSd/formResponse"></form>"#,
    );
    serve(&server, GOOGLE_PATH, 200, &html).await;

    let info = extractor(ScriptedRenderer::unavailable())
        .extract(&format!("{}{GOOGLE_PATH}", server.uri()))
        .await
        .unwrap();

    assert_eq!(info.title, "Customer Feedback");
    assert_eq!(info.question_count, 3);
    assert!(info.submit_url.ends_with("/formResponse"));
}

#[tokio::test]
async fn test_google_form_rendered_when_static_lacks_marker() {
    let server = MockServer::start().await;
    serve(&server, GOOGLE_PATH, 200, "<html><body>Loading…</body></html>").await;
    let rendered = google_page(
        r#"var FB_PUBLIC_LOAD_DATA_ = [null,["",[],null,null,null,null,null,null,"Rendered"]];"#,
        "<form></form>",
    );
    let renderer = ScriptedRenderer::returning(&rendered);
    let url = format!("{}{GOOGLE_PATH}", server.uri());

    let info = extractor(renderer.clone()).extract(&url).await.unwrap();

    assert_eq!(info.title, "Rendered");
    assert_eq!(info.question_count, 0);
    assert_eq!(renderer.rendered(), vec![url]);
}

#[tokio::test]
async fn test_google_form_with_undecodable_data_is_parse_failure() {
    let server = MockServer::start().await;
    let html = google_page(
        "var FB_PUBLIC_LOAD_DATA_ = [null,[\"Desc\", undefined]];",
        "<form action=\"/formResponse\"></form>",
    );
    serve(&server, GOOGLE_PATH, 200, &html).await;

    let err = extractor(ScriptedRenderer::unavailable())
        .extract(&format!("{}{GOOGLE_PATH}", server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_parse(), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::NetworkOrParse);
}

#[tokio::test]
async fn test_google_form_behind_login_is_auth_required() {
    let server = MockServer::start().await;
    let html = google_page(
        "var other = 1;",
        r#"<form action="https://accounts.google.com/v3/signin/identifier" method="post"></form>"#,
    );
    serve(&server, GOOGLE_PATH, 200, &html).await;
    let renderer = ScriptedRenderer::returning(&html);

    let err = extractor(renderer.clone())
        .extract(&format!("{}{GOOGLE_PATH}", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthRequired);
    assert_eq!(renderer.rendered().len(), 1);
}

#[tokio::test]
async fn test_http_error_status_is_network_failure() {
    let server = MockServer::start().await;
    serve(&server, GOOGLE_PATH, 503, "unavailable").await;
    let renderer = ScriptedRenderer::unavailable();

    let err = extractor(renderer.clone())
        .extract(&format!("{}{GOOGLE_PATH}", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Network(_)));
    assert!(renderer.rendered().is_empty());
}

// ─────────────────────── SurveyMonkey ───────────────────────

#[tokio::test]
async fn test_survey_rendered_after_static_lacks_title() {
    let server = MockServer::start().await;
    serve(&server, SURVEY_PATH, 200, "<html><body><div id=\"app\"></div></body></html>").await;
    let rendered = r#"<html><head><title>Team Pulse Survey | SurveyMonkey</title></head>
        <body>
          <h1 class="survey-title">Team Pulse</h1>
          <div class="survey-description">Quarterly check-in</div>
          <div class="question-container">Q1</div>
          <div class="question-container">Q2</div>
        </body></html>"#;
    let renderer = ScriptedRenderer::returning(rendered);

    let info = extractor(renderer.clone())
        .extract(&format!("{}{SURVEY_PATH}", server.uri()))
        .await
        .unwrap();

    assert_eq!(info.platform, Platform::SurveyMonkey);
    assert_eq!(info.title, "Team Pulse");
    assert_eq!(info.description, "Quarterly check-in");
    assert_eq!(info.question_count, 2);
    assert_eq!(renderer.rendered().len(), 1);
}

#[tokio::test]
async fn test_survey_render_failure_is_network_failure() {
    let server = MockServer::start().await;
    serve(&server, SURVEY_PATH, 200, "<html></html>").await;

    let err = extractor(ScriptedRenderer::unavailable())
        .extract(&format!("{}{SURVEY_PATH}", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err, ExtractError::Network("browser crashed".to_string()));
}

// ─────────────────────── detection & envelope ───────────────────────

#[tokio::test]
async fn test_unknown_url_probed_once() {
    let server = MockServer::start().await;
    let html = r#"<html><head><title>Embedded | SurveyMonkey</title></head><body><h1>Embedded</h1></body></html>"#;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(&server)
        .await;

    let info = extractor(ScriptedRenderer::unavailable())
        .extract(&format!("{}/landing", server.uri()))
        .await
        .unwrap();

    assert_eq!(info.platform, Platform::SurveyMonkey);
    assert_eq!(info.title, "Embedded");
}

#[tokio::test]
async fn test_envelope_renders_failure_message() {
    let server = MockServer::start().await;
    serve(&server, SURVEY_PATH, 200, "<html><head><title>Nope</title></head></html>").await;
    let renderer = ScriptedRenderer::returning("<html><head><title>Still nope</title></head></html>");

    let result = extractor(renderer)
        .extract(&format!("{}{SURVEY_PATH}", server.uri()))
        .await;
    let envelope = ExtractResponse::from(result);

    assert_json_diff::assert_json_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({
            "success": false,
            "error": "Form not found: SurveyMonkey form was not found at this URL."
        })
    );
}
