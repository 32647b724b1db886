//! End-to-end behavior of the workbench against a scripted generation service.

use std::collections::VecDeque;
use std::sync::Mutex;

use webwright_core::prompt::{GENERATION_ERROR_NOTICE, PLACEHOLDER_HTML};
use webwright_core::{
    ChatRole, DeviceView, GenerateRequest, GenerationBackend, GenerationClient, GenerationError,
    GenerationErrorKind, PreviewRenderer, Resolution, SessionManager, SubmitRejected, ViewTab,
    Workbench,
};

#[derive(Default)]
struct ScriptedService {
    replies: Mutex<VecDeque<Result<Option<String>, GenerationError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedService {
    fn reply(self, reply: Result<Option<String>, GenerationError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    fn site(self, html: &str, message: &str) -> Self {
        let payload = serde_json::json!({ "html": html, "message": message }).to_string();
        self.reply(Ok(Some(payload)))
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl GenerationBackend for ScriptedService {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

fn workbench(service: ScriptedService) -> Workbench<ScriptedService> {
    Workbench::new(GenerationClient::new(service, SessionManager::default()))
}

fn requests(wb: &Workbench<ScriptedService>) -> usize {
    wb.client().backend().request_count()
}

const COFFEE_HTML: &str = "<!DOCTYPE html>\n<html><body>\n  <h1>Bean There</h1>\n</body></html>";

#[tokio::test]
async fn scenario_a_landing_page_for_coffee_shop() {
    let service = ScriptedService::default().site(COFFEE_HTML, "Built a cozy coffee shop landing page.");
    let mut wb = workbench(service);
    wb.set_view(ViewTab::Code);

    let pending = wb.submit("Build a landing page for a coffee shop").unwrap();

    // Optimistic: the user message is visible before the request resolves
    assert_eq!(wb.transcript().len(), 1);
    let first = &wb.transcript().messages()[0];
    assert_eq!(first.role, ChatRole::User);
    assert_eq!(first.text, "Build a landing page for a coffee shop");
    assert!(wb.is_generating());

    let resolution = wb.resolve(pending.run().await);
    assert_eq!(resolution, Resolution::Applied);

    assert_eq!(wb.transcript().len(), 2);
    let reply = &wb.transcript().messages()[1];
    assert_eq!(reply.role, ChatRole::Model);
    assert!(!reply.text.is_empty());
    assert_eq!(wb.current_html(), COFFEE_HTML);
    assert_eq!(wb.view(), ViewTab::Preview);
    assert!(!wb.is_generating());
}

#[tokio::test]
async fn scenario_b_payload_missing_html() {
    let service =
        ScriptedService::default().reply(Ok(Some(r#"{"message":"Here you go"}"#.to_string())));
    let mut wb = workbench(service);

    let resolution = wb.send("a bakery").await.unwrap();
    assert_eq!(
        resolution,
        Resolution::Failed(GenerationErrorKind::SchemaViolation)
    );

    let messages = wb.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, ChatRole::Model);
    assert_eq!(messages[1].text, GENERATION_ERROR_NOTICE);
    assert_eq!(wb.current_html(), PLACEHOLDER_HTML);
}

#[tokio::test]
async fn scenario_c_empty_submissions_are_ignored() {
    let mut wb = workbench(ScriptedService::default());

    for text in ["", "   ", "\n\t"] {
        assert_eq!(wb.send(text).await, Err(SubmitRejected::Empty));
    }
    assert!(wb.transcript().is_empty());
    assert_eq!(requests(&wb), 0);
}

#[tokio::test]
async fn scenario_d_confirmed_reset() {
    let service = ScriptedService::default().site("<p>site</p>", "Made a site");
    let mut wb = workbench(service);
    wb.send("a site").await.unwrap();
    let before = wb.session_id().unwrap();

    assert!(wb.reset(|_| true));

    assert!(wb.transcript().is_empty());
    assert_eq!(wb.current_html(), PLACEHOLDER_HTML);
    let after = wb.session_id().unwrap();
    assert_ne!(before, after);
    assert!(wb.client().sessions().current().unwrap().history().is_empty());
}

#[tokio::test]
async fn scenario_e_device_switch_rebuilds_preview() {
    let service = ScriptedService::default().site(COFFEE_HTML, "Coffee");
    let mut wb = workbench(service);
    wb.send("coffee").await.unwrap();

    let mut renderer = PreviewRenderer::new(wb.current_html(), wb.device());
    let before = renderer.current();

    wb.set_device(DeviceView::Mobile);
    assert!(renderer.render(wb.current_html(), wb.device()));

    let after = renderer.current();
    assert!(after.revision > before.revision);
    assert_eq!(after.device, DeviceView::Mobile);
    assert!(after.host_document().contains("width:375px"));
    assert_eq!(&*after.html, COFFEE_HTML);
    assert_eq!(wb.current_html(), COFFEE_HTML);
}

#[tokio::test]
async fn reset_is_idempotent() {
    let service = ScriptedService::default().site("<p>x</p>", "x");
    let mut once = workbench(service);
    once.send("x").await.unwrap();
    once.reset(|_| true);

    let service = ScriptedService::default().site("<p>x</p>", "x");
    let mut twice = workbench(service);
    twice.send("x").await.unwrap();
    twice.reset(|_| true);
    twice.reset(|_| true);

    assert_eq!(once.current_html(), twice.current_html());
    assert_eq!(once.transcript(), twice.transcript());
    assert_eq!(once.is_generating(), twice.is_generating());
    assert!(twice
        .client()
        .sessions()
        .current()
        .unwrap()
        .history()
        .is_empty());
}

#[tokio::test]
async fn every_submission_gets_exactly_one_reply() {
    let service = ScriptedService::default()
        .site("<p>1</p>", "one")
        .reply(Err(GenerationError::service(500, "boom")))
        .reply(Ok(None))
        .reply(Ok(Some("{broken".to_string())))
        .site("<p>5</p>", "five");
    let mut wb = workbench(service);

    for prompt in ["1", "2", "3", "4", "5"] {
        wb.send(prompt).await.unwrap();
    }

    let roles: Vec<ChatRole> = wb.transcript().messages().iter().map(|m| m.role).collect();
    let expected: Vec<ChatRole> = (0..5)
        .flat_map(|_| [ChatRole::User, ChatRole::Model])
        .collect();
    assert_eq!(roles, expected);
    assert_eq!(wb.current_html(), "<p>5</p>");
    assert_eq!(requests(&wb), 5);
}

#[tokio::test]
async fn successful_html_is_installed_verbatim() {
    let tricky = "  <div>\r\n\t<script>let a = \"</div>\";</script>\n  </div>  ";
    let service = ScriptedService::default().site(tricky, "tricky");
    let mut wb = workbench(service);

    wb.send("tricky").await.unwrap();
    assert_eq!(wb.current_html(), tricky);
}

#[tokio::test]
async fn transport_errors_are_not_leaked_to_transcript() {
    let service =
        ScriptedService::default().reply(Err(GenerationError::service(403, "API key invalid")));
    let mut wb = workbench(service);

    let resolution = wb.send("anything").await.unwrap();
    assert_eq!(resolution, Resolution::Failed(GenerationErrorKind::Transport));
    let reply = wb.transcript().last().unwrap();
    assert_eq!(reply.text, GENERATION_ERROR_NOTICE);
    assert!(!reply.text.contains("403"));
}

#[tokio::test]
async fn busy_submission_neither_appends_nor_calls_service() {
    let service = ScriptedService::default().site("<p>a</p>", "a");
    let mut wb = workbench(service);

    let pending = wb.submit("first").unwrap();
    for _ in 0..3 {
        assert!(matches!(wb.submit("again"), Err(SubmitRejected::Busy)));
    }
    assert_eq!(wb.transcript().len(), 1);
    assert_eq!(requests(&wb), 0);

    wb.resolve(pending.run().await);
    assert_eq!(requests(&wb), 1);
}

#[tokio::test]
async fn spawned_generation_resolves_on_the_owner() {
    let service = ScriptedService::default().site("<p>bg</p>", "background");
    let mut wb = workbench(service);

    let pending = wb.submit("run in background").unwrap();
    let handle = tokio::spawn(pending.run());
    let completed = handle.await.unwrap();

    assert_eq!(wb.resolve(completed), Resolution::Applied);
    assert_eq!(wb.current_html(), "<p>bg</p>");
}
