use async_trait::async_trait;
use chrono::Local;
use outage_report::batch::{GroupOutcome, Orchestrator, RunStatus};
use outage_report::config::AppConfig;
use outage_report::notify::{ChatNotifier, NotifyError, ReportMail, ReportMailer};
use outage_report::report::{RenderedReport, ReportError, ReportRenderer};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use tempfile::TempDir;

/// Writes a placeholder PDF instead of invoking Typst.
#[derive(Default)]
struct FakeRenderer {
    rendered: Mutex<Vec<PathBuf>>,
    threads: Mutex<Vec<ThreadId>>,
}

impl ReportRenderer for FakeRenderer {
    fn render(&self, csv_path: &Path, pdf_path: &Path) -> Result<RenderedReport, ReportError> {
        fs::write(pdf_path, b"%PDF-fake").map_err(|source| ReportError::WriteOutput {
            path: pdf_path.to_path_buf(),
            source,
        })?;
        self.rendered.lock().unwrap().push(csv_path.to_path_buf());
        self.threads.lock().unwrap().push(thread::current().id());
        Ok(RenderedReport {
            path: pdf_path.to_path_buf(),
            body_rows: 0,
            size_bytes: 9,
            generated_at: Local::now().naive_local(),
        })
    }
}

/// Records mails; fails for any recipient listed in `reject`.
#[derive(Default)]
struct FakeMailer {
    sent: Mutex<Vec<ReportMail>>,
    reject: Vec<String>,
}

#[async_trait]
impl ReportMailer for FakeMailer {
    async fn send_report(&self, mail: &ReportMail) -> Result<(), NotifyError> {
        if mail.recipients.iter().any(|r| self.reject.contains(r)) {
            return Err(NotifyError::Status {
                status: 550,
                body: "mailbox unavailable".into(),
            });
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeChat {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl ChatNotifier for FakeChat {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(NotifyError::Status {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        Ok(())
    }
}

fn config(dir: &TempDir) -> AppConfig {
    let raw = r#"
        [smtp]
        server = "smtp.example.com"
        username = "reports@example.com"
        password = "secret"

        [[groups]]
        name = "cameras_oks"
        display_name = "ОКС"
        command = "printf 'CameraID;CameraName;NotAvailable\n1;a;05.03.2024 9:5\n2;b;x\n' > csv/oks.csv"
        csv_file = "csv/oks.csv"
        pdf_prefix = "cameras_oks"
        emails = ["oks@example.com"]

        [[groups]]
        name = "cameras_school"
        display_name = "Школы"
        command = "exit 1"
        csv_file = "csv/school.csv"
        pdf_prefix = "cameras_school"
        emails = ["school@example.com"]

        [[groups]]
        name = "cameras_gorsvet"
        display_name = "Горсвет"
        command = "printf 'CameraID;CameraName;NotAvailable\n7;c;d\n' > csv/gorsvet.csv"
        csv_file = "csv/gorsvet.csv"
        pdf_prefix = "cameras_gorsvet"
        emails = ["gorsvet@example.com"]
    "#;
    AppConfig::from_toml_str(raw, dir.path().to_path_buf()).unwrap()
}

#[tokio::test]
async fn test_failed_group_does_not_stop_others() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let renderer = Arc::new(FakeRenderer::default());
    let mailer = FakeMailer::default();
    let chat = FakeChat::default();

    let summary = Orchestrator::new(&config, renderer.clone(), &mailer, &chat)
        .run()
        .await;

    assert_eq!(summary.outcomes.len(), 3);
    assert!(matches!(
        &summary.outcomes[0],
        GroupOutcome::Delivered { outage_count: 2, .. }
    ));
    assert!(matches!(
        &summary.outcomes[1],
        GroupOutcome::GenerationFailed { group, .. } if group == "cameras_school"
    ));
    assert!(matches!(
        &summary.outcomes[2],
        GroupOutcome::Delivered { outage_count: 1, .. }
    ));
    assert_eq!(summary.status(), RunStatus::Partial);
    assert_eq!(summary.failed_groups(), vec!["cameras_school"]);

    assert_eq!(renderer.rendered.lock().unwrap().len(), 2);
    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].recipients, vec!["oks@example.com"]);
    assert!(sent[0].subject.ends_with("ОКС"));
    assert!(sent[0].body.contains(" 2 камер"));
    assert!(sent[0].attachment.exists());
}

#[tokio::test]
async fn test_start_and_summary_posted_to_chat() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let renderer = Arc::new(FakeRenderer::default());
    let mailer = FakeMailer::default();
    let chat = FakeChat::default();

    Orchestrator::new(&config, renderer.clone(), &mailer, &chat)
        .run()
        .await;

    let messages = chat.messages.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("Начинаю обработку 3 групп"));
    assert!(messages[1].contains("✅ ОКС: 2 камер"));
    assert!(messages[1].contains("❌ Школы: ошибка генерации"));
    assert!(messages[1].contains("✅ Горсвет: 1 камер"));
    assert!(messages[1].contains("Успешно: 2/3"));
}

#[tokio::test]
async fn test_mail_failure_is_recorded_per_group() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let renderer = Arc::new(FakeRenderer::default());
    let mailer = FakeMailer {
        reject: vec!["oks@example.com".into()],
        ..FakeMailer::default()
    };
    let chat = FakeChat::default();

    let summary = Orchestrator::new(&config, renderer.clone(), &mailer, &chat)
        .run()
        .await;

    assert!(matches!(
        &summary.outcomes[0],
        GroupOutcome::DeliveryFailed { outage_count: 2, .. }
    ));
    assert!(summary.outcomes[2].is_success());
    assert!(chat.messages.lock().unwrap()[1].contains("❌ ОКС: ошибка отправки"));
}

#[tokio::test]
async fn test_chat_failure_does_not_fail_run() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let renderer = Arc::new(FakeRenderer::default());
    let mailer = FakeMailer::default();
    let chat = FakeChat {
        fail: true,
        ..FakeChat::default()
    };

    let summary = Orchestrator::new(&config, renderer.clone(), &mailer, &chat)
        .run()
        .await;

    assert_eq!(summary.success_count(), 2);
    assert_eq!(chat.messages.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_csv_is_generation_failure() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.groups.truncate(1);
    config.groups[0].command = "true".into();

    let renderer = Arc::new(FakeRenderer::default());
    let mailer = FakeMailer::default();
    let chat = FakeChat::default();

    let summary = Orchestrator::new(&config, renderer.clone(), &mailer, &chat)
        .run()
        .await;

    match &summary.outcomes[0] {
        GroupOutcome::GenerationFailed { reason, .. } => {
            assert!(reason.contains("CSV file not found"))
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(summary.status(), RunStatus::Failed);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_output_directories_created() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let renderer = Arc::new(FakeRenderer::default());
    let mailer = FakeMailer::default();
    let chat = FakeChat::default();

    Orchestrator::new(&config, renderer.clone(), &mailer, &chat)
        .run()
        .await;

    assert!(dir.path().join("pdf").is_dir());
    assert!(dir.path().join("csv").is_dir());
    let pdfs = fs::read_dir(dir.path().join("pdf")).unwrap().count();
    assert_eq!(pdfs, 2);
}

#[tokio::test]
async fn test_rendering_runs_off_the_async_thread() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let renderer = Arc::new(FakeRenderer::default());
    let mailer = FakeMailer::default();
    let chat = FakeChat::default();

    Orchestrator::new(&config, renderer.clone(), &mailer, &chat)
        .run()
        .await;

    let runtime_thread = thread::current().id();
    let threads = renderer.threads.lock().unwrap();
    assert_eq!(threads.len(), 2);
    assert!(threads.iter().all(|id| *id != runtime_thread));
}
