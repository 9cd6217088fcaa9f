//! Per-group outcomes and the chat/email texts built from them.

use chrono::NaiveDateTime;
use std::path::PathBuf;

use crate::notify::escape_html;

/// What happened to one group during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    Delivered {
        group: String,
        display_name: String,
        outage_count: usize,
        pdf: PathBuf,
    },
    GenerationFailed {
        group: String,
        display_name: String,
        reason: String,
    },
    DeliveryFailed {
        group: String,
        display_name: String,
        outage_count: usize,
        reason: String,
    },
}

impl GroupOutcome {
    pub fn group(&self) -> &str {
        match self {
            Self::Delivered { group, .. }
            | Self::GenerationFailed { group, .. }
            | Self::DeliveryFailed { group, .. } => group,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// One line of the chat summary.
    pub fn status_line(&self) -> String {
        match self {
            Self::Delivered {
                display_name,
                outage_count,
                ..
            } => format!("✅ {}: {} камер", escape_html(display_name), outage_count),
            Self::GenerationFailed { display_name, .. } => {
                format!("❌ {}: ошибка генерации", escape_html(display_name))
            }
            Self::DeliveryFailed { display_name, .. } => {
                format!("❌ {}: ошибка отправки", escape_html(display_name))
            }
        }
    }
}

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Partial,
    Failed,
}

impl RunStatus {
    fn icon(self) -> &'static str {
        match self {
            Self::Success => "✅",
            Self::Partial => "⚠️",
            Self::Failed => "❌",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Success => "УСПЕШНО",
            Self::Partial => "ЧАСТИЧНО УСПЕШНО",
            Self::Failed => "С ОШИБКАМИ",
        }
    }
}

/// Everything a run produced, in group order.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
    pub outcomes: Vec<GroupOutcome>,
}

impl RunSummary {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed_groups(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(GroupOutcome::group)
            .collect()
    }

    pub fn status(&self) -> RunStatus {
        let ok = self.success_count();
        if ok == self.outcomes.len() {
            RunStatus::Success
        } else if ok > 0 {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        }
    }

    /// End-of-run chat message.
    pub fn chat_message(&self) -> String {
        let status = self.status();
        let lines: Vec<String> = self.outcomes.iter().map(GroupOutcome::status_line).collect();
        format!(
            "{} <b>Отчеты сгенерированы {}</b>\nРезультаты:\n{}\n\n✅ Успешно: {}/{}\n🕒 Завершено: {}",
            status.icon(),
            status.label(),
            lines.join("\n"),
            self.success_count(),
            self.outcomes.len(),
            self.finished_at.format("%H:%M"),
        )
    }

    /// End-of-run console report.
    pub fn console_report(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = format!(
            "{rule}\nREPORT RUN SUMMARY\nSucceeded: {}/{}\n",
            self.success_count(),
            self.outcomes.len()
        );
        let failed = self.failed_groups();
        if !failed.is_empty() {
            out.push_str(&format!("Failed: {}\n", failed.join(", ")));
        }
        out.push_str(&rule);
        out
    }
}

/// Chat message announcing the start of a run.
pub fn start_message(started_at: NaiveDateTime, group_count: usize) -> String {
    format!(
        "🚀 <b>Запуск генерации отчетов</b>\n📅 {}\n\nНачинаю обработку {} групп...",
        started_at.format("%d.%m.%Y %H:%M"),
        group_count
    )
}

/// Email subject for a group's report.
pub fn email_subject(run_at: NaiveDateTime, display_name: &str) -> String {
    format!("Неработающие камеры {} {}", run_at.format("%d.%m.%Y"), display_name)
}

/// Email body for a group's report.
pub fn email_body(run_at: NaiveDateTime, outage_count: usize) -> String {
    let date = run_at.format("%d.%m.%Y");
    format!(
        "На {date} {outage_count} камер не передают сигнал.\n\n\
         Подробный отчет во вложении.\n\n\
         Отчет сгенерирован: {date} {}",
        run_at.format("%H:%M")
    )
}
