//! Application state: the loaded dataset, chat history and dashboard windows.
//!
//! The session is owned by the UI loop and mutated one event at a time.
//! Backend calls report back as [`BackendEvent`]s which are applied here.

pub mod window;

pub use window::{Window, WindowContent};

use crate::chart::{ChartSpec, export_csv as export_chart_csv};
use crate::config::TableConfig;
use crate::core::{CsvImportOptions, Dataset, WindowId};
use crate::drilldown::{DrillOutcome, drill_down};
use crate::error::{BackendError, OptixError, Result};
use crate::services::csv_loader;
use crate::services::export::{CsvExport, export_file_name};
use crate::services::{AskResponse, UploadReceipt};
use crate::table::TableView;
use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

pub const WELCOME: &str =
    "Welcome to Optix. Upload your inventory CSV to unlock insights.";
pub const MSG_PARSED: &str = "CSV parsed locally.";
pub const MSG_PARSE_ERROR: &str = "CSV parse error.";
pub const MSG_ANALYZED: &str = "CSV analyzed. Ask me anything.";
pub const MSG_UPLOAD_FAILED: &str = "Upload failed.";
pub const MSG_UPLOAD_FIRST: &str = "Upload a CSV before asking questions.";
pub const MSG_WENT_WRONG: &str = "Something went wrong.";

lazy_static! {
    static ref SHOW_PREFIX: Regex = Regex::new(r"(?i)^\s*show(?: me)?(?: the)?\s+").unwrap();
    static ref TRAILING_PUNCT: Regex = Regex::new(r"[?.!]\s*$").unwrap();
    static ref WORD: Regex = Regex::new(r"\b\w+").unwrap();
    static ref CHART_INTENT: Regex = Regex::new(r"(?i)chart").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    /// Status and error notices raised by the app itself
    Notice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub kind: MessageKind,
    pub text: String,
    pub at: DateTime<Local>,
}

impl ChatMessage {
    fn new(sender: Sender, kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            sender,
            kind,
            text: text.into(),
            at: Local::now(),
        }
    }
}

/// Completion of a spawned backend call.
#[derive(Debug)]
pub enum BackendEvent {
    Uploaded(std::result::Result<UploadReceipt, BackendError>),
    Answered {
        question: String,
        result: std::result::Result<AskResponse, BackendError>,
    },
}

/// Window title from a question: drop a leading "show me the", trailing
/// punctuation, and capitalise each word.
pub fn question_to_title(question: &str) -> String {
    let stripped = SHOW_PREFIX.replace(question, "");
    let stripped = TRAILING_PUNCT.replace(&stripped, "");
    WORD.replace_all(&stripped, |caps: &Captures| {
        let word = &caps[0];
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    })
    .into_owned()
}

/// Whether a question asks for a chart.
pub fn wants_chart(question: &str) -> bool {
    CHART_INTENT.is_match(question)
}

#[derive(Debug)]
pub struct Session {
    table: TableConfig,
    csv_options: CsvImportOptions,
    dataset: Option<Dataset>,
    messages: Vec<ChatMessage>,
    windows: Vec<Window>,
    can_ask: bool,
    uploading: bool,
    pending_questions: usize,
    last_answer: Option<String>,
}

impl Session {
    pub fn new(table: TableConfig) -> Self {
        Self {
            table,
            csv_options: CsvImportOptions::default(),
            dataset: None,
            messages: vec![ChatMessage::new(Sender::Bot, MessageKind::Text, WELCOME)],
            windows: Vec::new(),
            can_ask: false,
            uploading: false,
            pending_questions: 0,
            last_answer: None,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn can_ask(&self) -> bool {
        self.can_ask
    }

    pub fn is_busy(&self) -> bool {
        self.uploading || self.pending_questions > 0
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.last_answer.as_deref()
    }

    fn bot(&mut self, text: impl Into<String>) {
        self.messages
            .push(ChatMessage::new(Sender::Bot, MessageKind::Text, text));
    }

    /// Append a notice to the chat.
    pub fn notice(&mut self, text: impl Into<String>) {
        self.messages
            .push(ChatMessage::new(Sender::Bot, MessageKind::Notice, text));
    }

    // Upload flow

    /// Parse a CSV locally. On success the dataset is replaced; on failure the
    /// previous dataset stays. Either way the caller goes on to upload.
    pub fn load_csv(&mut self, name: &str, text: &str) -> bool {
        match csv_loader::parse_dataset(name, text, &self.csv_options) {
            Ok(dataset) => {
                info!("Loaded {}", dataset.summary());
                self.dataset = Some(dataset);
                self.bot(MSG_PARSED);
                true
            }
            Err(e) => {
                warn!("CSV parse of {name} failed: {e}");
                self.notice(MSG_PARSE_ERROR);
                false
            }
        }
    }

    pub fn begin_upload(&mut self) {
        self.uploading = true;
    }

    pub fn finish_upload(&mut self, result: std::result::Result<UploadReceipt, BackendError>) {
        self.uploading = false;
        match result {
            Ok(receipt) => {
                debug!("Upload accepted with status {}", receipt.status);
                self.can_ask = true;
                self.bot(MSG_ANALYZED);
            }
            Err(e) => {
                warn!("Upload failed: {e}");
                self.notice(MSG_UPLOAD_FAILED);
            }
        }
    }

    // Question flow

    /// Record a question. Returns the trimmed text to send, or `None` when the
    /// question is empty or no upload has succeeded yet.
    pub fn submit_question(&mut self, text: &str) -> Option<String> {
        let question = text.trim();
        if question.is_empty() {
            return None;
        }
        if !self.can_ask {
            self.notice(MSG_UPLOAD_FIRST);
            return None;
        }
        self.messages
            .push(ChatMessage::new(Sender::User, MessageKind::Text, question));
        self.pending_questions += 1;
        Some(question.to_string())
    }

    /// Apply a question's answer: append the text and open a chart or table
    /// window when the answer carries a dataframe.
    pub fn apply_answer(
        &mut self,
        question: &str,
        result: std::result::Result<AskResponse, BackendError>,
    ) -> Option<WindowId> {
        self.pending_questions = self.pending_questions.saturating_sub(1);
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Question failed: {e}");
                self.notice(MSG_WENT_WRONG);
                return None;
            }
        };

        let text = response.answer.text();
        self.bot(text.clone());
        self.last_answer = Some(text);

        let frame = response.frame()?.clone();
        let title = question_to_title(question);
        let spec = response
            .chart
            .as_ref()
            .filter(|_| wants_chart(question))
            .and_then(ChartSpec::from_descriptor);
        let content = match spec {
            Some(spec) => WindowContent::Chart { spec, frame },
            None => WindowContent::Table(TableView::new(&frame, &self.table.options())),
        };
        Some(self.push_window(Window::new(title, content, self.dataset.clone())))
    }

    pub fn apply_event(&mut self, event: BackendEvent) -> Option<WindowId> {
        match event {
            BackendEvent::Uploaded(result) => {
                self.finish_upload(result);
                None
            }
            BackendEvent::Answered { question, result } => self.apply_answer(&question, result),
        }
    }

    // Windows

    fn push_window(&mut self, window: Window) -> WindowId {
        let id = window.id;
        debug!("Opening {} window '{}'", window.content.kind_name(), window.title);
        self.windows.push(window);
        id
    }

    pub fn open_text_window(&mut self, title: &str, text: &str) -> WindowId {
        let window = Window::new(
            title,
            WindowContent::Text(text.to_string()),
            self.dataset.clone(),
        );
        self.push_window(window)
    }

    /// Pin the most recent answer as a text window.
    pub fn pin_last_answer(&mut self) -> Option<WindowId> {
        let text = self.last_answer.clone()?;
        Some(self.open_text_window("Pinned Answer", &text))
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn windows_newest_first(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter().rev()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn delete_window(&mut self, id: WindowId) -> Result<Window> {
        let pos = self
            .windows
            .iter()
            .position(|w| w.id == id)
            .ok_or(OptixError::UnknownWindow(id))?;
        Ok(self.windows.remove(pos))
    }

    /// Flip a window's collapsed flag and return the new state.
    pub fn toggle_collapse(&mut self, id: WindowId) -> Result<bool> {
        let window = self
            .window_mut(id)
            .ok_or(OptixError::UnknownWindow(id))?;
        window.collapsed = !window.collapsed;
        Ok(window.collapsed)
    }

    /// Drill into a chart window's category. Opens a detail window when rows
    /// match, otherwise posts a notice. Empty labels and non-chart windows are
    /// ignored.
    pub fn drill_down(&mut self, id: WindowId, label: &str) -> Result<Option<WindowId>> {
        if label.is_empty() {
            return Ok(None);
        }
        let window = self.window(id).ok_or(OptixError::UnknownWindow(id))?;
        let WindowContent::Chart { spec, .. } = &window.content else {
            return Ok(None);
        };
        let rows = window.source.as_ref().map(Dataset::rows).unwrap_or(&[]);
        let outcome = drill_down(rows, label, &spec.x_key);
        let source = window.source.clone();
        let chart_title = window.title.clone();

        match outcome {
            DrillOutcome::Found(result) => {
                let view = TableView::from_rows(result.rows, &self.table.detail_options());
                let window = Window::new(
                    format!("Details: {}", result.label),
                    WindowContent::Detail {
                        chart_title,
                        label: result.label,
                        field: result.field,
                        match_mode: result.match_mode,
                        view,
                    },
                    source,
                );
                Ok(Some(self.push_window(window)))
            }
            other => {
                if let Some(notice) = other.notice() {
                    self.notice(notice);
                }
                Ok(None)
            }
        }
    }

    /// Render a window as CSV. Text windows have nothing to export; detail
    /// exports are named after the chart they were drilled from.
    pub fn export_window(&self, id: WindowId) -> Result<Option<CsvExport>> {
        let window = self.window(id).ok_or(OptixError::UnknownWindow(id))?;
        let export = match &window.content {
            WindowContent::Text(_) => None,
            WindowContent::Table(view) => Some(CsvExport {
                file_name: export_file_name(&window.title, ""),
                contents: view.export_csv()?,
            }),
            WindowContent::Chart { spec, frame } => {
                let data = crate::chart::aggregate(&frame.data, spec);
                Some(CsvExport {
                    file_name: export_file_name(&window.title, "_Chart"),
                    contents: export_chart_csv(&data, spec)?,
                })
            }
            WindowContent::Detail {
                chart_title,
                label,
                view,
                ..
            } => Some(CsvExport {
                file_name: export_file_name(chart_title, &format!("_{label}_drill")),
                contents: view.export_csv()?,
            }),
        };
        Ok(export)
    }
}
