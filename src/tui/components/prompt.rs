use crate::core::WindowId;
use crate::tui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Single-line text input with a character cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineInput {
    text: String,
    cursor: usize,
}

impl LineInput {
    pub fn new(initial: &str) -> Self {
        Self {
            text: initial.to_string(),
            cursor: initial.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Take the text out, leaving the input empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Apply an editing key. Returns false for keys that are not edits.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.text.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let at = self.byte_index(self.cursor - 1);
                    self.text.remove(at);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.text.chars().count() {
                    let at = self.byte_index(self.cursor);
                    self.text.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.text.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.chars().count(),
            _ => return false,
        }
        true
    }

    /// The text as spans with the cursor cell highlighted.
    pub fn line(&self, theme: &Theme) -> Line<'static> {
        let at = self.byte_index(self.cursor);
        let (before, rest) = self.text.split_at(at);
        let mut rest_chars = rest.chars();
        let under = rest_chars.next().map(String::from).unwrap_or_else(|| " ".to_string());
        Line::from(vec![
            Span::raw(before.to_string()),
            Span::styled(under, theme.selected_style()),
            Span::raw(rest_chars.collect::<String>()),
        ])
    }
}

/// What a prompt is collecting.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    UploadPath,
    ColumnFilter { window: WindowId, column: String },
    GlobalFilter { window: WindowId },
}

impl PromptKind {
    pub fn title(&self) -> String {
        match self {
            PromptKind::UploadPath => "Upload CSV (path)".to_string(),
            PromptKind::ColumnFilter { column, .. } => format!("Filter '{column}'"),
            PromptKind::GlobalFilter { .. } => "Filter all columns".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptOutcome {
    Pending,
    Cancelled,
    Submitted(String),
}

/// Modal one-line prompt drawn over the dashboard.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    input: LineInput,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: &str) -> Self {
        Self {
            kind,
            input: LineInput::new(initial),
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> PromptOutcome {
        match key.code {
            KeyCode::Esc => PromptOutcome::Cancelled,
            KeyCode::Enter => PromptOutcome::Submitted(self.input.value().to_string()),
            _ => {
                self.input.handle_key(key);
                PromptOutcome::Pending
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = (area.width * 60 / 100).max(30).min(area.width);
        let height = 3.min(area.height);
        let popup = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(format!(" {} (Enter to apply, Esc to cancel) ", self.kind.title()));
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(self.input.line(theme)).block(block), popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_line_editing() {
        let mut input = LineInput::new("acm");
        input.handle_key(&key(KeyCode::Char('e')));
        assert_eq!(input.value(), "acme");
        input.handle_key(&key(KeyCode::Home));
        input.handle_key(&key(KeyCode::Delete));
        assert_eq!(input.value(), "cme");
        input.handle_key(&key(KeyCode::End));
        input.handle_key(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "cm");
        assert!(!input.handle_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert_eq!(input.take(), "cm");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut input = LineInput::new("café");
        input.handle_key(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "caf");
    }

    #[test]
    fn test_prompt_outcomes() {
        let mut prompt = Prompt::new(PromptKind::UploadPath, "");
        for c in "inv.csv".chars() {
            assert_eq!(prompt.handle_key(&key(KeyCode::Char(c))), PromptOutcome::Pending);
        }
        assert_eq!(
            prompt.handle_key(&key(KeyCode::Enter)),
            PromptOutcome::Submitted("inv.csv".to_string())
        );
        assert_eq!(prompt.handle_key(&key(KeyCode::Esc)), PromptOutcome::Cancelled);
    }
}
