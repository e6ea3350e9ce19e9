//! The window stack: newest window first, one selected at a time.

use super::chart_panel::render_chart;
use super::prompt::PromptKind;
use super::table_panel::{TableCursor, render_table};
use crate::core::WindowId;
use crate::session::{Session, Window, WindowContent};
use crate::tui::action::Action;
use crate::tui::component::{Command, Component, Focusable, Outcome};
use crate::tui::theme::Theme;
use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::collections::HashMap;
use tracing::debug;

const EMPTY_DASHBOARD: &str = "No windows yet. Upload a CSV and ask a question to build your dashboard.";

pub struct Dashboard {
    /// Index into the newest-first window order
    selected: usize,
    table_cursors: HashMap<WindowId, TableCursor>,
    chart_cursors: HashMap<WindowId, usize>,
    focused: bool,
    supported_actions: Vec<Action>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            selected: 0,
            table_cursors: HashMap::new(),
            chart_cursors: HashMap::new(),
            focused: true,
            supported_actions: vec![
                Action::MoveUp,
                Action::MoveDown,
                Action::MoveLeft,
                Action::MoveRight,
                Action::NextPage,
                Action::PrevPage,
                Action::FirstPage,
                Action::LastPage,
                Action::NextWindow,
                Action::PrevWindow,
                Action::ToggleCollapse,
                Action::DeleteWindow,
                Action::PinAnswer,
                Action::Sort,
                Action::Filter,
                Action::Find,
                Action::ClearFilters,
                Action::CyclePageSize,
                Action::HideColumn,
                Action::ShowAllColumns,
                Action::Export,
                Action::Confirm,
            ],
        }
    }

    pub fn selected_id(&self, session: &Session) -> Option<WindowId> {
        let count = session.window_count();
        if count == 0 {
            return None;
        }
        session
            .windows_newest_first()
            .nth(self.selected.min(count - 1))
            .map(|w| w.id)
    }

    /// Select a window by id; unknown ids leave the selection alone.
    pub fn select(&mut self, id: WindowId, session: &Session) {
        if let Some(pos) = session.windows_newest_first().position(|w| w.id == id) {
            self.selected = pos;
        }
    }

    pub fn table_cursor(&self, id: WindowId) -> TableCursor {
        self.table_cursors.get(&id).copied().unwrap_or_default()
    }

    pub fn chart_cursor(&self, id: WindowId) -> usize {
        self.chart_cursors.get(&id).copied().unwrap_or(0)
    }

    /// Apply a submitted filter prompt.
    pub fn apply_filter(&mut self, kind: &PromptKind, text: &str, session: &mut Session) {
        let (window, column) = match kind {
            PromptKind::ColumnFilter { window, column } => (*window, Some(column.as_str())),
            PromptKind::GlobalFilter { window } => (*window, None),
            PromptKind::UploadPath => return,
        };
        let Some(view) = session.window_mut(window).and_then(Window::table_mut) else {
            return;
        };
        match column {
            Some(column) => view.set_column_filter(column, text),
            None => view.set_global_filter(text),
        }
        let cursor = self.table_cursors.entry(window).or_default();
        cursor.clamp(view);
    }

    fn handle_table_action(
        &mut self,
        id: WindowId,
        action: Action,
        session: &mut Session,
    ) -> Outcome {
        let Some(view) = session.window_mut(id).and_then(Window::table_mut) else {
            return Outcome::Ignored;
        };
        let cursor = self.table_cursors.entry(id).or_default();
        let column = cursor.column(view).map(str::to_string);

        match action {
            Action::MoveUp => cursor.move_up(),
            Action::MoveDown => cursor.move_down(view),
            Action::MoveLeft => cursor.move_left(),
            Action::MoveRight => cursor.move_right(view),
            Action::NextPage => {
                view.next_page();
                cursor.row = 0;
            }
            Action::PrevPage => {
                view.prev_page();
                cursor.row = 0;
            }
            Action::FirstPage => {
                view.first_page();
                cursor.row = 0;
            }
            Action::LastPage => {
                view.last_page();
                cursor.row = 0;
            }
            Action::Sort => {
                if let Some(column) = column {
                    view.cycle_sort(&column);
                }
            }
            Action::Filter => {
                return match column {
                    Some(column) => Outcome::Command(Command::Prompt(PromptKind::ColumnFilter {
                        window: id,
                        column,
                    })),
                    None => Outcome::Consumed,
                };
            }
            Action::Find => {
                return Outcome::Command(Command::Prompt(PromptKind::GlobalFilter { window: id }));
            }
            Action::ClearFilters => view.clear_filters(),
            Action::CyclePageSize => view.cycle_page_size(),
            Action::HideColumn => {
                // The last visible column stays.
                if let Some(column) = column
                    && view.visible_columns().len() > 1
                {
                    view.set_column_visible(&column, false);
                }
            }
            Action::ShowAllColumns => view.show_all_columns(),
            _ => return Outcome::Ignored,
        }
        cursor.clamp(view);
        Outcome::Consumed
    }

    fn handle_chart_action(
        &mut self,
        id: WindowId,
        action: Action,
        session: &mut Session,
    ) -> Result<Outcome> {
        let Some(data) = session.window(id).and_then(Window::chart_data) else {
            return Ok(Outcome::Ignored);
        };
        let len = data.len();
        let cursor = self.chart_cursors.entry(id).or_insert(0);
        match action {
            Action::MoveLeft | Action::MoveUp => *cursor = cursor.saturating_sub(1),
            Action::MoveRight | Action::MoveDown => {
                if len > 0 && *cursor < len - 1 {
                    *cursor += 1;
                }
            }
            Action::FirstPage => *cursor = 0,
            Action::LastPage => *cursor = len.saturating_sub(1),
            Action::Confirm => {
                let categories = data.categories();
                let Some(label) = categories.get(*cursor) else {
                    return Ok(Outcome::Consumed);
                };
                debug!("Drilling into '{label}'");
                if let Some(new_id) = session.drill_down(id, label)? {
                    self.selected = 0;
                    debug!("Opened detail window {new_id}");
                }
            }
            _ => return Ok(Outcome::Ignored),
        }
        Ok(Outcome::Consumed)
    }

    fn render_window(
        &self,
        frame: &mut Frame,
        area: Rect,
        window: &Window,
        selected: bool,
        theme: &Theme,
    ) {
        let active = selected && self.focused;
        if window.collapsed {
            let marker = if selected { "▸ " } else { "  " };
            let line = Line::from(vec![
                Span::styled(marker, theme.border_style(active)),
                Span::styled(window.title.clone(), theme.header_style()),
                Span::styled(
                    format!("  [{}, collapsed]", window.content.kind_name()),
                    theme.muted_style(),
                ),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(active))
            .title(format!(" {} ", window.title))
            .title(
                Line::from(Span::styled(
                    format!(" {} ", window.content.kind_name()),
                    theme.muted_style(),
                ))
                .right_aligned(),
            );
        if let WindowContent::Detail {
            field, match_mode, ..
        } = &window.content
        {
            block = block.title_bottom(Line::from(Span::styled(
                format!(" {field}, {match_mode} "),
                theme.muted_style(),
            )));
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match &window.content {
            WindowContent::Text(text) => {
                frame.render_widget(
                    Paragraph::new(text.as_str())
                        .style(theme.normal_style())
                        .wrap(Wrap { trim: false }),
                    inner,
                );
            }
            WindowContent::Table(view) | WindowContent::Detail { view, .. } => {
                render_table(frame, inner, view, self.table_cursor(window.id), active, theme);
            }
            WindowContent::Chart { spec, .. } => {
                if let Some(data) = window.chart_data() {
                    let cursor = self.chart_cursor(window.id).min(data.len().saturating_sub(1));
                    render_chart(frame, inner, spec, &data, cursor, theme);
                }
            }
        }
    }
}

impl Component for Dashboard {
    fn handle_action(&mut self, action: Action, session: &mut Session) -> Result<Outcome> {
        let count = session.window_count();
        match action {
            Action::NextWindow => {
                if count > 0 {
                    self.selected = (self.selected + 1) % count;
                }
                return Ok(Outcome::Consumed);
            }
            Action::PrevWindow => {
                if count > 0 {
                    self.selected = (self.selected + count - 1) % count;
                }
                return Ok(Outcome::Consumed);
            }
            Action::PinAnswer => {
                if session.pin_last_answer().is_some() {
                    self.selected = 0;
                } else {
                    session.notice("No answer to pin yet.");
                }
                return Ok(Outcome::Consumed);
            }
            _ => {}
        }

        let Some(id) = self.selected_id(session) else {
            return Ok(Outcome::Ignored);
        };

        match action {
            Action::ToggleCollapse => {
                session.toggle_collapse(id)?;
                Ok(Outcome::Consumed)
            }
            Action::DeleteWindow => {
                session.delete_window(id)?;
                self.table_cursors.remove(&id);
                self.chart_cursors.remove(&id);
                self.selected = self.selected.min(session.window_count().saturating_sub(1));
                Ok(Outcome::Consumed)
            }
            Action::Export => Ok(Outcome::Command(Command::Export(id))),
            _ => {
                let Some(window) = session.window(id) else {
                    return Ok(Outcome::Ignored);
                };
                if window.collapsed {
                    return Ok(Outcome::Ignored);
                }
                if matches!(window.content, WindowContent::Chart { .. }) {
                    self.handle_chart_action(id, action, session)
                } else {
                    // Text windows have no table and fall through as ignored.
                    Ok(self.handle_table_action(id, action, session))
                }
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
        let windows: Vec<&Window> = session.windows_newest_first().collect();
        if windows.is_empty() {
            let middle = Rect {
                y: area.y + area.height / 2,
                height: 1.min(area.height),
                ..area
            };
            frame.render_widget(
                Paragraph::new(EMPTY_DASHBOARD)
                    .style(theme.muted_style())
                    .alignment(Alignment::Center),
                middle,
            );
            return;
        }
        self.selected = self.selected.min(windows.len() - 1);

        let constraints: Vec<Constraint> = windows
            .iter()
            .enumerate()
            .map(|(i, w)| {
                if w.collapsed {
                    Constraint::Length(1)
                } else if i == self.selected {
                    Constraint::Fill(3)
                } else {
                    Constraint::Fill(1)
                }
            })
            .collect();
        let areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (i, (window, slot)) in windows.iter().zip(areas.iter()).enumerate() {
            if slot.height == 0 {
                continue;
            }
            self.render_window(frame, *slot, window, i == self.selected, theme);
        }
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "Dashboard"
    }
}

impl Focusable for Dashboard {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::core::{Row, TabularFrame};
    use crate::services::{Answer, AskResponse, ChartDescriptor, UploadReceipt};
    use serde_json::json;

    fn session_with_upload(csv: &str) -> Session {
        let mut session = Session::new(TableConfig::default());
        assert!(session.load_csv("inventory.csv", csv));
        session.finish_upload(Ok(UploadReceipt {
            status: 200,
            body: String::new(),
        }));
        session
    }

    fn frame() -> TabularFrame {
        TabularFrame::new(
            vec!["Supplier".into(), "Qty".into()],
            vec![
                Row::from_pairs([("Supplier", json!("Acme")), ("Qty", json!(5))]),
                Row::from_pairs([("Supplier", json!("Globex")), ("Qty", json!(2))]),
            ],
        )
    }

    fn answer(session: &mut Session, question: &str, chart: bool) -> WindowId {
        session.submit_question(question).unwrap();
        let response = AskResponse {
            answer: Answer::Text("done".into()),
            is_dataframe: true,
            dataframe: Some(frame()),
            chart: chart.then(|| ChartDescriptor {
                kind: Some("bar".into()),
                x_key: Some("Supplier".into()),
                y_key: Some("Qty".into()),
            }),
        };
        session.apply_answer(question, Ok(response)).unwrap()
    }

    const CSV: &str = "Supplier,Item,Qty\nAcme,Bolt,5\nGlobex,Nut,2\nAcme,Washer,1\n";

    #[test]
    fn test_window_selection_cycles() {
        let mut session = session_with_upload(CSV);
        let mut dash = Dashboard::new();
        assert_eq!(dash.selected_id(&session), None);

        let first = answer(&mut session, "show suppliers", false);
        let second = answer(&mut session, "qty chart", true);
        assert_eq!(dash.selected_id(&session), Some(second));

        dash.handle_action(Action::NextWindow, &mut session).unwrap();
        assert_eq!(dash.selected_id(&session), Some(first));
        dash.handle_action(Action::NextWindow, &mut session).unwrap();
        assert_eq!(dash.selected_id(&session), Some(second));
        dash.handle_action(Action::PrevWindow, &mut session).unwrap();
        assert_eq!(dash.selected_id(&session), Some(first));
    }

    #[test]
    fn test_chart_confirm_drills_down() {
        let mut session = session_with_upload(CSV);
        let mut dash = Dashboard::new();
        let chart = answer(&mut session, "qty by supplier chart", true);

        let outcome = dash.handle_action(Action::Confirm, &mut session).unwrap();
        assert_eq!(outcome, Outcome::Consumed);
        assert_eq!(session.window_count(), 2);

        let detail = dash.selected_id(&session).unwrap();
        assert_ne!(detail, chart);
        let window = session.window(detail).unwrap();
        assert_eq!(window.title, "Details: Acme");
        assert_eq!(window.table().unwrap().filtered_len(), 2);
    }

    #[test]
    fn test_table_actions() {
        let mut session = session_with_upload(CSV);
        let mut dash = Dashboard::new();
        let id = answer(&mut session, "show suppliers", false);

        dash.handle_action(Action::Sort, &mut session).unwrap();
        let sort = session.window(id).unwrap().table().unwrap().sort().cloned();
        assert_eq!(sort.unwrap().column, "Supplier");

        assert_eq!(
            dash.handle_action(Action::Filter, &mut session).unwrap(),
            Outcome::Command(Command::Prompt(PromptKind::ColumnFilter {
                window: id,
                column: "Supplier".into(),
            }))
        );
        dash.apply_filter(
            &PromptKind::ColumnFilter {
                window: id,
                column: "Supplier".into(),
            },
            "glob",
            &mut session,
        );
        assert_eq!(session.window(id).unwrap().table().unwrap().filtered_len(), 1);

        dash.handle_action(Action::HideColumn, &mut session).unwrap();
        dash.handle_action(Action::HideColumn, &mut session).unwrap();
        let view = session.window(id).unwrap().table().unwrap();
        assert_eq!(view.visible_columns(), vec!["Qty"]);

        assert_eq!(
            dash.handle_action(Action::Export, &mut session).unwrap(),
            Outcome::Command(Command::Export(id))
        );
    }

    #[test]
    fn test_collapse_and_delete() {
        let mut session = session_with_upload(CSV);
        let mut dash = Dashboard::new();
        let id = answer(&mut session, "show suppliers", false);

        dash.handle_action(Action::ToggleCollapse, &mut session).unwrap();
        assert!(session.window(id).unwrap().collapsed);
        assert_eq!(
            dash.handle_action(Action::Sort, &mut session).unwrap(),
            Outcome::Ignored
        );

        dash.handle_action(Action::DeleteWindow, &mut session).unwrap();
        assert_eq!(session.window_count(), 0);
        assert_eq!(
            dash.handle_action(Action::DeleteWindow, &mut session).unwrap(),
            Outcome::Ignored
        );
    }

    #[test]
    fn test_pin_without_answer_posts_notice() {
        let mut session = Session::new(TableConfig::default());
        let mut dash = Dashboard::new();
        dash.handle_action(Action::PinAnswer, &mut session).unwrap();
        assert_eq!(session.window_count(), 0);
        assert_eq!(session.messages().last().unwrap().text, "No answer to pin yet.");
    }
}
