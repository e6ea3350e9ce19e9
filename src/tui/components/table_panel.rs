use crate::table::TableView;
use crate::tui::theme::Theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
};

const MAX_COLUMN_WIDTH: usize = 30;

/// Cursor within the current page of a table window.
///
/// `row` indexes the page rows, `col` indexes the visible columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCursor {
    pub row: usize,
    pub col: usize,
}

impl TableCursor {
    /// Pull the cursor back inside the view after paging, filtering or hiding
    /// a column.
    pub fn clamp(&mut self, view: &TableView) {
        let rows = view.page_rows().len();
        let cols = view.visible_columns().len();
        self.row = self.row.min(rows.saturating_sub(1));
        self.col = self.col.min(cols.saturating_sub(1));
    }

    pub fn move_up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn move_down(&mut self, view: &TableView) {
        let rows = view.page_rows().len();
        if rows > 0 && self.row < rows - 1 {
            self.row += 1;
        }
    }

    pub fn move_left(&mut self) {
        self.col = self.col.saturating_sub(1);
    }

    pub fn move_right(&mut self, view: &TableView) {
        let cols = view.visible_columns().len();
        if cols > 0 && self.col < cols - 1 {
            self.col += 1;
        }
    }

    /// Raw column name under the cursor.
    pub fn column<'a>(&self, view: &'a TableView) -> Option<&'a str> {
        view.visible_columns().get(self.col).copied()
    }
}

/// Header text with sort and filter markers.
fn header_text(view: &TableView, column: &str, label: &str) -> String {
    let mut text = label.to_string();
    if let Some(sort) = view.sort()
        && sort.column == column
    {
        text.push(' ');
        text.push_str(&sort.direction.to_string());
    }
    if view.column_filter(column).is_some() {
        text.push_str(" *");
    }
    text
}

/// Pager line: range summary, page buttons and page size.
pub fn pager_line(view: &TableView, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(view.page_summary(), theme.muted_style())];
    let buttons = view.page_buttons();
    if !buttons.is_empty() {
        spans.push(Span::raw("   « "));
        let current = view.page_index() + 1;
        for page in buttons {
            if page == current {
                spans.push(Span::styled(format!("[{page}]"), theme.selected_style()));
            } else {
                spans.push(Span::raw(format!(" {page} ")));
            }
        }
        spans.push(Span::raw(" »"));
    }
    spans.push(Span::styled(
        format!("   {}/page", view.page_size().rows()),
        theme.muted_style(),
    ));
    if !view.global_filter().is_empty() {
        spans.push(Span::styled(
            format!("   filter: {}", view.global_filter()),
            theme.info_style(),
        ));
    }
    Line::from(spans)
}

/// Render the current page of `view` with the cursor highlighted.
pub fn render_table(
    frame: &mut Frame,
    area: Rect,
    view: &TableView,
    cursor: TableCursor,
    focused: bool,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(area);

    let columns = view.visible_columns();
    let labels = view.header_labels();
    let page = view.page_rows();

    let headers: Vec<String> = columns
        .iter()
        .zip(&labels)
        .map(|(c, l)| header_text(view, c, l))
        .collect();
    let cells: Vec<Vec<String>> = page
        .iter()
        .map(|row| columns.iter().map(|c| view.display_cell(row, c)).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
                .clamp(3, MAX_COLUMN_WIDTH)
        })
        .collect();

    // Scroll horizontally so the cursor column fits.
    let available = chunks[0].width as usize;
    let col = cursor.col.min(widths.len().saturating_sub(1));
    let mut left = 0;
    while left < col && widths[left..=col].iter().map(|w| w + 1).sum::<usize>() > available {
        left += 1;
    }

    // Scroll vertically the same way.
    let body_height = (chunks[0].height as usize).saturating_sub(1).max(1);
    let top = cursor.row.saturating_sub(body_height - 1);

    let header = Row::new(headers.iter().skip(left).map(|h| Cell::from(h.clone())))
        .style(theme.header_style());

    let rows: Vec<Row> = cells
        .iter()
        .enumerate()
        .skip(top)
        .take(body_height)
        .map(|(r, values)| {
            let row_cells = values.iter().enumerate().skip(left).map(|(c, value)| {
                let cell = Cell::from(value.clone());
                if focused && r == cursor.row && c == cursor.col {
                    cell.style(theme.selected_cell_style())
                } else {
                    cell
                }
            });
            let style = if focused && r == cursor.row {
                theme.selected_style()
            } else if r % 2 == 1 {
                theme.alt_row_style()
            } else {
                theme.normal_style()
            };
            Row::new(row_cells).style(style)
        })
        .collect();

    let constraints = widths
        .iter()
        .skip(left)
        .map(|w| Constraint::Length(*w as u16));
    let table = Table::new(rows, constraints).header(header).column_spacing(1);

    frame.render_widget(table, chunks[0]);
    frame.render_widget(Paragraph::new(pager_line(view, theme)), chunks[1]);
}
