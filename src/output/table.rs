use owo_colors::OwoColorize;

/// Cell color, applied only when colors are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Cyan,
    Green,
    Yellow,
    Magenta,
}

impl Style {
    fn paint(&self, text: &str, use_colors: bool) -> String {
        if !use_colors {
            return text.to_string();
        }
        match self {
            Style::Plain => text.to_string(),
            Style::Cyan => text.cyan().to_string(),
            Style::Green => text.green().to_string(),
            Style::Yellow => text.yellow().to_string(),
            Style::Magenta => text.magenta().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub style: Style,
    pub align: Align,
    /// Flexible columns give up width when the terminal is too narrow.
    pub flexible: bool,
}

impl Column {
    pub fn new(header: &str, style: Style) -> Self {
        Self {
            header: header.to_string(),
            style,
            align: Align::Left,
            flexible: false,
        }
    }

    pub fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    pub fn flexible(mut self) -> Self {
        self.flexible = true;
        self
    }
}

/// Minimal text table: a title line, a header row, and aligned rows.
#[derive(Debug, Clone)]
pub struct Table {
    title: String,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

const SEPARATOR: &str = "  ";
const MIN_FLEX_WIDTH: usize = 10;

impl Table {
    pub fn new(title: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            title: title.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Add a row. Cell text is escaped for the terminal.
    pub fn add_row<S: AsRef<str>>(&mut self, cells: &[S]) {
        let row = (0..self.columns.len())
            .map(|i| cells.get(i).map(|c| escape_cell(c.as_ref())).unwrap_or_default())
            .collect();
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self, max_width: Option<usize>) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(col.header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let Some(max_width) = max_width else {
            return widths;
        };

        let total = |w: &[usize]| w.iter().sum::<usize>() + SEPARATOR.len() * w.len().saturating_sub(1);
        let mut overflow = total(&widths).saturating_sub(max_width);

        for (i, col) in self.columns.iter().enumerate() {
            if overflow == 0 {
                break;
            }
            if col.flexible && widths[i] > MIN_FLEX_WIDTH {
                let give = overflow.min(widths[i] - MIN_FLEX_WIDTH);
                widths[i] -= give;
                overflow -= give;
            }
        }

        widths
    }

    /// Render the table. `max_width` is the terminal width, or `None` when
    /// output is piped and nothing should be truncated.
    pub fn render(&self, use_colors: bool, max_width: Option<usize>) -> String {
        let widths = self.widths(max_width);
        let mut lines = Vec::with_capacity(self.rows.len() + 2);

        if use_colors {
            lines.push(self.title.bold().to_string());
        } else {
            lines.push(self.title.clone());
        }

        let header = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, width)| {
                let cell = pad(&col.header, *width, col.align);
                if use_colors {
                    cell.bold().to_string()
                } else {
                    cell
                }
            })
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        lines.push(header.trim_end().to_string());

        for row in &self.rows {
            let line = self
                .columns
                .iter()
                .zip(&widths)
                .zip(row)
                .map(|((col, width), cell)| {
                    let cell = pad(&truncate_title(cell, *width), *width, col.align);
                    col.style.paint(&cell, use_colors)
                })
                .collect::<Vec<_>>()
                .join(SEPARATOR);
            lines.push(line.trim_end().to_string());
        }

        lines.join("\n")
    }
}

fn pad(text: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{:<width$}", text, width = width),
        Align::Right => format!("{:>width$}", text, width = width),
    }
}

/// Strip control characters so PR text cannot restyle the terminal.
/// Newlines and tabs survive.
pub fn escape_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Single-line version of [`escape_text`] for table cells.
pub fn escape_cell(text: &str) -> String {
    escape_text(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate text to fit available width, accounting for Unicode
pub fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::new(
            "merged PRs",
            vec![
                Column::new("#", Style::Cyan).right(),
                Column::new("title", Style::Green).flexible(),
                Column::new("author", Style::Yellow),
            ],
        );
        table.add_row(&["10", "Fix bug", "octocat"]);
        table.add_row(&["112", "Add a considerably longer feature title", "hubot"]);
        table
    }

    #[test]
    fn test_render_plain() {
        let rendered = sample_table().render(false, None);
        let lines: Vec<&str> = rendered.lines().collect();

        let title = "Add a considerably longer feature title";
        assert_eq!(lines[0], "merged PRs");
        assert_eq!(lines[1], format!("{:>3}  {:<39}  {}", "#", "title", "author"));
        assert_eq!(lines[2], format!("{:>3}  {:<39}  {}", "10", "Fix bug", "octocat"));
        assert_eq!(lines[3], format!("112  {}  hubot", title));
    }

    #[test]
    fn test_render_truncates_flexible_column() {
        let rendered = sample_table().render(false, Some(30));
        let last = rendered.lines().last().unwrap();

        assert_eq!(last, "112  Add a conside...  hubot");
        assert!(last.ends_with("hubot"));
    }

    #[test]
    fn test_render_with_colors_contains_text() {
        let rendered = sample_table().render(true, None);
        assert!(rendered.contains("Fix bug"));
        assert!(rendered.contains('\u{1b}'));
    }

    #[test]
    fn test_escape_text_strips_control_sequences() {
        assert_eq!(escape_text("\u{1b}[31mred\u{1b}[0m\nnext"), "[31mred[0m\nnext");
    }

    #[test]
    fn test_escape_cell_flattens_newlines() {
        assert_eq!(escape_cell("line one\r\nline  two\tend"), "line one line two end");
    }

    #[test]
    fn test_add_row_escapes_cells() {
        let mut table = Table::new("t", vec![Column::new("body", Style::Plain)]);
        table.add_row(&["multi\nline \u{7}bell"]);
        let rendered = table.render(false, None);
        assert_eq!(rendered.lines().last().unwrap(), "multi line bell");
    }

    #[test]
    fn test_truncate_title_short() {
        assert_eq!(truncate_title("Short title", 20), "Short title");
    }

    #[test]
    fn test_truncate_title_long() {
        assert_eq!(truncate_title("This is a very long title", 15), "This is a ve...");
    }

    #[test]
    fn test_truncate_title_unicode() {
        assert_eq!(truncate_title("Hello café world", 10), "Hello c...");
    }

    #[test]
    fn test_truncate_title_very_narrow() {
        assert_eq!(truncate_title("Hello world", 3), "Hel");
    }
}
