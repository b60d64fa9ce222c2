use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, prelude::*, widgets::*};
use std::io;

use crate::error::{Error, Result};

/// One selectable row. `value` is handed back as-is; display text is never
/// parsed to find out what was picked.
#[derive(Debug, Clone)]
pub struct SelectItem<T> {
    pub title: String,
    pub description: String,
    pub filter_key: String,
    pub value: T,
}

impl<T> SelectItem<T> {
    pub fn new(title: impl Into<String>, description: impl Into<String>, value: T) -> Self {
        let title = title.into();
        Self {
            filter_key: title.clone(),
            title,
            description: description.into(),
            value,
        }
    }
}

pub trait Selector {
    /// Let the user pick one item. Cancelling yields `Error::SelectionCancelled`.
    fn select<T>(&self, title: &str, items: Vec<SelectItem<T>>) -> Result<T>;
}

/// Pick the only item without prompting, otherwise defer to `selector`.
pub fn choose<T>(selector: &impl Selector, title: &str, mut items: Vec<SelectItem<T>>) -> Result<T> {
    if items.len() == 1
        && let Some(only) = items.pop()
    {
        return Ok(only.value);
    }
    selector.select(title, items)
}

struct Picker<T> {
    items: Vec<SelectItem<T>>,
    filter: String,
    visible: Vec<usize>,
    selected: usize,
}

impl<T> Picker<T> {
    fn new(items: Vec<SelectItem<T>>) -> Self {
        let mut picker = Self {
            visible: Vec::new(),
            items,
            filter: String::new(),
            selected: 0,
        };
        picker.refilter();
        picker
    }

    fn refilter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| needle.is_empty() || item.filter_key.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    fn push(&mut self, c: char) {
        self.filter.push(c);
        self.selected = 0;
        self.refilter();
    }

    fn pop(&mut self) {
        self.filter.pop();
        self.refilter();
    }

    fn next(&mut self) {
        if !self.visible.is_empty() {
            self.selected = (self.selected + 1) % self.visible.len();
        }
    }

    fn previous(&mut self) {
        if !self.visible.is_empty() {
            self.selected = self.selected.checked_sub(1).unwrap_or(self.visible.len() - 1);
        }
    }

    fn into_selected(self) -> Option<T> {
        let index = *self.visible.get(self.selected)?;
        self.items.into_iter().nth(index).map(|item| item.value)
    }
}

fn render<T>(frame: &mut Frame, picker: &Picker<T>, title: &str) {
    let [prompt_area, table_area, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let prompt = Line::from(vec![
        Span::styled(format!(" {title} > "), Style::default().fg(Color::Cyan).bold()),
        Span::raw(picker.filter.as_str()),
    ]);
    frame.render_widget(Paragraph::new(prompt), prompt_area);

    let rows: Vec<Row> = picker
        .visible
        .iter()
        .map(|&i| {
            let item = &picker.items[i];
            Row::new(vec![
                Cell::from(item.title.clone()).style(Style::default().fg(Color::Cyan)),
                Cell::from(item.description.clone()).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {}/{} ", picker.visible.len(), picker.items.len()))
                .title_alignment(Alignment::Right),
        )
        .row_highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)));

    let mut state = TableState::default();
    if !picker.visible.is_empty() {
        state.select(Some(picker.selected));
    }
    frame.render_stateful_widget(table, table_area, &mut state);

    let help = Paragraph::new(" type to filter  ↑/↓: navigate  Enter: select  Esc: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area);
}

/// Full-screen list picker drawn on stderr.
pub struct TerminalSelector;

impl TerminalSelector {
    fn run<T>(
        terminal: &mut Terminal<CrosstermBackend<io::Stderr>>,
        mut picker: Picker<T>,
        title: &str,
    ) -> Result<Option<T>> {
        loop {
            terminal.draw(|f| render(f, &picker, title))?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Esc => return Ok(None),
                KeyCode::Char('c') if ctrl => return Ok(None),
                KeyCode::Char('n') if ctrl => picker.next(),
                KeyCode::Char('p') if ctrl => picker.previous(),
                KeyCode::Down => picker.next(),
                KeyCode::Up => picker.previous(),
                KeyCode::Backspace => picker.pop(),
                KeyCode::Char(c) => picker.push(c),
                KeyCode::Enter => return Ok(picker.into_selected()),
                _ => {}
            }
        }
    }
}

impl Selector for TerminalSelector {
    fn select<T>(&self, title: &str, items: Vec<SelectItem<T>>) -> Result<T> {
        if items.is_empty() {
            return Err(Error::SelectionCancelled);
        }

        enable_raw_mode()?;
        let mut stderr = io::stderr();
        crossterm::execute!(stderr, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stderr))?;

        let result = Self::run(&mut terminal, Picker::new(items), title);

        // Restore the terminal even when the loop failed.
        disable_raw_mode()?;
        crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result?.ok_or(Error::SelectionCancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(titles: &[&str]) -> Vec<SelectItem<usize>> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| SelectItem::new(*t, format!("item {i}"), i))
            .collect()
    }

    struct Cancelling;

    impl Selector for Cancelling {
        fn select<T>(&self, _title: &str, _items: Vec<SelectItem<T>>) -> Result<T> {
            Err(Error::SelectionCancelled)
        }
    }

    #[test]
    fn single_item_is_chosen_without_prompt() {
        let value = choose(&Cancelling, "pick", items(&["only"])).unwrap();
        assert_eq!(value, 0);
    }

    #[test]
    fn multiple_items_defer_to_selector() {
        let err = choose(&Cancelling, "pick", items(&["a", "b"])).unwrap_err();
        assert!(matches!(err, Error::SelectionCancelled));
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let mut picker = Picker::new(items(&["feat_login", "main", "Feat_signup"]));
        for c in "FEAT".chars() {
            picker.push(c);
        }
        assert_eq!(picker.visible, vec![0, 2]);
        picker.next();
        assert_eq!(picker.into_selected(), Some(2));
    }

    #[test]
    fn backspace_widens_the_filter() {
        let mut picker = Picker::new(items(&["alpha", "beta"]));
        picker.push('z');
        assert!(picker.visible.is_empty());
        picker.pop();
        assert_eq!(picker.visible, vec![0, 1]);
    }

    #[test]
    fn navigation_wraps() {
        let mut picker = Picker::new(items(&["a", "b", "c"]));
        picker.previous();
        assert_eq!(picker.selected, 2);
        picker.next();
        assert_eq!(picker.selected, 0);
    }

    #[test]
    fn empty_filter_result_selects_nothing() {
        let mut picker = Picker::new(items(&["a"]));
        picker.push('x');
        assert_eq!(picker.into_selected(), None);
    }

    #[test]
    fn filter_key_can_differ_from_title() {
        let mut item = SelectItem::new("feat_login", "[feat/login]", 7);
        item.filter_key = "feat/login feat_login".into();
        let mut picker = Picker::new(vec![item]);
        for c in "t/l".chars() {
            picker.push(c);
        }
        assert_eq!(picker.into_selected(), Some(7));
    }

    #[test]
    fn render_does_not_panic_on_small_terminal() {
        let backend = ratatui::backend::TestBackend::new(20, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let picker = Picker::new(items(&["one", "two"]));
        terminal.draw(|f| render(f, &picker, "Select")).unwrap();
    }
}
