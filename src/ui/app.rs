//! Main TUI application state and logic

use crate::interpreter::engine::Executor;
use crate::snapshot::{Snapshot, SnapshotManager};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Lines moved by one PageUp/PageDown
const PAGE: usize = 10;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Stack,
    Heap,
    Transcript,
}

impl FocusedPane {
    /// Move focus to the next pane (stack -> heap -> transcript)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Stack => FocusedPane::Heap,
            FocusedPane::Heap => FocusedPane::Transcript,
            FocusedPane::Transcript => FocusedPane::Stack,
        }
    }

    /// Move focus to the previous pane
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Stack => FocusedPane::Transcript,
            FocusedPane::Heap => FocusedPane::Stack,
            FocusedPane::Transcript => FocusedPane::Heap,
        }
    }
}

/// The main application state
pub struct App {
    /// The simulator driven by the input line
    pub executor: Executor,

    /// Snapshots after every command, for browsing
    pub history: SnapshotManager,

    /// Latest state of the model
    pub live: Snapshot,

    /// Index into `history` while browsing; `None` shows the live state
    pub viewing: Option<usize>,

    /// Command being edited and the cursor (char index) inside it
    pub input: String,
    pub cursor: usize,

    /// Previously submitted commands, oldest first
    pub recall: Vec<String>,
    pub recall_index: Option<usize>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub stack_scroll: usize,
    pub heap_scroll: usize,
    pub transcript_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Outcome of the last command
    pub last_ok: Option<bool>,
}

impl App {
    /// Create a new app around an executor, keeping at most `history_limit`
    /// bytes of snapshots.
    pub fn new(executor: Executor, history_limit: usize) -> Self {
        let live = executor.snapshot();
        let mut history = SnapshotManager::new(history_limit);
        history.push("(start)", live.clone());

        App {
            executor,
            history,
            live,
            viewing: None,
            input: String::new(),
            cursor: 0,
            recall: Vec::new(),
            recall_index: None,
            focused_pane: FocusedPane::Stack,
            stack_scroll: 0,
            heap_scroll: 0,
            transcript_scroll: usize::MAX,
            should_quit: false,
            status_message: String::from("Type a command and press Enter"),
            last_ok: None,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// The snapshot the panes show: a history entry while browsing, else live
    pub fn displayed_snapshot(&self) -> &Snapshot {
        self.viewing
            .and_then(|index| self.history.get(index))
            .map(|recorded| &recorded.snapshot)
            .unwrap_or(&self.live)
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes, input line, status bar
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main_chunks[0]);

        // Right column: Heap (top) | Transcript (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        let snapshot = self
            .viewing
            .and_then(|index| self.history.get(index))
            .map(|recorded| &recorded.snapshot)
            .unwrap_or(&self.live);

        super::panes::render_stack_pane(
            frame,
            columns[0],
            snapshot,
            self.focused_pane == FocusedPane::Stack,
            &mut self.stack_scroll,
        );

        super::panes::render_heap_pane(
            frame,
            right_rows[0],
            snapshot,
            self.focused_pane == FocusedPane::Heap,
            &mut self.heap_scroll,
        );

        super::panes::render_transcript_pane(
            frame,
            right_rows[1],
            self.executor.transcript(),
            self.focused_pane == FocusedPane::Transcript,
            &mut self.transcript_scroll,
        );

        super::panes::render_input_line(
            frame,
            main_chunks[1],
            &self.input,
            self.cursor,
            self.viewing.is_some(),
        );

        super::panes::render_status_bar(
            frame,
            main_chunks[2],
            super::panes::StatusRenderData {
                message: &self.status_message,
                last_ok: self.last_ok,
                position: self.viewing.unwrap_or(self.history.len().saturating_sub(1)),
                total: self.history.len(),
                browsing: self.viewing.is_some(),
            },
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('p') if ctrl => self.browse_older(),
            KeyCode::Char('n') if ctrl => self.browse_newer(),
            KeyCode::Tab => self.focused_pane = self.focused_pane.next(),
            KeyCode::BackTab => self.focused_pane = self.focused_pane.prev(),
            KeyCode::PageUp => {
                let scroll = self.focused_scroll();
                *scroll = (*scroll).saturating_sub(PAGE);
            }
            KeyCode::PageDown => {
                let scroll = self.focused_scroll();
                *scroll = (*scroll).saturating_add(PAGE);
            }
            KeyCode::Up => self.recall_older(),
            KeyCode::Down => self.recall_newer(),
            KeyCode::Enter => self.submit(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.input.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.chars().count(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.input.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.input.chars().count() {
                    let at = self.byte_offset(self.cursor);
                    self.input.remove(at);
                }
            }
            KeyCode::Char(c) if !ctrl => {
                let at = self.byte_offset(self.cursor);
                self.input.insert(at, c);
                self.cursor += 1;
            }
            _ => {}
        }
    }

    /// Run the input line as a command
    pub fn submit(&mut self) {
        let command = self.input.trim().to_string();
        if command.is_empty() {
            return;
        }

        let outcome = self.executor.run(&command);
        self.live = self.executor.snapshot();
        self.history.push(command.clone(), self.live.clone());

        if self.recall.last() != Some(&command) {
            self.recall.push(command);
        }
        self.recall_index = None;
        self.input.clear();
        self.cursor = 0;
        self.viewing = None;

        self.status_message = outcome.message;
        self.last_ok = Some(outcome.ok);
        self.transcript_scroll = usize::MAX;
    }

    fn browse_older(&mut self) {
        let latest = self.history.len().saturating_sub(1);
        let index = self.viewing.unwrap_or(latest);
        if index == 0 {
            self.status_message = "Already at the oldest retained state".to_string();
            return;
        }
        self.viewing = Some(index - 1);
        self.describe_viewed();
    }

    fn browse_newer(&mut self) {
        let Some(index) = self.viewing else {
            return;
        };
        if index + 1 >= self.history.len().saturating_sub(1) {
            self.viewing = None;
            self.status_message = "Back to the live state".to_string();
        } else {
            self.viewing = Some(index + 1);
            self.describe_viewed();
        }
    }

    fn describe_viewed(&mut self) {
        if let Some(recorded) = self.viewing.and_then(|index| self.history.get(index)) {
            self.status_message = format!("Viewing state after: {}", recorded.command);
        }
    }

    fn recall_older(&mut self) {
        if self.recall.is_empty() {
            return;
        }
        let index = match self.recall_index {
            Some(index) => index.saturating_sub(1),
            None => self.recall.len() - 1,
        };
        self.recall_index = Some(index);
        self.set_input(self.recall[index].clone());
    }

    fn recall_newer(&mut self) {
        match self.recall_index {
            Some(index) if index + 1 < self.recall.len() => {
                self.recall_index = Some(index + 1);
                self.set_input(self.recall[index + 1].clone());
            }
            Some(_) => {
                self.recall_index = None;
                self.set_input(String::new());
            }
            None => {}
        }
    }

    fn set_input(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.input = text;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.input.len())
    }

    fn focused_scroll(&mut self) -> &mut usize {
        match self.focused_pane {
            FocusedPane::Stack => &mut self.stack_scroll,
            FocusedPane::Heap => &mut self.heap_scroll,
            FocusedPane::Transcript => &mut self.transcript_scroll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn app() -> App {
        App::new(Executor::new(&SimConfig::default()), 1 << 20)
    }

    fn type_line(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(KeyEvent::from(KeyCode::Char(c)));
        }
        app.handle_key_event(KeyEvent::from(KeyCode::Enter));
    }

    #[test]
    fn test_submit_runs_command() {
        let mut app = app();
        type_line(&mut app, "int x = 3;");

        assert_eq!(app.last_ok, Some(true));
        assert!(app.input.is_empty());
        assert_eq!(app.history.len(), 2);
        assert_eq!(app.displayed_snapshot().frames[0].slots.len(), 1);
    }

    #[test]
    fn test_failed_command_is_reported() {
        let mut app = app();
        type_line(&mut app, "leave;");

        assert_eq!(app.last_ok, Some(false));
        assert_eq!(app.status_message, "cannot leave the root frame 'main'");
    }

    #[test]
    fn test_recall_previous_commands() {
        let mut app = app();
        type_line(&mut app, "int x = 3;");
        type_line(&mut app, "int y = 4;");

        app.handle_key_event(KeyEvent::from(KeyCode::Up));
        assert_eq!(app.input, "int y = 4;");
        app.handle_key_event(KeyEvent::from(KeyCode::Up));
        assert_eq!(app.input, "int x = 3;");
        app.handle_key_event(KeyEvent::from(KeyCode::Down));
        assert_eq!(app.input, "int y = 4;");
        app.handle_key_event(KeyEvent::from(KeyCode::Down));
        assert_eq!(app.input, "");
    }

    #[test]
    fn test_editing_in_the_middle() {
        let mut app = app();
        for c in "int  = 1;".chars() {
            app.handle_key_event(KeyEvent::from(KeyCode::Char(c)));
        }
        app.handle_key_event(KeyEvent::from(KeyCode::Home));
        for _ in 0..4 {
            app.handle_key_event(KeyEvent::from(KeyCode::Right));
        }
        app.handle_key_event(KeyEvent::from(KeyCode::Char('x')));
        assert_eq!(app.input, "int x = 1;");

        app.handle_key_event(KeyEvent::from(KeyCode::Backspace));
        assert_eq!(app.input, "int  = 1;");
    }

    #[test]
    fn test_browsing_history_is_read_only() {
        let mut app = app();
        type_line(&mut app, "int x = 3;");
        type_line(&mut app, "int y = 4;");

        let ctrl_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);

        app.handle_key_event(ctrl_p);
        assert_eq!(app.viewing, Some(1));
        assert_eq!(app.displayed_snapshot().frames[0].slots.len(), 1);
        app.handle_key_event(ctrl_p);
        assert_eq!(app.viewing, Some(0));
        assert!(app.displayed_snapshot().frames[0].slots.is_empty());

        // The model itself is untouched
        assert_eq!(app.executor.snapshot().frames[0].slots.len(), 2);

        app.handle_key_event(ctrl_n);
        app.handle_key_event(ctrl_n);
        assert_eq!(app.viewing, None);
        assert_eq!(app.displayed_snapshot().frames[0].slots.len(), 2);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert!(app.input.is_empty());
    }
}
