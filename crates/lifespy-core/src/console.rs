use std::collections::VecDeque;

use crate::logging::{LogEntry, LogLevel};

const MAX_HISTORY: usize = 50;

/// State of the drop-down command console: output lines, input line, history.
pub struct Console {
    pub visible: bool,
    lines: VecDeque<LogEntry>,
    pub input_buffer: String,
    pub cursor_pos: usize,
    scroll_offset: usize,
    max_lines: usize,
    history: VecDeque<String>,
    history_pos: Option<usize>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Console {
    pub fn new(max_lines: usize) -> Self {
        let max_lines = max_lines.max(1);
        Self {
            visible: false,
            lines: VecDeque::new(),
            input_buffer: String::new(),
            cursor_pos: 0,
            scroll_offset: 0,
            max_lines,
            history: VecDeque::new(),
            history_pos: None,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.lines.len() >= self.max_lines {
            self.lines.pop_front();
            if self.scroll_offset > 0 {
                self.scroll_offset -= 1;
            }
        }
        self.lines.push_back(entry);
    }

    /// Append command output at info level.
    pub fn push_line(&mut self, target: &str, message: impl Into<String>) {
        self.push(LogEntry {
            level: LogLevel::Info,
            target: target.to_string(),
            message: message.into(),
        });
    }

    pub fn lines(&self) -> &VecDeque<LogEntry> {
        &self.lines
    }

    pub fn clear_lines(&mut self) {
        self.lines.clear();
        self.scroll_offset = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn scroll_up(&mut self, amount: usize) {
        let max_offset = self.lines.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + amount).min(max_offset);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn insert_char(&mut self, c: char) {
        self.input_buffer.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    fn prev_boundary(&self) -> usize {
        self.input_buffer[..self.cursor_pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            let prev = self.prev_boundary();
            self.input_buffer.remove(prev);
            self.cursor_pos = prev;
        }
    }

    pub fn cursor_left(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos = self.prev_boundary();
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(c) = self.input_buffer[self.cursor_pos..].chars().next() {
            self.cursor_pos += c.len_utf8();
        }
    }

    /// Replace the input line with the previous history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            None => self.history.len() - 1,
            Some(0) => 0,
            Some(p) => p - 1,
        };
        self.history_pos = Some(pos);
        self.set_input(self.history[pos].clone());
    }

    /// Step forward through history; past the newest entry the line is emptied.
    pub fn history_next(&mut self) {
        match self.history_pos {
            None => {}
            Some(p) if p + 1 < self.history.len() => {
                self.history_pos = Some(p + 1);
                self.set_input(self.history[p + 1].clone());
            }
            Some(_) => {
                self.history_pos = None;
                self.set_input(String::new());
            }
        }
    }

    fn set_input(&mut self, input: String) {
        self.cursor_pos = input.len();
        self.input_buffer = input;
    }

    /// Take the input line, remembering non-blank input in history.
    pub fn submit_input(&mut self) -> String {
        let input = std::mem::take(&mut self.input_buffer);
        self.cursor_pos = 0;
        self.history_pos = None;
        if !input.trim().is_empty() && self.history.back() != Some(&input) {
            if self.history.len() >= MAX_HISTORY {
                self.history.pop_front();
            }
            self.history.push_back(input.clone());
        }
        input
    }
}
