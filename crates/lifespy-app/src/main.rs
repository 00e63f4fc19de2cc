use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use lifespy_config::Settings;
use lifespy_core::{
    bus::EventBus,
    command::{self, CommandContext, CommandOutput, CommandRegistry},
    console::Console,
    event::Event,
    logging::{self, LogBuffer, LogOptions},
    presenter::StatusPresenter,
    stack::ActivityStack,
    state::AppState,
    tracker::{EventTracker, LifecycleEvent},
};
use lifespy_ui::{
    console::render_console,
    layout::tracker_layout,
    panels::{render_shell, ShellView},
};

const HINTS: &[(&str, &str)] = &[
    ("n", "new activity"),
    ("d", "dialog"),
    ("f", "finish"),
    ("r", "reset"),
    ("`", "console"),
    ("q", "quit"),
];

/// Console command bound to a key outside the console.
fn key_command(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::Char('n') => Some("start"),
        KeyCode::Char('d') => Some("dialog"),
        KeyCode::Char('f') | KeyCode::Backspace => Some("finish"),
        KeyCode::Char('r') => Some("reset"),
        KeyCode::Char('q') | KeyCode::Esc => Some("quit"),
        _ => None,
    }
}

struct App {
    state: AppState,
    tracker: Arc<EventTracker>,
    stack: ActivityStack,
    bus: EventBus,
    presenter: StatusPresenter,
    log_buffer: LogBuffer,
    console: Console,
    commands: CommandRegistry,
}

impl App {
    fn new(settings: &Settings, log_buffer: LogBuffer) -> Result<Self> {
        let tracker = match settings.tracker.capacity {
            Some(cap) => EventTracker::with_capacity(cap),
            None => EventTracker::new(),
        };

        let mut app = Self {
            state: AppState::new(),
            tracker: Arc::new(tracker),
            stack: ActivityStack::new(),
            bus: EventBus::new(),
            presenter: StatusPresenter::new(settings.presenter.refresh()),
            log_buffer,
            console: Console::new(settings.logging.console_lines),
            commands: command::builtin_registry(),
        };

        for name in &settings.session.launch {
            let events = app.stack.launch(name)?;
            app.bus.publish_lifecycle(events);
        }
        app.state.sync_with(&app.stack);
        Ok(app)
    }

    /// Move new entries from the shared log buffer into the console.
    fn sync_logs(&mut self) {
        if let Ok(mut buf) = self.log_buffer.lock() {
            for entry in buf.drain(..) {
                self.console.push(entry);
            }
        }
    }

    /// Run one console command. Returns `true` when the app should quit.
    fn dispatch_command(&mut self, input: &str) -> bool {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.console.push_line("console", format!("> {}", trimmed));

        let mut ctx = CommandContext {
            tracker: &self.tracker,
            stack: &mut self.stack,
            console: &mut self.console,
            bus: &mut self.bus,
            started_at: self.state.started_at,
        };

        let output = self.commands.execute(trimmed, &mut ctx);
        self.state.sync_with(&self.stack);
        self.presenter.schedule(Instant::now());

        match output {
            CommandOutput::Lines(lines) => {
                for line in lines {
                    self.console.push_line("console", line);
                }
                false
            }
            CommandOutput::Quit => true,
        }
    }

    /// Console keys while it is open, bound commands otherwise.
    fn handle_key(&mut self, code: KeyCode) {
        if code == KeyCode::Char('`') || code == KeyCode::Char('~') {
            self.console.toggle();
            return;
        }

        if !self.console.visible {
            if let Some(cmd) = key_command(code) {
                if self.dispatch_command(cmd) {
                    self.bus.publish(Event::Quit);
                }
            }
            return;
        }

        match code {
            KeyCode::Enter => {
                let input = self.console.submit_input();
                if self.dispatch_command(&input) {
                    self.bus.publish(Event::Quit);
                }
            }
            KeyCode::Backspace => self.console.backspace(),
            KeyCode::Left => self.console.cursor_left(),
            KeyCode::Right => self.console.cursor_right(),
            KeyCode::Up => self.console.history_prev(),
            KeyCode::Down => self.console.history_next(),
            KeyCode::PageUp => self.console.scroll_up(10),
            KeyCode::PageDown => self.console.scroll_down(10),
            KeyCode::Esc => self.console.toggle(),
            KeyCode::Char(c) => self.console.insert_char(c),
            _ => {}
        }
    }

    /// Drain the bus. Returns `true` when a quit was requested.
    ///
    /// Consecutive lifecycle events are recorded as one batch, flushed before
    /// any tick or quit so polls see everything published ahead of them.
    fn dispatch_events(&mut self) -> bool {
        let mut pending: Vec<LifecycleEvent> = Vec::new();
        let mut changed = false;
        let mut quit = false;
        for ev in self.bus.drain() {
            if !matches!(ev, Event::Lifecycle(_)) && !pending.is_empty() {
                self.tracker.record_all(&pending);
                pending.clear();
                changed = true;
            }
            match ev {
                Event::Lifecycle(e) => pending.push(e),
                Event::Tick { now } => {
                    self.presenter.poll(now, &self.tracker);
                }
                Event::Quit => {
                    quit = true;
                    break;
                }
            }
        }
        if !pending.is_empty() {
            self.tracker.record_all(&pending);
            changed = true;
        }
        if changed {
            self.presenter.schedule(Instant::now());
        }
        quit
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let (settings, source) = Settings::load()?;

    let log_buffer = logging::init(&LogOptions {
        default_filter: settings.logging.filter.clone(),
        dir: settings.logging.dir.clone(),
        retention_days: settings.logging.retention_days,
        console_lines: settings.logging.console_lines,
    });
    match &source {
        Some(path) => tracing::info!(config = %path.display(), "lifespy starting up"),
        None => tracing::info!("lifespy starting up with default settings"),
    }

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, &settings, log_buffer);
    restore_terminal(terminal)?;
    res
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    settings: &Settings,
    log_buffer: LogBuffer,
) -> Result<()> {
    let mut app = App::new(settings, log_buffer)?;
    let tick_interval = Duration::from_millis(100);
    let poll_timeout = Duration::from_millis(16);
    let mut last_tick = Instant::now();

    loop {
        app.sync_logs();

        // ── Render ──
        terminal.draw(|f| {
            let rects = tracker_layout(f.area(), 40);
            render_shell(
                f,
                rects,
                ShellView {
                    status_line: &app.state.status_line,
                    view: app.presenter.view(),
                    evicted: app.tracker.evicted(),
                    hints: HINTS,
                },
            );
            if app.console.visible {
                render_console(f, f.area(), &app.console, app.tracker.len());
            }
        })?;

        // ── Poll → Publish ──
        if event::poll(poll_timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if last_tick.elapsed() >= tick_interval {
            last_tick = Instant::now();
            app.bus.publish(Event::Tick { now: last_tick });
        }

        // ── Drain → Dispatch ──
        if app.dispatch_events() {
            tracing::info!("lifespy shutting down");
            return Ok(());
        }
    }
}
