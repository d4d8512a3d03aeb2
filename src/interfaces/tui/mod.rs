mod ui;

use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend};
use tracing::error;

use crate::core::console::Console;

const TICK_INTERVAL: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Submit,
    Status,
    Dashboard,
    Reminders,
    Schedule,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Submit,
        Tab::Status,
        Tab::Dashboard,
        Tab::Reminders,
        Tab::Schedule,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Submit => "Submit PO",
            Tab::Status => "Track Status",
            Tab::Dashboard => "Dashboard",
            Tab::Reminders => "Reminders",
            Tab::Schedule => "Schedule",
        }
    }

    fn next(self) -> Tab {
        let index = Tab::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Tab::ALL[(index + 1) % Tab::ALL.len()]
    }

    fn previous(self) -> Tab {
        let index = Tab::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Tab::ALL[(index + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Submit-form fields in display order; the focused one receives keystrokes.
pub const FORM_FIELDS: [&str; 8] = [
    "Requester *",
    "Department *",
    "Amount (USD) *",
    "Vendor",
    "Vendor Status",
    "Priority",
    "Category",
    "Description",
];

pub struct ConsoleTui {
    console: Console,
    active_tab: Tab,
    form_focus: usize,
    should_quit: bool,
    tick: usize,
    render_fault: Option<String>,
}

impl ConsoleTui {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            active_tab: Tab::Submit,
            form_focus: 0,
            should_quit: false,
            tick: 0,
            render_fault: None,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        self.console.init().await;

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = ratatui::backend::CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_app(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
    {
        loop {
            if self.should_quit {
                return Ok(());
            }
            self.tick = self.tick.wrapping_add(1);

            // Rendering faults must never take the console down: a panicking
            // frame flips into the recovery view until the user resets.
            if self.render_fault.is_none() {
                let drawn = catch_unwind(AssertUnwindSafe(|| {
                    terminal.draw(|frame| ui::draw(frame, self)).map(|_| ())
                }));
                match drawn {
                    Ok(result) => {
                        result?;
                    }
                    Err(panic) => {
                        let fault = panic_text(panic);
                        error!("render fault: {fault}");
                        self.render_fault = Some(fault);
                    }
                }
            }
            if self.render_fault.is_some() {
                terminal.draw(|frame| ui::draw_recovery(frame, self))?;
            }

            if event::poll(TICK_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('s') => {
                    let console = &self.console;
                    console.set_sample_data(!console.sample_data());
                }
                _ => {}
            }
            return;
        }

        if self.render_fault.is_some() {
            if key.code == KeyCode::Char('r') {
                self.render_fault = None;
            }
            return;
        }

        match key.code {
            KeyCode::Tab => self.active_tab = self.active_tab.next(),
            KeyCode::BackTab => self.active_tab = self.active_tab.previous(),
            _ => self.handle_tab_key(key),
        }
    }

    fn handle_tab_key(&mut self, key: KeyEvent) {
        match self.active_tab {
            Tab::Submit => match key.code {
                KeyCode::Up => {
                    self.form_focus = (self.form_focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
                }
                KeyCode::Down => self.form_focus = (self.form_focus + 1) % FORM_FIELDS.len(),
                KeyCode::Enter => self.spawn(|console| async move { console.submit().await }),
                KeyCode::Char(c) => self.edit_form_field(|field| field.push(c)),
                KeyCode::Backspace => self.edit_form_field(|field| {
                    field.pop();
                }),
                _ => {}
            },
            Tab::Status => match key.code {
                KeyCode::Enter => self.spawn(|console| async move { console.check_status().await }),
                KeyCode::Char(c) => self
                    .console
                    .with_inputs(|inputs| inputs.search_query.push(c)),
                KeyCode::Backspace => self.console.with_inputs(|inputs| {
                    inputs.search_query.pop();
                }),
                _ => {}
            },
            Tab::Dashboard => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char('r')) {
                    self.spawn(|console| async move { console.load_dashboard().await });
                }
            }
            Tab::Reminders => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char('r')) {
                    self.spawn(|console| async move { console.run_reminder_sweep().await });
                }
            }
            Tab::Schedule => match key.code {
                KeyCode::Char('p') | KeyCode::Enter => {
                    self.spawn(|console| async move { console.toggle_schedule().await });
                }
                KeyCode::Char('t') => {
                    self.spawn(|console| async move { console.trigger_schedule_now().await });
                }
                KeyCode::Char('l') => {
                    self.spawn(|console| async move { console.load_schedule_logs().await });
                }
                KeyCode::Char('r') => {
                    self.spawn(|console| async move {
                        console.refresh_schedule().await;
                        console.load_schedule_logs().await;
                    });
                }
                _ => {}
            },
        }
    }

    fn edit_form_field(&mut self, edit: impl FnOnce(&mut String)) {
        let focus = self.form_focus;
        self.console.with_inputs(|inputs| {
            let field = match focus {
                0 => &mut inputs.form.requester,
                1 => &mut inputs.form.department,
                2 => &mut inputs.form.amount,
                3 => &mut inputs.form.vendor,
                4 => &mut inputs.form.vendor_status,
                5 => &mut inputs.form.priority,
                6 => &mut inputs.form.category,
                _ => &mut inputs.form.description,
            };
            edit(field);
        });
    }

    fn spawn<F, Fut>(&self, op: F)
    where
        F: FnOnce(Console) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(op(self.console.clone()));
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn form_focus(&self) -> usize {
        self.form_focus
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn render_fault(&self) -> Option<&str> {
        self.render_fault.as_deref()
    }
}

fn panic_text(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown rendering fault".to_string()
    }
}
