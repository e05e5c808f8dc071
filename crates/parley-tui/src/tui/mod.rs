//! Terminal UI wiring: event loop, key handling, and frame layout.
//!
//! The loop owns the [`SessionController`] and is its only driver. Three
//! sources feed it: terminal input, the turn stream channel, and the poll
//! fallback tick. Each event is applied to controller state and answered
//! with a redraw; rendering itself is stateless over that state.

pub mod transcript_view;
pub mod widgets;

use std::io::{self, Stdout};
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use parley_client::{
    ApiClient, POLL_INTERVAL, SessionCommand, SessionController, StreamEvent,
};

use crate::error::{Error, Result};
use transcript_view::TranscriptListState;
use widgets::{CommandHints, SessionPicker, SessionPickerState, StatusBar, TranscriptView, command_for_key};

/// How many sessions the picker asks the server for.
const SESSION_LIST_LIMIT: u32 = 50;

const SIDEBAR_WIDTH: u16 = 34;

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    api: ApiClient,
    controller: SessionController,
    transcript_state: TranscriptListState,
    picker: Option<SessionPickerState>,
}

impl Tui {
    pub fn new(api: ApiClient, controller: SessionController) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, SetTitle("Parley"))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            api,
            controller,
            transcript_state: TranscriptListState::new(),
            picker: None,
        })
    }

    pub async fn run(&mut self, mut stream_rx: mpsc::Receiver<StreamEvent>) -> Result<()> {
        info!(
            target: "parley::tui",
            session_id = %self.controller.session_id(),
            "starting TUI"
        );

        if let Err(e) = self.controller.activate().await {
            self.controller
                .set_notice(format!("initial load failed: {e}"));
        }

        let (term_event_tx, mut term_event_rx) = mpsc::channel::<Result<Event>>(1);
        let input_handle: JoinHandle<()> = tokio::spawn(async move {
            loop {
                // Non-blocking poll
                if event::poll(Duration::ZERO).unwrap_or(false) {
                    match event::read() {
                        Ok(evt) => {
                            if term_event_tx.send(Ok(evt)).await.is_err() {
                                break; // Receiver dropped
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                            // Non-fatal interrupted syscall; keep polling.
                            debug!(target: "parley::tui", "ignoring interrupted syscall");
                            continue;
                        }
                        Err(e) => {
                            warn!(target: "parley::tui", "input error: {}", e);
                            let _ = term_event_tx.send(Err(Error::from(e))).await;
                            break;
                        }
                    }
                } else {
                    // Async sleep that CAN be interrupted by abort
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        });

        let mut poll = tokio::time::interval(POLL_INTERVAL);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut should_exit = false;
        let mut needs_redraw = true; // Force initial draw

        while !should_exit {
            if needs_redraw {
                self.draw()?;
                needs_redraw = false;
            }

            tokio::select! {
                Some(event_res) = term_event_rx.recv() => {
                    match event_res {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            should_exit = self.handle_key_event(key).await;
                            needs_redraw = true;
                        }
                        Ok(Event::Resize(..)) => {
                            needs_redraw = true;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            input_handle.abort();
                            return Err(e);
                        }
                    }
                }
                Some(event) = stream_rx.recv() => {
                    self.controller.apply_stream_event(event);
                    needs_redraw = true;
                }
                _ = poll.tick() => {
                    if self.controller.poll_due() {
                        if let Err(e) = self.controller.poll_tick().await {
                            warn!(target: "parley::tui", error = %e, "poll tick failed");
                        }
                        needs_redraw = true;
                    }
                }
            }
        }

        input_handle.abort();
        self.controller.shutdown();
        Ok(())
    }

    /// Handle one key press. Returns true when the TUI should exit.
    async fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.picker.is_some() {
            self.handle_picker_key(key).await;
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('R') => {
                if let Err(e) = self.controller.refresh().await {
                    self.controller.set_notice(format!("refresh failed: {e}"));
                }
            }
            KeyCode::Tab => self.open_picker().await,
            KeyCode::Esc => self.controller.clear_notice(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.transcript_state.scroll_up(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.transcript_state.scroll_down(1);
            }
            KeyCode::PageUp => {
                let page = self.transcript_state.page_size();
                self.transcript_state.scroll_up(page);
            }
            KeyCode::PageDown => {
                let page = self.transcript_state.page_size();
                self.transcript_state.scroll_down(page);
            }
            KeyCode::Home | KeyCode::Char('g') => self.transcript_state.scroll_to_top(),
            KeyCode::End | KeyCode::Char('G') => self.transcript_state.scroll_to_latest(),
            KeyCode::Char(c) => {
                if let Some(command) = command_for_key(c) {
                    self.dispatch(command).await;
                }
            }
            _ => {}
        }
        false
    }

    async fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('q') => {
                self.picker = None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(picker) = &mut self.picker {
                    picker.select_previous();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(picker) = &mut self.picker {
                    picker.select_next();
                }
            }
            KeyCode::Enter => {
                let selected = self.picker.as_ref().and_then(SessionPickerState::selected_id);
                self.picker = None;
                if let Some(session_id) = selected {
                    if session_id != self.controller.session_id() {
                        self.switch_session(session_id).await;
                    }
                }
            }
            _ => {}
        }
    }

    async fn open_picker(&mut self) {
        match self.api.list_sessions(SESSION_LIST_LIMIT).await {
            Ok(sessions) => self.picker = Some(SessionPickerState::new(sessions)),
            Err(e) => self
                .controller
                .set_notice(format!("failed to list sessions: {e}")),
        }
    }

    async fn switch_session(&mut self, session_id: Uuid) {
        self.transcript_state = TranscriptListState::new();
        if let Err(e) = self.controller.switch_session(session_id).await {
            self.controller
                .set_notice(format!("failed to load session: {e}"));
        }
    }

    /// Dispatch a lifecycle command; rejections become a status-line notice
    /// rather than an exit.
    async fn dispatch(&mut self, command: SessionCommand) {
        if let Err(e) = self.controller.dispatch(command).await {
            self.controller.set_notice(e.to_string());
        }
    }

    fn draw(&mut self) -> Result<()> {
        let controller = &self.controller;
        let transcript_state = &mut self.transcript_state;
        let picker = self.picker.as_mut();
        self.terminal
            .draw(|frame| render(frame, controller, transcript_state, picker))?;
        Ok(())
    }
}

fn render(
    frame: &mut Frame,
    controller: &SessionController,
    transcript_state: &mut TranscriptListState,
    picker: Option<&mut SessionPickerState>,
) {
    let area = frame.area();

    let main_area = if let Some(picker) = picker {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(area);
        frame.render_stateful_widget(SessionPicker, columns[0], picker);
        columns[1]
    } else {
        area
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(main_area);

    let topic = controller
        .session()
        .map_or_else(|| "…".to_string(), |s| s.topic.clone());
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {topic}"),
            Style::default().add_modifier(Modifier::BOLD),
        ))),
        rows[0],
    );

    frame.render_stateful_widget(
        TranscriptView::new(controller.transcript().turns()),
        rows[1],
        transcript_state,
    );

    frame.render_widget(
        StatusBar::new(controller.session(), controller.connection())
            .with_notice(controller.notice()),
        rows[2],
    );
    frame.render_widget(
        CommandHints::new(controller.session().map(|s| &s.status)),
        rows[3],
    );
}

pub fn cleanup_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Helper to wrap terminal cleanup in panic handler
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        // Print panic info to stderr after restoring terminal state
        eprintln!("Application panicked:");
        eprintln!("{panic_info}");
    }));
}

/// High-level entry point for running the TUI against one session.
pub async fn run_tui(api: ApiClient, session_id: Uuid) -> Result<()> {
    setup_panic_hook();

    let (controller, stream_rx) = SessionController::new(api.clone(), session_id);
    // Raw mode may already be on when terminal setup fails partway through;
    // restore it on that path too.
    let mut tui = match Tui::new(api, controller) {
        Ok(tui) => tui,
        Err(e) => {
            cleanup_terminal();
            return Err(e);
        }
    };
    let result = tui.run(stream_rx).await;
    cleanup_terminal();
    result
}
