use crate::{
    config::Config,
    dispatcher::{Dispatcher, PanelRunner, PanelUpdate, Reply},
    errors::{ChatError, ChatResult},
    evaluation::EvaluationTable,
    key_handlers::{apply_action, map_event, map_panel_key, Action, ControlLayout, PanelAction},
    log_view::LogView,
    ui,
    widget::ChatWidget,
};
use crossterm::{
    cursor::Show,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{error, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    io::{self, Write},
    panic,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

/// Events feeding the UI loop from the input thread.
enum Event {
    Input(CEvent),
    Tick,
}

/// Which screen has the keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Chat,
    Pipeline,
    Evaluation,
}

pub struct App {
    pub widget: ChatWidget,
    pub layout: ControlLayout,
    pub view: View,
    pub pipeline_log: LogView,
    pub evaluation: EvaluationTable,
    pub should_quit: bool,
    dispatcher: Dispatcher,
    replies: mpsc::UnboundedReceiver<Reply>,
    panels: PanelRunner,
    panel_updates: mpsc::UnboundedReceiver<PanelUpdate>,
}

impl App {
    pub fn new(
        config: &Config,
        dispatcher: Dispatcher,
        replies: mpsc::UnboundedReceiver<Reply>,
    ) -> Self {
        let (panels, panel_updates) = PanelRunner::new(config);
        Self {
            widget: ChatWidget::new(config.start_open),
            layout: ControlLayout::default(),
            view: View::Chat,
            pipeline_log: LogView::new(),
            evaluation: EvaluationTable::new(),
            should_quit: false,
            dispatcher,
            replies,
            panels,
            panel_updates,
        }
    }

    /// Runs one terminal event through the trigger surface.
    pub fn handle_event(&mut self, event: &CEvent) {
        if let CEvent::Key(key) = event {
            if let Some(action) = map_panel_key(key, self.view) {
                self.apply_panel_action(action);
                return;
            }
        }
        if self.view != View::Chat {
            return;
        }

        let Some(action) = map_event(event, self.widget.is_open(), &self.layout) else {
            return;
        };
        if action == Action::Quit {
            self.should_quit = true;
            return;
        }
        if let Some(submission) = apply_action(action, &mut self.widget) {
            self.dispatcher.dispatch(submission);
        }
    }

    fn apply_panel_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::Show(view) => {
                self.view = view;
                if view == View::Evaluation && !self.evaluation.has_loaded() {
                    self.refresh_evaluation();
                }
            }
            PanelAction::RunStep(step) => {
                if self.pipeline_log.begin(step) {
                    self.panels.run_step(step);
                } else {
                    info!("Ignoring {}: a pipeline run is already streaming", step);
                }
            }
            PanelAction::Refresh => self.refresh_evaluation(),
            PanelAction::Up => match self.view {
                View::Pipeline => self.pipeline_log.scroll_up(),
                View::Evaluation => self.evaluation.select_prev(),
                View::Chat => {}
            },
            PanelAction::Down => match self.view {
                View::Pipeline => self.pipeline_log.scroll_down(),
                View::Evaluation => self.evaluation.select_next(),
                View::Chat => {}
            },
            PanelAction::Quit => self.should_quit = true,
        }
    }

    fn refresh_evaluation(&mut self) {
        if self.evaluation.begin_refresh() {
            self.panels.refresh_evaluation();
        }
    }

    pub fn handle_reply(&mut self, reply: Reply) {
        self.widget.apply_reply(reply.reply_to, reply.outcome);
    }

    pub fn handle_panel_update(&mut self, update: PanelUpdate) {
        match update {
            PanelUpdate::Pipeline(event) => self.pipeline_log.apply(event),
            PanelUpdate::Evaluation(result) => self.evaluation.apply(result),
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        match self.view {
            View::Chat => self.layout = ui::draw(f, &mut self.widget),
            view => {
                self.layout = ControlLayout::default();
                ui::draw_panel(f, view, &mut self.pipeline_log, &self.evaluation);
            }
        }
    }
}

/// Set while raw mode and the alternate screen are ours to undo.
static TERMINAL_TAKEN: AtomicBool = AtomicBool::new(false);

/// Owns the terminal setup; dropping it puts the terminal back.
struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    fn enter() -> ChatResult<Self> {
        enable_raw_mode()?;
        TERMINAL_TAKEN.store(true, Ordering::SeqCst);
        let mut guard = Self {
            keyboard_enhanced: false,
        };

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        // Without this, most terminals send Shift+Enter as a plain Enter.
        if supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
            guard.keyboard_enhanced = true;
        }
        install_panic_hook(guard.keyboard_enhanced);
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal(self.keyboard_enhanced);
    }
}

/// Restores the terminal before the panic message is printed, so the message
/// lands on the normal screen.
fn install_panic_hook(keyboard_enhanced: bool) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal(keyboard_enhanced);
        previous(info);
    }));
}

/// Undoes the terminal setup. Does nothing unless the terminal is currently
/// taken; every step is attempted even if an earlier one fails.
pub fn restore_terminal(keyboard_enhanced: bool) {
    if TERMINAL_TAKEN.swap(false, Ordering::SeqCst) {
        write_restore(&mut io::stdout(), keyboard_enhanced);
        let _ = disable_raw_mode();
    }
}

fn write_restore<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = execute!(out, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(out, LeaveAlternateScreen, DisableMouseCapture, Show);
}

/// Takes over the terminal, runs the chat until the user quits, then restores it.
pub async fn run(
    config: &Config,
    dispatcher: Dispatcher,
    replies: mpsc::UnboundedReceiver<Reply>,
) -> ChatResult<()> {
    let guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(config, dispatcher, replies);
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let res = run_app(&mut terminal, app, tick_rate).await;

    drop(guard);

    if let Err(err) = &res {
        error!("UI loop ended with error: {}", err);
    }
    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> ChatResult<()> {
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    // crossterm's poll/read block, so they get a thread of their own.
    std::thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            match event::poll(timeout) {
                Ok(true) => {
                    if let Ok(event) = event::read() {
                        if tx.blocking_send(Event::Input(event)).is_err() {
                            return;
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    error!("Failed to poll terminal events: {}", e);
                    return;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.blocking_send(Event::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });

    info!("Chat UI started");
    loop {
        terminal
            .draw(|f| app.draw(f))
            .map_err(|e| ChatError::terminal_error(format!("Failed to draw: {}", e)))?;

        tokio::select! {
            event = rx.recv() => match event {
                Some(Event::Input(event)) => app.handle_event(&event),
                Some(Event::Tick) => app.widget.tick(),
                None => break,
            },
            Some(reply) = app.replies.recv() => app.handle_reply(reply),
            Some(update) = app.panel_updates.recv() => app.handle_panel_update(update),
        }

        if app.should_quit {
            break;
        }
    }

    info!("Chat UI stopped");
    Ok(())
}
