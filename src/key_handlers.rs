use crate::app::View;
use crate::pipeline::PipelineStep;
use crate::widget::{ChatWidget, Submission};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};

/// What a terminal event asks the widget to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Toggle,
    Close,
    Quit,
    Insert(char),
    Newline,
    Backspace,
    ScrollUp,
    ScrollDown,
    ScrollToEnd,
}

/// Screen areas of the clickable controls from the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlLayout {
    pub send: Option<Rect>,
    pub close: Option<Rect>,
    pub toggler: Option<Rect>,
    pub transcript: Option<Rect>,
}

impl ControlLayout {
    fn hit(area: Option<Rect>, column: u16, row: u16) -> bool {
        area.is_some_and(|r| r.contains(Position::new(column, row)))
    }
}

pub fn map_event(event: &Event, open: bool, layout: &ControlLayout) -> Option<Action> {
    match event {
        Event::Key(key) => map_key(key, open),
        Event::Mouse(mouse) => map_mouse(mouse, open, layout),
        _ => None,
    }
}

pub fn map_key(key: &KeyEvent, open: bool) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return Some(Action::Quit),
        KeyCode::Char('t') if ctrl => return Some(Action::Toggle),
        KeyCode::F(2) => return Some(Action::Toggle),
        _ => {}
    }

    // The input only has focus while the widget is open.
    if !open {
        return None;
    }

    match key.code {
        // Terminals without keyboard enhancement report Shift+Enter as plain Enter,
        // so Alt+Enter also breaks the line.
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            Some(Action::Newline)
        }
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Char('s') if ctrl => Some(Action::Submit),
        KeyCode::Esc => Some(Action::Close),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::PageUp => Some(Action::ScrollUp),
        KeyCode::PageDown => Some(Action::ScrollDown),
        KeyCode::End if ctrl => Some(Action::ScrollToEnd),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Action::Insert(c)),
        _ => None,
    }
}

pub fn map_mouse(mouse: &MouseEvent, open: bool, layout: &ControlLayout) -> Option<Action> {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if ControlLayout::hit(layout.toggler, column, row) {
                Some(Action::Toggle)
            } else if !open {
                None
            } else if ControlLayout::hit(layout.close, column, row) {
                Some(Action::Close)
            } else if ControlLayout::hit(layout.send, column, row) {
                Some(Action::Submit)
            } else {
                None
            }
        }
        MouseEventKind::ScrollUp if open && ControlLayout::hit(layout.transcript, column, row) => {
            Some(Action::ScrollUp)
        }
        MouseEventKind::ScrollDown if open && ControlLayout::hit(layout.transcript, column, row) => {
            Some(Action::ScrollDown)
        }
        _ => None,
    }
}

/// What a key asks of the app outside the chat widget: switching views, or
/// driving the pipeline and evaluation panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Show(View),
    RunStep(PipelineStep),
    Refresh,
    Up,
    Down,
    Quit,
}

/// Maps keys for view switching and the panels. Returns `None` for keys the chat
/// widget should handle instead.
pub fn map_panel_key(key: &KeyEvent, view: View) -> Option<PanelAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::F(1) => return Some(PanelAction::Show(View::Chat)),
        KeyCode::F(3) => return Some(PanelAction::Show(View::Pipeline)),
        KeyCode::F(4) => return Some(PanelAction::Show(View::Evaluation)),
        _ => {}
    }
    if view == View::Chat {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(PanelAction::Quit),
        KeyCode::Esc => Some(PanelAction::Show(View::Chat)),
        KeyCode::Up | KeyCode::PageUp => Some(PanelAction::Up),
        KeyCode::Down | KeyCode::PageDown => Some(PanelAction::Down),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) if view == View::Pipeline => {
            PipelineStep::from_shortcut(c).map(PanelAction::RunStep)
        }
        KeyCode::Char('r') if view == View::Evaluation => Some(PanelAction::Refresh),
        _ => None,
    }
}

/// Applies an action to the widget. Returns a submission when one was accepted.
pub fn apply_action(action: Action, widget: &mut ChatWidget) -> Option<Submission> {
    match action {
        Action::Submit => return widget.submit(),
        Action::Toggle => widget.toggle(),
        Action::Close => widget.close(),
        Action::Insert(c) => widget.insert_char(c),
        Action::Newline => widget.insert_newline(),
        Action::Backspace => widget.backspace(),
        Action::ScrollUp => widget.scroll_up(),
        Action::ScrollDown => widget.scroll_down(),
        Action::ScrollToEnd => widget.scroll_to_end(),
        Action::Quit => {}
    }
    None
}
