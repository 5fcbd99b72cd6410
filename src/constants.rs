// UI Constants
pub const BUBBLE_TOP: &str = "┌─";
pub const BUBBLE_SIDE: &str = "│ ";
pub const BUBBLE_BOTTOM: &str = "╰─";
pub const USER_INDENT: &str = "    ";

pub const WIDGET_TITLE: &str = " 🤖 Reddit Insights ";
pub const CLOSE_LABEL: &str = "[x]";
pub const SEND_LABEL: &str = "[ Send ]";
pub const TOGGLER_OPEN_LABEL: &str = " 💬 Chat ";
pub const TOGGLER_CLOSE_LABEL: &str = " ✕ ";
pub const INPUT_PLACEHOLDER: &str = "Message...";

pub const THINKING_DOT: &str = "●";
pub const THINKING_DOT_DIM: &str = "○";
pub const THINKING_DOTS: usize = 3;

// Backend Constants
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_ENDPOINT: &str = "/get";
pub const MESSAGE_FIELD: &str = "msg";

/// Shown in place of a reply whenever the backend cannot be reached.
pub const SERVER_UNREACHABLE_TEXT: &str = "⚠️ Error: Unable to reach the server.";

// Environment
pub const SERVER_URL_ENV: &str = "INSIGHT_CHAT_SERVER_URL";
pub const APP_DIR_NAME: &str = "insight-chat";

// Insights server panels
pub const EVALUATION_PATH: &str = "/get_evaluation_results";
pub const MAX_LOG_ENTRIES: usize = 500;
