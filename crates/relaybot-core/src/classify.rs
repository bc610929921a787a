use std::sync::OnceLock;

use regex::Regex;

use crate::domain::InboundEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Health,
    Group,
    Enable,
    Disable,
}

impl Command {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "health" => Some(Command::Health),
            "group" => Some(Command::Group),
            "enable" => Some(Command::Enable),
            "disable" => Some(Command::Disable),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Health => "health",
            Command::Group => "group",
            Command::Enable => "enable",
            Command::Disable => "disable",
        }
    }

    /// Commands that mutate the relay state and must bypass the disabled gate.
    pub fn is_admin_control(&self) -> bool {
        matches!(self, Command::Enable | Command::Disable)
    }
}

/// Forwardable payload of a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Content {
    pub text: String,
    pub has_media: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Command(Command),
    /// Text that is nothing but digits, e.g. an id pasted as if the bot could look it up.
    NumericQuery(String),
    Content(Content),
}

impl Classification {
    /// Short label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Command(cmd) => cmd.name(),
            Classification::NumericQuery(_) => "query",
            Classification::Content(c) if c.has_media => "forward media",
            Classification::Content(_) => "forward",
        }
    }
}

/// Extract a recognised command from the leading token of `text`.
///
/// Telegram may send `/cmd@botname arg1 ...`; the bot suffix is ignored.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or("");
    Command::from_token(name)
}

fn numeric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").expect("static regex"))
}

pub fn is_numeric_query(text: &str) -> bool {
    numeric_regex().is_match(text.trim())
}

pub fn classify(event: &InboundEvent) -> Classification {
    if let Some(cmd) = parse_command(&event.text) {
        return Classification::Command(cmd);
    }

    if is_numeric_query(&event.text) {
        return Classification::NumericQuery(event.text.trim().to_string());
    }

    Classification::Content(Content {
        text: event.text.clone(),
        has_media: event.has_media,
    })
}
