//! Chat components sent to players
//!
//! Components serialize to the usual JSON chat shape (`text`, `color`,
//! `clickEvent`, `extra`) so a host can forward them untouched.

use serde::{Deserialize, Serialize};

use crate::types::MessageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatColor {
    Gray,
    Red,
    Green,
    Yellow,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    RunCommand,
    SuggestCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub action: ClickAction,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatComponent {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ChatColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_event: Option<ClickEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<ChatComponent>,
}

impl ChatComponent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn colored(text: impl Into<String>, color: ChatColor) -> Self {
        Self::text(text).with_color(color)
    }

    pub fn with_color(mut self, color: ChatColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn on_click_run(mut self, command: impl Into<String>) -> Self {
        self.click_event = Some(ClickEvent {
            action: ClickAction::RunCommand,
            value: command.into(),
        });
        self
    }

    pub fn append(&mut self, child: ChatComponent) -> &mut Self {
        self.extra.push(child);
        self
    }

    /// Text content with all formatting dropped
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        self.write_plain(&mut out);
        out
    }

    fn write_plain(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.extra {
            child.write_plain(out);
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&str> for ChatComponent {
    fn from(text: &str) -> Self {
        ChatComponent::text(text)
    }
}

/// A component together with how the host should present it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub component: ChatComponent,
}

impl ChatMessage {
    pub fn new(kind: MessageKind, component: ChatComponent) -> Self {
        Self { kind, component }
    }

    pub fn information(component: ChatComponent) -> Self {
        Self::new(MessageKind::Information, component)
    }

    pub fn error(component: ChatComponent) -> Self {
        Self::new(MessageKind::Error, component)
    }

    pub fn to_plain(&self) -> String {
        self.component.to_plain()
    }
}

/// Joins components into one, with `delimiter` between consecutive items.
pub fn join<I>(components: I, delimiter: &ChatComponent) -> ChatComponent
where
    I: IntoIterator<Item = ChatComponent>,
{
    let mut joined = ChatComponent::default();
    for (index, component) in components.into_iter().enumerate() {
        if index > 0 {
            joined.append(delimiter.clone());
        }
        joined.append(component);
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_places_delimiter_between_items() {
        let joined = join(
            vec![ChatComponent::text("alice"), ChatComponent::text("bob"), ChatComponent::text("carol")],
            &ChatComponent::text(", "),
        );
        assert_eq!(joined.to_plain(), "alice, bob, carol");
        assert_eq!(joined.extra.len(), 5);
    }

    #[test]
    fn test_join_empty_and_single() {
        let delimiter = ChatComponent::text(", ");
        assert_eq!(join(Vec::new(), &delimiter).to_plain(), "");
        assert_eq!(join(vec![ChatComponent::text("solo")], &delimiter).to_plain(), "solo");
    }

    #[test]
    fn test_json_shape() {
        let mut message = ChatComponent::colored("alice", ChatColor::Gray);
        message.append(ChatComponent::colored(" [X]", ChatColor::Red).on_click_run("/friend remove 42"));

        let json: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();
        assert_eq!(json["text"], "alice");
        assert_eq!(json["color"], "gray");
        assert_eq!(json["extra"][0]["clickEvent"]["action"], "run_command");
        assert_eq!(json["extra"][0]["clickEvent"]["value"], "/friend remove 42");
        assert!(json.get("clickEvent").is_none());
    }
}
