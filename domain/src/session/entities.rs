//! Session domain entities

use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// Role of a message in a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// An image attached to a user message, already base64-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// MIME type, e.g. `image/png`
    pub media_type: String,
    /// Base64 payload (no `data:` prefix)
    pub data: String,
}

impl ImageRef {
    pub fn new(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Render as a `data:` URL
    ///
    /// ```
    /// use docent_domain::ImageRef;
    ///
    /// let img = ImageRef::new("image/png", "AAAA");
    /// assert_eq!(img.data_url(), "data:image/png;base64,AAAA");
    /// ```
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Guess a media type from a file extension, defaulting to PNG
    pub fn media_type_for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "image/png",
        }
    }
}

/// A message in a transcript (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Set on assistant messages that requested a tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCall>,
    /// Set on tool messages: id of the call this result answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Set on tool messages: canonical tool name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
}

impl Message {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call: None,
            tool_call_id: None,
            tool_name: None,
            images: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Assistant turn that requested `call`
    pub fn assistant_tool_call(call: ToolCall) -> Self {
        Self {
            tool_call: Some(call),
            ..Self::plain(Role::Assistant, "")
        }
    }

    /// Tool result message answering the call with `call_id`
    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            tool_name: Some(tool_name.into()),
            ..Self::plain(Role::Tool, content)
        }
    }

    pub fn with_images(mut self, images: Vec<ImageRef>) -> Self {
        self.images = images;
        self
    }
}

/// One prior exchange supplied as conversation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    fn to_message(&self) -> Message {
        match self.role {
            Role::Assistant => Message::assistant(&self.content),
            _ => Message::user(&self.content),
        }
    }
}

/// Ordered message sequence exchanged with the planner during one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(system_prompt: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.push(Message::system(system_prompt));
        transcript
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append the most recent `max_turns` history turns
    pub fn push_history(&mut self, history: &[ConversationTurn], max_turns: usize) {
        let skip = history.len().saturating_sub(max_turns);
        self.messages
            .extend(history.iter().skip(skip).map(ConversationTurn::to_message));
    }

    /// Append a tool call and its result as an assistant/tool message pair
    pub fn push_tool_exchange(&mut self, call: ToolCall, result_text: impl Into<String>) {
        let call_id = call
            .native_id
            .clone()
            .unwrap_or_else(|| format!("call_{}", self.tool_call_count()));
        let tool_name = call.tool_name.clone();
        let call = call.with_native_id(call_id.clone());
        self.push(Message::assistant_tool_call(call));
        self.push(Message::tool_result(call_id, tool_name, result_text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn tool_call_count(&self) -> usize {
        self.messages.iter().filter(|m| m.tool_call.is_some()).count()
    }
}
