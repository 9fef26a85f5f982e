use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub content: String,
    pub message_type: MessageType,
    pub created_at: Instant,
    pub auto_clear_duration: Option<Duration>,
}

impl StatusMessage {
    pub fn new(content: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            content: content.into(),
            message_type,
            created_at: Instant::now(),
            auto_clear_duration: Self::default_duration_for_type(message_type),
        }
    }

    pub fn with_duration(
        content: impl Into<String>,
        message_type: MessageType,
        duration: Duration,
    ) -> Self {
        Self {
            auto_clear_duration: Some(duration),
            ..Self::new(content, message_type)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.auto_clear_duration
            .map_or(false, |duration| self.created_at.elapsed() > duration)
    }

    fn default_duration_for_type(message_type: MessageType) -> Option<Duration> {
        match message_type {
            MessageType::Info => Some(Duration::from_secs(3)),
            MessageType::Success => Some(Duration::from_secs(2)),
            MessageType::Warning => Some(Duration::from_secs(5)),
            // errors stay until the next message replaces them
            MessageType::Error => None,
        }
    }
}

/// Transient message line plus the fixed label naming the file being sifted.
#[derive(Debug, Clone, Default)]
pub struct StatusManager {
    current_message: Option<StatusMessage>,
    file_label: String,
}

impl StatusManager {
    pub fn new(file_label: impl Into<String>) -> Self {
        Self {
            current_message: None,
            file_label: file_label.into(),
        }
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Info));
    }

    pub fn set_success(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Success));
    }

    pub fn set_warning(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Warning));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.set(StatusMessage::new(message, MessageType::Error));
    }

    pub fn set(&mut self, message: StatusMessage) {
        self.current_message = Some(message);
    }

    pub fn clear(&mut self) {
        self.current_message = None;
    }

    /// Drop the current message once its display time is over.
    pub fn update(&mut self) {
        if self
            .current_message
            .as_ref()
            .is_some_and(StatusMessage::is_expired)
        {
            self.current_message = None;
        }
    }

    pub fn current_message(&self) -> Option<&StatusMessage> {
        self.current_message.as_ref()
    }

    pub fn file_label(&self) -> &str {
        &self.file_label
    }
}
