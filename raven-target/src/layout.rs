//! Render templates for document fields and configuration values.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

use crate::event::LogEvent;

/// A render template evaluated against a [`LogEvent`].
///
/// `${message}`, `${level}`, `${logger}`, `${exception}` and `${timestamp}`
/// substitute event data; `${event:KEY}` looks `KEY` up in the event's
/// property map. Tokens with nothing to substitute render empty, everything
/// else is literal text.
///
/// Configuration values are themselves layouts: they are resolved once at
/// activation time against [`LogEvent::empty`], so a literal value passes
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    template: String,
}

impl Layout {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Renders the template against the given event.
    pub fn render(&self, event: &LogEvent) -> String {
        let mut rendered = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("${") {
            rendered.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    rendered.push_str(&substitute(&after[..end], event));
                    rest = &after[end + 1..];
                }
                None => {
                    // Unterminated token; keep the remainder as literal text.
                    rendered.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        rendered.push_str(rest);
        rendered
    }
}

impl From<&str> for Layout {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

impl From<String> for Layout {
    fn from(template: String) -> Self {
        Self::new(template)
    }
}

fn substitute(token: &str, event: &LogEvent) -> String {
    if let Some(key) = token.strip_prefix("event:") {
        return event.property(key.trim()).unwrap_or_default().to_owned();
    }

    match token.trim() {
        "message" => event.message.clone(),
        "level" => event.level.to_string(),
        "logger" => event.logger.clone(),
        "exception" => event.exception.clone().unwrap_or_default(),
        "timestamp" => event
            .timestamp
            .format(&Rfc3339)
            .unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Level;

    fn sample_event() -> LogEvent {
        LogEvent::new(Level::Error, "app.worker", "disk full")
            .with_exception("io error")
            .with_property("host", "web-01")
    }

    #[test]
    fn literal_text_passes_through() {
        let layout = Layout::new("plain value");
        assert_eq!(layout.render(&LogEvent::empty()), "plain value");
    }

    #[test]
    fn event_tokens_substitute() {
        let layout = Layout::new("${level}: ${message} (${logger})");
        assert_eq!(
            layout.render(&sample_event()),
            "Error: disk full (app.worker)"
        );
    }

    #[test]
    fn property_token_reads_the_event_context() {
        let layout = Layout::new("${event:host}");
        assert_eq!(layout.render(&sample_event()), "web-01");
        assert_eq!(layout.render(&LogEvent::empty()), "");
    }

    #[test]
    fn exception_token_renders_empty_when_absent() {
        let layout = Layout::new("${exception}");
        assert_eq!(layout.render(&sample_event()), "io error");
        assert_eq!(layout.render(&LogEvent::empty()), "");
    }

    #[test]
    fn unknown_token_renders_empty() {
        let layout = Layout::new("[${machinename}]");
        assert_eq!(layout.render(&sample_event()), "[]");
    }

    #[test]
    fn unterminated_token_is_literal() {
        let layout = Layout::new("tail ${message");
        assert_eq!(layout.render(&sample_event()), "tail ${message");
    }

    #[test]
    fn timestamp_token_renders_rfc3339() {
        let layout = Layout::new("${timestamp}");
        let rendered = layout.render(&sample_event());
        assert!(rendered.contains('T'), "got {rendered:?}");
    }

    #[test]
    fn deserializes_from_a_plain_string() {
        let layout: Layout = serde_json::from_str(r#""${message}""#).unwrap();
        assert_eq!(layout, Layout::new("${message}"));
    }
}
