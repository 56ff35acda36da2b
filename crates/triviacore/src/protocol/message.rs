//! Message structure

use super::constants::BODY_SIZE;
use super::types::MessageType;

/// A single protocol message: a type code plus a text body
///
/// The body is held as plain text here; the codec pads or truncates it to
/// exactly `BODY_SIZE` bytes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageType,
    pub body: String,
}

impl Message {
    /// Create a message with an arbitrary body
    pub fn new(kind: MessageType, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }

    /// Create a message with an empty body
    pub fn empty(kind: MessageType) -> Self {
        Self::new(kind, String::new())
    }

    pub fn login(username: impl Into<String>) -> Self {
        Self::new(MessageType::Login, username)
    }

    pub fn login_accepted() -> Self {
        Self::new(MessageType::LoginAccepted, "Server: login accepted")
    }

    pub fn login_denied(reason: impl Into<String>) -> Self {
        Self::new(MessageType::LoginDenied, reason)
    }

    pub fn start(banner: impl Into<String>) -> Self {
        Self::new(MessageType::Start, banner)
    }

    pub fn question(text: impl Into<String>) -> Self {
        Self::new(MessageType::Question, text)
    }

    pub fn end_question() -> Self {
        Self::empty(MessageType::EndQuestion)
    }

    pub fn answer(letter: impl Into<String>) -> Self {
        Self::new(MessageType::Answer, letter)
    }

    pub fn end(results: impl Into<String>) -> Self {
        Self::new(MessageType::End, results)
    }

    /// Body bytes as they will appear on the wire, before padding
    ///
    /// Truncates to `BODY_SIZE` at the last UTF-8 character boundary that
    /// fits, and stops at an embedded NUL since the receiver would.
    pub fn body_bytes(&self) -> &[u8] {
        let body = self.body.split('\0').next().unwrap_or_default();
        if body.len() <= BODY_SIZE {
            return body.as_bytes();
        }

        let mut end = BODY_SIZE;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        &body.as_bytes()[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_body_is_untouched() {
        let message = Message::answer("B");
        assert_eq!(message.body_bytes(), b"B");
    }

    #[test]
    fn test_long_body_truncates_on_char_boundary() {
        // 'é' is two bytes, so BODY_SIZE falls in the middle of one
        let body = format!("a{}", "é".repeat(BODY_SIZE));
        let message = Message::question(body);

        let bytes = message.body_bytes();
        assert!(bytes.len() <= BODY_SIZE);
        assert_eq!(bytes.len(), BODY_SIZE - 1);
        assert!(std::str::from_utf8(bytes).is_ok());
    }

    #[test]
    fn test_body_stops_at_nul() {
        let message = Message::login("bob\0trailing");
        assert_eq!(message.body_bytes(), b"bob");
    }
}
