//! Message type enumeration

/// Message types
///
/// The discriminant is the code written to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    /// Client's answer letter for the round that just closed
    Answer = 0,
    LoginAccepted = 1,
    /// Body carries the reason
    LoginDenied = 2,
    /// Body carries the requested username
    Login = 3,
    Question = 4,
    /// Submission signal
    EndQuestion = 5,
    Start = 6,
    /// Body carries the final standings
    End = 7,
    /// Decode-failure sentinel for codes we don't know
    None = 8,
}

impl MessageType {
    /// Convert from u16
    ///
    /// Unknown codes map to `MessageType::None`.
    pub const fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::Answer,
            1 => Self::LoginAccepted,
            2 => Self::LoginDenied,
            3 => Self::Login,
            4 => Self::Question,
            5 => Self::EndQuestion,
            6 => Self::Start,
            7 => Self::End,
            _ => Self::None,
        }
    }

    /// Convert to u16
    pub const fn to_u16(self) -> u16 {
        self as u16
    }
}
