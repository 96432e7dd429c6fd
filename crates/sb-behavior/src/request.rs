//! Enabling requests: the one-shot hand-off channel between behaviors.

use std::fmt;
use std::str::FromStr;

use sb_core::CoreError;

/// Classified escape recommendation published by a behavior that sees the
/// robot blocked or not making progress.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EscapeHint {
    /// Blocked ahead, no side preference.
    Any,
    /// Obstacle on the left: back off and turn right.
    Left,
    /// Obstacle on the right: back off and turn left.
    Right,
    /// Rear blocked: escape by driving forward.
    Forward,
    /// Pivot left in place.
    LeftTurn,
    /// Pivot right in place.
    RightTurn,
    /// Back off and turn around.
    FullTurn,
    /// Boxed in: no useful escape.
    None,
}

/// A request asking some other behavior to activate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnablingRequest {
    Escape(EscapeHint),
    /// Free-form hand-off between cooperating behaviors.
    Named(String),
}

impl EnablingRequest {
    /// `true` for every `Escape*` value.
    #[inline]
    pub fn is_escape(&self) -> bool {
        matches!(self, EnablingRequest::Escape(_))
    }

    /// The escape hint, if this is an escape request.
    #[inline]
    pub fn escape_hint(&self) -> Option<EscapeHint> {
        match self {
            EnablingRequest::Escape(hint) => Some(*hint),
            EnablingRequest::Named(_)     => None,
        }
    }
}

impl fmt::Display for EnablingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EnablingRequest::Escape(EscapeHint::Any)       => "Escape",
            EnablingRequest::Escape(EscapeHint::Left)      => "EscapeLeft",
            EnablingRequest::Escape(EscapeHint::Right)     => "EscapeRight",
            EnablingRequest::Escape(EscapeHint::Forward)   => "EscapeForward",
            EnablingRequest::Escape(EscapeHint::LeftTurn)  => "EscapeLeftTurn",
            EnablingRequest::Escape(EscapeHint::RightTurn) => "EscapeRightTurn",
            EnablingRequest::Escape(EscapeHint::FullTurn)  => "EscapeFullTurn",
            EnablingRequest::Escape(EscapeHint::None)      => "EscapeNone",
            EnablingRequest::Named(name)                   => name.as_str(),
        };
        f.write_str(text)
    }
}

impl FromStr for EnablingRequest {
    type Err = CoreError;

    /// Parse the textual form.  Any other `Escape*` spelling is rejected; a
    /// string without the prefix becomes `Named`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hint = match s.trim() {
            "" => return Err(CoreError::Parse("empty enabling request".into())),
            "Escape"          => EscapeHint::Any,
            "EscapeLeft"      => EscapeHint::Left,
            "EscapeRight"     => EscapeHint::Right,
            "EscapeForward"   => EscapeHint::Forward,
            "EscapeLeftTurn"  => EscapeHint::LeftTurn,
            "EscapeRightTurn" => EscapeHint::RightTurn,
            "EscapeFullTurn"  => EscapeHint::FullTurn,
            "EscapeNone"      => EscapeHint::None,
            other if other.starts_with("Escape") => {
                return Err(CoreError::Parse(format!("unknown escape request {other:?}")));
            }
            other => return Ok(EnablingRequest::Named(other.to_owned())),
        };
        Ok(EnablingRequest::Escape(hint))
    }
}
