//! Control-device channel commands.
//!
//! The HID layer broadcasts short strings to every behavior; each behavior
//! picks out only what it needs.  Two shapes exist:
//!
//! | Text               | Parsed as                          |
//! |--------------------|------------------------------------|
//! | `speed|<v>|<turn>` | `ControlCommand::Speed { .. }`     |
//! | `button<N>`        | `ControlCommand::Button(N)`        |

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// One decoded control-device message.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ControlCommand {
    /// Abstract speed and turn, each in `[-100, 100]`.
    Speed { speed: f64, turn: f64 },
    /// A button press.
    Button(u8),
}

impl ControlCommand {
    /// Parse one channel message.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let text = text.trim();
        let bad = || CoreError::ControlCommand(text.to_owned());

        if let Some(rest) = text.strip_prefix("speed|") {
            let (speed, turn) = rest.split_once('|').ok_or_else(bad)?;
            let speed: f64 = speed.trim().parse().map_err(|_| bad())?;
            let turn: f64 = turn.trim().parse().map_err(|_| bad())?;
            if !speed.is_finite() || !turn.is_finite() {
                return Err(bad());
            }
            return Ok(ControlCommand::Speed { speed, turn });
        }

        if let Some(n) = text.strip_prefix("button") {
            return n.parse().map(ControlCommand::Button).map_err(|_| bad());
        }

        Err(bad())
    }
}

impl FromStr for ControlCommand {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControlCommand::parse(s)
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Speed { speed, turn } => write!(f, "speed|{speed}|{turn}"),
            ControlCommand::Button(n)             => write!(f, "button{n}"),
        }
    }
}
