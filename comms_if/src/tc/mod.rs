//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface. Telecommands arrive from the remote display as JSON packets of
//! the form `{"type": "EXPLORE", "payload": "Start"}`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod explore;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// Internal
use explore::ExploreCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the robot by the remote display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Tc {
    /// Keep-alive, carries no payload.
    Heartbeat,

    /// An exploration command.
    Explore(ExploreCmd),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC of type {0} is expected to have a payload but it doesn't")]
    MissingPayload(String),

    #[error("TC payload is invalid: {0}")]
    InvalidPayload(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        // Parse the JSON string into a value
        let val: Value = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        // Get the type of the TC
        let tc_type = match val["type"].as_str() {
            Some(s) => s,
            None => {
                return Err(TcParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        match tc_type {
            "HEARTBEAT" => Ok(Tc::Heartbeat),
            "EXPLORE" => {
                if val["payload"].is_null() {
                    return Err(TcParseError::MissingPayload(tc_type.to_string()));
                }

                serde_json::from_value(val["payload"].clone())
                    .map(Tc::Explore)
                    .map_err(TcParseError::InvalidPayload)
            }
            t => Err(TcParseError::InvalidType(format!(
                "{} is not a recognised TC type",
                t
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_explore() {
        let tc = Tc::from_json(r#"{"type": "EXPLORE", "payload": "Start"}"#).unwrap();
        assert_eq!(tc, Tc::Explore(ExploreCmd::Start));

        let tc = Tc::from_json(r#"{"type": "EXPLORE", "payload": "Stop"}"#).unwrap();
        assert_eq!(tc, Tc::Explore(ExploreCmd::Stop));

        let tc = Tc::from_json(r#"{"type": "HEARTBEAT"}"#).unwrap();
        assert_eq!(tc, Tc::Heartbeat);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Tc::from_json("not json"),
            Err(TcParseError::InvalidJson(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "WARP"}"#),
            Err(TcParseError::InvalidType(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "EXPLORE"}"#),
            Err(TcParseError::MissingPayload(_))
        ));
        assert!(matches!(
            Tc::from_json(r#"{"type": "EXPLORE", "payload": "Jump"}"#),
            Err(TcParseError::InvalidPayload(_))
        ));
    }
}
