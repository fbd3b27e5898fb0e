//! Operations the language model may propose
//!
//! The model sees two function schemas. Its completion is reduced to a
//! [`Proposal`]: either text for the user or a named call with JSON
//! arguments, validated here before anything touches the feed.

use crate::error::{HelpyError, Result};
use crate::providers::Message;
use crate::transit::TransitQuery;
use serde::Deserialize;
use serde_json::{json, Value};

/// Name of the arrival-times operation
pub const GET_TRANSIT_TIMES: &str = "get_transit_times";
/// Name of the lines-at-stop operation
pub const GET_LINES_AT_STOP: &str = "get_lines_at_stop";

/// Instructions seeded at the top of every conversation
pub const SYSTEM_PROMPT: &str = "You are Helpy, a transit assistant that tells riders when their next bus or train arrives. \
1. Always collect the stop code first. If the user sends letters instead, ask for the digits written on the stop sign. \
2. Then ask for the line number. Do not announce that you are checking arrival times, deliver them. \
3. If the user sends a number and it is unclear whether it is a stop or a line, ask which one and confirm. \
4. Only call get_lines_at_stop when the user explicitly asks for all lines at a stop. \
5. Only ask for the agency when several operators run the same line number at the stop. \
6. Do not ask for anything else. Keep the conversation short and accurate.";

/// Function schemas offered to the model
pub fn operation_schemas() -> Vec<Value> {
    vec![
        json!({
            "name": GET_TRANSIT_TIMES,
            "description": "Retrieve transit arrival times for a specific stop and line",
            "parameters": {
                "type": "object",
                "properties": {
                    "stop_number": {
                        "type": "string",
                        "description": "Unique identifier for the bus stop"
                    },
                    "line_number": {
                        "type": "string",
                        "description": "Bus line number"
                    },
                    "agency": {
                        "type": "string",
                        "description": "Transit agency operating the line (optional)"
                    }
                },
                "required": ["stop_number", "line_number"]
            }
        }),
        json!({
            "name": GET_LINES_AT_STOP,
            "description": "List every line serving a stop. Only use this when specifically asked to list all lines at a stop.",
            "parameters": {
                "type": "object",
                "properties": {
                    "stop_number": {
                        "type": "string",
                        "description": "Unique identifier for the bus stop"
                    }
                },
                "required": ["stop_number"]
            }
        }),
    ]
}

/// What the model wants to do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    /// Text to show the user
    Reply(String),
    /// Operation call with raw JSON arguments
    Call { name: String, arguments: String },
}

impl Proposal {
    /// Reduce a completion message; the first tool call wins over any text
    pub fn from_response(message: &Message) -> Self {
        match message.tool_calls.as_ref().and_then(|calls| calls.first()) {
            Some(call) => {
                if message.tool_calls.as_ref().map_or(0, Vec::len) > 1 {
                    tracing::debug!("Ignoring extra tool calls after {}", call.function.name);
                }
                Proposal::Call {
                    name: call.function.name.clone(),
                    arguments: call.function.arguments.clone(),
                }
            }
            None => Proposal::Reply(message.text().trim().to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransitTimesParams {
    stop_number: String,
    line_number: String,
    #[serde(default)]
    agency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinesAtStopParams {
    stop_number: String,
}

fn parse_arguments<T: serde::de::DeserializeOwned>(name: &str, arguments: &str) -> Result<T> {
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(arguments).map_err(|e| {
        HelpyError::InvalidArguments(format!("Invalid arguments for {}: {}", name, e)).into()
    })
}

/// Validate `get_transit_times` arguments into a query
///
/// `agency` becomes the operator id when present and non-blank.
///
/// # Errors
///
/// Returns [`HelpyError::InvalidArguments`] when the arguments are not a JSON
/// object with non-empty string `stop_number` and `line_number`
///
/// # Examples
///
/// ```
/// use helpy::dialogue::operations::parse_transit_times;
///
/// let query = parse_transit_times(r#"{"stop_number":"123","line_number":"5"}"#).unwrap();
/// assert_eq!(query.stop_number, "123");
/// assert!(parse_transit_times(r#"{"stop_number":123,"line_number":"5"}"#).is_err());
/// ```
pub fn parse_transit_times(arguments: &str) -> Result<TransitQuery> {
    let params: TransitTimesParams = parse_arguments(GET_TRANSIT_TIMES, arguments)?;
    TransitQuery::new(
        &params.stop_number,
        &params.line_number,
        params.agency.as_deref(),
    )
}

/// Validate `get_lines_at_stop` arguments into a stop code
///
/// # Errors
///
/// Returns [`HelpyError::InvalidArguments`] when `stop_number` is missing,
/// not a string, or blank
pub fn parse_lines_at_stop(arguments: &str) -> Result<String> {
    let params: LinesAtStopParams = parse_arguments(GET_LINES_AT_STOP, arguments)?;
    let stop = params.stop_number.trim();
    if stop.is_empty() {
        return Err(HelpyError::InvalidArguments("stop_number is required".to_string()).into());
    }
    Ok(stop.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FunctionCall, ToolCall};

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_0".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    #[test]
    fn test_schemas_name_both_operations() {
        let schemas = operation_schemas();
        let names: Vec<&str> = schemas
            .iter()
            .filter_map(|s| s["name"].as_str())
            .collect();
        assert_eq!(names, vec![GET_TRANSIT_TIMES, GET_LINES_AT_STOP]);
        assert_eq!(
            schemas[0]["parameters"]["required"],
            json!(["stop_number", "line_number"])
        );
    }

    #[test]
    fn test_proposal_prefers_first_call() {
        let message = Message {
            role: "assistant".to_string(),
            content: Some("checking".to_string()),
            tool_calls: Some(vec![
                call(GET_TRANSIT_TIMES, r#"{"stop_number":"1","line_number":"2"}"#),
                call(GET_LINES_AT_STOP, r#"{"stop_number":"1"}"#),
            ]),
        };
        assert_eq!(
            Proposal::from_response(&message),
            Proposal::Call {
                name: GET_TRANSIT_TIMES.to_string(),
                arguments: r#"{"stop_number":"1","line_number":"2"}"#.to_string(),
            }
        );
    }

    #[test]
    fn test_proposal_text_reply() {
        let message = Message::assistant("  What line are you waiting for?  ");
        assert_eq!(
            Proposal::from_response(&message),
            Proposal::Reply("What line are you waiting for?".to_string())
        );
    }

    #[test]
    fn test_transit_times_agency_becomes_operator() {
        let query =
            parse_transit_times(r#"{"stop_number":" 123 ","line_number":"5","agency":"3"}"#)
                .unwrap();
        assert_eq!(query.stop_number, "123");
        assert_eq!(query.operator_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_transit_times_rejects_bad_arguments() {
        for arguments in [
            "",
            "not json",
            r#"{"stop_number":"123"}"#,
            r#"{"stop_number":"","line_number":"5"}"#,
            r#"{"stop_number":"123","line_number":5}"#,
            r#"{"stop_number":"123","line_number":"5","agency":7}"#,
        ] {
            let err = parse_transit_times(arguments).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<HelpyError>(),
                    Some(HelpyError::InvalidArguments(_))
                ),
                "expected InvalidArguments for {:?}",
                arguments
            );
        }
    }

    #[test]
    fn test_lines_at_stop_arguments() {
        assert_eq!(
            parse_lines_at_stop(r#"{"stop_number":" 456 "}"#).unwrap(),
            "456"
        );
        assert!(parse_lines_at_stop(r#"{"stop_number":"  "}"#).is_err());
        assert!(parse_lines_at_stop("{}").is_err());
    }
}
