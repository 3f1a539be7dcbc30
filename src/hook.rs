//! PreCompact hook protocol: one JSON request in, one JSON response out.
//!
//! The response always carries `continue: true` so the host is never blocked,
//! and exactly one well-formed response is written per run, even when the
//! request is malformed or the export panics.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};

use crate::config::Config;
use crate::error::{ExportError, Result};
use crate::export::{ExportRequest, ExportResult, export_transcript};

/// Raw hook input; `null` and missing fields both take the defaults.
#[derive(Debug, Default, Deserialize)]
struct HookInput {
    #[serde(default, alias = "transcriptPath")]
    transcript_path: Option<String>,
    #[serde(default, alias = "sessionId")]
    session_id: Option<String>,
    #[serde(default)]
    trigger: Option<String>,
}

impl From<HookInput> for ExportRequest {
    fn from(input: HookInput) -> Self {
        let defaults = ExportRequest::default();
        Self {
            transcript_path: input.transcript_path.unwrap_or(defaults.transcript_path),
            session_id: input.session_id.unwrap_or(defaults.session_id),
            trigger: input.trigger.unwrap_or(defaults.trigger),
        }
    }
}

/// Parse the hook's stdin document. Anything but a JSON object is rejected.
pub fn parse_request(raw: &str) -> Result<ExportRequest> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|err| ExportError::json("invalid JSON", err))?;
    if !value.is_object() {
        return Err(ExportError::InvalidRequest(
            "expected a JSON object".to_string(),
        ));
    }
    let input: HookInput = serde_json::from_value(value)
        .map_err(|err| ExportError::json("invalid hook input", err))?;
    Ok(input.into())
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct HookMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_exported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HookResponse {
    #[serde(rename = "continue")]
    pub continue_: bool,
    pub suppress_output: bool,
    pub metadata: HookMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
}

impl HookResponse {
    pub fn from_result(result: &ExportResult) -> Self {
        Self {
            continue_: true,
            suppress_output: true,
            metadata: HookMetadata {
                transcript_exported: Some(result.is_exported()),
                export_path: Some(result.path_string()),
                error: None,
            },
            system_message: result
                .file_name()
                .map(|name| format!("💾 Transcript saved: {name}")),
        }
    }

    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            continue_: true,
            suppress_output: true,
            metadata: HookMetadata {
                error: Some(error.into()),
                ..HookMetadata::default()
            },
            system_message: None,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|err| ExportError::json("failed to encode response", err))
    }
}

/// Decide whether to export and build the success response.
pub fn respond<F>(raw_input: &str, export: F) -> Result<HookResponse>
where
    F: FnOnce(&ExportRequest) -> ExportResult,
{
    let request = parse_request(raw_input)?;
    let result = if request.transcript_path.is_empty() {
        ExportResult::default()
    } else {
        export(&request)
    };
    Ok(HookResponse::from_result(&result))
}

/// Used only if even the degraded response cannot be encoded
const FALLBACK_RESPONSE: &str =
    r#"{"continue":true,"suppressOutput":true,"metadata":{"error":"internal error"}}"#;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "export panicked".to_string()
    }
}

/// Serialized response plus the exit code for the process.
fn run_to_string<R, F>(mut input: R, export: F) -> (String, i32)
where
    R: Read,
    F: FnOnce(&ExportRequest) -> ExportResult,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<String> {
        let mut raw = String::new();
        input
            .read_to_string(&mut raw)
            .map_err(|err| ExportError::io("failed to read hook input", err))?;
        respond(&raw, export)?.to_json()
    }));

    let error = match outcome {
        Ok(Ok(json)) => return (json, 0),
        Ok(Err(err)) => err.to_string(),
        Err(payload) => panic_message(&*payload),
    };
    tracing::error!("precompact hook failed: {error}");
    let json = HookResponse::degraded(error)
        .to_json()
        .unwrap_or_else(|_| FALLBACK_RESPONSE.to_string());
    (json, 1)
}

/// Run the hook with a custom export function. Returns the process exit code.
pub fn run_hook_with<R, W, F>(input: R, mut output: W, export: F) -> i32
where
    R: Read,
    W: Write,
    F: FnOnce(&ExportRequest) -> ExportResult,
{
    let (json, code) = run_to_string(input, export);
    if let Err(err) = output.write_all(json.as_bytes()).and_then(|()| output.flush()) {
        tracing::error!("failed to write hook response: {err}");
        return 1;
    }
    code
}

/// Run the hook against the configured storage directory.
pub fn run_hook<R: Read, W: Write>(input: R, output: W, config: &Config) -> i32 {
    run_hook_with(input, output, |request| export_transcript(config, request))
}
