use crate::error::RelayError;
use tokio::process::Command;
use tracing::debug;

/// Client for the external command-line relay process. Each invocation
/// passes a target server identifier, an operation name, and a JSON-encoded
/// parameter payload, and returns the JSON-encoded reply.
#[derive(Debug, Clone)]
pub struct RelayClient {
    program: String,
    base_args: Vec<String>,
}

impl RelayClient {
    /// Builds a client from a whitespace-separated command line, e.g.
    /// `npx @anthropic/mcp-cli`.
    pub fn new(command_line: &str) -> Result<Self, RelayError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(RelayError::EmptyCommand)?;
        Ok(RelayClient {
            program,
            base_args: parts.collect(),
        })
    }

    pub async fn invoke(
        &self,
        server: &str,
        tool: &str,
        params: &serde_json::Value,
    ) -> Result<serde_json::Value, RelayError> {
        debug!("Relay invocation: server='{server}' tool='{tool}'");

        let output = Command::new(&self.program)
            .args(&self.base_args)
            .arg("query")
            .arg("--server")
            .arg(server)
            .arg("--tool")
            .arg(tool)
            .arg("--params")
            .arg(params.to_string())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(RelayError::Process {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_reply(output.stdout)
    }
}

/// Parses the relay's stdout as JSON; a reply carrying an `error` member is
/// surfaced as a remote statement error.
fn parse_reply(stdout: Vec<u8>) -> Result<serde_json::Value, RelayError> {
    let text = String::from_utf8(stdout)?;
    let reply: serde_json::Value = serde_json::from_str(text.trim())?;

    if let Some(error) = reply.get("error")
        && !error.is_null()
    {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(RelayError::Remote(message));
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_program_and_args() {
        let client = RelayClient::new("npx @anthropic/mcp-cli").unwrap();
        assert_eq!(client.program, "npx");
        assert_eq!(client.base_args, vec!["@anthropic/mcp-cli".to_string()]);
    }

    #[test]
    fn test_new_rejects_empty_command() {
        assert!(matches!(
            RelayClient::new("   "),
            Err(RelayError::EmptyCommand)
        ));
    }

    #[test]
    fn test_parse_reply_success() {
        let reply = parse_reply(br#"{"results": [{"count": 3}]}"#.to_vec()).unwrap();
        assert_eq!(reply["results"][0]["count"], 3);
    }

    #[test]
    fn test_parse_reply_surfaces_remote_error() {
        let result = parse_reply(br#"{"error": "relation does not exist"}"#.to_vec());
        match result {
            Err(RelayError::Remote(message)) => {
                assert_eq!(message, "relation does not exist");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_reply_rejects_non_json() {
        assert!(matches!(
            parse_reply(b"not json".to_vec()),
            Err(RelayError::Json(_))
        ));
    }
}
