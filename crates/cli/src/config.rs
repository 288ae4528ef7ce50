use crate::error::CliError;
use connectors::mssql::adapter::MssqlConfig;
use engine::mapping;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const DEFAULT_ENV_FILE: &str = ".env.local";
const DEFAULT_RELAY_COMMAND: &str = "npx @anthropic/mcp-cli";
const DEFAULT_RELAY_SERVER: &str = "supabase";

/// Environment variable manager that loads from system and .env files
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        let mut vars = HashMap::new();

        // Load all system environment variables
        for (key, value) in std::env::vars() {
            vars.insert(key, value);
        }

        Self { vars }
    }

    /// Load variables from a .env file. File values override system ones.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.vars.get(key)
    }

    pub fn require(&self, key: &str) -> Result<String, CliError> {
        self.vars
            .get(key)
            .cloned()
            .ok_or_else(|| CliError::Config(format!("Missing required environment variable {key}")))
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Parse KEY=VALUE format
            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..].trim();

                if key.is_empty() {
                    return Err(CliError::Config(format!(
                        "Invalid env file: empty key at line {}",
                        line_num + 1
                    )));
                }

                // Remove quotes from value if present
                let value = Self::unquote_value(value);

                self.vars.insert(key.to_string(), value);
            } else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            }
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        // Handle double quotes
        if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
            return value[1..value.len() - 1].to_string();
        }

        // Handle single quotes
        if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
            return value[1..value.len() - 1].to_string();
        }

        value.to_string()
    }
}

/// Everything the tool needs, injected from the environment at startup.
/// Credentials are never compiled into the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: MssqlConfig,
    pub source_table: String,
    pub destination_table: String,
    pub relay_command: String,
    pub relay_server: String,
}

impl AppConfig {
    pub fn load(env_file: Option<&str>) -> Result<Self, CliError> {
        let mut env = EnvManager::new();

        match env_file {
            Some(path) => env.load_from_file(path)?,
            None => {
                if Path::new(DEFAULT_ENV_FILE).exists() {
                    env.load_from_file(DEFAULT_ENV_FILE)?;
                }
            }
        }

        Self::from_env(&env)
    }

    pub fn from_env(env: &EnvManager) -> Result<Self, CliError> {
        let port = match env.get("MSSQL_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| CliError::Config(format!("Invalid MSSQL_PORT value: {raw}")))?,
            None => 1433,
        };

        Ok(AppConfig {
            source: MssqlConfig {
                host: env.require("MSSQL_SERVER")?,
                port,
                database: env.require("MSSQL_DATABASE")?,
                username: env.require("MSSQL_USERNAME")?,
                password: env.require("MSSQL_PASSWORD")?,
            },
            source_table: env
                .get("MSSQL_TABLE")
                .cloned()
                .unwrap_or_else(|| mapping::SOURCE_TABLE.to_string()),
            destination_table: env
                .get("SUPABASE_TABLE")
                .cloned()
                .unwrap_or_else(|| mapping::DESTINATION_TABLE.to_string()),
            relay_command: env
                .get("RELAY_COMMAND")
                .cloned()
                .unwrap_or_else(|| DEFAULT_RELAY_COMMAND.to_string()),
            relay_server: env
                .get("RELAY_SERVER")
                .cloned()
                .unwrap_or_else(|| DEFAULT_RELAY_SERVER.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(content: &str) -> EnvManager {
        let mut env = EnvManager::default();
        env.parse_env_content(content).unwrap();
        env
    }

    #[test]
    fn test_parse_basic_env() {
        let env = manager_with(
            r#"
# Comment
KEY1=value1
KEY2=value2
        "#,
        );

        assert_eq!(env.get("KEY1").unwrap(), "value1");
        assert_eq!(env.get("KEY2").unwrap(), "value2");
    }

    #[test]
    fn test_parse_quoted_values() {
        let env = manager_with(
            r#"
QUOTED="value with spaces"
SINGLE='single quoted'
UNQUOTED=no_spaces
        "#,
        );

        assert_eq!(env.get("QUOTED").unwrap(), "value with spaces");
        assert_eq!(env.get("SINGLE").unwrap(), "single quoted");
        assert_eq!(env.get("UNQUOTED").unwrap(), "no_spaces");
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = EnvManager::default();
        assert!(env.parse_env_content("INVALID LINE WITHOUT EQUALS").is_err());
    }

    #[test]
    fn test_from_env_applies_defaults() {
        let env = manager_with(
            r#"
MSSQL_SERVER=db.example.com
MSSQL_DATABASE=aggregated_reporting
MSSQL_USERNAME=reader
MSSQL_PASSWORD=secret
        "#,
        );

        let config = AppConfig::from_env(&env).unwrap();
        assert_eq!(config.source.port, 1433);
        assert_eq!(config.source_table, "executive_report_new_month");
        assert_eq!(config.destination_table, "executive_monthly_reports");
        assert_eq!(config.relay_server, "supabase");
    }

    #[test]
    fn test_from_env_requires_credentials() {
        let env = manager_with("MSSQL_SERVER=db.example.com");
        assert!(AppConfig::from_env(&env).is_err());
    }

    #[test]
    fn test_from_env_rejects_bad_port() {
        let env = manager_with(
            r#"
MSSQL_SERVER=db.example.com
MSSQL_PORT=not-a-port
MSSQL_DATABASE=aggregated_reporting
MSSQL_USERNAME=reader
MSSQL_PASSWORD=secret
        "#,
        );
        assert!(AppConfig::from_env(&env).is_err());
    }
}
