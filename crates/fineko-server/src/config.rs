//! Command-line and environment configuration.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use fineko_ai::GeminiConfig;
use fineko_auth::AuthConfig;
use fineko_db::DbConfig;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "fineko")]
#[command(about = "FINEKO operational tooling")]
pub struct Cli {
    /// SurrealDB endpoint: `ws://host:port`, or `mem://` for an
    /// in-memory store
    #[arg(long, env = "FINEKO_DB_URL", default_value = "ws://127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "FINEKO_DB_NS", default_value = "fineko")]
    pub db_namespace: String,

    #[arg(long, env = "FINEKO_DB_NAME", default_value = "main")]
    pub db_name: String,

    #[arg(long, env = "FINEKO_DB_USER", default_value = "root")]
    pub db_user: String,

    #[arg(long, env = "FINEKO_DB_PASS", default_value = "root", hide_env_values = true)]
    pub db_pass: String,

    /// Ed25519 private key (PEM) for signing session tokens
    #[arg(long, env = "FINEKO_JWT_PRIVATE_KEY", default_value = "", hide_env_values = true)]
    pub jwt_private_key: String,

    /// Ed25519 public key (PEM) for verifying session tokens
    #[arg(long, env = "FINEKO_JWT_PUBLIC_KEY", default_value = "")]
    pub jwt_public_key: String,

    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-flash")]
    pub gemini_model: String,

    /// Log filter directive, e.g. `fineko=debug`
    #[arg(long, env = "LOG_LEVEL", default_value = "fineko=info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Plain,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply pending schema migrations
    Migrate,

    /// Delete expired sessions
    CleanupSessions,

    /// Create today's tasks from recurring templates
    GenerateTasks {
        #[arg(long)]
        company_id: Uuid,

        /// Defaults to today (UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Classify a chat message as a command and print it as JSON
    Interpret {
        #[arg(long)]
        company_id: Uuid,

        #[arg(long)]
        employee_id: Uuid,

        text: String,
    },
}

impl Cli {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_name.clone(),
            username: self.db_user.clone(),
            password: self.db_pass.clone(),
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_private_key_pem: self.jwt_private_key.clone(),
            jwt_public_key_pem: self.jwt_public_key.clone(),
            ..AuthConfig::default()
        }
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            model: self.gemini_model.clone(),
            api_key: self.gemini_api_key.clone(),
            ..GeminiConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_tasks() {
        let company = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "fineko",
            "--log-format",
            "plain",
            "generate-tasks",
            "--company-id",
            &company.to_string(),
            "--date",
            "2026-10-12",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Plain);
        match cli.command {
            Command::GenerateTasks { company_id, date } => {
                assert_eq!(company_id, company);
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 12));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn db_config_comes_from_flags() {
        let cli = Cli::try_parse_from(["fineko", "--db-url", "db:8000", "--db-name", "prod", "migrate"])
            .unwrap();
        let db = cli.db_config();
        assert_eq!(db.url, "db:8000");
        assert_eq!(db.database, "prod");
        assert!(matches!(cli.command, Command::Migrate));
    }
}
