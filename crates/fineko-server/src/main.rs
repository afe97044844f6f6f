//! FINEKO operational binary.

mod config;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use fineko_ai::{CommandContext, CommandInterpreter, CommandKind, EmployeeRef, GeminiBackend};
use fineko_ai::command::TemplateRef;
use fineko_auth::AuthService;
use fineko_core::context::TenantContext;
use fineko_core::models::employee::{Employee, EmployeeRole};
use fineko_core::repository::{EmployeeRepository, UserRepository};
use fineko_core::service::TemplateService;
use fineko_db::repository::{
    SurrealCompanyRepository, SurrealEmployeeRepository, SurrealSessionRepository,
    SurrealUserRepository,
};
use fineko_db::{DbManager, SurrealDocumentStore};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use config::{Cli, Command, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli)?;

    // Connecting also applies pending migrations.
    let manager = DbManager::connect(&cli.db_config())
        .await
        .context("connecting to SurrealDB")?;
    let db = manager.client().clone();

    let auth_config = cli.auth_config();
    let gemini_config = cli.gemini_config();

    match cli.command {
        Command::Migrate => {
            info!(version = fineko_db::latest_version(), "Schema is up to date");
        }
        Command::CleanupSessions => {
            let auth = AuthService::new(
                SurrealUserRepository::new(db.clone()),
                SurrealCompanyRepository::new(db.clone()),
                SurrealEmployeeRepository::new(db.clone()),
                SurrealSessionRepository::new(db.clone()),
                auth_config,
            );
            let removed = auth.cleanup_expired_sessions().await?;
            println!("{removed}");
        }
        Command::GenerateTasks { company_id, date } => {
            let employees = SurrealEmployeeRepository::new(db.clone());
            let owner = employees
                .list_by_company(company_id)
                .await?
                .into_iter()
                .find(Employee::is_owner)
                .with_context(|| format!("company {company_id} has no owner"))?;

            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let templates = TemplateService::new(SurrealDocumentStore::new(db.clone()));
            let tasks = templates
                .generate_due_tasks(&operator_context(&owner), date)
                .await?;
            for task in &tasks {
                println!("{}\t{}", task.id, task.title);
            }
        }
        Command::Interpret {
            company_id,
            employee_id,
            text,
        } => {
            let employees = SurrealEmployeeRepository::new(db.clone());
            let users = SurrealUserRepository::new(db.clone());
            let caller = employees.get_by_id(company_id, employee_id).await?;

            let mut staff = Vec::new();
            for employee in employees.list_by_company(company_id).await? {
                let user = users.get_by_id(employee.user_id).await?;
                staff.push(EmployeeRef {
                    id: employee.id,
                    name: user.display_name,
                });
            }
            let current_user = staff
                .iter()
                .find(|e| e.id == caller.id)
                .cloned()
                .context("caller is not listed among company employees")?;

            let templates = TemplateService::new(SurrealDocumentStore::new(db.clone()))
                .list(&operator_context(&caller))
                .await?
                .into_iter()
                .map(|t| TemplateRef {
                    id: t.id,
                    title: t.title,
                })
                .collect();

            let context = CommandContext {
                employees: staff,
                templates,
                current_user,
                allowed_commands: allowed_commands(&caller),
                today: Utc::now().date_naive(),
            };
            let interpreter = CommandInterpreter::new(GeminiBackend::new(gemini_config)?);
            let parsed = interpreter.interpret(&text, &context).await;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
    }

    Ok(())
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log filter")?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match cli.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Plain => builder.init(),
    }
    Ok(())
}

/// Tenant context for operator commands that run outside a user session.
fn operator_context(employee: &Employee) -> TenantContext {
    TenantContext {
        company_id: employee.company_id,
        user_id: employee.user_id,
        employee_id: employee.id,
        session_id: Uuid::nil(),
    }
}

/// Owners and admins may run everything; members need a `<entity>.create`
/// permission for each create command.
fn allowed_commands(employee: &Employee) -> Option<Vec<CommandKind>> {
    if employee.role != EmployeeRole::Member {
        return None;
    }

    let mut allowed = vec![
        CommandKind::ListTasks,
        CommandKind::ListResults,
        CommandKind::ListTemplates,
    ];
    for (permission, command) in [
        ("tasks.create", CommandKind::CreateTask),
        ("results.create", CommandKind::CreateResult),
        ("templates.create", CommandKind::CreateTemplate),
    ] {
        if employee.permissions.iter().any(|p| p == permission) {
            allowed.push(command);
        }
    }
    Some(allowed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(role: EmployeeRole, permissions: &[&str]) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
            position: None,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admins_are_unrestricted() {
        assert!(allowed_commands(&employee(EmployeeRole::Admin, &[])).is_none());
        assert!(allowed_commands(&employee(EmployeeRole::Owner, &[])).is_none());
    }

    #[test]
    fn members_need_create_permissions() {
        let allowed = allowed_commands(&employee(EmployeeRole::Member, &["tasks.create"])).unwrap();
        assert!(allowed.contains(&CommandKind::CreateTask));
        assert!(allowed.contains(&CommandKind::ListResults));
        assert!(!allowed.contains(&CommandKind::CreateResult));
        assert!(!allowed.contains(&CommandKind::CreateTemplate));
    }
}
