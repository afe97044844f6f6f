//! Chat command interpretation.
//!
//! [`CommandInterpreter::interpret`] never fails: anything it cannot make
//! sense of comes back as [`CommandKind::Unknown`] carrying the original
//! text, and the executor decides what to say.

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::{Content, GenerationRequest, LanguageModel, parse_json};
use crate::prompt;

/// Inputs answered with help text without calling the model.
pub const HELP_KEYWORDS: [&str; 7] = [
    "допомога", "help", "/help", "/start", "довідка", "помощь", "команди",
];

/// Words that turn any create command into a template.
const TEMPLATE_KEYWORDS: [&str; 2] = ["шаблон", "template"];

static TIME_OF_DAY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:о|об|в|у|at|до)\s+)?\b\d{1,2}:\d{2}\b(?:\s*(?:am|pm)\b)?|\b(?:о|об|at)\s+\d{1,2}(?:\s*(?:годині|години|год|ранку|вечора|дня|ночі|am|pm))?\b|\b\d{1,2}\s*(?:am|pm)\b",
    )
    .ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    CreateTask,
    CreateResult,
    CreateTemplate,
    ListTasks,
    ListResults,
    ListTemplates,
    ShowHelp,
    /// Understood, but a required detail is missing.
    Clarify,
    Unknown,
    /// Outside the caller's allow-list.
    Forbidden,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::CreateTask => "create_task",
            CommandKind::CreateResult => "create_result",
            CommandKind::CreateTemplate => "create_template",
            CommandKind::ListTasks => "list_tasks",
            CommandKind::ListResults => "list_results",
            CommandKind::ListTemplates => "list_templates",
            CommandKind::ShowHelp => "show_help",
            CommandKind::Clarify => "clarify",
            CommandKind::Unknown => "unknown",
            CommandKind::Forbidden => "forbidden",
        }
    }

    /// Parse a model-produced command name. `forbidden` is never accepted
    /// from the model.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "create_task" => Some(CommandKind::CreateTask),
            "create_result" => Some(CommandKind::CreateResult),
            "create_template" => Some(CommandKind::CreateTemplate),
            "list_tasks" => Some(CommandKind::ListTasks),
            "list_results" => Some(CommandKind::ListResults),
            "list_templates" => Some(CommandKind::ListTemplates),
            "show_help" => Some(CommandKind::ShowHelp),
            "clarify" => Some(CommandKind::Clarify),
            "unknown" => Some(CommandKind::Unknown),
            _ => None,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(
            self,
            CommandKind::CreateTask | CommandKind::CreateResult | CommandKind::CreateTemplate
        )
    }

    /// Commands every caller may receive regardless of permissions.
    fn always_allowed(&self) -> bool {
        matches!(
            self,
            CommandKind::ShowHelp | CommandKind::Clarify | CommandKind::Unknown
        )
    }
}

#[derive(Debug, Clone)]
pub struct EmployeeRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TemplateRef {
    pub id: Uuid,
    pub title: String,
}

/// What the interpreter knows about the caller's company.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub employees: Vec<EmployeeRef>,
    pub templates: Vec<TemplateRef>,
    pub current_user: EmployeeRef,
    /// `None` allows every command.
    pub allowed_commands: Option<Vec<CommandKind>>,
    /// Reference date for relative due dates.
    pub today: NaiveDate,
}

impl CommandContext {
    fn allows(&self, kind: CommandKind) -> bool {
        kind.always_allowed()
            || self
                .allowed_commands
                .as_ref()
                .is_none_or(|allowed| allowed.contains(&kind))
    }

    fn knows_employee(&self, id: Uuid) -> bool {
        self.employees.iter().any(|e| e.id == id)
    }

    fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Сьогодні: {}", self.today.format("%Y-%m-%d"));
        let _ = writeln!(
            out,
            "Автор повідомлення: {} ({})",
            self.current_user.name, self.current_user.id
        );
        let _ = writeln!(out, "Співробітники:");
        for employee in &self.employees {
            let _ = writeln!(out, "- {}: {}", employee.id, employee.name);
        }
        if !self.templates.is_empty() {
            let _ = writeln!(out, "Наявні шаблони:");
            for template in &self.templates {
                let _ = writeln!(out, "- {}", template.title);
            }
        }
        out
    }
}

/// A classified chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCommand {
    pub command: CommandKind,
    /// The message as received.
    pub text: String,
    pub title: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    /// Question to ask back when `command` is `Clarify`.
    pub clarification: Option<String>,
}

impl ParsedCommand {
    fn bare(command: CommandKind, text: &str) -> Self {
        Self {
            command,
            text: text.to_string(),
            title: None,
            assignee_id: None,
            due_date: None,
            clarification: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Classification {
    command: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    assignee_id: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    clarification: Option<String>,
}

pub fn is_help_request(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    if HELP_KEYWORDS.contains(&normalized.as_str()) {
        return true;
    }
    // Bot commands may be addressed as `/help@bot_name` or carry arguments.
    normalized
        .split_whitespace()
        .next()
        .and_then(|head| head.split('@').next())
        .is_some_and(|head| head.starts_with('/') && HELP_KEYWORDS.contains(&head))
}

fn mentions_template(text: &str) -> bool {
    let lower = text.to_lowercase();
    TEMPLATE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Remove time-of-day fragments (`о 15:00`, `at 9am`) from a title.
pub fn strip_time_of_day(title: &str) -> String {
    let stripped = match TIME_OF_DAY.as_ref() {
        Some(pattern) => pattern.replace_all(title, " "),
        None => title.into(),
    };
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == ',' || c == '.' || c == ';' || c == ':' || c == '-')
        .trim()
        .to_string()
}

pub struct CommandInterpreter<M> {
    model: M,
}

impl<M: LanguageModel> CommandInterpreter<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn interpret(&self, text: &str, context: &CommandContext) -> ParsedCommand {
        if text.trim().is_empty() {
            return ParsedCommand::bare(CommandKind::Unknown, text);
        }
        if is_help_request(text) {
            return ParsedCommand::bare(CommandKind::ShowHelp, text);
        }

        let request = GenerationRequest::new(prompt::command_instruction(&context.render()))
            .content(Content::user_text(text))
            .schema(prompt::command_schema())
            .temperature(0.0);

        let classification = match self.model.generate(request).await {
            Ok(generation) => parse_json::<Classification>(&generation.text),
            Err(e) => Err(e),
        };
        let parsed = match classification {
            Ok(classification) => refine(classification, text, context),
            Err(e) => {
                warn!(error = %e, "Command classification failed");
                ParsedCommand::bare(CommandKind::Unknown, text)
            }
        };
        debug!(command = parsed.command.as_str(), "Command interpreted");
        parsed
    }
}

fn refine(raw: Classification, text: &str, context: &CommandContext) -> ParsedCommand {
    let Some(mut command) = CommandKind::parse(&raw.command) else {
        return ParsedCommand::bare(CommandKind::Unknown, text);
    };

    if command.is_create() && mentions_template(text) {
        command = CommandKind::CreateTemplate;
    }
    if !context.allows(command) {
        return ParsedCommand::bare(CommandKind::Forbidden, text);
    }

    let title = raw
        .title
        .as_deref()
        .map(strip_time_of_day)
        .filter(|t| !t.is_empty());
    let assignee_id = raw
        .assignee_id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id.trim()).ok())
        .filter(|id| context.knows_employee(*id));
    let due_date = raw
        .due_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
    let mut clarification = raw.clarification.filter(|c| !c.trim().is_empty());

    if command.is_create() && title.is_none() {
        command = CommandKind::Clarify;
        clarification.get_or_insert_with(|| "Як назвати? Вкажіть, будь ласка, назву.".into());
    }

    ParsedCommand {
        command,
        text: text.to_string(),
        title,
        assignee_id,
        due_date,
        clarification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CommandContext {
        let me = EmployeeRef {
            id: Uuid::new_v4(),
            name: "Olena".into(),
        };
        CommandContext {
            employees: vec![me.clone()],
            templates: vec![],
            current_user: me,
            allowed_commands: None,
            today: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
        }
    }

    fn raw(command: &str, title: Option<&str>) -> Classification {
        Classification {
            command: command.into(),
            title: title.map(Into::into),
            assignee_id: None,
            due_date: None,
            clarification: None,
        }
    }

    #[test]
    fn help_keywords_match_loosely() {
        assert!(is_help_request("  Допомога "));
        assert!(is_help_request("/start"));
        assert!(is_help_request("/help@fineko_bot"));
        assert!(!is_help_request("допоможи з задачею"));
    }

    #[test]
    fn time_fragments_are_removed() {
        assert_eq!(strip_time_of_day("Зателефонувати постачальнику о 15:00"), "Зателефонувати постачальнику");
        assert_eq!(strip_time_of_day("Нарада о 9 ранку"), "Нарада");
        assert_eq!(strip_time_of_day("Call supplier at 3pm"), "Call supplier");
        assert_eq!(strip_time_of_day("Звіт за 2 квартал"), "Звіт за 2 квартал");
        assert_eq!(strip_time_of_day("о 10:30"), "");
    }

    #[test]
    fn template_keyword_promotes_create_commands() {
        let parsed = refine(
            raw("create_task", Some("Щоденний звіт")),
            "Створи шаблон задачі щоденний звіт",
            &context(),
        );
        assert_eq!(parsed.command, CommandKind::CreateTemplate);
        assert_eq!(parsed.title.as_deref(), Some("Щоденний звіт"));
    }

    #[test]
    fn list_commands_are_not_promoted() {
        let parsed = refine(raw("list_templates", None), "покажи шаблони", &context());
        assert_eq!(parsed.command, CommandKind::ListTemplates);
    }

    #[test]
    fn title_made_of_time_only_needs_clarification() {
        let parsed = refine(raw("create_task", Some("о 15:00")), "задача о 15:00", &context());
        assert_eq!(parsed.command, CommandKind::Clarify);
        assert!(parsed.title.is_none());
        assert!(parsed.clarification.is_some());
    }

    #[test]
    fn unrecognized_command_is_unknown() {
        let parsed = refine(raw("forbidden", None), "щось", &context());
        assert_eq!(parsed.command, CommandKind::Unknown);
        assert_eq!(parsed.text, "щось");
    }

    #[test]
    fn disallowed_command_is_forbidden() {
        let mut ctx = context();
        ctx.allowed_commands = Some(vec![CommandKind::ListTasks]);
        let parsed = refine(raw("create_result", Some("Виручка")), "новий результат виручка", &ctx);
        assert_eq!(parsed.command, CommandKind::Forbidden);

        let help = refine(raw("show_help", None), "що ти вмієш?", &ctx);
        assert_eq!(help.command, CommandKind::ShowHelp);
    }
}
