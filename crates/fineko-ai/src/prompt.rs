//! Instructions and response schemas sent to the model.
//!
//! Prompts are in Ukrainian, the language of the product's users.

use serde_json::{Value, json};

/// Top-level keys of the audit summary, in interview order.
pub const INTERVIEW_SECTIONS: [&str; 8] = [
    "companyProfile",
    "productsAndServices",
    "customers",
    "salesAndMarketing",
    "team",
    "operations",
    "finance",
    "goalsAndChallenges",
];

/// First model turn of every new audit.
pub const OPENING_QUESTION: &str = "Вітаю! Я проведу короткий аудит вашого бізнесу. \
Розкажіть, будь ласка, чим займається ваша компанія і що ви продаєте?";

pub const TRANSCRIPTION_INSTRUCTION: &str = "Транскрибуй аудіо дослівно мовою оригіналу. \
Прибери слова-паразити, вигуки та повтори (\"ну\", \"ем\", \"типу\", \"коротше\"), \
але не змінюй зміст і не додавай нічого від себе. Поверни лише текст транскрипції.";

pub const WORK_PLAN_INSTRUCTION: &str = "Ти бізнес-консультант. На основі підсумку аудиту \
склади конкретний план робіт для власника компанії: короткий висновок і 5-10 кроків. \
Кожен крок має назву, опис, пріоритет (high, medium або low) і орієнтовний термін. \
Відповідай українською.";

/// System instruction for one audit interview turn.
pub fn audit_instruction() -> String {
    format!(
        "Ти досвідчений бізнес-аналітик і проводиш інтерв'ю з власником компанії. \
Став одне питання за раз, коротко коментуй відповіді та підсумовуй почуте.\n\
Структуруй зібрані дані за розділами: {sections}.\n\
Відповідай JSON-об'єктом з полями:\n\
- \"reply\": рядок. Коротке спостереження щодо останньої відповіді та наступне питання.\n\
- \"summary\": об'єкт з розділами вище. Заповнюй лише те, що випливає з розмови; \
не вигадуй. Поля, про які ще нічого не відомо, пропускай.\n\
- \"isComplete\": true, лише коли всі розділи заповнені достатньо для плану робіт.",
        sections = INTERVIEW_SECTIONS.join(", ")
    )
}

/// The current summary as context for the next extraction call.
pub fn summary_context(summary_json: &str) -> String {
    format!("Поточний підсумок аудиту (JSON):\n{summary_json}")
}

pub fn work_plan_request(rendered_summary: &str) -> String {
    format!("Підсумок аудиту:\n{rendered_summary}")
}

/// Response schema for one interview turn: the next question, the facts
/// extracted so far (one object per section) and the completion flag.
pub fn audit_turn_schema() -> Value {
    let sections: serde_json::Map<String, Value> = INTERVIEW_SECTIONS
        .iter()
        .map(|section| (section.to_string(), json!({ "type": "OBJECT" })))
        .collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "reply": { "type": "STRING" },
            "summary": { "type": "OBJECT", "properties": sections },
            "isComplete": { "type": "BOOLEAN" }
        },
        "required": ["reply", "isComplete"]
    })
}

pub fn work_plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "steps": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "priority": { "type": "STRING", "enum": ["high", "medium", "low"] },
                        "timeframe": { "type": "STRING" }
                    },
                    "required": ["title", "description"]
                }
            }
        },
        "required": ["summary", "steps"]
    })
}

/// System instruction for chat command classification.
pub fn command_instruction(context: &str) -> String {
    format!(
        "Ти розбираєш повідомлення з робочого чату компанії на команди.\n\
Доступні команди:\n\
- create_task: створити задачу.\n\
- create_result: створити результат (довгострокову ціль).\n\
- create_template: створити шаблон повторюваної задачі.\n\
- list_tasks, list_results, list_templates: показати список.\n\
- show_help: показати довідку.\n\
- clarify: команда зрозуміла, але бракує даних (наприклад, назви).\n\
- unknown: повідомлення не є командою.\n\
Правила:\n\
- Слово \"шаблон\" або \"template\" завжди означає create_template, навіть якщо \
йдеться про задачу.\n\
- У \"title\" лише назва, без часу доби (\"о 15:00\", \"о 9 ранку\") і без імен виконавців.\n\
- \"assigneeId\" лише з переліку співробітників нижче; якщо не впевнений, пропусти.\n\
- \"dueDate\" у форматі YYYY-MM-DD, якщо дату названо.\n\
- \"text\" повторює вихідне повідомлення без змін.\n\n\
{context}"
    )
}

pub fn command_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "command": {
                "type": "STRING",
                "enum": [
                    "create_task", "create_result", "create_template",
                    "list_tasks", "list_results", "list_templates",
                    "show_help", "clarify", "unknown"
                ]
            },
            "text": { "type": "STRING" },
            "title": { "type": "STRING" },
            "assigneeId": { "type": "STRING" },
            "dueDate": { "type": "STRING" },
            "clarification": { "type": "STRING" }
        },
        "required": ["command", "text"]
    })
}
