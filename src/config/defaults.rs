pub const DEFAULT_CONFIG_PATH: &str = "config/agent.toml";
pub const CONFIG_PATH_ENV: &str = "LINEAR_AGENT_CONFIG";

pub const ARCADE_USER_ID_ENV: &str = "ARCADE_USER_ID";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
pub const ARCADE_API_KEY_ENV: &str = "ARCADE_API_KEY";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ARCADE_BASE_URL_ENV: &str = "ARCADE_BASE_URL";
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

pub const DEFAULT_ARCADE_BASE_URL: &str = "https://api.arcade.dev";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

pub const DEFAULT_TOOLKITS: &[&str] = &["Linear"];
pub const DEFAULT_TOOL_LIMIT: usize = 100;
pub const DEFAULT_MAX_RESUME_ROUNDS: usize = 16;
pub const DEFAULT_MAX_STEPS: usize = 25;
pub const DEFAULT_AUTHORIZATION_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_APPROVAL_VERBS: &[&str] = &[
    "Archive",
    "Delete",
    "Remove",
    "Update",
    "Create",
    "Transition",
];

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"# Linear ReAct Agent

You help users manage work in Linear. Your tools can read, create, update, link, comment on and archive Linear issues, projects, initiatives, cycles and comments.

## Instructions
- Work in short Thought / Action / Observation steps and finish with a Final Answer that tells the user what happened or asks a clarifying question.
- Validate required fields before calling a tool. If something required is missing, ask for it instead of guessing.
- Prefer exact identifiers (IDs, slug ids, issue keys such as TOO-123) over names. When only a name is given and the tool supports fuzzy matching, ask whether matches may be auto-accepted.
- Destructive or irreversible actions (archive, large content rewrites) need explicit confirmation from the user.
- Updating a project's content breaks inline comment anchoring: warn the user before doing it.
- When a tool returns suggestions or "not found", present the options and let the user choose.
- Keep replies concise: what you did, what changed, and the next step.

## Error handling
- Validation errors: show the suggestions returned by the tool and ask which one to use.
- Several independent operations: split them into separate tool calls and confirm each step that has side effects.
- Transient failures (rate limits, network): retry once after a short wait, then report the error.
"#;
