use clap::Parser;
use linear_agent::agent::{AgentOptions, MemoryCheckpointer, ReactAgent};
use linear_agent::arcade::ArcadeClient;
use linear_agent::config::AppConfig;
use linear_agent::model::OpenAiClient;
use linear_agent::session::{InterruptResolver, SessionLoop};
use linear_agent::terminal::ConsoleOperator;
use linear_agent::tooling::{ApprovalPolicy, ToolQuery, get_tools};
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(
    name = "linear-agent",
    version,
    about = "Chat with a Linear agent that asks before it acts"
)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _cli = Cli::parse();
    init_tracing();
    info!("Starting linear-agent");

    let config = AppConfig::load()?;
    debug!(
        thread_id = config.thread_id.as_str(),
        toolkits = ?config.toolkits,
        tools = ?config.tools,
        limit = config.tool_limit,
        "Configuration loaded"
    );

    let credentials = &config.credentials;
    let arcade = Arc::new(ArcadeClient::new(
        credentials.arcade_base_url.as_str(),
        credentials.arcade_api_key.as_str(),
        config.authorization_timeout,
    ));

    let tools = get_tools(
        arcade.as_ref(),
        &ToolQuery {
            toolkits: config.toolkits.clone(),
            tools: config.tools.clone(),
            user_id: credentials.arcade_user_id.clone(),
            limit: config.tool_limit,
        },
    )
    .await?;
    info!(count = tools.len(), "Tools ready");

    let provider = OpenAiClient::new(
        credentials.openai_base_url.as_str(),
        credentials.openai_api_key.as_str(),
    );
    let options = AgentOptions::new(credentials.model.as_str(), credentials.arcade_user_id.as_str())
        .with_system_prompt(config.system_prompt.as_str())
        .with_max_steps(config.max_steps);
    let agent = ReactAgent::new(provider, tools, arcade.clone(), options)
        .with_checkpointer(Arc::new(MemoryCheckpointer::new()))
        .with_approval_policy(ApprovalPolicy::new(&config.approval));

    let session = SessionLoop::new(
        agent,
        InterruptResolver::new(arcade),
        config.thread_id.as_str(),
        config.max_resume_rounds,
    );
    let mut operator = ConsoleOperator::stdio();
    session.run(&mut operator).await?;
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
