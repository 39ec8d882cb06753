mod commands;
mod gateway;
mod logging;
mod prioritize;
mod tasks;
#[cfg(test)]
mod test_support;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use tasknudge_channels::telegram::TelegramChannel;
use tasknudge_core::{
    clock::{Clock, ZonedClock},
    config::{self, parse_schedule, Config},
    traits::{Channel, TaskSource},
};
use tasknudge_todoist::TodoistClient;

#[derive(Parser)]
#[command(
    name = "tasknudge",
    version,
    about = "Todoist reminders and task prioritization over Telegram"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot: commands, button presses, and scheduled notifications.
    Start,
    /// Send today's notification once and exit.
    Notify,
    /// Check configuration and show the next scheduled runs.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load(&cli.config)?;
    cfg.apply_env_overrides();
    let _log_guard = logging::init(&cfg.nudge)?;

    match cli.command {
        Commands::Start => {
            cfg.validate()?;
            let gw = Arc::new(build_gateway(&cfg)?);
            gw.run().await?;
        }
        Commands::Notify => {
            cfg.validate()?;
            let gw = build_gateway(&cfg)?;
            tokio::time::timeout(cfg.job_timeout(), gw.notify_today())
                .await
                .map_err(|_| {
                    anyhow::anyhow!(
                        "notification timed out after {}s",
                        cfg.job_timeout().as_secs()
                    )
                })??;
        }
        Commands::Status => print_status(&cli.config, &cfg),
    }

    Ok(())
}

/// Wire the production collaborators together.
fn build_gateway(cfg: &Config) -> anyhow::Result<gateway::Gateway> {
    let clock: Arc<dyn Clock> = Arc::new(ZonedClock::new(cfg.timezone()?));
    let source: Arc<dyn TaskSource> = Arc::new(TodoistClient::new(&cfg.todoist)?);
    let tasks = Arc::new(tasks::TaskService::new(
        source,
        clock,
        cfg.todoist.project_cache_ttl(),
    ));
    let channel: Arc<dyn Channel> = Arc::new(TelegramChannel::new(&cfg.channel.telegram));
    Ok(gateway::Gateway::new(channel, tasks, cfg)?)
}

fn print_status(config_path: &str, cfg: &Config) {
    let set = |ok: bool| if ok { "set" } else { "missing" };

    println!("tasknudge — Status Check\n");
    println!("Config: {config_path}");
    println!("Timezone: {}", cfg.nudge.timezone);
    println!("  todoist token: {}", set(!cfg.todoist.api_token.is_empty()));
    println!(
        "  telegram bot token: {}",
        set(!cfg.channel.telegram.bot_token.is_empty())
    );
    println!(
        "  telegram chat id: {}",
        set(cfg.channel.telegram.chat_id != 0)
    );
    println!();

    match cfg.validate() {
        Ok(()) => println!("Configuration: ok"),
        Err(e) => println!("Configuration: {e}"),
    }

    let Ok(tz) = cfg.timezone() else {
        return;
    };
    let now = ZonedClock::new(tz).now();
    let schedules = [
        ("notify", cfg.scheduler.schedule.as_str()),
        ("prioritize", cfg.scheduler.prioritize_schedule.as_str()),
    ];
    for (name, expr) in schedules {
        if expr.trim().is_empty() {
            println!("  {name}: disabled");
            continue;
        }
        match parse_schedule(expr).map(|s| gateway::next_fire(&s, &now)) {
            Ok(Some(next)) => println!("  {name}: {expr} (next run {next})"),
            Ok(None) => println!("  {name}: {expr} (no upcoming runs)"),
            Err(e) => println!("  {name}: {e}"),
        }
    }
    if !cfg.scheduler.enabled {
        println!("  scheduler: disabled");
    }
}
