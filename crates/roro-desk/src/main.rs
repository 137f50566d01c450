use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context as LineContext, Editor, Helper};
use tracing_subscriber::EnvFilter;

use roro_agents::{AgentInvoker, ClaudeCliInvoker, InvocationMode};
use roro_data::{FredClient, MacroData, MarketClient};
use roro_desk::command::{self, Command, COMMANDS};
use roro_desk::render::{self, Styles};
use roro_desk::session::DeskSession;
use roro_models::config::{DeskConfig, DEFAULT_MODEL};
use roro_models::tickers;

#[derive(Parser, Debug)]
#[command(
    name = "roro-desk",
    about = "Interactive trading desk: market data, macro indicators, and an AI analyst chat"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/roro-desk.toml")]
    config: String,
}

/// Rustyline helper: command completion, ticker completion, hints, and
/// slash-command highlighting.
#[derive(Clone)]
struct DeskHelper {
    commands: Vec<String>,
}

impl DeskHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for DeskHelper {}

impl Completer for DeskHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &LineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if let Some(prefix) = line.strip_prefix("/ticker ") {
            let candidates: Vec<Pair> = tickers::matching(prefix)
                .into_iter()
                .map(|symbol| Pair {
                    display: symbol.to_string(),
                    replacement: symbol.to_string(),
                })
                .collect();
            return Ok((line.len() - prefix.len(), candidates));
        }

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for DeskHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for DeskHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &LineContext<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for DeskHelper {}

fn load_config(path: &str) -> Result<DeskConfig> {
    match std::fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw).with_context(|| format!("Failed to parse config: {path}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path, "No config file found, using defaults");
            Ok(DeskConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read config: {path}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let market =
        MarketClient::from_config(&config.market).context("Failed to build market data provider")?;
    let macro_data: Option<Arc<dyn MacroData>> = match FredClient::from_config(&config.fred) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!(error = %e, "Macro data disabled");
            None
        }
    };

    let invoker = ClaudeCliInvoker::new(
        InvocationMode::Streaming,
        Duration::from_secs(config.chat.timeout_seconds),
    );
    let agent = config.agent.to_profile(DEFAULT_MODEL);
    let mut session = DeskSession::new(&config, agent, Arc::new(market), macro_data);

    println!("{}", "=== RORO Desk ===".bright_magenta().bold());
    println!(
        "{}",
        "Type /help for commands, or just type to chat with the analyst.".bright_black()
    );
    show_macro_strip(&session).await;
    show_selection(&session);
    println!();

    let mut rl = Editor::new()?;
    rl.set_helper(Some(DeskHelper::new()));

    loop {
        match rl.readline("roro> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match command::parse(trimmed) {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => dispatch(cmd, &mut session, &invoker).await,
                    Err(usage) => println!("{}", usage.yellow()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

async fn dispatch(command: Command, session: &mut DeskSession, invoker: &dyn AgentInvoker) {
    match command {
        Command::Ticker(symbol) => match session.select_ticker(&symbol) {
            Ok(_) => show_selection(session),
            Err(e) => println!("{}", e.to_string().red()),
        },
        Command::Tickers(filter) => {
            let symbols = tickers::matching(filter.as_deref().unwrap_or(""));
            if symbols.is_empty() {
                println!("{}", "No matching symbols.".yellow());
            } else {
                for chunk in symbols.chunks(10) {
                    println!("{}", chunk.join("  "));
                }
            }
        }
        Command::Range(start, end) => {
            session.set_date_range(start, end);
            show_selection(session);
        }
        Command::Theme(theme) => {
            session.set_theme(theme);
            println!("Theme set to {theme:?}");
        }
        Command::Fetch => match session.fetch().await {
            Ok(count) => println!(
                "{}",
                format!("Loaded {count} points for {}", session.ticker()).green()
            ),
            Err(e) => println!("{}", format!("Fetch failed: {e}").red()),
        },
        Command::Chart => match session.chart_series() {
            Ok(series) => println!("{}", render::render_chart(series, session.theme())),
            Err(e) => println!("{}", e.to_string().red()),
        },
        Command::Macro => show_macro_strip(session).await,
        Command::Analyze => {
            let styles = Styles::for_theme(session.theme());
            println!(
                "{}",
                format!("[{}] analyzing {}...", session.agent().name, session.ticker())
                    .color(styles.dim)
            );
            let mut printed = 0usize;
            let result = session
                .analyze(invoker, |acc| {
                    print!("{}", &acc[printed..]);
                    printed = acc.len();
                    let _ = std::io::stdout().flush();
                })
                .await;
            println!();
            if let Err(e) = result {
                println!("{}", format!("Analysis failed: {e}").red());
            }
        }
        Command::Retry => run_agent_turn(session, invoker, None).await,
        Command::Reset => {
            session.chat.reset();
            println!("{}", "Conversation cleared.".bright_black());
        }
        Command::Help => print_help(),
        Command::Chat(text) => run_agent_turn(session, invoker, Some(text)).await,
        Command::Quit => unreachable!("handled by the REPL loop"),
    }
}

/// One chat turn (or a retry of the previous one), streamed to the
/// terminal as fragments arrive.
async fn run_agent_turn(session: &mut DeskSession, invoker: &dyn AgentInvoker, text: Option<String>) {
    let styles = Styles::for_theme(session.theme());
    let profile = session.agent().clone();

    println!("{}", format!("[{}]", profile.name).color(styles.assistant));
    let mut printed = 0usize;
    let on_progress = |acc: &str| {
        print!("{}", &acc[printed..]);
        printed = acc.len();
        let _ = std::io::stdout().flush();
    };

    let result = match text {
        Some(text) => session.chat.run_turn(invoker, &profile, text, on_progress).await,
        None => session.chat.retry(invoker, &profile, on_progress).await,
    };
    println!();

    if let Err(e) = result {
        println!("{}", format!("The analyst could not respond: {e}").red());
        if session.chat.awaiting_response() {
            println!("{}", "Your message is kept; /retry to try again.".yellow());
        }
    }
}

async fn show_macro_strip(session: &DeskSession) {
    match session.macro_strip().await {
        Ok(rows) => println!("{}", render::macro_strip_line(&rows).bright_black()),
        Err(e) => println!("{}", e.to_string().yellow()),
    }
}

fn show_selection(session: &DeskSession) {
    let (start, end) = session.date_range();
    println!(
        "Selected: {}  {} → {}",
        session.ticker().bold(),
        start,
        end
    );
}

fn print_help() {
    println!("/ticker <SYM>          select a ticker from the reference list");
    println!("/tickers [prefix]      list selectable tickers");
    println!("/range <start> <end>   set the date range (YYYY-MM-DD)");
    println!("/theme light|dark      switch the color theme");
    println!("/fetch                 fetch market data for the selection");
    println!("/chart                 draw the capitalization chart");
    println!("/macro                 refresh the macro indicator strip");
    println!("/analyze               one-shot AI analysis of the selection");
    println!("/retry                 retry a failed chat turn");
    println!("/reset                 clear the conversation");
    println!("/quit                  exit");
    println!();
    println!("Anything else is sent to the analyst as chat.");
}
