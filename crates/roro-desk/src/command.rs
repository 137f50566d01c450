use chrono::NaiveDate;

use roro_models::Theme;

/// One desk interaction. Slash-prefixed input parses into a command; any
/// other non-empty line is a chat turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ticker(String),
    Tickers(Option<String>),
    Range(NaiveDate, NaiveDate),
    Theme(Theme),
    Fetch,
    Chart,
    Macro,
    Analyze,
    Retry,
    Reset,
    Help,
    Quit,
    Chat(String),
}

/// Commands offered for completion, with argument hints.
pub const COMMANDS: &[&str] = &[
    "/ticker",
    "/tickers",
    "/range",
    "/theme",
    "/fetch",
    "/chart",
    "/macro",
    "/analyze",
    "/retry",
    "/reset",
    "/help",
    "/quit",
];

/// Parse one input line. Returns a usage message on malformed commands.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();

    if !line.starts_with('/') {
        return Ok(Command::Chat(line.to_string()));
    }

    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match command {
        "/ticker" => match args.as_slice() {
            [symbol] => Ok(Command::Ticker((*symbol).to_string())),
            _ => Err("usage: /ticker <SYMBOL>".to_string()),
        },
        "/tickers" => Ok(Command::Tickers(args.first().map(|s| (*s).to_string()))),
        "/range" => match args.as_slice() {
            [start, end] => {
                let start = parse_date(start)?;
                let end = parse_date(end)?;
                Ok(Command::Range(start, end))
            }
            _ => Err("usage: /range <YYYY-MM-DD> <YYYY-MM-DD>".to_string()),
        },
        "/theme" => match args.as_slice() {
            ["light"] => Ok(Command::Theme(Theme::Light)),
            ["dark"] => Ok(Command::Theme(Theme::Dark)),
            _ => Err("usage: /theme light|dark".to_string()),
        },
        "/fetch" => Ok(Command::Fetch),
        "/chart" => Ok(Command::Chart),
        "/macro" => Ok(Command::Macro),
        "/analyze" => Ok(Command::Analyze),
        "/retry" => Ok(Command::Retry),
        "/reset" => Ok(Command::Reset),
        "/help" => Ok(Command::Help),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other} (try /help)")),
    }
}

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    text.parse::<NaiveDate>()
        .map_err(|_| format!("not a date (YYYY-MM-DD): {text}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_chat() {
        assert_eq!(
            parse("what's the outlook for AAPL?").unwrap(),
            Command::Chat("what's the outlook for AAPL?".to_string())
        );
    }

    #[test]
    fn ticker_command() {
        assert_eq!(
            parse("/ticker TSLA").unwrap(),
            Command::Ticker("TSLA".to_string())
        );
        assert!(parse("/ticker").is_err());
        assert!(parse("/ticker A B").is_err());
    }

    #[test]
    fn tickers_with_optional_filter() {
        assert_eq!(parse("/tickers").unwrap(), Command::Tickers(None));
        assert_eq!(
            parse("/tickers XL").unwrap(),
            Command::Tickers(Some("XL".to_string()))
        );
    }

    #[test]
    fn range_command_parses_dates() {
        assert_eq!(
            parse("/range 2024-01-01 2024-06-30").unwrap(),
            Command::Range(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
            )
        );
        assert!(parse("/range 2024-01-01").is_err());
        assert!(parse("/range yesterday today").is_err());
    }

    #[test]
    fn inverted_range_is_accepted() {
        // Ordering is left to the provider to reject.
        assert!(parse("/range 2024-06-30 2024-01-01").is_ok());
    }

    #[test]
    fn theme_command() {
        assert_eq!(parse("/theme dark").unwrap(), Command::Theme(Theme::Dark));
        assert_eq!(parse("/theme light").unwrap(), Command::Theme(Theme::Light));
        assert!(parse("/theme blue").is_err());
    }

    #[test]
    fn bare_commands() {
        assert_eq!(parse("/fetch").unwrap(), Command::Fetch);
        assert_eq!(parse("/chart").unwrap(), Command::Chart);
        assert_eq!(parse("/macro").unwrap(), Command::Macro);
        assert_eq!(parse("/analyze").unwrap(), Command::Analyze);
        assert_eq!(parse("/retry").unwrap(), Command::Retry);
        assert_eq!(parse("/reset").unwrap(), Command::Reset);
        assert_eq!(parse("/quit").unwrap(), Command::Quit);
        assert_eq!(parse("/exit").unwrap(), Command::Quit);
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse("/frobnicate").is_err());
    }
}
