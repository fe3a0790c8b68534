// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::env;

use speiseplan::feed::{parse_date, today};
use speiseplan::{
    load_today_view, load_view, process_and_sort, render_menues, AppConfig, ExclusionPolicy,
    FeedClient, LoggingConfig, MenuEntry, MenuSource, MenuView,
};

const HELP: &str = "\
speiseplan - today's cafeteria menus

USAGE:
    speiseplan [COMMAND] [OPTIONS]

COMMANDS:
    ui      Browse the menus in the terminal (default)
    html    Print the filtered HTML fragment
    json    Print all processed menus as JSON

OPTIONS:
    --date YYYY-MM-DD        Day to show (default: today, UTC)
    --request-url URL        Overrides SPEISEPLAN_REQUEST_URL
    --referrer-url URL       Overrides SPEISEPLAN_REFERRER_URL
    --mandant ID             Overrides SPEISEPLAN_MANDANT_ID
    --speiseplan NR          Overrides SPEISEPLAN_NR
    -h, --help               Show this help
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Html,
    Json,
    Help,
}

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    command: Option<Command>,
    date: Option<NaiveDate>,
    request_url: Option<String>,
    referrer_url: Option<String>,
    mandant_id: Option<String>,
    speiseplan_nr: Option<String>,
}

impl CliArgs {
    fn command(&self) -> Command {
        self.command.unwrap_or(Command::Ui)
    }

    /// Command line wins over environment
    fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.request_url {
            config.feed.request_url = url.clone();
        }
        if let Some(url) = &self.referrer_url {
            config.feed.referrer_url = url.clone();
        }
        if let Some(id) = &self.mandant_id {
            config.feed.mandant_id = id.clone();
        }
        if let Some(nr) = &self.speiseplan_nr {
            config.feed.speiseplan_nr = nr.clone();
        }
    }
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("Missing value for {}", name))
        };

        match arg.as_str() {
            "ui" => cli.command = Some(Command::Ui),
            "html" => cli.command = Some(Command::Html),
            "json" => cli.command = Some(Command::Json),
            "-h" | "--help" => cli.command = Some(Command::Help),
            "--date" => cli.date = Some(parse_date(&value("--date")?)?),
            "--request-url" => cli.request_url = Some(value("--request-url")?),
            "--referrer-url" => cli.referrer_url = Some(value("--referrer-url")?),
            "--mandant" => cli.mandant_id = Some(value("--mandant")?),
            "--speiseplan" => cli.speiseplan_nr = Some(value("--speiseplan")?),
            other => bail!("Unknown argument: {} (see --help)", other),
        }
    }

    Ok(cli)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    if cli.command() == Command::Help {
        print!("{}", HELP);
        return Ok(());
    }

    let logging = match cli.command() {
        Command::Ui => LoggingConfig::quiet(),
        _ => LoggingConfig::from_env(),
    };
    logging.init()?;

    let mut config = AppConfig::from_env();
    cli.apply(&mut config);

    let datum = cli.date.unwrap_or_else(today);
    let client = FeedClient::new(config.feed.clone())?;
    let policy = ExclusionPolicy::from_config(&config);
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let load = || -> MenuView {
        match cli.date {
            Some(datum) => runtime.block_on(load_view(&client, datum)),
            None => runtime.block_on(load_today_view(&client)),
        }
    };

    match cli.command() {
        Command::Html => {
            println!("{}", render_menues(&load(), &policy));
        }
        Command::Json => {
            // JSON output is for scripting: report feed errors instead of a fallback page
            let entries: Vec<MenuEntry> = match cli.date {
                Some(datum) => runtime.block_on(client.menues_for(datum))?,
                None => runtime.block_on(client.menues_for_today())?,
            };
            let processed = process_and_sort(&entries);
            println!("{}", serde_json::to_string_pretty(&processed)?);
        }
        Command::Ui => {
            run_ui_mode(load(), policy, datum)?;
        }
        Command::Help => {}
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(view: MenuView, policy: ExclusionPolicy, datum: NaiveDate) -> Result<()> {
    println!("🖥️  Loading Speiseplan UI...\n");

    let mut app = ui::App::new(view, policy, datum);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_view: MenuView, _policy: ExclusionPolicy, _datum: NaiveDate) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print the menus: speiseplan html");
    std::process::exit(1);
}
