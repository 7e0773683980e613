//! Command line client for the research desk.
//!
//! Registers and logs in against the auth server, keeps the session token in a
//! local file and uses it for calls to the research data API.

use anyhow::{Context, Result, anyhow};
use pico_args::Arguments;
use research_desk::auth::{LoginRequest, RegisterRequest};
use std::{
    io::{self, Write},
    path::PathBuf,
};

use rd_client::{
    ClientError,
    api_client::ApiClient,
    commands::{Command, parse_command, strip_line_ending},
    data_service::{ExternalDataService, HttpDataService, NewSavedSearch},
    session::{SESSION_FILE_NAME, SessionManager, SessionStore},
};

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
const DEFAULT_API_URL: &str = "http://localhost:5001";

const HELP: &str = "\
Research desk command line client

USAGE:
  rd_client [OPTIONS] COMMAND [ARGS]

COMMANDS:
  register USERNAME EMAIL   Create an account and log in
  login EMAIL               Log in with an existing account
  logout                    Forget the stored session
  whoami                    Show who the stored token belongs to
  search QUERY              Search papers
  summarize ABSTRACT        Summarize one abstract
  report QUERY              Generate a research report
  save-search QUERY         Search and store the results
  inventory                 List stored searches

OPTIONS:
  --server URL          Auth server URL  [env: RESEARCH_DESK_SERVER, default: http://localhost:5000]
  --api URL             Research API URL  [env: RESEARCH_DESK_API, default: http://localhost:5001]
  --session-file PATH   Session file  [env: RESEARCH_DESK_SESSION]
  --password PASS       Password for register/login (prompted if omitted)

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  RUST_LOG              Log filter (e.g. debug)
";

struct Args {
    server_url: String,
    api_url: String,
    session_file: PathBuf,
    password: Option<String>,
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder().format_target(false).init();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let server_url = pargs
        .opt_value_from_str("--server")?
        .or_else(|| std::env::var("RESEARCH_DESK_SERVER").ok())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    let api_url = pargs
        .opt_value_from_str("--api")?
        .or_else(|| std::env::var("RESEARCH_DESK_API").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let session_file = match pargs.opt_value_from_str::<_, PathBuf>("--session-file")? {
        Some(path) => path,
        None => default_session_file(),
    };
    let password = pargs.opt_value_from_str("--password")?;

    let words = pargs
        .finish()
        .into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| anyhow!("Argument is not valid UTF-8: {:?}", arg))
        })
        .collect::<Result<Vec<_>>>()?;
    let command = parse_command(&words)?;

    let args = Args {
        server_url,
        api_url,
        session_file,
        password,
        command,
    };

    match run(args).await {
        Err(e) => match e.downcast_ref::<ClientError>() {
            Some(ClientError::NotAuthenticated) => {
                eprintln!("Not logged in. Run `rd_client login EMAIL` first.");
                std::process::exit(1);
            }
            Some(ClientError::Unauthorized(reason)) => {
                eprintln!("Session rejected ({reason}). Log in again.");
                std::process::exit(1);
            }
            _ => Err(e),
        },
        Ok(()) => Ok(()),
    }
}

fn default_session_file() -> PathBuf {
    std::env::var_os("RESEARCH_DESK_SESSION")
        .map(PathBuf::from)
        .or_else(SessionStore::default_path)
        .unwrap_or_else(|| PathBuf::from(SESSION_FILE_NAME))
}

async fn run(args: Args) -> Result<()> {
    let sessions = SessionManager::new(
        ApiClient::new(args.server_url),
        SessionStore::new(args.session_file),
    );
    let data = HttpDataService::new(args.api_url);

    if args.command.requires_session() {
        log::debug!("Using session file {}", sessions.store().path().display());
    }

    match args.command {
        Command::Register { username, email } => {
            let password = password_or_prompt(args.password)?;
            let session = sessions
                .register(&RegisterRequest {
                    username,
                    email,
                    password,
                })
                .await
                .context("Failed to register")?;
            println!("Registered and logged in as {}", session.user.username);
        }
        Command::Login { email } => {
            let password = password_or_prompt(args.password)?;
            let session = sessions
                .login(&LoginRequest { email, password })
                .await
                .context("Failed to log in")?;
            println!("Logged in as {}", session.user.username);
        }
        Command::Logout => {
            sessions.logout().await.context("Failed to clear session")?;
            println!("Logged out. No session is stored.");
        }
        Command::WhoAmI => {
            let info = sessions.whoami().await?;
            println!("{} ({})", info.user.username, info.user.id);
            println!("  issued:  {}", info.issued_at.to_rfc3339());
            println!("  expires: {}", info.expires_at.to_rfc3339());
        }
        Command::Search { query } => {
            let token = sessions.bearer().await?;
            let results = data.search_papers(&token, &query).await?;
            if results.papers.is_empty() {
                println!("No papers found.");
                return Ok(());
            }
            for (i, paper) in results.papers.iter().enumerate() {
                println!("{}. {}", i + 1, paper.title);
                if !paper.authors.is_empty() {
                    println!("   {}", paper.authors.join(", "));
                }
                if let Some(summary) = results.summaries.get(i) {
                    println!("   {}", summary);
                }
                if !paper.link.is_empty() {
                    println!("   {}", paper.link);
                }
            }
            println!("\n{}", results.consolidated_summary);
        }
        Command::Summarize { abstract_text } => {
            let token = sessions.bearer().await?;
            println!("{}", data.analyze_paper(&token, &abstract_text).await?);
        }
        Command::Report { query } => {
            let token = sessions.bearer().await?;
            let report = data.generate_report(&token, &query).await?;
            println!("{}", report.report);
            println!("\nBased on {} papers", report.papers.len());
        }
        Command::SaveSearch { query } => {
            let session = sessions.current().await?;
            let results = data.search_papers(&session.token, &query).await?;
            let search = NewSavedSearch::from_results(query, results, session.user.id);
            let saved = data.save_search(&session.token, &search).await?;
            println!("Saved '{}' with {} papers", saved.title, saved.papers.len());
        }
        Command::Inventory => {
            let token = sessions.bearer().await?;
            let searches = data.list_searches(&token).await?;
            if searches.is_empty() {
                println!("No saved searches.");
            }
            for search in searches {
                let when = search
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{:<16} {} ({} papers)", when, search.title, search.papers.len());
            }
        }
    }

    Ok(())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => {
            print!("Password: ");
            io::stdout().flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            Ok(strip_line_ending(&input).to_string())
        }
    }
}
