use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use how_cli::config::Config;
use how_cli::credentials::CredentialProvider;
use how_cli::error::HowError;
use how_cli::history::HistoryRecorder;
use how_cli::pipeline::{Options, Pipeline};
use std::ffi::OsString;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const BANNER: &str = r"
    __
   / /  ___ _    __
  / _ \/ _ \ |/|/ /
 /_//_/\___/__,__/
";

const INTERRUPTED: u8 = 130;

fn cli() -> Command {
    Command::new("how")
        .about("Ask me how to do anything in your terminal!")
        .before_help(BANNER)
        .override_usage("how <question> [--silent] [--history] [--type] [--help] [--api-key]")
        .arg(Arg::new("question")
            .help("What you want to do, in plain words")
            .value_name("QUESTION")
            .num_args(1..)
            .trailing_var_arg(true)
            .allow_hyphen_values(true))
        .arg(Arg::new("silent")
            .long("silent")
            .help("Suppress spinner and typewriter effect")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("type")
            .long("type")
            .help("Show output with typewriter effect")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("history")
            .long("history")
            .help("Show command/question history")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("api-key")
            .long("api-key")
            .help("Set the Groq API key (usage: --api-key <API_KEY>)")
            .value_name("API_KEY")
            .num_args(0..=1))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One parsed command line.
#[derive(Debug)]
struct Invocation {
    question: Vec<String>,
    silent: bool,
    typewriter: bool,
    history: bool,
    help: bool,
    api_key: Option<String>,
}

/// Parses the command line. Words after the first question word are taken
/// verbatim, so `ls -la` survives; the long flags are still honoured there.
fn parse_args<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = cli().try_get_matches_from(args)?;
    let mut invocation = Invocation {
        question: Vec::new(),
        silent: matches.get_flag("silent"),
        typewriter: matches.get_flag("type"),
        history: matches.get_flag("history"),
        help: false,
        api_key: matches.get_one::<String>("api-key").cloned(),
    };

    let mut words = matches.get_many::<String>("question").unwrap_or_default().peekable();
    while let Some(word) = words.next() {
        match word.as_str() {
            "--silent" => invocation.silent = true,
            "--type" => invocation.typewriter = true,
            "--history" => invocation.history = true,
            "--help" => invocation.help = true,
            // A bare `--api-key` is dropped from the question.
            "--api-key" => {
                if let Some(key) = words.next_if(|next| !next.starts_with("--")) {
                    invocation.api_key.get_or_insert_with(|| key.clone());
                }
            }
            _ => invocation.question.push(word.clone()),
        }
    }
    Ok(invocation)
}

fn print_help() {
    if let Err(e) = cli().print_help() {
        debug!("Could not print help: {}", e);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    if std::env::args_os().len() < 2 {
        print_help();
        return ExitCode::SUCCESS;
    }
    let invocation = match parse_args(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(e) => {
            if let Err(print_err) = e.print() {
                debug!("Could not print usage: {}", print_err);
            }
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };
    if invocation.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    // The pipeline may block a worker on stdin; the signal is watched here.
    let task = tokio::spawn(run(invocation));
    tokio::select! {
        biased;
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("\n👋 Interrupted.");
            std::process::exit(INTERRUPTED.into());
        }
        joined = task => joined.unwrap_or_else(|e| {
            error!("Invocation task failed: {}", e);
            ExitCode::FAILURE
        }),
    }
}

async fn run(invocation: Invocation) -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("💥 Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if invocation.history {
        HistoryRecorder::new(&config).show();
        return ExitCode::SUCCESS;
    }

    if let Some(api_key) = &invocation.api_key {
        return match CredentialProvider::new(&config).replace(api_key) {
            Ok(()) => {
                println!("Groq API key replaced successfully.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error saving API key: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let question = invocation.question.join(" ");
    if question.trim().is_empty() {
        return report(HowError::Usage("No question provided.".to_string()));
    }

    let options = Options {
        silent: invocation.silent,
        typewriter: invocation.typewriter,
    };
    info!("Answering question with model {}", config.model);

    match Pipeline::new(&config, options).run(&question).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

fn report(err: HowError) -> ExitCode {
    eprintln!("{}", err.user_message());
    ExitCode::from(err.exit_code())
}
