//! Aurora - streaming intent analysis in the terminal

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use aurora::{
    analysis::{AnalysisClient, AnalysisController},
    auth::{create_auth_service, AuthContext},
    config::AppConfig,
    i18n::{init_locale, init_locale_with, t, Locale, Text},
    log_error, log_info, logging,
    ui::{self, App},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Analyze one question
    Analyze {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Log in and remember the session
    Login {
        username: String,
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
}

#[derive(Parser, Debug)]
#[command(name = "aurora")]
#[command(version)]
#[command(about = "Streaming intent analysis client", long_about = None)]
struct Args {
    /// Configuration file path (overrides defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print line output instead of starting the TUI
    #[arg(long)]
    plain: bool,

    /// UI language (zh or en)
    #[arg(long)]
    lang: Option<String>,

    /// Credentials file (default: <data_dir>/credentials.json)
    #[arg(long)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;

    let tui_mode = match &args.command {
        None => !args.plain,
        Some(Command::Analyze { .. }) => !args.plain && std::io::stdout().is_terminal(),
        Some(_) => false,
    };
    init_logging(args.verbose, tui_mode, config.debug);

    match args.lang.as_deref().or(config.language.as_deref()) {
        Some(lang) => {
            init_locale_with(Locale::from_tag(lang).unwrap_or_else(Locale::detect));
        }
        None => {
            init_locale();
        }
    }

    let credentials_path = args.credentials.unwrap_or_else(AuthContext::default_path);
    let mut auth = AuthContext::hydrate(&credentials_path)?;

    match args.command {
        Some(Command::Login { username, password }) => {
            let service = create_auth_service(&config)?;
            let credentials = auth.login(service.as_ref(), &username, &password).await?;
            println!("{}: {}", t(Text::LoginSuccess), credentials.username);
            Ok(())
        }
        Some(Command::Logout) => {
            auth.logout()?;
            println!("{}", t(Text::LoggedOut));
            Ok(())
        }
        Some(Command::Whoami) => {
            match auth.username() {
                Some(username) => println!("{}", username),
                None => println!("{}", t(Text::NotLoggedIn)),
            }
            Ok(())
        }
        Some(Command::Analyze { question }) => {
            let question = question.join(" ");
            let controller = build_controller(&config, &auth)?;
            if tui_mode {
                run_tui(controller, &auth, Some(question)).await
            } else {
                run_plain(controller, &question).await
            }
        }
        None if args.plain => {
            anyhow::bail!("--plain needs a question: aurora --plain analyze <question>")
        }
        None => {
            let controller = build_controller(&config, &auth)?;
            run_tui(controller, &auth, None).await
        }
    }
}

fn build_controller(
    config: &AppConfig,
    auth: &AuthContext,
) -> anyhow::Result<AnalysisController> {
    let client = AnalysisClient::new(config)?
        .with_bearer_token(auth.bearer_token().map(str::to_string));
    tracing::info!("Using analysis endpoint {}", client.endpoint());
    Ok(AnalysisController::new(client, config.user_id.clone()))
}

/// Initialize logging
fn init_logging(verbose: bool, tui_mode: bool, debug_mode: bool) {
    let filter = if verbose || debug_mode {
        "aurora=debug,info"
    } else {
        "aurora=info,warn"
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    // The TUI owns the terminal, so everything goes to the log file
    if tui_mode {
        let _ = logging::init_logger();
        if debug_mode {
            logging::set_debug_mode(true);
        }

        if let Ok(file) = logging::open_log_file() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .init();
        }
        return;
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run_tui(
    controller: AnalysisController,
    auth: &AuthContext,
    initial_query: Option<String>,
) -> anyhow::Result<()> {
    log_info!("Log file: {}", logging::get_log_path_display());

    let user = auth.username().map(str::to_string);
    let mut app = App::new(controller, user)?.with_initial_query(initial_query);
    if let Err(e) = app.run().await {
        log_error!("TUI exited with error: {}", e);
        return Err(e.into());
    }
    Ok(())
}

async fn run_plain(mut controller: AnalysisController, question: &str) -> anyhow::Result<()> {
    ui::plain::run(&mut controller, question, std::io::stdout()).await?;

    match controller.state().error() {
        Some(error) => anyhow::bail!("{}", error),
        None => Ok(()),
    }
}
