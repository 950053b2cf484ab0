use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::debug_log_dir;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::StudySession;
use crate::infrastructure::api::StudySessionApi;

pub fn help_text() -> String {
    let text = r#"
HOTKEYS:
- Enter - Send the message to the study session.
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U / Page up - Page up
- CTRL+D / Page down - Page down
- CTRL+L - Load older messages from the session history.
- CTRL+P - Start or pause the Pomodoro timer.
- CTRL+R - Reset the Pomodoro timer back to the first work cycle.
- CTRL+C - Exit Studysync.

POMODORO:
Four cycles of 25 minutes of work, each followed by a 5 minute short break. The fourth cycle ends with a 20 minute long break, after which the timer is done until it is reset.
        "#;

    return text.trim().to_string();
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn prompt_session_code() -> Result<()> {
    let code: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Study session code")
        .validate_with(|input: &String| -> Result<(), String> {
            return StudySession::new(&Config::get(ConfigKey::ServerURL), input)
                .map(|_| return ())
                .map_err(|err| return err.to_string());
        })
        .interact_text()?;

    Config::set(ConfigKey::SessionCode, code.trim());
    return Ok(());
}

async fn join_session(matches: Vec<&ArgMatches>) -> Result<()> {
    Config::load(matches).await?;
    if Config::get(ConfigKey::SessionCode).is_empty() {
        prompt_session_code()?;
    }

    return Ok(());
}

async fn create_session(matches: Vec<&ArgMatches>) -> Result<()> {
    Config::load(matches).await?;

    let api = StudySessionApi::default();
    let code = match api.generate_session_code().await {
        Ok(code) => code,
        Err(err) => {
            bail!(format!(
                "There was an error generating the session code! Please try again.\n{err}"
            ));
        }
    };

    let session = api.session(&code)?;
    println!(
        "Created study session {}\nShare it with the code above or open {}",
        Paint::green(&code).bold(),
        session.page_url()
    );

    Config::set(ConfigKey::SessionCode, &code);
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    let mut cmd = Command::new("debug");
    cmd = cmd.about("Debug helpers for Studysync")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Studysync with environment variable RUST_LOG=studysync")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );

    return cmd;
}

fn arg_session_code() -> Arg {
    return Arg::new(ConfigKey::SessionCode.to_string())
        .short('k')
        .long("code")
        .env("STUDYSYNC_SESSION_CODE")
        .num_args(1)
        .help("Code of the study session to join. You will be asked for one when it is not set.");
}

fn subcommand_join() -> Command {
    return Command::new("join")
        .about("Join a study session's chat, with the Pomodoro timer alongside.")
        .arg(arg_session_code());
}

fn subcommand_create() -> Command {
    return Command::new("create")
        .about("Create a new study session, print its code, and join it.");
}

fn subcommand_pomodoro() -> Command {
    return Command::new("pomodoro").about("Run the Pomodoro timer on its own, without a session.");
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("HOTKEYS:") || line.starts_with("POMODORO:") {
                return Paint::new(line).underline().bold().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("studysync")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_join())
        .subcommand(subcommand_create())
        .subcommand(subcommand_pomodoro())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(arg_session_code())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("STUDYSYNC_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::ServerURL.to_string())
                .long(ConfigKey::ServerURL.to_string())
                .env("STUDYSYNC_SERVER_URL")
                .num_args(1)
                .help(format!("Base URL of the study web application. [default: {}]", Config::default(ConfigKey::ServerURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::CsrfToken.to_string())
                .long(ConfigKey::CsrfToken.to_string())
                .env("STUDYSYNC_CSRF_TOKEN")
                .num_args(1)
                .help("CSRF token sent with requests that create study sessions.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ProfilePictureURL.to_string())
                .long(ConfigKey::ProfilePictureURL.to_string())
                .env("STUDYSYNC_PROFILE_PICTURE_URL")
                .num_args(1)
                .help("Profile picture attached to the chat messages you send.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::PomodoroTickMs.to_string())
                .long(ConfigKey::PomodoroTickMs.to_string())
                .env("STUDYSYNC_POMODORO_TICK_MS")
                .num_args(1)
                .help(format!("Milliseconds between Pomodoro countdown ticks. [default: {}]", Config::default(ConfigKey::PomodoroTickMs)))
                .global(true),
        );
}

/// Handles the command line. Returns true when the UI should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = debug_log_dir().join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("join", subcmd_matches)) => {
            join_session(vec![&matches, subcmd_matches]).await?;
        }
        Some(("create", subcmd_matches)) => {
            create_session(vec![&matches, subcmd_matches]).await?;
        }
        Some(("pomodoro", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            Config::set(ConfigKey::SessionCode, "");
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            join_session(vec![&matches]).await?;
        }
    }

    return Ok(true);
}
