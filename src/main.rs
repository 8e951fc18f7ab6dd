use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use pr_pulse::commands::{self, GetOptions, SummaryOptions};
use pr_pulse::config::{Config, Overrides};
use pr_pulse::genai::GeminiClient;
use pr_pulse::github::{GitHubClient, RepoId};
use pr_pulse::output::{OutputFormat, RenderOptions};
use pr_pulse::slack::WebhookClient;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;

/// Options shared by every `get` subcommand.
#[derive(Args, Debug)]
struct GetArgs {
    /// Output format
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Save JSON output to a dated file in the current directory
    #[arg(short, long)]
    write: bool,

    /// GitHub token (defaults to GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,
}

impl GetArgs {
    fn options(&self, today: NaiveDate) -> GetOptions {
        if self.write && self.format != OutputFormat::Json {
            tracing::warn!("--write only applies to --format json; nothing will be saved");
        }
        GetOptions {
            format: self.format,
            write_dir: self.write.then(|| PathBuf::from(".")),
            render: RenderOptions::detect(),
            today,
        }
    }
}

#[derive(Subcommand, Debug)]
enum GetCommand {
    /// List PRs merged in the last N days
    List {
        /// Repository as owner/name
        repo: RepoId,

        /// Size of the window in days
        #[arg(short, long, default_value_t = 7)]
        days: u32,

        #[command(flatten)]
        common: GetArgs,
    },
    /// Show one PR with its first comments
    Detail {
        /// Repository as owner/name
        repo: RepoId,

        /// Pull request number
        number: u64,

        #[command(flatten)]
        common: GetArgs,
    },
    /// Fetch details for every PR merged in the last N days
    Details {
        /// Repository as owner/name
        repo: RepoId,

        /// Size of the window in days
        #[arg(short, long, default_value_t = 7)]
        days: u32,

        #[command(flatten)]
        common: GetArgs,
    },
}

impl GetCommand {
    fn common(&self) -> &GetArgs {
        match self {
            GetCommand::List { common, .. }
            | GetCommand::Detail { common, .. }
            | GetCommand::Details { common, .. } => common,
        }
    }
}

#[derive(Subcommand, Debug)]
enum AnalyzeCommand {
    /// Write a report from a `get details --format json` file using Gemini
    Summary {
        /// Path to the details JSON file
        input: PathBuf,

        /// Print the report as it is generated
        #[arg(short, long)]
        stream: bool,

        /// Save the report to a dated text file in the current directory
        #[arg(short, long)]
        write: bool,

        /// Gemini API key (defaults to GENAI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ShareCommand {
    /// Post a report file to a Slack incoming webhook
    Slack {
        /// Path to the report text file
        input: PathBuf,

        /// Send as Block Kit sections instead of a plain message
        #[arg(long)]
        blocks: bool,

        /// Webhook URL (defaults to SLACK_WEBHOOK_URL)
        #[arg(long)]
        webhook_url: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch merged pull requests from GitHub
    Get {
        #[command(subcommand)]
        command: GetCommand,
    },
    /// Summarize fetched pull requests with a generative model
    Analyze {
        #[command(subcommand)]
        command: AnalyzeCommand,
    },
    /// Share a report
    Share {
        #[command(subcommand)]
        command: ShareCommand,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pr-pulse")]
#[command(about = "Digest of merged GitHub pull requests", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            verbose: self.verbose,
            ..Overrides::default()
        };
        match &self.command {
            Commands::Get { command } => {
                overrides.github_token = command.common().token.clone();
            }
            Commands::Analyze {
                command: AnalyzeCommand::Summary { api_key, .. },
            } => {
                overrides.genai_api_key = api_key.clone();
            }
            Commands::Share {
                command: ShareCommand::Slack { webhook_url, .. },
            } => {
                overrides.slack_webhook_url = webhook_url.clone();
            }
        }
        overrides
    }
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    let today = Local::now().date_naive();

    match command {
        Commands::Get { command } => {
            let client = GitHubClient::new(config.github_token()?)?;
            let opts = command.common().options(today);

            let output = match &command {
                GetCommand::List { repo, days, .. } => {
                    commands::get::list(&client, config, repo, *days, &opts).await?
                }
                GetCommand::Detail { repo, number, .. } => {
                    commands::get::detail(&client, config, repo, *number, &opts).await?
                }
                GetCommand::Details { repo, days, .. } => {
                    commands::get::details(&client, config, repo, *days, &opts).await?
                }
            };
            println!("{}", output);
        }
        Commands::Analyze {
            command:
                AnalyzeCommand::Summary {
                    input,
                    stream,
                    write,
                    ..
                },
        } => {
            let generator = GeminiClient::new(config.genai_api_key()?, &config.genai_model);
            let opts = SummaryOptions {
                stream,
                write_dir: write.then(|| PathBuf::from(".")),
                today,
            };

            let report = commands::analyze::summary(&generator, config, &input, &opts).await?;
            if !stream {
                println!("{}", report);
            }
        }
        Commands::Share {
            command: ShareCommand::Slack { input, blocks, .. },
        } => {
            let client = WebhookClient::new(config.slack_webhook_url()?);
            commands::share::slack(&client, &input, blocks).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let overrides = cli.overrides();

    let config = match pr_pulse::config::load_config() {
        Ok(c) => c.with_overrides(overrides),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    pr_pulse::logging::init(config.verbose);
    tracing::debug!(batch_size = config.batch_size, prefix = %config.file_prefix, "loaded config");

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("error: {:#}", e);
        std::process::exit(EXIT_FAILURE);
    }

    std::process::exit(EXIT_SUCCESS);
}
