use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use samrac::checker::{CheckOutcome, CheckerConfig, DailyChecker, DEFAULT_KEYWORD, DEFAULT_MESSAGE};
use samrac::notify::SnsNotifier;
use samrac::scraper::WebScraper;
use samrac::store::{FileMarkerStore, MarkerStore, S3MarkerStore};
use samrac::types::MonthDay;

#[derive(Parser)]
#[command(name = "samrac")]
#[command(about = "A carmascafe.com front page checker and notifier", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Check today's top post and notify once per day if it mentions mocha chip
    Check {
        #[arg(long, env = "SAMRAC_TOPIC_ARN", help = "SNS topic ARN to publish to")]
        topic_arn: String,

        #[arg(
            long,
            env = "SAMRAC_BUCKET_NAME",
            conflicts_with = "log_path",
            help = "S3 bucket holding the day marker"
        )]
        bucket: Option<String>,

        #[arg(
            long,
            value_name = "FILE",
            help = "Keep the day marker in a local file instead of S3"
        )]
        log_path: Option<PathBuf>,

        #[arg(
            long,
            default_value = DEFAULT_MESSAGE,
            help = "Message to send when today's post matches"
        )]
        message: String,

        #[arg(long, help = "AWS credential profile to use")]
        profile: Option<String>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Fetch the most recent post and report how it matches, without notifying
    Latest {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Print the stored last-notified day
    Marker {
        #[arg(
            long,
            env = "SAMRAC_BUCKET_NAME",
            conflicts_with = "log_path",
            help = "S3 bucket holding the day marker"
        )]
        bucket: Option<String>,

        #[arg(long, value_name = "FILE", help = "Read the day marker from a local file")]
        log_path: Option<PathBuf>,

        #[arg(long, help = "AWS credential profile to use")]
        profile: Option<String>,
    },
}

#[derive(serde::Serialize)]
struct LatestReport {
    title: String,
    for_today: bool,
    keyword_found: bool,
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

async fn load_aws_config(profile: Option<&str>) -> aws_config::SdkConfig {
    match profile {
        Some(name) => {
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .profile_name(name)
                .load()
                .await
        }
        None => aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await,
    }
}

fn missing_backend() -> ! {
    log::error!("Exactly one of --bucket (or SAMRAC_BUCKET_NAME) and --log-path is required");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::Check {
            topic_arn,
            bucket,
            log_path,
            message,
            profile,
            format,
        } => {
            let aws = load_aws_config(profile.as_deref()).await;

            let store: Box<dyn MarkerStore> = match (bucket, log_path) {
                (Some(bucket), None) => Box::new(S3MarkerStore::new(&aws, bucket)),
                (None, Some(path)) => Box::new(FileMarkerStore::new(path)),
                _ => missing_backend(),
            };

            let scraper = WebScraper::new().unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            let checker = DailyChecker::new(
                Box::new(scraper),
                store,
                Box::new(SnsNotifier::new(&aws)),
                CheckerConfig::new(topic_arn).with_message(message),
            );

            let outcome = checker.run().await.unwrap_or_else(|e| {
                log::error!("Check failed: {}", e);
                process::exit(1);
            });

            match format {
                OutputFormat::Json => serialize_json(&outcome),
                OutputFormat::Text => match outcome {
                    CheckOutcome::Notified => {
                        println!("Notification sent for {}", MonthDay::today());
                    }
                    CheckOutcome::AlreadyNotified => {
                        println!("Already notified today; nothing to do.");
                    }
                    CheckOutcome::NoPostForToday => {
                        println!("No post for today yet.");
                    }
                    CheckOutcome::KeywordMissing => {
                        println!("Today's post does not mention {:?}.", DEFAULT_KEYWORD);
                    }
                },
            }
        }

        Commands::Latest { format } => {
            let scraper = WebScraper::new().unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            log::info!("Fetching the front page...");

            let post = scraper.fetch_latest_post().await.unwrap_or_else(|e| {
                log::error!("Error fetching latest post: {}", e);
                process::exit(1);
            });

            let today = MonthDay::today();
            let report = LatestReport {
                for_today: post.is_for_day(&today),
                keyword_found: post.has_keyword(DEFAULT_KEYWORD),
                title: post.title,
            };

            match format {
                OutputFormat::Json => serialize_json(&report),
                OutputFormat::Text => {
                    println!("Top post:      {}", report.title);
                    println!("For today:     {}", if report.for_today { "yes" } else { "no" });
                    println!(
                        "Mentions {:?}: {}",
                        DEFAULT_KEYWORD,
                        if report.keyword_found { "yes" } else { "no" }
                    );
                }
            }
        }

        Commands::Marker {
            bucket,
            log_path,
            profile,
        } => {
            let store: Box<dyn MarkerStore> = match (bucket, log_path) {
                (Some(bucket), None) => {
                    let aws = load_aws_config(profile.as_deref()).await;
                    Box::new(S3MarkerStore::new(&aws, bucket))
                }
                (None, Some(path)) => Box::new(FileMarkerStore::new(path)),
                _ => missing_backend(),
            };

            let marker = store.read_marker().await.unwrap_or_else(|e| {
                log::error!("Error reading marker: {}", e);
                process::exit(1);
            });

            match marker {
                Some(day) => println!("{}", day),
                None => println!("No notification has been sent yet."),
            }
        }
    }
}
