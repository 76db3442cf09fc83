// an invocation should fail with an error, not crash the runtime
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

use {
    std::{path::PathBuf, sync::Arc},
    tracing::{Level, info},
    tracing_subscriber::FmtSubscriber,
    clap::{Parser, Subcommand, ValueEnum, builder::PossibleValue},
    anyhow::{Context as _, anyhow},
    serde_json::Value,
    lambda_runtime::{Context, LambdaEvent, service_fn},
    visitor_counter::{
        config::CounterConfig,
        handler::CounterHandler,
        store::{BoxedCounterStore, DynamoDbStore, InMemoryStore, SqliteStore},
    },
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve invocations from the Lambda runtime API (default)
    Lambda,
    /// Increment the counter once and print the response
    Invoke {
        #[arg(long, default_value = "dynamodb")]
        store: ArgsStore,

        #[arg(long, default_value = "visitor-counter.sqlite")]
        sqlite_path: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub enum ArgsStore {
    DynamoDb,
    Sqlite,
    Memory,
}

impl ValueEnum for ArgsStore {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::DynamoDb, Self::Sqlite, Self::Memory]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::DynamoDb => PossibleValue::new("dynamodb").help("increment the counter in the DynamoDB table"),
            Self::Sqlite => PossibleValue::new("sqlite").help("increment the counter in a local sqlite file"),
            Self::Memory => PossibleValue::new("memory").help("increment a counter that only lives for this run"),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config = CounterConfig::from_env();

    match args.command.unwrap_or(Command::Lambda) {
        Command::Lambda => run_lambda(config).await,
        Command::Invoke { store, sqlite_path } => run_invoke(config, store, sqlite_path).await,
    }
}

async fn run_lambda(config: CounterConfig) -> anyhow::Result<()> {
    info!(table = config.table_name.as_str(), store = "dynamodb", "starting visitor counter");

    let handler = Arc::new(CounterHandler::new(DynamoDbStore::from_env(config.table_name).await));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = handler.clone();
        async move {
            handler.handle(event).await.map_err(lambda_runtime::Error::from)
        }
    }))
        .await
        .map_err(|err| anyhow!("lambda runtime failed: {err}"))
}

async fn run_invoke(config: CounterConfig, store: ArgsStore, sqlite_path: PathBuf) -> anyhow::Result<()> {
    info!(table = config.table_name.as_str(), store = ?store, "invoking visitor counter once");

    let store = match store {
        ArgsStore::DynamoDb => BoxedCounterStore::new(DynamoDbStore::from_env(config.table_name).await),
        ArgsStore::Sqlite => BoxedCounterStore::new(
            SqliteStore::open(&sqlite_path, &config.table_name)
                .with_context(|| format!("failed to open sqlite store at {sqlite_path:?}"))?
        ),
        ArgsStore::Memory => BoxedCounterStore::new(InMemoryStore::new()),
    };

    let event = LambdaEvent::new(Value::Object(Default::default()), Context::default());
    let response = CounterHandler::new(store).handle(event).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
