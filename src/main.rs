use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wordsplit::{
    Allowlist, AllowlistBuilder, NlpClient, NlpClientConfig, ParserConfig, ParserRegistry,
    ParserResult,
};

#[derive(ClapParser)]
#[command(name = "wordsplit", version, about = "Split text into sentences and tokens")]
struct Cli {
    /// Allowlist of external parsers (TOML)
    #[arg(long, global = true, env = "WORDSPLIT_ALLOWLIST")]
    allowlist: Option<PathBuf>,

    /// Reject allowlist entries whose binary is missing
    #[arg(long, global = true)]
    strict_allowlist: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment a file (or stdin) into sentences and tokens
    Parse {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Language settings (TOML); defaults to Latin-script settings
        #[arg(short, long)]
        language: Option<PathBuf>,

        /// Parser identifier; defaults to the language's parser or "regex"
        #[arg(short, long)]
        parser: Option<String>,

        /// Fall back to the regex parser if the requested one fails
        #[arg(long)]
        fallback: bool,

        #[arg(short, long, value_enum, default_value_t = OutputKind::Text)]
        format: OutputKind,
    },

    /// List parsers and whether they can run
    Parsers,

    /// Lemmatize words through the NLP service
    Lemmatize {
        #[arg(short, long)]
        language: String,

        #[arg(required = true)]
        words: Vec<String>,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// List TTS voices known to the NLP service
    Voices {
        /// Only voices installed on the service
        #[arg(long)]
        installed: bool,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// Check whether the NLP service is reachable
    Health {
        #[command(flatten)]
        service: ServiceArgs,
    },
}

#[derive(clap::Args)]
struct ServiceArgs {
    /// Base URL of the NLP service
    #[arg(long, env = "NLP_SERVICE_URL", default_value = wordsplit::nlp::DEFAULT_NLP_URL)]
    nlp_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

impl ServiceArgs {
    fn client(&self) -> Result<NlpClient> {
        NlpClient::new(NlpClientConfig {
            base_url: self.nlp_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            use_proxy: true,
        })
        .context("Failed to build HTTP client")
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputKind {
    Text,
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("WORDSPLIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_registry(cli: &Cli) -> Result<ParserRegistry> {
    let allowlist = match &cli.allowlist {
        Some(path) => AllowlistBuilder::new()
            .require_binaries(cli.strict_allowlist)
            .load_file(path)
            .with_context(|| format!("Failed to load allowlist {}", path.display()))?
            .build(),
        None => Allowlist::empty(),
    };
    info!(external_parsers = allowlist.len(), "allowlist loaded");
    Ok(ParserRegistry::with_allowlist(Arc::new(allowlist)))
}

fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read stdin")?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

fn print_result(result: &ParserResult, format: OutputKind) -> Result<()> {
    match format {
        OutputKind::Json => {
            let json =
                serde_json::to_string_pretty(result).context("Failed to serialize result")?;
            println!("{}", json);
        }
        OutputKind::Text => {
            for (i, sentence) in result.sentences().iter().enumerate() {
                println!("[{}] {}", i, sentence.trim_end());
            }
            println!(
                "{} sentences, {} tokens ({} words)",
                result.sentence_count(),
                result.token_count(),
                result.word_count()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Parse {
            input,
            language,
            parser,
            fallback,
            format,
        } => {
            let config = match language {
                Some(path) => ParserConfig::from_toml_file(path)
                    .with_context(|| format!("Invalid language settings {}", path.display()))?,
                None => ParserConfig::default(),
            };
            let registry = load_registry(&cli)?;
            let text = read_input(input.as_ref())?;
            let id = parser
                .as_deref()
                .or(config.parser_type())
                .unwrap_or(wordsplit::RegexParser::ID);

            let result = if *fallback {
                registry.parse_or_fallback(id, &text, &config)
            } else {
                registry.parse(id, &text, &config)
            }
            .with_context(|| format!("Parser '{}' failed", id))?;

            print_result(&result, *format)?;
        }

        Command::Parsers => {
            let registry = load_registry(&cli)?;
            for info in registry.list_available() {
                let mark = if info.available { "✓" } else { "✗" };
                println!("{} {:<12} {:<28} {}", mark, info.id, info.name, info.message);
            }
        }

        Command::Lemmatize {
            language,
            words,
            service,
        } => {
            let client = service.client()?;
            let lemmas = client.lemmatize_batch(words, language).await;
            if lemmas.is_empty() {
                bail!("NLP service at {} did not answer", client.base_url());
            }
            for word in words {
                let lemma = lemmas.get(word).cloned().flatten();
                println!("{}\t{}", word, lemma.as_deref().unwrap_or("-"));
            }
        }

        Command::Voices { installed, service } => {
            let client = service.client()?;
            let voices = if *installed {
                client.installed_voices().await
            } else {
                client.voices().await
            };
            for voice in voices {
                let mark = if voice.installed { "✓" } else { " " };
                println!(
                    "{} {:<28} {:<24} {}",
                    mark,
                    voice.id,
                    voice.name,
                    voice.lang.as_deref().unwrap_or("")
                );
            }
        }

        Command::Health { service } => {
            let client = service.client()?;
            match client.health().await {
                Some(health) => println!(
                    "{}: {} {}",
                    client.base_url(),
                    health.status,
                    health.version.as_deref().unwrap_or("")
                ),
                None => bail!("NLP service at {} is unreachable", client.base_url()),
            }
        }
    }

    Ok(())
}
