use bavli_core::classifier::{ConstantClassifier, LanguageClassifier, OneHotLogistic};
use bavli_core::config::Config;
use bavli_core::core::normalizer::rtl_display;
use bavli_core::core::suffix::{add_object_suffixes, strip_suffixes, SuffixKind};
use bavli_core::persistence::{
    load_cache_or_new, read_source_pages, read_tagged_pages, save_cache, write_tagged_pages,
};
use bavli_core::pos::{tag_parts_of_speech, YapTagger};
use bavli_core::service::HttpHebrewRoots;
use bavli_core::store::{MemoryDictionary, MemoryRootTable};
use bavli_core::{Decomposer, HeadwordRanker, Language, LanguageScope, TaggingEngine};
use clap::{Parser, Subcommand};
use crossterm::style::{StyledContent, Stylize};
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[clap(name = "bavli", about = "Language tagging and dictionary linking for the Talmud")]
struct Cli {
    /// Configuration file (TOML). Defaults apply when it does not exist.
    #[clap(short, long, default_value = "bavli.toml")]
    config: PathBuf,

    /// Log at debug level regardless of the configuration.
    #[clap(short, long)]
    verbose: bool,

    /// Print Hebrew reversed and unpointed, for terminals without bidi.
    #[clap(long)]
    rtl: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the prefix decompositions of each word.
    Decompose {
        words: Vec<String>,
        /// hebrew, aramaic or both. Defaults to the configured scope.
        #[clap(short, long)]
        scope: Option<String>,
    },
    /// Tags an aligned tractate by language.
    Tag {
        input: PathBuf,
        output: PathBuf,
        /// Logistic model weights (JSON). Without one, words start undecided.
        #[clap(short, long)]
        model: Option<PathBuf>,
    },
    /// Links the words of a tagged tractate to dictionary headwords.
    Link {
        input: PathBuf,
        #[clap(short, long)]
        dictionary: PathBuf,
        #[clap(long)]
        verbs: PathBuf,
        #[clap(long)]
        nouns: PathBuf,
        /// Result cache snapshot, read at start and written at the end.
        #[clap(long)]
        cache: Option<PathBuf>,
        /// Headwords per word. Defaults to the configured count.
        #[clap(short)]
        n: Option<usize>,
        /// Take the first source with an answer instead of filling a quota.
        #[clap(long)]
        smart: bool,
    },
    /// Adds part-of-speech tags to a tagged tractate through the configured tagger.
    Pos { input: PathBuf, output: PathBuf },
    /// Lists a pointed verb with every direct-object suffix.
    Conjugate { verbs: Vec<String> },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        config.logging.level.parse().unwrap_or(Level::INFO)
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let decomposer = Decomposer::new(config.prefix_table()?);
    let show = |text: &str| if cli.rtl { rtl_display(text) } else { text.to_string() };

    match &cli.command {
        Command::Decompose { words, scope } => {
            let scope = match scope {
                Some(s) => parse_scope(s)?,
                None => config.ranking.scope,
            };
            for word in words {
                println!("{}", show(word).bold());
                for candidate in decomposer.decompose(word, scope) {
                    let prefixes: Vec<String> = candidate.prefixes.iter().map(|p| show(p)).collect();
                    println!("  {}  [{}]", show(&candidate.inner), prefixes.join(" + "));
                }
                for kind in [SuffixKind::SingularPossessive, SuffixKind::PluralPossessive, SuffixKind::Object] {
                    let stems: Vec<String> = strip_suffixes(word, kind).iter().map(|s| show(s)).collect();
                    if !stems.is_empty() {
                        println!("  {:?}: {}", kind, stems.join(", "));
                    }
                }
            }
        }
        Command::Conjugate { verbs } => {
            for verb in verbs {
                println!("{}", show(verb).bold());
                for form in add_object_suffixes(verb) {
                    println!("  {}", show(&form));
                }
            }
        }
        Command::Tag { input, output, model } => {
            let classifier: Box<dyn LanguageClassifier> = match model {
                Some(path) => Box::new(OneHotLogistic::load(path)?),
                None => Box::new(ConstantClassifier(0.5)),
            };
            let engine = TaggingEngine::new(config.disambiguation, classifier);
            let pages = read_source_pages(input)?;
            let tagged = engine.tag_masekhet(&pages);
            write_tagged_pages(&tagged, output)?;
            info!(pages = tagged.len(), output = %output.display(), "wrote tagged pages");
        }
        Command::Pos { input, output } => {
            let url = config
                .pos
                .url
                .as_deref()
                .ok_or("no [pos] url configured")?;
            let tagger = YapTagger::new(url, config.pos.timeout())?;
            let mut pages = read_tagged_pages(input)?;
            let chunks = tag_parts_of_speech(&tagger, &mut pages);
            write_tagged_pages(&pages, output)?;
            info!(chunks, output = %output.display(), "wrote pos tagged pages");
        }
        Command::Link { input, dictionary, verbs, nouns, cache, n, smart } => {
            let dictionary = MemoryDictionary::load(dictionary)?;
            let verbs = MemoryRootTable::load(verbs)?;
            let nouns = MemoryRootTable::load(nouns)?;
            let service = match &config.service.base_url {
                Some(url) => Some(HttpHebrewRoots::new(
                    url,
                    config.service.timeout(),
                    config.service.max_retries,
                    config.service.backoff(),
                )?),
                None => None,
            };
            let mut ranker = HeadwordRanker::new(&decomposer, &dictionary, &verbs, &nouns)
                .with_static_words(&config.ranking.static_words);
            if let Some(service) = &service {
                ranker = ranker.with_hebrew_service(service);
            }

            let mut results = match cache {
                Some(path) => load_cache_or_new(path)?,
                None => Default::default(),
            };
            let n = n.unwrap_or(config.ranking.max_headwords);
            for page in read_tagged_pages(input)? {
                println!("{}", page.page.as_str().bold());
                for word in page.content.iter().flat_map(|c| &c.words) {
                    let heads = if *smart {
                        ranker.smart_search(word.forms.primary(), &mut results)
                    } else {
                        ranker.rank_classified(word, n, &mut results)
                    };
                    let heads: Vec<String> = heads.iter().map(|h| show(h)).collect();
                    println!(
                        "  {} {}\t{}",
                        tag(word.language),
                        show(word.forms.primary()),
                        heads.join(", ")
                    );
                }
            }
            if let Some(path) = cache {
                save_cache(&results, path)?;
                info!(entries = results.len(), path = %path.display(), "saved result cache");
            }
        }
    }
    Ok(())
}

fn parse_scope(s: &str) -> Result<LanguageScope, String> {
    match s {
        "hebrew" => Ok(LanguageScope::Hebrew),
        "aramaic" => Ok(LanguageScope::Aramaic),
        "both" => Ok(LanguageScope::Both),
        other => Err(format!("unknown scope '{}'", other)),
    }
}

fn tag(language: Language) -> StyledContent<char> {
    let code = language.code();
    match language {
        Language::Aramaic => code.yellow(),
        Language::RabbinicHebrew => code.green(),
        Language::BiblicalHebrew => code.cyan(),
        Language::Unknown => code.dark_grey(),
    }
}
