use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use triglot::auth::{AuthContext, IdentityProvider};
use triglot::config::Config;
use triglot::drill::RepeatState;
use triglot::languages::{Lang, LanguageSettings};
use triglot::pagination;
use triglot::records::TimerRecordStore;
use triglot::store::json_store::JsonStore;
use triglot::words::cache::WordsCache;
use triglot::words::record::{WordDraft, WordPatch, WordRecord};
use triglot::words::{WordsApi, import};

#[derive(Parser)]
#[command(name = "triglot", version, about = "Three-language vocabulary trainer")]
struct Cli {
    #[arg(long, help = "Override the data directory")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in
    Register { email: String, password: String },
    /// Sign in
    Login { email: String, password: String },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Add a word (at least two translations required)
    Add {
        #[arg(long, default_value = "")]
        ru: String,
        #[arg(long, default_value = "")]
        en: String,
        #[arg(long, default_value = "")]
        ko: String,
    },
    /// List words, newest first
    List {
        #[arg(long, default_value_t = 0)]
        first: usize,
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Update translations of a word
    Update {
        id: String,
        #[arg(long)]
        ru: Option<String>,
        #[arg(long)]
        en: Option<String>,
        #[arg(long)]
        ko: Option<String>,
    },
    /// Delete a word
    Rm { id: String },
    /// Import words from a JSON file
    Import { file: PathBuf },
    /// Export words to a JSON file
    Export { file: PathBuf },
    /// Remove duplicate entries from the stored collection
    Dedupe,
    /// Practice until every word has been answered correctly
    Drill {
        #[arg(long, help = "Timed mode: stop after this many minutes")]
        minutes: Option<u64>,
    },
    /// Show timed-drill records
    Records,
    /// Reconcile the local collection with the remote backend
    Sync {
        #[arg(long, help = "Keep syncing on the configured interval")]
        watch: bool,
    },
    /// Show or set the displayed languages (e.g. `languages ru ko`)
    Languages { codes: Vec<String> },
}

struct AppContext {
    auth: Arc<AuthContext>,
    api: WordsApi,
    backend: Arc<JsonStore>,
    config: Config,
}

impl AppContext {
    fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let config = Config::load().context("failed to load config")?;
        let base_dir = data_dir.unwrap_or_else(|| PathBuf::from(&config.data_dir));
        let backend = Arc::new(
            JsonStore::with_base_dir(base_dir).context("failed to open data directory")?,
        );
        let auth = Arc::new(AuthContext::new(backend.clone()));
        let cache = WordsCache::new(backend.clone());
        let api = WordsApi::new(cache, auth.clone());
        Ok(Self {
            auth,
            api,
            backend,
            config,
        })
    }

    fn require_user_id(&self) -> Result<String> {
        self.auth
            .current_user_id()
            .context("not signed in (run `triglot login` first)")
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let ctx = AppContext::open(cli.data_dir)?;

    match cli.command {
        Command::Register { email, password } => {
            let user = ctx.auth.register(&email, &password)?;
            println!("registered and signed in as {}", user.email);
        }
        Command::Login { email, password } => {
            let user = ctx.auth.login(&email, &password)?;
            println!("signed in as {}", user.email);
        }
        Command::Logout => {
            ctx.auth.logout();
            println!("signed out");
        }
        Command::Whoami => match ctx.auth.current_user() {
            Some(user) => println!("{} ({})", user.email, user.id),
            None => println!("not signed in"),
        },
        Command::Add { ru, en, ko } => {
            let word = ctx.api.add(WordDraft { ru, en, ko })?;
            println!("added {}", word.id);
        }
        Command::List { first, rows } => {
            let words = ctx.api.list()?;
            if words.is_empty() {
                println!("no words yet");
                return Ok(());
            }
            let page = pagination::paginate(&words, first, rows);
            for word in page {
                println!("{}  ru:{}  en:{}  ko:{}", word.id, word.ru, word.en, word.ko);
            }
            println!("({} of {} words)", page.len(), words.len());
        }
        Command::Update { id, ru, en, ko } => {
            let patch = WordPatch { ru, en, ko };
            if patch.is_empty() {
                bail!("nothing to update: pass at least one of --ru/--en/--ko");
            }
            let word = ctx.api.update(&id, patch)?;
            println!("updated {}", word.id);
        }
        Command::Rm { id } => {
            ctx.api.delete(&id)?;
            println!("removed {id}");
        }
        Command::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let summary = import::import_words(&ctx.api, &json)?;
            println!(
                "imported {} words ({} duplicates skipped, {} errors)",
                summary.added, summary.duplicates, summary.errors
            );
        }
        Command::Export { file } => {
            let words = ctx.api.list()?;
            let json = import::export_json(&words)?;
            std::fs::write(&file, json)
                .with_context(|| format!("failed to write {}", file.display()))?;
            println!("exported {} words to {}", words.len(), file.display());
        }
        Command::Dedupe => {
            let user_id = ctx.require_user_id()?;
            let words = ctx.api.list()?;
            let cleaned =
                triglot::words::cleanup::remove_normalized_duplicates(&words);
            let removed = words.len() - cleaned.len();
            if removed > 0 {
                ctx.api.cache().save(&user_id, &cleaned)?;
            }
            println!("removed {removed} duplicates ({} words left)", cleaned.len());
        }
        Command::Drill { minutes } => run_drill(&ctx, minutes)?,
        Command::Records => {
            let user_id = ctx.require_user_id()?;
            let store = TimerRecordStore::new(ctx.backend.clone());
            let mut all: Vec<_> = store.load(&user_id).into_iter().collect();
            if all.is_empty() {
                println!("no records yet");
                return Ok(());
            }
            all.sort_by_key(|(minutes, _)| *minutes);
            for (minutes, records) in all {
                println!("{minutes} min:");
                for record in records {
                    let when = chrono::DateTime::from_timestamp_millis(record.date)
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    println!("  {} words  ({when})", record.words_completed);
                }
            }
        }
        Command::Sync { watch } => run_sync(&ctx, watch)?,
        Command::Languages { codes } => {
            let settings = LanguageSettings::new(ctx.backend.clone());
            if codes.is_empty() {
                let selected: Vec<&str> =
                    settings.selected().iter().map(Lang::code).collect();
                println!("{}", selected.join(" "));
                return Ok(());
            }
            let langs: Vec<Lang> = codes
                .iter()
                .filter_map(|c| Lang::from_code(c))
                .collect();
            if langs.len() != codes.len() {
                bail!("unknown language code (known: ru, en, ko)");
            }
            settings.save(&langs)?;
            println!("display languages set");
        }
    }

    Ok(())
}

fn run_sync(ctx: &AppContext, watch: bool) -> Result<()> {
    let user_id = ctx.require_user_id()?;
    let Some(remote_url) = ctx.config.remote_url.clone() else {
        bail!("no remote_url configured; sync is disabled");
    };

    #[cfg(feature = "network")]
    {
        use triglot::sync::SyncEngine;
        use triglot::sync::remote::HttpRemote;

        let remote = Arc::new(HttpRemote::new(&remote_url)?);
        let engine = Arc::new(SyncEngine::new(
            ctx.api.cache().clone(),
            ctx.auth.clone(),
            remote,
            ctx.config.cache_max_age(),
        ));

        if watch {
            let handle = triglot::sync::start_sync(
                engine,
                user_id,
                ctx.config.sync_interval(),
                Box::new(|words| println!("synced {} words", words.len())),
            );
            println!("syncing in the background; press Enter to stop");
            let mut line = String::new();
            let _ = io::stdin().lock().read_line(&mut line);
            handle.stop();
        } else {
            match engine.sync_now(&user_id) {
                Some(words) => println!("synced {} words", words.len()),
                None => println!("sync skipped (see logs)"),
            }
        }
        Ok(())
    }

    #[cfg(not(feature = "network"))]
    {
        let _ = (user_id, remote_url);
        bail!("this build has no network support; rebuild with the `network` feature");
    }
}

/// One flip-card prompt: show the word in the first display language,
/// accept any other populated translation as the answer.
fn grade_answer(word: &WordRecord, shown: Lang, answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    if answer.is_empty() {
        return false;
    }
    [Lang::Ru, Lang::En, Lang::Ko]
        .into_iter()
        .filter(|l| *l != shown)
        .map(|l| field(word, l).trim().to_lowercase())
        .any(|expected| !expected.is_empty() && expected == answer)
}

fn field(word: &WordRecord, lang: Lang) -> &str {
    match lang {
        Lang::Ru => &word.ru,
        Lang::En => &word.en,
        Lang::Ko => &word.ko,
    }
}

fn run_drill(ctx: &AppContext, minutes: Option<u64>) -> Result<()> {
    let user_id = ctx.require_user_id()?;
    let words = ctx.api.list()?;
    if words.is_empty() {
        println!("nothing to practice: the word list is empty");
        return Ok(());
    }

    let settings = LanguageSettings::new(ctx.backend.clone());
    let shown_lang = settings.selected()[0];

    let mut rng = SmallRng::from_entropy();
    let mut state = RepeatState::new(&words, &mut rng);
    let started = Instant::now();
    let deadline = minutes.map(|m| std::time::Duration::from_secs(m * 60));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if let Some(limit) = deadline {
            if started.elapsed() >= limit {
                println!("time is up!");
                break;
            }
        }
        let Some(current) = state.current().cloned() else {
            break;
        };
        // The shown slot may be blank for two-language words; fall back to
        // the first populated one.
        let prompt = [shown_lang, Lang::Ru, Lang::En, Lang::Ko]
            .into_iter()
            .map(|l| field(&current, l))
            .find(|v| !v.trim().is_empty())
            .unwrap_or_default();
        print!("{prompt}> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let answer = line?;

        if grade_answer(&current, shown_lang, &answer) {
            println!("correct");
            if state.mark_correct(&words, &mut rng) {
                println!(
                    "done! {} words, {} misses",
                    state.correct_words.len(),
                    state.incorrect_count
                );
                break;
            }
        } else {
            println!(
                "miss: {} / {} / {}",
                current.ru, current.en, current.ko
            );
            state.mark_incorrect();
        }
    }

    if let Some(m) = minutes {
        let completed = state.correct_words.len() as u32;
        TimerRecordStore::new(ctx.backend.clone()).save_record(&user_id, m as u32, completed);
        println!("recorded: {completed} words in {m} min");
    }
    Ok(())
}
