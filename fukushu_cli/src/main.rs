use clap::{Parser, Subcommand};
use fukushu_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fukushu")]
#[command(about = "Spaced-repetition Japanese study tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a lesson and advance practiced items (default)
    Lesson {
        /// User to recommend for
        #[arg(long)]
        user: Option<String>,

        /// JLPT level (e.g. N5, N4)
        #[arg(long)]
        level: Option<String>,

        /// Number of vocab items
        #[arg(long)]
        vocab: Option<usize>,

        /// Number of grammar items
        #[arg(long)]
        grammar: Option<usize>,

        /// Show the selection without updating schedules
        #[arg(long)]
        dry_run: bool,

        /// Generate a reading passage for the selection (needs GEMINI_API_KEY)
        #[arg(long)]
        generate: bool,
    },

    /// Pull review items from the upstream API (needs BUNPRO_TOKEN)
    Sync {
        /// User to sync items for
        #[arg(long)]
        user: Option<String>,
    },

    /// List saved lessons
    Lessons {
        /// User to list lessons for
        #[arg(long)]
        user: Option<String>,
    },

    /// Seed a user account
    SeedUser {
        #[arg(long, default_value = "admin@example.com")]
        email: String,

        #[arg(long, default_value = "password123")]
        password: String,
    },
}

fn main() -> Result<()> {
    fukushu_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Some(Commands::Lesson {
            user,
            level,
            vocab,
            grammar,
            dry_run,
            generate,
        }) => cmd_lesson(data_dir, user, level, vocab, grammar, dry_run, generate, &config),
        Some(Commands::Sync { user }) => cmd_sync(data_dir, user, &config),
        Some(Commands::Lessons { user }) => cmd_lessons(data_dir, user, &config),
        Some(Commands::SeedUser { email, password }) => {
            cmd_seed_user(data_dir, &email, &password)
        }
        None => {
            // Default to "lesson" with config defaults
            cmd_lesson(data_dir, None, None, None, None, false, false, &config)
        }
    }
}

fn cmd_lesson(
    data_dir: PathBuf,
    user: Option<String>,
    level: Option<String>,
    vocab: Option<usize>,
    grammar: Option<usize>,
    dry_run: bool,
    generate: bool,
    config: &Config,
) -> Result<()> {
    std::fs::create_dir_all(&data_dir)?;

    let mut store = JsonStore::new(data_dir.join("reviews.json"));

    let request = LessonRequest {
        owner: user.unwrap_or_else(|| config.lesson.user.clone()),
        level: level.unwrap_or_else(|| config.lesson.level.clone()),
        vocab_count: vocab.unwrap_or(config.lesson.vocab_count),
        grammar_count: grammar.unwrap_or(config.lesson.grammar_count),
    };

    let now = chrono::Utc::now();
    let mut rng = rand::thread_rng();

    let recommendation = recommend_lesson(&store, &request, now, &mut rng)?;

    if recommendation.is_empty() {
        println!(
            "No review items found for {} at {}. Run `fukushu sync` first.",
            request.owner, request.level
        );
        return Ok(());
    }

    display_recommendation(&request, &recommendation);

    if generate {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Generate("GEMINI_API_KEY is not set".into()))?;
        let client = GeminiClient::new(&config.gemini, api_key)?;

        let lesson = client.generate_reading_lesson(
            &recommendation.vocab,
            &recommendation.grammar,
            &request.level,
        )?;
        display_lesson(&lesson);

        let missing = lines_missing_furigana(&lesson);
        if !missing.is_empty() {
            tracing::warn!("{} generated lines are missing furigana", missing.len());
        }

        let saved = SavedLesson {
            id: uuid::Uuid::new_v4(),
            owner: request.owner.clone(),
            level: request.level.clone(),
            title: lesson.title.clone(),
            lines: lesson.lines.clone(),
            vocab_ids: recommendation.vocab.iter().map(|i| i.id).collect(),
            grammar_ids: recommendation.grammar.iter().map(|i| i.id).collect(),
            created_at: now,
        };

        let mut log = JsonlLessonLog::new(data_dir.join("lessons.jsonl"));
        log.append(&saved)?;
        println!("\n✓ Lesson saved to log");
    }

    if dry_run {
        println!("\n[Dry run - schedules not updated]");
        return Ok(());
    }

    let updates =
        advance_after_session(&mut store, &request.owner, &recommendation.item_ids(), now)?;

    println!("\n✓ Updated {} schedules:", updates.len());
    for update in &updates {
        println!(
            "  - {}: practice #{}, next in {} days ({})",
            update.title,
            update.practice_count,
            update.new_interval,
            update.next_practice.format("%Y-%m-%d")
        );
    }

    Ok(())
}

fn cmd_sync(data_dir: PathBuf, user: Option<String>, config: &Config) -> Result<()> {
    let token = std::env::var("BUNPRO_TOKEN")
        .map_err(|_| Error::Upstream("BUNPRO_TOKEN is not set".into()))?;

    std::fs::create_dir_all(&data_dir)?;

    let owner = user.unwrap_or_else(|| config.lesson.user.clone());
    let client = UpstreamClient::new(&config.upstream, token)?;
    let mut store = JsonStore::new(data_dir.join("reviews.json"));

    let (vocab_stats, grammar_stats) = sync_all(&client, &mut store, &owner)?;

    println!("✓ Sync complete for {}", owner);
    println!(
        "  Vocab: {} inserted, {} updated",
        vocab_stats.inserted, vocab_stats.updated
    );
    println!(
        "  Grammar: {} inserted, {} updated",
        grammar_stats.inserted, grammar_stats.updated
    );

    Ok(())
}

fn cmd_lessons(data_dir: PathBuf, user: Option<String>, config: &Config) -> Result<()> {
    let owner = user.unwrap_or_else(|| config.lesson.user.clone());
    let lessons = read_lessons(&data_dir.join("lessons.jsonl"))?;

    let mine: Vec<_> = lessons.iter().filter(|l| l.owner == owner).collect();
    if mine.is_empty() {
        println!("No saved lessons for {}.", owner);
        return Ok(());
    }

    println!("Saved lessons for {}:", owner);
    for lesson in mine {
        println!(
            "  {}  {} ({} lines)",
            lesson.created_at.format("%Y-%m-%d"),
            lesson.title,
            lesson.lines.len()
        );
    }

    Ok(())
}

fn cmd_seed_user(data_dir: PathBuf, email: &str, password: &str) -> Result<()> {
    std::fs::create_dir_all(&data_dir)?;

    match seed_user(&data_dir.join("users.json"), email, password)? {
        SeedOutcome::Created(record) => {
            println!("✓ Seeded user \"{}\" (id: {})", record.email, record.id);
        }
        SeedOutcome::AlreadyExists => {
            println!("User \"{}\" already exists. Skipping.", email);
        }
    }

    Ok(())
}

fn display_recommendation(request: &LessonRequest, recommendation: &LessonRecommendation) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} LESSON for {}", request.level, request.owner);
    println!("╰─────────────────────────────────────────╯");

    println!("\n  Vocabulary ({}):", recommendation.vocab.len());
    for item in &recommendation.vocab {
        println!("    → {} ({})", item.title, item.meaning);
    }

    println!("\n  Grammar ({}):", recommendation.grammar.len());
    for item in &recommendation.grammar {
        println!("    → {} ({})", item.title, item.meaning);
    }
}

fn display_lesson(lesson: &ReadingLesson) {
    println!("\n  {}", lesson.title);
    println!("  ─────────────────────────────────────────");
    for line in &lesson.lines {
        println!("  {}", line.japanese);
        println!("    {}", line.english);
    }
}
