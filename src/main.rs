//! # tg2mm CLI
//!
//! Command-line interface for the tg2mm library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use tg2mm::MigrateError;
use tg2mm::cli::Args;
use tg2mm::config::MigrationConfig;
use tg2mm::core::Migrator;

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.log_filter());

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), MigrateError> {
    let total_start = Instant::now();

    let mut config = MigrationConfig::from_path(&args.config_path())?;
    if let Some(chat_type) = args.chat_type {
        config.chat_type = chat_type.into();
    }

    println!("📦 tg2mm v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:     {}", args.input_dir.display());
    println!("💾 Output:    {}", args.output.display());
    println!("💬 Chat type: {}", config.chat_type);
    println!("🕒 Timezone:  {}", config.timezone.name());
    if let Some(ref log) = args.conversation_log {
        println!("📝 Log:       {}", log.display());
    }
    println!();

    let mut migrator = Migrator::new(&config)?;
    if let Some(ref log) = args.conversation_log {
        migrator = migrator.with_conversation_log(log.clone());
    }
    let report = migrator.run(&args.input_dir, &args.output)?;

    let total_time = total_start.elapsed();
    let stats = report.stats;

    println!("✅ Done! Archive saved to {}", args.output.display());

    println!();
    println!("📊 Summary:");
    println!("   Source entries: {}", stats.source_entries);
    println!("   Skipped:        {}", stats.skipped_entries);
    println!("   Posts:          {}", stats.posts);
    println!(
        "   Replies:        {} ({} posted as root)",
        stats.replies, stats.broken_threads
    );
    println!("   Attachments:    {}", stats.attachments_packaged);
    println!("   Records:        {}", stats.records);

    if report.has_warnings() {
        println!();
        println!("⚠️  Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("   - {}", warning);
        }
    }

    println!();
    println!("⚡ Total time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}
