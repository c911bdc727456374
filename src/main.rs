use artsync::{cache, config, manifest, output, remote, sync};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Flags for the sync command. Each ORs with its `[run]` config key, so
/// either place can switch the policy on.
#[derive(clap::Args, Clone)]
struct SyncArgs {
    /// Regenerate outputs even when they already exist
    #[arg(long)]
    replace: bool,

    /// Exit non-zero if any asset failed
    #[arg(long)]
    strict: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "artsync")]
#[command(about = "Mirror a remote artwork repository into local WebP variants")]
#[command(long_about = "\
Mirror a remote artwork repository into local WebP variants

artsync resolves a remote tree listing, compares it against the local
output tree, and fetches + transcodes only what is missing. Each asset
produces one square WebP file per configured variant:

  <output_root>/[subfolder/]<key>.webp

Assets are independent: a failed fetch or a corrupt source is reported
and counted, and the rest of the batch completes. Rerunning is the retry
mechanism — the next run picks up exactly the assets whose outputs are
missing.

Exit status is 0 even when assets failed, unless --strict (or
run.strict_exit in the config) is set.

Run 'artsync gen-config' to generate a documented artsync.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (stock defaults are used when the file is absent)
    #[arg(long, default_value = "artsync.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and transcode every asset missing from the local cache
    Sync(SyncArgs),
    /// Resolve the manifest and report what a sync would do (no downloads)
    Plan,
    /// Print a stock artsync.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Sync(args) => {
            let cfg = config::load_or_default(&cli.config)?;
            let replace = args.replace || cfg.run.replace_existing;
            let strict = args.strict || cfg.run.strict_exit;

            init_worker_pool(&cfg.processing);
            let source = remote::HttpSource::new(&cfg.remote)?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    println!("{}", output::format_sync_event(&event));
                }
            });
            let summary = sync::run(&source, &cfg, replace, Some(tx))?;
            printer.join().unwrap();

            output::print_summary(&summary);
            if strict && summary.failed() > 0 {
                std::process::exit(1);
            }
        }
        Command::Plan => {
            let cfg = config::load_or_default(&cli.config)?;
            let source = remote::HttpSource::new(&cfg.remote)?;

            let assets = manifest::resolve(&source, &cfg.remote.path_prefix)?;
            let mut pending = 0;
            for asset in &assets {
                let needs = cache::needs_work(asset, &cfg.variants, cfg.run.replace_existing);
                if needs {
                    pending += 1;
                }
                println!("{}", output::format_plan_line(&asset.display_key(), needs));
            }
            println!("{}", output::format_plan_summary(assets.len(), pending));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Size the rayon pool from config. Workers spend their time in network
/// and libwebp calls, so the bound is a remote-host courtesy rather than a
/// CPU count — no clamping to core count here.
fn init_worker_pool(processing: &config::ProcessingConfig) {
    rayon::ThreadPoolBuilder::new()
        .num_threads(processing.max_workers)
        .build_global()
        .ok();
}
