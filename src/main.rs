use clap::Parser;
use deep_trawl::DeepCrawl;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let config = match args.to_config() {
        Ok(c) => c,
        Err(e) => {
            ::log::error!("Failed to build configuration: {}", e);
            std::process::exit(1);
        }
    };

    ::log::info!("Starting crawl for query: {}", args.query);

    if config.use_browser {
        println!("Note: browser fetching requires a WebDriver server (e.g. chromedriver).");
        println!(
            "Set WEBDRIVER_URL or pass --webdriver-url if not using the default {}",
            config.webdriver_url
        );
    }

    let start_time = std::time::Instant::now();

    let result = DeepCrawl::new(args.query.as_str())
        .with_seed_urls(args.seeds.clone())
        .with_config(config)
        .run()
        .await;

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            ::log::error!("Crawl failed: {}", e);
            std::process::exit(1);
        }
    };

    let duration = start_time.elapsed();
    println!(
        "Crawl complete in {:.2}s: {} pages, {} links, {} fetch errors, {} thin pages skipped",
        duration.as_secs_f64(),
        result.stats.total_pages,
        result.stats.total_links,
        result.stats.error_count,
        result.stats.skipped_short,
    );

    for page in &result.pages {
        ::log::debug!(
            "[depth {}] {} ({} chars, {} links)",
            page.depth,
            page.url,
            page.content.len(),
            page.links.len()
        );
    }

    if let Some(path) = &args.output {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    ::log::error!("Failed to write {}: {}", path.display(), e);
                    std::process::exit(1);
                }
                println!("Wrote results to {}", path.display());
            }
            Err(e) => {
                ::log::error!("Failed to serialize results: {}", e);
                std::process::exit(1);
            }
        }
    }
}
