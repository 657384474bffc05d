use std::time::Instant;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use shelfmatch::{config::Config, AppError, RecommendationResult, SharedEngine, Strategy};

const RESULTS_PER_STRATEGY: i64 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "shelfmatch=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(dataset = %config.dataset_path, "Starting recommendation demo");

    let shared = SharedEngine::new(config.clone());
    let engine = shared
        .get_or_init()
        .await
        .with_context(|| format!("Failed to build engine from {}", config.dataset_path))?;

    let stats = engine.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    println!("\nMost popular books");
    print_recommendations(&engine.popular(None, RESULTS_PER_STRATEGY)?);

    for title in &config.demo_titles {
        for strategy in Strategy::ALL {
            let start = Instant::now();
            match engine.recommend_with(strategy, Some(title.as_str()), RESULTS_PER_STRATEGY) {
                Ok(recs) => {
                    println!(
                        "\n{} recommendations for '{}' ({:.1} ms)",
                        strategy,
                        title,
                        start.elapsed().as_secs_f64() * 1000.0
                    );
                    print_recommendations(&recs);
                }
                Err(e @ AppError::BookNotFound(_)) => {
                    tracing::warn!(title = %title, %strategy, error = %e, "Skipping seed");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

fn print_recommendations(recs: &RecommendationResult) {
    if recs.is_empty() {
        println!("  (none)");
        return;
    }

    for (rank, rec) in recs.iter().enumerate() {
        let genres = if rec.book.genres.is_empty() {
            "N/A".to_string()
        } else {
            rec.book
                .genres
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };

        println!(
            "  {}. {} by {} | {:.2} ({} ratings) | {} | score {:.3}",
            rank + 1,
            rec.book.title,
            rec.book.author,
            rec.book.rating,
            rec.book.num_ratings,
            genres,
            rec.score
        );
    }
}
