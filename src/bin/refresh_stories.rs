//! One-shot refresh: fetch every feed, rebuild the stories, write the cache
//! and print the evaluation summary.

use uk_news_decoded::config::{ServiceSettings, SourcesConfig};
use uk_news_decoded::{evaluate, StoryService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let sources = SourcesConfig::load_default()?;
    let settings = ServiceSettings::from_env();
    let service = StoryService::from_config(&sources, &settings)?;

    let stories = service.refresh().await?;
    let summary = evaluate::summarize(&stories);

    println!("[eval] {summary}");
    for s in stories.iter().take(5) {
        println!("- {}: {} ({})", s.story_id, s.topic, s.articles.len());
    }
    println!("wrote {}", settings.cache_path.display());
    Ok(())
}
