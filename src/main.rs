use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use devscore::models::ScoredActivity;
use devscore::{
    ActivityFetcher, ClaudeEnricher, Config, FetchConfig, GitHubClient, Ledger, MockChain,
    ScorePipeline, Storage,
};

#[derive(Parser, Debug)]
#[command(name = "devscore")]
#[command(version = "0.1.0")]
#[command(about = "Score a developer's public GitHub activity")]
struct Args {
    /// GitHub username to score
    #[arg(short, long, required_unless_present = "leaderboard")]
    username: Option<String>,

    /// Output format (json, text, markdown)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Commit history window in days
    #[arg(long)]
    days: Option<u32>,

    /// PR/issue search window in days
    #[arg(long)]
    search_days: Option<u32>,

    /// Community engagement units reported by an external platform
    #[arg(long, default_value = "0")]
    engagement_units: u64,

    /// Database path for score snapshots
    #[arg(long, default_value = "devscore.db")]
    database: String,

    /// Mint a mock-chain badge for the resulting score
    #[arg(long)]
    mint: bool,

    /// Wallet address that owns the minted badge
    #[arg(long, requires = "mint")]
    wallet: Option<String>,

    /// Print the score leaderboard instead of running an analysis
    #[arg(long)]
    leaderboard: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("devscore=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();

    let storage = Storage::new(&args.database)?;

    if args.leaderboard {
        print_leaderboard(&storage)?;
        return Ok(());
    }

    // clap enforces presence unless --leaderboard was given
    let username = args
        .username
        .clone()
        .ok_or_else(|| anyhow::anyhow!("a username is required"))?;

    let config = Config::from_env()?;

    let mut fetch_config = FetchConfig::from(&config);
    if let Some(days) = args.days {
        fetch_config.commit_window_days = days;
    }
    if let Some(days) = args.search_days {
        fetch_config.search_window_days = days;
    }

    let github = GitHubClient::new(&config.github_token)?;
    let fetcher = ActivityFetcher::new(Arc::new(github), fetch_config);

    let mut pipeline = ScorePipeline::new(fetcher, storage);
    if let Some(api_key) = config.anthropic_api_key.clone() {
        pipeline = pipeline.with_enricher(Arc::new(ClaudeEnricher::new(api_key, None)?));
    }

    tracing::info!("Starting analysis for GitHub user: {}", username);
    let scored = pipeline.run(&username, args.engagement_units).await?;

    if args.mint {
        let wallet = args.wallet.as_deref().unwrap_or(&username);
        let receipt = MockChain::testnet().mint_badge(wallet, &scored.score).await?;
        pipeline.storage().record_mint(&username, &receipt)?;
        println!(
            "Minted badge #{} on {} (tx {})",
            receipt.token_id, receipt.network, receipt.tx_hash
        );
    }

    output_report(&scored, &args)?;

    Ok(())
}

fn print_leaderboard(storage: &Storage) -> anyhow::Result<()> {
    let entries = storage.leaderboard(10)?;
    if entries.is_empty() {
        println!("No scored subjects yet.");
        return Ok(());
    }

    println!("\n=== DevScore Leaderboard ===\n");
    for entry in entries {
        let badge = if entry.has_badge { " [badge]" } else { "" };
        println!(
            "{:>2}. {:<20} {:>4}  {}{}",
            entry.rank,
            entry.name.as_deref().unwrap_or(&entry.login),
            entry.total,
            entry.tier,
            badge
        );
    }
    Ok(())
}

fn output_report(scored: &ScoredActivity, args: &Args) -> anyhow::Result<()> {
    let output = match args.format.as_str() {
        "json" => serde_json::to_string_pretty(scored)?,
        "markdown" => format_markdown(scored),
        _ => format_text(scored),
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn format_text(scored: &ScoredActivity) -> String {
    let summary = &scored.summary;
    let mut output = String::new();

    output.push_str(&format!("\n=== DevScore: {} ===\n\n", summary.profile.login));

    if let Some(ref name) = summary.profile.name {
        output.push_str(&format!("Name: {}\n", name));
    }
    if let Some(ref bio) = summary.profile.bio {
        output.push_str(&format!("Bio: {}\n", bio));
    }
    output.push_str(&format!("Window: last {} days\n\n", summary.window.days));

    output.push_str(&format!(
        "Commits: {} across {} repositories\n",
        summary.commits.total, summary.commits.repos_with_commits
    ));
    output.push_str(&format!(
        "Pull requests: {} (merged: {}, open: {})\n",
        summary.pull_requests.total, summary.pull_requests.merged, summary.pull_requests.open
    ));
    output.push_str(&format!(
        "Issues: {} (closed: {}, open: {})\n",
        summary.issues.total, summary.issues.closed, summary.issues.open
    ));
    output.push_str(&format!(
        "Stars across repositories: {}\n\n",
        summary.repositories.total_stars
    ));

    output.push_str("Score:\n");
    output.push_str(&format!("  Commits:       {:>4}\n", scored.score.commits));
    output.push_str(&format!("  Pull requests: {:>4}\n", scored.score.pull_requests));
    output.push_str(&format!("  Issues:        {:>4}\n", scored.score.issues));
    output.push_str(&format!("  Engagement:    {:>4}\n", scored.score.engagement));
    output.push_str(&format!(
        "  Total:         {:>4} / 1000 ({})\n",
        scored.score.total, scored.score.tier
    ));

    if !scored.digest.languages.is_empty() {
        output.push_str(&format!(
            "\nLanguages: {}\n",
            scored.digest.languages.join(", ")
        ));
    }

    if !scored.digest.top_projects.is_empty() {
        output.push_str("\nTop Projects:\n");
        for project in &scored.digest.top_projects {
            output.push_str(&format!(
                "  - {} ({} stars): {}\n",
                project.name,
                project.stars,
                project.description.as_deref().unwrap_or("no description")
            ));
        }
    }

    output.push_str(&format!(
        "\nContribution areas: {}\n",
        scored.digest.contribution_areas.join(", ")
    ));
    output.push_str(&format!("Style: {}\n", scored.digest.development_style));

    output.push_str(&format!("\n{}\n", scored.digest.summary));
    output.push_str("\nInsights:\n");
    for insight in &scored.digest.insights {
        output.push_str(&format!("  - {}\n", insight));
    }

    if !scored.diagnostics.is_empty() {
        output.push_str(&format!(
            "\nNote: {} fetch step(s) returned no data:\n",
            scored.diagnostics.len()
        ));
        for diagnostic in &scored.diagnostics {
            output.push_str(&format!("  - {}: {}\n", diagnostic.scope, diagnostic.message));
        }
    }

    output.push_str(&format!(
        "\nScored on: {}\n",
        scored.scored_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

fn format_markdown(scored: &ScoredActivity) -> String {
    let summary = &scored.summary;
    let mut output = String::new();

    output.push_str(&format!("# DevScore: {}\n\n", summary.profile.login));

    if let Some(ref name) = summary.profile.name {
        output.push_str(&format!("**Name:** {}\n\n", name));
    }
    if let Some(ref bio) = summary.profile.bio {
        output.push_str(&format!("> {}\n\n", bio));
    }

    output.push_str("## Activity\n\n");
    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!("| Window | last {} days |\n", summary.window.days));
    output.push_str(&format!("| Commits | {} |\n", summary.commits.total));
    output.push_str(&format!(
        "| Pull requests | {} ({} merged) |\n",
        summary.pull_requests.total, summary.pull_requests.merged
    ));
    output.push_str(&format!(
        "| Issues | {} ({} closed) |\n",
        summary.issues.total, summary.issues.closed
    ));
    output.push_str(&format!(
        "| Stars | {} |\n",
        summary.repositories.total_stars
    ));

    output.push_str("\n## Score\n\n");
    output.push_str("| Component | Points |\n|-----------|--------|\n");
    output.push_str(&format!("| Commits | {} |\n", scored.score.commits));
    output.push_str(&format!("| Pull requests | {} |\n", scored.score.pull_requests));
    output.push_str(&format!("| Issues | {} |\n", scored.score.issues));
    output.push_str(&format!("| Engagement | {} |\n", scored.score.engagement));
    output.push_str(&format!(
        "| **Total** | **{} / 1000** ({}) |\n",
        scored.score.total, scored.score.tier
    ));

    if !scored.digest.languages.is_empty() {
        output.push_str(&format!(
            "\n**Languages:** {}\n",
            scored.digest.languages.join(", ")
        ));
    }

    if !scored.digest.top_projects.is_empty() {
        output.push_str("\n## Top Projects\n\n");
        for project in &scored.digest.top_projects {
            output.push_str(&format!(
                "- [{}]({}) — {} stars\n",
                project.name, project.url, project.stars
            ));
        }
    }

    output.push_str(&format!("\n## Summary\n\n{}\n", scored.digest.summary));
    output.push_str("\n## Insights\n\n");
    for insight in &scored.digest.insights {
        output.push_str(&format!("- {}\n", insight));
    }

    output.push_str(&format!(
        "\n---\n*Scored on {}*\n",
        scored.scored_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}
