use chrono::Local;
use expense_ledger::{
    classifier::Classifier,
    config::Config,
    display::{format_won, format_won_signed},
    gemini::GeminiClassifier,
    ledger::Ledger,
    state::{Session, SharedSession},
    taxonomy::Taxonomy,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let classifier: Arc<dyn Classifier> = Arc::new(GeminiClassifier::new(
        config.gemini_api_key.clone(),
        &config.gemini_model,
    )?);

    let ledger = if config.seed_ledger {
        Ledger::seeded()
    } else {
        Ledger::new()
    };
    let session = SharedSession::new(Session::new(Taxonomy::default(), ledger));

    let utterances: Vec<String> = std::env::args().skip(1).collect();
    info!(count = utterances.len(), "Processing utterances");

    for utterance in &utterances {
        match session
            .extract(classifier.clone(), utterance, config.extraction_timeout)
            .await
        {
            Ok(record) => println!(
                "✅ {} | {} | {} | {}",
                record.item(),
                format_won(u128::from(record.amount())),
                record.category(),
                record.transaction_type()
            ),
            Err(e) => eprintln!("❌ {}: {}", utterance, e),
        }
    }

    let today = Local::now().date_naive();

    session
        .with(|s| {
            println!("\n=== LEDGER ===");
            for record in s.ledger().snapshot() {
                println!(
                    "{}  {:<32} {:>14}  {:<18} {}",
                    record.date_recorded().resolve(today),
                    record.item(),
                    format_won(u128::from(record.amount())),
                    record.category(),
                    record.transaction_type()
                );
            }

            let summary = s.summary();
            println!("\n=== SUMMARY ===");
            println!("Income:  {}", format_won(summary.total_income));
            println!("Expense: {}", format_won(summary.total_expense));
            println!("Net:     {}", format_won_signed(summary.net));
            println!("\nBy category:");
            for total in &summary.by_category {
                println!("  {:<18} {:>14}", total.category, format_won(total.total));
            }
        })
        .await;

    Ok(())
}
