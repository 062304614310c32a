//! The `maskfill sentences` command.

use anyhow::{Context, Result};

use maskfill_core::model::Sentence;
use maskfill_store::create_store;

use super::StoreSource;

pub async fn execute(dataset: Option<String>, format: String, source: StoreSource) -> Result<()> {
    let (config, store_config) = source.load()?;
    let dataset = dataset.unwrap_or(config.session.dataset);
    let store = create_store(&store_config)?;

    let sentences = store
        .fetch_sentences(&dataset)
        .await
        .with_context(|| format!("failed to fetch sentences for dataset '{dataset}'"))?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&sentences)?),
        "table" => {
            if sentences.is_empty() {
                println!("No sentences found for dataset '{dataset}'.");
            } else {
                print_table(&sentences);
                println!(
                    "{} sentence(s) in dataset '{dataset}' from {}",
                    sentences.len(),
                    store.name()
                );
            }
        }
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}

fn print_table(sentences: &[Sentence]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["ID", "Blanks", "Masked"]);

    for sentence in sentences {
        table.add_row(vec![
            Cell::new(&sentence.id),
            Cell::new(sentence.blank_count()),
            Cell::new(&sentence.masked),
        ]);
    }

    println!("{table}");
}
