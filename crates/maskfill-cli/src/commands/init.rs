//! The `maskfill init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing("maskfill.toml", SAMPLE_CONFIG)?;
    write_if_missing("sentences.toml", SAMPLE_SENTENCES)?;

    println!("\nNext steps:");
    println!("  1. Add your own sentences to sentences.toml, or point [store] at Supabase");
    println!("  2. Run: maskfill sentences");
    println!("  3. Run: maskfill run");

    Ok(())
}

fn write_if_missing(path: &str, content: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# maskfill configuration

# Local sentence fixture; responses are written to responses.json.
[store]
type = "fixture"
path = "sentences.toml"
record_to = "responses.json"

# Hosted Supabase project (or set MASKFILL_SUPABASE_URL / MASKFILL_SUPABASE_ANON_KEY):
# [store]
# type = "supabase"
# url = "https://your-project.supabase.co"
# anon_key = "${SUPABASE_ANON_KEY}"
# sentences_table = "sentences"
# responses_table = "responses"

[session]
round = "anonymous"
dataset = "toy"
"#;

const SAMPLE_SENTENCES: &str = r#"[[sentences]]
dataset = "toy"
id = 1
masked = "The [MASK] sat on the [MASK]."

[[sentences]]
dataset = "toy"
id = 2
masked = "I like to eat [MASK] for breakfast."

[[sentences]]
dataset = "toy"
id = 3
masked = "[MASK] is the capital of France."
"#;
