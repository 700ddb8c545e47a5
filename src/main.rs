//! CLI triggers for the two passes, standing in for the web app's
//! API routes. Prints the pass outcome as JSON on stdout.

use leadflow::config::Config;
use leadflow::gmail::GmailMailSource;
use leadflow::openai::OpenAiGenerator;
use leadflow::service;
use leadflow::supabase::SupabaseLeadStore;

const USAGE: &str = "usage: leadflow <sync|generate>

  sync      reconcile recent inbox messages against leads
  generate  generate AI lead candidates and ingest them";

#[tokio::main]
async fn main() {
    env_logger::init();

    let command = std::env::args().nth(1).unwrap_or_default();
    match run(&command).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

async fn run(command: &str) -> Result<String, Box<dyn std::error::Error>> {
    match command {
        "sync" => {
            let config = Config::load()?;
            let gmail = config
                .gmail
                .clone()
                .ok_or("Gmail credentials not configured")?;
            let supabase = config
                .supabase
                .clone()
                .ok_or("Supabase credentials not configured")?;

            let mail = GmailMailSource::new(gmail);
            let store = SupabaseLeadStore::new(supabase)?;
            let outcome =
                service::sync_inbox(&mail, &store, &config.own_mailbox, config.message_limit)
                    .await?;
            Ok(serde_json::to_string(&outcome)?)
        }
        "generate" => {
            let config = Config::load()?;
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or("OpenAI API key not configured")?;
            let supabase = config
                .supabase
                .clone()
                .ok_or("Supabase credentials not configured")?;

            let generator = OpenAiGenerator::new(api_key);
            let store = SupabaseLeadStore::new(supabase)?;
            let summary = service::generate_leads(
                &generator,
                &store,
                config.match_key,
                config.user_id.as_deref(),
            )
            .await?;
            Ok(serde_json::to_string(&summary)?)
        }
        _ => Err(USAGE.into()),
    }
}
