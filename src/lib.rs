pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod profiles;
pub mod rag;
pub mod store;

use cli::{ Args, Command };
use config::AppConfig;
use error::AgentError;
use llm::chat::new_client as new_chat_client;
use llm::embedding::new_client as new_embedding_client;
use log::info;
use models::document::ScoredDocument;
use profiles::JsonFileProfiles;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::from_args(&args)?;
    config.log_summary();

    match &args.command {
        Command::Chat => {
            let chat_client = new_chat_client(&config.chat)?;
            info!("Chat client configured: Model={}", chat_client.model());
            agent::run_math_chat(chat_client.as_ref()).await?;
        }
        Command::Profiles { query } => {
            let results = lookup_profiles(&config, query).await?;
            println!("{}", rag::format_relevant_documents(&results));
        }
    }

    Ok(())
}

/// Builds or reopens the profile index described by `config` and answers `query`.
pub async fn lookup_profiles(
    config: &AppConfig,
    query: &str
) -> Result<Vec<ScoredDocument>, AgentError> {
    let embedding_client = new_embedding_client(&config.embedding)?;
    info!("Embedding client configured: Model={}", embedding_client.model());

    let source = JsonFileProfiles::new(&config.profiles_path);
    let (store, origin) = rag::build_or_open_index(
        &config.index_dir,
        &source,
        embedding_client
    ).await?;
    info!("Index ready: {:?}", origin);

    info!("Query: {}", query);
    rag::retrieve(Arc::new(store), query, config.search_type, config.search_kwargs.clone()).await
}
