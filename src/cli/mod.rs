use clap::{ ArgAction, Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai", global = true)]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API. Unset means the provider's local default
    /// (http://127.0.0.1:1234/v1 for LM Studio, http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL", global = true)]
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider. Local servers usually need none.
    #[arg(long, env = "CHAT_API_KEY", default_value = "", global = true)]
    pub chat_api_key: String,

    /// Model name for chat completion
    #[arg(long, env = "CHAT_MODEL", default_value = "llama-3.2-3b-instruct", global = true)]
    pub chat_model: String,

    /// Request streamed replies and join them before printing
    #[arg(long, env = "CHAT_STREAMING", default_value = "true", action = ArgAction::Set, global = true)]
    pub chat_streaming: bool,

    // --- Embedding LLM Provider Args ---
    /// Type of LLM provider for text embedding (openai, ollama)
    #[arg(long, env = "EMBEDDING_LLM_TYPE", default_value = "openai", global = true)]
    pub embedding_llm_type: String,

    /// Base URL for the Embedding LLM provider API. Unset means the provider's local default
    #[arg(long, env = "EMBEDDING_BASE_URL", global = true)]
    pub embedding_base_url: Option<String>,

    /// API Key for the Embedding LLM provider
    #[arg(long, env = "EMBEDDING_API_KEY", default_value = "", global = true)]
    pub embedding_api_key: String,

    /// Model name for text embedding
    #[arg(
        long,
        env = "EMBEDDING_MODEL",
        default_value = "text-embedding-nomic-embed-text-v1.5",
        global = true
    )]
    pub embedding_model: String,

    // --- Profile Index Args ---
    /// JSON file holding the array of profiles to index.
    #[arg(long, env = "PROFILES_PATH", default_value = "assets/profiles.json", global = true)]
    pub profiles_path: String,

    /// Directory of the persisted index. Built only when it does not exist yet.
    #[arg(long, env = "INDEX_DIR", default_value = "databases/profile_index", global = true)]
    pub index_dir: String,

    // --- Retrieval Args ---
    /// Retrieval mode (mmr, similarity, similarity_score_threshold)
    #[arg(long, env = "SEARCH_TYPE", default_value = "mmr", global = true)]
    pub search_type: String,

    /// Number of documents to return.
    #[arg(long, env = "SEARCH_K", default_value = "3", global = true)]
    pub search_k: usize,

    /// Number of candidates MMR selects from.
    #[arg(long, env = "SEARCH_FETCH_K", default_value = "20", global = true)]
    pub search_fetch_k: usize,

    /// MMR balance between relevance (1.0) and diversity (0.0).
    #[arg(long, env = "SEARCH_LAMBDA", default_value = "0.5", global = true)]
    pub search_lambda: f32,

    /// Minimum similarity for similarity_score_threshold search.
    #[arg(long, env = "SEARCH_SCORE_THRESHOLD", global = true)]
    pub search_score_threshold: Option<f32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Ask the chat model the two fixed math conversations.
    Chat,
    /// Build or reuse the profile index and answer one query.
    Profiles {
        #[arg(long, default_value = "What is the email of Kathryn?")]
        query: String,
    },
}
