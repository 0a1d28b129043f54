//! Terminal chat loop over the conversational core.

use anyhow::Context;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use anontchigan::config::ChatbotConfig;
use anontchigan::embedding::HttpEmbeddingClient;
use anontchigan::engine::ChatbotService;
use anontchigan::generation::{GenerationClient, HttpChatBackend};
use anontchigan::retrieval::CorpusIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ChatbotConfig::from_env();

    let embedder = Arc::new(
        HttpEmbeddingClient::new(&config.retrieval, config.generation.request_timeout_secs)
            .context("construction du client d'embeddings")?,
    );

    // Startup aborts here if the corpus or the embedding backend is unusable.
    let index = Arc::new(
        CorpusIndex::build(Path::new(&config.retrieval.corpus_path), embedder)
            .await
            .context("construction de l'index")?,
    );

    let backend = Arc::new(HttpChatBackend::new(&config.generation)?);
    let generation = GenerationClient::connect(backend, config.generation.clone()).await;

    let service = ChatbotService::new(index, generation, config);
    let health = service.get_health_status();
    info!(
        generation_available = health.generation_available,
        corpus_size = health.corpus_size,
        "service prêt"
    );

    println!("ANONTCHIGAN — posez vos questions (:health, :quit)");

    let stdin = io::stdin();
    let user_id = format!("cli_{}", std::process::id());

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();

        match question {
            "" => continue,
            ":quit" | ":q" => break,
            ":health" => {
                println!("{}", serde_json::to_string_pretty(&service.get_health_status())?);
                continue;
            }
            _ => {}
        }

        let response = service.process_question(question, &user_id).await;
        match response.score {
            Some(score) => println!("[{:?}, score {:.2}] {}", response.method, score, response.answer),
            None => println!("[{:?}] {}", response.method, response.answer),
        }
    }

    Ok(())
}
