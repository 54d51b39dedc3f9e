//! ESRS reporting assistant: HTTP server over the retrieval-augmented core.

use std::path::PathBuf;
use std::sync::Arc;

use esrs_chat::LLMConfig;
use esrs_core::EsrsConfig;
use esrs_resolve::{Retriever, SectorTable};
use esrs_runtime::{build_assistant, TracingSink};
use esrs_store::IndexStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod routes;
mod state;
#[cfg(test)]
mod test_support;
mod validate;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("ESRS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "--validate" | "validate" => {
                let data_dir = if args.len() > 2 {
                    PathBuf::from(&args[2])
                } else {
                    resolve_data_dir()
                };
                let config = EsrsConfig::from_env(&data_dir)?;
                let report = validate::validate(&data_dir, &config.collections);
                validate::print_report(&report);
                std::process::exit(if report.is_valid() { 0 } else { 1 });
            }
            "--help" | "-h" | "help" => {
                println!("ESRS assistant: industry classification and ESRS question answering");
                println!();
                println!("Usage: esrs [command]");
                println!();
                println!("Commands:");
                println!("  (none)                   Start the server");
                println!("  validate [data-dir]      Check the sector table, collections and models");
                println!("  help                     Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'esrs help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = EsrsConfig::from_env(&data_dir)?;
    let paths = config.data_paths.clone();

    // Without the sector table no classification can be routed.
    let table = SectorTable::load(&paths.sector_table)
        .map_err(|e| anyhow::anyhow!("Failed to load sector table: {}", e))?;

    let embedder = esrs_infer::create_embedder(&paths.embedder_model, config.embedding_dim);
    let reranker = esrs_infer::create_reranker(&paths.reranker_model);

    let store = Arc::new(IndexStore::load(
        &paths.vectorstores,
        &config.collections,
        embedder,
    ));
    if !store.is_complete() {
        warn!("Some collections failed to load; requests that need them will be refused");
    }

    let llm_config = LLMConfig::load(&paths.llm_config_file);
    let gateway = esrs_chat::gateway::create_gateway(&llm_config);

    let retriever = Arc::new(Retriever::new(reranker));
    let reranker_name = retriever.scorer_name().to_string();
    let assistant = build_assistant(
        store.clone(),
        retriever,
        Arc::new(table),
        gateway,
        Arc::new(TracingSink),
    );

    let port = config.port;
    let state = Arc::new(AppState::new(
        config,
        store,
        assistant,
        llm_config.status(),
        reranker_name,
    ));

    // Build router
    let app = routes::build_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ESRS assistant listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
