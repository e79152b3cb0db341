use std::env;
use std::sync::Arc;

use skill_matcher::models::config::{CONFIG_PATH_ENV, ServerConfig};
use skill_matcher::models::message::{MatchRequest, MatchResponse};
use skill_matcher::processing::embedding::FastEmbedProvider;
use skill_matcher::processing::matching::{MatchParams, process_match_message};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config_path = env::var(CONFIG_PATH_ENV).ok();
    let config = match ServerConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    log::info!("Loading embedding model {}...", config.embedding_model);
    let provider = match FastEmbedProvider::try_new(&config) {
        Ok(provider) => provider,
        Err(e) => {
            log::error!("Failed to initialize embedder: {e}");
            std::process::exit(1);
        }
    };
    log::info!("Embedding model {} loaded", provider.model_name());
    let provider = Arc::new(provider);

    let defaults = MatchParams {
        top_k: config.default_top_k,
        min_score: config.default_min_score,
    };

    let context = zmq::Context::new();
    let responder = match context.socket(zmq::REP) {
        Ok(socket) => socket,
        Err(e) => {
            log::error!("Cannot create zmq socket: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = responder.bind(&config.zmq_address) {
        log::error!("Cannot bind to {}: {e}", config.zmq_address);
        std::process::exit(1);
    }
    log::info!("Listening for match requests on {}", config.zmq_address);

    loop {
        let msg = match responder.recv_bytes(0) {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Failed to receive message: {e}");
                continue;
            }
        };

        let response = match serde_json::from_slice::<MatchRequest>(&msg) {
            Ok(request) => {
                let provider = Arc::clone(&provider);
                match tokio::task::spawn_blocking(move || {
                    process_match_message(request, provider.as_ref(), &defaults)
                })
                .await
                {
                    Ok(response) => response,
                    Err(e) => {
                        log::error!("Match task panicked: {e}");
                        MatchResponse::Error {
                            kind: "Internal".to_string(),
                            message: "match run aborted".to_string(),
                        }
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to parse JSON: {e}");
                MatchResponse::invalid_request(e.to_string())
            }
        };

        let payload = match serde_json::to_vec(&response) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Failed to encode response: {e}");
                serde_json::to_vec(&MatchResponse::Error {
                    kind: "Internal".to_string(),
                    message: "response could not be encoded".to_string(),
                })
                .unwrap_or_default()
            }
        };

        if let Err(e) = responder.send(payload, 0) {
            log::error!("Failed to send response: {e}");
        }
    }
}
