//! Servidor web Axum para resolução de menções de atores, com WebSocket para
//! acompanhar os passes em tempo real.
//!
//! Os recursos (base de atores, gazetteer, padrões) são lidos uma vez na
//! partida a partir dos caminhos em variáveis de ambiente; sem elas, o
//! servidor usa os dados de exemplo de `icews_core::fixtures`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use icews_core::{
    finder::duration_ms,
    fixtures,
    pattern::RulePatternMatcher,
    token_matcher::{ActorTokenMatcher, AgentTokenMatcher},
    ActorDatabase, ActorMention, ActorMentionFinder, Document, DocumentActorInfo, FinderConfig, FinderEvent, FinderMode,
    IcewsError, MemoryGazetteer,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Recursos compartilhados, somente leitura. Cada requisição monta o seu
/// localizador, que guarda estado por documento.
struct AppState {
    config: FinderConfig,
    actors: Arc<ActorDatabase>,
    gazetteer: Arc<MemoryGazetteer>,
    actor_matcher: ActorTokenMatcher,
    agent_matcher: AgentTokenMatcher,
    pair_patterns: Arc<RulePatternMatcher>,
}

impl AppState {
    fn load() -> anyhow::Result<Self> {
        let config = match env_path("ICEWS_CONFIG") {
            Some(path) => FinderConfig::from_path(path)?,
            None => fixtures::config(),
        };
        let actors = match env_path("ICEWS_ACTORS") {
            Some(path) => ActorDatabase::from_path(path)?,
            None => fixtures::actor_database(),
        };
        let gazetteer = match env_path("ICEWS_GAZETTEER") {
            Some(path) => MemoryGazetteer::from_path(path)?,
            None => fixtures::gazetteer(),
        };
        let actor_matcher = match env_path("ICEWS_ACTOR_PATTERNS") {
            Some(path) => ActorTokenMatcher::from_path("actor", path)?,
            None => fixtures::actor_matcher(),
        };
        let agent_matcher = match env_path("ICEWS_AGENT_PATTERNS") {
            Some(path) => AgentTokenMatcher::from_path("agent", path)?,
            None => fixtures::agent_matcher(),
        };
        let pair_patterns = match env_path("ICEWS_PAIR_PATTERNS") {
            Some(path) => RulePatternMatcher::from_json_str(&std::fs::read_to_string(path)?)?,
            None => fixtures::pair_patterns(),
        };
        Ok(Self {
            config,
            actors: Arc::new(actors),
            gazetteer: Arc::new(gazetteer),
            actor_matcher,
            agent_matcher,
            pair_patterns: Arc::new(pair_patterns),
        })
    }

    fn finder(&self, config: FinderConfig) -> Result<ActorMentionFinder, IcewsError> {
        let finder = ActorMentionFinder::new(
            config,
            self.actors.clone(),
            self.gazetteer.clone(),
            self.actor_matcher.clone(),
        )?
        .with_agent_matcher(self.agent_matcher.clone())
        .with_pair_patterns(self.pair_patterns.clone());
        Ok(finder)
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).map(PathBuf::from)
}

#[derive(Deserialize)]
struct ProcessRequest {
    document: Document,
    #[serde(default)]
    config: Option<FinderConfig>,
}

#[derive(Serialize)]
struct ProcessResponse {
    document: String,
    actor_mentions: Vec<ActorMention>,
    processing_ms: u64,
}

#[derive(Serialize)]
struct SentenceCandidates {
    sentence: usize,
    candidates: Vec<ActorMention>,
}

#[derive(Serialize)]
struct ProcessSentencesResponse {
    document: String,
    sentences: Vec<SentenceCandidates>,
    processing_ms: u64,
}

#[derive(Serialize)]
struct DocActorsResponse {
    #[serde(flatten)]
    info: DocumentActorInfo,
    processing_ms: u64,
}

/// Falha de uma requisição, devolvida como `{"error": ...}`.
enum ApiError {
    Icews(IcewsError),
    Internal(String),
}

impl From<IcewsError> for ApiError {
    fn from(err: IcewsError) -> Self {
        Self::Icews(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Icews(err) if err.is_input_validation() => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Icews(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        warn!("Requisição falhou ({status}): {message}");
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("icews=info")))
        .init();

    let state = Arc::new(AppState::load()?);
    info!(
        "Recursos carregados: {} padrões de atores, modo {}",
        state.actor_matcher.pattern_count(),
        state.config.mode.name()
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/process", post(process_handler))
        .route("/process-sentences", post(process_sentences_handler))
        .route("/doc-actors", post(doc_actors_handler))
        .route("/ws", get(ws_handler))
        .route("/demo", get(demo_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state);

    let addr = std::env::var("ICEWS_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Servidor ICEWS iniciado em http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Documento inteiro (modo ICEWS), sem streaming.
async fn process_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let config = req.config.unwrap_or_else(|| state.config.clone());
    let response = tokio::task::spawn_blocking(move || -> Result<ProcessResponse, IcewsError> {
        let start = Instant::now();
        let mut finder = state.finder(config)?;
        let actors = finder.process(&req.document)?;
        Ok(ProcessResponse {
            document: req.document.name.clone(),
            actor_mentions: actors.into_vec(),
            processing_ms: duration_ms(start.elapsed()),
        })
    })
    .await
    .map_err(|err| ApiError::Internal(err.to_string()))??;
    Ok(Json(response))
}

/// Todos os candidatos de cada sentença (modo ACTOR_MATCH), em ordem.
async fn process_sentences_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<ProcessSentencesResponse>, ApiError> {
    let mut config = req.config.unwrap_or_else(|| state.config.clone());
    config.mode = FinderMode::ActorMatch;
    let response = tokio::task::spawn_blocking(move || -> Result<ProcessSentencesResponse, IcewsError> {
        let start = Instant::now();
        let mut finder = state.finder(config)?;
        let doc = &req.document;
        let mut sentences = Vec::with_capacity(doc.sentence_count());
        for sentence in 0..doc.sentence_count() {
            let candidates = finder.process_sentence(doc, sentence)?;
            sentences.push(SentenceCandidates { sentence, candidates });
        }
        Ok(ProcessSentencesResponse {
            document: doc.name.clone(),
            sentences,
            processing_ms: duration_ms(start.elapsed()),
        })
    })
    .await
    .map_err(|err| ApiError::Internal(err.to_string()))??;
    Ok(Json(response))
}

/// Candidatos de todas as sentenças reavaliados no nível do documento
/// (ACTOR_MATCH seguido de DOC_ACTORS).
async fn doc_actors_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<DocActorsResponse>, ApiError> {
    let config = req.config.unwrap_or_else(|| state.config.clone());
    let response = tokio::task::spawn_blocking(move || -> Result<DocActorsResponse, IcewsError> {
        let start = Instant::now();
        let doc = &req.document;

        let mut sentence_config = config.clone();
        sentence_config.mode = FinderMode::ActorMatch;
        let mut finder = state.finder(sentence_config)?;
        let mut candidates = Vec::new();
        for sentence in 0..doc.sentence_count() {
            candidates.extend(finder.process_sentence(doc, sentence)?);
        }

        let mut doc_config = config;
        doc_config.mode = FinderMode::DocActors;
        let info = state.finder(doc_config)?.process_doc_actors(doc, candidates)?;
        Ok(DocActorsResponse {
            info,
            processing_ms: duration_ms(start.elapsed()),
        })
    })
    .await
    .map_err(|err| ApiError::Internal(err.to_string()))??;
    Ok(Json(response))
}

/// Documento de demonstração, pronto para ser enviado a `/process` ou `/ws`.
async fn demo_handler() -> Result<Json<Document>, ApiError> {
    Ok(Json(fixtures::demo_document()?))
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Recebe documentos em JSON e devolve um [`FinderEvent`] por passe.
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let req = match serde_json::from_str::<ProcessRequest>(&text) {
                    Ok(req) => req,
                    Err(err) => {
                        let event = FinderEvent::Error {
                            message: format!("requisição inválida: {err}"),
                        };
                        if send_event(&mut socket, &event).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };
                info!(
                    "Processando via WebSocket: {} ({} sentenças)",
                    req.document.name,
                    req.document.sentence_count()
                );

                // O localizador é síncrono: roda fora do runtime e os eventos
                // são coletados do canal std::mpsc ao fim do documento.
                let (tx, rx) = std::sync::mpsc::channel::<FinderEvent>();
                let state = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    let config = req.config.unwrap_or_else(|| state.config.clone());
                    match state.finder(config) {
                        Ok(mut finder) => {
                            // falhas já chegam ao cliente como FinderEvent::Error
                            let _ = finder.process_streaming(&req.document, &tx);
                        }
                        Err(err) => {
                            let _ = tx.send(FinderEvent::Error {
                                message: err.to_string(),
                            });
                        }
                    }
                });
                if let Err(err) = handle.await {
                    warn!("Tarefa de processamento falhou: {err}");
                }

                let events: Vec<FinderEvent> = rx.try_iter().collect();
                for event in &events {
                    if send_event(&mut socket, event).await.is_err() {
                        return; // cliente desconectou
                    }
                    // pausa curta para a visualização passo a passo
                    tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &FinderEvent) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json)).await,
        Err(err) => {
            warn!("Evento não serializável: {err}");
            Ok(())
        }
    }
}
