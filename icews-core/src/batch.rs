//! # Processamento em Lote
//!
//! Documentos são independentes entre si, então o lote é distribuído com
//! Rayon. O localizador guarda estado por documento, por isso cada worker
//! constrói o seu a partir de uma fábrica; os recursos pesados (base de
//! atores, gazetteer) devem vir em `Arc` compartilhados pela fábrica.
//!
//! Um documento que falha é registrado com o nome e pulado; os demais seguem.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::actor_mention_set::ActorMentionSet;
use crate::document::Document;
use crate::error::Result;
use crate::finder::ActorMentionFinder;

/// Menções de atores de um documento do lote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentActors {
    pub document: String,
    pub actor_mentions: ActorMentionSet,
}

/// Processa os documentos em paralelo, na ordem de entrada.
pub fn process_batch<F>(documents: &[Document], factory: F) -> Vec<DocumentActors>
where
    F: Fn() -> Result<ActorMentionFinder> + Sync + Send,
{
    let results: Vec<DocumentActors> = documents
        .par_iter()
        .map_init(&factory, |finder, doc| {
            let finder = match finder {
                Ok(finder) => finder,
                Err(err) => {
                    warn!("Documento {} pulado: falha ao criar o localizador: {err}", doc.name);
                    return None;
                }
            };
            match finder.process(doc) {
                Ok(actor_mentions) => Some(DocumentActors {
                    document: doc.name.clone(),
                    actor_mentions,
                }),
                Err(err) => {
                    warn!("Documento {} pulado: {err}", doc.name);
                    None
                }
            }
        })
        .flatten()
        .collect();
    info!("Lote: {} de {} documentos processados", results.len(), documents.len());
    results
}
