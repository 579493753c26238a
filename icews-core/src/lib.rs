//! # icews-core — Resolução de Menções de Atores (ICEWS)
//!
//! Dado um documento já analisado (árvores sintáticas, menções e entidades
//! correferentes), decide quais menções de sintagmas nominais representam
//! **atores** políticos (países, organizações, pessoas) e quais representam
//! **agentes** de um ator ("Palestinian activists" = Activist de Palestine),
//! além de geo-resolver os locais contra o gazetteer.
//!
//! ## Arquitetura
//!
//! O [`ActorMentionFinder`] executa uma sequência fixa de passes sobre um
//! [`ActorMentionSet`] (no máximo uma interpretação por menção):
//!
//! 1.  **Nomes próprios** ([`candidates`], [`locations`]): casamentos do
//!     [`token_matcher`] e resoluções do gazetteer viram candidatos
//!     pontuados, aceitos de forma gulosa.
//! 2.  **País padrão** ([`default_country`]): o país dominante do documento.
//! 3.  **Pares e compostos** ([`pairs`], [`composite`]): agentes ligados aos
//!     atores que os modificam.
//! 4.  **Correferência e rótulos padrão** ([`coref`]): atores copiados entre
//!     menções da mesma entidade; pessoas, partitivos e locais sem ator.
//!
//! Os colaboradores externos (base de atores, gazetteer, casador de padrões)
//! entram por traits estreitas ([`ActorInfo`], [`Gazetteer`],
//! [`pattern::PatternMatcher`]) com implementações em memória.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use icews_core::fixtures;
//!
//! // 1. Localizador com a base e os matchers de exemplo
//! let mut finder = fixtures::finder(fixtures::config())?;
//!
//! // 2. Documento já analisado
//! let doc = fixtures::demo_document()?;
//!
//! // 3. Uma interpretação por menção
//! let actors = finder.process(&doc)?;
//! for mention in actors.iter() {
//!     println!("{} => {mention}", doc.mention_text(mention.uid));
//! }
//! # Ok::<(), icews_core::IcewsError>(())
//! ```
//!
//! ## Módulos Principais
//!
//! - [`finder`]: orquestrador e eventos de progresso.
//! - [`document`] e [`builder`]: a arena linguística do documento.
//! - [`actor_mention`]: o modelo de dados das interpretações.
//! - [`batch`]: processamento paralelo de documentos independentes.
//! - [`actor_match`] e [`doc_actors`]: os modos sentença e documento usados
//!   por ferramentas externas de casamento.
//! - [`fixtures`]: dados de exemplo para testes e demonstração.

pub mod actor_info;
pub mod actor_match;
pub mod actor_mention;
pub mod actor_mention_set;
pub mod batch;
pub mod builder;
pub mod candidates;
pub mod composite;
pub mod config;
pub mod coref;
pub mod default_country;
pub mod doc_actors;
pub mod document;
pub mod error;
pub mod finder;
pub mod fixtures;
pub mod gazetteer;
pub mod ids;
pub mod location_resolver;
pub mod locations;
pub mod pairs;
pub mod pattern;
pub mod token_matcher;

pub use actor_info::{ActorDatabase, ActorInfo};
pub use actor_mention::{ActorMention, ActorMentionKind};
pub use actor_mention_set::ActorMentionSet;
pub use batch::{process_batch, DocumentActors};
pub use config::{FinderConfig, FinderMode};
pub use doc_actors::DocumentActorInfo;
pub use document::Document;
pub use error::{IcewsError, Result};
pub use finder::{ActorMentionFinder, FinderEvent, FinderStats};
pub use gazetteer::{Gazetteer, MemoryGazetteer};
