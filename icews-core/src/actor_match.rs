//! # Modo Sentença (ACTOR_MATCH)
//!
//! Ponto de entrada usado por ferramentas externas de casamento de atores:
//! cada sentença devolve **todos** os candidatos por nome próprio, sem a
//! atribuição gulosa do modo documento, junto com as pontuações que o
//! chamador usa para decidir. As resoluções do gazetteer entram como
//! candidatos adicionais, um por ator distinto.
//!
//! Os casamentos das sentenças já vistas ficam acumulados (siglas e padrões
//! dependentes de contexto olham o documento inteiro) até
//! [`ActorMentionFinder::reset_for_new_document`].

use tracing::info;

use crate::actor_mention::ActorMention;
use crate::actor_mention_set::ActorMentionSet;
use crate::config::FinderMode;
use crate::document::{Document, EntityType, MentionType};
use crate::error::{IcewsError, Result};
use crate::finder::{ActorMentionFinder, DocScope, ACTOR_PATTERN};

const COMPONENT: &str = "ActorMentionFinder::process_sentence";

impl ActorMentionFinder {
    /// Candidatos de uma sentença, na ordem em que foram encontrados.
    ///
    /// As sentenças de um documento devem chegar em ordem, a partir da 0.
    pub fn process_sentence(&mut self, doc: &Document, sentno: usize) -> Result<Vec<ActorMention>> {
        if self.config.mode != FinderMode::ActorMatch {
            return Err(IcewsError::input(
                COMPONENT,
                format!("este passe só roda no modo ACTOR_MATCH (modo atual: {})", self.config.mode.name()),
            ));
        }
        if sentno >= doc.sentence_count() {
            return Err(IcewsError::input(COMPONENT, format!("sentença {sentno} inexistente em {}", doc.name)));
        }
        if sentno != self.sentence_matches.len() {
            return Err(IcewsError::input(
                COMPONENT,
                format!(
                    "sentença {sentno} fora de ordem: esperada a sentença {}",
                    self.sentence_matches.len()
                ),
            ));
        }

        if sentno == 0 {
            doc.validate()?;
        }

        let sent = doc.sentence(sentno);
        if self.config.only_match_names && sent.name_mention_count() == 0 {
            self.sentence_matches.push(Vec::new());
            return Ok(Vec::new());
        }
        let matches = self.actor_matcher.find_sentence_matches(sent);
        self.sentence_matches.push(matches.clone());

        let scope = DocScope::new(doc, &self.config);
        let info = self.actor_info.as_ref();
        let mut result = Vec::new();
        for m in &matches {
            let Some((candidate, shape)) = self.create_proper_noun_actor_mention(sent, m, ACTOR_PATTERN) else {
                continue;
            };
            let Some(actor) = candidate.actor_id() else {
                continue;
            };
            let mention = doc.mention(candidate.uid);
            if matches!(mention.entity_type, EntityType::Undet | EntityType::Oth) {
                continue;
            }
            if m.is_acronym && mention.entity_type == EntityType::Per && info.is_an_organization(actor) {
                continue;
            }
            let type_matches = self.entity_type_matches(actor, mention.entity_type);
            if self.config.require_entity_type_match && !type_matches {
                continue;
            }
            if self.config.only_match_names && mention.mention_type != MentionType::Name {
                continue;
            }
            // o peso do padrão faz as vezes de confiança aqui
            if m.weight < 1.0 && !type_matches {
                continue;
            }

            let (scored, score) =
                self.score_proper_noun_actor_mention(scope, sentno, candidate, m, &self.sentence_matches, shape, false);
            let Some(mut actor_mention) = scored else {
                continue;
            };
            if let Some(scores) = actor_mention.scores_mut() {
                scores.pattern_match = score;
                scores.pattern_confidence = m.weight;
                scores.importance = info.importance_score(actor);
            }
            if self.config.verbosity > 2 {
                info!(
                    "    Candidato {actor_mention} para \"{}\" [{score:.3}]",
                    doc.mention_text(actor_mention.uid)
                );
            }
            result.push(actor_mention);
        }

        let mut locations = Vec::new();
        self.resolve_named_locations(scope, sentno, &matches, &mut ActorMentionSet::new(), &mut locations, true);
        for candidate in locations {
            let mut actor_mention = candidate.mention;
            let Some(actor) = actor_mention.actor_id() else {
                continue;
            };
            let uid = actor_mention.uid;
            if result.iter().any(|m| m.uid == uid && m.actor_id() == Some(actor)) {
                continue;
            }
            if let Some(scores) = actor_mention.scores_mut() {
                scores.georesolution = candidate.score;
                scores.importance = info.importance_score(actor);
            }
            result.push(actor_mention);
        }

        if self.config.verbosity > 0 {
            info!("  {} candidatos na sentença {sentno} de {}", result.len(), doc.name);
        }
        Ok(result)
    }
}
