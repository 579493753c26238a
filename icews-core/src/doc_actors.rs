//! # Modo Documento (DOC_ACTORS)
//!
//! Segunda etapa do fluxo de casamento externo: recebe todos os candidatos
//! produzidos sentença a sentença pelo modo ACTOR_MATCH e, agora com o
//! documento inteiro à vista,
//!
//! 1. refaz as pontuações de geo-resolução: primeiro só locais inequívocos,
//!    depois as cidades americanas da dateline, e por fim a melhor resolução
//!    apesar da ambiguidade, já com as contagens de países do documento;
//! 2. escolhe o país padrão a partir dos candidatos confiáveis (score de
//!    padrão ou de geo-resolução positivo);
//! 3. preenche a pontuação de associação de cada candidato com a soma das
//!    contagens dos países associados ao ator.
//!
//! A conversão dos candidatos em entidades de atores fica com o chamador.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::actor_mention::{ActorIdentifiers, ActorMention};
use crate::actor_mention_set::{ActorMentionSet, ScoredActorMention};
use crate::candidates::is_georgia;
use crate::config::FinderMode;
use crate::document::Document;
use crate::error::{IcewsError, Result};
use crate::finder::{ActorMentionFinder, DocScope};
use crate::gazetteer::GeoResolution;
use crate::ids::{CountryId, MentionUid};
use crate::location_resolver::LocationContext;

const COMPONENT: &str = "ActorMentionFinder::process_doc_actors";

/// Resultado do modo documento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentActorInfo {
    pub document: String,
    /// País padrão do documento, se algum se destacou.
    pub default_country: Option<ActorIdentifiers>,
    /// Os candidatos recebidos, com as pontuações refeitas, mais as cidades
    /// americanas que nenhum candidato cobria.
    pub actor_mentions: Vec<ActorMention>,
}

impl DocumentActorInfo {
    /// Candidatos de uma menção, na ordem recebida.
    pub fn candidates_for(&self, uid: MentionUid) -> impl Iterator<Item = &ActorMention> {
        self.actor_mentions.iter().filter(move |m| m.uid == uid)
    }
}

impl ActorMentionFinder {
    /// Reavalia no nível do documento os candidatos do modo sentença.
    pub fn process_doc_actors(&mut self, doc: &Document, candidates: Vec<ActorMention>) -> Result<DocumentActorInfo> {
        if self.config.mode != FinderMode::DocActors {
            return Err(IcewsError::input(
                COMPONENT,
                format!("este passe só roda no modo DOC_ACTORS (modo atual: {})", self.config.mode.name()),
            ));
        }
        doc.validate()?;
        for candidate in &candidates {
            let exists = doc
                .sentences
                .get(candidate.uid.sentence)
                .map(|s| candidate.uid.index < s.mentions.len())
                .unwrap_or(false);
            if !exists {
                return Err(IcewsError::input(
                    COMPONENT,
                    format!("candidato para menção inexistente {} em {}", candidate.uid, doc.name),
                ));
            }
        }
        if self.config.verbosity > 0 {
            info!("=== Atores do documento {} ({} candidatos) ===", doc.name, candidates.len());
        }

        self.reset_for_new_document();
        let scope = DocScope::new(doc, &self.config);
        let mut candidates = candidates;

        self.doc_actors_location_resolution(scope, &mut candidates);

        let reliable = reliable_actor_mentions(&candidates);
        let default_country = self
            .default_country_actor_mention(scope, &reliable)
            .and_then(|m| m.actor().cloned());

        for candidate in candidates.iter_mut() {
            if !candidate.is_proper_noun() {
                continue;
            }
            let association = self.association_score(candidate, scope.date);
            if let Some(scores) = candidate.scores_mut() {
                scores.association = association;
            }
        }

        if self.config.verbosity > 0 {
            match &default_country {
                Some(country) => info!("  País padrão de {}: {}", doc.name, country.name),
                None => info!("  Nenhum país padrão em {}", doc.name),
            }
        }
        self.stats.documents += 1;
        self.stats.sentences += scope.limit;
        Ok(DocumentActorInfo {
            document: doc.name.clone(),
            default_country,
            actor_mentions: candidates,
        })
    }

    fn doc_actors_location_resolution(&mut self, scope: DocScope<'_>, candidates: &mut Vec<ActorMention>) {
        self.clear_country_tallies();
        for candidate in candidates.iter_mut() {
            if let Some(scores) = candidate.scores_mut() {
                scores.georesolution = 0.0;
            }
        }

        self.rescore_named_locations(scope, candidates, false);

        // cidades americanas são confiáveis: os demais candidatos da menção zeram
        let mut cities: Vec<ScoredActorMention> = Vec::new();
        self.find_us_cities(scope, &mut cities);
        for ScoredActorMention { score, mention: city } in cities {
            let mut found = false;
            for existing in candidates.iter_mut().filter(|m| m.uid == city.uid && m.is_proper_noun()) {
                if existing.actor_id() == city.actor_id() {
                    found = true;
                    *existing = existing.clone().with_geo(city.geo().cloned());
                    if let Some(scores) = existing.scores_mut() {
                        scores.georesolution = score;
                    }
                } else if let Some(scores) = existing.scores_mut() {
                    scores.pattern_match = 0.0;
                    scores.georesolution = 0.0;
                }
            }
            if !found {
                let mut city = city;
                if let Some(scores) = city.scores_mut() {
                    scores.georesolution = score;
                }
                candidates.push(city);
            }
        }

        let reliable = reliable_actor_mentions(candidates);
        self.fill_document_country_counts(scope, &reliable);
        self.rescore_named_locations(scope, candidates, true);
    }

    /// Dá a pontuação de geo-resolução ao candidato cuja resolução coincide
    /// com a escolhida pelo resolvedor. Menções que já têm um candidato
    /// confiável ficam como estão, exceto "Georgia".
    fn rescore_named_locations(&self, scope: DocScope<'_>, candidates: &mut [ActorMention], allow_ambiguity: bool) {
        let info = self.actor_info.as_ref();

        // o resolvedor consulta um conjunto; os candidatos com geo têm prioridade
        let mut full = ActorMentionSet::new();
        for candidate in candidates.iter() {
            if !full.contains(candidate.uid) || candidate.geo().is_some() {
                full.add(candidate.clone());
            }
        }

        for sentno in 0..scope.limit {
            let sent = scope.doc.sentence(sentno);
            for mention in &sent.mentions {
                if !self.is_georesolvable(mention) {
                    continue;
                }
                let indices: Vec<usize> = candidates
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.uid == mention.uid && c.is_proper_noun())
                    .map(|(i, _)| i)
                    .collect();
                if indices.is_empty() {
                    continue;
                }
                let has_good_resolution = indices.iter().any(|&i| {
                    candidates[i]
                        .scores()
                        .map(|s| s.georesolution > 0.0 || s.pattern_match > 0.0)
                        .unwrap_or(false)
                });
                if has_good_resolution && !is_georgia(sent, mention.uid) {
                    continue;
                }

                let mut allowable: Vec<CountryId> = Vec::new();
                if !allow_ambiguity {
                    for actor in indices.iter().filter_map(|&i| candidates[i].actor_id()) {
                        if info.is_a_country(actor) {
                            allowable.extend(info.country_id(actor));
                        } else {
                            allowable.extend(info.associated_country_ids(actor, scope.date));
                        }
                    }
                }

                let ctx = LocationContext {
                    actors: &full,
                    pattern_matches: &[],
                    country_counts: &self.country_counts,
                    usa_actor: self.usa_actor,
                    actor_info: info,
                };
                let Some(resolution) =
                    self.resolver
                        .icews_location_resolution(&ctx, sent, mention, allow_ambiguity, &allowable)
                else {
                    continue;
                };
                if resolution.score == 0.0 {
                    continue;
                }

                let matching = indices
                    .iter()
                    .copied()
                    .find(|&i| candidates[i].geo().map(|g| same_place(g, &resolution.resolution)).unwrap_or(false));
                match matching {
                    Some(i) => {
                        if let Some(scores) = candidates[i].scores_mut() {
                            scores.georesolution = resolution.score;
                        }
                    }
                    None => {
                        if self.config.verbosity > 2 {
                            info!(
                                "    Menção {}: nenhum candidato com a resolução {} ({:?})",
                                mention.uid, resolution.resolution.city_name, resolution.resolution.geoname_id
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Nomes próprios com score de padrão ou de geo-resolução positivo.
fn reliable_actor_mentions(candidates: &[ActorMention]) -> Vec<ActorMention> {
    candidates
        .iter()
        .filter(|m| {
            m.scores()
                .map(|s| s.pattern_match > 0.0 || s.georesolution > 0.0)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Mesma cidade, mesmo geoname e mesmas coordenadas.
fn same_place(a: &GeoResolution, b: &GeoResolution) -> bool {
    a.city_name == b.city_name && a.geoname_id == b.geoname_id && a.latitude == b.latitude && a.longitude == b.longitude
}
