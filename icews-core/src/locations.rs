//! # Resolução de Locais
//!
//! Menções NAME de tipo LOC/GPE (e aeroportos, com `georesolve_facs`) são
//! resolvidas contra o gazetteer e viram atores por nome próprio: o ator do
//! próprio geoname quando existe, senão o país da resolução.
//!
//! Dois casos especiais vivem aqui:
//!
//! - gentílicos de pessoa ("the Iraqi") viram cidadãos do país quando o
//!   gentílico aponta para um único país;
//! - sentenças do tipo dateline, "omaha , neb .", resolvem cidade e estado
//!   dentro dos EUA com score fixo [`US_CITY_SCORE`].

use tracing::info;

use crate::actor_mention::{ActorIdentifiers, ActorMention};
use crate::actor_mention_set::{ActorMentionSet, ScoredActorMention};
use crate::config::FinderMode;
use crate::document::{Document, EntityType, Mention, MentionType, Sentence};
use crate::finder::{
    ActorMentionFinder, DocScope, CITIZEN_OF_COUNTRY, GAZETTEER, PERSON_IS_CITIZEN_OF_COUNTRY, UNAMBIGUOUS_GAZETTEER,
    USA_CODE, US_CITY,
};
use crate::gazetteer::{GeoResolution, ScoredGeoResolution};
use crate::ids::{CountryId, MentionUid};
use crate::location_resolver::LocationContext;
use crate::token_matcher::ActorMatch;

/// Score de cidades e estados americanos reconhecidos pelo padrão de dateline.
pub const US_CITY_SCORE: f64 = 45.0;
/// Score dos locais resolvidos para o país padrão.
pub const DEFAULT_COUNTRY_LOCATION_SCORE: f64 = 50.0;

const US_ISO_CODE: &str = "US";
const COLORADO_CODE: &str = "CO";
const AIRPORT_SUBTYPE: &str = "Airport";

impl ActorMentionFinder {
    pub(crate) fn is_georesolvable(&self, mention: &Mention) -> bool {
        if mention.mention_type != MentionType::Name {
            return false;
        }
        match mention.entity_type {
            EntityType::Loc | EntityType::Gpe => true,
            EntityType::Fac => self.config.georesolve_facs && mention.entity_subtype.as_deref() == Some(AIRPORT_SUBTYPE),
            _ => false,
        }
    }

    /// Resolve os locais nomeados de uma sentença.
    ///
    /// Atores por nome próprio já aceitos recebem a melhor resolução dentro
    /// dos seus países (só com `allow_ambiguity`); se o geoname tem ator
    /// próprio, o ator do padrão sai do conjunto e o do geoname vira
    /// candidato. Os demais candidatos vão para `out`.
    pub(crate) fn resolve_named_locations(
        &self,
        scope: DocScope<'_>,
        sentno: usize,
        pattern_matches: &[ActorMatch],
        actors: &mut ActorMentionSet,
        out: &mut Vec<ScoredActorMention>,
        allow_ambiguity: bool,
    ) {
        let sent = scope.doc.sentence(sentno);
        let info = self.actor_info.as_ref();
        for mention in &sent.mentions {
            if self.is_georesolvable(mention) {
                if let Some(existing) = actors.find(mention.uid).cloned() {
                    self.refine_existing_location(scope, sent, mention, existing, actors, out, allow_ambiguity);
                }

                match self.config.mode {
                    FinderMode::ActorMatch => {
                        for resolution in self.resolver.candidate_resolutions(sent, mention, false, &[]) {
                            let Some(candidate) = self.make_from_gazetteer(mention.uid, &resolution, GAZETTEER) else {
                                continue;
                            };
                            let actor = candidate.mention.actor_id();
                            let seen = out
                                .iter()
                                .any(|c| c.mention.uid == mention.uid && c.mention.actor_id() == actor)
                                || actors.find(mention.uid).and_then(ActorMention::actor_id) == actor;
                            if !seen {
                                out.push(candidate);
                            }
                        }
                    }
                    FinderMode::Icews => {
                        let ctx = LocationContext {
                            actors: &*actors,
                            pattern_matches,
                            country_counts: &self.country_counts,
                            usa_actor: self.usa_actor,
                            actor_info: info,
                        };
                        let resolution =
                            self.resolver
                                .icews_location_resolution(&ctx, sent, mention, allow_ambiguity, &[]);
                        if let Some(resolution) = resolution {
                            let note = if allow_ambiguity { GAZETTEER } else { UNAMBIGUOUS_GAZETTEER };
                            if let Some(candidate) = self.make_from_gazetteer(mention.uid, &resolution, note) {
                                out.push(candidate);
                            }
                        }
                    }
                    FinderMode::DocActors => {}
                }
            }

            if self.config.mode == FinderMode::Icews {
                if let Some(candidate) = self.nationality_citizen(sent, mention, actors) {
                    out.push(candidate);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn refine_existing_location(
        &self,
        scope: DocScope<'_>,
        sent: &Sentence,
        mention: &Mention,
        existing: ActorMention,
        actors: &mut ActorMentionSet,
        out: &mut Vec<ScoredActorMention>,
        allow_ambiguity: bool,
    ) {
        let Some(actor) = existing.actor_id() else {
            return;
        };
        let info = self.actor_info.as_ref();
        let allowable: Vec<CountryId> = if info.is_a_country(actor) {
            info.country_id(actor).into_iter().collect()
        } else {
            info.associated_country_ids(actor, scope.date)
        };
        let candidates = self.resolver.candidate_resolutions(sent, mention, false, &allowable);
        if !allow_ambiguity {
            return;
        }
        let Some(best) = candidates.into_iter().next() else {
            return;
        };
        let has_geoname_actor = best
            .resolution
            .geoname_id
            .and_then(|id| info.actor_for_geoname(id))
            .is_some();
        if has_geoname_actor {
            if let Some(candidate) = self.make_from_gazetteer(mention.uid, &best, GAZETTEER) {
                actors.remove(mention.uid);
                out.push(candidate);
                return;
            }
        }
        actors.add(existing.with_geo(Some(best.resolution)));
    }

    /// "The Iraqi said": pessoa cujo núcleo é gentílico de um único país.
    fn nationality_citizen(
        &self,
        sent: &Sentence,
        mention: &Mention,
        actors: &ActorMentionSet,
    ) -> Option<ScoredActorMention> {
        if mention.entity_type != EntityType::Per
            || !mention.mention_type.is_name_or_desc()
            || actors.contains(mention.uid)
        {
            return None;
        }
        let head = sent.head_word(mention.node);
        if !self.resolver.gazetteer().is_nationality_word(&head) {
            return None;
        }
        let info = self.actor_info.as_ref();
        let resolution = self.resolver.unambiguous_country_resolution(sent, mention, info)?;
        let country = info.actor_for_geoname(resolution.resolution.geoname_id?)?;
        let agent = self.default_person_agent()?;
        let actor = ActorIdentifiers::new(country, info.actor_name(country), None, None);
        if self.config.verbosity > 2 {
            info!(
                "    Gentílico \"{}\" resolvido para cidadão de {}",
                sent.mention_text(mention.uid.index),
                actor.name
            );
        }
        Some(ScoredActorMention::new(
            resolution.score,
            ActorMention::composite(mention.uid, CITIZEN_OF_COUNTRY, agent, Some(actor), PERSON_IS_CITIZEN_OF_COUNTRY),
        ))
    }

    /// Ator por nome próprio a partir de uma resolução do gazetteer.
    ///
    /// `None` quando a resolução não tem score ou não tem país.
    pub(crate) fn make_from_gazetteer(
        &self,
        uid: MentionUid,
        resolution: &ScoredGeoResolution,
        note: &str,
    ) -> Option<ScoredActorMention> {
        if resolution.score == 0.0 {
            return None;
        }
        let country = resolution.resolution.country_info.as_ref()?;
        let info = self.actor_info.as_ref();
        let geoname_actor = resolution.resolution.geoname_id.and_then(|id| info.actor_for_geoname(id));
        let actor = match geoname_actor {
            Some(actor) => ActorIdentifiers::new(actor, info.actor_name(actor), None, None),
            None => {
                let actor = country.actor_id?;
                ActorIdentifiers::new(actor, info.actor_name(actor), info.actor_code(actor), None)
            }
        };
        let mention = ActorMention::proper_noun(uid, note, actor).with_geo(Some(resolution.resolution.clone()));
        Some(ScoredActorMention::new(resolution.score, mention))
    }

    fn is_us_state(&self, sent: &Sentence, mention: &Mention) -> bool {
        let text = sent.node_text(mention.node).replace('.', "");
        self.config.is_us_state_name(&text.trim().to_lowercase())
    }

    /// Reconhece sentenças "cidade , estado" dos EUA (tipicamente a dateline).
    pub(crate) fn find_us_cities(&mut self, scope: DocScope<'_>, out: &mut Vec<ScoredActorMention>) {
        if self.config.us_state_names.is_empty() {
            return;
        }
        let Some(usa) = self.usa_actor else {
            return;
        };
        let info = self.actor_info.clone();
        let usa_ids = ActorIdentifiers::new(usa, info.actor_name(usa), Some(USA_CODE.to_string()), None);

        for sentno in 0..scope.limit {
            let sent = scope.doc.sentence(sentno);
            if sent.mentions.len() != 3 {
                continue;
            }
            let root_tag = &sent.node(sent.root).tag;
            if !self.config.us_city_root_tags.iter().any(|t| t == root_tag) {
                continue;
            }
            let (city, comma, state) = (&sent.mentions[0], &sent.mentions[1], &sent.mentions[2]);
            if city.mention_type != MentionType::Name
                || comma.mention_type != MentionType::None
                || state.mention_type != MentionType::Name
                || city.child != Some(comma.uid.index)
                || !self.is_us_state(sent, state)
            {
                continue;
            }

            let city_names = self.resolver.canonical_forms(sent, city);
            let state_names = self.resolver.canonical_forms(sent, state);

            let (state_res, state_code) = match self.resolver.resolution_in_region(sent, state, US_ISO_CODE, None) {
                Some(res) => {
                    let code = res.geoname_id.and_then(|id| self.resolver.gazetteer().geo_region(id));
                    (res, code)
                }
                None => {
                    // o Colorado costuma faltar no gazetteer
                    let colorado = state_names.iter().any(|n| n == "colorado" || n == "colo .");
                    match (colorado, self.resolver.gazetteer().country_resolution(US_ISO_CODE)) {
                        (true, Some(res)) => (res, Some(COLORADO_CODE.to_string())),
                        _ => continue,
                    }
                }
            };

            let city_res = match self
                .resolver
                .resolution_in_region(sent, city, US_ISO_CODE, state_code.as_deref())
            {
                Some(res) => res,
                // Geórgia: estado e país se confundem
                None if sent.head_word(state.node) == "georgia" => continue,
                None => state_res.clone(),
            };

            if self.config.verbosity > 2 {
                info!(
                    "    Cidade americana: \"{}\" em \"{}\"",
                    sent.mention_text(city.uid.index),
                    sent.mention_text(state.uid.index)
                );
            }
            let place = |uid: MentionUid, res: &GeoResolution| {
                let actor = match res.geoname_id.and_then(|id| info.actor_for_geoname(id)) {
                    Some(actor) => ActorIdentifiers::new(actor, info.actor_name(actor), None, None),
                    None => usa_ids.clone(),
                };
                ScoredActorMention::new(
                    US_CITY_SCORE,
                    ActorMention::proper_noun(uid, US_CITY, actor).with_geo(Some(res.clone())),
                )
            };
            out.push(place(city.uid, &city_res));
            out.push(place(state.uid, &state_res));
            self.resolver
                .register_resolutions(&city_names, &ScoredGeoResolution::new(US_CITY_SCORE, city_res.clone()));
            self.resolver
                .register_resolutions(&state_names, &ScoredGeoResolution::new(US_CITY_SCORE, state_res));

            if let Some(entity) = scope.doc.entity_of(city.uid) {
                for &other in &entity.mentions {
                    if other != city.uid && other.sentence < scope.limit {
                        out.push(place(other, &city_res));
                    }
                }
            }
        }
    }

    /// Resolve para o país padrão os locais nomeados que ficaram sem resolução.
    ///
    /// Não faz parte da ordem padrão dos passes.
    pub fn resolve_ambiguous_locations_to_default_country(
        &mut self,
        doc: &Document,
        default_country: &ActorMention,
        actors: &mut ActorMentionSet,
    ) {
        let Some(resolution) = default_country.geo().cloned() else {
            return;
        };
        let Some(country) = resolution.country_info.as_ref().and_then(|c| c.actor_id) else {
            return;
        };
        if self.config.verbosity > 3 {
            info!("  Resolvendo locais ambíguos para o país padrão");
        }
        let scope = DocScope::new(doc, &self.config);
        let info = self.actor_info.clone();
        let mut candidates = Vec::new();
        for sentno in 0..scope.limit {
            let sent = doc.sentence(sentno);
            for mention in &sent.mentions {
                if mention.mention_type != MentionType::Name
                    || !matches!(mention.entity_type, EntityType::Loc | EntityType::Gpe)
                    || self.resolver.is_blocked_location(sent, mention)
                {
                    continue;
                }
                match actors.find(mention.uid).cloned() {
                    Some(existing) => {
                        if self.blocked_by_other_country(scope, &existing, default_country, actors).is_some() {
                            continue;
                        }
                        if existing.is_proper_noun() && existing.geo().is_none() {
                            actors.add(existing.with_geo(Some(resolution.clone())));
                        }
                    }
                    None => {
                        let mention = ActorMention::proper_noun(
                            mention.uid,
                            GAZETTEER,
                            ActorIdentifiers::new(country, info.actor_name(country), info.actor_code(country), None),
                        )
                        .with_geo(Some(resolution.clone()));
                        candidates.push(ScoredActorMention::new(DEFAULT_COUNTRY_LOCATION_SCORE, mention));
                    }
                }
            }
        }
        self.greedily_add_actor_mentions(scope, actors, candidates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DocumentBuilder;
    use crate::fixtures;
    use crate::gazetteer::Gazetteer;

    #[test]
    fn test_gazetteer_mention_falls_back_to_country_actor() {
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let uid = MentionUid::new(0, 0);
        let gazetteer = fixtures::gazetteer();
        let omaha = gazetteer.geo_resolution(fixtures::OMAHA_GEONAME).unwrap();
        let scored = finder
            .make_from_gazetteer(uid, &ScoredGeoResolution::new(30.0, omaha), GAZETTEER)
            .unwrap();
        assert_eq!(scored.mention.actor_id(), Some(fixtures::UNITED_STATES));
        assert!(scored.mention.geo().is_some());

        let stateless = GeoResolution {
            country_info: None,
            ..gazetteer.geo_resolution(fixtures::OMAHA_GEONAME).unwrap()
        };
        assert!(finder
            .make_from_gazetteer(uid, &ScoredGeoResolution::new(30.0, stateless), GAZETTEER)
            .is_none());
    }

    #[test]
    fn test_nationality_becomes_citizen() {
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("the Iraqi said");
        let iraqi = b.mention(s, 1, 1, EntityType::Per, MentionType::Desc).unwrap();
        b.entity(&[iraqi]);
        let doc = b.build();
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        let mut out = Vec::new();
        finder.resolve_named_locations(scope, 0, &[], &mut actors, &mut out, false);
        assert_eq!(out.len(), 1);
        let citizen = &out[0].mention;
        assert_eq!(citizen.pattern_name(), Some(PERSON_IS_CITIZEN_OF_COUNTRY));
        assert_eq!(citizen.paired_actor_id(), Some(fixtures::IRAQ));
        assert_eq!(citizen.agent_id(), Some(fixtures::CITIZEN));
    }

    #[test]
    fn test_us_city_requires_state_name() {
        let mut config = fixtures::config();
        config.us_state_names.clear();
        let mut finder = fixtures::finder(config).unwrap();
        let doc = fixtures::omaha_document().unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let mut out = Vec::new();
        finder.find_us_cities(scope, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_us_city_resolves_city_and_state() {
        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let doc = fixtures::omaha_document().unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let mut out = Vec::new();
        finder.find_us_cities(scope, &mut out);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|c| c.score == US_CITY_SCORE));
        assert!(out.iter().all(|c| c.mention.actor_id() == Some(fixtures::UNITED_STATES)));
        let city = out[0].mention.geo().unwrap();
        assert_eq!(city.city_name, "Omaha");
    }
}
