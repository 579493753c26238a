//! # País Padrão
//!
//! Cada documento pode ter um país padrão, escolhido pelas menções de países
//! e cidades já resolvidas:
//!
//! - +3 para o país na primeira posição da primeira sentença (manchete);
//! - +1 para qualquer outra menção explícita do país ou de um local dele;
//! - +0.1 para cada país associado a um ator que não é país.
//!
//! O mais votado vira padrão se tiver ao menos 1 ponto e o dobro do segundo
//! (no modo agressivo basta a maioria simples). Agentes que ficaram sem ator
//! pareado recebem o país padrão, a menos que algo na sentença ou na
//! entidade indique outro país.

use std::collections::BTreeMap;

use tracing::info;

use crate::actor_mention::ActorMention;
use crate::actor_mention_set::ActorMentionSet;
use crate::document::EntityType;
use crate::error::{IcewsError, Result};
use crate::finder::{
    ActorMentionFinder, DocScope, DEFAULT_COUNTRY, HAS_UNKNOWN_ACTOR, NON_DEFAULT_COUNTRY_IN_SENTENCE,
    TEMPORARY_ACTOR_MENTION,
};
use crate::ids::{ActorId, MentionUid};
use crate::pairs::PairMap;
use crate::pattern::BLOCK_RETURN;

const BLOCK_COMPONENT: &str = "ActorMentionFinder::findMentionsThatBlockDefaultPairedActor";
const UNLABELED_PATTERN: &str = "unlabeled-pattern";

impl ActorMentionFinder {
    pub(crate) fn clear_country_tallies(&mut self) {
        self.country_counts.clear();
        self.country_actors.clear();
        self.city_actors.clear();
    }

    /// Recalcula as contagens de países a partir dos nomes próprios aceitos.
    pub(crate) fn fill_document_country_counts<'m>(
        &mut self,
        scope: DocScope<'_>,
        actors: impl IntoIterator<Item = &'m ActorMention>,
    ) {
        self.clear_country_tallies();
        let info = self.actor_info.clone();
        for actor_mention in actors {
            let Some(actor) = actor_mention.actor() else {
                continue;
            };
            if self.non_contributing.contains(&actor.id) {
                continue;
            }
            let sentno = actor_mention.uid.sentence;

            let (country_id, country_actor) = if info.is_a_country(actor.id) {
                let preferred = match self.country_actors.get(&actor.id) {
                    None => true,
                    Some(existing) => match (existing.actor().and_then(|a| a.pattern_id), actor.pattern_id) {
                        (None, _) => true,
                        (Some(old), Some(new)) => old < new,
                        (Some(_), None) => false,
                    },
                };
                if preferred {
                    self.country_actors.insert(actor.id, actor_mention.clone());
                }
                (info.country_id(actor.id), Some(actor.id))
            } else if let Some(country) = actor_mention.geo().and_then(|g| g.country_info.as_ref()) {
                if let Some(country_actor) = country.actor_id {
                    self.city_actors
                        .entry(country_actor)
                        .or_insert_with(|| actor_mention.clone());
                }
                (Some(country.country_id), country.actor_id)
            } else {
                (None, None)
            };

            match (country_id, country_actor) {
                (Some(_), Some(country_actor)) => {
                    let node = scope.doc.mention(actor_mention.uid).node;
                    let start = scope.doc.sentence(sentno).node(node).start;
                    let (bonus, reason) = if sentno == 0 && start == 0 {
                        (3.0, "no início do documento".to_string())
                    } else {
                        (1.0, format!("mencionado explicitamente na sentença {sentno}"))
                    };
                    *self.country_counts.entry(country_actor).or_default() += bonus;
                    if self.config.verbosity > 3 {
                        info!(
                            "    [{bonus:>4}] para <{}>: {reason} (\"{}\")",
                            info.actor_name(country_actor),
                            actor.name
                        );
                    }
                }
                _ => {
                    for country in info.associated_country_actor_ids(actor.id, scope.date) {
                        if self.config.verbosity > 3 {
                            info!(
                                "    [+0.1] para <{}>: ator relacionado <{}> na sentença {sentno}",
                                info.actor_name(country),
                                actor.name
                            );
                        }
                        *self.country_counts.entry(country).or_default() += 0.1;
                    }
                }
            }
        }
    }

    /// Escolhe o país padrão do documento (ou nenhum).
    pub(crate) fn default_country_actor_mention<'m>(
        &mut self,
        scope: DocScope<'_>,
        actors: impl IntoIterator<Item = &'m ActorMention>,
    ) -> Option<ActorMention> {
        if self.config.verbosity > 0 {
            info!("  Escolhendo o país padrão");
        }
        self.fill_document_country_counts(scope, actors);

        let mut first: Option<(ActorId, f64)> = None;
        let mut second: Option<(ActorId, f64)> = None;
        for (&country, &count) in &self.country_counts {
            if first.map(|(_, c)| count > c).unwrap_or(true) {
                second = first;
                first = Some((country, count));
            } else if second.map(|(_, c)| count > c).unwrap_or(true) {
                second = Some((country, count));
            }
        }
        let (winner, best) = first?;
        let runner_up = second.map(|(_, c)| c).unwrap_or(-1.0);

        let mut result = None;
        if best >= 1.0 && best >= runner_up * 2.0 {
            result = self.country_actors.get(&winner).cloned();
            if result.is_none() {
                // sem menção direta do país: ancora numa cidade dele
                if let Some(city) = self.city_actors.get(&winner) {
                    result = Some(ActorMention::proper_noun(
                        city.uid,
                        TEMPORARY_ACTOR_MENTION,
                        self.actor_identifiers(winner),
                    ));
                }
            }
        }
        if result.is_none() && self.config.is_aggressive() && best >= 1.0 && best >= runner_up {
            result = self.country_actors.get(&winner).cloned();
        }

        if self.config.verbosity > 1 {
            match &result {
                Some(_) => info!("    País padrão: \"{}\"", self.actor_info.actor_name(winner)),
                None => info!("    Nenhum país padrão"),
            }
            if best > 0.0 {
                info!(
                    "      O país com maior score <{}> ({}) tem {best:.1}",
                    self.actor_info.actor_name(winner),
                    winner.0
                );
            }
            if let Some((country, count)) = second.filter(|(_, c)| *c > 0.0) {
                info!(
                    "      O segundo <{}> ({}) tem {count:.1}",
                    self.actor_info.actor_name(country),
                    country.0
                );
            }
        }
        result
    }

    /// Menções marcadas pelos padrões de bloqueio, estendidas à entidade inteira.
    ///
    /// Um retorno com rótulo diferente de `BLOCK` é erro de autoria e aborta o documento.
    pub(crate) fn find_mentions_that_block_default_paired_actor(
        &self,
        scope: DocScope<'_>,
        actors: &ActorMentionSet,
    ) -> Result<BTreeMap<MentionUid, String>> {
        let mut blocked = BTreeMap::new();
        let Some(patterns) = &self.block_patterns else {
            return Ok(blocked);
        };
        for sentno in 0..scope.doc.sentence_count() {
            for feature_set in patterns.sentence_matches(scope.doc, sentno, actors) {
                let label = feature_set.label.as_deref().unwrap_or(UNLABELED_PATTERN);
                for ret in &feature_set.returns {
                    if ret.label != BLOCK_RETURN {
                        return Err(IcewsError::input(
                            BLOCK_COMPONENT,
                            format!("rótulo de retorno inesperado em padrão de bloqueio: {}", ret.label),
                        ));
                    }
                    blocked.insert(ret.mention, label.to_string());
                }
            }
        }

        // "the foreign doctor" bloqueia também "the doctor" e "who"
        let direct: Vec<(MentionUid, String)> = blocked.iter().map(|(k, v)| (*k, v.clone())).collect();
        for (uid, label) in direct {
            if let Some(entity) = scope.doc.entity_of(uid) {
                for &other in &entity.mentions {
                    blocked.entry(other).or_insert_with(|| label.clone());
                }
            }
        }
        Ok(blocked)
    }

    /// Outro país aceito na mesma sentença da menção.
    pub(crate) fn blocked_by_other_country<'a>(
        &self,
        scope: DocScope<'_>,
        target: &ActorMention,
        default: &ActorMention,
        actors: &'a ActorMentionSet,
    ) -> Option<&'a ActorMention> {
        let sent = scope.doc.sentence(target.uid.sentence);
        sent.mentions.iter().find_map(|mention| {
            let found = actors.find(mention.uid)?;
            let actor = found.actor_id()?;
            (self.actor_info.is_a_country(actor) && Some(actor) != default.actor_id()).then_some(found)
        })
    }

    /// Alguma menção correferente já tem um ator diferente do proposto?
    pub(crate) fn sister_mention_has_clashing_actor(
        &self,
        scope: DocScope<'_>,
        agent: MentionUid,
        proposed: ActorId,
        actors: &ActorMentionSet,
    ) -> bool {
        let Some(entity) = scope.doc.entity_of(agent) else {
            return false;
        };
        for &uid in &entity.mentions {
            let Some(existing) = actors.find(uid) else {
                continue;
            };
            let clash = if let Some(actor) = existing.actor_id() {
                actor != proposed
            } else if existing.is_composite() {
                existing.paired_actor_id().map(|p| p != proposed).unwrap_or(false)
            } else {
                false
            };
            if clash {
                if self.config.verbosity > 3 {
                    info!(
                        "    * País padrão bloqueado: \"{}\"\n        Bloqueado pela menção correferente \"{}\"",
                        scope.doc.mention_text(agent),
                        scope.doc.mention_text(uid)
                    );
                }
                return true;
            }
        }
        false
    }

    /// Pareia com o país padrão os agentes que ainda não têm ator.
    pub(crate) fn assign_default_country_for_unknown_paired_actors(
        &self,
        scope: DocScope<'_>,
        actors: &mut ActorMentionSet,
        default: &ActorMention,
        unknown_pairs: &PairMap,
        pn_pairs: &PairMap,
        blocked: &BTreeMap<MentionUid, String>,
    ) {
        let Some(country) = default.actor().cloned() else {
            return;
        };
        if self.config.verbosity > 0 {
            info!("  Substituindo atores pareados desconhecidos pelo país padrão: {default}");
        }
        let verbose = self.config.verbosity > 3;
        let unpaired: Vec<ActorMention> = actors.iter().filter(|m| m.is_unpaired_composite()).cloned().collect();

        for mut composite in unpaired {
            let uid = composite.uid;
            let text = scope.doc.mention_text(uid);

            if let Some(label) = blocked.get(&uid) {
                if verbose {
                    info!("    * País padrão bloqueado: \"{text}\" {composite}\n        Bloqueado pelo padrão \"{label}\"");
                }
                continue;
            }

            if let Some(other) = self.blocked_by_other_country(scope, &composite, default, actors) {
                if self.config.block_default_country_if_another_country_in_same_sentence {
                    if verbose {
                        info!(
                            "    * País padrão bloqueado: \"{text}\" {composite}\n        Bloqueado pelo país \"{}\" {other}",
                            scope.doc.mention_text(other.uid)
                        );
                    }
                    continue;
                }
                composite.add_note(NON_DEFAULT_COUNTRY_IN_SENTENCE);
            }

            if let Some(paired) = unknown_pairs.get(&uid) {
                if self.config.block_default_country_if_unknown_paired_actor_is_found {
                    if verbose {
                        info!(
                            "    * País padrão bloqueado: \"{text}\" {composite}\n        Bloqueado pelo ator pareado \"{}\"",
                            scope.doc.mention_text(paired.actor_mention.uid)
                        );
                    }
                    continue;
                }
                composite.add_note(HAS_UNKNOWN_ACTOR);
            }

            if let Some(paired) = pn_pairs.get(&uid) {
                let explicit = &paired.actor_mention;
                if let Some(actor) = explicit.actor_id() {
                    let paired_type = scope.doc.mention(explicit.uid).entity_type;
                    if actor != country.id && matches!(paired_type, EntityType::Gpe | EntityType::Loc) {
                        if verbose {
                            info!(
                                "    * País padrão bloqueado: \"{text}\" {composite}\n        Bloqueado pelo local pareado \"{}\"",
                                scope.doc.mention_text(explicit.uid)
                            );
                        }
                        continue;
                    }
                }
            }

            if self.sister_mention_has_clashing_actor(scope, uid, country.id, actors) {
                continue;
            }

            let assigned = composite.with_paired_actor(country.clone(), DEFAULT_COUNTRY);
            if verbose {
                info!("    * País padrão atribuído: \"{text}\" {assigned}");
            }
            actors.add(assigned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::actor_mention::{ActorIdentifiers, AgentIdentifiers};
    use crate::builder::DocumentBuilder;
    use crate::document::{Document, MentionType};
    use crate::fixtures;
    use crate::pattern::{PatternFeatureSet, PatternMatcher};

    fn pn(finder: &ActorMentionFinder, uid: MentionUid, actor: ActorId) -> ActorMention {
        ActorMention::proper_noun(uid, "ACTOR_PATTERN", finder.actor_identifiers(actor))
    }

    fn police(uid: MentionUid) -> ActorMention {
        let agent = AgentIdentifiers::new(fixtures::POLICE, "Police".into(), Some("COP".into()), None);
        ActorMention::composite(uid, "AGENT_PATTERN", agent, None, "AGENT_PATTERN")
    }

    /// "Kenya ..." na manchete, e "police" numa sentença com ou sem outro país.
    fn document(other_country: bool) -> (Document, Vec<MentionUid>) {
        let mut b = DocumentBuilder::new("d");
        let s0 = b.sentence("Kenya holds elections");
        let kenya = b.mention(s0, 0, 0, EntityType::Gpe, MentionType::Name).unwrap();
        let s1 = b.sentence(if other_country { "police met Russia" } else { "police met voters" });
        let police = b.mention(s1, 0, 0, EntityType::Per, MentionType::Desc).unwrap();
        let mut uids = vec![kenya, police];
        b.entity(&[kenya]);
        b.entity(&[police]);
        if other_country {
            let russia = b.mention(s1, 2, 2, EntityType::Gpe, MentionType::Name).unwrap();
            b.entity(&[russia]);
            uids.push(russia);
        }
        (b.build(), uids)
    }

    #[test]
    fn test_headline_country_becomes_default() {
        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let (doc, uids) = document(false);
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, uids[0], fixtures::KENYA));
        let default = finder.default_country_actor_mention(scope, &actors).unwrap();
        assert_eq!(default.actor_id(), Some(fixtures::KENYA));
        assert_eq!(finder.country_counts.get(&fixtures::KENYA), Some(&3.0));
    }

    #[test]
    fn test_tie_yields_no_default() {
        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let (doc, uids) = document(true);
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, uids[0], fixtures::KENYA));
        actors.add(pn(&finder, uids[2], fixtures::RUSSIA));
        // 3 contra 1: o dobro é suficiente
        assert!(finder.default_country_actor_mention(scope, &actors).is_some());

        let mut b = DocumentBuilder::new("tie");
        let s = b.sentence("talks between Kenya and Russia");
        let k = b.mention(s, 2, 2, EntityType::Gpe, MentionType::Name).unwrap();
        let r = b.mention(s, 4, 4, EntityType::Gpe, MentionType::Name).unwrap();
        b.entity(&[k]);
        b.entity(&[r]);
        let doc = b.build();
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, k, fixtures::KENYA));
        actors.add(pn(&finder, r, fixtures::RUSSIA));
        assert!(finder.default_country_actor_mention(scope, &actors).is_none());
    }

    #[test]
    fn test_non_contributing_actor_is_ignored() {
        let mut config = fixtures::config();
        config.actors_not_contributing_to_country_counts = vec!["KEN".into()];
        let mut finder = fixtures::finder(config).unwrap();
        let (doc, uids) = document(false);
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, uids[0], fixtures::KENYA));
        assert!(finder.default_country_actor_mention(scope, &actors).is_none());
    }

    #[test]
    fn test_default_country_assigned_to_unpaired_agent() {
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let (doc, uids) = document(false);
        let scope = DocScope::new(&doc, finder.config());
        let default = pn(&finder, uids[0], fixtures::KENYA);
        let mut actors = ActorMentionSet::new();
        actors.add(default.clone());
        actors.add(police(uids[1]));
        finder.assign_default_country_for_unknown_paired_actors(
            scope,
            &mut actors,
            &default,
            &PairMap::new(),
            &PairMap::new(),
            &BTreeMap::new(),
        );
        let assigned = actors.find(uids[1]).unwrap();
        assert_eq!(assigned.paired_actor_id(), Some(fixtures::KENYA));
        assert!(assigned.has_note(DEFAULT_COUNTRY));
    }

    #[test]
    fn test_other_country_in_sentence_blocks_or_annotates() {
        let (doc, uids) = document(true);
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let default = pn(&finder, uids[0], fixtures::KENYA);
        let mut actors = ActorMentionSet::new();
        actors.add(default.clone());
        actors.add(police(uids[1]));
        actors.add(pn(&finder, uids[2], fixtures::RUSSIA));
        let empty = PairMap::new();
        finder.assign_default_country_for_unknown_paired_actors(scope, &mut actors, &default, &empty, &empty, &BTreeMap::new());
        assert!(actors.find(uids[1]).unwrap().is_unpaired_composite());

        let mut config = fixtures::config();
        config.block_default_country_if_another_country_in_same_sentence = false;
        let finder = fixtures::finder(config).unwrap();
        finder.assign_default_country_for_unknown_paired_actors(scope, &mut actors, &default, &empty, &empty, &BTreeMap::new());
        let assigned = actors.find(uids[1]).unwrap();
        assert_eq!(assigned.paired_actor_id(), Some(fixtures::KENYA));
        assert!(assigned.has_note(NON_DEFAULT_COUNTRY_IN_SENTENCE));
    }

    #[test]
    fn test_clashing_coreferent_actor_blocks_assignment() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("police and officers");
        let police_uid = b.mention(s, 0, 0, EntityType::Per, MentionType::Desc).unwrap();
        let officers = b.mention(s, 2, 2, EntityType::Per, MentionType::Desc).unwrap();
        b.entity(&[police_uid, officers]);
        let doc = b.build();
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let russian = police(officers).with_paired_actor(
            ActorIdentifiers::new(fixtures::RUSSIA, "Russia".into(), Some("RUS".into()), None),
            "ACTOR_PATTERN",
        );
        let mut actors = ActorMentionSet::new();
        actors.add(police(police_uid));
        actors.add(russian);
        assert!(finder.sister_mention_has_clashing_actor(scope, police_uid, fixtures::KENYA, &actors));
        assert!(!finder.sister_mention_has_clashing_actor(scope, police_uid, fixtures::RUSSIA, &actors));
    }

    struct BadLabel;

    impl PatternMatcher for BadLabel {
        fn sentence_matches(&self, _doc: &Document, sentence: usize, _actors: &ActorMentionSet) -> Vec<PatternFeatureSet> {
            vec![PatternFeatureSet::new(Some("bad"), 1.0).with_return("AGENT", MentionUid::new(sentence, 0))]
        }
    }

    #[test]
    fn test_unexpected_block_label_is_fatal() {
        let finder = fixtures::finder(fixtures::config()).unwrap().with_block_patterns(Arc::new(BadLabel));
        let (doc, _) = document(false);
        let scope = DocScope::new(&doc, finder.config());
        let err = finder
            .find_mentions_that_block_default_paired_actor(scope, &ActorMentionSet::new())
            .unwrap_err();
        assert!(matches!(err, IcewsError::InputValidation { .. }));
    }
}
