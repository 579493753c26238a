//! # Atores Compostos
//!
//! Um casamento de agente ("police", "activists") vira uma menção composta
//! Agente-FOR-Ator. O ator vem do mapa de pares; sem par, o composto fica com
//! ator desconhecido e pode receber o país padrão mais tarde.
//!
//! Os casamentos vêm de duas fontes: o [`AgentTokenMatcher`](crate::token_matcher::AgentTokenMatcher)
//! e, opcionalmente, padrões estruturais cujo último retorno nomeia o agente.
//!
//! Score de um candidato:
//!
//! | sinal                              | efeito              |
//! |------------------------------------|---------------------|
//! | intervalo idêntico ao núcleo       | +5 (só o fim: +2)   |
//! | comprimento do padrão              | soma direta         |
//! | ator pareado conhecido             | +5                  |
//! | agente restrito a países, ator país | +1                 |
//! | agente restrito, ator não-país     | −4 (indivíduo: −8)  |
//! | desempate por id do agente         | −id / 10⁴           |

use tracing::{info, warn};

use crate::actor_mention::{ActorMention, AgentIdentifiers};
use crate::actor_mention_set::{ActorMentionSet, ScoredActorMention};
use crate::document::{EntityType, MentionType};
use crate::finder::{
    ActorMentionFinder, DocScope, AGENT_OF_AGENT_PATTERN, AGENT_PATTERN, BLOCK_ACTOR, COMPOSITE_ACTOR_IS_PAIRED_ACTOR,
    COUNTRY_RESTRICTION_APPLIED, EXPLICIT_LINK_TO_COUNTRY, PATTERN_END_IS_NOT_MENTION_END, UNKNOWN_ACTOR,
};
use crate::pairs::PairMap;
use crate::token_matcher::{AgentMatch, MatchesBySentence};

impl ActorMentionFinder {
    /// Materializa os compostos dos casamentos de agentes, pareando cada
    /// agente com o ator do mapa `pairs` quando houver.
    pub(crate) fn find_composite_actor_mentions(
        &mut self,
        scope: DocScope<'_>,
        actors: &mut ActorMentionSet,
        pairs: &PairMap,
    ) {
        if self.config.verbosity > 0 {
            info!("  Adicionando menções de atores compostos");
        }
        let token_matches = match &self.agent_matcher {
            Some(matcher) => matcher.find_all_matches(scope.doc, scope.limit),
            None => Vec::new(),
        };
        let pattern_matches = self.agent_pattern_matches(scope);

        let mut candidates = Vec::new();
        for matches in [&token_matches, &pattern_matches] {
            for (sentno, sentence_matches) in matches.iter().enumerate() {
                for m in sentence_matches {
                    if let Some(candidate) = self.make_composite_actor_mention(scope, sentno, m, pairs) {
                        candidates.push(candidate);
                    }
                }
            }
        }
        self.greedily_add_actor_mentions(scope, actors, candidates);
    }

    /// Casamentos de agentes vindos dos padrões estruturais.
    fn agent_pattern_matches(&self, scope: DocScope<'_>) -> MatchesBySentence<AgentMatch> {
        let Some(patterns) = &self.agent_name_patterns else {
            return Vec::new();
        };
        let empty = ActorMentionSet::new();
        let mut result = Vec::with_capacity(scope.limit);
        for sentno in 0..scope.limit {
            let sent = scope.doc.sentence(sentno);
            let mut local = Vec::new();
            for feature_set in patterns.sentence_matches(scope.doc, sentno, &empty) {
                let Some(label) = feature_set.label.as_deref() else {
                    warn!("Padrão de agente sem rótulo");
                    continue;
                };
                let Some(agent_return) = feature_set.returns.last() else {
                    warn!("Padrão de agente {label} sem agente");
                    continue;
                };
                let Some(agent) = self.actor_info.agent_by_name(&agent_return.label) else {
                    warn!(
                        "Nome de agente do padrão {label} ({}) fora do dicionário",
                        agent_return.label
                    );
                    continue;
                };
                let node = sent.node(sent.mention(agent_return.mention.index).node);
                local.push(AgentMatch {
                    id: agent,
                    pattern_id: None,
                    code: self.actor_info.agent_code(agent),
                    start: node.start,
                    end: node.end,
                    pattern_strlen: node.end - node.start,
                    weight: feature_set.score,
                    is_acronym: false,
                });
            }
            result.push(local);
        }
        result
    }

    pub(crate) fn make_composite_actor_mention(
        &self,
        scope: DocScope<'_>,
        sentno: usize,
        m: &AgentMatch,
        pairs: &PairMap,
    ) -> Option<ScoredActorMention> {
        let sent = scope.doc.sentence(sentno);
        let mention = sent.covering_name_desc_mention(m.start, m.end)?;
        let node = sent.node(mention.atomic_head);
        let same_start = node.start == m.start;
        let same_end = node.end == m.end;

        let mut score = 0.0;
        if same_start && same_end {
            score += 5.0;
        } else if same_end {
            score += 2.0;
        }
        score += m.pattern_strlen as f64;
        score -= m.id.0 as f64 / 10_000.0;

        // agente dentro de nome de pessoa: só com núcleo permitido ("President Ruto")
        if mention.entity_type == EntityType::Per && mention.mention_type == MentionType::Name && m.start >= node.start {
            let head_word = sent.head_word(mention.atomic_head);
            if !self.config.person_agent_name_words.contains(&head_word) {
                if self.config.verbosity > 3 {
                    info!(
                        "    Agente bloqueado em nome de pessoa: \"{}\"",
                        sent.mention_text(mention.uid.index)
                    );
                }
                return None;
            }
        }

        let info = self.actor_info.as_ref();
        let agent = AgentIdentifiers::new(m.id, info.agent_name(m.id), m.code.clone(), m.pattern_id);
        let code = m.code.as_deref();

        if let Some(paired) = self.find_actor_for_agent(scope, mention.uid, pairs) {
            let note = if paired.actor_mention.is_composite() {
                AGENT_OF_AGENT_PATTERN
            } else {
                AGENT_PATTERN
            };
            if let Some(actor) = paired.actor_mention.identifiers_for_pairing() {
                score += 5.0;
                let mut restricted = false;
                if info.is_restricted_to_country_actors(m.id) {
                    if info.is_a_country(actor.id) {
                        score += 1.0;
                    } else {
                        restricted = true;
                        score -= if info.is_an_individual(actor.id) { 8.0 } else { 4.0 };
                    }
                }
                let mut candidate = if restricted {
                    paired
                        .actor_mention
                        .copy_with_new_mention(mention.uid, COUNTRY_RESTRICTION_APPLIED)
                } else if code == Some(COMPOSITE_ACTOR_IS_PAIRED_ACTOR) {
                    paired
                        .actor_mention
                        .copy_with_new_mention(mention.uid, COMPOSITE_ACTOR_IS_PAIRED_ACTOR)
                } else {
                    ActorMention::composite(mention.uid, note, agent, Some(actor.clone()), &paired.pattern_label)
                };
                if !same_end {
                    candidate.add_note(PATTERN_END_IS_NOT_MENTION_END);
                }
                return Some(ScoredActorMention::new(score, candidate));
            }
        }

        match code {
            // sem par, fica para passes posteriores (labelPeople)
            Some(COMPOSITE_ACTOR_IS_PAIRED_ACTOR) => None,
            Some(BLOCK_ACTOR) => Some(ScoredActorMention::new(score, ActorMention::bare(mention.uid, BLOCK_ACTOR))),
            _ => {
                let mut candidate = ActorMention::composite(mention.uid, AGENT_PATTERN, agent, None, UNKNOWN_ACTOR);
                if !same_end {
                    candidate.add_note(PATTERN_END_IS_NOT_MENTION_END);
                }
                Some(ScoredActorMention::new(score, candidate))
            }
        }
    }

    /// Locais sem ator que um padrão ligou explicitamente a um país
    /// ("the Kenyan capital") herdam esse país.
    pub(crate) fn add_explicit_locations(&mut self, scope: DocScope<'_>, actors: &mut ActorMentionSet, pn_pairs: &PairMap) {
        if self.config.verbosity > 0 {
            info!("  Adicionando locais ligados explicitamente a países");
        }
        for sentno in 0..scope.limit {
            for mention in &scope.doc.sentence(sentno).mentions {
                if !matches!(mention.entity_type, EntityType::Gpe | EntityType::Loc | EntityType::Fac)
                    || actors.contains(mention.uid)
                {
                    continue;
                }
                let Some(paired) = pn_pairs.get(&mention.uid) else {
                    continue;
                };
                if paired.temporary {
                    continue;
                }
                let Some(country) = paired.actor_mention.actor_id() else {
                    continue;
                };
                if !self.actor_info.is_a_country(country) {
                    continue;
                }
                let actor = paired
                    .actor_mention
                    .copy_with_new_mention(mention.uid, EXPLICIT_LINK_TO_COUNTRY);
                if self.config.verbosity > 1 {
                    info!(
                        "    Adicionando {actor} para \"{}\": ligado explicitamente ao país",
                        scope.doc.mention_text(mention.uid)
                    );
                }
                self.add_actor_mention(scope, actors, actor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::builder::DocumentBuilder;
    use crate::document::Document;
    use crate::fixtures;
    use crate::ids::MentionUid;
    use crate::pairs::PairedActor;
    use crate::pattern::{PatternRule, RulePatternMatcher};

    fn country(finder: &ActorMentionFinder, uid: MentionUid, actor: crate::ids::ActorId) -> ActorMention {
        ActorMention::proper_noun(uid, "ACTOR_PATTERN", finder.actor_identifiers(actor))
    }

    fn police_document() -> (Document, MentionUid, MentionUid) {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("Kenyan police fired");
        let police = b.mention(s, 0, 1, EntityType::Org, MentionType::Desc).unwrap();
        let kenyan = b.mention(s, 0, 0, EntityType::Gpe, MentionType::Name).unwrap();
        b.entity(&[police]);
        b.entity(&[kenyan]);
        (b.build(), police, kenyan)
    }

    fn police_match() -> AgentMatch {
        AgentMatch {
            id: fixtures::POLICE,
            pattern_id: None,
            code: Some("COP".into()),
            start: 1,
            end: 1,
            pattern_strlen: 7,
            weight: 0.0,
            is_acronym: false,
        }
    }

    #[test]
    fn test_paired_agent_becomes_composite() {
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let (doc, police, kenyan) = police_document();
        let scope = DocScope::new(&doc, finder.config());
        let mut pairs = PairMap::new();
        pairs.insert(police, PairedActor::new(country(&finder, kenyan, fixtures::KENYA), "nested", false));

        let scored = finder
            .make_composite_actor_mention(scope, 0, &police_match(), &pairs)
            .unwrap();
        assert_eq!(scored.mention.agent_id(), Some(fixtures::POLICE));
        assert_eq!(scored.mention.paired_actor_id(), Some(fixtures::KENYA));
        assert_eq!(scored.mention.source_note(), AGENT_PATTERN);
        assert_eq!(scored.mention.pattern_name(), Some("nested"));
        // 5 (intervalo) + 7 (padrão) + 5 (par) − id/10⁴
        let expected = 17.0 - fixtures::POLICE.0 as f64 / 10_000.0;
        assert!((scored.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unpaired_agent_has_unknown_actor() {
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let (doc, _, _) = police_document();
        let scope = DocScope::new(&doc, finder.config());
        let scored = finder
            .make_composite_actor_mention(scope, 0, &police_match(), &PairMap::new())
            .unwrap();
        assert!(scored.mention.is_unpaired_composite());
        assert_eq!(scored.mention.pattern_name(), Some(UNKNOWN_ACTOR));
    }

    #[test]
    fn test_special_agent_codes() {
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let (doc, police, kenyan) = police_document();
        let scope = DocScope::new(&doc, finder.config());

        let same_as_actor = AgentMatch {
            code: Some(COMPOSITE_ACTOR_IS_PAIRED_ACTOR.into()),
            ..police_match()
        };
        assert!(finder
            .make_composite_actor_mention(scope, 0, &same_as_actor, &PairMap::new())
            .is_none());

        let mut pairs = PairMap::new();
        pairs.insert(police, PairedActor::new(country(&finder, kenyan, fixtures::KENYA), "nested", false));
        let copied = finder
            .make_composite_actor_mention(scope, 0, &same_as_actor, &pairs)
            .unwrap();
        assert!(copied.mention.is_proper_noun());
        assert_eq!(copied.mention.uid, police);
        assert!(copied.mention.has_note(COMPOSITE_ACTOR_IS_PAIRED_ACTOR));

        let block = AgentMatch {
            code: Some(BLOCK_ACTOR.into()),
            ..police_match()
        };
        let blocked = finder
            .make_composite_actor_mention(scope, 0, &block, &PairMap::new())
            .unwrap();
        assert!(blocked.mention.is_bare());
    }

    #[test]
    fn test_country_restricted_agent_with_organization() {
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("the Central Bank of Kenya government");
        let government = b.mention_with_head(s, 0, 5, 5, EntityType::Org, MentionType::Desc).unwrap();
        let bank = b.mention(s, 1, 4, EntityType::Org, MentionType::Name).unwrap();
        b.entity(&[government]);
        b.entity(&[bank]);
        let doc = b.build();
        let scope = DocScope::new(&doc, finder.config());
        let mut pairs = PairMap::new();
        pairs.insert(government, PairedActor::new(country(&finder, bank, fixtures::CENTRAL_BANK), "nested", false));
        let m = AgentMatch {
            id: fixtures::GOVERNMENT,
            code: Some("GOV".into()),
            start: 5,
            end: 5,
            pattern_strlen: 11,
            ..police_match()
        };
        let scored = finder.make_composite_actor_mention(scope, 0, &m, &pairs).unwrap();
        assert!(scored.mention.is_proper_noun());
        assert_eq!(scored.mention.actor_id(), Some(fixtures::CENTRAL_BANK));
        assert!(scored.mention.has_note(COUNTRY_RESTRICTION_APPLIED));
        // 5 + 11 + 5 − 4 − id/10⁴
        let expected = 17.0 - fixtures::GOVERNMENT.0 as f64 / 10_000.0;
        assert!((scored.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_agent_inside_person_name_is_blocked() {
        let finder = fixtures::finder(fixtures::config()).unwrap();
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("Joe Police arrived");
        let joe = b.mention(s, 0, 1, EntityType::Per, MentionType::Name).unwrap();
        b.entity(&[joe]);
        let doc = b.build();
        let scope = DocScope::new(&doc, finder.config());
        assert!(finder
            .make_composite_actor_mention(scope, 0, &police_match(), &PairMap::new())
            .is_none());
    }

    #[test]
    fn test_agent_name_patterns_produce_composites() {
        let patterns = RulePatternMatcher::new(vec![PatternRule::AgentHeadWords {
            label: "ACTIVISTS".into(),
            agent: "Activist".into(),
            words: vec!["campaigners".into()],
            score: 1.0,
        }]);
        let mut finder = fixtures::finder(fixtures::config()).unwrap().with_agent_name_patterns(Arc::new(patterns));
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("campaigners marched");
        let campaigners = b.mention(s, 0, 0, EntityType::Per, MentionType::Desc).unwrap();
        b.entity(&[campaigners]);
        let doc = b.build();
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        finder.find_composite_actor_mentions(scope, &mut actors, &PairMap::new());
        let found = actors.find(campaigners).unwrap();
        assert_eq!(found.agent_id(), Some(fixtures::ACTIVIST));
        assert!(found.is_unpaired_composite());
    }

    #[test]
    fn test_explicit_location_copies_country() {
        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("the Kenyan capital");
        let capital = b.mention_with_head(s, 0, 2, 2, EntityType::Gpe, MentionType::Desc).unwrap();
        let kenyan = b.mention(s, 1, 1, EntityType::Gpe, MentionType::Name).unwrap();
        b.entity(&[capital]);
        b.entity(&[kenyan]);
        let doc = b.build();
        let scope = DocScope::new(&doc, finder.config());
        let mut pairs = PairMap::new();
        pairs.insert(capital, PairedActor::new(country(&finder, kenyan, fixtures::KENYA), "nested", false));
        let mut actors = ActorMentionSet::new();
        finder.add_explicit_locations(scope, &mut actors, &pairs);
        let found = actors.find(capital).unwrap();
        assert_eq!(found.actor_id(), Some(fixtures::KENYA));
        assert!(found.has_note(EXPLICIT_LINK_TO_COUNTRY));

        // pares provisórios não contam
        let mut temporary = PairMap::new();
        temporary.insert(capital, PairedActor::new(country(&finder, kenyan, fixtures::KENYA), "nested", true));
        let mut actors = ActorMentionSet::new();
        finder.add_explicit_locations(scope, &mut actors, &temporary);
        assert!(actors.is_empty());
    }
}
