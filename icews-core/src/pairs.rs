//! # Pares Agente/Ator
//!
//! Padrões estruturais ligam uma menção agente ("activists") a uma menção
//! ator ("Palestinian"). O resultado é um mapa da menção agente para a menção
//! de ator pareada, filtrado pelo tipo de ator pedido:
//!
//! - [`PairKind::ProperNoun`]: o ator já é um nome próprio conhecido;
//! - [`PairKind::Composite`]: o ator é um agente composto;
//! - [`PairKind::Unknown`]: o ator ainda não tem interpretação. Esses pares
//!   nunca entram no conjunto; servem só para bloquear o país padrão.
//!
//! Casamentos de padrões de atores que não acharam menção NAME/DESC própria
//! ("British" adjetivo) são propostos como ator da menção que os contém.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::actor_mention::{ActorIdentifiers, ActorMention};
use crate::actor_mention_set::ActorMentionSet;
use crate::document::{EntityType, MentionConfidence, MentionType};
use crate::finder::{ActorMentionFinder, DocScope, NESTED_ACTOR_PATTERN_MATCH, TEMPORARY_ACTOR_MENTION};
use crate::ids::MentionUid;
use crate::pattern::{ACTOR_RETURN, AGENT_RETURN};
use crate::token_matcher::{ActorMatch, MatchesBySentence};

/// Tipo de ator aceito num mapa de pares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    ProperNoun,
    Composite,
    Unknown,
}

/// Ator pareado com uma menção agente.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedActor {
    pub actor_mention: ActorMention,
    /// Rótulo do padrão que produziu o par.
    pub pattern_label: String,
    /// Menção provisória, que não pertence ao conjunto do documento.
    pub temporary: bool,
}

impl PairedActor {
    pub fn new(actor_mention: ActorMention, pattern_label: &str, temporary: bool) -> Self {
        Self {
            actor_mention,
            pattern_label: pattern_label.to_string(),
            temporary,
        }
    }
}

/// Menção agente → ator pareado.
pub type PairMap = BTreeMap<MentionUid, PairedActor>;

/// Confianças de correferência fortes o bastante para herdar o par de outra menção.
pub(crate) fn is_highly_confident(confidence: MentionConfidence) -> bool {
    matches!(
        confidence,
        MentionConfidence::TitleDesc
            | MentionConfidence::AppositiveDesc
            | MentionConfidence::WhqLinkPron
            | MentionConfidence::CopulaDesc
            | MentionConfidence::DoubleSubjectPersonPron
            | MentionConfidence::OnlyOneCandidatePron
            | MentionConfidence::OnlyOneCandidateDesc
            | MentionConfidence::NameAndPossPron
    )
}

impl ActorMentionFinder {
    pub(crate) fn find_actor_pairs(
        &self,
        scope: DocScope<'_>,
        actors: &ActorMentionSet,
        kind: PairKind,
        unused: Option<&MatchesBySentence<ActorMatch>>,
    ) -> PairMap {
        if self.config.verbosity > 0 {
            info!("  Procurando pares agente/ator ({kind:?})");
        }
        let mut pairs = PairMap::new();
        if let Some(patterns) = &self.pair_patterns {
            for sentno in 0..scope.doc.sentence_count() {
                for feature_set in patterns.sentence_matches(scope.doc, sentno, actors) {
                    let Some(label) = feature_set.label.as_deref() else {
                        warn!("Padrão agente/ator sem rótulo");
                        continue;
                    };
                    let Some(agent) = feature_set.mention_for(AGENT_RETURN) else {
                        warn!("Padrão agente/ator {label} sem AGENT");
                        continue;
                    };
                    let Some(actor) = feature_set.mention_for(ACTOR_RETURN) else {
                        warn!("Padrão agente/ator {label} sem ACTOR");
                        continue;
                    };
                    // em caso de conflito, o primeiro padrão vence
                    if pairs.contains_key(&agent) {
                        continue;
                    }
                    let paired = match actors.find(actor) {
                        Some(m) if m.is_proper_noun() => {
                            (kind == PairKind::ProperNoun).then(|| PairedActor::new(m.clone(), label, false))
                        }
                        Some(m) if m.is_composite() => {
                            (kind == PairKind::Composite).then(|| PairedActor::new(m.clone(), label, false))
                        }
                        _ => (kind == PairKind::Unknown).then(|| {
                            PairedActor::new(ActorMention::bare(actor, TEMPORARY_ACTOR_MENTION), label, true)
                        }),
                    };
                    if let Some(paired) = paired {
                        if self.config.verbosity > 2 {
                            info!(
                                "    Padrão {label}: \"{}\" é agente potencial de \"{}\" ({})",
                                scope.doc.mention_text(agent),
                                scope.doc.mention_text(actor),
                                paired.actor_mention
                            );
                        }
                        pairs.insert(agent, paired);
                    }
                }
            }
        }
        if let Some(unused) = unused {
            self.add_nested_actor_matches(scope, unused, &mut pairs);
        }
        pairs
    }

    /// Casamentos sem menção própria viram o ator da menção que os contém.
    fn add_nested_actor_matches(&self, scope: DocScope<'_>, unused: &MatchesBySentence<ActorMatch>, pairs: &mut PairMap) {
        for (sentno, matches) in unused.iter().enumerate() {
            let sent = scope.doc.sentence(sentno);
            for m in matches {
                let mut node = sent.covering_node(m.start, m.end);
                while let Some(id) = node {
                    if sent.node(id).mention.is_some() {
                        break;
                    }
                    node = sent.node(id).parent;
                }
                let Some(mut mention) = node.and_then(|id| sent.mention_at_node(id)) else {
                    continue;
                };
                if mention.mention_type == MentionType::None {
                    if let Some(parent) = mention.parent {
                        mention = sent.mention(parent);
                    }
                }
                // nomes de pessoas ficam de fora ("Chad Murray" não é o Chade)
                let accepted = match (mention.entity_type, mention.mention_type) {
                    (EntityType::Org, MentionType::Name) => true,
                    (EntityType::Org | EntityType::Per, MentionType::Desc) => true,
                    _ => false,
                };
                if !accepted || pairs.contains_key(&mention.uid) {
                    continue;
                }
                let actor = ActorIdentifiers::from_match(
                    m,
                    self.actor_info.actor_name(m.id),
                    self.actor_matcher.pattern_requires_context(m.pattern_id),
                );
                let actor_mention = ActorMention::proper_noun(mention.uid, TEMPORARY_ACTOR_MENTION, actor);
                if self.config.verbosity > 2 {
                    info!(
                        "    Casamento aninhado: \"{}\" é agente potencial de {actor_mention}",
                        sent.mention_text(mention.uid.index)
                    );
                }
                pairs.insert(
                    mention.uid,
                    PairedActor::new(actor_mention, NESTED_ACTOR_PATTERN_MATCH, true),
                );
            }
        }
    }

    /// Ator pareado com a menção agente, diretamente ou por uma menção
    /// correferente confiável da mesma sentença.
    pub(crate) fn find_actor_for_agent<'p>(
        &self,
        scope: DocScope<'_>,
        agent: MentionUid,
        pairs: &'p PairMap,
    ) -> Option<&'p PairedActor> {
        if let Some(paired) = pairs.get(&agent) {
            return Some(paired);
        }
        let entity = scope.doc.entity_of(agent)?;
        for &other in &entity.mentions {
            if other == agent || other.sentence != agent.sentence {
                continue;
            }
            let mention = scope.doc.mention(other);
            let head_word = scope.doc.sentence(other.sentence).head_word(mention.node);
            if !is_highly_confident(mention.confidence) && head_word != "who" {
                continue;
            }
            if let Some(paired) = pairs.get(&other) {
                return Some(paired);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::actor_info::{ActorDatabase, ActorKind, ActorRecord};
    use crate::builder::DocumentBuilder;
    use crate::config::FinderConfig;
    use crate::document::{Document, EntityType, MentionType};
    use crate::gazetteer::MemoryGazetteer;
    use crate::ids::{ActorId, ActorPatternId};
    use crate::pattern::{PatternFeatureSet, PatternMatcher};
    use crate::token_matcher::ActorTokenMatcher;

    struct FixedPairs(Vec<(usize, PatternFeatureSet)>);

    impl PatternMatcher for FixedPairs {
        fn sentence_matches(&self, _doc: &Document, sentence: usize, _actors: &ActorMentionSet) -> Vec<PatternFeatureSet> {
            self.0
                .iter()
                .filter(|(s, _)| *s == sentence)
                .map(|(_, f)| f.clone())
                .collect()
        }
    }

    fn finder(patterns: FixedPairs) -> ActorMentionFinder {
        let mut db = ActorDatabase::new();
        db.add_actor(ActorRecord::new(1, "Kenya", ActorKind::Country));
        db.add_actor(ActorRecord::new(2, "United Kingdom", ActorKind::Country));
        ActorMentionFinder::new(
            FinderConfig::default(),
            Arc::new(db),
            Arc::new(MemoryGazetteer::new()),
            ActorTokenMatcher::new("actor"),
        )
        .unwrap()
        .with_pair_patterns(Arc::new(patterns))
    }

    fn kenya(uid: MentionUid) -> ActorMention {
        ActorMention::proper_noun(
            uid,
            "ACTOR_PATTERN",
            ActorIdentifiers::new(ActorId(1), "Kenya".into(), Some("KEN".into()), None),
        )
    }

    #[test]
    fn test_pairs_are_filtered_by_kind() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("Kenyan police fired on Somali refugees");
        let police = b.mention(s, 0, 1, EntityType::Org, MentionType::Desc).unwrap();
        let ken = b.mention(s, 0, 0, EntityType::Gpe, MentionType::Name).unwrap();
        let refugees = b.mention(s, 4, 5, EntityType::Per, MentionType::Desc).unwrap();
        let somali = b.mention(s, 4, 4, EntityType::Gpe, MentionType::Name).unwrap();
        b.entity(&[police]);
        b.entity(&[ken]);
        b.entity(&[refugees]);
        b.entity(&[somali]);
        let doc = b.build();

        let f = finder(FixedPairs(vec![
            (0, PatternFeatureSet::new(Some("nested"), 0.0).with_return(AGENT_RETURN, police).with_return(ACTOR_RETURN, ken)),
            (0, PatternFeatureSet::new(Some("nested"), 0.0).with_return(AGENT_RETURN, refugees).with_return(ACTOR_RETURN, somali)),
            (0, PatternFeatureSet::new(None, 0.0).with_return(AGENT_RETURN, refugees)),
        ]));
        let mut actors = ActorMentionSet::new();
        actors.add(kenya(ken));
        let scope = DocScope::new(&doc, &f.config);

        let pn = f.find_actor_pairs(scope, &actors, PairKind::ProperNoun, None);
        assert_eq!(pn.len(), 1);
        assert_eq!(pn[&police].actor_mention.actor_id(), Some(ActorId(1)));
        assert!(!pn[&police].temporary);

        let unknown = f.find_actor_pairs(scope, &actors, PairKind::Unknown, None);
        assert_eq!(unknown.len(), 1);
        assert!(unknown[&refugees].temporary);
        assert!(unknown[&refugees].actor_mention.is_bare());

        assert!(f.find_actor_pairs(scope, &actors, PairKind::Composite, None).is_empty());
    }

    #[test]
    fn test_unused_adjective_match_pairs_with_containing_org() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("the British Embassy closed");
        let embassy = b.mention(s, 1, 2, EntityType::Org, MentionType::Name).unwrap();
        b.entity(&[embassy]);
        let doc = b.build();

        let f = finder(FixedPairs(Vec::new()));
        let unused = vec![vec![ActorMatch {
            id: ActorId(2),
            pattern_id: Some(ActorPatternId(7)),
            code: Some("GBR".into()),
            start: 1,
            end: 1,
            pattern_strlen: 7,
            weight: 0.0,
            is_acronym: false,
        }]];
        let scope = DocScope::new(&doc, &f.config);
        let pairs = f.find_actor_pairs(scope, &ActorMentionSet::new(), PairKind::ProperNoun, Some(&unused));
        let paired = &pairs[&embassy];
        assert_eq!(paired.pattern_label, NESTED_ACTOR_PATTERN_MATCH);
        assert!(paired.temporary);
        assert_eq!(paired.actor_mention.actor_id(), Some(ActorId(2)));
    }

    #[test]
    fn test_person_names_never_take_nested_actor() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("Chad Murray arrived");
        let chad = b.mention(s, 0, 1, EntityType::Per, MentionType::Name).unwrap();
        b.entity(&[chad]);
        let doc = b.build();

        let f = finder(FixedPairs(Vec::new()));
        let unused = vec![vec![ActorMatch {
            id: ActorId(1),
            pattern_id: None,
            code: None,
            start: 0,
            end: 0,
            pattern_strlen: 4,
            weight: 0.0,
            is_acronym: false,
        }]];
        let scope = DocScope::new(&doc, &f.config);
        assert!(f
            .find_actor_pairs(scope, &ActorMentionSet::new(), PairKind::ProperNoun, Some(&unused))
            .is_empty());
    }

    #[test]
    fn test_actor_for_agent_follows_confident_coref_in_sentence() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("Ruto , the Kenyan president , spoke");
        let ruto = b.mention(s, 0, 0, EntityType::Per, MentionType::Name).unwrap();
        let president = b.mention(s, 2, 4, EntityType::Per, MentionType::Desc).unwrap();
        b.confidence(president, MentionConfidence::AppositiveDesc);
        b.entity(&[ruto, president]);
        let doc = b.build();

        let f = finder(FixedPairs(Vec::new()));
        let mut pairs = PairMap::new();
        pairs.insert(president, PairedActor::new(kenya(MentionUid::new(0, 9)), "of", false));
        let scope = DocScope::new(&doc, &f.config);
        let found = f.find_actor_for_agent(scope, ruto, &pairs);
        assert_eq!(found.map(|p| p.pattern_label.as_str()), Some("of"));
    }
}
