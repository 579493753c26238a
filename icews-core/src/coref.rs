//! # Correferência e Rótulos Padrão
//!
//! Passes que espalham atores já aceitos por outras menções:
//!
//! - correferência: cada menção sem ator por nome próprio recebe a melhor
//!   menção de ator da sua entidade (nomes antes de descrições, a mesma
//!   sentença antes das anteriores);
//! - pessoas: entidades PER sem ator viram cidadãos do ator pareado ou, no
//!   último recurso, de um ator desconhecido;
//! - partitivos: "some of the soldiers" herda o ator de "the soldiers";
//! - locais e instalações: o que sobrou sem ator fica com o país padrão.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::actor_mention::{ActorMention, AgentIdentifiers};
use crate::actor_mention_set::ActorMentionSet;
use crate::document::{Entity, EntityType, Mention, MentionConfidence, MentionType, Sentence};
use crate::finder::{
    ActorMentionFinder, DocScope, AGENT_OF_AGENT, AGENT_OF_COUNTRY, AGENT_OF_ORG, COREF, PARTITIVE,
    PERSON_IS_CITIZEN_OF_UNKNOWN_ACTOR, UNLABELED_LOC, UNLABELED_PERSON,
};
use crate::ids::MentionUid;
use crate::pairs::{is_highly_confident, PairMap, PairedActor};

const PERSONAL_PRONOUNS: [&str; 5] = ["he", "him", "his", "she", "her"];

/// Agressividade de uma passada de correferência.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CorefPass {
    /// Só menções fortemente ligadas à entidade (nomes, apostos, títulos, "who").
    Conservative,
    /// Também pronomes pessoais de baixa confiança.
    Pronouns,
    /// Qualquer menção da entidade.
    Full,
}

/// Pontuação de uma menção correferente como fonte do ator copiado.
fn coref_score(target: MentionUid, source: &Mention) -> i32 {
    let mut score = 0;
    if source.mention_type == MentionType::Name {
        score += 10_000;
    }
    if source.uid.sentence == target.sentence {
        score += 2_000;
    } else if source.uid.sentence < target.sentence {
        score += 1_000;
    }
    if source.mention_type == MentionType::Desc {
        score += 100;
    }
    if source.uid.sentence < target.sentence {
        let distance = (target.sentence - source.uid.sentence).min(8) as i32;
        score += 10 - distance;
    }
    score
}

impl ActorMentionFinder {
    fn qualifies_for_coref(&self, sent: &Sentence, mention: &Mention, pass: CorefPass) -> bool {
        if pass == CorefPass::Full {
            return true;
        }
        let head = sent.head_word(mention.node);
        if mention.confidence == MentionConfidence::AnyName || is_highly_confident(mention.confidence) || head == "who"
        {
            return true;
        }
        pass == CorefPass::Pronouns
            && matches!(
                mention.confidence,
                MentionConfidence::OtherPron | MentionConfidence::PrevSentDoubleSubjectPron
            )
            && PERSONAL_PRONOUNS.contains(&head.as_str())
    }

    /// Copia atores para menções correferentes.
    ///
    /// Uma menção que já tem ator só é trocada por outro compatível e melhor;
    /// um agente cujo par conhecido é um nome próprio nunca herda um
    /// composto com ator desconhecido.
    pub(crate) fn add_coreferent_actor_mentions(
        &mut self,
        scope: DocScope<'_>,
        actors: &mut ActorMentionSet,
        pass: CorefPass,
        pn_pairs: &PairMap,
    ) {
        if self.config.disable_coref {
            warn!("Correferência desligada (disable_coref); menções correferentes não serão rotuladas");
            return;
        }
        if self.config.verbosity > 0 {
            info!("  Adicionando menções de atores correferentes ({pass:?})");
        }
        let doc = scope.doc;
        let mut new_mentions = Vec::new();
        for sentno in 0..scope.limit {
            let sent = doc.sentence(sentno);
            for mention in &sent.mentions {
                let existing = actors.find(mention.uid);
                if existing.map(ActorMention::is_proper_noun).unwrap_or(false) {
                    continue;
                }
                let Some(entity) = doc.entity_of(mention.uid) else {
                    continue;
                };
                if !self.qualifies_for_coref(sent, mention, pass) {
                    continue;
                }
                let knows_proper_noun_pair = self
                    .find_actor_for_agent(scope, mention.uid, pn_pairs)
                    .map(|p| p.actor_mention.is_proper_noun())
                    .unwrap_or(false);

                let mut best: Option<&ActorMention> = None;
                let mut best_score = 0;
                for &other in &entity.mentions {
                    if other.sentence >= scope.limit {
                        continue;
                    }
                    let Some(candidate) = actors.find(other) else {
                        continue;
                    };
                    if let Some(existing) = existing {
                        if !self.is_compatible_and_better(scope, existing, candidate) {
                            continue;
                        }
                    }
                    if candidate.is_unpaired_composite() && knows_proper_noun_pair {
                        continue;
                    }
                    let mut score = coref_score(mention.uid, doc.mention(other));
                    if candidate.is_proper_noun() {
                        score += 5_000;
                    }
                    if score > best_score {
                        best = Some(candidate);
                        best_score = score;
                    }
                }

                let Some(mut chosen) = best else {
                    continue;
                };
                for &other in &entity.mentions {
                    if other.sentence >= scope.limit {
                        continue;
                    }
                    if let Some(candidate) = actors.find(other) {
                        if self.is_compatible_and_better(scope, chosen, candidate) {
                            chosen = candidate;
                        }
                    }
                }

                let copy = chosen.copy_with_new_mention(mention.uid, COREF);
                if self.config.verbosity > 1 {
                    info!(
                        "    Adicionando {copy} para \"{}\": correferente com \"{}\"",
                        sent.mention_text(mention.uid.index),
                        doc.mention_text(chosen.uid)
                    );
                }
                new_mentions.push(copy);
            }
        }
        for actor_mention in new_mentions {
            self.add_actor_mention(scope, actors, actor_mention);
        }
    }

    /// Agente conhecido por alguma menção composta da entidade (a última vence).
    pub(crate) fn agent_for_entity(
        &self,
        scope: DocScope<'_>,
        entity: &Entity,
        actors: &ActorMentionSet,
    ) -> Option<AgentIdentifiers> {
        entity
            .mentions
            .iter()
            .filter(|uid| uid.sentence < scope.limit)
            .filter_map(|&uid| actors.find(uid))
            .filter_map(ActorMention::agent)
            .last()
            .cloned()
    }

    /// Ator pareado pelos nomes próprios, ou pelos compostos quando não há.
    fn paired_actor_for<'p>(
        &self,
        scope: DocScope<'_>,
        uid: MentionUid,
        pn_pairs: &'p PairMap,
        comp_pairs: &'p PairMap,
    ) -> Option<&'p PairedActor> {
        self.find_actor_for_agent(scope, uid, pn_pairs)
            .or_else(|| self.find_actor_for_agent(scope, uid, comp_pairs))
    }

    /// Rotula as pessoas sem ator.
    ///
    /// Pareada com um país, a pessoa vira cidadã desse país (ou o agente
    /// conhecido da entidade); pareada com organização ou composto, herda o
    /// ator pareado. Com `allow_unknowns`, as demais viram cidadãs de um
    /// ator desconhecido, exceto partitivos.
    pub(crate) fn label_people(
        &mut self,
        scope: DocScope<'_>,
        actors: &mut ActorMentionSet,
        pn_pairs: &PairMap,
        comp_pairs: &PairMap,
        allow_unknowns: bool,
    ) {
        if self.config.verbosity > 0 {
            info!("  Adicionando menções padrão de pessoas");
        }
        let doc = scope.doc;
        let info = self.actor_info.clone();
        for entity in doc.entities() {
            if entity.entity_type != EntityType::Per {
                continue;
            }
            let agent = self
                .agent_for_entity(scope, entity, actors)
                .or_else(|| self.default_person_agent());

            for &uid in &entity.mentions {
                if uid.sentence >= scope.limit || actors.contains(uid) {
                    continue;
                }
                let mention = doc.mention(uid);
                let paired = self.paired_actor_for(scope, uid, pn_pairs, comp_pairs);

                let mut pattern = PERSON_IS_CITIZEN_OF_UNKNOWN_ACTOR;
                let mut actor_mention = None;
                if let Some(paired) = paired {
                    pattern = paired.pattern_label.as_str();
                    let source = &paired.actor_mention;
                    if let Some(actor) = source.actor() {
                        if info.is_a_country(actor.id) {
                            actor_mention = agent.clone().map(|agent| {
                                ActorMention::composite(uid, UNLABELED_PERSON, agent, Some(actor.clone()), &paired.pattern_label)
                                    .with_note(AGENT_OF_COUNTRY)
                            });
                        } else if !info.is_an_individual(actor.id) && !paired.temporary {
                            actor_mention =
                                Some(source.copy_with_new_mention(uid, &format!("{AGENT_OF_ORG}:{UNLABELED_PERSON}")));
                        }
                    } else if source.is_composite() && !paired.temporary {
                        // <X de Y de Z> vira <X de Z>
                        actor_mention =
                            Some(source.copy_with_new_mention(uid, &format!("{AGENT_OF_AGENT}:{UNLABELED_PERSON}")));
                    }
                }

                let actor_mention = match actor_mention {
                    Some(actor_mention) => actor_mention,
                    None => {
                        if !allow_unknowns {
                            continue;
                        }
                        if mention.mention_type == MentionType::Part {
                            if self.config.verbosity > 1 {
                                info!(
                                    "    Sem cidadão padrão para \"{}\": é partitivo",
                                    doc.mention_text(uid)
                                );
                            }
                            continue;
                        }
                        let Some(agent) = agent.clone() else {
                            continue;
                        };
                        pattern = PERSON_IS_CITIZEN_OF_UNKNOWN_ACTOR;
                        ActorMention::composite(uid, UNLABELED_PERSON, agent, None, PERSON_IS_CITIZEN_OF_UNKNOWN_ACTOR)
                    }
                };
                if self.config.verbosity > 1 {
                    info!(
                        "    Adicionando {actor_mention} para \"{}\": pessoa sem rótulo, padrão {pattern}",
                        doc.mention_text(uid)
                    );
                }
                self.add_actor_mention(scope, actors, actor_mention);
            }
        }
    }

    /// Propaga atores das menções para os partitivos que as contêm.
    pub(crate) fn label_partitive_mentions(&mut self, scope: DocScope<'_>, actors: &mut ActorMentionSet) {
        if self.config.verbosity > 0 {
            info!("  Adicionando menções de atores partitivas");
        }
        let doc = scope.doc;
        let mut new_mentions = Vec::new();
        for source in actors.iter() {
            let Some(parent) = doc.mention(source.uid).parent else {
                continue;
            };
            let target = doc.sentence(source.uid.sentence).mention(parent);
            if target.mention_type != MentionType::Part || target.uid.sentence >= scope.limit {
                continue;
            }
            if let Some(old) = actors.find(target.uid) {
                if !self.is_compatible_and_better(scope, old, source) {
                    continue;
                }
            }
            let copy = source.copy_with_new_mention(target.uid, PARTITIVE);
            if self.config.verbosity > 1 {
                info!(
                    "    Adicionando {copy} para \"{}\": partitivo de \"{}\"",
                    doc.mention_text(target.uid),
                    doc.mention_text(source.uid)
                );
            }
            new_mentions.push(copy);
        }
        for actor_mention in new_mentions {
            self.add_actor_mention(scope, actors, actor_mention);
        }
    }

    /// Locais e instalações sem ator: primeiro o ator pareado, depois o país padrão.
    pub(crate) fn label_locations_and_facilities(
        &mut self,
        scope: DocScope<'_>,
        actors: &mut ActorMentionSet,
        default: &ActorMention,
        pn_pairs: &PairMap,
        comp_pairs: &PairMap,
        blocked: &BTreeMap<MentionUid, String>,
    ) {
        if default.actor().is_none() {
            return;
        }
        if self.config.verbosity > 0 {
            info!("  Adicionando menções padrão de locais e instalações");
        }
        let doc = scope.doc;
        let info = self.actor_info.clone();
        for entity in doc.entities() {
            if !matches!(entity.entity_type, EntityType::Loc | EntityType::Fac) {
                continue;
            }
            let known_agent = self.agent_for_entity(scope, entity, actors);

            for &uid in &entity.mentions {
                if uid.sentence >= scope.limit {
                    continue;
                }
                if let Some(label) = blocked.get(&uid) {
                    if self.config.verbosity > 3 {
                        info!(
                            "    * País padrão bloqueado para local/instalação: \"{}\"\n        Bloqueado pelo padrão \"{label}\"",
                            doc.mention_text(uid)
                        );
                    }
                    continue;
                }
                if actors.contains(uid) {
                    continue;
                }

                let mut paired = self.find_actor_for_agent(scope, uid, pn_pairs);
                if paired.map(|p| p.temporary).unwrap_or(true) {
                    paired = self.find_actor_for_agent(scope, uid, comp_pairs);
                }
                let from_pair = paired.filter(|p| !p.temporary).and_then(|p| {
                    let source = &p.actor_mention;
                    match source.actor() {
                        Some(actor) if info.is_a_country(actor.id) => Some(match &known_agent {
                            Some(agent) => ActorMention::composite(
                                uid,
                                &format!("{AGENT_OF_COUNTRY}:{UNLABELED_LOC}-BUT-KNOWN-AGENT"),
                                agent.clone(),
                                Some(actor.clone()),
                                &p.pattern_label,
                            ),
                            None => source.copy_with_new_mention(uid, &format!("{AGENT_OF_COUNTRY}:{UNLABELED_LOC}")),
                        }),
                        Some(actor) if !info.is_an_individual(actor.id) => {
                            Some(source.copy_with_new_mention(uid, &format!("{AGENT_OF_ORG}:{UNLABELED_LOC}")))
                        }
                        Some(_) => None,
                        None if source.is_composite() => {
                            Some(source.copy_with_new_mention(uid, &format!("{AGENT_OF_AGENT}:{UNLABELED_LOC}")))
                        }
                        None => None,
                    }
                });
                let actor_mention = from_pair.unwrap_or_else(|| default.copy_with_new_mention(uid, UNLABELED_LOC));
                if self.config.verbosity > 1 {
                    info!(
                        "    Adicionando {actor_mention} para \"{}\": local ou instalação sem rótulo",
                        doc.mention_text(uid)
                    );
                }
                self.add_actor_mention(scope, actors, actor_mention);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DocumentBuilder;
    use crate::document::Document;
    use crate::fixtures;
    use crate::ids::ActorId;

    fn pn(finder: &ActorMentionFinder, uid: MentionUid, actor: ActorId) -> ActorMention {
        ActorMention::proper_noun(uid, "ACTOR_PATTERN", finder.actor_identifiers(actor))
    }

    fn police(uid: MentionUid) -> ActorMention {
        let agent = AgentIdentifiers::new(fixtures::POLICE, "Police".into(), Some("COP".into()), None);
        ActorMention::composite(uid, "AGENT_PATTERN", agent, None, "UNKNOWN-ACTOR")
    }

    /// "Kenya voted" / "the country rejoiced" / "it celebrated".
    fn kenya_document(confidence: MentionConfidence) -> (Document, Vec<MentionUid>) {
        let mut b = DocumentBuilder::new("d");
        let s0 = b.sentence("Kenya voted");
        let kenya = b.mention(s0, 0, 0, EntityType::Gpe, MentionType::Name).unwrap();
        let s1 = b.sentence("the country rejoiced");
        let country = b.mention(s1, 0, 1, EntityType::Gpe, MentionType::Desc).unwrap();
        b.confidence(country, confidence);
        let s2 = b.sentence("it celebrated");
        let it = b.mention(s2, 0, 0, EntityType::Gpe, MentionType::Pron).unwrap();
        b.entity(&[kenya, country, it]);
        (b.build(), vec![kenya, country, it])
    }

    #[test]
    fn test_conservative_pass_requires_confident_mentions() {
        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let (doc, uids) = kenya_document(MentionConfidence::Unknown);
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, uids[0], fixtures::KENYA));
        finder.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Conservative, &PairMap::new());
        assert_eq!(actors.len(), 1);

        let (doc, uids) = kenya_document(MentionConfidence::OnlyOneCandidateDesc);
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, uids[0], fixtures::KENYA));
        finder.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Conservative, &PairMap::new());
        let copied = actors.find(uids[1]).unwrap();
        assert_eq!(copied.actor_id(), Some(fixtures::KENYA));
        assert_eq!(copied.provenance(), "COREF:ACTOR_PATTERN");
        assert!(actors.find(uids[2]).is_none());
    }

    #[test]
    fn test_full_pass_reaches_every_mention() {
        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let (doc, uids) = kenya_document(MentionConfidence::Unknown);
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, uids[0], fixtures::KENYA));
        finder.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Full, &PairMap::new());
        assert_eq!(actors.len(), 3);
        assert_eq!(actors.find(uids[2]).and_then(|m| m.actor_id()), Some(fixtures::KENYA));
    }

    #[test]
    fn test_pronoun_pass_takes_personal_pronouns_only() {
        let mut b = DocumentBuilder::new("d");
        let s0 = b.sentence("Ruto spoke");
        let ruto = b.mention(s0, 0, 0, EntityType::Per, MentionType::Name).unwrap();
        let s1 = b.sentence("he said");
        let he = b.mention(s1, 0, 0, EntityType::Per, MentionType::Pron).unwrap();
        b.confidence(he, MentionConfidence::OtherPron);
        b.entity(&[ruto, he]);
        let doc = b.build();

        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, ruto, fixtures::RUTO));
        finder.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Conservative, &PairMap::new());
        assert!(actors.find(he).is_none());
        finder.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Pronouns, &PairMap::new());
        assert_eq!(actors.find(he).and_then(|m| m.actor_id()), Some(fixtures::RUTO));
    }

    #[test]
    fn test_name_outranks_descriptor() {
        let mut b = DocumentBuilder::new("d");
        let s0 = b.sentence("Ruto arrived");
        let ruto = b.mention(s0, 0, 0, EntityType::Per, MentionType::Name).unwrap();
        let s1 = b.sentence("the officer waved");
        let officer = b.mention(s1, 0, 1, EntityType::Per, MentionType::Desc).unwrap();
        let s2 = b.sentence("he left");
        let he = b.mention(s2, 0, 0, EntityType::Per, MentionType::Pron).unwrap();
        b.entity(&[ruto, officer, he]);
        let doc = b.build();

        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, ruto, fixtures::RUTO));
        actors.add(police(officer));
        finder.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Full, &PairMap::new());
        assert_eq!(actors.find(he).and_then(|m| m.actor_id()), Some(fixtures::RUTO));
        // o composto existente não é trocado por um nome próprio de outro setor
        assert!(actors.find(officer).unwrap().is_composite());
    }

    #[test]
    fn test_unpaired_agent_upgraded_by_coreferent_pair() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("police and officers");
        let first = b.mention(s, 0, 0, EntityType::Org, MentionType::Desc).unwrap();
        let second = b.mention(s, 2, 2, EntityType::Org, MentionType::Desc).unwrap();
        b.entity(&[first, second]);
        let doc = b.build();

        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let kenya = finder.actor_identifiers(fixtures::KENYA);
        let mut actors = ActorMentionSet::new();
        actors.add(police(first));
        actors.add(police(second).with_paired_actor(kenya, "ACTOR_PATTERN"));
        finder.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Full, &PairMap::new());
        let upgraded = actors.find(first).unwrap();
        assert_eq!(upgraded.paired_actor_id(), Some(fixtures::KENYA));
        assert!(upgraded.has_note(COREF));
    }

    #[test]
    fn test_disabled_coref_is_a_no_op() {
        let mut config = fixtures::config();
        config.disable_coref = true;
        let mut finder = fixtures::finder(config).unwrap();
        let (doc, uids) = kenya_document(MentionConfidence::AppositiveDesc);
        let scope = DocScope::new(&doc, finder.config());
        let mut actors = ActorMentionSet::new();
        actors.add(pn(&finder, uids[0], fixtures::KENYA));
        finder.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Full, &PairMap::new());
        assert_eq!(actors.len(), 1);
    }

    #[test]
    fn test_label_people() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("a Kenyan protester and a bystander");
        let protester = b.mention_with_head(s, 0, 2, 2, EntityType::Per, MentionType::Desc).unwrap();
        let kenyan = b.mention(s, 1, 1, EntityType::Gpe, MentionType::Name).unwrap();
        let bystander = b.mention_with_head(s, 4, 5, 5, EntityType::Per, MentionType::Desc).unwrap();
        b.entity(&[protester]);
        b.entity(&[kenyan]);
        b.entity(&[bystander]);
        let doc = b.build();

        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let mut pairs = PairMap::new();
        pairs.insert(protester, PairedActor::new(pn(&finder, kenyan, fixtures::KENYA), "nested", false));
        let mut actors = ActorMentionSet::new();

        finder.label_people(scope, &mut actors, &pairs, &PairMap::new(), false);
        let citizen = actors.find(protester).unwrap();
        assert_eq!(citizen.agent_id(), Some(fixtures::CITIZEN));
        assert_eq!(citizen.paired_actor_id(), Some(fixtures::KENYA));
        assert!(citizen.has_note(AGENT_OF_COUNTRY));
        assert!(actors.find(bystander).is_none());

        finder.label_people(scope, &mut actors, &pairs, &PairMap::new(), true);
        let unknown = actors.find(bystander).unwrap();
        assert!(unknown.is_unpaired_composite());
        assert_eq!(unknown.pattern_name(), Some(PERSON_IS_CITIZEN_OF_UNKNOWN_ACTOR));
    }

    #[test]
    fn test_partitive_inherits_child_actor() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("some of the soldiers");
        let some = b.mention_with_head(s, 0, 3, 0, EntityType::Per, MentionType::Part).unwrap();
        let soldiers = b.mention(s, 2, 3, EntityType::Per, MentionType::Desc).unwrap();
        b.link(some, soldiers).unwrap();
        b.entity(&[some]);
        b.entity(&[soldiers]);
        let doc = b.build();

        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let kenya = finder.actor_identifiers(fixtures::KENYA);
        let mut actors = ActorMentionSet::new();
        actors.add(police(soldiers).with_paired_actor(kenya, "DEFAULT-COUNTRY"));
        finder.label_partitive_mentions(scope, &mut actors);
        let partitive = actors.find(some).unwrap();
        assert_eq!(partitive.paired_actor_id(), Some(fixtures::KENYA));
        assert!(partitive.has_note(PARTITIVE));
    }

    #[test]
    fn test_locations_fall_back_to_default_country() {
        let mut b = DocumentBuilder::new("d");
        let s0 = b.sentence("Kenya closed the border");
        let kenya = b.mention(s0, 0, 0, EntityType::Gpe, MentionType::Name).unwrap();
        let border = b.mention(s0, 2, 3, EntityType::Loc, MentionType::Desc).unwrap();
        let s1 = b.sentence("the camp stayed open");
        let camp = b.mention(s1, 0, 1, EntityType::Fac, MentionType::Desc).unwrap();
        b.entity(&[kenya]);
        b.entity(&[border]);
        b.entity(&[camp]);
        let doc = b.build();

        let mut finder = fixtures::finder(fixtures::config()).unwrap();
        let scope = DocScope::new(&doc, finder.config());
        let default = pn(&finder, kenya, fixtures::KENYA);
        let mut actors = ActorMentionSet::new();
        actors.add(default.clone());
        let mut blocked = BTreeMap::new();
        blocked.insert(camp, "FOREIGN".to_string());
        let empty = PairMap::new();

        finder.label_locations_and_facilities(scope, &mut actors, &default, &empty, &empty, &blocked);
        let border_actor = actors.find(border).unwrap();
        assert_eq!(border_actor.actor_id(), Some(fixtures::KENYA));
        assert!(border_actor.has_note(UNLABELED_LOC));
        assert!(actors.find(camp).is_none());

        let once = actors.clone();
        finder.label_locations_and_facilities(scope, &mut actors, &default, &empty, &empty, &blocked);
        assert_eq!(actors, once);
    }
}
