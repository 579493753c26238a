//! # Localizador de Menções de Atores: Orquestrador com Eventos Observáveis
//!
//! O [`ActorMentionFinder`] recebe um [`Document`] já analisado (árvores,
//! menções e entidades) e decide, para cada menção de entidade, qual ator ou
//! agente ela representa. O resultado é um [`ActorMentionSet`] com no máximo
//! uma [`ActorMention`] por menção.
//!
//! O processamento é uma sequência fixa de passes sobre um conjunto mutável,
//! cada um implementado num módulo próprio:
//!
//! | passe                                   | módulo                              |
//! |-----------------------------------------|-------------------------------------|
//! | atores por nome próprio e locais        | [`candidates`](crate::candidates), [`locations`](crate::locations) |
//! | país padrão e contagens de países       | [`default_country`](crate::default_country) |
//! | pares agente/ator                       | [`pairs`](crate::pairs)             |
//! | atores compostos                        | [`composite`](crate::composite)     |
//! | correferência, pessoas, locais, partitivos | [`coref`](crate::coref)          |
//!
//! Como o pipeline NER, o localizador emite eventos ([`FinderEvent`]) por um
//! canal `mpsc` ao fim de cada passe, o que permite ao servidor web transmitir
//! o progresso em tempo real.
//!
//! ## Estado
//!
//! Configuração e recursos (matchers, padrões, gazetteer) são compartilhados e
//! somente leitura. As contagens de países, os mapas de países e cidades e os
//! casamentos por sentença do modo ACTOR_MATCH pertencem ao documento corrente
//! e são limpos no início de cada documento. Uma instância processa um
//! documento por vez; para paralelismo, veja [`batch`](crate::batch).

use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::actor_info::ActorInfo;
use crate::actor_mention::{ActorIdentifiers, ActorMention, AgentIdentifiers};
use crate::actor_mention_set::{sort_candidates, ActorMentionSet, CountryCounts, ScoredActorMention};
use crate::config::{FinderConfig, FinderMode};
use crate::coref::CorefPass;
use crate::document::{Document, EntityType, MentionType, Number};
use crate::error::{IcewsError, Result};
use crate::gazetteer::Gazetteer;
use crate::ids::ActorId;
use crate::location_resolver::LocationMentionResolver;
use crate::pairs::{PairKind, PairMap};
use crate::pattern::PatternMatcher;
use crate::token_matcher::{
    ActorMatch, ActorTokenMatcher, AgentTokenMatcher, CompositeActorTokenMatcher, MatchesBySentence,
};

pub(crate) const COMPONENT: &str = "ActorMentionFinder::process";

// Notas de proveniência.
pub const UNKNOWN_ACTOR: &str = "UNKNOWN-ACTOR";
pub const TEMPORARY_ACTOR_MENTION: &str = "TEMPORARY_ACTOR_MENTION";
pub const NESTED_ACTOR_PATTERN_MATCH: &str = "NESTED-ACTOR-PATTERN-MATCH";
pub const ACTOR_PATTERN: &str = "ACTOR_PATTERN";
pub const AGENT_PATTERN: &str = "AGENT_PATTERN";
pub const AGENT_OF_AGENT_PATTERN: &str = "AGENT-OF-AGENT:AGENT_PATTERN";
pub const COMPOSITE_ACTOR_PATTERN: &str = "COMPOSITE_ACTOR_PATTERN";
pub const CITIZEN_OF_COUNTRY: &str = "CITIZEN_OF_COUNTRY:ACTOR_PATTERN";
pub const PERSON_IS_CITIZEN_OF_COUNTRY: &str = "PER-COUNTRY-IS-CITIZEN-OF-COUNTRY";
pub const PERSON_IS_CITIZEN_OF_UNKNOWN_ACTOR: &str = "PERSON-IS-CITIZEN-OF-UNKNOWN-ACTOR";
pub const GAZETTEER: &str = "GAZETTEER";
pub const UNAMBIGUOUS_GAZETTEER: &str = "UNAMBIGUOUS_GAZETTEER";
pub const UNLABELED_PERSON: &str = "UNLABELED_PERSON";
pub const COUNTRY_RESTRICTION_APPLIED: &str = "COUNTRY_RESTRICTION_APPLIED";
pub const COMPOSITE_ACTOR_IS_PAIRED_ACTOR: &str = "COMPOSITE_ACTOR_IS_PAIRED_ACTOR";
pub const LOCAL_COMPOSITE_ACRONYM: &str = "LOCAL_COMPOSITE_ACRONYM";
pub const LOCAL_PROPER_NOUN_ACRONYM: &str = "LOCAL_PROPER_NOUN_ACRONYM";
pub const PATTERN_END_IS_NOT_MENTION_END: &str = "PATTERN_END_IS_NOT_MENTION_END";
pub const US_CITY: &str = "US_CITY";
pub const DEFAULT_COUNTRY: &str = "DEFAULT-COUNTRY";
pub const NON_DEFAULT_COUNTRY_IN_SENTENCE: &str = "NON_DEFAULT_COUNTRY_IN_SENTENCE";
pub const HAS_UNKNOWN_ACTOR: &str = "HAS_UNKNOWN_ACTOR";
pub const PLURAL: &str = "PLURAL";
pub const EXPLICIT_LINK_TO_COUNTRY: &str = "EXPLICIT-LINK-TO-COUNTRY";
pub const COREF: &str = "COREF";
pub const PARTITIVE: &str = "PARTITIVE";
pub const UNLABELED_LOC: &str = "UNLABELED-LOC";
pub const AGENT_OF_COUNTRY: &str = "AGENT-OF-COUNTRY";
pub const AGENT_OF_ORG: &str = "AGENT-OF-ORG";
pub const AGENT_OF_AGENT: &str = "AGENT-OF-AGENT";
/// Código especial: o padrão casado bloqueia a menção.
pub const BLOCK_ACTOR: &str = "BLOCK_ACTOR";

pub(crate) const USA_CODE: &str = "USA";

/// Eventos emitidos durante o processamento de um documento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FinderEvent {
    /// Um passe terminou; `actor_mentions` é o tamanho do conjunto até aqui.
    PassFinished { pass: String, actor_mentions: usize },
    /// País padrão escolhido para o documento (ou nenhum).
    DefaultCountry { actor: Option<ActorIdentifiers> },
    /// Conclusão com o conjunto final.
    Done {
        document: String,
        actor_mentions: Vec<ActorMention>,
        processing_ms: u64,
    },
    /// Falha irrecuperável.
    Error { message: String },
}

/// Estatísticas acumuladas pela instância, registradas ao descartá-la.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinderStats {
    pub documents: usize,
    pub sentences: usize,
    /// Quantas menções compostas cada padrão de par produziu.
    pub agent_pattern_counts: BTreeMap<String, usize>,
    /// Frequência de setores (só com `log_sector_freqs`).
    pub sector_counts: BTreeMap<String, usize>,
}

/// Documento corrente e seus limites, passado a todos os passes.
#[derive(Clone, Copy)]
pub(crate) struct DocScope<'a> {
    pub doc: &'a Document,
    /// Sentenças `0..limit` são processadas.
    pub limit: usize,
    pub date: Option<&'a str>,
}

impl<'a> DocScope<'a> {
    pub(crate) fn new(doc: &'a Document, config: &FinderConfig) -> Self {
        Self {
            doc,
            limit: config.sentence_limit(doc.sentence_count()),
            date: doc.publication_date.as_deref(),
        }
    }
}

/// O localizador de menções de atores.
pub struct ActorMentionFinder {
    pub(crate) config: FinderConfig,
    pub(crate) actor_info: Arc<dyn ActorInfo>,
    pub(crate) resolver: LocationMentionResolver,
    pub(crate) actor_matcher: ActorTokenMatcher,
    pub(crate) agent_matcher: Option<AgentTokenMatcher>,
    pub(crate) composite_matcher: Option<CompositeActorTokenMatcher>,
    pub(crate) pair_patterns: Option<Arc<dyn PatternMatcher>>,
    pub(crate) block_patterns: Option<Arc<dyn PatternMatcher>>,
    pub(crate) agent_name_patterns: Option<Arc<dyn PatternMatcher>>,
    pub(crate) usa_actor: Option<ActorId>,
    pub(crate) non_contributing: HashSet<ActorId>,
    pub(crate) country_counts: CountryCounts,
    pub(crate) country_actors: BTreeMap<ActorId, ActorMention>,
    pub(crate) city_actors: BTreeMap<ActorId, ActorMention>,
    pub(crate) sentence_matches: MatchesBySentence<ActorMatch>,
    pub(crate) stats: FinderStats,
}

impl ActorMentionFinder {
    /// Cria o localizador com os recursos obrigatórios.
    ///
    /// Matchers de agentes, atores compostos e conjuntos de padrões são
    /// opcionais e entram pelos métodos `with_*`.
    pub fn new(
        config: FinderConfig,
        actor_info: Arc<dyn ActorInfo>,
        gazetteer: Arc<dyn Gazetteer>,
        actor_matcher: ActorTokenMatcher,
    ) -> Result<Self> {
        config.validate()?;
        let resolver = LocationMentionResolver::new(gazetteer)
            .with_max_ambiguity(config.max_ambiguity_for_gazetteer_actors)
            .with_verbosity(config.verbosity);
        let usa_actor = actor_info.actor_by_code(USA_CODE);
        let mut non_contributing = HashSet::new();
        for code in &config.actors_not_contributing_to_country_counts {
            match actor_info.actor_by_code(code) {
                Some(id) => {
                    non_contributing.insert(id);
                }
                None => warn!("Código de ator desconhecido em actors_not_contributing_to_country_counts: {code}"),
            }
        }
        if config.verbosity > 0 {
            info!(
                "ActorMentionFinder criado no modo {} ({} padrões de atores)",
                config.mode.name(),
                actor_matcher.pattern_count()
            );
        }
        Ok(Self {
            config,
            actor_info,
            resolver,
            actor_matcher,
            agent_matcher: None,
            composite_matcher: None,
            pair_patterns: None,
            block_patterns: None,
            agent_name_patterns: None,
            usa_actor,
            non_contributing,
            country_counts: CountryCounts::new(),
            country_actors: BTreeMap::new(),
            city_actors: BTreeMap::new(),
            sentence_matches: Vec::new(),
            stats: FinderStats::default(),
        })
    }

    pub fn with_agent_matcher(mut self, matcher: AgentTokenMatcher) -> Self {
        self.agent_matcher = Some(matcher);
        self
    }

    pub fn with_composite_matcher(mut self, matcher: CompositeActorTokenMatcher) -> Self {
        self.composite_matcher = Some(matcher);
        self
    }

    /// Padrões que pareiam uma menção agente (`AGENT`) com uma menção ator (`ACTOR`).
    pub fn with_pair_patterns(mut self, patterns: Arc<dyn PatternMatcher>) -> Self {
        self.pair_patterns = Some(patterns);
        self
    }

    /// Padrões cujo retorno `BLOCK` impede a atribuição do país padrão.
    pub fn with_block_patterns(mut self, patterns: Arc<dyn PatternMatcher>) -> Self {
        self.block_patterns = Some(patterns);
        self
    }

    /// Padrões cujo último retorno nomeia o agente da menção.
    pub fn with_agent_name_patterns(mut self, patterns: Arc<dyn PatternMatcher>) -> Self {
        self.agent_name_patterns = Some(patterns);
        self
    }

    /// Regras manuais de locais (`padrão<TAB>alvo`).
    pub fn with_location_rules(mut self, rules: &str) -> Result<Self> {
        let count = self.resolver.load_rules(rules)?;
        if self.config.verbosity > 0 {
            info!("Carregadas {count} regras de locais");
        }
        Ok(self)
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    pub fn stats(&self) -> &FinderStats {
        &self.stats
    }

    /// Processa um documento inteiro (modo ICEWS).
    pub fn process(&mut self, doc: &Document) -> Result<ActorMentionSet> {
        self.run(doc, None)
    }

    /// Processa emitindo um [`FinderEvent`] ao fim de cada passe.
    ///
    /// O último evento é sempre `Done` ou `Error`.
    pub fn process_streaming(&mut self, doc: &Document, tx: &mpsc::Sender<FinderEvent>) -> Result<ActorMentionSet> {
        let start = Instant::now();
        match self.run(doc, Some(tx)) {
            Ok(actors) => {
                let _ = tx.send(FinderEvent::Done {
                    document: doc.name.clone(),
                    actor_mentions: actors.all(),
                    processing_ms: duration_ms(start.elapsed()),
                });
                Ok(actors)
            }
            Err(err) => {
                let _ = tx.send(FinderEvent::Error {
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Limpa o estado por documento (contagens, casamentos, cache de locais).
    pub fn reset_for_new_document(&mut self) {
        self.resolver.clear();
        self.country_counts.clear();
        self.country_actors.clear();
        self.city_actors.clear();
        self.sentence_matches.clear();
    }

    fn run(&mut self, doc: &Document, events: Option<&mpsc::Sender<FinderEvent>>) -> Result<ActorMentionSet> {
        if self.config.verbosity > 0 {
            info!("=== Procurando menções de atores em {} ===", doc.name);
        }
        if doc.entities.is_none() {
            return Err(IcewsError::input(
                COMPONENT,
                "o documento não passou pela resolução de entidades",
            ));
        }
        if self.config.mode != FinderMode::Icews {
            return Err(IcewsError::input(
                COMPONENT,
                format!("este passe só roda no modo ICEWS (modo atual: {})", self.config.mode.name()),
            ));
        }
        doc.validate()?;

        match doc.publication_date.as_deref() {
            None => warn!("Nenhuma data de publicação para \"{}\"", doc.name),
            Some(date) if self.config.verbosity > 1 => info!("  Data de publicação: \"{date}\""),
            Some(_) => {}
        }

        self.reset_for_new_document();
        let scope = DocScope::new(doc, &self.config);
        let mut actors = ActorMentionSet::new();

        let unused = self.find_proper_noun_actor_mentions(scope, &mut actors);
        emit(events, "proper_noun_actors", &actors);

        let default_country = self.default_country_actor_mention(scope, &actors);
        if let Some(tx) = events {
            let _ = tx.send(FinderEvent::DefaultCountry {
                actor: default_country.as_ref().and_then(|m| m.actor().cloned()),
            });
        }

        let unknown_pairs = self.find_actor_pairs(scope, &actors, PairKind::Unknown, None);
        let blocked = match default_country {
            Some(_) => self.find_mentions_that_block_default_paired_actor(scope, &actors)?,
            None => BTreeMap::new(),
        };

        self.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Conservative, &PairMap::new());
        emit(events, "coref_names", &actors);

        let pn_pairs = self.find_actor_pairs(scope, &actors, PairKind::ProperNoun, Some(&unused));
        self.find_composite_actor_mentions(scope, &mut actors, &pn_pairs);
        emit(events, "composite_actors", &actors);

        self.add_explicit_locations(scope, &mut actors, &pn_pairs);
        self.find_local_acronym_composite_actor_mentions(scope, &mut actors);

        self.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Pronouns, &pn_pairs);
        emit(events, "coref_agents", &actors);

        let comp_pairs = self.find_actor_pairs(scope, &actors, PairKind::Composite, None);
        self.label_people(scope, &mut actors, &pn_pairs, &comp_pairs, false);

        if self.config.runs_full_coref_pass() {
            self.add_coreferent_actor_mentions(scope, &mut actors, CorefPass::Full, &pn_pairs);
            emit(events, "coref_full", &actors);
        }

        if let Some(default) = &default_country {
            self.assign_default_country_for_unknown_paired_actors(scope, &mut actors, default, &unknown_pairs, &pn_pairs, &blocked);
        }

        self.find_composite_actor_mentions(scope, &mut actors, &comp_pairs);
        self.label_people(scope, &mut actors, &pn_pairs, &comp_pairs, true);
        self.label_partitive_mentions(scope, &mut actors);
        emit(events, "people_and_partitives", &actors);

        if let Some(default) = &default_country {
            self.assign_default_country_for_unknown_paired_actors(scope, &mut actors, default, &unknown_pairs, &pn_pairs, &blocked);
            self.label_locations_and_facilities(scope, &mut actors, default, &pn_pairs, &comp_pairs, &blocked);
            emit(events, "default_country", &actors);
        }

        self.discard_bare_actor_mentions(scope, &mut actors);
        self.force_actor_mention_creation(scope, &mut actors);
        emit(events, "cleanup", &actors);

        if self.config.verbosity > 0 {
            info!("  Encontradas {} menções de atores em {}", actors.len(), doc.name);
        }
        if self.config.log_sector_freqs {
            self.count_sectors(&actors);
        }
        self.stats.documents += 1;
        self.stats.sentences += scope.limit;
        Ok(actors)
    }

    fn count_sectors(&mut self, actors: &ActorMentionSet) {
        for mention in actors.iter() {
            let sectors = if let Some(actor) = mention.actor() {
                self.actor_info.actor_sector_codes(actor.id)
            } else if let Some(agent) = mention.agent() {
                self.actor_info.agent_sector_codes(agent.id)
            } else {
                Vec::new()
            };
            for sector in sectors {
                *self.stats.sector_counts.entry(sector).or_default() += 1;
            }
        }
    }

    // ------------------------------------------------------------------
    // Inserção no conjunto
    // ------------------------------------------------------------------

    /// Insere respeitando os descartes de pronomes e plurais configurados.
    pub(crate) fn add_actor_mention(&mut self, scope: DocScope<'_>, actors: &mut ActorMentionSet, mut actor_mention: ActorMention) {
        let mention = scope.doc.mention(actor_mention.uid);
        let is_pronoun = mention.mention_type == MentionType::Pron;
        if self.config.discard_pronoun_actors && is_pronoun {
            if self.config.verbosity > 4 {
                info!("    Descartando menção pronominal {actor_mention}");
            }
            return;
        }
        if mention.number == Number::Plural {
            if self.config.discard_plural_actors {
                if self.config.verbosity > 4 {
                    info!("    Descartando menção plural {actor_mention}");
                }
                return;
            }
            if self.config.discard_plural_pronoun_actors && is_pronoun {
                if self.config.verbosity > 4 {
                    info!("    Descartando pronome plural {actor_mention}");
                }
                return;
            }
            actor_mention.add_note(PLURAL);
        }
        if actor_mention.is_composite() {
            if let Some(pattern) = actor_mention.pattern_name() {
                *self.stats.agent_pattern_counts.entry(pattern.to_string()).or_default() += 1;
            }
        }
        actors.add(actor_mention);
    }

    /// Atribuição gulosa: candidatos do maior para o menor score; um candidato
    /// entra se a menção está livre ou se é compatível e melhor que o atual.
    pub(crate) fn greedily_add_actor_mentions(
        &mut self,
        scope: DocScope<'_>,
        actors: &mut ActorMentionSet,
        mut candidates: Vec<ScoredActorMention>,
    ) {
        sort_candidates(&mut candidates);
        for candidate in candidates {
            if candidate.score <= 0.0 {
                if self.config.verbosity > 3 {
                    info!(
                        "    Ignorando {} com score {:.3} para \"{}\"",
                        candidate.mention,
                        candidate.score,
                        scope.doc.mention_text(candidate.mention.uid)
                    );
                }
                continue;
            }
            let accept = match actors.find(candidate.mention.uid) {
                None => {
                    self.log_actor_mention(scope, &candidate, None, true);
                    true
                }
                Some(old) => {
                    let replace = self.is_compatible_and_better(scope, old, &candidate.mention);
                    self.log_actor_mention(scope, &candidate, Some(old), replace);
                    replace
                }
            };
            if accept {
                self.add_actor_mention(scope, actors, candidate.mention);
            }
        }
    }

    fn log_actor_mention(&self, scope: DocScope<'_>, candidate: &ScoredActorMention, old: Option<&ActorMention>, accepted: bool) {
        if self.config.verbosity <= 1 {
            return;
        }
        let new = &candidate.mention;
        let text = scope.doc.mention_text(new.uid);
        match old {
            None => info!("    Adicionando {new} (score {:.3}) para \"{text}\"", candidate.score),
            Some(old) if old.actor_id() == new.actor_id() && old.agent_id() == new.agent_id() => {}
            Some(old) if accepted => info!(
                "    Substituindo {old} por {new} (score {:.3}) para \"{text}\"",
                candidate.score
            ),
            Some(old) => {
                if self.config.verbosity > 2 {
                    info!(
                        "    Conflito em \"{text}\": mantido {old}, rejeitado {new} (score {:.3})",
                        candidate.score
                    );
                }
            }
        }
    }

    /// Uma menção nova só substitui uma existente quando a existente é um
    /// agente sem ator pareado e a nova acrescenta informação compatível.
    pub(crate) fn is_compatible_and_better(&self, scope: DocScope<'_>, old: &ActorMention, new: &ActorMention) -> bool {
        if !old.is_unpaired_composite() {
            return false;
        }
        if let Some(actor) = new.actor() {
            if scope.doc.mention(old.uid).mention_type == MentionType::Pron {
                return true;
            }
            let Some(agent) = old.agent_id() else {
                return false;
            };
            let actor_sectors = self.actor_info.actor_sector_codes(actor.id);
            let agent_sectors = self.actor_info.agent_sector_codes(agent);
            return actor_sectors.iter().any(|s| agent_sectors.contains(s));
        }
        new.is_composite() && new.agent_id() == old.agent_id() && new.paired_actor_id().is_some()
    }

    /// O tipo do ator é coerente com o tipo da menção?
    pub(crate) fn entity_type_matches(&self, actor: ActorId, entity_type: EntityType) -> bool {
        let info = self.actor_info.as_ref();
        match entity_type {
            EntityType::Gpe | EntityType::Loc => info.might_be_a_location(actor),
            EntityType::Org => info.is_an_organization(actor),
            EntityType::Per => info.is_a_person(actor),
            EntityType::Fac => {
                info.is_a_facility(actor) || (self.config.allow_fac_org_matches && info.is_an_organization(actor))
            }
            _ => false,
        }
    }

    /// Identificadores completos de um ator, com nome e código da base.
    pub(crate) fn actor_identifiers(&self, actor: ActorId) -> ActorIdentifiers {
        ActorIdentifiers::new(actor, self.actor_info.actor_name(actor), self.actor_info.actor_code(actor), None)
    }

    /// O agente usado para pessoas sem agente conhecido.
    pub(crate) fn default_person_agent(&self) -> Option<AgentIdentifiers> {
        let agent = self.actor_info.default_person_agent()?;
        Some(AgentIdentifiers::new(
            agent,
            self.actor_info.agent_name(agent),
            self.actor_info.agent_code(agent),
            None,
        ))
    }

    // ------------------------------------------------------------------
    // Limpeza final
    // ------------------------------------------------------------------

    fn discard_bare_actor_mentions(&self, scope: DocScope<'_>, actors: &mut ActorMentionSet) {
        let verbosity = self.config.verbosity;
        actors.retain(|m| {
            if m.is_bare() {
                if verbosity > 1 {
                    info!("    Descartando {m} para \"{}\"", scope.doc.mention_text(m.uid));
                }
                return false;
            }
            true
        });
    }

    /// Cria menções nuas `UNKNOWN-ACTOR` para os tipos forçados que ficaram sem ator.
    fn force_actor_mention_creation(&self, scope: DocScope<'_>, actors: &mut ActorMentionSet) {
        let forced = &self.config.types_to_force_as_actor_mentions;
        if forced.is_empty() {
            return;
        }
        for sentno in 0..scope.limit {
            for mention in &scope.doc.sentence(sentno).mentions {
                let eligible = matches!(
                    mention.mention_type,
                    MentionType::Name | MentionType::Desc | MentionType::Pron
                );
                if eligible && forced.contains(&mention.entity_type) && !actors.contains(mention.uid) {
                    actors.add(ActorMention::bare(mention.uid, UNKNOWN_ACTOR));
                }
            }
        }
    }
}

impl Drop for ActorMentionFinder {
    fn drop(&mut self) {
        if self.config.verbosity == 0 || self.stats.documents == 0 {
            return;
        }
        info!(
            "ActorMentionFinder: {} documentos, {} sentenças",
            self.stats.documents, self.stats.sentences
        );
        for (pattern, count) in &self.stats.agent_pattern_counts {
            info!("  padrão {pattern}: {count}");
        }
        for (sector, count) in &self.stats.sector_counts {
            info!("  setor {sector}: {count}");
        }
    }
}

/// Milissegundos de uma duração, saturando em `u64::MAX`.
pub fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn emit(events: Option<&mpsc::Sender<FinderEvent>>, pass: &str, actors: &ActorMentionSet) {
    if let Some(tx) = events {
        let _ = tx.send(FinderEvent::PassFinished {
            pass: pass.to_string(),
            actor_mentions: actors.len(),
        });
    }
}
