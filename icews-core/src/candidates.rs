//! # Candidatos por Nome Próprio
//!
//! Cada casamento do [`ActorTokenMatcher`] vira um candidato pontuado ligado
//! à menção NAME/DESC que cobre o intervalo casado. O score combina:
//!
//! | sinal                                   | efeito                    |
//! |-----------------------------------------|---------------------------|
//! | intervalo idêntico ao núcleo da menção  | +15 (só o fim: +5)        |
//! | casamento fora do núcleo                | −5                        |
//! | peso e comprimento do padrão            | soma direta               |
//! | país em menção GPE / LOC                | +5 / +3                   |
//! | indivíduo em menção PER                 | +3                        |
//! | sigla ou padrão que exige contexto      | 0 a −100, se não justificado |
//! | países associados presentes no documento | soma das contagens       |
//! | desempate por id                        | −id / 10⁷                 |
//!
//! Também saem daqui os atores compostos pré-compostos ("Kenyan police" como
//! um único padrão) e as siglas definidas no próprio texto:
//! "Central Bank of Kenya ( CBK )" cria o padrão `CBK=` para o resto do
//! documento.

use std::sync::OnceLock;

use regex::Regex;
use tracing::info;
use unicode_segmentation::UnicodeSegmentation;

use crate::actor_mention::{ActorIdentifiers, ActorMention, AgentIdentifiers};
use crate::actor_mention_set::{ActorMentionSet, ScoredActorMention};
use crate::config::FinderMode;
use crate::document::{EntityType, MentionType, Sentence};
use crate::finder::{
    ActorMentionFinder, DocScope, ACTOR_PATTERN, BLOCK_ACTOR, CITIZEN_OF_COUNTRY, COMPOSITE_ACTOR_PATTERN,
    LOCAL_COMPOSITE_ACRONYM, LOCAL_PROPER_NOUN_ACRONYM, PATTERN_END_IS_NOT_MENTION_END,
    PERSON_IS_CITIZEN_OF_COUNTRY,
};
use crate::ids::MentionUid;
use crate::token_matcher::{
    ActorMatch, ActorTokenMatcher, CompositeActorMatch, CompositeActorTokenMatcher, CompositeId, MatchesBySentence,
};

const VATICAN_CODE: &str = "VAT";
const MEDIA_SECTORS: [&str; 4] = ["MED", "133", "Media", "News"];
const UNJUSTIFIED_PENALTY: f64 = -50.0;
const CONFLICTING_ACRONYM_PENALTY: f64 = -100.0;
const LOCAL_ACRONYM_WEIGHT: f64 = -0.01;

/// Como o casamento se encaixa na menção escolhida.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MatchShape {
    /// O casamento cobre o núcleo da menção (e não um filho não-núcleo).
    pub head_match: bool,
    /// "The Americans": país no plural precedido de artigo.
    pub country_the_plural: bool,
}

fn acronym_regex() -> &'static Regex {
    static ACRONYM: OnceLock<Regex> = OnceLock::new();
    ACRONYM.get_or_init(|| Regex::new(r"^[A-Z]\.?([A-Z]\.?)+$").expect("ACRONYM regex is invalid"))
}

fn is_left_paren(token: &str) -> bool {
    token == "(" || token == "-LRB-"
}

fn is_right_paren(token: &str) -> bool {
    token == ")" || token == "-RRB-"
}

fn first_grapheme(token: &str) -> &str {
    token.graphemes(true).next().unwrap_or("")
}

/// Forma normalizada de um nome para comparar com a expansão de uma sigla.
///
/// Devolve (palavras capitalizadas em minúsculas e concatenadas, iniciais).
/// Com menos de duas palavras capitalizadas, todas as palavras contam.
///
/// ```rust
/// use icews_core::candidates::normalize_acronym_expansion;
///
/// let (text, initials) = normalize_acronym_expansion("Organization on Stuff");
/// assert_eq!(text, "organizationstuff");
/// assert_eq!(initials, "OS");
/// ```
pub fn normalize_acronym_expansion(name: &str) -> (String, String) {
    let name = name.replace(" 's", "'s");
    let tokens: Vec<&str> = name.split(' ').filter(|t| !t.is_empty()).collect();

    let mut result = String::new();
    let mut initials = String::new();
    let mut capitalized = 0;
    for tok in &tokens {
        if tok.chars().next().map(char::is_uppercase).unwrap_or(false) {
            initials.push_str(first_grapheme(tok));
            result.push_str(&tok.to_lowercase());
            capitalized += 1;
        }
    }
    if capitalized < 2 {
        result.clear();
        initials.clear();
        for tok in &tokens {
            let lower = tok.to_lowercase();
            initials.push_str(first_grapheme(&lower));
            result.push_str(&lower);
        }
    }
    (result, initials)
}

impl ActorMentionFinder {
    /// Primeiro passe: atores por nome próprio, siglas locais e locais do gazetteer.
    ///
    /// Devolve os casamentos que não acharam menção, por sentença; eles ainda
    /// podem servir de ator pareado.
    pub(crate) fn find_proper_noun_actor_mentions(
        &mut self,
        scope: DocScope<'_>,
        actors: &mut ActorMentionSet,
    ) -> MatchesBySentence<ActorMatch> {
        if self.config.verbosity > 0 {
            info!("  Adicionando menções de atores por nome próprio");
        }
        let matches = self.actor_matcher.find_all_matches(scope.doc, scope.limit);
        self.fill_tentative_country_counts(&matches);

        let mut unused: MatchesBySentence<ActorMatch> = vec![Vec::new(); matches.len()];
        let mut candidates = Vec::new();
        for (sentno, sentence_matches) in matches.iter().enumerate() {
            for m in sentence_matches {
                match self.make_proper_noun_actor_mention(scope, sentno, m, &matches, ACTOR_PATTERN) {
                    Some(candidate) => candidates.push(candidate),
                    None => unused[sentno].push(m.clone()),
                }
            }
        }

        if let Some(composites) = &self.composite_matcher {
            let precomposed = composites.find_all_matches(scope.doc, scope.limit);
            for (sentno, sentence_matches) in precomposed.iter().enumerate() {
                for m in sentence_matches {
                    if let Some(candidate) =
                        self.make_precomposed_composite_actor_mention(scope, sentno, m, COMPOSITE_ACTOR_PATTERN, Some(&matches))
                    {
                        candidates.push(candidate);
                    }
                }
            }
        }

        if let Some(acronyms) = self.local_proper_noun_acronym_definitions(scope, &candidates) {
            let acronym_matches = acronyms.find_all_matches(scope.doc, scope.limit);
            for (sentno, sentence_matches) in acronym_matches.iter().enumerate() {
                for m in sentence_matches {
                    if let Some(candidate) =
                        self.make_proper_noun_actor_mention(scope, sentno, m, &matches, LOCAL_PROPER_NOUN_ACRONYM)
                    {
                        candidates.push(candidate);
                    }
                }
            }
        }

        // Fase conservadora: só locais inequívocos, sem as contagens provisórias.
        self.clear_country_tallies();
        let mut conservative = Vec::new();
        for sentno in 0..scope.limit {
            let pattern_matches = matches.get(sentno).map(Vec::as_slice).unwrap_or(&[]);
            self.resolve_named_locations(scope, sentno, pattern_matches, actors, &mut conservative, false);
        }
        candidates.extend(conservative);

        self.find_us_cities(scope, &mut candidates);

        // "Georgia" tem padrão de ator mas é ambíguo; volta na fase agressiva.
        let (georgia, candidates): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| is_georgia(scope.doc.sentence(c.mention.uid.sentence), c.mention.uid));
        self.greedily_add_actor_mentions(scope, actors, candidates);
        self.fill_document_country_counts(scope, &*actors);

        let mut aggressive = Vec::new();
        for sentno in 0..scope.limit {
            let pattern_matches = matches.get(sentno).map(Vec::as_slice).unwrap_or(&[]);
            self.resolve_named_locations(scope, sentno, pattern_matches, actors, &mut aggressive, true);
        }
        aggressive.extend(georgia);
        self.greedily_add_actor_mentions(scope, actors, aggressive);
        self.fill_document_country_counts(scope, &*actors);

        unused
    }

    /// Contagens provisórias a partir dos casamentos brutos.
    pub(crate) fn fill_tentative_country_counts(&mut self, matches: &MatchesBySentence<ActorMatch>) {
        self.clear_country_tallies();
        for m in matches.iter().flatten() {
            if self.actor_info.is_a_country(m.id) {
                *self.country_counts.entry(m.id).or_default() += 1.0;
            } else {
                for country in self.actor_info.associated_country_actor_ids(m.id, None) {
                    *self.country_counts.entry(country).or_default() += 0.1;
                }
            }
        }
    }

    pub(crate) fn make_proper_noun_actor_mention(
        &self,
        scope: DocScope<'_>,
        sentno: usize,
        m: &ActorMatch,
        all: &MatchesBySentence<ActorMatch>,
        note: &str,
    ) -> Option<ScoredActorMention> {
        let (candidate, shape) = self.create_proper_noun_actor_mention(scope.doc.sentence(sentno), m, note)?;
        let (mention, score) = self.score_proper_noun_actor_mention(scope, sentno, candidate, m, all, shape, true);
        let mention = mention?;
        let score = score + self.association_score(&mention, scope.date);
        Some(ScoredActorMention::new(score, mention))
    }

    /// Liga o casamento à menção NAME/DESC que o cobre, aplicando as
    /// restrições de modificadores. `None` suprime o casamento.
    pub(crate) fn create_proper_noun_actor_mention(
        &self,
        sent: &Sentence,
        m: &ActorMatch,
        note: &str,
    ) -> Option<(ActorMention, MatchShape)> {
        let mut shape = MatchShape::default();
        let mention = match sent.covering_name_desc_mention(m.start, m.end) {
            Some(mention) => {
                shape.head_match = true;
                mention
            }
            None => {
                // casamento num filho não-núcleo, comum em análises erradas
                let covering = sent.covering_node(m.start, m.end)?;
                let grandparent = sent.node(covering).parent.and_then(|p| sent.node(p).parent)?;
                if sent.node(grandparent).tag != "NPP" {
                    return None;
                }
                let mention = sent.covering_name_desc_mention_from(grandparent)?;
                if self.config.verbosity > 4 {
                    info!(
                        "    Casamento fora do núcleo: menção \"{}\", padrão \"{}\"",
                        sent.mention_text(mention.uid.index),
                        sent.text(m.start, m.end)
                    );
                }
                mention
            }
        };
        if self.config.only_match_names && mention.mention_type != MentionType::Name {
            return None;
        }

        let node = sent.node(mention.atomic_head);
        let same_start = node.start == m.start;
        let same_end = node.end == m.end;
        let info = self.actor_info.as_ref();
        let is_country = info.is_a_country(m.id);
        let is_individual = info.is_an_individual(m.id);

        if is_country && mention.mention_type == MentionType::Desc && node.tag == "NNPS" {
            let parent_is_npp = node.parent.map(|p| sent.node(p).tag == "NPP").unwrap_or(false);
            let phrase = node.parent.and_then(|p| sent.node(p).parent);
            if let (true, Some(phrase)) = (parent_is_npp, phrase) {
                let inside_desc = sent
                    .node(phrase)
                    .parent
                    .and_then(|p| sent.mention_at_node(p))
                    .map(|outer| outer.mention_type == MentionType::Desc)
                    .unwrap_or(false);
                let phrase_node = sent.node(phrase);
                if !inside_desc
                    && phrase_node.start + 1 == phrase_node.end
                    && sent.tokens[phrase_node.start].eq_ignore_ascii_case("the")
                {
                    shape.country_the_plural = true;
                }
            }
        }

        if !(same_start && same_end) && !shape.country_the_plural {
            let (allowed, context) = if is_country {
                (&self.config.country_modifier_words, "um país")
            } else if is_individual {
                (&self.config.person_modifier_words, "uma pessoa")
            } else {
                (&self.config.organization_modifier_words, "uma organização")
            };
            let head_word = sent.head_word(mention.atomic_head);
            for tok in node.start..=node.end {
                if tok >= m.start && tok <= m.end {
                    continue;
                }
                let pos = sent.pos_tags.get(tok).map(String::as_str).unwrap_or("???");
                if !is_country && pos == "JJ" {
                    continue;
                }
                let word = sent.tokens[tok].to_lowercase();
                if (word == "north" && head_word == "korea") || !allowed.contains(&word) {
                    if self.config.verbosity > 3 {
                        info!(
                            "    Ignorando \"{}\" para o padrão \"{}\": o ator é {context} e a menção contém \"{word}\" ({pos})",
                            sent.mention_text(mention.uid.index),
                            sent.text(m.start, m.end)
                        );
                    }
                    return None;
                }
            }
        }

        let mut candidate = if m.code.as_deref() == Some(BLOCK_ACTOR) {
            ActorMention::bare(mention.uid, BLOCK_ACTOR)
        } else {
            ActorMention::proper_noun(
                mention.uid,
                note,
                ActorIdentifiers::from_match(m, info.actor_name(m.id), self.actor_matcher.pattern_requires_context(m.pattern_id)),
            )
        };
        if !same_end {
            candidate.add_note(PATTERN_END_IS_NOT_MENTION_END);
        }
        if self.config.require_entity_type_match {
            if let Some(actor) = candidate.actor_id() {
                if !self.entity_type_matches(actor, mention.entity_type) {
                    return None;
                }
            }
        }
        Some((candidate, shape))
    }

    /// Pontua um candidato. Países casados com pessoas viram cidadãos do
    /// país no modo ICEWS e são descartados (`None`) no modo ACTOR_MATCH.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn score_proper_noun_actor_mention(
        &self,
        scope: DocScope<'_>,
        sentno: usize,
        candidate: ActorMention,
        m: &ActorMatch,
        all: &MatchesBySentence<ActorMatch>,
        shape: MatchShape,
        add_weight: bool,
    ) -> (Option<ActorMention>, f64) {
        let sent = scope.doc.sentence(sentno);
        let mention = scope.doc.mention(candidate.uid);
        let node = sent.node(mention.atomic_head);
        let same_start = node.start == m.start;
        let same_end = node.end == m.end;
        let info = self.actor_info.as_ref();

        let mut score = 0.0;
        if m.is_acronym {
            score += self.score_acronym_match(scope, sentno, m, all);
        }
        if self.actor_matcher.pattern_requires_context(m.pattern_id) {
            score += self.score_context_required_match(scope, sentno, m, all);
        }
        if !shape.head_match {
            score -= 5.0;
        }
        if same_start && same_end {
            score += 15.0;
        } else if same_end {
            score += 5.0;
        }
        if add_weight {
            score += m.weight;
        }

        let mut result = Some(candidate);
        if info.is_a_country(m.id) && info.actor_code(m.id).as_deref() != Some(VATICAN_CODE) {
            match mention.entity_type {
                EntityType::Gpe => score += 5.0,
                EntityType::Loc => score += 3.0,
                EntityType::Per if self.config.encode_person_matching_country_as_citizen && !shape.country_the_plural => {
                    match self.config.mode {
                        FinderMode::Icews => {
                            if let Some(agent) = self.default_person_agent() {
                                let actor = ActorIdentifiers::from_match(
                                    m,
                                    info.actor_name(m.id),
                                    self.actor_matcher.pattern_requires_context(m.pattern_id),
                                );
                                result = Some(ActorMention::composite(
                                    mention.uid,
                                    CITIZEN_OF_COUNTRY,
                                    agent,
                                    Some(actor),
                                    PERSON_IS_CITIZEN_OF_COUNTRY,
                                ));
                            }
                        }
                        FinderMode::ActorMatch => result = None,
                        FinderMode::DocActors => {}
                    }
                }
                _ => {}
            }
        }
        if info.is_an_individual(m.id) && mention.entity_type == EntityType::Per {
            score += 3.0;
        }
        score += m.pattern_strlen as f64;
        // casamentos de pessoa com um único token não são confiáveis
        if self.config.mode == FinderMode::ActorMatch && info.is_a_person(m.id) && m.start == m.end {
            score -= 50.0;
        }
        score -= m.id.0 as f64 / 1e7;
        (result, score)
    }

    /// Soma das contagens dos países associados ao ator (só nomes próprios).
    pub(crate) fn association_score(&self, mention: &ActorMention, date: Option<&str>) -> f64 {
        let Some(actor) = mention.actor_id() else {
            return 0.0;
        };
        self.actor_info
            .associated_country_actor_ids(actor, date)
            .iter()
            .filter_map(|country| self.country_counts.get(country))
            .sum()
    }

    /// Penalidade de uma sigla: 0 quando justificada, −50 sem justificativa,
    /// −100 quando outra expansão com as mesmas iniciais aparece no texto.
    pub(crate) fn score_acronym_match(
        &self,
        scope: DocScope<'_>,
        sentno: usize,
        m: &ActorMatch,
        all: &MatchesBySentence<ActorMatch>,
    ) -> f64 {
        let info = self.actor_info.as_ref();
        let name = info.actor_name(m.id);
        let mut penalty = UNJUSTIFIED_PENALTY;
        let mut reason = "nenhuma justificativa".to_string();

        for (s, matches) in all.iter().enumerate() {
            for m2 in matches {
                if m2.id == m.id && !m2.is_acronym && !self.actor_matcher.pattern_requires_context(m2.pattern_id) {
                    penalty = 0.0;
                    reason = format!("expansão completa \"{}\"", scope.doc.sentence(s).text(m2.start, m2.end));
                }
            }
        }

        let mut conflict = false;
        if penalty < 0.0 {
            let (expansion, initials) = normalize_acronym_expansion(&name);
            for s in 0..all.len() {
                let sent = scope.doc.sentence(s);
                for index in 0..sent.mentions.len() {
                    let text = sent.mention_text(index);
                    let (normalized, mention_initials) = normalize_acronym_expansion(&text);
                    if normalized == expansion {
                        penalty = 0.0;
                        reason = format!("menção parecida com a expansão \"{text}\"");
                    } else if penalty != 0.0 && initials.graphemes(true).count() > 1 && initials == mention_initials {
                        penalty = CONFLICTING_ACRONYM_PENALTY;
                        conflict = true;
                        reason = format!("mesmas iniciais com outra expansão \"{text}\"");
                    }
                }
            }
        }

        if !conflict {
            for country in info.associated_country_actor_ids(m.id, None) {
                let count = all
                    .iter()
                    .flatten()
                    .filter(|m2| m2.id == country && !m2.is_acronym)
                    .count() as i64;
                if count > 0 {
                    let candidate = (-10 + count).min(-5) as f64;
                    if penalty < candidate {
                        penalty = candidate;
                        reason = format!("país relacionado \"{}\" aparece {count} vezes", info.actor_name(country));
                    }
                }
            }
            // "(AP)" no começo da notícia
            if sentno < 3 && info.actor_sector_codes(m.id).iter().any(|s| MEDIA_SECTORS.contains(&s.as_str())) {
                let candidate = -5.0 * (sentno as f64 + 1.0);
                if penalty < candidate {
                    penalty = candidate;
                    reason = "mídia nas três primeiras sentenças".to_string();
                }
            }
        }

        if self.config.verbosity > 3 {
            let verdict = if penalty <= UNJUSTIFIED_PENALTY { "Rejeitada" } else { "Aceita" };
            info!(
                "      {verdict} a sigla {} => \"{name}\" [{penalty:.1}] {reason}",
                scope.doc.sentence(sentno).text(m.start, m.end)
            );
        }
        penalty
    }

    /// Padrões marcados como dependentes de contexto precisam de outro
    /// casamento do mesmo ator ou de um local associado.
    pub(crate) fn score_context_required_match(
        &self,
        scope: DocScope<'_>,
        sentno: usize,
        m: &ActorMatch,
        all: &MatchesBySentence<ActorMatch>,
    ) -> f64 {
        let info = self.actor_info.as_ref();
        let mut penalty = UNJUSTIFIED_PENALTY;
        let full_form = all.iter().flatten().any(|m2| {
            m2.id == m.id && !m2.is_acronym && !self.actor_matcher.pattern_requires_context(m2.pattern_id)
        });
        if full_form {
            penalty = 0.0;
        }
        for location in info.associated_location_actor_ids(m.id) {
            if all.iter().flatten().any(|m2| m2.id == location) {
                penalty = 0.0;
            }
        }
        if self.config.verbosity > 3 {
            let verdict = if penalty <= UNJUSTIFIED_PENALTY { "Rejeitado" } else { "Aceito" };
            info!(
                "      {verdict} padrão dependente de contexto {} => \"{}\" [{penalty:.1}]",
                scope.doc.sentence(sentno).text(m.start, m.end),
                info.actor_name(m.id)
            );
        }
        penalty
    }

    /// Siglas definidas no texto para organizações encontradas nos candidatos.
    fn local_proper_noun_acronym_definitions(
        &self,
        scope: DocScope<'_>,
        candidates: &[ScoredActorMention],
    ) -> Option<ActorTokenMatcher> {
        let mut matcher: Option<ActorTokenMatcher> = None;
        for candidate in candidates {
            let Some(actor) = candidate.mention.actor() else {
                continue;
            };
            if self.actor_info.is_an_individual(actor.id) || self.actor_info.is_a_country(actor.id) {
                continue;
            }
            if let Some(pattern) = self.acronym_pattern_from_definition(scope, candidate.mention.uid) {
                matcher.get_or_insert_with(|| ActorTokenMatcher::new("actor")).add_pattern(
                    &pattern,
                    actor.pattern_id,
                    actor.id,
                    actor.code.as_deref(),
                    LOCAL_ACRONYM_WEIGHT,
                );
            }
        }
        matcher
    }

    /// "Nome Longo ( SIGLA )" no fim da menção produz o padrão `SIGLA=`.
    pub(crate) fn acronym_pattern_from_definition(&self, scope: DocScope<'_>, uid: MentionUid) -> Option<String> {
        let sent = scope.doc.sentence(uid.sentence);
        let mention = sent.mention(uid.index);
        let node = sent.node(mention.node);
        let (start, end) = (node.start, node.end);
        if end < start + 4 || !is_right_paren(&sent.tokens[end]) || !is_left_paren(&sent.tokens[end - 2]) {
            return None;
        }
        let covering = sent.covering_name_desc_mention(end - 3, end)?;
        if covering.uid != uid {
            return None;
        }
        let acronym = &sent.tokens[end - 1];
        if !acronym_regex().is_match(acronym) {
            return None;
        }
        if self.config.verbosity > 2 {
            info!(
                "    Definição local de sigla: {acronym} => \"{}\"",
                sent.mention_text(uid.index)
            );
        }
        Some(format!("{acronym}="))
    }

    /// Ator composto vindo de um único padrão (agente e ator já pareados).
    pub(crate) fn make_precomposed_composite_actor_mention(
        &self,
        scope: DocScope<'_>,
        sentno: usize,
        m: &CompositeActorMatch,
        note: &str,
        actor_matches: Option<&MatchesBySentence<ActorMatch>>,
    ) -> Option<ScoredActorMention> {
        let sent = scope.doc.sentence(sentno);
        let mention = sent.covering_name_desc_mention(m.start, m.end)?;
        let node = sent.node(mention.atomic_head);
        let same_start = node.start == m.start;
        let same_end = node.end == m.end;

        let info = self.actor_info.as_ref();
        let CompositeId { agent, actor } = m.id;
        let agent_ids = AgentIdentifiers::new(agent, info.agent_name(agent), info.agent_code(agent), None);
        let actor_code = info.actor_code(actor);
        let actor_ids = ActorIdentifiers {
            id: actor,
            name: info.actor_name(actor),
            code: actor_code.clone(),
            pattern_id: m.pattern_id,
            is_acronym: m.is_acronym,
            requires_context: self.actor_matcher.pattern_requires_context(m.pattern_id),
        };
        let mut candidate = ActorMention::composite(mention.uid, note, agent_ids, Some(actor_ids), note);
        if !same_end {
            candidate.add_note(PATTERN_END_IS_NOT_MENTION_END);
        }

        let mut score = m.weight + m.pattern_strlen as f64;
        if let (true, Some(all)) = (m.is_acronym, actor_matches) {
            let actor_match = ActorMatch {
                id: actor,
                pattern_id: m.pattern_id,
                code: actor_code,
                start: m.start,
                end: m.end,
                pattern_strlen: m.pattern_strlen,
                weight: m.weight,
                is_acronym: m.is_acronym,
            };
            score += self.score_acronym_match(scope, sentno, &actor_match, all);
        }
        if same_start && same_end {
            score += 15.0;
        } else if same_end {
            score += 5.0;
        }
        score += self.association_score(&candidate, scope.date);
        Some(ScoredActorMention::new(score, candidate))
    }

    /// Siglas de atores compostos definidas no texto ("Kenya Police ( KP )").
    fn local_composite_acronym_definitions(
        &self,
        scope: DocScope<'_>,
        actors: &ActorMentionSet,
    ) -> Option<CompositeActorTokenMatcher> {
        let mut matcher: Option<CompositeActorTokenMatcher> = None;
        for actor_mention in actors.iter() {
            let (Some(agent), Some(paired)) = (actor_mention.agent(), actor_mention.paired_actor()) else {
                continue;
            };
            if let Some(pattern) = self.acronym_pattern_from_definition(scope, actor_mention.uid) {
                let code = format!(
                    "{}:{}",
                    agent.code.as_deref().unwrap_or_default(),
                    paired.code.as_deref().unwrap_or_default()
                );
                matcher
                    .get_or_insert_with(|| CompositeActorTokenMatcher::new("composite_actor"))
                    .add_pattern(
                        &pattern,
                        paired.pattern_id,
                        CompositeId {
                            agent: agent.id,
                            actor: paired.id,
                        },
                        Some(&code),
                        0.0,
                    );
            }
        }
        matcher
    }

    pub(crate) fn find_local_acronym_composite_actor_mentions(&mut self, scope: DocScope<'_>, actors: &mut ActorMentionSet) {
        let Some(matcher) = self.local_composite_acronym_definitions(scope, actors) else {
            return;
        };
        if self.config.verbosity > 0 {
            info!("  Aplicando siglas locais de atores compostos");
        }
        let matches = matcher.find_all_matches(scope.doc, scope.limit);
        let mut candidates = Vec::new();
        for (sentno, sentence_matches) in matches.iter().enumerate() {
            for m in sentence_matches {
                if let Some(candidate) =
                    self.make_precomposed_composite_actor_mention(scope, sentno, m, LOCAL_COMPOSITE_ACRONYM, None)
                {
                    candidates.push(candidate);
                }
            }
        }
        self.greedily_add_actor_mentions(scope, actors, candidates);
    }
}

pub(crate) fn is_georgia(sent: &Sentence, uid: MentionUid) -> bool {
    let head = sent.head_word(sent.mention(uid.index).node);
    head == "georgia" || head == "georgian"
}
