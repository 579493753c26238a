//! # Resolução de Menções de Locais
//!
//! Mapeia uma menção de local para entradas do gazetteer. A ordem de
//! consulta é:
//!
//! 1. regras manuais (expressão regular → `geo_id:N` ou `country:ISO`), score 100;
//! 2. tabela de países (países vencem todo o resto, exceto "georgia");
//! 3. geonames, com um candidato por país ou todos os candidatos.
//!
//! Candidatos do geonames recebem `20 + ln(população) + geonameid / 1e7`.
//!
//! O resolvedor guarda um cache de resoluções registradas (cidades e estados
//! dos EUA descobertos pela regra "cidade, estado") que precisa ser limpo a
//! cada documento.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use regex::Regex;
use tracing::info;

use crate::actor_info::ActorInfo;
use crate::actor_mention_set::{ActorMentionSet, CountryCounts};
use crate::document::{Mention, Sentence};
use crate::error::{IcewsError, Result};
use crate::gazetteer::{Gazetteer, GeoResolution, ScoredGeoResolution};
use crate::ids::{ActorId, CountryId, GeonameId};
use crate::token_matcher::ActorMatch;

/// Score de resoluções vindas de regras manuais e de países inequívocos.
pub const RULE_BASED_SCORE: f64 = 100.0;
const BIG_CITY_POPULATION: u64 = 1_000_000;
const REGION_TIE_MARGIN: f64 = 0.02;
const US_COUNTRY_CODE: &str = "US";
const GEORGIA: &str = "georgia";
const GEORGIA_REGION_CODE: &str = "GA";

/// Estado do documento consultado pela resolução ICEWS.
pub struct LocationContext<'a> {
    /// Menções de atores já aceitas no documento inteiro.
    pub actors: &'a ActorMentionSet,
    /// Casamentos de padrões de atores da sentença da menção.
    pub pattern_matches: &'a [ActorMatch],
    pub country_counts: &'a CountryCounts,
    pub usa_actor: Option<ActorId>,
    pub actor_info: &'a dyn ActorInfo,
}

pub struct LocationMentionResolver {
    gazetteer: Arc<dyn Gazetteer>,
    rules: Vec<(Regex, String)>,
    max_ambiguity: usize,
    verbosity: u8,
    registered: HashMap<String, ScoredGeoResolution>,
}

impl LocationMentionResolver {
    pub fn new(gazetteer: Arc<dyn Gazetteer>) -> Self {
        Self {
            gazetteer,
            rules: Vec::new(),
            max_ambiguity: 3,
            verbosity: 3,
            registered: HashMap::new(),
        }
    }

    pub fn with_max_ambiguity(mut self, max_ambiguity: usize) -> Self {
        self.max_ambiguity = max_ambiguity.max(1);
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn gazetteer(&self) -> &dyn Gazetteer {
        self.gazetteer.as_ref()
    }

    /// Regra manual: `pattern` (sem diferenciar maiúsculas, nome inteiro) →
    /// `geo_id:N` ou `country:ISO`.
    pub fn add_rule(&mut self, pattern: &str, target: &str) -> Result<()> {
        if !target.contains(':') {
            return Err(IcewsError::Pattern(format!("alvo de regra sem ':' ({target})")));
        }
        let regex = Regex::new(&format!("(?i)^(?:{pattern})$"))?;
        self.rules.push((regex, target.to_string()));
        Ok(())
    }

    /// Carrega regras no formato `padrão<TAB>alvo`, uma por linha.
    pub fn load_rules(&mut self, text: &str) -> Result<usize> {
        let mut count = 0;
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#')) {
            let Some((pattern, target)) = line.split_once('\t') else {
                return Err(IcewsError::Pattern(format!("regra sem TAB: {line}")));
            };
            self.add_rule(pattern, target)?;
            count += 1;
        }
        Ok(count)
    }

    /// Esquece as resoluções registradas (início de documento).
    pub fn clear(&mut self) {
        self.registered.clear();
    }

    pub fn register_resolutions(&mut self, names: &[String], resolution: &ScoredGeoResolution) {
        for name in names {
            self.registered.insert(name.clone(), resolution.clone());
        }
    }

    pub fn registered_resolution(&self, name: &str) -> Option<&ScoredGeoResolution> {
        self.registered.get(name)
    }

    pub fn canonical_forms(&self, sentence: &Sentence, mention: &Mention) -> Vec<String> {
        self.gazetteer.canonical_forms(sentence, mention)
    }

    pub fn is_blocked_location(&self, sentence: &Sentence, mention: &Mention) -> bool {
        self.is_blocked_name(&self.canonical_forms(sentence, mention))
    }

    fn is_blocked_name(&self, names: &[String]) -> bool {
        names.iter().any(|n| self.gazetteer.is_blocked(n))
    }

    fn rule_based_resolution(&self, names: &[String]) -> Option<GeoResolution> {
        for (regex, target) in &self.rules {
            if names.iter().any(|n| regex.is_match(n)) {
                let (kind, value) = target.split_once(':')?;
                let value = value.trim();
                return if kind == "geo_id" {
                    value.parse().ok().and_then(|id| self.gazetteer.geo_resolution(GeonameId(id)))
                } else {
                    self.gazetteer.country_resolution(value)
                };
            }
        }
        None
    }

    /// Resultados do geonames para a primeira forma canônica que tiver algum.
    fn best_resolution_set(&self, names: &[String]) -> Vec<GeoResolution> {
        names
            .iter()
            .map(|n| self.gazetteer.geoname_lookup(n))
            .find(|r| !r.is_empty())
            .unwrap_or_default()
    }

    fn country_resolutions(&self, names: &[String]) -> Vec<GeoResolution> {
        names
            .iter()
            .map(|n| self.gazetteer.country_lookup(n))
            .find(|r| !r.is_empty())
            .unwrap_or_default()
    }

    /// O mais populoso de cada país (chave `None` para resoluções sem país).
    fn one_per_country(&self, names: &[String]) -> Vec<GeoResolution> {
        let mut best: BTreeMap<Option<String>, GeoResolution> = BTreeMap::new();
        for resolution in self.best_resolution_set(names) {
            let country = resolution.country_info.as_ref().map(|c| c.iso_code.clone());
            let replace = best
                .get(&country)
                .map(|old| resolution.population > old.population)
                .unwrap_or(true);
            if replace {
                best.insert(country, resolution);
            }
        }
        best.into_values().collect()
    }

    fn resolutions_in_country(&self, names: &[String], country_code: &str) -> Vec<GeoResolution> {
        for name in names {
            let found: Vec<GeoResolution> = self
                .gazetteer
                .geoname_lookup(name)
                .into_iter()
                .filter(|r| r.country_code == country_code)
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Candidatos pontuados, do melhor para o pior.
    pub fn candidate_resolutions(
        &self,
        sentence: &Sentence,
        mention: &Mention,
        one_per_country: bool,
        allowable: &[CountryId],
    ) -> Vec<ScoredGeoResolution> {
        let names = self.canonical_forms(sentence, mention);
        let mut candidates = Vec::new();
        if self.is_blocked_name(&names) {
            return candidates;
        }

        if let Some(rule) = self.rule_based_resolution(&names) {
            if is_from_allowable_country(&rule, allowable) {
                candidates.push(ScoredGeoResolution::new(RULE_BASED_SCORE, rule));
                return candidates;
            }
        }

        for resolution in self.country_resolutions(&names) {
            if is_from_allowable_country(&resolution, allowable) {
                candidates.push(score_resolution(resolution));
            }
        }
        if !candidates.is_empty() && !names.iter().any(|n| n == GEORGIA) {
            sort_resolutions(&mut candidates);
            return candidates;
        }

        let resolutions = if one_per_country {
            self.one_per_country(&names)
        } else {
            self.best_resolution_set(&names)
        };
        candidates.extend(
            resolutions
                .into_iter()
                .filter(|r| is_from_allowable_country(r, allowable))
                .map(score_resolution),
        );
        sort_resolutions(&mut candidates);
        candidates
    }

    /// Resolução para um gentílico que aponta para exatamente um país.
    pub fn unambiguous_country_resolution(
        &self,
        sentence: &Sentence,
        mention: &Mention,
        actor_info: &dyn ActorInfo,
    ) -> Option<ScoredGeoResolution> {
        let names = self.canonical_forms(sentence, mention);
        let countries: Vec<GeoResolution> = self
            .best_resolution_set(&names)
            .into_iter()
            .filter(|geo| {
                geo.geoname_id
                    .and_then(|id| actor_info.actor_for_geoname(id))
                    .map(|actor| actor_info.is_a_country(actor))
                    .unwrap_or(false)
            })
            .collect();
        match <[GeoResolution; 1]>::try_from(countries) {
            Ok([only]) => Some(ScoredGeoResolution::new(RULE_BASED_SCORE, only)),
            Err(_) => None,
        }
    }

    /// "Georgia" é o estado americano quando algum local da Geórgia (GA) já
    /// apareceu, ou quando nenhum país além dos EUA foi mencionado.
    pub fn is_us_georgia(&self, ctx: &LocationContext<'_>) -> bool {
        let has_non_us_country = ctx
            .country_counts
            .iter()
            .any(|(country, count)| Some(*country) != ctx.usa_actor && *count > 0.0);
        let saw_georgia_place = ctx.actors.iter().any(|m| {
            m.geo()
                .and_then(|g| g.geoname_id)
                .and_then(|id| self.gazetteer.geo_region(id))
                .map(|region| region == GEORGIA_REGION_CODE)
                .unwrap_or(false)
        });
        saw_georgia_place || !has_non_us_country
    }

    /// Resolução usada pelo pipeline ICEWS.
    pub fn icews_location_resolution(
        &self,
        ctx: &LocationContext<'_>,
        sentence: &Sentence,
        mention: &Mention,
        allow_ambiguity: bool,
        allowable: &[CountryId],
    ) -> Option<ScoredGeoResolution> {
        let names = self.canonical_forms(sentence, mention);
        for name in &names {
            if let Some(registered) = self.registered.get(name) {
                if registered.score > 0.0 {
                    return Some(registered.clone());
                }
            }
        }

        if names.iter().any(|n| n == GEORGIA) {
            if !allow_ambiguity {
                return None;
            }
            if self.is_us_georgia(ctx) {
                if let Some(state) = self.resolution_in_region(sentence, mention, US_COUNTRY_CODE, None) {
                    if is_from_allowable_country(&state, allowable) {
                        return Some(ScoredGeoResolution::new(RULE_BASED_SCORE, state));
                    }
                }
            }
        }

        // um padrão de ator que cobre a menção exatamente tem preferência
        let node = sentence.node(mention.node);
        let head = sentence.node(mention.atomic_head);
        let exact_pattern = ctx.pattern_matches.iter().any(|m| {
            ctx.actor_info.might_be_a_location(m.id)
                && ((m.start == node.start && m.end == node.end) || (m.start == head.start && m.end == head.end))
        });
        if exact_pattern {
            return None;
        }

        let candidates = self.candidate_resolutions(sentence, mention, true, allowable);
        let max_ambiguity = if allow_ambiguity { self.max_ambiguity } else { 1 };
        let naive_best = candidates.first()?.clone();
        if candidates.len() == 1 {
            return Some(naive_best);
        }

        let count_for = |geo: &GeoResolution| -> Option<f64> {
            let actor = geo.country_info.as_ref()?.actor_id?;
            ctx.country_counts.get(&actor).copied()
        };
        let mut vetted: Vec<ScoredGeoResolution> = candidates
            .iter()
            .filter_map(|c| {
                let big_city = c.resolution.population > BIG_CITY_POPULATION;
                if c.resolution.country_info.is_some() {
                    let count = count_for(&c.resolution).unwrap_or(0.0);
                    (count > 0.0 || big_city).then(|| ScoredGeoResolution::new(c.score + count, c.resolution.clone()))
                } else {
                    big_city.then(|| c.clone())
                }
            })
            .collect();
        sort_resolutions(&mut vetted);

        let text = sentence.mention_text(mention.uid.index);
        if let Some(best) = vetted.first() {
            if vetted.len() > max_ambiguity {
                if self.verbosity > 3 && allow_ambiguity {
                    info!("Local ambíguo demais bloqueado: \"{text}\" resolve para {} países verificados", candidates.len());
                }
                return None;
            }
            if best.resolution.geoname_id != naive_best.resolution.geoname_id {
                info!(
                    "    Escolhendo resolução menos populosa pelo contexto do documento: {text} ({} em vez de {})",
                    best.resolution.country_code, naive_best.resolution.country_code
                );
            }
            return Some(best.clone());
        }

        if candidates.len() > max_ambiguity {
            if self.verbosity > 3 && allow_ambiguity {
                info!("Local ambíguo demais bloqueado: \"{text}\" resolve para {} países sem evidência", candidates.len());
            }
            return None;
        }
        info!("    Nenhuma evidência para as resoluções de: {text}");
        Some(naive_best)
    }

    /// Melhor resolução dentro de um país (e opcionalmente de uma região),
    /// bloqueada quando os dois melhores candidatos empatam.
    pub fn resolution_in_region(
        &self,
        sentence: &Sentence,
        mention: &Mention,
        country_code: &str,
        region: Option<&str>,
    ) -> Option<GeoResolution> {
        let names = self.canonical_forms(sentence, mention);
        let mut scored: Vec<ScoredGeoResolution> = self
            .resolutions_in_country(&names, country_code)
            .into_iter()
            .filter(|r| match region {
                None => true,
                Some(code) => r
                    .geoname_id
                    .and_then(|id| self.gazetteer.geo_region(id))
                    .map(|found| found == code)
                    .unwrap_or(false),
            })
            .map(|r| ScoredGeoResolution::new((r.population as f64).ln(), r))
            .collect();
        sort_resolutions(&mut scored);
        let mut ranked = scored.into_iter();
        let best = ranked.next()?;
        if let Some(second) = ranked.next() {
            if best.score - second.score < REGION_TIE_MARGIN {
                info!(
                    "Local ambíguo bloqueado para \"{}\": {} e {} têm scores parecidos ({:.3} e {:.3})",
                    sentence.mention_text(mention.uid.index),
                    best.resolution.city_name,
                    second.resolution.city_name,
                    best.score,
                    second.score
                );
                return None;
            }
        }
        Some(best.resolution)
    }
}

pub fn is_from_allowable_country(resolution: &GeoResolution, allowable: &[CountryId]) -> bool {
    if allowable.is_empty() {
        return true;
    }
    resolution
        .country_info
        .as_ref()
        .map(|c| allowable.contains(&c.country_id))
        .unwrap_or(false)
}

fn score_resolution(resolution: GeoResolution) -> ScoredGeoResolution {
    let mut score = 20.0;
    if resolution.population > 0 {
        score += (resolution.population as f64).ln();
    }
    score += resolution.geoname_id.map(|id| id.0 as f64 / 1e7).unwrap_or(0.0);
    ScoredGeoResolution::new(score, resolution)
}

fn sort_resolutions(resolutions: &mut [ScoredGeoResolution]) {
    resolutions.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_info::{ActorDatabase, ActorKind, ActorRecord};
    use crate::builder::DocumentBuilder;
    use crate::document::{Document, EntityType, MentionType};
    use crate::gazetteer::{CountryRecord, GeonameRecord, MemoryGazetteer};

    fn geoname(id: u64, name: &str, country: &str, admin1: Option<&str>, population: u64) -> GeonameRecord {
        GeonameRecord {
            id: GeonameId(id),
            name: name.to_string(),
            alternate_names: Vec::new(),
            country_code: country.to_string(),
            admin1: admin1.map(str::to_string),
            population,
            latitude: None,
            longitude: None,
        }
    }

    fn country(id: u32, iso: &str, name: &str, actor: u32) -> CountryRecord {
        CountryRecord {
            country_id: CountryId(id),
            iso_code: iso.to_string(),
            name: name.to_string(),
            alternate_names: Vec::new(),
            actor_id: Some(ActorId(actor)),
        }
    }

    fn gazetteer() -> Arc<dyn Gazetteer> {
        let mut g = MemoryGazetteer::new();
        g.add_country(country(1, "US", "United States", 100));
        g.add_country(country(2, "GE", "Georgia", 200));
        g.add_country(country(3, "GB", "United Kingdom", 300));
        g.add_country(country(4, "IQ", "Iraq", 400));
        g.add_geoname(geoname(10, "Paris", "FR", None, 2_000_000));
        g.add_geoname(geoname(11, "Paris", "US", Some("TX"), 25_000));
        g.add_geoname(geoname(12, "Birmingham", "GB", None, 984_000));
        g.add_geoname(geoname(13, "Birmingham", "US", Some("AL"), 212_000));
        g.add_geoname(geoname(14, "Georgia", "US", Some("GA"), 900_000));
        g.add_geoname(geoname(19, "Tbilisi", "GE", None, 1_100_000));
        g.add_geoname(geoname(15, "Atlanta", "US", Some("GA"), 420_000));
        g.add_geoname(geoname(16, "Springfield", "US", Some("IL"), 116_000));
        g.add_geoname(geoname(17, "Springfield", "US", Some("MA"), 116_000));
        g.add_geoname(geoname(18, "Iraq", "IQ", None, 0));
        g.add_nationality("iraqi", "iraq");
        g.add_blocked_entry("west").unwrap();
        Arc::new(g)
    }

    fn doc(text: &str, start: usize, end: usize) -> Document {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence(text);
        let m = b.mention(s, start, end, EntityType::Gpe, MentionType::Name).unwrap();
        b.entity(&[m]);
        b.build()
    }

    fn resolve(resolver: &LocationMentionResolver, doc: &Document, counts: &CountryCounts, allow: bool) -> Option<ScoredGeoResolution> {
        let db = ActorDatabase::new();
        let actors = ActorMentionSet::new();
        let ctx = LocationContext {
            actors: &actors,
            pattern_matches: &[],
            country_counts: counts,
            usa_actor: Some(ActorId(100)),
            actor_info: &db,
        };
        let s = doc.sentence(0);
        resolver.icews_location_resolution(&ctx, s, &s.mentions[0], allow, &[])
    }

    #[test]
    fn test_countries_trump_geonames() {
        let resolver = LocationMentionResolver::new(gazetteer());
        let d = doc("troops left the United Kingdom", 3, 4);
        let s = d.sentence(0);
        let c = resolver.candidate_resolutions(s, &s.mentions[0], true, &[]);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].resolution.country_code, "GB");
        assert!(c[0].resolution.geoname_id.is_none());
    }

    #[test]
    fn test_one_per_country_scores_by_population() {
        let resolver = LocationMentionResolver::new(gazetteer());
        let d = doc("Paris is calm", 0, 0);
        let s = d.sentence(0);
        let c = resolver.candidate_resolutions(s, &s.mentions[0], true, &[]);
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].resolution.country_code, "FR");
        let expected = 20.0 + (2_000_000f64).ln() + 10.0 / 1e7;
        assert!((c[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_allowable_countries_filter() {
        let resolver = LocationMentionResolver::new(gazetteer());
        let d = doc("Birmingham is calm", 0, 0);
        let s = d.sentence(0);
        let c = resolver.candidate_resolutions(s, &s.mentions[0], false, &[CountryId(3)]);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].resolution.country_code, "GB");
    }

    #[test]
    fn test_rule_based_resolution_wins() {
        let mut resolver = LocationMentionResolver::new(gazetteer());
        resolver.add_rule("paris", "geo_id:11").unwrap();
        let d = doc("Paris is calm", 0, 0);
        let s = d.sentence(0);
        let c = resolver.candidate_resolutions(s, &s.mentions[0], true, &[]);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].score, RULE_BASED_SCORE);
        assert_eq!(c[0].resolution.geoname_id, Some(GeonameId(11)));
        assert!(resolver.add_rule("x", "sem alvo").is_err());
    }

    #[test]
    fn test_vetting_prefers_countries_in_document() {
        let resolver = LocationMentionResolver::new(gazetteer());
        let d = doc("Birmingham is calm", 0, 0);
        // sem evidência: dois candidatos, nenhum com mais de um milhão
        let none = CountryCounts::new();
        assert!(resolve(&resolver, &d, &none, false).is_none());
        assert_eq!(
            resolve(&resolver, &d, &none, true).map(|r| r.resolution.country_code),
            Some("GB".to_string())
        );
        let mut counts = CountryCounts::new();
        counts.insert(ActorId(100), 2.0);
        let picked = resolve(&resolver, &d, &counts, false).unwrap();
        assert_eq!(picked.resolution.country_code, "US");
    }

    #[test]
    fn test_georgia_needs_ambiguity_and_us_context() {
        let resolver = LocationMentionResolver::new(gazetteer());
        let d = doc("Georgia is calm", 0, 0);
        let none = CountryCounts::new();
        assert!(resolve(&resolver, &d, &none, false).is_none());
        let us = resolve(&resolver, &d, &none, true).unwrap();
        assert_eq!(us.score, RULE_BASED_SCORE);
        assert_eq!(us.resolution.country_code, "US");

        let mut counts = CountryCounts::new();
        counts.insert(ActorId(400), 1.0);
        let country = resolve(&resolver, &d, &counts, true).unwrap();
        assert_eq!(country.resolution.country_code, "GE");
    }

    #[test]
    fn test_us_georgia_when_a_georgia_place_was_seen() {
        use crate::actor_mention::{ActorIdentifiers, ActorMention};
        use crate::ids::MentionUid;

        let resolver = LocationMentionResolver::new(gazetteer());
        let db = ActorDatabase::new();
        let mut counts = CountryCounts::new();
        counts.insert(ActorId(400), 1.0);
        let mut actors = ActorMentionSet::new();
        let ctx = LocationContext {
            actors: &actors,
            pattern_matches: &[],
            country_counts: &counts,
            usa_actor: Some(ActorId(100)),
            actor_info: &db,
        };
        assert!(!resolver.is_us_georgia(&ctx));

        let atlanta = resolver.gazetteer().geo_resolution(GeonameId(15));
        actors.add(
            ActorMention::proper_noun(
                MentionUid::new(0, 0),
                "US_CITY",
                ActorIdentifiers::new(ActorId(100), "United States".into(), Some("USA".into()), None),
            )
            .with_geo(atlanta),
        );
        let ctx = LocationContext {
            actors: &actors,
            pattern_matches: &[],
            country_counts: &counts,
            usa_actor: Some(ActorId(100)),
            actor_info: &db,
        };
        assert!(resolver.is_us_georgia(&ctx));
    }

    #[test]
    fn test_registered_resolution_is_reused_until_clear() {
        let mut resolver = LocationMentionResolver::new(gazetteer());
        let d = doc("Birmingham is calm", 0, 0);
        let us = resolver
            .gazetteer()
            .geo_resolution(GeonameId(13))
            .unwrap();
        resolver.register_resolutions(&["birmingham".to_string()], &ScoredGeoResolution::new(45.0, us));
        let none = CountryCounts::new();
        assert_eq!(resolve(&resolver, &d, &none, false).map(|r| r.score), Some(45.0));
        resolver.clear();
        assert!(resolve(&resolver, &d, &none, false).is_none());
    }

    #[test]
    fn test_region_tie_is_blocked() {
        let resolver = LocationMentionResolver::new(gazetteer());
        let d = doc("Springfield is calm", 0, 0);
        let s = d.sentence(0);
        assert!(resolver.resolution_in_region(s, &s.mentions[0], "US", None).is_none());
        let il = resolver.resolution_in_region(s, &s.mentions[0], "US", Some("IL")).unwrap();
        assert_eq!(il.geoname_id, Some(GeonameId(16)));
    }

    #[test]
    fn test_unambiguous_country_resolution() {
        let resolver = LocationMentionResolver::new(gazetteer());
        let mut db = ActorDatabase::new();
        let mut iraq = ActorRecord::new(400, "Iraq", ActorKind::Country);
        iraq.geoname_id = Some(GeonameId(18));
        db.add_actor(iraq);
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("an Iraqi said");
        let m = b.mention(s, 1, 1, EntityType::Per, MentionType::Desc).unwrap();
        b.entity(&[m]);
        let d = b.build();
        let sent = d.sentence(0);
        let res = resolver.unambiguous_country_resolution(sent, &sent.mentions[0], &db).unwrap();
        assert_eq!(res.score, RULE_BASED_SCORE);
        assert_eq!(res.resolution.geoname_id, Some(GeonameId(18)));
    }

    #[test]
    fn test_blocked_location() {
        let resolver = LocationMentionResolver::new(gazetteer());
        let d = doc("the West is calm", 1, 1);
        let s = d.sentence(0);
        assert!(resolver.is_blocked_location(s, &s.mentions[0]));
        assert!(resolver.candidate_resolutions(s, &s.mentions[0], true, &[]).is_empty());
    }
}
