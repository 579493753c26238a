//! # Gazetteer — Registros Geográficos
//!
//! Fonte de registros do geonames e da tabela de países. O motor consulta o
//! gazetteer apenas através do trait [`Gazetteer`]; [`MemoryGazetteer`] é a
//! implementação em memória carregável de JSON.
//!
//! ## Formas canônicas
//!
//! Antes de qualquer consulta, o texto de uma menção é convertido em uma ou
//! mais formas canônicas: minúsculas, sem "the " inicial, sem "prefecture",
//! com abreviações de estados expandidas (apenas em contexto "cidade, UF.") e
//! com gentílicos convertidos em nomes de países ("iraqi" → "iraq").

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::{Mention, Sentence};
use crate::error::Result;
use crate::ids::{ActorId, CountryId, GeonameId};

/// Informações de um país da tabela de países.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryInfo {
    pub country_id: CountryId,
    pub iso_code: String,
    /// Ator ICEWS correspondente ao país.
    #[serde(default)]
    pub actor_id: Option<ActorId>,
}

/// Resultado da resolução geográfica de uma menção.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoResolution {
    /// Ausente para resoluções vindas da tabela de países.
    pub geoname_id: Option<GeonameId>,
    pub city_name: String,
    pub country_code: String,
    pub population: u64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country_info: Option<CountryInfo>,
}

/// Resolução com pontuação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredGeoResolution {
    pub score: f64,
    pub resolution: GeoResolution,
}

impl ScoredGeoResolution {
    pub fn new(score: f64, resolution: GeoResolution) -> Self {
        Self { score, resolution }
    }
}

/// Interface de consulta geográfica.
pub trait Gazetteer: Send + Sync {
    /// Registros do geonames cujo nome ou nome alternativo é `name`.
    fn geoname_lookup(&self, name: &str) -> Vec<GeoResolution>;
    /// Resoluções da tabela de países para `name`.
    fn country_lookup(&self, name: &str) -> Vec<GeoResolution>;
    fn country_resolution(&self, iso_code: &str) -> Option<GeoResolution>;
    fn geo_resolution(&self, id: GeonameId) -> Option<GeoResolution>;
    /// Código da região de primeiro nível (ex.: estado "GA").
    fn geo_region(&self, id: GeonameId) -> Option<String>;
    fn nationality_to_nation(&self, word: &str) -> Option<String>;
    fn state_abbreviation(&self, abbreviation: &str) -> Option<String>;
    fn blocked_entries(&self) -> &[Regex];

    fn is_nationality_word(&self, word: &str) -> bool {
        self.nationality_to_nation(&word.to_lowercase()).is_some()
    }

    fn is_blocked(&self, canonical_name: &str) -> bool {
        self.blocked_entries().iter().any(|re| re.is_match(canonical_name))
    }

    /// Forma canônica de um texto, opcionalmente no contexto de uma menção.
    fn to_canonical_form(&self, text: &str, context: Option<(&Sentence, &Mention)>) -> String {
        let mut s = text.to_lowercase();
        if let Some(rest) = s.strip_prefix("the ") {
            s = rest.to_string();
        }
        s = s.replace(" prefecture ", " ");
        let mut s = s.trim().to_string();
        if let Some(expanded) = self.state_abbreviation(&s) {
            if context.map(|(sent, m)| is_ok_state_abbreviation(sent, m)).unwrap_or(false) {
                s = expanded;
            }
        }
        if let Some(nation) = self.nationality_to_nation(&s) {
            s = nation;
        }
        s.trim().to_string()
    }

    /// Todas as formas canônicas de uma menção, da mais completa à mais curta.
    fn canonical_forms(&self, sentence: &Sentence, mention: &Mention) -> Vec<String> {
        let context = Some((sentence, mention));
        let mut result = Vec::new();
        let full = sentence.node_text(mention.node);
        result.push(self.to_canonical_form(&full, context));

        let no_possessive = full.replace(" 's", "'s");
        if no_possessive != full {
            result.push(self.to_canonical_form(&no_possessive, context));
        }
        let full_no_punct = strip_punctuation(&full);
        if full_no_punct != full {
            result.push(self.to_canonical_form(&full_no_punct, context));
        }

        let head = sentence.node_text(mention.atomic_head);
        if head != full {
            result.push(self.to_canonical_form(&head, context));
            let head_no_punct = strip_punctuation(&head);
            if head_no_punct != head {
                result.push(self.to_canonical_form(&head_no_punct, context));
            }
        }
        result
    }
}

fn strip_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

/// Abreviações como "neb." só valem depois de vírgula ou hífen e no fim da frase.
fn is_ok_state_abbreviation(sentence: &Sentence, mention: &Mention) -> bool {
    let node = sentence.node(mention.node);
    let (start, end) = (node.start, node.end);
    if start == 0 {
        return false;
    }
    let previous = sentence.tokens[start - 1].as_str();
    if previous != "-" && previous != "," {
        return false;
    }
    if sentence.tokens[end].contains('.') {
        return true;
    }
    match sentence.tokens.get(end + 1) {
        None => true,
        Some(next) => next == ".",
    }
}

/// Registro do geonames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeonameRecord {
    pub id: GeonameId,
    pub name: String,
    #[serde(default)]
    pub alternate_names: Vec<String>,
    pub country_code: String,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Registro da tabela de países.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country_id: CountryId,
    pub iso_code: String,
    pub name: String,
    #[serde(default)]
    pub alternate_names: Vec<String>,
    #[serde(default)]
    pub actor_id: Option<ActorId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GazetteerFile {
    #[serde(default)]
    geonames: Vec<GeonameRecord>,
    #[serde(default)]
    countries: Vec<CountryRecord>,
    #[serde(default)]
    nationalities: HashMap<String, String>,
    #[serde(default)]
    state_abbreviations: HashMap<String, String>,
    #[serde(default)]
    blocked_entries: Vec<String>,
}

/// Gazetteer em memória.
#[derive(Debug, Clone, Default)]
pub struct MemoryGazetteer {
    geonames: Vec<GeonameRecord>,
    countries: Vec<CountryRecord>,
    nationalities: HashMap<String, String>,
    state_abbreviations: HashMap<String, String>,
    blocked: Vec<Regex>,
}

impl MemoryGazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: GazetteerFile = serde_json::from_str(json)?;
        let mut gazetteer = Self {
            geonames: file.geonames,
            countries: file.countries,
            nationalities: file.nationalities,
            state_abbreviations: file.state_abbreviations,
            blocked: Vec::new(),
        };
        for pattern in &file.blocked_entries {
            gazetteer.add_blocked_entry(pattern)?;
        }
        Ok(gazetteer)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn add_geoname(&mut self, record: GeonameRecord) {
        self.geonames.push(record);
    }

    pub fn add_country(&mut self, record: CountryRecord) {
        self.countries.push(record);
    }

    pub fn add_nationality(&mut self, nationality: &str, nation: &str) {
        self.nationalities
            .insert(nationality.to_lowercase(), nation.to_lowercase());
    }

    pub fn add_state_abbreviation(&mut self, abbreviation: &str, state: &str) {
        self.state_abbreviations
            .insert(abbreviation.to_lowercase(), state.to_lowercase());
    }

    /// Entrada bloqueada: expressão que precisa casar com o nome inteiro.
    pub fn add_blocked_entry(&mut self, pattern: &str) -> Result<()> {
        self.blocked.push(Regex::new(&format!("^(?:{pattern})$"))?);
        Ok(())
    }

    fn country_info(&self, iso_code: &str) -> Option<CountryInfo> {
        self.countries
            .iter()
            .find(|c| c.iso_code.eq_ignore_ascii_case(iso_code))
            .map(|c| CountryInfo {
                country_id: c.country_id,
                iso_code: c.iso_code.clone(),
                actor_id: c.actor_id,
            })
    }

    fn resolution_for(&self, record: &GeonameRecord) -> GeoResolution {
        GeoResolution {
            geoname_id: Some(record.id),
            city_name: record.name.clone(),
            country_code: record.country_code.clone(),
            population: record.population,
            latitude: record.latitude,
            longitude: record.longitude,
            country_info: self.country_info(&record.country_code),
        }
    }
}

impl Gazetteer for MemoryGazetteer {
    fn geoname_lookup(&self, name: &str) -> Vec<GeoResolution> {
        let name = name.trim().to_lowercase();
        if name.is_empty() || name.len() > 200 || self.is_blocked(&name) {
            return Vec::new();
        }
        let mut matches: Vec<&GeonameRecord> = self
            .geonames
            .iter()
            .filter(|g| {
                g.name.to_lowercase() == name
                    || g.alternate_names.iter().any(|a| a.to_lowercase() == name)
            })
            .collect();
        matches.sort_by(|a, b| b.id.cmp(&a.id));
        matches.into_iter().map(|g| self.resolution_for(g)).collect()
    }

    fn country_lookup(&self, name: &str) -> Vec<GeoResolution> {
        let name = name.trim().to_lowercase();
        self.countries
            .iter()
            .filter(|c| {
                c.name.to_lowercase() == name
                    || c.alternate_names.iter().any(|a| a.to_lowercase() == name)
            })
            .filter_map(|c| self.country_resolution(&c.iso_code))
            .collect()
    }

    fn country_resolution(&self, iso_code: &str) -> Option<GeoResolution> {
        let info = self.country_info(iso_code)?;
        // população e coordenadas da maior cidade do país
        let largest = self
            .geonames
            .iter()
            .filter(|g| g.country_code.eq_ignore_ascii_case(iso_code))
            .max_by(|a, b| a.population.cmp(&b.population).then(a.id.cmp(&b.id)));
        let name = self
            .countries
            .iter()
            .find(|c| c.iso_code.eq_ignore_ascii_case(iso_code))
            .map(|c| c.name.clone())
            .unwrap_or_default();
        Some(GeoResolution {
            geoname_id: None,
            city_name: name,
            country_code: info.iso_code.clone(),
            population: largest.map(|g| g.population).unwrap_or(0),
            latitude: largest.and_then(|g| g.latitude),
            longitude: largest.and_then(|g| g.longitude),
            country_info: Some(info),
        })
    }

    fn geo_resolution(&self, id: GeonameId) -> Option<GeoResolution> {
        self.geonames
            .iter()
            .find(|g| g.id == id)
            .map(|g| self.resolution_for(g))
    }

    fn geo_region(&self, id: GeonameId) -> Option<String> {
        self.geonames
            .iter()
            .find(|g| g.id == id)
            .and_then(|g| g.admin1.clone())
    }

    fn nationality_to_nation(&self, word: &str) -> Option<String> {
        self.nationalities.get(word).cloned()
    }

    fn state_abbreviation(&self, abbreviation: &str) -> Option<String> {
        self.state_abbreviations.get(abbreviation).cloned()
    }

    fn blocked_entries(&self) -> &[Regex] {
        &self.blocked
    }
}
