//! # Base de Atores e Agentes
//!
//! Dicionário somente-leitura que mapeia identificadores de atores e agentes
//! para nomes, códigos, classificação (país, indivíduo, organização...),
//! países e setores associados, e o caminho inverso geonameid → ator.
//!
//! O motor só conhece o trait [`ActorInfo`]. A implementação [`ActorDatabase`]
//! vive em memória e pode ser carregada de JSON, no mesmo espírito da base de
//! conhecimento simulada usada na etapa de linking.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::EntityType;
use crate::error::Result;
use crate::ids::{ActorId, AgentId, CountryId, GeonameId};

/// Classificação de um ator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Country,
    Individual,
    Organization,
    Location,
    Facility,
}

impl ActorKind {
    /// Tipo de entidade esperado para menções deste tipo de ator.
    pub fn entity_type(&self) -> EntityType {
        match self {
            ActorKind::Country => EntityType::Gpe,
            ActorKind::Individual => EntityType::Per,
            ActorKind::Organization => EntityType::Org,
            ActorKind::Location => EntityType::Loc,
            ActorKind::Facility => EntityType::Fac,
        }
    }
}

/// Interface de consulta usada pelo motor.
pub trait ActorInfo: Send + Sync {
    fn actor_name(&self, id: ActorId) -> String;
    fn actor_code(&self, id: ActorId) -> Option<String>;
    fn actor_kind(&self, id: ActorId) -> Option<ActorKind>;
    fn actor_by_name(&self, name: &str) -> Option<ActorId>;
    fn actor_by_code(&self, code: &str) -> Option<ActorId>;
    /// Identificador de país na tabela do gazetteer (apenas para países).
    fn country_id(&self, id: ActorId) -> Option<CountryId>;
    /// Países associados a um ator não-país, válidos na data de publicação.
    fn associated_country_actor_ids(&self, id: ActorId, date: Option<&str>) -> Vec<ActorId>;
    /// Locais cuja menção no documento satisfaz padrões que exigem contexto.
    fn associated_location_actor_ids(&self, id: ActorId) -> Vec<ActorId>;
    fn actor_sector_codes(&self, id: ActorId) -> Vec<String>;
    fn importance_score(&self, id: ActorId) -> f64;
    fn actor_for_geoname(&self, geoname: GeonameId) -> Option<ActorId>;

    fn agent_name(&self, id: AgentId) -> String;
    fn agent_code(&self, id: AgentId) -> Option<String>;
    fn agent_by_name(&self, name: &str) -> Option<AgentId>;
    fn agent_sector_codes(&self, id: AgentId) -> Vec<String>;
    /// O agente só faz sentido pareado com um país (ex.: "Ministry").
    fn is_restricted_to_country_actors(&self, id: AgentId) -> bool;
    fn default_person_agent(&self) -> Option<AgentId>;

    fn is_a_country(&self, id: ActorId) -> bool {
        self.actor_kind(id) == Some(ActorKind::Country)
    }

    fn is_an_individual(&self, id: ActorId) -> bool {
        self.actor_kind(id) == Some(ActorKind::Individual)
    }

    /// Ator cujo tipo de entidade é PER. Bases que marcam indivíduos com uma
    /// flag própria podem discordar de [`ActorInfo::is_an_individual`].
    fn is_a_person(&self, id: ActorId) -> bool {
        self.entity_type_for_actor(id) == Some(EntityType::Per)
    }

    fn is_an_organization(&self, id: ActorId) -> bool {
        self.actor_kind(id) == Some(ActorKind::Organization)
    }

    fn is_a_facility(&self, id: ActorId) -> bool {
        self.actor_kind(id) == Some(ActorKind::Facility)
    }

    fn might_be_a_location(&self, id: ActorId) -> bool {
        matches!(self.actor_kind(id), Some(ActorKind::Country | ActorKind::Location))
    }

    fn entity_type_for_actor(&self, id: ActorId) -> Option<EntityType> {
        self.actor_kind(id).map(|k| k.entity_type())
    }

    /// Identificadores de país dos países associados (ou do próprio país).
    fn associated_country_ids(&self, id: ActorId, date: Option<&str>) -> Vec<CountryId> {
        self.associated_country_actor_ids(id, date)
            .into_iter()
            .filter_map(|a| self.country_id(a))
            .collect()
    }
}

/// Associação temporal entre um ator e um país.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryAssociation {
    pub country: ActorId,
    /// Início da validade (`AAAA-MM-DD`), inclusivo.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Fim da validade (`AAAA-MM-DD`), inclusivo.
    #[serde(default)]
    pub end_date: Option<String>,
}

impl CountryAssociation {
    pub fn always(country: ActorId) -> Self {
        Self {
            country,
            start_date: None,
            end_date: None,
        }
    }

    /// Datas ISO comparam lexicograficamente; sem data, toda associação vale.
    pub fn is_valid_on(&self, date: Option<&str>) -> bool {
        let Some(date) = date else { return true };
        let after_start = self.start_date.as_deref().map(|s| s <= date).unwrap_or(true);
        let before_end = self.end_date.as_deref().map(|e| date <= e).unwrap_or(true);
        after_start && before_end
    }
}

/// Registro de um ator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: ActorId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub kind: ActorKind,
    #[serde(default)]
    pub country_id: Option<CountryId>,
    #[serde(default)]
    pub associations: Vec<CountryAssociation>,
    #[serde(default)]
    pub associated_locations: Vec<ActorId>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub importance: f64,
    #[serde(default)]
    pub geoname_id: Option<GeonameId>,
}

impl ActorRecord {
    pub fn new(id: u32, name: &str, kind: ActorKind) -> Self {
        Self {
            id: ActorId(id),
            name: name.to_string(),
            code: None,
            kind,
            country_id: None,
            associations: Vec::new(),
            associated_locations: Vec::new(),
            sectors: Vec::new(),
            importance: 0.0,
            geoname_id: None,
        }
    }
}

/// Registro de um agente (papel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub restricted_to_country_actors: bool,
    #[serde(default)]
    pub sectors: Vec<String>,
}

impl AgentRecord {
    pub fn new(id: u32, name: &str, code: &str) -> Self {
        Self {
            id: AgentId(id),
            name: name.to_string(),
            code: Some(code.to_string()),
            restricted_to_country_actors: false,
            sectors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DatabaseFile {
    #[serde(default)]
    actors: Vec<ActorRecord>,
    #[serde(default)]
    agents: Vec<AgentRecord>,
    #[serde(default)]
    default_person_agent: Option<AgentId>,
}

/// Base de atores em memória.
#[derive(Debug, Clone, Default)]
pub struct ActorDatabase {
    actors: HashMap<ActorId, ActorRecord>,
    agents: HashMap<AgentId, AgentRecord>,
    by_geoname: HashMap<GeonameId, ActorId>,
    default_person_agent: Option<AgentId>,
}

impl ActorDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: DatabaseFile = serde_json::from_str(json)?;
        let mut db = Self::new();
        for actor in file.actors {
            db.add_actor(actor);
        }
        for agent in file.agents {
            db.add_agent(agent);
        }
        db.default_person_agent = file.default_person_agent;
        Ok(db)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn add_actor(&mut self, actor: ActorRecord) {
        if let Some(geoname) = actor.geoname_id {
            self.by_geoname.insert(geoname, actor.id);
        }
        self.actors.insert(actor.id, actor);
    }

    pub fn add_agent(&mut self, agent: AgentRecord) {
        self.agents.insert(agent.id, agent);
    }

    pub fn set_default_person_agent(&mut self, agent: AgentId) {
        self.default_person_agent = Some(agent);
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorRecord> {
        self.actors.get(&id)
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentRecord> {
        self.agents.get(&id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl ActorInfo for ActorDatabase {
    fn actor_name(&self, id: ActorId) -> String {
        self.actor(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "UNKNOWN-ACTOR".to_string())
    }

    fn actor_code(&self, id: ActorId) -> Option<String> {
        self.actor(id).and_then(|a| a.code.clone())
    }

    fn actor_kind(&self, id: ActorId) -> Option<ActorKind> {
        self.actor(id).map(|a| a.kind)
    }

    fn actor_by_name(&self, name: &str) -> Option<ActorId> {
        let mut found: Vec<ActorId> = self
            .actors
            .values()
            .filter(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.id)
            .collect();
        found.sort();
        found.first().copied()
    }

    fn actor_by_code(&self, code: &str) -> Option<ActorId> {
        let mut found: Vec<ActorId> = self
            .actors
            .values()
            .filter(|a| a.code.as_deref() == Some(code))
            .map(|a| a.id)
            .collect();
        found.sort();
        found.first().copied()
    }

    fn country_id(&self, id: ActorId) -> Option<CountryId> {
        self.actor(id).and_then(|a| a.country_id)
    }

    fn associated_country_actor_ids(&self, id: ActorId, date: Option<&str>) -> Vec<ActorId> {
        self.actor(id)
            .map(|a| {
                a.associations
                    .iter()
                    .filter(|assoc| assoc.is_valid_on(date))
                    .map(|assoc| assoc.country)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn associated_location_actor_ids(&self, id: ActorId) -> Vec<ActorId> {
        self.actor(id)
            .map(|a| a.associated_locations.clone())
            .unwrap_or_default()
    }

    fn actor_sector_codes(&self, id: ActorId) -> Vec<String> {
        self.actor(id).map(|a| a.sectors.clone()).unwrap_or_default()
    }

    fn importance_score(&self, id: ActorId) -> f64 {
        self.actor(id).map(|a| a.importance).unwrap_or(0.0)
    }

    fn actor_for_geoname(&self, geoname: GeonameId) -> Option<ActorId> {
        self.by_geoname.get(&geoname).copied()
    }

    fn agent_name(&self, id: AgentId) -> String {
        self.agent(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "UNKNOWN-AGENT".to_string())
    }

    fn agent_code(&self, id: AgentId) -> Option<String> {
        self.agent(id).and_then(|a| a.code.clone())
    }

    fn agent_by_name(&self, name: &str) -> Option<AgentId> {
        let mut found: Vec<AgentId> = self
            .agents
            .values()
            .filter(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.id)
            .collect();
        found.sort();
        found.first().copied()
    }

    fn agent_sector_codes(&self, id: AgentId) -> Vec<String> {
        self.agent(id).map(|a| a.sectors.clone()).unwrap_or_default()
    }

    fn is_restricted_to_country_actors(&self, id: AgentId) -> bool {
        self.agent(id)
            .map(|a| a.restricted_to_country_actors)
            .unwrap_or(false)
    }

    fn default_person_agent(&self) -> Option<AgentId> {
        self.default_person_agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ActorDatabase {
        ActorDatabase::from_json_str(
            r#"{
                "actors": [
                    {"id": 1, "name": "Kenya", "code": "KEN", "kind": "country", "country_id": 10, "geoname_id": 192950},
                    {"id": 2, "name": "Central Bank of Kenya", "kind": "organization",
                     "associations": [{"country": 1, "start_date": "1966-01-01"}], "sectors": ["FIN"]},
                    {"id": 3, "name": "Uhuru Kenyatta", "kind": "individual",
                     "associations": [{"country": 1, "start_date": "2013-04-09", "end_date": "2022-09-13"}]}
                ],
                "agents": [{"id": 5, "name": "Citizen", "code": "CIT"}],
                "default_person_agent": 5
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_kind_helpers() {
        let db = sample();
        assert!(db.is_a_country(ActorId(1)));
        assert!(db.is_an_organization(ActorId(2)));
        assert!(db.is_an_individual(ActorId(3)));
        assert!(db.might_be_a_location(ActorId(1)));
        assert!(!db.might_be_a_location(ActorId(2)));
        assert_eq!(db.entity_type_for_actor(ActorId(3)), Some(EntityType::Per));
        assert!(db.is_a_person(ActorId(3)));
        assert!(!db.is_a_person(ActorId(2)));
    }

    #[test]
    fn test_associations_filtered_by_date() {
        let db = sample();
        assert_eq!(db.associated_country_actor_ids(ActorId(3), Some("2015-01-01")), vec![ActorId(1)]);
        assert!(db.associated_country_actor_ids(ActorId(3), Some("2023-01-01")).is_empty());
        assert_eq!(db.associated_country_actor_ids(ActorId(3), None), vec![ActorId(1)]);
        assert_eq!(db.associated_country_ids(ActorId(2), None), vec![CountryId(10)]);
    }

    #[test]
    fn test_reverse_lookups() {
        let db = sample();
        assert_eq!(db.actor_for_geoname(GeonameId(192950)), Some(ActorId(1)));
        assert_eq!(db.actor_by_code("KEN"), Some(ActorId(1)));
        assert_eq!(db.agent_by_name("citizen"), Some(AgentId(5)));
        assert_eq!(db.default_person_agent(), Some(AgentId(5)));
        assert_eq!(db.actor_name(ActorId(99)), "UNKNOWN-ACTOR");
    }
}
