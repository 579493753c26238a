//! Os mesmos documentos passando por duas montagens de recursos: os dados de
//! exemplo construídos em código e uma cópia carregada de JSON, com uma base
//! de atores em tabela que marca indivíduos por flag.

use std::collections::HashMap;
use std::sync::Arc;

use icews_core::actor_info::{ActorInfo, ActorKind};
use icews_core::builder::DocumentBuilder;
use icews_core::document::{Document, EntityType, MentionType};
use icews_core::fixtures;
use icews_core::ids::{ActorId, AgentId, CountryId, GeonameId, MentionUid};
use icews_core::token_matcher::{ActorTokenMatcher, AgentTokenMatcher};
use icews_core::{
    ActorDatabase, ActorMention, ActorMentionFinder, FinderConfig, FinderMode, Gazetteer, MemoryGazetteer,
};

/// Base em tabela: tipo de entidade e flag de indivíduo por ator; o resto
/// vem da base de exemplo.
struct TableActorInfo {
    rows: HashMap<ActorId, (EntityType, bool)>,
    inner: ActorDatabase,
}

impl TableActorInfo {
    fn new(individual_flag_for_ruto: bool) -> Self {
        let mut rows = HashMap::new();
        for country in [
            fixtures::RUSSIA,
            fixtures::UKRAINE,
            fixtures::KENYA,
            fixtures::UNITED_STATES,
            fixtures::PALESTINE,
            fixtures::IRAQ,
        ] {
            rows.insert(country, (EntityType::Gpe, false));
        }
        rows.insert(fixtures::CENTRAL_BANK, (EntityType::Org, false));
        rows.insert(fixtures::RUTO, (EntityType::Per, individual_flag_for_ruto));
        Self {
            rows,
            inner: fixtures::actor_database(),
        }
    }
}

impl ActorInfo for TableActorInfo {
    fn actor_name(&self, id: ActorId) -> String {
        self.inner.actor_name(id)
    }
    fn actor_code(&self, id: ActorId) -> Option<String> {
        self.inner.actor_code(id)
    }
    fn actor_kind(&self, id: ActorId) -> Option<ActorKind> {
        self.rows.get(&id).map(|(entity_type, _)| match entity_type {
            EntityType::Gpe => ActorKind::Country,
            EntityType::Per => ActorKind::Individual,
            EntityType::Loc => ActorKind::Location,
            EntityType::Fac => ActorKind::Facility,
            _ => ActorKind::Organization,
        })
    }
    fn actor_by_name(&self, name: &str) -> Option<ActorId> {
        self.inner.actor_by_name(name)
    }
    fn actor_by_code(&self, code: &str) -> Option<ActorId> {
        self.inner.actor_by_code(code)
    }
    fn country_id(&self, id: ActorId) -> Option<CountryId> {
        self.inner.country_id(id)
    }
    fn associated_country_actor_ids(&self, id: ActorId, date: Option<&str>) -> Vec<ActorId> {
        self.inner.associated_country_actor_ids(id, date)
    }
    fn associated_location_actor_ids(&self, id: ActorId) -> Vec<ActorId> {
        self.inner.associated_location_actor_ids(id)
    }
    fn actor_sector_codes(&self, id: ActorId) -> Vec<String> {
        self.inner.actor_sector_codes(id)
    }
    fn importance_score(&self, id: ActorId) -> f64 {
        self.inner.importance_score(id)
    }
    fn actor_for_geoname(&self, geoname: GeonameId) -> Option<ActorId> {
        self.inner.actor_for_geoname(geoname)
    }
    fn agent_name(&self, id: AgentId) -> String {
        self.inner.agent_name(id)
    }
    fn agent_code(&self, id: AgentId) -> Option<String> {
        self.inner.agent_code(id)
    }
    fn agent_by_name(&self, name: &str) -> Option<AgentId> {
        self.inner.agent_by_name(name)
    }
    fn agent_sector_codes(&self, id: AgentId) -> Vec<String> {
        self.inner.agent_sector_codes(id)
    }
    fn is_restricted_to_country_actors(&self, id: AgentId) -> bool {
        self.inner.is_restricted_to_country_actors(id)
    }
    fn default_person_agent(&self) -> Option<AgentId> {
        self.inner.default_person_agent()
    }

    fn is_an_individual(&self, id: ActorId) -> bool {
        self.rows.get(&id).map(|(_, individual)| *individual).unwrap_or(false)
    }

    fn is_a_person(&self, id: ActorId) -> bool {
        self.rows.get(&id).map(|(entity_type, _)| *entity_type == EntityType::Per).unwrap_or(false)
    }
}

const GAZETTEER_JSON: &str = r#"{
  "geonames": [
    {"id": 5074472, "name": "Omaha", "country_code": "US", "admin1": "NE",
     "population": 486051, "latitude": 41.256, "longitude": -95.940},
    {"id": 5073708, "name": "Nebraska", "country_code": "US", "admin1": "NE",
     "population": 1961504, "latitude": 41.500, "longitude": -99.750},
    {"id": 99237, "name": "Iraq", "alternate_names": ["Republic of Iraq"], "country_code": "IQ",
     "population": 29671605, "latitude": 33.0, "longitude": 44.0}
  ],
  "countries": [
    {"country_id": 4, "iso_code": "US", "name": "United States",
     "alternate_names": ["USA", "America"], "actor_id": 4},
    {"country_id": 6, "iso_code": "IQ", "name": "Iraq", "actor_id": 6}
  ],
  "nationalities": {"iraqi": "iraq"},
  "state_abbreviations": {"neb.": "nebraska", "neb": "nebraska"}
}"#;

const ACTOR_PATTERNS_JSON: &str = r#"[
  {"pattern": "RUSSIA_", "id": 1, "pattern_id": 1, "code": "RUS", "weight": 1.0},
  {"pattern": "UKRAINE_", "id": 2, "pattern_id": 2, "code": "UKR", "weight": 1.0},
  {"pattern": "KENYA_", "id": 3, "pattern_id": 3, "code": "KEN", "weight": 1.0},
  {"pattern": "KENYAN_", "id": 3, "pattern_id": 4, "code": "KEN", "weight": 1.0},
  {"pattern": "CENTRAL_BANK_OF_KENYA_", "id": 10, "pattern_id": 5, "code": "KENCBK", "weight": 1.0},
  {"pattern": "PALESTINE_", "id": 5, "pattern_id": 6, "code": "PSE", "weight": 1.0},
  {"pattern": "PALESTINIAN_", "id": 5, "pattern_id": 7, "code": "PSE", "weight": 1.0},
  {"pattern": "UNITED_STATES_", "id": 4, "pattern_id": 8, "code": "USA", "weight": 1.0},
  {"pattern": "RUTO_", "id": 20, "pattern_id": 9, "weight": 1.0}
]"#;

const AGENT_PATTERNS_JSON: &str = r#"[
  {"pattern": "POLICE_", "id": 101, "pattern_id": 1, "code": "COP"},
  {"pattern": "ACTIVIST_", "id": 102, "pattern_id": 2, "code": "ACT"},
  {"pattern": "GOVERNMENT_", "id": 103, "pattern_id": 3, "code": "GOV"}
]"#;

fn config(mode: FinderMode) -> FinderConfig {
    let mut config = fixtures::config();
    config.mode = mode;
    config
}

fn table_finder(config: FinderConfig, individual_flag_for_ruto: bool) -> ActorMentionFinder {
    let gazetteer: Arc<dyn Gazetteer> = Arc::new(MemoryGazetteer::from_json_str(GAZETTEER_JSON).unwrap());
    let actor_matcher = ActorTokenMatcher::from_json_str("actor", ACTOR_PATTERNS_JSON).unwrap();
    let agent_matcher = AgentTokenMatcher::from_json_str("agent", AGENT_PATTERNS_JSON).unwrap();
    ActorMentionFinder::new(
        config,
        Arc::new(TableActorInfo::new(individual_flag_for_ruto)),
        gazetteer,
        actor_matcher,
    )
    .unwrap()
    .with_agent_matcher(agent_matcher)
}

fn two_countries() -> Document {
    let mut b = DocumentBuilder::new("russia");
    let s = b.sentence("Russia sent troops to Ukraine .");
    let russia = b.mention(s, 0, 0, EntityType::Gpe, MentionType::Name).unwrap();
    let ukraine = b.mention(s, 4, 4, EntityType::Gpe, MentionType::Name).unwrap();
    b.entity(&[russia]);
    b.entity(&[ukraine]);
    b.build()
}

fn kenya_bank() -> Document {
    let mut b = DocumentBuilder::new("kenya");
    let s0 = b.sentence("Kenya votes today");
    let kenya = b.mention(s0, 0, 0, EntityType::Gpe, MentionType::Name).unwrap();
    let s1 = b.sentence("the Central Bank of Kenya cut rates");
    let bank = b.mention(s1, 1, 4, EntityType::Org, MentionType::Name).unwrap();
    let s2 = b.sentence("Ruto spoke");
    let ruto = b.mention(s2, 0, 0, EntityType::Per, MentionType::Name).unwrap();
    b.entity(&[kenya]);
    b.entity(&[bank]);
    b.entity(&[ruto]);
    b.build()
}

fn documents() -> Vec<Document> {
    vec![
        fixtures::demo_document().unwrap(),
        fixtures::omaha_document().unwrap(),
        two_countries(),
        kenya_bank(),
    ]
}

fn sentence_candidates(finder: &mut ActorMentionFinder, doc: &Document) -> Vec<ActorMention> {
    finder.reset_for_new_document();
    let mut all = Vec::new();
    for sentno in 0..doc.sentence_count() {
        all.extend(finder.process_sentence(doc, sentno).unwrap());
    }
    all
}

#[test]
fn test_document_mode_is_independent_of_data_source() {
    let mut built = fixtures::finder(config(FinderMode::Icews)).unwrap();
    let mut loaded = table_finder(config(FinderMode::Icews), true);
    for doc in documents() {
        let expected = built.process(&doc).unwrap().all();
        let actual = loaded.process(&doc).unwrap().all();
        assert!(!expected.is_empty(), "{}", doc.name);
        assert_eq!(expected, actual, "{}", doc.name);
    }
}

#[test]
fn test_sentence_and_doc_actor_modes_are_independent_of_data_source() {
    let mut built = fixtures::finder(config(FinderMode::ActorMatch)).unwrap();
    let mut loaded = table_finder(config(FinderMode::ActorMatch), true);
    let mut built_docs = fixtures::finder(config(FinderMode::DocActors)).unwrap();
    let mut loaded_docs = table_finder(config(FinderMode::DocActors), true);
    for doc in documents() {
        let expected = sentence_candidates(&mut built, &doc);
        let actual = sentence_candidates(&mut loaded, &doc);
        assert_eq!(expected, actual, "{}", doc.name);

        let expected = built_docs.process_doc_actors(&doc, expected).unwrap();
        let actual = loaded_docs.process_doc_actors(&doc, actual).unwrap();
        assert_eq!(expected, actual, "{}", doc.name);
    }
}

#[test]
fn test_single_token_person_penalized_without_individual_flag() {
    let doc = kenya_bank();
    let ruto = MentionUid::new(2, 0);
    for flag in [true, false] {
        let mut finder = table_finder(config(FinderMode::ActorMatch), flag);
        let candidates = sentence_candidates(&mut finder, &doc);
        let candidate = candidates
            .iter()
            .find(|m| m.uid == ruto && m.actor_id() == Some(fixtures::RUTO))
            .unwrap();
        assert!(candidate.scores().unwrap().pattern_match < 0.0, "flag {flag}");
    }
}
