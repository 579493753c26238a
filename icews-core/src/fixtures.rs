//! # Dados de Exemplo
//!
//! Uma base de atores, um gazetteer e matchers pequenos, suficientes para os
//! testes e para a página de demonstração do servidor web. Os valores seguem
//! as bases reais apenas no formato; ids e pesos são arbitrários.

use std::sync::Arc;

use crate::actor_info::{ActorDatabase, ActorKind, AgentRecord, ActorRecord, CountryAssociation};
use crate::builder::DocumentBuilder;
use crate::config::FinderConfig;
use crate::document::{Document, EntityType, MentionType};
use crate::error::Result;
use crate::finder::ActorMentionFinder;
use crate::gazetteer::{CountryRecord, GeonameRecord, MemoryGazetteer};
use crate::ids::{ActorId, ActorPatternId, AgentId, AgentPatternId, CountryId, GeonameId};
use crate::pattern::{PatternRule, RulePatternMatcher};
use crate::token_matcher::{ActorTokenMatcher, AgentTokenMatcher};

pub const RUSSIA: ActorId = ActorId(1);
pub const UKRAINE: ActorId = ActorId(2);
pub const KENYA: ActorId = ActorId(3);
pub const UNITED_STATES: ActorId = ActorId(4);
pub const PALESTINE: ActorId = ActorId(5);
pub const IRAQ: ActorId = ActorId(6);
pub const CENTRAL_BANK: ActorId = ActorId(10);
pub const RUTO: ActorId = ActorId(20);

pub const POLICE: AgentId = AgentId(101);
pub const ACTIVIST: AgentId = AgentId(102);
pub const GOVERNMENT: AgentId = AgentId(103);
pub const CITIZEN: AgentId = AgentId(104);

pub const OMAHA_GEONAME: GeonameId = GeonameId(5_074_472);
pub const NEBRASKA_GEONAME: GeonameId = GeonameId(5_073_708);
pub const IRAQ_GEONAME: GeonameId = GeonameId(99_237);

fn country(id: ActorId, name: &str, code: &str, country_id: u32) -> ActorRecord {
    let mut record = ActorRecord::new(id.0, name, ActorKind::Country);
    record.code = Some(code.to_string());
    record.country_id = Some(CountryId(country_id));
    record.sectors = vec!["Country".to_string()];
    record.importance = 1.0;
    record
}

pub fn actor_database() -> ActorDatabase {
    let mut db = ActorDatabase::new();
    db.add_actor(country(RUSSIA, "Russia", "RUS", 1));
    db.add_actor(country(UKRAINE, "Ukraine", "UKR", 2));
    db.add_actor(country(KENYA, "Kenya", "KEN", 3));
    db.add_actor(country(UNITED_STATES, "United States", "USA", 4));
    db.add_actor(country(PALESTINE, "Palestine", "PSE", 5));
    let mut iraq = country(IRAQ, "Iraq", "IRQ", 6);
    iraq.geoname_id = Some(IRAQ_GEONAME);
    db.add_actor(iraq);

    let mut bank = ActorRecord::new(CENTRAL_BANK.0, "Central Bank of Kenya", ActorKind::Organization);
    bank.code = Some("KENCBK".to_string());
    bank.associations = vec![CountryAssociation::always(KENYA)];
    bank.sectors = vec!["Finance".to_string()];
    bank.importance = 0.4;
    db.add_actor(bank);

    let mut ruto = ActorRecord::new(RUTO.0, "William Ruto", ActorKind::Individual);
    ruto.associations = vec![CountryAssociation::always(KENYA)];
    ruto.importance = 0.7;
    db.add_actor(ruto);

    let mut police = AgentRecord::new(POLICE.0, "Police", "COP");
    police.sectors = vec!["Police".to_string()];
    db.add_agent(police);
    let mut activist = AgentRecord::new(ACTIVIST.0, "Activist", "ACT");
    activist.sectors = vec!["Activism".to_string()];
    db.add_agent(activist);
    let mut government = AgentRecord::new(GOVERNMENT.0, "Government", "GOV");
    government.restricted_to_country_actors = true;
    government.sectors = vec!["Government".to_string()];
    db.add_agent(government);
    db.add_agent(AgentRecord::new(CITIZEN.0, "Citizen", "CVL"));
    db.set_default_person_agent(CITIZEN);
    db
}

pub fn gazetteer() -> MemoryGazetteer {
    let mut gazetteer = MemoryGazetteer::new();
    gazetteer.add_geoname(GeonameRecord {
        id: OMAHA_GEONAME,
        name: "Omaha".to_string(),
        alternate_names: Vec::new(),
        country_code: "US".to_string(),
        admin1: Some("NE".to_string()),
        population: 486_051,
        latitude: Some(41.256),
        longitude: Some(-95.940),
    });
    gazetteer.add_geoname(GeonameRecord {
        id: NEBRASKA_GEONAME,
        name: "Nebraska".to_string(),
        alternate_names: Vec::new(),
        country_code: "US".to_string(),
        admin1: Some("NE".to_string()),
        population: 1_961_504,
        latitude: Some(41.500),
        longitude: Some(-99.750),
    });
    gazetteer.add_geoname(GeonameRecord {
        id: IRAQ_GEONAME,
        name: "Iraq".to_string(),
        alternate_names: vec!["Republic of Iraq".to_string()],
        country_code: "IQ".to_string(),
        admin1: None,
        population: 29_671_605,
        latitude: Some(33.0),
        longitude: Some(44.0),
    });
    gazetteer.add_country(CountryRecord {
        country_id: CountryId(4),
        iso_code: "US".to_string(),
        name: "United States".to_string(),
        alternate_names: vec!["USA".to_string(), "America".to_string()],
        actor_id: Some(UNITED_STATES),
    });
    gazetteer.add_country(CountryRecord {
        country_id: CountryId(6),
        iso_code: "IQ".to_string(),
        name: "Iraq".to_string(),
        alternate_names: Vec::new(),
        actor_id: Some(IRAQ),
    });
    gazetteer.add_nationality("iraqi", "iraq");
    gazetteer.add_state_abbreviation("neb.", "nebraska");
    gazetteer.add_state_abbreviation("neb", "nebraska");
    gazetteer
}

/// Padrões de atores por nome. "Iraqi" fica de fora de propósito: o gentílico
/// só é resolvido pelo gazetteer.
pub fn actor_matcher() -> ActorTokenMatcher {
    let mut matcher = ActorTokenMatcher::new("actor");
    let patterns: [(&str, ActorId, &str); 9] = [
        ("RUSSIA_", RUSSIA, "RUS"),
        ("UKRAINE_", UKRAINE, "UKR"),
        ("KENYA_", KENYA, "KEN"),
        ("KENYAN_", KENYA, "KEN"),
        ("CENTRAL_BANK_OF_KENYA_", CENTRAL_BANK, "KENCBK"),
        ("PALESTINE_", PALESTINE, "PSE"),
        ("PALESTINIAN_", PALESTINE, "PSE"),
        ("UNITED_STATES_", UNITED_STATES, "USA"),
        ("RUTO_", RUTO, ""),
    ];
    for (index, (pattern, actor, code)) in patterns.into_iter().enumerate() {
        let code = (!code.is_empty()).then_some(code);
        matcher.add_pattern(pattern, Some(ActorPatternId(index as u32 + 1)), actor, code, 1.0);
    }
    matcher
}

pub fn agent_matcher() -> AgentTokenMatcher {
    let mut matcher = AgentTokenMatcher::new("agent");
    matcher.add_pattern("POLICE_", Some(AgentPatternId(1)), POLICE, Some("COP"), 0.0);
    matcher.add_pattern("ACTIVIST_", Some(AgentPatternId(2)), ACTIVIST, Some("ACT"), 0.0);
    matcher.add_pattern("GOVERNMENT_", Some(AgentPatternId(3)), GOVERNMENT, Some("GOV"), 0.0);
    matcher
}

/// Regras de pares agente/ator: ator aninhado, "of"-frase e possessivo.
pub fn pair_patterns() -> RulePatternMatcher {
    RulePatternMatcher::new(vec![
        PatternRule::NestedActor {
            label: "nested_actor".to_string(),
            score: 1.0,
        },
        PatternRule::OfPhrase {
            label: "of_phrase".to_string(),
            prepositions: vec!["of".to_string(), "from".to_string(), "in".to_string()],
            score: 1.0,
        },
        PatternRule::Possessive {
            label: "possessive".to_string(),
            score: 1.0,
        },
    ])
}

/// Configuração dos testes: silenciosa, com os estados usados pela dateline.
pub fn config() -> FinderConfig {
    FinderConfig {
        verbosity: 0,
        us_state_names: vec!["nebraska".to_string(), "neb".to_string()],
        country_modifier_words: ["western", "eastern", "northern", "southern"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        person_agent_name_words: ["president", "minister"].iter().map(|s| s.to_string()).collect(),
        ..FinderConfig::default()
    }
}

/// Localizador com a base, o gazetteer e os matchers de exemplo.
pub fn finder(config: FinderConfig) -> Result<ActorMentionFinder> {
    finder_with_actor_matcher(config, actor_matcher())
}

/// Como [`finder`], trocando o matcher de atores.
pub fn finder_with_actor_matcher(config: FinderConfig, actor_matcher: ActorTokenMatcher) -> Result<ActorMentionFinder> {
    let finder = ActorMentionFinder::new(config, Arc::new(actor_database()), Arc::new(gazetteer()), actor_matcher)?
        .with_agent_matcher(agent_matcher());
    Ok(finder)
}

/// "omaha , neb .": a dateline de três menções.
pub fn omaha_document() -> Result<Document> {
    let mut b = DocumentBuilder::new("omaha");
    let s = b.sentence("omaha , neb.");
    b.root_tag(s, "FRAGMENTS");
    let omaha = b.mention(s, 0, 0, EntityType::Gpe, MentionType::Name)?;
    let comma = b.mention(s, 1, 1, EntityType::Oth, MentionType::None)?;
    let state = b.mention(s, 2, 2, EntityType::Gpe, MentionType::Name)?;
    b.link(omaha, comma)?;
    b.entity(&[omaha]);
    b.entity(&[state]);
    Ok(b.build())
}

/// Documento curto da página de demonstração.
pub fn demo_document() -> Result<Document> {
    let mut b = DocumentBuilder::new("demo");
    b.publication_date("2024-03-01");
    let s0 = b.sentence("Russia sent troops to Ukraine .");
    let russia = b.mention(s0, 0, 0, EntityType::Gpe, MentionType::Name)?;
    let ukraine = b.mention(s0, 4, 4, EntityType::Gpe, MentionType::Name)?;
    let s1 = b.sentence("Palestinian activists clashed with police .");
    let activists = b.mention(s1, 0, 1, EntityType::Per, MentionType::Desc)?;
    let police = b.mention(s1, 4, 4, EntityType::Org, MentionType::Desc)?;
    let s2 = b.sentence("the Iraqi said they fled .");
    let iraqi = b.mention(s2, 0, 1, EntityType::Per, MentionType::Desc)?;
    let they = b.mention(s2, 3, 3, EntityType::Per, MentionType::Pron)?;
    b.entity(&[russia]);
    b.entity(&[ukraine]);
    b.entity(&[activists, they]);
    b.entity(&[police]);
    b.entity(&[iraqi]);
    Ok(b.build())
}
