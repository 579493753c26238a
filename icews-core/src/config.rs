//! # Configuração do Localizador de Atores
//!
//! Toda a configuração fica num único objeto explícito, construído uma vez e
//! passado ao [`ActorMentionFinder`](crate::finder::ActorMentionFinder). Não há
//! singletons nem leitura de parâmetros globais durante o processamento.
//!
//! O formato de arquivo é JSON; todos os campos são opcionais e assumem os
//! valores padrão de produção.
//!
//! ```rust
//! use icews_core::config::{FinderConfig, FinderMode};
//!
//! let config = FinderConfig::from_json_str(r#"{"actor_match_aggressiveness": 0.9}"#).unwrap();
//! assert_eq!(config.mode, FinderMode::Icews);
//! assert!(config.is_aggressive());
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::EntityType;
use crate::error::{IcewsError, Result};

/// Limiar do nível conservador de agressividade.
pub const CONSERVATIVE_THRESHOLD: f64 = 0.1;
/// Limiar do nível equilibrado.
pub const BALANCED_THRESHOLD: f64 = 0.5;
/// Limiar do nível agressivo.
pub const AGGRESSIVE_THRESHOLD: f64 = 0.9;

/// Modo de operação do localizador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinderMode {
    /// Documento inteiro, pipeline completo de passes.
    Icews,
    /// Sentença a sentença, todos os candidatos (ferramenta de casamento externa).
    ActorMatch,
    /// Reavaliação por documento dos candidatos do modo sentença.
    DocActors,
}

impl Default for FinderMode {
    fn default() -> Self {
        FinderMode::Icews
    }
}

impl FinderMode {
    pub fn name(&self) -> &'static str {
        match self {
            FinderMode::Icews => "ICEWS",
            FinderMode::ActorMatch => "ACTOR_MATCH",
            FinderMode::DocActors => "DOC_ACTORS",
        }
    }
}

/// Configuração completa. Veja os campos para o efeito de cada opção.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    pub mode: FinderMode,
    /// Nível de detalhe dos logs (0..=5). Nunca altera resultados.
    pub verbosity: u8,
    pub disable_coref: bool,
    pub discard_pronoun_actors: bool,
    pub discard_plural_actors: bool,
    pub discard_plural_pronoun_actors: bool,
    /// Geo-resolve menções FAC do subtipo `Airport`.
    pub georesolve_facs: bool,
    pub encode_person_matching_country_as_citizen: bool,
    pub block_default_country_if_another_country_in_same_sentence: bool,
    pub block_default_country_if_unknown_paired_actor_is_found: bool,
    pub require_entity_type_match: bool,
    pub allow_fac_org_matches: bool,
    pub only_match_names: bool,
    /// Agressividade da propagação por correferência (0..=1).
    pub actor_match_aggressiveness: f64,
    pub max_ambiguity_for_gazetteer_actors: usize,
    /// Última sentença considerada; `None` processa todas.
    pub actor_event_sentence_cutoff: Option<usize>,
    pub log_sector_freqs: bool,
    /// Nomes de estados dos EUA, em minúsculas.
    pub us_state_names: Vec<String>,
    /// Tags de raiz aceitas pela regra "cidade, estado".
    pub us_city_root_tags: Vec<String>,
    pub types_to_force_as_actor_mentions: Vec<EntityType>,
    /// Códigos de atores que não contam para o país padrão (ex.: agências de notícias).
    pub actors_not_contributing_to_country_counts: Vec<String>,
    pub country_modifier_words: HashSet<String>,
    pub person_modifier_words: HashSet<String>,
    pub organization_modifier_words: HashSet<String>,
    /// Palavras núcleo permitidas para agentes casados dentro de nomes de pessoas.
    pub person_agent_name_words: HashSet<String>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            mode: FinderMode::Icews,
            verbosity: 1,
            disable_coref: false,
            discard_pronoun_actors: false,
            discard_plural_actors: false,
            discard_plural_pronoun_actors: false,
            georesolve_facs: false,
            encode_person_matching_country_as_citizen: true,
            block_default_country_if_another_country_in_same_sentence: true,
            block_default_country_if_unknown_paired_actor_is_found: true,
            require_entity_type_match: false,
            allow_fac_org_matches: false,
            only_match_names: false,
            actor_match_aggressiveness: BALANCED_THRESHOLD,
            max_ambiguity_for_gazetteer_actors: 3,
            actor_event_sentence_cutoff: None,
            log_sector_freqs: false,
            us_state_names: Vec::new(),
            us_city_root_tags: ["FRAGMENTS", "FRAG", "NPA", "NP", "NPP"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            types_to_force_as_actor_mentions: Vec::new(),
            actors_not_contributing_to_country_counts: Vec::new(),
            country_modifier_words: HashSet::new(),
            person_modifier_words: HashSet::new(),
            organization_modifier_words: HashSet::new(),
            person_agent_name_words: HashSet::new(),
        }
    }
}

impl FinderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lê e valida uma configuração JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FinderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Lê e valida uma configuração a partir de um arquivo JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.actor_match_aggressiveness) {
            return Err(IcewsError::Config(format!(
                "actor_match_aggressiveness deve estar entre 0 e 1 (recebido {})",
                self.actor_match_aggressiveness
            )));
        }
        if self.max_ambiguity_for_gazetteer_actors == 0 {
            return Err(IcewsError::Config(
                "max_ambiguity_for_gazetteer_actors deve ser pelo menos 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Número de sentenças efetivamente processadas num documento.
    pub fn sentence_limit(&self, sentence_count: usize) -> usize {
        match self.actor_event_sentence_cutoff {
            Some(cutoff) => cutoff.min(sentence_count),
            None => sentence_count,
        }
    }

    pub fn is_aggressive(&self) -> bool {
        self.actor_match_aggressiveness > AGGRESSIVE_THRESHOLD
    }

    /// Liga o terceiro passe de correferência (agressividade total).
    pub fn runs_full_coref_pass(&self) -> bool {
        self.actor_match_aggressiveness > CONSERVATIVE_THRESHOLD
    }

    pub fn is_us_state_name(&self, word: &str) -> bool {
        self.us_state_names.iter().any(|s| s == word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_parameters() {
        let config = FinderConfig::default();
        assert_eq!(config.verbosity, 1);
        assert!(config.encode_person_matching_country_as_citizen);
        assert!(config.block_default_country_if_another_country_in_same_sentence);
        assert_eq!(config.max_ambiguity_for_gazetteer_actors, 3);
        assert_eq!(config.actor_match_aggressiveness, 0.5);
        assert!(config.runs_full_coref_pass());
        assert!(!config.is_aggressive());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = FinderConfig::from_json_str(
            r#"{"mode": "actor_match", "types_to_force_as_actor_mentions": ["PER", "ORG"]}"#,
        )
        .unwrap();
        assert_eq!(config.mode, FinderMode::ActorMatch);
        assert_eq!(config.types_to_force_as_actor_mentions, vec![EntityType::Per, EntityType::Org]);
        assert!(config.us_city_root_tags.contains(&"FRAGMENTS".to_string()));
    }

    #[test]
    fn test_invalid_aggressiveness_rejected() {
        let err = FinderConfig::from_json_str(r#"{"actor_match_aggressiveness": 1.5}"#).unwrap_err();
        assert!(matches!(err, IcewsError::Config(_)));
    }

    #[test]
    fn test_sentence_limit() {
        let mut config = FinderConfig::default();
        assert_eq!(config.sentence_limit(12), 12);
        config.actor_event_sentence_cutoff = Some(5);
        assert_eq!(config.sentence_limit(12), 5);
        assert_eq!(config.sentence_limit(3), 3);
    }
}
