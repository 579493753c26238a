//! # Identificadores opacos
//!
//! Atores, agentes, setores e padrões são identificados por inteiros pequenos
//! vindos da base de referência. Ator ou agente desconhecido é sempre
//! `Option::None`, nunca um valor sentinela.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identificador de um ator (país, organização, pessoa...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u32);

/// Identificador de um agente (papel: "Activist", "Citizen", "Police"...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

/// Identificador de um setor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorId(pub u32);

/// Identificador do padrão de ator que produziu um casamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorPatternId(pub u32);

/// Identificador do padrão de agente que produziu um casamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentPatternId(pub u32);

/// Identificador de país na tabela de países do gazetteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(pub u32);

/// Identificador de um registro do geonames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeonameId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

impl fmt::Display for GeonameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identidade de uma menção de entidade: (sentença, índice da menção na sentença).
///
/// A ordenação é por sentença e depois por índice, o que dá ao
/// [`ActorMentionSet`](crate::actor_mention_set::ActorMentionSet) uma ordem de
/// iteração determinística.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MentionUid {
    pub sentence: usize,
    pub index: usize,
}

impl MentionUid {
    pub fn new(sentence: usize, index: usize) -> Self {
        Self { sentence, index }
    }
}

impl fmt::Display for MentionUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.sentence, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_uid_ordering() {
        let mut uids = vec![MentionUid::new(1, 0), MentionUid::new(0, 3), MentionUid::new(0, 1)];
        uids.sort();
        assert_eq!(uids, vec![MentionUid::new(0, 1), MentionUid::new(0, 3), MentionUid::new(1, 0)]);
    }

    #[test]
    fn test_ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&ActorId(42)).unwrap(), "42");
        let id: AgentId = serde_json::from_str("7").unwrap();
        assert_eq!(id, AgentId(7));
    }
}
