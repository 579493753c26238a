//! # Menções de Atores
//!
//! Uma [`ActorMention`] liga exatamente uma menção de entidade a uma
//! interpretação de ator. A interpretação é um tipo soma fechado:
//!
//! - [`ActorMentionKind::Bare`]: marcador sem ator nem agente (bloqueios
//!   explícitos, criação forçada). Descartado no fim do pipeline.
//! - [`ActorMentionKind::ProperNoun`]: referência direta a um ator, com
//!   resolução geográfica opcional.
//! - [`ActorMentionKind::Composite`]: um agente (papel) pareado com um ator que
//!   pode ser desconhecido ("Palestinian activists" → Activist-FOR-Palestine).
//!
//! Menções são valores imutáveis: toda transição (par padrão, cópia para uma
//! menção correferente, geo-resolução tardia) produz um valor novo que
//! substitui o antigo no [`ActorMentionSet`](crate::actor_mention_set::ActorMentionSet).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::gazetteer::GeoResolution;
use crate::ids::{ActorId, ActorPatternId, AgentId, AgentPatternId, MentionUid};
use crate::token_matcher::ActorMatch;

/// Identificadores de um ator, como casado no texto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorIdentifiers {
    pub id: ActorId,
    pub name: String,
    pub code: Option<String>,
    pub pattern_id: Option<ActorPatternId>,
    #[serde(default)]
    pub is_acronym: bool,
    #[serde(default)]
    pub requires_context: bool,
}

impl ActorIdentifiers {
    pub fn new(id: ActorId, name: String, code: Option<String>, pattern_id: Option<ActorPatternId>) -> Self {
        Self {
            id,
            name,
            code,
            pattern_id,
            is_acronym: false,
            requires_context: false,
        }
    }

    /// Identificadores vindos de um casamento de padrão.
    pub fn from_match(m: &ActorMatch, name: String, requires_context: bool) -> Self {
        Self {
            id: m.id,
            name,
            code: m.code.clone(),
            pattern_id: m.pattern_id,
            is_acronym: m.is_acronym,
            requires_context,
        }
    }
}

/// Identificadores de um agente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentIdentifiers {
    pub id: AgentId,
    pub name: String,
    pub code: Option<String>,
    pub pattern_id: Option<AgentPatternId>,
}

impl AgentIdentifiers {
    pub fn new(id: AgentId, name: String, code: Option<String>, pattern_id: Option<AgentPatternId>) -> Self {
        Self { id, name, code, pattern_id }
    }
}

/// Pontuações exportadas no modo sentença (ACTOR_MATCH).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorMatchScores {
    pub pattern_match: f64,
    pub pattern_confidence: f64,
    pub association: f64,
    pub edit_distance: f64,
    pub georesolution: f64,
    pub importance: f64,
}

/// Interpretação de uma menção.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActorMentionKind {
    Bare,
    ProperNoun {
        actor: ActorIdentifiers,
        geo: Option<GeoResolution>,
        scores: ActorMatchScores,
    },
    Composite {
        agent: AgentIdentifiers,
        paired_actor: Option<ActorIdentifiers>,
        /// Nome do padrão que produziu o par agente/ator.
        pattern_name: String,
    },
}

/// Uma menção de ator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorMention {
    pub uid: MentionUid,
    /// Nota de criação (ex.: `ACTOR_PATTERN`).
    source_note: String,
    /// Notas acrescentadas depois, a mais recente primeiro.
    notes: Vec<String>,
    pub kind: ActorMentionKind,
}

impl ActorMention {
    pub fn bare(uid: MentionUid, note: &str) -> Self {
        Self {
            uid,
            source_note: note.to_string(),
            notes: Vec::new(),
            kind: ActorMentionKind::Bare,
        }
    }

    pub fn proper_noun(uid: MentionUid, note: &str, actor: ActorIdentifiers) -> Self {
        Self {
            uid,
            source_note: note.to_string(),
            notes: Vec::new(),
            kind: ActorMentionKind::ProperNoun {
                actor,
                geo: None,
                scores: ActorMatchScores::default(),
            },
        }
    }

    pub fn composite(
        uid: MentionUid,
        note: &str,
        agent: AgentIdentifiers,
        paired_actor: Option<ActorIdentifiers>,
        pattern_name: &str,
    ) -> Self {
        Self {
            uid,
            source_note: note.to_string(),
            notes: Vec::new(),
            kind: ActorMentionKind::Composite {
                agent,
                paired_actor,
                pattern_name: pattern_name.to_string(),
            },
        }
    }

    /// Anexa uma resolução geográfica (apenas para nomes próprios).
    pub fn with_geo(mut self, resolution: Option<GeoResolution>) -> Self {
        if let ActorMentionKind::ProperNoun { geo, .. } = &mut self.kind {
            *geo = resolution;
        }
        self
    }

    /// Acrescenta uma nota de proveniência.
    pub fn with_note(mut self, note: &str) -> Self {
        self.add_note(note);
        self
    }

    pub fn add_note(&mut self, note: &str) {
        self.notes.insert(0, note.to_string());
    }

    /// Proveniência completa: notas acrescentadas e a nota de criação, separadas por `:`.
    pub fn provenance(&self) -> String {
        let mut parts: Vec<&str> = self.notes.iter().map(String::as_str).collect();
        parts.push(&self.source_note);
        parts.join(":")
    }

    pub fn source_note(&self) -> &str {
        &self.source_note
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn has_note(&self, note: &str) -> bool {
        self.source_note == note || self.notes.iter().any(|n| n == note)
    }

    /// Copia a interpretação para outra menção (correferência, partitivos...).
    pub fn copy_with_new_mention(&self, uid: MentionUid, note: &str) -> Self {
        let mut copy = self.clone();
        copy.uid = uid;
        copy.add_note(note);
        copy
    }

    /// Novo valor com o ator pareado preenchido; só vale para compostos.
    pub fn with_paired_actor(&self, actor: ActorIdentifiers, note: &str) -> Self {
        let mut copy = self.clone();
        if let ActorMentionKind::Composite { paired_actor, .. } = &mut copy.kind {
            *paired_actor = Some(actor);
            copy.add_note(note);
        }
        copy
    }

    pub fn is_bare(&self) -> bool {
        matches!(self.kind, ActorMentionKind::Bare)
    }

    pub fn is_proper_noun(&self) -> bool {
        matches!(self.kind, ActorMentionKind::ProperNoun { .. })
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, ActorMentionKind::Composite { .. })
    }

    /// Ator de um nome próprio.
    pub fn actor(&self) -> Option<&ActorIdentifiers> {
        match &self.kind {
            ActorMentionKind::ProperNoun { actor, .. } => Some(actor),
            _ => None,
        }
    }

    pub fn actor_id(&self) -> Option<ActorId> {
        self.actor().map(|a| a.id)
    }

    pub fn geo(&self) -> Option<&GeoResolution> {
        match &self.kind {
            ActorMentionKind::ProperNoun { geo, .. } => geo.as_ref(),
            _ => None,
        }
    }

    pub fn scores(&self) -> Option<&ActorMatchScores> {
        match &self.kind {
            ActorMentionKind::ProperNoun { scores, .. } => Some(scores),
            _ => None,
        }
    }

    pub fn scores_mut(&mut self) -> Option<&mut ActorMatchScores> {
        match &mut self.kind {
            ActorMentionKind::ProperNoun { scores, .. } => Some(scores),
            _ => None,
        }
    }

    pub fn agent(&self) -> Option<&AgentIdentifiers> {
        match &self.kind {
            ActorMentionKind::Composite { agent, .. } => Some(agent),
            _ => None,
        }
    }

    pub fn agent_id(&self) -> Option<AgentId> {
        self.agent().map(|a| a.id)
    }

    /// Ator pareado de um composto (`None` também quando desconhecido).
    pub fn paired_actor(&self) -> Option<&ActorIdentifiers> {
        match &self.kind {
            ActorMentionKind::Composite { paired_actor, .. } => paired_actor.as_ref(),
            _ => None,
        }
    }

    pub fn paired_actor_id(&self) -> Option<ActorId> {
        self.paired_actor().map(|a| a.id)
    }

    /// Composto cujo ator pareado ainda é desconhecido.
    pub fn is_unpaired_composite(&self) -> bool {
        matches!(self.kind, ActorMentionKind::Composite { paired_actor: None, .. })
    }

    pub fn pattern_name(&self) -> Option<&str> {
        match &self.kind {
            ActorMentionKind::Composite { pattern_name, .. } => Some(pattern_name),
            _ => None,
        }
    }

    /// Identificadores que um agente pareado com esta menção herda.
    pub fn identifiers_for_pairing(&self) -> Option<&ActorIdentifiers> {
        match &self.kind {
            ActorMentionKind::ProperNoun { actor, .. } => Some(actor),
            ActorMentionKind::Composite { paired_actor, .. } => paired_actor.as_ref(),
            ActorMentionKind::Bare => None,
        }
    }
}

impl fmt::Display for ActorMention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ActorMentionKind::Bare => write!(f, "ActorMention[{}]", self.provenance()),
            ActorMentionKind::ProperNoun { actor, geo, .. } => {
                write!(f, "ProperNounActorMention[{}", actor.name)?;
                if let Some(code) = &actor.code {
                    write!(f, " ({code})")?;
                }
                if let Some(g) = geo {
                    write!(f, " @{}/{}", g.city_name, g.country_code)?;
                }
                write!(f, "]")
            }
            ActorMentionKind::Composite { agent, paired_actor, .. } => {
                let actor = paired_actor
                    .as_ref()
                    .map(|a| a.name.as_str())
                    .unwrap_or("UNKNOWN-ACTOR");
                write!(f, "CompositeActorMention[{}-FOR-{}]", agent.name, actor)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kenya() -> ActorIdentifiers {
        ActorIdentifiers::new(ActorId(1), "Kenya".into(), Some("KEN".into()), Some(ActorPatternId(3)))
    }

    fn police() -> AgentIdentifiers {
        AgentIdentifiers::new(AgentId(9), "Police".into(), Some("COP".into()), None)
    }

    #[test]
    fn test_provenance_puts_newest_note_first() {
        let m = ActorMention::proper_noun(MentionUid::new(0, 0), "ACTOR_PATTERN", kenya())
            .with_note("PATTERN_END_IS_NOT_MENTION_END");
        let copy = m.copy_with_new_mention(MentionUid::new(2, 1), "COREF");
        assert_eq!(copy.provenance(), "COREF:PATTERN_END_IS_NOT_MENTION_END:ACTOR_PATTERN");
        assert_eq!(copy.uid, MentionUid::new(2, 1));
        assert_eq!(copy.actor_id(), Some(ActorId(1)));
        assert!(copy.has_note("COREF"));
    }

    #[test]
    fn test_with_paired_actor_is_a_new_value() {
        let unpaired = ActorMention::composite(MentionUid::new(0, 1), "AGENT_PATTERN", police(), None, "UNKNOWN-ACTOR");
        assert!(unpaired.is_unpaired_composite());
        let paired = unpaired.with_paired_actor(kenya(), "DEFAULT-COUNTRY");
        assert!(unpaired.is_unpaired_composite());
        assert_eq!(paired.paired_actor_id(), Some(ActorId(1)));
        assert_eq!(paired.provenance(), "DEFAULT-COUNTRY:AGENT_PATTERN");
        assert_eq!(paired.to_string(), "CompositeActorMention[Police-FOR-Kenya]");
    }

    #[test]
    fn test_with_paired_actor_ignores_proper_nouns() {
        let pn = ActorMention::proper_noun(MentionUid::new(0, 0), "ACTOR_PATTERN", kenya());
        let same = pn.with_paired_actor(kenya(), "DEFAULT-COUNTRY");
        assert_eq!(pn, same);
    }

    #[test]
    fn test_identifiers_for_pairing() {
        let pn = ActorMention::proper_noun(MentionUid::new(0, 0), "ACTOR_PATTERN", kenya());
        assert_eq!(pn.identifiers_for_pairing().map(|a| a.id), Some(ActorId(1)));
        let bare = ActorMention::bare(MentionUid::new(0, 0), "BLOCK_ACTOR");
        assert!(bare.identifiers_for_pairing().is_none());
        assert!(bare.is_bare());
    }
}
