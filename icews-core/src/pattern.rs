//! # Casamento de Padrões Estruturais
//!
//! O localizador consulta padrões estruturais (pares agente/ator, bloqueios
//! de país padrão, padrões de agentes por nome) apenas através do trait
//! [`PatternMatcher`]. Cada casamento é um [`PatternFeatureSet`]: um rótulo,
//! um score e valores de retorno nomeados que apontam para menções.
//!
//! [`RulePatternMatcher`] é um conjunto pequeno de regras estruturais
//! carregável de JSON:
//!
//! | regra            | forma                                 | retornos            |
//! |------------------|---------------------------------------|---------------------|
//! | `nested_actor`   | `[Palestinian] activists`             | `AGENT`, `ACTOR`    |
//! | `of_phrase`      | `minister of [Kenya]`                 | `AGENT`, `ACTOR`    |
//! | `possessive`     | `[Kenya] 's president`                | `AGENT`, `ACTOR`    |
//! | `block_words`    | menção contendo uma palavra da lista  | `BLOCK`             |
//! | `agent_head_words` | núcleo numa lista de palavras       | nome do agente      |

use serde::{Deserialize, Serialize};

use crate::actor_mention_set::ActorMentionSet;
use crate::document::{Document, EntityType, Mention, MentionType, Sentence};
use crate::error::Result;
use crate::ids::MentionUid;

/// Rótulo de retorno da menção agente.
pub const AGENT_RETURN: &str = "AGENT";
/// Rótulo de retorno da menção ator.
pub const ACTOR_RETURN: &str = "ACTOR";
/// Único rótulo de retorno aceito por padrões de bloqueio.
pub const BLOCK_RETURN: &str = "BLOCK";

/// Valor de retorno ligado a uma menção.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReturn {
    pub label: String,
    pub mention: MentionUid,
}

/// Um casamento de padrão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFeatureSet {
    /// Rótulo do padrão; casamentos sem rótulo são descartados com aviso.
    pub label: Option<String>,
    pub returns: Vec<PatternReturn>,
    pub score: f64,
}

impl PatternFeatureSet {
    pub fn new(label: Option<&str>, score: f64) -> Self {
        Self {
            label: label.map(str::to_string),
            returns: Vec::new(),
            score,
        }
    }

    pub fn with_return(mut self, label: &str, mention: MentionUid) -> Self {
        self.returns.push(PatternReturn {
            label: label.to_string(),
            mention,
        });
        self
    }

    /// Primeira menção retornada com o rótulo pedido.
    pub fn mention_for(&self, label: &str) -> Option<MentionUid> {
        self.returns.iter().find(|r| r.label == label).map(|r| r.mention)
    }
}

/// Interface do casador de padrões externo.
pub trait PatternMatcher: Send + Sync {
    /// Casamentos numa sentença; `actors` expõe os atores já aceitos.
    fn sentence_matches(&self, doc: &Document, sentence: usize, actors: &ActorMentionSet) -> Vec<PatternFeatureSet>;
}

fn default_prepositions() -> Vec<String> {
    ["of", "in", "for", "from"].iter().map(|s| s.to_string()).collect()
}

fn default_block_return() -> String {
    BLOCK_RETURN.to_string()
}

/// Uma regra estrutural.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PatternRule {
    /// Menção de ator que é pré-modificador de uma menção agente.
    NestedActor {
        label: String,
        #[serde(default)]
        score: f64,
    },
    /// Ator depois de uma preposição, dentro da menção agente ou logo após ela.
    OfPhrase {
        label: String,
        #[serde(default = "default_prepositions")]
        prepositions: Vec<String>,
        #[serde(default)]
        score: f64,
    },
    /// Ator seguido de possessivo dentro da menção agente.
    Possessive {
        label: String,
        #[serde(default)]
        score: f64,
    },
    /// Menções NAME/DESC que contêm uma das palavras.
    BlockWords {
        label: String,
        words: Vec<String>,
        #[serde(default = "default_block_return")]
        return_label: String,
    },
    /// Menções NAME/DESC cujo núcleo está na lista; o retorno leva o nome do agente.
    AgentHeadWords {
        label: String,
        agent: String,
        words: Vec<String>,
        #[serde(default)]
        score: f64,
    },
}

/// Casador baseado em [`PatternRule`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulePatternMatcher {
    pub rules: Vec<PatternRule>,
}

impl RulePatternMatcher {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let rules: Vec<PatternRule> = serde_json::from_str(json)?;
        Ok(Self::new(rules))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn apply(&self, rule: &PatternRule, sentence: &Sentence, out: &mut Vec<PatternFeatureSet>) {
        match rule {
            PatternRule::NestedActor { label, score } => {
                for agent in agent_candidates(sentence) {
                    let head = sentence.node(agent.atomic_head);
                    for actor in actor_candidates(sentence, agent) {
                        let node = sentence.node(actor.node);
                        if inside(sentence, actor, agent) && node.end < head.start {
                            out.push(pair(label, *score, agent, actor));
                        }
                    }
                }
            }
            PatternRule::OfPhrase { label, prepositions, score } => {
                for agent in agent_candidates(sentence) {
                    let agent_node = sentence.node(agent.node);
                    let head = sentence.node(agent.atomic_head);
                    for actor in actor_candidates(sentence, agent) {
                        let node = sentence.node(actor.node);
                        if node.start == 0 {
                            continue;
                        }
                        let preposition = sentence.tokens[node.start - 1].to_lowercase();
                        if !prepositions.contains(&preposition) {
                            continue;
                        }
                        let nested = inside(sentence, actor, agent) && node.start > head.end;
                        let adjacent = node.start == agent_node.end + 2;
                        if nested || adjacent {
                            out.push(pair(label, *score, agent, actor));
                        }
                    }
                }
            }
            PatternRule::Possessive { label, score } => {
                for agent in agent_candidates(sentence) {
                    let head = sentence.node(agent.atomic_head);
                    for actor in actor_candidates(sentence, agent) {
                        let node = sentence.node(actor.node);
                        let next = sentence.tokens.get(node.end + 1).map(String::as_str);
                        if inside(sentence, actor, agent)
                            && matches!(next, Some("'s") | Some("'"))
                            && node.end + 1 < head.start
                        {
                            out.push(pair(label, *score, agent, actor));
                        }
                    }
                }
            }
            PatternRule::BlockWords { label, words, return_label } => {
                for mention in sentence.mentions.iter().filter(|m| m.mention_type.is_name_or_desc()) {
                    let node = sentence.node(mention.node);
                    let hit = sentence.tokens[node.start..=node.end]
                        .iter()
                        .any(|t| words.iter().any(|w| w.eq_ignore_ascii_case(t)));
                    if hit {
                        out.push(PatternFeatureSet::new(Some(label), 0.0).with_return(return_label, mention.uid));
                    }
                }
            }
            PatternRule::AgentHeadWords { label, agent, words, score } => {
                for mention in sentence.mentions.iter().filter(|m| m.mention_type.is_name_or_desc()) {
                    let head = sentence.head_word(mention.node);
                    if words.iter().any(|w| w.eq_ignore_ascii_case(&head)) {
                        out.push(PatternFeatureSet::new(Some(label), *score).with_return(agent, mention.uid));
                    }
                }
            }
        }
    }
}

impl PatternMatcher for RulePatternMatcher {
    fn sentence_matches(&self, doc: &Document, sentence: usize, _actors: &ActorMentionSet) -> Vec<PatternFeatureSet> {
        let sent = doc.sentence(sentence);
        let mut out = Vec::new();
        for rule in &self.rules {
            self.apply(rule, sent, &mut out);
        }
        out
    }
}

fn agent_candidates(sentence: &Sentence) -> impl Iterator<Item = &Mention> {
    sentence.mentions.iter().filter(|m| {
        m.mention_type.is_name_or_desc() && matches!(m.entity_type, EntityType::Per | EntityType::Org)
    })
}

fn actor_candidates<'a>(sentence: &'a Sentence, agent: &'a Mention) -> impl Iterator<Item = &'a Mention> {
    sentence.mentions.iter().filter(move |m| {
        m.uid != agent.uid
            && m.mention_type != MentionType::Pron
            && matches!(m.entity_type, EntityType::Gpe | EntityType::Org | EntityType::Per | EntityType::Loc)
    })
}

/// `inner` fica dentro do intervalo de `outer`, sem ser o próprio núcleo.
fn inside(sentence: &Sentence, inner: &Mention, outer: &Mention) -> bool {
    let a = sentence.node(inner.node);
    let b = sentence.node(outer.node);
    a.start >= b.start && a.end <= b.end && inner.node != outer.atomic_head && inner.node != outer.node
}

fn pair(label: &str, score: f64, agent: &Mention, actor: &Mention) -> PatternFeatureSet {
    PatternFeatureSet::new(Some(label), score)
        .with_return(AGENT_RETURN, agent.uid)
        .with_return(ACTOR_RETURN, actor.uid)
}
