//! # Documento Linguístico — Arena de Sentenças, Nós e Menções
//!
//! O motor consome um documento já analisado pelo pipeline linguístico
//! (tokenização, parsing, menções, entidades e correferência). Tudo é
//! guardado em arenas indexadas por inteiros:
//!
//! - cada [`Sentence`] possui seus tokens, as tags POS, os nós da árvore
//!   sintática ([`ParseNode`]) e a tabela de menções ([`Mention`]);
//! - o [`Document`] possui as sentenças e a tabela de entidades ([`Entity`]).
//!
//! Nenhuma estrutura guarda ponteiros para outra: nós se referem a nós por
//! [`NodeId`], menções se referem a menções pelo índice dentro da sentença e
//! a entidades pelo índice no documento. As menções de atores
//! ([`crate::actor_mention`]) apontam para uma menção via [`MentionUid`].

use serde::{Deserialize, Serialize};

use crate::error::{IcewsError, Result};
use crate::ids::MentionUid;

/// Índice de um nó dentro de `Sentence::nodes`.
pub type NodeId = usize;

/// Tipo de entidade (ACE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Per,
    Org,
    Gpe,
    Loc,
    Fac,
    Undet,
    Oth,
}

impl EntityType {
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::Per => "PER",
            EntityType::Org => "ORG",
            EntityType::Gpe => "GPE",
            EntityType::Loc => "LOC",
            EntityType::Fac => "FAC",
            EntityType::Undet => "UNDET",
            EntityType::Oth => "OTH",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PER" => Some(EntityType::Per),
            "ORG" => Some(EntityType::Org),
            "GPE" => Some(EntityType::Gpe),
            "LOC" => Some(EntityType::Loc),
            "FAC" => Some(EntityType::Fac),
            "UNDET" => Some(EntityType::Undet),
            "OTH" => Some(EntityType::Oth),
            _ => None,
        }
    }
}

/// Tipo de menção.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MentionType {
    Name,
    Desc,
    Pron,
    Part,
    None,
    Appo,
    List,
}

impl MentionType {
    pub fn name(&self) -> &'static str {
        match self {
            MentionType::Name => "NAME",
            MentionType::Desc => "DESC",
            MentionType::Pron => "PRON",
            MentionType::Part => "PART",
            MentionType::None => "NONE",
            MentionType::Appo => "APPO",
            MentionType::List => "LIST",
        }
    }

    /// NAME ou DESC: as únicas menções que recebem atores por padrão textual.
    pub fn is_name_or_desc(&self) -> bool {
        matches!(self, MentionType::Name | MentionType::Desc)
    }
}

/// Categoria de confiança atribuída pela correferência do pipeline linguístico.
///
/// A propagação por correferência só confia em ligações cujas categorias
/// estão nas listas permitidas de cada nível de agressividade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MentionConfidence {
    AnyName,
    TitleDesc,
    AppositiveDesc,
    WhqLinkPron,
    CopulaDesc,
    DoubleSubjectPersonPron,
    OnlyOneCandidatePron,
    OnlyOneCandidateDesc,
    NameAndPossPron,
    OtherPron,
    PrevSentDoubleSubjectPron,
    Unknown,
}

impl Default for MentionConfidence {
    fn default() -> Self {
        MentionConfidence::Unknown
    }
}

/// Número gramatical estimado da menção.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Number {
    Singular,
    Plural,
    Unknown,
}

impl Default for Number {
    fn default() -> Self {
        Number::Unknown
    }
}

/// Um nó da árvore sintática. Folhas são pré-terminais (um token cada).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseNode {
    pub tag: String,
    /// Primeiro token coberto (inclusivo).
    pub start: usize,
    /// Último token coberto (inclusivo).
    pub end: usize,
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Filho núcleo (head child), se houver.
    #[serde(default)]
    pub head: Option<NodeId>,
    /// Índice da menção ancorada neste nó.
    #[serde(default)]
    pub mention: Option<usize>,
}

impl ParseNode {
    pub fn is_preterminal(&self) -> bool {
        self.children.is_empty()
    }
}

/// Uma menção de entidade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    pub uid: MentionUid,
    pub entity_type: EntityType,
    #[serde(default)]
    pub entity_subtype: Option<String>,
    pub mention_type: MentionType,
    /// Nó sintático da menção.
    pub node: NodeId,
    /// Núcleo atômico: o nó do nome para NAME, o pré-terminal núcleo nos demais casos.
    pub atomic_head: NodeId,
    /// Menção pai (ex.: a menção partitiva "some of X" é pai de X).
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub child: Option<usize>,
    #[serde(default)]
    pub confidence: MentionConfidence,
    #[serde(default)]
    pub number: Number,
    /// Entidade (índice em `Document::entities`) à qual a menção pertence.
    #[serde(default)]
    pub entity: Option<usize>,
}

/// Uma sentença analisada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<String>,
    pub pos_tags: Vec<String>,
    pub nodes: Vec<ParseNode>,
    pub root: NodeId,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

impl Sentence {
    pub fn node(&self, id: NodeId) -> &ParseNode {
        &self.nodes[id]
    }

    pub fn mention(&self, index: usize) -> &Mention {
        &self.mentions[index]
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Nó mais baixo da árvore que cobre o intervalo `[start, end]`.
    pub fn covering_node(&self, start: usize, end: usize) -> Option<NodeId> {
        let root = self.nodes.get(self.root)?;
        if root.start > start || root.end < end {
            return None;
        }
        let mut current = self.root;
        loop {
            let next = self.nodes[current]
                .children
                .iter()
                .copied()
                .find(|&c| self.nodes[c].start <= start && self.nodes[c].end >= end);
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// O nó é o filho núcleo do seu pai?
    pub fn is_head_child(&self, id: NodeId) -> bool {
        match self.nodes[id].parent {
            Some(parent) => self.nodes[parent].head == Some(id),
            None => false,
        }
    }

    /// Desce pela cadeia de núcleos até o pré-terminal.
    pub fn head_preterminal(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(head) = self.nodes[current].head {
            current = head;
        }
        current
    }

    /// Palavra núcleo (minúscula) de um nó.
    pub fn head_word(&self, id: NodeId) -> String {
        let pre = self.head_preterminal(id);
        self.tokens
            .get(self.nodes[pre].start)
            .map(|t| t.to_lowercase())
            .unwrap_or_default()
    }

    /// Texto (tokens separados por espaço) do intervalo inclusivo.
    pub fn text(&self, start: usize, end: usize) -> String {
        if start > end || end >= self.tokens.len() {
            return String::new();
        }
        self.tokens[start..=end].join(" ")
    }

    pub fn node_text(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        self.text(node.start, node.end)
    }

    pub fn mention_text(&self, index: usize) -> String {
        self.node_text(self.mentions[index].node)
    }

    /// Menção ancorada exatamente neste nó.
    pub fn mention_at_node(&self, id: NodeId) -> Option<&Mention> {
        self.nodes[id].mention.map(|m| &self.mentions[m])
    }

    pub fn name_mention_count(&self) -> usize {
        self.mentions
            .iter()
            .filter(|m| m.mention_type == MentionType::Name)
            .count()
    }

    /// Procura a menção NAME/DESC mais baixa subindo pela cadeia de núcleos a
    /// partir de `node`.
    pub fn covering_name_desc_mention_from(&self, node: NodeId) -> Option<&Mention> {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(mention) = self.mention_at_node(id) {
                if mention.mention_type.is_name_or_desc() {
                    return Some(mention);
                }
            }
            current = if self.is_head_child(id) {
                self.nodes[id].parent
            } else {
                None
            };
        }
        None
    }

    /// Menção NAME/DESC que cobre o intervalo pelo seu núcleo.
    pub fn covering_name_desc_mention(&self, start: usize, end: usize) -> Option<&Mention> {
        let node = self.covering_node(start, end)?;
        self.covering_name_desc_mention_from(node)
    }
}

/// Uma entidade: o conjunto de menções correferentes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: usize,
    pub entity_type: EntityType,
    pub mentions: Vec<MentionUid>,
}

/// Documento completo, entrada do [`ActorMentionFinder`](crate::finder::ActorMentionFinder).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub publication_date: Option<String>,
    pub sentences: Vec<Sentence>,
    /// `None` quando a resolução de entidades ainda não rodou.
    #[serde(default)]
    pub entities: Option<Vec<Entity>>,
}

impl Document {
    pub fn sentence(&self, index: usize) -> &Sentence {
        &self.sentences[index]
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    pub fn mention(&self, uid: MentionUid) -> &Mention {
        &self.sentences[uid.sentence].mentions[uid.index]
    }

    pub fn mention_text(&self, uid: MentionUid) -> String {
        self.sentences[uid.sentence].mention_text(uid.index)
    }

    pub fn entities(&self) -> &[Entity] {
        self.entities.as_deref().unwrap_or(&[])
    }

    /// Entidade à qual a menção pertence.
    pub fn entity_of(&self, uid: MentionUid) -> Option<&Entity> {
        let index = self.mention(uid).entity?;
        self.entities().get(index)
    }

    /// Todas as menções, em ordem de sentença e índice.
    pub fn all_mentions(&self) -> impl Iterator<Item = &Mention> {
        self.sentences.iter().flat_map(|s| s.mentions.iter())
    }

    /// Verifica a consistência interna das arenas.
    ///
    /// Documentos montados pelo [`DocumentBuilder`](crate::builder::DocumentBuilder)
    /// são sempre consistentes; documentos vindos de JSON podem não ser. Depois
    /// desta verificação todo índice de nó, menção e entidade é válido, e as
    /// cadeias de pais e de núcleos terminam.
    pub fn validate(&self) -> Result<()> {
        for (sentno, sentence) in self.sentences.iter().enumerate() {
            sentence.validate(sentno)?;
        }
        let entity_count = self.entities().len();
        for mention in self.all_mentions() {
            if let Some(entity) = mention.entity {
                if entity >= entity_count {
                    return Err(invalid(format!("menção {} aponta para entidade inexistente {entity}", mention.uid)));
                }
            }
        }
        for entity in self.entities() {
            for uid in &entity.mentions {
                let valid = self
                    .sentences
                    .get(uid.sentence)
                    .and_then(|s| s.mentions.get(uid.index))
                    .map(|m| m.entity == Some(entity.id))
                    .unwrap_or(false);
                if !valid {
                    return Err(invalid(format!("entidade {} contém menção inválida {uid}", entity.id)));
                }
            }
        }
        Ok(())
    }
}

const VALIDATE_COMPONENT: &str = "Document::validate";

fn invalid(message: String) -> IcewsError {
    IcewsError::input(VALIDATE_COMPONENT, message)
}

impl Sentence {
    fn validate(&self, sentno: usize) -> Result<()> {
        if self.pos_tags.len() != self.tokens.len() {
            return Err(invalid(format!(
                "sentença {sentno}: {} tokens mas {} tags POS",
                self.tokens.len(),
                self.pos_tags.len()
            )));
        }
        let node_count = self.nodes.len();
        if self.nodes.is_empty() {
            if self.tokens.is_empty() && self.mentions.is_empty() {
                return Ok(());
            }
            return Err(invalid(format!("sentença {sentno}: sem árvore sintática")));
        }
        if self.root >= node_count {
            return Err(invalid(format!("sentença {sentno}: raiz inexistente")));
        }
        if self.nodes[self.root].parent.is_some() {
            return Err(invalid(format!("sentença {sentno}: a raiz tem pai")));
        }

        for (id, node) in self.nodes.iter().enumerate() {
            if !self.tokens.is_empty() && (node.start > node.end || node.end >= self.tokens.len()) {
                return Err(invalid(format!(
                    "sentença {sentno}: nó {id} cobre [{}, {}] com {} tokens",
                    node.start,
                    node.end,
                    self.tokens.len()
                )));
            }
            if node.parent.map(|p| p >= node_count).unwrap_or(false) {
                return Err(invalid(format!("sentença {sentno}: nó {id} tem pai inexistente")));
            }
            for &child in &node.children {
                if child >= node_count {
                    return Err(invalid(format!("sentença {sentno}: nó {id} tem filho inexistente {child}")));
                }
                if self.nodes[child].parent != Some(id) {
                    return Err(invalid(format!("sentença {sentno}: filho {child} não aponta de volta para {id}")));
                }
            }
            if let Some(head) = node.head {
                if !node.children.contains(&head) {
                    return Err(invalid(format!("sentença {sentno}: núcleo {head} não é filho do nó {id}")));
                }
            }
            if let Some(index) = node.mention {
                if self.mentions.get(index).map(|m| m.node) != Some(id) {
                    return Err(invalid(format!("sentença {sentno}: nó {id} aponta para menção inválida {index}")));
                }
            }
            if !chain_ends(id, node_count, |n| self.nodes[n].parent) {
                return Err(invalid(format!("sentença {sentno}: ciclo na cadeia de pais do nó {id}")));
            }
            if !chain_ends(id, node_count, |n| self.nodes[n].head) {
                return Err(invalid(format!("sentença {sentno}: ciclo na cadeia de núcleos do nó {id}")));
            }
        }

        let mention_count = self.mentions.len();
        for (index, mention) in self.mentions.iter().enumerate() {
            if mention.uid != MentionUid::new(sentno, index) {
                return Err(invalid(format!("menção {} fora de posição ({sentno}.{index})", mention.uid)));
            }
            if mention.node >= node_count || mention.atomic_head >= node_count {
                return Err(invalid(format!("menção {} aponta para nó inexistente", mention.uid)));
            }
            if self.nodes[mention.node].mention != Some(index) {
                return Err(invalid(format!("nó da menção {} não aponta de volta", mention.uid)));
            }
            let linked = [mention.parent, mention.child];
            if linked.iter().flatten().any(|&other| other >= mention_count || other == index) {
                return Err(invalid(format!("menção {} ligada a menção inexistente", mention.uid)));
            }
        }
        Ok(())
    }
}

/// A cadeia `start → next(start) → ...` termina em no máximo `limit` passos?
///
/// Os índices já foram verificados; com `limit` nós, uma cadeia mais longa
/// que isso repete algum nó.
fn chain_ends(start: NodeId, limit: usize, next: impl Fn(NodeId) -> Option<NodeId>) -> bool {
    let mut current = start;
    for _ in 0..limit {
        match next(current) {
            Some(n) if n < limit => current = n,
            Some(_) => return false,
            None => return true,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DocumentBuilder;

    fn sample() -> Document {
        let mut b = DocumentBuilder::new("doc");
        let s = b.sentence("The Bank of Kenya raised rates");
        let bank = b.mention(s, 1, 3, EntityType::Org, MentionType::Name).unwrap();
        b.mention(s, 3, 3, EntityType::Gpe, MentionType::Name).unwrap();
        b.entity(&[bank]);
        b.build()
    }

    #[test]
    fn test_covering_node_descends_to_preterminal() {
        let doc = sample();
        let s = doc.sentence(0);
        let node = s.covering_node(3, 3).unwrap();
        assert!(s.node(node).is_preterminal());
        assert_eq!(s.node_text(node), "Kenya");
    }

    #[test]
    fn test_covering_name_desc_mention_walks_head_chain() {
        let doc = sample();
        let s = doc.sentence(0);
        let kenya = s.covering_name_desc_mention(3, 3).unwrap();
        assert_eq!(s.mention_text(kenya.uid.index), "Kenya");
        let bank = s.covering_name_desc_mention(1, 3).unwrap();
        assert_eq!(bank.entity_type, EntityType::Org);
    }

    #[test]
    fn test_non_head_token_has_no_covering_mention() {
        let doc = sample();
        // "Bank" não é o núcleo do nome, que é o último token.
        assert!(doc.sentence(0).covering_name_desc_mention(1, 1).is_none());
    }

    #[test]
    fn test_validate_detects_broken_entity() {
        let mut doc = sample();
        if let Some(entities) = doc.entities.as_mut() {
            entities[0].mentions.push(MentionUid::new(0, 9));
        }
        assert!(doc.validate().is_err());
        assert!(sample().validate().is_ok());
    }

    fn assert_rejected(doc: &Document) {
        let err = doc.validate().unwrap_err();
        assert!(err.is_input_validation(), "{err}");
    }

    #[test]
    fn test_validate_rejects_unknown_child() {
        let mut doc = sample();
        let s = &mut doc.sentences[0];
        let root = s.root;
        s.nodes[root].children.insert(0, 99);
        assert_rejected(&doc);
    }

    #[test]
    fn test_validate_rejects_unknown_parent_and_span() {
        let mut doc = sample();
        doc.sentences[0].nodes[1].parent = Some(500);
        assert_rejected(&doc);

        let mut doc = sample();
        doc.sentences[0].nodes[1].end = 40;
        assert_rejected(&doc);
    }

    #[test]
    fn test_validate_rejects_head_cycle() {
        let mut doc = sample();
        let s = &mut doc.sentences[0];
        let node = s.mentions[0].node;
        s.nodes[node].children.push(node);
        s.nodes[node].head = Some(node);
        assert_rejected(&doc);

        // núcleo que não é filho
        let mut doc = sample();
        let s = &mut doc.sentences[0];
        let root = s.root;
        let node = s.mentions[0].node;
        s.nodes[node].head = Some(root);
        assert_rejected(&doc);
    }

    #[test]
    fn test_validate_rejects_parent_cycle() {
        let mut doc = sample();
        let s = &mut doc.sentences[0];
        let outer = s.mentions[0].node;
        let inner = s.mentions[1].node;
        s.nodes[outer].parent = Some(inner);
        assert_rejected(&doc);
    }

    #[test]
    fn test_validate_rejects_dangling_mention_links() {
        let mut doc = sample();
        doc.sentences[0].mentions[0].child = Some(5);
        assert_rejected(&doc);

        let mut doc = sample();
        let node = doc.sentences[0].mentions[0].node;
        let root = doc.sentences[0].root;
        doc.sentences[0].nodes[root].mention = Some(7);
        assert_ne!(node, root);
        assert_rejected(&doc);

        let mut doc = sample();
        doc.sentences[0].mentions[1].entity = Some(3);
        assert_rejected(&doc);
    }

    #[test]
    fn test_validate_accepts_json_round_trip() {
        let json = serde_json::to_string(&sample()).unwrap();
        let doc: Document = serde_json::from_str(&json).unwrap();
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_entity_type_names() {
        assert_eq!(EntityType::from_str("gpe"), Some(EntityType::Gpe));
        assert_eq!(EntityType::Fac.name(), "FAC");
        assert_eq!(EntityType::from_str("xyz"), None);
    }
}
