//! # Construtor de Documentos
//!
//! Monta a arena de um [`Document`] a partir de texto simples: cada sentença
//! começa como uma raiz `S` com um pré-terminal por token, e cada menção
//! adicionada cria (ou reutiliza) um nó que agrupa os tokens do seu intervalo.
//!
//! Usado pelos testes, pelos dados de demonstração e por chamadores que não
//! recebem o documento já serializado em JSON.
//!
//! ```rust
//! use icews_core::builder::DocumentBuilder;
//! use icews_core::document::{EntityType, MentionType};
//!
//! let mut b = DocumentBuilder::new("exemplo");
//! let s = b.sentence("Russia sent troops to Ukraine .");
//! let russia = b.mention(s, 0, 0, EntityType::Gpe, MentionType::Name).unwrap();
//! b.entity(&[russia]);
//! let doc = b.build();
//! assert_eq!(doc.mention_text(russia), "Russia");
//! ```

use crate::document::{
    Document, Entity, EntityType, Mention, MentionConfidence, MentionType, NodeId, Number,
    ParseNode, Sentence,
};
use crate::error::{IcewsError, Result};
use crate::ids::MentionUid;

const COMPONENT: &str = "DocumentBuilder";

/// Construtor incremental de documentos.
pub struct DocumentBuilder {
    name: String,
    publication_date: Option<String>,
    sentences: Vec<Sentence>,
    entities: Vec<Entity>,
    with_entity_set: bool,
}

impl DocumentBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            publication_date: None,
            sentences: Vec::new(),
            entities: Vec::new(),
            with_entity_set: true,
        }
    }

    pub fn publication_date(&mut self, date: &str) -> &mut Self {
        self.publication_date = Some(date.to_string());
        self
    }

    /// Simula um documento cuja resolução de entidades não rodou.
    pub fn without_entity_set(&mut self) -> &mut Self {
        self.with_entity_set = false;
        self
    }

    /// Adiciona uma sentença tokenizada por espaços; as tags POS são estimadas.
    pub fn sentence(&mut self, text: &str) -> usize {
        let tagged: Vec<(String, String)> = text
            .split_whitespace()
            .map(|tok| (tok.to_string(), guess_pos(tok).to_string()))
            .collect();
        self.push_sentence(tagged)
    }

    /// Adiciona uma sentença com tags POS explícitas.
    pub fn tagged_sentence(&mut self, tokens: &[(&str, &str)]) -> usize {
        let tagged = tokens
            .iter()
            .map(|(t, p)| (t.to_string(), p.to_string()))
            .collect();
        self.push_sentence(tagged)
    }

    fn push_sentence(&mut self, tagged: Vec<(String, String)>) -> usize {
        let n = tagged.len();
        let mut nodes = Vec::with_capacity(n + 1);
        nodes.push(ParseNode {
            tag: "S".to_string(),
            start: 0,
            end: n.saturating_sub(1),
            parent: None,
            children: (1..=n).collect(),
            head: None,
            mention: None,
        });
        for (i, (_, pos)) in tagged.iter().enumerate() {
            nodes.push(ParseNode {
                tag: pos.clone(),
                start: i,
                end: i,
                parent: Some(0),
                children: Vec::new(),
                head: None,
                mention: None,
            });
        }
        let (tokens, pos_tags) = tagged.into_iter().unzip();
        self.sentences.push(Sentence {
            tokens,
            pos_tags,
            nodes,
            root: 0,
            mentions: Vec::new(),
        });
        self.sentences.len() - 1
    }

    /// Troca a tag da raiz (ex.: `FRAGMENTS` para linhas de local de origem).
    pub fn root_tag(&mut self, sentence: usize, tag: &str) -> &mut Self {
        let s = &mut self.sentences[sentence];
        let root = s.root;
        s.nodes[root].tag = tag.to_string();
        self
    }

    /// Adiciona uma menção cujo núcleo é o último token do intervalo.
    pub fn mention(
        &mut self,
        sentence: usize,
        start: usize,
        end: usize,
        entity_type: EntityType,
        mention_type: MentionType,
    ) -> Result<MentionUid> {
        self.mention_with_head(sentence, start, end, end, entity_type, mention_type)
    }

    /// Adiciona uma menção com token núcleo explícito.
    pub fn mention_with_head(
        &mut self,
        sentence: usize,
        start: usize,
        end: usize,
        head_token: usize,
        entity_type: EntityType,
        mention_type: MentionType,
    ) -> Result<MentionUid> {
        let s = self
            .sentences
            .get_mut(sentence)
            .ok_or_else(|| IcewsError::input(COMPONENT, format!("sentença {sentence} inexistente")))?;
        if start > end || end >= s.tokens.len() || head_token < start || head_token > end {
            return Err(IcewsError::input(
                COMPONENT,
                format!("intervalo inválido [{start}, {end}] (núcleo {head_token})"),
            ));
        }
        let tag = if mention_type == MentionType::Name { "NPP" } else { "NP" };
        let node = insert_node(s, start, end, head_token, tag)?;
        let index = s.mentions.len();
        let atomic_head = if mention_type == MentionType::Name {
            node
        } else {
            s.head_preterminal(node)
        };
        let number = match s.pos_tags[head_token].as_str() {
            "NNS" | "NNPS" => Number::Plural,
            "NN" | "NNP" => Number::Singular,
            _ => Number::Unknown,
        };
        let confidence = if mention_type == MentionType::Name {
            MentionConfidence::AnyName
        } else {
            MentionConfidence::Unknown
        };
        s.nodes[node].mention = Some(index);
        let uid = MentionUid::new(sentence, index);
        s.mentions.push(Mention {
            uid,
            entity_type,
            entity_subtype: None,
            mention_type,
            node,
            atomic_head,
            parent: None,
            child: None,
            confidence,
            number,
            entity: None,
        });
        Ok(uid)
    }

    /// Restringe o núcleo atômico de uma menção NAME a um subintervalo, como em
    /// "Central Bank of Kenya ( CBK )", cujo nome é só a parte antes do parêntese.
    pub fn name_head(&mut self, uid: MentionUid, start: usize, end: usize) -> Result<&mut Self> {
        let s = self
            .sentences
            .get_mut(uid.sentence)
            .ok_or_else(|| IcewsError::input(COMPONENT, format!("sentença {} inexistente", uid.sentence)))?;
        let outer = s.mentions[uid.index].node;
        let (os, oe) = (s.nodes[outer].start, s.nodes[outer].end);
        if start < os || end > oe || start > end {
            return Err(IcewsError::input(
                COMPONENT,
                format!("núcleo [{start}, {end}] fora da menção [{os}, {oe}]"),
            ));
        }
        let node = insert_node(s, start, end, end, "NPP")?;
        s.mentions[uid.index].atomic_head = node;
        Ok(self)
    }

    pub fn confidence(&mut self, uid: MentionUid, confidence: MentionConfidence) -> &mut Self {
        self.mention_mut(uid).confidence = confidence;
        self
    }

    pub fn number(&mut self, uid: MentionUid, number: Number) -> &mut Self {
        self.mention_mut(uid).number = number;
        self
    }

    pub fn subtype(&mut self, uid: MentionUid, subtype: &str) -> &mut Self {
        self.mention_mut(uid).entity_subtype = Some(subtype.to_string());
        self
    }

    /// Liga duas menções da mesma sentença como pai e filho.
    pub fn link(&mut self, parent: MentionUid, child: MentionUid) -> Result<&mut Self> {
        if parent.sentence != child.sentence {
            return Err(IcewsError::input(COMPONENT, "pai e filho em sentenças diferentes"));
        }
        self.mention_mut(parent).child = Some(child.index);
        self.mention_mut(child).parent = Some(parent.index);
        Ok(self)
    }

    /// Agrupa menções correferentes numa entidade; o tipo vem da primeira menção.
    pub fn entity(&mut self, mentions: &[MentionUid]) -> usize {
        let id = self.entities.len();
        let entity_type = mentions
            .first()
            .map(|uid| self.mention_mut(*uid).entity_type)
            .unwrap_or(EntityType::Undet);
        for uid in mentions {
            self.mention_mut(*uid).entity = Some(id);
        }
        self.entities.push(Entity {
            id,
            entity_type,
            mentions: mentions.to_vec(),
        });
        id
    }

    pub fn build(self) -> Document {
        Document {
            name: self.name,
            publication_date: self.publication_date,
            sentences: self.sentences,
            entities: if self.with_entity_set {
                Some(self.entities)
            } else {
                None
            },
        }
    }

    fn mention_mut(&mut self, uid: MentionUid) -> &mut Mention {
        &mut self.sentences[uid.sentence].mentions[uid.index]
    }
}

/// Insere (ou reutiliza) um nó cobrindo exatamente `[start, end]`.
fn insert_node(s: &mut Sentence, start: usize, end: usize, head_token: usize, tag: &str) -> Result<NodeId> {
    let covering = s
        .covering_node(start, end)
        .ok_or_else(|| IcewsError::input(COMPONENT, "intervalo fora da sentença"))?;
    let id = s.nodes.len();

    if s.nodes[covering].start == start && s.nodes[covering].end == end {
        let node = &s.nodes[covering];
        if !node.is_preterminal() && node.mention.is_none() {
            return Ok(covering);
        }
        // Envolve o nó existente num novo nó com o mesmo intervalo.
        let parent = node.parent;
        s.nodes.push(ParseNode {
            tag: tag.to_string(),
            start,
            end,
            parent,
            children: vec![covering],
            head: Some(covering),
            mention: None,
        });
        s.nodes[covering].parent = Some(id);
        match parent {
            Some(p) => replace_child(s, p, covering, id),
            None => s.root = id,
        }
        return Ok(id);
    }

    let parent_children = s.nodes[covering].children.clone();
    let mut moved = Vec::new();
    let mut insert_at = None;
    for (pos, &child) in parent_children.iter().enumerate() {
        let (cs, ce) = (s.nodes[child].start, s.nodes[child].end);
        let inside = cs >= start && ce <= end;
        let outside = ce < start || cs > end;
        if inside {
            insert_at.get_or_insert(pos);
            moved.push(child);
        } else if !outside {
            return Err(IcewsError::input(
                COMPONENT,
                format!("colchetes cruzados: [{start}, {end}] corta [{cs}, {ce}]"),
            ));
        }
    }
    let insert_at = insert_at
        .ok_or_else(|| IcewsError::input(COMPONENT, "nenhum constituinte dentro do intervalo"))?;

    let head = moved
        .iter()
        .copied()
        .find(|&c| s.nodes[c].start <= head_token && s.nodes[c].end >= head_token);
    s.nodes.push(ParseNode {
        tag: tag.to_string(),
        start,
        end,
        parent: Some(covering),
        children: moved.clone(),
        head,
        mention: None,
    });
    for &child in &moved {
        s.nodes[child].parent = Some(id);
    }
    let parent = &mut s.nodes[covering];
    if parent.head.map(|h| moved.contains(&h)).unwrap_or(false) {
        parent.head = Some(id);
    }
    parent.children.retain(|c| !moved.contains(c));
    parent.children.insert(insert_at, id);
    Ok(id)
}

fn replace_child(s: &mut Sentence, parent: NodeId, old: NodeId, new: NodeId) {
    let p = &mut s.nodes[parent];
    for child in p.children.iter_mut() {
        if *child == old {
            *child = new;
        }
    }
    if p.head == Some(old) {
        p.head = Some(new);
    }
}

/// Estimativa grosseira de POS para sentenças sem tags explícitas.
fn guess_pos(token: &str) -> &'static str {
    match token {
        "(" | "-LRB-" => "-LRB-",
        ")" | "-RRB-" => "-RRB-",
        "," => ",",
        "." | "!" | "?" => ".",
        "'s" | "'" => "POS",
        _ => {
            let lower = token.to_lowercase();
            match lower.as_str() {
                "the" | "a" | "an" | "some" | "this" | "that" => "DT",
                "of" | "in" | "to" | "with" | "for" | "from" | "by" | "at" | "on" => "IN",
                "he" | "she" | "it" | "they" | "him" | "her" | "them" | "who" => "PRP",
                "his" | "its" | "their" => "PRP$",
                "and" | "or" => "CC",
                _ => {
                    let capitalized = token.chars().next().map(char::is_uppercase).unwrap_or(false);
                    if capitalized {
                        "NNP"
                    } else if lower.ends_with('s') && lower.len() > 3 {
                        "NNS"
                    } else {
                        "NN"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_wraps_single_token() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("Russia sent troops");
        let uid = b.mention(s, 0, 0, EntityType::Gpe, MentionType::Name).unwrap();
        let doc = b.build();
        let sent = doc.sentence(0);
        let m = doc.mention(uid);
        assert_eq!(sent.node(m.node).tag, "NPP");
        assert_eq!(m.atomic_head, m.node);
        assert!(sent.is_head_child(sent.node(m.node).children[0]));
        assert_eq!(m.number, Number::Singular);
    }

    #[test]
    fn test_desc_atomic_head_is_preterminal() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("Palestinian activists clashed with police");
        let uid = b.mention(s, 0, 1, EntityType::Per, MentionType::Desc).unwrap();
        let doc = b.build();
        let sent = doc.sentence(0);
        let m = doc.mention(uid);
        assert_eq!(sent.node_text(m.atomic_head), "activists");
        assert_eq!(sent.head_word(m.node), "activists");
        assert_eq!(m.number, Number::Plural);
    }

    #[test]
    fn test_nested_mentions_share_tree() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("the Bank of Kenya");
        let outer = b.mention(s, 1, 3, EntityType::Org, MentionType::Name).unwrap();
        let inner = b.mention(s, 3, 3, EntityType::Gpe, MentionType::Name).unwrap();
        let doc = b.build();
        let sent = doc.sentence(0);
        let inner_node = doc.mention(inner).node;
        assert_eq!(sent.node(inner_node).parent, Some(doc.mention(outer).node));
        assert_eq!(sent.node(doc.mention(outer).node).head, Some(inner_node));
    }

    #[test]
    fn test_crossing_brackets_rejected() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("a b c d");
        b.mention(s, 0, 1, EntityType::Org, MentionType::Desc).unwrap();
        assert!(b.mention(s, 1, 2, EntityType::Org, MentionType::Desc).is_err());
    }

    #[test]
    fn test_entity_links_mentions() {
        let mut b = DocumentBuilder::new("d");
        let s = b.sentence("Obama said he would go");
        let obama = b.mention(s, 0, 0, EntityType::Per, MentionType::Name).unwrap();
        let he = b.mention(s, 2, 2, EntityType::Per, MentionType::Pron).unwrap();
        let e = b.entity(&[obama, he]);
        let doc = b.build();
        assert_eq!(doc.entity_of(he).map(|e| e.id), Some(e));
        assert_eq!(doc.entities()[e].entity_type, EntityType::Per);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_guess_pos() {
        assert_eq!(guess_pos("("), "-LRB-");
        assert_eq!(guess_pos("Kenya"), "NNP");
        assert_eq!(guess_pos("troops"), "NNS");
        assert_eq!(guess_pos("of"), "IN");
    }
}
