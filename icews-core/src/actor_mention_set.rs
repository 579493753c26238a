//! # Conjunto de Menções de Atores
//!
//! Resultado por documento: no máximo uma [`ActorMention`] por menção de
//! entidade. A iteração segue a ordem (sentença, índice), o que torna
//! determinísticas todas as passadas que percorrem o conjunto.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actor_mention::ActorMention;
use crate::ids::{ActorId, MentionUid};

/// Contagens ponderadas de países por documento (ator país → contagem).
pub type CountryCounts = BTreeMap<ActorId, f64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorMentionSet {
    mentions: BTreeMap<MentionUid, ActorMention>,
}

impl ActorMentionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere substituindo qualquer valor anterior da mesma menção.
    pub fn add(&mut self, mention: ActorMention) -> Option<ActorMention> {
        self.mentions.insert(mention.uid, mention)
    }

    pub fn find(&self, uid: MentionUid) -> Option<&ActorMention> {
        self.mentions.get(&uid)
    }

    pub fn contains(&self, uid: MentionUid) -> bool {
        self.mentions.contains_key(&uid)
    }

    pub fn remove(&mut self, uid: MentionUid) -> Option<ActorMention> {
        self.mentions.remove(&uid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorMention> {
        self.mentions.values()
    }

    pub fn all(&self) -> Vec<ActorMention> {
        self.mentions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Mantém apenas as menções para as quais `keep` é verdadeiro.
    pub fn retain(&mut self, mut keep: impl FnMut(&ActorMention) -> bool) {
        self.mentions.retain(|_, m| keep(m));
    }

    pub fn into_vec(self) -> Vec<ActorMention> {
        self.mentions.into_values().collect()
    }
}

impl IntoIterator for ActorMentionSet {
    type Item = ActorMention;
    type IntoIter = std::collections::btree_map::IntoValues<MentionUid, ActorMention>;

    fn into_iter(self) -> Self::IntoIter {
        self.mentions.into_values()
    }
}

impl<'a> IntoIterator for &'a ActorMentionSet {
    type Item = &'a ActorMention;
    type IntoIter = std::collections::btree_map::Values<'a, MentionUid, ActorMention>;

    fn into_iter(self) -> Self::IntoIter {
        self.mentions.values()
    }
}

/// Candidato pontuado à espera da atribuição gulosa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredActorMention {
    pub score: f64,
    pub mention: ActorMention,
}

impl ScoredActorMention {
    pub fn new(score: f64, mention: ActorMention) -> Self {
        Self { score, mention }
    }
}

/// Ordena do maior para o menor score. Empates ficam por menção e depois
/// pela ordem de inserção (ordenação estável).
pub fn sort_candidates(candidates: &mut [ScoredActorMention]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.mention.uid.cmp(&b.mention.uid))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_mention::ActorIdentifiers;

    fn pn(sentence: usize, index: usize, id: u32) -> ActorMention {
        ActorMention::proper_noun(
            MentionUid::new(sentence, index),
            "ACTOR_PATTERN",
            ActorIdentifiers::new(ActorId(id), format!("actor {id}"), None, None),
        )
    }

    #[test]
    fn test_at_most_one_mention_per_uid() {
        let mut set = ActorMentionSet::new();
        assert!(set.add(pn(0, 0, 1)).is_none());
        let old = set.add(pn(0, 0, 2));
        assert_eq!(old.and_then(|m| m.actor_id()), Some(ActorId(1)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.find(MentionUid::new(0, 0)).and_then(|m| m.actor_id()), Some(ActorId(2)));
    }

    #[test]
    fn test_iteration_order_is_by_uid() {
        let mut set = ActorMentionSet::new();
        set.add(pn(1, 0, 3));
        set.add(pn(0, 2, 2));
        set.add(pn(0, 1, 1));
        let ids: Vec<u32> = set.iter().filter_map(|m| m.actor_id()).map(|a| a.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_candidates_descending_and_stable() {
        let mut c = vec![
            ScoredActorMention::new(5.0, pn(0, 1, 1)),
            ScoredActorMention::new(20.0, pn(0, 2, 2)),
            ScoredActorMention::new(5.0, pn(0, 0, 3)),
            ScoredActorMention::new(5.0, pn(0, 0, 4)),
        ];
        sort_candidates(&mut c);
        let ids: Vec<u32> = c.iter().filter_map(|s| s.mention.actor_id()).map(|a| a.0).collect();
        assert_eq!(ids, vec![2, 3, 4, 1]);
    }
}
