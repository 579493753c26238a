//! # Casador de Padrões por Tokens
//!
//! Uma trie de padrões textuais de atores, agentes e atores compostos.
//! Cada nó da trie guarda os identificadores dos padrões que terminam nele e
//! quatro tipos de aresta para o próximo token:
//!
//! | sintaxe   | aresta   | comparação                                           |
//! |-----------|----------|------------------------------------------------------|
//! | `WORD_`   | normal   | sem diferenciar maiúsculas, aceita plural/stem       |
//! | `WORD=`   | sigla    | exata, diferencia maiúsculas                         |
//! | `WORD!=`  | exata    | exata, diferencia maiúsculas                         |
//! | `WORD`    | prefixo  | o token começa com `WORD`                            |
//!
//! Possessivos (`'`, `'s`) são pulados depois de arestas normais e hífens
//! soltos são sempre pulados. Hífens dentro de um padrão geram três variantes
//! (`foo-bar`, `foobar` e `foo bar`).
//!
//! O casador devolve **todos** os casamentos, sem deduplicar entre valores
//! diferentes; para o mesmo valor no mesmo intervalo fica o melhor casamento
//! (não-sigla, maior peso, padrão mais longo, menor id de padrão).

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{Document, Sentence};
use crate::error::Result;
use crate::ids::{ActorId, ActorPatternId, AgentId, AgentPatternId};

/// Um casamento de padrão sobre um intervalo de tokens (inclusivo).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMatch<V, P> {
    pub id: V,
    pub pattern_id: Option<P>,
    pub code: Option<String>,
    pub start: usize,
    pub end: usize,
    pub pattern_strlen: usize,
    pub weight: f64,
    pub is_acronym: bool,
}

/// Valor de um padrão de ator composto: o agente e o ator já pareados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeId {
    pub agent: AgentId,
    pub actor: ActorId,
}

pub type ActorMatch = TokenMatch<ActorId, ActorPatternId>;
pub type AgentMatch = TokenMatch<AgentId, AgentPatternId>;
pub type CompositeActorMatch = TokenMatch<CompositeId, ActorPatternId>;

/// Casamentos de um documento, indexados por sentença.
pub type MatchesBySentence<M> = Vec<Vec<M>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchType {
    Normal,
    Prefix,
    Acronym,
    Exact,
}

#[derive(Debug, Clone)]
struct MatchIds<V, P> {
    id: V,
    pattern_id: Option<P>,
    code: Option<String>,
    weight: f64,
}

#[derive(Debug, Clone)]
struct PatternToken {
    text: String,
    match_type: MatchType,
}

#[derive(Debug, Clone)]
struct TrieNode<V, P> {
    matches: Vec<MatchIds<V, P>>,
    pattern_strlen: usize,
    normal: HashMap<String, TrieNode<V, P>>,
    acronym: HashMap<String, TrieNode<V, P>>,
    exact: HashMap<String, TrieNode<V, P>>,
    prefix: Vec<(String, TrieNode<V, P>)>,
    skip_possessives: bool,
}

impl<V, P> TrieNode<V, P> {
    fn new(skip_possessives: bool) -> Self {
        Self {
            matches: Vec::new(),
            pattern_strlen: 0,
            normal: HashMap::new(),
            acronym: HashMap::new(),
            exact: HashMap::new(),
            prefix: Vec::new(),
            skip_possessives,
        }
    }
}

/// Parâmetros de uma chamada de casamento que não mudam durante a descida.
struct MatchContext<'a> {
    tokens: &'a [String],
    pos_tags: &'a [String],
    start: usize,
    strip_punctuation: bool,
}

impl<V: Copy + PartialEq, P: Copy + Ord> TrieNode<V, P> {
    /// Retorna o número de nós criados.
    fn add_pattern(&mut self, pattern: &[PatternToken], strlen: usize, ids: MatchIds<V, P>) -> usize {
        let Some((first, rest)) = pattern.split_first() else {
            self.pattern_strlen = self.pattern_strlen.max(strlen);
            self.matches.push(ids);
            return 0;
        };
        if first.match_type == MatchType::Prefix {
            if let Some((_, next)) = self.prefix.iter_mut().find(|(p, _)| *p == first.text) {
                return next.add_pattern(rest, strlen, ids);
            }
            let mut next = TrieNode::new(false);
            let created = 1 + next.add_pattern(rest, strlen, ids);
            self.prefix.push((first.text.clone(), next));
            return created;
        }
        let map = match first.match_type {
            MatchType::Exact => &mut self.exact,
            MatchType::Acronym => &mut self.acronym,
            _ => &mut self.normal,
        };
        let skip = first.match_type == MatchType::Normal;
        let mut created = 0;
        let next = map.entry(first.text.clone()).or_insert_with(|| {
            created = 1;
            TrieNode::new(skip)
        });
        created + next.add_pattern(rest, strlen, ids)
    }

    fn match_tokens(
        &self,
        ctx: &MatchContext<'_>,
        current: usize,
        match_type: MatchType,
        result: &mut Vec<TokenMatch<V, P>>,
    ) {
        if current > ctx.start {
            for ids in &self.matches {
                add_match(ids, ctx.start, current - 1, self.pattern_strlen, match_type, result);
            }
        }
        let Some(token) = ctx.tokens.get(current) else { return };
        let pos = ctx.pos_tags.get(current).map(String::as_str).unwrap_or("");

        let mut upper = token.to_uppercase();
        if ctx.strip_punctuation {
            upper.retain(|c| c != '.' && c != '-');
        }
        if current == ctx.start && upper.is_empty() {
            return;
        }
        let stemmed = stem_word(token, pos).to_uppercase();

        if let Some(next) = self.normal.get(&upper) {
            next.match_tokens(ctx, current + 1, MatchType::Normal, result);
        }
        if stemmed != upper {
            if let Some(next) = self.normal.get(&stemmed) {
                next.match_tokens(ctx, current + 1, MatchType::Normal, result);
            }
        }
        if let Some(next) = self.exact.get(token) {
            next.match_tokens(ctx, current + 1, MatchType::Exact, result);
        }
        if let Some(next) = self.acronym.get(token) {
            next.match_tokens(ctx, current + 1, MatchType::Acronym, result);
        }
        for (prefix, next) in &self.prefix {
            if upper.starts_with(prefix.as_str()) {
                next.match_tokens(ctx, current + 1, MatchType::Prefix, result);
            }
        }
        if current > ctx.start {
            let possessive = upper == "'" || upper == "'S" || upper.is_empty();
            if (self.skip_possessives && possessive) || upper == "-" {
                self.match_tokens(ctx, current + 1, match_type, result);
            }
        }
    }
}

fn add_match<V: Copy + PartialEq, P: Copy + Ord>(
    ids: &MatchIds<V, P>,
    start: usize,
    end: usize,
    strlen: usize,
    match_type: MatchType,
    result: &mut Vec<TokenMatch<V, P>>,
) {
    let is_acronym = match_type == MatchType::Acronym;
    let candidate = TokenMatch {
        id: ids.id,
        pattern_id: ids.pattern_id,
        code: ids.code.clone(),
        start,
        end,
        pattern_strlen: strlen,
        weight: ids.weight,
        is_acronym,
    };
    match result
        .iter_mut()
        .find(|m| m.start == start && m.end == end && m.id == ids.id)
    {
        Some(existing) => {
            if new_match_is_better(&candidate, existing) {
                if candidate.pattern_id.is_none() {
                    let kept = existing.pattern_id;
                    *existing = TokenMatch { pattern_id: kept, ..candidate };
                } else {
                    *existing = candidate;
                }
            }
        }
        None => result.push(candidate),
    }
}

fn new_match_is_better<V, P: Ord>(new: &TokenMatch<V, P>, old: &TokenMatch<V, P>) -> bool {
    if old.is_acronym != new.is_acronym {
        return !new.is_acronym;
    }
    if old.weight != new.weight {
        return new.weight > old.weight;
    }
    if old.pattern_strlen != new.pattern_strlen {
        return new.pattern_strlen > old.pattern_strlen;
    }
    if old.pattern_id != new.pattern_id {
        return new.pattern_id < old.pattern_id;
    }
    false
}

/// Stem simples de plurais (`NNS`/`NNPS`): "militias" → "militia".
pub fn stem_word(token: &str, pos: &str) -> String {
    if pos != "NNS" && pos != "NNPS" {
        return token.to_string();
    }
    let lower = token.to_lowercase();
    if lower.len() > 4 && lower.ends_with("ies") {
        return format!("{}y", &token[..token.len() - 3]);
    }
    for suffix in ["ses", "xes", "ches", "shes"] {
        if lower.len() > suffix.len() + 1 && lower.ends_with(suffix) {
            return token[..token.len() - 2].to_string();
        }
    }
    if lower.len() > 3 && lower.ends_with('s') && !lower.ends_with("ss") {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

fn dash_regex() -> Option<&'static Regex> {
    static DASH: OnceLock<Option<Regex>> = OnceLock::new();
    DASH.get_or_init(|| Regex::new(r"[ _]+-[ _]+").ok()).as_ref()
}

/// Expande cada hífen em "a-b", "ab" e "a_ b".
fn splits_on_dash(pattern: &str) -> Vec<String> {
    match pattern.split_once('-') {
        None => vec![pattern.to_string()],
        Some((lhs, rhs)) => splits_on_dash(rhs)
            .into_iter()
            .flat_map(|r| vec![format!("{lhs}-{r}"), format!("{lhs}{r}"), format!("{lhs}_ {r}")])
            .collect(),
    }
}

fn parse_pattern(piece_string: &str) -> Vec<PatternToken> {
    piece_string
        .split_whitespace()
        .filter_map(|piece| {
            if let Some(text) = piece.strip_suffix("!=") {
                Some(PatternToken { text: text.to_string(), match_type: MatchType::Exact })
            } else if let Some(text) = piece.strip_suffix('=') {
                Some(PatternToken { text: text.to_string(), match_type: MatchType::Acronym })
            } else if let Some(text) = piece.strip_suffix('_') {
                Some(PatternToken { text: text.to_string(), match_type: MatchType::Normal })
            } else if piece.is_empty() {
                None
            } else {
                Some(PatternToken { text: piece.to_string(), match_type: MatchType::Prefix })
            }
        })
        .collect()
}

/// Registro de padrão carregável de JSON.
///
/// Use `pattern` para a sintaxe de tokens ou `name` para um nome simples
/// (convertido para uma sequência de tokens normais, ou uma sigla se
/// `acronym` estiver ligado).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPatternRecord<V, P> {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub id: V,
    #[serde(default = "Option::default")]
    pub pattern_id: Option<P>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub acronym: bool,
    #[serde(default)]
    pub requires_context: bool,
}

/// Casador de padrões por tokens, genérico no valor e no id de padrão.
#[derive(Debug, Clone)]
pub struct TokenMatcher<V, P> {
    kind: String,
    root: TrieNode<V, P>,
    requires_context: HashSet<P>,
    size: usize,
    patterns: usize,
    strip_punctuation: bool,
}

pub type ActorTokenMatcher = TokenMatcher<ActorId, ActorPatternId>;
pub type AgentTokenMatcher = TokenMatcher<AgentId, AgentPatternId>;
pub type CompositeActorTokenMatcher = TokenMatcher<CompositeId, ActorPatternId>;

impl<V, P> TokenMatcher<V, P>
where
    V: Copy + PartialEq,
    P: Copy + Ord + Hash,
{
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            root: TrieNode::new(false),
            requires_context: HashSet::new(),
            size: 0,
            patterns: 0,
            strip_punctuation: false,
        }
    }

    /// Remove `.` e `-` dos tokens antes de comparar com arestas normais.
    pub fn strip_punctuation(mut self, value: bool) -> Self {
        self.strip_punctuation = value;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Número de nós da trie.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns
    }

    /// Adiciona um padrão na sintaxe de tokens.
    pub fn add_pattern(&mut self, pattern: &str, pattern_id: Option<P>, id: V, code: Option<&str>, weight: f64) {
        let mut normalized = pattern
            .to_uppercase()
            .replace('_', "_ ")
            .replace('=', "= ")
            .trim()
            .to_string();
        if let Some(dash) = dash_regex() {
            normalized = dash.replace_all(&normalized, "-").into_owned();
        }
        for expanded in splits_on_dash(&normalized) {
            let tokens = parse_pattern(&expanded);
            if tokens.is_empty() {
                continue;
            }
            let ids = MatchIds {
                id,
                pattern_id,
                code: code.map(str::to_string),
                weight,
            };
            self.size += self.root.add_pattern(&tokens, expanded.chars().count(), ids);
        }
        self.patterns += 1;
    }

    /// Adiciona um nome simples ("Bank of Kenya") como padrão.
    pub fn add_name_pattern(
        &mut self,
        name: &str,
        pattern_id: Option<P>,
        id: V,
        is_acronym: bool,
        weight: f64,
        requires_context: bool,
    ) {
        let mut pattern = name.split_whitespace().collect::<Vec<_>>().join("_");
        pattern.push(if is_acronym { '=' } else { '_' });
        while pattern.contains("__") {
            pattern = pattern.replace("__", "_");
        }
        let pattern = pattern.replace("_=", "=");
        if requires_context {
            if let Some(p) = pattern_id {
                self.requires_context.insert(p);
            }
        }
        self.add_pattern(&pattern, pattern_id, id, None, weight);
    }

    pub fn add_record(&mut self, record: &TokenPatternRecord<V, P>) {
        if let Some(name) = &record.name {
            self.add_name_pattern(
                name,
                record.pattern_id,
                record.id,
                record.acronym,
                record.weight,
                record.requires_context,
            );
        } else if let Some(pattern) = &record.pattern {
            let pattern = unmark_consonant_acronym(pattern);
            if record.requires_context {
                if let Some(p) = record.pattern_id {
                    self.requires_context.insert(p);
                }
            }
            self.add_pattern(&pattern, record.pattern_id, record.id, record.code.as_deref(), record.weight);
        }
    }

    pub fn pattern_requires_context(&self, pattern_id: Option<P>) -> bool {
        pattern_id
            .map(|p| self.requires_context.contains(&p))
            .unwrap_or(false)
    }

    /// Casamentos que começam no token `index`.
    pub fn match_at(&self, sentence: &Sentence, index: usize, result: &mut Vec<TokenMatch<V, P>>) {
        let ctx = MatchContext {
            tokens: &sentence.tokens,
            pos_tags: &sentence.pos_tags,
            start: index,
            strip_punctuation: self.strip_punctuation,
        };
        self.root.match_tokens(&ctx, index, MatchType::Normal, result);
    }

    /// Todos os casamentos de uma sentença.
    pub fn find_sentence_matches(&self, sentence: &Sentence) -> Vec<TokenMatch<V, P>> {
        let mut result = Vec::new();
        for index in 0..=sentence.token_count() {
            self.match_at(sentence, index, &mut result);
        }
        result
    }

    /// Casamentos de cada sentença até o limite (exclusivo).
    pub fn find_all_matches(&self, doc: &Document, limit: usize) -> MatchesBySentence<TokenMatch<V, P>> {
        debug!("Procurando menções de {} em {}", self.kind, doc.name);
        let result: MatchesBySentence<TokenMatch<V, P>> = doc
            .sentences
            .iter()
            .take(limit)
            .map(|s| self.find_sentence_matches(s))
            .collect();
        debug!(
            "  {} casamentos de padrões de {}",
            result.iter().map(Vec::len).sum::<usize>(),
            self.kind
        );
        result
    }
}

impl<V, P> TokenMatcher<V, P>
where
    V: Copy + PartialEq + DeserializeOwned,
    P: Copy + Ord + Hash + DeserializeOwned,
{
    /// Carrega uma lista JSON de [`TokenPatternRecord`].
    pub fn from_json_str(kind: &str, json: &str) -> Result<Self> {
        let records: Vec<TokenPatternRecord<V, P>> = serde_json::from_str(json)?;
        let mut matcher = Self::new(kind);
        for record in &records {
            matcher.add_record(record);
        }
        info!("Carregados {} padrões de {}", matcher.pattern_count(), kind);
        Ok(matcher)
    }

    pub fn from_path(kind: &str, path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(kind, &text)
    }
}

/// Padrões só de consoantes ("KGB_") são siglas sem marcação.
fn unmark_consonant_acronym(pattern: &str) -> String {
    let is_consonant_acronym = pattern.len() > 1
        && pattern.ends_with('_')
        && pattern[..pattern.len() - 1]
            .chars()
            .all(|c| "BCDFGHJKLMNPQRSTVWXZ".contains(c));
    if is_consonant_acronym {
        format!("{}=", &pattern[..pattern.len() - 1])
    } else {
        pattern.to_string()
    }
}
