//! # Erros do motor de resolução
//!
//! Falhas fatais abortam o processamento do documento inteiro e são propagadas
//! ao chamador via `Result`. Avisos de padrões malformados **não** são erros:
//! são registrados com `tracing::warn!` e o casamento ofensivo é descartado.

use thiserror::Error;

/// Tipo de resultado usado em todo o crate.
pub type Result<T> = std::result::Result<T, IcewsError>;

/// Erros que podem ocorrer durante a resolução de menções de atores.
#[derive(Debug, Error)]
pub enum IcewsError {
    /// Estado de entrada inválido: modo errado, documento sem conjunto de
    /// entidades, rótulo de bloqueio desconhecido, árvore malformada.
    #[error("{component}: {message}")]
    InputValidation { component: String, message: String },

    /// Valor de configuração inválido.
    #[error("configuração inválida: {0}")]
    Config(String),

    /// Expressão regular inválida em regras de gazetteer ou entradas bloqueadas.
    #[error("padrão inválido: {0}")]
    Pattern(String),

    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("erro de IO: {0}")]
    Io(#[from] std::io::Error),
}

impl IcewsError {
    /// Cria um erro de validação de entrada para o componente indicado.
    pub fn input(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputValidation {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Indica se o erro é uma falha de validação de entrada (HTTP 400 no servidor).
    pub fn is_input_validation(&self) -> bool {
        matches!(self, Self::InputValidation { .. } | Self::Config(_))
    }
}

impl From<regex::Error> for IcewsError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern(err.to_string())
    }
}
