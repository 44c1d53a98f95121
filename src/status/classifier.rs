use serde::Serialize;

/// Semantic category of a free-form backend status string.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Ok,
    Sending,
    Receiving,
    Error,
    NotOk,
    Warning,
    #[default]
    Unclassified,
}

/// Ordered rule table. The first rule with a matching needle wins, so an
/// `Ok` needle beats an `Error` needle appearing in the same string.
const RULES: &[(StatusCategory, &[&str])] = &[
    (
        StatusCategory::Ok,
        &["OK", "Concluído", "Parado", "Pronto", "Conectado", "Comunicação OK"],
    ),
    (StatusCategory::Sending, &["Enviando"]),
    (StatusCategory::Receiving, &["Recebendo", "Aguardando"]),
    (
        StatusCategory::Error,
        &["Erro", "error", "Sem Resposta", "Erro de Conexão"],
    ),
    (
        StatusCategory::NotOk,
        &[
            "NOK",
            "Desconectado",
            "Desconectada",
            "Indisponível",
            "Inativo",
            "Não Conectada",
        ],
    ),
    (
        StatusCategory::Warning,
        &["Aviso", "Warning", "Verificando", "Inicializando", "Disponível"],
    ),
];

/// Maps a status string onto its semantic category. Matching is
/// case-sensitive substring search over [`RULES`].
pub fn classify(text: &str) -> StatusCategory {
    RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| text.contains(needle)))
        .map(|(category, _)| *category)
        .unwrap_or(StatusCategory::Unclassified)
}
