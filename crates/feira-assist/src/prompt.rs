//! Prompt construction for list generation.

/// Category vocabulary the model is asked to choose from. The last entry
/// is also the store's default for uncategorized items.
pub const CATEGORIES: &[&str] = &[
    "Frutas e Verduras",
    "Carnes",
    "Laticínios",
    "Bebidas",
    "Higiene",
    "Limpeza",
    "Padaria",
    "Congelados",
    "Outros",
];

/// Build the shopping-assistant prompt around the user's description.
///
/// The instructions ask for a bare JSON object; models still wrap it in
/// markdown fences or prose often enough that extraction stays
/// best-effort (see [`crate::extract`]).
pub fn build_prompt(description: &str) -> String {
    let categories = CATEGORIES
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Você é um assistente de lista de compras. Baseado na descrição do usuário, gere uma lista de compras organizada.

CRÍTICO: Sua resposta deve ser SOMENTE um objeto JSON válido, sem texto adicional antes ou depois. Não use markdown, não explique, apenas retorne o JSON puro no formato exato abaixo:

{{
  "listName": "nome sugerido para a lista",
  "items": [
    {{
      "name": "nome do item",
      "quantity": número,
      "category": "categoria do item"
    }}
  ]
}}

Categorias válidas: {categories}

Descrição do usuário: {description}

Responda SOMENTE com o JSON, nada mais."#
    )
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_description() {
        let prompt = build_prompt("churrasco para 10 pessoas");
        assert!(prompt.contains("churrasco para 10 pessoas"));
    }

    #[test]
    fn prompt_lists_every_category() {
        let prompt = build_prompt("almoço");
        for category in CATEGORIES {
            assert!(prompt.contains(category), "missing category: {category}");
        }
    }

    #[test]
    fn prompt_shows_the_expected_shape() {
        let prompt = build_prompt("x");
        assert!(prompt.contains("\"listName\""));
        assert!(prompt.contains("\"items\""));
    }
}
