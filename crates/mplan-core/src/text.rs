//! Text normalization shared by header detection and label matching.

/// Normalize text for comparisons.
///
/// Trims, lowercases, collapses whitespace runs to one space and folds the
/// Portuguese accented vowels and `ç` to their ASCII base, so "  Praça ",
/// "PRACA" and "praça" all become `"praca"`. Total and idempotent.
pub fn normalize(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' => 'a',
        'é' | 'ê' => 'e',
        'í' => 'i',
        'ó' | 'ô' | 'õ' => 'o',
        'ú' => 'u',
        'ç' => 'c',
        other => other,
    }
}

/// Split text into alphabetic words; digits act as separators too, so
/// `"jan/26"` and `"jan26"` both yield `"jan"`.
pub fn alpha_words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphabetic()).filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_folds_accents_and_case() {
        assert_eq!(normalize("Praça"), "praca");
        assert_eq!(normalize("PRACA"), "praca");
        assert_eq!(normalize("  praça "), "praca");
        assert_eq!(normalize("DURAÇÃO (s)"), "duracao (s)");
        assert_eq!(normalize("Início"), "inicio");
        assert_eq!(normalize("Peça"), "peca");
        assert_eq!(normalize("Títulos"), "titulos");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("Tv \t  Aberta\n"), "tv aberta");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    proptest! {
        #[test]
        fn test_normalize_is_idempotent(s in any::<String>()) {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn test_normalize_is_idempotent_on_accented_text(s in "[ \\tÁÀÂÃáàâãÉÊéêÍíÓÔÕóôõÚúÇçİıA-Za-z0-9/-]{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_alpha_words() {
        assert_eq!(alpha_words("jan/26").collect::<Vec<_>>(), vec!["jan"]);
        assert_eq!(alpha_words("dez25").collect::<Vec<_>>(), vec!["dez"]);
    }
}
