use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Byte sequences the site emits after a wrong decode, and what they should read.
///
/// No pattern occurs inside another, and every replacement is shorter than its
/// pattern, so applying the table until nothing changes always terminates.
pub const MOJIBAKE_FIXES: &[(&str, &str)] = &[
    // UTF-8 read as Mac Roman
    ("√Å", "Á"),
    ("√°", "á"),
    ("√á", "Ć"),
    ("√¢", "à"),
    ("√≠", "í"),
    ("√∏", "ï"),
    ("√ì", "ì"),
    ("√ñ", "Ö"),
    ("√∂", "ö"),
    ("√û", "Ü"),
    ("√º", "ü"),
    ("√ß", "ß"),
    ("√¶", "ć"),
    ("√¨", "È"),
    ("√®", "è"),
    ("√©", "É"),
    ("√™", "é"),
    ("√≤", "ò"),
    ("√≥", "ó"),
    ("√Ω", "Ω"),
    ("√π", "π"),
    ("‚Äô", "'"),
    ("‚Äú", "\""),
    ("‚Äù", "\""),
    ("‚Äì", "–"),
    ("‚Äî", "—"),
    ("ƒå", "Č"),
    ("ƒÜ", "ć"),
    ("ƒ∞", "ž"),
    ("≈†", "Š"),
    ("≈°", "š"),
    ("≈ü", "Ź"),
    ("≈∫", "ź"),
    ("Ãása", "ása"),
    // UTF-8 read as Windows-1252
    ("Ã¡", "á"),
    ("Ã©", "é"),
    ("Ã³", "ó"),
    ("Ãº", "ú"),
    ("Ã½", "ý"),
    ("Ã¶", "ö"),
    ("Ã¼", "ü"),
    ("Ã‰", "É"),
    ("Å¡", "š"),
    ("Å¾", "ž"),
    ("Å½", "Ž"),
    ("Å™", "ř"),
    ("Ä›", "ě"),
];

static OVER_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([ÁÀÂÄÃÅáàâäãåÉÈÊËéèêëÍÌÎÏíìîïÓÒÔÖÕØóòôöõøÚÙÛÜúùûüÝýÿÇçÑñČŠŽŘĚŇŤĎŁŚŹŻĆŃŐŰčšžřěňťďłśźżćńőű]) (\p{Lu}) (\p{Ll})",
    )
    .unwrap()
});

/// Upper bound on full normalization passes. Every observed input settles in
/// two or three.
const MAX_PASSES: usize = 8;

/// Repairs encoding damage and separates `SURNAMEGiven` names.
///
/// Total and idempotent: passes are repeated until the text stops changing,
/// so the result is a fixed point of a single pass.
pub fn normalize_text(raw: &str) -> String {
    let mut current: String = raw.nfc().collect();
    for _ in 0..MAX_PASSES {
        let next = normalize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current != raw {
        debug!("Fixed encoding: '{}' -> '{}'", raw, current);
    }

    current
}

fn normalize_pass(text: &str) -> String {
    // Composition and collapsing can both assemble a new mojibake sequence,
    // which the next pass picks up.
    let repaired = repair_mojibake(text);
    let composed: String = repaired.nfc().collect();
    let separated = separate_name_parts(composed.trim());
    let collapsed = OVER_SPLIT.replace_all(&separated, "$1 $2$3");
    collapsed.trim().to_string()
}

pub fn repair_mojibake(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = current.clone();
        for (wrong, correct) in MOJIBAKE_FIXES {
            if next.contains(wrong) {
                next = next.replace(wrong, correct);
            }
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Puts a space where an upper-case surname runs into a capitalised given
/// name. When the name already has a space, only the first word is touched.
pub fn separate_name_parts(name: &str) -> String {
    match name.split_once(' ') {
        Some((first, rest)) => format!("{} {}", split_caps_boundaries(first), rest),
        None => split_caps_boundaries(name),
    }
}

fn split_caps_boundaries(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len() + 2);

    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        let next_upper = chars.get(i + 1).is_some_and(|n| n.is_uppercase());
        let then_lower = chars.get(i + 2).is_some_and(|n| n.is_lowercase());
        if c.is_uppercase() && next_upper && then_lower {
            out.push(' ');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surname_given_name_split() {
        assert_eq!(normalize_text("FEKETEAnna"), "FEKETE Anna");
        assert_eq!(normalize_text("CAMPIONIAlida"), "CAMPIONI Alida");
    }

    #[test]
    fn test_over_split_is_collapsed() {
        assert_eq!(normalize_text("ROLFESOVÁ S ára"), "ROLFESOVÁ Sára");
    }

    #[test]
    fn test_mojibake_repair_then_split() {
        assert_eq!(normalize_text("ROLFESOV√ÅS√°ra"), "ROLFESOVÁ Sára");
        assert_eq!(normalize_text("NOV√ÅKOV√ÅEva"), "NOVÁKOVÁ Eva");
        assert_eq!(normalize_text("ƒåERN√ÅPetra"), "ČERNÁ Petra");
        assert_eq!(normalize_text("Å½ILINSKÁJana"), "ŽILINSKÁ Jana");
    }

    #[test]
    fn test_smart_quotes() {
        assert_eq!(normalize_text("O‚ÄôNEILL"), "O'NEILL");
    }

    #[test]
    fn test_only_first_word_is_split_when_spaced() {
        assert_eq!(normalize_text("FEKETEAnna Ilona"), "FEKETE Anna Ilona");
        assert_eq!(normalize_text("DE LAMaria"), "DE LAMaria");
    }

    #[test]
    fn test_plain_values_untouched() {
        assert_eq!(normalize_text("Czech Republic"), "Czech Republic");
        assert_eq!(normalize_text("ESP"), "ESP");
        assert_eq!(normalize_text("  Italy "), "Italy");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_decomposed_input_is_composed() {
        let decomposed = "NOVA\u{301}KOVA\u{301} Eva";
        assert_eq!(normalize_text(decomposed), "NOVÁKOVÁ Eva");
    }

    #[test]
    fn test_normalizer_is_idempotent() {
        let samples = [
            "FEKETEAnna",
            "ROLFESOVÁ S ára",
            "ROLFESOV√ÅS√°ra",
            "√√°",
            " MÜLLERJana Marie",
            "FEKETEAnna IlonaXYz",
            "ABCdEFg",
            "O‚ÄôNEILLKate",
            "NiÃása",
            "Ã¡Ã©",
            "NOVA\u{303}\u{a1}K",
            "NOVÁ Ã ása",
            "",
        ];
        for sample in samples {
            let once = normalize_text(sample);
            assert_eq!(normalize_text(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_repairs_exposed_by_composition_or_collapse() {
        // A + combining tilde composes to the first half of a cp1252 pair.
        assert_eq!(normalize_text("NOVA\u{303}\u{a1}K"), "NO VáK");
        // Collapsing the over-split joins `Ã` and `ása`.
        assert_eq!(normalize_text("NOVÁ Ã ása"), "NOVÁ ása");
    }

    #[test]
    fn test_fix_table_patterns_are_disjoint() {
        for (i, (a, a_fix)) in MOJIBAKE_FIXES.iter().enumerate() {
            assert!(a_fix.chars().count() < a.chars().count());
            for (j, (b, _)) in MOJIBAKE_FIXES.iter().enumerate() {
                if i != j {
                    assert!(!a.contains(b), "{a:?} contains {b:?}");
                }
            }
        }
    }
}
