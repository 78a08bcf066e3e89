/// Latin replacement for a single Cyrillic code point.
///
/// Returns `None` for characters outside the table; callers pass those
/// through unchanged. Hard and soft signs map to the empty string.
fn latin(c: char) -> Option<&'static str> {
    let mapped = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'А' => "A",
        'Б' => "B",
        'В' => "V",
        'Г' => "G",
        'Д' => "D",
        'Е' => "E",
        'Ё' => "Yo",
        'Ж' => "Zh",
        'З' => "Z",
        'И' => "I",
        'Й' => "Y",
        'К' => "K",
        'Л' => "L",
        'М' => "M",
        'Н' => "N",
        'О' => "O",
        'П' => "P",
        'Р' => "R",
        'С' => "S",
        'Т' => "T",
        'У' => "U",
        'Ф' => "F",
        'Х' => "H",
        'Ц' => "Ts",
        'Ч' => "Ch",
        'Ш' => "Sh",
        'Щ' => "Sch",
        'Ъ' => "",
        'Ы' => "Y",
        'Ь' => "",
        'Э' => "E",
        'Ю' => "Yu",
        'Я' => "Ya",
        _ => return None,
    };
    Some(mapped)
}

/// Transliterates Cyrillic text to Latin, one code point at a time.
///
/// Characters without a table entry (punctuation, digits, Latin letters,
/// combining marks) pass through unchanged. No Unicode normalization is
/// applied.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match latin(c) {
            Some(mapped) => out.push_str(mapped),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_lowercase_cyrillic() {
        assert_eq!(transliterate("электроника"), "elektronika");
        assert_eq!(transliterate("жизнь"), "zhizn");
        assert_eq!(transliterate("щука"), "schuka");
    }

    #[test]
    fn maps_uppercase_cyrillic() {
        assert_eq!(transliterate("Москва"), "Moskva");
        assert_eq!(transliterate("ЧАЙ"), "ChAY");
    }

    #[test]
    fn drops_hard_and_soft_signs() {
        assert_eq!(transliterate("объём"), "obyom");
        assert_eq!(transliterate("соль"), "sol");
    }

    #[test]
    fn passes_through_unmapped_characters() {
        assert_eq!(transliterate("tea no.5, 10%"), "tea no.5, 10%");
        assert_eq!(transliterate("чай №5"), "chay №5");
        assert_eq!(transliterate(""), "");
    }

    #[test]
    fn mixed_input_keeps_original_order() {
        assert_eq!(transliterate("iPhone чехол 12"), "iPhone chehol 12");
    }
}
