use crate::translit::transliterate;

/// Characters allowed to survive in an alias body.
const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz1234567890-";

/// Words dropped from titles before building the slug. Matched against
/// already-lowercased words.
const STOP_WORDS: &[&str] = &["and", "i"];

/// Offset added to the owning entity id to form the numeric alias suffix.
const ID_OFFSET: i32 = 10_000;

/// Derives a URL-safe alias from a free-text title and the owning entity id.
///
/// The title is lowercased, transliterated, split on ASCII spaces, stripped
/// of stop words, capped at the first 3 surviving words, joined with `-` and
/// reduced to `[a-z0-9-]`. The numeric suffix `10000 + entity_id` keeps
/// aliases unique within one content table: two different entities can never
/// collide, whatever their titles.
///
/// A title with no survivable characters still yields the bare suffix with
/// its leading separator (e.g. `-10005`); callers treat that as a valid
/// alias. Consecutive hyphens persist when an inner word loses all of its
/// characters.
pub fn make_alias(title: &str, entity_id: i32) -> String {
    let transliterated = transliterate(&title.to_lowercase());

    let alias: String = transliterated
        .split(' ')
        .filter(|word| !STOP_WORDS.contains(word))
        .take(3)
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| ALPHABET.contains(*c))
        .collect();

    format!("{alias}-{}", ID_OFFSET + entity_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic() {
        let a = make_alias("Зелёный чай", 7);
        let b = make_alias("Зелёный чай", 7);
        assert_eq!(a, b);
    }

    #[test]
    fn suffix_is_ten_thousand_plus_id() {
        for id in [0, 1, 42, 999, 12345] {
            let alias = make_alias("Товар", id);
            let suffix = alias.rsplit('-').next().unwrap();
            assert_eq!(suffix, (10_000 + id).to_string());
        }
    }

    #[test]
    fn transliterates_cyrillic_titles() {
        assert_eq!(make_alias("Электроника", 1), "elektronika-10001");
    }

    #[test]
    fn stop_word_only_title_yields_bare_suffix() {
        assert_eq!(make_alias("and", 5), "-10005");
        assert_eq!(make_alias("i", 5), "-10005");
    }

    #[test]
    fn keeps_first_three_words_after_stop_word_removal() {
        assert_eq!(
            make_alias("Чай and Кофе i Сахар Мёд", 42),
            "chay-kofe-sahar-10042"
        );
    }

    #[test]
    fn caps_long_titles_at_three_words() {
        assert_eq!(
            make_alias("Красный зелёный синий жёлтый", 3),
            "krasnyy-zelyonyy-siniy-10003"
        );
    }

    #[test]
    fn keeps_latin_and_digits() {
        assert_eq!(make_alias("iPhone 15 Pro", 7), "iphone-15-pro-10007");
    }

    #[test]
    fn strips_disallowed_characters() {
        assert_eq!(make_alias("Чай №5 (чёрный)", 9), "chay-5-chyornyy-10009");
    }

    #[test]
    fn fully_stripped_inner_word_leaves_consecutive_hyphens() {
        assert_eq!(make_alias("синий ### камень", 2), "siniy--kamen-10002");
    }

    #[test]
    fn empty_title_yields_bare_suffix() {
        assert_eq!(make_alias("", 1), "-10001");
    }
}
