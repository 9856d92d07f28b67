//! Структурированный разбор поля :86: (детали транзакции).
//!
//! Поле :86: может содержать произвольный текст либо следовать одной из
//! двух известных схем: повторяющиеся суб-теги `/XXXX/` или `>DD`/`?DD`.
//! Неструктурированный текст - штатная ситуация, а не ошибка.

use regex::Regex;
use std::collections::BTreeMap;

/// Ключ, под которым сохраняется код GVC (ведущие 3 цифры).
const GVC_KEY: &str = "gvc";

/// Пытается разобрать детали транзакции в карту суб-тегов.
///
/// Возвращает `None`, если текст не начинается с известного суб-тега.
/// При повторении ключа побеждает последнее вхождение.
pub fn parse_structured_details(details: &str) -> Option<BTreeMap<String, String>> {
    let joined = details.replace('\n', "");
    let mut text = joined.trim();
    let mut parsed = BTreeMap::new();

    // ведущий код GVC: ровно 3 цифры перед '?' или '>'
    if text.len() >= 4 {
        let (gvc, rest) = text.split_at(3);
        if gvc.bytes().all(|b| b.is_ascii_digit()) && matches!(rest.as_bytes()[0], b'?' | b'>') {
            parsed.insert(GVC_KEY.to_string(), gvc.to_string());
            text = rest;
        }
    }

    let (tag_re, separator) = build_tag_re(text)?;
    let matches: Vec<regex::Match> = tag_re.find_iter(text).collect();
    // текст обязан начинаться с суб-тега
    match matches.first() {
        Some(first) if first.start() == 0 => {}
        _ => return None,
    }

    for (i, m) in matches.iter().enumerate() {
        let key: String = m.as_str().chars().filter(|c| *c != separator).collect();
        let value_end = matches.get(i + 1).map_or(text.len(), |next| next.start());
        parsed.insert(key, text[m.end()..value_end].to_string());
    }

    Some(parsed)
}

/// Выбирает шаблон суб-тега по первому символу текста.
fn build_tag_re(text: &str) -> Option<(Regex, char)> {
    let (pattern, separator) = match text.chars().next()? {
        '/' => (r"/[0-9A-Z]{2,4}/".to_string(), '/'),
        prefix @ ('>' | '?') => (format!(r"\{}\d{{2}}", prefix), prefix),
        _ => return None,
    };
    Regex::new(&pattern).ok().map(|re| (re, separator))
}
