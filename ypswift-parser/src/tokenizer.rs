//! Токенизатор: разбивает текст сообщения на последовательность сырых тегов.

use crate::error::{Error, Result};

/// Сырой тег: код, суб-код и строки данных до начала следующего тега.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    /// Код тега: две цифры или `NS` (синтетический блок конверта - `MB`).
    pub id: String,
    /// Суб-код тега: одна заглавная буква или пустая строка.
    pub sub_id: String,
    /// Строки данных тега в исходном порядке.
    pub data: Vec<String>,
}

impl RawTag {
    /// Содержимое тега одной строкой (строки данных через перевод строки).
    pub fn text(&self) -> String {
        self.data.join("\n")
    }
}

/// Ленивый однопроходный итератор по тегам сообщения.
///
/// Пустые строки и строки из одного дефиса отбрасываются. Строка,
/// не начинающая новый тег, считается продолжением текущего; продолжение
/// до первого тега - ошибка [`Error::MalformedInput`].
///
/// Последовательность не перезапускается: для повторного обхода
/// токенизируйте текст заново или материализуйте результат.
pub struct Tokenizer<'a> {
    lines: std::str::Lines<'a>,
    current: Option<RawTag>,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    /// Создает токенизатор по тексту сообщения.
    pub fn new(data: &'a str) -> Self {
        Self {
            lines: data.lines(),
            current: None,
            failed: false,
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<RawTag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while let Some(line) = self.lines.next() {
            if line.is_empty() || line == "-" {
                continue;
            }
            if let Some((id, sub_id, first)) = tag_start(line) {
                let next = RawTag {
                    id: id.to_string(),
                    sub_id: sub_id.to_string(),
                    data: vec![first.to_string()],
                };
                if let Some(prev) = self.current.replace(next) {
                    return Some(Ok(prev));
                }
            } else if line.starts_with('{') || line.starts_with("-}") {
                let next = RawTag {
                    id: "MB".to_string(),
                    sub_id: String::new(),
                    data: vec![line.trim().to_string()],
                };
                if let Some(prev) = self.current.replace(next) {
                    return Some(Ok(prev));
                }
            } else {
                match self.current.as_mut() {
                    Some(tag) => tag.data.push(line.to_string()),
                    None => {
                        self.failed = true;
                        return Some(Err(Error::MalformedInput(line.to_string())));
                    }
                }
            }
        }
        self.current.take().map(Ok)
    }
}

/// Распознает начало тега `:NN:` или `:NNX:` (также `:NS:`/`:NSX:`).
/// Возвращает код, суб-код и остаток строки после префикса.
fn tag_start(line: &str) -> Option<(&str, &str, &str)> {
    let rest = line.strip_prefix(':')?;
    let (id, rest) = if let Some(after) = rest.strip_prefix("NS") {
        ("NS", after)
    } else if rest.len() >= 2
        && rest.as_bytes()[0].is_ascii_digit()
        && rest.as_bytes()[1].is_ascii_digit()
    {
        rest.split_at(2)
    } else {
        return None;
    };

    if let Some(after) = rest.strip_prefix(':') {
        return Some((id, "", after));
    }
    let bytes = rest.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_uppercase() && bytes[1] == b':' {
        return Some((id, &rest[..1], &rest[2..]));
    }
    None
}
