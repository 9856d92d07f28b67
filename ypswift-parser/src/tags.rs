//! Модель тегов сообщения и фабрика их разбора.
//!
//! Каждый тег SWIFT-сообщения имеет собственную микро-грамматику.
//! Фабрика сопоставляет код тега с вариантом и разбирает его содержимое;
//! теги неизменяемы после создания.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::helpers;

/// Ключ, под которым фиксируется маркер конца блока сообщения.
pub(crate) const EOB_KEY: &str = "EOB";

/// Общие поля семейства балансовых тегов (:60:, :62:, :64:, :65:).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceFields {
    /// Дата баланса.
    pub date: NaiveDate,
    /// Код валюты (EUR, USD и т.д.).
    pub currency: String,
    /// Сумма со знаком: кредит положительный, дебет отрицательный.
    pub amount: Decimal,
}

/// Поля строки выписки (тег :61:).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLineFields {
    /// Дата валютирования.
    pub date: NaiveDate,
    /// Дата проводки (месяц и день; год берется из даты валютирования).
    pub entry_date: Option<NaiveDate>,
    /// Код фондов (одна буква, если указан).
    pub funds_code: Option<char>,
    /// Сумма со знаком.
    pub amount: Decimal,
    /// Признак сторнирования.
    pub is_reversal: bool,
    /// Код типа операции (буква плюс 3 буквенно-цифровых символа).
    pub transaction_type: String,
    /// Референс платежа (до `//` или до конца строки).
    pub reference: String,
    /// Банковский референс (после `//`).
    pub bank_reference: String,
    /// Дополнительные сведения со следующей строки.
    pub extra_details: String,
}

/// Тег SWIFT-сообщения.
///
/// Закрытое множество вариантов; новые теги создаются только фабрикой,
/// поэтому у абстрактного семейства балансов нет собственного варианта -
/// четыре конкретных балансовых тега разделяют [`BalanceFields`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tag {
    /// Тег :20: - референс выписки.
    TransactionReferenceNumber { transaction_reference: String },
    /// Тег :21: - референс связанного сообщения.
    RelatedReference { related_reference: String },
    /// Тег :25: - идентификатор счета.
    AccountIdentification { account_identification: String },
    /// Тег :28C: - номер выписки.
    StatementNumber {
        statement_number: String,
        sequence_number: String,
        section_number: String,
    },
    /// Тег :60: - начальный баланс.
    OpeningBalance(BalanceFields),
    /// Тег :62: - конечный баланс.
    ClosingBalance(BalanceFields),
    /// Тег :64: - доступный конечный баланс.
    ClosingAvailableBalance(BalanceFields),
    /// Тег :65: - форвардный доступный баланс.
    ForwardAvailableBalance(BalanceFields),
    /// Тег :61: - строка выписки (транзакция).
    StatementLine(StatementLineFields),
    /// Тег :86: - детали транзакции или информация владельцу счета.
    TransactionDetails { transaction_details: String },
    /// Тег :NS: - данные вне стандарта SWIFT.
    NonSwift { non_swift: String },
    /// Синтетический тег MB - блоки конверта сообщения.
    MessageBlock { blocks: BTreeMap<String, String> },
    /// Тег :34F: - лимит отсечения дебетовых/кредитовых операций.
    DebitAndCreditFloorLimitIndicator {
        currency: String,
        dc_mark: Option<char>,
        amount: Decimal,
    },
    /// Тег :13D: - дата и время формирования сообщения.
    DateTimeIndication { date_timestamp: DateTime<FixedOffset> },
    /// Тег :90D:/:90C: - количество и сумма проводок.
    NumberAndSumOfEntries {
        dc_mark: char,
        number: String,
        currency: String,
        amount: Decimal,
    },
}

impl Tag {
    /// Блок конверта, открывающий новую выписку (заголовок, а не маркер конца).
    pub(crate) fn is_starting_block(&self) -> bool {
        matches!(self, Tag::MessageBlock { blocks } if !blocks.contains_key(EOB_KEY))
    }
}

/// Фабрика тегов: сопоставляет код тега с грамматикой его содержимого.
///
/// Регулярные выражения грамматик компилируются один раз при создании.
pub struct TagFactory {
    re_statement_number: Regex,
    re_balance: Regex,
    re_statement_line: Regex,
    re_floor_limit: Regex,
    re_date_time: Regex,
    re_entries: Regex,
}

impl TagFactory {
    /// Создает фабрику с откомпилированными грамматиками.
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_statement_number: compile(r"^(\d{1,5})/(\d{1,5})(?:/(\d{1,5}))?$")?,
            re_balance: compile(r"^([DC])(\d{6})([A-Z]{3})([\d,]+)$")?,
            re_statement_line: compile(r"^(\d{6})(\d{4})?(R?[DC])([A-Z])?([\d,]+)([A-Z][A-Z0-9]{3})(.*)$")?,
            re_floor_limit: compile(r"^([A-Z]{3})([DC])?([\d,]+)$")?,
            re_date_time: compile(r"^(\d{6})(\d{4})([+-]\d{4})$")?,
            re_entries: compile(r"^(\d+)([A-Z]{3})([\d,]+)$")?,
        })
    }

    /// Создает тег по коду, суб-коду и тексту содержимого.
    ///
    /// Неизвестная пара (код, суб-код) дает [`Error::UnknownTag`];
    /// несоответствие содержимого грамматике - [`Error::TagContent`].
    pub fn create_tag(&self, id: &str, sub_id: &str, text: &str) -> Result<Tag> {
        match (id, sub_id) {
            ("20", _) => Ok(Tag::TransactionReferenceNumber {
                transaction_reference: text.to_string(),
            }),
            ("21", _) => Ok(Tag::RelatedReference {
                related_reference: text.to_string(),
            }),
            ("25", _) => Ok(Tag::AccountIdentification {
                account_identification: text.to_string(),
            }),
            ("28", _) => self.parse_statement_number(text),
            ("60", _) => Ok(Tag::OpeningBalance(self.parse_balance("60", text)?)),
            ("62", _) => Ok(Tag::ClosingBalance(self.parse_balance("62", text)?)),
            ("64", _) => Ok(Tag::ClosingAvailableBalance(self.parse_balance("64", text)?)),
            ("65", _) => Ok(Tag::ForwardAvailableBalance(self.parse_balance("65", text)?)),
            ("61", _) => self.parse_statement_line(text),
            ("86", _) => Ok(Tag::TransactionDetails {
                transaction_details: text.to_string(),
            }),
            ("NS", _) => Ok(Tag::NonSwift {
                non_swift: text.to_string(),
            }),
            ("MB", _) => parse_message_block(text),
            ("34", "F") => self.parse_floor_limit(text),
            ("13", "D") => self.parse_date_time(text),
            ("90", "D" | "C") => self.parse_entries(sub_id, text),
            _ => Err(Error::UnknownTag(format!(":{}{}:", id, sub_id))),
        }
    }

    fn parse_statement_number(&self, text: &str) -> Result<Tag> {
        let caps = self
            .re_statement_number
            .captures(text)
            .ok_or_else(|| tag_content("28", text))?;
        Ok(Tag::StatementNumber {
            statement_number: caps[1].to_string(),
            sequence_number: caps[2].to_string(),
            section_number: caps.get(3).map_or(String::new(), |m| m.as_str().to_string()),
        })
    }

    fn parse_balance(&self, tag: &str, text: &str) -> Result<BalanceFields> {
        let caps = self
            .re_balance
            .captures(text)
            .ok_or_else(|| tag_content(tag, text))?;
        Ok(BalanceFields {
            date: helpers::parse_compact_date(&caps[2])?,
            currency: caps[3].to_string(),
            amount: helpers::parse_amount(&caps[1], &caps[4])?,
        })
    }

    fn parse_statement_line(&self, text: &str) -> Result<Tag> {
        // первая строка - сама проводка, вторая (если есть) - дополнительные сведения
        let (first_line, extra_details) = match text.split_once('\n') {
            Some((line, rest)) => (line, rest.to_string()),
            None => (text, String::new()),
        };
        // банковский референс отделяется первым `//`
        let (head, bank_reference) = match first_line.split_once("//") {
            Some((head, bank)) => (head, bank.to_string()),
            None => (first_line, String::new()),
        };

        let caps = self
            .re_statement_line
            .captures(head)
            .ok_or_else(|| tag_content("61", text))?;

        let date = helpers::parse_compact_date(&caps[1])?;
        let entry_date = match caps.get(2) {
            Some(raw) => {
                let raw = raw.as_str();
                let month = digits(&raw[0..2])?;
                let day = digits(&raw[2..4])?;
                Some(helpers::parse_date(date.year() as u32, month, day)?)
            }
            None => None,
        };

        let mark = &caps[3];
        let funds_code = caps.get(4).and_then(|m| m.as_str().chars().next());
        if funds_code.is_some() && mark.len() == 2 {
            // граница кода фондов после сторнирования определяется эвристически
            tracing::warn!("Неоднозначный код фондов в теге 61: {}", head);
        }

        Ok(Tag::StatementLine(StatementLineFields {
            date,
            entry_date,
            funds_code,
            amount: helpers::parse_amount(mark, &caps[5])?,
            is_reversal: mark.len() == 2,
            transaction_type: caps[6].to_string(),
            reference: caps[7].to_string(),
            bank_reference,
            extra_details,
        }))
    }

    fn parse_floor_limit(&self, text: &str) -> Result<Tag> {
        let caps = self
            .re_floor_limit
            .captures(text)
            .ok_or_else(|| tag_content("34F", text))?;
        Ok(Tag::DebitAndCreditFloorLimitIndicator {
            currency: caps[1].to_string(),
            dc_mark: caps.get(2).and_then(|m| m.as_str().chars().next()),
            amount: helpers::parse_decimal(&caps[3])?,
        })
    }

    fn parse_date_time(&self, text: &str) -> Result<Tag> {
        let caps = self
            .re_date_time
            .captures(text)
            .ok_or_else(|| tag_content("13D", text))?;
        Ok(Tag::DateTimeIndication {
            date_timestamp: helpers::parse_offset_datetime(&caps[1], &caps[2], &caps[3])?,
        })
    }

    fn parse_entries(&self, sub_id: &str, text: &str) -> Result<Tag> {
        let caps = self
            .re_entries
            .captures(text)
            .ok_or_else(|| tag_content(&format!("90{}", sub_id), text))?;
        Ok(Tag::NumberAndSumOfEntries {
            dc_mark: sub_id.chars().next().unwrap_or('C'),
            number: caps[1].to_string(),
            currency: caps[2].to_string(),
            amount: helpers::parse_decimal(&caps[3])?,
        })
    }
}

/// Разбирает содержимое блоков конверта: `{N:значение}` подряд,
/// с маркером конца блока `-}` в начале.
fn parse_message_block(text: &str) -> Result<Tag> {
    let mut blocks = BTreeMap::new();
    let mut rest = text.trim();

    if let Some(stripped) = rest.strip_prefix("-}") {
        blocks.insert(EOB_KEY.to_string(), String::new());
        rest = stripped;
    }

    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('{') else {
            tracing::warn!("Неразобранный остаток в блоке сообщения: {}", rest);
            break;
        };
        let Some(colon) = inner.find(':') else {
            return Err(tag_content("MB", text));
        };
        let key = inner[..colon].to_string();
        let value = &inner[colon + 1..];

        // значение тянется до парной закрывающей скобки с учетом вложенности
        let mut depth = 1usize;
        let mut end = None;
        for (i, c) in value.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }

        match end {
            Some(i) => {
                blocks.insert(key, value[..i].to_string());
                rest = &value[i + 1..];
            }
            None => {
                // незакрытый блок (например `{4:` перед телом сообщения)
                blocks.insert(key, value.to_string());
                rest = "";
            }
        }
    }

    Ok(Tag::MessageBlock { blocks })
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::MalformedInput(e.to_string()))
}

fn tag_content(tag: &str, content: &str) -> Error {
    Error::TagContent {
        tag: tag.to_string(),
        content: content.to_string(),
    }
}

fn digits(raw: &str) -> Result<u32> {
    raw.parse()
        .map_err(|_| Error::InvalidDate(raw.to_string()))
}
