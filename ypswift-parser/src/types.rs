//! Базовые типы данных для представления банковских выписок.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tags::Tag;

/// Номер выписки (тег :28C:).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatementNumber {
    /// Основной номер выписки.
    pub statement: String,
    /// Порядковый номер части выписки.
    pub sequence: String,
    /// Номер секции (присутствует у некоторых банков, иначе пустая строка).
    pub section: String,
}

/// Банковская транзакция (тег :61: плюс относящиеся к ней :86: и :NS:).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Дата валютирования.
    pub date: NaiveDate,
    /// Дата проводки (если указана).
    pub entry_date: Option<NaiveDate>,
    /// Код фондов (одна буква, если указан).
    pub funds_code: Option<char>,
    /// Сумма со знаком: кредит положительный, дебет отрицательный.
    pub amount: Decimal,
    /// Признак сторнирования.
    pub is_reversal: bool,
    /// Код типа операции (NTRF, NMSC и т.д.).
    pub transaction_type: String,
    /// Референс платежа.
    pub reference: String,
    /// Банковский референс (после `//`, иначе пустая строка).
    pub bank_reference: String,
    /// Дополнительные сведения со второй строки тега :61:.
    pub extra_details: String,
    /// Валюта (копия валюты выписки).
    pub currency: Option<String>,
    /// Сегменты деталей: содержимое относящихся к транзакции тегов :86:.
    pub detail_segments: Vec<String>,
    /// Структурированные детали, если поле :86: следует известной схеме.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_details: Option<BTreeMap<String, String>>,
    /// Содержимое тегов :NS:, встретившихся в контексте транзакции.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_swift: Option<String>,
}

impl Transaction {
    /// Детали транзакции одной строкой (сегменты через перевод строки).
    pub fn details(&self) -> String {
        self.detail_segments.join("\n")
    }
}

/// Банковская выписка: итог одного отчетного периода и его транзакции.
///
/// Для MT942 балансы отсутствуют, вместо них заполняются внутридневные
/// поля: лимиты отсечения и отметка времени.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statement {
    /// Референс выписки (тег :20:).
    pub transaction_reference: Option<String>,
    /// Референс связанного сообщения (тег :21:).
    pub related_reference: Option<String>,
    /// Идентификатор счета (тег :25:).
    pub account_identification: Option<String>,
    /// Номер выписки (тег :28C:).
    pub number: Option<StatementNumber>,
    /// Дата выписки: дата конечного баланса (MT940)
    /// или дата отметки времени (MT942).
    pub statement_date: Option<NaiveDate>,
    /// Дата начального баланса (тег :60:).
    pub opening_balance_date: Option<NaiveDate>,
    /// Дата конечного баланса (тег :62:).
    pub closing_balance_date: Option<NaiveDate>,
    /// Дата доступного конечного баланса (тег :64:).
    pub closing_available_balance_date: Option<NaiveDate>,
    /// Дата форвардного доступного баланса (тег :65:).
    pub forward_available_balance_date: Option<NaiveDate>,
    /// Валюта выписки (из тега :60:).
    pub currency: Option<String>,
    /// Начальный баланс со знаком.
    pub opening_balance: Option<Decimal>,
    /// Конечный баланс со знаком.
    pub closing_balance: Option<Decimal>,
    /// Доступный конечный баланс со знаком.
    pub closing_available_balance: Option<Decimal>,
    /// Форвардный доступный баланс со знаком.
    pub forward_available_balance: Option<Decimal>,
    /// Дополнительная информация владельцу счета (теги :86: уровня выписки).
    pub information_to_account_owner: String,
    /// Именованные блоки конверта сообщения, если он присутствует.
    pub message_blocks: BTreeMap<String, String>,
    /// Транзакции выписки в исходном порядке.
    pub transactions: Vec<Transaction>,
    /// Лимит отсечения дебетовых операций (тег :34F:, только MT942).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debit_floor_limit: Option<Decimal>,
    /// Лимит отсечения кредитовых операций (тег :34F:, только MT942).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_floor_limit: Option<Decimal>,
    /// Отметка времени формирования сообщения (тег :13D:, только MT942).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_indication: Option<DateTime<FixedOffset>>,
    /// Исходные теги выписки, если запрошено их сохранение.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}
