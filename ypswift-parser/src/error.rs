//! Модуль обработки ошибок библиотеки.

use rust_decimal::Decimal;
use thiserror::Error;

/// Основной тип ошибки библиотеки.
///
/// Любая ошибка фатальна для вызова `parse`: сообщение либо разбирается
/// целиком, либо вызов завершается ошибкой без частичного результата.
#[derive(Debug, Error)]
pub enum Error {
    /// Ошибка ввода/вывода
    #[error("Ошибка ввода/вывода: {0}")]
    Io(#[from] std::io::Error),

    /// Неподдерживаемый тип сообщения (ожидается mt940 или mt942)
    #[error("Неподдерживаемый тип сообщения: {0}")]
    UnsupportedType(String),

    /// Тег с неизвестным кодом
    #[error("Неизвестный тег {0}")]
    UnknownTag(String),

    /// Содержимое тега не соответствует его грамматике
    #[error("Не удалось разобрать содержимое тега {tag}: {content}")]
    TagContent { tag: String, content: String },

    /// Некорректный знак дебет/кредит (ожидается D, C, RD или RC)
    #[error("Некорректный знак дебет/кредит: {0}")]
    InvalidSignMark(String),

    /// Сумма не разбирается или отрицательная
    #[error("Некорректная сумма: {0}")]
    InvalidAmount(String),

    /// Дата или время вне допустимого диапазона
    #[error("Некорректная дата: {0}")]
    InvalidDate(String),

    /// Строка продолжения встретилась до первого тега
    #[error("Строка вне тега: {0}")]
    MalformedInput(String),

    /// Отсутствует обязательный тег (только при validate=true)
    #[error("Отсутствует обязательный тег {tag} в группе {group}")]
    MissingMandatoryTag { tag: &'static str, group: usize },

    /// Валюты балансов внутри одной выписки различаются (только при validate=true)
    #[error("Валюты балансов различаются [{expected}, {found}] в группе {group}")]
    CurrencyMismatch {
        expected: String,
        found: String,
        group: usize,
    },

    /// Сумма проводок не сходится с оборотом (только при validate=true)
    #[error("Сумма проводок ({sum}) не равна обороту ({turnover}) в группе {group}")]
    BalanceReconciliation {
        sum: Decimal,
        turnover: Decimal,
        group: usize,
    },
}

/// Тип Result с ошибкой библиотеки.
pub type Result<T> = std::result::Result<T, Error>;
