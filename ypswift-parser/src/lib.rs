//! # YPSwift Parser
//!
//! Библиотека для разбора банковских выписок SWIFT MT940 и MT942
//! в типизированную модель выписок и транзакций.
//!
//! ## Поддерживаемые типы сообщений
//!
//! - **MT940** - выписка по счету за отчетный период
//! - **MT942** - внутридневная выписка (обороты без пары балансов)
//!
//! ## Пример использования
//!
//! ```rust,ignore
//! use ypswift_parser::{parse_statements, MessageType};
//! use std::fs;
//!
//! let data = fs::read_to_string("statement.mt940")?;
//! let statements = parse_statements(&data, MessageType::Mt940)?;
//! for statement in &statements {
//!     println!("{:?} {:?}", statement.number, statement.statement_date);
//!     for txn in &statement.transactions {
//!         println!("{} {:?}", txn.amount, txn.currency);
//!     }
//! }
//! ```

pub mod error;
pub mod field86;
pub mod helpers;
pub mod mt940;
pub mod mt942;
pub mod parser;
pub mod tags;
pub mod tokenizer;
pub mod types;
mod visitor;

pub use error::{Error, Result};
pub use parser::{ParseOptions, Parser, PostParseMiddleware};
pub use tags::{BalanceFields, StatementLineFields, Tag, TagFactory};
pub use tokenizer::{RawTag, Tokenizer};
pub use types::{Statement, StatementNumber, Transaction};

/// Поддерживаемые типы сообщений.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// MT940 (выписка за период)
    Mt940,
    /// MT942 (внутридневная выписка)
    Mt942,
}

impl std::str::FromStr for MessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mt940" => Ok(MessageType::Mt940),
            "mt942" => Ok(MessageType::Mt942),
            _ => Err(Error::UnsupportedType(s.to_string())),
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageType::Mt940 => write!(f, "mt940"),
            MessageType::Mt942 => write!(f, "mt942"),
        }
    }
}

/// Разбирает текст сообщения в список выписок с параметрами по умолчанию.
pub fn parse_statements(data: &str, message_type: MessageType) -> Result<Vec<Statement>> {
    Parser::new().parse(data, &ParseOptions::new(message_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_message_type_from_str() {
        assert_eq!(MessageType::from_str("mt940").unwrap(), MessageType::Mt940);
        assert_eq!(MessageType::from_str("MT942").unwrap(), MessageType::Mt942);
    }

    #[test]
    fn test_message_type_unsupported() {
        let err = MessageType::from_str("mt900").unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
    }

    #[test]
    fn test_message_type_display() {
        assert_eq!(MessageType::Mt940.to_string(), "mt940");
        assert_eq!(MessageType::Mt942.to_string(), "mt942");
    }
}
