//! Семантика сообщений типа MT942: внутридневные выписки.
//!
//! MT942 сообщает обороты внутри дня без пары начального и конечного
//! балансов, поэтому сверка оборота здесь неприменима.

use crate::error::Result;
use crate::parser::ParseOptions;
use crate::tags::Tag;
use crate::types::Statement;
use crate::visitor::StatementVisitor;
use crate::MessageType;

/// Проверка группы тегов MT942: всегда успешна.
pub fn validate_group(_group: &[Tag], _group_number: usize) -> Result<()> {
    Ok(())
}

/// Собирает выписку MT942 из группы тегов.
pub fn build_statement(group: &[Tag], options: &ParseOptions) -> Statement {
    let mut visitor = StatementVisitor::new(options.with_tags, options.with_86_structure);
    for tag in group {
        visitor.visit(tag);
    }
    visitor.finish(MessageType::Mt942)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagFactory;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn tag(id: &str, sub_id: &str, text: &str) -> Tag {
        TagFactory::new().unwrap().create_tag(id, sub_id, text).unwrap()
    }

    fn intraday_group() -> Vec<Tag> {
        vec![
            tag("20", "", "INTRADAY001"),
            tag("25", "", "123456789"),
            tag("28", "C", "123/1"),
            tag("34", "F", "EURD5,00"),
            tag("34", "F", "EURC10,00"),
            tag("13", "D", "0901081515+1300"),
            tag("61", "", "1405070507C500,00NTRFNONREF//AUXREF"),
            tag("86", "", "LINE1"),
            tag("90", "D", "1EUR0,00"),
            tag("90", "C", "1EUR500,00"),
        ]
    }

    #[test]
    fn test_validate_is_noop() {
        assert!(validate_group(&[], 1).is_ok());
        assert!(validate_group(&[tag("20", "", "X")], 1).is_ok());
    }

    #[test]
    fn test_build_statement_intraday_fields() {
        let statement = build_statement(&intraday_group(), &ParseOptions::default());

        assert_eq!(statement.transaction_reference.as_deref(), Some("INTRADAY001"));
        assert_eq!(
            statement.debit_floor_limit,
            Some(Decimal::from_str("5.00").unwrap())
        );
        assert_eq!(
            statement.credit_floor_limit,
            Some(Decimal::from_str("10.00").unwrap())
        );
        // дата выписки берется из отметки времени, балансов нет
        assert_eq!(
            statement.statement_date,
            NaiveDate::from_ymd_opt(2009, 1, 8)
        );
        assert!(statement.opening_balance.is_none());
        assert!(statement.closing_balance.is_none());
        assert!(statement.closing_available_balance.is_none());
        assert!(statement.forward_available_balance.is_none());
        assert_eq!(statement.transactions.len(), 1);
        assert!(statement.currency.is_none());
    }

    #[test]
    fn test_floor_limit_without_mark_sets_both_unset() {
        let group = vec![
            tag("20", "", "INTRADAY002"),
            tag("34", "F", "EURD5,00"),
            tag("34", "F", "EUR7,50"),
        ];
        let statement = build_statement(&group, &ParseOptions::default());
        // явный дебетовый лимит не перезаписывается, кредитовый добирается
        assert_eq!(
            statement.debit_floor_limit,
            Some(Decimal::from_str("5.00").unwrap())
        );
        assert_eq!(
            statement.credit_floor_limit,
            Some(Decimal::from_str("7.50").unwrap())
        );
    }
}
