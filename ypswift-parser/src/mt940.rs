//! Семантика сообщений типа MT940: проверки группы и сборка выписки.

use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::parser::ParseOptions;
use crate::tags::Tag;
use crate::types::Statement;
use crate::visitor::StatementVisitor;
use crate::MessageType;

/// Проверяет группу тегов одной выписки MT940.
///
/// Требуются теги 20, 25, 28, 60 и 62; все балансовые теги должны иметь
/// одну валюту; сумма проводок должна точно сходиться с разностью
/// конечного и начального балансов.
pub fn validate_group(group: &[Tag], group_number: usize) -> Result<()> {
    let mandatory: [(&'static str, fn(&Tag) -> bool); 5] = [
        ("20", |t| matches!(t, Tag::TransactionReferenceNumber { .. })),
        ("25", |t| matches!(t, Tag::AccountIdentification { .. })),
        ("28", |t| matches!(t, Tag::StatementNumber { .. })),
        ("60", |t| matches!(t, Tag::OpeningBalance(_))),
        ("62", |t| matches!(t, Tag::ClosingBalance(_))),
    ];
    for (id, is_present) in mandatory {
        if !group.iter().any(is_present) {
            return Err(Error::MissingMandatoryTag {
                tag: id,
                group: group_number,
            });
        }
    }

    // единая валюта всех балансовых тегов
    let mut currency: Option<&str> = None;
    for tag in group {
        let fields = match tag {
            Tag::OpeningBalance(b)
            | Tag::ClosingBalance(b)
            | Tag::ClosingAvailableBalance(b)
            | Tag::ForwardAvailableBalance(b) => b,
            _ => continue,
        };
        match currency {
            None => currency = Some(&fields.currency),
            Some(expected) if expected != fields.currency => {
                return Err(Error::CurrencyMismatch {
                    expected: expected.to_string(),
                    found: fields.currency.clone(),
                    group: group_number,
                });
            }
            Some(_) => {}
        }
    }

    // оборот: сумма проводок равна разности балансов (точное сравнение)
    let opening = group.iter().find_map(|t| match t {
        Tag::OpeningBalance(b) => Some(b.amount),
        _ => None,
    });
    let closing = group.iter().find_map(|t| match t {
        Tag::ClosingBalance(b) => Some(b.amount),
        _ => None,
    });
    if let (Some(opening), Some(closing)) = (opening, closing) {
        let turnover = closing - opening;
        let sum = group
            .iter()
            .filter_map(|t| match t {
                Tag::StatementLine(f) => Some(f.amount),
                _ => None,
            })
            .fold(Decimal::ZERO, |acc, amount| acc + amount);
        if sum != turnover {
            return Err(Error::BalanceReconciliation {
                sum,
                turnover,
                group: group_number,
            });
        }
    }

    Ok(())
}

/// Собирает выписку MT940 из группы тегов.
pub fn build_statement(group: &[Tag], options: &ParseOptions) -> Statement {
    let mut visitor = StatementVisitor::new(options.with_tags, options.with_86_structure);
    for tag in group {
        visitor.visit(tag);
    }
    visitor.finish(MessageType::Mt940)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagFactory;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn factory() -> TagFactory {
        TagFactory::new().unwrap()
    }

    fn tag(id: &str, sub_id: &str, text: &str) -> Tag {
        factory().create_tag(id, sub_id, text).unwrap()
    }

    fn complex_group() -> Vec<Tag> {
        vec![
            tag("20", "", "B4E08MS9D00A0009"),
            tag("21", "", "X"),
            tag("25", "", "123456789"),
            tag("28", "C", "123/1"),
            tag("60", "F", "C140507EUR0,00"),
            tag("61", "", "1405070507C500,00NTRFNONREF//AUXREF"),
            tag("86", "", "LINE1\nLINE2"),
            tag("61", "", "1405070507C0,00NTRFNONREF2"),
            tag("86", "", "LINE1"),
            tag("62", "F", "C140508EUR500,00"),
        ]
    }

    #[test]
    fn test_build_statement() {
        let group = complex_group();
        let statement = build_statement(&group, &ParseOptions::default());

        assert_eq!(
            statement.transaction_reference.as_deref(),
            Some("B4E08MS9D00A0009")
        );
        assert_eq!(statement.related_reference.as_deref(), Some("X"));
        assert_eq!(statement.account_identification.as_deref(), Some("123456789"));
        assert_eq!(statement.currency.as_deref(), Some("EUR"));
        assert_eq!(
            statement.statement_date,
            NaiveDate::from_ymd_opt(2014, 5, 8)
        );
        assert_eq!(statement.opening_balance, Some(Decimal::ZERO));
        assert_eq!(
            statement.closing_balance,
            Some(Decimal::from_str("500.00").unwrap())
        );
        // доступные балансы по умолчанию равны конечному
        assert_eq!(statement.closing_available_balance, statement.closing_balance);
        assert_eq!(statement.forward_available_balance, statement.closing_balance);
        assert_eq!(
            statement.closing_available_balance_date,
            statement.closing_balance_date
        );
        assert_eq!(
            statement.forward_available_balance_date,
            statement.closing_balance_date
        );

        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(statement.transactions[0].details(), "LINE1\nLINE2");
        assert_eq!(statement.transactions[0].reference, "NONREF");
        assert_eq!(statement.transactions[0].bank_reference, "AUXREF");
        assert_eq!(statement.transactions[1].details(), "LINE1");
        assert_eq!(statement.transactions[1].reference, "NONREF2");
        assert_eq!(statement.transactions[1].bank_reference, "");
        assert!(statement.tags.is_none());
        assert!(statement.information_to_account_owner.is_empty());
    }

    #[test]
    fn test_build_statement_structured_details() {
        let group = vec![
            tag("20", "", "B4E08MS9D00A0009"),
            tag("25", "", "123456789"),
            tag("28", "C", "123/1"),
            tag("60", "F", "C140507EUR0,00"),
            tag("61", "", "1405070507C500,00NTRFNONREF//AUXREF"),
            tag("86", "", "?20Hello?30World"),
            tag("62", "F", "C140508EUR500,00"),
        ];
        let statement = build_statement(&group, &ParseOptions::default());
        let details = statement.transactions[0].structured_details.as_ref().unwrap();
        assert_eq!(details["20"], "Hello");
        assert_eq!(details["30"], "World");
    }

    #[test]
    fn test_validate_missing_mandatory_tags() {
        let err = validate_group(&[tag("20", "", "B4E08MS9D00A0009")], 1).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingMandatoryTag { tag: "25", group: 1 }
        ));

        let err = validate_group(&[tag("62", "F", "C140508EUR500,00")], 1).unwrap_err();
        assert!(matches!(err, Error::MissingMandatoryTag { tag: "20", .. }));

        let err = validate_group(
            &[
                tag("20", "", "B4E08MS9D00A0009"),
                tag("60", "F", "C140507EUR0,00"),
                tag("62", "F", "C140508EUR500,00"),
            ],
            2,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingMandatoryTag { tag: "25", group: 2 }
        ));
    }

    #[test]
    fn test_validate_currency_mismatch() {
        let err = validate_group(
            &[
                tag("20", "", "B4E08MS9D00A0009"),
                tag("25", "", "123456789"),
                tag("28", "C", "123/1"),
                tag("60", "F", "C140507EUR0,00"),
                tag("61", "", "1405070507C500,00NTRFNONREF//AUXREF"),
                tag("86", "", "DETAILS"),
                tag("62", "F", "C140508USD500,00"),
            ],
            1,
        )
        .unwrap_err();
        assert!(matches!(err, Error::CurrencyMismatch { .. }));
    }

    #[test]
    fn test_validate_balance_reconciliation() {
        let err = validate_group(
            &[
                tag("20", "", "B4E08MS9D00A0009"),
                tag("25", "", "123456789"),
                tag("28", "C", "123/1"),
                tag("60", "F", "C140507EUR0,00"),
                tag("61", "", "1405070507C400,00NTRFNONREF//AUXREF"),
                tag("86", "", "DETAILS"),
                tag("62", "F", "C140508EUR500,00"),
            ],
            1,
        )
        .unwrap_err();
        let Error::BalanceReconciliation { sum, turnover, group } = err else {
            panic!("ожидалась ошибка сверки баланса");
        };
        assert_eq!(sum, Decimal::from_str("400.00").unwrap());
        assert_eq!(turnover, Decimal::from_str("500.00").unwrap());
        assert_eq!(group, 1);
    }

    #[test]
    fn test_validate_accepts_consistent_group() {
        assert!(validate_group(&complex_group(), 1).is_ok());
    }
}
