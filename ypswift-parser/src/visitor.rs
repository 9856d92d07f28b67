//! Сборка выписки из группы тегов.

use crate::field86;
use crate::tags::{Tag, EOB_KEY};
use crate::types::{Statement, StatementNumber, Transaction};
use crate::MessageType;

/// Вид предыдущего тега; влияет на привязку деталей и данных :NS:.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrevTag {
    None,
    StatementLine,
    TransactionDetails,
    Other,
}

/// Аккумулятор обхода группы тегов одной выписки.
///
/// Теги посещаются в исходном порядке; готовая выписка формируется
/// единственным вызовом [`StatementVisitor::finish`], который один раз
/// применяет каскадные значения по умолчанию для доступных балансов.
pub(crate) struct StatementVisitor {
    with_tags: bool,
    with_86_structure: bool,
    prev_tag: PrevTag,
    statement: Statement,
    information: Vec<String>,
    tags: Vec<Tag>,
}

impl StatementVisitor {
    pub(crate) fn new(with_tags: bool, with_86_structure: bool) -> Self {
        Self {
            with_tags,
            with_86_structure,
            prev_tag: PrevTag::None,
            statement: Statement::default(),
            information: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Посещает очередной тег группы.
    pub(crate) fn visit(&mut self, tag: &Tag) {
        if self.with_tags {
            self.tags.push(tag.clone());
        }

        match tag {
            Tag::MessageBlock { blocks } => {
                for (key, value) in blocks {
                    if !value.is_empty() && key != EOB_KEY {
                        self.statement
                            .message_blocks
                            .insert(key.clone(), value.clone());
                    }
                }
            }
            Tag::TransactionReferenceNumber {
                transaction_reference,
            } => {
                self.statement.transaction_reference = Some(transaction_reference.clone());
            }
            Tag::RelatedReference { related_reference } => {
                self.statement.related_reference = Some(related_reference.clone());
            }
            Tag::AccountIdentification {
                account_identification,
            } => {
                self.statement.account_identification = Some(account_identification.clone());
            }
            Tag::StatementNumber {
                statement_number,
                sequence_number,
                section_number,
            } => {
                self.statement.number = Some(StatementNumber {
                    statement: statement_number.clone(),
                    sequence: sequence_number.clone(),
                    section: section_number.clone(),
                });
            }
            Tag::OpeningBalance(fields) => {
                self.statement.opening_balance_date = Some(fields.date);
                self.statement.opening_balance = Some(fields.amount);
                self.statement.currency = Some(fields.currency.clone());
            }
            Tag::ClosingBalance(fields) => {
                self.statement.closing_balance_date = Some(fields.date);
                self.statement.closing_balance = Some(fields.amount);
            }
            Tag::ClosingAvailableBalance(fields) => {
                self.statement.closing_available_balance_date = Some(fields.date);
                self.statement.closing_available_balance = Some(fields.amount);
            }
            Tag::ForwardAvailableBalance(fields) => {
                self.statement.forward_available_balance_date = Some(fields.date);
                self.statement.forward_available_balance = Some(fields.amount);
            }
            Tag::StatementLine(fields) => {
                self.statement.transactions.push(Transaction {
                    date: fields.date,
                    entry_date: fields.entry_date,
                    funds_code: fields.funds_code,
                    amount: fields.amount,
                    is_reversal: fields.is_reversal,
                    transaction_type: fields.transaction_type.clone(),
                    reference: fields.reference.clone(),
                    bank_reference: fields.bank_reference.clone(),
                    extra_details: fields.extra_details.clone(),
                    currency: self.statement.currency.clone(),
                    detail_segments: Vec::new(),
                    structured_details: None,
                    non_swift: None,
                });
            }
            Tag::TransactionDetails {
                transaction_details,
            } => {
                // детали принадлежат транзакции только сразу после тега 61,
                // иначе это информация уровня выписки
                if self.prev_tag == PrevTag::StatementLine {
                    if let Some(txn) = self.statement.transactions.last_mut() {
                        txn.detail_segments.push(transaction_details.clone());
                    }
                } else {
                    self.information.push(transaction_details.clone());
                }
            }
            Tag::NonSwift { non_swift } => {
                if matches!(
                    self.prev_tag,
                    PrevTag::StatementLine | PrevTag::TransactionDetails
                ) {
                    if let Some(txn) = self.statement.transactions.last_mut() {
                        txn.non_swift = Some(non_swift.clone());
                    }
                }
            }
            Tag::DebitAndCreditFloorLimitIndicator {
                dc_mark, amount, ..
            } => match dc_mark {
                Some('D') => self.statement.debit_floor_limit = Some(*amount),
                Some('C') => self.statement.credit_floor_limit = Some(*amount),
                _ => {
                    if self.statement.debit_floor_limit.is_none() {
                        self.statement.debit_floor_limit = Some(*amount);
                    }
                    if self.statement.credit_floor_limit.is_none() {
                        self.statement.credit_floor_limit = Some(*amount);
                    }
                }
            },
            Tag::DateTimeIndication { date_timestamp } => {
                self.statement.date_time_indication = Some(*date_timestamp);
            }
            // количество и сумма проводок фиксируются только в списке тегов
            Tag::NumberAndSumOfEntries { .. } => {}
        }

        // :NS: не меняет контекст привязки
        self.prev_tag = match tag {
            Tag::NonSwift { .. } => self.prev_tag,
            Tag::StatementLine(_) => PrevTag::StatementLine,
            Tag::TransactionDetails { .. } => PrevTag::TransactionDetails,
            _ => PrevTag::Other,
        };
    }

    /// Завершает сборку выписки.
    pub(crate) fn finish(mut self, message_type: MessageType) -> Statement {
        self.statement.information_to_account_owner = self.information.join("\n");
        self.statement.statement_date = match message_type {
            MessageType::Mt940 => self.statement.closing_balance_date,
            MessageType::Mt942 => self
                .statement
                .date_time_indication
                .map(|ts| ts.date_naive()),
        };

        // каскадные значения по умолчанию, применяются ровно один раз
        if self.statement.closing_balance.is_some() {
            if self.statement.closing_available_balance_date.is_none() {
                self.statement.closing_available_balance_date =
                    self.statement.closing_balance_date;
                self.statement.closing_available_balance = self.statement.closing_balance;
            }
            if self.statement.forward_available_balance_date.is_none() {
                self.statement.forward_available_balance_date =
                    self.statement.closing_available_balance_date;
                self.statement.forward_available_balance =
                    self.statement.closing_available_balance;
            }
        }

        if self.with_86_structure {
            for txn in &mut self.statement.transactions {
                txn.structured_details = field86::parse_structured_details(&txn.details());
            }
        }
        if self.with_tags {
            self.statement.tags = Some(self.tags);
        }

        self.statement
    }
}
