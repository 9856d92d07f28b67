//! Главный парсер: конвейер от текста сообщения к списку выписок.
//!
//! Текст проходит токенизатор, фабрику тегов, группировку по выпискам,
//! необязательную семантическую проверку и сборку. Разбор синхронный и
//! не хранит состояния между вызовами; у парсера есть лишь цепочка
//! функций пост-обработки, применяемая к каждой собранной выписке.

use std::io::Read;

use crate::error::{Error, Result};
use crate::tags::{Tag, TagFactory};
use crate::tokenizer::Tokenizer;
use crate::types::Statement;
use crate::{mt940, mt942, MessageType};

/// Параметры разбора сообщения.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Тип сообщения: MT940 или MT942.
    pub message_type: MessageType,
    /// Выполнять семантические проверки перед сборкой.
    pub validate: bool,
    /// Прикладывать исходные теги к выпискам.
    pub with_tags: bool,
    /// Разбирать структуру поля :86:.
    pub with_86_structure: bool,
}

impl ParseOptions {
    /// Параметры по умолчанию для заданного типа сообщения:
    /// без проверок, без сохранения тегов, со структурой поля :86:.
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            validate: false,
            with_tags: false,
            with_86_structure: true,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new(MessageType::Mt940)
    }
}

/// Функция пост-обработки готовой выписки.
pub type PostParseMiddleware = Box<dyn Fn(&mut Statement)>;

/// Парсер сообщений MT940/MT942.
///
/// Один парсер можно использовать для любого числа сообщений; функции
/// пост-обработки применяются в порядке регистрации к каждой выписке
/// до возврата результата.
#[derive(Default)]
pub struct Parser {
    post_parse: Vec<PostParseMiddleware>,
}

impl Parser {
    /// Создает парсер без функций пост-обработки.
    pub fn new() -> Self {
        Self::default()
    }

    /// Регистрирует функцию пост-обработки выписок.
    pub fn use_post_parse<F>(&mut self, middleware: F)
    where
        F: Fn(&mut Statement) + 'static,
    {
        self.post_parse.push(Box::new(middleware));
    }

    /// Разбирает текст сообщения в список выписок.
    ///
    /// Сообщение либо разбирается целиком, либо вызов завершается
    /// ошибкой без частичного результата; при `validate` ошибка проверки
    /// любой группы прерывает весь вызов.
    pub fn parse(&self, data: &str, options: &ParseOptions) -> Result<Vec<Statement>> {
        let factory = TagFactory::new()?;
        let mut tags = Vec::new();
        for raw in Tokenizer::new(data) {
            let raw = raw?;
            tags.push(factory.create_tag(&raw.id, &raw.sub_id, &raw.text())?);
        }

        let groups = group_tags(tags)?;
        tracing::debug!("Сообщение разбито на {} групп(ы)", groups.len());

        let mut statements = Vec::with_capacity(groups.len());
        for (index, group) in groups.iter().enumerate() {
            let group_number = index + 1;
            if options.validate {
                match options.message_type {
                    MessageType::Mt940 => mt940::validate_group(group, group_number)?,
                    MessageType::Mt942 => mt942::validate_group(group, group_number)?,
                }
            }
            statements.push(match options.message_type {
                MessageType::Mt940 => mt940::build_statement(group, options),
                MessageType::Mt942 => mt942::build_statement(group, options),
            });
        }

        for statement in &mut statements {
            for middleware in &self.post_parse {
                middleware(statement);
            }
        }

        Ok(statements)
    }

    /// Разбирает сообщение из любого источника, реализующего трейт Read.
    pub fn parse_from_read<R: Read>(
        &self,
        reader: &mut R,
        options: &ParseOptions,
    ) -> Result<Vec<Statement>> {
        let mut data = String::new();
        reader.read_to_string(&mut data)?;
        self.parse(&data, options)
    }
}

/// Разбивает последовательность тегов на группы, по одной на выписку.
///
/// Режим определяется первым тегом: если он блок конверта, границей
/// служат открывающие блоки; иначе границей служит тег 20. Каждый тег
/// попадает ровно в одну группу, граница открывает свою группу.
fn group_tags(tags: Vec<Tag>) -> Result<Vec<Vec<Tag>>> {
    let Some(first) = tags.first() else {
        return Ok(Vec::new());
    };
    let by_blocks = matches!(first, Tag::MessageBlock { .. });

    let mut groups: Vec<Vec<Tag>> = Vec::new();
    for tag in tags {
        let starts_group = if by_blocks {
            tag.is_starting_block()
        } else {
            matches!(tag, Tag::TransactionReferenceNumber { .. })
        };
        if starts_group {
            groups.push(Vec::new());
        }
        match groups.last_mut() {
            Some(group) => group.push(tag),
            None => {
                return Err(Error::MalformedInput(
                    "тег до начала первой выписки".to_string(),
                ))
            }
        }
    }
    Ok(groups)
}
