//! CLI-утилита: разбирает файл выписки SWIFT MT940/MT942 и печатает JSON.

use clap::{Parser as ClapParser, ValueEnum};
use std::fs::File;
use std::io::{self, Read, Write};
use std::process;

use ypswift_parser::{MessageType, ParseOptions, Parser};

/// Поддерживаемые типы сообщений.
#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    /// MT940 (выписка за период)
    Mt940,
    /// MT942 (внутридневная выписка)
    Mt942,
}

impl From<TypeArg> for MessageType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Mt940 => MessageType::Mt940,
            TypeArg::Mt942 => MessageType::Mt942,
        }
    }
}

/// YPSwift Converter - конвертация выписок SWIFT в JSON.
///
/// Разбирает сообщение MT940/MT942 и печатает список выписок в JSON.
#[derive(ClapParser)]
#[command(name = "ypswift-converter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Входной файл (по умолчанию stdin)
    #[arg(long, short)]
    input: Option<String>,

    /// Выходной файл (по умолчанию stdout)
    #[arg(long, short)]
    output: Option<String>,

    /// Тип сообщения
    #[arg(long = "type", short = 't', value_enum, default_value = "mt940")]
    message_type: TypeArg,

    /// Проверять обязательные теги, валюты и сверку балансов
    #[arg(long)]
    validate: bool,

    /// Прикладывать исходные теги к выпискам
    #[arg(long)]
    with_tags: bool,

    /// Не разбирать структуру поля :86:
    #[arg(long)]
    no_structure: bool,
}

fn read_input(args: &Args) -> Result<String, String> {
    let mut content = String::new();

    if let Some(ref path) = args.input {
        let mut file = File::open(path)
            .map_err(|e| format!("Не удалось открыть файл '{}': {}", path, e))?;
        file.read_to_string(&mut content)
            .map_err(|e| format!("Не удалось прочитать файл '{}': {}", path, e))?;
    } else {
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("Не удалось прочитать stdin: {}", e))?;
    }

    Ok(content)
}

fn run(args: &Args) -> Result<(), String> {
    let content = read_input(args)?;

    let mut options = ParseOptions::new(args.message_type.into());
    options.validate = args.validate;
    options.with_tags = args.with_tags;
    options.with_86_structure = !args.no_structure;

    let parser = Parser::new();
    let statements = parser
        .parse(&content, &options)
        .map_err(|e| format!("Ошибка разбора: {}", e))?;
    let json = serde_json::to_string_pretty(&statements)
        .map_err(|e| format!("Ошибка сериализации: {}", e))?;

    match args.output {
        Some(ref path) => {
            let mut file = File::create(path)
                .map_err(|e| format!("Не удалось создать файл '{}': {}", path, e))?;
            writeln!(file, "{}", json).map_err(|e| format!("Ошибка записи: {}", e))?;
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Ошибка: {}", e);
        process::exit(1);
    }
}
