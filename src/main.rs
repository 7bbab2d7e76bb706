use anyhow::{Context, Result};
use filter_translator::{translate_filter_json, translate_predicate_json, TranslateOptions};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "translator.json";

const HELP: &str = r#"输入一行JSON过滤器即可翻译，例如：
  {"fields": ["id"], "limit": 10, "order": ["age DESC"], "where": {"age": {"gt": 18}}}
命令：
  .where <json>   只翻译谓词树
  .options        显示当前翻译选项
  .help           显示帮助
  .exit           退出"#;

/// 加载翻译选项，优先使用JSON配置，失败时使用默认配置
fn load_options() -> TranslateOptions {
    match TranslateOptions::from_json_file(CONFIG_FILE) {
        Ok(options) => {
            println!("✅ 使用JSON配置文件: {}", CONFIG_FILE);
            options
        }
        Err(e) => {
            tracing::debug!(error = %e, "falling back to default options");
            println!("⚠️ 未加载配置文件 ({}), 使用默认配置", e);
            TranslateOptions::default()
        }
    }
}

/// 处理一行输入，返回 false 表示退出
fn handle_line(line: &str, options: &TranslateOptions) -> bool {
    let (source, predicate_only) = match line.split_once(char::is_whitespace) {
        Some((".where", rest)) => (rest.trim(), true),
        _ => match line {
            ".exit" | ".quit" => return false,
            ".where" => {
                println!("用法: .where <json>，例如 .where {{\"age\": {{\"gt\": 18}}}}");
                return true;
            }
            ".help" => {
                println!("{}", HELP);
                return true;
            }
            ".options" => {
                match serde_json::to_string_pretty(options) {
                    Ok(text) => println!("{}", text),
                    Err(e) => println!("✗ {}", e),
                }
                return true;
            }
            _ => (line, false),
        },
    };

    match translate(source, predicate_only, options) {
        Ok(output) => println!("{}", output),
        Err(e) => println!("✗ {:#}", e),
    }
    true
}

fn translate(source: &str, predicate_only: bool, options: &TranslateOptions) -> Result<String> {
    let input: Value = serde_json::from_str(source).context("输入不是合法的JSON")?;

    let output = if predicate_only {
        translate_predicate_json(&input, options)
    } else {
        translate_filter_json(&input, options)
    }
    .map_err(|e| anyhow::anyhow!("[{}] {}", e.kind(), e))?;

    Ok(serde_json::to_string_pretty(&output)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("--- Filter Translator: LoopBack 过滤器到 Prisma 过滤器 ---");
    let options = load_options();
    println!("输入 .help 查看用法");

    let mut editor = DefaultEditor::new().context("无法初始化行编辑器")?;
    loop {
        match editor.readline("filter> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;
                if !handle_line(line, &options) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("读取输入失败"),
        }
    }

    Ok(())
}
