use crate::{Error, Result};
use fancy_regex::Regex;
use std::sync::OnceLock;

// One call statement at the start of the remaining input. String literals
// use JSON escaping; Rust `{:?}` escapes (`\0`, `\'`, `\u{..}`) are accepted too.
const CALL_PATTERN: &str = r#"^\s*(?P<name>[A-Za-z_$][\w$]*)\s*\(\s*(?P<arg>null|arguments\s*\[\s*(?P<index>\d+)\s*\]|"(?:[^"\\]|\\.)*")?\s*\)\s*(?:;|$)"#;

/// A driver call recognised in an injected script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// `replaceAlertMethod(null)` or `replaceAlertMethod(arguments[N])`.
    ReplaceAlertMethod { element_argument: Option<usize> },
    /// `answerOnNextPrompt("...")`.
    AnswerOnNextPrompt { answer: String },
}

impl ScriptCommand {
    pub fn parse_script(code: &str) -> Result<Vec<Self>> {
        let pattern = call_regex()?;

        let mut commands = Vec::new();
        let mut rest = code;
        while !rest.trim().is_empty() {
            let captures = pattern
                .captures(rest)
                .map_err(|err| Error::ScriptParse(err.to_string()))?
                .ok_or_else(|| {
                    Error::ScriptParse(format!("unsupported statement: {}", rest.trim()))
                })?;

            let name = captures.name("name").map(|m| m.as_str()).unwrap_or_default();
            let arg = captures.name("arg").map(|m| m.as_str());
            let index = captures.name("index").map(|m| m.as_str());
            commands.push(Self::from_call(name, arg, index)?);

            let consumed = captures.get(0).map(|m| m.end()).unwrap_or(rest.len());
            rest = &rest[consumed..];
        }
        Ok(commands)
    }

    fn from_call(name: &str, arg: Option<&str>, index: Option<&str>) -> Result<Self> {
        match name {
            "replaceAlertMethod" => {
                let element_argument = match (arg, index) {
                    (None, _) | (Some("null"), _) => None,
                    (Some(_), Some(index)) => Some(index.parse::<usize>().map_err(|_| {
                        Error::ScriptParse(format!("argument index out of range: {index}"))
                    })?),
                    (Some(other), None) => {
                        return Err(Error::ScriptParse(format!(
                            "replaceAlertMethod expects an element or null, got {other}"
                        )));
                    }
                };
                Ok(Self::ReplaceAlertMethod { element_argument })
            }
            "answerOnNextPrompt" => match arg {
                Some(literal) if literal.starts_with('"') => {
                    let json = json_string_literal(literal)?;
                    let answer = serde_json::from_str::<String>(&json).map_err(|err| {
                        Error::ScriptParse(format!("invalid answer literal {literal}: {err}"))
                    })?;
                    Ok(Self::AnswerOnNextPrompt { answer })
                }
                _ => Err(Error::ScriptParse(
                    "answerOnNextPrompt expects a string literal".into(),
                )),
            },
            other => Err(Error::ScriptParse(format!("unknown function: {other}"))),
        }
    }

    /// Renders the call the way a driver injects it.
    pub fn to_script(&self) -> String {
        match self {
            Self::ReplaceAlertMethod {
                element_argument: None,
            } => "replaceAlertMethod(null);".to_string(),
            Self::ReplaceAlertMethod {
                element_argument: Some(index),
            } => format!("replaceAlertMethod(arguments[{index}]);"),
            Self::AnswerOnNextPrompt { answer } => format!(
                "answerOnNextPrompt({});",
                serde_json::Value::from(answer.as_str())
            ),
        }
    }
}

fn call_regex() -> Result<&'static Regex> {
    static CALL_REGEX: OnceLock<std::result::Result<Regex, String>> = OnceLock::new();
    CALL_REGEX
        .get_or_init(|| Regex::new(CALL_PATTERN).map_err(|err| err.to_string()))
        .as_ref()
        .map_err(|err| Error::ScriptParse(format!("invalid call pattern: {err}")))
}

/// Rewrites the escapes JSON lacks into JSON form. Everything else is left
/// for the JSON decoder to accept or reject.
fn json_string_literal(literal: &str) -> Result<String> {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push_str("\\u0000"),
            Some('\'') => out.push('\''),
            Some('u') if chars.as_str().starts_with('{') => {
                let braced = chars.as_str();
                let end = braced.find('}').ok_or_else(|| {
                    Error::ScriptParse(format!("unterminated \\u{{..}} escape in {literal}"))
                })?;
                let code = u32::from_str_radix(&braced[1..end], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        Error::ScriptParse(format!(
                            "invalid unicode escape \\u{}",
                            &braced[..=end]
                        ))
                    })?;
                let mut units = [0u16; 2];
                for unit in code.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
                chars = braced[end + 1..].chars();
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}
