//! Commit message rendering.
//!
//! Rule templates use a deliberately small grammar:
//!
//! - `{{ name }}` interpolates the answer bound to `name`
//! - `{% if name %} … {% endif %}` includes its body when the answer is truthy
//! - `{% else %}` may appear once inside an `if` block
//!
//! Blocks nest. Nothing else is interpreted; a lone `{` is literal text.
//!
//! Rendering never adds or trims whitespace, so
//! `"{{change_type}}:{% if show_message %} {{message}}{% endif %}"` renders
//! to `"feature:"` when `show_message` is false.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, trace};

/// Errors from parsing or rendering a message template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The template interpolates a name that has no answer.
    #[error("template references undefined variable `{name}`")]
    UndefinedVariable {
        /// The missing answer name.
        name: String,
    },

    /// The template is malformed.
    #[error("template syntax error at byte {offset}: {reason}")]
    Syntax {
        /// Byte offset of the offending tag.
        offset: usize,
        /// What went wrong.
        reason: String,
    },
}

/// Result alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// A single collected answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Answer to a confirm-style question.
    Bool(bool),
    /// A numeric answer or default, kept as written.
    Number(serde_json::Number),
    /// Free text or a selected choice value.
    Text(String),
    /// Several selected choice values.
    List(Vec<String>),
}

impl AnswerValue {
    /// Truthiness used by `{% if %}`: `true`, a non-zero number, a non-empty
    /// string, or a non-empty selection.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Self::Text(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Answers collected in one authoring session, keyed by question name.
pub type Answers = BTreeMap<String, AnswerValue>;

/// A parsed message template.
///
/// Parse once with [`Template::parse`], render as often as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Var(String),
    If {
        name: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug)]
enum Token<'a> {
    Text(&'a str),
    Var { inner: &'a str, offset: usize },
    Tag { inner: &'a str, offset: usize },
}

enum Terminator {
    Else(usize),
    EndIf(usize),
    Eof,
}

impl Template {
    /// Parse a template string.
    pub fn parse(source: &str) -> RenderResult<Self> {
        let tokens = tokenize(source)?;
        let mut iter = tokens.into_iter();
        let (nodes, end) = parse_nodes(&mut iter)?;
        match end {
            Terminator::Eof => Ok(Self { nodes }),
            Terminator::Else(offset) => Err(syntax(offset, "`else` outside of an `if` block")),
            Terminator::EndIf(offset) => Err(syntax(offset, "`endif` without a matching `if`")),
        }
    }

    /// Names the template reads, in first-seen order.
    ///
    /// Includes names only used as `if` conditions.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_variables(&self.nodes, &mut names);
        names
    }

    /// Render against a set of answers.
    pub fn render(&self, answers: &Answers) -> RenderResult<String> {
        let mut out = String::new();
        render_nodes(&self.nodes, answers, &mut out)?;
        Ok(out)
    }
}

/// Parse and render `template` in one step.
#[instrument(skip_all, fields(answers = answers.len()))]
pub fn render(template: &str, answers: &Answers) -> RenderResult<String> {
    let message = Template::parse(template)?.render(answers)?;
    trace!(%message, "rendered commit message");
    Ok(message)
}

fn syntax(offset: usize, reason: impl Into<String>) -> RenderError {
    RenderError::Syntax {
        offset,
        reason: reason.into(),
    }
}

fn tokenize(source: &str) -> RenderResult<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let Some(rel) = source[pos..].find('{') else {
            tokens.push(Token::Text(&source[pos..]));
            break;
        };
        let start = pos + rel;

        let close = match source.as_bytes().get(start + 1) {
            Some(b'{') => "}}",
            Some(b'%') => "%}",
            _ => {
                // A lone brace is plain text.
                tokens.push(Token::Text(&source[pos..=start]));
                pos = start + 1;
                continue;
            }
        };

        if start > pos {
            tokens.push(Token::Text(&source[pos..start]));
        }

        let inner_start = start + 2;
        let Some(len) = source[inner_start..].find(close) else {
            return Err(syntax(start, format!("unclosed tag, expected `{close}`")));
        };
        let inner = source[inner_start..inner_start + len].trim();
        tokens.push(if close == "}}" {
            Token::Var {
                inner,
                offset: start,
            }
        } else {
            Token::Tag {
                inner,
                offset: start,
            }
        });
        pos = inner_start + len + close.len();
    }

    Ok(tokens)
}

fn parse_nodes<'a, I>(iter: &mut I) -> RenderResult<(Vec<Node>, Terminator)>
where
    I: Iterator<Item = Token<'a>>,
{
    let mut nodes = Vec::new();

    while let Some(token) = iter.next() {
        match token {
            Token::Text(text) => nodes.push(Node::Text(text.to_string())),
            Token::Var { inner, offset } => {
                nodes.push(Node::Var(variable_name(inner, offset)?.to_string()));
            }
            Token::Tag { inner, offset } => {
                let mut words = inner.split_whitespace();
                match (words.next(), words.next(), words.next()) {
                    (Some("if"), Some(name), None) => {
                        let name = variable_name(name, offset)?.to_string();
                        let (then, end) = parse_nodes(iter)?;
                        let otherwise = match end {
                            Terminator::EndIf(_) => Vec::new(),
                            Terminator::Else(_) => match parse_nodes(iter)? {
                                (otherwise, Terminator::EndIf(_)) => otherwise,
                                (_, Terminator::Else(at)) => {
                                    return Err(syntax(at, "duplicate `else` in `if` block"));
                                }
                                (_, Terminator::Eof) => {
                                    return Err(syntax(offset, "`if` block is never closed"));
                                }
                            },
                            Terminator::Eof => {
                                return Err(syntax(offset, "`if` block is never closed"));
                            }
                        };
                        nodes.push(Node::If {
                            name,
                            then,
                            otherwise,
                        });
                    }
                    (Some("else"), None, None) => return Ok((nodes, Terminator::Else(offset))),
                    (Some("endif"), None, None) => return Ok((nodes, Terminator::EndIf(offset))),
                    _ => return Err(syntax(offset, format!("unsupported tag `{inner}`"))),
                }
            }
        }
    }

    Ok((nodes, Terminator::Eof))
}

fn variable_name(name: &str, offset: usize) -> RenderResult<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(name)
    } else {
        Err(syntax(offset, format!("invalid variable name `{name}`")))
    }
}

fn collect_variables<'a>(nodes: &'a [Node], names: &mut Vec<&'a str>) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Var(name) => push_unique(names, name),
            Node::If {
                name,
                then,
                otherwise,
            } => {
                push_unique(names, name);
                collect_variables(then, names);
                collect_variables(otherwise, names);
            }
        }
    }
}

fn push_unique<'a>(names: &mut Vec<&'a str>, name: &'a str) {
    if !names.contains(&name) {
        names.push(name);
    }
}

fn render_nodes(nodes: &[Node], answers: &Answers, out: &mut String) -> RenderResult<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(name) => {
                let value = answers
                    .get(name)
                    .ok_or_else(|| RenderError::UndefinedVariable { name: name.clone() })?;
                out.push_str(&value.to_string());
            }
            Node::If {
                name,
                then,
                otherwise,
            } => {
                // A missing answer is falsy here; only interpolation requires it.
                let branch = if answers.get(name).is_some_and(AnswerValue::is_truthy) {
                    then
                } else {
                    otherwise
                };
                render_nodes(branch, answers, out)?;
            }
        }
    }
    Ok(())
}
