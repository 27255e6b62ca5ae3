//! Directive overlay parser
//!
//! Lowers a preprocessor-style overlay header into an ordered
//! [`SourceLayer`]. Only the subset integrators actually write is accepted:
//!
//! ```c
//! #ifndef _USER_CONFIG_OVERRIDE_H_      // include guard, ignored
//! #define _USER_CONFIG_OVERRIDE_H_
//!
//! #undef  CFG_HOLDER
//! #define CFG_HOLDER 4618
//!
//! #ifdef USE_VEML6070
//!   #undef USE_VEML6070                 // guarded entry
//! #endif
//!
//! #endif  // _USER_CONFIG_OVERRIDE_H_
//! ```
//!
//! Comments are stripped before directives are read. Anything else that is
//! not blank is a parse error carrying the line number.

use fwcfg_meta::{RawValue, is_valid_identifier};

use crate::error::{Error, Result};
use crate::source::{Guard, LayerEntry, LayerSyntax, SourceLayer};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    Define { name: String, value: Option<String> },
    Undef { name: String },
    Ifdef { name: String },
    Ifndef { name: String },
    Endif,
}

/// Parse directive overlay text; `origin` names the file in errors
pub fn parse(text: &str, origin: &str) -> Result<SourceLayer> {
    let lines = strip_comments(text, origin)?;

    let mut directives = Vec::new();
    for (line, code) in lines {
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        directives.push((line, parse_directive(code, line, origin)?));
    }

    drop_include_guard(&mut directives);
    lower(directives, origin)
}

/// Remove `//` and `/* */` comments, keeping line numbers (1-based)
fn strip_comments(text: &str, origin: &str) -> Result<Vec<(usize, String)>> {
    let mut out = Vec::new();
    let mut in_block: Option<usize> = None;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let mut code = String::with_capacity(raw.len());
        let mut in_string = false;
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if in_block.is_some() {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    in_block = None;
                    code.push(' ');
                }
                continue;
            }

            if in_string {
                code.push(c);
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            code.push(escaped);
                        }
                    }
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match (c, chars.peek()) {
                ('"', _) => {
                    in_string = true;
                    code.push(c);
                }
                ('/', Some('/')) => break,
                ('/', Some('*')) => {
                    chars.next();
                    in_block = Some(line);
                }
                _ => code.push(c),
            }
        }

        if in_string {
            return Err(Error::parse(origin, line, "unterminated string literal"));
        }
        out.push((line, code));
    }

    if let Some(start) = in_block {
        return Err(Error::parse(origin, start, "unterminated block comment"));
    }
    Ok(out)
}

fn parse_directive(code: &str, line: usize, origin: &str) -> Result<Directive> {
    let Some(rest) = code.strip_prefix('#') else {
        return Err(Error::parse(
            origin,
            line,
            format!("expected a preprocessor directive, found '{}'", code),
        ));
    };

    let rest = rest.trim_start();
    let keyword_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (keyword, args) = rest.split_at(keyword_len);

    match keyword {
        "define" => {
            let (name, tail) = split_name(args, keyword, line, origin)?;
            if tail.starts_with('(') {
                return Err(Error::parse(
                    origin,
                    line,
                    format!("function-like macro '{}' is not supported", name),
                ));
            }
            let value = tail.trim();
            Ok(Directive::Define {
                name,
                value: (!value.is_empty()).then(|| value.to_string()),
            })
        }
        "undef" => Ok(Directive::Undef {
            name: sole_name(args, keyword, line, origin)?,
        }),
        "ifdef" => Ok(Directive::Ifdef {
            name: sole_name(args, keyword, line, origin)?,
        }),
        "ifndef" => Ok(Directive::Ifndef {
            name: sole_name(args, keyword, line, origin)?,
        }),
        "endif" => Ok(Directive::Endif),
        "" => Err(Error::parse(origin, line, "empty directive")),
        other => Err(Error::parse(
            origin,
            line,
            format!("unsupported directive '#{}'", other),
        )),
    }
}

/// Leading identifier of `args` and whatever follows it
fn split_name<'a>(
    args: &'a str,
    keyword: &str,
    line: usize,
    origin: &str,
) -> Result<(String, &'a str)> {
    if !args.is_empty() && !args.starts_with(char::is_whitespace) {
        return Err(Error::parse(
            origin,
            line,
            format!("unsupported directive '#{}{}'", keyword, args),
        ));
    }

    let args = args.trim_start();
    let end = args
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(args.len());
    let (name, tail) = args.split_at(end);

    if name.is_empty() {
        return Err(Error::parse(
            origin,
            line,
            format!("#{} requires a name", keyword),
        ));
    }
    if !is_valid_identifier(name) {
        return Err(Error::parse(
            origin,
            line,
            format!("'{}' is not a valid identifier", name),
        ));
    }
    Ok((name.to_string(), tail))
}

fn sole_name(args: &str, keyword: &str, line: usize, origin: &str) -> Result<String> {
    let (name, tail) = split_name(args, keyword, line, origin)?;
    if !tail.trim().is_empty() {
        return Err(Error::parse(
            origin,
            line,
            format!("unexpected tokens after #{} {}: '{}'", keyword, name, tail.trim()),
        ));
    }
    Ok(name)
}

/// An include guard ends in `_H` or `_H_`, opens the file and closes it
fn drop_include_guard(directives: &mut Vec<(usize, Directive)>) {
    let guard = match directives.as_slice() {
        [
            (_, Directive::Ifndef { name }),
            (_, Directive::Define { name: defined, value: None }),
            ..,
            (_, Directive::Endif),
        ] if name == defined && (name.ends_with("_H") || name.ends_with("_H_")) => name.clone(),
        _ => return,
    };

    let mut depth = 0usize;
    for (i, (_, directive)) in directives.iter().enumerate() {
        match directive {
            Directive::Ifdef { .. } | Directive::Ifndef { .. } => depth += 1,
            Directive::Endif => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if i != directives.len() - 1 {
                        return;
                    }
                    break;
                }
            }
            _ => {}
        }
    }

    tracing::debug!(guard = %guard, "Ignoring include guard");
    directives.pop();
    directives.drain(..2);
}

fn lower(directives: Vec<(usize, Directive)>, origin: &str) -> Result<SourceLayer> {
    let mut layer = SourceLayer::overrides()
        .with_syntax(LayerSyntax::Directive)
        .with_origin(origin);
    let mut guards: Vec<Guard> = Vec::new();

    for (line, directive) in directives {
        match directive {
            Directive::Define { name, value } => {
                let raw = match value {
                    Some(text) => RawValue::Text(text),
                    None => RawValue::Bool(true),
                };
                layer.push(
                    LayerEntry::set(name, raw)
                        .at_line(line)
                        .guarded_by(guards.clone()),
                );
            }
            Directive::Undef { name } => {
                layer.push(
                    LayerEntry::undefine(name)
                        .at_line(line)
                        .guarded_by(guards.clone()),
                );
            }
            Directive::Ifdef { name } => guards.push(Guard {
                name,
                defined: true,
                line,
            }),
            Directive::Ifndef { name } => guards.push(Guard {
                name,
                defined: false,
                line,
            }),
            Directive::Endif => {
                if guards.pop().is_none() {
                    return Err(Error::parse(origin, line, "#endif without matching #ifdef"));
                }
            }
        }
    }

    if let Some(open) = guards.pop() {
        return Err(Error::parse(
            origin,
            open.line,
            format!("unterminated {}", open),
        ));
    }
    Ok(layer)
}
