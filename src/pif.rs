//! 读取词法分析器导出的 PIF (Program Internal Form).
//!
//! 每行一个记号: `lexeme bucket,pos` 表示带有符号表位置的记号,
//! `lexeme -1` 或者只有 `lexeme` 表示没有符号表项的记号.
//! 包含 `~~~~` 或 `End PIF` 的表头表尾行以及空行会被跳过.

use tracing::debug;

use crate::{Grammar, StLocation, Token, error::PifError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PifEntry {
    pub lexeme: String,
    pub location: Option<StLocation>,
}

impl PifEntry {
    /// 以给定的终结符名生成输入记号, 词素与符号表位置原样带上.
    #[must_use]
    pub fn to_token(&self, terminal: impl Into<String>) -> Token {
        Token {
            terminal: terminal.into(),
            lexeme: Some(self.lexeme.clone()),
            location: self.location,
        }
    }
}

/// 解析整个 PIF 文本.
///
/// 第二列只有一个整数 (没有逗号) 时当作没有符号表位置.
/// # Errors
/// [`PifError::MalformedLocation`] 第二列既不是整数也不是 `bucket,pos`, 行号从 1 开始.
pub fn read_pif(text: &str) -> Result<Vec<PifEntry>, PifError> {
    let mut entries = vec![];
    for (idx, line) in text.lines().enumerate() {
        if line.contains("~~~~") || line.contains("End PIF") {
            continue;
        }
        let mut fields = line.split_whitespace();
        let Some(lexeme) = fields.next() else {
            continue;
        };
        let location = match fields.next() {
            None | Some("-1") => None,
            Some(loc) if loc.parse::<isize>().is_ok() => {
                debug!("PIF line {}: `{loc}` has no position, location dropped", idx + 1);
                None
            }
            Some(loc) => Some(parse_location(loc).ok_or_else(|| PifError::MalformedLocation {
                line: idx + 1,
                text: loc.to_string(),
            })?),
        };
        entries.push(PifEntry {
            lexeme: lexeme.to_string(),
            location,
        });
    }
    Ok(entries)
}

/// 把词素映射为 `grammar` 中的终结符名.
///
/// 依次尝试: 词素本身, 大写形式 (关键字, 如 `bind` -> `BIND`),
/// 以及按形状归类的 `STRING` (带双引号), `NUMBER` (数字, 至多一个小数点),
/// `IDENTIFIER` (字母数字与下划线). 归类结果不在终结符表中时跳过, 都不匹配时原样返回词素.
#[must_use]
pub fn classify(grammar: &Grammar, lexeme: &str) -> String {
    if grammar.term_index(lexeme).is_some() {
        return lexeme.to_string();
    }
    let upper = lexeme.to_uppercase();
    if grammar.term_index(&upper).is_some() {
        return upper;
    }
    let is_string = lexeme.len() >= 2 && lexeme.starts_with('"') && lexeme.ends_with('"');
    let is_number = lexeme.chars().any(|c| c.is_ascii_digit())
        && lexeme.chars().all(|c| c.is_ascii_digit() || c == '.')
        && lexeme.matches('.').count() <= 1;
    let is_identifier =
        !lexeme.is_empty() && lexeme.chars().all(|c| c.is_alphanumeric() || c == '_');
    [
        (is_string, "STRING"),
        (is_number, "NUMBER"),
        (is_identifier, "IDENTIFIER"),
    ]
    .into_iter()
    .find(|&(shape, name)| shape && grammar.term_index(name).is_some())
    .map_or_else(|| lexeme.to_string(), |(_, name)| name.to_string())
}

fn parse_location(s: &str) -> Option<StLocation> {
    let (bucket, pos) = s.split_once(',')?;
    Some(StLocation {
        bucket: bucket.trim().parse().ok()?,
        pos: pos.trim().parse().ok()?,
    })
}

#[cfg(test)]
mod test {
    use crate::{
        Grammar, StLocation,
        error::PifError,
        pif::{PifEntry, classify, read_pif},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn entries() {
        let text = "~~~~~~~~ PIF ~~~~~~~~
bind -1
x 3,0

=
42 7,1
;
~~~~~~~~ End PIF ~~~~~~~~
";
        let entries = read_pif(text).unwrap();
        let view: Vec<_> = entries
            .iter()
            .map(|e| (e.lexeme.as_str(), e.location))
            .collect();
        assert_eq!(
            view,
            [
                ("bind", None),
                ("x", Some(StLocation { bucket: 3, pos: 0 })),
                ("=", None),
                ("42", Some(StLocation { bucket: 7, pos: 1 })),
                (";", None),
            ]
        );
    }

    #[test]
    fn malformed_location() {
        assert_eq!(
            read_pif("x 1,0\ny 3;4\n"),
            Err(PifError::MalformedLocation {
                line: 2,
                text: "3;4".to_string()
            })
        );
        assert!(read_pif("x a,b").is_err());
        assert!(read_pif("x 1,").is_err());
    }

    #[test]
    fn bucket_without_position() {
        let entries = read_pif("x 3\ny -2\n").unwrap();
        assert!(entries.iter().all(|e| e.location.is_none()));
        assert_eq!(entries[0].lexeme, "x");
    }

    #[test]
    fn classify_by_shape() {
        let grammar = Grammar::from_cfg(
            "program -> BIND IDENTIFIER = value
            value -> NUMBER | STRING",
        )
        .unwrap();
        assert_eq!(classify(&grammar, "="), "=");
        assert_eq!(classify(&grammar, "bind"), "BIND");
        assert_eq!(classify(&grammar, "total_2"), "IDENTIFIER");
        assert_eq!(classify(&grammar, "3.14"), "NUMBER");
        assert_eq!(classify(&grammar, "1.2.3"), "1.2.3");
        assert_eq!(classify(&grammar, "\"hi\""), "STRING");
        assert_eq!(classify(&grammar, "+"), "+");
    }

    #[test]
    fn to_token() {
        let entry = PifEntry {
            lexeme: "count".to_string(),
            location: Some(StLocation { bucket: 2, pos: 5 }),
        };
        let token = entry.to_token("IDENTIFIER");
        assert_eq!(token.terminal, "IDENTIFIER");
        assert_eq!(token.lexeme.as_deref(), Some("count"));
        assert_eq!(token.location, entry.location);
    }
}
