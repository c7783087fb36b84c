use std::fmt::Display;

/// 符号表中的位置 (桶号, 桶内位置).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StLocation {
    pub bucket: usize,
    pub pos: usize,
}

impl Display for StLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!("{},{}", self.bucket, self.pos))
    }
}

/// 词法分析器交给语法分析器的一个输入单元.
///
/// `terminal` 是文法中的终结符名, 用来查表;
/// `lexeme` 与 `location` 只在建树模式下被复制到叶子节点上.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub terminal: String,
    pub lexeme: Option<String>,
    /// 关键字, 运算符等没有符号表项的记号为 [`None`].
    pub location: Option<StLocation>,
}

impl Token {
    #[must_use]
    pub fn new(terminal: impl Into<String>) -> Self {
        Self {
            terminal: terminal.into(),
            lexeme: None,
            location: None,
        }
    }

    #[must_use]
    pub fn with_lexeme(mut self, lexeme: impl Into<String>) -> Self {
        self.lexeme = Some(lexeme.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, bucket: usize, pos: usize) -> Self {
        self.location = Some(StLocation { bucket, pos });
        self
    }
}

impl From<&str> for Token {
    fn from(terminal: &str) -> Self {
        Self::new(terminal)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.terminal
    }
}
