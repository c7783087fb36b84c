#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum Error {
    #[error("Error parsing productions, line: {line}, cause: {cause:?}.")]
    ParseProductionError {
        line: usize,
        cause: ParseProductionError,
    },
    #[error("Grammar has no nonterminals or no productions.")]
    GrammarEmpty,
    #[error("Grammar has no terminals, parse table can not be built.")]
    NoTerminals,
    #[error("Symbol declared more than once: {0}.")]
    DuplicateSymbol(String),
    #[error("Reserved spelling can not be used as a symbol name: {0}.")]
    ReservedSymbol(String),
    #[error("Invalid production {prod}: {reason}.")]
    InvalidProduction { prod: usize, reason: String },
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum ParseProductionError {
    #[error("No arrow in production line")]
    NoArrow,
    #[error("Production head is empty")]
    EmptyHead,
    #[error("Epsilon can not be a production head")]
    EpsilonHead,
    #[error("End marker can not be a production head")]
    EndMarkerHead,
}

impl Error {
    pub(crate) fn parse_production_error(line: usize, cause: ParseProductionError) -> Self {
        Self::ParseProductionError { line, cause }
    }
}

/// 触发的安全上限种类.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Steps,
    StackDepth,
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Steps => "step",
            Self::StackDepth => "stack depth",
        })
    }
}

/// 语法分析过程中的错误, 作为返回值交给调用者, 不会 panic.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseError {
    /// 分析表中对应的格子为 [`crate::Cell::Error`].
    #[error("Unexpected token `{found}` at position {position}, stack top: `{expected}`.")]
    UnexpectedToken {
        /// 出错时的前瞻终结符 (原样保留输入中的名字).
        found: String,
        /// 前瞻终结符在输入流中的下标.
        position: usize,
        /// 出错时工作栈栈顶的符号.
        expected: String,
    },
    #[error("Production {prod} can not expand `{symbol}`.")]
    MalformedProduction { prod: usize, symbol: String },
    #[error("Stack exhausted at step {step}.")]
    StackUnderflow { step: usize },
    #[error(
        "Parser {limit} limit exceeded: steps={steps}, depth={depth}, top=`{top}`, lookahead=`{lookahead}`."
    )]
    SafetyLimitExceeded {
        limit: Limit,
        steps: usize,
        depth: usize,
        top: String,
        lookahead: String,
    },
}

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum PifError {
    #[error("Malformed symbol table location on PIF line {line}: {text}")]
    MalformedLocation { line: usize, text: String },
}
