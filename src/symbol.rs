use std::fmt::Debug;

/// 文法文本中表示空串的写法.
pub const EPSILON_SPELLINGS: [&str; 2] = ["epsilon", "ε"];
/// 保留的输入结束符, 始终在终结符表中.
pub const END_MARKER: &str = "$";

#[must_use]
pub fn is_epsilon(ident: &str) -> bool {
    EPSILON_SPELLINGS.contains(&ident)
}

/// 驻留之后的文法符号, 下标分别指向 [`crate::Grammar`] 的终结符表与非终结符表.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(usize),
    NonTerminal(usize),
}

impl Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal(t) => f.pad(&format!("t{t}")),
            Self::NonTerminal(nt) => f.pad(&format!("nt{nt}")),
        }
    }
}

impl Symbol {
    #[must_use]
    pub fn is_term(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    #[must_use]
    pub fn is_non_term(&self) -> bool {
        matches!(self, Self::NonTerminal(_))
    }

    #[must_use]
    pub fn as_term(&self) -> Option<usize> {
        match self {
            Self::Terminal(t) => Some(*t),
            Self::NonTerminal(_) => None,
        }
    }

    #[must_use]
    pub fn as_non_term(&self) -> Option<usize> {
        match self {
            Self::NonTerminal(nt) => Some(*nt),
            Self::Terminal(_) => None,
        }
    }
}
