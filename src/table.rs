use std::fmt::Display;

use tracing::{debug, info};

use crate::{FirstSets, FollowSets, Grammar, Symbol, error::Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Error,
    /// 栈顶终结符与前瞻终结符匹配, 同时弹出.
    Pop,
    /// 栈顶与前瞻都是结束符.
    Accept,
    /// 用编号对应的产生式展开栈顶非终结符.
    Produce(usize),
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&match self {
            Self::Error => "".to_string(),
            Self::Pop => "pop".to_string(),
            Self::Accept => "acc".to_string(),
            Self::Produce(p) => format!("p{p}"),
        })
    }
}

impl Cell {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// 只在格子仍然为 [`Cell::Error`] 的时候写入, 返回是否写入.
    fn fill(&mut self, prod: usize) -> bool {
        if self.is_error() {
            *self = Self::Produce(prod);
            true
        } else {
            false
        }
    }
}

/// LL(1) 预测分析表.
///
/// 共 `N + T` 行 `T` 列: 前 `N` 行对应非终结符, 后 `T` 行对应终结符;
/// 列对应前瞻终结符, 顺序与 [`Grammar::terms`] 相同.
/// 建好之后不再修改, 可以被多次分析共享.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    cells: Vec<Vec<Cell>>,
    non_terms: usize,
    terms: usize,
}

impl ParseTable {
    /// 按固定的三遍顺序填表.
    ///
    /// 1. 所有格子置为 [`Cell::Error`], 终结符行的对角线置为 [`Cell::Pop`], 结束符的对角线置为 [`Cell::Accept`].
    /// 2. 右部以终结符开头的产生式, 占据 (左部, 该终结符) 格子.
    /// 3. 非 epsilon 产生式, 对右部 FIRST 集中的每个终结符, 只填仍为 [`Cell::Error`] 的格子.
    /// 4. 可空的产生式, 对左部 FOLLOW 集中的每个终结符, 直接覆盖格子.
    ///
    /// 对于不是 LL(1) 的文法, 这个顺序保证仍然能得到一张确定的表, 而不是报告冲突.
    /// # Errors
    /// - [`Error::GrammarEmpty`] 文法没有非终结符.
    /// - [`Error::NoTerminals`] 文法没有终结符.
    pub fn build_from(
        grammar: &Grammar,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> Result<Self, Error> {
        let non_terms = grammar.non_terms().len();
        let terms = grammar.terms().len();
        if non_terms == 0 {
            Err(Error::GrammarEmpty)?
        }
        if terms == 0 {
            Err(Error::NoTerminals)?
        }
        let mut cells = vec![vec![Cell::Error; terms]; non_terms + terms];
        for t in 0..terms {
            cells[non_terms + t][t] = Cell::Pop;
        }
        let end = grammar.end_marker();
        cells[non_terms + end][end] = Cell::Accept;

        // 以终结符开头的候选式优先.
        for (idx, prod) in grammar.prods().iter().enumerate() {
            if let Some(&Symbol::Terminal(t)) = prod.tail().first() {
                cells[prod.head()][t].fill(idx);
            }
        }
        for (idx, prod) in grammar.prods().iter().enumerate() {
            if prod.is_empty() {
                continue;
            }
            for t in first.of_seq(prod.tail()).terms() {
                let cell = &mut cells[prod.head()][t];
                if !cell.fill(idx) && *cell != Cell::Produce(idx) {
                    debug!(
                        "keep {cell} at ({}, {}), skip p{idx}",
                        grammar.name_of(Symbol::NonTerminal(prod.head())),
                        grammar.name_of(Symbol::Terminal(t))
                    );
                }
            }
        }
        // epsilon 候选式在自己的 FOLLOW 集上总是覆盖.
        for (idx, prod) in grammar.prods().iter().enumerate() {
            if !first.of_seq(prod.tail()).is_nullable() {
                continue;
            }
            for &t in follow.get(prod.head()).into_iter().flatten() {
                let cell = &mut cells[prod.head()][t];
                if !cell.is_error() && *cell != Cell::Produce(idx) {
                    debug!(
                        "overwrite {cell} at ({}, {}) with p{idx}",
                        grammar.name_of(Symbol::NonTerminal(prod.head())),
                        grammar.name_of(Symbol::Terminal(t))
                    );
                }
                *cell = Cell::Produce(idx);
            }
        }
        info!(
            "parse table built: {} rows, {} cols, {} productions",
            non_terms + terms,
            terms,
            grammar.prods().len()
        );
        Ok(Self {
            cells,
            non_terms,
            terms,
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.terms
    }

    /// 符号对应的行号: 非终结符为其下标, 终结符为 `N + 下标`.
    #[must_use]
    pub fn row_of(&self, sym: Symbol) -> usize {
        match sym {
            Symbol::NonTerminal(nt) => nt,
            Symbol::Terminal(t) => self.non_terms + t,
        }
    }

    /// 查询格子, 行或者列越界时返回 [`None`].
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row)?.get(col).copied()
    }

    /// 查询栈顶符号 `top` 在前瞻终结符 `lookahead` 下的动作.
    #[must_use]
    pub fn action(&self, top: Symbol, lookahead: usize) -> Option<Cell> {
        self.cell(self.row_of(top), lookahead)
    }

    /// 遍历一行中所有非 [`Cell::Error`] 的格子 (列号, 格子).
    /// 如果这一行不存在, 那么返回 [`None`].
    #[must_use]
    pub fn actions(&self, row: usize) -> Option<impl Iterator<Item = (usize, Cell)> + '_> {
        let v = self.cells.get(row)?;
        Some(
            v.iter()
                .copied()
                .enumerate()
                .filter(|(_, c)| !c.is_error()),
        )
    }

    /// 使用 markdown 形式输出表格, `grammar` 需要是建表时使用的文法.
    #[must_use]
    pub fn to_markdown(&self, grammar: &Grammar) -> String {
        let mut header_line = "| |".to_string();
        header_line += &grammar
            .terms()
            .iter()
            .map(|t| format!(" `{t}` |"))
            .collect::<String>();
        let sep_line: String =
            String::from("| - |") + &std::iter::repeat_n(" - |", self.terms).collect::<String>();
        let mut data_lines = String::new();
        for (row, cells) in self.cells.iter().enumerate() {
            let label = if row < self.non_terms {
                grammar.name_of(Symbol::NonTerminal(row))
            } else {
                grammar.name_of(Symbol::Terminal(row - self.non_terms))
            };
            let line = format!("| `{label}` |")
                + &cells
                    .iter()
                    .map(|cell| format!(" {cell} |"))
                    .collect::<String>();
            data_lines += &line;
            data_lines += "\n";
        }
        format!("{header_line}\n{sep_line}\n{}", data_lines.trim_end())
    }
}
