use std::{
    collections::HashMap,
    fmt::{Debug, Display},
};

use crate::{
    error::{Error, ParseProductionError},
    symbol::{END_MARKER, Symbol, is_epsilon},
};

#[derive(Clone, Hash, PartialEq, Eq)]
pub struct Production {
    // 产生式 `->` 左侧的非终结符下标.
    head: usize,
    // 产生式 `->` 右侧内容, 不含 epsilon, 空表示 epsilon 产生式.
    tail: Vec<Symbol>,
}

impl Debug for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Production")
            .field(&format_args!(
                "nt{} -> {}",
                self.head,
                self.tail
                    .iter()
                    .map(|t| format!("{:?} ", t))
                    .collect::<String>()
                    .trim_end()
            ))
            .finish()
    }
}

impl Production {
    #[must_use]
    pub fn new(head: usize, tail: Vec<Symbol>) -> Self {
        Self { head, tail }
    }

    #[must_use]
    pub fn head(&self) -> usize {
        self.head
    }

    #[must_use]
    pub fn tail(&self) -> &[Symbol] {
        &self.tail
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tail.len()
    }

    /// 是否为 epsilon 产生式.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tail.is_empty()
    }
}

/// 已经驻留完成的上下文无关文法.
///
/// 非终结符下标 0 为起始符, 终结符表中始终包含 [`END_MARKER`].
/// 符号名借用自文法文本, 所以文法的生命周期不会超过文本.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar<'a> {
    non_terms: Vec<&'a str>,
    terms: Vec<&'a str>,
    non_term_idxes: HashMap<&'a str, usize>,
    term_idxes: HashMap<&'a str, usize>,
    prods: Vec<Production>,
    end_marker: usize,
}

impl<'a> Grammar<'a> {
    /// 解析文法文本.
    ///
    /// 格式为每行 `LHS -> RHS1 | RHS2 | ...`, 符号之间用空白分隔, `#` 开头的行和空行被忽略.
    /// 所有出现在 `->` 左侧的符号都是非终结符 (第一个为起始符), 其余的右侧符号都是终结符.
    /// `epsilon` 与 `ε` 表示空串, 只由空白组成的候选式同样是 epsilon 产生式.
    /// # Errors
    /// - [`Error::ParseProductionError`] 某一行不是合法的产生式.
    /// - [`Error::GrammarEmpty`] 文本中没有任何产生式.
    pub fn from_cfg(s: &'a str) -> Result<Self, Error> {
        let mut non_terms = Vec::new();
        let mut non_term_idxes: HashMap<&str, usize> = HashMap::new();
        let mut splitted: Vec<(usize, &str)> = Vec::new();
        // 找出所有的非终结符.
        for (line_num, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (head, tails) = line.split_once("->").ok_or(Error::parse_production_error(
                line_num,
                ParseProductionError::NoArrow,
            ))?;
            let head = head.trim();
            if head.is_empty() {
                Err(Error::parse_production_error(
                    line_num,
                    ParseProductionError::EmptyHead,
                ))?
            }
            if is_epsilon(head) {
                Err(Error::parse_production_error(
                    line_num,
                    ParseProductionError::EpsilonHead,
                ))?
            }
            if head == END_MARKER {
                Err(Error::parse_production_error(
                    line_num,
                    ParseProductionError::EndMarkerHead,
                ))?
            }
            let head_idx = *non_term_idxes.entry(head).or_insert_with(|| {
                non_terms.push(head);
                non_terms.len() - 1
            });
            splitted.push((head_idx, tails));
        }
        // 解析所有产生式, 终结符按照第一次出现的顺序编号.
        let mut terms = Vec::new();
        let mut term_idxes: HashMap<&str, usize> = HashMap::new();
        let mut prods = Vec::new();
        for (head, tails) in splitted {
            for tail_s in tails.split('|') {
                let tail = tail_s
                    .split_whitespace()
                    .filter(|s| !is_epsilon(s))
                    .map(|s| {
                        if let Some(&nt) = non_term_idxes.get(s) {
                            Symbol::NonTerminal(nt)
                        } else {
                            Symbol::Terminal(*term_idxes.entry(s).or_insert_with(|| {
                                terms.push(s);
                                terms.len() - 1
                            }))
                        }
                    })
                    .collect();
                prods.push(Production::new(head, tail));
            }
        }
        if prods.is_empty() {
            Err(Error::GrammarEmpty)?
        }
        let end_marker = *term_idxes.entry(END_MARKER).or_insert_with(|| {
            terms.push(END_MARKER);
            terms.len() - 1
        });
        Ok(Self {
            non_terms,
            terms,
            non_term_idxes,
            term_idxes,
            prods,
            end_marker,
        })
    }

    /// 从已经驻留好的符号表和产生式直接构建文法, 如果终结符表中没有 [`END_MARKER`] 会自动追加.
    /// # Errors
    /// - [`Error::GrammarEmpty`] 没有非终结符.
    /// - [`Error::DuplicateSymbol`] 符号名重复 (包括同时作为终结符与非终结符).
    /// - [`Error::ReservedSymbol`] 符号名是 epsilon 的写法之一, 空串只能用空的右部表示.
    /// - [`Error::InvalidProduction`] 产生式引用了不存在的符号.
    pub fn from_parts(
        non_terms: Vec<&'a str>,
        mut terms: Vec<&'a str>,
        prods: Vec<Production>,
    ) -> Result<Self, Error> {
        if non_terms.is_empty() {
            Err(Error::GrammarEmpty)?
        }
        if !terms.contains(&END_MARKER) {
            terms.push(END_MARKER);
        }
        if let Some(&name) = non_terms.iter().chain(&terms).find(|s| is_epsilon(s)) {
            Err(Error::ReservedSymbol(name.to_string()))?
        }
        let mut non_term_idxes = HashMap::new();
        for (idx, &nt) in non_terms.iter().enumerate() {
            if non_term_idxes.insert(nt, idx).is_some() {
                Err(Error::DuplicateSymbol(nt.to_string()))?
            }
        }
        let mut term_idxes = HashMap::new();
        for (idx, &t) in terms.iter().enumerate() {
            if non_term_idxes.contains_key(t) || term_idxes.insert(t, idx).is_some() {
                Err(Error::DuplicateSymbol(t.to_string()))?
            }
        }
        for (idx, prod) in prods.iter().enumerate() {
            if prod.head >= non_terms.len() {
                Err(Error::InvalidProduction {
                    prod: idx,
                    reason: format!("head nt{} out of range", prod.head),
                })?
            }
            let out_of_range = prod.tail.iter().find(|sym| match sym {
                Symbol::Terminal(t) => *t >= terms.len(),
                Symbol::NonTerminal(nt) => *nt >= non_terms.len(),
            });
            if let Some(sym) = out_of_range {
                Err(Error::InvalidProduction {
                    prod: idx,
                    reason: format!("symbol {sym:?} out of range"),
                })?
            }
        }
        let end_marker = term_idxes[END_MARKER];
        Ok(Self {
            non_terms,
            terms,
            non_term_idxes,
            term_idxes,
            prods,
            end_marker,
        })
    }

    /// 按产生式编号遍历产生式.
    #[must_use]
    pub fn prods(&self) -> &[Production] {
        &self.prods
    }

    #[must_use]
    pub fn prod(&self, idx: usize) -> Option<&Production> {
        self.prods.get(idx)
    }

    /// 获取以某个非终结符为头部的所有产生式及其编号, 结果可能为空.
    pub fn prods_of(&self, nt: usize) -> impl Iterator<Item = (usize, &Production)> {
        self.prods
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.head == nt)
    }

    #[must_use]
    pub fn non_terms(&self) -> &[&'a str] {
        &self.non_terms
    }

    #[must_use]
    pub fn terms(&self) -> &[&'a str] {
        &self.terms
    }

    /// 起始符的非终结符下标, 始终为 0.
    #[must_use]
    pub fn symbol_start(&self) -> usize {
        0
    }

    /// [`END_MARKER`] 的终结符下标.
    #[must_use]
    pub fn end_marker(&self) -> usize {
        self.end_marker
    }

    #[must_use]
    pub fn non_term_index(&self, name: &str) -> Option<usize> {
        self.non_term_idxes.get(name).copied()
    }

    #[must_use]
    pub fn term_index(&self, name: &str) -> Option<usize> {
        self.term_idxes.get(name).copied()
    }

    /// 按名字查找符号, 非终结符优先.
    #[must_use]
    pub fn get_symbol(&self, name: &str) -> Option<Symbol> {
        self.non_term_index(name)
            .map(Symbol::NonTerminal)
            .or_else(|| self.term_index(name).map(Symbol::Terminal))
    }

    /// 符号的名字, 下标越界时 panic.
    #[must_use]
    pub fn name_of(&self, sym: Symbol) -> &'a str {
        match sym {
            Symbol::Terminal(t) => self.terms[t],
            Symbol::NonTerminal(nt) => self.non_terms[nt],
        }
    }

    /// 以文法中的符号名显示一个产生式, 编号不存在时返回 [`None`].
    #[must_use]
    pub fn display_prod(&self, idx: usize) -> Option<ProdDisplay<'_, 'a>> {
        let prod = self.prods.get(idx)?;
        Some(ProdDisplay {
            grammar: self,
            prod,
        })
    }

    /// 显示一个符号序列 (句型), 空序列显示为 `epsilon`.
    #[must_use]
    pub fn display_seq(&self, seq: &[Symbol]) -> String {
        if seq.is_empty() {
            return "epsilon".to_string();
        }
        seq.iter()
            .map(|&sym| self.name_of(sym))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct ProdDisplay<'g, 'a> {
    grammar: &'g Grammar<'a>,
    prod: &'g Production,
}

impl Display for ProdDisplay<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&format!(
            "{} -> {}",
            self.grammar.non_terms[self.prod.head],
            self.grammar.display_seq(&self.prod.tail)
        ))
    }
}

#[cfg(test)]
mod test {
    use crate::{
        Production, Symbol,
        error::{Error, ParseProductionError},
        grammar::Grammar,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_productions() {
        let input = "
            # statements
            program -> compoundstmt
            stmt -> ifstmt | whilestmt | assgstmt

            compoundstmt -> { stmts }
            stmts -> stmt stmts | epsilon
        ";
        let grammar = Grammar::from_cfg(input).unwrap();

        assert_eq!(
            grammar.non_terms(),
            ["program", "stmt", "compoundstmt", "stmts"]
        );
        assert_eq!(
            grammar.terms(),
            ["ifstmt", "whilestmt", "assgstmt", "{", "}", "$"]
        );
        assert_eq!(grammar.end_marker(), 5);
        assert_eq!(
            grammar.prods(),
            [
                Production::new(0, vec![Symbol::NonTerminal(2)]),
                Production::new(1, vec![Symbol::Terminal(0)]),
                Production::new(1, vec![Symbol::Terminal(1)]),
                Production::new(1, vec![Symbol::Terminal(2)]),
                Production::new(
                    2,
                    vec![
                        Symbol::Terminal(3),
                        Symbol::NonTerminal(3),
                        Symbol::Terminal(4)
                    ]
                ),
                Production::new(3, vec![Symbol::NonTerminal(1), Symbol::NonTerminal(3)]),
                Production::new(3, vec![]),
            ]
        );
        assert_eq!(
            grammar.prods_of(1).map(|(i, _)| i).collect::<Vec<_>>(),
            [1, 2, 3]
        );
    }

    #[test]
    fn non_terminal_declared_after_use() {
        // `B` 在第一行被使用, 在第二行才作为头部出现, 仍然是非终结符.
        let grammar = Grammar::from_cfg("S -> B a\nB -> b").unwrap();
        assert_eq!(grammar.non_terms(), ["S", "B"]);
        assert_eq!(grammar.terms(), ["a", "b", "$"]);
        assert_eq!(grammar.get_symbol("B"), Some(Symbol::NonTerminal(1)));
        assert_eq!(grammar.get_symbol("a"), Some(Symbol::Terminal(0)));
        assert_eq!(grammar.get_symbol("c"), None);
    }

    #[test]
    fn epsilon_alternatives() {
        let grammar = Grammar::from_cfg("S -> a S b | ε |   \nT ->").unwrap();
        let lens: Vec<_> = grammar.prods().iter().map(|p| p.len()).collect();
        assert_eq!(lens, [3, 0, 0, 0]);
        assert_eq!(grammar.display_prod(0).unwrap().to_string(), "S -> a S b");
        assert_eq!(grammar.display_prod(1).unwrap().to_string(), "S -> epsilon");
        assert!(grammar.display_prod(4).is_none());
    }

    #[test]
    fn explicit_end_marker_is_not_duplicated() {
        let grammar = Grammar::from_cfg("S -> a $").unwrap();
        assert_eq!(grammar.terms(), ["a", "$"]);
        assert_eq!(grammar.end_marker(), 1);
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(
            Grammar::from_cfg("S -> a\nS a"),
            Err(Error::ParseProductionError {
                line: 1,
                cause: ParseProductionError::NoArrow
            })
        );
        assert_eq!(
            Grammar::from_cfg(" -> a"),
            Err(Error::ParseProductionError {
                line: 0,
                cause: ParseProductionError::EmptyHead
            })
        );
        assert_eq!(
            Grammar::from_cfg("epsilon -> a"),
            Err(Error::ParseProductionError {
                line: 0,
                cause: ParseProductionError::EpsilonHead
            })
        );
        assert_eq!(
            Grammar::from_cfg("S -> a\n$ -> a $ | epsilon"),
            Err(Error::ParseProductionError {
                line: 1,
                cause: ParseProductionError::EndMarkerHead
            })
        );
        assert_eq!(Grammar::from_cfg("# nothing\n\n"), Err(Error::GrammarEmpty));
    }

    #[test]
    fn from_parts() {
        let grammar = Grammar::from_parts(
            vec!["S"],
            vec!["a"],
            vec![Production::new(0, vec![Symbol::Terminal(0), Symbol::NonTerminal(0)])],
        )
        .unwrap();
        assert_eq!(grammar.terms(), ["a", "$"]);
        assert_eq!(grammar, Grammar::from_cfg("S -> a S").unwrap());

        assert_eq!(
            Grammar::from_parts(vec![], vec!["a"], vec![]),
            Err(Error::GrammarEmpty)
        );
        assert_eq!(
            Grammar::from_parts(vec!["S"], vec!["S"], vec![]),
            Err(Error::DuplicateSymbol("S".into()))
        );
        assert_eq!(
            Grammar::from_parts(
                vec!["S"],
                vec!["a", "epsilon"],
                vec![
                    Production::new(0, vec![Symbol::Terminal(0), Symbol::NonTerminal(0)]),
                    Production::new(0, vec![Symbol::Terminal(1)]),
                ]
            ),
            Err(Error::ReservedSymbol("epsilon".into()))
        );
        assert_eq!(
            Grammar::from_parts(vec!["ε"], vec!["a"], vec![]),
            Err(Error::ReservedSymbol("ε".into()))
        );
        assert!(matches!(
            Grammar::from_parts(
                vec!["S"],
                vec!["a"],
                vec![Production::new(0, vec![Symbol::Terminal(7)])]
            ),
            Err(Error::InvalidProduction { prod: 0, .. })
        ));
    }
}
