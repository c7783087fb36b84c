use std::collections::BTreeSet;

use tracing::debug;

use crate::{Grammar, Symbol};

/// 一个非终结符 (或者符号序列) 的 FIRST 集.
///
/// 终结符以下标存储, epsilon 单独用 `nullable` 表示.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    terms: BTreeSet<usize>,
    nullable: bool,
}

impl FirstSet {
    pub fn terms(&self) -> impl Iterator<Item = usize> + '_ {
        self.terms.iter().copied()
    }

    #[must_use]
    pub fn contains(&self, term: usize) -> bool {
        self.terms.contains(&term)
    }

    /// epsilon 是否属于这个 FIRST 集.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// 按终结符表顺序给出名字, epsilon 放在最后.
    #[must_use]
    pub fn names<'a>(&self, grammar: &Grammar<'a>) -> Vec<&'a str> {
        let mut names: Vec<_> = self
            .terms
            .iter()
            .map(|&t| grammar.name_of(Symbol::Terminal(t)))
            .collect();
        if self.nullable {
            names.push("epsilon");
        }
        names
    }

    /// 并入 `other` 中的终结符 (不包括 epsilon), 返回是否有变化.
    fn extend_terms(&mut self, other: &FirstSet) -> bool {
        let before = self.terms.len();
        self.terms.extend(&other.terms);
        self.terms.len() != before
    }

    fn set_nullable(&mut self) -> bool {
        !std::mem::replace(&mut self.nullable, true)
    }
}

/// 所有非终结符的 FIRST 集, 下标即非终结符下标.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    sets: Vec<FirstSet>,
}

impl FirstSets {
    /// 不动点迭代计算 FIRST 集: 反复扫描所有产生式, 直到没有集合发生变化.
    ///
    /// 集合只增不减并且以终结符表大小为上界, 所以一定会终止, 左递归文法也一样.
    #[must_use]
    pub fn compute(grammar: &Grammar) -> Self {
        let mut sets = vec![FirstSet::default(); grammar.non_terms().len()];
        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for prod in grammar.prods() {
                let first = first_of_seq(&sets, prod.tail());
                let target = &mut sets[prod.head()];
                changed |= target.extend_terms(&first);
                if first.nullable {
                    changed |= target.set_nullable();
                }
            }
            if !changed {
                break;
            }
        }
        debug!("FIRST sets converged after {passes} passes");
        Self { sets }
    }

    #[must_use]
    pub fn get(&self, nt: usize) -> Option<&FirstSet> {
        self.sets.get(nt)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FirstSet> {
        self.sets.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// 计算一个符号序列的 FIRST 集.
    ///
    /// 从左到右扫描, 遇到终结符或者不可空的非终结符就停下;
    /// 空序列或者全部可空的序列包含 epsilon.
    #[must_use]
    pub fn of_seq(&self, seq: &[Symbol]) -> FirstSet {
        first_of_seq(&self.sets, seq)
    }
}

fn first_of_seq(sets: &[FirstSet], seq: &[Symbol]) -> FirstSet {
    let mut first = FirstSet::default();
    for sym in seq {
        match *sym {
            Symbol::Terminal(t) => {
                first.terms.insert(t);
                return first;
            }
            Symbol::NonTerminal(nt) => {
                let sub = &sets[nt];
                first.terms.extend(&sub.terms);
                if !sub.nullable {
                    return first;
                }
            }
        }
    }
    first.nullable = true;
    first
}
