use crate::{Grammar, Symbol};

/// 一次成功分析中依次使用的产生式编号, 构成一个最左推导.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derivation {
    productions: Vec<usize>,
}

impl From<Vec<usize>> for Derivation {
    fn from(productions: Vec<usize>) -> Self {
        Self { productions }
    }
}

impl Derivation {
    #[must_use]
    pub fn productions(&self) -> &[usize] {
        &self.productions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.productions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    /// 从起始符出发, 每一步用下一个产生式替换当前句型中最左边的非终结符.
    ///
    /// 返回包括起始符在内的所有句型. 如果某个产生式编号不存在,
    /// 句型中已经没有非终结符, 或者最左非终结符与产生式左部不同, 返回 [`None`].
    #[must_use]
    pub fn sentential_forms(&self, grammar: &Grammar) -> Option<Vec<Vec<Symbol>>> {
        let mut form = vec![Symbol::NonTerminal(grammar.symbol_start())];
        let mut forms = vec![form.clone()];
        for &p in &self.productions {
            let prod = grammar.prod(p)?;
            let pos = form.iter().position(Symbol::is_non_term)?;
            if form[pos] != Symbol::NonTerminal(prod.head()) {
                return None;
            }
            form.splice(pos..=pos, prod.tail().iter().copied());
            forms.push(form.clone());
        }
        Some(forms)
    }

    /// 重放推导, 得到最终推出的终结符串 (终结符下标), 右部中写出的结束符被去掉.
    ///
    /// 推导不合法或者最终句型中还有非终结符时返回 [`None`].
    #[must_use]
    pub fn replay(&self, grammar: &Grammar) -> Option<Vec<usize>> {
        let forms = self.sentential_forms(grammar)?;
        let end = Symbol::Terminal(grammar.end_marker());
        forms
            .last()?
            .iter()
            .filter(|&&sym| sym != end)
            .map(Symbol::as_term)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::{Derivation, Grammar};
    use pretty_assertions::assert_eq;

    #[test]
    fn leftmost_forms() {
        let grammar = Grammar::from_cfg("S -> a S b | epsilon").unwrap();
        let derivation = Derivation::from(vec![0, 0, 1]);
        let forms: Vec<_> = derivation
            .sentential_forms(&grammar)
            .unwrap()
            .iter()
            .map(|f| grammar.display_seq(f))
            .collect();
        assert_eq!(forms, ["S", "a S b", "a a S b b", "a a b b"]);
        assert_eq!(derivation.replay(&grammar), Some(vec![0, 0, 1, 1]));
    }

    #[test]
    fn replaces_leftmost_non_terminal_first() {
        let grammar = Grammar::from_cfg(
            "S -> A B
            A -> a
            B -> b",
        )
        .unwrap();
        assert_eq!(
            Derivation::from(vec![0, 1, 2]).replay(&grammar),
            Some(vec![0, 1])
        );
        // 先展开 B 不是最左推导.
        assert_eq!(Derivation::from(vec![0, 2, 1]).replay(&grammar), None);
    }

    #[test]
    fn explicit_end_marker_is_dropped() {
        let grammar = Grammar::from_cfg("S -> a $").unwrap();
        let derivation = Derivation::from(vec![0]);
        assert_eq!(
            grammar.display_seq(derivation.sentential_forms(&grammar).unwrap().last().unwrap()),
            "a $"
        );
        assert_eq!(derivation.replay(&grammar), Some(vec![0]));
    }

    #[test]
    fn invalid_sequences() {
        let grammar = Grammar::from_cfg("S -> a S b | epsilon").unwrap();
        // 推导没有结束.
        assert_eq!(Derivation::from(vec![0]).replay(&grammar), None);
        // 已经没有非终结符可以展开.
        assert_eq!(Derivation::from(vec![1, 1]).replay(&grammar), None);
        // 产生式不存在.
        assert_eq!(Derivation::from(vec![7]).replay(&grammar), None);
        // 空推导只有起始符一个句型.
        assert_eq!(
            Derivation::default().sentential_forms(&grammar).unwrap().len(),
            1
        );
    }
}
