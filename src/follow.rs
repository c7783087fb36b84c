use std::collections::BTreeSet;

use tracing::debug;

use crate::{FirstSets, Grammar, Symbol};

/// 所有非终结符的 FOLLOW 集, 下标即非终结符下标, 集合中是终结符下标 (不会包含 epsilon).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets {
    sets: Vec<BTreeSet<usize>>,
}

impl FollowSets {
    /// 不动点迭代计算 FOLLOW 集, `first` 必须是同一个文法已经算好的 FIRST 集.
    ///
    /// 起始符的 FOLLOW 集先放入结束符. 之后对每个产生式 `A -> α B β`:
    /// FIRST(β) 去掉 epsilon 并入 FOLLOW(B); 如果 β 为空或可空, FOLLOW(A) 也并入 FOLLOW(B).
    #[must_use]
    pub fn compute(grammar: &Grammar, first: &FirstSets) -> Self {
        let mut sets = vec![BTreeSet::new(); grammar.non_terms().len()];
        if let Some(start) = sets.get_mut(grammar.symbol_start()) {
            start.insert(grammar.end_marker());
        }
        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for prod in grammar.prods() {
                let tail = prod.tail();
                for (pos, sym) in tail.iter().enumerate() {
                    let Symbol::NonTerminal(b) = *sym else {
                        continue;
                    };
                    let rest = first.of_seq(&tail[pos + 1..]);
                    let before = sets[b].len();
                    sets[b].extend(rest.terms());
                    if rest.is_nullable() && prod.head() != b {
                        let from_head = sets[prod.head()].clone();
                        sets[b].extend(from_head);
                    }
                    changed |= sets[b].len() != before;
                }
            }
            if !changed {
                break;
            }
        }
        debug!("FOLLOW sets converged after {passes} passes");
        Self { sets }
    }

    #[must_use]
    pub fn get(&self, nt: usize) -> Option<&BTreeSet<usize>> {
        self.sets.get(nt)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BTreeSet<usize>> {
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

    /// 按终结符表顺序给出 FOLLOW(nt) 中的名字.
    #[must_use]
    pub fn names<'a>(&self, grammar: &Grammar<'a>, nt: usize) -> Vec<&'a str> {
        self.sets
            .get(nt)
            .into_iter()
            .flatten()
            .map(|&t| grammar.name_of(Symbol::Terminal(t)))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::{FirstSets, FollowSets, Grammar};
    use pretty_assertions::assert_eq;

    fn follow_of<'a>(grammar: &Grammar<'a>, nt: &str) -> Vec<&'a str> {
        let first = FirstSets::compute(grammar);
        let follow = FollowSets::compute(grammar, &first);
        follow.names(grammar, grammar.non_term_index(nt).unwrap())
    }

    #[test]
    fn expression_grammar() {
        let grammar = Grammar::from_cfg(
            "E -> T Ep
            Ep -> + T Ep | epsilon
            T -> F Tp
            Tp -> * F Tp | epsilon
            F -> ( E ) | id",
        )
        .unwrap();
        // 终结符顺序: + * ( ) id $
        assert_eq!(follow_of(&grammar, "E"), [")", "$"]);
        assert_eq!(follow_of(&grammar, "Ep"), [")", "$"]);
        assert_eq!(follow_of(&grammar, "T"), ["+", ")", "$"]);
        assert_eq!(follow_of(&grammar, "Tp"), ["+", ")", "$"]);
        assert_eq!(follow_of(&grammar, "F"), ["+", "*", ")", "$"]);
    }

    #[test]
    fn nullable_suffix_propagates_head() {
        let grammar = Grammar::from_cfg(
            "S -> A B
            A -> a
            B -> b | epsilon",
        )
        .unwrap();
        assert_eq!(follow_of(&grammar, "S"), ["$"]);
        assert_eq!(follow_of(&grammar, "A"), ["b", "$"]);
        assert_eq!(follow_of(&grammar, "B"), ["$"]);
    }

    #[test]
    fn start_symbol_always_followed_by_end_marker() {
        for text in ["S -> a", "S -> S S | epsilon", "S -> A\nA -> S b | c"] {
            let grammar = Grammar::from_cfg(text).unwrap();
            let first = FirstSets::compute(&grammar);
            let follow = FollowSets::compute(&grammar, &first);
            assert!(follow.get(0).unwrap().contains(&grammar.end_marker()));
            assert!(follow.iter().flatten().all(|&t| t < grammar.terms().len()));
        }
    }

    #[test]
    fn unreachable_non_terminal_has_empty_follow() {
        let grammar = Grammar::from_cfg("S -> a\nU -> b").unwrap();
        assert_eq!(follow_of(&grammar, "U"), Vec::<&str>::new());
    }
}
