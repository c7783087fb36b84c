//! 表驱动的 LL(1) 分析器.
//!
//! 纯分析模式与建树模式共用同一个分析循环, 区别只在于工作栈上每个符号附带的节点类型:
//! 纯分析模式附带 `()`, 建树模式附带 [`NodeId`].

use tracing::{debug, info, warn};

use crate::{
    Cell, Derivation, Grammar, ParseTable, Symbol, Token,
    error::{Limit, ParseError},
    symbol::END_MARKER,
    tree::{NodeId, ParseTree},
};

/// 单次分析的安全上限, 防止非 LL(1) 文法建出的表让分析器无限展开.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// 最多执行的动作数 (Pop, Produce, Accept 都算一步).
    pub max_steps: usize,
    /// 工作栈的最大深度.
    pub max_stack_depth: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            max_stack_depth: 10_000,
        }
    }
}

/// 建树模式的结果.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTree {
    pub derivation: Derivation,
    pub tree: ParseTree,
}

/// 分析过程中记录推导的方式.
trait Recorder {
    type Node: Copy;

    fn root(&mut self) -> Self::Node;

    /// 用产生式 `prod` 展开 `node`, 按顺序返回与 `tail` 中每个符号对应的节点.
    fn expand(&mut self, node: Self::Node, prod: usize, tail: &[Symbol]) -> Vec<Self::Node>;

    /// 终结符节点与输入中第 `position` 个记号匹配.
    fn matched(&mut self, node: Self::Node, position: usize);
}

struct Plain;

impl Recorder for Plain {
    type Node = ();

    fn root(&mut self) {}

    fn expand(&mut self, _node: (), _prod: usize, tail: &[Symbol]) -> Vec<()> {
        vec![(); tail.len()]
    }

    fn matched(&mut self, _node: (), _position: usize) {}
}

struct TreeBuilder<'t> {
    tree: ParseTree,
    tokens: &'t [Token],
}

impl Recorder for TreeBuilder<'_> {
    type Node = NodeId;

    fn root(&mut self) -> NodeId {
        self.tree.root()
    }

    fn expand(&mut self, node: NodeId, prod: usize, tail: &[Symbol]) -> Vec<NodeId> {
        self.tree.set_prod(node, prod);
        tail.iter()
            .map(|&sym| self.tree.push_child(node, sym))
            .collect()
    }

    fn matched(&mut self, node: NodeId, position: usize) {
        if let Some(token) = self.tokens.get(position) {
            self.tree.decorate(node, token);
        }
    }
}

/// 绑定一个文法与它的分析表. 分析表只读, 同一个分析器可以反复分析不同的输入.
#[derive(Debug, Clone, Copy)]
pub struct Ll1Parser<'g, 'a> {
    grammar: &'g Grammar<'a>,
    table: &'g ParseTable,
    limits: ParseLimits,
}

impl<'g, 'a> Ll1Parser<'g, 'a> {
    /// `table` 必须由 `grammar` 建成.
    #[must_use]
    pub fn new(grammar: &'g Grammar<'a>, table: &'g ParseTable) -> Self {
        Self {
            grammar,
            table,
            limits: ParseLimits::default(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn limits(&self) -> ParseLimits {
        self.limits
    }

    /// 分析一串终结符名, 成功时返回依次使用的产生式.
    ///
    /// 输入末尾没有结束符时会自动补上; 显式给出的结束符之后的输入不会被读取.
    /// # Errors
    /// 见 [`ParseError`]. 文法中不存在的终结符名在成为前瞻符时报告为 [`ParseError::UnexpectedToken`].
    pub fn parse<I>(&self, input: I) -> Result<Derivation, ParseError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let input: Vec<_> = input.into_iter().collect();
        let productions = self.run(&input, &mut Plain)?;
        Ok(Derivation::from(productions))
    }

    /// 与 [`Ll1Parser::parse`] 相同, 同时建立语法树.
    /// 终结符叶子会带上对应记号的词素与符号表位置.
    /// # Errors
    /// 见 [`ParseError`]. 出错时已经建立的部分树会被丢弃.
    pub fn parse_tree(&self, tokens: &[Token]) -> Result<ParsedTree, ParseError> {
        let start = Symbol::NonTerminal(self.grammar.symbol_start());
        let mut builder = TreeBuilder {
            tree: ParseTree::new(start, self.grammar.end_marker()),
            tokens,
        };
        let productions = self.run(tokens, &mut builder)?;
        Ok(ParsedTree {
            derivation: Derivation::from(productions),
            tree: builder.tree,
        })
    }

    fn run<S, R>(&self, input: &[S], recorder: &mut R) -> Result<Vec<usize>, ParseError>
    where
        S: AsRef<str>,
        R: Recorder,
    {
        let grammar = self.grammar;
        let lookahead = |position: usize| input.get(position).map_or(END_MARKER, |s| s.as_ref());

        let start = Symbol::NonTerminal(grammar.symbol_start());
        let mut stack = vec![
            (Symbol::Terminal(grammar.end_marker()), None),
            (start, Some(recorder.root())),
        ];
        let mut productions = vec![];
        let mut position = 0;
        let mut steps = 0;
        loop {
            let Some(&(top, node)) = stack.last() else {
                return Err(ParseError::StackUnderflow { step: steps });
            };
            let name = lookahead(position);
            let tripped = if steps >= self.limits.max_steps {
                Some(Limit::Steps)
            } else if stack.len() > self.limits.max_stack_depth {
                Some(Limit::StackDepth)
            } else {
                None
            };
            if let Some(limit) = tripped {
                warn!(
                    "{limit} limit exceeded at step {steps}, depth {}, top `{}`, lookahead `{name}`",
                    stack.len(),
                    grammar.name_of(top)
                );
                Err(ParseError::SafetyLimitExceeded {
                    limit,
                    steps,
                    depth: stack.len(),
                    top: grammar.name_of(top).to_string(),
                    lookahead: name.to_string(),
                })?
            }
            steps += 1;

            let cell = grammar
                .term_index(name)
                .and_then(|la| self.table.action(top, la))
                .unwrap_or(Cell::Error);
            debug!(
                "step {steps}: top `{}`, lookahead `{name}` at {position}, action `{cell}`",
                grammar.name_of(top)
            );
            match cell {
                Cell::Error => Err(ParseError::UnexpectedToken {
                    found: name.to_string(),
                    position,
                    expected: grammar.name_of(top).to_string(),
                })?,
                Cell::Accept => {
                    info!(
                        "accepted after {steps} steps, {} productions",
                        productions.len()
                    );
                    return Ok(productions);
                }
                Cell::Pop => {
                    stack.pop();
                    if let Some(node) = node {
                        recorder.matched(node, position);
                    }
                    position += 1;
                }
                Cell::Produce(p) => {
                    let malformed = || ParseError::MalformedProduction {
                        prod: p,
                        symbol: grammar.name_of(top).to_string(),
                    };
                    let prod = grammar
                        .prod(p)
                        .filter(|prod| Symbol::NonTerminal(prod.head()) == top)
                        .ok_or_else(malformed)?;
                    // 只有栈底的结束符没有节点, 而终结符不会通过上面的左部检查.
                    let node = node.expect("non-terminal frame without a node");
                    stack.pop();
                    let children = recorder.expand(node, p, prod.tail());
                    stack.extend(
                        prod.tail()
                            .iter()
                            .copied()
                            .zip(children.into_iter().map(Some))
                            .rev(),
                    );
                    productions.push(p);
                }
            }
        }
    }
}
