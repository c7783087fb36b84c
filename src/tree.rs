//! 父亲 / 长子 / 右兄弟表示的语法树.
//!
//! 所有节点存放在同一个 [`Vec`] 里, 节点之间的关系用下标 ([`NodeId`]) 表示.

use std::ops::Index;

use crate::{Grammar, StLocation, Symbol, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// 节点在树内部存储中的下标, 按创建顺序分配, 根节点为 0.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    symbol: Symbol,
    prod: Option<usize>,
    father: Option<NodeId>,
    first_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    // 只用于 O(1) 追加孩子.
    last_child: Option<NodeId>,
    lexeme: Option<String>,
    location: Option<StLocation>,
}

impl Node {
    fn new(symbol: Symbol, father: Option<NodeId>) -> Self {
        Self {
            symbol,
            prod: None,
            father,
            first_child: None,
            next_sibling: None,
            last_child: None,
            lexeme: None,
            location: None,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.symbol.is_term()
    }

    /// 展开这个节点时使用的产生式编号, 终结符节点和未展开的节点为 [`None`].
    #[must_use]
    pub fn prod(&self) -> Option<usize> {
        self.prod
    }

    #[must_use]
    pub fn father(&self) -> Option<NodeId> {
        self.father
    }

    #[must_use]
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    #[must_use]
    pub fn lexeme(&self) -> Option<&str> {
        self.lexeme.as_deref()
    }

    #[must_use]
    pub fn location(&self) -> Option<StLocation> {
        self.location
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<Node>,
    end_marker: Symbol,
}

impl Index<NodeId> for ParseTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl ParseTree {
    /// 只有一个根节点的树, `end_marker` 为文法结束符的终结符下标.
    pub(crate) fn new(root: Symbol, end_marker: usize) -> Self {
        Self {
            nodes: vec![Node::new(root, None)],
            end_marker: Symbol::Terminal(end_marker),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 在 `father` 的孩子列表最右侧追加一个新节点.
    pub(crate) fn push_child(&mut self, father: NodeId, symbol: Symbol) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(symbol, Some(father)));
        match self.nodes[father.0].last_child.replace(id) {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(id),
            None => self.nodes[father.0].first_child = Some(id),
        }
        id
    }

    pub(crate) fn set_prod(&mut self, id: NodeId, prod: usize) {
        self.nodes[id.0].prod = Some(prod);
    }

    /// 把输入记号的词素与符号表位置复制到终结符节点上.
    pub(crate) fn decorate(&mut self, id: NodeId, token: &Token) {
        let node = &mut self.nodes[id.0];
        node.lexeme = token.lexeme.clone();
        node.location = token.location;
    }

    /// 从左到右遍历 `id` 的孩子.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id.0].first_child, |&c| {
            self.nodes[c.0].next_sibling
        })
    }

    /// 先序遍历整棵树: 先访问节点, 再依次访问长子链上的孩子.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let mark = stack.len();
            stack.extend(self.children(id));
            stack[mark..].reverse();
            Some(id)
        })
    }

    /// 节点深度, 根节点为 0.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        std::iter::successors(self.nodes[id.0].father, |&f| self.nodes[f.0].father).count()
    }

    /// 终结符叶子, 按先序 (也就是从左到右) 排列.
    ///
    /// 文法右部中显式写出的结束符不会与输入匹配, 所以不算在内.
    pub fn terminal_leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder()
            .filter(|&id| self[id].is_terminal() && self[id].symbol != self.end_marker)
    }

    /// 已经确定了产生式的非终结符节点数量.
    #[must_use]
    pub fn expanded_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.prod.is_some()).count()
    }

    /// 以表格形式输出每个节点 (先序编号, 符号, 类型, 产生式, 父亲, 右兄弟, 词素, 符号表位置).
    ///
    /// 关系都使用先序编号, 不存在时为 `-1`.
    #[must_use]
    pub fn to_table(&self, grammar: &Grammar) -> String {
        let order: Vec<_> = self.preorder().collect();
        let mut position = vec![0; self.nodes.len()];
        for (pos, id) in order.iter().enumerate() {
            position[id.0] = pos;
        }
        let rel = |id: Option<NodeId>| id.map_or(-1, |id| position[id.0] as isize);

        let mut out = String::from(
            "Index | Symbol | Type | Production | Father | Sibling | Lexeme | ST Location\n\
             ------|--------|------|------------|--------|---------|--------|------------\n",
        );
        for (pos, &id) in order.iter().enumerate() {
            let node = &self[id];
            out += &format!(
                "{:>5} | {:<6} | {:<5} | {:>10} | {:>6} | {:>7} | {:<6} | {}",
                pos,
                grammar.name_of(node.symbol),
                if node.is_terminal() { "TERM" } else { "NTERM" },
                node.prod.map_or(-1, |p| p as isize),
                rel(node.father),
                rel(node.next_sibling),
                node.lexeme().unwrap_or("-"),
                node.location.map_or("-".to_string(), |l| l.to_string()),
            );
            out += "\n";
        }
        out
    }
}
