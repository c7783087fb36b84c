pub mod derivation;
pub mod error;
pub mod first;
pub mod follow;
pub mod grammar;
pub mod parser;
pub mod pif;
pub mod symbol;
pub mod table;
pub mod token;
pub mod tree;

pub use derivation::Derivation;
pub use first::{FirstSet, FirstSets};
pub use follow::FollowSets;
pub use grammar::{Grammar, Production};
pub use parser::{Ll1Parser, ParseLimits, ParsedTree};
pub use pif::{PifEntry, classify, read_pif};
pub use symbol::{END_MARKER, Symbol};
pub use table::{Cell, ParseTable};
pub use token::{StLocation, Token};
pub use tree::{Node, NodeId, ParseTree};
