//! Lexical query-token tree consumed by the binder.

mod literal;
mod token;

pub use literal::LiteralValue;
pub use token::{
    BinaryOperatorKind, LiteralToken, NamedValue, OrderByDirection, OrderByToken,
    QueryDescriptorToken, QueryOptionToken, QueryToken, SegmentToken, UnaryOperatorKind,
};
