//! Runtime values and delayed value support.

mod delayed;
mod value;

pub use delayed::DelayedValue;
pub use value::{
    CollectionValue, EdmValue, Elements, EnumValue, PropertyValue, StructuredValue, ValueKind,
    ValueSlot,
};
