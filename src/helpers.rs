pub mod converters;
pub mod reference;
