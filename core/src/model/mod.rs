pub mod type_enum;

pub mod artist;
pub mod show;
pub mod venue;
