pub mod controller;
pub mod editor;
pub mod list;
pub mod pagination;
pub mod source;

#[cfg(test)]
pub mod test_utils;
