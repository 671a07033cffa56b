//! Transformations applied to Word HTML

pub mod list;
pub mod parse;

pub use list::{
    transform_list_item_like_elements_into_lists, ListDefinitions, ListItemData, ListStyle,
    ListType,
};
pub use parse::{parse_html, ParsedHtml};
