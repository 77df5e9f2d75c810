mod lists;

pub use lists::{ListsView, Pane, EMPTY_LIST_TEXT};
