// LinkSaver state managers
// Managers handle stateful operations: sign-in state, the bookmark collection, the filtered view, the add-link form.

pub mod bookmark_store;
pub mod bookmark_view;
pub mod session_gate;
pub mod url_form;
