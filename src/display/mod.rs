use crate::display::cli_view::CliView;

pub mod cli_view;
#[cfg(test)]
pub mod testing;
pub mod view;

pub use view::{ConversationView, ViewEvent};

pub fn create_cli_view(echo_user: bool) -> CliView {
    CliView::new(echo_user)
}
