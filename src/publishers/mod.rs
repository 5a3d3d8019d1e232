pub mod log_only;
pub mod twitter;

pub use log_only::LogPublisher;
pub use twitter::TwitterPublisher;

use crate::types::ChangeEvent;

/// Status text announcing a headline change. Titles are trimmed here and
/// nowhere else; detection compares them untouched.
pub fn render_change(event: &ChangeEvent) -> String {
    let category = if event.category.is_empty() {
        String::new()
    } else {
        format!("[{}]", event.category)
    };

    format!(
        "{} De kop «{}» is zojuist gewijzigd naar «{}» {}",
        category,
        event.old_title.trim(),
        event.new_title.trim(),
        event.identifier
    )
}
