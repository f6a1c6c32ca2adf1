pub mod error;
pub mod output;

pub use error::{AppError, AppResult, report_error};
pub use output::{OutputStyle, print_info, print_success, print_warning};
