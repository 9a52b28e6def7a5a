mod error;
mod pass;
mod template;
mod view;

pub use error::RenderError;
pub use pass::{log_outcome, render_pass, run_render_pass, RenderJob, RenderOutcome};
pub use template::{MapTemplate, NoDataTemplate};
pub use view::{MapView, METERS_PER_NM};
