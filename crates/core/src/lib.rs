pub mod config;
pub mod record;

pub use config::{active_profile, load_dotenv, profile_label};
pub use record::{render_table, Record};
