mod api_error;
mod auth_redirect;
mod credential_store;
mod envelope;
mod generated_image;
mod json_map;
mod preset;
mod shot_type;
mod upload_file;
mod user;

pub use api_error::*;
pub use auth_redirect::*;
pub use credential_store::*;
pub use envelope::*;
pub use generated_image::*;
pub use json_map::*;
pub use preset::*;
pub use shot_type::*;
pub use upload_file::*;
pub use user::*;
