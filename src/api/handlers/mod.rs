mod admin;
mod files;
mod static_files;

pub use admin::health;
pub use files::{
    create_file, delete_all_files, delete_file, delete_folder, get_file, list_files, list_folder,
    update_file,
};
pub use static_files::serve_payload;
