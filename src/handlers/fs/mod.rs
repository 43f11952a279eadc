pub mod io;
pub mod list;
pub mod meta;

pub use io::{read_file, rename, unlink, write_file};
pub use list::read_dir;
pub use meta::{exists, mkdir, stat, stat_path};

/// Owner rwx, group/other rx.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Subject to the process umask.
pub const DEFAULT_FILE_MODE: u32 = 0o666;
