pub mod contest_file;
pub mod folder_sink;
pub mod game_stats;
pub mod tank01;

pub use contest_file::ContestFile;
pub use folder_sink::FolderSink;
pub use game_stats::{GameStats, TopPerformersFormatter};
pub use tank01::Tank01Client;
