pub mod contest;
pub mod snapshot;
pub mod state;
pub mod unit;

pub use contest::*;
pub use snapshot::*;
pub use state::*;
pub use unit::*;
