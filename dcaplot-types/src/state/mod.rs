pub mod live;
pub mod record;
pub mod session;

pub use live::*;
pub use record::*;
pub use session::*;
