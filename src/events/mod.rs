pub mod batch_queue;
pub mod dispatcher;
pub mod impression;
pub mod uuid;


pub use batch_queue::*;
pub use dispatcher::*;
pub use impression::*;
