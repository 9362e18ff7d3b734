pub mod event;
pub mod item;
pub mod section;

pub use event::{ChangeEvent, Transaction};
pub use item::Item;
pub use section::Section;
