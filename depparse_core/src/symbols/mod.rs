//! Symbol encoding
//!
//! Every column of the input and output (word form, tag, dependency label,
//! transition) gets a [`SymbolTable`] mapping strings to stable integer codes.
//! Training writes into a [`HashSymbolTableHandler`]; after training the
//! handler is frozen behind an `Arc` and each parsing worker extends it
//! through its own [`OverlaySymbolTableHandler`].

pub mod error;
pub mod handler;
pub mod null_values;
pub mod overlay;
pub mod table;

pub use error::{SymbolError, SymbolResult};
pub use handler::{HashSymbolTableHandler, OverlaySymbolTableHandler, SymbolTableHandler};
pub use null_values::{NullValueId, NullValueStrategy, NullValues};
pub use overlay::OverlaySymbolTable;
pub use table::{SymbolTable, TableCategory, ValueType};
