//! Work items that notifications point at: design files, tasks, expenses.

pub mod design_file;
pub mod expense;
pub mod task;

pub use design_file::DesignFile;
pub use expense::Expense;
pub use task::Task;
