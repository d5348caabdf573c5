pub mod transactions;

pub use transactions::TransactionService;
