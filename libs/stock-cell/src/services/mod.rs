pub mod materials;
pub mod stock;

pub use materials::MaterialService;
pub use stock::StockService;
