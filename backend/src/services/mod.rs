//! Business logic services for the Godown fulfillment engine

pub mod bom;
pub mod catalog;
pub mod delivery;
pub mod dispatch;
pub mod notification;
pub mod orders;
pub mod payment;
pub mod production;
pub mod returns;
pub mod stock;

pub use bom::BomService;
pub use catalog::CatalogService;
pub use delivery::DeliveryService;
pub use dispatch::DispatchService;
pub use notification::NotificationService;
pub use orders::OrderService;
pub use payment::PaymentService;
pub use production::ProductionService;
pub use returns::ReturnsService;
pub use stock::StockService;
