//! Modelos de datos
//!
//! Registros planos de cada entidad, sin relaciones anidadas.

pub mod driver;
pub mod location;
pub mod order_line;
pub mod payment_order;
pub mod product;
pub mod recipient;
pub mod sender;
pub mod session;
pub mod transfer;
pub mod vehicle;
pub mod waybill;
pub mod waybill_line;

pub use driver::Driver;
pub use location::Location;
pub use order_line::OrderLine;
pub use payment_order::{OrderStatus, PaymentOrder};
pub use product::Product;
pub use recipient::Recipient;
pub use sender::Sender;
pub use session::Session;
pub use transfer::Transfer;
pub use vehicle::Vehicle;
pub use waybill::Waybill;
pub use waybill_line::WaybillLine;
