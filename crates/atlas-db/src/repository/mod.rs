//! # Repositories
//!
//! One repository per aggregate. Each wraps the shared pool and owns the
//! SQL for its tables; callers never see sqlx types other than through
//! `DbError`.

pub mod category;
pub mod party;
pub mod payment;
pub mod product;
pub mod sale;
pub mod settings;
pub mod user;

pub use category::CategoryRepository;
pub use party::PartyRepository;
pub use payment::{PaymentModeRepository, PaymentRepository};
pub use product::ProductRepository;
pub use sale::SaleRepository;
pub use settings::SettingsRepository;
pub use user::UserRepository;
