pub mod extract;
pub mod form;
pub mod login;
pub mod selectors;

pub use form::{plan_owner_fields, quote, FormStep};
pub use login::login;
