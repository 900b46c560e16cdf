pub mod opportunity;
pub mod session;
pub mod user;

pub use opportunity::{NewOpportunity, Opportunity, OpportunityWithOwner, DEFAULT_STATUS};
pub use session::Session;
pub use user::{Role, User};
