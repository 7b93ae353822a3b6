mod contact;
mod facet;
mod filter;
mod ids;
mod result_set;

pub use contact::{ContactBuilder, ContactRecord, normalize_field};
pub use facet::Facet;
pub use filter::FilterObject;
pub use ids::ContactId;
pub use result_set::ResultSet;
