//! Identity and result records for the verification pipeline.

mod author;
mod institution;
mod researcher;
mod work;

pub use author::{Author, AuthorKey};
pub use institution::{Institution, InstitutionKey};
pub use researcher::Researcher;
pub use work::UnifiedWork;
