pub mod company;
pub mod deal;
pub mod lead;
pub mod meeting;
pub mod note;
pub mod session;
pub mod user;

pub use company::{Company, CompanyMetric};
pub use deal::{Deal, DealStage};
pub use lead::{Lead, LeadStage};
pub use meeting::Meeting;
pub use note::Note;
pub use session::Session;
pub use user::User;
