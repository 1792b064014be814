mod activity_repo;
mod attachment_repo;
mod board_repo;
mod card_repo;
mod comment_repo;
mod label_repo;
mod list_repo;
mod subtask_repo;
mod user_repo;

pub use activity_repo::ActivityRepo;
pub use attachment_repo::AttachmentRepo;
pub use board_repo::BoardRepo;
pub use card_repo::CardRepo;
pub use comment_repo::CommentRepo;
pub use label_repo::LabelRepo;
pub use list_repo::ListRepo;
pub use subtask_repo::SubtaskRepo;
pub use user_repo::UserRepo;
