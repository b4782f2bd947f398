pub mod player_position;
pub mod preferred_foot;
pub mod publish_status;

pub use player_position::PlayerPosition;
pub use preferred_foot::PreferredFoot;
pub use publish_status::PublishStatus;
