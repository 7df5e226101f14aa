pub mod api_token;
pub mod customer;
pub mod domain;
pub mod event;
pub mod link;
pub mod user;
pub mod workspace;
pub mod workspace_user;

pub use api_token::Entity as ApiTokenEntity;
pub use customer::Entity as CustomerEntity;
pub use domain::Entity as DomainEntity;
pub use event::Entity as EventEntity;
pub use link::Entity as LinkEntity;
pub use user::Entity as UserEntity;
pub use workspace::Entity as WorkspaceEntity;
pub use workspace_user::Entity as WorkspaceUserEntity;
