pub mod action;
pub mod view;

pub use action::Entity as ActionEntity;
pub use view::Entity as ViewEntity;
