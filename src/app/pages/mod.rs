mod admin;
mod auth;
mod bookmarks;
mod feed;
mod generate;
mod post;
mod profile;
mod shopping;

pub use admin::{AdminPage, EditRecipePage, UploadRecipePage};
pub use auth::{check_signup, LoginPage, RegisterPage};
pub use bookmarks::BookmarksPage;
pub use feed::{FeedCard, FeedPage};
pub use generate::GeneratePage;
pub use post::PostPage;
pub use profile::ProfilePage;
pub use shopping::ShoppingListPage;
